//! Session control endpoints.
//!
//! Provides HTTP endpoints for:
//! - Getting the session status (GET /status, with waybar style support)
//! - Starting/pausing/resetting the clock (POST /session/start|pause|reset)
//! - Rotating the speaker (POST /session/advance)
//! - Flagging off-track discussion (POST /session/offtrack)
//! - Changing the meeting duration (PUT /session/duration)

use crate::api::error::{ApiError, ApiResult};
use crate::format;
use crate::session::{SessionHandle, SessionSnapshot};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::info;

/// Request body for the duration endpoint.
#[derive(Debug, Deserialize)]
pub struct DurationRequest {
    pub minutes: f64,
}

pub fn router(session: SessionHandle) -> Router {
    Router::new()
        .route("/status", get(session_status))
        .route("/session/start", post(start_session))
        .route("/session/pause", post(pause_session))
        .route("/session/reset", post(reset_session))
        .route("/session/advance", post(advance_speaker))
        .route("/session/offtrack", post(toggle_off_track))
        .route("/session/duration", put(set_duration))
        .with_state(session)
}

/// Gets the current session status.
///
/// # Query Parameters
/// - `style=waybar` - Returns a response formatted for Waybar integration
async fn session_status(
    Query(params): Query<HashMap<String, String>>,
    State(session): State<SessionHandle>,
) -> Json<Value> {
    let snapshot = session.snapshot().await;

    if params.get("style") == Some(&"waybar".to_string()) {
        return Json(generate_waybar_response(&snapshot));
    }

    Json(json!({
        "running": snapshot.running,
        "elapsed_seconds": snapshot.elapsed_seconds,
        "duration_minutes": snapshot.duration_minutes,
        "started_at": snapshot.started_at,
        "active_speaker": snapshot.active_speaker,
        "combined_hourly_rate": snapshot.combined_hourly_rate,
        "total_lost": snapshot.total_lost,
        "participants": snapshot.participants,
        "display": {
            "elapsed": format::clock(snapshot.elapsed_seconds as f64),
            "total_lost": format::money(snapshot.total_lost),
            "combined_hourly_rate": format::money(snapshot.combined_hourly_rate),
        },
    }))
}

async fn start_session(State(session): State<SessionHandle>) -> ApiResult<Json<Value>> {
    info!("Session start command received via API");
    session.start().await.map_err(ApiError::from)?;

    let snapshot = session.snapshot().await;
    Ok(Json(json!({
        "success": true,
        "running": snapshot.running,
        "elapsed_seconds": snapshot.elapsed_seconds,
        "message": "Meeting clock running",
    })))
}

async fn pause_session(State(session): State<SessionHandle>) -> Json<Value> {
    info!("Session pause command received via API");
    session.pause().await;

    let snapshot = session.snapshot().await;
    Json(json!({
        "success": true,
        "running": snapshot.running,
        "elapsed_seconds": snapshot.elapsed_seconds,
        "message": "Meeting clock paused",
    }))
}

async fn reset_session(State(session): State<SessionHandle>) -> Json<Value> {
    info!("Session reset command received via API");
    session.reset().await;

    Json(json!({
        "success": true,
        "message": "Clock and accrual zeroed",
    }))
}

async fn advance_speaker(State(session): State<SessionHandle>) -> ApiResult<Json<Value>> {
    let index = session.advance().await.map_err(ApiError::from)?;

    let snapshot = session.snapshot().await;
    let name = snapshot
        .participants
        .get(index)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    Ok(Json(json!({
        "success": true,
        "active_speaker": index,
        "name": name,
    })))
}

async fn toggle_off_track(State(session): State<SessionHandle>) -> ApiResult<Json<Value>> {
    let off_track = session.toggle_off_track().await.map_err(ApiError::from)?;

    Ok(Json(json!({
        "success": true,
        "off_track": off_track,
    })))
}

async fn set_duration(
    State(session): State<SessionHandle>,
    Json(req): Json<DurationRequest>,
) -> Json<Value> {
    let accepted = session.set_duration(req.minutes).await;

    Json(json!({
        "accepted": accepted,
        "minutes": req.minutes,
    }))
}

/// Generates a response formatted for Waybar integration.
///
/// The bar shows the running total of money lost; the tooltip carries the
/// clock and the current speaker.
fn generate_waybar_response(snapshot: &SessionSnapshot) -> Value {
    if snapshot.participants.is_empty() {
        return json!({
            "text": "",
            "class": "burnrate-idle",
            "tooltip": "No meeting",
        });
    }

    let speaker = snapshot
        .active_speaker
        .and_then(|idx| snapshot.participants.get(idx));
    let burning = speaker.map(|s| s.off_track || s.exceeded).unwrap_or(false);

    let class = if !snapshot.running {
        "burnrate-paused"
    } else if burning {
        "burnrate-burning"
    } else {
        "burnrate-running"
    };

    let tooltip = match speaker {
        Some(s) => format!(
            "{} · {} speaking {} / {} · {} lost",
            format::clock(snapshot.elapsed_seconds as f64),
            s.name,
            format::clock(s.spoken_seconds),
            format::clock(s.allotted_seconds),
            format::money(snapshot.total_lost),
        ),
        None => format!(
            "{} · {} lost",
            format::clock(snapshot.elapsed_seconds as f64),
            format::money(snapshot.total_lost),
        ),
    };

    json!({
        "text": format::money(snapshot.total_lost),
        "class": class,
        "tooltip": tooltip,
    })
}
