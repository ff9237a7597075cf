//! Roster management endpoints.
//!
//! Provides HTTP endpoints for:
//! - Listing the roster (GET /roster)
//! - Adding a participant (POST /roster)
//! - Loading the configured example roster (POST /roster/preset)
//! - Clearing the roster and halting the session (DELETE /roster)

use crate::session::{RateKind, SessionHandle};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// Request body for adding a participant. Invalid input (blank name,
/// non-positive rate) is not an error; the add is simply not accepted.
#[derive(Debug, Deserialize)]
pub struct AddParticipantRequest {
    pub name: String,
    pub rate: f64,
    #[serde(default)]
    pub kind: RateKind,
}

pub fn router(session: SessionHandle) -> Router {
    Router::new()
        .route(
            "/",
            get(list_roster).post(add_participant).delete(clear_roster),
        )
        .route("/preset", post(load_preset))
        .with_state(session)
}

async fn list_roster(State(session): State<SessionHandle>) -> Json<Value> {
    let snapshot = session.snapshot().await;

    Json(json!({
        "count": snapshot.participants.len(),
        "combined_hourly_rate": snapshot.combined_hourly_rate,
        "participants": snapshot.participants,
    }))
}

async fn add_participant(
    State(session): State<SessionHandle>,
    Json(req): Json<AddParticipantRequest>,
) -> Json<Value> {
    let accepted = session
        .add_participant(&req.name, req.rate, req.kind)
        .await;

    let snapshot = session.snapshot().await;
    Json(json!({
        "accepted": accepted,
        "count": snapshot.participants.len(),
    }))
}

async fn load_preset(State(session): State<SessionHandle>) -> Json<Value> {
    let loaded = session.load_preset().await;

    let snapshot = session.snapshot().await;
    Json(json!({
        "success": loaded,
        "count": snapshot.participants.len(),
    }))
}

async fn clear_roster(State(session): State<SessionHandle>) -> Json<Value> {
    info!("Roster clear command received via API");
    session.clear().await;

    Json(json!({
        "success": true,
        "count": 0,
    }))
}
