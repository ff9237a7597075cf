//! REST API server for burnrate.
//!
//! Provides HTTP endpoints for:
//! - Session control (start/pause/reset, speaker rotation, off-track flag)
//! - Roster management (add, preset, clear, list)
//! - Status polling, including a Waybar-styled rendering
//! - Service logs

pub mod error;
pub mod routes;

use crate::config::Config;
use crate::session::SessionHandle;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

pub struct ApiServer {
    port: u16,
    session: SessionHandle,
}

impl ApiServer {
    pub fn new(session: SessionHandle, config: &Config) -> Self {
        Self {
            port: config.server.port,
            session,
        }
    }

    /// Build the full application router. Split out so tests can serve it on
    /// an ephemeral port.
    pub fn router(&self) -> Router {
        Router::new()
            // Root and version endpoints
            .route("/", get(service_info))
            .route("/version", get(version))
            // Session control and status endpoints
            .merge(routes::session::router(self.session.clone()))
            // Other API routes
            .nest("/roster", routes::roster::router(self.session.clone()))
            .nest("/logs", routes::logs::router())
            .layer(ServiceBuilder::new())
    }

    pub async fn start(self) -> Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET    /                  - Service info");
        info!("  GET    /version           - Get version info");
        info!("  GET    /status            - Get session status (?style=waybar)");
        info!("  POST   /session/start     - Start or resume the meeting clock");
        info!("  POST   /session/pause     - Pause the meeting clock");
        info!("  POST   /session/reset     - Zero the clock and all accrual");
        info!("  POST   /session/advance   - Hand the floor to the next speaker");
        info!("  POST   /session/offtrack  - Toggle off-track on the speaker");
        info!("  PUT    /session/duration  - Set the meeting duration");
        info!("  GET    /roster            - List participants");
        info!("  POST   /roster            - Add a participant");
        info!("  POST   /roster/preset     - Load the example roster");
        info!("  DELETE /roster            - Clear the roster, halt the session");
        info!("  GET    /logs              - Get service logs");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "burnrate",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "burnrate"
    }))
}
