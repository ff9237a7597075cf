use crate::api::ApiServer;
use crate::config::Config;
use crate::session::{MonotonicClock, Participant, RateKind, SessionHandle, SessionPolicy};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub async fn run_service() -> Result<()> {
    info!("Starting burnrate service");

    let config = Config::load()?;
    let policy = session_policy(&config);
    let session = SessionHandle::new(
        policy,
        Arc::new(MonotonicClock::new()),
        Duration::from_millis(config.ticker.interval_ms),
    );

    let api_server = ApiServer::new(session, &config);

    info!("burnrate is ready!");
    info!(
        "Point your status bar at http://127.0.0.1:{}/status?style=waybar",
        config.server.port
    );
    info!(
        "Or test manually: curl -X POST http://127.0.0.1:{}/roster/preset",
        config.server.port
    );

    api_server.start().await
}

fn session_policy(config: &Config) -> SessionPolicy {
    let preset = config
        .preset
        .iter()
        .filter_map(|member| {
            let participant = Participant::normalized(
                &member.name,
                member.monthly_rate,
                RateKind::Monthly,
                config.meeting.hours_per_month,
            );
            if participant.is_none() {
                warn!("Skipping invalid preset entry {:?}", member.name);
            }
            participant
        })
        .collect();

    SessionPolicy {
        default_duration_minutes: config.meeting.duration_minutes,
        intro_minutes: config.meeting.intro_minutes,
        hours_per_month: config.meeting.hours_per_month,
        preset,
    }
}
