//! The tick scheduler.
//!
//! One background task per running meeting. Each firing samples the time
//! source once and applies a single `Tick` action, so the displayed elapsed
//! time and the accrual delta always come from the same instant.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::status::SessionHandle;

pub(crate) fn spawn(handle: SessionHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("Ticker started (period {:?})", period);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            handle.tick().await;
        }
    })
}
