//! Shared session handle and snapshot types.
//!
//! `SessionHandle` is the one owner of mutable session state. Every command
//! locks the state, computes the successor snapshot through the reducer, and
//! replaces the state wholesale, so readers never observe a half-applied tick.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use super::engine::{Action, SessionPolicy, SessionState};
use super::roster::RateKind;
use super::ticker;

/// Reading of the session's logical clock, in milliseconds from an arbitrary
/// fixed origin. Injected so tests can drive time by hand.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Production time source: monotonic milliseconds since process start.
/// Immune to system clock jumps, unlike the wall clock.
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Command rejections surfaced to the API and CLI. The reducer itself never
/// errors; these exist so a frontend can tell the user why nothing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot start with an empty roster")]
    EmptyRoster,
    #[error("meeting is not running")]
    NotRunning,
}

/// Per-participant view, roster and accrual merged.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantSnapshot {
    pub name: String,
    pub hourly_rate: f64,
    pub original_rate: f64,
    pub rate_kind: RateKind,
    pub allotted_seconds: f64,
    pub spoken_seconds: f64,
    pub cost_accrued: f64,
    pub off_track: bool,
    pub exceeded: bool,
    pub active: bool,
}

/// Full session view handed to API handlers and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub running: bool,
    pub elapsed_seconds: u64,
    pub duration_minutes: f64,
    pub started_at: Option<String>,
    pub active_speaker: Option<usize>,
    pub combined_hourly_rate: f64,
    pub total_lost: f64,
    pub participants: Vec<ParticipantSnapshot>,
}

struct Shared {
    state: SessionState,
    /// Wall-clock instant the current run began, display only.
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    ticker: Option<JoinHandle<()>>,
}

/// Thread-safe handle for sharing the session between the API, the CLI-facing
/// service loop, and the ticker task.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Shared>>,
    time: Arc<dyn TimeSource>,
    tick_interval: Duration,
}

impl SessionHandle {
    pub fn new(policy: SessionPolicy, time: Arc<dyn TimeSource>, tick_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Shared {
                state: SessionState::new(policy),
                started_at: None,
                ticker: None,
            })),
            time,
            tick_interval,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let shared = self.inner.lock().await;
        Self::build_snapshot(&shared)
    }

    /// Add a participant. Returns whether the entry was accepted; rejected
    /// input is a no-op, not an error.
    pub async fn add_participant(&self, name: &str, rate: f64, kind: RateKind) -> bool {
        let mut shared = self.inner.lock().await;
        let before = shared.state.roster.len();
        shared.state = shared.state.apply(
            Action::AddParticipant {
                name: name.to_string(),
                rate,
                kind,
            },
            self.time.now_ms(),
        );
        let accepted = shared.state.roster.len() > before;
        if accepted {
            info!(
                "Added participant {} ({} {})",
                name,
                rate,
                kind.as_str()
            );
        }
        accepted
    }

    /// Replace the roster with the configured example set. Returns false
    /// while a meeting is running.
    pub async fn load_preset(&self) -> bool {
        let mut shared = self.inner.lock().await;
        if shared.state.clock.is_running() {
            return false;
        }
        shared.state = shared.state.apply(Action::LoadPreset, self.time.now_ms());
        info!("Loaded preset roster ({} participants)", shared.state.roster.len());
        true
    }

    /// Change the total meeting duration. Returns whether the new value was
    /// accepted; budget progress resets for everyone when it is.
    pub async fn set_duration(&self, minutes: f64) -> bool {
        let mut shared = self.inner.lock().await;
        let before = shared.state.duration_minutes;
        shared.state = shared
            .state
            .apply(Action::SetDuration { minutes }, self.time.now_ms());
        let accepted = shared.state.duration_minutes != before;
        if accepted {
            info!("Meeting duration set to {} minutes", minutes);
        }
        accepted
    }

    /// Empty the roster and halt the session. The ticker is cancelled before
    /// the state is replaced, so nothing mutates after this returns.
    pub async fn clear(&self) {
        let mut shared = self.inner.lock().await;
        if let Some(ticker) = shared.ticker.take() {
            ticker.abort();
        }
        shared.state = shared.state.apply(Action::Clear, self.time.now_ms());
        shared.started_at = None;
        info!("Roster cleared, session halted");
    }

    /// Start (or resume) the meeting clock and the tick scheduler.
    pub async fn start(&self) -> Result<(), SessionError> {
        let mut shared = self.inner.lock().await;
        if shared.state.roster.is_empty() {
            return Err(SessionError::EmptyRoster);
        }
        shared.state = shared.state.apply(Action::Start, self.time.now_ms());
        if shared.started_at.is_none() {
            shared.started_at = Some(chrono::Utc::now());
        }
        if shared.ticker.is_none() {
            shared.ticker = Some(ticker::spawn(self.clone(), self.tick_interval));
        }
        info!("Meeting clock running");
        Ok(())
    }

    /// Pause the clock, keeping elapsed time. Cancels the ticker.
    pub async fn pause(&self) {
        let mut shared = self.inner.lock().await;
        if let Some(ticker) = shared.ticker.take() {
            ticker.abort();
        }
        shared.state = shared.state.apply(Action::Pause, self.time.now_ms());
        info!(
            "Meeting clock paused at {}s",
            shared.state.clock.elapsed_ms() / 1000
        );
    }

    /// Zero the clock and every participant's progress, keeping the roster.
    pub async fn reset(&self) {
        let mut shared = self.inner.lock().await;
        if let Some(ticker) = shared.ticker.take() {
            ticker.abort();
        }
        shared.state = shared.state.apply(Action::Reset, self.time.now_ms());
        shared.started_at = None;
        info!("Session reset");
    }

    /// Hand the floor to the next participant, cycling at the end.
    pub async fn advance(&self) -> Result<usize, SessionError> {
        let mut shared = self.inner.lock().await;
        if shared.state.roster.is_empty() {
            return Err(SessionError::EmptyRoster);
        }
        if !shared.state.clock.is_running() {
            return Err(SessionError::NotRunning);
        }
        shared.state = shared.state.apply(Action::Advance, self.time.now_ms());
        Ok(shared.state.active_speaker)
    }

    /// Flip the off-track flag on the current speaker. Returns the new value.
    pub async fn toggle_off_track(&self) -> Result<bool, SessionError> {
        let mut shared = self.inner.lock().await;
        if shared.state.roster.is_empty() {
            return Err(SessionError::EmptyRoster);
        }
        if !shared.state.clock.is_running() {
            return Err(SessionError::NotRunning);
        }
        shared.state = shared
            .state
            .apply(Action::ToggleOffTrack, self.time.now_ms());
        let flag = shared.state.accrual[shared.state.active_speaker].off_track;
        info!(
            "Speaker {} marked {}",
            shared.state.roster[shared.state.active_speaker].name,
            if flag { "off-track" } else { "on-track" }
        );
        Ok(flag)
    }

    /// Apply one scheduler tick. Invoked by the ticker task; a tick that
    /// lands after a pause or clear observes an idle clock and is a no-op.
    pub async fn tick(&self) {
        let mut shared = self.inner.lock().await;
        let now = self.time.now_ms();
        shared.state = shared.state.apply(Action::Tick, now);
    }

    fn build_snapshot(shared: &Shared) -> SessionSnapshot {
        let state = &shared.state;
        let participants = state
            .roster
            .iter()
            .zip(state.accrual.iter())
            .enumerate()
            .map(|(idx, (participant, accrual))| ParticipantSnapshot {
                name: participant.name.clone(),
                hourly_rate: participant.hourly_rate,
                original_rate: participant.original_rate,
                rate_kind: participant.rate_kind,
                allotted_seconds: accrual.allotted_seconds,
                spoken_seconds: accrual.spoken_seconds,
                cost_accrued: accrual.cost_accrued,
                off_track: accrual.off_track,
                exceeded: accrual.exceeded,
                active: idx == state.active_speaker,
            })
            .collect();

        SessionSnapshot {
            running: state.clock.is_running(),
            elapsed_seconds: state.clock.elapsed_ms() / 1000,
            duration_minutes: state.duration_minutes,
            started_at: shared.started_at.map(|dt| dt.to_rfc3339()),
            active_speaker: if state.roster.is_empty() {
                None
            } else {
                Some(state.active_speaker)
            },
            combined_hourly_rate: state.combined_hourly_rate(),
            total_lost: state.total_lost(),
            participants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FakeClock {
        now: AtomicU64,
    }

    impl FakeClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: AtomicU64::new(0),
            })
        }

        fn advance(&self, ms: u64) {
            self.now.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl TimeSource for FakeClock {
        fn now_ms(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    fn handle(clock: Arc<FakeClock>) -> SessionHandle {
        SessionHandle::new(
            SessionPolicy::default(),
            clock,
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_start_requires_roster() {
        let handle = handle(FakeClock::new());
        assert_eq!(handle.start().await, Err(SessionError::EmptyRoster));
    }

    #[tokio::test]
    async fn test_advance_requires_running_clock() {
        let handle = handle(FakeClock::new());
        assert!(handle.add_participant("A", 10.0, RateKind::Hourly).await);
        assert_eq!(handle.advance().await, Err(SessionError::NotRunning));
        assert_eq!(
            handle.toggle_off_track().await,
            Err(SessionError::NotRunning)
        );
    }

    #[tokio::test]
    async fn test_rejected_add_reports_not_accepted() {
        let handle = handle(FakeClock::new());
        assert!(!handle.add_participant("", 10.0, RateKind::Hourly).await);
        assert!(!handle.add_participant("A", -3.0, RateKind::Hourly).await);
        assert!(handle.snapshot().await.participants.is_empty());
    }

    #[tokio::test]
    async fn test_ticks_accrue_through_handle() {
        let clock = FakeClock::new();
        let handle = handle(clock.clone());
        assert!(handle.add_participant("A", 36.0, RateKind::Hourly).await);
        assert!(handle.add_participant("B", 36.0, RateKind::Hourly).await);
        handle.start().await.unwrap();
        handle.toggle_off_track().await.unwrap();

        clock.advance(10_000);
        handle.tick().await;

        let snapshot = handle.snapshot().await;
        assert!(snapshot.running);
        assert_eq!(snapshot.elapsed_seconds, 10);
        assert!((snapshot.total_lost - 0.2).abs() < 1e-9);
        assert!((snapshot.participants[0].cost_accrued - 0.2).abs() < 1e-9);
        assert_eq!(snapshot.participants[1].cost_accrued, 0.0);
    }

    #[tokio::test]
    async fn test_clear_halts_everything() {
        let clock = FakeClock::new();
        let handle = handle(clock.clone());
        assert!(handle.add_participant("A", 36.0, RateKind::Hourly).await);
        handle.start().await.unwrap();
        clock.advance(5_000);
        handle.tick().await;

        handle.clear().await;
        let cleared = handle.snapshot().await;
        assert!(!cleared.running);
        assert!(cleared.participants.is_empty());
        assert_eq!(cleared.elapsed_seconds, 0);

        // Ticking the fake clock forward after the clear mutates nothing.
        clock.advance(60_000);
        handle.tick().await;
        let after = handle.snapshot().await;
        assert!(!after.running);
        assert!(after.participants.is_empty());
        assert_eq!(after.elapsed_seconds, 0);
        assert_eq!(after.total_lost, 0.0);
    }

    #[tokio::test]
    async fn test_reset_zeroes_but_keeps_roster() {
        let clock = FakeClock::new();
        let handle = handle(clock.clone());
        assert!(handle.add_participant("A", 36.0, RateKind::Hourly).await);
        handle.start().await.unwrap();
        handle.toggle_off_track().await.unwrap();
        clock.advance(10_000);
        handle.tick().await;
        assert!(handle.snapshot().await.total_lost > 0.0);

        handle.reset().await;
        let snapshot = handle.snapshot().await;
        assert!(!snapshot.running);
        assert_eq!(snapshot.elapsed_seconds, 0);
        assert_eq!(snapshot.total_lost, 0.0);
        assert_eq!(snapshot.participants.len(), 1);
        assert!(snapshot.started_at.is_none());
        assert!(!snapshot.participants[0].off_track);
    }

    #[tokio::test]
    async fn test_pause_and_resume_preserve_elapsed() {
        let clock = FakeClock::new();
        let handle = handle(clock.clone());
        assert!(handle.add_participant("A", 36.0, RateKind::Hourly).await);
        handle.start().await.unwrap();
        clock.advance(4_000);
        handle.tick().await;
        handle.pause().await;
        assert_eq!(handle.snapshot().await.elapsed_seconds, 4);

        clock.advance(30_000);
        handle.start().await.unwrap();
        clock.advance(1_000);
        handle.tick().await;
        assert_eq!(handle.snapshot().await.elapsed_seconds, 5);
    }
}
