//! The session reducer: one pure transition function over the whole state.
//!
//! Every mutation (button press, roster edit, timer tick) is an [`Action`]
//! applied to an immutable [`SessionState`] snapshot, producing the successor
//! state. Invalid actions (blank names, starting with nobody in the room)
//! leave the state untouched rather than raising errors.
//!
//! Time enters only through the `now_ms` argument, sampled from a single
//! monotonic source per tick, so the displayed elapsed time and the accrual
//! delta can never drift apart.

use super::roster::{Participant, RateKind};

/// Session-wide policy knobs, fixed at construction from config.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    /// Initial total duration; clearing the roster restores it.
    pub default_duration_minutes: f64,
    /// Minutes off the top of the meeting before speaking budgets start.
    pub intro_minutes: f64,
    /// Divisor for monthly-to-hourly rate normalization.
    pub hours_per_month: f64,
    /// Example roster loaded wholesale by `Action::LoadPreset`.
    pub preset: Vec<Participant>,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            default_duration_minutes: 30.0,
            intro_minutes: 3.0,
            hours_per_month: 160.0,
            preset: Vec::new(),
        }
    }
}

/// The meeting wall clock.
///
/// `Running` keeps the instant the run began (`started_ms`, already offset by
/// any previously accumulated elapsed time) plus the last sampled values.
/// Elapsed time is a sampled approximation updated on each tick, not an exact
/// accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle {
        elapsed_ms: u64,
    },
    Running {
        started_ms: u64,
        elapsed_ms: u64,
        last_tick_ms: u64,
    },
}

impl ClockState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            Self::Idle { elapsed_ms } => *elapsed_ms,
            Self::Running { elapsed_ms, .. } => *elapsed_ms,
        }
    }
}

/// Per-participant accrual, parallel to the roster.
///
/// Re-derived from scratch (progress reset for everyone) whenever the roster
/// or the total duration changes.
#[derive(Debug, Clone, PartialEq)]
pub struct AccrualState {
    pub allotted_seconds: f64,
    pub spoken_seconds: f64,
    pub cost_accrued: f64,
    pub off_track: bool,
    pub exceeded: bool,
}

impl AccrualState {
    fn fresh(allotted_seconds: f64) -> Self {
        Self {
            allotted_seconds,
            spoken_seconds: 0.0,
            cost_accrued: 0.0,
            off_track: false,
            exceeded: false,
        }
    }
}

/// Everything an action can observe or replace.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub roster: Vec<Participant>,
    pub accrual: Vec<AccrualState>,
    pub clock: ClockState,
    pub active_speaker: usize,
    pub duration_minutes: f64,
    policy: SessionPolicy,
}

/// The tagged action set. One variant per operation the frontend can perform,
/// plus `Tick` from the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddParticipant {
        name: String,
        rate: f64,
        kind: RateKind,
    },
    SetDuration {
        minutes: f64,
    },
    LoadPreset,
    Clear,
    Start,
    Pause,
    Reset,
    Advance,
    ToggleOffTrack,
    Tick,
}

impl SessionState {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            roster: Vec::new(),
            accrual: Vec::new(),
            clock: ClockState::Idle { elapsed_ms: 0 },
            active_speaker: 0,
            duration_minutes: policy.default_duration_minutes,
            policy,
        }
    }

    /// Apply one action, returning the successor state. `now_ms` is the
    /// current reading of the session's monotonic clock; actions that do not
    /// involve time ignore it.
    pub fn apply(&self, action: Action, now_ms: u64) -> SessionState {
        let mut next = self.clone();
        match action {
            Action::AddParticipant { name, rate, kind } => {
                // Roster edits are only possible while the clock is idle;
                // the frontend disables the form during a run.
                if next.clock.is_running() {
                    return next;
                }
                if let Some(p) =
                    Participant::normalized(&name, rate, kind, next.policy.hours_per_month)
                {
                    next.roster.push(p);
                    next.rederive_accrual();
                }
            }
            Action::SetDuration { minutes } => {
                if next.clock.is_running() || !minutes.is_finite() || minutes <= 0.0 {
                    return next;
                }
                next.duration_minutes = minutes;
                next.rederive_accrual();
            }
            Action::LoadPreset => {
                if next.clock.is_running() {
                    return next;
                }
                next.roster = next.policy.preset.clone();
                next.rederive_accrual();
            }
            Action::Clear => {
                next.roster.clear();
                next.accrual.clear();
                next.active_speaker = 0;
                next.clock = ClockState::Idle { elapsed_ms: 0 };
                next.duration_minutes = next.policy.default_duration_minutes;
            }
            Action::Start => {
                if next.roster.is_empty() {
                    return next;
                }
                if let ClockState::Idle { elapsed_ms } = next.clock {
                    next.clock = ClockState::Running {
                        started_ms: now_ms.saturating_sub(elapsed_ms),
                        elapsed_ms,
                        last_tick_ms: now_ms,
                    };
                }
            }
            Action::Pause => {
                if let ClockState::Running { elapsed_ms, .. } = next.clock {
                    next.clock = ClockState::Idle { elapsed_ms };
                }
            }
            Action::Reset => {
                next.clock = ClockState::Idle { elapsed_ms: 0 };
                next.active_speaker = 0;
                for accrual in &mut next.accrual {
                    accrual.spoken_seconds = 0.0;
                    accrual.cost_accrued = 0.0;
                    accrual.exceeded = false;
                    accrual.off_track = false;
                }
            }
            Action::Advance => {
                if next.roster.is_empty() || !next.clock.is_running() {
                    return next;
                }
                next.active_speaker = (next.active_speaker + 1) % next.roster.len();
            }
            Action::ToggleOffTrack => {
                if next.roster.is_empty() || !next.clock.is_running() {
                    return next;
                }
                let idx = next.active_speaker;
                next.accrual[idx].off_track = !next.accrual[idx].off_track;
            }
            Action::Tick => {
                let ClockState::Running {
                    started_ms,
                    last_tick_ms,
                    ..
                } = next.clock
                else {
                    return next;
                };
                if next.roster.is_empty() {
                    return next;
                }

                let delta_s = now_ms.saturating_sub(last_tick_ms) as f64 / 1000.0;
                next.clock = ClockState::Running {
                    started_ms,
                    elapsed_ms: now_ms.saturating_sub(started_ms),
                    last_tick_ms: now_ms,
                };

                let idx = next.active_speaker;
                next.accrual[idx].spoken_seconds += delta_s;
                next.accrual[idx].exceeded =
                    next.accrual[idx].spoken_seconds > next.accrual[idx].allotted_seconds;

                // Once the speaker is off-track or over budget, the whole
                // room's combined rate burns, attributed to that speaker.
                if next.accrual[idx].off_track || next.accrual[idx].exceeded {
                    let combined = next.combined_hourly_rate();
                    next.accrual[idx].cost_accrued += combined / 3600.0 * delta_s;
                }
            }
        }
        next
    }

    /// Speaking budget per participant for the current roster and duration.
    pub fn allotted_seconds_each(&self) -> f64 {
        if self.roster.is_empty() {
            return 0.0;
        }
        let usable_minutes = self.duration_minutes - self.policy.intro_minutes;
        (usable_minutes * 60.0 / self.roster.len() as f64).max(0.0)
    }

    pub fn combined_hourly_rate(&self) -> f64 {
        self.roster.iter().map(|p| p.hourly_rate).sum()
    }

    pub fn total_lost(&self) -> f64 {
        self.accrual.iter().map(|a| a.cost_accrued).sum()
    }

    fn rederive_accrual(&mut self) {
        self.active_speaker = 0;
        if self.roster.is_empty() {
            self.accrual.clear();
            return;
        }
        let allotted = self.allotted_seconds_each();
        self.accrual = self
            .roster
            .iter()
            .map(|_| AccrualState::fresh(allotted))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn policy() -> SessionPolicy {
        SessionPolicy {
            default_duration_minutes: 30.0,
            intro_minutes: 3.0,
            hours_per_month: 160.0,
            preset: ["Alice", "Bob", "Carol"]
                .iter()
                .filter_map(|n| Participant::normalized(n, 5000.0, RateKind::Monthly, 160.0))
                .collect(),
        }
    }

    fn add(state: &SessionState, name: &str, rate: f64, kind: RateKind) -> SessionState {
        state.apply(
            Action::AddParticipant {
                name: name.to_string(),
                rate,
                kind,
            },
            0,
        )
    }

    fn two_speaker_session() -> SessionState {
        let state = SessionState::new(policy());
        let state = state.apply(Action::SetDuration { minutes: 33.0 }, 0);
        let state = add(&state, "A", 36.0, RateKind::Hourly);
        add(&state, "B", 36.0, RateKind::Hourly)
    }

    #[test]
    fn test_allotted_split_evenly() {
        for count in 1..=5usize {
            let mut state = SessionState::new(policy());
            state = state.apply(Action::SetDuration { minutes: 33.0 }, 0);
            for i in 0..count {
                state = add(&state, &format!("P{i}"), 10.0, RateKind::Hourly);
            }
            let expected = (33.0 - 3.0) * 60.0 / count as f64;
            assert!((state.allotted_seconds_each() - expected).abs() < EPS);
            for accrual in &state.accrual {
                assert!((accrual.allotted_seconds - expected).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_allotted_clamped_at_zero() {
        let state = SessionState::new(policy());
        let state = state.apply(Action::SetDuration { minutes: 2.0 }, 0);
        let state = add(&state, "A", 10.0, RateKind::Hourly);
        assert_eq!(state.accrual[0].allotted_seconds, 0.0);
    }

    #[test]
    fn test_monthly_rate_normalized_on_add() {
        let state = SessionState::new(policy());
        let state = add(&state, "Ana", 5000.0, RateKind::Monthly);
        assert_eq!(state.roster[0].hourly_rate, 31.25);
        assert_eq!(state.roster[0].original_rate, 5000.0);
        assert_eq!(state.roster[0].rate_kind, RateKind::Monthly);
    }

    #[test]
    fn test_invalid_add_is_silent_noop() {
        let state = SessionState::new(policy());
        for (name, rate) in [("", 10.0), ("  ", 10.0), ("Ana", 0.0), ("Ana", -1.0)] {
            let next = add(&state, name, rate, RateKind::Hourly);
            assert!(next.roster.is_empty());
        }
        let next = add(&state, "Ana", f64::NAN, RateKind::Hourly);
        assert!(next.roster.is_empty());
    }

    #[test]
    fn test_add_noop_while_running() {
        let state = add(&SessionState::new(policy()), "A", 10.0, RateKind::Hourly);
        let running = state.apply(Action::Start, 1_000);
        let next = add(&running, "B", 10.0, RateKind::Hourly);
        assert_eq!(next.roster.len(), 1);
    }

    #[test]
    fn test_roster_change_resets_progress_and_speaker() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::Advance, 0);
        state = state.apply(Action::Tick, 10_000);
        state = state.apply(Action::Pause, 10_000);
        assert!(state.accrual[1].spoken_seconds > 0.0);

        let next = add(&state, "C", 20.0, RateKind::Hourly);
        assert_eq!(next.active_speaker, 0);
        assert_eq!(next.accrual.len(), 3);
        for accrual in &next.accrual {
            assert_eq!(accrual.spoken_seconds, 0.0);
            assert_eq!(accrual.cost_accrued, 0.0);
            assert!(!accrual.exceeded);
            assert!(!accrual.off_track);
        }
    }

    #[test]
    fn test_set_duration_rederives_budgets() {
        let state = two_speaker_session();
        assert!((state.accrual[0].allotted_seconds - 900.0).abs() < EPS);
        let next = state.apply(Action::SetDuration { minutes: 63.0 }, 0);
        assert!((next.accrual[0].allotted_seconds - 1800.0).abs() < EPS);
    }

    #[test]
    fn test_set_duration_rejects_garbage() {
        let state = two_speaker_session();
        for minutes in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let next = state.apply(Action::SetDuration { minutes }, 0);
            assert_eq!(next.duration_minutes, 33.0);
        }
    }

    #[test]
    fn test_load_preset_replaces_roster() {
        let state = add(&SessionState::new(policy()), "Old", 99.0, RateKind::Hourly);
        let next = state.apply(Action::LoadPreset, 0);
        assert_eq!(next.roster.len(), 3);
        assert_eq!(next.roster[0].hourly_rate, 31.25);
        assert_eq!(next.accrual.len(), 3);
        assert_eq!(next.active_speaker, 0);
    }

    #[test]
    fn test_start_noop_on_empty_roster() {
        let state = SessionState::new(policy());
        let next = state.apply(Action::Start, 1_000);
        assert!(!next.clock.is_running());
    }

    #[test]
    fn test_pause_preserves_elapsed_and_resume_continues() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 1_000);
        state = state.apply(Action::Tick, 5_000);
        assert_eq!(state.clock.elapsed_ms(), 4_000);

        state = state.apply(Action::Pause, 5_000);
        assert_eq!(state.clock, ClockState::Idle { elapsed_ms: 4_000 });

        // Restart later; elapsed picks up where it left off.
        state = state.apply(Action::Start, 9_000);
        state = state.apply(Action::Tick, 10_000);
        assert_eq!(state.clock.elapsed_ms(), 5_000);
    }

    #[test]
    fn test_exceeded_is_strict() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        // Exactly the 900s budget: not exceeded.
        state = state.apply(Action::Tick, 900_000);
        assert_eq!(state.accrual[0].spoken_seconds, 900.0);
        assert!(!state.accrual[0].exceeded);
        assert_eq!(state.accrual[0].cost_accrued, 0.0);

        // One more second puts the speaker over.
        state = state.apply(Action::Tick, 901_000);
        assert!(state.accrual[0].exceeded);
    }

    #[test]
    fn test_cost_burns_at_combined_rate_once_exceeded() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::Tick, 900_000);
        state = state.apply(Action::Tick, 901_000);
        let after_crossing = state.accrual[0].cost_accrued;
        assert!((after_crossing - 72.0 / 3600.0).abs() < EPS);

        // A further 10s tick burns (36+36)/3600 * 10 = $0.20, all of it
        // attributed to the active speaker.
        state = state.apply(Action::Tick, 911_000);
        let increment = state.accrual[0].cost_accrued - after_crossing;
        assert!((increment - 0.2).abs() < EPS);
        assert_eq!(state.accrual[1].cost_accrued, 0.0);
        assert!((state.total_lost() - (after_crossing + 0.2)).abs() < EPS);
    }

    #[test]
    fn test_off_track_burns_within_budget() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::ToggleOffTrack, 0);
        assert!(state.accrual[0].off_track);

        state = state.apply(Action::Tick, 10_000);
        assert!(!state.accrual[0].exceeded);
        assert!((state.accrual[0].cost_accrued - 0.2).abs() < EPS);
        assert_eq!(state.accrual[1].cost_accrued, 0.0);
    }

    #[test]
    fn test_no_cost_within_budget_and_on_track() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::Tick, 600_000);
        assert_eq!(state.total_lost(), 0.0);
    }

    #[test]
    fn test_off_track_sticks_to_participant_until_toggled() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::ToggleOffTrack, 0);
        state = state.apply(Action::Advance, 0);
        assert!(state.accrual[0].off_track);
        assert!(!state.accrual[1].off_track);

        // Ticks now belong to speaker B, who is on track and within budget.
        state = state.apply(Action::Tick, 30_000);
        assert_eq!(state.accrual[1].cost_accrued, 0.0);
    }

    #[test]
    fn test_advance_cycles_modulo_roster() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        assert_eq!(state.active_speaker, 0);
        state = state.apply(Action::Advance, 0);
        assert_eq!(state.active_speaker, 1);
        state = state.apply(Action::Advance, 0);
        assert_eq!(state.active_speaker, 0);
    }

    #[test]
    fn test_advance_and_off_track_gated_on_running() {
        let state = two_speaker_session();
        let next = state.apply(Action::Advance, 0);
        assert_eq!(next.active_speaker, 0);
        let next = state.apply(Action::ToggleOffTrack, 0);
        assert!(!next.accrual[0].off_track);
    }

    #[test]
    fn test_advance_noop_on_empty_roster() {
        let state = SessionState::new(policy());
        let next = state.apply(Action::Advance, 0);
        assert_eq!(next.active_speaker, 0);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::ToggleOffTrack, 0);
        state = state.apply(Action::Tick, 901_000);
        state = state.apply(Action::Advance, 901_000);
        assert!(state.total_lost() > 0.0);

        let reset = state.apply(Action::Reset, 901_000);
        assert_eq!(reset.clock, ClockState::Idle { elapsed_ms: 0 });
        assert_eq!(reset.active_speaker, 0);
        for accrual in &reset.accrual {
            assert_eq!(accrual.spoken_seconds, 0.0);
            assert_eq!(accrual.cost_accrued, 0.0);
            assert!(!accrual.exceeded);
            assert!(!accrual.off_track);
        }
        // Roster and budgets survive a reset.
        assert_eq!(reset.roster.len(), 2);
        assert!((reset.accrual[0].allotted_seconds - 900.0).abs() < EPS);
    }

    #[test]
    fn test_reset_applies_while_idle_too() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::Tick, 5_000);
        state = state.apply(Action::Pause, 5_000);
        let reset = state.apply(Action::Reset, 6_000);
        assert_eq!(reset.clock, ClockState::Idle { elapsed_ms: 0 });
    }

    #[test]
    fn test_clear_halts_and_empties() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::Tick, 10_000);

        let cleared = state.apply(Action::Clear, 10_000);
        assert!(cleared.roster.is_empty());
        assert!(cleared.accrual.is_empty());
        assert_eq!(cleared.clock, ClockState::Idle { elapsed_ms: 0 });
        assert_eq!(cleared.active_speaker, 0);
        assert_eq!(cleared.duration_minutes, 30.0);

        // Ticks after a clear observe an idle clock and change nothing.
        let after = cleared.apply(Action::Tick, 60_000);
        assert!(after.roster.is_empty());
        assert_eq!(after.clock, ClockState::Idle { elapsed_ms: 0 });
    }

    #[test]
    fn test_tick_noop_while_idle() {
        let state = two_speaker_session();
        let next = state.apply(Action::Tick, 99_000);
        assert_eq!(next.clock.elapsed_ms(), 0);
        assert_eq!(next.accrual[0].spoken_seconds, 0.0);
    }

    #[test]
    fn test_tick_only_touches_active_speaker() {
        let mut state = two_speaker_session();
        state = state.apply(Action::Start, 0);
        state = state.apply(Action::Advance, 0);
        state = state.apply(Action::Tick, 42_000);
        assert_eq!(state.accrual[0].spoken_seconds, 0.0);
        assert!((state.accrual[1].spoken_seconds - 42.0).abs() < EPS);
    }
}
