//! Meeting session module.
//!
//! Owns the roster, the meeting clock, and per-speaker cost accrual.
//! All mutation flows through the reducer in [`engine`]; [`status`] wraps it
//! in a shared handle for the API, CLI, and tick scheduler.

pub mod engine;
pub mod roster;
pub mod status;
mod ticker;

pub use engine::{Action, AccrualState, ClockState, SessionPolicy, SessionState};
pub use roster::{Participant, RateKind};
pub use status::{
    MonotonicClock, ParticipantSnapshot, SessionError, SessionHandle, SessionSnapshot, TimeSource,
};
