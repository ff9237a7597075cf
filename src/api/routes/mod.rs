//! API route modules.

pub mod logs;
pub mod roster;
pub mod session;
