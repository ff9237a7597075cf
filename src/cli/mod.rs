//! Command-line interface.
//!
//! The bare `burnrate` invocation runs the service; subcommands drive a
//! running instance over its HTTP API.

use crate::config::Config;
use anyhow::Result;

pub mod args;
pub mod logs;
pub mod roster;
pub mod session;

pub use args::{Cli, CliCommand, LogsCliArgs, RosterCliArgs, SessionCliArgs};
pub use logs::handle_logs_command;
pub use roster::handle_roster_command;
pub use session::handle_session_command;

/// Base URL of the local service, honoring the configured port.
pub(crate) fn base_url() -> Result<String> {
    let port = Config::load()?.server.port;
    Ok(format!("http://127.0.0.1:{port}"))
}
