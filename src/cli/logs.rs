//! CLI handler for viewing logs.
//!
//! This module handles terminal presentation.
//! Core business logic is delegated to the `logs` module.

use crate::logs::{self, LogsOptions};
use anyhow::Result;

use super::args::LogsCliArgs;

pub fn handle_logs_command(args: LogsCliArgs) -> Result<()> {
    let options = LogsOptions::new(args.lines);
    let result = logs::get_logs(&options)?;

    println!("=== Service Logs (last {} entries) ===\n", args.lines);

    if result.app_logs.is_empty() {
        println!("No service logs found.");
    } else {
        for line in &result.app_logs {
            println!("{}", line);
        }
    }

    Ok(())
}
