//! Log retrieval for the running service.
//!
//! Core logic shared by the CLI and REST API; burnrate keeps no state of its
//! own on disk, so logs come straight from the systemd journal.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::process::Command;

/// Service log lines fetched from the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResult {
    pub app_logs: Vec<String>,
}

/// Options for log retrieval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsOptions {
    /// Number of log entries to retrieve
    pub lines: usize,
}

impl LogsOptions {
    pub fn new(lines: usize) -> Self {
        Self { lines }
    }
}

/// Get application logs from the systemd journal.
pub fn get_logs(options: &LogsOptions) -> Result<LogsResult> {
    let app_logs = get_app_logs(options.lines)?;
    Ok(LogsResult { app_logs })
}

/// Returns a vector of log lines. Returns empty vec if the journal is
/// unavailable.
fn get_app_logs(lines: usize) -> Result<Vec<String>> {
    let output = Command::new("journalctl")
        .arg("--user")
        .arg("-u")
        .arg("burnrate.service")
        .arg("-n")
        .arg(lines.to_string())
        .arg("--output=short-iso")
        .arg("--no-pager")
        .output()
        .context("Failed to execute journalctl. Is the service running?")?;

    if output.status.success() {
        let logs = String::from_utf8_lossy(&output.stdout);
        Ok(logs
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect())
    } else {
        // Journal might not be available; not an error worth surfacing.
        Ok(Vec::new())
    }
}
