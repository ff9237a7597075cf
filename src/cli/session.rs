//! CLI handlers for session commands.
//!
//! All commands talk to a running service over the HTTP API.

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::cli::args::{SessionCliArgs, SessionCommand};
use crate::cli::base_url;
use crate::format;

pub async fn handle_session_command(args: SessionCliArgs) -> Result<()> {
    match args.command {
        SessionCommand::Start => post_command("session/start", "Meeting clock running").await,
        SessionCommand::Pause => post_command("session/pause", "Meeting clock paused").await,
        SessionCommand::Reset => post_command("session/reset", "Session reset").await,
        SessionCommand::Next => next_speaker().await,
        SessionCommand::Offtrack => toggle_off_track().await,
        SessionCommand::Status => show_status().await,
        SessionCommand::Duration { minutes } => set_duration(minutes).await,
    }
}

async fn post_command(path: &str, done: &str) -> Result<()> {
    post(path).await?;
    println!("{done}");
    Ok(())
}

async fn next_speaker() -> Result<()> {
    let json = post("session/advance").await?;
    println!(
        "Speaking now: {}",
        json.get("name").and_then(|v| v.as_str()).unwrap_or("?")
    );
    Ok(())
}

async fn toggle_off_track() -> Result<()> {
    let json = post("session/offtrack").await?;
    let flag = json
        .get("off_track")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    println!(
        "Current speaker is now {}",
        if flag { "off-track" } else { "on-track" }
    );
    Ok(())
}

async fn set_duration(minutes: f64) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/session/duration", base_url()?))
        .json(&serde_json::json!({ "minutes": minutes }))
        .send()
        .await
        .context("Failed to connect to burnrate service. Is it running?")?;

    let json: Value = response.json().await?;
    if json
        .get("accepted")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        println!("Meeting duration set to {minutes} minutes");
    } else {
        println!("Duration unchanged (invalid value, or the clock is running)");
    }
    Ok(())
}

async fn show_status() -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/status", base_url()?))
        .send()
        .await
        .context("Failed to connect to burnrate service. Is it running?")?;

    let json: Value = response.json().await?;

    let running = json
        .get("running")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let elapsed = json
        .get("elapsed_seconds")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    let duration = json
        .get("duration_minutes")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let total_lost = json
        .get("total_lost")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let combined = json
        .get("combined_hourly_rate")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    println!(
        "Meeting: {} {} / {:.0} min",
        if running { "running" } else { "paused" },
        format::clock(elapsed as f64),
        duration
    );
    println!(
        "Burn rate: {}/h combined | Money lost: {}",
        format::money(combined),
        format::money(total_lost)
    );

    let empty = Vec::new();
    let participants = json
        .get("participants")
        .and_then(|v| v.as_array())
        .unwrap_or(&empty);

    if participants.is_empty() {
        println!("Roster is empty.");
        return Ok(());
    }

    println!();
    for p in participants {
        let active = p.get("active").and_then(|v| v.as_bool()).unwrap_or(false);
        let name = p.get("name").and_then(|v| v.as_str()).unwrap_or("?");
        let spoken = p
            .get("spoken_seconds")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let allotted = p
            .get("allotted_seconds")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let lost = p
            .get("cost_accrued")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let mut flags = String::new();
        if p.get("exceeded").and_then(|v| v.as_bool()).unwrap_or(false) {
            flags.push_str(" EXCEEDED");
        }
        if p.get("off_track")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            flags.push_str(" OFF-TRACK");
        }

        println!(
            "{} {:<20} spoken {} / {}  lost {}{}",
            if active { ">" } else { " " },
            name,
            format::clock(spoken),
            format::clock(allotted),
            format::money(lost),
            flags
        );
    }

    Ok(())
}

async fn post(path: &str) -> Result<Value> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/{}", base_url()?, path))
        .send()
        .await
        .context("Failed to connect to burnrate service. Is it running?")?;

    let status = response.status();
    let json: Value = response.json().await?;

    if !status.is_success() {
        bail!(
            "Command failed: {}",
            json.get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error")
        );
    }

    Ok(json)
}
