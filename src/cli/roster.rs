//! CLI handlers for roster commands.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use crate::cli::args::{RosterCliArgs, RosterCommand};
use crate::cli::base_url;
use crate::format;

pub async fn handle_roster_command(args: RosterCliArgs) -> Result<()> {
    match args.command {
        RosterCommand::Add {
            name,
            rate,
            monthly,
        } => add_participant(name, rate, monthly).await,
        RosterCommand::Preset => load_preset().await,
        RosterCommand::Clear => clear_roster().await,
        RosterCommand::List => list_roster().await,
    }
}

async fn add_participant(name: String, rate: f64, monthly: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let kind = if monthly { "monthly" } else { "hourly" };
    let response = client
        .post(format!("{}/roster", base_url()?))
        .json(&json!({ "name": &name, "rate": rate, "kind": kind }))
        .send()
        .await
        .context("Failed to connect to burnrate service. Is it running?")?;

    let json: Value = response.json().await?;
    if json
        .get("accepted")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        println!("Added {} at ${} per {}", name, rate, if monthly { "month" } else { "hour" });
    } else {
        bail!("Participant not added (blank name, bad rate, or the clock is running)");
    }
    Ok(())
}

async fn load_preset() -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/roster/preset", base_url()?))
        .send()
        .await
        .context("Failed to connect to burnrate service. Is it running?")?;

    let json: Value = response.json().await?;
    if json
        .get("success")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        println!(
            "Loaded example roster ({} participants)",
            json.get("count").and_then(|v| v.as_u64()).unwrap_or(0)
        );
    } else {
        bail!("Preset not loaded (pause the meeting first)");
    }
    Ok(())
}

async fn clear_roster() -> Result<()> {
    let client = reqwest::Client::new();
    client
        .delete(format!("{}/roster", base_url()?))
        .send()
        .await
        .context("Failed to connect to burnrate service. Is it running?")?;

    println!("Roster cleared, session halted");
    Ok(())
}

async fn list_roster() -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/roster", base_url()?))
        .send()
        .await
        .context("Failed to connect to burnrate service. Is it running?")?;

    let json: Value = response.json().await?;

    let empty = Vec::new();
    let participants = json
        .get("participants")
        .and_then(|v| v.as_array())
        .unwrap_or(&empty);

    if participants.is_empty() {
        println!("Roster is empty.");
        return Ok(());
    }

    for p in participants {
        let name = p.get("name").and_then(|v| v.as_str()).unwrap_or("?");
        let hourly = p
            .get("hourly_rate")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let kind = p.get("rate_kind").and_then(|v| v.as_str()).unwrap_or("");
        let original = p
            .get("original_rate")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        if kind == "monthly" {
            println!(
                "{:<20} {}/h ({}/month)",
                name,
                format::money(hourly),
                format::money(original)
            );
        } else {
            println!("{:<20} {}/h", name, format::money(hourly));
        }
    }

    let combined = json
        .get("combined_hourly_rate")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    println!("\nCombined burn rate: {}/h", format::money(combined));

    Ok(())
}
