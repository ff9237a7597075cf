use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Default API port. 2876 spells BURN on a phone keypad.
pub const DEFAULT_PORT: u16 = 2876;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub meeting: MeetingConfig,
    pub ticker: TickerConfig,
    /// Example roster loaded by the preset endpoint, given as monthly rates.
    pub preset: Vec<PresetMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    /// Total meeting duration in minutes. Clearing the roster restores this.
    pub duration_minutes: f64,
    /// Minutes at the top of the meeting that count toward nobody's budget.
    pub intro_minutes: f64,
    /// Divisor for normalizing a monthly rate to an hourly one.
    pub hours_per_month: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetMember {
    pub name: String,
    pub monthly_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            meeting: MeetingConfig::default(),
            ticker: TickerConfig::default(),
            preset: default_preset(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 30.0,
            intro_minutes: 3.0,
            hours_per_month: 160.0, // 40h x 4 weeks
        }
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

fn default_preset() -> Vec<PresetMember> {
    ["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"]
        .iter()
        .map(|name| PresetMember {
            name: name.to_string(),
            monthly_rate: 5000.0,
        })
        .collect()
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
