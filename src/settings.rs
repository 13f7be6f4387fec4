//! Settings system - Persistent user preferences
//!
//! Settings are stored at ~/.config/cursochat/settings.toml

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const MIN_TYPING_DELAY_MS: u64 = 5;
const MAX_TYPING_DELAY_MS: u64 = 500;
const MAX_REPLY_PAUSE_MS: u64 = 5_000;

/// User settings with defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Delay between revealed characters, in milliseconds
    pub typing_delay_ms: u64,
    /// Pause between consecutive bot messages of one reply, in milliseconds
    pub reply_pause_ms: u64,
    /// Ring the terminal bell when a bot message arrives
    pub sound: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            typing_delay_ms: 30,
            reply_pause_ms: 400,
            sound: true,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to resolve config directory: not found.")?
            .join("cursochat");
        Ok(config_dir.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Set a single setting by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "typing_delay" | "speed" => {
                let delay: u64 = value.parse().map_err(|_| {
                    anyhow::anyhow!(
                        "Failed to update setting: invalid delay '{value}'. Expected milliseconds between {MIN_TYPING_DELAY_MS} and {MAX_TYPING_DELAY_MS}."
                    )
                })?;
                if !(MIN_TYPING_DELAY_MS..=MAX_TYPING_DELAY_MS).contains(&delay) {
                    anyhow::bail!(
                        "Failed to update setting: delay must be between {MIN_TYPING_DELAY_MS} and {MAX_TYPING_DELAY_MS} ms."
                    );
                }
                self.typing_delay_ms = delay;
            }
            "reply_pause" | "pause" => {
                let pause: u64 = value.parse().map_err(|_| {
                    anyhow::anyhow!(
                        "Failed to update setting: invalid pause '{value}'. Expected milliseconds up to {MAX_REPLY_PAUSE_MS}."
                    )
                })?;
                if pause > MAX_REPLY_PAUSE_MS {
                    anyhow::bail!(
                        "Failed to update setting: pause must be at most {MAX_REPLY_PAUSE_MS} ms."
                    );
                }
                self.reply_pause_ms = pause;
            }
            "sound" => {
                self.sound = parse_bool(value)?;
            }
            _ => {
                anyhow::bail!("Failed to update setting: unknown setting '{key}'.");
            }
        }
        Ok(())
    }

    /// Get all settings as a displayable string
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        lines.push("Settings:".to_string());
        lines.push("─────────────────────────────".to_string());
        lines.push(format!("  typing_delay:  {} ms", self.typing_delay_ms));
        lines.push(format!("  reply_pause:   {} ms", self.reply_pause_ms));
        lines.push(format!("  sound:         {}", self.sound));
        lines.push(String::new());
        lines.push(format!(
            "Config file: {}",
            Self::path().map_or_else(|_| "(unknown)".to_string(), |p| p.display().to_string())
        ));
        lines.join("\n")
    }

    /// Get available setting keys and their descriptions
    pub fn available_settings() -> Vec<(&'static str, &'static str)> {
        vec![
            ("typing_delay", "Delay between revealed characters (ms)"),
            ("reply_pause", "Pause between bot messages of one reply (ms)"),
            ("sound", "Terminal bell on bot messages: on/off"),
        ]
    }

    #[must_use]
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    #[must_use]
    pub fn reply_pause(&self) -> Duration {
        Duration::from_millis(self.reply_pause_ms)
    }
}

/// Parse a boolean value from various formats
fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" | "enabled" => Ok(true),
        "off" | "false" | "no" | "0" | "disabled" => Ok(false),
        _ => {
            anyhow::bail!("Failed to parse boolean '{value}': expected on/off, true/false, yes/no.")
        }
    }
}
