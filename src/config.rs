//! Configuration loading and defaults for cursochat.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Backend used when neither config file nor environment names one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

const BASE_URL_ENV: &str = "CURSOCHAT_BASE_URL";

// === Types ===

/// Resolved CLI configuration, including defaults and environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Base URL of the recommendation backend.
    pub base_url: Option<String>,
}

// === Config Loading ===

impl Config {
    /// Load configuration from disk and merge with environment overrides.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.or_else(default_config_path);
        let mut config = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            _ => Config::default(),
        };

        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            config.base_url = Some(base_url);
        }

        Ok(config)
    }

    /// Backend base URL with the default applied.
    #[must_use]
    pub fn backend_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }
}

fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("cursochat").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_applies_when_unset() {
        let config = Config::default();
        assert_eq!(config.backend_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn configured_base_url_loses_trailing_slash() {
        let config = Config {
            base_url: Some("https://cursos.udea.edu.co/".to_string()),
        };
        assert_eq!(config.backend_base_url(), "https://cursos.udea.edu.co");
    }

    #[test]
    fn config_file_parses_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"http://10.0.0.5:8000\"\n").unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.backend_base_url(), "http://10.0.0.5:8000");
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = [not toml").unwrap();

        assert!(Config::load(Some(path)).is_err());
    }
}
