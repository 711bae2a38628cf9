use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::db::StatusPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub autosave: AutosaveConfig,

    #[serde(default)]
    pub orders: OrdersConfig,

    #[serde(default)]
    pub print: PrintConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Quiet period after the last keystroke before the measurement form
    /// is written to the database.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrdersConfig {
    /// `free` lets staff move an order to any status (the shop reverts
    /// statuses after mistakes); `forward` enforces the progression
    /// new -> in_progress -> ready -> delivered -> completed.
    #[serde(default)]
    pub status_policy: StatusPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintConfig {
    /// Stylesheet URL for the Urdu slip font. Kept configurable so shops
    /// without internet can point it at a locally installed copy.
    #[serde(default = "default_font_url")]
    pub font_url: String,
}

fn default_font_url() -> String {
    crate::slip::DEFAULT_FONT_URL.to_string()
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            font_url: default_font_url(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("darzi")
        .join("darzi.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            autosave: AutosaveConfig::default(),
            orders: OrdersConfig::default(),
            print: PrintConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("darzi")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.autosave.debounce_ms, 1000);
        assert_eq!(config.orders.status_policy, StatusPolicy::Free);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [orders]
            status_policy = "forward"
            "#,
        )
        .unwrap();
        assert_eq!(config.orders.status_policy, StatusPolicy::Forward);
        assert_eq!(config.autosave.debounce_ms, 1000);
        assert!(config.db_path.ends_with("darzi/darzi.db"));
    }
}
