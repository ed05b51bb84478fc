//! Default implementations for configuration types.

use crate::config::types::{Config, MeasureStrategy, SizingConfig};

/// Returns the default settle delay in milliseconds (200ms).
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_settle_delay_ms() -> u64 {
    200
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            strategy: MeasureStrategy::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let perch_dir = match dirs::home_dir() {
            Some(home) => home.join(".perch"),
            None => std::env::temp_dir().join(".perch"),
        };

        Self {
            perch_dir,
            log_level: std::env::var("PERCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_config_path(&self) -> std::path::PathBuf {
        self.perch_dir.join("config.toml")
    }
}
