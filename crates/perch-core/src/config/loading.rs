//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.perch/config.toml` (global user preferences)
//! 3. **Project config** - `./.perch/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority, applied by the caller)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::types::{Config, ContentTrigger, MeasureStrategy, PerchConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

/// A config file as written on disk: every field optional, so a file only
/// overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    #[serde(default)]
    pub sizing: SizingOverlay,
    #[serde(default)]
    pub content: ContentOverlay,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizingOverlay {
    pub settle_delay_ms: Option<u64>,
    pub strategy: Option<MeasureStrategy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentOverlay {
    pub trigger: Option<ContentTrigger>,
}

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a present file cannot be read or parsed, or if
/// validation fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<PerchConfig, ConfigError> {
    let user_path = Config::new().user_config_path();
    let project_path = std::env::current_dir()?.join(".perch").join("config.toml");
    load_hierarchy_from(&[user_path, project_path])
}

/// Load and merge the given config files in order over the defaults.
pub fn load_hierarchy_from(paths: &[PathBuf]) -> Result<PerchConfig, ConfigError> {
    let mut config = PerchConfig::default();

    for path in paths {
        match load_config_file(path) {
            Ok(overlay) => {
                debug!(
                    event = "core.config.file_loaded",
                    path = %path.display()
                );
                config = merge_configs(config, overlay);
            }
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    validate_config(&config)?;

    info!(
        event = "core.config.load_completed",
        settle_delay_ms = config.sizing.settle_delay_ms,
        strategy = %config.sizing.strategy,
        trigger = %config.content.trigger
    );

    Ok(config)
}

/// Load a single configuration file.
pub fn load_config_file(path: &Path) -> Result<ConfigOverlay, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(ConfigError::IoError { source: e }),
    };

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge an overlay into a base configuration, with the overlay taking precedence.
pub fn merge_configs(base: PerchConfig, overlay: ConfigOverlay) -> PerchConfig {
    let mut merged = base;
    if let Some(delay) = overlay.sizing.settle_delay_ms {
        merged.sizing.settle_delay_ms = delay;
    }
    if let Some(strategy) = overlay.sizing.strategy {
        merged.sizing.strategy = strategy;
    }
    if let Some(trigger) = overlay.content.trigger {
        merged.content.trigger = trigger;
    }
    merged
}
