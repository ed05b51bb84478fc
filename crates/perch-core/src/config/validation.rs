//! Configuration validation.

use crate::config::types::PerchConfig;
use crate::errors::ConfigError;

/// Upper bound for the settle delay. Longer waits leave a visibly blank popup.
pub const MAX_SETTLE_DELAY_MS: u64 = 10_000;

/// Validate a merged configuration.
pub fn validate_config(config: &PerchConfig) -> Result<(), ConfigError> {
    if config.sizing.settle_delay_ms > MAX_SETTLE_DELAY_MS {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "sizing.settle_delay_ms must be at most {MAX_SETTLE_DELAY_MS}, got {}",
                config.sizing.settle_delay_ms
            ),
        });
    }

    Ok(())
}
