//! # Configuration System
//!
//! Hierarchical TOML configuration for popup sizing and content handling.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.perch/config.toml` (global user preferences)
//! 3. **Project config** - `./.perch/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.perch/config.toml
//! [sizing]
//! settle_delay_ms = 300
//! strategy = "root-bounding-box"
//!
//! [content]
//! trigger = "load-check"
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use perch_core::config::PerchConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PerchConfig::load_hierarchy()?;
//!     println!("settle delay: {}ms", config.sizing.settle_delay_ms);
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use loading::{ConfigOverlay, load_hierarchy_from, merge_configs};
pub use types::{
    Config, ContentConfig, ContentTrigger, MeasureStrategy, PerchConfig, SizingConfig,
};
pub use validation::{MAX_SETTLE_DELAY_MS, validate_config};

impl PerchConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }
}
