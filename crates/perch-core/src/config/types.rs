//! Configuration type definitions for perch.
//!
//! # Example Configuration
//!
//! ```toml
//! [sizing]
//! settle_delay_ms = 200
//! strategy = "layout-maxima"
//!
//! [content]
//! trigger = "ready-signal"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration derived from the environment, not from config files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for perch data (default: ~/.perch)
    pub perch_dir: PathBuf,
    /// Log level for the application
    pub log_level: String,
}

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.perch/config.toml`
/// 2. Project config: `./.perch/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerchConfig {
    #[serde(default)]
    pub sizing: SizingConfig,

    #[serde(default)]
    pub content: ContentConfig,
}

/// Content measurement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Wait between the placeholder resize and the measurement, in milliseconds.
    ///
    /// A heuristic: layout, fonts and images may still be settling after it
    /// elapses on slow machines.
    #[serde(default = "super::defaults::default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default)]
    pub strategy: MeasureStrategy,
}

/// What starts the sizing protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentConfig {
    #[serde(default)]
    pub trigger: ContentTrigger,
}

/// How the rendered content box is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureStrategy {
    /// Largest scroll/offset/client extent across body and root element.
    #[default]
    LayoutMaxima,
    /// Root bounding box, with collapsed axes rebuilt from the body's children.
    RootBoundingBox,
}

/// Event that starts content sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContentTrigger {
    /// Size on every `ContentReady` signal from the surface.
    #[default]
    ReadySignal,
    /// Size once after loading, destroying the popup if the document is empty.
    LoadCheck,
}

impl MeasureStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureStrategy::LayoutMaxima => "layout-maxima",
            MeasureStrategy::RootBoundingBox => "root-bounding-box",
        }
    }
}

impl ContentTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentTrigger::ReadySignal => "ready-signal",
            ContentTrigger::LoadCheck => "load-check",
        }
    }
}

impl fmt::Display for MeasureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ContentTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "layout-maxima" => Ok(MeasureStrategy::LayoutMaxima),
            "root-bounding-box" => Ok(MeasureStrategy::RootBoundingBox),
            other => Err(format!(
                "Unknown measure strategy '{other}'. Valid: layout-maxima, root-bounding-box"
            )),
        }
    }
}

impl FromStr for ContentTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready-signal" => Ok(ContentTrigger::ReadySignal),
            "load-check" => Ok(ContentTrigger::LoadCheck),
            other => Err(format!(
                "Unknown content trigger '{other}'. Valid: ready-signal, load-check"
            )),
        }
    }
}
