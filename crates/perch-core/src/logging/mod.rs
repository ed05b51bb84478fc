use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Initialize logging with optional quiet mode.
///
/// When `quiet` is true, only error-level events are emitted.
/// Otherwise the level comes from `PERCH_LOG_LEVEL` (default `info`).
pub fn init_logging(quiet: bool) {
    let level = filter_level(quiet, &Config::new().log_level);
    let directive = format!("perch={level}");
    let core_directive = format!("perch_core={level}");

    let mut filter = EnvFilter::from_default_env();
    for d in [directive, core_directive] {
        if let Ok(parsed) = d.parse() {
            filter = filter.add_directive(parsed);
        }
    }

    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .try_init();
}

/// Level used for perch's own targets. Unknown names fall back to `info`.
fn filter_level(quiet: bool, configured: &str) -> &'static str {
    if quiet {
        return "error";
    }
    match configured.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" => "off",
        _ => "info",
    }
}

/// Record that a perch binary finished starting up.
pub fn log_app_startup(binary: &str) {
    info!(
        event = "core.app.startup_completed",
        binary = binary,
        core_version = env!("CARGO_PKG_VERSION")
    );
}

/// Record the end of a run. `success` is false when the run ends with an error.
pub fn log_app_shutdown(success: bool) {
    info!(event = "core.app.shutdown_started", success = success);
}

/// Record an error that ended a command.
pub fn log_app_error(error: &dyn std::error::Error) {
    error!(
        event = "core.app.error_occurred",
        error = %error,
        has_source = error.source().is_some()
    );
}
