use clap::ArgMatches;
use serde::Serialize;
use tracing::info;

use perch_core::config::{Config, ContentConfig, SizingConfig};

use super::helpers::load_config_with_warning;

#[derive(Serialize)]
struct ConfigReport {
    perch_dir: String,
    log_level: String,
    sizing: SizingConfig,
    content: ContentConfig,
}

pub(crate) fn handle_config_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    info!(event = "cli.config_started", json_output = json_output);

    let config = load_config_with_warning();
    let runtime = Config::new();
    let report = ConfigReport {
        perch_dir: runtime.perch_dir.display().to_string(),
        log_level: runtime.log_level,
        sizing: config.sizing,
        content: config.content,
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("perch_dir:       {}", report.perch_dir);
        println!("log_level:       {}", report.log_level);
        println!("settle_delay_ms: {}", report.sizing.settle_delay_ms);
        println!("strategy:        {}", report.sizing.strategy);
        println!("trigger:         {}", report.content.trigger);
    }

    info!(event = "cli.config_completed");
    Ok(())
}
