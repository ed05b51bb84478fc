use clap::ArgMatches;
use tracing::error;

use perch_core::log_app_startup;

pub mod helpers;

mod config;
mod simulate;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    log_app_startup("perch");

    match matches.subcommand() {
        Some(("simulate", sub_matches)) => simulate::handle_simulate_command(sub_matches),
        Some(("config", sub_matches)) => config::handle_config_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
