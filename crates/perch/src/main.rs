use perch_core::{init_logging, log_app_error, log_app_shutdown};

mod app;
mod commands;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Quiet unless -v was given
    let verbose = matches.get_flag("verbose");
    init_logging(!verbose);

    let result = commands::run_command(&matches);
    if let Err(e) = &result {
        log_app_error(e.as_ref());
    }
    log_app_shutdown(result.is_ok());

    result
}
