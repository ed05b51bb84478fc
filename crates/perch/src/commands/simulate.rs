use std::sync::Arc;
use std::time::Duration;

use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info};

use perch_core::config::validate_config;
use perch_core::sim::{ScriptedSurface, SimContent, StaticWindow};
use perch_core::{
    Collaborators, ContentTrigger, MeasureStrategy, OffsetRect, PerchConfig, PopupOptions,
    PopupStatus, PopupView, Rect, Size, SurfaceEvent,
};

use super::helpers::load_config_with_warning;

/// Extra time allowed past the settle delay before giving up on the popup showing.
const SHOW_GRACE: Duration = Duration::from_secs(2);

/// How long a blur gets to close the popup.
const BLUR_GRACE: Duration = Duration::from_millis(250);

/// A simulated popup run, as described on the command line.
struct Scenario {
    extension_id: String,
    url: String,
    anchor: Rect,
    offset: OffsetRect,
    content: Size,
    live: Option<Size>,
    empty: bool,
    load_error: Option<String>,
    blur: bool,
    focus_outside: bool,
}

impl Scenario {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            extension_id: matches
                .get_one::<String>("extension")
                .cloned()
                .unwrap_or_default(),
            url: matches.get_one::<String>("url").cloned().unwrap_or_default(),
            anchor: matches.get_one::<Rect>("anchor").copied().unwrap_or_default(),
            offset: matches
                .get_one::<OffsetRect>("offset")
                .copied()
                .unwrap_or_default(),
            content: matches
                .get_one::<Size>("content")
                .copied()
                .unwrap_or_default(),
            live: matches.get_one::<Size>("live").copied(),
            empty: matches.get_flag("empty"),
            load_error: matches.get_one::<String>("load-error").cloned(),
            blur: matches.get_flag("blur"),
            focus_outside: matches.get_flag("focus-outside"),
        }
    }

    fn surface(&self) -> ScriptedSurface {
        let content = if self.empty {
            SimContent::empty()
        } else {
            SimContent::sized(self.content.width, self.content.height)
        };

        let mut surface = ScriptedSurface::new(content);
        if let Some(size) = self.live {
            surface = surface.with_live_size(size);
        }
        if let Some(message) = &self.load_error {
            surface = surface.with_load_error(message.clone());
        }
        surface
    }
}

/// Why the popup went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum ClosedBy {
    /// The popup destroyed itself before settling (empty document).
    EmptyContent,
    /// The close-on-blur policy closed it.
    Blur,
    /// Torn down at the end of the run.
    Owner,
}

impl ClosedBy {
    fn as_str(&self) -> &'static str {
        match self {
            ClosedBy::EmptyContent => "empty content",
            ClosedBy::Blur => "blur",
            ClosedBy::Owner => "owner",
        }
    }
}

#[derive(Serialize)]
struct SimulationReport {
    extension_id: String,
    url: String,
    trigger: ContentTrigger,
    strategy: MeasureStrategy,
    settle_delay_ms: u64,
    settled: PopupStatus,
    closed_by: ClosedBy,
    final_status: PopupStatus,
}

pub(crate) fn handle_simulate_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let mut config = load_config_with_warning();
    apply_cli_overrides(&mut config, matches);

    if let Err(e) = validate_config(&config) {
        eprintln!("Invalid simulation settings: {}", e);
        error!(event = "cli.simulate_failed", error = %e);
        return Err(e.into());
    }

    let scenario = Scenario::from_matches(matches);

    info!(
        event = "cli.simulate_started",
        extension_id = %scenario.extension_id,
        trigger = %config.content.trigger,
        strategy = %config.sizing.strategy,
        settle_delay_ms = config.sizing.settle_delay_ms
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let report = runtime.block_on(run_scenario(scenario, &config));

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    info!(
        event = "cli.simulate_completed",
        extension_id = %report.extension_id,
        closed_by = report.closed_by.as_str()
    );
    Ok(())
}

fn apply_cli_overrides(config: &mut PerchConfig, matches: &ArgMatches) {
    if let Some(trigger) = matches.get_one::<ContentTrigger>("trigger") {
        config.content.trigger = *trigger;
    }
    if let Some(strategy) = matches.get_one::<MeasureStrategy>("strategy") {
        config.sizing.strategy = *strategy;
    }
    if let Some(ms) = matches.get_one::<u64>("settle-ms") {
        config.sizing.settle_delay_ms = *ms;
    }
}

async fn run_scenario(scenario: Scenario, config: &PerchConfig) -> SimulationReport {
    let surface = scenario.surface();
    let parent = StaticWindow::new(scenario.anchor);
    let focus_inside = !scenario.focus_outside;

    let collaborators = Collaborators {
        surface: Arc::new(surface.clone()),
        parent: Some(Arc::new(parent)),
        anchor: None,
        opener: Arc::new(|url: &str| {
            info!(event = "cli.simulate.window_requested", url = url);
        }),
        focus: Arc::new(move || focus_inside),
    };
    let options = PopupOptions::new(
        scenario.extension_id.as_str(),
        scenario.url.clone(),
        scenario.offset,
    )
    .with_config(config);

    let mut handle = PopupView::spawn(options, collaborators);
    let mut status = handle.subscribe();

    let show_deadline = Duration::from_millis(config.sizing.settle_delay_ms) + SHOW_GRACE;
    let _ = tokio::time::timeout(
        show_deadline,
        status.wait_for(|s| s.shown || s.destroyed),
    )
    .await;
    let settled = handle.status();

    let closed_by = if settled.destroyed {
        ClosedBy::EmptyContent
    } else if scenario.blur {
        surface.emit(SurfaceEvent::LostFocus);
        let _ = tokio::time::timeout(BLUR_GRACE, status.wait_for(|s| s.destroyed)).await;
        if handle.is_destroyed() {
            ClosedBy::Blur
        } else {
            ClosedBy::Owner
        }
    } else {
        ClosedBy::Owner
    };

    handle.destroy();
    let final_status = handle.wait_destroyed().await;

    SimulationReport {
        extension_id: scenario.extension_id,
        url: scenario.url,
        trigger: config.content.trigger,
        strategy: config.sizing.strategy,
        settle_delay_ms: config.sizing.settle_delay_ms,
        settled,
        closed_by,
        final_status,
    }
}

fn format_bounds(bounds: &Rect) -> String {
    format!(
        "{},{} {}x{}",
        bounds.x, bounds.y, bounds.width, bounds.height
    )
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn print_report(report: &SimulationReport) {
    println!("Popup '{}'", report.extension_id);
    println!("  URL:        {}", report.url);
    println!(
        "  Sizing:     {} / {} ({}ms settle)",
        report.trigger, report.strategy, report.settle_delay_ms
    );
    println!("  Bounds:     {}", format_bounds(&report.settled.bounds));
    println!("  Shown:      {}", yes_no(report.settled.shown));
    println!("  Live size:  {}", yes_no(report.settled.live_sizing));
    println!("  Closed by:  {}", report.closed_by.as_str());
    println!(
        "  Final:      {}, shown {}, destroyed {}",
        format_bounds(&report.final_status.bounds),
        yes_no(report.final_status.shown),
        yes_no(report.final_status.destroyed)
    );
}
