use clap::{Arg, ArgAction, Command};

use perch_core::{ContentTrigger, MeasureStrategy};

use crate::commands::helpers::{parse_offset, parse_rect, parse_size};

pub fn build_cli() -> Command {
    Command::new("perch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Drive anchored extension popups against a scripted surface")
        .long_about("perch runs the popup lifecycle (content sizing, anchored placement, close-on-blur and teardown) against an in-memory surface, so sizing and close behavior can be inspected without a browser host.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("simulate")
                .about("Open a popup on a scripted surface and report where it settled")
                .arg(
                    Arg::new("url")
                        .long("url")
                        .help("URL the popup loads")
                        .default_value("chrome-extension://perch-sim/popup.html")
                )
                .arg(
                    Arg::new("extension")
                        .long("extension")
                        .short('e')
                        .help("Extension id used in diagnostics")
                        .default_value("perch-sim")
                )
                .arg(
                    Arg::new("anchor")
                        .long("anchor")
                        .help("Anchor window bounds as X,Y,W,H")
                        .value_parser(parse_rect)
                        .default_value("0,0,1280,800")
                )
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .help("Trigger element rectangle relative to the anchor, as X,Y,W,H")
                        .value_parser(parse_offset)
                        .default_value("0,0,0,0")
                )
                .arg(
                    Arg::new("content")
                        .long("content")
                        .help("Rendered content size as W,H")
                        .value_parser(parse_size)
                        .default_value("320,240")
                )
                .arg(
                    Arg::new("live")
                        .long("live")
                        .help("Have the host report this preferred size as W,H")
                        .value_parser(parse_size)
                )
                .arg(
                    Arg::new("trigger")
                        .long("trigger")
                        .help("What starts content sizing (overrides config)")
                        .value_parser(clap::value_parser!(ContentTrigger))
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .help("How content is measured (overrides config)")
                        .value_parser(clap::value_parser!(MeasureStrategy))
                )
                .arg(
                    Arg::new("settle-ms")
                        .long("settle-ms")
                        .help("Settle delay before measuring, in milliseconds (overrides config)")
                        .value_parser(clap::value_parser!(u64))
                )
                .arg(
                    Arg::new("empty")
                        .long("empty")
                        .help("Serve a document with no content")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("load-error")
                        .long("load-error")
                        .help("Fail the load with this message")
                )
                .arg(
                    Arg::new("blur")
                        .long("blur")
                        .help("Send a focus-lost event once the popup has settled")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("focus-outside")
                        .long("focus-outside")
                        .help("Report that no application window holds focus")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("config")
                .about("Show the effective configuration")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "perch");
    }

    #[test]
    fn test_cli_verify() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_simulate_defaults() {
        let matches = build_cli()
            .try_get_matches_from(vec!["perch", "simulate"])
            .unwrap();
        let sub = matches.subcommand_matches("simulate").unwrap();
        assert_eq!(
            sub.get_one::<String>("url").unwrap(),
            "chrome-extension://perch-sim/popup.html"
        );
        assert!(sub.get_one::<ContentTrigger>("trigger").is_none());
        assert!(!sub.get_flag("blur"));
    }

    #[test]
    fn test_simulate_parses_geometry_and_overrides() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "perch",
                "simulate",
                "--anchor",
                "100,50,1024,768",
                "--offset",
                "10,20,30,20",
                "--content",
                "900,10",
                "--trigger",
                "load-check",
                "--strategy",
                "root-bounding-box",
                "--settle-ms",
                "50",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("simulate").unwrap();
        assert_eq!(
            sub.get_one::<perch_core::Rect>("anchor").unwrap(),
            &perch_core::Rect::new(100, 50, 1024, 768)
        );
        assert_eq!(
            sub.get_one::<ContentTrigger>("trigger"),
            Some(&ContentTrigger::LoadCheck)
        );
        assert_eq!(
            sub.get_one::<MeasureStrategy>("strategy"),
            Some(&MeasureStrategy::RootBoundingBox)
        );
        assert_eq!(sub.get_one::<u64>("settle-ms"), Some(&50));
    }

    #[test]
    fn test_simulate_rejects_bad_size() {
        let result = build_cli().try_get_matches_from(vec![
            "perch",
            "simulate",
            "--content",
            "wide",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(build_cli().try_get_matches_from(vec!["perch"]).is_err());
    }
}
