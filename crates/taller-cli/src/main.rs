// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod report;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use report::{ReportRequest, parse_view, run_report};
use runtime::ApiRuntime;
use std::env;
use std::io;
use std::path::PathBuf;
use taller_api::Client;
use taller_app::{AppState, PresentContext, ShopClock, ViewKind};
use taller_testkit::{FixtureSource, MockApi, ShopFaker};
use time::UtcOffset;
use tracing::{info, warn};

const DEMO_SEED: u64 = 20_260_515;
const DEMO_ROWS_PER_VIEW: usize = 24;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Only readable while the process is single-threaded.
    let local_offset = UtcOffset::current_local_offset().ok();
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `taller --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    let log_path = logging::initialize(config.log_level())?;
    info!(
        config = %options.config_path.display(),
        log = %log_path.display(),
        demo = options.demo,
        "starting"
    );

    let clock = shop_clock(config.utc_offset()?, local_offset);
    let today = clock.today();
    info!(offset = ?clock.offset(), %today, "shop clock");
    let mut context = PresentContext::new(config.locale(), today);
    context.expiring_days = config.expiring_days();

    // Keeps the demo server alive for the whole session.
    let demo_api = if options.demo {
        let mut faker = ShopFaker::new(DEMO_SEED).with_today(today);
        let source = FixtureSource::demo(&mut faker, DEMO_ROWS_PER_VIEW)?;
        Some(MockApi::start(source).context("start demo backend")?)
    } else {
        None
    };
    let base_url = match &demo_api {
        Some(api) => api.base_url(),
        None => config.api_base_url().to_owned(),
    };

    let client = Client::new(&base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        return client.ping().context(
            "backend check failed -- start the server or set [api].base_url, then retry",
        );
    }

    if let Some(view) = options.report {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        return run_report(&client, view, &options.report_request, &context, &mut out);
    }

    let mut state = AppState {
        active_view: config.start_view(),
        ..AppState::default()
    };
    let mut runtime = ApiRuntime::new(client, clock);
    taller_tui::run_app(&mut state, &mut runtime, context)
}

/// Configured offset first, then the system's, then UTC.
fn shop_clock(configured: Option<UtcOffset>, local: Option<UtcOffset>) -> ShopClock {
    let offset = configured.or(local).unwrap_or_else(|| {
        warn!("system UTC offset unavailable and [ui].utc_offset unset; using UTC");
        UtcOffset::UTC
    });
    ShopClock::new(offset)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    report: Option<ViewKind>,
    report_request: ReportRequest,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        report: None,
        report_request: ReportRequest::default(),
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--report" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--report requires a view name"))?;
                options.report = Some(parse_view(value.as_ref())?);
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--search requires a term"))?;
                options.report_request.search = Some(value.as_ref().to_owned());
            }
            "--filter" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--filter requires <field>=<value>"))?;
                let (field, selected) = value
                    .as_ref()
                    .split_once('=')
                    .filter(|(field, _)| !field.trim().is_empty())
                    .ok_or_else(|| {
                        anyhow!(
                            "--filter expects <field>=<value>, got {:?}",
                            value.as_ref()
                        )
                    })?;
                options
                    .report_request
                    .filters
                    .push((field.trim().to_owned(), selected.trim().to_owned()));
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.report.is_none() && options.report_request != ReportRequest::default() {
        return Err(anyhow!(
            "--search and --filter only apply to --report <view>; add --report and retry"
        ));
    }

    Ok(options)
}

fn print_help() {
    println!("taller");
    println!("  --config <path>            Use a specific config path");
    println!("  --print-config-path        Print resolved config path");
    println!("  --print-example-config     Print a config template");
    println!("  --demo                     Run against seeded demo data");
    println!("  --check                    Validate config and reach the backend");
    println!(
        "  --report <view>            Print one view and exit ({})",
        config::view_labels()
    );
    println!("  --search <term>            Report: free-text search");
    println!("  --filter <field>=<value>   Report: categorical filter, repeatable");
    println!("  --help                     Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args, shop_clock};
    use crate::report::ReportRequest;
    use anyhow::Result;
    use std::path::PathBuf;
    use taller_app::ViewKind;
    use time::UtcOffset;
    use time::macros::offset;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/taller-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                demo: false,
                check_only: false,
                report: None,
                report_request: ReportRequest::default(),
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for (args, needle) in [
            (vec!["--config"], "--config requires a file path"),
            (vec!["--report"], "--report requires a view name"),
            (vec!["--report", "notas", "--filter"], "--filter requires"),
        ] {
            let error = parse_cli_args(args, default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains(needle), "{error}");
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_collects_report_filters() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--report",
                "notas",
                "--search",
                "NC-",
                "--filter",
                "tipo=credito",
                "--filter",
                "estado = emitida",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.report, Some(ViewKind::AdjustmentNotes));
        assert_eq!(options.report_request.search.as_deref(), Some("NC-"));
        assert_eq!(
            options.report_request.filters,
            vec![
                ("tipo".to_owned(), "credito".to_owned()),
                ("estado".to_owned(), "emitida".to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_bad_report_input() {
        let error = parse_cli_args(vec!["--report", "ventas"], default_options_path())
            .expect_err("unknown view should fail");
        assert!(error.to_string().contains("unknown view"));

        let error = parse_cli_args(
            vec!["--report", "notas", "--filter", "credito"],
            default_options_path(),
        )
        .expect_err("filter without = should fail");
        assert!(error.to_string().contains("<field>=<value>"));

        let error = parse_cli_args(vec!["--search", "x"], default_options_path())
            .expect_err("search without report should fail");
        assert!(error.to_string().contains("only apply to --report"));
    }

    #[test]
    fn parse_cli_args_sets_print_demo_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check", "--demo"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(options.demo);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        assert!(parse_cli_args(vec!["--help"], default_options_path())?.show_help);
        assert!(parse_cli_args(vec!["-h"], default_options_path())?.show_help);
        Ok(())
    }

    #[test]
    fn shop_clock_prefers_config_then_system_offset() {
        assert_eq!(
            shop_clock(Some(offset!(-6)), Some(offset!(+2))).offset(),
            offset!(-6)
        );
        assert_eq!(shop_clock(None, Some(offset!(+2))).offset(), offset!(+2));
        assert_eq!(shop_clock(None, None).offset(), UtcOffset::UTC);
    }
}
