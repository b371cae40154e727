//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the logger
//! - parses CLI arguments
//! - reads the history CSV
//! - runs the forecast pipeline
//! - prints the summary and writes optional exports

use clap::Parser;

use crate::cli::{Command, ForecastArgs, SampleArgs};
use crate::data::{SampleSpec, generate_history};
use crate::domain::ForecastConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `salescast` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is fine; everything has a default or a flag.
    dotenvy::dotenv().ok();
    init_logging();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_logging() {
    // `try_init` so a second call (tests, embedding) does not panic.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let rows = crate::io::ingest::load_observations(&args.input)?;
    let run = pipeline::run_forecast_raw(&rows, &config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    println!("{}", crate::report::format_month_table(&run.series));

    // Exports only happen for a completed run.
    if let Some(path) = &args.export {
        crate::io::export::write_forecast_csv(path, &run.series)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_forecast_json(path, &run.series)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let spec = SampleSpec {
        start: args.start,
        end: args.end,
        seed: args.seed,
        base_checks: args.checks,
        base_avg_check: args.avg_check,
        ..SampleSpec::default()
    };
    let rows = generate_history(&spec)?;
    crate::io::export::write_history_csv(&args.out, &rows)?;
    println!(
        "Wrote {} days ({}..{}) to {}",
        rows.len(),
        spec.start,
        spec.end,
        args.out.display()
    );
    Ok(())
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        granularity: args.granularity,
        strategy: args.model,
        forecast_year: args.year,
        base_year: args.base_year,
        fifteenth: args.fifteenth,
        iqr_multiplier: args.iqr_k,
        avg_check_min: args.avg_check_min,
        avg_check_max: args.avg_check_max,
        floor_multiplier: args.floor,
        ..ForecastConfig::default()
    }
}

/// Rewrite argv so bare flags default to `salescast forecast`.
///
/// Rules:
/// - `salescast --input h.csv ...`    -> `salescast forecast --input h.csv ...`
/// - `salescast --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `salescast`                      -> unchanged (clap prints usage)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "forecast".to_string());
    }
    argv
}
