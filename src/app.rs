//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the dataset
//! - runs the filter/aggregate/forecast cycle
//! - prints reports/plots
//! - writes optional exports

use std::collections::BTreeSet;

use clap::Parser;

use crate::cli::{CleanArgs, Command, ReportArgs};
use crate::domain::{FilterSelection, ForecastOutcome, ReportConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `pulse` binary.
pub fn run() -> Result<(), AppError> {
    // We want `pulse` and `pulse -m Jan-2024` to behave like `pulse tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Clean(args) => handle_clean(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args);
    let dataset = pipeline::load_session(&config)?;
    let run = pipeline::run_cycle(&dataset, &config)?;

    println!("{}", crate::report::format_dashboard(&dataset, &run, &config));

    if config.plot && !run.monthly.is_empty() {
        let plot = crate::plot::render_trend_plot(&run.monthly, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    write_exports(&run, &config)
}

fn handle_forecast(args: ReportArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args);
    let dataset = pipeline::load_session(&config)?;
    let run = pipeline::run_cycle(&dataset, &config)?;

    println!("{}", crate::report::format_forecast(&run.forecast));

    if config.plot {
        if let ForecastOutcome::Forecast(fc) = &run.forecast {
            let plot = crate::plot::render_series_plot(&fc.points, config.plot_width, config.plot_height);
            println!("{plot}");
        }
    }

    write_exports(&run, &config)
}

fn handle_clean(args: CleanArgs) -> Result<(), AppError> {
    let summary = crate::io::clean::clean_csv(&args.input, &args.output)?;
    println!(
        "Cleaned '{}' -> '{}': {} rows read, {} written, {} dropped, {} duplicates removed.",
        args.input.display(),
        args.output.display(),
        summary.rows_read,
        summary.rows_written,
        summary.rows_dropped,
        summary.duplicates_removed,
    );
    Ok(())
}

fn handle_tui(args: ReportArgs) -> Result<(), AppError> {
    crate::tui::run(report_config_from_args(&args))
}

fn write_exports(run: &pipeline::RunOutput, config: &ReportConfig) -> Result<(), AppError> {
    if let Some(path) = &config.export {
        crate::io::export::write_filtered_csv(path, &run.view)?;
        println!("Exported filtered view to '{}'.", path.display());
    }
    if let Some(path) = &config.export_forecast {
        match &run.forecast {
            ForecastOutcome::Forecast(fc) => {
                crate::io::export::write_forecast_json(path, fc, &config.filters)?;
                println!("Exported forecast to '{}'.", path.display());
            }
            ForecastOutcome::InsufficientData { observed } => {
                eprintln!(
                    "Skipping forecast export: insufficient data ({observed} monthly point(s))."
                );
            }
        }
    }
    Ok(())
}

pub fn report_config_from_args(args: &ReportArgs) -> ReportConfig {
    ReportConfig {
        data_path: args.data.clone(),
        filters: FilterSelection {
            months: to_set(&args.months),
            categories: to_set(&args.categories),
            cities: to_set(&args.cities),
        },
        top_cities: args.top_cities,
        preview_rows: args.preview,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export: args.export.clone(),
        export_forecast: args.export_forecast.clone(),
    }
}

fn to_set(values: &[String]) -> BTreeSet<String> {
    values.iter().map(|s| s.trim().to_string()).collect()
}

/// Rewrite argv so `pulse` defaults to `pulse tui`.
///
/// Rules:
/// - `pulse`                      -> `pulse tui`
/// - `pulse -m Jan-2024 ...`      -> `pulse tui -m Jan-2024 ...`
/// - `pulse --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "forecast" | "clean" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["pulse"])), argv(&["pulse", "tui"]));
    }

    #[test]
    fn leading_flag_is_treated_as_tui_flags() {
        assert_eq!(
            rewrite_args(argv(&["pulse", "-m", "Jan-2024"])),
            argv(&["pulse", "tui", "-m", "Jan-2024"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["pulse", "report", "-f", "data.csv"])),
            argv(&["pulse", "report", "-f", "data.csv"])
        );
        assert_eq!(rewrite_args(argv(&["pulse", "--help"])), argv(&["pulse", "--help"]));
    }

    #[test]
    fn filter_args_become_trimmed_sets() {
        let args = crate::cli::ReportArgs::parse_from([
            "pulse", "-m", " Jan-2024 ", "-m", "Feb-2024", "--city", "Karachi",
        ]);
        let config = report_config_from_args(&args);
        assert!(config.filters.months.contains("Jan-2024"));
        assert!(config.filters.months.contains("Feb-2024"));
        assert!(config.filters.cities.contains("Karachi"));
        assert!(config.filters.categories.is_empty());
    }
}
