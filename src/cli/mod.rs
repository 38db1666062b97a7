//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analytics/forecasting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about = "E-Commerce Sales Dashboard & Forecasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print KPIs, rankings, and a data preview for the filtered view.
    Report(ReportArgs),
    /// Print the monthly series plus a 3-month sales forecast.
    Forecast(ReportArgs),
    /// Clean a raw CSV export into the enhanced dataset.
    Clean(CleanArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same underlying pipeline as `pulse report`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(ReportArgs),
}

/// Common options for reporting, forecasting, and the TUI.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// Enhanced dataset CSV.
    #[arg(short = 'f', long, default_value = "Enhanced_ECommerce_Dataset.csv")]
    pub data: PathBuf,

    /// Keep only these month-year labels (repeatable).
    #[arg(short = 'm', long = "month")]
    pub months: Vec<String>,

    /// Keep only these categories (repeatable).
    #[arg(short = 'c', long = "category")]
    pub categories: Vec<String>,

    /// Keep only these cities (repeatable).
    #[arg(long = "city")]
    pub cities: Vec<String>,

    /// Show top-N cities by sales.
    #[arg(long, default_value_t = 10)]
    pub top_cities: usize,

    /// Number of preview rows from the filtered view.
    #[arg(long, default_value_t = 10)]
    pub preview: usize,

    /// Render an ASCII chart in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the filtered view to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the forecast (points + model diagnostics) to JSON.
    #[arg(long = "export-forecast")]
    pub export_forecast: Option<PathBuf>,
}

/// Options for the offline cleaning step.
#[derive(Debug, Parser)]
pub struct CleanArgs {
    /// Raw CSV export to clean.
    #[arg(value_name = "RAW_CSV")]
    pub input: PathBuf,

    /// Where to write the enhanced dataset.
    #[arg(short = 'o', long, default_value = "Enhanced_ECommerce_Dataset.csv")]
    pub output: PathBuf,
}
