//! Shared "render cycle" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> filter -> KPIs/aggregates -> monthly resample -> forecast
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! The dataset is loaded once per session; each filter change recomputes the
//! whole cycle synchronously from the in-memory records.

use crate::analytics::{compute_kpis, monthly_sales, sum_by, top_n};
use crate::domain::{
    ForecastOutcome, GroupKey, GroupTotal, Kpis, Measure, MonthlyTotal, ReportConfig, SaleRecord,
};
use crate::error::AppError;
use crate::filter::filter_records;
use crate::forecast::forecast_monthly;
use crate::io::ingest::{load_dataset, Dataset};

/// All computed outputs of a single render cycle.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The filtered view (owned snapshot for this cycle).
    pub view: Vec<SaleRecord>,
    pub kpis: Kpis,
    /// Monthly sales trend over the view, chronological and zero-filled.
    pub monthly: Vec<MonthlyTotal>,
    /// All categories ranked by summed sales.
    pub top_categories: Vec<GroupTotal>,
    /// Top-N cities ranked by summed sales.
    pub top_cities: Vec<GroupTotal>,
    pub forecast: ForecastOutcome,
}

/// Load the dataset for a session.
pub fn load_session(config: &ReportConfig) -> Result<Dataset, AppError> {
    load_dataset(&config.data_path)
}

/// Execute one full render cycle over an already-loaded dataset.
pub fn run_cycle(dataset: &Dataset, config: &ReportConfig) -> Result<RunOutput, AppError> {
    let view = filter_records(&dataset.records, &config.filters);

    let kpis = compute_kpis(&view);
    let monthly = monthly_sales(&view);
    let top_categories = sum_by(&view, GroupKey::Category, Measure::Amount);
    let top_cities = top_n(sum_by(&view, GroupKey::City, Measure::Amount), config.top_cities);
    let forecast = forecast_monthly(&monthly)?;

    Ok(RunOutput {
        view,
        kpis,
        monthly,
        top_categories,
        top_cities,
        forecast,
    })
}
