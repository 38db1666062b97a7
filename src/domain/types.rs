//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during filtering/aggregation/forecasting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One cleaned transaction row from the enhanced dataset.
///
/// `amount` and `profit` are guaranteed parseable; rows with missing values
/// were dropped by the offline cleaning step and are not re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub order_date: NaiveDate,
    /// Coarse time-bucket label as stored in the dataset (e.g. `"Mar-2024"`).
    ///
    /// Filtering uses this label verbatim; the forecaster derives months from
    /// `order_date` independently.
    pub month_year: String,
    pub category: String,
    pub city: String,
    pub customer_name: String,
    pub state: String,
    pub amount: f64,
    pub profit: f64,
    pub quantity: i64,
    pub total_orders: i64,
    pub avg_order_value: Option<f64>,
}

/// A set of chosen values per filterable dimension.
///
/// An empty set for a dimension means "no filter applied" (pass-through);
/// a non-empty set keeps only records whose value belongs to it. Dimensions
/// combine with logical AND, values within a dimension with logical OR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub months: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub cities: BTreeSet<String>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty() && self.categories.is_empty() && self.cities.is_empty()
    }

    /// True iff the record satisfies every non-empty dimension constraint.
    pub fn matches(&self, record: &SaleRecord) -> bool {
        (self.months.is_empty() || self.months.contains(&record.month_year))
            && (self.categories.is_empty() || self.categories.contains(&record.category))
            && (self.cities.is_empty() || self.cities.contains(&record.city))
    }
}

/// Group-by key for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Category,
    City,
    MonthYear,
}

impl GroupKey {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            GroupKey::Category => "Category",
            GroupKey::City => "City",
            GroupKey::MonthYear => "Month-Year",
        }
    }
}

/// Numeric measure to sum during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Amount,
    Profit,
    Quantity,
}

impl Measure {
    pub fn display_name(self) -> &'static str {
        match self {
            Measure::Amount => "Amount",
            Measure::Profit => "Profit",
            Measure::Quantity => "Quantity",
        }
    }

    /// Extract the measure value from a record.
    pub fn value_of(self, record: &SaleRecord) -> f64 {
        match self {
            Measure::Amount => record.amount,
            Measure::Profit => record.profit,
            Measure::Quantity => record.quantity as f64,
        }
    }
}

/// One group's summed measure (used for rankings and charts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// Headline metrics for the current filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_orders: i64,
    /// `total_sales / total_orders`, defined as 0 when there are no orders.
    pub avg_order_value: f64,
}

/// One monthly bucket of summed sales (calendar month keyed by its first day).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: NaiveDate,
    pub total: f64,
}

/// Whether a forecast point was observed in the data or projected by the model.
///
/// Carried explicitly on every point so consumers never have to rely on the
/// positional "trailing N periods are projected" convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSource {
    Observed,
    Projected,
}

/// One point of the forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub month: NaiveDate,
    pub amount: f64,
    pub source: PointSource,
}

/// Fitted Holt (additive-trend) smoothing parameters and final state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoltModel {
    pub alpha: f64,
    pub beta: f64,
    /// Smoothed level after the last observed month.
    pub level: f64,
    /// Smoothed trend after the last observed month.
    pub trend: f64,
}

/// Fit quality diagnostics (one-step-ahead errors over the observed series).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Observed monthly series plus the projected continuation, with diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
    pub model: HoltModel,
    pub quality: FitQuality,
}

impl ForecastSeries {
    pub fn observed(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points
            .iter()
            .filter(|p| p.source == PointSource::Observed)
    }

    pub fn projected(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points
            .iter()
            .filter(|p| p.source == PointSource::Projected)
    }
}

/// Result of a forecast attempt.
///
/// `InsufficientData` is a reported, user-visible state (the original tool
/// shows a warning), not an error: it must never abort a render cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForecastOutcome {
    Forecast(ForecastSeries),
    InsufficientData { observed: usize },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub data_path: PathBuf,
    pub filters: FilterSelection,

    /// Top-N cutoff for the city ranking (the category ranking shows all).
    pub top_cities: usize,
    /// Number of preview rows printed from the filtered view.
    pub preview_rows: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
    pub export_forecast: Option<PathBuf>,
}
