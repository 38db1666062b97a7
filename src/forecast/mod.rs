//! Forecast orchestration.
//!
//! Responsibilities:
//!
//! - generate the (α, β) smoothing-parameter grid
//! - evaluate each candidate independently (parallel)
//! - select the minimum-SSE candidate deterministically
//! - project exactly three future months, tagged `Projected`

use rayon::prelude::*;

use crate::domain::{ForecastOutcome, ForecastPoint, ForecastSeries, MonthlyTotal, PointSource};
use crate::error::AppError;

pub mod grid;
pub mod holt;

pub use grid::*;
pub use holt::*;

/// Number of future months projected, matching the dashboard's fixed horizon.
pub const HORIZON: usize = 3;

/// Parameter-grid bounds and resolution.
///
/// 19 steps over [0.05, 0.95] per parameter gives 361 candidates, cheap
/// enough to re-fit on every filter change.
const PARAM_MIN: f64 = 0.05;
const PARAM_MAX: f64 = 0.95;
const PARAM_STEPS: usize = 19;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    fit: HoltFit,
}

/// Fit the monthly series and project the next [`HORIZON`] months.
///
/// Fewer than 2 monthly points is the user-visible `InsufficientData` state;
/// it is part of the normal outcome space, not an error.
pub fn forecast_monthly(series: &[MonthlyTotal]) -> Result<ForecastOutcome, AppError> {
    if series.len() < 2 {
        return Ok(ForecastOutcome::InsufficientData {
            observed: series.len(),
        });
    }

    let y: Vec<f64> = series.iter().map(|m| m.total).collect();
    let grid = param_grid(PARAM_MIN, PARAM_MAX, PARAM_STEPS)?;

    // Evaluate each (α, β) pair independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &(alpha, beta))| {
            fit_at(&y, alpha, beta).map(|fit| Candidate { idx, fit })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::new(
            4,
            "No valid smoothing-parameter candidates for the monthly series.",
        ));
    }

    // Deterministic selection: minimum SSE; break ties by original grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.fit.quality.sse < best.fit.quality.sse
            || (c.fit.quality.sse == best.fit.quality.sse && c.idx < best.idx)
        {
            best = c;
        }
    }

    let mut points: Vec<ForecastPoint> = series
        .iter()
        .map(|m| ForecastPoint {
            month: m.month,
            amount: m.total,
            source: PointSource::Observed,
        })
        .collect();

    let last_month = series[series.len() - 1].month;
    for (h, amount) in project(&best.fit.model, HORIZON).into_iter().enumerate() {
        points.push(ForecastPoint {
            month: crate::analytics::add_months(last_month, h as u32 + 1),
            amount,
            source: PointSource::Projected,
        });
    }

    Ok(ForecastOutcome::Forecast(ForecastSeries {
        points,
        model: best.fit.model,
        quality: best.fit.quality,
    }))
}
