//! Holt's linear method (additive trend, no seasonal component).
//!
//! The recursion maintains a smoothed level `l` and trend `b`:
//!
//! ```text
//! l_t = α y_t + (1 - α)(l_{t-1} + b_{t-1})
//! b_t = β (l_t - l_{t-1}) + (1 - β) b_{t-1}
//! ŷ_{t+h} = l_t + h b_t
//! ```
//!
//! Initialization is the standard simple choice: `l_0 = y_0`,
//! `b_0 = y_1 - y_0`. The fit objective is the sum of squared one-step-ahead
//! errors over the observed series, which is what the reference exponential
//! smoothing routine minimizes by default.

use crate::domain::{FitQuality, HoltModel};

/// A calibrated model plus its fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltFit {
    pub model: HoltModel,
    pub quality: FitQuality,
}

/// Run the smoothing recursion for fixed (α, β).
///
/// Returns `None` for series shorter than 2 points or non-finite inputs;
/// callers treat that as a rejected candidate, not an error.
pub fn fit_at(y: &[f64], alpha: f64, beta: f64) -> Option<HoltFit> {
    if y.len() < 2 || y.iter().any(|v| !v.is_finite()) {
        return None;
    }
    if !(alpha > 0.0 && alpha < 1.0 && beta > 0.0 && beta < 1.0) {
        return None;
    }

    let mut level = y[0];
    let mut trend = y[1] - y[0];
    let mut sse = 0.0;

    for &obs in &y[1..] {
        let predicted = level + trend;
        let err = obs - predicted;
        sse += err * err;

        let prev_level = level;
        level = alpha * obs + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }

    if !(sse.is_finite() && level.is_finite() && trend.is_finite()) {
        return None;
    }

    // One-step errors exist for t = 1..n, i.e. n-1 of them.
    let n_err = y.len() - 1;
    Some(HoltFit {
        model: HoltModel {
            alpha,
            beta,
            level,
            trend,
        },
        quality: FitQuality {
            sse,
            rmse: (sse / n_err as f64).sqrt(),
            n: y.len(),
        },
    })
}

/// Project `horizon` future values from the fitted end state.
pub fn project(model: &HoltModel, horizon: usize) -> Vec<f64> {
    (1..=horizon)
        .map(|h| model.level + h as f64 * model.trend)
        .collect()
}
