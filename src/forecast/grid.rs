//! Smoothing-parameter grid generation.
//!
//! We calibrate Holt's method with a deterministic grid search over (α, β).
//!
//! Why grid search?
//! - It avoids local minima issues common in nonlinear optimization.
//! - It is deterministic given the same inputs/flags.
//! - With two bounded parameters, a modest grid is fast enough to re-run on
//!   every filter change.

use crate::error::AppError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::input(format!(
            "Invalid parameter range: min={min}, max={max} (must be finite and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::input("Parameter steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    Ok(out)
}

/// Cartesian (α, β) grid over the open unit interval.
///
/// Both parameters stay strictly inside (0, 1): α = 0 ignores the data and
/// α = 1 degenerates to a random walk, neither of which the reference
/// optimizer would return for a series worth forecasting.
pub fn param_grid(min: f64, max: f64, steps: usize) -> Result<Vec<(f64, f64)>, AppError> {
    if !(min > 0.0 && max < 1.0) {
        return Err(AppError::input(format!(
            "Smoothing parameters must stay inside (0, 1); got [{min}, {max}]."
        )));
    }

    let values = lin_space(min, max, steps)?;
    let mut out = Vec::with_capacity(values.len() * values.len());
    for &alpha in &values {
        for &beta in &values {
            out.push((alpha, beta));
        }
    }
    Ok(out)
}
