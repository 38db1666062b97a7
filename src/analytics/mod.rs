//! Aggregation over the filtered view.
//!
//! Responsibilities:
//!
//! - sum a measure per distinct group key, with deterministic top-N ordering
//! - compute the headline KPIs
//! - resample daily sales onto the monthly grid the forecaster consumes

pub mod aggregate;
pub mod monthly;

pub use aggregate::*;
pub use monthly::*;
