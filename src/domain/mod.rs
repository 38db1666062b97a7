//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the normalized transaction row (`SaleRecord`)
//! - filter state (`FilterSelection`)
//! - aggregation inputs/outputs (`GroupKey`, `Measure`, `GroupTotal`, `Kpis`)
//! - forecast outputs (`ForecastSeries`, `ForecastOutcome`, etc.)

pub mod types;

pub use types::*;
