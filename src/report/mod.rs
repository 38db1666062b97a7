//! Reporting: formatted terminal output for the dashboard and forecast views.
//!
//! We keep formatting code in one place so:
//! - the filtering/aggregation/forecast code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
