//! Input/output helpers.
//!
//! - dataset CSV ingest + validation (`ingest`)
//! - filtered-view CSV and forecast JSON exports (`export`)
//! - offline raw-CSV cleaning (`clean`)

pub mod clean;
pub mod export;
pub mod ingest;

pub use clean::*;
pub use export::*;
pub use ingest::*;
