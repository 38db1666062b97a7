//! Terminal chart rendering.
//!
//! - deterministic ASCII charts for the CLI (`ascii`)

pub mod ascii;

pub use ascii::*;
