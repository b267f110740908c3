//! Titanic passenger EDA pipeline
//!
//! Loads the passenger dataset, fills missing values, derives features,
//! and writes a cleaned CSV plus a fixed set of descriptive plots.
//!
//! # Modules
//!
//! - [`loader`] - CSV loading and saving
//! - [`cleaning`] - Imputation and feature derivation
//! - [`plots`] - Grouped summaries rendered as PNG charts
//! - [`pipeline`] - End-to-end orchestration

pub mod error;

pub mod cleaning;
pub mod loader;
pub mod pipeline;
pub mod plots;

pub use error::{EdaError, Result};
