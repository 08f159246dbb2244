//! Computational core of a peer-assessment activity.
//!
//! - [`aggregators`] turns per-reviewer grade observations into aggregate
//!   grades and a minimal-diff persistence decision.
//! - [`filetypes`] validates uploaded file names against a typed extension list.
//! - [`arithmetic`] holds the weight helpers both rely on.

pub mod aggregators;
pub mod arithmetic;
pub mod config;
pub mod error;
pub mod filetypes;
pub mod grade;
pub mod output;
pub mod parser;

pub use error::{GradingError, Result};
pub use grade::Grade;
