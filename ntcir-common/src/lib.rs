//! # NTCIR Density Common Library
//!
//! Shared code for the density estimator crates:
//! - Error taxonomy
//! - Run configuration and dataset labels

pub mod config;
pub mod error;

pub use config::{Dataset, JudgementSource, RunConfig};
pub use error::{Error, Result};
