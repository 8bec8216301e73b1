//! ntcir-density library interface
//!
//! Estimates, from NTCIR Math datasets and their relevance judgements, how
//! likely a paragraph is to be relevant given only its relative position in
//! its document:
//! - `services`: position resolution, judgement parsing, corpus walking,
//!   parallel position collection, relevance partitioning
//! - `density`: kernel density estimation and the estimator bundle
//! - `persistence`: reading and writing estimator bundles
//! - `pipeline`: the end-to-end run

pub mod density;
pub mod persistence;
pub mod pipeline;
pub mod services;

pub use density::{EstimatorBundle, KernelDensity};
pub use pipeline::{estimate, run, RunReport};
