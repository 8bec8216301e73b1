//! Density estimation over paragraph positions

pub mod estimator;
pub mod kde;

pub use estimator::{DatasetCoverage, EstimatorBundle, FORMAT_VERSION};
pub use kde::{Kernel, KernelDensity, DEFAULT_BANDWIDTH};
