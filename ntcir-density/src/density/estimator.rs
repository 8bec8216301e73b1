//! Estimator bundle: P(relevant), p(position) and p(position | relevant)
//!
//! The posterior of relevance at a position follows from Bayes' rule:
//!
//! ```text
//! P(relevant | position) = P(relevant) · p(position | relevant) / p(position)
//! ```

use super::kde::KernelDensity;
use crate::services::{CoverageStats, DatasetPartition};
use chrono::{DateTime, Utc};
use ntcir_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Version of the persisted bundle layout
pub const FORMAT_VERSION: u32 = 1;

/// Coverage statistics of one dataset, kept alongside the fitted models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetCoverage {
    pub label: char,
    #[serde(flatten)]
    pub stats: CoverageStats,
}

/// The fitted estimators of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorBundle {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub prior_relevant: f64,
    pub prior_density: KernelDensity,
    pub conditional_density: KernelDensity,
    #[serde(default)]
    pub coverage: Vec<DatasetCoverage>,
}

impl EstimatorBundle {
    /// Pool the partitions of every dataset and fit both densities
    ///
    /// Fails with `EmptySample` if either pool is empty across all datasets.
    pub fn fit(partitions: &[DatasetPartition]) -> Result<Self> {
        let samples_all: Vec<f64> = partitions
            .iter()
            .flat_map(|p| p.positions_all.iter().copied())
            .collect();
        let samples_relevant: Vec<f64> = partitions
            .iter()
            .flat_map(|p| p.positions_relevant.iter().copied())
            .collect();

        if samples_all.is_empty() {
            return Err(Error::EmptySample(
                "no paragraph positions found in any dataset".to_string(),
            ));
        }
        let prior_relevant = samples_relevant.len() as f64 / samples_all.len() as f64;

        info!(
            all = samples_all.len(),
            relevant = samples_relevant.len(),
            "Fitting prior p(position) density estimator"
        );
        let prior_density = KernelDensity::fit_gaussian(samples_all, "all")?;

        info!("Fitting conditional p(position | relevant) density estimator");
        let conditional_density = KernelDensity::fit_gaussian(samples_relevant, "relevant")?;

        Ok(Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            prior_relevant,
            prior_density,
            conditional_density,
            coverage: partitions
                .iter()
                .map(|p| DatasetCoverage {
                    label: p.label,
                    stats: p.coverage,
                })
                .collect(),
        })
    }

    /// P(relevant | position), clamped to [0, 1]
    ///
    /// Returns 0 where p(position) underflows to zero.
    pub fn posterior(&self, position: f64) -> f64 {
        if self.prior_density.density(position) == 0.0 {
            return 0.0;
        }
        let log_ratio = self.conditional_density.log_density(position)
            - self.prior_density.log_density(position);
        if !log_ratio.is_finite() {
            return 0.0;
        }
        (self.prior_relevant * log_ratio.exp()).clamp(0.0, 1.0)
    }

    /// Check a bundle obtained from outside `fit`
    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(Error::Serialization(format!(
                "unsupported estimator format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        if !(0.0..=1.0).contains(&self.prior_relevant) {
            return Err(Error::Serialization(format!(
                "prior_relevant {} outside [0, 1]",
                self.prior_relevant
            )));
        }
        self.prior_density.validate("all")?;
        self.conditional_density.validate("relevant")?;
        Ok(())
    }
}
