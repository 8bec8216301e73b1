//! One-dimensional kernel density estimation
//!
//! Exact evaluation: the density at `x` is the mean of Gaussian kernels of
//! standard deviation `h` (the bandwidth) centered at each training sample:
//!
//! ```text
//! p(x) = 1/n · Σᵢ φ((x − xᵢ) / h) / h,    φ(z) = exp(−z²/2) / √(2π)
//! ```

use ntcir_common::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Bandwidth used for both position densities
pub const DEFAULT_BANDWIDTH: f64 = 0.05;

/// Kernel shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Gaussian,
}

impl Kernel {
    /// Log of the unnormalized kernel at standardized distance `z`
    fn log_unnormalized(&self, z: f64) -> f64 {
        match self {
            Kernel::Gaussian => -0.5 * z * z,
        }
    }

    /// Log of the kernel's normalizing constant (per unit bandwidth)
    fn log_norm(&self) -> f64 {
        match self {
            Kernel::Gaussian => -0.5 * (2.0 * PI).ln(),
        }
    }
}

/// A fitted kernel density estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelDensity {
    kernel: Kernel,
    bandwidth: f64,
    samples: Vec<f64>,
}

impl KernelDensity {
    /// Fit a density on `samples`
    ///
    /// `pool` names the sample pool in the error returned when it is empty.
    pub fn fit(kernel: Kernel, bandwidth: f64, samples: Vec<f64>, pool: &str) -> Result<Self> {
        let model = Self {
            kernel,
            bandwidth,
            samples,
        };
        model.validate(pool)?;
        Ok(model)
    }

    /// Gaussian kernel, bandwidth [`DEFAULT_BANDWIDTH`]
    pub fn fit_gaussian(samples: Vec<f64>, pool: &str) -> Result<Self> {
        Self::fit(Kernel::Gaussian, DEFAULT_BANDWIDTH, samples, pool)
    }

    /// Check the model can be evaluated
    ///
    /// Also used after deserialization, since a stored model bypasses `fit`.
    pub fn validate(&self, pool: &str) -> Result<()> {
        if self.samples.is_empty() {
            return Err(Error::EmptySample(format!(
                "no {} positions to fit a density on",
                pool
            )));
        }
        if !(self.bandwidth.is_finite() && self.bandwidth > 0.0) {
            return Err(Error::InvalidInput(format!(
                "bandwidth must be positive, got {}",
                self.bandwidth
            )));
        }
        if let Some(bad) = self.samples.iter().find(|s| !s.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "{} sample {} is not finite",
                pool, bad
            )));
        }
        Ok(())
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// ln p(x), computed with log-sum-exp so far tails do not underflow to -inf
    pub fn log_density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let terms: Vec<f64> = self
            .samples
            .iter()
            .map(|s| self.kernel.log_unnormalized((x - s) / h))
            .collect();

        let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return f64::NEG_INFINITY;
        }
        let sum: f64 = terms.iter().map(|t| (t - max).exp()).sum();

        max + sum.ln() - (self.samples.len() as f64).ln() - h.ln() + self.kernel.log_norm()
    }

    /// p(x)
    pub fn density(&self, x: f64) -> f64 {
        self.log_density(x).exp()
    }

    /// ln p(x) for every query point
    pub fn score_samples(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.log_density(x)).collect()
    }

    /// Draw `n` values from the fitted density
    ///
    /// Picks a training sample uniformly and adds kernel-shaped noise. A model
    /// without training samples yields nothing.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        if self.samples.is_empty() {
            return Vec::new();
        }
        (0..n)
            .map(|_| {
                let center = self.samples[rng.gen_range(0..self.samples.len())];
                match self.kernel {
                    Kernel::Gaussian => center + self.bandwidth * standard_normal(rng),
                }
            })
            .collect()
    }
}

/// Box-Muller transform
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - U keeps the logarithm's argument in (0, 1]
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
