//! Accelerometer measurement noise.
//!
//! Independent zero-mean Gaussian noise per axis. A non-zero seed makes runs
//! reproducible.

use crate::error::{Error, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

/// Per-axis white noise source (m/s²).
#[derive(Clone)]
pub struct AxisNoise {
    rng: SmallRng,
    /// `None` for a noiseless sensor
    normal: Option<Normal<f32>>,
}

impl AxisNoise {
    /// Noise with standard deviation `stddev`. Seed 0 draws from entropy.
    pub fn new(seed: u64, stddev: f32) -> Result<Self> {
        if !stddev.is_finite() || stddev < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "noise stddev must be finite and non-negative, got {}",
                stddev
            )));
        }
        let rng = match seed {
            0 => SmallRng::from_entropy(),
            s => SmallRng::seed_from_u64(s),
        };
        let normal = if stddev == 0.0 {
            None
        } else {
            let normal = Normal::new(0.0, stddev).map_err(|e| {
                Error::InvalidParameter(format!("noise stddev {}: {}", stddev, e))
            })?;
            Some(normal)
        };
        Ok(Self { rng, normal })
    }

    pub fn stddev(&self) -> f32 {
        self.normal.map_or(0.0, |n| n.std_dev())
    }

    /// Add a fresh draw to every axis.
    pub fn apply<const N: usize>(&mut self, mut values: [f32; N]) -> [f32; N] {
        if let Some(normal) = self.normal {
            for v in values.iter_mut() {
                *v += self.rng.sample(normal);
            }
        }
        values
    }
}
