use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{BlurError, BlurResult};

/// Side length of a square Gaussian kernel. Always odd and positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct KernelSize(u32);

impl KernelSize {
    pub fn new(size: i64) -> BlurResult<Self> {
        if size <= 0 || size % 2 == 0 {
            return Err(BlurError::invalid_kernel_size(format!(
                "{size} (must be an odd positive integer)"
            )));
        }
        let size = u32::try_from(size)
            .map_err(|_| BlurError::invalid_kernel_size(format!("{size} is too large")))?;
        Ok(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// `Hk`: how far the kernel reaches from its center in each direction.
    pub fn half_width(self) -> u32 {
        (self.0 - 1) / 2
    }

    /// Spread derived from the size: `0.3 * ((K - 1) / 2 - 1) + 0.8`.
    pub fn sigma(self) -> f64 {
        0.3 * ((f64::from(self.0) - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl TryFrom<i64> for KernelSize {
    type Error = BlurError;

    fn try_from(size: i64) -> BlurResult<Self> {
        Self::new(size)
    }
}

impl From<KernelSize> for i64 {
    fn from(size: KernelSize) -> Self {
        i64::from(size.0)
    }
}

impl FromStr for KernelSize {
    type Err = BlurError;

    fn from_str(s: &str) -> BlurResult<Self> {
        let trimmed = s.trim();
        let size: i64 = trimmed.parse().map_err(|_| {
            BlurError::invalid_kernel_size(format!("'{trimmed}' is not an integer"))
        })?;
        Self::new(size)
    }
}

impl fmt::Display for KernelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Square table of unnormalized Gaussian weights.
///
/// Weights are stored with `dx` outer and `dy` inner, so the tap at offset
/// `(dx, dy)` sits at `(dy + Hk) + (dx + Hk) * (2 * Hk + 1)`. Normalization is
/// left to the caller, which divides by [`GaussianKernel::total`].
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    half_width: i64,
    weights: Vec<f64>,
    total: f64,
}

impl GaussianKernel {
    pub fn new(size: KernelSize) -> Self {
        let hk = i64::from(size.half_width());
        let sigma = size.sigma();
        let denom = 2.0 * sigma * sigma;

        let side = (2 * hk + 1) as usize;
        let mut weights = Vec::with_capacity(side * side);
        let mut total = 0.0f64;
        for dx in -hk..=hk {
            for dy in -hk..=hk {
                let r2 = (dx * dx + dy * dy) as f64;
                let w = (-r2 / denom).exp();
                weights.push(w);
                total += w;
            }
        }

        tracing::debug!(size = size.get(), sigma, total, "built gaussian kernel");
        Self {
            half_width: hk,
            weights,
            total,
        }
    }

    pub fn half_width(&self) -> i64 {
        self.half_width
    }

    pub fn side(&self) -> usize {
        (2 * self.half_width + 1) as usize
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight at offset `(dx, dy)`. Both offsets must lie in `[-Hk, Hk]`.
    #[inline]
    pub fn weight(&self, dx: i64, dy: i64) -> f64 {
        let hk = self.half_width;
        debug_assert!(dx.abs() <= hk && dy.abs() <= hk);
        self.weights[((dy + hk) + (dx + hk) * (2 * hk + 1)) as usize]
    }
}
