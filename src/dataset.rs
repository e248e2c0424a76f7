use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::{params::Params, GdError, Result};

/// Closed interval the dataset inputs are spread over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub lo: f64,
    pub hi: f64,
}

impl Domain {
    /// `[-1, 1]`, the interval every demo uses.
    pub const UNIT: Domain = Domain { lo: -1.0, hi: 1.0 };

    /// # Errors
    /// Returns `GdError::InvalidRange` unless both bounds are finite and `lo < hi`.
    pub fn validate(&self) -> Result<()> {
        if self.lo.is_finite() && self.hi.is_finite() && self.lo < self.hi {
            Ok(())
        } else {
            Err(GdError::InvalidRange {
                what: "domain",
                lo: self.lo,
                hi: self.hi,
            })
        }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Noiseless samples of a known linear model.
///
/// Inputs are evenly spaced over the domain with both endpoints included, targets
/// are the true hypothesis evaluated at each input. A dataset never changes once
/// generated; a new truth means a new dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    xs: Array1<f64>,
    ys: Array1<f64>,
}

impl Dataset {
    /// Generates `samples` points of `truth` over `domain`.
    ///
    /// # Errors
    /// Returns `GdError` if `samples < 2`, the domain is invalid, or `truth` has a
    /// non-finite component.
    pub fn generate<P: Params>(samples: usize, domain: Domain, truth: &P) -> Result<Self> {
        if samples < 2 {
            return Err(GdError::TooFewSamples { got: samples });
        }
        domain.validate()?;
        if !truth.is_finite() {
            return Err(GdError::NonFinite { what: "theta_true" });
        }

        let xs = Array1::linspace(domain.lo, domain.hi, samples);
        let ys = xs.mapv(|x| truth.predict(x));
        Ok(Self { xs, ys })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always `false`: generation rejects fewer than two samples.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> ArrayView1<'_, f64> {
        self.xs.view()
    }

    pub fn ys(&self) -> ArrayView1<'_, f64> {
        self.ys.view()
    }

    /// Iterates `(x_i, y_i)` pairs in input order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// The hypothesis `theta` evaluated at every input, i.e. the fitted line.
    pub fn fit<P: Params>(&self, theta: &P) -> Array1<f64> {
        self.xs.mapv(|x| theta.predict(x))
    }
}
