use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// A point in the parameter space of a linear hypothesis.
///
/// Implementors are plain `Copy` vectors of `f64`. Everything the cost evaluator and
/// the descent need is expressed through these few operations, so both model
/// variants share one implementation of the core.
pub trait Params: Copy + Debug + PartialEq + Send + Sync + 'static {
    /// Number of free parameters.
    const DIM: usize;

    /// The origin of the parameter space.
    fn zero() -> Self;

    /// Evaluates the hypothesis `h_θ(x)`.
    fn predict(&self, x: f64) -> f64;

    /// Partial derivatives of the hypothesis with respect to each parameter at `x`.
    ///
    /// The hypotheses are linear in their parameters, so this does not depend on θ.
    fn basis(x: f64) -> Self;

    /// `self += alpha * other`, component-wise.
    fn scaled_add(&mut self, alpha: f64, other: &Self);

    /// Applies `f` to every component.
    fn map(self, f: impl Fn(f64) -> f64) -> Self;

    fn is_finite(&self) -> bool;
}

/// One-parameter model `h(x) = θ1·x`.
///
/// Serialized as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slope(pub f64);

impl Slope {
    pub fn theta1(&self) -> f64 {
        self.0
    }
}

impl Params for Slope {
    const DIM: usize = 1;

    fn zero() -> Self {
        Self(0.0)
    }

    fn predict(&self, x: f64) -> f64 {
        self.0 * x
    }

    fn basis(x: f64) -> Self {
        Self(x)
    }

    fn scaled_add(&mut self, alpha: f64, other: &Self) {
        self.0 += alpha * other.0;
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self(f(self.0))
    }

    fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

/// Two-parameter model `h(x) = θ0 + θ1·x`.
///
/// Serialized as `[θ0, θ1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Line(pub f64, pub f64);

impl Line {
    pub fn theta0(&self) -> f64 {
        self.0
    }

    pub fn theta1(&self) -> f64 {
        self.1
    }
}

impl Params for Line {
    const DIM: usize = 2;

    fn zero() -> Self {
        Self(0.0, 0.0)
    }

    fn predict(&self, x: f64) -> f64 {
        self.0 + self.1 * x
    }

    fn basis(x: f64) -> Self {
        Self(1.0, x)
    }

    fn scaled_add(&mut self, alpha: f64, other: &Self) {
        self.0 += alpha * other.0;
        self.1 += alpha * other.1;
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self(f(self.0), f(self.1))
    }

    fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }
}
