//! Halved mean-squared-error cost of a linear hypothesis and its analytic gradient.
//!
//! `J(θ) = (1/2m)·Σ(h_θ(x_i) − y_i)²`
//!
//! `∂J/∂θ_k = (1/m)·Σ(h_θ(x_i) − y_i)·∂h/∂θ_k(x_i)`

use ndarray::{Array, ArrayView, Dimension};

use crate::{dataset::Dataset, params::Params};

/// Cost of `theta` on `dataset`.
pub fn cost<P: Params>(theta: &P, dataset: &Dataset) -> f64 {
    let squared: f64 = dataset
        .samples()
        .map(|(x, y)| {
            let r = theta.predict(x) - y;
            r * r
        })
        .sum();

    squared / (2.0 * dataset.len() as f64)
}

/// Closed-form gradient of the cost at `theta`.
pub fn gradient<P: Params>(theta: &P, dataset: &Dataset) -> P {
    let m = dataset.len() as f64;
    let mut grad = P::zero();

    for (x, y) in dataset.samples() {
        grad.scaled_add(theta.predict(x) - y, &P::basis(x));
    }

    grad.map(|g| g / m)
}

/// Cost of every parameter vector in `thetas`, keeping the input's shape.
///
/// Each entry goes through [`cost`], so a lattice entry and a single-point
/// evaluation at the same coordinates are bit-identical.
pub fn costs<P, D>(thetas: ArrayView<'_, P, D>, dataset: &Dataset) -> Array<f64, D>
where
    P: Params,
    D: Dimension,
{
    thetas.map(|theta| cost(theta, dataset))
}
