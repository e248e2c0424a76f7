//! Batch gradient descent on a one- or two-parameter linear model, recorded step by
//! step for visualization.
//!
//! - [`Dataset`]: noiseless samples of a known line.
//! - [`cost`]: halved mean-squared-error cost and its closed-form gradient.
//! - [`GradientDescent`]: the fixed-rate, fixed-length iteration producing a
//!   trajectory and its cost trace.
//! - [`CostSurface`]: the cost sampled on a parameter lattice.
//! - [`explore`]: one request of scalars in, one [`Report`] out.
//! - [`service`]: the same over newline-delimited JSON.

pub mod config;
pub mod cost;
pub mod dataset;
pub mod descent;
pub mod error;
pub mod params;
pub mod service;
pub mod session;
pub mod surface;

pub use config::ExplorerConfig;
pub use dataset::{Dataset, Domain};
pub use descent::{Descent, GradientDescent, Step, Steps};
pub use error::{GdError, Result};
pub use params::{Line, Params, Slope};
pub use session::{explore, Exploration, Report, Request, Theta};
pub use surface::{Axis, CostSurface, Lattice};
