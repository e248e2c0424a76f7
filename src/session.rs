use log::{debug, info};
use ndarray::{Ix1, Ix2};
use serde::{Deserialize, Serialize};

use crate::{
    config::ExplorerConfig,
    dataset::Dataset,
    descent::GradientDescent,
    params::{Line, Params, Slope},
    surface::{CostSurface, Lattice},
    GdError, Result,
};

/// A parameter vector as sent by the presentation layer: a number or a pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Theta {
    Slope(Slope),
    Line(Line),
}

impl Theta {
    pub fn dim(&self) -> usize {
        match self {
            Theta::Slope(_) => Slope::DIM,
            Theta::Line(_) => Line::DIM,
        }
    }
}

/// The scalars behind one redraw of the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    /// Opaque tag echoed in the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub iterations: usize,
    pub learning_rate: f64,
    pub theta_true: Theta,
    pub theta_start: Theta,
    /// Overrides [`ExplorerConfig::surface`] for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<bool>,
}

impl Request {
    /// The one-parameter demo: `y = 0.5·x`, α = 1.15, 20 iterations from 0.
    pub fn slope_demo() -> Self {
        Self {
            id: None,
            iterations: 20,
            learning_rate: 1.15,
            theta_true: Theta::Slope(Slope(0.5)),
            theta_start: Theta::Slope(Slope(0.0)),
            surface: None,
        }
    }

    /// The two-parameter demo: `y = 2 + 2·x`, α = 0.7, 15 iterations from (0, 0).
    pub fn line_demo() -> Self {
        Self {
            id: None,
            iterations: 15,
            learning_rate: 0.7,
            theta_true: Theta::Line(Line(2.0, 2.0)),
            theta_start: Theta::Line(Line(0.0, 0.0)),
            surface: None,
        }
    }
}

/// Everything needed to draw one model variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exploration<P, D: ndarray::Dimension> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub trajectory: Vec<P>,
    pub costs: Vec<f64>,
    pub diverged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<CostSurface<D>>,
}

/// The answer to a [`Request`], tagged with the model it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Report {
    Slope(Exploration<Slope, Ix1>),
    Line(Exploration<Line, Ix2>),
}

impl Report {
    pub fn id(&self) -> Option<u64> {
        match self {
            Report::Slope(e) => e.id,
            Report::Line(e) => e.id,
        }
    }

    pub fn diverged(&self) -> bool {
        match self {
            Report::Slope(e) => e.diverged,
            Report::Line(e) => e.diverged,
        }
    }
}

/// Validates `request` and computes its dataset, descent and optional surface.
///
/// Each call is independent: nothing is cached or shared beyond `config`.
///
/// # Errors
/// Returns `GdError` if the configuration or any request field is invalid, if
/// `iterations` exceeds [`ExplorerConfig::max_iterations`], or if `theta_true` and
/// `theta_start` differ in arity. Nothing is computed in that case.
pub fn explore(request: &Request, config: &ExplorerConfig) -> Result<Report> {
    config.validate()?;

    match (request.theta_true, request.theta_start) {
        (Theta::Slope(truth), Theta::Slope(start)) => {
            explore_with(request, config, truth, start, &config.slope_axis).map(Report::Slope)
        }
        (Theta::Line(truth), Theta::Line(start)) => {
            explore_with(request, config, truth, start, &config.line_lattice()).map(Report::Line)
        }
        (truth, start) => Err(GdError::DimensionMismatch {
            what: "theta_start",
            got: start.dim(),
            expected: truth.dim(),
        }),
    }
}

fn explore_with<P, L>(
    request: &Request,
    config: &ExplorerConfig,
    truth: P,
    start: P,
    lattice: &L,
) -> Result<Exploration<P, L::Dim>>
where
    P: Params,
    L: Lattice<Params = P>,
{
    if request.iterations > config.max_iterations {
        return Err(GdError::TooManyIterations {
            got: request.iterations,
            max: config.max_iterations,
        });
    }
    let descent = GradientDescent::new(request.learning_rate, request.iterations)?;
    let dataset = Dataset::generate(config.samples, config.domain, &truth)?;
    debug!("request {:?}: generated {} samples of {truth:?}", request.id, dataset.len());

    let run = descent.run(&dataset, start)?;
    let diverged = run.diverged();
    let last = run.last();
    info!(
        "request {:?}: {} iteration(s), theta {:?}, cost {}",
        request.id,
        run.len(),
        last.theta,
        last.cost
    );

    let surface = if request.surface.unwrap_or(config.surface) {
        Some(CostSurface::build(lattice, &dataset)?)
    } else {
        None
    };

    let (trajectory, costs) = run.into_parts();
    Ok(Exploration {
        id: request.id,
        xs: dataset.xs().to_vec(),
        ys: dataset.ys().to_vec(),
        trajectory,
        costs,
        diverged,
        surface,
    })
}
