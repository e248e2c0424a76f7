use std::num::NonZeroUsize;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::{
    cost::{cost, gradient},
    dataset::Dataset,
    params::Params,
    GdError, Result,
};

/// Batch gradient descent with a fixed learning rate and a fixed iteration count.
///
/// There is no stopping criterion: a run always records exactly `iterations`
/// parameter vectors, whether the cost goes down, stalls, or blows up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescent {
    learning_rate: f64,
    iterations: NonZeroUsize,
}

impl GradientDescent {
    /// Upper bound on N accepted by [`GradientDescent::new`].
    ///
    /// A run stores every recorded point, so N also bounds its memory.
    pub const MAX_ITERATIONS: usize = 1_000_000;

    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The step multiplier α, finite and non-negative.
    /// * `iterations` - The number N of parameter vectors recorded, start included.
    ///
    /// # Errors
    /// Returns `GdError` if α is negative or not finite, or if N is zero or above
    /// [`GradientDescent::MAX_ITERATIONS`].
    pub fn new(learning_rate: f64, iterations: usize) -> Result<Self> {
        if !learning_rate.is_finite() {
            return Err(GdError::NonFinite {
                what: "learning_rate",
            });
        }
        if learning_rate < 0.0 {
            return Err(GdError::NegativeLearningRate(learning_rate));
        }
        if iterations > Self::MAX_ITERATIONS {
            return Err(GdError::TooManyIterations {
                got: iterations,
                max: Self::MAX_ITERATIONS,
            });
        }
        let iterations = NonZeroUsize::new(iterations).ok_or(GdError::NoIterations)?;

        Ok(Self {
            learning_rate,
            iterations,
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn iterations(&self) -> usize {
        self.iterations.get()
    }

    /// Unbounded sequence of descent steps starting at `start`.
    ///
    /// The first item is `start` itself; every next one is
    /// `θ − α·gradient(θ)` of its predecessor.
    ///
    /// Unlike [`GradientDescent::run`], `start` is not checked: a non-finite start
    /// yields non-finite steps, the same way an overflowing run does.
    pub fn steps<'a, P: Params>(&self, dataset: &'a Dataset, start: P) -> Steps<'a, P> {
        Steps {
            dataset,
            learning_rate: self.learning_rate,
            theta: start,
            index: 0,
        }
    }

    /// Runs the descent from `start` and records its trajectory and cost trace.
    ///
    /// # Errors
    /// Returns `GdError::NonFinite` if `start` has a non-finite component.
    pub fn run<P: Params>(&self, dataset: &Dataset, start: P) -> Result<Descent<P>> {
        if !start.is_finite() {
            return Err(GdError::NonFinite {
                what: "theta_start",
            });
        }

        debug!(
            "descending from {start:?} with lr {} for {} iteration(s)",
            self.learning_rate, self.iterations
        );

        let (trajectory, costs): (Vec<P>, Vec<f64>) = self
            .steps(dataset, start)
            .take(self.iterations.get())
            .map(|step| (step.theta, step.cost))
            .unzip();

        let descent = Descent { trajectory, costs };
        if descent.diverged() {
            warn!(
                "descent with lr {} diverged: cost {} -> {}",
                self.learning_rate,
                descent.first().cost,
                descent.last().cost
            );
        }

        Ok(descent)
    }
}

/// One recorded point of a descent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Step<P> {
    pub theta: P,
    pub cost: f64,
}

/// Iterator returned by [`GradientDescent::steps`].
#[derive(Debug, Clone)]
pub struct Steps<'a, P> {
    dataset: &'a Dataset,
    learning_rate: f64,
    theta: P,
    index: usize,
}

impl<P: Params> Iterator for Steps<'_, P> {
    type Item = Step<P>;

    fn next(&mut self) -> Option<Step<P>> {
        let theta = self.theta;
        let cost = cost(&theta, self.dataset);
        let grad = gradient(&theta, self.dataset);
        trace!("step {}: theta {theta:?}, cost {cost}, grad {grad:?}", self.index);

        self.theta.scaled_add(-self.learning_rate, &grad);
        self.index += 1;

        Some(Step { theta, cost })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// Trajectory and cost trace of a finished run, positionally aligned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descent<P> {
    trajectory: Vec<P>,
    costs: Vec<f64>,
}

impl<P: Params> Descent<P> {
    /// Parameter vectors `θ^(0) .. θ^(N-1)`.
    pub fn trajectory(&self) -> &[P] {
        &self.trajectory
    }

    /// `J(θ^(0)) .. J(θ^(N-1))`.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    /// Always `false`: a descent records at least its starting point.
    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    pub fn first(&self) -> Step<P> {
        self.step(0)
    }

    pub fn last(&self) -> Step<P> {
        self.step(self.len() - 1)
    }

    pub fn steps(&self) -> impl Iterator<Item = Step<P>> + '_ {
        self.trajectory
            .iter()
            .zip(&self.costs)
            .map(|(&theta, &cost)| Step { theta, cost })
    }

    /// Whether the run blew up: some value overflowed to infinity or NaN, or the
    /// final cost is above the starting one.
    ///
    /// Purely an observation on the recorded numbers, which are never altered.
    pub fn diverged(&self) -> bool {
        let overflowed = self.trajectory.iter().any(|t| !t.is_finite())
            || self.costs.iter().any(|c| !c.is_finite());

        overflowed || self.last().cost > self.first().cost
    }

    pub fn into_parts(self) -> (Vec<P>, Vec<f64>) {
        (self.trajectory, self.costs)
    }

    fn step(&self, index: usize) -> Step<P> {
        Step {
            theta: self.trajectory[index],
            cost: self.costs[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::Domain,
        params::{Line, Slope},
    };

    fn slope_data() -> Dataset {
        Dataset::generate(20, Domain::UNIT, &Slope(0.5)).unwrap()
    }

    #[test]
    fn records_exactly_n_points() {
        let data = slope_data();
        for n in [1, 2, 7, 100] {
            let run = GradientDescent::new(0.3, n).unwrap().run(&data, Slope(0.0)).unwrap();
            assert_eq!(run.len(), n);
            assert_eq!(run.trajectory().len(), n);
            assert_eq!(run.costs().len(), n);
        }
    }

    #[test]
    fn single_iteration_is_just_the_start() {
        let data = slope_data();
        let run = GradientDescent::new(1.0, 1).unwrap().run(&data, Slope(-0.1)).unwrap();

        assert_eq!(run.trajectory(), &[Slope(-0.1)]);
        assert_eq!(run.costs(), &[cost(&Slope(-0.1), &data)]);
        assert_eq!(run.first(), run.last());
    }

    #[test]
    fn zero_learning_rate_stays_put() {
        let data = Dataset::generate(20, Domain::UNIT, &Line(2.0, 2.0)).unwrap();
        let run = GradientDescent::new(0.0, 10).unwrap().run(&data, Line(-1.0, 3.0)).unwrap();

        assert!(run.trajectory().iter().all(|t| *t == Line(-1.0, 3.0)));
        assert!(!run.diverged());
    }

    #[test]
    fn costs_align_with_trajectory() {
        let data = slope_data();
        let run = GradientDescent::new(0.9, 12).unwrap().run(&data, Slope(1.1)).unwrap();

        assert_eq!(run.trajectory()[0], Slope(1.1));
        for step in run.steps() {
            assert_eq!(step.cost, cost(&step.theta, &data));
        }
    }

    #[test]
    fn each_step_subtracts_the_scaled_gradient() {
        let data = Dataset::generate(20, Domain::UNIT, &Line(2.0, 2.0)).unwrap();
        let lr = 0.7;
        let run = GradientDescent::new(lr, 6).unwrap().run(&data, Line(0.0, 0.0)).unwrap();

        for pair in run.trajectory().windows(2) {
            let grad = gradient(&pair[0], &data);
            let mut expected = pair[0];
            expected.scaled_add(-lr, &grad);
            assert_eq!(pair[1], expected);
        }
    }

    #[test]
    fn steps_iterator_matches_run() {
        let data = slope_data();
        let gd = GradientDescent::new(0.5, 8).unwrap();
        let run = gd.run(&data, Slope(0.0)).unwrap();
        let streamed: Vec<_> = gd.steps(&data, Slope(0.0)).take(8).collect();

        assert_eq!(streamed, run.steps().collect::<Vec<_>>());
    }

    #[test]
    fn overflow_propagates_without_error() {
        let data = Dataset::generate(20, Domain::UNIT, &Line(2.0, 2.0)).unwrap();
        let run = GradientDescent::new(1e300, 10).unwrap().run(&data, Line(0.0, 0.0)).unwrap();

        assert_eq!(run.len(), 10);
        assert!(run.trajectory().iter().any(|t| !t.is_finite()));
        assert!(run.diverged());
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(matches!(GradientDescent::new(0.1, 0), Err(GdError::NoIterations)));
        assert!(matches!(
            GradientDescent::new(-0.1, 5),
            Err(GdError::NegativeLearningRate(_))
        ));
        assert!(matches!(
            GradientDescent::new(f64::NAN, 5),
            Err(GdError::NonFinite { what: "learning_rate" })
        ));
        assert!(matches!(
            GradientDescent::new(f64::INFINITY, 5),
            Err(GdError::NonFinite { .. })
        ));

        let gd = GradientDescent::new(0.1, 5).unwrap();
        assert!(matches!(
            gd.run(&slope_data(), Slope(f64::NAN)),
            Err(GdError::NonFinite { what: "theta_start" })
        ));
    }

    #[test]
    fn iteration_count_is_bounded() {
        let max = GradientDescent::MAX_ITERATIONS;
        assert!(GradientDescent::new(0.1, max).is_ok());
        assert!(matches!(
            GradientDescent::new(0.1, max + 1),
            Err(GdError::TooManyIterations { got, .. }) if got == max + 1
        ));
        assert!(matches!(
            GradientDescent::new(0.1, usize::MAX / 4),
            Err(GdError::TooManyIterations { .. })
        ));
    }

    #[test]
    fn steps_carry_a_non_finite_start_through() {
        let data = slope_data();
        let gd = GradientDescent::new(0.1, 3).unwrap();

        let streamed: Vec<_> = gd.steps(&data, Slope(f64::INFINITY)).take(3).collect();
        assert_eq!(streamed.len(), 3);
        assert!(streamed.iter().all(|step| !step.theta.is_finite()));
        assert!(gd.run(&data, Slope(f64::INFINITY)).is_err());
    }
}
