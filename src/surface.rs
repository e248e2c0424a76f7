use ndarray::{Array, Array1, Array2, Dimension, Ix1, Ix2};
use serde::{Deserialize, Serialize};

use crate::{
    cost,
    dataset::Dataset,
    params::{Line, Params, Slope},
    GdError, Result,
};

/// Evenly spaced parameter values `lo..=hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub lo: f64,
    pub hi: f64,
    pub points: usize,
}

impl Axis {
    /// # Errors
    /// Returns `GdError` unless the axis passes [`Axis::check`].
    pub fn new(lo: f64, hi: f64, points: usize) -> Result<Self> {
        let axis = Self { lo, hi, points };
        axis.check("axis")?;
        Ok(axis)
    }

    /// Validates the axis, naming it `what` in the error.
    ///
    /// # Errors
    /// Returns `GdError::InvalidRange` for non-finite or non-increasing bounds and
    /// `GdError::TooFewPoints` for fewer than two points.
    pub fn check(&self, what: &'static str) -> Result<()> {
        if !(self.lo.is_finite() && self.hi.is_finite() && self.lo < self.hi) {
            return Err(GdError::InvalidRange {
                what,
                lo: self.lo,
                hi: self.hi,
            });
        }
        if self.points < 2 {
            return Err(GdError::TooFewPoints {
                what,
                got: self.points,
            });
        }
        Ok(())
    }

    pub fn values(&self) -> Array1<f64> {
        Array1::linspace(self.lo, self.hi, self.points)
    }
}

/// A regular grid of parameter vectors.
pub trait Lattice {
    type Params: Params;
    type Dim: Dimension;

    /// # Errors
    /// Returns `GdError` if any axis is invalid.
    fn validate(&self) -> Result<()>;

    /// The sampled values along each axis, in axis order.
    fn axes(&self) -> Vec<Array1<f64>>;

    /// Every lattice point, laid out so that index `k` runs along axis `k`.
    fn points(&self) -> Array<Self::Params, Self::Dim>;
}

impl Lattice for Axis {
    type Params = Slope;
    type Dim = Ix1;

    fn validate(&self) -> Result<()> {
        self.check("theta1 axis")
    }

    fn axes(&self) -> Vec<Array1<f64>> {
        vec![self.values()]
    }

    fn points(&self) -> Array1<Slope> {
        self.values().mapv(Slope)
    }
}

impl Lattice for [Axis; 2] {
    type Params = Line;
    type Dim = Ix2;

    fn validate(&self) -> Result<()> {
        self[0].check("theta0 axis")?;
        self[1].check("theta1 axis")
    }

    fn axes(&self) -> Vec<Array1<f64>> {
        self.iter().map(Axis::values).collect()
    }

    fn points(&self) -> Array2<Line> {
        let theta0 = self[0].values();
        let theta1 = self[1].values();
        Array2::from_shape_fn((theta0.len(), theta1.len()), |(i, j)| {
            Line(theta0[i], theta1[j])
        })
    }
}

/// Cost sampled on a lattice, ready to be drawn as a curve or a contour map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSurface<D: Dimension> {
    axes: Vec<Array1<f64>>,
    costs: Array<f64, D>,
}

impl<D: Dimension> CostSurface<D> {
    /// Evaluates the cost at every point of `lattice`.
    ///
    /// # Errors
    /// Returns `GdError` if the lattice is invalid.
    pub fn build<L>(lattice: &L, dataset: &Dataset) -> Result<Self>
    where
        L: Lattice<Dim = D>,
    {
        lattice.validate()?;
        let points = lattice.points();
        let costs = cost::costs(points.view(), dataset);
        log::debug!("evaluated cost surface of shape {:?}", costs.shape());

        Ok(Self {
            axes: lattice.axes(),
            costs,
        })
    }

    pub fn axes(&self) -> &[Array1<f64>] {
        &self.axes
    }

    pub fn costs(&self) -> &Array<f64, D> {
        &self.costs
    }

    /// Index and value of the smallest finite cost on the lattice.
    pub fn argmin(&self) -> Option<(D::Pattern, f64)> {
        self.costs
            .indexed_iter()
            .filter(|(_, c)| c.is_finite())
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, c)| (idx, *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Domain;

    #[test]
    fn axis_rejects_bad_bounds_and_counts() {
        assert!(Axis::new(-1.0, 1.0, 2).is_ok());
        assert!(matches!(
            Axis::new(1.0, -1.0, 10),
            Err(GdError::InvalidRange { what: "axis", .. })
        ));
        assert!(matches!(
            Axis::new(f64::NAN, 1.0, 10),
            Err(GdError::InvalidRange { .. })
        ));
        assert!(matches!(
            Axis::new(-1.0, 1.0, 1),
            Err(GdError::TooFewPoints { got: 1, .. })
        ));
    }

    #[test]
    fn axis_values_include_both_ends() {
        let values = Axis::new(-4.0, 4.0, 101).unwrap().values();
        assert_eq!(values.len(), 101);
        assert_eq!(values[0], -4.0);
        assert!((values[100] - 4.0).abs() < 1e-12);
        assert!((values[50]).abs() < 1e-12);
    }

    #[test]
    fn line_lattice_runs_theta0_along_rows() {
        let lattice = [Axis::new(0.0, 1.0, 3).unwrap(), Axis::new(10.0, 20.0, 2).unwrap()];
        let points = lattice.points();

        assert_eq!(points.dim(), (3, 2));
        assert_eq!(points[[0, 0]], Line(0.0, 10.0));
        assert_eq!(points[[2, 1]], Line(1.0, 20.0));
        assert_eq!(lattice.axes().len(), 2);
    }

    #[test]
    fn grid_entries_equal_pointwise_costs() {
        let data = Dataset::generate(20, Domain::UNIT, &Line(2.0, 2.0)).unwrap();
        let lattice = [
            Axis::new(-4.0, 4.0, 101).unwrap(),
            Axis::new(-5.0, 5.0, 101).unwrap(),
        ];
        let surface = CostSurface::build(&lattice, &data).unwrap();
        let (theta0, theta1) = (&surface.axes()[0], &surface.axes()[1]);

        assert_eq!(surface.costs().dim(), (101, 101));
        for ((i, j), c) in surface.costs().indexed_iter() {
            assert_eq!(*c, cost::cost(&Line(theta0[i], theta1[j]), &data));
        }
    }

    #[test]
    fn slope_curve_equals_pointwise_costs() {
        let data = Dataset::generate(20, Domain::UNIT, &Slope(0.5)).unwrap();
        let axis = Axis::new(-0.2, 1.2, 50).unwrap();
        let curve = CostSurface::build(&axis, &data).unwrap();

        assert_eq!(curve.costs().len(), 50);
        for (theta1, c) in curve.axes()[0].iter().zip(curve.costs()) {
            assert_eq!(*c, cost::cost(&Slope(*theta1), &data));
        }
    }

    #[test]
    fn argmin_lands_on_the_true_parameters() {
        let data = Dataset::generate(20, Domain::UNIT, &Line(2.0, 2.0)).unwrap();
        let lattice = [
            Axis::new(-4.0, 4.0, 101).unwrap(),
            Axis::new(-5.0, 5.0, 101).unwrap(),
        ];
        let surface = CostSurface::build(&lattice, &data).unwrap();

        let ((i, j), c) = surface.argmin().unwrap();
        assert_eq!((i, j), (75, 70));
        assert!(c < 1e-12);
    }

    #[test]
    fn invalid_lattice_is_rejected_before_evaluation() {
        let data = Dataset::generate(20, Domain::UNIT, &Line(2.0, 2.0)).unwrap();
        let lattice = [Axis { lo: 0.0, hi: 1.0, points: 5 }, Axis { lo: 0.0, hi: 1.0, points: 0 }];

        assert!(matches!(
            CostSurface::build(&lattice, &data),
            Err(GdError::TooFewPoints { what: "theta1 axis", got: 0 })
        ));
    }
}
