use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{dataset::Domain, descent::GradientDescent, surface::Axis, GdError, Result};

/// Presentation defaults shared by every request.
///
/// Deserialized from JSON; omitted fields keep their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorerConfig {
    /// Number of generated samples m.
    pub samples: usize,
    /// Interval the sample inputs span.
    pub domain: Domain,
    /// θ1 values of the one-parameter cost curve.
    pub slope_axis: Axis,
    /// θ0 values of the two-parameter cost surface.
    pub intercept_axis: Axis,
    /// θ1 values of the two-parameter cost surface.
    pub line_slope_axis: Axis,
    /// Whether reports carry a cost surface unless a request says otherwise.
    pub surface: bool,
    /// Largest iteration count a request may ask for.
    pub max_iterations: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            samples: 20,
            domain: Domain::UNIT,
            slope_axis: Axis {
                lo: -0.2,
                hi: 1.2,
                points: 50,
            },
            intercept_axis: Axis {
                lo: -4.0,
                hi: 4.0,
                points: 101,
            },
            line_slope_axis: Axis {
                lo: -5.0,
                hi: 5.0,
                points: 101,
            },
            surface: true,
            max_iterations: 10_000,
        }
    }
}

impl ExplorerConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// Returns `GdError::Json` for malformed documents or unknown fields, and the
    /// validation error otherwise.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the JSON file at `path`.
    ///
    /// # Errors
    /// Returns `GdError::Io` if the file cannot be opened, otherwise as
    /// [`ExplorerConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<()> {
        if self.samples < 2 {
            return Err(GdError::TooFewSamples { got: self.samples });
        }
        if self.max_iterations == 0 {
            return Err(GdError::NoIterations);
        }
        if self.max_iterations > GradientDescent::MAX_ITERATIONS {
            return Err(GdError::TooManyIterations {
                got: self.max_iterations,
                max: GradientDescent::MAX_ITERATIONS,
            });
        }
        self.domain.validate()?;
        self.slope_axis.check("slope_axis")?;
        self.intercept_axis.check("intercept_axis")?;
        self.line_slope_axis.check("line_slope_axis")
    }

    pub fn line_lattice(&self) -> [Axis; 2] {
        [self.intercept_axis, self.line_slope_axis]
    }
}
