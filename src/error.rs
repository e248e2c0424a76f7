use std::{error::Error, fmt, io};

use tokio_util::codec::LinesCodecError;

/// The result type used across the explorer.
pub type Result<T> = std::result::Result<T, GdError>;

/// Everything that can make the explorer reject a request.
///
/// Numeric overflow during a descent is not represented here: a diverging run is a
/// valid result and its infinities and NaNs are returned as-is.
#[derive(Debug)]
pub enum GdError {
    /// The dataset needs at least two samples.
    TooFewSamples { got: usize },
    /// A scalar input is infinite or NaN.
    NonFinite { what: &'static str },
    /// The learning rate must be zero or positive.
    NegativeLearningRate(f64),
    /// A descent must record at least its starting point.
    NoIterations,
    /// More iterations than the configured limit were requested.
    TooManyIterations { got: usize, max: usize },
    /// A closed interval is empty or reversed.
    InvalidRange {
        what: &'static str,
        lo: f64,
        hi: f64,
    },
    /// A lattice axis needs at least two points.
    TooFewPoints { what: &'static str, got: usize },
    /// Two parameter vectors of different arity were mixed.
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A request or configuration document could not be decoded.
    Json(serde_json::Error),
    Io(io::Error),
}

impl GdError {
    /// Returns `true` for rejections caused by the caller's input, as opposed to
    /// failures of the surrounding I/O.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, GdError::Io(_))
    }
}

impl fmt::Display for GdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GdError::TooFewSamples { got } => {
                write!(f, "invalid input: need at least 2 samples, got {got}")
            }
            GdError::NonFinite { what } => write!(f, "invalid input: {what} is not finite"),
            GdError::NegativeLearningRate(lr) => {
                write!(f, "invalid input: learning rate must be >= 0, got {lr}")
            }
            GdError::NoIterations => write!(f, "invalid input: iterations must be >= 1"),
            GdError::TooManyIterations { got, max } => {
                write!(f, "invalid input: iterations must be <= {max}, got {got}")
            }
            GdError::InvalidRange { what, lo, hi } => {
                write!(f, "invalid input: {what} [{lo}, {hi}] is not an increasing range")
            }
            GdError::TooFewPoints { what, got } => {
                write!(f, "invalid input: {what} needs at least 2 points, got {got}")
            }
            GdError::DimensionMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "invalid input: {what} has {got} parameter(s), expected {expected}"
            ),
            GdError::Json(e) => write!(f, "invalid json: {e}"),
            GdError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for GdError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GdError::Json(e) => Some(e),
            GdError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for GdError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for GdError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<LinesCodecError> for GdError {
    fn from(value: LinesCodecError) -> Self {
        match value {
            LinesCodecError::Io(e) => Self::Io(e),
            other => Self::Io(io::Error::new(io::ErrorKind::InvalidData, other)),
        }
    }
}
