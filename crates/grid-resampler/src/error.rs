//! Error types for grid resampling.

use thiserror::Error;

/// Errors that can occur while resampling provider grids.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResamplerError {
    /// Spatial resolution is zero, negative or not finite.
    #[error("invalid resolution: {0} degrees")]
    InvalidResolution(f64),

    /// Temporal interval is zero, negative or not finite.
    #[error("invalid time interval: {0} seconds")]
    InvalidInterval(f64),

    /// Raw field values do not match the length implied by its axes.
    #[error("field {field}: expected {expected} values for its axes, got {actual}")]
    ShapeMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A coordinate axis is not strictly increasing or holds non-finite values.
    #[error("axis is not strictly increasing at index {index}")]
    UnsortedAxis { index: usize },

    /// The radial basis fit for one time slice could not be solved.
    #[error("interpolation of {variable} failed at time index {time_index}: {reason}")]
    Interpolation {
        variable: String,
        time_index: usize,
        reason: String,
    },

    /// A second source tried to replace the request's target grid.
    #[error("target grid already established for this request; refusing to redefine it")]
    GridMismatch,

    /// A vector quantity arrived with only one of its two components.
    #[error("vector pair {pair} is missing component {component}")]
    MissingComponent { pair: String, component: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ResamplerError {
    /// Create an Interpolation error.
    pub fn interpolation(
        variable: impl Into<String>,
        time_index: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::Interpolation {
            variable: variable.into(),
            time_index,
            reason: reason.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Whether the error should abort the whole request rather than one variable.
    pub fn is_request_fatal(&self) -> bool {
        matches!(
            self,
            Self::GridMismatch
                | Self::InvalidResolution(_)
                | Self::InvalidInterval(_)
                | Self::Config(_)
        )
    }
}

/// Failure to fit a radial basis interpolant over one slice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// The kernel matrix is singular or numerically rank deficient.
    #[error("singular kernel matrix over {points} points")]
    Singular { points: usize },

    /// The solved weights contain NaN or infinity.
    #[error("non-finite interpolation weights over {points} points")]
    NonFinite { points: usize },

    /// The slice length does not match its lat/lon axes.
    #[error("slice has {actual} values, axes imply {expected}")]
    SliceLength { expected: usize, actual: usize },
}

/// Result type for resampler operations.
pub type Result<T> = std::result::Result<T, ResamplerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_mismatch_is_request_fatal() {
        assert!(ResamplerError::GridMismatch.is_request_fatal());
        assert!(!ResamplerError::interpolation("wave_height", 3, "singular").is_request_fatal());
    }

    #[test]
    fn test_interpolation_message() {
        let err =
            ResamplerError::interpolation("tide_height", 2, "singular kernel matrix over 1 points");
        assert_eq!(
            err.to_string(),
            "interpolation of tide_height failed at time index 2: \
             singular kernel matrix over 1 points"
        );
    }
}
