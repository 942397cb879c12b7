use thiserror::Error;

// ---------------------------------------------------------------------------
// ModelError – failures raised by the modelling core
// ---------------------------------------------------------------------------

/// Result alias for the modelling core.
pub type ModelResult<T> = Result<T, ModelError>;

/// Every failure the core can report. None of them is recovered internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A coefficient or dataset array does not have the 3 / 3×3 / 3×3×N shape.
    #[error("shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: String,
        expected: String,
        got: String,
    },

    /// A stimulus level outside the valid domain reached the power law.
    #[error("stimulus level {level} at index {index} is outside the valid domain (exponent {exponent})")]
    Domain {
        index: usize,
        level: f64,
        exponent: f64,
    },

    /// A textual field could not be converted to a number.
    #[error("line {line}, field {field}: '{text}' is not a number")]
    Parse {
        line: usize,
        field: usize,
        text: String,
    },

    /// Equality tolerance must be finite and non-negative.
    #[error("invalid equality tolerance {0}")]
    InvalidTolerance(f64),
}

impl ModelError {
    pub(crate) fn shape(
        what: impl Into<String>,
        expected: impl ToString,
        got: impl ToString,
    ) -> Self {
        ModelError::ShapeMismatch {
            what: what.into(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}
