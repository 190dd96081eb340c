// Error-equality assertion failures

use crate::error::ErrorCode;
use thiserror::Error;

/// Assertion error code constants
///
/// Error code range: 5001-5003
pub struct AssertionErrorCodes {}

impl AssertionErrorCodes {
    /// The closure under test returned successfully
    pub const NO_ERROR_RAISED: i32 = 5001;

    /// The raised error lacks a required diagnostic field
    pub const SHAPE_MISMATCH: i32 = 5002;

    /// The canonical records differ
    pub const MISMATCH: i32 = 5003;
}

/// Failures produced while asserting on a raised error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionError {
    #[error("No error has been thrown")]
    NoErrorRaised,

    /// The actual error lacks a diagnostic field every templating error must carry.
    #[error("raised error has no valid `{field}`: {details}")]
    ShapeMismatch { field: String, details: String },

    #[error("{context}\nexpected : {expected}\nactual : {actual}")]
    Mismatch {
        context: String,
        expected: String,
        actual: String,
    },
}

impl AssertionError {
    pub(crate) fn shape(field: &str, details: impl Into<String>) -> Self {
        AssertionError::ShapeMismatch {
            field: field.to_string(),
            details: details.into(),
        }
    }

    pub(crate) fn mismatch(
        context: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        AssertionError::Mismatch {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Stable failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AssertionError::NoErrorRaised => "NoErrorRaised",
            AssertionError::ShapeMismatch { .. } => "AssertionShapeMismatch",
            AssertionError::Mismatch { .. } => "AssertionMismatch",
        }
    }
}

impl ErrorCode for AssertionError {
    fn code(&self) -> i32 {
        match self {
            AssertionError::NoErrorRaised => AssertionErrorCodes::NO_ERROR_RAISED,
            AssertionError::ShapeMismatch { .. } => AssertionErrorCodes::SHAPE_MISMATCH,
            AssertionError::Mismatch { .. } => AssertionErrorCodes::MISMATCH,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
