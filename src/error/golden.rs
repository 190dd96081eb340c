// Golden-fixture comparison errors

use crate::error::{ArchiveError, ComparisonFailure, ErrorCode};
use std::path::PathBuf;
use thiserror::Error;

/// Golden comparison error code constants
///
/// Error code range: 6001-6003
pub struct GoldenErrorCodes {}

impl GoldenErrorCodes {
    /// No fixture is loaded under the expected name
    pub const EXPECTED_FIXTURE_MISSING: i32 = 6001;

    /// Diagnostic artifact could not be written or removed
    pub const DIAGNOSTICS: i32 = 6002;

    /// Generated archive could not be serialized
    pub const ARCHIVE: i32 = 6003;
}

/// Outcome of a failed golden comparison.
///
/// Member-level differences keep their own codes via [`ComparisonFailure`].
#[derive(Debug, Error)]
pub enum GoldenError {
    #[error("Expected file does not exists: {name}")]
    ExpectedFixtureMissing { name: String },

    #[error(transparent)]
    Comparison(#[from] ComparisonFailure),

    #[error("diagnostic artifact {path}: {source}")]
    Diagnostics {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize generated archive: {0}")]
    Archive(#[from] ArchiveError),
}

impl ErrorCode for GoldenError {
    fn code(&self) -> i32 {
        match self {
            GoldenError::ExpectedFixtureMissing { .. } => {
                GoldenErrorCodes::EXPECTED_FIXTURE_MISSING
            }
            GoldenError::Comparison(failure) => failure.code(),
            GoldenError::Diagnostics { .. } => GoldenErrorCodes::DIAGNOSTICS,
            GoldenError::Archive(_) => GoldenErrorCodes::ARCHIVE,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
