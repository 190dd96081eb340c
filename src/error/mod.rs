// Error types for the fixture harness
//
// Every failure the harness can surface carries a stable numeric code plus a
// human-readable message so test reports and the CLI can pattern-match the
// failure kind without parsing strings.

mod archive;
mod assertion;
mod comparison;
mod fixture;
mod golden;

pub use archive::{ArchiveError, ArchiveErrorCodes};
pub use assertion::{AssertionError, AssertionErrorCodes};
pub use comparison::{ComparisonFailure, ComparisonFailureCodes};
pub use fixture::{FixtureError, FixtureErrorCodes};
pub use golden::{GoldenError, GoldenErrorCodes};

use log::error;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the harness and the CLI.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Log a harness error with structured context
///
/// Emits the error code, the component it originated from and the caller's
/// context in one line. Never panics.
pub fn log_error<E: ErrorCode>(err: &E, component: &str, context: &str) {
    error!(
        "Harness error in {}: code={}, component={}, message={}",
        context,
        err.code(),
        component,
        err.message()
    );
}
