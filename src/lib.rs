// Document Fixture Harness
// Golden-archive comparison, fixture loading and error canonicalization for
// document templating test suites

// Module declarations
pub mod archive;
pub mod assertions;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod golden;
pub mod logging;

// Re-exports for convenience
pub use archive::{compare_archives, Archive, ArchiveDiffer, ArchiveMember, CompareOptions};
pub use assertions::{canonicalize, expect_to_throw, wrap_multi_error, CanonicalError, RaisedError};
pub use config::HarnessConfig;
pub use error::{AssertionError, ComparisonFailure, ErrorCode, FixtureError, GoldenError};
pub use fixtures::{FixtureLoader, FixtureSet, LoadBarrier};
pub use golden::{DiagnosticStore, GoldenComparator};
