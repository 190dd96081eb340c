// Fixture discovery + loading error types and constants

use crate::error::{ArchiveError, ErrorCode};
use std::path::PathBuf;
use thiserror::Error;

/// Fixture error code constants
///
/// Error code range: 4001-4006
pub struct FixtureErrorCodes {}

impl FixtureErrorCodes {
    /// Directory enumeration failed
    pub const WALK: i32 = 4001;

    /// A discovered fixture file could not be read
    pub const READ: i32 = 4002;

    /// A document fixture is not a valid archive
    pub const ARCHIVE: i32 = 4003;

    /// No fixture is registered under the requested name
    pub const NOT_LOADED: i32 = 4004;

    /// The load barrier did not settle before the configured timeout
    pub const SETTLE_TIMEOUT: i32 = 4005;

    /// A load task panicked, was cancelled, or the barrier went away
    pub const TASK: i32 = 4006;
}

/// Fatal fixture setup failures.
///
/// None of these are recoverable: the first one aborts the discovery run.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to walk fixture directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture {name} is not a readable archive: {source}")]
    Archive {
        name: String,
        #[source]
        source: ArchiveError,
    },

    #[error("fixture {name} has not been loaded")]
    NotLoaded { name: String },

    #[error("fixture loading did not settle within {timeout_ms} ms ({outstanding} loads outstanding)")]
    SettleTimeout { timeout_ms: u64, outstanding: usize },

    #[error("fixture load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("load barrier dropped before settling")]
    BarrierClosed,
}

impl ErrorCode for FixtureError {
    fn code(&self) -> i32 {
        match self {
            FixtureError::Walk { .. } => FixtureErrorCodes::WALK,
            FixtureError::Read { .. } => FixtureErrorCodes::READ,
            FixtureError::Archive { .. } => FixtureErrorCodes::ARCHIVE,
            FixtureError::NotLoaded { .. } => FixtureErrorCodes::NOT_LOADED,
            FixtureError::SettleTimeout { .. } => FixtureErrorCodes::SETTLE_TIMEOUT,
            FixtureError::Task(_) | FixtureError::BarrierClosed => FixtureErrorCodes::TASK,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
