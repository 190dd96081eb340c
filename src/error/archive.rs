// Archive container error types and constants

use crate::error::ErrorCode;
use thiserror::Error;

/// Archive error code constants
///
/// Error code range: 3001-3002
pub struct ArchiveErrorCodes {}

impl ArchiveErrorCodes {
    /// The zip container could not be read or written
    pub const CONTAINER: i32 = 3001;

    /// I/O failure while streaming member content
    pub const IO: i32 = 3002;
}

/// Failures reading or writing zip-packaged archives
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid zip container: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for ArchiveError {
    fn code(&self) -> i32 {
        match self {
            ArchiveError::Container(_) => ArchiveErrorCodes::CONTAINER,
            ArchiveError::Io(_) => ArchiveErrorCodes::IO,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
