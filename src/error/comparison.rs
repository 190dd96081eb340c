// Archive comparison failure types and constants

use crate::assertions::CanonicalError;
use crate::error::ErrorCode;
use serde_json::json;
use thiserror::Error;

/// Comparison failure code constants
///
/// Error code range: 3101-3104
pub struct ComparisonFailureCodes {}

impl ComparisonFailureCodes {
    /// A member path exists in one archive only
    pub const MISSING_MEMBER: i32 = 3101;

    /// Member names differ for the same path
    pub const NAME_MISMATCH: i32 = 3102;

    /// One side is a directory entry, the other is not
    pub const DIR_FLAG_MISMATCH: i32 = 3103;

    /// Member content differs after normalization
    pub const CONTENT_MISMATCH: i32 = 3104;
}

/// Structured failure raised by the archive differ.
///
/// Each variant carries enough context (path, archive names, both lengths)
/// to pinpoint the offending member without re-running the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonFailure {
    #[error("The file {path} doesn't exist on {archive}")]
    MissingMember { path: String, archive: String },

    #[error("Name differs for \"{path}\": \"{actual}\" != \"{expected}\"")]
    NameMismatch {
        path: String,
        actual: String,
        expected: String,
    },

    #[error("IsDir differs for \"{path}\": {actual} != {expected}")]
    DirFlagMismatch {
        path: String,
        actual: bool,
        expected: bool,
    },

    #[error("Content differs for \"{path}\" lengths: \"{actual_len}\", \"{expected_len}\"")]
    ContentMismatch {
        path: String,
        actual_archive: String,
        expected_archive: String,
        actual_len: usize,
        expected_len: usize,
        binary: bool,
    },
}

impl ComparisonFailure {
    /// Stable failure kind, used as the `name` of the structured record.
    pub fn kind(&self) -> &'static str {
        match self {
            ComparisonFailure::MissingMember { .. } => "MissingMember",
            ComparisonFailure::NameMismatch { .. } => "NameMismatch",
            ComparisonFailure::DirFlagMismatch { .. } => "DirFlagMismatch",
            ComparisonFailure::ContentMismatch { .. } => "ContentMismatch",
        }
    }

    /// Member path the failure refers to.
    pub fn path(&self) -> &str {
        match self {
            ComparisonFailure::MissingMember { path, .. }
            | ComparisonFailure::NameMismatch { path, .. }
            | ComparisonFailure::DirFlagMismatch { path, .. }
            | ComparisonFailure::ContentMismatch { path, .. } => path,
        }
    }

    /// Render as a `{name, message, properties}` record.
    pub fn to_record(&self) -> CanonicalError {
        let properties = match self {
            ComparisonFailure::MissingMember { path, archive } => json!({
                "id": "missing_member",
                "path": path,
                "archive": archive,
            }),
            ComparisonFailure::NameMismatch {
                path,
                actual,
                expected,
            } => json!({
                "id": "name_mismatch",
                "path": path,
                "actual": actual,
                "expected": expected,
            }),
            ComparisonFailure::DirFlagMismatch {
                path,
                actual,
                expected,
            } => json!({
                "id": "dir_flag_mismatch",
                "path": path,
                "actual": actual,
                "expected": expected,
            }),
            ComparisonFailure::ContentMismatch {
                path,
                actual_archive,
                expected_archive,
                actual_len,
                expected_len,
                binary,
            } => json!({
                "id": "content_mismatch",
                "path": path,
                "actualArchive": actual_archive,
                "expectedArchive": expected_archive,
                "actualLength": actual_len,
                "expectedLength": expected_len,
                "binary": binary,
            }),
        };

        CanonicalError::from_value(self.kind(), self.to_string(), properties)
    }
}

impl ErrorCode for ComparisonFailure {
    fn code(&self) -> i32 {
        match self {
            ComparisonFailure::MissingMember { .. } => ComparisonFailureCodes::MISSING_MEMBER,
            ComparisonFailure::NameMismatch { .. } => ComparisonFailureCodes::NAME_MISMATCH,
            ComparisonFailure::DirFlagMismatch { .. } => ComparisonFailureCodes::DIR_FLAG_MISMATCH,
            ComparisonFailure::ContentMismatch { .. } => ComparisonFailureCodes::CONTENT_MISMATCH,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_kind_and_context() {
        let failure = ComparisonFailure::MissingMember {
            path: "word/document.xml".into(),
            archive: "expected.docx".into(),
        };
        let record = failure.to_record();
        assert_eq!(record.name, "MissingMember");
        assert_eq!(
            record.message,
            "The file word/document.xml doesn't exist on expected.docx"
        );
        assert_eq!(record.properties["path"], "word/document.xml");
        assert_eq!(record.properties["archive"], "expected.docx");
        assert_eq!(failure.code(), ComparisonFailureCodes::MISSING_MEMBER);
    }

    #[test]
    fn content_mismatch_reports_both_lengths() {
        let failure = ComparisonFailure::ContentMismatch {
            path: "word/document.xml".into(),
            actual_archive: "generated".into(),
            expected_archive: "tag-example.docx".into(),
            actual_len: 120,
            expected_len: 118,
            binary: false,
        };
        assert!(failure.message().contains("lengths: \"120\", \"118\""));
        let record = failure.to_record();
        assert_eq!(record.properties["actualLength"], 120);
        assert_eq!(record.properties["expectedLength"], 118);
    }
}
