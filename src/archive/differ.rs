//! Structural archive comparison.
//!
//! Members are matched by path. For every path in the union of both archives
//! the differ checks existence, name and directory flag, then content:
//! binary members byte-for-byte, markup members first on their stripped text
//! and, only when that differs, on their canonical forms. The fast path keeps
//! the pretty-printer off the common "nothing changed" case while still
//! tolerating attribute reordering and re-indentation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::archive::canonical::{CanonicalizeError, Canonicalizer, XmlCanonicalizer};
use crate::archive::{Archive, ArchiveMember};
use crate::error::ComparisonFailure;

/// Comparison knobs, loadable as part of the harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Members whose path contains one of these markers compare as raw bytes.
    pub binary_markers: Vec<String>,
    /// Characters removed from text members before comparing.
    pub stripped_chars: String,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            binary_markers: vec![".png".to_string()],
            stripped_chars: "\n\t".to_string(),
        }
    }
}

impl CompareOptions {
    pub fn is_binary(&self, path: &str) -> bool {
        self.binary_markers
            .iter()
            .any(|marker| path.contains(marker.as_str()))
    }

    pub fn strip(&self, text: &str) -> String {
        text.chars()
            .filter(|c| !self.stripped_chars.contains(*c))
            .collect()
    }
}

/// Remove newlines and tabs, the noise introduced by repackaging.
pub fn remove_spaces(text: &str) -> String {
    CompareOptions::default().strip(text)
}

/// Compare `actual` against `expected` with the bundled XML canonicalizer.
pub fn compare_archives(
    actual: &Archive,
    expected: &Archive,
    options: &CompareOptions,
) -> Result<(), ComparisonFailure> {
    ArchiveDiffer::new(options.clone(), XmlCanonicalizer::default()).compare(actual, expected)
}

/// Archive comparison with a pluggable canonicalizer.
#[derive(Debug, Clone)]
pub struct ArchiveDiffer<C = XmlCanonicalizer> {
    options: CompareOptions,
    canonicalizer: C,
}

impl Default for ArchiveDiffer<XmlCanonicalizer> {
    fn default() -> Self {
        Self::new(CompareOptions::default(), XmlCanonicalizer::default())
    }
}

impl<C: Canonicalizer> ArchiveDiffer<C> {
    pub fn new(options: CompareOptions, canonicalizer: C) -> Self {
        Self {
            options,
            canonicalizer,
        }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Stops at the first differing member.
    pub fn compare(&self, actual: &Archive, expected: &Archive) -> Result<(), ComparisonFailure> {
        let paths: BTreeSet<&str> = actual.paths().chain(expected.paths()).collect();
        trace!(
            actual = actual.name(),
            expected = expected.name(),
            members = paths.len(),
            "comparing archives"
        );

        for path in paths {
            self.compare_member(path, actual, expected)?;
        }
        Ok(())
    }

    fn compare_member(
        &self,
        path: &str,
        actual: &Archive,
        expected: &Archive,
    ) -> Result<(), ComparisonFailure> {
        let expected_member = lookup(expected, path)?;
        let actual_member = lookup(actual, path)?;

        if actual_member.name != expected_member.name {
            return Err(ComparisonFailure::NameMismatch {
                path: path.to_string(),
                actual: actual_member.name.clone(),
                expected: expected_member.name.clone(),
            });
        }
        if actual_member.dir != expected_member.dir {
            return Err(ComparisonFailure::DirFlagMismatch {
                path: path.to_string(),
                actual: actual_member.dir,
                expected: expected_member.dir,
            });
        }

        if self.options.is_binary(path) {
            let (a, e) = (actual_member.content(), expected_member.content());
            if a.len() != e.len() || a != e {
                return Err(self.content_mismatch(path, actual, expected, a.len(), e.len(), true));
            }
            return Ok(());
        }

        let actual_text = self.options.strip(&actual_member.as_text());
        let expected_text = self.options.strip(&expected_member.as_text());
        if actual_text == expected_text {
            return Ok(());
        }

        match self.canonical_eq(&actual_text, &expected_text) {
            Ok(true) => {
                debug!(path, "member matched after canonicalization");
                Ok(())
            }
            Ok(false) => Err(self.content_mismatch(
                path,
                actual,
                expected,
                actual_text.len(),
                expected_text.len(),
                false,
            )),
            Err(err) => {
                warn!(path, error = %err, "member could not be canonicalized");
                Err(self.content_mismatch(
                    path,
                    actual,
                    expected,
                    actual_text.len(),
                    expected_text.len(),
                    false,
                ))
            }
        }
    }

    fn canonical_eq(&self, actual: &str, expected: &str) -> Result<bool, CanonicalizeError> {
        Ok(self.canonicalizer.canonicalize(actual)? == self.canonicalizer.canonicalize(expected)?)
    }

    fn content_mismatch(
        &self,
        path: &str,
        actual: &Archive,
        expected: &Archive,
        actual_len: usize,
        expected_len: usize,
        binary: bool,
    ) -> ComparisonFailure {
        ComparisonFailure::ContentMismatch {
            path: path.to_string(),
            actual_archive: actual.name().to_string(),
            expected_archive: expected.name().to_string(),
            actual_len,
            expected_len,
            binary,
        }
    }
}

fn lookup<'a>(archive: &'a Archive, path: &str) -> Result<&'a ArchiveMember, ComparisonFailure> {
    archive
        .member(path)
        .ok_or_else(|| ComparisonFailure::MissingMember {
            path: path.to_string(),
            archive: archive.name().to_string(),
        })
}
