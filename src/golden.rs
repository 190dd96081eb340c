//! Golden-fixture comparison with on-disk failure artifacts.
//!
//! A failed comparison leaves the generated archive next to the fixture
//! directory (`<root>/../<expected name>`) so it can be opened and inspected.
//! A later successful run removes that artifact again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::archive::{Archive, ArchiveDiffer, Canonicalizer, CompareOptions, XmlCanonicalizer};
use crate::error::{log_error, GoldenError};
use crate::fixtures::FixtureSet;

/// Location of persisted failure artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticStore {
    dir: PathBuf,
}

impl DiagnosticStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Artifacts live in the parent of the fixture root.
    pub fn for_fixture_root(root: &Path) -> Self {
        Self::new(root.parent().unwrap_or(root))
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write `archive` under `name`, creating intermediate directories.
    pub fn persist(&self, name: &str, archive: &Archive) -> Result<PathBuf, GoldenError> {
        let path = self.artifact_path(name);
        let bytes = archive.to_bytes()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GoldenError::Diagnostics {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, bytes).map_err(|source| GoldenError::Diagnostics {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Remove a stale artifact. Returns whether one existed.
    pub fn discard(&self, name: &str) -> Result<bool, GoldenError> {
        let path = self.artifact_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(GoldenError::Diagnostics { path, source }),
        }
    }
}

/// Compares generated archives against loaded golden fixtures.
#[derive(Debug)]
pub struct GoldenComparator<C = XmlCanonicalizer> {
    fixtures: FixtureSet,
    differ: ArchiveDiffer<C>,
    store: DiagnosticStore,
    persist_failures: bool,
}

impl GoldenComparator<XmlCanonicalizer> {
    pub fn new(
        fixtures: FixtureSet,
        root: &Path,
        options: CompareOptions,
        persist_failures: bool,
    ) -> Self {
        Self::with_canonicalizer(fixtures, root, options, persist_failures, XmlCanonicalizer::default())
    }
}

impl<C: Canonicalizer> GoldenComparator<C> {
    pub fn with_canonicalizer(
        fixtures: FixtureSet,
        root: &Path,
        options: CompareOptions,
        persist_failures: bool,
        canonicalizer: C,
    ) -> Self {
        Self {
            fixtures,
            differ: ArchiveDiffer::new(options, canonicalizer),
            store: DiagnosticStore::for_fixture_root(root),
            persist_failures,
        }
    }

    pub fn store(&self) -> &DiagnosticStore {
        &self.store
    }

    /// Compare `actual` with the loaded fixture `expected_name`.
    ///
    /// On failure the generated archive is persisted before the failure is
    /// returned; a persistence error is logged and does not mask the
    /// comparison result.
    pub fn should_be_same(&self, actual: &Archive, expected_name: &str) -> Result<(), GoldenError> {
        let Some(expected) = self.fixtures.document(expected_name) else {
            self.persist_failure(expected_name, actual);
            return Err(GoldenError::ExpectedFixtureMissing {
                name: expected_name.to_string(),
            });
        };

        match self.differ.compare(actual, &expected.archive) {
            Ok(()) => {
                if self.store.discard(expected_name)? {
                    debug!(fixture = expected_name, "removed stale diagnostic artifact");
                }
                Ok(())
            }
            Err(failure) => {
                self.persist_failure(expected_name, actual);
                let err = GoldenError::from(failure);
                log_error(&err, "golden", expected_name);
                Err(err)
            }
        }
    }

    fn persist_failure(&self, expected_name: &str, actual: &Archive) {
        if !self.persist_failures {
            return;
        }
        match self.store.persist(expected_name, actual) {
            Ok(path) => warn!(
                fixture = expected_name,
                artifact = %path.display(),
                "generated archive rejected; artifact written"
            ),
            Err(err) => log_error(&err, "golden", "persisting diagnostic artifact"),
        }
    }
}
