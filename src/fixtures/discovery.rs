//! Fixture directory walking and suffix classification.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::trace;

use crate::config::FixtureConfig;
use crate::error::FixtureError;

/// How a recognized fixture is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    Document,
    Image,
}

/// Outcome of classifying a discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Some path component starts with `.`.
    Hidden,
    /// Suffix is neither a document nor an image.
    Unrecognized,
    Recognized(FixtureKind),
}

/// A file that will be loaded, with its name relative to the fixture root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFixture {
    pub name: String,
    pub path: PathBuf,
    pub kind: FixtureKind,
}

/// Suffix-based fixture classifier.
#[derive(Debug, Clone)]
pub struct FixtureClassifier {
    document_suffixes: Vec<String>,
    image_suffixes: Vec<String>,
}

impl FixtureClassifier {
    pub fn new(document_suffixes: Vec<String>, image_suffixes: Vec<String>) -> Self {
        Self {
            document_suffixes,
            image_suffixes,
        }
    }

    pub fn from_config(config: &FixtureConfig) -> Self {
        Self::new(
            config.document_suffixes.clone(),
            config.image_suffixes.clone(),
        )
    }

    /// Classify a fixture by its root-relative, `/`-separated name.
    pub fn classify(&self, name: &str) -> Classification {
        if name.split('/').any(|component| component.starts_with('.')) {
            return Classification::Hidden;
        }
        if self.document_suffixes.iter().any(|s| name.ends_with(s.as_str())) {
            return Classification::Recognized(FixtureKind::Document);
        }
        if self.image_suffixes.iter().any(|s| name.ends_with(s.as_str())) {
            return Classification::Recognized(FixtureKind::Image);
        }
        Classification::Unrecognized
    }
}

impl Default for FixtureClassifier {
    fn default() -> Self {
        Self::from_config(&FixtureConfig::default())
    }
}

/// Every regular file below `root`, depth-first, in name order.
pub fn walk(root: &Path) -> Result<Vec<PathBuf>, FixtureError> {
    let mut files = Vec::new();
    walk_into(root, &mut files)?;
    Ok(files)
}

fn walk_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), FixtureError> {
    let walk_error = |source| FixtureError::Walk {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(walk_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(walk_error)?;
    entries.sort();

    for path in entries {
        let metadata = fs::metadata(&path).map_err(|source| FixtureError::Walk {
            path: path.clone(),
            source,
        })?;
        if metadata.is_dir() {
            walk_into(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Name of `path` relative to `root`, using `/` separators.
pub fn fixture_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Recognized fixtures under a root plus counts of what was passed over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub fixtures: Vec<DiscoveredFixture>,
    /// Files with an unrecognized suffix
    pub skipped: usize,
    /// Files below a dot-prefixed path component
    pub hidden: usize,
}

/// Walk `root` and keep the files the classifier recognizes.
pub fn discover(root: &Path, classifier: &FixtureClassifier) -> Result<Discovery, FixtureError> {
    let mut discovery = Discovery::default();
    for path in walk(root)? {
        let name = fixture_name(root, &path);
        match classifier.classify(&name) {
            Classification::Hidden => {
                trace!(fixture = %name, "skipping hidden entry");
                discovery.hidden += 1;
            }
            Classification::Unrecognized => {
                trace!(fixture = %name, "skipping unrecognized suffix");
                discovery.skipped += 1;
            }
            Classification::Recognized(kind) => {
                discovery.fixtures.push(DiscoveredFixture { name, path, kind })
            }
        }
    }
    Ok(discovery)
}
