//! Fixture registry for golden-archive tests.
//!
//! Fixtures are discovered under a root directory, loaded asynchronously and
//! stored by name in a shared [`FixtureSet`]. Document fixtures keep both the
//! raw bytes and the parsed [`Archive`] so tests can compare against the
//! archive directly or re-parse a fresh copy for templating.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::archive::Archive;
use crate::error::FixtureError;

pub mod barrier;
pub mod discovery;
pub mod loader;

pub use barrier::LoadBarrier;
pub use discovery::{Classification, DiscoveredFixture, Discovery, FixtureClassifier, FixtureKind};
pub use loader::{DiscoveryReport, FixtureLoader};

/// A golden document archive.
#[derive(Debug, Clone)]
pub struct DocumentFixture {
    pub name: String,
    pub content: Vec<u8>,
    pub archive: Archive,
}

impl DocumentFixture {
    pub fn from_bytes(name: impl Into<String>, content: Vec<u8>) -> Result<Self, FixtureError> {
        let name = name.into();
        let archive =
            Archive::from_bytes(name.clone(), &content).map_err(|source| FixtureError::Archive {
                name: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            content,
            archive,
        })
    }

    /// Parse an independent copy of the archive from the stored bytes.
    pub fn fresh_archive(&self) -> Result<Archive, FixtureError> {
        Archive::from_bytes(self.name.clone(), &self.content).map_err(|source| {
            FixtureError::Archive {
                name: self.name.clone(),
                source,
            }
        })
    }
}

/// A raw image fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFixture {
    pub name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Default)]
struct FixtureStore {
    documents: HashMap<String, Arc<DocumentFixture>>,
    images: HashMap<String, Arc<ImageFixture>>,
}

/// Shared, name-keyed fixture registry.
///
/// Cloning is cheap and yields a handle onto the same registry, which is how
/// concurrent load tasks publish their results.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    inner: Arc<Mutex<FixtureStore>>,
}

impl FixtureSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, FixtureStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse `content` as an archive and register it under `name`.
    pub fn load_document(
        &self,
        name: impl Into<String>,
        content: Vec<u8>,
    ) -> Result<Arc<DocumentFixture>, FixtureError> {
        let fixture = Arc::new(DocumentFixture::from_bytes(name, content)?);
        self.store()
            .documents
            .insert(fixture.name.clone(), Arc::clone(&fixture));
        Ok(fixture)
    }

    pub fn load_image(&self, name: impl Into<String>, content: Vec<u8>) -> Arc<ImageFixture> {
        let fixture = Arc::new(ImageFixture {
            name: name.into(),
            content,
        });
        self.store()
            .images
            .insert(fixture.name.clone(), Arc::clone(&fixture));
        fixture
    }

    /// Register a document whose only part is `word/document.xml`.
    pub fn make_docx(
        &self,
        name: impl Into<String>,
        xml: &str,
    ) -> Result<Arc<DocumentFixture>, FixtureError> {
        let name = name.into();
        let content = Archive::single_document(name.clone(), xml)
            .to_bytes()
            .map_err(|source| FixtureError::Archive {
                name: name.clone(),
                source,
            })?;
        self.load_document(name, content)
    }

    /// Fresh archive parsed from a loaded document's original bytes.
    pub fn create_doc(&self, name: &str) -> Result<Archive, FixtureError> {
        self.document(name)
            .ok_or_else(|| FixtureError::NotLoaded {
                name: name.to_string(),
            })?
            .fresh_archive()
    }

    pub fn document(&self, name: &str) -> Option<Arc<DocumentFixture>> {
        self.store().documents.get(name).cloned()
    }

    pub fn image(&self, name: &str) -> Option<Arc<ImageFixture>> {
        self.store().images.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        let store = self.store();
        store.documents.contains_key(name) || store.images.contains_key(name)
    }

    pub fn document_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.store().documents.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn image_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.store().images.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        let store = self.store();
        store.documents.len() + store.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::DOCUMENT_MEMBER;

    #[test]
    fn make_docx_registers_single_part_document() {
        let fixtures = FixtureSet::new();
        let doc = fixtures
            .make_docx("inline.docx", "<w:document><w:t>{name}</w:t></w:document>")
            .unwrap();
        assert_eq!(doc.archive.name(), "inline.docx");
        assert_eq!(
            doc.archive.member(DOCUMENT_MEMBER).unwrap().as_text(),
            "<w:document><w:t>{name}</w:t></w:document>"
        );
        assert!(fixtures.contains("inline.docx"));
        assert_eq!(fixtures.document_names(), vec!["inline.docx"]);
    }

    #[test]
    fn create_doc_returns_independent_copy() {
        let fixtures = FixtureSet::new();
        fixtures.make_docx("tag.docx", "<w:document/>").unwrap();

        let mut copy = fixtures.create_doc("tag.docx").unwrap();
        copy.insert_file(DOCUMENT_MEMBER, "<w:document><w:t>changed</w:t></w:document>");

        let original = fixtures.document("tag.docx").unwrap();
        assert_eq!(
            original.archive.member(DOCUMENT_MEMBER).unwrap().as_text(),
            "<w:document/>"
        );
    }

    #[test]
    fn create_doc_requires_loaded_fixture() {
        let err = FixtureSet::new().create_doc("absent.docx").unwrap_err();
        assert!(matches!(err, FixtureError::NotLoaded { ref name } if name == "absent.docx"));
    }

    #[test]
    fn invalid_document_is_rejected() {
        let err = FixtureSet::new()
            .load_document("broken.docx", b"not a zip".to_vec())
            .unwrap_err();
        assert!(matches!(err, FixtureError::Archive { ref name, .. } if name == "broken.docx"));
    }

    #[test]
    fn images_and_documents_share_the_registry() {
        let fixtures = FixtureSet::new();
        let handle = fixtures.clone();
        handle.load_image("image.png", vec![1, 2, 3]);
        fixtures.make_docx("a.docx", "<w:document/>").unwrap();

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures.image("image.png").unwrap().content, vec![1, 2, 3]);
        assert_eq!(fixtures.image_names(), vec!["image.png"]);
    }
}
