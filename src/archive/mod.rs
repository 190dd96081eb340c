//! Path-keyed archive model backed by zip containers.
//!
//! Generated documents and golden fixtures are both reduced to an [`Archive`]:
//! an ordered mapping from member path to [`ArchiveMember`]. The differ only
//! ever looks at this shape, so it does not care whether an archive came from
//! disk or was assembled in memory by a test.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ArchiveError;

pub mod canonical;
pub mod differ;

pub use canonical::{CanonicalizeError, Canonicalizer, XmlCanonicalizer};
pub use differ::{compare_archives, remove_spaces, ArchiveDiffer, CompareOptions};

/// Display name used for archives produced in memory.
pub const GENERATED_ARCHIVE_NAME: &str = "generated file";

/// Main document part of a word-processing archive.
pub const DOCUMENT_MEMBER: &str = "word/document.xml";

/// Upper bound on buffer preallocation from a member's declared size.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// A single file or directory entry inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub name: String,
    pub dir: bool,
    content: Vec<u8>,
}

impl ArchiveMember {
    pub fn file(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            dir: false,
            content: content.into(),
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: true,
            content: Vec::new(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Member content decoded as UTF-8, replacing invalid sequences.
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Zip-style container of named members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    name: String,
    members: BTreeMap<String, ArchiveMember>,
}

impl Archive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
        }
    }

    /// Empty archive named as a freshly generated document.
    pub fn generated() -> Self {
        Self::new(GENERATED_ARCHIVE_NAME)
    }

    /// Archive holding only `word/document.xml` (plus its folder entry).
    pub fn single_document(name: impl Into<String>, xml: &str) -> Self {
        let mut archive = Self::new(name);
        archive.insert_dir("word/");
        archive.insert_file(DOCUMENT_MEMBER, xml.as_bytes().to_vec());
        archive
    }

    /// Parse a zip container into its members.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, ArchiveError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        let mut archive = Self::new(name);

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            let path = entry.name().to_string();
            let member = if entry.is_dir() {
                ArchiveMember::directory(path.clone())
            } else {
                let mut content = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
                entry.read_to_end(&mut content)?;
                ArchiveMember::file(path.clone(), content)
            };
            archive.members.insert(path, member);
        }

        Ok(archive)
    }

    /// Serialize into a deflate-compressed zip container.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (path, member) in &self.members {
            if member.dir {
                writer.add_directory(path.as_str(), options)?;
            } else {
                writer.start_file(path.as_str(), options)?;
                writer.write_all(member.content())?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert (or replace) a file member whose name equals its path.
    pub fn insert_file(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        self.members
            .insert(path.clone(), ArchiveMember::file(path, content));
    }

    /// Insert a directory entry. Paths are stored with a trailing `/`.
    pub fn insert_dir(&mut self, path: impl Into<String>) {
        let mut path = path.into();
        if !path.ends_with('/') {
            path.push('/');
        }
        self.members
            .insert(path.clone(), ArchiveMember::directory(path));
    }

    /// Insert a member under an explicit path, keeping its own name.
    pub fn insert_member(&mut self, path: impl Into<String>, member: ArchiveMember) {
        self.members.insert(path.into(), member);
    }

    pub fn remove(&mut self, path: &str) -> Option<ArchiveMember> {
        self.members.remove(path)
    }

    pub fn member(&self, path: &str) -> Option<&ArchiveMember> {
        self.members.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
