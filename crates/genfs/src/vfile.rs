//! The payload a generator produces.

use crate::entry::{DirEntry, EntryKind, Metadata};
use crate::path;

/// A virtual file: the value generators return and caches store.
///
/// Regular files carry `data`; directories carry `entries`. For directory
/// generators the tree computes the entry list from its own children, so a
/// generator-declared list is ignored there.
#[derive(Debug, Clone)]
pub struct VirtualFile {
    /// Cleaned path from the root.
    pub path: String,
    /// Directory or regular file.
    pub kind: EntryKind,
    /// File body (regular files only).
    pub data: Vec<u8>,
    /// Directory entries (directories only).
    pub entries: Vec<DirEntry>,
}

impl VirtualFile {
    /// Create a regular-file payload.
    pub fn file(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            data: data.into(),
            entries: Vec::new(),
        }
    }

    /// Create an empty directory payload.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            data: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Create a directory payload with entries.
    pub fn dir_with_entries(path: impl Into<String>, entries: Vec<DirEntry>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            data: Vec::new(),
            entries,
        }
    }

    /// Returns true for directory payloads.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Base name of the path; `"."` for the root.
    pub fn name(&self) -> &str {
        path::base(&self.path)
    }

    /// Metadata view of this payload.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name().to_string(),
            kind: self.kind,
            size: self.data.len() as u64,
        }
    }
}
