//! In-memory filesystem, usable as a fallback layer or test double.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::entry::DirEntry;
use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::path;
use crate::traits::Filesystem;
use crate::vfile::VirtualFile;

#[derive(Debug, Clone)]
enum MemEntry {
    File(Vec<u8>),
    Dir,
}

/// An in-memory filesystem.
///
/// Reads go through the [`Filesystem`] interface; `write` and `mkdir` are
/// inherent setup methods, since the interface itself is read-only. The
/// root always exists.
#[derive(Debug, Default)]
pub struct MemoryFs {
    entries: Mutex<BTreeMap<String, MemEntry>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, MemEntry>> {
        self.entries.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, fpath: &str, data: &[u8]) -> Result<()> {
        let fpath = path::clean(fpath);
        if fpath == "." {
            return Err(Error::IsDirectory(fpath));
        }
        let mut entries = self.lock();
        ensure_parents(&mut entries, &fpath)?;
        if matches!(entries.get(&fpath), Some(MemEntry::Dir)) {
            return Err(Error::IsDirectory(fpath));
        }
        entries.insert(fpath, MemEntry::File(data.to_vec()));
        Ok(())
    }

    /// Create a directory and any missing parents.
    pub fn mkdir(&self, fpath: &str) -> Result<()> {
        let fpath = path::clean(fpath);
        if fpath == "." {
            return Ok(());
        }
        let mut entries = self.lock();
        ensure_parents(&mut entries, &fpath)?;
        match entries.get(&fpath) {
            Some(MemEntry::File(_)) => Err(Error::AlreadyFile(fpath)),
            _ => {
                entries.insert(fpath, MemEntry::Dir);
                Ok(())
            }
        }
    }
}

fn ensure_parents(entries: &mut BTreeMap<String, MemEntry>, fpath: &str) -> Result<()> {
    let parent = path::parent(fpath);
    if parent == "." {
        return Ok(());
    }
    let mut current = String::new();
    for seg in parent.split('/') {
        if current.is_empty() {
            current.push_str(seg);
        } else {
            current.push('/');
            current.push_str(seg);
        }
        match entries.get(&current) {
            Some(MemEntry::File(_)) => return Err(Error::AlreadyFile(current)),
            Some(MemEntry::Dir) => {}
            None => {
                entries.insert(current.clone(), MemEntry::Dir);
            }
        }
    }
    Ok(())
}

fn children(entries: &BTreeMap<String, MemEntry>, dir: &str) -> Vec<DirEntry> {
    entries
        .iter()
        .filter(|(key, _)| path::parent(key) == dir)
        .map(|(key, entry)| match entry {
            MemEntry::File(data) => DirEntry::file(path::base(key), data.len() as u64),
            MemEntry::Dir => DirEntry::directory(path::base(key)),
        })
        .collect()
}

impl Filesystem for MemoryFs {
    fn open(&self, name: &str) -> Result<FileHandle> {
        if !path::is_valid(name) {
            return Err(Error::InvalidPath(name.to_string()));
        }
        let entries = self.lock();
        if name == "." {
            return Ok(FileHandle::new(VirtualFile::dir_with_entries(
                ".",
                children(&entries, "."),
            )));
        }
        match entries.get(name) {
            Some(MemEntry::File(data)) => {
                Ok(FileHandle::new(VirtualFile::file(name, data.clone())))
            }
            Some(MemEntry::Dir) => Ok(FileHandle::new(VirtualFile::dir_with_entries(
                name,
                children(&entries, name),
            ))),
            None => Err(Error::NotExist(name.to_string())),
        }
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        if !path::is_valid(name) {
            return Err(Error::InvalidPath(name.to_string()));
        }
        let entries = self.lock();
        if name != "." {
            match entries.get(name) {
                Some(MemEntry::Dir) => {}
                Some(MemEntry::File(_)) => return Err(Error::NotDirectory(name.to_string())),
                None => return Err(Error::NotExist(name.to_string())),
            }
        }
        // BTreeMap iteration keeps the listing sorted.
        Ok(children(&entries, name))
    }
}
