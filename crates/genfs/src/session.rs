//! The resolver: opening and listing paths against the tree and fallback.

use std::collections::HashSet;

use crate::cache::Cache;
use crate::entry::DirEntry;
use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::path;
use crate::traits::Filesystem;
use crate::tree::Tree;
use crate::vfile::VirtualFile;

/// One resolution context: the tree, the fallback filesystem and a cache.
///
/// A session is what generator adapters receive; it is also the handle a
/// caller uses to resolve with a memoizing cache instead of the default
/// discard cache. Sessions are cheap views and copy freely.
#[derive(Clone, Copy)]
pub struct Session<'a> {
    pub(crate) tree: &'a Tree,
    pub(crate) fallback: &'a dyn Filesystem,
    pub(crate) cache: &'a dyn Cache,
}

impl<'a> Session<'a> {
    pub(crate) fn new(tree: &'a Tree, fallback: &'a dyn Filesystem, cache: &'a dyn Cache) -> Self {
        Self {
            tree,
            fallback,
            cache,
        }
    }

    /// The cache this session resolves with.
    pub fn cache(&self) -> &'a dyn Cache {
        self.cache
    }

    /// Open a file or directory, generating it if needed.
    pub fn open(&self, target: &str) -> Result<FileHandle> {
        Ok(FileHandle::new(self.open_virtual(target)?))
    }

    /// List a directory, merging generated children with the fallback.
    pub fn read_dir(&self, target: &str) -> Result<Vec<DirEntry>> {
        if !path::is_valid(target) {
            return Err(Error::op(
                "read-dir",
                target,
                Error::InvalidPath(target.to_string()),
            ));
        }
        let mut entries = Vec::new();
        let mut found = false;

        // Generated children first: they win the dedup below.
        if let Some(m) = self.tree.find(target) {
            if m.mode().is_dir() {
                match m.generate(*self, target) {
                    Ok(vdir) => {
                        entries.extend(vdir.entries);
                        found = true;
                    }
                    Err(err) if err.is_not_exist() => {}
                    Err(err) => return Err(Error::op("read-dir", target, err)),
                }
            }
        }

        match self.fallback.read_dir(target) {
            Ok(des) => {
                entries.extend(des);
                found = true;
            }
            Err(err) if err.is_not_exist() => {}
            Err(err) => return Err(Error::op("read-dir", target, err)),
        }

        if !found {
            return Err(Error::op(
                "read-dir",
                target,
                Error::NotExist(target.to_string()),
            ));
        }
        Ok(entry_set(entries))
    }

    /// Resolve a target to its payload.
    ///
    /// Alternates between exact lookup, the fallback filesystem and
    /// longest-prefix descent into directory generators. `previous` pins
    /// the last prefix descended into; seeing it again means the generator
    /// failed to materialize the requested descendant, which bounds the
    /// loop.
    pub(crate) fn open_virtual(&self, target: &str) -> Result<VirtualFile> {
        if !path::is_valid(target) {
            return Err(Error::op(
                "open",
                target,
                Error::InvalidPath(target.to_string()),
            ));
        }
        let mut previous = String::new();
        loop {
            // An exact generator match.
            let exact = self.tree.find(target);
            if let Some(m) = &exact {
                if m.mode().is_gen() {
                    match m.generate(*self, target) {
                        Ok(vfile) => return Ok(vfile),
                        // The generator declined; other sources may serve it.
                        Err(err) if err.is_not_exist() => {}
                        Err(err) => return Err(Error::op("open", target, err)),
                    }
                }
            }

            // The fallback filesystem.
            match self.fallback.open(target) {
                Ok(handle) => return Ok(handle.into_virtual()),
                Err(err) if err.is_not_exist() => {}
                Err(err) => return Err(Error::op("open", target, err)),
            }

            // A filler directory: the tree has structure here that the
            // fallback lacks.
            if let Some(m) = exact {
                if m.mode().is_dir() && !m.mode().is_gen() {
                    return m.generate(*self, target);
                }
            }

            // The longest prefix that could still produce the target. Only
            // directory generators qualify: they can register sub-files and
            // directories that end up matching.
            let prefix = match self.tree.find_prefix(target) {
                Some(prefix) if prefix.mode().is_gen_dir() => prefix,
                _ => {
                    return Err(Error::op(
                        "open",
                        target,
                        Error::NotExist(target.to_string()),
                    ))
                }
            };
            if prefix.path() == previous {
                return Err(Error::op(
                    "open",
                    target,
                    Error::NotExist(target.to_string()),
                ));
            }
            tracing::trace!(
                path = target,
                prefix = prefix.path(),
                "descending into directory generator"
            );
            match prefix.generate(*self, target) {
                // A prefix server produced the target itself.
                Ok(vfile) if !vfile.is_dir() && vfile.path == target => return Ok(vfile),
                // A directory payload; the registrations are what matter.
                Ok(_) => {}
                Err(err) if err.is_not_exist() => {
                    return Err(Error::op("open", target, err))
                }
                Err(err) => return Err(Error::op("open by prefix", target, err)),
            }
            previous = prefix.path().to_string();
        }
    }
}

impl Filesystem for Session<'_> {
    fn open(&self, name: &str) -> Result<FileHandle> {
        Session::open(self, name)
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        Session::read_dir(self, name)
    }
}

/// Deduplicate by name (first occurrence wins) and sort ascending.
fn entry_set(entries: Vec<DirEntry>) -> Vec<DirEntry> {
    let mut seen = HashSet::new();
    let mut out: Vec<DirEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.name.clone()))
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}
