//! The filesystem view handed to generator callbacks.

use crate::entry::DirEntry;
use crate::error::Result;
use crate::handle::FileHandle;
use crate::path;
use crate::session::Session;
use crate::traits::Filesystem;

/// A scoped filesystem façade for one generator.
///
/// Delegates back to the enclosing session, so a callback can request peer
/// files that may themselves be generated, and records every requested path
/// or pattern as a link from the generator's registration path. Links are
/// hints for an external change tracker; they carry no semantics here.
pub struct ScopedFs<'a> {
    session: Session<'a>,
    from: String,
}

impl<'a> ScopedFs<'a> {
    pub(crate) fn new(session: Session<'a>, from: impl Into<String>) -> Self {
        Self {
            session,
            from: from.into(),
        }
    }

    /// The registration path links are recorded from.
    pub fn path(&self) -> &str {
        &self.from
    }

    /// Open a peer file, re-entering the resolver.
    pub fn open(&self, name: &str) -> Result<FileHandle> {
        self.session.cache.link(&self.from, &[name])?;
        self.session.open(name)
    }

    /// List a peer directory, re-entering the resolver.
    pub fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        let entries = self.session.read_dir(name)?;
        // Watch the directory and its parent so renames are picked up too.
        self.session
            .cache
            .link(&self.from, &[name, path::parent(name)])?;
        Ok(entries)
    }

    /// Record a dependency on `patterns` without reading anything.
    pub fn watch(&self, patterns: &[&str]) -> Result<()> {
        self.session.cache.link(&self.from, patterns)
    }
}

impl Filesystem for ScopedFs<'_> {
    fn open(&self, name: &str) -> Result<FileHandle> {
        ScopedFs::open(self, name)
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        ScopedFs::read_dir(self, name)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let matches = self.session.glob(pattern)?;
        self.session.cache.link(&self.from, &[pattern])?;
        Ok(matches)
    }
}
