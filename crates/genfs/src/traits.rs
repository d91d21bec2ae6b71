//! The read-only filesystem abstraction.

use genfs_glob::Pattern;

use crate::entry::{DirEntry, Metadata};
use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::path;

/// A read-only filesystem keyed by cleaned, slash-separated relative paths.
///
/// [`crate::GenFs`] produces this interface and consumes it again as the
/// fallback layer, so generator filesystems, in-memory test doubles and
/// real directories all compose.
pub trait Filesystem: Send + Sync {
    /// Open a file or directory.
    fn open(&self, name: &str) -> Result<FileHandle>;

    /// List a directory, sorted by name.
    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>>;

    /// Read a file's entire body.
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let handle = self.open(name)?;
        if handle.is_dir() {
            return Err(Error::IsDirectory(name.to_string()));
        }
        Ok(handle.into_data())
    }

    /// Metadata for a path.
    fn stat(&self, name: &str) -> Result<Metadata> {
        Ok(self.open(name)?.metadata())
    }

    /// Check whether a path exists.
    fn exists(&self, name: &str) -> bool {
        self.open(name).is_ok()
    }

    /// Collect the paths matching a glob pattern, sorted.
    ///
    /// Walks from the pattern's static prefix, descending only into
    /// directories the pattern can still reach. Walking a generator
    /// filesystem runs the directory generators it passes through.
    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let pat = Pattern::new(pattern)
            .map_err(|err| Error::op("glob", pattern, Error::InvalidPath(err.to_string())))?;
        let start = pat.static_prefix().unwrap_or_else(|| ".".to_string());
        let mut matches = Vec::new();
        if start != "." && pat.matches(&start) && self.exists(&start) {
            matches.push(start.clone());
        }
        glob_walk(self, &pat, &start, &mut matches)?;
        matches.sort();
        matches.dedup();
        Ok(matches)
    }
}

fn glob_walk<F: Filesystem + ?Sized>(
    fsys: &F,
    pat: &Pattern,
    dir: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    let entries = match fsys.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.is_not_exist() => return Ok(()),
        Err(err) => return Err(err),
    };
    for entry in entries {
        let full = path::join(dir, &entry.name);
        if pat.matches(&full) {
            out.push(full.clone());
        }
        if entry.is_dir() && pat.matches_prefix(&full) {
            glob_walk(fsys, pat, &full, out)?;
        }
    }
    Ok(())
}

/// A filesystem with nothing in it; the default fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyFs;

impl Filesystem for EmptyFs {
    fn open(&self, name: &str) -> Result<FileHandle> {
        Err(Error::NotExist(name.to_string()))
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        Err(Error::NotExist(name.to_string()))
    }
}
