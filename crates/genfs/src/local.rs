//! Read-only view of a real directory, usable as a fallback layer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::entry::DirEntry;
use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::path;
use crate::traits::Filesystem;
use crate::vfile::VirtualFile;

/// A local directory exposed through the read-only [`Filesystem`]
/// interface.
///
/// All names are relative to `root`; validation rejects `..` and absolute
/// names, so lookups cannot escape it.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Expose the directory at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !path::is_valid(name) {
            return Err(Error::InvalidPath(name.to_string()));
        }
        if name == "." {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(name))
        }
    }
}

/// Map an io error for `name`, naming the virtual path rather than the
/// real one.
fn io_error(name: &str, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => Error::NotExist(name.to_string()),
        _ => Error::from(err),
    }
}

impl Filesystem for LocalFs {
    fn open(&self, name: &str) -> Result<FileHandle> {
        let full = self.resolve(name)?;
        let meta = fs::metadata(&full).map_err(|err| io_error(name, err))?;
        if meta.is_dir() {
            Ok(FileHandle::new(VirtualFile::dir_with_entries(
                name,
                self.read_dir(name)?,
            )))
        } else {
            let data = fs::read(&full).map_err(|err| io_error(name, err))?;
            Ok(FileHandle::new(VirtualFile::file(name, data)))
        }
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        let full = self.resolve(name)?;
        let mut out = Vec::new();
        for entry in fs::read_dir(&full).map_err(|err| io_error(name, err))? {
            let entry = entry.map_err(|err| io_error(name, err))?;
            let file_name = entry.file_name();
            let Some(entry_name) = file_name.to_str() else {
                // Non-UTF-8 names cannot appear in the virtual namespace.
                continue;
            };
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => out.push(DirEntry::directory(entry_name)),
                Ok(meta) => out.push(DirEntry::file(entry_name, meta.len())),
                // Broken symlink or the entry vanished mid-walk.
                Err(_) => continue,
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, LocalFs) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"beta").unwrap();
        let fsys = LocalFs::new(dir.path());
        (dir, fsys)
    }

    #[test]
    fn reads_real_files() {
        let (_dir, fsys) = fixture();
        assert_eq!(fsys.read("a.txt").unwrap(), b"alpha");
        assert_eq!(fsys.read("sub/b.txt").unwrap(), b"beta");
        assert!(fsys.read("missing.txt").unwrap_err().is_not_exist());
    }

    #[test]
    fn lists_sorted() {
        let (_dir, fsys) = fixture();
        let entries = fsys.read_dir(".").unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "sub"]);
        assert!(entries[1].is_dir());
        assert_eq!(entries[0].size, 5);
    }

    #[test]
    fn stats_directories() {
        let (_dir, fsys) = fixture();
        let meta = fsys.stat("sub").unwrap();
        assert!(meta.is_dir());
        assert_eq!(meta.name, "sub");
    }

    #[test]
    fn rejects_escaping_names() {
        let (_dir, fsys) = fixture();
        assert!(matches!(
            fsys.read("../etc/passwd"),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(fsys.read("/etc/passwd"), Err(Error::InvalidPath(_))));
    }
}
