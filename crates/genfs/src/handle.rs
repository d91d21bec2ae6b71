//! Read handles over virtual files.

use std::io::{self, Read, Seek, SeekFrom};

use crate::entry::{DirEntry, Metadata};
use crate::error::{Error, Result};
use crate::vfile::VirtualFile;

/// An opened virtual file.
///
/// Regular files read and seek over the payload bytes; directory handles
/// expose their entries instead.
#[derive(Debug)]
pub struct FileHandle {
    vfile: VirtualFile,
    pos: u64,
}

impl FileHandle {
    /// Open a handle over a payload, positioned at the start.
    ///
    /// Fallback [`crate::Filesystem`] implementations use this to wrap
    /// whatever they read.
    pub fn new(vfile: VirtualFile) -> Self {
        Self { vfile, pos: 0 }
    }

    /// The opened path.
    pub fn path(&self) -> &str {
        &self.vfile.path
    }

    /// Returns true for directory handles.
    pub fn is_dir(&self) -> bool {
        self.vfile.is_dir()
    }

    /// Metadata for the opened path.
    pub fn metadata(&self) -> Metadata {
        self.vfile.metadata()
    }

    /// Directory entries; errors for regular files.
    pub fn entries(&self) -> Result<&[DirEntry]> {
        if !self.is_dir() {
            return Err(Error::NotDirectory(self.vfile.path.clone()));
        }
        Ok(&self.vfile.entries)
    }

    /// The full file body without consuming the read position.
    pub fn data(&self) -> &[u8] {
        &self.vfile.data
    }

    /// Unwrap into the file body.
    pub fn into_data(self) -> Vec<u8> {
        self.vfile.data
    }

    /// Unwrap into the underlying payload.
    pub fn into_virtual(self) -> VirtualFile {
        self.vfile
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", self.vfile.path),
            ));
        }
        let data = &self.vfile.data;
        let start = (self.pos.min(data.len() as u64)) as usize;
        let mut remaining = &data[start..];
        let n = remaining.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.vfile.data.len() as i64;
        let next = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
            SeekFrom::End(delta) => len + delta,
        };
        if next < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of file",
            ));
        }
        self.pos = next as u64;
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    #[test]
    fn read_all() {
        let mut handle = FileHandle::new(VirtualFile::file("a.txt", b"hello".to_vec()));
        let mut out = String::new();
        handle.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
        assert_eq!(handle.metadata().size, 5);
        assert_eq!(handle.metadata().kind, EntryKind::File);
    }

    #[test]
    fn seek_then_read() {
        let mut handle = FileHandle::new(VirtualFile::file("a.txt", b"ab".to_vec()));
        let n = handle.seek(SeekFrom::Start(1)).unwrap();
        assert_eq!(n, 1);
        let mut out = Vec::new();
        handle.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"b");
    }

    #[test]
    fn seek_past_end_reads_nothing() {
        let mut handle = FileHandle::new(VirtualFile::file("a.txt", b"ab".to_vec()));
        handle.seek(SeekFrom::End(10)).unwrap();
        let mut out = Vec::new();
        handle.read_to_end(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn seek_before_start_errors() {
        let mut handle = FileHandle::new(VirtualFile::file("a.txt", b"ab".to_vec()));
        let err = handle.seek(SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn directory_handles() {
        let vdir = VirtualFile::dir_with_entries(
            "view",
            vec![DirEntry::directory("about"), DirEntry::file("index.svelte", 14)],
        );
        let mut handle = FileHandle::new(vdir);
        assert!(handle.is_dir());
        assert_eq!(handle.entries().unwrap().len(), 2);
        assert_eq!(handle.metadata().name, "view");
        let err = handle.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::IsADirectory);
    }

    #[test]
    fn entries_on_file_errors() {
        let handle = FileHandle::new(VirtualFile::file("a.txt", b"a".to_vec()));
        assert!(matches!(handle.entries(), Err(Error::NotDirectory(_))));
    }
}
