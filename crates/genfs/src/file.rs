//! The `File` builder handed to file generator callbacks.

use std::io;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::path;
use crate::scoped::ScopedFs;
use crate::session::Session;
use crate::vfile::VirtualFile;

/// An append-only byte sink; the accumulated bytes become the virtual
/// file's body when the callback returns.
///
/// `path` is the registration path and `target` the requested path. They
/// are equal for exact file generators; under a prefix server the target
/// points beneath the registration path, and [`File::relative`] yields the
/// difference.
pub struct File {
    path: String,
    target: String,
    data: Vec<u8>,
}

impl File {
    pub(crate) fn new(fpath: &str, target: &str) -> Self {
        Self {
            path: fpath.to_string(),
            target: target.to_string(),
            data: Vec::new(),
        }
    }

    /// Append bytes to the file body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append a string to the file body.
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// The registration path of the generator producing this file.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path the consumer requested.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The target relative to the registration path; `"."` if equal.
    pub fn relative(&self) -> &str {
        path::relative(&self.path, &self.target)
    }

    /// Extension of the target, including the dot (e.g. `.svelte`).
    pub fn ext(&self) -> &str {
        path::ext(&self.target)
    }

    /// The bytes written so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn into_virtual(self) -> VirtualFile {
        VirtualFile::file(self.target, self.data)
    }
}

impl io::Write for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Produces the body of a single file at its registration path.
pub trait FileGenerator: Send + Sync {
    fn generate_file(&self, fsys: &ScopedFs<'_>, file: &mut File) -> Result<()>;
}

impl<F> FileGenerator for F
where
    F: Fn(&ScopedFs<'_>, &mut File) -> Result<()> + Send + Sync,
{
    fn generate_file(&self, fsys: &ScopedFs<'_>, file: &mut File) -> Result<()> {
        self(fsys, file)
    }
}

/// Adapter installing a [`FileGenerator`] as a tree node generator.
///
/// Memoizes the produced payload through the session cache, keyed by
/// target.
pub(crate) struct FileGen {
    path: String,
    gen: Box<dyn FileGenerator>,
}

impl FileGen {
    pub fn new(fpath: String, gen: impl FileGenerator + 'static) -> Arc<Self> {
        Arc::new(Self {
            path: fpath,
            gen: Box::new(gen),
        })
    }
}

impl Generator for FileGen {
    fn generate(&self, session: Session<'_>, target: &str) -> Result<VirtualFile> {
        if target != self.path {
            return Err(Error::NotExist(format!(
                "{:?} does not produce {:?}",
                self.path, target
            )));
        }
        if let Ok(cached) = session.cache.get(target) {
            return Ok(cached);
        }
        let mut file = File::new(&self.path, target);
        let fsys = ScopedFs::new(session, self.path.clone());
        self.gen.generate_file(&fsys, &mut file)?;
        let vfile = file.into_virtual();
        session.cache.set(target, &vfile)?;
        Ok(vfile)
    }
}
