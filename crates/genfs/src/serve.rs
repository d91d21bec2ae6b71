//! Prefix servers: one generator for every path beneath a directory.

use std::sync::Arc;

use crate::error::Result;
use crate::file::File;
use crate::generator::Generator;
use crate::scoped::ScopedFs;
use crate::session::Session;
use crate::vfile::VirtualFile;

/// Produces a file for any target beneath the registration directory.
///
/// Unlike a directory generator, a server pre-registers nothing: every path
/// under its directory is valid and routed through the same callback, which
/// can specialize on [`File::relative`]. Listing the directory itself
/// enumerates only explicitly registered children.
pub trait FileServer: Send + Sync {
    fn serve_file(&self, fsys: &ScopedFs<'_>, file: &mut File) -> Result<()>;
}

impl<F> FileServer for F
where
    F: Fn(&ScopedFs<'_>, &mut File) -> Result<()> + Send + Sync,
{
    fn serve_file(&self, fsys: &ScopedFs<'_>, file: &mut File) -> Result<()> {
        self(fsys, file)
    }
}

/// Adapter installing a [`FileServer`] as a gen-dir node generator.
///
/// Asked for the directory itself it yields an empty directory payload;
/// asked for anything beneath, it yields a regular-file payload for that
/// exact target, which the resolver uses directly.
pub(crate) struct ServeGen {
    path: String,
    gen: Box<dyn FileServer>,
}

impl ServeGen {
    pub fn new(fpath: String, gen: impl FileServer + 'static) -> Arc<Self> {
        Arc::new(Self {
            path: fpath,
            gen: Box::new(gen),
        })
    }
}

impl Generator for ServeGen {
    fn generate(&self, session: Session<'_>, target: &str) -> Result<VirtualFile> {
        if target == self.path {
            return Ok(VirtualFile::dir(self.path.clone()));
        }
        if let Ok(cached) = session.cache.get(target) {
            return Ok(cached);
        }
        let mut file = File::new(&self.path, target);
        let fsys = ScopedFs::new(session, self.path.clone());
        self.gen.serve_file(&fsys, &mut file)?;
        let vfile = file.into_virtual();
        session.cache.set(target, &vfile)?;
        Ok(vfile)
    }
}
