//! The `Dir` builder handed to directory generator callbacks.

use std::sync::Arc;

use crate::error::Result;
use crate::external::{ExternalGen, ExternalGenerator};
use crate::file::{FileGen, FileGenerator};
use crate::generator::Generator;
use crate::path;
use crate::scoped::ScopedFs;
use crate::serve::{FileServer, ServeGen};
use crate::session::Session;
use crate::tree::Tree;
use crate::vfile::VirtualFile;

/// A directory being generated.
///
/// The registration methods re-enter the tree with the current directory
/// prepended, so a callback can declare descendants while the resolver is
/// mid-lookup. `target` is the path the consumer asked for, which may lie
/// beneath this directory.
pub struct Dir<'t> {
    tree: &'t Tree,
    path: String,
    target: String,
}

impl<'t> Dir<'t> {
    pub(crate) fn new(tree: &'t Tree, fpath: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            tree,
            path: fpath.into(),
            target: target.into(),
        }
    }

    /// The directory being generated.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path the consumer requested.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The target relative to this directory; `"."` if equal.
    pub fn relative(&self) -> &str {
        path::relative(&self.path, &self.target)
    }

    /// Register a file generator at `rel` beneath this directory.
    pub fn generate_file(&self, rel: &str, gen: impl FileGenerator + 'static) -> Result<()> {
        let full = path::join(&self.path, rel);
        self.tree.generate_file(&full, FileGen::new(full.clone(), gen))
    }

    /// Register a directory generator at `rel` beneath this directory.
    pub fn generate_dir(&self, rel: &str, gen: impl DirGenerator + 'static) -> Result<()> {
        let full = path::join(&self.path, rel);
        self.tree.generate_dir(&full, DirGen::new(full.clone(), gen))
    }

    /// Register a prefix server at `rel` beneath this directory.
    pub fn serve_file(&self, rel: &str, gen: impl FileServer + 'static) -> Result<()> {
        let full = path::join(&self.path, rel);
        self.tree.generate_dir(&full, ServeGen::new(full.clone(), gen))
    }

    /// Register a side-effect-only generator at `rel` beneath this
    /// directory.
    pub fn generate_external(&self, rel: &str, gen: impl ExternalGenerator + 'static) -> Result<()> {
        let full = path::join(&self.path, rel);
        self.tree.generate_file(&full, ExternalGen::new(full.clone(), gen))
    }
}

/// Populates a directory by registering generators for its descendants.
pub trait DirGenerator: Send + Sync {
    fn generate_dir(&self, fsys: &ScopedFs<'_>, dir: &Dir<'_>) -> Result<()>;
}

impl<F> DirGenerator for F
where
    F: Fn(&ScopedFs<'_>, &Dir<'_>) -> Result<()> + Send + Sync,
{
    fn generate_dir(&self, fsys: &ScopedFs<'_>, dir: &Dir<'_>) -> Result<()> {
        self(fsys, dir)
    }
}

/// Adapter installing a [`DirGenerator`] as a tree node generator.
///
/// Runs the callback on every invocation: registrations are idempotent
/// under the transition rules, and re-running keeps the callback free to
/// specialize on the requested target. The returned payload carries no
/// entries; the tree computes them from its children.
pub(crate) struct DirGen {
    path: String,
    gen: Box<dyn DirGenerator>,
}

impl DirGen {
    pub fn new(fpath: String, gen: impl DirGenerator + 'static) -> Arc<Self> {
        Arc::new(Self {
            path: fpath,
            gen: Box::new(gen),
        })
    }
}

impl Generator for DirGen {
    fn generate(&self, session: Session<'_>, target: &str) -> Result<VirtualFile> {
        let dir = Dir::new(session.tree, self.path.clone(), target);
        let fsys = ScopedFs::new(session, self.path.clone());
        self.gen.generate_dir(&fsys, &dir)?;
        let vdir = VirtualFile::dir(self.path.clone());
        session.cache.set(&self.path, &vdir)?;
        Ok(vdir)
    }
}
