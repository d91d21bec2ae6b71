//! The user-facing generator filesystem.

use crate::cache::{Cache, DISCARD};
use crate::dir::{Dir, DirGenerator};
use crate::entry::DirEntry;
use crate::error::Result;
use crate::external::ExternalGenerator;
use crate::file::FileGenerator;
use crate::handle::FileHandle;
use crate::serve::FileServer;
use crate::session::Session;
use crate::traits::{EmptyFs, Filesystem};
use crate::tree::Tree;

/// A generator-backed virtual filesystem.
///
/// Register generators against paths, then read through the
/// [`Filesystem`] interface; files and directories materialize on demand,
/// merged with a fallback filesystem.
///
/// ```
/// use genfs::{Filesystem, GenFs};
///
/// let gfs = GenFs::new();
/// gfs.generate_file("a.txt", |_fsys: &genfs::ScopedFs, file: &mut genfs::File| {
///     file.write_str("a");
///     Ok(())
/// }).unwrap();
/// assert_eq!(gfs.read("a.txt").unwrap(), b"a");
/// ```
pub struct GenFs {
    tree: Tree,
    fallback: Box<dyn Filesystem>,
}

impl Default for GenFs {
    fn default() -> Self {
        Self::new()
    }
}

impl GenFs {
    /// An empty generator filesystem with no fallback.
    pub fn new() -> Self {
        Self::with_fallback(EmptyFs)
    }

    /// A generator filesystem over a fallback consulted whenever the tree
    /// does not match or a generator declines.
    pub fn with_fallback(fallback: impl Filesystem + 'static) -> Self {
        Self {
            tree: Tree::new(),
            fallback: Box::new(fallback),
        }
    }

    fn root_dir(&self) -> Dir<'_> {
        Dir::new(&self.tree, ".", ".")
    }

    /// Register a file generator at `path`.
    ///
    /// Re-registering the same path replaces the generator; registering
    /// over a directory is an error.
    pub fn generate_file(&self, path: &str, gen: impl FileGenerator + 'static) -> Result<()> {
        self.root_dir().generate_file(path, gen)
    }

    /// Register a directory generator at `path`.
    ///
    /// Directory generators compose: several registrations for the same
    /// path all run, in order. `"."` registers the root itself.
    pub fn generate_dir(&self, path: &str, gen: impl DirGenerator + 'static) -> Result<()> {
        self.root_dir().generate_dir(path, gen)
    }

    /// Register a prefix server: every path beneath `path` resolves through
    /// the callback.
    pub fn serve_file(&self, path: &str, gen: impl FileServer + 'static) -> Result<()> {
        self.root_dir().serve_file(path, gen)
    }

    /// Register a side-effect-only generator at `path`.
    pub fn generate_external(&self, path: &str, gen: impl ExternalGenerator + 'static) -> Result<()> {
        self.root_dir().generate_external(path, gen)
    }

    /// Remove the registration subtree at `path`; `"."` resets everything.
    pub fn delete(&self, path: &str) {
        self.tree.delete(path);
    }

    /// A resolution session carrying `cache` for generator memoization.
    pub fn session<'a>(&'a self, cache: &'a dyn Cache) -> Session<'a> {
        Session::new(&self.tree, self.fallback.as_ref(), cache)
    }

    fn discard_session(&self) -> Session<'_> {
        self.session(&DISCARD)
    }

    /// Render the registration tree with per-node modes, for debugging.
    pub fn print_tree(&self) -> String {
        self.tree.print()
    }
}

impl Filesystem for GenFs {
    fn open(&self, name: &str) -> Result<FileHandle> {
        self.discard_session().open(name)
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        self.discard_session().read_dir(name)
    }
}
