//! The raw generator contract.

use crate::error::Result;
use crate::file::{File, FileGenerator};
use crate::scoped::ScopedFs;
use crate::session::Session;
use crate::vfile::VirtualFile;

/// The contract every node generator satisfies.
///
/// `target` is the path the consumer originally requested, propagated
/// verbatim through recursive resolution so a generator can specialize on
/// the exact sub-path. The session carries the cache and the re-entrant
/// filesystem view. The user-facing shapes ([`FileGenerator`],
/// [`crate::DirGenerator`], [`crate::FileServer`],
/// [`crate::ExternalGenerator`]) are adapted onto this trait internally.
pub trait Generator: Send + Sync {
    fn generate(&self, session: Session<'_>, target: &str) -> Result<VirtualFile>;
}

impl<F> Generator for F
where
    F: Fn(Session<'_>, &str) -> Result<VirtualFile> + Send + Sync,
{
    fn generate(&self, session: Session<'_>, target: &str) -> Result<VirtualFile> {
        self(session, target)
    }
}

/// A file generator that writes fixed bytes.
///
/// ```no_run
/// use genfs::{Embed, GenFs};
///
/// let gfs = GenFs::new();
/// gfs.generate_file("view/index.svelte", Embed::new("<h1>index</h1>")).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Embed {
    data: Vec<u8>,
}

impl Embed {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl FileGenerator for Embed {
    fn generate_file(&self, _fsys: &ScopedFs<'_>, file: &mut File) -> Result<()> {
        file.write(&self.data);
        Ok(())
    }
}
