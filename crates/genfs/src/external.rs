//! Side-effect-only generators.
//!
//! An external generator writes its output somewhere outside the virtual
//! tree (a real directory, a build sink). It registers like a file so the
//! path shows up in listings, but it always reports not-exist, so the path
//! never resolves through the resolver.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::scoped::ScopedFs;
use crate::session::Session;
use crate::vfile::VirtualFile;

/// Handle describing the externally generated path.
pub struct External {
    target: String,
}

impl External {
    /// The path the consumer requested.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Alias of [`External::target`]; external generators match exactly.
    pub fn path(&self) -> &str {
        &self.target
    }
}

/// Generates output into an external sink.
pub trait ExternalGenerator: Send + Sync {
    fn generate_external(&self, fsys: &ScopedFs<'_>, external: &External) -> Result<()>;
}

impl<F> ExternalGenerator for F
where
    F: Fn(&ScopedFs<'_>, &External) -> Result<()> + Send + Sync,
{
    fn generate_external(&self, fsys: &ScopedFs<'_>, external: &External) -> Result<()> {
        self(fsys, external)
    }
}

/// Adapter installing an [`ExternalGenerator`] as a tree node generator.
///
/// The cache doubles as a run-once marker: a hit means the side effect
/// already happened this session.
pub(crate) struct ExternalGen {
    path: String,
    gen: Box<dyn ExternalGenerator>,
}

impl ExternalGen {
    pub fn new(fpath: String, gen: impl ExternalGenerator + 'static) -> Arc<Self> {
        Arc::new(Self {
            path: fpath,
            gen: Box::new(gen),
        })
    }
}

impl Generator for ExternalGen {
    fn generate(&self, session: Session<'_>, target: &str) -> Result<VirtualFile> {
        if target != self.path {
            return Err(Error::NotExist(format!(
                "{:?} does not produce {:?}",
                self.path, target
            )));
        }
        if session.cache.get(target).is_ok() {
            return Err(Error::NotExist(target.to_string()));
        }
        let fsys = ScopedFs::new(session, self.path.clone());
        let external = External {
            target: target.to_string(),
        };
        self.gen.generate_external(&fsys, &external)?;
        session.cache.set(target, &VirtualFile::file(target, Vec::new()))?;
        Err(Error::NotExist(target.to_string()))
    }
}
