//! Generator output caches.
//!
//! The resolver never inspects cached values itself; it hands the cache to
//! the generator adapters, which may short-circuit with a previous payload
//! and record link hints for external change trackers. [`Discard`] is the
//! default and disables both.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::vfile::VirtualFile;

/// A key-value store for generated payloads plus link bookkeeping.
pub trait Cache: Send + Sync {
    /// Fetch a previously generated payload; NotExist on a miss.
    fn get(&self, path: &str) -> Result<VirtualFile>;

    /// Store a generated payload.
    fn set(&self, path: &str, file: &VirtualFile) -> Result<()>;

    /// Record that `from` depends on paths matching `to_patterns`.
    ///
    /// Links carry no semantics here; an external watcher may use them to
    /// decide which generators to invalidate.
    fn link(&self, from: &str, to_patterns: &[&str]) -> Result<()>;
}

/// The default cache: every get misses, set and link do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

pub(crate) static DISCARD: Discard = Discard;

impl Cache for Discard {
    fn get(&self, path: &str) -> Result<VirtualFile> {
        Err(Error::NotExist(path.to_string()))
    }

    fn set(&self, _path: &str, _file: &VirtualFile) -> Result<()> {
        Ok(())
    }

    fn link(&self, _from: &str, _to_patterns: &[&str]) -> Result<()> {
        Ok(())
    }
}

/// An in-memory cache, useful for memoizing generators within a session.
#[derive(Debug, Default)]
pub struct MemoryCache {
    files: Mutex<HashMap<String, VirtualFile>>,
    links: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The patterns linked from a generator path so far.
    pub fn links_from(&self, from: &str) -> Vec<String> {
        self.links
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .get(from)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop all cached payloads and links.
    pub fn clear(&self) {
        self.files
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clear();
        self.links
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clear();
    }
}

impl Cache for MemoryCache {
    fn get(&self, path: &str) -> Result<VirtualFile> {
        self.files
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotExist(path.to_string()))
    }

    fn set(&self, path: &str, file: &VirtualFile) -> Result<()> {
        self.files
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .insert(path.to_string(), file.clone());
        Ok(())
    }

    fn link(&self, from: &str, to_patterns: &[&str]) -> Result<()> {
        let mut links = self.links.lock().unwrap_or_else(|err| err.into_inner());
        let entry = links.entry(from.to_string()).or_default();
        for pattern in to_patterns {
            if !entry.iter().any(|existing| existing == pattern) {
                entry.push((*pattern).to_string());
            }
        }
        Ok(())
    }
}
