//! genfs: a virtual filesystem whose files are produced on demand.
//!
//! Register generator callbacks against paths, then read through the
//! [`Filesystem`] interface. Resolution finds the nearest responsible
//! generator, runs it (directory generators may register further
//! descendants mid-lookup), and merges the result with a fallback
//! filesystem.
//!
//! This crate provides:
//!
//! - **GenFs**: the registration surface and filesystem facade
//! - **Tree**: a path trie of filler dirs, file generators and dir
//!   generators (internal)
//! - **Session**: the resolver, parameterized by a [`Cache`]
//! - **File / Dir builders**: handed to generator callbacks
//! - **ScopedFs**: the re-entrant filesystem view callbacks receive
//! - **MemoryFs / LocalFs / EmptyFs**: fallback implementations
//!
//! ```
//! use genfs::{Filesystem, GenFs};
//!
//! let gfs = GenFs::new();
//! gfs.generate_dir("bud/view", |_fsys: &genfs::ScopedFs, dir: &genfs::Dir| {
//!     dir.generate_file("index.svelte", genfs::Embed::new("<h1>index</h1>"))
//! })
//! .unwrap();
//!
//! assert_eq!(gfs.read("bud/view/index.svelte").unwrap(), b"<h1>index</h1>");
//! let entries = gfs.read_dir("bud/view").unwrap();
//! assert_eq!(entries[0].name, "index.svelte");
//! ```

pub mod cache;
mod dir;
mod entry;
mod error;
mod external;
mod file;
mod filesystem;
mod generator;
mod handle;
mod local;
mod memory;
mod mode;
pub mod path;
mod scoped;
mod serve;
mod session;
mod traits;
mod tree;
mod vfile;

pub use cache::{Cache, Discard, MemoryCache};
pub use dir::{Dir, DirGenerator};
pub use entry::{DirEntry, EntryKind, Metadata};
pub use error::{Error, Result};
pub use external::{External, ExternalGenerator};
pub use file::{File, FileGenerator};
pub use filesystem::GenFs;
pub use generator::{Embed, Generator};
pub use handle::FileHandle;
pub use local::LocalFs;
pub use memory::MemoryFs;
pub use scoped::ScopedFs;
pub use serve::FileServer;
pub use session::Session;
pub use traits::{EmptyFs, Filesystem};
pub use vfile::VirtualFile;

// Pattern matching (re-exported from genfs-glob).
pub use genfs_glob as glob;
