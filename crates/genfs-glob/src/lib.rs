//! genfs-glob: glob matching for slash-separated virtual paths.
//!
//! Provides:
//! - **glob_match**: shell-style matching for a single path segment
//!   (`*`, `?`, `[a-z]`, `{a,b}` brace alternatives)
//! - **Pattern**: path-aware matching with `**` (globstar), a static-prefix
//!   accessor, and prefix matching so directory walks can prune subtrees the
//!   pattern can never reach
//!
//! Patterns and paths are relative, slash-separated strings; there is no
//! filesystem access here, only matching.

pub mod glob;
mod pattern;

pub use glob::{contains_glob, expand_braces, glob_match};
pub use pattern::{Pattern, PatternError, Segment};
