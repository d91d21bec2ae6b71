//! Path-aware patterns with globstar (`**`) support.
//!
//! A [`Pattern`] splits a glob on `/` and matches whole path components:
//!
//! - `**/*.svelte` matches `index.svelte`, `view/index.svelte`, ...
//! - `view/**` matches `view` and everything beneath it
//! - `a/**/z` matches `a/z`, `a/b/z`, `a/b/c/z`
//!
//! [`Pattern::matches_prefix`] answers "could anything under this directory
//! still match?", which lets a walker skip subtrees entirely.

use thiserror::Error;

use crate::glob::{contains_glob, glob_match};

/// Errors from parsing a path pattern.
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,
    #[error("pattern is not relative: {0}")]
    NotRelative(String),
}

/// One component of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Exact component name: `view`, `index.svelte`.
    Literal(String),
    /// Component with wildcards: `*.svelte`, `file?`.
    Wild(String),
    /// `**`: zero or more components.
    Any,
}

/// A parsed, path-aware glob pattern.
///
/// ```
/// use genfs_glob::Pattern;
///
/// let pat = Pattern::new("view/**/*.svelte").unwrap();
/// assert!(pat.matches("view/index.svelte"));
/// assert!(pat.matches("view/about/about.svelte"));
/// assert!(!pat.matches("public/favicon.ico"));
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a relative, slash-separated glob pattern.
    ///
    /// Consecutive `**` components collapse into one.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if pattern.starts_with('/') {
            return Err(PatternError::NotRelative(pattern.to_string()));
        }
        let mut segments = Vec::new();
        for part in pattern.split('/') {
            if part.is_empty() || part == "." {
                continue;
            }
            if part == "**" {
                if segments.last() != Some(&Segment::Any) {
                    segments.push(Segment::Any);
                }
            } else if contains_glob(part) {
                segments.push(Segment::Wild(part.to_string()));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }
        if segments.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self { segments })
    }

    /// The pattern's components.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The leading wildcard-free directory of the pattern, if any.
    ///
    /// A walk can start there instead of at the root.
    ///
    /// ```
    /// use genfs_glob::Pattern;
    /// let pat = Pattern::new("bud/view/**/*.svelte").unwrap();
    /// assert_eq!(pat.static_prefix(), Some("bud/view".to_string()));
    /// assert_eq!(Pattern::new("**/*.rs").unwrap().static_prefix(), None);
    /// ```
    pub fn static_prefix(&self) -> Option<String> {
        let mut parts = Vec::new();
        // The final segment names the match itself, never a directory to
        // start from, so stop one short.
        for segment in &self.segments[..self.segments.len().saturating_sub(1)] {
            match segment {
                Segment::Literal(name) => parts.push(name.as_str()),
                _ => break,
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    /// Check whether `path` matches the whole pattern.
    pub fn matches(&self, path: &str) -> bool {
        let comps = components(path);
        self.match_at(0, &comps, 0)
    }

    /// Check whether a path beneath the directory `dir` could still match.
    ///
    /// This is an over-approximation used for pruning: `false` guarantees no
    /// descendant of `dir` matches, `true` means the walk must descend.
    pub fn matches_prefix(&self, dir: &str) -> bool {
        let comps = components(dir);
        self.prefix_at(0, &comps, 0)
    }

    fn match_at(&self, seg: usize, comps: &[&str], comp: usize) -> bool {
        if seg == self.segments.len() {
            return comp == comps.len();
        }
        match &self.segments[seg] {
            Segment::Any => (comp..=comps.len())
                .any(|next| self.match_at(seg + 1, comps, next)),
            Segment::Literal(name) => {
                comp < comps.len()
                    && comps[comp] == name
                    && self.match_at(seg + 1, comps, comp + 1)
            }
            Segment::Wild(pat) => {
                comp < comps.len()
                    && glob_match(pat, comps[comp])
                    && self.match_at(seg + 1, comps, comp + 1)
            }
        }
    }

    fn prefix_at(&self, seg: usize, comps: &[&str], comp: usize) -> bool {
        if comp == comps.len() {
            // Deeper paths extend comps; only unconsumed segments can match
            // the extension.
            return seg < self.segments.len();
        }
        if seg == self.segments.len() {
            return false;
        }
        match &self.segments[seg] {
            // A globstar absorbs any amount of structure.
            Segment::Any => true,
            Segment::Literal(name) => {
                comps[comp] == name && self.prefix_at(seg + 1, comps, comp + 1)
            }
            Segment::Wild(pat) => {
                glob_match(pat, comps[comp]) && self.prefix_at(seg + 1, comps, comp + 1)
            }
        }
    }
}

/// Split a cleaned relative path into components; the root `"."` has none.
fn components(path: &str) -> Vec<&str> {
    if path.is_empty() || path == "." {
        return Vec::new();
    }
    path.split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_path() {
        let pat = Pattern::new("view/index.svelte").unwrap();
        assert!(pat.matches("view/index.svelte"));
        assert!(!pat.matches("view/about.svelte"));
        assert!(!pat.matches("index.svelte"));
    }

    #[test]
    fn single_component_wildcard() {
        let pat = Pattern::new("*.svelte").unwrap();
        assert!(pat.matches("index.svelte"));
        assert!(!pat.matches("view/index.svelte"));
    }

    #[test]
    fn globstar_prefix() {
        let pat = Pattern::new("**/*.svelte").unwrap();
        assert!(pat.matches("index.svelte"));
        assert!(pat.matches("view/index.svelte"));
        assert!(pat.matches("bud/view/about/about.svelte"));
        assert!(!pat.matches("favicon.ico"));
    }

    #[test]
    fn globstar_suffix() {
        let pat = Pattern::new("view/**").unwrap();
        assert!(pat.matches("view"));
        assert!(pat.matches("view/index.svelte"));
        assert!(pat.matches("view/about/about.svelte"));
        assert!(!pat.matches("public/app.css"));
    }

    #[test]
    fn globstar_middle() {
        let pat = Pattern::new("a/**/z").unwrap();
        assert!(pat.matches("a/z"));
        assert!(pat.matches("a/b/z"));
        assert!(pat.matches("a/b/c/z"));
        assert!(!pat.matches("b/z"));
        assert!(!pat.matches("a/z/deeper"));
    }

    #[test]
    fn consecutive_globstars_collapse() {
        let pat = Pattern::new("a/**/**/z").unwrap();
        assert_eq!(pat.segments().len(), 3);
        assert!(pat.matches("a/z"));
    }

    #[test]
    fn braces_in_component() {
        let pat = Pattern::new("view/*.{svelte,css}").unwrap();
        assert!(pat.matches("view/index.svelte"));
        assert!(pat.matches("view/app.css"));
        assert!(!pat.matches("view/main.go"));
    }

    #[test]
    fn static_prefix() {
        let pat = Pattern::new("bud/view/**/*.svelte").unwrap();
        assert_eq!(pat.static_prefix(), Some("bud/view".to_string()));
        assert_eq!(Pattern::new("**/*.rs").unwrap().static_prefix(), None);
        assert_eq!(Pattern::new("*.rs").unwrap().static_prefix(), None);
        // The last literal names the match, not a directory.
        assert_eq!(Pattern::new("a/b").unwrap().static_prefix(), Some("a".into()));
    }

    #[test]
    fn prefix_pruning() {
        let pat = Pattern::new("view/**/*.svelte").unwrap();
        assert!(pat.matches_prefix("."));
        assert!(pat.matches_prefix("view"));
        assert!(pat.matches_prefix("view/about"));
        assert!(!pat.matches_prefix("public"));

        let pat = Pattern::new("a/b/c.txt").unwrap();
        assert!(pat.matches_prefix("a"));
        assert!(pat.matches_prefix("a/b"));
        assert!(!pat.matches_prefix("a/x"));
        // The full path consumes every segment; nothing deeper can match.
        assert!(!pat.matches_prefix("a/b/c.txt"));
    }

    #[test]
    fn rejects_bad_patterns() {
        assert!(matches!(Pattern::new(""), Err(PatternError::Empty)));
        assert!(matches!(Pattern::new("/abs"), Err(PatternError::NotRelative(_))));
        assert!(matches!(Pattern::new("."), Err(PatternError::Empty)));
    }
}
