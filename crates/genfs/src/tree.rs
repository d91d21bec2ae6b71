//! The path-keyed generator tree.
//!
//! Nodes are keyed by path segment and tagged with a [`Mode`]: filler
//! directories created implicitly to hold descendants, file generators, and
//! directory generators. Registration follows a strict transition table —
//! a filler directory may be upgraded to a directory generator, a directory
//! generator accumulates generators, a file generator's single generator is
//! replaced; everything else is an error.
//!
//! The tree is shared behind one lock. Every operation acquires it for its
//! own duration only, so generator callbacks are free to re-enter the
//! registration methods while the resolver runs.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::entry::DirEntry;
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::mode::Mode;
use crate::path;
use crate::session::Session;
use crate::vfile::VirtualFile;

struct Node {
    name: String,
    path: String,
    mode: Mode,
    generators: Vec<Arc<dyn Generator>>,
    children: BTreeMap<String, Node>,
}

impl Node {
    fn root() -> Self {
        Self::filler(".", ".")
    }

    fn filler(name: &str, path: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            mode: Mode::DIR,
            generators: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    fn gen_file(name: &str, path: impl Into<String>, generator: Arc<dyn Generator>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            mode: Mode::GEN,
            generators: vec![generator],
            children: BTreeMap::new(),
        }
    }

    fn gen_dir(name: &str, path: impl Into<String>, generator: Arc<dyn Generator>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            mode: Mode::GEN_DIR,
            generators: vec![generator],
            children: BTreeMap::new(),
        }
    }
}

pub(crate) struct Tree {
    root: Mutex<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            root: Mutex::new(Node::root()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Node> {
        // A poisoned lock means a callback panicked between registrations;
        // every individual mutation leaves the tree structurally sound.
        self.root.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Register a file generator at `fpath`, creating filler parents.
    pub fn generate_file(&self, fpath: &str, generator: Arc<dyn Generator>) -> Result<()> {
        let fpath = path::clean(fpath);
        if fpath == "." {
            return Err(Error::AlreadyDirectory(fpath));
        }
        let mut root = self.lock();
        let parent = mkdir_all(&mut root, path::parent(&fpath))?;
        let name = path::base(&fpath);
        match parent.children.get_mut(name) {
            None => {
                parent
                    .children
                    .insert(name.to_string(), Node::gen_file(name, fpath.clone(), generator));
            }
            // Last registration wins for an exact file path.
            Some(child) if child.mode.is_gen_file() => {
                child.generators = vec![generator];
            }
            Some(_) => return Err(Error::AlreadyDirectory(fpath)),
        }
        tracing::debug!(path = %fpath, "registered file generator");
        Ok(())
    }

    /// Register a directory generator at `fpath`, creating filler parents.
    ///
    /// Directory generators are additive: the same directory may be produced
    /// by several registrations, and `"."` turns the root itself into a
    /// directory generator.
    pub fn generate_dir(&self, fpath: &str, generator: Arc<dyn Generator>) -> Result<()> {
        let fpath = path::clean(fpath);
        let mut root = self.lock();
        if fpath == "." {
            root.mode = root.mode | Mode::GEN;
            root.generators.push(generator);
            return Ok(());
        }
        let parent = mkdir_all(&mut root, path::parent(&fpath))?;
        let name = path::base(&fpath);
        match parent.children.get_mut(name) {
            None => {
                parent
                    .children
                    .insert(name.to_string(), Node::gen_dir(name, fpath.clone(), generator));
            }
            Some(child) if child.mode.is_dir() => {
                child.mode = child.mode | Mode::GEN;
                child.generators.push(generator);
            }
            Some(_) => return Err(Error::AlreadyFile(fpath)),
        }
        tracing::debug!(path = %fpath, "registered directory generator");
        Ok(())
    }

    /// Exact-match lookup.
    pub fn find(&self, fpath: &str) -> Option<Match> {
        let fpath = path::clean(fpath);
        let root = self.lock();
        lookup(&root, &fpath).map(Match::of)
    }

    /// Longest-prefix lookup.
    ///
    /// Descends segment by segment; a segment missing at a directory node
    /// makes that directory the result, while a segment missing at a
    /// non-directory node is a miss. The root matches the prefix of any
    /// path.
    pub fn find_prefix(&self, fpath: &str) -> Option<Match> {
        let fpath = path::clean(fpath);
        let root = self.lock();
        if fpath == "." {
            return Some(Match::of(&root));
        }
        let mut node = &*root;
        for seg in fpath.split('/') {
            match node.children.get(seg) {
                Some(child) => node = child,
                None if node.mode.is_dir() => break,
                None => return None,
            }
        }
        Some(Match::of(node))
    }

    /// Sorted entries for the children of the node at `fpath`; empty if the
    /// node is absent.
    pub fn entries(&self, fpath: &str) -> Vec<DirEntry> {
        let root = self.lock();
        match lookup(&root, &path::clean(fpath)) {
            Some(node) => node
                .children
                .values()
                .map(|child| {
                    if child.mode.is_dir() {
                        DirEntry::directory(child.name.clone())
                    } else {
                        DirEntry::file(child.name.clone(), 0)
                    }
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Remove the node at `fpath` and all descendants; no-op when absent.
    /// `delete(".")` resets the tree to an empty root.
    pub fn delete(&self, fpath: &str) {
        let fpath = path::clean(fpath);
        let mut root = self.lock();
        if fpath == "." {
            *root = Node::root();
            return;
        }
        let parent = path::parent(&fpath);
        let mut node = &mut *root;
        if parent != "." {
            for seg in parent.split('/') {
                match node.children.get_mut(seg) {
                    Some(child) => node = child,
                    None => return,
                }
            }
        }
        node.children.remove(path::base(&fpath));
    }

    /// Render the tree with per-node modes, for debugging.
    pub fn print(&self) -> String {
        let root = self.lock();
        let mut out = String::new();
        print_node(&root, 0, &mut out);
        out
    }
}

fn print_node(node: &Node, depth: usize, out: &mut String) {
    let _ = writeln!(
        out,
        "{:indent$}{} mode={}",
        "",
        node.name,
        node.mode,
        indent = depth * 2
    );
    for child in node.children.values() {
        print_node(child, depth + 1, out);
    }
}

fn lookup<'n>(root: &'n Node, fpath: &str) -> Option<&'n Node> {
    if fpath == "." {
        return Some(root);
    }
    let mut node = root;
    for seg in fpath.split('/') {
        node = node.children.get(seg)?;
    }
    Some(node)
}

/// Walk `dir`, creating missing filler directories, and return the final
/// node. Errors when any segment lands on a non-directory.
fn mkdir_all<'n>(root: &'n mut Node, dir: &str) -> Result<&'n mut Node> {
    let mut node = root;
    if dir != "." {
        for seg in dir.split('/') {
            if !node.mode.is_dir() {
                return Err(Error::AlreadyFile(node.path.clone()));
            }
            let child_path = path::join(&node.path, seg);
            node = node
                .children
                .entry(seg.to_string())
                .or_insert_with(|| Node::filler(seg, child_path));
        }
    }
    if !node.mode.is_dir() {
        return Err(Error::AlreadyFile(node.path.clone()));
    }
    Ok(node)
}

/// A value view of a found node.
///
/// The generator handles are cloned out so no tree borrow is held while a
/// callback runs; entry lists are recomputed from the live tree after the
/// callbacks, never cached across them.
pub(crate) struct Match {
    path: String,
    mode: Mode,
    generators: Vec<Arc<dyn Generator>>,
}

impl Match {
    fn of(node: &Node) -> Self {
        Self {
            path: node.path.clone(),
            mode: node.mode,
            generators: node.generators.clone(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Produce the payload for this node.
    pub fn generate(&self, session: Session<'_>, target: &str) -> Result<VirtualFile> {
        if self.mode.is_gen_dir() {
            self.generate_gen_dir(session, target)
        } else if self.mode.is_gen_file() {
            self.generate_gen_file(session, target)
        } else {
            Ok(self.dir_payload(session))
        }
    }

    /// Run every directory generator in registration order so they can
    /// register descendants, then list the children the tree ended up with.
    ///
    /// Returned directory payloads are discarded in favor of the tree's own
    /// children, and a generator reporting not-exist has merely declined.
    /// The one payload used directly is a prefix server's: a regular file
    /// produced for the exact requested target.
    fn generate_gen_dir(&self, session: Session<'_>, target: &str) -> Result<VirtualFile> {
        for generator in &self.generators {
            match generator.generate(session, target) {
                Ok(vfile) if target != self.path && !vfile.is_dir() && vfile.path == target => {
                    return Ok(vfile);
                }
                Ok(_) => {}
                Err(err) if err.is_not_exist() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(self.dir_payload(session))
    }

    fn generate_gen_file(&self, session: Session<'_>, target: &str) -> Result<VirtualFile> {
        if self.generators.len() != 1 {
            return Err(Error::GeneratorCount {
                path: self.path.clone(),
                count: self.generators.len(),
            });
        }
        self.generators[0].generate(session, target)
    }

    fn dir_payload(&self, session: Session<'_>) -> VirtualFile {
        VirtualFile::dir_with_entries(self.path.clone(), session.tree.entries(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A generator stub that always declines.
    struct Declines;

    impl Generator for Declines {
        fn generate(&self, _session: Session<'_>, target: &str) -> Result<VirtualFile> {
            Err(Error::NotExist(target.to_string()))
        }
    }

    fn stub() -> Arc<dyn Generator> {
        Arc::new(Declines)
    }

    #[test]
    fn new_tree_has_filler_root() {
        let tree = Tree::new();
        let m = tree.find(".").unwrap();
        assert!(m.mode().is_dir());
        assert!(!m.mode().is_gen());
        assert_eq!(m.path(), ".");
    }

    #[test]
    fn file_registration_creates_filler_parents() {
        let tree = Tree::new();
        tree.generate_file("bud/public/tailwind/tailwind.css", stub()).unwrap();

        let m = tree.find("bud").unwrap();
        assert!(m.mode().is_dir() && !m.mode().is_gen());
        let m = tree.find("bud/public/tailwind/tailwind.css").unwrap();
        assert!(m.mode().is_gen_file());

        // Every node's path is the cleaned concatenation of ancestor names.
        assert_eq!(tree.find("bud/public").unwrap().path(), "bud/public");
    }

    #[test]
    fn file_generator_is_replaced() {
        let tree = Tree::new();
        tree.generate_file("a.txt", stub()).unwrap();
        tree.generate_file("a.txt", stub()).unwrap();
        let m = tree.find("a.txt").unwrap();
        assert!(m.mode().is_gen_file());
        assert_eq!(m.generators.len(), 1);
    }

    #[test]
    fn dir_generators_accumulate() {
        let tree = Tree::new();
        tree.generate_dir("bud/view", stub()).unwrap();
        tree.generate_dir("bud/view", stub()).unwrap();
        let m = tree.find("bud/view").unwrap();
        assert!(m.mode().is_gen_dir());
        assert_eq!(m.generators.len(), 2);
    }

    #[test]
    fn filler_upgrades_to_gen_dir() {
        let tree = Tree::new();
        tree.generate_file("bud/view/index.svelte", stub()).unwrap();
        tree.generate_dir("bud/view", stub()).unwrap();
        let m = tree.find("bud/view").unwrap();
        assert!(m.mode().is_gen_dir());
        assert_eq!(m.generators.len(), 1);
        // The upgrade keeps existing children.
        assert!(tree.find("bud/view/index.svelte").is_some());
    }

    #[test]
    fn root_becomes_gen_dir() {
        let tree = Tree::new();
        tree.generate_dir(".", stub()).unwrap();
        let m = tree.find(".").unwrap();
        assert!(m.mode().is_gen_dir());
    }

    #[test]
    fn illegal_transitions_error() {
        let tree = Tree::new();
        tree.generate_file("a.txt", stub()).unwrap();
        // file -> dir
        assert!(matches!(
            tree.generate_dir("a.txt", stub()),
            Err(Error::AlreadyFile(_))
        ));
        // file as parent
        assert!(matches!(
            tree.generate_file("a.txt/b.txt", stub()),
            Err(Error::AlreadyFile(_))
        ));

        tree.generate_dir("bud", stub()).unwrap();
        // dir -> file
        assert!(matches!(
            tree.generate_file("bud", stub()),
            Err(Error::AlreadyDirectory(_))
        ));
        // root -> file
        assert!(matches!(
            tree.generate_file(".", stub()),
            Err(Error::AlreadyDirectory(_))
        ));
    }

    #[test]
    fn find_misses() {
        let tree = Tree::new();
        tree.generate_file("a.txt", stub()).unwrap();
        assert!(tree.find("b.txt").is_none());
        assert!(tree.find("a.txt/nested").is_none());
    }

    #[test]
    fn find_prefix_stops_at_deepest_dir() {
        let tree = Tree::new();
        tree.generate_dir("bud/view", stub()).unwrap();

        let m = tree.find_prefix("bud/view/index.svelte").unwrap();
        assert_eq!(m.path(), "bud/view");
        assert!(m.mode().is_gen_dir());

        // Exact nodes are returned as their own prefix.
        let m = tree.find_prefix("bud/view").unwrap();
        assert_eq!(m.path(), "bud/view");

        // The root matches the prefix of any path.
        let m = tree.find_prefix("nothing/here").unwrap();
        assert_eq!(m.path(), ".");
    }

    #[test]
    fn find_prefix_fails_through_files() {
        let tree = Tree::new();
        tree.generate_file("a.txt", stub()).unwrap();
        assert!(tree.find_prefix("a.txt/nested").is_none());
    }

    #[test]
    fn entries_are_sorted() {
        let tree = Tree::new();
        tree.generate_file("bud/view.svelte", stub()).unwrap();
        tree.generate_dir("bud/controller", stub()).unwrap();
        tree.generate_file("bud/about.txt", stub()).unwrap();

        let entries = tree.entries("bud");
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["about.txt", "controller", "view.svelte"]);
        assert!(entries[1].is_dir());
        assert!(entries[0].is_file());
    }

    #[test]
    fn delete_removes_subtree() {
        let tree = Tree::new();
        tree.generate_file("bud/view/index.svelte", stub()).unwrap();
        tree.generate_file("bud/public/app.css", stub()).unwrap();

        tree.delete("bud/view");
        assert!(tree.find("bud/view").is_none());
        assert!(tree.find("bud/view/index.svelte").is_none());
        assert!(tree.find("bud/public/app.css").is_some());

        // Deleting something absent is a no-op.
        tree.delete("bud/view");
        tree.delete("missing/deep/path");
    }

    #[test]
    fn delete_root_resets() {
        let tree = Tree::new();
        tree.generate_dir(".", stub()).unwrap();
        tree.generate_file("a.txt", stub()).unwrap();
        tree.delete(".");
        let m = tree.find(".").unwrap();
        assert!(!m.mode().is_gen());
        assert!(tree.find("a.txt").is_none());
        assert!(tree.entries(".").is_empty());
    }

    #[test]
    fn print_renders_modes() {
        let tree = Tree::new();
        tree.generate_file("bud/view/index.svelte", stub()).unwrap();
        tree.generate_dir("bud/controller", stub()).unwrap();
        let out = tree.print();
        assert!(out.starts_with(". mode=d-\n"));
        assert!(out.contains("  bud mode=d-\n"));
        assert!(out.contains("    controller mode=dg\n"));
        assert!(out.contains("    view mode=d-\n"));
        assert!(out.contains("      index.svelte mode=-g\n"));
    }
}
