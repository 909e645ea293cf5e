//! In-memory file tree built from the flat archive listing
//!
//! The tree is an arena of nodes indexed by position, with the root at index
//! 0. It is built once per installation attempt and never mutated
//! afterwards, so the detectors can share it freely by reference.
//!
//! Directories are inferred from file paths; an input entry with a trailing
//! separator declares a directory explicitly (possibly an empty one).
//! Children keep insertion order, which makes every listing, and therefore
//! every instruction list built from one, deterministic.

use std::collections::HashMap;

use crate::install::error::{InstallError, Result};
use crate::install::vfs::glob::Glob;
use crate::install::vfs::path::ModPath;

const ROOT: usize = 0;

#[derive(Debug, Clone)]
enum NodeKind {
    File,
    Directory {
        children: Vec<usize>,
        /// lower-cased child name -> node index
        index: HashMap<String, usize>,
    },
}

#[derive(Debug, Clone)]
struct Node {
    path: ModPath,
    kind: NodeKind,
}

impl Node {
    fn directory(path: ModPath) -> Self {
        Self {
            path,
            kind: NodeKind::Directory {
                children: Vec::new(),
                index: HashMap::new(),
            },
        }
    }

    fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File)
    }
}

/// Immutable, queryable view of a mod archive's contents
#[derive(Debug, Clone)]
pub struct FileTree {
    nodes: Vec<Node>,
    /// File nodes in input order
    sources: Vec<usize>,
}

impl FileTree {
    /// Build a tree from the archive listing.
    ///
    /// Fails with [`InstallError::InvalidInput`], carrying the whole listing,
    /// when an entry is absolute, escapes the root, exceeds the path limits
    /// or is used both as a file and as a directory.
    /// Repeated entries (compared case-insensitively) are merged and the
    /// first spelling is kept.
    pub fn build<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let listing: Vec<S> = paths.into_iter().collect();
        let mut tree = Self {
            nodes: vec![Node::directory(ModPath::root())],
            sources: Vec::new(),
        };

        for raw in &listing {
            let raw = raw.as_ref();
            ModPath::normalize(raw)
                .and_then(|entry| tree.insert(raw, &entry.path, entry.is_directory))
                .map_err(|err| with_listing(err, &listing))?;
        }

        Ok(tree)
    }

    fn insert(&mut self, raw: &str, path: &ModPath, is_directory: bool) -> Result<()> {
        let segments: Vec<&str> = path.segments().collect();
        let mut current = ROOT;
        let mut walked = ModPath::root();

        for (position, segment) in segments.iter().enumerate() {
            let is_leaf = position + 1 == segments.len();
            let wants_file = is_leaf && !is_directory;
            walked = walked.join(segment);

            let existing = match &self.nodes[current].kind {
                NodeKind::Directory { index, .. } => index.get(&segment.to_ascii_lowercase()).copied(),
                NodeKind::File => None,
            };

            current = match existing {
                Some(child) => {
                    if self.nodes[child].is_file() != wants_file {
                        return Err(InstallError::InvalidInput {
                            path: raw.to_string(),
                            reason: format!("'{}' is used both as a file and as a directory", walked),
                            files: vec![raw.to_string()],
                        });
                    }
                    child
                }
                None => {
                    let child = self.nodes.len();
                    let node = if wants_file {
                        Node { path: walked.clone(), kind: NodeKind::File }
                    } else {
                        Node::directory(walked.clone())
                    };
                    self.nodes.push(node);
                    if let NodeKind::Directory { children, index } = &mut self.nodes[current].kind {
                        children.push(child);
                        index.insert(segment.to_ascii_lowercase(), child);
                    }
                    if wants_file {
                        self.sources.push(child);
                    }
                    child
                }
            };
        }

        Ok(())
    }

    fn find(&self, path: &str) -> Option<usize> {
        path.split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .try_fold(ROOT, |current, segment| match &self.nodes[current].kind {
                NodeKind::Directory { index, .. } => index.get(&segment.to_ascii_lowercase()).copied(),
                NodeKind::File => None,
            })
    }

    fn children(&self, node: usize) -> &[usize] {
        match &self.nodes[node].kind {
            NodeKind::Directory { children, .. } => children,
            NodeKind::File => &[],
        }
    }

    /// Whether a file or directory exists at `path`
    pub fn exists(&self, path: impl AsRef<str>) -> bool {
        self.find(path.as_ref()).is_some()
    }

    pub fn is_directory(&self, path: impl AsRef<str>) -> bool {
        self.find(path.as_ref())
            .is_some_and(|node| !self.nodes[node].is_file())
    }

    pub fn is_file(&self, path: impl AsRef<str>) -> bool {
        self.find(path.as_ref())
            .is_some_and(|node| self.nodes[node].is_file())
    }

    /// Every file below `base` whose path relative to `base` matches `glob`.
    ///
    /// Walks depth-first; inside each directory its own files come first,
    /// then its subdirectories, both in insertion order.
    pub fn files_under(&self, base: impl AsRef<str>, glob: &Glob) -> Vec<ModPath> {
        let base = base.as_ref();
        let Some(start) = self.find(base) else {
            return Vec::new();
        };
        if self.nodes[start].is_file() {
            return Vec::new();
        }

        let base_path = self.nodes[start].path.clone();
        self.walk_files(start)
            .into_iter()
            .filter(|path| {
                path.strip_dir_prefix(base_path.as_str())
                    .is_some_and(|relative| glob.matches(relative))
            })
            .cloned()
            .collect()
    }

    /// Files below `node` in walk order, using an explicit stack
    fn walk_files(&self, node: usize) -> Vec<&ModPath> {
        let mut files = Vec::new();
        let mut pending = vec![node];

        while let Some(dir) = pending.pop() {
            let children = self.children(dir);
            files.extend(
                children
                    .iter()
                    .filter(|&&child| self.nodes[child].is_file())
                    .map(|&child| &self.nodes[child].path),
            );
            // reversed so the first subdirectory is walked next
            pending.extend(
                children
                    .iter()
                    .rev()
                    .filter(|&&child| !self.nodes[child].is_file()),
            );
        }

        files
    }

    /// Files directly inside `dir`
    pub fn files_in(&self, dir: impl AsRef<str>) -> Vec<ModPath> {
        self.files_under(dir, &Glob::direct())
    }

    /// Immediate subdirectories of `dir`
    pub fn subdirs_in(&self, dir: impl AsRef<str>) -> Vec<ModPath> {
        let Some(node) = self.find(dir.as_ref()) else {
            return Vec::new();
        };
        self.children(node)
            .iter()
            .filter(|&&child| !self.nodes[child].is_file())
            .map(|&child| self.nodes[child].path.clone())
            .collect()
    }

    /// Immediate subdirectories of `base` holding at least one file, at
    /// their own top level, for which `predicate` holds. Files nested deeper
    /// inside the subdirectory are not considered.
    pub fn direct_subdirs_with_some<F>(&self, base: impl AsRef<str>, predicate: F) -> Vec<ModPath>
    where
        F: Fn(&ModPath) -> bool,
    {
        let Some(node) = self.find(base.as_ref()) else {
            return Vec::new();
        };
        self.children(node)
            .iter()
            .filter(|&&child| !self.nodes[child].is_file())
            .filter(|&&child| {
                self.children(child)
                    .iter()
                    .any(|&leaf| self.nodes[leaf].is_file() && predicate(&self.nodes[leaf].path))
            })
            .map(|&child| self.nodes[child].path.clone())
            .collect()
    }

    /// Directories with nothing inside them, in the order they were first
    /// seen. These only exist when the input declared them explicitly.
    pub fn empty_dirs(&self) -> Vec<ModPath> {
        self.nodes
            .iter()
            .skip(ROOT + 1)
            .filter(|node| matches!(&node.kind, NodeKind::Directory { children, .. } if children.is_empty()))
            .map(|node| node.path.clone())
            .collect()
    }

    /// Total number of files (directories excluded)
    pub fn file_count(&self) -> usize {
        self.sources.len()
    }

    /// All files in the order they were listed in the input
    pub fn source_paths(&self) -> Vec<ModPath> {
        self.sources
            .iter()
            .map(|&node| self.nodes[node].path.clone())
            .collect()
    }

    /// [`Self::source_paths`] rendered for diagnostics
    pub fn source_path_strings(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|&node| self.nodes[node].path.to_string())
            .collect()
    }
}

/// Replace the single offending entry with the full listing
fn with_listing<S: AsRef<str>>(err: InstallError, listing: &[S]) -> InstallError {
    match err {
        InstallError::InvalidInput { path, reason, .. } => InstallError::InvalidInput {
            path,
            reason,
            files: listing.iter().map(|raw| raw.as_ref().to_string()).collect(),
        },
        other => other,
    }
}
