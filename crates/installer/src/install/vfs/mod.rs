//! Virtual view of a mod archive's contents
//!
//! Nothing here touches the disk: the tree is built from the flat path list
//! the host extracted, and every query is answered from memory.

pub mod glob;
pub mod path;
pub mod tree;

pub use glob::Glob;
pub use path::{ModPath, NormalizedEntry};
pub use tree::FileTree;

/// Path of the tree root, for queries that start at the top of the archive
pub const FILETREE_ROOT: &str = "";
