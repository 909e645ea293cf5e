//! MakeDirectory instruction payload
//!
//! Used for directories a layout requires even when the mod ships nothing
//! inside them, such as an empty plugin container.

use serde::Serialize;

use crate::install::vfs::ModPath;

/// Create an (empty) directory under the install root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakeDirectory {
    /// Destination path relative to the install root
    pub destination: ModPath,
}

impl MakeDirectory {
    pub fn new(destination: ModPath) -> Self {
        Self { destination }
    }
}
