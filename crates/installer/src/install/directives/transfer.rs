//! File transfer instruction payload
//!
//! Shared by the `copy` and `move` instructions: both name one existing file
//! in the archive and the place it lands under the install root.

use serde::Serialize;

use crate::install::vfs::ModPath;

/// Place one archive file at a destination relative to the install root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTransfer {
    /// File in the archive
    pub source: ModPath,
    /// Destination path relative to the install root
    pub destination: ModPath,
}

impl FileTransfer {
    /// Create a new transfer
    pub fn new(source: ModPath, destination: ModPath) -> Self {
        Self { source, destination }
    }

    /// Whether the file stays where the archive already has it
    pub fn is_identity(&self) -> bool {
        self.source == self.destination
    }
}
