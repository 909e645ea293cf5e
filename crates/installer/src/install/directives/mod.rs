//! Install instructions
//!
//! The planner never touches the filesystem: it produces a list of
//! instructions that the host turns into real file operations when it stages
//! the mod. Each instruction kind has its payload in its own file, and the
//! helpers that build instruction lists live in `common_directive_utils`.

use serde::Serialize;

use crate::install::vfs::ModPath;

pub mod common_directive_utils;
pub mod make_directory;
pub mod transfer;

pub use common_directive_utils::{
    ensure_unique_destinations, instructions_for_same_source_and_dest_paths,
    instructions_for_source_to_dest_pairs, merge_instruction_groups, move_from_to,
};
pub use make_directory::MakeDirectory;
pub use transfer::FileTransfer;

/// One planned file operation
///
/// Serialized in the host's instruction format:
/// `{"type": "copy", "source": .., "destination": ..}`,
/// `{"type": "move", ..}` or `{"type": "mkdir", "destination": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Instruction {
    /// Place a file, keeping the archive copy
    #[serde(rename = "copy")]
    Copy(FileTransfer),
    /// Relocate a file; the source is not expected to be retained
    #[serde(rename = "move")]
    Move(FileTransfer),
    /// Create a required directory that has no files
    #[serde(rename = "mkdir")]
    MakeDirectory(MakeDirectory),
}

impl Instruction {
    pub fn copy(source: ModPath, destination: ModPath) -> Self {
        Instruction::Copy(FileTransfer::new(source, destination))
    }

    pub fn relocate(source: ModPath, destination: ModPath) -> Self {
        Instruction::Move(FileTransfer::new(source, destination))
    }

    pub fn make_directory(destination: ModPath) -> Self {
        Instruction::MakeDirectory(MakeDirectory::new(destination))
    }

    /// Get the destination path for any instruction type
    pub fn destination(&self) -> &ModPath {
        match self {
            Instruction::Copy(t) | Instruction::Move(t) => &t.destination,
            Instruction::MakeDirectory(d) => &d.destination,
        }
    }

    /// Get the archive source, if the instruction has one
    pub fn source(&self) -> Option<&ModPath> {
        match self {
            Instruction::Copy(t) | Instruction::Move(t) => Some(&t.source),
            Instruction::MakeDirectory(_) => None,
        }
    }

    /// Name of the instruction type in the host format
    pub fn kind(&self) -> &'static str {
        match self {
            Instruction::Copy(_) => "copy",
            Instruction::Move(_) => "move",
            Instruction::MakeDirectory(_) => "mkdir",
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Copy(t) | Instruction::Move(t) => {
                write!(f, "{} {} -> {}", self.kind(), t.source, t.destination)
            }
            Instruction::MakeDirectory(d) => write!(f, "mkdir {}", d.destination),
        }
    }
}
