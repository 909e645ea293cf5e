//! Installation module
//!
//! This module turns the flat file listing of a mod archive into the
//! instructions that install it: detect the mod's layout, correct it where
//! that's unambiguous, and ask the user where it isn't.

pub mod config;
pub mod dialogs;
pub mod directives;
pub mod error;
pub mod layouts;
pub mod lib;
pub mod mod_info;
pub mod policy;
pub mod prompt;
pub mod registry;
pub mod vfs;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::InstallerConfig;
pub use directives::{FileTransfer, Instruction, MakeDirectory};
pub use error::{InstallError, Result};
pub use layouts::{InstallerType, Layout, LayoutCatalog, LayoutMatch};
pub use lib::{InstallOutcome, ModLayoutInstaller};
pub use mod_info::ModInfo;
pub use policy::{Resolution, ResolutionState};
pub use prompt::{FixedDecisionPrompt, InstallChoices, InstallDecision, InstallPrompt};
pub use registry::{InstallerRegistry, LayoutInstaller};
pub use vfs::{FileTree, Glob, ModPath};
