//! Installation error types

use thiserror::Error;

use crate::install::layouts::InstallerType;

/// Errors that can end an installation attempt.
///
/// Every variant that reaches the host carries the file list that caused it,
/// so the failure can be shown to the user alongside the archive contents.
/// "This archive is not shaped like X" is never an error: detectors report
/// it as [`crate::install::layouts::LayoutMatch::NoMatch`].
#[derive(Debug, Error)]
pub enum InstallError {
    /// Malformed archive listing: absolute paths, `..` escapes, oversized
    /// entries, or an entry that is both a file and a directory. `files` is
    /// the listing as the host passed it.
    #[error("Invalid path '{path}': {reason}")]
    InvalidInput {
        path: String,
        reason: String,
        files: Vec<String>,
    },

    /// Two planned instructions write to the same destination. This is a
    /// detector bug, never a property of the mod.
    #[error("Duplicate install destination '{destination}' planned for {files:?}")]
    DuplicateDestination {
        destination: String,
        files: Vec<String>,
    },

    /// A family recognized the mod but its structure has no correction path
    #[error("{installer}: {message}")]
    InvalidLayout {
        installer: InstallerType,
        message: String,
        files: Vec<String>,
    },

    /// The user declined to install a mod whose layout couldn't be resolved
    #[error("{installer}: user chose to cancel the installation")]
    UserCancelled {
        installer: InstallerType,
        files: Vec<String>,
    },

    /// The catalog has no layout description to show for this installer
    #[error("No layout description found for {installer}")]
    MissingLayoutDescription {
        installer: InstallerType,
        files: Vec<String>,
    },

    /// The prompt collaborator failed before the user could decide
    #[error("{installer}: couldn't ask the user how to proceed")]
    Prompt {
        installer: InstallerType,
        files: Vec<String>,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, InstallError>;

impl InstallError {
    /// Files that triggered the failure, for diagnostic display
    pub fn files(&self) -> &[String] {
        match self {
            InstallError::InvalidInput { files, .. }
            | InstallError::DuplicateDestination { files, .. }
            | InstallError::InvalidLayout { files, .. }
            | InstallError::UserCancelled { files, .. }
            | InstallError::MissingLayoutDescription { files, .. }
            | InstallError::Prompt { files, .. } => files,
        }
    }

    /// True for programming-level defects rather than bad mod data or a user choice
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            InstallError::DuplicateDestination { .. } | InstallError::MissingLayoutDescription { .. }
        )
    }

    /// True when the attempt ended because the user said no
    pub fn is_user_cancellation(&self) -> bool {
        matches!(self, InstallError::UserCancelled { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            InstallError::InvalidInput { .. } => "invalid_input",
            InstallError::DuplicateDestination { .. } => "duplicate_destination",
            InstallError::InvalidLayout { .. } => "invalid_layout",
            InstallError::UserCancelled { .. } => "user_cancelled",
            InstallError::MissingLayoutDescription { .. } => "missing_layout_description",
            InstallError::Prompt { .. } => "prompt",
        }
    }
}
