//! Conflict and fallback policy
//!
//! Decides what happens when layout selection doesn't produce instructions:
//! reject the mod, or ask the user whether to stage everything unverified.
//! The system never guesses a correction on the user's behalf.

use std::fmt;

use tracing::{error, info, warn};

use crate::install::config::InstallerConfig;
use crate::install::dialogs::{
    conflict_explanation, fallback_explanation, rejection_explanation, CONFLICT_TITLE, FALLBACK_TITLE,
};
use crate::install::directives::{instructions_for_same_source_and_dest_paths, Instruction};
use crate::install::error::{InstallError, Result};
use crate::install::layouts::{InstallerType, LayoutCatalog};
use crate::install::prompt::{InstallDecision, InstallPrompt};
use crate::install::vfs::FileTree;

/// Where an installation attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Detecting,
    /// One detector matched cleanly
    Resolved,
    /// A family recognized the mod but couldn't settle on a layout
    AmbiguousPendingUser,
    /// No family recognized the mod
    Unmatched,
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionState::Detecting => "detecting",
            ResolutionState::Resolved => "resolved",
            ResolutionState::AmbiguousPendingUser => "ambiguous, pending user",
            ResolutionState::Unmatched => "unmatched",
        };
        f.write_str(name)
    }
}

/// How a successful attempt got its instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A layout matched; instructions are its own
    Resolved,
    /// The user chose to stage everything after a conflict
    ProceededOnConflict,
    /// The user chose to stage everything from the fallback installer
    ProceededOnFallback,
}

impl Resolution {
    /// Whether the instructions went through layout verification
    pub fn is_verified(&self) -> bool {
        matches!(self, Resolution::Resolved)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resolution::Resolved => "resolved",
            Resolution::ProceededOnConflict => "proceeded on conflict",
            Resolution::ProceededOnFallback => "proceeded on fallback",
        };
        f.write_str(name)
    }
}

/// Identity placement for every file in input order, plus any directories
/// the archive declared empty
pub fn stage_everything(tree: &FileTree) -> Result<Vec<Instruction>> {
    instructions_for_same_source_and_dest_paths(&tree.source_paths(), &tree.empty_dirs())
}

/// Runs the user-facing side of a failed or missing layout selection
pub struct FallbackPolicy<'a> {
    prompt: &'a dyn InstallPrompt,
    config: &'a InstallerConfig,
    catalog: &'a LayoutCatalog,
}

impl<'a> FallbackPolicy<'a> {
    pub fn new(prompt: &'a dyn InstallPrompt, config: &'a InstallerConfig, catalog: &'a LayoutCatalog) -> Self {
        Self { prompt, config, catalog }
    }

    /// A prompting family couldn't resolve the mod: ask whether to stage it anyway
    pub async fn on_conflict(&self, installer: InstallerType, tree: &FileTree) -> Result<Vec<Instruction>> {
        let files = tree.source_path_strings();
        error!(files = ?files, "{}: conflicting layouts, can't install automatically", installer);

        let explanation = conflict_explanation(self.catalog, installer, &files)?;

        let decision = if self.config.prompt_on_conflict {
            info!("Asking user to proceed/cancel installation");
            self.ask(installer, CONFLICT_TITLE, &explanation, &files).await?
        } else {
            info!("{}: prompting disabled, cancelling", installer);
            InstallDecision::Cancel
        };

        self.apply(installer, decision, tree, files)
    }

    /// Nothing recognized the mod: the fallback installer asks the same question
    pub async fn on_unmatched(&self, tree: &FileTree) -> Result<Vec<Instruction>> {
        let files = tree.source_path_strings();
        info!(files = ?files, "Fallback installer reached, prompting to proceed/cancel");

        let explanation = fallback_explanation(&files);
        let decision = self
            .ask(InstallerType::Fallback, FALLBACK_TITLE, &explanation, &files)
            .await?;

        self.apply(InstallerType::Fallback, decision, tree, files)
    }

    /// A rejecting family couldn't resolve the mod. Shows the reason and
    /// returns the error that ends the attempt.
    pub async fn reject(&self, installer: InstallerType, message: &str, files: Vec<String>) -> InstallError {
        error!(files = ?files, "{}: {}", installer, message);

        let explanation = rejection_explanation(self.catalog, installer, message, &files);
        if let Err(err) = self.prompt.notify(message, &explanation, &files).await {
            warn!("{}: couldn't show the rejection notice: {:#}", installer, err);
        }

        InstallError::InvalidLayout {
            installer,
            message: message.to_string(),
            files,
        }
    }

    async fn ask(
        &self,
        installer: InstallerType,
        title: &str,
        explanation: &str,
        files: &[String],
    ) -> Result<InstallDecision> {
        self.prompt
            .ask_proceed_or_cancel(title, explanation, files)
            .await
            .map_err(|source| InstallError::Prompt {
                installer,
                files: files.to_vec(),
                source,
            })
    }

    fn apply(
        &self,
        installer: InstallerType,
        decision: InstallDecision,
        tree: &FileTree,
        files: Vec<String>,
    ) -> Result<Vec<Instruction>> {
        match decision {
            InstallDecision::Proceed => {
                info!("{}: user chose to proceed, staging every file as-is", installer);
                stage_everything(tree)
            }
            InstallDecision::Cancel => {
                info!("{}: user chose to cancel installation", installer);
                Err(InstallError::UserCancelled { installer, files })
            }
        }
    }
}
