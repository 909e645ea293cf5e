//! The human-decision seam
//!
//! The installer never talks to the user directly. When a layout can't be
//! resolved it hands a title, a markdown explanation and the mod's file list
//! to an [`InstallPrompt`] and waits for a single [`InstallDecision`].

use std::fmt;

use async_trait::async_trait;

/// The user's answer to a proceed-or-cancel prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallDecision {
    /// Stage every file as-is, unverified
    Proceed,
    Cancel,
}

/// Button labels offered with every proceed-or-cancel prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallChoices {
    Proceed,
    Cancel,
}

impl InstallChoices {
    pub fn label(&self) -> &'static str {
        match self {
            InstallChoices::Proceed => "Yes, Install To Staging Anyway",
            InstallChoices::Cancel => "No, Cancel Installation",
        }
    }

    pub fn decision(&self) -> InstallDecision {
        match self {
            InstallChoices::Proceed => InstallDecision::Proceed,
            InstallChoices::Cancel => InstallDecision::Cancel,
        }
    }
}

impl fmt::Display for InstallChoices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Asks a human whether to install a mod the installer couldn't resolve.
///
/// Implementations may take as long as they like: the installation attempt
/// waits for the answer without a timeout.
#[async_trait]
pub trait InstallPrompt: Send + Sync {
    /// Present the explanation and return the user's decision
    async fn ask_proceed_or_cancel(
        &self,
        title: &str,
        markdown: &str,
        files: &[String],
    ) -> anyhow::Result<InstallDecision>;

    /// Show an informational notice that needs no answer.
    ///
    /// Used for rejected mods and for installs that may need manual
    /// adjustment. Failures here never affect the installation.
    async fn notify(&self, _title: &str, _markdown: &str, _files: &[String]) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A prompt that always gives the same answer, for non-interactive hosts
#[derive(Debug, Clone, Copy)]
pub struct FixedDecisionPrompt {
    decision: InstallDecision,
}

impl FixedDecisionPrompt {
    pub fn new(decision: InstallDecision) -> Self {
        Self { decision }
    }

    pub fn proceed() -> Self {
        Self::new(InstallDecision::Proceed)
    }

    pub fn cancel() -> Self {
        Self::new(InstallDecision::Cancel)
    }
}

#[async_trait]
impl InstallPrompt for FixedDecisionPrompt {
    async fn ask_proceed_or_cancel(
        &self,
        title: &str,
        _markdown: &str,
        files: &[String],
    ) -> anyhow::Result<InstallDecision> {
        tracing::info!(title, decision = ?self.decision, file_count = files.len(), "Answering prompt with fixed decision");
        Ok(self.decision)
    }
}
