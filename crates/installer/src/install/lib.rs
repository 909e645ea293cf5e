//! Layout installer pipeline
//!
//! This module ties the pieces together for one installation attempt:
//! build the file tree, find the installer that owns it, run its layout
//! detectors in order, and hand anything unresolved to the fallback policy.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cp2077_installer::{FixedDecisionPrompt, InstallerConfig, ModInfo, ModLayoutInstaller};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let installer = ModLayoutInstaller::new(
//!     InstallerConfig::default(),
//!     Arc::new(FixedDecisionPrompt::cancel()),
//! );
//!
//! let files = ["Foo/info.json", "Foo/script.reds"];
//! let outcome = installer.install(files, &ModInfo::new("Foo")?).await?;
//!
//! for instruction in &outcome.instructions {
//!     println!("{instruction}");
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::install::config::InstallerConfig;
use crate::install::dialogs::ADJUSTMENT_TITLE;
use crate::install::directives::Instruction;
use crate::install::error::{InstallError, Result};
use crate::install::layouts::{
    select_layout, FailurePolicy, InstallerType, Layout, LayoutCatalog, LayoutContext, LayoutMatch,
};
use crate::install::mod_info::ModInfo;
use crate::install::policy::{FallbackPolicy, Resolution, ResolutionState};
use crate::install::prompt::InstallPrompt;
use crate::install::registry::{InstallerRegistry, LayoutInstaller};
use crate::install::vfs::FileTree;

/// The result of a successful installation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// The installer that owned the attempt
    pub installer: InstallerType,
    /// The layout that produced the instructions (`None` when the user chose
    /// to stage everything)
    pub layout: Option<Layout>,
    pub resolution: Resolution,
    pub instructions: Vec<Instruction>,
}

/// Plans installations of Cyberpunk 2077 mods
pub struct ModLayoutInstaller {
    config: InstallerConfig,
    registry: InstallerRegistry,
    catalog: &'static LayoutCatalog,
    prompt: Arc<dyn InstallPrompt>,
}

impl ModLayoutInstaller {
    /// Create an installer with the standard pipeline for `config`
    pub fn new(config: InstallerConfig, prompt: Arc<dyn InstallPrompt>) -> Self {
        let registry = InstallerRegistry::standard(&config);
        Self {
            config,
            registry,
            catalog: LayoutCatalog::global(),
            prompt,
        }
    }

    /// Replace the installer pipeline
    pub fn with_registry(mut self, registry: InstallerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    pub fn registry(&self) -> &InstallerRegistry {
        &self.registry
    }

    /// Which installer would own these files, without planning anything.
    /// `None` means only the fallback installer would take them.
    pub fn test_supported<I, S>(&self, paths: I) -> Result<Option<InstallerType>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tree = FileTree::build(paths)?;
        Ok(self.registry.find_installer(&tree).map(|i| i.installer_type()))
    }

    /// Plan the installation of a mod from its flat file listing
    pub async fn install<I, S>(&self, paths: I, mod_info: &ModInfo) -> Result<InstallOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tree = FileTree::build(paths)?;
        self.install_tree(&tree, mod_info).await
    }

    /// Plan the installation of an already-built tree
    pub async fn install_tree(&self, tree: &FileTree, mod_info: &ModInfo) -> Result<InstallOutcome> {
        let policy = FallbackPolicy::new(self.prompt.as_ref(), &self.config, self.catalog);
        log_state(ResolutionState::Detecting, None);

        let Some(installer) = self.registry.find_installer(tree) else {
            log_state(ResolutionState::Unmatched, Some(InstallerType::Fallback));
            let instructions = policy.on_unmatched(tree).await?;
            return Ok(InstallOutcome {
                installer: InstallerType::Fallback,
                layout: None,
                resolution: Resolution::ProceededOnFallback,
                instructions,
            });
        };

        let installer_type = installer.installer_type();
        info!(mod_name = %mod_info, "{}: installer selected", installer_type);

        let ctx = LayoutContext {
            tree,
            mod_info,
            config: &self.config,
            catalog: self.catalog,
        };

        if let Err(err) = installer.preflight(&ctx) {
            return Err(match err {
                InstallError::InvalidLayout { installer, message, files } => {
                    policy.reject(installer, &message, files).await
                }
                other => other,
            });
        }

        match select_layout(&ctx, installer.layouts())? {
            LayoutMatch::Matched { layout, instructions } => {
                log_state(ResolutionState::Resolved, Some(installer_type));
                info!(%layout, instructions = instructions.len(), "{}: layout resolved", installer_type);
                self.show_advisory(installer, &ctx, layout).await;
                Ok(InstallOutcome {
                    installer: installer_type,
                    layout: Some(layout),
                    resolution: Resolution::Resolved,
                    instructions,
                })
            }
            unresolved => {
                if let LayoutMatch::Conflict { layout, reason } = &unresolved {
                    warn!(%layout, reason = %reason, "{}: conflicting layout", installer_type);
                }
                self.on_unresolved(&policy, installer_type, tree).await
            }
        }
    }

    async fn on_unresolved(
        &self,
        policy: &FallbackPolicy<'_>,
        installer: InstallerType,
        tree: &FileTree,
    ) -> Result<InstallOutcome> {
        let descriptor = self
            .catalog
            .get(installer)
            .ok_or_else(|| InstallError::MissingLayoutDescription {
                installer,
                files: tree.source_path_strings(),
            })?;

        match descriptor.on_failure {
            FailurePolicy::Reject => Err(policy
                .reject(installer, descriptor.failure_message, tree.source_path_strings())
                .await),
            FailurePolicy::Prompt => {
                log_state(ResolutionState::AmbiguousPendingUser, Some(installer));
                let instructions = policy.on_conflict(installer, tree).await?;
                Ok(InstallOutcome {
                    installer,
                    layout: None,
                    resolution: Resolution::ProceededOnConflict,
                    instructions,
                })
            }
        }
    }

    async fn show_advisory(&self, installer: &dyn LayoutInstaller, ctx: &LayoutContext<'_>, layout: Layout) {
        let Some(advisory) = installer.advisory(ctx, layout) else {
            return;
        };
        let files = ctx.tree.source_path_strings();
        if let Err(err) = self.prompt.notify(ADJUSTMENT_TITLE, &advisory, &files).await {
            warn!("{}: couldn't show the install notice: {:#}", installer.installer_type(), err);
        }
    }
}

fn log_state(state: ResolutionState, installer: Option<InstallerType>) {
    match installer {
        Some(installer) => debug!(%state, %installer, "Installation state changed"),
        None => debug!(%state, "Installation state changed"),
    }
}
