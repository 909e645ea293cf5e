//! Cyberpunk 2077 Mod Layout Installer
//!
//! This library plans the installation of Cyberpunk 2077 mods. Given the
//! flat list of files extracted from a mod archive, it works out which
//! modding framework the mod targets, which of that framework's layouts it
//! uses, and produces the copy, move and create-directory instructions that
//! put every file where the game expects it. It never touches the disk.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cp2077_installer::{
//!     FixedDecisionPrompt, InstallerConfig, InstallerType, ModInfo, ModLayoutInstaller,
//! };
//!
//! # async fn example() -> cp2077_installer::Result<()> {
//! let installer = ModLayoutInstaller::new(
//!     InstallerConfig::default(),
//!     Arc::new(FixedDecisionPrompt::cancel()),
//! );
//!
//! let files = ["red4ext/plugins/MyMod/my.dll", "red4ext/RED4ext.dll"];
//! assert_eq!(installer.test_supported(files)?, Some(InstallerType::CoreRed4Ext));
//!
//! let outcome = installer.install(files, &ModInfo::new("MyMod")?).await?;
//! for instruction in &outcome.instructions {
//!     println!("{instruction}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Core frameworks**: CET, Redscript, Red4Ext and CyberScript
//! - **Mod families**: REDmod, Red4Ext plugins, Redscript, CET and archive-only mods,
//!   plus mods that combine several of them
//! - **Layout correction**: unambiguous non-canonical layouts are moved into place
//! - **Explicit conflicts**: ambiguous mods are never guessed at; the user decides
//!   through an async prompt
//! - **Deterministic output**: the same listing always gives the same instructions

pub mod install;

// Re-export commonly used types for convenience
pub use install::{
    FileTree, FixedDecisionPrompt, InstallDecision, InstallError, InstallOutcome, InstallPrompt,
    InstallerConfig, InstallerRegistry, InstallerType, Instruction, Layout, LayoutMatch, ModInfo,
    ModLayoutInstaller, ModPath, Resolution, Result,
};
