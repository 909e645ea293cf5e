//! Installer registry for the supported mod families
//!
//! The registry holds the installers in pipeline order. The first installer
//! whose presence test passes owns the installation attempt; the ones after
//! it are never consulted, so more specific families must come first.

use crate::install::config::InstallerConfig;
use crate::install::error::Result;
use crate::install::layouts::archive::ArchiveOnlyInstaller;
use crate::install::layouts::cet::CetInstaller;
use crate::install::layouts::core_mods::{
    CoreCetInstaller, CoreCyberScriptInstaller, CoreRed4ExtInstaller, CoreRedscriptInstaller,
    CoreWolvenKitInstaller,
};
use crate::install::layouts::multi_type::MultiTypeInstaller;
use crate::install::layouts::red4ext::Red4ExtInstaller;
use crate::install::layouts::redmod::RedmodInstaller;
use crate::install::layouts::redscript::RedscriptInstaller;
use crate::install::layouts::{InstallerType, Layout, LayoutContext, LayoutDetector};
use crate::install::vfs::FileTree;

/// One mod family's installer
///
/// Everything here is pure: no I/O, no prompts. The conflict policy decides
/// what to do with the result.
pub trait LayoutInstaller: Send + Sync {
    fn installer_type(&self) -> InstallerType;

    /// Presence test: does this tree look like it belongs to the family at all
    fn detect(&self, tree: &FileTree) -> bool;

    /// Layout detectors in priority order
    fn layouts(&self) -> &'static [LayoutDetector];

    /// Checks that reject the mod before any layout is tried
    fn preflight(&self, _ctx: &LayoutContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Notice (markdown) for a resolved install that may still need a look
    fn advisory(&self, _ctx: &LayoutContext<'_>, _layout: Layout) -> Option<String> {
        None
    }
}

/// Ordered collection of installers
pub struct InstallerRegistry {
    installers: Vec<Box<dyn LayoutInstaller>>,
}

impl InstallerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            installers: Vec::new(),
        }
    }

    /// Append an installer at the end of the pipeline
    pub fn register<I: LayoutInstaller + 'static>(mut self, installer: I) -> Self {
        self.installers.push(Box::new(installer));
        self
    }

    /// The built-in pipeline. REDmod is only included when enabled.
    pub fn standard(config: &InstallerConfig) -> Self {
        let registry = Self::new()
            .register(CoreCetInstaller)
            .register(CoreRedscriptInstaller)
            .register(CoreRed4ExtInstaller)
            .register(CoreCyberScriptInstaller)
            .register(CoreWolvenKitInstaller)
            .register(MultiTypeInstaller);

        let registry = if config.redmod_enabled {
            registry.register(RedmodInstaller)
        } else {
            registry
        };

        registry
            .register(Red4ExtInstaller)
            .register(RedscriptInstaller)
            .register(CetInstaller)
            .register(ArchiveOnlyInstaller)
    }

    /// Find the first installer whose presence test passes
    pub fn find_installer(&self, tree: &FileTree) -> Option<&dyn LayoutInstaller> {
        self.installers
            .iter()
            .find(|installer| installer.detect(tree))
            .map(|installer| installer.as_ref())
    }

    /// Installer types in pipeline order
    pub fn installer_types(&self) -> Vec<InstallerType> {
        self.installers.iter().map(|i| i.installer_type()).collect()
    }
}

impl Default for InstallerRegistry {
    fn default() -> Self {
        Self::standard(&InstallerConfig::default())
    }
}
