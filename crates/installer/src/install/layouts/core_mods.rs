//! Installers for the core frameworks other mods depend on
//!
//! These ship at fixed game paths and are recognized by one marker file
//! each. Their only layout is the canonical one: every file must already be
//! where the game expects it. WolvenKit Desktop is recognized only to turn
//! it away.

use tracing::debug;

use crate::install::error::{InstallError, Result};
use crate::install::layouts::catalog::{
    CET_CORE_ASI, CET_GAME_BIN_DIR, CET_MOD_CANONICAL_PATH_PREFIX, CYBERSCRIPT_CORE_CETBASEDIR,
    CYBERSCRIPT_CORE_REQUIRED_FILES, RED4EXT_CORE_BASEDIR, RED4EXT_CORE_DLL, RED4EXT_CORE_LOADER,
    RED4EXT_MOD_CANONICAL_BASEDIR, REDSCRIPT_CORE_BASEDIRS, REDSCRIPT_CORE_COMPILER,
    REDS_MOD_CANONICAL_PATH_PREFIX, WOLVENKIT_DESKTOP_EXE, WOLVENKIT_DESKTOP_REJECTION,
};
use crate::install::layouts::shared::{accounts_for_all, dir, identity};
use crate::install::layouts::{CoreLayout, InstallerType, Layout, LayoutContext, LayoutDetector, LayoutMatch};
use crate::install::registry::LayoutInstaller;
use crate::install::vfs::{FileTree, Glob};

//
// CET
//

pub struct CoreCetInstaller;

const CORE_CET_LAYOUTS: &[LayoutDetector] = &[core_cet_layout];

impl LayoutInstaller for CoreCetInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::CoreCet
    }

    fn detect(&self, tree: &FileTree) -> bool {
        tree.is_file(CET_CORE_ASI)
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        CORE_CET_LAYOUTS
    }
}

fn core_cet_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.is_file(CET_CORE_ASI) {
        return Ok(LayoutMatch::NoMatch);
    }

    let files = ctx.tree.files_under(CET_GAME_BIN_DIR, &Glob::any());
    if !accounts_for_all(ctx.tree, &[&files]) {
        debug!("Core CET: files outside {}", CET_GAME_BIN_DIR);
        return Ok(LayoutMatch::NoMatch);
    }

    identity(Layout::Core(CoreLayout::Cet), &files, &[dir(CET_MOD_CANONICAL_PATH_PREFIX)])
}

//
// Redscript
//

pub struct CoreRedscriptInstaller;

const CORE_REDSCRIPT_LAYOUTS: &[LayoutDetector] = &[core_redscript_layout];

impl LayoutInstaller for CoreRedscriptInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::CoreRedscript
    }

    fn detect(&self, tree: &FileTree) -> bool {
        tree.is_file(REDSCRIPT_CORE_COMPILER)
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        CORE_REDSCRIPT_LAYOUTS
    }
}

fn core_redscript_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.is_file(REDSCRIPT_CORE_COMPILER) {
        return Ok(LayoutMatch::NoMatch);
    }

    let files: Vec<_> = REDSCRIPT_CORE_BASEDIRS
        .iter()
        .flat_map(|base| ctx.tree.files_under(base, &Glob::any()))
        .collect();
    if !accounts_for_all(ctx.tree, &[&files]) {
        debug!("Core Redscript: files outside {:?}", REDSCRIPT_CORE_BASEDIRS);
        return Ok(LayoutMatch::NoMatch);
    }

    identity(
        Layout::Core(CoreLayout::Redscript),
        &files,
        &[dir(REDS_MOD_CANONICAL_PATH_PREFIX)],
    )
}

//
// Red4Ext
//

pub struct CoreRed4ExtInstaller;

const CORE_RED4EXT_LAYOUTS: &[LayoutDetector] = &[core_red4ext_layout];

impl LayoutInstaller for CoreRed4ExtInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::CoreRed4Ext
    }

    fn detect(&self, tree: &FileTree) -> bool {
        tree.is_file(RED4EXT_CORE_DLL)
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        CORE_RED4EXT_LAYOUTS
    }
}

fn core_red4ext_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.is_file(RED4EXT_CORE_DLL) {
        return Ok(LayoutMatch::NoMatch);
    }

    let loader = dir(RED4EXT_CORE_LOADER);
    let mut files: Vec<_> = ctx
        .tree
        .files_in(CET_GAME_BIN_DIR)
        .into_iter()
        .filter(|f| *f == loader)
        .collect();
    files.extend(ctx.tree.files_under(RED4EXT_CORE_BASEDIR, &Glob::any()));

    if !accounts_for_all(ctx.tree, &[&files]) {
        debug!("Core Red4ext: files outside {} and the loader", RED4EXT_CORE_BASEDIR);
        return Ok(LayoutMatch::NoMatch);
    }

    identity(
        Layout::Core(CoreLayout::Red4Ext),
        &files,
        &[dir(RED4EXT_MOD_CANONICAL_BASEDIR)],
    )
}

//
// CyberScript
//

pub struct CoreCyberScriptInstaller;

const CORE_CYBERSCRIPT_LAYOUTS: &[LayoutDetector] = &[core_cyberscript_layout];

impl LayoutInstaller for CoreCyberScriptInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::CoreCyberScript
    }

    fn detect(&self, tree: &FileTree) -> bool {
        CYBERSCRIPT_CORE_REQUIRED_FILES
            .iter()
            .any(|required| tree.is_file(required))
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        CORE_CYBERSCRIPT_LAYOUTS
    }

    fn preflight(&self, ctx: &LayoutContext<'_>) -> Result<()> {
        let missing_required = !CYBERSCRIPT_CORE_REQUIRED_FILES
            .iter()
            .all(|required| ctx.tree.is_file(required));

        let files = ctx.tree.files_under(CYBERSCRIPT_CORE_CETBASEDIR, &Glob::any());
        let outside_known_dirs = !accounts_for_all(ctx.tree, &[&files]);

        let message = if missing_required {
            "Didn't find all required CyberScript files!"
        } else if outside_known_dirs {
            "Found files outside known CyberScript directories!"
        } else {
            return Ok(());
        };

        Err(InstallError::InvalidLayout {
            installer: InstallerType::CoreCyberScript,
            message: message.to_string(),
            files: ctx.tree.source_path_strings(),
        })
    }
}

fn core_cyberscript_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    let files = ctx.tree.files_under(CYBERSCRIPT_CORE_CETBASEDIR, &Glob::any());
    if files.is_empty() || !accounts_for_all(ctx.tree, &[&files]) {
        return Ok(LayoutMatch::NoMatch);
    }

    identity(Layout::Core(CoreLayout::CyberScript), &files, &[])
}

//
// WolvenKit
//

/// Catches WolvenKit Desktop uploads. Only the Console build is a mod.
pub struct CoreWolvenKitInstaller;

const CORE_WOLVENKIT_LAYOUTS: &[LayoutDetector] = &[];

fn is_wolvenkit_desktop(tree: &FileTree) -> bool {
    tree.source_paths()
        .iter()
        .any(|path| path.file_name().eq_ignore_ascii_case(WOLVENKIT_DESKTOP_EXE))
}

impl LayoutInstaller for CoreWolvenKitInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::CoreWolvenKit
    }

    fn detect(&self, tree: &FileTree) -> bool {
        is_wolvenkit_desktop(tree)
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        CORE_WOLVENKIT_LAYOUTS
    }

    fn preflight(&self, ctx: &LayoutContext<'_>) -> Result<()> {
        Err(InstallError::InvalidLayout {
            installer: InstallerType::CoreWolvenKit,
            message: WOLVENKIT_DESKTOP_REJECTION.to_string(),
            files: ctx.tree.source_path_strings(),
        })
    }
}
