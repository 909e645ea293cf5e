//! Cyber Engine Tweaks (CET) Lua mods
//!
//! A CET mod is a directory with an `init.lua` at its top level, installed
//! under `bin/x64/plugins/cyber_engine_tweaks/mods/`. A single mod may only
//! carry one such directory: two named candidates at the root can't be told
//! apart from two mods packed together, so that's a conflict.

use tracing::{debug, warn};

use crate::install::error::Result;
use crate::install::layouts::catalog::{CET_MOD_CANONICAL_INIT_FILE, CET_MOD_CANONICAL_PATH_PREFIX};
use crate::install::layouts::shared::{
    accounts_for_all, companion_archives, dir, files_under_each, find_named_dirs, identity, relocated, without,
};
use crate::install::layouts::{CetLayout, InstallerType, Layout, LayoutContext, LayoutDetector, LayoutMatch};
use crate::install::registry::LayoutInstaller;
use crate::install::vfs::{FileTree, Glob, ModPath, FILETREE_ROOT};

pub struct CetInstaller;

const CET_LAYOUTS: &[LayoutDetector] = &[canon_cet_layout, named_cet_layout, toplevel_cet_layout];

fn is_init_lua(file: &ModPath) -> bool {
    file.file_name().eq_ignore_ascii_case(CET_MOD_CANONICAL_INIT_FILE)
}

/// Files of every CET mod directory with an `init.lua` at its top level
pub(crate) fn canonical_mod_files(tree: &FileTree) -> Vec<ModPath> {
    let mod_dirs = tree.direct_subdirs_with_some(CET_MOD_CANONICAL_PATH_PREFIX, is_init_lua);
    files_under_each(tree, &mod_dirs)
}

impl LayoutInstaller for CetInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::Cet
    }

    fn detect(&self, tree: &FileTree) -> bool {
        !tree
            .files_under(FILETREE_ROOT, &Glob::new("**/init.lua"))
            .is_empty()
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        CET_LAYOUTS
    }
}

fn canon_cet_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.is_directory(CET_MOD_CANONICAL_PATH_PREFIX) {
        return Ok(LayoutMatch::NoMatch);
    }

    let mod_files = canonical_mod_files(ctx.tree);
    let archives = companion_archives(ctx.tree);
    if mod_files.is_empty() || !accounts_for_all(ctx.tree, &[&mod_files, &archives]) {
        debug!("CET: canonical mod directories don't cover every file");
        return Ok(LayoutMatch::NoMatch);
    }

    let files: Vec<_> = mod_files.into_iter().chain(archives).collect();
    identity(Layout::Cet(CetLayout::Canon), &files, &[])
}

fn named_cet_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    let named_dirs = find_named_dirs(ctx.tree, is_init_lua);
    if named_dirs.is_empty() {
        return Ok(LayoutMatch::NoMatch);
    }

    let allowed = ctx
        .catalog
        .max_named_instances(InstallerType::Cet)
        .unwrap_or(usize::MAX);
    if named_dirs.len() > allowed {
        warn!(dirs = ?named_dirs, "CET: more than one named mod directory");
        return Ok(LayoutMatch::conflict(
            Layout::Cet(CetLayout::Named),
            format!("{} directories with {}, only {} allowed", named_dirs.len(), CET_MOD_CANONICAL_INIT_FILE, allowed),
        ));
    }

    let files = files_under_each(ctx.tree, &named_dirs);
    let archives = companion_archives(ctx.tree);
    if !accounts_for_all(ctx.tree, &[&files, &archives]) {
        debug!("CET: files outside the named mod directory");
        return Ok(LayoutMatch::NoMatch);
    }

    relocated(
        Layout::Cet(CetLayout::Named),
        &files,
        &ModPath::root(),
        &dir(CET_MOD_CANONICAL_PATH_PREFIX),
        &archives,
    )
}

fn toplevel_cet_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.files_in(FILETREE_ROOT).iter().any(is_init_lua) {
        return Ok(LayoutMatch::NoMatch);
    }

    let archives = companion_archives(ctx.tree);
    let files = without(ctx.tree.source_paths(), &archives);

    relocated(
        Layout::Cet(CetLayout::Toplevel),
        &files,
        &ModPath::root(),
        &dir(CET_MOD_CANONICAL_PATH_PREFIX).join(ctx.mod_info.name()),
        &archives,
    )
}
