//! Redscript mods: `.reds` sources compiled by the game at startup

use tracing::debug;

use crate::install::error::Result;
use crate::install::layouts::catalog::{REDS_EXTENSION, REDS_MOD_CANONICAL_PATH_PREFIX};
use crate::install::layouts::shared::{accounts_for_all, companion_archives, dir, files_under_each, identity, relocated, without};
use crate::install::layouts::{
    InstallerType, Layout, LayoutContext, LayoutDetector, LayoutMatch, RedscriptLayout,
};
use crate::install::registry::LayoutInstaller;
use crate::install::vfs::{FileTree, Glob, ModPath, FILETREE_ROOT};

pub struct RedscriptInstaller;

const REDSCRIPT_LAYOUTS: &[LayoutDetector] = &[
    canon_redscript_layout,
    basedir_redscript_layout,
    toplevel_redscript_layout,
];

fn is_reds(file: &ModPath) -> bool {
    file.extension_is(REDS_EXTENSION)
}

/// Files of every `r6/scripts/<name>/` holding a `.reds` at any depth
pub(crate) fn canonical_mod_files(tree: &FileTree) -> Vec<ModPath> {
    let reds = Glob::new("**/*.reds");
    let mod_dirs: Vec<ModPath> = tree
        .subdirs_in(REDS_MOD_CANONICAL_PATH_PREFIX)
        .into_iter()
        .filter(|mod_dir| !tree.files_under(mod_dir, &reds).is_empty())
        .collect();
    files_under_each(tree, &mod_dirs)
}

impl LayoutInstaller for RedscriptInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::Redscript
    }

    fn detect(&self, tree: &FileTree) -> bool {
        !tree.files_under(FILETREE_ROOT, &Glob::new("**/*.reds")).is_empty()
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        REDSCRIPT_LAYOUTS
    }
}

/// `r6/scripts/<name>/**/*.reds`
fn canon_redscript_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.is_directory(REDS_MOD_CANONICAL_PATH_PREFIX) {
        return Ok(LayoutMatch::NoMatch);
    }
    if ctx.tree.files_in(REDS_MOD_CANONICAL_PATH_PREFIX).iter().any(is_reds) {
        return Ok(LayoutMatch::NoMatch);
    }

    let mod_files = canonical_mod_files(ctx.tree);
    let archives = companion_archives(ctx.tree);
    if mod_files.is_empty() || !accounts_for_all(ctx.tree, &[&mod_files, &archives]) {
        debug!("Redscript: canonical script directories don't cover every file");
        return Ok(LayoutMatch::NoMatch);
    }

    let files: Vec<_> = mod_files.into_iter().chain(archives).collect();
    identity(Layout::Redscript(RedscriptLayout::Canon), &files, &[])
}

/// `r6/scripts/*.reds`, moved into a directory named after the mod
fn basedir_redscript_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.files_in(REDS_MOD_CANONICAL_PATH_PREFIX).iter().any(is_reds) {
        return Ok(LayoutMatch::NoMatch);
    }

    let files = ctx.tree.files_under(REDS_MOD_CANONICAL_PATH_PREFIX, &Glob::any());
    let archives = companion_archives(ctx.tree);
    if !accounts_for_all(ctx.tree, &[&files, &archives]) {
        debug!("Redscript: files outside {}", REDS_MOD_CANONICAL_PATH_PREFIX);
        return Ok(LayoutMatch::NoMatch);
    }

    let base = dir(REDS_MOD_CANONICAL_PATH_PREFIX);
    relocated(
        Layout::Redscript(RedscriptLayout::Basedir),
        &files,
        &base,
        &base.join(ctx.mod_info.name()),
        &archives,
    )
}

/// `*.reds` at the root
fn toplevel_redscript_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.files_in(FILETREE_ROOT).iter().any(is_reds) {
        return Ok(LayoutMatch::NoMatch);
    }

    let archives = companion_archives(ctx.tree);
    let files = without(ctx.tree.source_paths(), &archives);

    relocated(
        Layout::Redscript(RedscriptLayout::Toplevel),
        &files,
        &ModPath::root(),
        &dir(REDS_MOD_CANONICAL_PATH_PREFIX).join(ctx.mod_info.name()),
        &archives,
    )
}
