//! REDmod
//!
//! A REDmod is a directory with an `info.json` at its top level, installed
//! under `mods/`. Canonical archives already have `mods/<name>/info.json`;
//! archives that ship `<name>/info.json` at the root are moved under `mods/`,
//! keeping each directory's name. There's no other correction, so a REDmod
//! that fits neither shape is rejected.

use tracing::{debug, error};

use crate::install::error::Result;
use crate::install::layouts::catalog::{REDMOD_BASEDIR, REDMOD_INFO_FILENAME};
use crate::install::layouts::shared::{accounts_for_all, dir, files_under_each, find_named_dirs, identity, relocated};
use crate::install::layouts::{
    InstallerType, Layout, LayoutContext, LayoutDetector, LayoutMatch, RedmodLayout,
};
use crate::install::registry::LayoutInstaller;
use crate::install::vfs::{FileTree, ModPath};

pub struct RedmodInstaller;

const REDMOD_LAYOUTS: &[LayoutDetector] = &[named_redmod_layout, canon_redmod_layout];

fn is_info_json(file: &ModPath) -> bool {
    file.file_name().eq_ignore_ascii_case(REDMOD_INFO_FILENAME)
}

fn find_named_redmod_dirs(tree: &FileTree) -> Vec<ModPath> {
    find_named_dirs(tree, is_info_json)
}

impl LayoutInstaller for RedmodInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::Redmod
    }

    fn detect(&self, tree: &FileTree) -> bool {
        tree.is_directory(REDMOD_BASEDIR) || !find_named_redmod_dirs(tree).is_empty()
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        REDMOD_LAYOUTS
    }
}

/// `<name>/info.json` at the root, any number of them
fn named_redmod_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    let named_dirs = find_named_redmod_dirs(ctx.tree);
    if named_dirs.is_empty() {
        return Ok(LayoutMatch::NoMatch);
    }

    let files = files_under_each(ctx.tree, &named_dirs);
    if !accounts_for_all(ctx.tree, &[&files]) {
        debug!(dirs = ?named_dirs, "REDmod: files outside the named mod directories");
        return Ok(LayoutMatch::NoMatch);
    }

    relocated(
        Layout::Redmod(RedmodLayout::Named),
        &files,
        &ModPath::root(),
        &dir(REDMOD_BASEDIR),
        &[],
    )
}

/// `mods/<name>/info.json`
fn canon_redmod_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.is_directory(REDMOD_BASEDIR) {
        return Ok(LayoutMatch::NoMatch);
    }

    let looks_like_redmod = ctx.tree.subdirs_in(REDMOD_BASEDIR);
    let valid = ctx.tree.direct_subdirs_with_some(REDMOD_BASEDIR, is_info_json);

    if valid.len() != looks_like_redmod.len() {
        let invalid: Vec<String> = looks_like_redmod
            .iter()
            .filter(|candidate| !valid.contains(*candidate))
            .map(|candidate| candidate.to_string())
            .collect();
        error!(
            "{}: these directories don't look like valid REDmods: {}",
            InstallerType::Redmod,
            invalid.join(", ")
        );
        return Ok(LayoutMatch::conflict(
            Layout::Redmod(RedmodLayout::Canon),
            format!("no {} in {}", REDMOD_INFO_FILENAME, invalid.join(", ")),
        ));
    }

    let files = files_under_each(ctx.tree, &valid);
    if files.is_empty() || !accounts_for_all(ctx.tree, &[&files]) {
        debug!("REDmod: files outside {}/<modname>", REDMOD_BASEDIR);
        return Ok(LayoutMatch::NoMatch);
    }

    identity(Layout::Redmod(RedmodLayout::Canon), &files, &[])
}
