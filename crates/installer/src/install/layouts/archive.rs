//! Archive-only mods: `.archive` files and nothing the other families claim

use tracing::{debug, warn};

use crate::install::dialogs::archive_adjustment_explanation;
use crate::install::error::Result;
use crate::install::layouts::catalog::{
    ARCHIVE_ONLY_CANONICAL_PREFIX, ARCHIVE_ONLY_HERITAGE_PREFIX,
};
use crate::install::layouts::shared::{accounts_for_all, dir, identity, relocated, toplevel_archives};
use crate::install::layouts::{
    ArchiveLayout, InstallerType, Layout, LayoutContext, LayoutDetector, LayoutMatch,
};
use crate::install::registry::LayoutInstaller;
use crate::install::vfs::{FileTree, Glob, ModPath, FILETREE_ROOT};

pub struct ArchiveOnlyInstaller;

const ARCHIVE_LAYOUTS: &[LayoutDetector] = &[
    canon_archive_layout,
    heritage_archive_layout,
    toplevel_archive_layout,
    ambiguous_archive_layout,
];

fn all_archives(tree: &FileTree) -> Vec<ModPath> {
    tree.files_under(FILETREE_ROOT, &Glob::new("**/*.archive"))
}

impl LayoutInstaller for ArchiveOnlyInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::ArchiveOnly
    }

    fn detect(&self, tree: &FileTree) -> bool {
        !all_archives(tree).is_empty()
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        ARCHIVE_LAYOUTS
    }

    fn advisory(&self, ctx: &LayoutContext<'_>, layout: Layout) -> Option<String> {
        if layout != Layout::Archive(ArchiveLayout::Toplevel) {
            return None;
        }

        if toplevel_archives(ctx.tree).len() < 2 {
            return None;
        }

        Some(archive_adjustment_explanation(&ctx.tree.source_path_strings()))
    }
}

/// Every file in `location`, nothing nested, nothing elsewhere
fn all_files_directly_in(tree: &FileTree, location: &str) -> Option<Vec<ModPath>> {
    let files = tree.files_in(location);
    (!files.is_empty() && accounts_for_all(tree, &[&files])).then_some(files)
}

/// `archive/pc/mod/*.archive`
fn canon_archive_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    match all_files_directly_in(ctx.tree, ARCHIVE_ONLY_CANONICAL_PREFIX) {
        Some(files) => identity(Layout::Archive(ArchiveLayout::Canon), &files, &[]),
        None => Ok(LayoutMatch::NoMatch),
    }
}

/// `archive/pc/patch/*.archive`, the pre-1.0 location
fn heritage_archive_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    match all_files_directly_in(ctx.tree, ARCHIVE_ONLY_HERITAGE_PREFIX) {
        Some(files) => {
            warn!("ArchiveOnly: moving archives from {} to {}", ARCHIVE_ONLY_HERITAGE_PREFIX, ARCHIVE_ONLY_CANONICAL_PREFIX);
            relocated(
                Layout::Archive(ArchiveLayout::Heritage),
                &files,
                &dir(ARCHIVE_ONLY_HERITAGE_PREFIX),
                &dir(ARCHIVE_ONLY_CANONICAL_PREFIX),
                &[],
            )
        }
        None => Ok(LayoutMatch::NoMatch),
    }
}

/// `*.archive` at the root
fn toplevel_archive_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    match all_files_directly_in(ctx.tree, FILETREE_ROOT) {
        Some(files) => relocated(
            Layout::Archive(ArchiveLayout::Toplevel),
            &files,
            &ModPath::root(),
            &dir(ARCHIVE_ONLY_CANONICAL_PREFIX),
            &[],
        ),
        None => Ok(LayoutMatch::NoMatch),
    }
}

/// Archives anywhere else: the user has to pick which ones to install
fn ambiguous_archive_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    let archives = all_archives(ctx.tree);
    if archives.is_empty() {
        return Ok(LayoutMatch::NoMatch);
    }

    debug!(archives = ?archives, "ArchiveOnly: archives outside any known location");
    Ok(LayoutMatch::conflict(
        Layout::Archive(ArchiveLayout::Ambiguous),
        "archives in subdirectories or mixed with other files",
    ))
}
