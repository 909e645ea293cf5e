//! Mods that combine several script and plugin families
//!
//! There's no precedence between the families inside one archive, so the
//! only supported shape is every family in its canonical layout with nothing
//! else around. Archives may also sit in the pre-1.0 `archive/pc/patch`
//! location; they're moved to `archive/pc/mod`. Anything looser is a
//! conflict for the user to decide.

use tracing::warn;

use crate::install::error::Result;
use crate::install::layouts::catalog::{
    ARCHIVE_ONLY_CANONICAL_PREFIX, ARCHIVE_ONLY_HERITAGE_PREFIX, CET_MOD_CANONICAL_PATH_PREFIX,
    RED4EXT_MOD_CANONICAL_BASEDIR, REDS_MOD_CANONICAL_PATH_PREFIX,
};
use crate::install::layouts::shared::{accounts_for_all, companion_archives, dir, relocated};
use crate::install::layouts::{cet, red4ext, redscript};
use crate::install::layouts::{InstallerType, Layout, LayoutContext, LayoutDetector, LayoutMatch};
use crate::install::registry::LayoutInstaller;
use crate::install::vfs::{FileTree, ModPath};

const MULTI_TYPE_BASEDIRS: &[&str] = &[
    CET_MOD_CANONICAL_PATH_PREFIX,
    RED4EXT_MOD_CANONICAL_BASEDIR,
    REDS_MOD_CANONICAL_PATH_PREFIX,
];

pub struct MultiTypeInstaller;

const MULTI_TYPE_LAYOUTS: &[LayoutDetector] = &[multi_type_layout];

fn family_count(tree: &FileTree) -> usize {
    MULTI_TYPE_BASEDIRS
        .iter()
        .filter(|base| tree.is_directory(base))
        .count()
}

impl LayoutInstaller for MultiTypeInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::MultiType
    }

    fn detect(&self, tree: &FileTree) -> bool {
        family_count(tree) >= 2
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        MULTI_TYPE_LAYOUTS
    }
}

fn multi_type_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if family_count(ctx.tree) < 2 {
        return Ok(LayoutMatch::NoMatch);
    }

    let cet_files = cet::canonical_mod_files(ctx.tree);
    let redscript_files = redscript::canonical_mod_files(ctx.tree);
    let red4ext_files = red4ext::canonical_mod_files(ctx.tree);
    let archives = companion_archives(ctx.tree);
    let heritage_archives = ctx.tree.files_in(ARCHIVE_ONLY_HERITAGE_PREFIX);

    let groups: [&[ModPath]; 4] = [&cet_files, &redscript_files, &red4ext_files, &archives];
    let every_group: [&[ModPath]; 5] =
        [&cet_files, &redscript_files, &red4ext_files, &archives, &heritage_archives];
    if !accounts_for_all(ctx.tree, &every_group) {
        warn!(
            files = ?ctx.tree.source_path_strings(),
            "MultiType: mod mixes families outside their canonical layouts"
        );
        return Ok(LayoutMatch::conflict(
            Layout::MultiType,
            "several mod types, not all of them in canonical layout",
        ));
    }

    let in_place: Vec<_> = groups.iter().flat_map(|group| group.iter().cloned()).collect();
    relocated(
        Layout::MultiType,
        &heritage_archives,
        &dir(ARCHIVE_ONLY_HERITAGE_PREFIX),
        &dir(ARCHIVE_ONLY_CANONICAL_PREFIX),
        &in_place,
    )
}
