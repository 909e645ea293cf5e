//! Building blocks shared by the family detectors

use std::collections::HashSet;

use crate::install::directives::{
    instructions_for_same_source_and_dest_paths, instructions_for_source_to_dest_pairs,
    merge_instruction_groups, move_from_to,
};
use crate::install::error::Result;
use crate::install::layouts::catalog::{ARCHIVE_EXTENSION, ARCHIVE_ONLY_CANONICAL_PREFIX, GAME_TOPLEVEL_DIRS};
use crate::install::layouts::{Layout, LayoutMatch};
use crate::install::vfs::{FileTree, Glob, ModPath, FILETREE_ROOT};

/// Wrap a layout path constant
pub(crate) fn dir(path: &'static str) -> ModPath {
    ModPath::from_normalized(path)
}

/// Archives that ride along with script and plugin mods, already in place
pub(crate) fn companion_archives(tree: &FileTree) -> Vec<ModPath> {
    tree.files_in(ARCHIVE_ONLY_CANONICAL_PREFIX)
}

/// Whether the given file groups, together, account for every file in the tree
pub(crate) fn accounts_for_all(tree: &FileTree, groups: &[&[ModPath]]) -> bool {
    let accounted: HashSet<&ModPath> = groups.iter().flat_map(|group| group.iter()).collect();
    accounted.len() == tree.file_count()
}

/// Root-level directories with a direct file matching `marker`. Game
/// directories such as `bin` or `r6` are never a mod's own name.
pub(crate) fn find_named_dirs<F>(tree: &FileTree, marker: F) -> Vec<ModPath>
where
    F: Fn(&ModPath) -> bool,
{
    tree.direct_subdirs_with_some(FILETREE_ROOT, marker)
        .into_iter()
        .filter(|dir| !is_game_toplevel_dir(dir))
        .collect()
}

fn is_game_toplevel_dir(dir: &ModPath) -> bool {
    GAME_TOPLEVEL_DIRS
        .iter()
        .any(|game_dir| dir.as_str().eq_ignore_ascii_case(game_dir))
}

/// Every file below each of `dirs`, group by group
pub(crate) fn files_under_each(tree: &FileTree, dirs: &[ModPath]) -> Vec<ModPath> {
    dirs.iter()
        .flat_map(|dir| tree.files_under(dir, &Glob::any()))
        .collect()
}

/// `files` minus anything in `excluded`
pub(crate) fn without(files: Vec<ModPath>, excluded: &[ModPath]) -> Vec<ModPath> {
    files.into_iter().filter(|f| !excluded.contains(f)).collect()
}

/// `Matched` with identity placement
pub(crate) fn identity(layout: Layout, files: &[ModPath], required_dirs: &[ModPath]) -> Result<LayoutMatch> {
    let instructions = instructions_for_same_source_and_dest_paths(files, required_dirs)?;
    Ok(LayoutMatch::Matched { layout, instructions })
}

/// `Matched` with `files` relocated from `from` to `to`, plus companions in place
pub(crate) fn relocated(
    layout: Layout,
    files: &[ModPath],
    from: &ModPath,
    to: &ModPath,
    companions: &[ModPath],
) -> Result<LayoutMatch> {
    relocated_groups(layout, &[Relocation { files, from, to }], companions)
}

/// A group of files moved from one base directory to another
pub(crate) struct Relocation<'a> {
    pub files: &'a [ModPath],
    pub from: &'a ModPath,
    pub to: &'a ModPath,
}

/// `Matched` with every group relocated in order, then companions in place.
/// Two files that would land on the same destination make the layout a
/// `Conflict`.
pub(crate) fn relocated_groups(
    layout: Layout,
    groups: &[Relocation<'_>],
    companions: &[ModPath],
) -> Result<LayoutMatch> {
    let pairs: Vec<(ModPath, ModPath)> = groups
        .iter()
        .flat_map(|group| group.files.iter().map(move_from_to(group.from, group.to)))
        .collect();

    let mut destinations: HashSet<&ModPath> = HashSet::new();
    let clash = pairs
        .iter()
        .map(|(_, destination)| destination)
        .chain(companions)
        .find(|destination| !destinations.insert(*destination));
    if let Some(destination) = clash {
        return Ok(LayoutMatch::conflict(
            layout,
            format!("more than one file would be installed as '{destination}'"),
        ));
    }

    let instructions = merge_instruction_groups(vec![
        instructions_for_source_to_dest_pairs(&pairs)?,
        instructions_for_same_source_and_dest_paths(companions, &[])?,
    ])?;
    Ok(LayoutMatch::Matched { layout, instructions })
}

/// Archives directly at the root of the tree
pub(crate) fn toplevel_archives(tree: &FileTree) -> Vec<ModPath> {
    tree.files_in(FILETREE_ROOT)
        .into_iter()
        .filter(|file| file.extension_is(ARCHIVE_EXTENSION))
        .collect()
}
