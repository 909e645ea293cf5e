//! Red4Ext plugins
//!
//! Plugins are DLLs under `red4ext/plugins/<name>/`. Besides the canonical
//! layout, plugins shipped directly in `red4ext/plugins`, in a named root
//! directory, or loose at the root are moved into place. The last two may
//! carry `.archive` files at the root, which go to `archive/pc/mod`. DLLs
//! that share a name with game or loader DLLs are never installed.

use tracing::{debug, error, warn};

use crate::install::error::{InstallError, Result};
use crate::install::layouts::catalog::{
    ARCHIVE_ONLY_CANONICAL_PREFIX, DLL_EXTENSION, RED4EXT_MOD_CANONICAL_BASEDIR,
};
use crate::install::layouts::shared::{
    accounts_for_all, companion_archives, dir, files_under_each, find_named_dirs, identity, relocated,
    relocated_groups, toplevel_archives, without, Relocation,
};
use crate::install::layouts::{
    InstallerType, Layout, LayoutContext, LayoutDetector, LayoutMatch, Red4ExtLayout,
};
use crate::install::registry::LayoutInstaller;
use crate::install::vfs::{FileTree, Glob, ModPath, FILETREE_ROOT};

pub struct Red4ExtInstaller;

const RED4EXT_LAYOUTS: &[LayoutDetector] = &[
    canon_red4ext_layout,
    basedir_red4ext_layout,
    modnamed_red4ext_layout,
    toplevel_red4ext_layout,
];

fn is_dll(file: &ModPath) -> bool {
    file.extension_is(DLL_EXTENSION)
}

fn all_dlls(tree: &FileTree) -> Vec<ModPath> {
    tree.files_under(FILETREE_ROOT, &Glob::new("**/*.dll"))
}

/// Files of every `red4ext/plugins/<name>/` with a DLL at its top level
pub(crate) fn canonical_mod_files(tree: &FileTree) -> Vec<ModPath> {
    let plugin_dirs = tree.direct_subdirs_with_some(RED4EXT_MOD_CANONICAL_BASEDIR, is_dll);
    files_under_each(tree, &plugin_dirs)
}

impl LayoutInstaller for Red4ExtInstaller {
    fn installer_type(&self) -> InstallerType {
        InstallerType::Red4Ext
    }

    fn detect(&self, tree: &FileTree) -> bool {
        !all_dlls(tree).is_empty()
    }

    fn layouts(&self) -> &'static [LayoutDetector] {
        RED4EXT_LAYOUTS
    }

    fn preflight(&self, ctx: &LayoutContext<'_>) -> Result<()> {
        let reserved: Vec<String> = all_dlls(ctx.tree)
            .into_iter()
            .filter(|dll| ctx.config.is_reserved_dll(dll.file_name()))
            .map(|dll| dll.to_string())
            .collect();

        if reserved.is_empty() {
            return Ok(());
        }

        error!(files = ?reserved, "{}: refusing to install reserved DLLs", InstallerType::Red4Ext);
        Err(InstallError::InvalidLayout {
            installer: InstallerType::Red4Ext,
            message: "Red4Ext mod contains DLLs that could conflict with known DLL files, can't install!".to_string(),
            files: reserved,
        })
    }
}

/// `red4ext/plugins/<name>/*.dll`
fn canon_red4ext_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.is_directory(RED4EXT_MOD_CANONICAL_BASEDIR) {
        return Ok(LayoutMatch::NoMatch);
    }

    let loose_dlls = ctx.tree.files_in(RED4EXT_MOD_CANONICAL_BASEDIR);
    if loose_dlls.iter().any(is_dll) {
        return Ok(LayoutMatch::NoMatch);
    }

    let plugin_files = canonical_mod_files(ctx.tree);
    let archives = companion_archives(ctx.tree);
    if plugin_files.is_empty() || !accounts_for_all(ctx.tree, &[&plugin_files, &archives]) {
        debug!("Red4Ext: canonical plugin directories don't cover every file");
        return Ok(LayoutMatch::NoMatch);
    }

    let files: Vec<_> = plugin_files.into_iter().chain(archives).collect();
    identity(Layout::Red4Ext(Red4ExtLayout::Canon), &files, &[])
}

/// `red4ext/plugins/*.dll`, moved into a directory named after the mod
fn basedir_red4ext_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    let base_files = ctx.tree.files_in(RED4EXT_MOD_CANONICAL_BASEDIR);
    if !base_files.iter().any(is_dll) {
        return Ok(LayoutMatch::NoMatch);
    }

    let files = ctx.tree.files_under(RED4EXT_MOD_CANONICAL_BASEDIR, &Glob::any());
    let archives = companion_archives(ctx.tree);
    if !accounts_for_all(ctx.tree, &[&files, &archives]) {
        debug!("Red4Ext: files outside {}", RED4EXT_MOD_CANONICAL_BASEDIR);
        return Ok(LayoutMatch::NoMatch);
    }

    let base = dir(RED4EXT_MOD_CANONICAL_BASEDIR);
    relocated(
        Layout::Red4Ext(Red4ExtLayout::Basedir),
        &files,
        &base,
        &base.join(ctx.mod_info.name()),
        &archives,
    )
}

/// `<name>/*.dll` at the root, moved under `red4ext/plugins`
fn modnamed_red4ext_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    let named_dirs = find_named_dirs(ctx.tree, is_dll);
    if named_dirs.is_empty() {
        return Ok(LayoutMatch::NoMatch);
    }

    let allowed = ctx
        .catalog
        .max_named_instances(InstallerType::Red4Ext)
        .unwrap_or(usize::MAX);
    if named_dirs.len() > allowed {
        warn!(dirs = ?named_dirs, "Red4Ext: more than one named plugin directory");
        return Ok(LayoutMatch::conflict(
            Layout::Red4Ext(Red4ExtLayout::Modnamed),
            format!("{} named plugin directories, only {} allowed", named_dirs.len(), allowed),
        ));
    }

    let files = files_under_each(ctx.tree, &named_dirs);
    let archives = companion_archives(ctx.tree);
    let loose_archives = toplevel_archives(ctx.tree);
    if !accounts_for_all(ctx.tree, &[&files, &archives, &loose_archives]) {
        debug!("Red4Ext: files outside the named plugin directory");
        return Ok(LayoutMatch::NoMatch);
    }

    let root = ModPath::root();
    relocated_groups(
        Layout::Red4Ext(Red4ExtLayout::Modnamed),
        &[
            Relocation { files: &files, from: &root, to: &dir(RED4EXT_MOD_CANONICAL_BASEDIR) },
            Relocation { files: &loose_archives, from: &root, to: &dir(ARCHIVE_ONLY_CANONICAL_PREFIX) },
        ],
        &archives,
    )
}

/// `*.dll` at the root; everything but the archives moves into the plugin dir
fn toplevel_red4ext_layout(ctx: &LayoutContext<'_>) -> Result<LayoutMatch> {
    if !ctx.tree.files_in(FILETREE_ROOT).iter().any(is_dll) {
        return Ok(LayoutMatch::NoMatch);
    }

    let archives = companion_archives(ctx.tree);
    let loose_archives = toplevel_archives(ctx.tree);
    let files = without(without(ctx.tree.source_paths(), &archives), &loose_archives);

    let root = ModPath::root();
    relocated_groups(
        Layout::Red4Ext(Red4ExtLayout::Toplevel),
        &[
            Relocation {
                files: &files,
                from: &root,
                to: &dir(RED4EXT_MOD_CANONICAL_BASEDIR).join(ctx.mod_info.name()),
            },
            Relocation { files: &loose_archives, from: &root, to: &dir(ARCHIVE_ONLY_CANONICAL_PREFIX) },
        ],
        &archives,
    )
}
