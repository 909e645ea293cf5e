//! Static catalog of supported mod layouts
//!
//! One descriptor per installer: which layout variants it recognizes (in
//! detection order), how many named directories a mod may carry, and what
//! happens when none of the variants fits. The catalog is built once and
//! shared read-only by the pipeline and the prompt texts.

use std::fmt;

use once_cell::sync::Lazy;

use crate::install::dialogs::heredoc;

//
// Paths and markers
//

pub const ARCHIVE_EXTENSION: &str = "archive";
pub const ARCHIVE_ONLY_CANONICAL_PREFIX: &str = "archive/pc/mod";
pub const ARCHIVE_ONLY_HERITAGE_PREFIX: &str = "archive/pc/patch";

pub const CET_GAME_BIN_DIR: &str = "bin/x64";
pub const CET_CORE_ASI: &str = "bin/x64/plugins/cyber_engine_tweaks.asi";
pub const CET_MOD_CANONICAL_PATH_PREFIX: &str = "bin/x64/plugins/cyber_engine_tweaks/mods";
pub const CET_MOD_CANONICAL_INIT_FILE: &str = "init.lua";

pub const CYBERSCRIPT_CORE_CETBASEDIR: &str = "bin/x64/plugins/cyber_engine_tweaks/mods/cyberscript";
pub const CYBERSCRIPT_CORE_REQUIRED_FILES: &[&str] = &[
    "bin/x64/plugins/cyber_engine_tweaks/mods/cyberscript/init.lua",
    "bin/x64/plugins/cyber_engine_tweaks/mods/cyberscript/db.sqlite3",
];

pub const REDSCRIPT_CORE_COMPILER: &str = "engine/tools/scc.exe";
pub const REDSCRIPT_CORE_BASEDIRS: &[&str] = &["engine", "r6"];
pub const REDS_MOD_CANONICAL_PATH_PREFIX: &str = "r6/scripts";
pub const REDS_EXTENSION: &str = "reds";

pub const RED4EXT_CORE_BASEDIR: &str = "red4ext";
pub const RED4EXT_CORE_DLL: &str = "red4ext/RED4ext.dll";
pub const RED4EXT_CORE_LOADER: &str = "bin/x64/d3d11.dll";
pub const RED4EXT_MOD_CANONICAL_BASEDIR: &str = "red4ext/plugins";
pub const DLL_EXTENSION: &str = "dll";

/// WolvenKit Desktop's executable. The command-line WolvenKit Console ships
/// `WolvenKit.CLI.exe` instead.
pub const WOLVENKIT_DESKTOP_EXE: &str = "WolvenKit.exe";

pub const WOLVENKIT_DESKTOP_REJECTION: &str =
    "WolvenKit Desktop can't be installed as a mod, get WolvenKit Console instead!";

pub const REDMOD_BASEDIR: &str = "mods";
pub const REDMOD_INFO_FILENAME: &str = "info.json";

/// Top-level game directories. A root directory with one of these names is
/// part of the game layout, never a named mod directory.
pub const GAME_TOPLEVEL_DIRS: &[&str] = &["archive", "bin", "engine", "mods", "r6", "red4ext"];

//
// Installer types
//

/// The installer that owns an attempt, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallerType {
    CoreCet,
    CoreRedscript,
    CoreRed4Ext,
    CoreCyberScript,
    CoreWolvenKit,
    MultiType,
    Redmod,
    Red4Ext,
    Redscript,
    Cet,
    ArchiveOnly,
    Fallback,
}

impl fmt::Display for InstallerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallerType::CoreCet => "Core CET",
            InstallerType::CoreRedscript => "Core Redscript",
            InstallerType::CoreRed4Ext => "Core Red4ext",
            InstallerType::CoreCyberScript => "Core CyberScript",
            InstallerType::CoreWolvenKit => "Core WolvenKit",
            InstallerType::MultiType => "MultiType",
            InstallerType::Redmod => "REDmod",
            InstallerType::Red4Ext => "Red4Ext",
            InstallerType::Redscript => "Redscript",
            InstallerType::Cet => "CET",
            InstallerType::ArchiveOnly => "ArchiveOnly",
            InstallerType::Fallback => "Fallback",
        };
        f.write_str(name)
    }
}

//
// Layout variants
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreLayout {
    Cet,
    Redscript,
    Red4Ext,
    CyberScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedmodLayout {
    Named,
    Canon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Red4ExtLayout {
    Canon,
    Basedir,
    Modnamed,
    Toplevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedscriptLayout {
    Canon,
    Basedir,
    Toplevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CetLayout {
    Canon,
    Named,
    Toplevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveLayout {
    Canon,
    Heritage,
    Toplevel,
    Ambiguous,
}

/// A recognized layout variant of some family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Core(CoreLayout),
    MultiType,
    Redmod(RedmodLayout),
    Red4Ext(Red4ExtLayout),
    Redscript(RedscriptLayout),
    Cet(CetLayout),
    Archive(ArchiveLayout),
}

/// How a variant relates to the canonical install structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantTag {
    /// Installs without correction
    Canonical,
    /// Subdirectories renamed into the canonical slot, keeping their names
    Named,
    /// Corrected into canonical form using the mod's own name
    Fixable,
    /// Recognized but never installed without a human decision
    Ambiguous,
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            VariantTag::Canonical => "canonical",
            VariantTag::Named => "I can fix this to canonical, keeping the directory name",
            VariantTag::Fixable => "I can fix this to canonical",
            VariantTag::Ambiguous => "you'll need to decide",
        };
        f.write_str(text)
    }
}

impl Layout {
    pub fn tag(&self) -> VariantTag {
        match self {
            Layout::Core(_)
            | Layout::MultiType
            | Layout::Redmod(RedmodLayout::Canon)
            | Layout::Red4Ext(Red4ExtLayout::Canon)
            | Layout::Redscript(RedscriptLayout::Canon)
            | Layout::Cet(CetLayout::Canon)
            | Layout::Archive(ArchiveLayout::Canon) => VariantTag::Canonical,
            Layout::Redmod(RedmodLayout::Named)
            | Layout::Red4Ext(Red4ExtLayout::Modnamed)
            | Layout::Cet(CetLayout::Named) => VariantTag::Named,
            Layout::Red4Ext(Red4ExtLayout::Basedir | Red4ExtLayout::Toplevel)
            | Layout::Redscript(RedscriptLayout::Basedir | RedscriptLayout::Toplevel)
            | Layout::Cet(CetLayout::Toplevel)
            | Layout::Archive(ArchiveLayout::Heritage | ArchiveLayout::Toplevel) => VariantTag::Fixable,
            Layout::Archive(ArchiveLayout::Ambiguous) => VariantTag::Ambiguous,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = match self {
            Layout::Core(CoreLayout::Cet) => r".\bin\x64\plugins\cyber_engine_tweaks.asi + .\bin\x64\**",
            Layout::Core(CoreLayout::Redscript) => r".\engine\tools\scc.exe + .\engine\** + .\r6\**",
            Layout::Core(CoreLayout::Red4Ext) => r".\red4ext\RED4ext.dll + .\red4ext\** + (if any) .\bin\x64\d3d11.dll",
            Layout::Core(CoreLayout::CyberScript) => r".\bin\x64\plugins\cyber_engine_tweaks\mods\cyberscript\**",
            Layout::MultiType => "each type in its canonical layout, nothing else",
            Layout::Redmod(RedmodLayout::Named) => r".\[modname]\info.json + [any files + subdirs]",
            Layout::Redmod(RedmodLayout::Canon) => r".\mods\[modname]\info.json + [any files + subdirs]",
            Layout::Red4Ext(Red4ExtLayout::Canon) => r".\red4ext\plugins\[modname]\[*.dll + any files + subdirs] + (if any) .\archive\pc\mod\*.archive",
            Layout::Red4Ext(Red4ExtLayout::Basedir) => r".\red4ext\plugins\[*.dll + any files + subdirs] + (if any) .\archive\pc\mod\*.archive",
            Layout::Red4Ext(Red4ExtLayout::Modnamed) => r".\[modname]\[*.dll + any files + subdirs] + (if any) .\*.archive",
            Layout::Red4Ext(Red4ExtLayout::Toplevel) => r".\*.dll + [any files + subdirs] + (if any) .\*.archive",
            Layout::Redscript(RedscriptLayout::Canon) => r".\r6\scripts\[modname]\[*.reds + any files + subdirs]",
            Layout::Redscript(RedscriptLayout::Basedir) => r".\r6\scripts\[*.reds + any files + subdirs]",
            Layout::Redscript(RedscriptLayout::Toplevel) => r".\*.reds + [any files + subdirs]",
            Layout::Cet(CetLayout::Canon) => r".\bin\x64\plugins\cyber_engine_tweaks\mods\[modname]\init.lua + [any files + subdirs]",
            Layout::Cet(CetLayout::Named) => r".\[modname]\init.lua + [any files + subdirs]",
            Layout::Cet(CetLayout::Toplevel) => r".\init.lua + [any files + subdirs]",
            Layout::Archive(ArchiveLayout::Canon) => r".\archive\pc\mod\*.archive",
            Layout::Archive(ArchiveLayout::Heritage) => r".\archive\pc\patch\*.archive",
            Layout::Archive(ArchiveLayout::Toplevel) => r".\*.archive",
            Layout::Archive(ArchiveLayout::Ambiguous) => r".\**\*.archive (in other subdirectories)",
        };
        f.write_str(pattern)
    }
}

//
// Descriptors
//

/// What happens when a detected family can't settle on a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Ask the user whether to install everything unverified
    Prompt,
    /// Cancel with no fix offered
    Reject,
}

/// Static configuration for one installer
#[derive(Debug, Clone)]
pub struct LayoutDescriptor {
    pub installer: InstallerType,
    /// Recognized variants in detection order
    pub variants: &'static [Layout],
    /// How many named subdirectories a single mod may carry (`None`: any)
    pub max_named_instances: Option<usize>,
    pub on_failure: FailurePolicy,
    /// Message used when the failure policy rejects the mod
    pub failure_message: &'static str,
    /// Human description of the supported layouts (markdown)
    pub description: String,
}

impl LayoutDescriptor {
    fn new(installer: InstallerType, variants: &'static [Layout]) -> Self {
        Self {
            installer,
            variants,
            max_named_instances: None,
            on_failure: FailurePolicy::Prompt,
            failure_message: "Can't figure out the structure of this mod",
            description: describe_variants(variants),
        }
    }

    fn max_named(mut self, max: usize) -> Self {
        self.max_named_instances = Some(max);
        self
    }

    fn rejecting(mut self, message: &'static str) -> Self {
        self.on_failure = FailurePolicy::Reject;
        self.failure_message = message;
        self
    }

    fn described_as(mut self, description: &str) -> Self {
        self.description = heredoc(description);
        self
    }
}

fn describe_variants(variants: &[Layout]) -> String {
    variants
        .iter()
        .map(|layout| format!("- `{}` ({})", layout, layout.tag()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read-only table of every installer's descriptor
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    descriptors: Vec<LayoutDescriptor>,
}

static BUILTIN_CATALOG: Lazy<LayoutCatalog> = Lazy::new(LayoutCatalog::builtin);

impl LayoutCatalog {
    /// The process-wide catalog, built on first use
    pub fn global() -> &'static LayoutCatalog {
        &BUILTIN_CATALOG
    }

    /// Build a catalog from explicit descriptors
    pub fn from_descriptors(descriptors: Vec<LayoutDescriptor>) -> Self {
        Self { descriptors }
    }

    fn builtin() -> Self {
        use Layout::*;

        let descriptors = vec![
            LayoutDescriptor::new(InstallerType::CoreCet, &[Core(CoreLayout::Cet)]),
            LayoutDescriptor::new(InstallerType::CoreRedscript, &[Core(CoreLayout::Redscript)]),
            LayoutDescriptor::new(InstallerType::CoreRed4Ext, &[Core(CoreLayout::Red4Ext)]),
            LayoutDescriptor::new(InstallerType::CoreCyberScript, &[Core(CoreLayout::CyberScript)])
                .rejecting("Didn't find all required CyberScript files!"),
            LayoutDescriptor::new(InstallerType::CoreWolvenKit, &[])
                .rejecting(WOLVENKIT_DESKTOP_REJECTION)
                .described_as(
                    "
                    Only WolvenKit Console can be installed, WolvenKit Desktop has to be
                    installed on its own.
                    ",
                ),
            LayoutDescriptor::new(InstallerType::MultiType, &[MultiType]).described_as(&format!(
                "
                It looks like this mod combines multiple types of mods. I can only
                support that when each type uses its canonical layout, and there are
                no other files outside them:

                - `{}`
                - `{}`
                - `{}`
                - `{}`
                - `{}`
                ",
                Cet(CetLayout::Canon),
                Redscript(RedscriptLayout::Canon),
                Red4Ext(Red4ExtLayout::Canon),
                Archive(ArchiveLayout::Canon),
                Archive(ArchiveLayout::Heritage),
            )),
            LayoutDescriptor::new(
                InstallerType::Redmod,
                &[Redmod(RedmodLayout::Named), Redmod(RedmodLayout::Canon)],
            )
            .rejecting("Didn't Find Expected REDmod Installation!"),
            LayoutDescriptor::new(
                InstallerType::Red4Ext,
                &[
                    Red4Ext(Red4ExtLayout::Canon),
                    Red4Ext(Red4ExtLayout::Basedir),
                    Red4Ext(Red4ExtLayout::Modnamed),
                    Red4Ext(Red4ExtLayout::Toplevel),
                ],
            )
            .max_named(1),
            LayoutDescriptor::new(
                InstallerType::Redscript,
                &[
                    Redscript(RedscriptLayout::Canon),
                    Redscript(RedscriptLayout::Basedir),
                    Redscript(RedscriptLayout::Toplevel),
                ],
            ),
            LayoutDescriptor::new(
                InstallerType::Cet,
                &[Cet(CetLayout::Canon), Cet(CetLayout::Named), Cet(CetLayout::Toplevel)],
            )
            .max_named(1),
            LayoutDescriptor::new(
                InstallerType::ArchiveOnly,
                &[
                    Archive(ArchiveLayout::Canon),
                    Archive(ArchiveLayout::Heritage),
                    Archive(ArchiveLayout::Toplevel),
                    Archive(ArchiveLayout::Ambiguous),
                ],
            ),
            LayoutDescriptor::new(InstallerType::Fallback, &[]).described_as(
                "
                Anything goes: every file is installed exactly as it is in the archive,
                without any checks.
                ",
            ),
        ];

        Self { descriptors }
    }

    pub fn get(&self, installer: InstallerType) -> Option<&LayoutDescriptor> {
        self.descriptors.iter().find(|d| d.installer == installer)
    }

    /// Supported layouts for an installer, as shown to the user
    pub fn description(&self, installer: InstallerType) -> Option<&str> {
        self.get(installer).map(|d| d.description.as_str())
    }

    /// Named-subdirectory limit for an installer (`None`: unlimited)
    pub fn max_named_instances(&self, installer: InstallerType) -> Option<usize> {
        self.get(installer).and_then(|d| d.max_named_instances)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutDescriptor> {
        self.descriptors.iter()
    }
}
