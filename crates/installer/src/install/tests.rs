//! Unit tests for the layout installer pipeline

use super::*;
use crate::install::dialogs::{ADJUSTMENT_TITLE, CONFLICT_TITLE, FALLBACK_TITLE};
use crate::install::layouts::archive::ArchiveOnlyInstaller;
use crate::install::layouts::{
    ArchiveLayout, CetLayout, CoreLayout, Red4ExtLayout, RedmodLayout, RedscriptLayout,
};
use crate::install::vfs::path::MAX_PATH_SEGMENTS;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// What the installer showed to the user
#[derive(Debug, Clone, PartialEq)]
struct Shown {
    title: String,
    markdown: String,
    files: Vec<String>,
}

/// Prompt that answers with a fixed decision and records every call
#[derive(Debug)]
struct RecordingPrompt {
    decision: InstallDecision,
    asked: Mutex<Vec<Shown>>,
    notified: Mutex<Vec<Shown>>,
}

impl RecordingPrompt {
    fn new(decision: InstallDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            asked: Mutex::new(Vec::new()),
            notified: Mutex::new(Vec::new()),
        })
    }

    fn asked(&self) -> Vec<Shown> {
        self.asked.lock().unwrap().clone()
    }

    fn notified(&self) -> Vec<Shown> {
        self.notified.lock().unwrap().clone()
    }
}

#[async_trait]
impl InstallPrompt for RecordingPrompt {
    async fn ask_proceed_or_cancel(
        &self,
        title: &str,
        markdown: &str,
        files: &[String],
    ) -> anyhow::Result<InstallDecision> {
        self.asked.lock().unwrap().push(Shown {
            title: title.to_string(),
            markdown: markdown.to_string(),
            files: files.to_vec(),
        });
        Ok(self.decision)
    }

    async fn notify(&self, title: &str, markdown: &str, files: &[String]) -> anyhow::Result<()> {
        self.notified.lock().unwrap().push(Shown {
            title: title.to_string(),
            markdown: markdown.to_string(),
            files: files.to_vec(),
        });
        Ok(())
    }
}

/// Prompt whose host has gone away
struct BrokenPrompt;

#[async_trait]
impl InstallPrompt for BrokenPrompt {
    async fn ask_proceed_or_cancel(&self, _: &str, _: &str, _: &[String]) -> anyhow::Result<InstallDecision> {
        anyhow::bail!("dialog host disconnected")
    }
}

/// Prompt that answers questions but can't show notices
struct NoticeFailingPrompt;

#[async_trait]
impl InstallPrompt for NoticeFailingPrompt {
    async fn ask_proceed_or_cancel(&self, _: &str, _: &str, _: &[String]) -> anyhow::Result<InstallDecision> {
        Ok(InstallDecision::Cancel)
    }

    async fn notify(&self, _: &str, _: &str, _: &[String]) -> anyhow::Result<()> {
        anyhow::bail!("notification area unavailable")
    }
}

fn p(path: &str) -> ModPath {
    ModPath::new(path).unwrap()
}

fn copy(path: &str) -> Instruction {
    Instruction::copy(p(path), p(path))
}

fn mv(source: &str, destination: &str) -> Instruction {
    Instruction::relocate(p(source), p(destination))
}

fn mkdir(path: &str) -> Instruction {
    Instruction::make_directory(p(path))
}

fn mod_info(name: &str) -> ModInfo {
    ModInfo::new(name).unwrap()
}

fn installer_with(prompt: Arc<RecordingPrompt>) -> ModLayoutInstaller {
    ModLayoutInstaller::new(InstallerConfig::default(), prompt)
}

/// Install with a prompt that cancels, so any unexpected prompt fails the test
async fn install_resolved(files: &[&str], name: &str) -> InstallOutcome {
    let prompt = RecordingPrompt::new(InstallDecision::Cancel);
    let outcome = installer_with(prompt.clone())
        .install(files.iter().copied(), &mod_info(name))
        .await
        .unwrap();
    assert!(prompt.asked().is_empty(), "unexpected prompt: {:?}", prompt.asked());
    assert_eq!(outcome.resolution, Resolution::Resolved);
    outcome
}

const CET_BASE: &str = "bin/x64/plugins/cyber_engine_tweaks/mods";

#[cfg(test)]
mod core_tests {
    use super::*;

    #[tokio::test]
    async fn test_core_red4ext_with_existing_plugin() {
        let outcome = install_resolved(&["red4ext/plugins/MyMod/my.dll", "red4ext/RED4ext.dll"], "Red4ext").await;

        assert_eq!(outcome.installer, InstallerType::CoreRed4Ext);
        assert_eq!(outcome.layout, Some(Layout::Core(CoreLayout::Red4Ext)));
        assert_eq!(
            outcome.instructions,
            vec![copy("red4ext/RED4ext.dll"), copy("red4ext/plugins/MyMod/my.dll")]
        );
    }

    #[tokio::test]
    async fn test_core_red4ext_with_loader_creates_plugin_dir() {
        let outcome = install_resolved(
            &[
                "bin/",
                "bin/x64/",
                "bin/x64/d3d11.dll",
                "red4ext/",
                "red4ext/plugins/",
                "red4ext/LICENSE.txt",
                "red4ext/THIRD_PARTY_LICENSES.txt",
                "red4ext/RED4ext.dll",
            ],
            "Red4ext",
        )
        .await;

        assert_eq!(
            outcome.instructions,
            vec![
                copy("bin/x64/d3d11.dll"),
                copy("red4ext/LICENSE.txt"),
                copy("red4ext/THIRD_PARTY_LICENSES.txt"),
                copy("red4ext/RED4ext.dll"),
                mkdir("red4ext/plugins"),
            ]
        );
    }

    #[tokio::test]
    async fn test_core_red4ext_with_deprecated_loader_prompts() {
        let files = [
            "bin/",
            "bin/x64/",
            "bin/x64/powrprof.dll",
            "red4ext/",
            "red4ext/plugins/",
            "red4ext/LICENSE.txt",
            "red4ext/RED4ext.dll",
        ];

        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let outcome = installer_with(prompt.clone())
            .install(files, &mod_info("Red4ext"))
            .await
            .unwrap();

        assert_eq!(prompt.asked().len(), 1);
        assert_eq!(prompt.asked()[0].title, CONFLICT_TITLE);
        assert_eq!(outcome.installer, InstallerType::CoreRed4Ext);
        assert_eq!(outcome.resolution, Resolution::ProceededOnConflict);
        assert_eq!(
            outcome.instructions,
            vec![
                copy("bin/x64/powrprof.dll"),
                copy("red4ext/LICENSE.txt"),
                copy("red4ext/RED4ext.dll"),
                mkdir("red4ext/plugins"),
            ]
        );

        let cancelled = installer_with(RecordingPrompt::new(InstallDecision::Cancel))
            .install(files, &mod_info("Red4ext"))
            .await
            .unwrap_err();
        assert!(cancelled.is_user_cancellation());
        assert_eq!(
            cancelled.to_string(),
            "Core Red4ext: user chose to cancel the installation"
        );
    }

    #[tokio::test]
    async fn test_core_cet_creates_mods_dir() {
        let outcome = install_resolved(
            &[
                "bin/x64/plugins/cyber_engine_tweaks.asi",
                "bin/x64/plugins/cyber_engine_tweaks/scripts/json.lua",
                "bin/x64/global.ini",
            ],
            "CET",
        )
        .await;

        assert_eq!(outcome.installer, InstallerType::CoreCet);
        assert_eq!(
            outcome.instructions,
            vec![
                copy("bin/x64/global.ini"),
                copy("bin/x64/plugins/cyber_engine_tweaks.asi"),
                copy("bin/x64/plugins/cyber_engine_tweaks/scripts/json.lua"),
                mkdir(CET_BASE),
            ]
        );
    }

    #[tokio::test]
    async fn test_core_redscript_creates_scripts_dir() {
        let outcome = install_resolved(
            &[
                "engine/tools/scc.exe",
                "engine/config/base/scripts.ini",
                "r6/config/cybercmd/scc.toml",
            ],
            "Redscript",
        )
        .await;

        assert_eq!(outcome.installer, InstallerType::CoreRedscript);
        assert_eq!(
            outcome.instructions,
            vec![
                copy("engine/tools/scc.exe"),
                copy("engine/config/base/scripts.ini"),
                copy("r6/config/cybercmd/scc.toml"),
                mkdir("r6/scripts"),
            ]
        );
    }

    #[tokio::test]
    async fn test_core_cyberscript_installs_in_place() {
        let outcome = install_resolved(
            &[
                "bin/x64/plugins/cyber_engine_tweaks/mods/cyberscript/init.lua",
                "bin/x64/plugins/cyber_engine_tweaks/mods/cyberscript/db.sqlite3",
            ],
            "CyberScript",
        )
        .await;

        assert_eq!(outcome.installer, InstallerType::CoreCyberScript);
        assert!(outcome.instructions.iter().all(|i| i.source() == Some(i.destination())));
    }

    #[tokio::test]
    async fn test_core_cyberscript_rejections() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let installer = installer_with(prompt.clone());

        let missing = installer
            .install(
                ["bin/x64/plugins/cyber_engine_tweaks/mods/cyberscript/init.lua"],
                &mod_info("CyberScript"),
            )
            .await
            .unwrap_err();
        assert_eq!(
            missing.to_string(),
            "Core CyberScript: Didn't find all required CyberScript files!"
        );

        let outside = installer
            .install(
                [
                    "bin/x64/plugins/cyber_engine_tweaks/mods/cyberscript/init.lua",
                    "bin/x64/plugins/cyber_engine_tweaks/mods/cyberscript/db.sqlite3",
                    "readme.txt",
                ],
                &mod_info("CyberScript"),
            )
            .await
            .unwrap_err();
        assert_eq!(
            outside.to_string(),
            "Core CyberScript: Found files outside known CyberScript directories!"
        );
        assert_eq!(outside.files().len(), 3);

        assert!(prompt.asked().is_empty());
        assert_eq!(prompt.notified().len(), 2);
    }
}

#[cfg(test)]
mod wolvenkit_tests {
    use super::*;

    #[tokio::test]
    async fn test_wolvenkit_desktop_is_rejected_with_a_notice() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let files = ["WolvenKit/WolvenKit.exe", "WolvenKit/lib/Cp77.dll", "WolvenKit/readme.txt"];
        let err = installer_with(prompt.clone())
            .install(files, &mod_info("WolvenKit"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::InvalidLayout { installer: InstallerType::CoreWolvenKit, .. }));
        assert_eq!(err.files(), files.map(String::from));
        assert!(prompt.asked().is_empty());

        let notified = prompt.notified();
        assert_eq!(notified.len(), 1);
        assert!(notified[0].markdown.contains("WolvenKit\nConsole"));
    }

    #[tokio::test]
    async fn test_wolvenkit_executable_matches_any_case_and_depth() {
        let installer = installer_with(RecordingPrompt::new(InstallDecision::Cancel));

        assert_eq!(
            installer.test_supported(["wolvenkit.EXE"]).unwrap(),
            Some(InstallerType::CoreWolvenKit)
        );
        assert_eq!(
            installer.test_supported(["a/b/c/WolvenKit.exe", "a/b/x.archive"]).unwrap(),
            Some(InstallerType::CoreWolvenKit)
        );
        assert_eq!(installer.test_supported(["WolvenKit.CLI.exe"]).unwrap(), None);
    }
}

#[cfg(test)]
mod redmod_tests {
    use super::*;

    #[tokio::test]
    async fn test_canonical_redmod_is_identity() {
        let outcome = install_resolved(&["mods/Foo/info.json", "mods/Foo/script.reds"], "Foo").await;

        assert_eq!(outcome.installer, InstallerType::Redmod);
        assert_eq!(outcome.layout, Some(Layout::Redmod(RedmodLayout::Canon)));
        assert_eq!(
            outcome.instructions,
            vec![copy("mods/Foo/info.json"), copy("mods/Foo/script.reds")]
        );
    }

    #[tokio::test]
    async fn test_named_redmod_is_moved_under_mods() {
        let outcome = install_resolved(&["Foo/info.json", "Foo/script.reds"], "Whatever").await;

        assert_eq!(outcome.layout, Some(Layout::Redmod(RedmodLayout::Named)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("Foo/info.json", "mods/Foo/info.json"),
                mv("Foo/script.reds", "mods/Foo/script.reds"),
            ]
        );
    }

    #[tokio::test]
    async fn test_several_named_redmods_keep_their_own_names() {
        let outcome = install_resolved(
            &["Foo/info.json", "Foo/a.reds", "Bar/info.json", "Bar/sub/b.reds"],
            "Whatever",
        )
        .await;

        assert_eq!(
            outcome.instructions,
            vec![
                mv("Foo/info.json", "mods/Foo/info.json"),
                mv("Foo/a.reds", "mods/Foo/a.reds"),
                mv("Bar/info.json", "mods/Bar/info.json"),
                mv("Bar/sub/b.reds", "mods/Bar/sub/b.reds"),
            ]
        );
    }

    #[tokio::test]
    async fn test_named_redmod_wins_over_empty_mods_dir() {
        let outcome = install_resolved(&["mods/", "Foo/info.json"], "Foo").await;

        assert_eq!(outcome.layout, Some(Layout::Redmod(RedmodLayout::Named)));
        assert_eq!(outcome.instructions, vec![mv("Foo/info.json", "mods/Foo/info.json")]);
    }

    #[tokio::test]
    async fn test_invalid_redmod_is_rejected_without_prompt() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let err = installer_with(prompt.clone())
            .install(["mods/Foo/info.json", "mods/Bar/readme.txt"], &mod_info("Foo"))
            .await
            .unwrap_err();

        match &err {
            InstallError::InvalidLayout { installer, message, files } => {
                assert_eq!(*installer, InstallerType::Redmod);
                assert_eq!(message, "Didn't Find Expected REDmod Installation!");
                assert_eq!(files, &vec!["mods/Foo/info.json".to_string(), "mods/Bar/readme.txt".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(prompt.asked().is_empty());
        assert_eq!(prompt.notified().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_redmod_leaves_the_mod_to_other_installers() {
        let config = InstallerConfig {
            redmod_enabled: false,
            ..InstallerConfig::default()
        };
        let installer = ModLayoutInstaller::new(config, Arc::new(FixedDecisionPrompt::cancel()));

        assert!(!installer.registry().installer_types().contains(&InstallerType::Redmod));
        assert_eq!(
            installer.test_supported(["Foo/info.json", "Foo/script.reds"]).unwrap(),
            Some(InstallerType::Redscript)
        );
    }
}

#[cfg(test)]
mod cet_tests {
    use super::*;

    #[tokio::test]
    async fn test_two_named_cet_dirs_conflict_and_proceed_stages_everything() {
        let files = ["ModA/init.lua", "ModA/lib.lua", "ModB/init.lua"];
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);

        let outcome = installer_with(prompt.clone())
            .install(files, &mod_info("Mods"))
            .await
            .unwrap();

        assert_eq!(outcome.installer, InstallerType::Cet);
        assert_eq!(outcome.layout, None);
        assert_eq!(outcome.resolution, Resolution::ProceededOnConflict);
        assert_eq!(
            outcome.instructions,
            vec![copy("ModA/init.lua"), copy("ModA/lib.lua"), copy("ModB/init.lua")]
        );

        let asked = prompt.asked();
        assert_eq!(asked.len(), 1);
        assert_eq!(asked[0].title, CONFLICT_TITLE);
        assert_eq!(asked[0].files, files.map(String::from).to_vec());
        assert!(asked[0].markdown.contains("supported layouts for CET mods"));
    }

    #[tokio::test]
    async fn test_two_named_cet_dirs_conflict_and_cancel_fails() {
        let err = installer_with(RecordingPrompt::new(InstallDecision::Cancel))
            .install(["ModA/init.lua", "ModB/init.lua"], &mod_info("Mods"))
            .await
            .unwrap_err();

        match err {
            InstallError::UserCancelled { installer, files } => {
                assert_eq!(installer, InstallerType::Cet);
                assert_eq!(files, vec!["ModA/init.lua", "ModB/init.lua"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_named_cet_mod_is_moved_keeping_its_name() {
        let outcome = install_resolved(&["MyMod/init.lua", "MyMod/data/db.json"], "Other").await;

        assert_eq!(outcome.layout, Some(Layout::Cet(CetLayout::Named)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("MyMod/init.lua", &format!("{CET_BASE}/MyMod/init.lua")),
                mv("MyMod/data/db.json", &format!("{CET_BASE}/MyMod/data/db.json")),
            ]
        );
    }

    #[tokio::test]
    async fn test_toplevel_cet_mod_uses_mod_name() {
        let outcome = install_resolved(&["init.lua", "helpers.lua"], "Cool Mod").await;

        assert_eq!(outcome.layout, Some(Layout::Cet(CetLayout::Toplevel)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("init.lua", &format!("{CET_BASE}/Cool Mod/init.lua")),
                mv("helpers.lua", &format!("{CET_BASE}/Cool Mod/helpers.lua")),
            ]
        );
    }

    #[tokio::test]
    async fn test_canonical_cet_with_companion_archive() {
        let init = format!("{CET_BASE}/Foo/init.lua");
        let outcome = install_resolved(&[init.as_str(), "archive/pc/mod/foo.archive"], "Foo").await;

        assert_eq!(outcome.layout, Some(Layout::Cet(CetLayout::Canon)));
        assert_eq!(outcome.instructions, vec![copy(&init), copy("archive/pc/mod/foo.archive")]);
    }

    #[tokio::test]
    async fn test_disabled_prompting_cancels_conflicts() {
        let config = InstallerConfig {
            prompt_on_conflict: false,
            ..InstallerConfig::default()
        };
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let err = ModLayoutInstaller::new(config, prompt.clone())
            .install(["ModA/init.lua", "ModB/init.lua"], &mod_info("Mods"))
            .await
            .unwrap_err();

        assert!(err.is_user_cancellation());
        assert!(prompt.asked().is_empty());
    }
}

#[cfg(test)]
mod red4ext_tests {
    use super::*;

    #[tokio::test]
    async fn test_canonical_plugin_is_identity() {
        let outcome = install_resolved(
            &["red4ext/plugins/MyPlugin/my.dll", "red4ext/plugins/MyPlugin/readme.md"],
            "MyPlugin",
        )
        .await;

        assert_eq!(outcome.installer, InstallerType::Red4Ext);
        assert_eq!(outcome.layout, Some(Layout::Red4Ext(Red4ExtLayout::Canon)));
        assert_eq!(
            outcome.instructions,
            vec![copy("red4ext/plugins/MyPlugin/my.dll"), copy("red4ext/plugins/MyPlugin/readme.md")]
        );
    }

    #[tokio::test]
    async fn test_basedir_plugin_moves_into_mod_named_dir() {
        let outcome = install_resolved(&["red4ext/plugins/my.dll", "red4ext/plugins/cfg/x.ini"], "MyPlugin").await;

        assert_eq!(outcome.layout, Some(Layout::Red4Ext(Red4ExtLayout::Basedir)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("red4ext/plugins/my.dll", "red4ext/plugins/MyPlugin/my.dll"),
                mv("red4ext/plugins/cfg/x.ini", "red4ext/plugins/MyPlugin/cfg/x.ini"),
            ]
        );
    }

    #[tokio::test]
    async fn test_toplevel_plugin_keeps_companion_archives_in_place() {
        let outcome = install_resolved(&["my.dll", "readme.txt", "archive/pc/mod/x.archive"], "MyPlugin").await;

        assert_eq!(outcome.layout, Some(Layout::Red4Ext(Red4ExtLayout::Toplevel)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("my.dll", "red4ext/plugins/MyPlugin/my.dll"),
                mv("readme.txt", "red4ext/plugins/MyPlugin/readme.txt"),
                copy("archive/pc/mod/x.archive"),
            ]
        );
    }

    #[tokio::test]
    async fn test_named_plugin_dir_moves_under_plugins() {
        let outcome = install_resolved(&["MyPlugin/my.dll", "MyPlugin/cfg.ini"], "Whatever").await;

        assert_eq!(outcome.installer, InstallerType::Red4Ext);
        assert_eq!(outcome.layout, Some(Layout::Red4Ext(Red4ExtLayout::Modnamed)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("MyPlugin/my.dll", "red4ext/plugins/MyPlugin/my.dll"),
                mv("MyPlugin/cfg.ini", "red4ext/plugins/MyPlugin/cfg.ini"),
            ]
        );
    }

    #[tokio::test]
    async fn test_named_plugin_dir_moves_root_archives_to_mod_dir() {
        let outcome = install_resolved(&["MyPlugin/my.dll", "my.archive"], "Whatever").await;

        assert_eq!(outcome.layout, Some(Layout::Red4Ext(Red4ExtLayout::Modnamed)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("MyPlugin/my.dll", "red4ext/plugins/MyPlugin/my.dll"),
                mv("my.archive", "archive/pc/mod/my.archive"),
            ]
        );
    }

    #[tokio::test]
    async fn test_toplevel_plugin_moves_root_archives_to_mod_dir() {
        let outcome = install_resolved(&["my.dll", "my.archive", "archive/pc/mod/x.archive"], "MyPlugin").await;

        assert_eq!(outcome.layout, Some(Layout::Red4Ext(Red4ExtLayout::Toplevel)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("my.dll", "red4ext/plugins/MyPlugin/my.dll"),
                mv("my.archive", "archive/pc/mod/my.archive"),
                copy("archive/pc/mod/x.archive"),
            ]
        );
    }

    #[tokio::test]
    async fn test_root_archive_clashing_with_companion_conflicts() {
        let prompt = RecordingPrompt::new(InstallDecision::Cancel);
        let err = installer_with(prompt.clone())
            .install(["my.dll", "x.archive", "archive/pc/mod/x.archive"], &mod_info("MyPlugin"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::UserCancelled { installer: InstallerType::Red4Ext, .. }));
        assert_eq!(prompt.asked().len(), 1);
        assert_eq!(prompt.asked()[0].title, CONFLICT_TITLE);
    }

    #[tokio::test]
    async fn test_two_named_plugin_dirs_conflict() {
        let prompt = RecordingPrompt::new(InstallDecision::Cancel);
        let err = installer_with(prompt.clone())
            .install(["A/a.dll", "B/b.dll"], &mod_info("Plugins"))
            .await
            .unwrap_err();

        assert!(err.is_user_cancellation());
        assert_eq!(prompt.asked().len(), 1);
    }

    #[tokio::test]
    async fn test_reserved_dll_is_rejected() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let err = installer_with(prompt.clone())
            .install(["red4ext/plugins/Foo/version.dll", "red4ext/plugins/Foo/foo.dll"], &mod_info("Foo"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::InvalidLayout { installer: InstallerType::Red4Ext, .. }));
        assert_eq!(err.files(), ["red4ext/plugins/Foo/version.dll".to_string()]);
        assert!(prompt.asked().is_empty());
        assert_eq!(prompt.notified()[0].files, err.files());
        assert!(prompt.notified()[0].markdown.contains("Supported layouts for Red4Ext mods:"));
    }

    #[tokio::test]
    async fn test_rejection_stands_when_the_notice_fails() {
        let installer = ModLayoutInstaller::new(InstallerConfig::default(), Arc::new(NoticeFailingPrompt));
        let err = installer
            .install(["red4ext/plugins/Foo/version.dll"], &mod_info("Foo"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::InvalidLayout { installer: InstallerType::Red4Ext, .. }));
    }
}

#[cfg(test)]
mod redscript_tests {
    use super::*;

    #[tokio::test]
    async fn test_canonical_redscript_is_identity() {
        let outcome = install_resolved(&["r6/scripts/Foo/a.reds", "r6/scripts/Foo/lib/b.reds"], "Foo").await;

        assert_eq!(outcome.layout, Some(Layout::Redscript(RedscriptLayout::Canon)));
        assert_eq!(
            outcome.instructions,
            vec![copy("r6/scripts/Foo/a.reds"), copy("r6/scripts/Foo/lib/b.reds")]
        );
    }

    #[tokio::test]
    async fn test_basedir_redscript_moves_into_mod_named_dir() {
        let outcome = install_resolved(&["r6/scripts/a.reds"], "Foo").await;

        assert_eq!(outcome.layout, Some(Layout::Redscript(RedscriptLayout::Basedir)));
        assert_eq!(outcome.instructions, vec![mv("r6/scripts/a.reds", "r6/scripts/Foo/a.reds")]);
    }

    #[tokio::test]
    async fn test_toplevel_redscript_moves_into_mod_named_dir() {
        let outcome = install_resolved(&["a.reds", "archive/pc/mod/a.archive"], "Foo").await;

        assert_eq!(outcome.layout, Some(Layout::Redscript(RedscriptLayout::Toplevel)));
        assert_eq!(
            outcome.instructions,
            vec![mv("a.reds", "r6/scripts/Foo/a.reds"), copy("archive/pc/mod/a.archive")]
        );
    }

    #[tokio::test]
    async fn test_toplevel_redscript_takes_every_other_file_along() {
        let outcome = install_resolved(&["a.reds", "docs/readme.md"], "Foo").await;

        assert_eq!(outcome.layout, Some(Layout::Redscript(RedscriptLayout::Toplevel)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("a.reds", "r6/scripts/Foo/a.reds"),
                mv("docs/readme.md", "r6/scripts/Foo/docs/readme.md"),
            ]
        );
    }

    #[tokio::test]
    async fn test_basedir_redscript_with_stray_file_needs_a_decision() {
        let prompt = RecordingPrompt::new(InstallDecision::Cancel);
        let err = installer_with(prompt.clone())
            .install(["r6/scripts/a.reds", "readme.txt"], &mod_info("Foo"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::UserCancelled { installer: InstallerType::Redscript, .. }));
        assert_eq!(prompt.asked().len(), 1);
        assert_eq!(prompt.asked()[0].title, CONFLICT_TITLE);
    }
}

#[cfg(test)]
mod archive_tests {
    use super::*;

    #[tokio::test]
    async fn test_canonical_archives_are_identity() {
        let outcome = install_resolved(&["archive/pc/mod/a.archive", "archive/pc/mod/a.xl"], "A").await;

        assert_eq!(outcome.installer, InstallerType::ArchiveOnly);
        assert_eq!(outcome.layout, Some(Layout::Archive(ArchiveLayout::Canon)));
        assert_eq!(
            outcome.instructions,
            vec![copy("archive/pc/mod/a.archive"), copy("archive/pc/mod/a.xl")]
        );
    }

    #[tokio::test]
    async fn test_heritage_archives_move_to_mod_dir() {
        let outcome = install_resolved(&["archive/pc/patch/a.archive"], "A").await;

        assert_eq!(outcome.layout, Some(Layout::Archive(ArchiveLayout::Heritage)));
        assert_eq!(
            outcome.instructions,
            vec![mv("archive/pc/patch/a.archive", "archive/pc/mod/a.archive")]
        );
    }

    #[tokio::test]
    async fn test_several_toplevel_archives_install_with_a_notice() {
        let prompt = RecordingPrompt::new(InstallDecision::Cancel);
        let outcome = installer_with(prompt.clone())
            .install(["a.archive", "b.archive"], &mod_info("A"))
            .await
            .unwrap();

        assert_eq!(outcome.layout, Some(Layout::Archive(ArchiveLayout::Toplevel)));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("a.archive", "archive/pc/mod/a.archive"),
                mv("b.archive", "archive/pc/mod/b.archive"),
            ]
        );
        assert_eq!(prompt.notified().len(), 1);
        assert_eq!(prompt.notified()[0].title, ADJUSTMENT_TITLE);
    }

    #[tokio::test]
    async fn test_single_toplevel_archive_installs_quietly() {
        let prompt = RecordingPrompt::new(InstallDecision::Cancel);
        let outcome = installer_with(prompt.clone())
            .install(["a.archive"], &mod_info("A"))
            .await
            .unwrap();

        assert_eq!(outcome.layout, Some(Layout::Archive(ArchiveLayout::Toplevel)));
        assert_eq!(outcome.instructions, vec![mv("a.archive", "archive/pc/mod/a.archive")]);
        assert!(prompt.notified().is_empty());
    }

    #[tokio::test]
    async fn test_failed_notice_keeps_the_install() {
        let installer = ModLayoutInstaller::new(InstallerConfig::default(), Arc::new(NoticeFailingPrompt));
        let outcome = installer
            .install(["a.archive", "b.archive"], &mod_info("A"))
            .await
            .unwrap();

        assert_eq!(outcome.layout, Some(Layout::Archive(ArchiveLayout::Toplevel)));
        assert_eq!(outcome.resolution, Resolution::Resolved);
        assert_eq!(outcome.instructions.len(), 2);
    }

    #[tokio::test]
    async fn test_nested_archives_need_a_decision() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let outcome = installer_with(prompt.clone())
            .install(["variants/red/a.archive", "variants/blue/a.archive"], &mod_info("A"))
            .await
            .unwrap();

        assert_eq!(outcome.installer, InstallerType::ArchiveOnly);
        assert_eq!(outcome.resolution, Resolution::ProceededOnConflict);
        assert_eq!(prompt.asked().len(), 1);
    }
}

#[cfg(test)]
mod multi_type_tests {
    use super::*;

    #[tokio::test]
    async fn test_canonical_families_install_together() {
        let init = format!("{CET_BASE}/Foo/init.lua");
        let outcome = install_resolved(&[init.as_str(), "r6/scripts/Foo/a.reds", "archive/pc/mod/foo.archive"], "Foo").await;

        assert_eq!(outcome.installer, InstallerType::MultiType);
        assert_eq!(
            outcome.instructions,
            vec![copy(&init), copy("r6/scripts/Foo/a.reds"), copy("archive/pc/mod/foo.archive")]
        );
    }

    #[tokio::test]
    async fn test_heritage_archives_move_alongside_canonical_families() {
        let init = format!("{CET_BASE}/Foo/init.lua");
        let outcome = install_resolved(
            &[init.as_str(), "r6/scripts/Foo/a.reds", "archive/pc/patch/foo.archive"],
            "Foo",
        )
        .await;

        assert_eq!(outcome.installer, InstallerType::MultiType);
        assert_eq!(outcome.layout, Some(Layout::MultiType));
        assert_eq!(
            outcome.instructions,
            vec![
                mv("archive/pc/patch/foo.archive", "archive/pc/mod/foo.archive"),
                copy(&init),
                copy("r6/scripts/Foo/a.reds"),
            ]
        );
    }

    #[tokio::test]
    async fn test_non_canonical_family_is_a_conflict() {
        let init = format!("{CET_BASE}/Foo/init.lua");
        let prompt = RecordingPrompt::new(InstallDecision::Cancel);
        let err = installer_with(prompt.clone())
            .install([init.as_str(), "r6/scripts/a.reds"], &mod_info("Foo"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::UserCancelled { installer: InstallerType::MultiType, .. }));
        assert_eq!(prompt.asked().len(), 1);
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[tokio::test]
    async fn test_unrecognized_mod_reaches_fallback() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let installer = installer_with(prompt.clone());

        assert_eq!(installer.test_supported(["readme.txt", "docs/"]).unwrap(), None);

        let outcome = installer
            .install(["readme.txt", "docs/"], &mod_info("Docs"))
            .await
            .unwrap();

        assert_eq!(outcome.installer, InstallerType::Fallback);
        assert_eq!(outcome.resolution, Resolution::ProceededOnFallback);
        assert_eq!(outcome.instructions, vec![copy("readme.txt"), mkdir("docs")]);
        assert_eq!(prompt.asked()[0].title, FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn test_fallback_cancel() {
        let err = installer_with(RecordingPrompt::new(InstallDecision::Cancel))
            .install(["readme.txt"], &mod_info("Docs"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::UserCancelled { installer: InstallerType::Fallback, .. }));
        assert_eq!(err.files(), ["readme.txt".to_string()]);
        assert_eq!(err.category(), "user_cancelled");
    }

    #[tokio::test]
    async fn test_invalid_input_never_prompts() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let err = installer_with(prompt.clone())
            .install(["ok.archive", "../escape.archive"], &mod_info("Bad"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::InvalidInput { .. }));
        assert_eq!(err.files(), ["ok.archive".to_string(), "../escape.archive".to_string()]);
        assert!(prompt.asked().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_path_is_invalid_input() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let deep = format!("{}x.archive", "a/".repeat(32_000));
        let err = installer_with(prompt.clone())
            .install([deep.as_str()], &mod_info("Deep"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::InvalidInput { .. }));
        assert_eq!(err.files(), [deep]);
        assert!(prompt.asked().is_empty());
    }

    #[tokio::test]
    async fn test_deepest_allowed_path_is_planned() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let deep = format!("{}x.archive", "a/".repeat(MAX_PATH_SEGMENTS - 1));
        let outcome = installer_with(prompt.clone())
            .install([deep.as_str()], &mod_info("Deep"))
            .await
            .unwrap();

        assert_eq!(outcome.installer, InstallerType::ArchiveOnly);
        assert_eq!(outcome.resolution, Resolution::ProceededOnConflict);
        assert_eq!(outcome.instructions, vec![copy(&deep)]);
    }

    #[tokio::test]
    async fn test_prompt_failure_is_reported() {
        let installer = ModLayoutInstaller::new(InstallerConfig::default(), Arc::new(BrokenPrompt));
        let err = installer.install(["readme.txt"], &mod_info("Docs")).await.unwrap_err();

        assert!(matches!(err, InstallError::Prompt { installer: InstallerType::Fallback, .. }));
        assert_eq!(err.files(), ["readme.txt".to_string()]);
        assert!(!err.is_defect());
    }

    #[tokio::test]
    async fn test_planning_is_deterministic() {
        let files = ["Foo/info.json", "Foo/a.reds", "Bar/info.json"];
        let first = install_resolved(&files, "X").await;
        let second = install_resolved(&files, "X").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_identity_placement_copies_to_same_path() {
        let outcome = install_resolved(&["mods/Foo/info.json", "mods/Foo/a/b/c.reds"], "Foo").await;
        for instruction in &outcome.instructions {
            assert!(matches!(instruction, Instruction::Copy(t) if t.is_identity()));
        }
    }

    #[tokio::test]
    async fn test_concurrent_attempts_are_independent() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let installer = installer_with(prompt.clone());
        let redmod = mod_info("Foo");
        let fallback = mod_info("Docs");

        let (a, b) = tokio::join!(
            installer.install(["Foo/info.json"], &redmod),
            installer.install(["readme.txt"], &fallback),
        );

        assert_eq!(a.unwrap().installer, InstallerType::Redmod);
        assert_eq!(b.unwrap().installer, InstallerType::Fallback);
        assert_eq!(prompt.asked().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_registry_replaces_the_pipeline() {
        let prompt = RecordingPrompt::new(InstallDecision::Proceed);
        let installer = installer_with(prompt.clone())
            .with_registry(InstallerRegistry::new().register(ArchiveOnlyInstaller));

        assert_eq!(installer.registry().installer_types(), vec![InstallerType::ArchiveOnly]);
        assert_eq!(installer.test_supported(["Foo/info.json", "Foo/a.reds"]).unwrap(), None);

        let outcome = installer
            .install(["Foo/info.json", "Foo/a.reds"], &mod_info("Foo"))
            .await
            .unwrap();
        assert_eq!(outcome.installer, InstallerType::Fallback);
        assert_eq!(prompt.asked()[0].title, FALLBACK_TITLE);
    }

    #[test]
    fn test_pipeline_order() {
        let registry = InstallerRegistry::default();
        assert_eq!(
            registry.installer_types(),
            vec![
                InstallerType::CoreCet,
                InstallerType::CoreRedscript,
                InstallerType::CoreRed4Ext,
                InstallerType::CoreCyberScript,
                InstallerType::CoreWolvenKit,
                InstallerType::MultiType,
                InstallerType::Redmod,
                InstallerType::Red4Ext,
                InstallerType::Redscript,
                InstallerType::Cet,
                InstallerType::ArchiveOnly,
            ]
        );
    }
}
