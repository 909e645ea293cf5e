//! Texts shown to the user when the installer needs a decision
//!
//! The prompt collaborator renders these however it likes; the installer
//! only builds the title, the markdown explanation and the file list.

use crate::install::error::{InstallError, Result};
use crate::install::layouts::{InstallerType, LayoutCatalog};

pub const CONFLICT_TITLE: &str = "Can't Figure Out How To Install This Mod!";
pub const FALLBACK_TITLE: &str = "You Have Reached The Fallback Installer!";
pub const ADJUSTMENT_TITLE: &str = "Mod Installed But May Need Manual Adjustment!";

const INSTRUCTIONS_TO_FIX_IN_STAGING: &str = "
    If you want to proceed, I'll install *EVERYTHING* in the mod
    into the Staging folder. You will need to check and possibly
    fix the mod manually before you enable it. (The Staging folder
    is where all installed mods live - they only go into the game
    mod folder when you `enable` the mod.)
    ";

const WOLVENKIT_DOWNLOAD_PAGE: &str = "https://www.nexusmods.com/cyberpunk2077/mods/2201?tab=files";

const INSTRUCTIONS_TO_REPORT_ISSUE: &str = "
    Please let us know if this looks like a valid mod, so that support
    for its layout can be added.
    ";

/// Strip per-line indentation from an indented literal and squash runs of
/// blank lines into a single one. A leading `|` protects whitespace that
/// should be kept.
pub fn heredoc(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            match trimmed.strip_prefix('|') {
                Some(rest) => format!(" {rest}"),
                None => trimmed.to_string(),
            }
        })
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in lines {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(&line);
        out.push('\n');
    }

    out.trim_matches('\n').to_string()
}

fn fenced(files: &[String]) -> String {
    format!("```\n{}\n```", files.join("\n"))
}

/// Explanation for a family that recognized the mod but couldn't settle on
/// a layout. Fails when the catalog has no description for the family.
pub fn conflict_explanation(
    catalog: &LayoutCatalog,
    installer: InstallerType,
    files: &[String],
) -> Result<String> {
    let supported = catalog
        .description(installer)
        .ok_or_else(|| InstallError::MissingLayoutDescription {
            installer,
            files: files.to_vec(),
        })?;

    let body = heredoc(&format!(
        "
        You need to decide if you want to proceed or not. I can't
        figure out the intended structure of this mod.

        {INSTRUCTIONS_TO_FIX_IN_STAGING}

        These are the supported layouts for {installer} mods:
        "
    ));

    Ok(format!(
        "{body}\n\n{supported}\n\n{}\n\nThese are the files I found in the mod:\n\n{}",
        heredoc(INSTRUCTIONS_TO_REPORT_ISSUE),
        fenced(files),
    ))
}

/// Explanation for a mod no installer recognized
pub fn fallback_explanation(files: &[String]) -> String {
    let body = heredoc(&format!(
        "
        I wasn't able to figure out what kind of mod this is, so you have
        reached the fallback installer.

        {INSTRUCTIONS_TO_FIX_IN_STAGING}

        {INSTRUCTIONS_TO_REPORT_ISSUE}
        "
    ));

    format!("{body}\n\nThese are the files in the mod:\n\n{}", fenced(files))
}

/// Explanation for a family that rejects the mod outright. Lists the
/// family's supported layouts when the catalog has them.
pub fn rejection_explanation(
    catalog: &LayoutCatalog,
    installer: InstallerType,
    message: &str,
    files: &[String],
) -> String {
    if installer == InstallerType::CoreWolvenKit {
        return wolvenkit_desktop_explanation();
    }

    let body = heredoc(&format!(
        "
        Installation cancelled!

        {message} This {installer} mod can't be installed as it is,
        you'll have to fix it before installing it.
        "
    ));

    let supported = match catalog.description(installer) {
        Some(description) if !description.is_empty() => {
            format!("\n\nSupported layouts for {installer} mods:\n\n{description}")
        }
        _ => String::new(),
    };

    format!(
        "{body}{supported}\n\nI cancelled the installation because of these files:\n\n{}",
        fenced(files)
    )
}

fn wolvenkit_desktop_explanation() -> String {
    heredoc(&format!(
        "
        I think you accidentally grabbed the wrong file. I can install WolvenKit
        Console, which is an optional file on the
        [Nexus download page]({WOLVENKIT_DOWNLOAD_PAGE}).

        The file you tried to install is WolvenKit Desktop, which can't be
        installed as a mod.
        "
    ))
}

/// Notice for archive-only mods with more than one top-level archive
pub fn archive_adjustment_explanation(files: &[String]) -> String {
    format!(
        "I installed the mod, but it may need to be manually adjusted because:\n\n{}\n\n{}\n\nThese are the files I installed:\n\n{}",
        heredoc(
            "
            - There's more than one top-level `*.archive`

            This might be intentional, it's perfectly OK to have multiple archives if
            they do different things. It could also be an oversight, or you might be
            expected to pick only some of these.
            ",
        ),
        heredoc(
            "
            Make sure to read any instructions the mod might have, and then if necessary
            adjust the installation manually.
            "
        ),
        fenced(files),
    )
}
