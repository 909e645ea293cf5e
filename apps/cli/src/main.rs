//! `cp2077-install`: plan a Cyberpunk 2077 mod installation from a file listing
//!
//! Reads one archive path per line (from `--files` or stdin), runs the layout
//! installer and prints the planned instructions.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{ArgAction, Parser};
use cp2077_installer::install::InstallChoices;
use cp2077_installer::{
    FixedDecisionPrompt, InstallDecision, InstallError, InstallOutcome, InstallPrompt,
    InstallerConfig, ModInfo, ModLayoutInstaller,
};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn, Level};

const CONFIG_ENV_VAR: &str = "CP2077_INSTALLER_CONFIG";

#[derive(Debug, Parser)]
#[command(name = "cp2077-install", version, about = "Plan the installation of a Cyberpunk 2077 mod")]
struct Args {
    /// File with one archive path per line (reads stdin when omitted)
    #[arg(long)]
    files: Option<PathBuf>,

    /// Display name of the mod, used for layouts that don't carry one
    #[arg(long)]
    mod_name: Option<String>,

    /// Installer configuration as JSON (falls back to $CP2077_INSTALLER_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Stage unresolved mods without asking
    #[arg(long, conflicts_with = "no")]
    yes: bool,

    /// Cancel unresolved mods without asking
    #[arg(long)]
    no: bool,

    /// More logging (-v for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else if self.verbose > 0 {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    fn fixed_decision(&self) -> Option<InstallDecision> {
        if self.yes {
            Some(InstallDecision::Proceed)
        } else if self.no {
            Some(InstallDecision::Cancel)
        } else {
            None
        }
    }
}

/// Asks on the terminal, one numbered choice per line
struct TerminalPrompt;

impl TerminalPrompt {
    async fn show(title: &str, markdown: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("\n== {title} ==\n\n{markdown}\n\n").as_bytes())
            .await?;
        stdout.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl InstallPrompt for TerminalPrompt {
    async fn ask_proceed_or_cancel(
        &self,
        title: &str,
        markdown: &str,
        _files: &[String],
    ) -> Result<InstallDecision> {
        Self::show(title, markdown).await?;

        let choices = [InstallChoices::Proceed, InstallChoices::Cancel];
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            for (index, choice) in choices.iter().enumerate() {
                stdout
                    .write_all(format!("  {}) {}\n", index + 1, choice).as_bytes())
                    .await?;
            }
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await.context("Failed to read answer")? else {
                debug!("stdin closed before an answer, cancelling");
                return Ok(InstallDecision::Cancel);
            };

            match line.trim() {
                "1" | "y" | "yes" => return Ok(InstallChoices::Proceed.decision()),
                "2" | "n" | "no" => return Ok(InstallChoices::Cancel.decision()),
                other => {
                    stdout
                        .write_all(format!("'{other}' isn't one of the choices\n").as_bytes())
                        .await?;
                }
            }
        }
    }

    async fn notify(&self, title: &str, markdown: &str, _files: &[String]) -> Result<()> {
        Self::show(title, markdown).await
    }
}

async fn read_listing(source: Option<&PathBuf>) -> Result<Vec<String>> {
    let content = match source {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file list {}", path.display()))?,
        None => {
            let mut content = String::new();
            tokio::io::stdin()
                .read_to_string(&mut content)
                .await
                .context("Failed to read file list from stdin")?;
            content
        }
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn load_config(args: &Args) -> Result<InstallerConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    match path {
        Some(path) => InstallerConfig::from_json_file(&path),
        None => Ok(InstallerConfig::default()),
    }
}

fn choose_prompt(args: &Args) -> Arc<dyn InstallPrompt> {
    match args.fixed_decision() {
        Some(decision) => Arc::new(FixedDecisionPrompt::new(decision)),
        // The listing already consumed stdin, nobody is left to answer
        None if args.files.is_none() => {
            warn!("File list read from stdin, unresolved mods will be cancelled (use --yes to stage them)");
            Arc::new(FixedDecisionPrompt::cancel())
        }
        None => Arc::new(TerminalPrompt),
    }
}

fn mod_name(args: &Args) -> String {
    args.mod_name
        .clone()
        .or_else(|| {
            args.files
                .as_ref()
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "UnnamedMod".to_string())
}

fn outcome_json(outcome: &InstallOutcome) -> serde_json::Value {
    serde_json::json!({
        "installer": outcome.installer.to_string(),
        "layout": outcome.layout.map(|l| l.to_string()),
        "resolution": outcome.resolution.to_string(),
        "verified": outcome.resolution.is_verified(),
        "instructions": outcome.instructions,
    })
}

fn print_outcome(outcome: &InstallOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(outcome))?);
        return Ok(());
    }

    println!("Installer: {}", outcome.installer);
    if let Some(layout) = outcome.layout {
        println!("Layout: {layout}");
    }
    println!("Resolution: {}", outcome.resolution);
    if !outcome.resolution.is_verified() {
        println!("Staged as-is, check the files before enabling the mod");
    }
    for instruction in &outcome.instructions {
        println!("  {instruction}");
    }
    Ok(())
}

fn report_failure(err: &InstallError, json: bool) {
    if json {
        let value = serde_json::json!({
            "error": err.to_string(),
            "category": err.category(),
            "files": err.files(),
        });
        println!("{value}");
        return;
    }

    eprintln!("Installation failed: {err}");
    for file in err.files() {
        eprintln!("  {file}");
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let config = load_config(&args)?;
    let mod_info = ModInfo::new(&mod_name(&args))?;
    let files = read_listing(args.files.as_ref()).await?;
    debug!(file_count = files.len(), mod_name = %mod_info, "Read file list");

    let installer = ModLayoutInstaller::new(config, choose_prompt(&args));

    match installer.install(&files, &mod_info).await {
        Ok(outcome) => {
            print_outcome(&outcome, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_failure(&err, args.json);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_flags() {
        let args = Args::parse_from(["cp2077-install", "--yes"]);
        assert_eq!(args.fixed_decision(), Some(InstallDecision::Proceed));

        let args = Args::parse_from(["cp2077-install", "--no"]);
        assert_eq!(args.fixed_decision(), Some(InstallDecision::Cancel));

        assert!(Args::try_parse_from(["cp2077-install", "--yes", "--no"]).is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(Args::parse_from(["cp2077-install"]).log_level(), Level::INFO);
        assert_eq!(Args::parse_from(["cp2077-install", "-v"]).log_level(), Level::DEBUG);
        assert_eq!(Args::parse_from(["cp2077-install", "-q"]).log_level(), Level::ERROR);
    }

    #[test]
    fn test_mod_name_defaults_to_listing_stem() {
        let args = Args::parse_from(["cp2077-install", "--files", "lists/CoolMod.txt"]);
        assert_eq!(mod_name(&args), "CoolMod");

        let args = Args::parse_from(["cp2077-install", "--mod-name", "Other"]);
        assert_eq!(mod_name(&args), "Other");
    }

    #[tokio::test]
    async fn test_outcome_json_marks_unverified_installs() {
        let installer = ModLayoutInstaller::new(
            InstallerConfig::default(),
            Arc::new(FixedDecisionPrompt::proceed()),
        );
        let mod_info = ModInfo::new("Mixed").unwrap();

        let resolved = installer.install(["archive/pc/mod/a.archive"], &mod_info).await.unwrap();
        let value = outcome_json(&resolved);
        assert_eq!(value["verified"], true);
        assert_eq!(value["installer"], "ArchiveOnly");

        let staged = installer.install(["readme.txt"], &mod_info).await.unwrap();
        let value = outcome_json(&staged);
        assert_eq!(value["verified"], false);
        assert_eq!(value["resolution"], "proceeded on fallback");
        assert_eq!(value["instructions"][0]["type"], "copy");
    }

    #[tokio::test]
    async fn test_read_listing_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.txt");
        tokio::fs::write(&path, "Foo/info.json\n\n  Foo/a.reds  \r\n").await.unwrap();

        let files = read_listing(Some(&path)).await.unwrap();
        assert_eq!(files, vec!["Foo/info.json", "Foo/a.reds"]);
    }
}
