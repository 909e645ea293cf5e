//! Example showing how a host plans mod installations
//!
//! Runs a few typical archive listings through the installer and prints what
//! would be staged for each one.
//!
//! Run this example with:
//! ```
//! cargo run --example plan_install
//! ```

use std::sync::Arc;

use cp2077_installer::{
    FixedDecisionPrompt, InstallerConfig, ModInfo, ModLayoutInstaller,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Unresolvable mods get cancelled instead of prompting
    let installer = ModLayoutInstaller::new(
        InstallerConfig::default(),
        Arc::new(FixedDecisionPrompt::cancel()),
    );

    let listings: [(&str, &[&str]); 4] = [
        ("CoolScript", &["r6/scripts/CoolScript/main.reds", "archive/pc/mod/cool.archive"]),
        ("LooseScript", &["main.reds", "util/helpers.reds"]),
        ("Ambiguous", &["Foo/init.lua", "Bar/init.lua"]),
        ("ModKit", &["ModKit/info.json", "ModKit/archives/kit.archive"]),
    ];

    for (name, files) in listings {
        println!("== {name} ==");
        let mod_info = ModInfo::new(name)?;

        match installer.install(files.iter().copied(), &mod_info).await {
            Ok(outcome) => {
                let layout = outcome
                    .layout
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "none".to_string());
                println!("{} ({}), {}", outcome.installer, layout, outcome.resolution);
                for instruction in &outcome.instructions {
                    println!("  {instruction}");
                }
            }
            Err(err) => {
                println!("not installed: {err}");
                for file in err.files() {
                    println!("  {file}");
                }
            }
        }
        println!();
    }

    Ok(())
}
