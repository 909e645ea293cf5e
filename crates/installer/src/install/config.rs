//! Configuration types for the layout installer

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Configuration for layout detection and the conflict policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Register the REDmod installer in the pipeline
    pub redmod_enabled: bool,
    /// DLL basenames a Red4Ext plugin may never ship (compared case-insensitively)
    pub reserved_dll_names: Vec<String>,
    /// Ask the user on conflicts; when false the answer is always Cancel
    pub prompt_on_conflict: bool,
}

impl InstallerConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read installer config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse installer config {}", path.display()))
    }

    /// Check a DLL file name against the reserved list
    pub fn is_reserved_dll(&self, file_name: &str) -> bool {
        self.reserved_dll_names
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(file_name))
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            redmod_enabled: true,
            reserved_dll_names: ["d3d11.dll", "dxgi.dll", "powrprof.dll", "winmm.dll", "version.dll", "RED4ext.dll"]
                .into_iter()
                .map(String::from)
                .collect(),
            prompt_on_conflict: true,
        }
    }
}
