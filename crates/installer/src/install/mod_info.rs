//! Identity of the mod being installed

use std::fmt;

use crate::install::error::{InstallError, Result};

/// What the host knows about the mod besides its files.
///
/// The name becomes the install directory for layouts that don't carry a
/// name of their own, so it has to be a single path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModInfo {
    name: String,
}

impl ModInfo {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();

        let reason = if trimmed.is_empty() {
            Some("mod name is empty")
        } else if trimmed.contains(['/', '\\']) {
            Some("mod name must be a single path segment")
        } else if trimmed == "." || trimmed == ".." {
            Some("mod name can't be a relative directory reference")
        } else if trimmed.contains('\0') || trimmed.contains(':') {
            Some("mod name contains a character that isn't allowed in paths")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InstallError::InvalidInput {
                path: name.clone(),
                reason: reason.to_string(),
                files: Vec::new(),
            }),
            None => Ok(Self { name: trimmed.to_string() }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ModInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
