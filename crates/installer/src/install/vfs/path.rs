//! Normalized relative paths inside a mod archive

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::install::error::{InstallError, Result};

/// Longest accepted archive entry, in bytes
pub const MAX_PATH_BYTES: usize = 4096;

/// Deepest accepted archive entry, in segments. Real game paths stay well
/// under twenty.
pub const MAX_PATH_SEGMENTS: usize = 256;

/// A relative path inside the mod archive.
///
/// Separators are stored as `/` whatever the input used. Comparison and
/// hashing ignore ASCII case, matching how the game's filesystem resolves
/// paths, while `Display` keeps the spelling found in the archive.
#[derive(Debug, Clone, Default)]
pub struct ModPath(String);

/// A single normalized entry from the flat input list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntry {
    pub path: ModPath,
    /// Trailing separator in the input: an explicit directory entry
    pub is_directory: bool,
}

impl ModPath {
    /// The tree root (empty path)
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse and normalize a path, rejecting anything that could leave the
    /// install root. A trailing separator is accepted and dropped.
    pub fn new(raw: &str) -> Result<Self> {
        Self::normalize(raw).map(|entry| entry.path)
    }

    /// Normalize a raw archive entry, remembering whether it named a directory
    pub fn normalize(raw: &str) -> Result<NormalizedEntry> {
        let invalid = |reason: &str| InstallError::InvalidInput {
            path: raw.to_string(),
            reason: reason.to_string(),
            files: vec![raw.to_string()],
        };

        if raw.contains('\0') {
            return Err(invalid("path contains a NUL character"));
        }

        if raw.len() > MAX_PATH_BYTES {
            return Err(invalid(&format!("path is longer than {MAX_PATH_BYTES} bytes")));
        }

        let unified = raw.replace('\\', "/");

        if unified.starts_with('/') {
            return Err(invalid("absolute paths are not allowed"));
        }

        let bytes = unified.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            return Err(invalid("drive-qualified paths are not allowed"));
        }

        let is_directory = unified.ends_with('/');
        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(invalid("path escapes the archive root")),
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            return Err(invalid("path is empty"));
        }

        if segments.len() > MAX_PATH_SEGMENTS {
            return Err(invalid(&format!("path is deeper than {MAX_PATH_SEGMENTS} directories")));
        }

        Ok(NormalizedEntry {
            path: Self(segments.join("/")),
            is_directory,
        })
    }

    /// Wrap a path that is already normalized, such as a layout constant
    pub(crate) fn from_normalized(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, or the empty string for the root
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn parent(&self) -> ModPath {
        match self.0.rfind('/') {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        }
    }

    /// Append a relative suffix (already normalized) to this path
    pub fn join(&self, suffix: &str) -> ModPath {
        let suffix = suffix.trim_matches('/');
        match (self.is_root(), suffix.is_empty()) {
            (_, true) => self.clone(),
            (true, false) => Self(suffix.to_string()),
            (false, false) => Self(format!("{}/{}", self.0, suffix)),
        }
    }

    /// True when `dir` is a strict ancestor directory of this path
    pub fn starts_with_dir(&self, dir: &str) -> bool {
        self.strip_dir_prefix(dir).is_some()
    }

    /// The remainder of this path below `dir`, if `dir` is a strict ancestor
    pub fn strip_dir_prefix(&self, dir: &str) -> Option<&str> {
        let dir = dir.trim_matches('/');
        if dir.is_empty() {
            return (!self.is_root()).then_some(self.0.as_str());
        }
        let head = self.0.get(..dir.len())?;
        if !head.eq_ignore_ascii_case(dir) {
            return None;
        }
        self.0[dir.len()..].strip_prefix('/')
    }

    /// Case-insensitive extension check, `ext` given without the dot
    pub fn extension_is(&self, ext: &str) -> bool {
        match self.file_name().rsplit_once('.') {
            Some((stem, found)) => !stem.is_empty() && found.eq_ignore_ascii_case(ext),
            None => false,
        }
    }

    /// Lower-cased form used for lookups
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl PartialEq for ModPath {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for ModPath {}

impl Hash for ModPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for ModPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ModPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
