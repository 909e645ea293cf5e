//! Mod layout detection
//!
//! Each supported family lives in its own module and exposes an installer
//! with an ordered list of detectors, one per layout variant. A detector looks
//! at the file tree and answers with a [`LayoutMatch`]:
//!
//! - [`LayoutMatch::NoMatch`]: the variant's pattern isn't there, or there
//!   are files it can't account for. Not an error; the next detector runs.
//! - [`LayoutMatch::Conflict`]: the pattern is there but can be read more than
//!   one way. Never resolved here; the conflict policy asks the user.
//! - [`LayoutMatch::Matched`]: the instructions that install the variant.
//!
//! [`select_layout`] runs the detectors in order and keeps the first answer
//! that isn't `NoMatch`.

use tracing::debug;

use crate::install::config::InstallerConfig;
use crate::install::directives::Instruction;
use crate::install::error::Result;
use crate::install::mod_info::ModInfo;
use crate::install::vfs::FileTree;

pub mod archive;
pub mod catalog;
pub mod cet;
pub mod core_mods;
pub mod multi_type;
pub mod red4ext;
pub mod redmod;
pub mod redscript;
mod shared;

pub use catalog::{
    ArchiveLayout, CetLayout, CoreLayout, FailurePolicy, InstallerType, Layout, LayoutCatalog,
    LayoutDescriptor, Red4ExtLayout, RedmodLayout, RedscriptLayout, VariantTag,
};

/// Outcome of running one detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutMatch {
    NoMatch,
    Conflict { layout: Layout, reason: String },
    Matched { layout: Layout, instructions: Vec<Instruction> },
}

impl LayoutMatch {
    pub fn conflict(layout: Layout, reason: impl Into<String>) -> Self {
        LayoutMatch::Conflict {
            layout,
            reason: reason.into(),
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, LayoutMatch::NoMatch)
    }

    /// The variant this result is about, if any
    pub fn layout(&self) -> Option<Layout> {
        match self {
            LayoutMatch::NoMatch => None,
            LayoutMatch::Conflict { layout, .. } | LayoutMatch::Matched { layout, .. } => Some(*layout),
        }
    }
}

/// Everything a detector may look at. Shared read-only for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    pub tree: &'a FileTree,
    pub mod_info: &'a ModInfo,
    pub config: &'a InstallerConfig,
    pub catalog: &'a LayoutCatalog,
}

/// A detector for one layout variant
pub type LayoutDetector = fn(&LayoutContext<'_>) -> Result<LayoutMatch>;

/// Run `detectors` in order and return the first result that isn't
/// [`LayoutMatch::NoMatch`]. Errors from synthesis stop the run.
pub fn select_layout(ctx: &LayoutContext<'_>, detectors: &[LayoutDetector]) -> Result<LayoutMatch> {
    for detector in detectors {
        let result = detector(ctx)?;
        match &result {
            LayoutMatch::NoMatch => continue,
            LayoutMatch::Conflict { layout, reason } => {
                debug!(%layout, reason = %reason, "Layout detector reported a conflict");
            }
            LayoutMatch::Matched { layout, instructions } => {
                debug!(%layout, instructions = instructions.len(), "Layout detector matched");
            }
        }
        return Ok(result);
    }

    debug!("No layout detector matched");
    Ok(LayoutMatch::NoMatch)
}
