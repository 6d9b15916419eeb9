//! Composition options.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected option values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// A lab block must cover at least one slot.
    #[error("default_lab_block_size must be at least 1, got {0}")]
    ZeroLabBlockSize(u32),
}

/// Tunables for one composition pass.
///
/// Deserializes with every field optional, so a partial JSON object
/// from the host application's settings is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    /// Block length for LAB locks whose subject has no metadata.
    pub default_lab_block_size: u32,
    /// Let locks with `is_active = false` take part in the overlay.
    pub include_inactive_locks: bool,
    /// Merge adjacent matching lab slots into two-slot spans.
    pub merge_lab_spans: bool,
    /// Collapse per-section entries of one session in room/teacher views.
    pub collapse_combined_classes: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            default_lab_block_size: 2,
            include_inactive_locks: false,
            merge_lab_spans: true,
            collapse_combined_classes: true,
        }
    }
}

impl ComposeOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback lab block length.
    pub fn with_default_lab_block_size(mut self, slots: u32) -> Self {
        self.default_lab_block_size = slots;
        self
    }

    /// Includes inactive locks in the overlay.
    pub fn with_inactive_locks(mut self, include: bool) -> Self {
        self.include_inactive_locks = include;
        self
    }

    /// Enables or disables lab span merging.
    pub fn with_lab_spans(mut self, merge: bool) -> Self {
        self.merge_lab_spans = merge;
        self
    }

    /// Enables or disables combined-class collapsing.
    pub fn with_collapsing(mut self, collapse: bool) -> Self {
        self.collapse_combined_classes = collapse;
        self
    }

    /// Checks option values.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.default_lab_block_size == 0 {
            return Err(OptionsError::ZeroLabBlockSize(self.default_lab_block_size));
        }
        Ok(())
    }
}
