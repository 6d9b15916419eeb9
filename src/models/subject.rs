//! Subject metadata.
//!
//! Only the block length of lab subjects matters to composition: it
//! decides how many slots a locked lab occupies.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::SubjectType;

/// Per-subject metadata supplied alongside entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectMeta {
    /// Subject identifier.
    pub id: String,
    /// Number of contiguous slots one lab session occupies.
    pub lab_block_size_slots: u32,
}

impl SubjectMeta {
    /// Creates subject metadata.
    pub fn new(id: impl Into<String>, lab_block_size_slots: u32) -> Self {
        Self {
            id: id.into(),
            lab_block_size_slots,
        }
    }
}

/// Lookup of lab block sizes by subject id.
#[derive(Debug, Clone, Default)]
pub struct SubjectCatalog {
    block_sizes: HashMap<String, u32>,
    default_lab_block_size: u32,
}

impl SubjectCatalog {
    /// Builds a catalog. Later duplicates of a subject id are ignored.
    ///
    /// `default_lab_block_size` applies to LAB subjects without metadata.
    pub fn new(subjects: &[SubjectMeta], default_lab_block_size: u32) -> Self {
        let mut block_sizes = HashMap::with_capacity(subjects.len());
        for s in subjects {
            block_sizes
                .entry(s.id.clone())
                .or_insert(s.lab_block_size_slots);
        }
        Self {
            block_sizes,
            default_lab_block_size,
        }
    }

    /// Number of slots a class of this subject occupies.
    ///
    /// Theory subjects always occupy one slot. A lab block size of zero
    /// is treated as one.
    pub fn block_size(&self, subject_id: &str, subject_type: SubjectType) -> u32 {
        match subject_type {
            SubjectType::Theory => 1,
            SubjectType::Lab => self
                .block_sizes
                .get(subject_id)
                .copied()
                .unwrap_or(self.default_lab_block_size)
                .max(1),
        }
    }

    /// Whether metadata exists for the subject.
    pub fn contains(&self, subject_id: &str) -> bool {
        self.block_sizes.contains_key(subject_id)
    }
}
