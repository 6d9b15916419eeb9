//! Elective block grouping.
//!
//! Several subjects taught in parallel under one named block are shown
//! together under the block's name. Everything else in the cell is
//! standalone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::GridItem;

/// Entries of one elective block at one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectiveGroup<E> {
    /// Elective block id.
    pub block_id: String,
    /// Block display name (falls back to the id).
    pub name: String,
    /// Members in display order.
    pub items: Vec<E>,
}

/// A cell's entries split into elective groups and standalone entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellEntries<E> {
    /// Elective groups ordered by name.
    pub groups: Vec<ElectiveGroup<E>>,
    /// Entries outside any elective block, in display order.
    pub standalone: Vec<E>,
}

impl<E> CellEntries<E> {
    /// Total number of entries in the cell.
    pub fn len(&self) -> usize {
        self.standalone.len() + self.groups.iter().map(|g| g.items.len()).sum::<usize>()
    }

    /// Whether the cell holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits one cell's entries into elective groups and standalone entries.
///
/// An empty block id counts as no block. Groups are ordered by name,
/// case-insensitively, with the exact name and then the block id as
/// tie-breakers; items keep the cell's display order.
pub fn group_electives<E: GridItem>(entries: &[E]) -> CellEntries<E> {
    let mut blocks: BTreeMap<&str, Vec<E>> = BTreeMap::new();
    let mut standalone = Vec::new();

    for e in entries {
        match e.elective_block_id().filter(|id| !id.is_empty()) {
            Some(id) => blocks.entry(id).or_default().push(e.clone()),
            None => standalone.push(e.clone()),
        }
    }

    standalone.sort_by(E::display_cmp);

    let mut groups: Vec<ElectiveGroup<E>> = blocks
        .into_iter()
        .map(|(id, mut items)| {
            items.sort_by(E::display_cmp);
            let name = items
                .iter()
                .find_map(|i| i.elective_block_name().filter(|n| !n.is_empty()))
                .unwrap_or(id)
                .to_string();
            ElectiveGroup {
                block_id: id.to_string(),
                name,
                items,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.block_id.cmp(&b.block_id))
    });

    CellEntries { groups, standalone }
}
