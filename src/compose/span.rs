//! Two-slot lab span merging.
//!
//! Labs are taught in back-to-back periods but the solver emits one
//! entry per period. This pass pairs them up so the grid can render a
//! single cell across both periods.
//!
//! # Algorithm
//! Greedy left-to-right pairing per day over the day's active slots.
//! A pair `(s, s + 1)` becomes a span iff both coordinates hold exactly
//! one entry, both are labs, and both agree on section, subject, teacher
//! and room. A third matching slot starts a fresh scan; spans never
//! chain past two slots.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{EntryIndex, GridItem};
use crate::models::{Coord, SlotSet};

/// Two adjacent lab entries rendered as one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSpan<E> {
    /// Day of the span.
    pub day: u8,
    /// First slot covered.
    pub start_slot: u32,
    /// Second (consumed) slot covered.
    pub end_slot: u32,
    /// Display start: the first entry's start time.
    pub start_time: String,
    /// Display end: the second entry's end time.
    pub end_time: String,
    /// Entry at the first slot.
    pub head: E,
    /// Entry at the second slot.
    pub tail: E,
}

impl<E: GridItem> LabSpan<E> {
    fn pair(head: &E, tail: &E) -> Self {
        let start = head.coord();
        Self {
            day: start.day,
            start_slot: start.slot,
            end_slot: tail.coord().slot,
            start_time: head.start_time().to_string(),
            end_time: tail.end_time().to_string(),
            head: head.clone(),
            tail: tail.clone(),
        }
    }

    /// Coordinate of the first slot.
    pub fn head_coord(&self) -> Coord {
        Coord::new(self.day, self.start_slot)
    }

    /// Coordinate of the consumed second slot.
    pub fn tail_coord(&self) -> Coord {
        Coord::new(self.day, self.end_slot)
    }
}

/// Result of span merging.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanMerge<E> {
    /// Spans keyed by their first coordinate.
    pub spans: BTreeMap<Coord, LabSpan<E>>,
    /// Second coordinates of spans; the serializer must not render
    /// their entries again.
    pub consumed: BTreeSet<Coord>,
}

impl<E> Default for SpanMerge<E> {
    fn default() -> Self {
        Self {
            spans: BTreeMap::new(),
            consumed: BTreeSet::new(),
        }
    }
}

impl<E> SpanMerge<E> {
    /// Whether the coordinate is the second half of a span.
    pub fn is_consumed(&self, coord: Coord) -> bool {
        self.consumed.contains(&coord)
    }

    /// Number of spans formed.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether no span was formed.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Pairs adjacent matching lab entries into two-slot spans.
///
/// Only slots present in `slots` are considered, and the second slot
/// must be the numerically next period (`slot_index + 1`) on that day.
pub fn merge_lab_spans<E: GridItem>(index: &EntryIndex<E>, slots: &SlotSet) -> SpanMerge<E> {
    let mut merge = SpanMerge::default();

    for day in slots.days() {
        let periods: Vec<u32> = slots.slots_on(day).map(|s| s.slot_index).collect();
        let mut i = 0;
        while i + 1 < periods.len() {
            let (first, second) = (periods[i], periods[i + 1]);
            if second == first + 1 {
                let head = Coord::new(day, first);
                let tail = Coord::new(day, second);
                if let Some(span) = try_pair(index, head, tail) {
                    merge.spans.insert(head, span);
                    merge.consumed.insert(tail);
                    i += 2;
                    continue;
                }
            }
            i += 1;
        }
    }

    merge
}

fn try_pair<E: GridItem>(index: &EntryIndex<E>, head: Coord, tail: Coord) -> Option<LabSpan<E>> {
    // More than one entry means parallel electives: which one continues
    // cannot be told locally.
    let [a] = index.get(head) else {
        return None;
    };
    let [b] = index.get(tail) else {
        return None;
    };
    if a.is_lab() && b.is_lab() && a.same_block(b) {
        Some(LabSpan::pair(a, b))
    } else {
        None
    }
}
