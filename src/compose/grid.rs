//! Render-ready grid and its serializer.
//!
//! The grid is the only thing the presentation layer consumes. It is
//! fully ordered (days ascending, slot indices ascending) and every
//! coordinate on the slot axis carries an explicit cell, so the
//! presentation layer never has to guess between "free" and "not a
//! period on this day".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CellEntries, LabSpan, OverlayLevel};
use crate::models::{Coord, LockedEntry, SlotSet, TimeSlot};

/// A lock holding a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedCell<E> {
    /// `SPECIAL` or `FIXED`.
    pub level: OverlayLevel,
    /// The lock (for continuation cells, the same lock as the head).
    /// For a combined session folded from several locks, the first in
    /// display order.
    pub lock: LockedEntry,
    /// Ids of every lock shown by this cell, `lock` first.
    pub lock_ids: Vec<String>,
    /// Section codes of those locks, ascending, no duplicates.
    pub section_codes: Vec<String>,
    /// First slot of the lock's block on this day.
    pub head_slot: u32,
    /// Whether this cell continues a multi-slot block.
    pub is_continuation: bool,
    /// Regular entries the lock hides, in display order.
    pub shadowed: Vec<E>,
}

/// Resolved content of one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell<E> {
    /// Not an active period on this day.
    OutOfRange,
    /// Active period with nothing scheduled.
    Free,
    /// Regular entries, grouped by elective block.
    Entries(CellEntries<E>),
    /// First slot of a two-slot lab span.
    Span(LabSpan<E>),
    /// Second slot of a lab span; render nothing, the head covers it.
    SpanContinuation {
        /// Slot index of the span's head.
        head_slot: u32,
    },
    /// Held by a fixed or special lock.
    Locked(LockedCell<E>),
}

impl<E> Cell<E> {
    /// Whether the coordinate is outside the active slots.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Cell::OutOfRange)
    }

    /// Whether the coordinate is an empty active period.
    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }

    /// Overlay level of the cell (`NONE` unless locked).
    pub fn level(&self) -> OverlayLevel {
        match self {
            Cell::Locked(l) => l.level,
            _ => OverlayLevel::None,
        }
    }
}

/// One coordinate of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSlot<E> {
    /// Slot index.
    pub slot_index: u32,
    /// Period times on this day (`None` when out of range).
    pub time: Option<TimeSlot>,
    /// Resolved content.
    pub cell: Cell<E>,
}

/// One day row of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDay<E> {
    /// Day of week.
    pub day: u8,
    /// Cells for every index on the slot axis, ascending.
    pub slots: Vec<GridSlot<E>>,
}

/// The composed timetable grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<E> {
    /// Union of slot indices across all days, ascending.
    pub slot_axis: Vec<u32>,
    /// Days with at least one active slot, ascending.
    pub days: Vec<GridDay<E>>,
}

impl<E> Grid<E> {
    /// Cell at a coordinate; `None` if the day or index is not on the grid.
    pub fn cell(&self, coord: Coord) -> Option<&Cell<E>> {
        let day = self.days.iter().find(|d| d.day == coord.day)?;
        day.slots
            .iter()
            .find(|s| s.slot_index == coord.slot)
            .map(|s| &s.cell)
    }

    /// Iterates every `(coord, cell)` in reading order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell<E>)> + '_ {
        self.days.iter().flat_map(|d| {
            d.slots
                .iter()
                .map(move |s| (Coord::new(d.day, s.slot_index), &s.cell))
        })
    }

    /// Every item placed on the grid exactly once: standalone and grouped
    /// entries, both halves of spans, and entries shadowed by locks.
    pub fn placed_items(&self) -> Vec<&E> {
        let mut out = Vec::new();
        for (_, cell) in self.cells() {
            match cell {
                Cell::Entries(entries) => {
                    out.extend(entries.groups.iter().flat_map(|g| g.items.iter()));
                    out.extend(entries.standalone.iter());
                }
                Cell::Span(span) => {
                    out.push(&span.head);
                    out.push(&span.tail);
                }
                Cell::Locked(locked) => out.extend(locked.shadowed.iter()),
                Cell::OutOfRange | Cell::Free | Cell::SpanContinuation { .. } => {}
            }
        }
        out
    }
}

/// Lays resolved cells onto the ordered grid.
///
/// Active coordinates missing from `resolved` become [`Cell::Free`];
/// slot indices a day lacks become [`Cell::OutOfRange`]. Resolved cells
/// at inactive coordinates are ignored.
pub fn serialize_grid<E>(slots: &SlotSet, mut resolved: BTreeMap<Coord, Cell<E>>) -> Grid<E> {
    let slot_axis = slots.slot_axis();
    let days = slots
        .days()
        .map(|day| GridDay {
            day,
            slots: slot_axis
                .iter()
                .map(|&slot_index| {
                    let coord = Coord::new(day, slot_index);
                    match slots.get(coord) {
                        Some(time) => GridSlot {
                            slot_index,
                            time: Some(time.clone()),
                            cell: resolved.remove(&coord).unwrap_or(Cell::Free),
                        },
                        None => GridSlot {
                            slot_index,
                            time: None,
                            cell: Cell::OutOfRange,
                        },
                    }
                })
                .collect(),
        })
        .collect();

    Grid { slot_axis, days }
}
