//! Grid occupancy summary.
//!
//! Counts what a composed grid shows, for headers such as "28 of 36
//! periods used, 4 locked".
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | In range | Active periods on the grid |
//! | Free | Active periods with nothing scheduled |
//! | Occupied | Active periods with regular entries or a span half |
//! | Fixed / Special | Periods held by a lock of that layer |
//! | Occupancy rate | (in range - free) / in range |

use serde::{Deserialize, Serialize};

use super::{Cell, Grid, OverlayLevel};

/// Cell counts of one grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    /// Active periods.
    pub in_range_cells: usize,
    /// Periods that are not active on their day.
    pub out_of_range_cells: usize,
    /// Active periods with nothing scheduled.
    pub free_cells: usize,
    /// Periods with regular entries, span heads and span continuations.
    pub occupied_cells: usize,
    /// Periods held by a fixed lock (continuations included).
    pub fixed_cells: usize,
    /// Periods held by a special allotment (continuations included).
    pub special_cells: usize,
    /// Locked periods that continue a multi-slot block.
    pub continuation_cells: usize,
    /// Two-slot lab spans.
    pub lab_spans: usize,
    /// Elective groups across all cells.
    pub elective_groups: usize,
    /// Fraction of active periods that are not free (0.0..=1.0).
    pub occupancy_rate: f64,
}

impl GridStats {
    /// Computes the summary of a grid.
    pub fn calculate<E>(grid: &Grid<E>) -> Self {
        let mut s = Self::default();
        for (_, cell) in grid.cells() {
            match cell {
                Cell::OutOfRange => s.out_of_range_cells += 1,
                Cell::Free => s.free_cells += 1,
                Cell::Entries(entries) => {
                    s.occupied_cells += 1;
                    s.elective_groups += entries.groups.len();
                }
                Cell::Span(_) => {
                    s.occupied_cells += 1;
                    s.lab_spans += 1;
                }
                Cell::SpanContinuation { .. } => s.occupied_cells += 1,
                Cell::Locked(locked) => {
                    match locked.level {
                        OverlayLevel::Special => s.special_cells += 1,
                        OverlayLevel::Fixed => s.fixed_cells += 1,
                        OverlayLevel::None => {}
                    }
                    if locked.is_continuation {
                        s.continuation_cells += 1;
                    }
                }
            }
        }
        s.in_range_cells = grid.cells().count() - s.out_of_range_cells;
        s.occupancy_rate = if s.in_range_cells == 0 {
            0.0
        } else {
            (s.in_range_cells - s.free_cells) as f64 / s.in_range_cells as f64
        };
        s
    }

    /// Periods held by any lock.
    pub fn locked_cells(&self) -> usize {
        self.fixed_cells + self.special_cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{serialize_grid, CellEntries, LockedCell};
    use crate::models::{Coord, LockedEntry, ScheduleEntry, SlotSet, TimeSlot};
    use std::collections::BTreeMap;

    #[test]
    fn test_counts() {
        let slots = SlotSet::from_slots(&[
            TimeSlot::new(0, 0, "", ""),
            TimeSlot::new(0, 1, "", ""),
            TimeSlot::new(0, 2, "", ""),
            TimeSlot::new(1, 0, "", ""),
        ]);
        let mut resolved: BTreeMap<Coord, Cell<ScheduleEntry>> = BTreeMap::new();
        resolved.insert(
            Coord::new(0, 0),
            Cell::Entries(CellEntries {
                groups: Vec::new(),
                standalone: vec![ScheduleEntry::new(0, 0)],
            }),
        );
        resolved.insert(
            Coord::new(0, 1),
            Cell::Locked(LockedCell {
                level: OverlayLevel::Fixed,
                lock: LockedEntry::new("F1", ScheduleEntry::new(0, 0)),
                lock_ids: vec!["F1".into()],
                section_codes: Vec::new(),
                head_slot: 0,
                is_continuation: true,
                shadowed: Vec::new(),
            }),
        );
        let grid = serialize_grid(&slots, resolved);
        let s = GridStats::calculate(&grid);

        // Slot axis 0..=2 over two days = 6 coordinates, Tuesday lacks 1 and 2.
        assert_eq!(s.out_of_range_cells, 2);
        assert_eq!(s.in_range_cells, 4);
        assert_eq!(s.free_cells, 2);
        assert_eq!(s.occupied_cells, 1);
        assert_eq!(s.fixed_cells, 1);
        assert_eq!(s.continuation_cells, 1);
        assert_eq!(s.locked_cells(), 1);
        assert!((s.occupancy_rate - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_empty_grid() {
        let grid: Grid<ScheduleEntry> = serialize_grid(&SlotSet::new(), BTreeMap::new());
        let s = GridStats::calculate(&grid);
        assert_eq!(s.in_range_cells, 0);
        assert!((s.occupancy_rate - 0.0).abs() < 1e-10);
    }
}
