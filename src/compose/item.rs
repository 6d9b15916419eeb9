//! The seam between the composition pipeline and the things it places.
//!
//! Section views place raw [`ScheduleEntry`] values; room and teacher
//! views place [`CollapsedEntry`](super::CollapsedEntry) values. Both go
//! through the same indexing, span merging and elective grouping, which
//! only need what this trait exposes.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::models::{Coord, ScheduleEntry};

/// Something that occupies one grid coordinate.
pub trait GridItem: Clone + Debug {
    /// Coordinate the item is placed at.
    fn coord(&self) -> Coord;

    /// Whether the item is a lab class (eligible for span merging).
    fn is_lab(&self) -> bool;

    /// Deterministic display order within a cell.
    ///
    /// Must be a total order whose primary key is
    /// `(subject_code, teacher_code)`.
    fn display_cmp(&self, other: &Self) -> Ordering;

    /// Whether two items are halves of one teaching block
    /// (section, subject, teacher and room agree).
    fn same_block(&self, other: &Self) -> bool;

    /// Elective block id, if any.
    fn elective_block_id(&self) -> Option<&str>;

    /// Elective block display name, if any.
    fn elective_block_name(&self) -> Option<&str>;

    /// Wall-clock start of the item's period.
    fn start_time(&self) -> &str;

    /// Wall-clock end of the item's period.
    fn end_time(&self) -> &str;

    /// Short label for diagnostics (e.g. `"CSE-2A/CS301"`).
    fn label(&self) -> String;
}

impl GridItem for ScheduleEntry {
    fn coord(&self) -> Coord {
        ScheduleEntry::coord(self)
    }

    fn is_lab(&self) -> bool {
        ScheduleEntry::is_lab(self)
    }

    fn display_cmp(&self, other: &Self) -> Ordering {
        ScheduleEntry::display_cmp(self, other)
    }

    fn same_block(&self, other: &Self) -> bool {
        ScheduleEntry::same_block(self, other)
    }

    fn elective_block_id(&self) -> Option<&str> {
        self.elective_block_id.as_deref()
    }

    fn elective_block_name(&self) -> Option<&str> {
        self.elective_block_name.as_deref()
    }

    fn start_time(&self) -> &str {
        &self.start_time
    }

    fn end_time(&self) -> &str {
        &self.end_time
    }

    fn label(&self) -> String {
        format!("{}/{}", self.section_code, self.subject_code)
    }
}
