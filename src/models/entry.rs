//! Schedule entry model.
//!
//! A schedule entry is one section's class at one grid coordinate, as
//! assigned by the external solver. Entries are read-only inputs: the
//! composition engine clones what it renders and never mutates the
//! caller's list.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::Coord;

/// How a subject is taught.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectType {
    /// Lecture-style subject occupying single periods.
    #[default]
    Theory,
    /// Practical subject taught in multi-period blocks.
    Lab,
}

/// A solver-assigned class.
///
/// Identifiers are opaque strings; codes are the short human-readable
/// labels (e.g. `"CSE-2A"`, `"CS301"`) used for ordering and display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Day of week (0..=6).
    pub day_of_week: u8,
    /// Period index within the day.
    pub slot_index: u32,
    /// Wall-clock start time of the period.
    pub start_time: String,
    /// Wall-clock end time of the period.
    pub end_time: String,
    /// Section identifier.
    pub section_id: String,
    /// Section code.
    pub section_code: String,
    /// Subject identifier.
    pub subject_id: String,
    /// Subject code.
    pub subject_code: String,
    /// Subject display name.
    #[serde(default)]
    pub subject_name: Option<String>,
    /// Theory or lab.
    pub subject_type: SubjectType,
    /// Teacher identifier.
    pub teacher_id: String,
    /// Teacher code.
    pub teacher_code: String,
    /// Room identifier.
    pub room_id: String,
    /// Room code.
    pub room_code: String,
    /// Academic year the section belongs to (1-based).
    pub academic_year_number: u32,
    /// Elective block this class is taught under, if any.
    #[serde(default)]
    pub elective_block_id: Option<String>,
    /// Display name of the elective block.
    #[serde(default)]
    pub elective_block_name: Option<String>,
    /// Shared id of the per-section entries of one jointly taught session.
    #[serde(default)]
    pub combined_class_id: Option<String>,
}

impl ScheduleEntry {
    /// Creates an entry at a coordinate with empty identity fields.
    pub fn new(day_of_week: u8, slot_index: u32) -> Self {
        Self {
            day_of_week,
            slot_index,
            academic_year_number: 1,
            ..Default::default()
        }
    }

    /// Sets the section.
    pub fn with_section(mut self, id: impl Into<String>, code: impl Into<String>) -> Self {
        self.section_id = id.into();
        self.section_code = code.into();
        self
    }

    /// Sets the subject.
    pub fn with_subject(
        mut self,
        id: impl Into<String>,
        code: impl Into<String>,
        subject_type: SubjectType,
    ) -> Self {
        self.subject_id = id.into();
        self.subject_code = code.into();
        self.subject_type = subject_type;
        self
    }

    /// Sets the subject display name.
    pub fn with_subject_name(mut self, name: impl Into<String>) -> Self {
        self.subject_name = Some(name.into());
        self
    }

    /// Sets the teacher.
    pub fn with_teacher(mut self, id: impl Into<String>, code: impl Into<String>) -> Self {
        self.teacher_id = id.into();
        self.teacher_code = code.into();
        self
    }

    /// Sets the room.
    pub fn with_room(mut self, id: impl Into<String>, code: impl Into<String>) -> Self {
        self.room_id = id.into();
        self.room_code = code.into();
        self
    }

    /// Sets the period's wall-clock times.
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = start.into();
        self.end_time = end.into();
        self
    }

    /// Sets the academic year.
    pub fn with_year(mut self, academic_year_number: u32) -> Self {
        self.academic_year_number = academic_year_number;
        self
    }

    /// Places the entry in an elective block.
    pub fn with_elective_block(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.elective_block_id = Some(id.into());
        self.elective_block_name = Some(name.into());
        self
    }

    /// Marks the entry as part of a combined class.
    pub fn with_combined_class(mut self, id: impl Into<String>) -> Self {
        self.combined_class_id = Some(id.into());
        self
    }

    /// Grid coordinate of this entry.
    #[inline]
    pub fn coord(&self) -> Coord {
        Coord::new(self.day_of_week, self.slot_index)
    }

    /// Whether this is a lab class.
    #[inline]
    pub fn is_lab(&self) -> bool {
        self.subject_type == SubjectType::Lab
    }

    /// Display order within a cell.
    ///
    /// Primary key is `(subject_code, teacher_code)`, compared ordinally.
    /// Section, room and the ids break ties so that the result never
    /// depends on input order.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.subject_code
            .cmp(&other.subject_code)
            .then_with(|| self.teacher_code.cmp(&other.teacher_code))
            .then_with(|| self.section_code.cmp(&other.section_code))
            .then_with(|| self.room_code.cmp(&other.room_code))
            .then_with(|| self.section_id.cmp(&other.section_id))
            .then_with(|| self.subject_id.cmp(&other.subject_id))
            .then_with(|| self.teacher_id.cmp(&other.teacher_id))
            .then_with(|| self.room_id.cmp(&other.room_id))
            .then_with(|| self.elective_block_id.cmp(&other.elective_block_id))
            .then_with(|| self.start_time.cmp(&other.start_time))
            .then_with(|| self.end_time.cmp(&other.end_time))
            .then_with(|| self.academic_year_number.cmp(&other.academic_year_number))
            .then_with(|| self.subject_type.cmp(&other.subject_type))
            .then_with(|| self.subject_name.cmp(&other.subject_name))
            .then_with(|| self.elective_block_name.cmp(&other.elective_block_name))
            .then_with(|| self.combined_class_id.cmp(&other.combined_class_id))
    }

    /// Whether two entries describe the same teaching block
    /// (section, subject, teacher and room all agree).
    pub fn same_block(&self, other: &Self) -> bool {
        self.section_id == other.section_id
            && self.subject_id == other.subject_id
            && self.teacher_id == other.teacher_id
            && self.room_id == other.room_id
    }
}
