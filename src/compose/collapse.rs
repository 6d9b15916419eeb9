//! Combined class collapsing for aggregate views.
//!
//! A combined class is one session taught to several sections at once.
//! The solver emits one entry per section; a room or teacher view must
//! show the session once, labelled with every participating section.
//! Section views never collapse.
//!
//! # Blind spot
//! Members of a group are assumed to agree on teacher and time. That is
//! not re-checked here: the representative (first member in display
//! order) supplies those fields. Use
//! [`validate_input`](crate::validation::validate_input) upstream for a
//! strict check.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::GridItem;
use crate::models::{Coord, ScheduleEntry, SubjectType};

/// One session after merging its per-section entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedEntry {
    /// Day of week.
    pub day_of_week: u8,
    /// Period index.
    pub slot_index: u32,
    /// Wall-clock start (from the representative).
    pub start_time: String,
    /// Wall-clock end (from the representative).
    pub end_time: String,
    /// Participating section codes, ascending, no duplicates.
    pub section_codes: Vec<String>,
    /// Participating section ids, ascending, no duplicates.
    pub section_ids: Vec<String>,
    /// Subject identifier.
    pub subject_id: String,
    /// Subject code.
    pub subject_code: String,
    /// Subject display name.
    pub subject_name: Option<String>,
    /// Theory or lab.
    pub subject_type: SubjectType,
    /// Teacher identifier (from the representative).
    pub teacher_id: String,
    /// Teacher code (from the representative).
    pub teacher_code: String,
    /// Room identifier.
    pub room_id: String,
    /// Room code.
    pub room_code: String,
    /// Academic year.
    pub academic_year_number: u32,
    /// Elective block id.
    pub elective_block_id: Option<String>,
    /// Elective block name.
    pub elective_block_name: Option<String>,
    /// Combined class id (from the representative).
    pub combined_class_id: Option<String>,
    /// Number of source entries merged into this one.
    pub member_count: usize,
}

impl CollapsedEntry {
    /// Wraps a single entry without merging.
    pub fn from_entry(entry: &ScheduleEntry) -> Self {
        Self::from_group(entry, vec![entry.section_code.clone()], vec![entry.section_id.clone()], 1)
    }

    fn from_group(
        rep: &ScheduleEntry,
        section_codes: Vec<String>,
        section_ids: Vec<String>,
        member_count: usize,
    ) -> Self {
        Self {
            day_of_week: rep.day_of_week,
            slot_index: rep.slot_index,
            start_time: rep.start_time.clone(),
            end_time: rep.end_time.clone(),
            section_codes,
            section_ids,
            subject_id: rep.subject_id.clone(),
            subject_code: rep.subject_code.clone(),
            subject_name: rep.subject_name.clone(),
            subject_type: rep.subject_type,
            teacher_id: rep.teacher_id.clone(),
            teacher_code: rep.teacher_code.clone(),
            room_id: rep.room_id.clone(),
            room_code: rep.room_code.clone(),
            academic_year_number: rep.academic_year_number,
            elective_block_id: rep.elective_block_id.clone(),
            elective_block_name: rep.elective_block_name.clone(),
            combined_class_id: rep.combined_class_id.clone(),
            member_count,
        }
    }

    /// Section codes joined with commas (`"CSE-2A,CSE-2B"`).
    pub fn sections_label(&self) -> String {
        self.section_codes.join(",")
    }

    /// Whether more than one section shares this session.
    pub fn is_combined(&self) -> bool {
        self.section_codes.len() > 1
    }
}

impl GridItem for CollapsedEntry {
    fn coord(&self) -> Coord {
        Coord::new(self.day_of_week, self.slot_index)
    }

    fn is_lab(&self) -> bool {
        self.subject_type == SubjectType::Lab
    }

    fn display_cmp(&self, other: &Self) -> Ordering {
        self.subject_code
            .cmp(&other.subject_code)
            .then_with(|| self.teacher_code.cmp(&other.teacher_code))
            .then_with(|| self.section_codes.cmp(&other.section_codes))
            .then_with(|| self.room_code.cmp(&other.room_code))
            .then_with(|| self.academic_year_number.cmp(&other.academic_year_number))
            .then_with(|| self.elective_block_id.cmp(&other.elective_block_id))
            .then_with(|| self.section_ids.cmp(&other.section_ids))
            .then_with(|| self.subject_id.cmp(&other.subject_id))
            .then_with(|| self.teacher_id.cmp(&other.teacher_id))
            .then_with(|| self.room_id.cmp(&other.room_id))
            .then_with(|| self.start_time.cmp(&other.start_time))
            .then_with(|| self.end_time.cmp(&other.end_time))
            .then_with(|| self.subject_type.cmp(&other.subject_type))
            .then_with(|| self.subject_name.cmp(&other.subject_name))
            .then_with(|| self.elective_block_name.cmp(&other.elective_block_name))
            .then_with(|| self.combined_class_id.cmp(&other.combined_class_id))
            .then_with(|| self.member_count.cmp(&other.member_count))
    }

    fn same_block(&self, other: &Self) -> bool {
        self.section_ids == other.section_ids
            && self.subject_id == other.subject_id
            && self.teacher_id == other.teacher_id
            && self.room_id == other.room_id
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
        format!("{}/{}", self.sections_label(), self.subject_code)
    }
}

pub(crate) type CollapseKey<'a> = (&'a str, &'a str, u32, &'a str);

/// Identity of a jointly taught session within one cell.
pub(crate) fn collapse_key(e: &ScheduleEntry) -> CollapseKey<'_> {
    (
        e.subject_code.as_str(),
        e.room_code.as_str(),
        e.academic_year_number,
        e.elective_block_id.as_deref().unwrap_or(""),
    )
}

/// Merges per-section entries of jointly taught sessions.
///
/// Entries are grouped by `(subject_code, room_code, academic_year_number,
/// elective_block_id)`. Callers pass one cell's entries at a time; the
/// key does not include the coordinate.
///
/// Output is ordered by `(academic_year_number, sections joined by ',',
/// subject_code)`.
///
/// # Example
/// ```
/// use u_timetable::compose::collapse_combined;
/// use u_timetable::models::{ScheduleEntry, SubjectType};
///
/// let base = ScheduleEntry::new(0, 0)
///     .with_subject("s", "CS201", SubjectType::Theory)
///     .with_room("r", "R101")
///     .with_year(2);
/// let entries = vec![
///     base.clone().with_section("b", "CSE-2B"),
///     base.clone().with_section("a", "CSE-2A"),
/// ];
/// let collapsed = collapse_combined(&entries);
/// assert_eq!(collapsed.len(), 1);
/// assert_eq!(collapsed[0].section_codes, vec!["CSE-2A", "CSE-2B"]);
/// ```
pub fn collapse_combined(entries: &[ScheduleEntry]) -> Vec<CollapsedEntry> {
    let mut groups: BTreeMap<CollapseKey<'_>, Vec<&ScheduleEntry>> = BTreeMap::new();
    for e in entries {
        groups.entry(collapse_key(e)).or_default().push(e);
    }

    let mut out: Vec<CollapsedEntry> = groups
        .into_values()
        .map(|mut members| {
            members.sort_by(|a, b| a.display_cmp(b));
            let mut codes: Vec<String> = members.iter().map(|m| m.section_code.clone()).collect();
            codes.sort();
            codes.dedup();
            let mut ids: Vec<String> = members.iter().map(|m| m.section_id.clone()).collect();
            ids.sort();
            ids.dedup();
            CollapsedEntry::from_group(members[0], codes, ids, members.len())
        })
        .collect();

    out.sort_by(|a, b| {
        a.academic_year_number
            .cmp(&b.academic_year_number)
            .then_with(|| a.sections_label().cmp(&b.sections_label()))
            .then_with(|| a.subject_code.cmp(&b.subject_code))
            .then_with(|| a.display_cmp(b))
    });
    out
}
