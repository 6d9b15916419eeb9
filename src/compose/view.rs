//! View scopes.
//!
//! Every timetable screen is one of three views: a section's own week,
//! a room's week, or a teacher's week. The latter two are aggregate
//! views where one session may involve several sections.

use serde::{Deserialize, Serialize};

use crate::models::{LockedEntry, ScheduleEntry};

/// Which slice of the timetable a grid shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum ViewScope {
    /// One section's timetable.
    Section(String),
    /// Everything taught in one room.
    Room(String),
    /// Everything taught by one teacher.
    Teacher(String),
}

impl ViewScope {
    /// Section view.
    pub fn section(id: impl Into<String>) -> Self {
        Self::Section(id.into())
    }

    /// Room view.
    pub fn room(id: impl Into<String>) -> Self {
        Self::Room(id.into())
    }

    /// Teacher view.
    pub fn teacher(id: impl Into<String>) -> Self {
        Self::Teacher(id.into())
    }

    /// Whether sessions must be collapsed across sections.
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, Self::Section(_))
    }

    /// Whether an entry belongs to this view.
    pub fn matches(&self, entry: &ScheduleEntry) -> bool {
        match self {
            Self::Section(id) => entry.section_id == *id,
            Self::Room(id) => entry.room_id == *id,
            Self::Teacher(id) => entry.teacher_id == *id,
        }
    }

    /// Entries belonging to this view.
    pub fn select_entries(&self, entries: &[ScheduleEntry]) -> Vec<ScheduleEntry> {
        entries.iter().filter(|e| self.matches(e)).cloned().collect()
    }

    /// Locks belonging to this view.
    pub fn select_locks(&self, locks: &[LockedEntry]) -> Vec<LockedEntry> {
        locks
            .iter()
            .filter(|l| self.matches(&l.entry))
            .cloned()
            .collect()
    }
}
