//! Locked entry model.
//!
//! Administrators pin classes to slots in two layers: standing *fixed*
//! locks and one-off *special* allotments. Both share one shape and
//! differ only in precedence, which is decided by the layer a lock is
//! supplied in rather than by a field on the lock itself.

use serde::{Deserialize, Serialize};

use super::{Coord, ScheduleEntry};

/// An administrator-entered lock (fixed or special).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedEntry {
    /// Lock identifier.
    pub id: String,
    /// The class being pinned. For a LAB subject this is the first slot
    /// of the block.
    #[serde(flatten)]
    pub entry: ScheduleEntry,
    /// Inactive locks are kept for history and ignored by default.
    pub is_active: bool,
    /// Free-text reason (usually only on special allotments).
    #[serde(default)]
    pub reason: Option<String>,
}

impl LockedEntry {
    /// Creates an active lock for the given class.
    pub fn new(id: impl Into<String>, entry: ScheduleEntry) -> Self {
        Self {
            id: id.into(),
            entry,
            is_active: true,
            reason: None,
        }
    }

    /// Sets the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Marks the lock inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Coordinate of the lock's first slot.
    #[inline]
    pub fn coord(&self) -> Coord {
        self.entry.coord()
    }
}
