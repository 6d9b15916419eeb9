//! Time slot and grid coordinate models.
//!
//! A program's weekly grid is defined by its active time slots. Each slot
//! is addressed by `(day_of_week, slot_index)`; the set of active slots is
//! the addressable coordinate space. Coordinates outside that set are
//! out of range, which is different from being free.
//!
//! # Time Model
//! Start and end times are wall-clock strings (`"HH:MM"` or `"HH:MM:SS"`)
//! carried through for display. The engine never does arithmetic on them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A grid coordinate: `(day, slot)`.
///
/// Ordered by day, then slot, so a `BTreeMap<Coord, _>` iterates
/// in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Day of week (0 = Monday .. 6 = Sunday).
    pub day: u8,
    /// Period index within the day (0-based).
    pub slot: u32,
}

impl Coord {
    /// Creates a coordinate.
    #[inline]
    pub fn new(day: u8, slot: u32) -> Self {
        Self { day, slot }
    }

    /// The coordinate `offset` slots later on the same day, or `None`
    /// past the last representable slot index.
    #[inline]
    pub fn shifted(self, offset: u32) -> Option<Self> {
        let slot = self.slot.checked_add(offset)?;
        Some(Self { day: self.day, slot })
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.day, self.slot)
    }
}

/// An active teaching period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day of week (0..=6).
    pub day_of_week: u8,
    /// Period index within the day.
    pub slot_index: u32,
    /// Wall-clock start time.
    pub start_time: String,
    /// Wall-clock end time.
    pub end_time: String,
}

impl TimeSlot {
    /// Creates a time slot.
    pub fn new(
        day_of_week: u8,
        slot_index: u32,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            day_of_week,
            slot_index,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// Grid coordinate of this slot.
    #[inline]
    pub fn coord(&self) -> Coord {
        Coord::new(self.day_of_week, self.slot_index)
    }
}

/// The active coordinate space of a program.
///
/// Built once per composition from the raw time slot list. Duplicate
/// coordinates keep the first slot seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotSet {
    days: BTreeMap<u8, BTreeMap<u32, TimeSlot>>,
}

impl SlotSet {
    /// Creates an empty slot set (every coordinate out of range).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the slot set from a list of active time slots.
    pub fn from_slots(slots: &[TimeSlot]) -> Self {
        let mut set = Self::new();
        for slot in slots {
            set.insert(slot.clone());
        }
        set
    }

    /// Adds a slot. Returns `false` if the coordinate was already present.
    pub fn insert(&mut self, slot: TimeSlot) -> bool {
        let day = self.days.entry(slot.day_of_week).or_default();
        if day.contains_key(&slot.slot_index) {
            return false;
        }
        day.insert(slot.slot_index, slot);
        true
    }

    /// Whether the coordinate is inside the active set.
    pub fn contains(&self, coord: Coord) -> bool {
        self.get(coord).is_some()
    }

    /// Returns the time slot at a coordinate.
    pub fn get(&self, coord: Coord) -> Option<&TimeSlot> {
        self.days.get(&coord.day)?.get(&coord.slot)
    }

    /// Days with at least one active slot, ascending.
    pub fn days(&self) -> impl Iterator<Item = u8> + '_ {
        self.days.keys().copied()
    }

    /// Active slots of one day, ascending by slot index.
    pub fn slots_on(&self, day: u8) -> impl Iterator<Item = &TimeSlot> + '_ {
        self.days.get(&day).into_iter().flat_map(|d| d.values())
    }

    /// Union of slot indices across all days, ascending.
    ///
    /// This is the column axis of the rendered grid; a day that lacks
    /// one of these indices renders it as out of range.
    pub fn slot_axis(&self) -> Vec<u32> {
        let axis: BTreeSet<u32> = self.days.values().flat_map(|d| d.keys().copied()).collect();
        axis.into_iter().collect()
    }

    /// Total number of active coordinates.
    pub fn len(&self) -> usize {
        self.days.values().map(BTreeMap::len).sum()
    }

    /// Whether no coordinate is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
