//! Timetable grid composition for institutional scheduling.
//!
//! Turns the flat lists a timetable solver and its administrators produce
//! (scheduled entries, fixed locks, one-off special allotments, lab block
//! sizes) into a single deterministic day x slot grid that a section,
//! room, or teacher screen can render directly.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeSlot`, `SlotSet`, `ScheduleEntry`,
//!   `LockedEntry`, `SubjectMeta`, `SubjectCatalog`
//! - **`compose`**: The composition pipeline: entry index, lock overlay,
//!   lab span merging, elective grouping, combined class collapsing and
//!   grid serialization, driven by `Composer`
//! - **`validation`**: Strict input checks (duplicate slots, malformed
//!   times, double-booked sections, inconsistent combined classes)
//!
//! # Guarantees
//!
//! - Composition is a pure function of its inputs; shuffling any input
//!   list yields byte-identical serialized output.
//! - Every in-range entry appears on the grid exactly once.
//! - A special allotment always wins over a fixed lock at the same slot.

pub mod compose;
pub mod models;
pub mod validation;
