//! Timetable domain models.
//!
//! The flat inputs the composition engine consumes. All of them are
//! fetched by the surrounding application and treated as read-only
//! snapshots for one composition pass.
//!
//! # Domain Mappings
//!
//! | u-timetable | Meaning |
//! |-------------|---------|
//! | TimeSlot | One teaching period of the weekly grid |
//! | ScheduleEntry | A solver-assigned class for one section |
//! | LockedEntry | An administrator pin (fixed or special layer) |
//! | SubjectMeta | Lab block length per subject |

mod entry;
mod lock;
mod slot;
mod subject;

pub use entry::{ScheduleEntry, SubjectType};
pub use lock::LockedEntry;
pub use slot::{Coord, SlotSet, TimeSlot};
pub use subject::{SubjectCatalog, SubjectMeta};
