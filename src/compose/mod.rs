//! Timetable grid composition.
//!
//! Turns flat, independently fetched lists (solver entries, fixed locks,
//! special allotments, subject metadata) into one ordered day x slot
//! grid. Every timetable screen goes through this module.
//!
//! # Pipeline
//!
//! 1. Drop entries outside the active time slots.
//! 2. Build the fixed and special [`LockLayer`]s (lab continuation included).
//! 3. [`index_entries`] by coordinate.
//! 4. [`resolve_overlay`] per coordinate; locked coordinates take their
//!    regular entries along as `shadowed`.
//! 5. [`merge_lab_spans`] over what is left.
//! 6. [`group_electives`] for every remaining cell.
//! 7. [`serialize_grid`].
//!
//! Room and teacher views run [`collapse_combined`] per cell between
//! steps 3 and 4, and fold the per-section locks of one combined session
//! into a single locked cell ([`LockLayer::build_merged`]).
//!
//! Composition is a pure function of its inputs. It never fails; inputs
//! that cannot be rendered as given degrade the affected cell and leave a
//! [`Diagnostic`].
//!
//! # Usage
//!
//! ```
//! use u_timetable::compose::{Cell, ComposeRequest, Composer};
//! use u_timetable::models::{Coord, ScheduleEntry, SubjectType, TimeSlot};
//!
//! let slots = vec![
//!     TimeSlot::new(0, 0, "09:00", "10:00"),
//!     TimeSlot::new(0, 1, "10:00", "11:00"),
//! ];
//! let entries = vec![ScheduleEntry::new(0, 0)
//!     .with_section("s1", "CSE-2A")
//!     .with_subject("db", "CS301", SubjectType::Theory)];
//! let request = ComposeRequest::new(slots, entries);
//!
//! let composition = Composer::new().compose_section(&request, "s1");
//! assert!(matches!(composition.grid.cell(Coord::new(0, 0)), Some(Cell::Entries(_))));
//! assert!(composition.grid.cell(Coord::new(0, 1)).unwrap().is_free());
//! ```

mod collapse;
mod diagnostics;
mod elective;
mod grid;
mod index;
mod item;
mod options;
mod overlay;
mod span;
mod stats;
mod view;

pub use collapse::{collapse_combined, CollapsedEntry};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use elective::{group_electives, CellEntries, ElectiveGroup};
pub use grid::{serialize_grid, Cell, Grid, GridDay, GridSlot, LockedCell};
pub use index::{index_entries, EntryIndex};
pub use item::GridItem;
pub use options::{ComposeOptions, OptionsError};
pub use overlay::{resolve_overlay, LockHit, LockKind, LockLayer, Overlay, OverlayLevel};
pub use span::{merge_lab_spans, LabSpan, SpanMerge};
pub use stats::GridStats;
pub use view::ViewScope;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{Coord, LockedEntry, ScheduleEntry, SlotSet, SubjectCatalog, SubjectMeta, TimeSlot};

/// Everything one composition pass reads.
///
/// A consistent snapshot supplied by the caller; the composer does not
/// reconcile lists fetched at different times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeRequest {
    /// Active periods (the addressable coordinate space).
    pub time_slots: Vec<TimeSlot>,
    /// Solver-assigned entries.
    pub entries: Vec<ScheduleEntry>,
    /// Standing administrator locks.
    #[serde(default)]
    pub fixed_locks: Vec<LockedEntry>,
    /// One-off allotments overriding fixed locks.
    #[serde(default)]
    pub special_locks: Vec<LockedEntry>,
    /// Lab block sizes.
    #[serde(default)]
    pub subjects: Vec<SubjectMeta>,
}

impl ComposeRequest {
    /// Creates a request without locks or subject metadata.
    pub fn new(time_slots: Vec<TimeSlot>, entries: Vec<ScheduleEntry>) -> Self {
        Self {
            time_slots,
            entries,
            ..Default::default()
        }
    }

    /// Sets the fixed locks.
    pub fn with_fixed_locks(mut self, locks: Vec<LockedEntry>) -> Self {
        self.fixed_locks = locks;
        self
    }

    /// Sets the special allotments.
    pub fn with_special_locks(mut self, locks: Vec<LockedEntry>) -> Self {
        self.special_locks = locks;
        self
    }

    /// Sets the subject metadata.
    pub fn with_subjects(mut self, subjects: Vec<SubjectMeta>) -> Self {
        self.subjects = subjects;
        self
    }
}

/// A composed grid and what had to be degraded to build it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition<E> {
    /// The render-ready grid.
    pub grid: Grid<E>,
    /// Degraded-cell records, in the order they arose.
    pub diagnostics: Vec<Diagnostic>,
}

impl<E> Composition<E> {
    /// Warning-level diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Occupancy summary of the grid.
    pub fn stats(&self) -> GridStats {
        GridStats::calculate(&self.grid)
    }
}

/// Runs the composition pipeline.
///
/// Holds only options; safe to share across threads and reuse.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    options: ComposeOptions,
}

impl Composer {
    /// Creates a composer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a composer with the given options.
    pub fn with_options(options: ComposeOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Active options.
    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Composes one section's timetable. Combined classes are not
    /// collapsed: the section sees its own entry.
    pub fn compose_section(&self, request: &ComposeRequest, section_id: &str) -> Composition<ScheduleEntry> {
        let scope = ViewScope::section(section_id);
        let slots = SlotSet::from_slots(&request.time_slots);
        self.compose_items(
            &slots,
            scope.select_entries(&request.entries),
            &scope.select_locks(&request.fixed_locks),
            &scope.select_locks(&request.special_locks),
            &request.subjects,
        )
    }

    /// Composes a room's timetable with combined classes collapsed.
    pub fn compose_room(&self, request: &ComposeRequest, room_id: &str) -> Composition<CollapsedEntry> {
        self.compose_aggregate(request, &ViewScope::room(room_id))
    }

    /// Composes a teacher's timetable with combined classes collapsed.
    pub fn compose_teacher(&self, request: &ComposeRequest, teacher_id: &str) -> Composition<CollapsedEntry> {
        self.compose_aggregate(request, &ViewScope::teacher(teacher_id))
    }

    /// Composes an aggregate view for any scope.
    ///
    /// A section scope is accepted and yields one collapsed entry per
    /// regular entry, since a single section has nothing to combine with.
    ///
    /// Within a cell, collapsed entries follow display order
    /// ([`GridItem::display_cmp`]) like every other view. The
    /// year-then-sections order of [`collapse_combined`] only applies to
    /// its direct callers.
    pub fn compose_aggregate(&self, request: &ComposeRequest, scope: &ViewScope) -> Composition<CollapsedEntry> {
        let slots = SlotSet::from_slots(&request.time_slots);
        let mut diagnostics = Diagnostics::new();
        let collapse = self.options.collapse_combined_classes && scope.is_aggregate();

        let entries = retain_in_range(scope.select_entries(&request.entries), &slots, &mut diagnostics);
        let collapsed: Vec<CollapsedEntry> = index_entries(entries)
            .into_cells()
            .into_values()
            .flat_map(|cell| {
                if collapse {
                    collapse_combined(&cell)
                } else {
                    cell.iter().map(CollapsedEntry::from_entry).collect()
                }
            })
            .collect();

        let grid = self.run(
            &slots,
            collapsed,
            &scope.select_locks(&request.fixed_locks),
            &scope.select_locks(&request.special_locks),
            &request.subjects,
            collapse,
            &mut diagnostics,
        );
        Composition {
            grid,
            diagnostics: diagnostics.into_vec(),
        }
    }

    /// Composes arbitrary grid items against the given locks.
    ///
    /// This is the shared core of every view; callers with their own
    /// filtering can use it directly.
    pub fn compose_items<E: GridItem>(
        &self,
        slots: &SlotSet,
        items: Vec<E>,
        fixed_locks: &[LockedEntry],
        special_locks: &[LockedEntry],
        subjects: &[SubjectMeta],
    ) -> Composition<E> {
        let mut diagnostics = Diagnostics::new();
        let items = retain_in_range(items, slots, &mut diagnostics);
        let grid = self.run(slots, items, fixed_locks, special_locks, subjects, false, &mut diagnostics);
        Composition {
            grid,
            diagnostics: diagnostics.into_vec(),
        }
    }

    fn run<E: GridItem>(
        &self,
        slots: &SlotSet,
        items: Vec<E>,
        fixed_locks: &[LockedEntry],
        special_locks: &[LockedEntry],
        subjects: &[SubjectMeta],
        merge_locks: bool,
        diagnostics: &mut Diagnostics,
    ) -> Grid<E> {
        let catalog = SubjectCatalog::new(subjects, self.options.default_lab_block_size);
        let mut layer = |kind: LockKind, locks: &[LockedEntry]| {
            if merge_locks {
                LockLayer::build_merged(kind, locks, slots, &catalog, &self.options, diagnostics)
            } else {
                LockLayer::build(kind, locks, slots, &catalog, &self.options, diagnostics)
            }
        };
        let fixed = layer(LockKind::Fixed, fixed_locks);
        let special = layer(LockKind::Special, special_locks);

        let mut index = index_entries(items);
        let mut resolved: BTreeMap<Coord, Cell<E>> = BTreeMap::new();

        let active: Vec<Coord> = slots
            .days()
            .flat_map(|day| slots.slots_on(day).map(TimeSlot::coord))
            .collect();
        for coord in active {
            let overlay = resolve_overlay(coord, &fixed, &special);
            let Some(lock) = overlay.lock else {
                continue;
            };
            let shadowed = index.take(coord);
            for e in &shadowed {
                diagnostics.record(
                    DiagnosticKind::EntryShadowed,
                    coord,
                    e.label(),
                    format!("{} hidden under {:?} lock '{}'", e.label(), overlay.level, lock.id),
                );
            }
            let mut section_codes: Vec<String> = overlay
                .members
                .iter()
                .map(|m| m.entry.section_code.clone())
                .collect();
            section_codes.sort();
            section_codes.dedup();
            resolved.insert(
                coord,
                Cell::Locked(LockedCell {
                    level: overlay.level,
                    lock: lock.clone(),
                    lock_ids: overlay.members.iter().map(|m| m.id.clone()).collect(),
                    section_codes,
                    head_slot: overlay.head.map_or(coord.slot, |h| h.slot),
                    is_continuation: overlay.is_continuation,
                    shadowed,
                }),
            );
        }

        let spans = if self.options.merge_lab_spans {
            merge_lab_spans(&index, slots)
        } else {
            SpanMerge::default()
        };
        let span_count = spans.len();
        for (head, span) in spans.spans {
            let tail = span.tail_coord();
            index.take(head);
            index.take(tail);
            resolved.insert(tail, Cell::SpanContinuation { head_slot: head.slot });
            resolved.insert(head, Cell::Span(span));
        }

        for (coord, entries) in index.into_cells() {
            resolved.insert(coord, Cell::Entries(group_electives(&entries)));
        }

        debug!(
            cells = slots.len(),
            fixed_locks = fixed.locks().len(),
            special_locks = special.locks().len(),
            lab_spans = span_count,
            diagnostics = diagnostics.len(),
            "composed timetable grid"
        );

        serialize_grid(slots, resolved)
    }
}

fn retain_in_range<E: GridItem>(items: Vec<E>, slots: &SlotSet, diagnostics: &mut Diagnostics) -> Vec<E> {
    items
        .into_iter()
        .filter(|e| {
            let coord = e.coord();
            let keep = slots.contains(coord);
            if !keep {
                diagnostics.record(
                    DiagnosticKind::EntryOutOfRange,
                    coord,
                    e.label(),
                    format!("{} at {coord} is outside the active time slots", e.label()),
                );
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubjectType, TimeSlot};
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn week(days: u8, per_day: u32) -> Vec<TimeSlot> {
        let mut v = Vec::new();
        for d in 0..days {
            for s in 0..per_day {
                v.push(TimeSlot::new(
                    d,
                    s,
                    format!("{:02}:00", 9 + s),
                    format!("{:02}:00", 10 + s),
                ));
            }
        }
        v
    }

    fn entry(day: u8, slot: u32, section: &str, subject: &str, ty: SubjectType) -> ScheduleEntry {
        ScheduleEntry::new(day, slot)
            .with_section(section, section)
            .with_subject(subject, subject, ty)
            .with_teacher("t1", "TK")
            .with_room("r1", "L1")
            .with_times(format!("{:02}:00", 9 + slot), format!("{:02}:00", 10 + slot))
    }

    #[test]
    fn test_scenario_lab_span() {
        let request = ComposeRequest::new(
            week(6, 6),
            vec![
                entry(1, 2, "S1", "NETLAB", SubjectType::Lab),
                entry(1, 3, "S1", "NETLAB", SubjectType::Lab),
            ],
        );
        let c = Composer::new().compose_section(&request, "S1");
        match c.grid.cell(Coord::new(1, 2)) {
            Some(Cell::Span(span)) => {
                assert_eq!((span.start_slot, span.end_slot), (2, 3));
                assert_eq!(span.start_time, "11:00");
                assert_eq!(span.end_time, "13:00");
                assert_eq!(span.end_time, span.tail.end_time);
            }
            other => panic!("expected span, got {other:?}"),
        }
        assert_eq!(
            c.grid.cell(Coord::new(1, 3)),
            Some(&Cell::SpanContinuation { head_slot: 2 })
        );
        assert!(c.diagnostics.is_empty());
    }

    #[test]
    fn test_scenario_fixed_lab_continuation() {
        let lock = LockedEntry::new("F1", entry(0, 0, "S1", "LAB1", SubjectType::Lab));
        let request = ComposeRequest::new(week(5, 6), Vec::new())
            .with_fixed_locks(vec![lock])
            .with_subjects(vec![SubjectMeta::new("LAB1", 2)]);
        let c = Composer::new().compose_section(&request, "S1");

        let Some(Cell::Locked(head)) = c.grid.cell(Coord::new(0, 0)) else {
            panic!("head not locked");
        };
        let Some(Cell::Locked(cont)) = c.grid.cell(Coord::new(0, 1)) else {
            panic!("continuation not locked");
        };
        assert_eq!(head.level, OverlayLevel::Fixed);
        assert!(!head.is_continuation);
        assert_eq!(cont.level, OverlayLevel::Fixed);
        assert!(cont.is_continuation);
        assert_eq!(cont.lock, head.lock);
        assert_eq!(cont.head_slot, 0);
        assert!(c.grid.cell(Coord::new(0, 2)).unwrap().is_free());
    }

    #[test]
    fn test_scenario_elective_block() {
        let b1 = |subject: &str, teacher: &str| {
            entry(2, 1, "S1", subject, SubjectType::Theory)
                .with_teacher(teacher, teacher)
                .with_elective_block("B1", "Professional Elective")
        };
        let request = ComposeRequest::new(
            week(5, 4),
            vec![
                b1("CS-ML", "T3"),
                entry(2, 1, "S1", "CS-CORE", SubjectType::Theory),
                b1("CS-AI", "T1"),
                b1("CS-CV", "T2"),
            ],
        );
        let c = Composer::new().compose_section(&request, "S1");
        let Some(Cell::Entries(cell)) = c.grid.cell(Coord::new(2, 1)) else {
            panic!("expected entries");
        };
        assert_eq!(cell.groups.len(), 1);
        assert_eq!(cell.groups[0].block_id, "B1");
        let codes: Vec<&str> = cell.groups[0]
            .items
            .iter()
            .map(|e| e.subject_code.as_str())
            .collect();
        assert_eq!(codes, vec!["CS-AI", "CS-CV", "CS-ML"]);
        assert_eq!(cell.standalone.len(), 1);
    }

    #[test]
    fn test_scenario_faculty_collapse() {
        let shared = |section: &str| {
            entry(3, 0, section, "CS201", SubjectType::Theory)
                .with_year(2)
                .with_combined_class("CC1")
        };
        let request = ComposeRequest::new(week(5, 4), vec![shared("CSE-2B"), shared("CSE-2A")]);
        let c = Composer::new().compose_teacher(&request, "t1");
        let Some(Cell::Entries(cell)) = c.grid.cell(Coord::new(3, 0)) else {
            panic!("expected entries");
        };
        assert_eq!(cell.standalone.len(), 1);
        assert_eq!(cell.standalone[0].section_codes, vec!["CSE-2A", "CSE-2B"]);

        // The section view still shows each section's own entry.
        let section = Composer::new().compose_section(&request, "CSE-2A");
        let Some(Cell::Entries(own)) = section.grid.cell(Coord::new(3, 0)) else {
            panic!("expected entries");
        };
        assert_eq!(own.standalone.len(), 1);
        assert_eq!(own.standalone[0].section_code, "CSE-2A");
    }

    #[test]
    fn test_teacher_view_folds_combined_locks() {
        let locked = |id: &str, section: &str| {
            LockedEntry::new(
                id,
                entry(0, 0, section, "CS201", SubjectType::Theory)
                    .with_year(2)
                    .with_combined_class("CC1"),
            )
        };
        let request = ComposeRequest::new(week(1, 2), Vec::new())
            .with_fixed_locks(vec![locked("F-B", "CSE-2B"), locked("F-A", "CSE-2A")]);

        let c = Composer::new().compose_teacher(&request, "t1");
        let Some(Cell::Locked(cell)) = c.grid.cell(Coord::new(0, 0)) else {
            panic!("expected lock");
        };
        assert_eq!(cell.lock.id, "F-A");
        assert_eq!(cell.lock_ids, vec!["F-A", "F-B"]);
        assert_eq!(cell.section_codes, vec!["CSE-2A", "CSE-2B"]);
        assert_eq!(c.warnings().count(), 0);

        // Each section still sees only its own lock.
        let section = Composer::new().compose_section(&request, "CSE-2B");
        let Some(Cell::Locked(own)) = section.grid.cell(Coord::new(0, 0)) else {
            panic!("expected lock");
        };
        assert_eq!(own.lock_ids, vec!["F-B"]);
        assert_eq!(own.section_codes, vec!["CSE-2B"]);
    }

    #[test]
    fn test_room_view_reports_colliding_sessions() {
        let request = ComposeRequest::new(week(1, 2), Vec::new()).with_fixed_locks(vec![
            LockedEntry::new("F-A", entry(0, 0, "CSE-2A", "CS201", SubjectType::Theory)),
            LockedEntry::new("F-B", entry(0, 0, "CSE-2B", "CS305", SubjectType::Theory)),
        ]);
        let c = Composer::new().compose_room(&request, "r1");
        let kinds: Vec<DiagnosticKind> = c.warnings().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::LockConflict]);
    }

    #[test]
    fn test_lab_lock_at_last_slot_index_composes() {
        let slots = vec![TimeSlot::new(0, 0, "09:00", "10:00"), TimeSlot::new(0, u32::MAX, "17:00", "18:00")];
        let lock = LockedEntry::new(
            "F1",
            ScheduleEntry::new(0, u32::MAX)
                .with_section("S1", "S1")
                .with_subject("LAB1", "LAB1", SubjectType::Lab),
        );
        let request = ComposeRequest::new(slots, Vec::new()).with_fixed_locks(vec![lock]);
        let c = Composer::new().compose_section(&request, "S1");
        assert!(c.grid.cell(Coord::new(0, 0)).unwrap().is_free());
        assert_eq!(c.grid.cell(Coord::new(0, u32::MAX)).unwrap().level(), OverlayLevel::Fixed);
        assert_eq!(c.diagnostics[0].kind, DiagnosticKind::LockBlockTruncated);
    }

    #[test]
    fn test_scenario_sparse_saturday() {
        let mut slots = week(5, 6);
        slots.extend(week(6, 2).into_iter().filter(|s| s.day_of_week == 5));
        let c = Composer::new().compose_section(&ComposeRequest::new(slots, Vec::new()), "S1");
        assert!(c.grid.cell(Coord::new(5, 1)).unwrap().is_free());
        for s in 2..6 {
            assert!(c.grid.cell(Coord::new(5, s)).unwrap().is_out_of_range());
        }
    }

    #[test]
    fn test_room_view_collapses_combined_lab_into_span() {
        let lab = |slot: u32, section: &str| entry(0, slot, section, "NETLAB", SubjectType::Lab);
        let request = ComposeRequest::new(
            week(1, 4),
            vec![lab(0, "S2"), lab(0, "S1"), lab(1, "S1"), lab(1, "S2")],
        );
        let c = Composer::new().compose_room(&request, "r1");
        let Some(Cell::Span(span)) = c.grid.cell(Coord::new(0, 0)) else {
            panic!("expected combined span");
        };
        assert_eq!(span.head.section_codes, vec!["S1", "S2"]);
        assert_eq!(c.stats().lab_spans, 1);
    }

    #[test]
    fn test_collapsing_disabled() {
        let shared = |section: &str| entry(3, 0, section, "CS201", SubjectType::Theory);
        let request = ComposeRequest::new(week(5, 4), vec![shared("A"), shared("B")]);
        let composer = Composer::with_options(ComposeOptions::new().with_collapsing(false)).unwrap();
        let c = composer.compose_room(&request, "r1");
        let Some(Cell::Entries(cell)) = c.grid.cell(Coord::new(3, 0)) else {
            panic!("expected entries");
        };
        assert_eq!(cell.standalone.len(), 2);
    }

    #[test]
    fn test_spans_disabled() {
        let request = ComposeRequest::new(
            week(1, 4),
            vec![
                entry(0, 0, "S1", "L", SubjectType::Lab),
                entry(0, 1, "S1", "L", SubjectType::Lab),
            ],
        );
        let composer = Composer::with_options(ComposeOptions::new().with_lab_spans(false)).unwrap();
        let c = composer.compose_section(&request, "S1");
        assert!(matches!(c.grid.cell(Coord::new(0, 1)), Some(Cell::Entries(_))));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let err = Composer::with_options(ComposeOptions::new().with_default_lab_block_size(0));
        assert!(err.is_err());
    }

    #[test]
    fn test_lock_shadows_regular_entry() {
        let solver = entry(0, 0, "S1", "CS101", SubjectType::Theory);
        let lock = LockedEntry::new("F1", solver.clone());
        let request = ComposeRequest::new(week(1, 2), vec![solver]).with_fixed_locks(vec![lock]);
        let c = Composer::new().compose_section(&request, "S1");
        let Some(Cell::Locked(cell)) = c.grid.cell(Coord::new(0, 0)) else {
            panic!("expected lock");
        };
        assert_eq!(cell.shadowed.len(), 1);
        assert_eq!(c.diagnostics.len(), 1);
        assert_eq!(c.diagnostics[0].kind, DiagnosticKind::EntryShadowed);
        assert_eq!(c.warnings().count(), 0);
    }

    #[test]
    fn test_lock_breaks_span() {
        let request = ComposeRequest::new(
            week(1, 4),
            vec![
                entry(0, 0, "S1", "L", SubjectType::Lab),
                entry(0, 1, "S1", "L", SubjectType::Lab),
            ],
        )
        .with_special_locks(vec![LockedEntry::new(
            "SP1",
            entry(0, 1, "S1", "EXAM", SubjectType::Theory),
        )
        .with_reason("midterm")]);
        let c = Composer::new().compose_section(&request, "S1");
        assert!(matches!(c.grid.cell(Coord::new(0, 0)), Some(Cell::Entries(_))));
        assert_eq!(c.grid.cell(Coord::new(0, 1)).unwrap().level(), OverlayLevel::Special);
    }

    #[test]
    fn test_special_over_fixed() {
        let fixed = LockedEntry::new("F1", entry(0, 0, "S1", "A", SubjectType::Theory));
        let special = LockedEntry::new("SP1", entry(0, 0, "S1", "B", SubjectType::Theory));
        let request = ComposeRequest::new(week(1, 2), Vec::new())
            .with_fixed_locks(vec![fixed])
            .with_special_locks(vec![special]);
        let c = Composer::new().compose_section(&request, "S1");
        let Some(Cell::Locked(cell)) = c.grid.cell(Coord::new(0, 0)) else {
            panic!("expected lock");
        };
        assert_eq!(cell.level, OverlayLevel::Special);
        assert_eq!(cell.lock.id, "SP1");
    }

    #[test]
    fn test_out_of_range_entry_dropped() {
        let request = ComposeRequest::new(
            week(1, 2),
            vec![
                entry(0, 0, "S1", "A", SubjectType::Theory),
                entry(0, 7, "S1", "B", SubjectType::Theory),
                entry(6, 0, "S1", "C", SubjectType::Theory),
            ],
        );
        let c = Composer::new().compose_section(&request, "S1");
        assert_eq!(c.grid.placed_items().len(), 1);
        assert_eq!(c.warnings().count(), 2);
        assert!(c
            .diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::EntryOutOfRange));
    }

    #[test]
    fn test_other_sections_filtered() {
        let request = ComposeRequest::new(
            week(1, 2),
            vec![
                entry(0, 0, "S1", "A", SubjectType::Theory),
                entry(0, 1, "S2", "B", SubjectType::Theory),
            ],
        );
        let c = Composer::new().compose_section(&request, "S1");
        assert!(c.grid.cell(Coord::new(0, 1)).unwrap().is_free());
    }

    #[test]
    fn test_shuffled_input_same_json() {
        let mut entries = vec![
            entry(0, 0, "S1", "L", SubjectType::Lab),
            entry(0, 1, "S1", "L", SubjectType::Lab),
            entry(0, 2, "S1", "X", SubjectType::Theory).with_elective_block("B1", "E"),
            entry(0, 2, "S1", "Y", SubjectType::Theory).with_elective_block("B1", "E"),
            entry(0, 2, "S1", "Z", SubjectType::Theory).with_elective_block("B2", "D"),
            entry(0, 2, "S1", "W", SubjectType::Theory),
            entry(1, 3, "S1", "Q", SubjectType::Theory),
            entry(1, 3, "S1", "P", SubjectType::Theory),
        ];
        let composer = Composer::new();
        let expected = serde_json::to_string(
            &composer.compose_section(&ComposeRequest::new(week(2, 4), entries.clone()), "S1"),
        )
        .unwrap();

        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..10 {
            entries.shuffle(&mut rng);
            let mut slots = week(2, 4);
            slots.shuffle(&mut rng);
            let got = serde_json::to_string(
                &composer.compose_section(&ComposeRequest::new(slots, entries.clone()), "S1"),
            )
            .unwrap();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "time_slots": [{"day_of_week": 0, "slot_index": 0, "start_time": "09:00", "end_time": "10:00"}],
            "entries": []
        }"#;
        let request: ComposeRequest = serde_json::from_str(json).unwrap();
        assert!(request.fixed_locks.is_empty());
        let c = Composer::new().compose_section(&request, "S1");
        assert_eq!(c.stats().free_cells, 1);
    }

    mod proptest_compose {
        use super::*;
        use proptest::prelude::*;

        fn arb_entry() -> impl Strategy<Value = ScheduleEntry> {
            (
                0u8..3,
                0u32..5,
                prop_oneof![Just("S1"), Just("S2")],
                prop_oneof![Just("A"), Just("B"), Just("L")],
                prop_oneof![Just("T1"), Just("T2")],
                prop_oneof![Just("R1"), Just("R2")],
                proptest::option::of(prop_oneof![Just("B1"), Just("B2")]),
                1u32..3,
            )
                .prop_map(|(day, slot, section, subject, teacher, room, block, year)| {
                    let ty = if subject == "L" {
                        SubjectType::Lab
                    } else {
                        SubjectType::Theory
                    };
                    let mut e = ScheduleEntry::new(day, slot)
                        .with_section(section, section)
                        .with_subject(subject, subject, ty)
                        .with_teacher(teacher, teacher)
                        .with_room(room, room)
                        .with_year(year);
                    if let Some(b) = block {
                        e = e.with_elective_block(b, b);
                    }
                    e
                })
        }

        fn arb_locks() -> impl Strategy<Value = Vec<LockedEntry>> {
            proptest::collection::vec(arb_entry(), 0..4).prop_map(|entries| {
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, e)| LockedEntry::new(format!("L{i}"), e))
                    .collect()
            })
        }

        proptest! {
            /// Every in-range entry shows up exactly once in a section grid.
            #[test]
            fn every_entry_placed_once(
                entries in proptest::collection::vec(arb_entry(), 0..30),
                fixed in arb_locks(),
                special in arb_locks(),
            ) {
                // Slot 4 is never active.
                let slots: Vec<TimeSlot> = week(3, 4);
                let request = ComposeRequest::new(slots.clone(), entries.clone())
                    .with_fixed_locks(fixed)
                    .with_special_locks(special);
                let c = Composer::new().compose_section(&request, "S1");
                let set = SlotSet::from_slots(&slots);
                let expected = entries
                    .iter()
                    .filter(|e| e.section_id == "S1" && set.contains(e.coord()))
                    .count();
                prop_assert_eq!(c.grid.placed_items().len(), expected);
            }

            /// Composition does not depend on input order.
            #[test]
            fn order_independent(
                entries in proptest::collection::vec(arb_entry(), 0..30),
                fixed in arb_locks(),
            ) {
                let composer = Composer::new();
                let forward = ComposeRequest::new(week(3, 5), entries.clone())
                    .with_fixed_locks(fixed.clone());
                let mut reversed_entries = entries;
                reversed_entries.reverse();
                let mut reversed_locks = fixed;
                reversed_locks.reverse();
                let backward = ComposeRequest::new(week(3, 5), reversed_entries)
                    .with_fixed_locks(reversed_locks);

                prop_assert_eq!(
                    composer.compose_teacher(&forward, "T1").grid,
                    composer.compose_teacher(&backward, "T1").grid
                );
                prop_assert_eq!(
                    composer.compose_section(&forward, "S2").grid,
                    composer.compose_section(&backward, "S2").grid
                );
            }

            /// A special allotment always wins over a fixed lock at the same slot.
            #[test]
            fn special_always_wins(
                entries in proptest::collection::vec(arb_entry(), 0..10),
                fixed in arb_locks(),
                special in arb_locks(),
            ) {
                let request = ComposeRequest::new(week(3, 5), entries)
                    .with_fixed_locks(fixed.clone())
                    .with_special_locks(special.clone());
                let c = Composer::new().compose_room(&request, "R1");
                for lock in special.iter().filter(|l| l.entry.room_id == "R1") {
                    let level = c.grid.cell(lock.coord()).map(Cell::level);
                    prop_assert_eq!(level, Some(OverlayLevel::Special));
                }
            }

            /// Aggregate views place every in-scope entry in exactly one
            /// collapsed entry.
            #[test]
            fn aggregate_views_cover_every_entry(
                entries in proptest::collection::vec(arb_entry(), 0..30),
                fixed in arb_locks(),
                special in arb_locks(),
                collapsing in any::<bool>(),
            ) {
                let slots = week(3, 4);
                let set = SlotSet::from_slots(&slots);
                let request = ComposeRequest::new(slots, entries.clone())
                    .with_fixed_locks(fixed)
                    .with_special_locks(special);
                let composer = Composer::with_options(ComposeOptions::new().with_collapsing(collapsing)).unwrap();

                let in_range = |keep: &dyn Fn(&ScheduleEntry) -> bool| {
                    entries.iter().filter(|e| keep(*e) && set.contains(e.coord())).count()
                };
                let placed = |c: &Composition<CollapsedEntry>| -> usize {
                    c.grid.placed_items().iter().map(|i| i.member_count).sum()
                };

                let room = composer.compose_room(&request, "R1");
                prop_assert_eq!(placed(&room), in_range(&|e: &ScheduleEntry| e.room_id == "R1"));
                let teacher = composer.compose_teacher(&request, "T2");
                prop_assert_eq!(placed(&teacher), in_range(&|e: &ScheduleEntry| e.teacher_id == "T2"));
            }

            /// Collapsed section codes are the sorted, deduplicated union.
            #[test]
            fn collapsed_sections_sorted_unique(
                entries in proptest::collection::vec(arb_entry(), 0..30),
            ) {
                let c = Composer::new().compose_room(&ComposeRequest::new(week(3, 5), entries), "R2");
                for item in c.grid.placed_items() {
                    let mut expected = item.section_codes.clone();
                    expected.sort();
                    expected.dedup();
                    prop_assert_eq!(&item.section_codes, &expected);
                }
            }
        }
    }
}
