//! Lock overlay resolution.
//!
//! Three layers can claim a coordinate: special allotments, fixed locks
//! and the solver's regular entries. Exactly one is authoritative.
//!
//! # Precedence
//! `SPECIAL > FIXED > NONE`. Regular entries render only at `NONE`.
//!
//! # Continuation
//! A LAB lock with a block size of `n > 1` also claims the next `n - 1`
//! periods of its day. Those continuation slots carry the same level and
//! lock and never resolve a different lock of their own. When two locks
//! of one layer overlap, the one with the lower `slot_index` wins and the
//! other is dropped with a warning.
//!
//! # Combined classes
//! A session taught jointly to several sections is often locked once per
//! section. [`LockLayer::build_merged`] (used by room and teacher views)
//! folds locks that share a head coordinate and the session key
//! `(subject_code, room_code, academic_year_number, elective_block_id)`
//! into one placed lock instead of reporting them as conflicts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::collapse::collapse_key;
use super::{ComposeOptions, DiagnosticKind, Diagnostics};
use crate::models::{Coord, LockedEntry, SlotSet, SubjectCatalog};

/// Which layer a lock list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockKind {
    /// Standing administrator lock.
    Fixed,
    /// One-off allotment overriding fixed locks.
    Special,
}

/// The authoritative layer at a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverlayLevel {
    /// A special allotment holds the slot.
    Special,
    /// A fixed lock holds the slot.
    Fixed,
    /// No lock; regular entries (if any) render.
    None,
}

impl From<LockKind> for OverlayLevel {
    fn from(kind: LockKind) -> Self {
        match kind {
            LockKind::Fixed => OverlayLevel::Fixed,
            LockKind::Special => OverlayLevel::Special,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LockCell {
    lock: usize,
    head: Coord,
    is_continuation: bool,
}

/// A lock claiming one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockHit<'a> {
    /// The lock.
    pub lock: &'a LockedEntry,
    /// Every lock folded into this one, `lock` first.
    pub members: &'a [LockedEntry],
    /// Coordinate of the lock's first slot.
    pub head: Coord,
    /// Whether this coordinate is a continuation of the block.
    pub is_continuation: bool,
}

/// All coordinates claimed by one lock layer.
#[derive(Debug, Clone)]
pub struct LockLayer {
    kind: LockKind,
    locks: Vec<LockedEntry>,
    members: Vec<Vec<LockedEntry>>,
    cells: BTreeMap<Coord, LockCell>,
}

impl LockLayer {
    /// Creates a layer with no locks.
    pub fn empty(kind: LockKind) -> Self {
        Self {
            kind,
            locks: Vec::new(),
            members: Vec::new(),
            cells: BTreeMap::new(),
        }
    }

    /// Places locks on the grid, expanding lab blocks into continuation
    /// slots.
    ///
    /// Locks are placed in ascending `(day, slot_index)` order, so the
    /// earlier lock keeps any contested slot. Inactive locks are skipped
    /// unless `options.include_inactive_locks` is set.
    pub fn build(
        kind: LockKind,
        locks: &[LockedEntry],
        slots: &SlotSet,
        catalog: &SubjectCatalog,
        options: &ComposeOptions,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        Self::place(kind, locks, slots, catalog, options, false, diagnostics)
    }

    /// Like [`build`](Self::build), but locks of one combined session
    /// (same head coordinate and session key) are folded into the first
    /// in display order rather than reported as conflicts.
    pub fn build_merged(
        kind: LockKind,
        locks: &[LockedEntry],
        slots: &SlotSet,
        catalog: &SubjectCatalog,
        options: &ComposeOptions,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        Self::place(kind, locks, slots, catalog, options, true, diagnostics)
    }

    fn place(
        kind: LockKind,
        locks: &[LockedEntry],
        slots: &SlotSet,
        catalog: &SubjectCatalog,
        options: &ComposeOptions,
        merge_combined: bool,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut order: Vec<&LockedEntry> = locks
            .iter()
            .filter(|l| l.is_active || options.include_inactive_locks)
            .collect();
        order.sort_by(|a, b| {
            a.coord()
                .cmp(&b.coord())
                .then_with(|| a.entry.display_cmp(&b.entry))
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| a.reason.cmp(&b.reason))
        });

        let mut layer = Self::empty(kind);
        for lock in order {
            let head = lock.coord();
            if !slots.contains(head) {
                diagnostics.record(
                    DiagnosticKind::LockOutOfRange,
                    head,
                    lock.id.clone(),
                    format!("{kind:?} lock '{}' is outside the active time slots", lock.id),
                );
                continue;
            }
            if let Some(holder) = layer.cells.get(&head).copied() {
                let rep = &layer.locks[holder.lock];
                if merge_combined
                    && !holder.is_continuation
                    && collapse_key(&rep.entry) == collapse_key(&lock.entry)
                {
                    layer.members[holder.lock].push(lock.clone());
                    continue;
                }
                diagnostics.record(
                    DiagnosticKind::LockConflict,
                    head,
                    lock.id.clone(),
                    format!(
                        "{kind:?} lock '{}' overlaps lock '{}' at {head}",
                        lock.id, layer.locks[holder.lock].id
                    ),
                );
                continue;
            }

            let idx = layer.locks.len();
            layer.locks.push(lock.clone());
            layer.members.push(vec![lock.clone()]);
            layer.cells.insert(
                head,
                LockCell {
                    lock: idx,
                    head,
                    is_continuation: false,
                },
            );

            let size = catalog.block_size(&lock.entry.subject_id, lock.entry.subject_type);
            for offset in 1..size {
                let Some(coord) = head.shifted(offset).filter(|c| slots.contains(*c)) else {
                    diagnostics.record(
                        DiagnosticKind::LockBlockTruncated,
                        head,
                        lock.id.clone(),
                        format!(
                            "{kind:?} lock '{}' needs {size} slots but only {offset} fit from {head}",
                            lock.id
                        ),
                    );
                    break;
                };
                if let Some(holder) = layer.cells.get(&coord) {
                    diagnostics.record(
                        DiagnosticKind::LockConflict,
                        coord,
                        lock.id.clone(),
                        format!(
                            "{kind:?} lock '{}' block runs into lock '{}' at {coord}",
                            lock.id, layer.locks[holder.lock].id
                        ),
                    );
                    break;
                }
                layer.cells.insert(
                    coord,
                    LockCell {
                        lock: idx,
                        head,
                        is_continuation: true,
                    },
                );
            }
        }
        layer
    }

    /// Layer kind.
    pub fn kind(&self) -> LockKind {
        self.kind
    }

    /// The lock claiming a coordinate, if any.
    pub fn lookup(&self, coord: Coord) -> Option<LockHit<'_>> {
        self.cells.get(&coord).map(|c| LockHit {
            lock: &self.locks[c.lock],
            members: &self.members[c.lock],
            head: c.head,
            is_continuation: c.is_continuation,
        })
    }

    /// Locks that were placed (conflicting and out-of-range ones excluded).
    pub fn locks(&self) -> &[LockedEntry] {
        &self.locks
    }

    /// Number of coordinates claimed, continuations included.
    pub fn covered(&self) -> usize {
        self.cells.len()
    }
}

/// Overlay verdict for one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay<'a> {
    /// Authoritative layer.
    pub level: OverlayLevel,
    /// Lock holding the slot (`None` at level `NONE`).
    pub lock: Option<&'a LockedEntry>,
    /// Every lock folded into the holding lock (empty at level `NONE`).
    pub members: &'a [LockedEntry],
    /// First slot of the holding lock's block.
    pub head: Option<Coord>,
    /// Whether the slot is a continuation of a multi-slot block.
    pub is_continuation: bool,
}

impl<'a> Overlay<'a> {
    fn held(level: OverlayLevel, hit: LockHit<'a>) -> Self {
        Self {
            level,
            lock: Some(hit.lock),
            members: hit.members,
            head: Some(hit.head),
            is_continuation: hit.is_continuation,
        }
    }

    /// Verdict for an unlocked coordinate.
    pub fn none() -> Self {
        Self {
            level: OverlayLevel::None,
            lock: None,
            members: &[],
            head: None,
            is_continuation: false,
        }
    }
}

/// Decides which layer owns a coordinate.
///
/// # Example
/// ```
/// use u_timetable::compose::{resolve_overlay, LockKind, LockLayer, OverlayLevel};
/// use u_timetable::models::Coord;
///
/// let fixed = LockLayer::empty(LockKind::Fixed);
/// let special = LockLayer::empty(LockKind::Special);
/// let verdict = resolve_overlay(Coord::new(0, 0), &fixed, &special);
/// assert_eq!(verdict.level, OverlayLevel::None);
/// ```
pub fn resolve_overlay<'a>(coord: Coord, fixed: &'a LockLayer, special: &'a LockLayer) -> Overlay<'a> {
    if let Some(hit) = special.lookup(coord) {
        return Overlay::held(OverlayLevel::Special, hit);
    }
    if let Some(hit) = fixed.lookup(coord) {
        return Overlay::held(OverlayLevel::Fixed, hit);
    }
    Overlay::none()
}
