//! Composition diagnostics.
//!
//! Composition never fails. Inputs that cannot be rendered as given
//! degrade the affected cell and leave a [`Diagnostic`] behind, which is
//! also emitted as a `tracing` event.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Coord;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected situation worth surfacing (e.g. a solver entry under a lock).
    Info,
    /// Inconsistent input; the rendered cell is degraded.
    Warning,
}

/// Classification of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A regular entry sits outside the active time slots and was dropped.
    EntryOutOfRange,
    /// A lock's first slot is outside the active time slots; the lock was dropped.
    LockOutOfRange,
    /// Two locks of one layer claim the same slot; the later one was dropped.
    LockConflict,
    /// A lab lock's block runs past the day's active slots and was cut short.
    LockBlockTruncated,
    /// A regular entry is hidden beneath a lock.
    EntryShadowed,
}

impl DiagnosticKind {
    /// Default severity of this kind.
    pub fn severity(self) -> Severity {
        match self {
            Self::EntryShadowed => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// A degraded-cell record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What happened.
    pub kind: DiagnosticKind,
    /// Severity.
    pub severity: Severity,
    /// Affected coordinate.
    pub coord: Coord,
    /// Offending entity (lock id or entry label).
    pub entity: String,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic with the kind's default severity.
    pub fn new(
        kind: DiagnosticKind,
        coord: Coord,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            coord,
            entity: entity.into(),
            message: message.into(),
        }
    }
}

/// Collects diagnostics for one composition pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic and emits it as a tracing event.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => warn!(
                kind = ?diagnostic.kind,
                day = diagnostic.coord.day,
                slot = diagnostic.coord.slot,
                entity = %diagnostic.entity,
                "{}",
                diagnostic.message
            ),
            Severity::Info => debug!(
                kind = ?diagnostic.kind,
                day = diagnostic.coord.day,
                slot = diagnostic.coord.slot,
                entity = %diagnostic.entity,
                "{}",
                diagnostic.message
            ),
        }
        self.items.push(diagnostic);
    }

    /// Shorthand for [`push`](Self::push) with [`Diagnostic::new`].
    pub fn record(
        &mut self,
        kind: DiagnosticKind,
        coord: Coord,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::new(kind, coord, entity, message));
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Recorded diagnostics of a given kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    /// Consumes the collector.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
