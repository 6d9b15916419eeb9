//! Strict input validation for composition inputs.
//!
//! Composition itself never rejects input; it degrades cells and reports
//! diagnostics. Callers that prefer to refuse bad data upstream run
//! [`validate_input`] first. Detects:
//! - Duplicate or malformed time slots
//! - Entries outside the active time slots
//! - Duplicate or zero-sized subject metadata
//! - Sections double-booked outside an elective block
//! - Combined classes whose members disagree on teacher or time

use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::models::{Coord, ScheduleEntry, SlotSet, SubjectMeta, TimeSlot};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two time slots share a coordinate.
    DuplicateTimeSlot,
    /// Day of week outside 0..=6.
    InvalidDay,
    /// Time not in `HH:MM` or `HH:MM:SS` form.
    InvalidTimeFormat,
    /// Start time not before end time.
    InvalidTimeRange,
    /// An entry sits outside the active time slots.
    EntryOutOfRange,
    /// Two metadata records for one subject.
    DuplicateSubject,
    /// A subject declares a zero-slot lab block.
    ZeroLabBlockSize,
    /// A section holds two non-elective entries at one coordinate.
    SectionDoubleBooked,
    /// Members of a combined class disagree on teacher or time.
    CombinedClassMismatch,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates composition inputs.
///
/// Checks:
/// 1. Time slots: unique coordinates, day in 0..=6, well-formed increasing times
/// 2. Entries lie on an active time slot
/// 3. Subject metadata: unique ids, non-zero lab block size
/// 4. A section has at most one non-elective entry per coordinate
/// 5. Entries of one combined session agree on teacher and times
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    time_slots: &[TimeSlot],
    entries: &[ScheduleEntry],
    subjects: &[SubjectMeta],
) -> ValidationResult {
    let mut errors = Vec::new();

    check_time_slots(time_slots, &mut errors);

    let slots = SlotSet::from_slots(time_slots);
    for e in entries {
        if !slots.contains(e.coord()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::EntryOutOfRange,
                format!(
                    "Entry {}/{} at {} is outside the active time slots",
                    e.section_code,
                    e.subject_code,
                    e.coord()
                ),
            ));
        }
    }

    let mut subject_ids = HashSet::new();
    for s in subjects {
        if !subject_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSubject,
                format!("Duplicate subject metadata: {}", s.id),
            ));
        }
        if s.lab_block_size_slots == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroLabBlockSize,
                format!("Subject {} has a zero-slot lab block", s.id),
            ));
        }
    }

    check_double_booking(entries, &mut errors);
    check_combined_classes(entries, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_time_slots(time_slots: &[TimeSlot], errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for ts in time_slots {
        let coord = ts.coord();
        if !seen.insert(coord) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateTimeSlot,
                format!("Duplicate time slot at {coord}"),
            ));
        }
        if ts.day_of_week > 6 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDay,
                format!("Day {} is outside 0..=6", ts.day_of_week),
            ));
        }

        let start = parse_time(&ts.start_time);
        let end = parse_time(&ts.end_time);
        for (raw, parsed) in [(&ts.start_time, start), (&ts.end_time, end)] {
            if parsed.is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeFormat,
                    format!("Time slot {coord} has malformed time '{raw}'"),
                ));
            }
        }
        if let (Some(s), Some(e)) = (start, end) {
            if s >= e {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeRange,
                    format!(
                        "Time slot {coord} starts at {} but ends at {}",
                        ts.start_time, ts.end_time
                    ),
                ));
            }
        }
    }
}

fn check_double_booking(entries: &[ScheduleEntry], errors: &mut Vec<ValidationError>) {
    let mut counts: BTreeMap<(&str, Coord), usize> = BTreeMap::new();
    for e in entries {
        if e.elective_block_id.as_deref().is_some_and(|b| !b.is_empty()) {
            continue;
        }
        *counts.entry((e.section_id.as_str(), e.coord())).or_default() += 1;
    }
    for ((section, coord), n) in counts {
        if n > 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::SectionDoubleBooked,
                format!("Section {section} has {n} non-elective entries at {coord}"),
            ));
        }
    }
}

type SessionKey<'a> = (Coord, &'a str, &'a str, u32, &'a str);

fn check_combined_classes(entries: &[ScheduleEntry], errors: &mut Vec<ValidationError>) {
    let mut sessions: BTreeMap<SessionKey<'_>, Vec<&ScheduleEntry>> = BTreeMap::new();
    for e in entries {
        let key = (
            e.coord(),
            e.subject_code.as_str(),
            e.room_code.as_str(),
            e.academic_year_number,
            e.elective_block_id.as_deref().unwrap_or(""),
        );
        sessions.entry(key).or_default().push(e);
    }

    for ((coord, subject, room, _, _), members) in sessions {
        let Some((first, rest)) = members.split_first() else {
            continue;
        };
        let mismatch = rest.iter().any(|m| {
            m.teacher_id != first.teacher_id
                || m.start_time != first.start_time
                || m.end_time != first.end_time
        });
        if mismatch {
            errors.push(ValidationError::new(
                ValidationErrorKind::CombinedClassMismatch,
                format!("Combined session {subject} in {room} at {coord} has members with different teacher or times"),
            ));
        }
    }
}

/// Parses `HH:MM` or `HH:MM:SS` into seconds since midnight.
fn parse_time(raw: &str) -> Option<u32> {
    let mut parts = raw.split(':');
    let h: u32 = parse_field(parts.next()?)?;
    let m: u32 = parse_field(parts.next()?)?;
    let s: u32 = match parts.next() {
        Some(p) => parse_field(p)?,
        None => 0,
    };
    if parts.next().is_some() || h > 23 || m > 59 || s > 59 {
        return None;
    }
    Some(h * 3600 + m * 60 + s)
}

fn parse_field(p: &str) -> Option<u32> {
    if p.len() != 2 || !p.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    p.parse().ok()
}
