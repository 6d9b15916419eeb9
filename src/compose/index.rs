//! Coordinate index over flat entry lists.

use std::collections::BTreeMap;

use super::GridItem;
use crate::models::Coord;

/// Entries grouped by grid coordinate.
///
/// Within a coordinate, entries are kept in [`GridItem::display_cmp`]
/// order. Nothing is dropped or deduplicated here.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryIndex<E> {
    cells: BTreeMap<Coord, Vec<E>>,
}

impl<E> Default for EntryIndex<E> {
    fn default() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }
}

/// Indexes entries by `(day, slot)`.
///
/// # Example
/// ```
/// use u_timetable::compose::index_entries;
/// use u_timetable::models::{Coord, ScheduleEntry, SubjectType};
///
/// let entries = vec![
///     ScheduleEntry::new(0, 1).with_subject("b", "CS102", SubjectType::Theory),
///     ScheduleEntry::new(0, 1).with_subject("a", "CS101", SubjectType::Theory),
/// ];
/// let index = index_entries(entries);
/// let cell = index.get(Coord::new(0, 1));
/// assert_eq!(cell[0].subject_code, "CS101");
/// ```
pub fn index_entries<E, I>(entries: I) -> EntryIndex<E>
where
    E: GridItem,
    I: IntoIterator<Item = E>,
{
    let mut cells: BTreeMap<Coord, Vec<E>> = BTreeMap::new();
    for e in entries {
        cells.entry(e.coord()).or_default().push(e);
    }
    for list in cells.values_mut() {
        list.sort_by(E::display_cmp);
    }
    EntryIndex { cells }
}

impl<E: GridItem> EntryIndex<E> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries at a coordinate (empty slice if none).
    pub fn get(&self, coord: Coord) -> &[E] {
        self.cells.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes and returns the entries at a coordinate.
    pub fn take(&mut self, coord: Coord) -> Vec<E> {
        self.cells.remove(&coord).unwrap_or_default()
    }

    /// Occupied coordinates, ascending.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.keys().copied()
    }

    /// Iterates `(coord, entries)` in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &[E])> + '_ {
        self.cells.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Number of occupied coordinates.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no coordinate is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total number of entries across all coordinates.
    pub fn entry_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Consumes the index into its coordinate map.
    pub fn into_cells(self) -> BTreeMap<Coord, Vec<E>> {
        self.cells
    }
}
