//! Sort specification and the header click cycle.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Sort direction for ordering rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the wire form, `"asc"` or `"desc"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether header clicks build a multi-key sort or replace a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Only one column sorts at a time.
    Single,
    /// Columns accumulate in click order; the first is the primary key.
    #[default]
    Multi,
}

/// An ordered list of `(field, direction)` sort keys.
///
/// The first entry is the primary key. A field appears at most once.
///
/// # Example
///
/// ```
/// use edittable_lib::query::{Direction, SortMode, SortSpec};
///
/// let mut sort = SortSpec::new();
/// sort.cycle("name", SortMode::Multi);
/// sort.cycle("status", SortMode::Multi);
/// sort.cycle("name", SortMode::Multi);
///
/// assert_eq!(sort.direction_of("name"), Some(Direction::Desc));
/// assert_eq!(sort.priority_of("status"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    keys: Vec<(String, Direction)>,
}

impl SortSpec {
    /// Creates an empty sort specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key with the lowest priority, replacing any existing entry for
    /// the same field.
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        let field = field.into();
        self.keys.retain(|(f, _)| *f != field);
        self.keys.push((field, direction));
        self
    }

    /// Advances `field` through none → asc → desc → none.
    ///
    /// Returns the field's direction after the click, `None` when it was
    /// removed.
    pub fn cycle(&mut self, field: &str, mode: SortMode) -> Option<Direction> {
        let position = self.keys.iter().position(|(f, _)| f == field);

        match (mode, position) {
            (_, Some(index)) => match self.keys[index].1 {
                Direction::Asc => {
                    self.keys[index].1 = Direction::Desc;
                    Some(Direction::Desc)
                }
                Direction::Desc => {
                    self.keys.remove(index);
                    None
                }
            },
            (SortMode::Single, None) => {
                self.keys.clear();
                self.keys.push((field.to_string(), Direction::Asc));
                Some(Direction::Asc)
            }
            (SortMode::Multi, None) => {
                self.keys.push((field.to_string(), Direction::Asc));
                Some(Direction::Asc)
            }
        }
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Returns the direction `field` is sorted in, if any.
    pub fn direction_of(&self, field: &str) -> Option<Direction> {
        self.keys.iter().find(|(f, _)| f == field).map(|(_, d)| *d)
    }

    /// Returns the 0-based priority of `field`, if it is sorted.
    pub fn priority_of(&self, field: &str) -> Option<usize> {
        self.keys.iter().position(|(f, _)| f == field)
    }

    /// Returns the keys in priority order.
    pub fn keys(&self) -> &[(String, Direction)] {
        &self.keys
    }

    /// Returns the sorted field names in priority order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|(f, _)| f.as_str())
    }

    /// Returns the directions in priority order.
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.keys.iter().map(|(_, d)| *d)
    }

    /// Returns `true` if nothing is sorted.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the number of sort keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_single_field_repeats() {
        let mut sort = SortSpec::new();
        let expected = [Some(Direction::Asc), Some(Direction::Desc), None];
        for round in 0..3 {
            for want in expected {
                assert_eq!(sort.cycle("name", SortMode::Multi), want, "round {}", round);
                assert_eq!(sort.direction_of("name"), want);
            }
            assert!(sort.is_empty());
        }
    }

    #[test]
    fn test_multi_appends_and_removes_preserving_order() {
        let mut sort = SortSpec::new();
        sort.cycle("a", SortMode::Multi);
        sort.cycle("b", SortMode::Multi);
        sort.cycle("c", SortMode::Multi);
        sort.cycle("b", SortMode::Multi);
        assert_eq!(sort.fields().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(sort.direction_of("b"), Some(Direction::Desc));

        sort.cycle("b", SortMode::Multi);
        assert_eq!(sort.fields().collect::<Vec<_>>(), ["a", "c"]);
        assert_eq!(sort.priority_of("c"), Some(1));
    }

    #[test]
    fn test_single_mode_replaces() {
        let mut sort = SortSpec::new();
        sort.cycle("a", SortMode::Single);
        sort.cycle("a", SortMode::Single);
        assert_eq!(sort.cycle("b", SortMode::Single), Some(Direction::Asc));
        assert_eq!(sort.keys(), [("b".to_string(), Direction::Asc)]);
    }

    #[test]
    fn test_then_keeps_fields_unique() {
        let sort = SortSpec::new()
            .then("a", Direction::Asc)
            .then("b", Direction::Desc)
            .then("a", Direction::Desc);
        assert_eq!(sort.fields().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(sort.directions().collect::<Vec<_>>(), [Direction::Desc, Direction::Desc]);
    }
}
