//! Columnar frames of series data.
//!
//! A [Frame] is the unit of data exchanged with a series store: an ordered
//! set of equal-length named columns. Columns are typed, and timestamps are
//! carried as [i64] epoch seconds.

use serde::Serialize;
use std::collections::BTreeSet;

/// A single typed column of cells.
///
/// Serialises untagged, as a plain JSON array of cells.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Column {
    /// [i64] cells. Timestamp columns use this variant, holding epoch seconds.
    Int(Vec<i64>),
    /// [f64] cells
    Float(Vec<f64>),
    /// UTF-8 string cells
    Str(Vec<String>),
}

impl Column {
    /// Returns the number of cells in the column.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(cells) => cells.len(),
            Self::Float(cells) => cells.len(),
            Self::Str(cells) => cells.len(),
        }
    }

    /// Returns true if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compares each cell against a value supplied as a string, returning one
    /// flag per cell.
    ///
    /// The value is parsed into the column's native type before comparison. A
    /// value that does not parse matches no cells.
    pub fn matches(&self, value: &str) -> Vec<bool> {
        match self {
            Self::Int(cells) => match value.parse::<i64>() {
                Ok(needle) => cells.iter().map(|cell| *cell == needle).collect(),
                Err(_) => vec![false; cells.len()],
            },
            Self::Float(cells) => match value.parse::<f64>() {
                Ok(needle) => cells.iter().map(|cell| *cell == needle).collect(),
                Err(_) => vec![false; cells.len()],
            },
            Self::Str(cells) => cells.iter().map(|cell| cell == value).collect(),
        }
    }

    /// Returns a copy of the cells in `[offset, offset + limit)`, clamped to
    /// the column bounds.
    pub fn slice(&self, offset: usize, limit: usize) -> Self {
        fn window<T: Clone>(cells: &[T], offset: usize, limit: usize) -> Vec<T> {
            let start = offset.min(cells.len());
            let end = start.saturating_add(limit).min(cells.len());
            cells[start..end].to_vec()
        }
        match self {
            Self::Int(cells) => Self::Int(window(cells, offset, limit)),
            Self::Float(cells) => Self::Float(window(cells, offset, limit)),
            Self::Str(cells) => Self::Str(window(cells, offset, limit)),
        }
    }

    /// Returns the cells for which the matching `keep` flag is set.
    pub fn masked(&self, keep: &[bool]) -> Self {
        fn retain<T: Clone>(cells: &[T], keep: &[bool]) -> Vec<T> {
            cells
                .iter()
                .zip(keep)
                .filter_map(|(cell, keep)| keep.then(|| cell.clone()))
                .collect()
        }
        match self {
            Self::Int(cells) => Self::Int(retain(cells, keep)),
            Self::Float(cells) => Self::Float(retain(cells, keep)),
            Self::Str(cells) => Self::Str(retain(cells, keep)),
        }
    }

    /// Returns the distinct cell values, sorted, rendered as strings.
    ///
    /// Used to populate filter drop-downs for categorical index columns.
    pub fn distinct_sorted(&self) -> Vec<String> {
        match self {
            Self::Int(cells) => {
                let distinct: BTreeSet<&i64> = cells.iter().collect();
                distinct.into_iter().map(ToString::to_string).collect()
            }
            Self::Float(cells) => {
                let mut distinct = cells.clone();
                distinct.sort_by(f64::total_cmp);
                distinct.dedup();
                distinct.into_iter().map(|cell| cell.to_string()).collect()
            }
            Self::Str(cells) => {
                let distinct: BTreeSet<&String> = cells.iter().collect();
                distinct.into_iter().cloned().collect()
            }
        }
    }
}

/// An ordered collection of equal-length named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    columns: Vec<(String, Column)>,
}

impl Frame {
    /// Returns an empty Frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named column, consuming and returning the frame.
    ///
    /// All columns in a frame must have the same length.
    pub fn with_column(mut self, name: &str, column: Column) -> Self {
        debug_assert!(
            self.columns.is_empty() || self.len() == column.len(),
            "frame columns must have equal lengths"
        );
        self.columns.push((name.to_string(), column));
        self
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, column)| column.len())
    }

    /// Returns true if the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the column with the given name, if present.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(column_name, _)| column_name == name)
            .map(|(_, column)| column)
    }

    /// Returns the column names in frame order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the named columns in frame order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns
            .iter()
            .map(|(name, column)| (name.as_str(), column))
    }

    /// Returns a new frame keeping only the rows for which the matching
    /// `keep` flag is set.
    pub fn masked(&self, keep: &[bool]) -> Self {
        debug_assert_eq!(keep.len(), self.len(), "mask length must match row count");
        Self {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.masked(keep)))
                .collect(),
        }
    }

    /// Returns a new frame keeping only the rows in `[offset, offset + limit)`.
    pub fn slice(&self, offset: usize, limit: usize) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.slice(offset, limit)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new()
            .with_column("date", Column::Int(vec![1, 2, 3]))
            .with_column("region", Column::Str(vec!["EU".into(), "US".into(), "EU".into()]))
            .with_column("revenue", Column::Float(vec![10.0, 20.0, 30.0]))
    }

    #[test]
    fn test_len_and_names() {
        let frame = frame();
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
        let names: Vec<&str> = frame.names().collect();
        assert_eq!(names, vec!["date", "region", "revenue"]);
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new();
        assert_eq!(frame.len(), 0);
        assert!(frame.is_empty());
        assert!(frame.get("date").is_none());
    }

    #[test]
    fn test_get() {
        let frame = frame();
        assert_eq!(frame.get("date"), Some(&Column::Int(vec![1, 2, 3])));
        assert!(frame.get("missing").is_none());
    }

    #[test]
    fn test_matches_str() {
        let column = Column::Str(vec!["EU".into(), "US".into(), "EU".into()]);
        assert_eq!(column.matches("EU"), vec![true, false, true]);
        assert_eq!(column.matches("APAC"), vec![false, false, false]);
    }

    #[test]
    fn test_matches_int() {
        let column = Column::Int(vec![1, 2, 1]);
        assert_eq!(column.matches("1"), vec![true, false, true]);
    }

    #[test]
    fn test_matches_float() {
        let column = Column::Float(vec![1.5, 2.5]);
        assert_eq!(column.matches("2.5"), vec![false, true]);
    }

    #[test]
    fn test_matches_unparseable_value() {
        let column = Column::Int(vec![1, 2, 3]);
        assert_eq!(column.matches("EU"), vec![false, false, false]);
    }

    #[test]
    fn test_masked() {
        let masked = frame().masked(&[true, false, true]);
        assert_eq!(masked.len(), 2);
        assert_eq!(masked.get("date"), Some(&Column::Int(vec![1, 3])));
        assert_eq!(
            masked.get("region"),
            Some(&Column::Str(vec!["EU".into(), "EU".into()]))
        );
        assert_eq!(masked.get("revenue"), Some(&Column::Float(vec![10.0, 30.0])));
    }

    #[test]
    fn test_slice() {
        let sliced = frame().slice(1, 1);
        assert_eq!(sliced.len(), 1);
        assert_eq!(sliced.get("date"), Some(&Column::Int(vec![2])));
    }

    #[test]
    fn test_slice_clamps_to_bounds() {
        assert_eq!(frame().slice(2, 10).len(), 1);
        assert_eq!(frame().slice(10, 10).len(), 0);
    }

    #[test]
    fn test_distinct_sorted() {
        let column = Column::Str(vec!["US".into(), "EU".into(), "US".into()]);
        assert_eq!(column.distinct_sorted(), vec!["EU", "US"]);
        let column = Column::Int(vec![3, 1, 3, 2]);
        assert_eq!(column.distinct_sorted(), vec!["1", "2", "3"]);
    }
}
