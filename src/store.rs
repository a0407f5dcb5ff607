//! Interface to an external time series store.
//!
//! The dashboard is stateless: all series data lives in a store reached
//! through the [Store] trait. Series are grouped into collections, and a
//! fully qualified series label is `<collection>/<series>`. Reads are shaped
//! by the caller (column selection, pagination, time bounds) and return
//! columnar [Frame](crate::frame::Frame)s.

pub mod memory;

use crate::frame::Frame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryStore;

/// Kind of an index column.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Epoch seconds. The first timestamp column of a schema acts as the
    /// series' time dimension.
    Timestamp,
    /// Integer categories
    Integer,
    /// String categories
    Str,
}

/// Kind of a value column.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// [i64] measurements
    Int,
    /// [f64] measurements
    Float,
}

/// An index column: part of a series' row identity and sort order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IndexColumn {
    /// Column name
    pub name: String,
    /// Column kind
    pub kind: IndexKind,
}

/// A value column: a measurement attached to each row.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ValueColumn {
    /// Column name
    pub name: String,
    /// Column kind
    pub kind: ValueKind,
}

/// The shape of a series: its index columns, in sort order, and its value
/// columns.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Schema {
    /// Index columns, outermost first
    pub index: Vec<IndexColumn>,
    /// Value columns
    pub values: Vec<ValueColumn>,
}

impl Schema {
    /// Returns true if the series is indexed by more than one column.
    pub fn is_multi_index(&self) -> bool {
        self.index.len() > 1
    }

    /// Returns true if the schema defines an index or value column with the
    /// given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.index.iter().any(|column| column.name == name)
            || self.values.iter().any(|column| column.name == name)
    }

    /// Returns the value column names in schema order.
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|column| column.name.as_str())
    }
}

/// A shaped read against a single series.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadRequest {
    /// Columns to materialise, in response order
    pub columns: Vec<String>,
    /// Number of leading rows to skip
    pub offset: usize,
    /// Maximum number of rows to return
    pub limit: usize,
    /// Lower time bound, inclusive. Uninterpreted by the caller; the store
    /// owns its format.
    pub start: Option<String>,
    /// Upper time bound, exclusive. Uninterpreted by the caller.
    pub stop: Option<String>,
}

/// A search hit: a fully qualified series label together with its schema.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesMatch {
    /// Fully qualified series label
    pub label: String,
    /// Schema of the matching series
    pub schema: Schema,
}

/// Errors arising from store access.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Collection does not exist
    #[error("collection {0} not found")]
    CollectionNotFound(String),

    /// Series does not exist
    #[error("series {0} not found")]
    SeriesNotFound(String),

    /// A requested column is not part of the series
    #[error("series {label} has no column {column}")]
    UnknownColumn {
        /// Fully qualified series label
        label: String,
        /// The offending column name
        column: String,
    },

    /// Series label is not of the form `<collection>/<series>`
    #[error("series label {0} is not of the form collection/series")]
    InvalidLabel(String),

    /// A time bound could not be interpreted by the store
    #[error("invalid time bound {0}")]
    InvalidBound(String),

    /// Series data does not match its schema
    #[error("invalid data for series {label}: {reason}")]
    InvalidData {
        /// Fully qualified series label
        label: String,
        /// What was wrong with the data
        reason: String,
    },

    /// Error reading a seed file
    #[error("failed to read series seed data from {path}")]
    SeedRead {
        /// Path of the seed file
        path: String,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a seed file
    #[error("failed to parse series seed data")]
    SeedParse(#[from] serde_json::Error),
}

/// Interface to a time series store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns all collection names, sorted.
    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;

    /// Returns the series names within a collection, sorted.
    async fn list_series(&self, collection: &str) -> Result<Vec<String>, StoreError>;

    /// Returns a handle to the series with the given fully qualified label.
    async fn get_series(&self, label: &str) -> Result<Box<dyn Series>, StoreError>;

    /// Returns the series whose fully qualified labels start with the given
    /// prefix. An empty prefix matches every series.
    async fn search(&self, prefix: &str) -> Result<Vec<SeriesMatch>, StoreError>;
}

/// A handle to a single series.
#[async_trait]
pub trait Series: Send + Sync + std::fmt::Debug {
    /// Returns the fully qualified series label.
    fn label(&self) -> &str;

    /// Returns the series schema.
    fn schema(&self) -> &Schema;

    /// Reads a window of rows.
    ///
    /// Columns are returned in request order. Time bounds are applied before
    /// `offset` and `limit`.
    async fn read(&self, request: &ReadRequest) -> Result<Frame, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema {
            index: vec![
                IndexColumn {
                    name: "date".to_string(),
                    kind: IndexKind::Timestamp,
                },
                IndexColumn {
                    name: "region".to_string(),
                    kind: IndexKind::Str,
                },
            ],
            values: vec![ValueColumn {
                name: "revenue".to_string(),
                kind: ValueKind::Int,
            }],
        }
    }

    #[test]
    fn test_is_multi_index() {
        assert!(schema().is_multi_index());
        let mut single = schema();
        single.index.truncate(1);
        assert!(!single.is_multi_index());
    }

    #[test]
    fn test_has_column() {
        let schema = schema();
        assert!(schema.has_column("date"));
        assert!(schema.has_column("region"));
        assert!(schema.has_column("revenue"));
        assert!(!schema.has_column("margin"));
    }

    #[test]
    fn test_value_names() {
        let schema = schema();
        let names: Vec<&str> = schema.value_names().collect();
        assert_eq!(names, vec!["revenue"]);
    }

    #[test]
    fn test_schema_from_json() {
        let json = r#"{
            "index": [
                {"name": "date", "kind": "timestamp"},
                {"name": "region", "kind": "str"}
            ],
            "values": [{"name": "revenue", "kind": "int"}]
        }"#;
        let parsed = serde_json::from_str::<Schema>(json).unwrap();
        assert_eq!(parsed, schema());
    }

    #[test]
    fn test_schema_rejects_unknown_kind() {
        let json = r#"{"index": [{"name": "date", "kind": "datetime"}], "values": []}"#;
        assert!(serde_json::from_str::<Schema>(json).is_err());
    }
}
