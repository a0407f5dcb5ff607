//! In-memory series store.
//!
//! Holds whole series in columnar form, seeded from a JSON file at startup.
//! Suitable for development and testing; production deployments provide a
//! [Store] implementation backed by a real columnar store.

use crate::frame::{Column, Frame};
use crate::store::{
    IndexKind, ReadRequest, Schema, Series, SeriesMatch, Store, StoreError, ValueKind,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use serde::Deserialize;

/// Seed file layout: collections of series, each carrying a schema and one
/// cell array per column.
#[derive(Debug, Deserialize)]
struct SeedFile {
    collections: BTreeMap<String, BTreeMap<String, SeedSeries>>,
}

#[derive(Debug, Deserialize)]
struct SeedSeries {
    schema: Schema,
    columns: BTreeMap<String, Vec<serde_json::Value>>,
}

/// A fully materialised series: schema plus all rows, sorted by the index
/// columns.
#[derive(Debug)]
struct SeriesData {
    label: String,
    schema: Schema,
    frame: Frame,
}

/// In-memory [Store] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, BTreeMap<String, Arc<SeriesData>>>,
}

impl MemoryStore {
    /// Returns an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads seed data from a JSON file.
    pub fn from_path(path: &str) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::SeedRead {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Loads seed data from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        let seed: SeedFile = serde_json::from_str(raw)?;
        let mut store = Self::new();
        for (collection, series) in seed.collections {
            for (name, data) in series {
                let label = format!("{}/{}", collection, name);
                let frame = build_frame(&label, &data)?;
                store.insert(&collection, &name, data.schema, frame)?;
            }
        }
        Ok(store)
    }

    /// Adds a series, sorting its rows by the schema's index columns.
    ///
    /// The frame must contain every schema column, with equal lengths.
    pub fn insert(
        &mut self,
        collection: &str,
        series: &str,
        schema: Schema,
        frame: Frame,
    ) -> Result<(), StoreError> {
        let label = format!("{}/{}", collection, series);
        for name in schema
            .index
            .iter()
            .map(|column| &column.name)
            .chain(schema.values.iter().map(|column| &column.name))
        {
            if frame.get(name).is_none() {
                return Err(StoreError::InvalidData {
                    label,
                    reason: format!("missing column {}", name),
                });
            }
        }
        let frame = sort_by_index(&schema, &frame);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(
                series.to_string(),
                Arc::new(SeriesData {
                    label,
                    schema,
                    frame,
                }),
            );
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.collections.keys().cloned().collect())
    }

    async fn list_series(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let series = self
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;
        Ok(series.keys().cloned().collect())
    }

    async fn get_series(&self, label: &str) -> Result<Box<dyn Series>, StoreError> {
        let (collection, series) = label
            .split_once('/')
            .ok_or_else(|| StoreError::InvalidLabel(label.to_string()))?;
        let data = self
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?
            .get(series)
            .ok_or_else(|| StoreError::SeriesNotFound(label.to_string()))?;
        Ok(Box::new(MemorySeries {
            data: Arc::clone(data),
        }))
    }

    async fn search(&self, prefix: &str) -> Result<Vec<SeriesMatch>, StoreError> {
        let mut matches = Vec::new();
        for (collection, series) in &self.collections {
            for (name, data) in series {
                let label = format!("{}/{}", collection, name);
                if label.starts_with(prefix) {
                    matches.push(SeriesMatch {
                        label,
                        schema: data.schema.clone(),
                    });
                }
            }
        }
        Ok(matches)
    }
}

/// Handle to a series held by a [MemoryStore].
#[derive(Debug)]
pub struct MemorySeries {
    data: Arc<SeriesData>,
}

#[async_trait]
impl Series for MemorySeries {
    fn label(&self) -> &str {
        &self.data.label
    }

    fn schema(&self) -> &Schema {
        &self.data.schema
    }

    async fn read(&self, request: &ReadRequest) -> Result<Frame, StoreError> {
        for column in &request.columns {
            if self.data.frame.get(column).is_none() {
                return Err(StoreError::UnknownColumn {
                    label: self.data.label.clone(),
                    column: column.clone(),
                });
            }
        }
        let frame = self.bounded(request)?;
        let frame = frame.slice(request.offset, request.limit);
        let mut selected = Frame::new();
        for column in &request.columns {
            if let Some(cells) = frame.get(column) {
                selected = selected.with_column(column, cells.clone());
            }
        }
        Ok(selected)
    }
}

impl MemorySeries {
    /// Applies the request's time bounds: start is inclusive, stop exclusive.
    ///
    /// Bounds only have meaning for series with a timestamp index column;
    /// otherwise they are ignored.
    fn bounded(&self, request: &ReadRequest) -> Result<Frame, StoreError> {
        let frame = &self.data.frame;
        if request.start.is_none() && request.stop.is_none() {
            return Ok(frame.clone());
        }
        let time_column = self
            .data
            .schema
            .index
            .iter()
            .find(|column| column.kind == IndexKind::Timestamp);
        let Some(time_column) = time_column else {
            return Ok(frame.clone());
        };
        let start = request.start.as_deref().map(parse_bound).transpose()?;
        let stop = request.stop.as_deref().map(parse_bound).transpose()?;
        let Some(Column::Int(times)) = frame.get(&time_column.name) else {
            return Ok(frame.clone());
        };
        let keep: Vec<bool> = times
            .iter()
            .map(|&time| {
                start.map_or(true, |start| time >= start) && stop.map_or(true, |stop| time < stop)
            })
            .collect();
        Ok(frame.masked(&keep))
    }
}

/// Parses a time bound: epoch seconds, or an RFC 3339 timestamp.
fn parse_bound(bound: &str) -> Result<i64, StoreError> {
    if let Ok(seconds) = bound.parse::<i64>() {
        return Ok(seconds);
    }
    OffsetDateTime::parse(bound, &Rfc3339)
        .map(|timestamp| timestamp.unix_timestamp())
        .map_err(|_| StoreError::InvalidBound(bound.to_string()))
}

/// Builds a typed frame from raw seed cells, coercing each column to the
/// kind its schema declares.
fn build_frame(label: &str, data: &SeedSeries) -> Result<Frame, StoreError> {
    let mut columns: Vec<(String, Column)> = Vec::new();
    for column in &data.schema.index {
        let cells = seed_cells(label, &data.columns, &column.name)?;
        let typed = match column.kind {
            IndexKind::Timestamp | IndexKind::Integer => {
                Column::Int(int_cells(label, &column.name, cells)?)
            }
            IndexKind::Str => Column::Str(str_cells(label, &column.name, cells)?),
        };
        columns.push((column.name.clone(), typed));
    }
    for column in &data.schema.values {
        let cells = seed_cells(label, &data.columns, &column.name)?;
        let typed = match column.kind {
            ValueKind::Int => Column::Int(int_cells(label, &column.name, cells)?),
            ValueKind::Float => Column::Float(float_cells(label, &column.name, cells)?),
        };
        columns.push((column.name.clone(), typed));
    }
    let rows = columns.first().map_or(0, |(_, column)| column.len());
    if columns.iter().any(|(_, column)| column.len() != rows) {
        return Err(StoreError::InvalidData {
            label: label.to_string(),
            reason: "column lengths differ".to_string(),
        });
    }
    let mut frame = Frame::new();
    for (name, column) in columns {
        frame = frame.with_column(&name, column);
    }
    Ok(frame)
}

fn seed_cells<'a>(
    label: &str,
    columns: &'a BTreeMap<String, Vec<serde_json::Value>>,
    name: &str,
) -> Result<&'a [serde_json::Value], StoreError> {
    columns
        .get(name)
        .map(Vec::as_slice)
        .ok_or_else(|| StoreError::InvalidData {
            label: label.to_string(),
            reason: format!("missing column {}", name),
        })
}

fn int_cells(label: &str, name: &str, cells: &[serde_json::Value]) -> Result<Vec<i64>, StoreError> {
    cells
        .iter()
        .map(|cell| cell.as_i64().ok_or_else(|| cell_error(label, name, "integer")))
        .collect()
}

fn float_cells(
    label: &str,
    name: &str,
    cells: &[serde_json::Value],
) -> Result<Vec<f64>, StoreError> {
    cells
        .iter()
        .map(|cell| cell.as_f64().ok_or_else(|| cell_error(label, name, "number")))
        .collect()
}

fn str_cells(
    label: &str,
    name: &str,
    cells: &[serde_json::Value],
) -> Result<Vec<String>, StoreError> {
    cells
        .iter()
        .map(|cell| {
            cell.as_str()
                .map(ToString::to_string)
                .ok_or_else(|| cell_error(label, name, "string"))
        })
        .collect()
}

fn cell_error(label: &str, name: &str, expected: &str) -> StoreError {
    StoreError::InvalidData {
        label: label.to_string(),
        reason: format!("column {} contains a non-{} cell", name, expected),
    }
}

/// Sorts a frame's rows by the schema's index columns, outermost first.
fn sort_by_index(schema: &Schema, frame: &Frame) -> Frame {
    let index_columns: Vec<&Column> = schema
        .index
        .iter()
        .filter_map(|column| frame.get(&column.name))
        .collect();
    let mut order: Vec<usize> = (0..frame.len()).collect();
    order.sort_by(|&a, &b| {
        for column in &index_columns {
            let ordering = compare_cells(column, a, b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    let mut sorted = Frame::new();
    for (name, column) in frame.columns() {
        let permuted = match column {
            Column::Int(cells) => Column::Int(order.iter().map(|&row| cells[row]).collect()),
            Column::Float(cells) => Column::Float(order.iter().map(|&row| cells[row]).collect()),
            Column::Str(cells) => {
                Column::Str(order.iter().map(|&row| cells[row].clone()).collect())
            }
        };
        sorted = sorted.with_column(name, permuted);
    }
    sorted
}

fn compare_cells(column: &Column, a: usize, b: usize) -> Ordering {
    match column {
        Column::Int(cells) => cells[a].cmp(&cells[b]),
        Column::Float(cells) => cells[a].total_cmp(&cells[b]),
        Column::Str(cells) => cells[a].cmp(&cells[b]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"{
        "collections": {
            "sales": {
                "eu": {
                    "schema": {
                        "index": [
                            {"name": "date", "kind": "timestamp"},
                            {"name": "region", "kind": "str"}
                        ],
                        "values": [{"name": "revenue", "kind": "int"}]
                    },
                    "columns": {
                        "date": [1704153600, 1704067200, 1704067200],
                        "region": ["EU", "EU", "US"],
                        "revenue": [30, 100, 50]
                    }
                },
                "apac": {
                    "schema": {
                        "index": [{"name": "date", "kind": "timestamp"}],
                        "values": [{"name": "revenue", "kind": "float"}]
                    },
                    "columns": {
                        "date": [1704067200, 1704153600],
                        "revenue": [7.5, 9.25]
                    }
                }
            },
            "ops": {
                "deploys": {
                    "schema": {
                        "index": [{"name": "build", "kind": "integer"}],
                        "values": [{"name": "duration", "kind": "int"}]
                    },
                    "columns": {
                        "build": [2, 1],
                        "duration": [60, 45]
                    }
                }
            }
        }
    }"#;

    fn store() -> MemoryStore {
        MemoryStore::from_json(SEED).unwrap()
    }

    async fn read_all(label: &str, columns: &[&str]) -> Frame {
        let request = ReadRequest {
            columns: columns.iter().map(ToString::to_string).collect(),
            offset: 0,
            limit: 100,
            start: None,
            stop: None,
        };
        read(label, &request).await
    }

    async fn read(label: &str, request: &ReadRequest) -> Frame {
        let store = store();
        let series = store.get_series(label).await.unwrap();
        series.read(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_list_collections() {
        let collections = store().list_collections().await.unwrap();
        assert_eq!(collections, vec!["ops", "sales"]);
    }

    #[tokio::test]
    async fn test_list_series() {
        let series = store().list_series("sales").await.unwrap();
        assert_eq!(series, vec!["apac", "eu"]);
    }

    #[tokio::test]
    async fn test_list_series_unknown_collection() {
        let error = store().list_series("marketing").await.unwrap_err();
        assert!(matches!(error, StoreError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_series_unknown() {
        let error = store().get_series("sales/latam").await.unwrap_err();
        assert!(matches!(error, StoreError::SeriesNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_series_invalid_label() {
        let error = store().get_series("sales").await.unwrap_err();
        assert!(matches!(error, StoreError::InvalidLabel(_)));
    }

    #[tokio::test]
    async fn test_search_all() {
        let matches = store().search("").await.unwrap();
        let labels: Vec<&str> = matches.iter().map(|hit| hit.label.as_str()).collect();
        assert_eq!(labels, vec!["ops/deploys", "sales/apac", "sales/eu"]);
    }

    #[tokio::test]
    async fn test_search_prefix() {
        let matches = store().search("sales/").await.unwrap();
        let labels: Vec<&str> = matches.iter().map(|hit| hit.label.as_str()).collect();
        assert_eq!(labels, vec!["sales/apac", "sales/eu"]);
        assert!(matches[0].schema.has_column("revenue"));
    }

    #[tokio::test]
    async fn test_rows_sorted_by_index_on_load() {
        let frame = read_all("sales/eu", &["date", "region", "revenue"]).await;
        assert_eq!(
            frame.get("date"),
            Some(&Column::Int(vec![1704067200, 1704067200, 1704153600]))
        );
        assert_eq!(
            frame.get("region"),
            Some(&Column::Str(vec!["EU".into(), "US".into(), "EU".into()]))
        );
        assert_eq!(frame.get("revenue"), Some(&Column::Int(vec![100, 50, 30])));
    }

    #[tokio::test]
    async fn test_read_selects_columns_in_request_order() {
        let frame = read_all("sales/eu", &["revenue", "date"]).await;
        let names: Vec<&str> = frame.names().collect();
        assert_eq!(names, vec!["revenue", "date"]);
    }

    #[tokio::test]
    async fn test_read_offset_and_limit() {
        let request = ReadRequest {
            columns: vec!["date".to_string(), "revenue".to_string()],
            offset: 1,
            limit: 1,
            start: None,
            stop: None,
        };
        let frame = read("sales/eu", &request).await;
        assert_eq!(frame.get("date"), Some(&Column::Int(vec![1704067200])));
        assert_eq!(frame.get("revenue"), Some(&Column::Int(vec![50])));
    }

    #[tokio::test]
    async fn test_read_offset_past_end() {
        let request = ReadRequest {
            columns: vec!["date".to_string()],
            offset: 10,
            limit: 5,
            start: None,
            stop: None,
        };
        let frame = read("sales/eu", &request).await;
        assert!(frame.is_empty());
    }

    #[tokio::test]
    async fn test_read_bounds_epoch_seconds() {
        // Start is inclusive, stop exclusive.
        let request = ReadRequest {
            columns: vec!["date".to_string()],
            offset: 0,
            limit: 100,
            start: Some("1704067200".to_string()),
            stop: Some("1704153600".to_string()),
        };
        let frame = read("sales/eu", &request).await;
        assert_eq!(
            frame.get("date"),
            Some(&Column::Int(vec![1704067200, 1704067200]))
        );
    }

    #[tokio::test]
    async fn test_read_bounds_rfc3339() {
        let request = ReadRequest {
            columns: vec!["date".to_string()],
            offset: 0,
            limit: 100,
            start: Some("2024-01-02T00:00:00Z".to_string()),
            stop: None,
        };
        let frame = read("sales/eu", &request).await;
        assert_eq!(frame.get("date"), Some(&Column::Int(vec![1704153600])));
    }

    #[tokio::test]
    async fn test_read_bounds_applied_before_pagination() {
        let request = ReadRequest {
            columns: vec!["date".to_string()],
            offset: 1,
            limit: 100,
            start: Some("1704067200".to_string()),
            stop: Some("1704153600".to_string()),
        };
        let frame = read("sales/eu", &request).await;
        assert_eq!(frame.get("date"), Some(&Column::Int(vec![1704067200])));
    }

    #[tokio::test]
    async fn test_read_invalid_bound() {
        let store = store();
        let series = store.get_series("sales/eu").await.unwrap();
        let request = ReadRequest {
            columns: vec!["date".to_string()],
            offset: 0,
            limit: 100,
            start: Some("yesterday".to_string()),
            stop: None,
        };
        let error = series.read(&request).await.unwrap_err();
        assert!(matches!(error, StoreError::InvalidBound(_)));
    }

    #[tokio::test]
    async fn test_read_unknown_column() {
        let store = store();
        let series = store.get_series("sales/eu").await.unwrap();
        let request = ReadRequest {
            columns: vec!["margin".to_string()],
            offset: 0,
            limit: 100,
            start: None,
            stop: None,
        };
        let error = series.read(&request).await.unwrap_err();
        assert!(matches!(error, StoreError::UnknownColumn { .. }));
    }

    #[tokio::test]
    async fn test_bounds_ignored_without_time_index() {
        let request = ReadRequest {
            columns: vec!["build".to_string()],
            offset: 0,
            limit: 100,
            start: Some("1704067200".to_string()),
            stop: None,
        };
        let frame = read("ops/deploys", &request).await;
        assert_eq!(frame.get("build"), Some(&Column::Int(vec![1, 2])));
    }

    #[tokio::test]
    async fn test_series_label_and_schema() {
        let store = store();
        let series = store.get_series("sales/eu").await.unwrap();
        assert_eq!(series.label(), "sales/eu");
        assert!(series.schema().is_multi_index());
    }

    #[test]
    fn test_seed_rejects_mismatched_lengths() {
        let seed = r#"{
            "collections": {
                "sales": {
                    "eu": {
                        "schema": {
                            "index": [{"name": "date", "kind": "timestamp"}],
                            "values": [{"name": "revenue", "kind": "int"}]
                        },
                        "columns": {"date": [1, 2], "revenue": [10]}
                    }
                }
            }
        }"#;
        let error = MemoryStore::from_json(seed).unwrap_err();
        assert!(matches!(error, StoreError::InvalidData { .. }));
    }

    #[test]
    fn test_seed_rejects_mistyped_cells() {
        let seed = r#"{
            "collections": {
                "sales": {
                    "eu": {
                        "schema": {
                            "index": [{"name": "date", "kind": "timestamp"}],
                            "values": [{"name": "revenue", "kind": "int"}]
                        },
                        "columns": {"date": ["2024-01-01"], "revenue": [10]}
                    }
                }
            }
        }"#;
        let error = MemoryStore::from_json(seed).unwrap_err();
        assert!(matches!(error, StoreError::InvalidData { .. }));
    }

    #[test]
    fn test_seed_rejects_missing_column() {
        let seed = r#"{
            "collections": {
                "sales": {
                    "eu": {
                        "schema": {
                            "index": [{"name": "date", "kind": "timestamp"}],
                            "values": [{"name": "revenue", "kind": "int"}]
                        },
                        "columns": {"date": [1, 2]}
                    }
                }
            }
        }"#;
        let error = MemoryStore::from_json(seed).unwrap_err();
        assert!(matches!(error, StoreError::InvalidData { .. }));
    }

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound("1704067200").unwrap(), 1704067200);
        assert_eq!(parse_bound("2024-01-01T00:00:00Z").unwrap(), 1704067200);
        assert!(parse_bound("yesterday").is_err());
    }
}
