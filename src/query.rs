//! Query shaping.
//!
//! Translates a charting request (target value column, query parameters,
//! navigation state) into a shaped [ReadRequest]: time dimension detection,
//! column selection and pagination. Parameters that name schema columns
//! become residual equality filters, applied to the returned frame.

use crate::frame::Frame;
use crate::nav::NavState;
use crate::store::{IndexKind, ReadRequest, Schema};

/// Prefix of query parameters that steer the UI rather than filter data.
pub const UI_PREFIX: &str = "ui.";

/// Query parameters in request order.
///
/// Duplicate names are kept; lookups return the first occurrence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Parses a raw query string, preserving parameter order.
    pub fn from_query(query: Option<&str>) -> Self {
        let entries = match query {
            Some(query) => url::form_urlencoded::parse(query.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect(),
            None => Vec::new(),
        };
        Self { entries }
    }

    /// Returns the first value of the given parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the parameters in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// A shaped read: the series' time dimension plus the request to issue.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadPlan {
    /// Name of the time dimension column
    pub time_dimension: String,
    /// The shaped store request
    pub request: ReadRequest,
}

/// Returns the schema's time dimension: the name of its first timestamp
/// index column.
pub fn time_dimension(schema: &Schema) -> Option<&str> {
    schema
        .index
        .iter()
        .find(|column| column.kind == IndexKind::Timestamp)
        .map(|column| column.name.as_str())
}

/// Shapes a read for one value column of a series.
///
/// The selection is the time dimension, then the target column, then every
/// non-empty, non-UI parameter that names another schema column, in
/// parameter order. Pagination and time bounds come from the navigation
/// state. Returns None when the schema has no time dimension.
pub fn plan_read(
    schema: &Schema,
    target: &str,
    params: &Params,
    nav: &NavState,
    page_len: usize,
) -> Option<ReadPlan> {
    let time_dimension = time_dimension(schema)?.to_string();
    let mut columns = vec![time_dimension.clone(), target.to_string()];
    for (name, value) in params.iter() {
        if value.is_empty() || name.starts_with(UI_PREFIX) {
            continue;
        }
        if columns.iter().any(|column| column == name) {
            continue;
        }
        if schema.has_column(name) {
            columns.push(name.to_string());
        }
    }
    Some(ReadPlan {
        time_dimension,
        request: ReadRequest {
            columns,
            offset: nav.offset(page_len),
            limit: page_len,
            start: nav.start.clone(),
            stop: nav.stop.clone(),
        },
    })
}

/// Applies residual equality filters to a frame.
///
/// Every non-empty, non-UI parameter naming a frame column other than the
/// time dimension and the target keeps only the rows whose cell equals the
/// parameter value, compared in the column's native type. Parameters naming
/// no frame column are ignored.
pub fn apply_filters(frame: &Frame, params: &Params, time_dimension: &str, target: &str) -> Frame {
    let mut filtered = frame.clone();
    for (name, value) in params.iter() {
        if value.is_empty() || name.starts_with(UI_PREFIX) {
            continue;
        }
        if name == time_dimension || name == target {
            continue;
        }
        let Some(column) = filtered.get(name) else {
            continue;
        };
        let keep = column.matches(value);
        filtered = filtered.masked(&keep);
    }
    filtered
}
