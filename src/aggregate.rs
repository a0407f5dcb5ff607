//! Aggregation of filtered frames into chartable series.
//!
//! A chart wants one value per timestamp. Series indexed by time alone
//! already have that shape and pass through untouched. Series with further
//! index columns may hold several rows per timestamp, so their values are
//! grouped by timestamp and summed.

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::error::TimeboardError;
use crate::frame::{Column, Frame};
use crate::store::Schema;

/// How to reduce a frame to one value per timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Aggregation {
    /// Single-index series: rows already map one-to-one onto chart points.
    Passthrough,
    /// Multi-index series: group rows by timestamp and sum the target column.
    GroupSum,
}

impl Aggregation {
    /// Selects the aggregation for a schema.
    pub fn for_schema(schema: &Schema) -> Self {
        if schema.is_multi_index() {
            Self::GroupSum
        } else {
            Self::Passthrough
        }
    }

    /// Reduces a frame to parallel timestamp and value arrays.
    ///
    /// Grouped timestamps keep their first-occurrence order, which for
    /// index-sorted store data is chronological.
    pub fn apply(
        &self,
        frame: &Frame,
        time_dimension: &str,
        target: &str,
    ) -> Result<(Vec<i64>, Column), TimeboardError> {
        let times = timestamps(frame, time_dimension)?;
        let values = frame
            .get(target)
            .ok_or_else(|| TimeboardError::MissingColumn {
                column: target.to_string(),
            })?;
        match self {
            Self::Passthrough => match values {
                Column::Int(_) | Column::Float(_) => Ok((times, values.clone())),
                Column::Str(_) => Err(non_numeric(target)),
            },
            Self::GroupSum => match values {
                Column::Int(cells) => {
                    let (times, sums) = group_sum(&times, cells);
                    Ok((times, Column::Int(sums)))
                }
                Column::Float(cells) => {
                    let (times, sums) = group_sum(&times, cells);
                    Ok((times, Column::Float(sums)))
                }
                Column::Str(_) => Err(non_numeric(target)),
            },
        }
    }
}

/// Extracts the time dimension as epoch seconds.
fn timestamps(frame: &Frame, time_dimension: &str) -> Result<Vec<i64>, TimeboardError> {
    let column = frame
        .get(time_dimension)
        .ok_or_else(|| TimeboardError::MissingColumn {
            column: time_dimension.to_string(),
        })?;
    match column {
        Column::Int(cells) => Ok(cells.clone()),
        Column::Float(cells) => Ok(cells.iter().map(|&cell| cell as i64).collect()),
        Column::Str(_) => Err(non_numeric(time_dimension)),
    }
}

fn non_numeric(column: &str) -> TimeboardError {
    TimeboardError::NonNumericColumn {
        column: column.to_string(),
    }
}

/// Sums values sharing a timestamp, keeping first-occurrence order.
fn group_sum<T>(times: &[i64], values: &[T]) -> (Vec<i64>, Vec<T>)
where
    T: Copy + std::ops::AddAssign,
{
    debug_assert_eq!(times.len(), values.len());
    let mut grouped_times: Vec<i64> = Vec::new();
    let mut sums: Vec<T> = Vec::new();
    let mut slots: HashMap<i64, usize> = HashMap::with_capacity(times.len());
    for (&time, &value) in times.iter().zip(values) {
        match slots.entry(time) {
            Entry::Occupied(entry) => sums[*entry.get()] += value,
            Entry::Vacant(entry) => {
                entry.insert(grouped_times.len());
                grouped_times.push(time);
                sums.push(value);
            }
        }
    }
    (grouped_times, sums)
}
