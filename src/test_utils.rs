use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::frame::{Column, Frame};
use crate::store::{IndexColumn, IndexKind, MemoryStore, Schema, ValueColumn, ValueKind};

use clap::Parser;
use std::sync::Arc;

/// 2024-01-01T00:00:00Z as epoch seconds.
pub(crate) const DAY_ONE: i64 = 1_704_067_200;

/// 2024-01-02T00:00:00Z as epoch seconds.
pub(crate) const DAY_TWO: i64 = 1_704_153_600;

/// Create command line arguments with only default values set.
pub(crate) fn test_args() -> CommandLineArgs {
    CommandLineArgs::parse_from(["timeboard"])
}

/// Create a store holding a multi-index series, a single-index series and a
/// series without a time dimension.
pub(crate) fn test_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .insert("sales", "eu", multi_index_schema(), multi_index_frame())
        .unwrap();
    store
        .insert("sales", "apac", single_index_schema(), single_index_frame())
        .unwrap();
    store
        .insert("ops", "deploys", no_time_schema(), no_time_frame())
        .unwrap();
    store
}

/// Create shared application state over the test store.
pub(crate) fn test_state() -> SharedAppState {
    Arc::new(AppState::with_store(&test_args(), Box::new(test_store())))
}

/// Create shared application state over the test store with a small page length.
pub(crate) fn test_state_with_page_len(page_len: usize) -> SharedAppState {
    let mut args = test_args();
    args.page_len = page_len;
    Arc::new(AppState::with_store(&args, Box::new(test_store())))
}

fn multi_index_schema() -> Schema {
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

fn multi_index_frame() -> Frame {
    Frame::new()
        .with_column("date", Column::Int(vec![DAY_ONE, DAY_ONE, DAY_TWO]))
        .with_column(
            "region",
            Column::Str(vec![
                "EU".to_string(),
                "US".to_string(),
                "EU".to_string(),
            ]),
        )
        .with_column("revenue", Column::Int(vec![100, 50, 30]))
}

fn single_index_schema() -> Schema {
    Schema {
        index: vec![IndexColumn {
            name: "date".to_string(),
            kind: IndexKind::Timestamp,
        }],
        values: vec![ValueColumn {
            name: "revenue".to_string(),
            kind: ValueKind::Float,
        }],
    }
}

fn single_index_frame() -> Frame {
    Frame::new()
        .with_column("date", Column::Int(vec![DAY_ONE, DAY_TWO]))
        .with_column("revenue", Column::Float(vec![7.5, 9.25]))
}

fn no_time_schema() -> Schema {
    Schema {
        index: vec![IndexColumn {
            name: "build".to_string(),
            kind: IndexKind::Integer,
        }],
        values: vec![ValueColumn {
            name: "duration".to_string(),
            kind: ValueKind::Int,
        }],
    }
}

fn no_time_frame() -> Frame {
    Frame::new()
        .with_column("build", Column::Int(vec![1, 2]))
        .with_column("duration", Column::Int(vec![45, 60]))
}
