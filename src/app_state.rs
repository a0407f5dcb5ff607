use crate::cli::CommandLineArgs;
use crate::store::{MemoryStore, Store, StoreError};

use std::sync::Arc;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Series store.
    pub store: Box<dyn Store>,
}

impl AppState {
    /// Create and return an [AppState] backed by the configured store.
    pub fn new(args: &CommandLineArgs) -> Result<Self, StoreError> {
        let store = match &args.store_file {
            Some(path) => MemoryStore::from_path(path)?,
            None => MemoryStore::new(),
        };
        Ok(Self::with_store(args, Box::new(store)))
    }

    /// Create and return an [AppState] around an existing store.
    pub fn with_store(args: &CommandLineArgs, store: Box<dyn Store>) -> Self {
        Self {
            args: args.clone(),
            store,
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
