//! This file defines the timeboard binary entry point.

use std::sync::Arc;

use timeboard::app;
use timeboard::app_state::AppState;
use timeboard::cli;
use timeboard::metrics;
use timeboard::server;
use timeboard::tracing;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    metrics::register_metrics();
    let state = AppState::new(&args).expect("failed to initialise the series store");
    let service = app::service(Arc::new(state));
    server::serve(&args, service).await;
    tracing::shutdown_tracing();
}
