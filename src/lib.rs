//! This crate provides Timeboard, a small web dashboard for browsing time series
//! collections held in a columnar store. The dashboard is serverless in spirit: every
//! page and chart payload is computed from the request alone, so instances can be
//! scaled or restarted freely.
//!
//! Charts are drawn in the browser by [uPlot](https://github.com/leeoniya/uPlot); the
//! server reduces each series to the pair of parallel arrays that uPlot consumes and
//! compresses the result before it leaves the process.
//!
//! The dashboard is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team. Axum performs well in [various](https://github.com/programatik29/rust-web-benchmarks/blob/master/result/hello-world.md) [benchmarks](https://web-frameworks-benchmark.netlify.app/result?l=rust)
//!   and is built on top of various popular components, including the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of JSON chart payloads and store schemas.
//! * [flate2] compresses chart payloads before they are sent to the browser.

pub mod aggregate;
pub mod app;
pub mod app_state;
pub mod cli;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod nav;
pub mod pages;
pub mod payload;
pub mod query;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
