//! The dashboard's HTTP Application Programming Interface (API).

use crate::aggregate::Aggregation;
use crate::app_state::SharedAppState;
use crate::error::TimeboardError;
use crate::metrics;
use crate::nav::{NavSignal, NavState};
use crate::pages::{self, FilterInput, GraphView};
use crate::payload::{self, EncodedPayload};
use crate::query::{self, Params};
use crate::store::{IndexKind, ReadRequest, Series};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower::Layer;
use tower::ServiceBuilder;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Number of rows sampled when building the filter drop-downs.
const FILTER_SAMPLE_ROWS: usize = 10_000;

/// `Router` wrapped with middleware that must run before routing.
pub type Service = NormalizePath<Router>;

/// Returns the dashboard [Router].
pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
        .route("/static/:filename", get(static_file))
        .route("/search", get(search))
        .route(
            "/series/:collection/:series",
            get(series_columns).post(series_columns),
        )
        .route("/graph/:collection/:series/:column", get(graph))
        .route("/graph/:collection/:series/:column/page/:page", get(graph_page))
        .route("/read/:collection/:series/:column", get(read))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .on_request(metrics::request_counter)
                    .on_response(metrics::record_response_metrics),
            ),
        )
        .with_state(state)
}

/// Returns the dashboard [Service]: the router behind trailing slash normalisation.
pub fn service(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Handler for `GET /`: the landing page.
async fn index(State(state): State<SharedAppState>) -> Html<String> {
    pages::index(&state.args.title, &state.args.prefix)
}

/// Handler for `GET /favicon.ico`.
async fn favicon() -> &'static str {
    ""
}

/// Handler for `GET /static/{filename}`: the embedded CSS and JavaScript.
///
/// Only those two file types are served. Anything else is a bad request,
/// whether or not a file of that name exists.
async fn static_file(Path(filename): Path<String>) -> Result<Response, TimeboardError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, extension)| extension)
        .unwrap_or("");
    let content_type = match extension {
        "css" => mime::TEXT_CSS,
        "js" => mime::TEXT_JAVASCRIPT,
        _ => {
            return Err(TimeboardError::UnsupportedExtension {
                extension: extension.to_string(),
            })
        }
    };
    let body = pages::static_file(&filename)
        .ok_or_else(|| TimeboardError::StaticNotFound(filename.clone()))?;
    Ok(([(&header::CONTENT_TYPE, content_type.to_string())], body).into_response())
}

/// Handler for `GET /search`: series labels matching the filter terms.
///
/// Every whitespace-separated term of `label-filter` must appear in the
/// label, compared case-insensitively. A `collection` parameter scopes the
/// search to one collection.
async fn search(
    State(state): State<SharedAppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Html<String>, TimeboardError> {
    let params = Params::from_query(raw_query.as_deref());
    let prefix = params
        .get("collection")
        .filter(|collection| !collection.is_empty())
        .map(|collection| format!("{}/", collection))
        .unwrap_or_default();
    let terms: Vec<String> = params
        .get("label-filter")
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    let hits = state.store.search(&prefix).await?;
    let labels: Vec<String> = hits
        .into_iter()
        .map(|hit| hit.label)
        .filter(|label| {
            let lowered = label.to_lowercase();
            terms.iter().all(|term| lowered.contains(term))
        })
        .collect();
    Ok(pages::search_results(&labels, &state.args.prefix))
}

/// Handler for `GET|POST /series/{collection}/{series}`: the value columns
/// available for charting.
async fn series_columns(
    State(state): State<SharedAppState>,
    Path((collection, series)): Path<(String, String)>,
) -> Result<Html<String>, TimeboardError> {
    let label = series_label(&collection, &series);
    let handle = state.store.get_series(&label).await?;
    let columns: Vec<String> = handle
        .schema()
        .value_names()
        .map(ToString::to_string)
        .collect();
    Ok(pages::column_picker(&label, &columns, &state.args.prefix))
}

/// Handler for `GET /graph/{collection}/{series}/{column}`: a chart page.
async fn graph(
    State(state): State<SharedAppState>,
    Path((collection, series, column)): Path<(String, String, String)>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Result<Html<String>, TimeboardError> {
    render_graph(state, collection, series, column, None, headers, raw_query).await
}

/// Handler for `GET /graph/{collection}/{series}/{column}/page/{page}`: a
/// chart page opened at a fixed page.
async fn graph_page(
    State(state): State<SharedAppState>,
    Path((collection, series, column, page)): Path<(String, String, String, i64)>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Result<Html<String>, TimeboardError> {
    render_graph(
        state,
        collection,
        series,
        column,
        Some(page),
        headers,
        raw_query,
    )
    .await
}

/// Renders a chart page around the resolved navigation state.
///
/// The pager links embed the neighbouring page numbers, so plain `GET`s walk
/// the series without any state held here. The page also honours the
/// navigation signal header, moving one page in its direction.
async fn render_graph(
    state: SharedAppState,
    collection: String,
    series: String,
    column: String,
    path_page: Option<i64>,
    headers: HeaderMap,
    raw_query: Option<String>,
) -> Result<Html<String>, TimeboardError> {
    let label = series_label(&collection, &series);
    let handle = state.store.get_series(&label).await?;
    let params = Params::from_query(raw_query.as_deref());
    let nav = NavState::resolve(&params, path_page, NavSignal::from_headers(&headers))?;
    let filters = filter_inputs(handle.as_ref(), &params).await?;
    let pinned: Vec<(String, String)> = filters
        .iter()
        .filter(|input| !input.selected.is_empty())
        .map(|input| (input.name.clone(), input.selected.clone()))
        .collect();
    let graph_uri = format!(
        "{}/graph/{}/{}/{}",
        state.args.prefix, collection, series, column
    );
    let data_uri = format!(
        "{}/read/{}/{}/{}{}",
        state.args.prefix,
        collection,
        series,
        column,
        nav.query_string(&pinned)
    );
    let previous_uri = format!(
        "{}{}",
        graph_uri,
        nav.with_page(nav.page.saturating_sub(1)).query_string(&pinned)
    );
    let next_uri = format!(
        "{}{}",
        graph_uri,
        nav.with_page(nav.page + 1).query_string(&pinned)
    );
    let graph_id = format!(
        "graph-{}",
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    );
    let show_filters = nav.start.is_some() || nav.stop.is_some();
    let view = GraphView {
        prefix: &state.args.prefix,
        collection: &collection,
        series: &series,
        column: &column,
        graph_id,
        data_uri,
        nav: &nav,
        page_len: state.args.page_len,
        filters: &filters,
        show_filters,
        previous_uri,
        next_uri,
    };
    Ok(pages::graph(&view))
}

/// Builds one filter drop-down per categorical index column, offering the
/// distinct values found in a bounded sample of the series.
async fn filter_inputs(
    handle: &dyn Series,
    params: &Params,
) -> Result<Vec<FilterInput>, TimeboardError> {
    let schema = handle.schema();
    if !schema.is_multi_index() {
        return Ok(Vec::new());
    }
    let categorical: Vec<String> = schema
        .index
        .iter()
        .filter(|column| column.kind != IndexKind::Timestamp)
        .map(|column| column.name.clone())
        .collect();
    if categorical.is_empty() {
        return Ok(Vec::new());
    }
    let sample = handle
        .read(&ReadRequest {
            columns: categorical.clone(),
            offset: 0,
            limit: FILTER_SAMPLE_ROWS,
            start: None,
            stop: None,
        })
        .await?;
    let mut inputs = Vec::with_capacity(categorical.len());
    for name in categorical {
        let mut options = vec![String::new()];
        if let Some(column) = sample.get(&name) {
            options.extend(column.distinct_sorted());
        }
        let selected = params.get(&name).unwrap_or("").to_string();
        inputs.push(FilterInput {
            name,
            selected,
            options,
        });
    }
    Ok(inputs)
}

/// Handler for `GET /read/{collection}/{series}/{column}`: the chart payload.
///
/// Shapes a store read for the requested page, applies the residual
/// equality filters and aggregates to one value per timestamp. Series
/// without a time dimension yield a payload with empty data arrays.
async fn read(
    State(state): State<SharedAppState>,
    Path((collection, series, column)): Path<(String, String, String)>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Result<EncodedPayload, TimeboardError> {
    let label = series_label(&collection, &series);
    let handle = state.store.get_series(&label).await?;
    let params = Params::from_query(raw_query.as_deref());
    let nav = NavState::resolve(&params, None, NavSignal::from_headers(&headers))?;
    let schema = handle.schema();
    let Some(plan) = query::plan_read(schema, &column, &params, &nav, state.args.page_len) else {
        return payload::encode_empty();
    };
    let frame = handle.read(&plan.request).await?;
    metrics::record_rows_read(&collection, frame.len());
    let frame = query::apply_filters(&frame, &params, &plan.time_dimension, &column);
    let (times, values) =
        Aggregation::for_schema(schema).apply(&frame, &plan.time_dimension, &column)?;
    payload::encode(times, values)
}

/// Returns the fully qualified label of a series within a collection.
fn series_label(collection: &str, series: &str) -> String {
    format!("{}/{}", collection.trim(), series.trim())
}
