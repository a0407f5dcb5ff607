//! HTML presentation.
//!
//! Pages and fragments are rendered server-side from plain string templates.
//! The landing page and chart pages are full documents; search results and
//! column pickers are fragments swapped into the page by a small embedded
//! script. Static assets are compiled into the binary.

use axum::response::Html;

use crate::nav::NavState;

const INDEX_JS: &str = include_str!("../assets/index.js");
const STYLE_CSS: &str = include_str!("../assets/style.css");

const UPLOT_CSS: &str = "https://unpkg.com/uplot@1.6.24/dist/uPlot.min.css";
const UPLOT_JS: &str = "https://unpkg.com/uplot@1.6.24/dist/uPlot.iife.min.js";

/// Returns the embedded static file with the given name.
pub fn static_file(filename: &str) -> Option<&'static str> {
    match filename {
        "index.js" => Some(INDEX_JS),
        "style.css" => Some(STYLE_CSS),
        _ => None,
    }
}

/// A filter drop-down on a chart page: one categorical index column, its
/// distinct values and the currently pinned value (empty for none).
#[derive(Clone, Debug, PartialEq)]
pub struct FilterInput {
    /// Column name
    pub name: String,
    /// Currently pinned value, empty when the filter is off
    pub selected: String,
    /// Values to offer, starting with the empty choice
    pub options: Vec<String>,
}

/// Everything a chart page shows.
#[derive(Debug)]
pub struct GraphView<'a> {
    /// Route prefix the dashboard is mounted under
    pub prefix: &'a str,
    /// Collection name
    pub collection: &'a str,
    /// Series name within the collection
    pub series: &'a str,
    /// Charted value column
    pub column: &'a str,
    /// Element id of the chart mount point, unique per render
    pub graph_id: String,
    /// URI the chart payload is fetched from
    pub data_uri: String,
    /// Resolved navigation state
    pub nav: &'a NavState,
    /// Rows per page, rendered as an informational hidden field
    pub page_len: usize,
    /// Filter drop-downs, one per categorical index column
    pub filters: &'a [FilterInput],
    /// Whether the filter section starts expanded
    pub show_filters: bool,
    /// URI of the previous page
    pub previous_uri: String,
    /// URI of the next page
    pub next_uri: String,
}

/// Renders the landing page.
pub fn index(title: &str, prefix: &str) -> Html<String> {
    let body = format!(
        r#"<h1>{title}</h1>
<form id="search-form" action="{prefix}/search">
  <input type="search" id="label-filter" name="label-filter" placeholder="Filter series" autofocus>
  <button type="submit">Search</button>
</form>
<div id="results"></div>"#,
        title = escape(title),
        prefix = prefix,
    );
    Html(shell(title, prefix, &body))
}

/// Renders search results as a fragment of series links.
pub fn search_results(labels: &[String], prefix: &str) -> Html<String> {
    if labels.is_empty() {
        return Html(r#"<p class="empty">No matching series.</p>"#.to_string());
    }
    let mut items = String::new();
    for label in labels {
        items.push_str(&format!(
            r#"<li><a class="series-link" href="{prefix}/series/{label}">{text}</a></li>"#,
            prefix = prefix,
            label = escape(label),
            text = escape(label),
        ));
    }
    Html(format!(r#"<ul class="series-list">{}</ul>"#, items))
}

/// Renders the value columns of a series as a fragment of chart links.
pub fn column_picker(label: &str, columns: &[String], prefix: &str) -> Html<String> {
    let mut items = String::new();
    for column in columns {
        items.push_str(&format!(
            r#"<li><a href="{prefix}/graph/{label}/{column}">{text}</a></li>"#,
            prefix = prefix,
            label = escape(label),
            column = escape(column),
            text = escape(column),
        ));
    }
    Html(format!(
        r#"<h3>{label}</h3><ul class="column-list">{items}</ul>"#,
        label = escape(label),
        items = items,
    ))
}

/// Renders a chart page.
pub fn graph(view: &GraphView) -> Html<String> {
    let mut selects = String::new();
    for input in view.filters {
        selects.push_str(&filter_select(input));
    }
    let filters_class = if view.show_filters {
        "filters"
    } else {
        "filters hidden"
    };
    let graph_uri = format!(
        "{}/graph/{}/{}/{}",
        view.prefix, view.collection, view.series, view.column
    );
    let body = format!(
        r#"<h2>{collection}/{series} <span class="column">{column}</span></h2>
<section class="{filters_class}">
  <form action="{graph_uri}" method="get">
    <input type="hidden" name="ui.page" value="{page}">
    <input type="hidden" name="ui.page_len" value="{page_len}">
    <label>start<input type="text" name="ui.start" value="{start}"></label>
    <label>stop<input type="text" name="ui.stop" value="{stop}"></label>
    {selects}
    <button type="submit">Apply</button>
  </form>
</section>
<nav class="pager">
  <a class="page-link" href="{previous_uri}">previous</a>
  <span class="page-number">page {page}</span>
  <a class="page-link" href="{next_uri}">next</a>
</nav>
<div id="{graph_id}" class="chart" data-uri="{data_uri}"></div>"#,
        collection = escape(view.collection),
        series = escape(view.series),
        column = escape(view.column),
        filters_class = filters_class,
        graph_uri = escape(&graph_uri),
        page = view.nav.page,
        page_len = view.page_len,
        start = escape(view.nav.start.as_deref().unwrap_or("")),
        stop = escape(view.nav.stop.as_deref().unwrap_or("")),
        selects = selects,
        previous_uri = escape(&view.previous_uri),
        next_uri = escape(&view.next_uri),
        graph_id = escape(&view.graph_id),
        data_uri = escape(&view.data_uri),
    );
    let title = format!("{}/{} {}", view.collection, view.series, view.column);
    Html(shell(&title, view.prefix, &body))
}

fn filter_select(input: &FilterInput) -> String {
    let mut options = String::new();
    for option in &input.options {
        let selected = if option == &input.selected {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            r#"<option value="{value}"{selected}>{text}</option>"#,
            value = escape(option),
            selected = selected,
            text = escape(option),
        ));
    }
    format!(
        r#"<label>{name}<select name="{name}">{options}</select></label>"#,
        name = escape(&input.name),
        options = options,
    )
}

/// Wraps a body in the common document shell.
fn shell(title: &str, prefix: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="{prefix}/static/style.css">
<link rel="stylesheet" href="{uplot_css}">
<script src="{uplot_js}"></script>
<script src="{prefix}/static/index.js" defer></script>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        prefix = prefix,
        uplot_css = UPLOT_CSS,
        uplot_js = UPLOT_JS,
        body = body,
    )
}

/// Escapes text for interpolation into HTML.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
