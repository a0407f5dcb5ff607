//! Stateless page navigation.
//!
//! The dashboard keeps no session state. The current page, time bounds and
//! pinned filters ride along in each request's query string, and the
//! previous / next controls announce themselves through the
//! HX-Active-Element-Value request header.

use axum::http::HeaderMap;

use crate::error::TimeboardError;
use crate::query::Params;

/// Request header carrying the value of the control that triggered the
/// request.
pub const NAV_SIGNAL_HEADER: &str = "hx-active-element-value";

/// A navigation signal sent by the previous / next page controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavSignal {
    /// Move back one page
    Previous,
    /// Move forward one page
    Next,
}

impl NavSignal {
    /// Extracts a signal from the request headers.
    ///
    /// Absent headers and unrecognised values mean no signal.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        match headers.get(NAV_SIGNAL_HEADER)?.to_str().ok()? {
            "previous" => Some(Self::Previous),
            "next" => Some(Self::Next),
            _ => None,
        }
    }
}

/// Resolved navigation state for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavState {
    /// Current page number
    pub page: u64,
    /// Lower time bound, passed through to the store uninterpreted
    pub start: Option<String>,
    /// Upper time bound, passed through to the store uninterpreted
    pub stop: Option<String>,
}

impl NavState {
    /// Resolves the navigation state from query parameters, an optional page
    /// path segment and an optional signal.
    ///
    /// The `ui.page` parameter wins over the path segment. A signal then
    /// moves one page in its direction. The resulting page never goes below
    /// zero.
    pub fn resolve(
        params: &Params,
        path_page: Option<i64>,
        signal: Option<NavSignal>,
    ) -> Result<Self, TimeboardError> {
        let parameter_page = match params.get("ui.page") {
            Some(value) => {
                Some(
                    value
                        .parse::<i64>()
                        .map_err(|source| TimeboardError::InvalidParameter {
                            parameter: "ui.page",
                            source,
                        })?,
                )
            }
            None => None,
        };
        let mut page = parameter_page.or(path_page).unwrap_or(0);
        match signal {
            Some(NavSignal::Next) => page += 1,
            Some(NavSignal::Previous) => page -= 1,
            None => (),
        }
        Ok(Self {
            page: page.max(0) as u64,
            start: bound(params, "ui.start"),
            stop: bound(params, "ui.stop"),
        })
    }

    /// Returns the row offset of the current page.
    pub fn offset(&self, page_len: usize) -> usize {
        (self.page as usize).saturating_mul(page_len)
    }

    /// Returns a copy of this state positioned on another page.
    pub fn with_page(&self, page: u64) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Encodes the state, plus pinned filters, as a query string with a
    /// leading `?`. Returns an empty string when there is nothing to carry.
    pub fn query_string(&self, filters: &[(String, String)]) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        if self.page > 0 {
            serializer.append_pair("ui.page", &self.page.to_string());
            any = true;
        }
        if let Some(start) = &self.start {
            serializer.append_pair("ui.start", start);
            any = true;
        }
        if let Some(stop) = &self.stop {
            serializer.append_pair("ui.stop", stop);
            any = true;
        }
        for (name, value) in filters {
            if value.is_empty() {
                continue;
            }
            serializer.append_pair(name, value);
            any = true;
        }
        if any {
            format!("?{}", serializer.finish())
        } else {
            String::new()
        }
    }
}

fn bound(params: &Params, name: &str) -> Option<String> {
    params
        .get(name)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}
