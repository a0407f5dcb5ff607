//! Error handling.

use axum::{
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tracing::{event, Level};

use crate::store::StoreError;

/// Dashboard error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum TimeboardError {
    /// Request for a static file that is not CSS or JavaScript
    #[error("unsupported static file extension {extension:?}")]
    UnsupportedExtension {
        /// The offending file extension
        extension: String,
    },

    /// Request for a static file that does not exist
    #[error("no static file named {0:?}")]
    StaticNotFound(String),

    /// A query parameter failed to parse
    #[error("invalid value for parameter {parameter}")]
    InvalidParameter {
        /// Name of the offending parameter
        parameter: &'static str,
        /// The underlying parse error
        #[source]
        source: std::num::ParseIntError,
    },

    /// Error serialising a chart payload to JSON
    #[error("failed to serialise chart payload")]
    PayloadSerialize(#[from] serde_json::Error),

    /// Error compressing a chart payload
    #[error("failed to compress chart payload")]
    PayloadCompress(#[from] std::io::Error),

    /// A column expected to hold numbers does not
    #[error("column {column} is not numeric")]
    NonNumericColumn {
        /// The offending column name
        column: String,
    },

    /// A column requested from the store is missing from the returned frame
    #[error("column {column} missing from series data")]
    MissingColumn {
        /// The missing column name
        column: String,
    },

    /// Error accessing the series store
    #[error("series store request failed")]
    Store(#[from] StoreError),
}

impl IntoResponse for TimeboardError {
    /// Convert from a `TimeboardError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = None;
        let mut current = error.source();
        while let Some(source) = current {
            let mut causes: Vec<String> = caused_by.unwrap_or_default();
            causes.push(source.to_string());
            caused_by = Some(causes);
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody { message, caused_by }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<TimeboardError> for ErrorResponse {
    /// Convert from a `TimeboardError` into an `ErrorResponse`.
    fn from(error: TimeboardError) -> Self {
        let response = match &error {
            // Bad request
            TimeboardError::UnsupportedExtension { extension: _ }
            | TimeboardError::StaticNotFound(_)
            | TimeboardError::InvalidParameter {
                parameter: _,
                source: _,
            } => Self::bad_request(&error),

            // Internal server error
            TimeboardError::PayloadSerialize(_)
            | TimeboardError::PayloadCompress(_)
            | TimeboardError::NonNumericColumn { column: _ }
            | TimeboardError::MissingColumn { column: _ }
            | TimeboardError::Store(_) => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}
