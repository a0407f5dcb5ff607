//! Chart payload encoding.
//!
//! The read endpoint answers with `{"data": [times, values], "options": ...}`
//! serialised to JSON and gzip-compressed with the fastest setting. The
//! options object is consumed client-side by uPlot, so it is serialised in
//! the exact shape uPlot expects.

use axum::http::header;
use bytes::Bytes;
use axum::response::{IntoResponse, Response};
use flate2::read::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::io::Read;

use crate::error::TimeboardError;
use crate::frame::Column;

/// Chart sizing and styling.
#[derive(Clone, Debug, Serialize)]
pub struct ChartOptions {
    /// Chart width in pixels
    pub width: u32,
    /// Chart height in pixels
    pub height: u32,
    /// Per-series styling; the leading entry describes the x axis
    pub series: Vec<SeriesStyle>,
}

impl Default for ChartOptions {
    /// Returns the styling used for every chart: a single red series on a
    /// 900 by 300 canvas.
    fn default() -> Self {
        Self {
            width: 900,
            height: 300,
            series: vec![
                SeriesStyle::default(),
                SeriesStyle {
                    show: Some(true),
                    span_gaps: Some(false),
                    label: Some("Value1".to_string()),
                    stroke: Some("red".to_string()),
                    width: Some(1),
                    fill: Some("rgba(255, 0, 0, 0.3)".to_string()),
                    dash: Some(vec![10, 5]),
                },
            ],
        }
    }
}

/// Styling of one plotted series.
///
/// All fields are optional; an empty style serialises as `{}`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SeriesStyle {
    /// Whether the series is drawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    /// Whether lines are drawn across missing points
    #[serde(rename = "spanGaps", skip_serializing_if = "Option::is_none")]
    pub span_gaps: Option<bool>,
    /// Legend label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Line colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Line width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Area fill colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Dash pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<Vec<u32>>,
}

/// A chart payload: parallel timestamp and value arrays plus options.
#[derive(Debug, Serialize)]
pub struct SeriesPayload {
    /// `[times, values]`, uPlot's aligned-data layout
    pub data: (Vec<i64>, Column),
    /// Chart options
    pub options: ChartOptions,
}

/// A JSON and gzip encoded payload, ready to serve.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedPayload {
    body: Bytes,
}

impl EncodedPayload {
    /// Returns the compressed body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Encodes a chart payload: JSON first, then gzip with the fastest setting.
pub fn encode(times: Vec<i64>, values: Column) -> Result<EncodedPayload, TimeboardError> {
    let payload = SeriesPayload {
        data: (times, values),
        options: ChartOptions::default(),
    };
    let json = serde_json::to_vec(&payload)?;
    let mut encoder = GzEncoder::new(json.as_slice(), Compression::fast());
    let mut body = Vec::with_capacity(json.len());
    encoder.read_to_end(&mut body)?;
    Ok(EncodedPayload { body: body.into() })
}

/// Encodes the payload of a series that cannot be charted: empty data
/// arrays under the standard options.
pub fn encode_empty() -> Result<EncodedPayload, TimeboardError> {
    encode(Vec::new(), Column::Int(Vec::new()))
}

impl IntoResponse for EncodedPayload {
    /// The body is JSON under gzip, so both Content-Type and
    /// Content-Encoding are set.
    fn into_response(self) -> Response {
        (
            [
                (&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string()),
                (&header::CONTENT_ENCODING, "gzip".to_string()),
            ],
            self.body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;

    fn decode(payload: &EncodedPayload) -> serde_json::Value {
        let mut decoder = GzDecoder::new(payload.body().as_ref());
        let mut json = Vec::new();
        decoder.read_to_end(&mut json).unwrap();
        serde_json::from_slice(&json).unwrap()
    }

    #[test]
    fn test_encode_data_arrays() {
        let payload = encode(vec![1, 2], Column::Int(vec![10, 20])).unwrap();
        let value = decode(&payload);
        assert_eq!(value["data"], serde_json::json!([[1, 2], [10, 20]]));
    }

    #[test]
    fn test_encode_float_values() {
        let payload = encode(vec![1], Column::Float(vec![2.5])).unwrap();
        let value = decode(&payload);
        assert_eq!(value["data"], serde_json::json!([[1], [2.5]]));
    }

    #[test]
    fn test_encode_chart_options() {
        let payload = encode(vec![1], Column::Int(vec![10])).unwrap();
        let value = decode(&payload);
        let expected: serde_json::Value = serde_json::from_str(
            r#"{
                "width": 900,
                "height": 300,
                "series": [
                    {},
                    {
                        "show": true,
                        "spanGaps": false,
                        "label": "Value1",
                        "stroke": "red",
                        "width": 1,
                        "fill": "rgba(255, 0, 0, 0.3)",
                        "dash": [10, 5]
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(value["options"], expected);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let first = encode(vec![1, 2, 3], Column::Int(vec![10, 20, 30])).unwrap();
        let second = encode(vec![1, 2, 3], Column::Int(vec![10, 20, 30])).unwrap();
        assert_eq!(first.body(), second.body());
    }

    #[test]
    fn test_encode_empty() {
        let payload = encode_empty().unwrap();
        let value = decode(&payload);
        assert_eq!(value["data"], serde_json::json!([[], []]));
        assert_eq!(value["options"]["width"], 900);
    }

    #[test]
    fn test_response_headers() {
        let payload = encode(vec![1], Column::Int(vec![10])).unwrap();
        let response = payload.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
    }

    #[tokio::test]
    async fn test_response_body_is_gzip() {
        let payload = encode(vec![1], Column::Int(vec![10])).unwrap();
        let expected = payload.body().clone();
        let response = payload.into_response();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(body, expected);
        // Gzip magic bytes.
        assert_eq!(&body[..2], &[0x1f, 0x8b]);
    }
}
