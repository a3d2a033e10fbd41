//! API Gateway proxy responses.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Headers sent on every response so the browser app can call the API.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type,Accept"),
    ("Access-Control-Allow-Methods", "GET,OPTIONS"),
];

/// A proxy integration response.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use t3_lambda_shared::ApiResponse;
///
/// let response = ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "upstream down");
/// assert_eq!(response.status_code, 500);
/// assert_eq!(response.body, r#"{"error":"upstream down"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    fn with_body(status: StatusCode, content_type: &str, body: String) -> Self {
        let mut headers: BTreeMap<String, String> = CORS_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    /// Serialize `data` as the JSON body.
    pub fn json<T: Serialize>(status: StatusCode, data: &T) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self::with_body(status, CONTENT_TYPE_JSON, body),
            Err(e) => {
                error!(error = %e, "failed to serialize response body");
                Self::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("failed to serialize response: {}", e),
                )
            }
        }
    }

    /// Plain-text body.
    pub fn text(status: StatusCode, body: String) -> Self {
        Self::with_body(status, CONTENT_TYPE_TEXT, body)
    }

    /// `{"error": message}` body.
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::with_body(
            status,
            CONTENT_TYPE_JSON,
            json!({ "error": message }).to_string(),
        )
    }

    /// Empty 200 answering a CORS preflight.
    pub fn preflight() -> Self {
        Self::with_body(StatusCode::OK, CONTENT_TYPE_JSON, String::new())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
