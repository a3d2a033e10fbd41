//! API Gateway proxy events and the request types read from them.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::ApiResponse;

/// Validation trait for Lambda request types.
///
/// Implementations check every field and return a ready-made 400 response
/// for invalid input.
pub trait Validate {
    /// Validate the request, returning the error response if invalid.
    ///
    /// The `request_id` is only used for logging. The response is boxed to
    /// avoid a large `Result::Err` variant.
    fn validate(&self, request_id: &str) -> Result<(), Box<ApiResponse>>;
}

/// The parts of an API Gateway proxy event the handlers read.
///
/// Both the REST API (v1) and HTTP API (v2) payload formats are accepted.
/// A direct invocation with `{}` is treated as a `GET` with no parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayEvent {
    /// v1 method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    /// Query parameters; API Gateway sends `null` when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpContext>,
}

/// v2 `requestContext.http`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl ApiGatewayEvent {
    /// HTTP method of the request, upper-cased. Defaults to `GET`.
    pub fn method(&self) -> String {
        self.http_method
            .as_deref()
            .or_else(|| {
                self.request_context
                    .as_ref()
                    .and_then(|c| c.http.as_ref())
                    .and_then(|h| h.method.as_deref())
            })
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    /// True for a CORS preflight.
    pub fn is_preflight(&self) -> bool {
        self.method() == "OPTIONS"
    }

    /// A single query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|q| q.get(name))
            .map(String::as_str)
    }

    /// Deserialize the query parameters into a request type.
    ///
    /// Blank values are dropped first, so `?stop=` falls back to the default
    /// stop the same way a missing parameter does.
    pub fn parse_query<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let params: Map<String, Value> = self
            .query_string_parameters
            .iter()
            .flatten()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        serde_json::from_value(Value::Object(params))
    }
}

/// Response body encoding selected by `?format=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Query for the bus Lambda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusRequest {
    /// Stop key; unknown keys fall back to Parklands.
    #[serde(default = "default_stop")]
    pub stop: String,

    #[serde(default)]
    pub format: OutputFormat,
}

fn default_stop() -> String {
    t3_lib::tfl::DEFAULT_STOP.to_string()
}

impl Default for BusRequest {
    fn default() -> Self {
        Self {
            stop: default_stop(),
            format: OutputFormat::default(),
        }
    }
}

/// Query for the trains Lambda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainsRequest {
    /// Origin CRS code.
    #[serde(default = "default_from")]
    pub from: String,

    /// Destination CRS code.
    #[serde(default = "default_to")]
    pub to: String,

    #[serde(default)]
    pub format: OutputFormat,
}

fn default_from() -> String {
    "sur".to_string()
}

fn default_to() -> String {
    "wat".to_string()
}

impl Default for TrainsRequest {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            format: OutputFormat::default(),
        }
    }
}

fn is_crs(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

fn rejected(request_id: &str, message: String) -> Box<ApiResponse> {
    warn!(request_id = %request_id, reason = %message, "request rejected");
    Box::new(ApiResponse::error(http::StatusCode::BAD_REQUEST, &message))
}

impl Validate for BusRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ApiResponse>> {
        if self.stop.trim().is_empty() {
            return Err(rejected(
                request_id,
                "The 'stop' parameter cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Validate for TrainsRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ApiResponse>> {
        for (name, value) in [("from", &self.from), ("to", &self.to)] {
            if !is_crs(value.trim()) {
                return Err(rejected(
                    request_id,
                    format!(
                        "The '{}' parameter must be a 3-letter station code, got '{}'",
                        name, value
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rest_event_with_null_query() {
        let event: ApiGatewayEvent = serde_json::from_value(json!({
            "httpMethod": "GET",
            "queryStringParameters": null
        }))
        .unwrap();
        assert_eq!(event.method(), "GET");
        assert!(!event.is_preflight());
        let request: BusRequest = event.parse_query().unwrap();
        assert_eq!(request, BusRequest::default());
    }

    #[test]
    fn http_api_preflight() {
        let event: ApiGatewayEvent = serde_json::from_value(json!({
            "requestContext": { "http": { "method": "options" } }
        }))
        .unwrap();
        assert!(event.is_preflight());
    }

    #[test]
    fn empty_payload_is_a_get() {
        let event: ApiGatewayEvent = serde_json::from_value(json!({})).unwrap();
        assert_eq!(event.method(), "GET");
        assert!(event.query("stop").is_none());
    }

    #[test]
    fn trains_request_from_query() {
        let event: ApiGatewayEvent = serde_json::from_value(json!({
            "queryStringParameters": { "from": "wat", "to": "sur", "format": "text" }
        }))
        .unwrap();
        let request: TrainsRequest = event.parse_query().unwrap();
        assert_eq!(request.from, "wat");
        assert_eq!(request.to, "sur");
        assert_eq!(request.format, OutputFormat::Text);
        assert!(request.validate("t").is_ok());
    }

    #[test]
    fn blank_parameters_use_defaults() {
        let event: ApiGatewayEvent = serde_json::from_value(json!({
            "queryStringParameters": { "stop": "  " }
        }))
        .unwrap();
        let request: BusRequest = event.parse_query().unwrap();
        assert_eq!(request.stop, "parklands");
    }

    #[test]
    fn unknown_format_fails_to_parse() {
        let event: ApiGatewayEvent = serde_json::from_value(json!({
            "queryStringParameters": { "format": "xml" }
        }))
        .unwrap();
        assert!(event.parse_query::<BusRequest>().is_err());
    }

    #[test]
    fn bad_crs_is_rejected() {
        let request = TrainsRequest {
            to: "w4t".to_string(),
            ..TrainsRequest::default()
        };
        let err = request.validate("t").unwrap_err();
        assert_eq!(err.status_code, 400);
        assert!(err.body.contains("'to'"));

        let request = TrainsRequest {
            from: "surb".to_string(),
            ..TrainsRequest::default()
        };
        assert!(request.validate("t").is_err());
    }

    #[test]
    fn blank_stop_is_rejected() {
        let request = BusRequest {
            stop: " ".to_string(),
            format: OutputFormat::Json,
        };
        assert_eq!(request.validate("t").unwrap_err().status_code, 400);
    }
}
