//! AWS Lambda function for K2 bus arrivals.
//!
//! Answers API Gateway requests such as `GET /?stop=surbiton&format=text`
//! with the next K2 buses in each direction at the stop.

use http::StatusCode;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use t3_lambda_shared::{
    get_runtime, init_runtime, init_tracing, ApiGatewayEvent, ApiResponse, BusRequest,
    LambdaRuntime, OutputFormat, Validate,
};
use t3_lib::fetch_bus_arrivals;
use t3_lib::format::bus_text;

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    init_tracing();

    // Unusable configuration fails the cold start instead of every request.
    init_runtime()?;

    lambda_runtime::run(service_fn(handler)).await
}

/// Lambda handler invoked per request.
pub async fn handler(event: LambdaEvent<Value>) -> Result<ApiResponse, Error> {
    let request_id = event.context.request_id.clone();

    let runtime = match get_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "runtime unavailable");
            return Ok(ApiResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &e.to_string(),
            ));
        }
    };

    Ok(handle(runtime, event.payload, &request_id).await)
}

/// Core handler logic separated for reuse in tests.
pub async fn handle(runtime: &LambdaRuntime, payload: Value, request_id: &str) -> ApiResponse {
    let event: ApiGatewayEvent = match serde_json::from_value(payload) {
        Ok(event) => event,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "failed to parse event");
            return ApiResponse::error(StatusCode::BAD_REQUEST, &format!("Invalid request: {}", e));
        }
    };

    if event.is_preflight() {
        info!(request_id = %request_id, "answering CORS preflight");
        return ApiResponse::preflight();
    }

    let request: BusRequest = match event.parse_query() {
        Ok(request) => request,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "failed to parse query");
            return ApiResponse::error(StatusCode::BAD_REQUEST, &format!("Invalid request: {}", e));
        }
    };

    info!(
        request_id = %request_id,
        stop = %request.stop,
        format = ?request.format,
        "handling bus request"
    );

    if let Err(response) = request.validate(request_id) {
        return *response;
    }

    let arrivals = match fetch_bus_arrivals(
        runtime.client(),
        &runtime.settings().tfl,
        &request.stop,
    )
    .await
    {
        Ok(arrivals) => arrivals,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "bus arrivals failed");
            return ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    info!(
        request_id = %request_id,
        stop = %arrivals.stop,
        inbound = arrivals.inbound.as_ref().map_or(0, |d| d.seconds.len()),
        outbound = arrivals.outbound.as_ref().map_or(0, |d| d.seconds.len()),
        "bus arrivals served"
    );

    match request.format {
        OutputFormat::Json => ApiResponse::json(StatusCode::OK, &arrivals),
        OutputFormat::Text => ApiResponse::text(StatusCode::OK, bus_text(&arrivals)),
    }
}
