//! AWS Lambda function for rail departure boards.
//!
//! Answers `GET /?from=sur&to=wat` with the next departures between the two
//! stations. The upstream is chosen once per cold start from `TRAINS_PROVIDER`;
//! an unknown name fails the cold start.

use http::StatusCode;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use t3_lambda_shared::{
    get_runtime, init_runtime, init_tracing, ApiGatewayEvent, ApiResponse, LambdaRuntime,
    OutputFormat, TrainsRequest, Validate,
};
use t3_lib::format::board_text;
use t3_lib::{fetch_board, TrainProvider};

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    init_tracing();

    init_runtime()?;
    let provider = TrainProvider::from_env()?;
    info!(provider = %provider, "trains Lambda ready");

    lambda_runtime::run(service_fn(move |event| handler(event, provider))).await
}

/// Lambda handler invoked per request.
pub async fn handler(
    event: LambdaEvent<Value>,
    provider: TrainProvider,
) -> Result<ApiResponse, Error> {
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

    Ok(handle(runtime, provider, event.payload, &request_id).await)
}

/// Core handler logic separated for reuse in tests.
pub async fn handle(
    runtime: &LambdaRuntime,
    provider: TrainProvider,
    payload: Value,
    request_id: &str,
) -> ApiResponse {
    let event: ApiGatewayEvent = match serde_json::from_value(payload) {
        Ok(event) => event,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "failed to parse event");
            return ApiResponse::error(StatusCode::BAD_REQUEST, &format!("Invalid request: {}", e));
        }
    };

    if event.is_preflight() {
        return ApiResponse::preflight();
    }

    let request: TrainsRequest = match event.parse_query() {
        Ok(request) => request,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "failed to parse query");
            return ApiResponse::error(StatusCode::BAD_REQUEST, &format!("Invalid request: {}", e));
        }
    };

    info!(
        request_id = %request_id,
        from = %request.from,
        to = %request.to,
        provider = %provider,
        "handling trains request"
    );

    if let Err(response) = request.validate(request_id) {
        return *response;
    }

    let board = match fetch_board(
        runtime.client(),
        runtime.settings(),
        provider,
        request.from.trim(),
        request.to.trim(),
    )
    .await
    {
        Ok(board) => board,
        Err(e) => {
            error!(request_id = %request_id, provider = %provider, error = %e, "departure board failed");
            return ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    info!(
        request_id = %request_id,
        departures = board.departures.len(),
        cancelled = board.departures.iter().filter(|d| d.cancelled).count(),
        "departure board served"
    );

    match request.format {
        OutputFormat::Json => ApiResponse::json(StatusCode::OK, &board),
        OutputFormat::Text => ApiResponse::text(StatusCode::OK, board_text(&board)),
    }
}
