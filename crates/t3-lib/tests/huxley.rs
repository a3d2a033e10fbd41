mod common;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use t3_lib::config::HuxleyConfig;
use t3_lib::huxley::{fetch_departures, MAX_SERVICES};

/// Huxley2 requests identify the app and ask for JSON.
fn expected_headers(headers: &HeaderMap) -> bool {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    header("user-agent") == Some("t3-trains/1.0") && header("accept") == Some("application/json")
}

fn upstream(failing_service: Option<&'static str>) -> Router {
    Router::new()
        .route(
            "/departures/{from}/to/{to}",
            get(
                |headers: HeaderMap, Path((from, to)): Path<(String, String)>| async move {
                    if !expected_headers(&headers) {
                        return (StatusCode::BAD_REQUEST, "unexpected headers".to_string());
                    }
                    assert_eq!(from, "sur");
                    assert_eq!(to, "wat");
                    (StatusCode::OK, common::fixture("huxley_departures.json"))
                },
            ),
        )
        .route(
            "/service/{id}",
            get(move |headers: HeaderMap, Path(id): Path<String>| async move {
                if !expected_headers(&headers) {
                    (StatusCode::BAD_REQUEST, "unexpected headers".to_string())
                } else if Some(id.as_str()) == failing_service {
                    (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                } else {
                    (StatusCode::OK, common::fixture("huxley_service.json"))
                }
            }),
        )
}

fn json_router(board: Value, service: Value) -> Router {
    Router::new()
        .route(
            "/departures/{from}/to/{to}",
            get(move || async move { axum::Json(board) }),
        )
        .route(
            "/service/{id}",
            get(move || async move { axum::Json(service) }),
        )
}

#[tokio::test]
async fn normalises_board_with_service_details() {
    let base = common::serve(upstream(None)).await;
    let config = HuxleyConfig { base_url: base };

    let departures = fetch_departures(&common::client(), &config, "sur", "wat")
        .await
        .expect("departures");
    assert_eq!(departures.len(), 3);

    let on_time = &departures[0];
    assert_eq!(on_time.scheduled_departure, "1002");
    assert_eq!(on_time.expected_departure, "1002");
    assert_eq!(on_time.arrival_time, "1023");
    assert_eq!(on_time.eta, "1023");
    assert_eq!(on_time.journey_mins, 21);
    assert_eq!(on_time.stops, 2);
    assert_eq!(on_time.delay_minutes, 0);
    assert_eq!(on_time.platform.as_deref(), Some("2"));

    let late = &departures[1];
    assert_eq!(late.expected_departure, "1016");
    assert_eq!(late.delay_minutes, 4);
    assert_eq!(late.eta, "1027");
    assert!(late.platform.is_none());

    let cancelled = &departures[2];
    assert!(cancelled.cancelled);
    assert_eq!(cancelled.status, "Cancelled");
    assert_eq!(cancelled.arrival_time, "");
    assert_eq!(cancelled.journey_mins, 0);
}

#[tokio::test]
async fn failed_service_details_leave_arrival_blank() {
    let base = common::serve(upstream(Some("svc-1012"))).await;
    let config = HuxleyConfig { base_url: base };

    let departures = fetch_departures(&common::client(), &config, "sur", "wat")
        .await
        .expect("departures");

    assert_eq!(departures[0].arrival_time, "1023");
    assert_eq!(departures[1].arrival_time, "");
    assert_eq!(departures[1].eta, "");
    assert_eq!(departures[1].delay_minutes, 4);
}

#[tokio::test]
async fn board_failure_is_an_error() {
    let router = Router::new().route(
        "/departures/{from}/to/{to}",
        get(|| async { (StatusCode::BAD_GATEWAY, "nope") }),
    );
    let base = common::serve(router).await;
    let config = HuxleyConfig { base_url: base };

    let err = fetch_departures(&common::client(), &config, "sur", "wat")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("502"), "{err}");
}

#[tokio::test]
async fn board_is_named_and_stamped() {
    let base = common::serve(upstream(None)).await;
    let mut settings = t3_lib::Settings::default();
    settings.huxley.base_url = base;

    let board = t3_lib::fetch_board(
        &common::client(),
        &settings,
        t3_lib::TrainProvider::Huxley,
        "sur",
        "wat",
    )
    .await
    .expect("board");

    assert_eq!(board.origin_name, "Surbiton");
    assert_eq!(board.destination_name, "London Waterloo");
    assert!(board.timestamp.ends_with('Z'));
    assert_eq!(board.departures.len(), 3);
}

#[tokio::test]
async fn destination_missing_from_calling_points_leaves_arrival_blank() {
    let board = json!({
        "trainServices": [
            { "std": "10:02", "etd": "On time", "serviceIdUrlSafe": "svc-1002" }
        ]
    });
    let service = json!({
        "subsequentCallingPoints": [
            { "callingPoint": [
                { "crs": "WIM", "st": "10:09" },
                { "crs": "CLJ", "st": "10:16" }
            ] }
        ]
    });
    let base = common::serve(json_router(board, service)).await;
    let config = HuxleyConfig { base_url: base };

    let departures = fetch_departures(&common::client(), &config, "sur", "wat")
        .await
        .expect("departures");

    let departure = &departures[0];
    assert_eq!(departure.arrival_time, "");
    assert_eq!(departure.eta, "");
    assert_eq!(departure.journey_mins, 0);
    assert_eq!(departure.stops, 2);
}

#[tokio::test]
async fn only_the_first_services_are_used() {
    let services: Vec<Value> = (0..9)
        .map(|i| json!({ "std": format!("10:{:02}", i * 5), "etd": "On time" }))
        .collect();
    let board = json!({ "trainServices": services });
    let base = common::serve(json_router(board, json!({}))).await;
    let config = HuxleyConfig { base_url: base };

    let departures = fetch_departures(&common::client(), &config, "sur", "wat")
        .await
        .expect("departures");

    assert_eq!(departures.len(), MAX_SERVICES);
    assert_eq!(departures[0].scheduled_departure, "1000");
    assert_eq!(departures[5].scheduled_departure, "1025");
}
