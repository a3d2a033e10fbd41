//! Local mock of the K2 bus times API.
//!
//! Serves plausible, randomised arrivals so a client app can be developed
//! without AWS or a TfL key. Every `GET` path except `/health/live` returns
//! a fresh set of times.

pub mod health;
pub mod logging;

use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Local;
use rand::Rng;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use t3_lib::models::{MockArrival, MockBusTimes};
use t3_lib::tfl::ROUTE;

pub use health::health_live;
pub use logging::{init_logging, LogFormat, LoggingConfig};

/// Port used when neither an argument nor `MOCK_PORT` is given.
pub const DEFAULT_PORT: u16 = 8000;

/// A stop on the mock route and the range its arrival is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockStop {
    pub name: &'static str,
    pub direction: &'static str,
    pub min_minutes: u32,
    pub max_minutes: u32,
}

pub const MOCK_STOPS: [MockStop; 7] = [
    MockStop {
        name: "Bethnal Green, Wellington Row",
        direction: "inbound",
        min_minutes: 2,
        max_minutes: 5,
    },
    MockStop {
        name: "Shoreditch High Street",
        direction: "inbound",
        min_minutes: 6,
        max_minutes: 10,
    },
    MockStop {
        name: "Liverpool Street Station",
        direction: "inbound",
        min_minutes: 8,
        max_minutes: 12,
    },
    MockStop {
        name: "Aldgate",
        direction: "inbound",
        min_minutes: 10,
        max_minutes: 15,
    },
    MockStop {
        name: "Bank",
        direction: "outbound",
        min_minutes: 3,
        max_minutes: 7,
    },
    MockStop {
        name: "Old Street Station",
        direction: "outbound",
        min_minutes: 9,
        max_minutes: 14,
    },
    MockStop {
        name: "Essex Road",
        direction: "outbound",
        min_minutes: 12,
        max_minutes: 18,
    },
];

/// Draw one set of arrivals, sorted soonest first.
pub fn mock_bus_times<R: Rng>(rng: &mut R, timestamp: String) -> MockBusTimes {
    let mut arrivals: Vec<MockArrival> = MOCK_STOPS
        .iter()
        .map(|stop| MockArrival {
            stop: stop.name.to_string(),
            direction: stop.direction.to_string(),
            minutes: rng.random_range(stop.min_minutes..=stop.max_minutes),
        })
        .collect();
    arrivals.sort_by_key(|a| a.minutes);

    MockBusTimes {
        timestamp,
        route: ROUTE.to_string(),
        arrivals,
    }
}

async fn bus_times() -> Response {
    let times = mock_bus_times(&mut rand::rng(), Local::now().format("%H:%M").to_string());

    match serde_json::to_string_pretty(&times) {
        Ok(body) => {
            info!(
                arrivals = times.arrivals.len(),
                soonest = times.arrivals.first().map(|a| a.minutes),
                "served mock bus times"
            );
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to render mock bus times");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Build the mock server router.
pub fn app() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health/live", get(health_live))
        .route("/", get(bus_times))
        .route("/{*path}", get(bus_times))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Pick the listen port from the first CLI argument, then `MOCK_PORT`, then
/// [`DEFAULT_PORT`].
pub fn resolve_port(arg: Option<&str>, env: Option<&str>) -> Result<u16, String> {
    match arg.or(env).map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|e| format!("invalid port '{}': {}", value, e)),
        None => Ok(DEFAULT_PORT),
    }
}

/// Resolves when Ctrl-C is pressed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn arrivals_stay_in_range_and_sorted() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let times = mock_bus_times(&mut rng, "12:34".to_string());
            assert_eq!(times.route, "K2");
            assert_eq!(times.timestamp, "12:34");
            assert_eq!(times.arrivals.len(), MOCK_STOPS.len());
            assert!(times
                .arrivals
                .windows(2)
                .all(|w| w[0].minutes <= w[1].minutes));
            for arrival in &times.arrivals {
                let stop = MOCK_STOPS
                    .iter()
                    .find(|s| s.name == arrival.stop)
                    .expect("known stop");
                assert_eq!(arrival.direction, stop.direction);
                assert!((stop.min_minutes..=stop.max_minutes).contains(&arrival.minutes));
            }
        }
    }

    #[test]
    fn port_precedence() {
        assert_eq!(resolve_port(Some("9000"), Some("9100")), Ok(9000));
        assert_eq!(resolve_port(None, Some("9100")), Ok(9100));
        assert_eq!(resolve_port(None, None), Ok(DEFAULT_PORT));
        assert_eq!(resolve_port(None, Some(" ")), Ok(DEFAULT_PORT));
        assert!(resolve_port(Some("eighty"), None).is_err());
        assert!(resolve_port(Some("70000"), None).is_err());
    }
}
