//! K2 bus arrivals from the TfL unified API.
//!
//! Each configured stop has one NaPTAN stop point per direction. Both are
//! queried and the soonest K2 arrivals are kept for each.

use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::check_status;
use crate::config::TflConfig;
use crate::error::{Error, Result};
use crate::models::{BusArrivals, DirectionArrivals};

/// The bus route this service reports on.
pub const ROUTE: &str = "K2";

/// Arrivals kept per direction.
pub const ARRIVALS_PER_DIRECTION: usize = 2;

/// Stop used when the requested key is unknown.
pub const DEFAULT_STOP: &str = "parklands";

const TFL_USER_AGENT: &str = "t3-terse-transport-times/1.0";

/// A stop served by the K2 in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopConfig {
    pub key: &'static str,
    pub name: &'static str,
    pub inbound_naptan: &'static str,
    pub outbound_naptan: &'static str,
    pub inbound_destination: &'static str,
    pub outbound_destination: &'static str,
}

pub const STOPS: &[StopConfig] = &[
    StopConfig {
        key: "parklands",
        name: "Parklands",
        inbound_naptan: "490010781S",
        outbound_naptan: "490010781N",
        inbound_destination: "Kingston",
        outbound_destination: "Hook",
    },
    StopConfig {
        key: "surbiton",
        name: "Surbiton Station",
        // Claremont Road stop NC
        inbound_naptan: "490015165A",
        // stop NK
        outbound_naptan: "490015165B",
        inbound_destination: "Kingston",
        outbound_destination: "Hook",
    },
];

/// Look up a stop by key, falling back to Parklands.
pub fn stop_config(key: &str) -> &'static StopConfig {
    let key = key.trim().to_ascii_lowercase();
    match STOPS.iter().find(|stop| stop.key == key) {
        Some(stop) => stop,
        None => {
            warn!(stop = %key, fallback = DEFAULT_STOP, "unknown stop, using default");
            &STOPS[0]
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    line_name: String,
    #[serde(default)]
    time_to_station: u32,
}

async fn fetch_predictions(
    client: &Client,
    config: &TflConfig,
    naptan_id: &str,
) -> Result<Vec<Prediction>> {
    let url = format!("{}/StopPoint/{}/arrivals", config.base_url, naptan_id);
    let mut request = client.get(&url).header(USER_AGENT, TFL_USER_AGENT);
    if let Some(key) = &config.api_key {
        request = request.query(&[("app_key", key)]);
    }

    debug!(url = %url, "fetching TfL arrivals");
    let response = check_status(request.send().await?)?;
    Ok(response.json::<Vec<Prediction>>().await?)
}

/// Seconds until each K2 arrival, soonest first, truncated.
fn soonest_k2(predictions: &[Prediction]) -> Vec<u32> {
    let mut seconds: Vec<u32> = predictions
        .iter()
        .filter(|p| p.line_name == ROUTE)
        .map(|p| p.time_to_station)
        .collect();
    seconds.sort_unstable();
    seconds.truncate(ARRIVALS_PER_DIRECTION);
    seconds
}

/// Fetch K2 arrivals in both directions for `stop_key`.
///
/// A direction that fails is reported as empty unless both come back empty,
/// in which case the per-direction failures are joined into the error.
pub async fn fetch_bus_arrivals(
    client: &Client,
    config: &TflConfig,
    stop_key: &str,
) -> Result<BusArrivals> {
    let stop = stop_config(stop_key);

    let (inbound, outbound) = tokio::join!(
        fetch_predictions(client, config, stop.inbound_naptan),
        fetch_predictions(client, config, stop.outbound_naptan),
    );

    let mut failures = Vec::new();
    let mut direction = |label: &str, result: Result<Vec<Prediction>>| match result {
        Ok(predictions) => soonest_k2(&predictions),
        Err(err) => {
            warn!(stop = stop.key, direction = label, error = %err, "TfL arrivals failed");
            failures.push(format!("{}: {}", label, err));
            Vec::new()
        }
    };
    let inbound_seconds = direction("inbound", inbound);
    let outbound_seconds = direction("outbound", outbound);

    if !failures.is_empty() && inbound_seconds.is_empty() && outbound_seconds.is_empty() {
        return Err(Error::BusArrivalsUnavailable {
            reasons: failures.join("; "),
        });
    }

    info!(
        stop = stop.key,
        inbound = inbound_seconds.len(),
        outbound = outbound_seconds.len(),
        "bus arrivals collected"
    );

    let wrap = |seconds: Vec<u32>, destination: &str| {
        (!seconds.is_empty()).then(|| DirectionArrivals {
            seconds,
            destination: destination.to_string(),
        })
    };

    Ok(BusArrivals {
        stop: stop.name.to_string(),
        inbound: wrap(inbound_seconds, stop.inbound_destination),
        outbound: wrap(outbound_seconds, stop.outbound_destination),
    })
}
