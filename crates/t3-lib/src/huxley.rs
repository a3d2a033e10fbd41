//! Departures through the Huxley2 JSON proxy for Darwin.
//!
//! Huxley2 needs no key. The board call returns the services; each service
//! then needs a second call for its calling points.

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::check_status;
use crate::config::HuxleyConfig;
use crate::error::Result;
use crate::models::{match_destination, CallingPoint, Departure, ServiceFacts};

/// Services taken from the top of the board.
pub const MAX_SERVICES: usize = 6;

const HUXLEY_USER_AGENT: &str = "t3-trains/1.0";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Board {
    #[serde(default)]
    train_services: Option<Vec<BoardService>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardService {
    #[serde(default)]
    std: Option<String>,
    #[serde(default)]
    etd: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    is_cancelled: Option<bool>,
    #[serde(default)]
    service_id_url_safe: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceDetails {
    #[serde(default)]
    subsequent_calling_points: Option<Vec<CallingPointGroup>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallingPointGroup {
    #[serde(default)]
    calling_point: Option<Vec<HuxleyCallingPoint>>,
}

#[derive(Debug, Deserialize)]
struct HuxleyCallingPoint {
    #[serde(default)]
    crs: Option<String>,
    #[serde(default)]
    st: Option<String>,
}

impl ServiceDetails {
    fn calling_points(self) -> Vec<CallingPoint> {
        self.subsequent_calling_points
            .unwrap_or_default()
            .into_iter()
            .flat_map(|group| group.calling_point.unwrap_or_default())
            .map(|cp| CallingPoint {
                crs: cp.crs.unwrap_or_default(),
                scheduled: cp.st.unwrap_or_default(),
            })
            .collect()
    }
}

async fn get_json<T: serde::de::DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let response = client
        .get(url)
        .header(USER_AGENT, HUXLEY_USER_AGENT)
        .header(ACCEPT, "application/json")
        .send()
        .await?;
    Ok(check_status(response)?.json::<T>().await?)
}

async fn fetch_service_details(
    client: &Client,
    config: &HuxleyConfig,
    service_id: &str,
) -> Option<ServiceDetails> {
    let url = format!("{}/service/{}", config.base_url, service_id);
    match get_json::<ServiceDetails>(client, &url).await {
        Ok(details) => Some(details),
        Err(err) => {
            warn!(service_id = %service_id, error = %err, "failed to fetch service details");
            None
        }
    }
}

/// Fetch up to [`MAX_SERVICES`] departures from `origin` calling at `destination`.
pub async fn fetch_departures(
    client: &Client,
    config: &HuxleyConfig,
    origin: &str,
    destination: &str,
) -> Result<Vec<Departure>> {
    let url = format!(
        "{}/departures/{}/to/{}",
        config.base_url, origin, destination
    );
    info!(url = %url, "fetching Huxley2 departures");

    let board: Board = get_json(client, &url).await?;
    let services = board.train_services.unwrap_or_default();
    debug!(count = services.len(), "Huxley2 board received");

    let mut departures = Vec::new();
    for service in services.into_iter().take(MAX_SERVICES) {
        let etd = service.etd.unwrap_or_default();
        let cancelled =
            service.is_cancelled.unwrap_or(false) || etd == crate::clock::STATUS_CANCELLED;

        let mut facts = ServiceFacts {
            scheduled: service.std.unwrap_or_default(),
            expected: etd,
            cancelled,
            platform: service.platform.filter(|p| !p.is_empty()),
            ..ServiceFacts::default()
        };

        let service_id = service.service_id_url_safe.unwrap_or_default();
        if !service_id.is_empty() && !cancelled {
            if let Some(details) = fetch_service_details(client, config, &service_id).await {
                let points = details.calling_points();
                let (stops, call) = match_destination(&points, destination);
                facts.stops = stops;
                facts.arrival = call.map(|c| c.scheduled.clone()).filter(|s| !s.is_empty());
            }
        }

        departures.push(Departure::from_facts(facts));
    }

    Ok(departures)
}
