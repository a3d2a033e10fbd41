//! Departures from the Realtime Trains (RTT) pull API.
//!
//! RTT uses HTTP basic auth and compact `HHMM` times. The search call lists
//! services at the origin filtered to the destination; a second call per
//! service returns its locations so the destination arrival can be found.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::check_status;
use crate::clock::{self, STATUS_CANCELLED, STATUS_ON_TIME};
use crate::config::RttConfig;
use crate::error::{Error, Result};
use crate::models::{match_destination, CallingPoint, Departure, ServiceFacts};

/// Services taken from the top of the search.
pub const MAX_SERVICES: usize = 6;

#[derive(Debug, Deserialize)]
struct Search {
    #[serde(default)]
    services: Option<Vec<SearchService>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchService {
    location_detail: LocationDetail,
    #[serde(default)]
    service_uid: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    run_date: Option<String>,
    #[serde(default)]
    is_passenger: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationDetail {
    #[serde(default)]
    crs: Option<String>,
    #[serde(default)]
    gbtt_booked_arrival: Option<String>,
    #[serde(default)]
    gbtt_booked_departure: Option<String>,
    #[serde(default)]
    realtime_departure: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    display_as: Option<String>,
    #[serde(default)]
    cancel_reason_code: Option<String>,
}

impl LocationDetail {
    fn is_cancelled(&self) -> bool {
        self.display_as
            .as_deref()
            .is_some_and(|d| d.contains("CANCELLED"))
            || self.cancel_reason_code.is_some()
    }

    /// Status in the same vocabulary as Darwin.
    fn status(&self) -> String {
        if self.is_cancelled() {
            return STATUS_CANCELLED.to_string();
        }
        match (&self.realtime_departure, &self.gbtt_booked_departure) {
            (Some(realtime), Some(booked)) if realtime != booked => clock::with_colon(realtime),
            _ => STATUS_ON_TIME.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceDetails {
    #[serde(default)]
    locations: Vec<LocationDetail>,
}

impl ServiceDetails {
    /// Public calls after the origin.
    fn calling_points(&self, origin: &str) -> Vec<CallingPoint> {
        let start = self
            .locations
            .iter()
            .position(|l| {
                l.crs
                    .as_deref()
                    .is_some_and(|crs| crs.eq_ignore_ascii_case(origin))
            })
            .map(|i| i + 1)
            .unwrap_or(0);

        self.locations[start..]
            .iter()
            .filter_map(|l| {
                let arrival = l.gbtt_booked_arrival.as_deref()?;
                Some(CallingPoint {
                    crs: l.crs.clone().unwrap_or_default(),
                    scheduled: clock::with_colon(arrival),
                })
            })
            .collect()
    }
}

fn credentials(config: &RttConfig) -> Result<(&str, &str)> {
    match (config.username.as_deref(), config.password.as_deref()) {
        (Some(user), Some(pass)) => Ok((user, pass)),
        _ => Err(Error::MissingCredential {
            what: "RTT credentials",
        }),
    }
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    config: &RttConfig,
    url: &str,
) -> Result<T> {
    let (user, pass) = credentials(config)?;
    let response = client.get(url).basic_auth(user, Some(pass)).send().await?;
    Ok(check_status(response)?.json::<T>().await?)
}

async fn fetch_service_details(
    client: &Client,
    config: &RttConfig,
    service_uid: &str,
    run_date: &str,
) -> Option<ServiceDetails> {
    let url = format!(
        "{}/json/service/{}/{}",
        config.base_url,
        service_uid,
        run_date.replace('-', "/")
    );
    match get_json::<ServiceDetails>(client, config, &url).await {
        Ok(details) => Some(details),
        Err(err) => {
            warn!(service_uid = %service_uid, error = %err, "failed to fetch RTT service details");
            None
        }
    }
}

/// Fetch up to [`MAX_SERVICES`] passenger departures from `origin` to `destination`.
pub async fn fetch_departures(
    client: &Client,
    config: &RttConfig,
    origin: &str,
    destination: &str,
) -> Result<Vec<Departure>> {
    credentials(config)?;

    let origin = origin.to_ascii_uppercase();
    let destination = destination.to_ascii_uppercase();
    let url = format!(
        "{}/json/search/{}/to/{}",
        config.base_url, origin, destination
    );
    info!(url = %url, "fetching RTT departures");

    let search: Search = get_json(client, config, &url).await?;
    let services = search.services.unwrap_or_default();
    debug!(count = services.len(), "RTT search received");

    let mut departures = Vec::new();
    for service in services
        .into_iter()
        .filter(|s| s.is_passenger != Some(false))
        .take(MAX_SERVICES)
    {
        let detail = &service.location_detail;
        let cancelled = detail.is_cancelled();

        let mut facts = ServiceFacts {
            scheduled: detail
                .gbtt_booked_departure
                .as_deref()
                .map(clock::with_colon)
                .unwrap_or_default(),
            expected: detail.status(),
            cancelled,
            platform: detail.platform.clone().filter(|p| !p.is_empty()),
            ..ServiceFacts::default()
        };

        if let (false, Some(uid), Some(run_date)) =
            (cancelled, &service.service_uid, &service.run_date)
        {
            if let Some(details) = fetch_service_details(client, config, uid, run_date).await {
                let points = details.calling_points(&origin);
                let (stops, call) = match_destination(&points, &destination);
                facts.stops = stops;
                facts.arrival = call.map(|c| c.scheduled.clone());
            }
        }

        departures.push(Departure::from_facts(facts));
    }

    Ok(departures)
}
