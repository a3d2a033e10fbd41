//! Normalised response shapes shared by the Lambdas, the CLI and the mock server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;

/// One train departure, normalised across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Scheduled departure as `HHMM`.
    pub scheduled_departure: String,
    /// Expected departure as `HHMM`; the scheduled time when no estimate exists.
    pub expected_departure: String,
    /// Scheduled arrival at the destination as `HHMM`, or empty.
    pub arrival_time: String,
    /// Scheduled arrival adjusted by the departure delay, or empty.
    pub eta: String,
    pub journey_mins: i32,
    /// Intermediate calls before the destination.
    pub stops: usize,
    pub delay_minutes: i32,
    pub cancelled: bool,
    /// Raw provider status (`On time`, `Delayed`, `Cancelled` or an expected time).
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Raw facts about a departure as read from a provider, before derivation.
#[derive(Debug, Clone, Default)]
pub struct ServiceFacts {
    /// Scheduled departure (`HH:MM` or `HHMM`).
    pub scheduled: String,
    /// Expected departure or status word.
    pub expected: String,
    pub cancelled: bool,
    /// Scheduled arrival at the destination, when known.
    pub arrival: Option<String>,
    pub stops: usize,
    pub platform: Option<String>,
}

impl Departure {
    /// Derive the normalised departure from provider facts.
    pub fn from_facts(facts: ServiceFacts) -> Self {
        let ServiceFacts {
            scheduled,
            expected,
            cancelled,
            arrival,
            stops,
            platform,
        } = facts;

        let cancelled = cancelled || expected == clock::STATUS_CANCELLED;
        let scheduled_mins = clock::parse_clock(&scheduled);
        let expected_mins = if clock::is_status_word(&expected) {
            None
        } else {
            clock::parse_clock(&expected)
        };

        let delay_minutes = match (scheduled_mins, expected_mins) {
            (Some(s), Some(e)) => clock::delay_minutes(s, e),
            _ => 0,
        };

        let expected_departure = match expected_mins {
            Some(_) => clock::compact(&expected),
            None => clock::compact(&scheduled),
        };

        let arrival = arrival.unwrap_or_default();
        let arrival_mins = clock::parse_clock(&arrival);

        let journey_mins = match (scheduled_mins, arrival_mins) {
            (Some(d), Some(a)) => clock::journey_minutes(d, a),
            _ => 0,
        };

        let eta = arrival_mins
            .map(|a| clock::eta(a, delay_minutes))
            .unwrap_or_default();

        Self {
            scheduled_departure: clock::compact(&scheduled),
            expected_departure,
            arrival_time: clock::compact(&arrival),
            eta,
            journey_mins,
            stops,
            delay_minutes,
            cancelled,
            status: expected,
            platform,
        }
    }
}

/// A call made after the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallingPoint {
    pub crs: String,
    /// Scheduled time at this call.
    pub scheduled: String,
}

/// Find the call at `destination` among the subsequent calling points.
///
/// Returns the number of calls before it and the call itself. When no call
/// matches the CRS the last call is taken as the destination.
pub fn locate_destination<'a>(
    points: &'a [CallingPoint],
    destination: &str,
) -> (usize, Option<&'a CallingPoint>) {
    let index = points
        .iter()
        .position(|p| p.crs.eq_ignore_ascii_case(destination))
        .or_else(|| points.len().checked_sub(1));

    match index {
        Some(i) => (i, points.get(i)),
        None => (0, None),
    }
}

/// Like [`locate_destination`] but only a CRS match counts.
///
/// Without a match every call is counted as a stop and no call is returned,
/// so the departure carries no arrival time.
pub fn match_destination<'a>(
    points: &'a [CallingPoint],
    destination: &str,
) -> (usize, Option<&'a CallingPoint>) {
    match points
        .iter()
        .position(|p| p.crs.eq_ignore_ascii_case(destination))
    {
        Some(i) => (i, points.get(i)),
        None => (points.len(), None),
    }
}

/// A departure board between two stations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureBoard {
    pub origin_name: String,
    pub destination_name: String,
    /// UTC timestamp formatted `%Y-%m-%dT%H:%M:%SZ`.
    pub timestamp: String,
    pub departures: Vec<Departure>,
}

impl DepartureBoard {
    pub fn new(origin: &str, destination: &str, departures: Vec<Departure>) -> Self {
        Self::at(Utc::now(), origin, destination, departures)
    }

    /// Build a board stamped with an explicit time.
    pub fn at(
        now: DateTime<Utc>,
        origin: &str,
        destination: &str,
        departures: Vec<Departure>,
    ) -> Self {
        Self {
            origin_name: station_name(origin),
            destination_name: station_name(destination),
            timestamp: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            departures,
        }
    }
}

/// Display name for a CRS code; unknown codes are shown upper-cased.
pub fn station_name(crs: &str) -> String {
    match crs.to_ascii_lowercase().as_str() {
        "sur" => "Surbiton".to_string(),
        "wat" => "London Waterloo".to_string(),
        _ => crs.to_ascii_uppercase(),
    }
}

/// Upcoming arrivals in one direction at a bus stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionArrivals {
    /// Seconds until each arrival, soonest first.
    pub seconds: Vec<u32>,
    pub destination: String,
}

/// K2 arrivals in both directions at one stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusArrivals {
    pub stop: String,
    pub inbound: Option<DirectionArrivals>,
    pub outbound: Option<DirectionArrivals>,
}

/// One entry served by the mock bus server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockArrival {
    pub stop: String,
    pub direction: String,
    pub minutes: u32,
}

/// Payload served by the mock bus server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockBusTimes {
    /// Local time as `HH:MM`.
    pub timestamp: String,
    pub route: String,
    pub arrivals: Vec<MockArrival>,
}
