//! Rail provider selection and the departure-board entry point.

use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::DepartureBoard;
use crate::{darwin, huxley, rtt};

/// Upstream sources for rail departures.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainProvider {
    /// Huxley2 JSON proxy (no key required).
    #[default]
    Huxley,
    /// National Rail Darwin OpenLDBWS SOAP service.
    Darwin,
    /// Realtime Trains pull API.
    Rtt,
}

impl TrainProvider {
    pub const ALL: [TrainProvider; 3] = [
        TrainProvider::Huxley,
        TrainProvider::Darwin,
        TrainProvider::Rtt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TrainProvider::Huxley => "huxley",
            TrainProvider::Darwin => "darwin",
            TrainProvider::Rtt => "rtt",
        }
    }

    /// Read `TRAINS_PROVIDER` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `TRAINS_PROVIDER` through `lookup`; unset or blank means Huxley2.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("TRAINS_PROVIDER").filter(|v| !v.trim().is_empty()) {
            Some(name) => name.parse(),
            None => Ok(Self::default()),
        }
    }
}

impl fmt::Display for TrainProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainProvider {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let name = value.trim();
        TrainProvider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownProvider {
                name: name.to_string(),
            })
    }
}

/// Fetch the departure board from `origin` to `destination` using `provider`.
pub async fn fetch_board(
    client: &Client,
    settings: &Settings,
    provider: TrainProvider,
    origin: &str,
    destination: &str,
) -> Result<DepartureBoard> {
    info!(provider = %provider, origin = %origin, destination = %destination, "fetching departure board");

    let departures = match provider {
        TrainProvider::Huxley => {
            huxley::fetch_departures(client, &settings.huxley, origin, destination).await?
        }
        TrainProvider::Darwin => {
            darwin::fetch_departures(client, &settings.darwin, origin, destination).await?
        }
        TrainProvider::Rtt => {
            rtt::fetch_departures(client, &settings.rtt, origin, destination).await?
        }
    };

    Ok(DepartureBoard::new(origin, destination, departures))
}
