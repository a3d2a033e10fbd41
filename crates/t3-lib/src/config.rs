//! Environment-driven configuration.
//!
//! Every knob is read from an environment variable. [`Settings::from_lookup`]
//! takes the lookup as a closure so tests can supply values without touching
//! process-wide state.
//!
//! | variable | meaning |
//! |---|---|
//! | `TFL_API_KEY` | optional TfL app key |
//! | `DARWIN_API_KEY` | Darwin OpenLDBWS token |
//! | `RTT_USERNAME`, `RTT_PASSWORD` | Realtime Trains credentials |
//! | `T3_TFL_BASE_URL` | TfL API base override |
//! | `T3_HUXLEY_BASE_URL` | Huxley2 base override |
//! | `T3_DARWIN_URL` | OpenLDBWS endpoint override |
//! | `T3_RTT_BASE_URL` | RTT API base override |
//!
//! The train provider is chosen separately by
//! [`TrainProvider::from_env`](crate::TrainProvider::from_env), so a bad
//! `TRAINS_PROVIDER` never affects bus lookups.

use crate::error::Result;

pub const TFL_API_BASE: &str = "https://api.tfl.gov.uk";
pub const HUXLEY2_BASE: &str = "https://huxley2.azurewebsites.net";
pub const DARWIN_ENDPOINT: &str = "https://lite.realtime.nationalrail.co.uk/OpenLDBWS/ldb11.asmx";
pub const RTT_API_BASE: &str = "https://api.rtt.io/api/v1";

/// TfL unified API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TflConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Huxley2 proxy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuxleyConfig {
    pub base_url: String,
}

/// Darwin OpenLDBWS settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DarwinConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

/// Realtime Trains settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RttConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// All upstream settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tfl: TflConfig,
    pub huxley: HuxleyConfig,
    pub darwin: DarwinConfig,
    pub rtt: RttConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tfl: TflConfig {
                base_url: TFL_API_BASE.to_string(),
                api_key: None,
            },
            huxley: HuxleyConfig {
                base_url: HUXLEY2_BASE.to_string(),
            },
            darwin: DarwinConfig {
                endpoint: DARWIN_ENDPOINT.to_string(),
                api_key: None,
            },
            rtt: RttConfig {
                base_url: RTT_API_BASE.to_string(),
                username: None,
                password: None,
            },
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let base = |key: &str, default: &str| {
            get(key)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            tfl: TflConfig {
                base_url: base("T3_TFL_BASE_URL", TFL_API_BASE),
                api_key: get("TFL_API_KEY"),
            },
            huxley: HuxleyConfig {
                base_url: base("T3_HUXLEY_BASE_URL", HUXLEY2_BASE),
            },
            darwin: DarwinConfig {
                endpoint: base("T3_DARWIN_URL", DARWIN_ENDPOINT),
                api_key: get("DARWIN_API_KEY"),
            },
            rtt: RttConfig {
                base_url: base("T3_RTT_BASE_URL", RTT_API_BASE),
                username: get("RTT_USERNAME"),
                password: get("RTT_PASSWORD"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_public_endpoints() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tfl.base_url, TFL_API_BASE);
        assert!(settings.darwin.api_key.is_none());
    }

    #[test]
    fn reads_credentials_and_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("TFL_API_KEY", "tfl-key"),
            ("DARWIN_API_KEY", "darwin-key"),
            ("RTT_USERNAME", "rttuser"),
            ("RTT_PASSWORD", "secret"),
            ("T3_TFL_BASE_URL", "http://127.0.0.1:9000/"),
        ]))
        .unwrap();

        assert_eq!(settings.tfl.api_key.as_deref(), Some("tfl-key"));
        assert_eq!(settings.tfl.base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.darwin.api_key.as_deref(), Some("darwin-key"));
        assert_eq!(settings.rtt.username.as_deref(), Some("rttuser"));
    }

    #[test]
    fn blank_values_are_unset() {
        let settings =
            Settings::from_lookup(lookup(&[("DARWIN_API_KEY", "  "), ("T3_RTT_BASE_URL", "")]))
                .unwrap();
        assert!(settings.darwin.api_key.is_none());
        assert_eq!(settings.rtt.base_url, RTT_API_BASE);
    }

    #[test]
    fn train_provider_is_not_part_of_settings() {
        let settings = Settings::from_lookup(lookup(&[("TRAINS_PROVIDER", "teletext")])).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
