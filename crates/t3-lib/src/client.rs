//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{Error, Result};

/// Every upstream call gives up after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client used for all upstream calls.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!("t3/{version}", version = env!("CARGO_PKG_VERSION"))
}

/// Turn a non-success response into [`Error::UpstreamStatus`].
pub(crate) fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::UpstreamStatus {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}
