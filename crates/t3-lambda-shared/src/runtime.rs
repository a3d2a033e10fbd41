//! Lambda runtime initialization.
//!
//! Settings are read from the environment and the HTTP client is built once
//! per cold start, then reused by every invocation of that container.

use std::sync::OnceLock;
use std::time::Instant;

use reqwest::Client;
use tracing::{error, info};

use t3_lib::{build_client, Error as LibError, Settings};

/// Lazily-initialized Lambda runtime state.
static RUNTIME: OnceLock<Result<LambdaRuntime, InitError>> = OnceLock::new();

/// Error during runtime initialization.
#[derive(Debug, Clone)]
pub struct InitError {
    pub message: String,
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lambda initialization failed: {}", self.message)
    }
}

impl std::error::Error for InitError {}

impl From<LibError> for InitError {
    fn from(err: LibError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Settings and HTTP client shared by all invocations.
#[derive(Debug, Clone)]
pub struct LambdaRuntime {
    settings: Settings,
    client: Client,
}

impl LambdaRuntime {
    /// Assemble a runtime directly. Tests use this to point at local upstreams.
    pub fn new(settings: Settings, client: Client) -> Self {
        Self { settings, client }
    }

    /// Build a runtime from the process environment.
    pub fn from_env() -> Result<Self, InitError> {
        let settings = Settings::from_env()?;
        let client = build_client()?;
        Ok(Self::new(settings, client))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Initialize the runtime from the environment, once.
///
/// Later calls return the first result.
pub fn init_runtime() -> Result<&'static LambdaRuntime, InitError> {
    let result = RUNTIME.get_or_init(|| {
        let start = Instant::now();
        let runtime = LambdaRuntime::from_env()?;
        info!(
            init_ms = start.elapsed().as_millis(),
            tfl_key = runtime.settings.tfl.api_key.is_some(),
            darwin_key = runtime.settings.darwin.api_key.is_some(),
            rtt_credentials = runtime.settings.rtt.username.is_some(),
            "Lambda runtime initialization complete"
        );
        Ok(runtime)
    });

    match result {
        Ok(runtime) => Ok(runtime),
        Err(e) => {
            error!(error = %e, "Lambda runtime initialization failed");
            Err(e.clone())
        }
    }
}

/// Get the initialized runtime.
pub fn get_runtime() -> Result<&'static LambdaRuntime, InitError> {
    match RUNTIME.get() {
        Some(Ok(runtime)) => Ok(runtime),
        Some(Err(e)) => Err(e.clone()),
        None => Err(InitError {
            message: "runtime not initialized; call init_runtime() first".to_string(),
        }),
    }
}
