//! Mock K2 bus times server.
//!
//! ```text
//! t3-mock-server [PORT]
//! ```
//!
//! # Configuration
//!
//! - `MOCK_PORT` - HTTP port when no argument is given (default: 8000)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: text (default) or json

use std::env;
use std::net::SocketAddr;

use tracing::info;

use t3_mock_server::{app, init_logging, resolve_port, shutdown_signal, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env());

    let arg = env::args().nth(1);
    let env_port = env::var("MOCK_PORT").ok();
    let port = resolve_port(arg.as_deref(), env_port.as_deref())?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "mock K2 bus times server running");
    info!("local:   http://localhost:{}", port);
    info!("network: http://<your-ip>:{}", port);
    info!("test it: curl http://localhost:{}", port);
    info!("press Ctrl+C to stop");

    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mock server stopped");
    Ok(())
}
