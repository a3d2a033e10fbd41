//! Tracing initialization for Lambda functions.
//!
//! CloudWatch Logs indexes one JSON object per line, so events are flattened
//! into the top-level object.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize JSON tracing for CloudWatch Logs.
///
/// Call once at the start of the Lambda `main`, before `lambda_runtime::run()`.
/// The level comes from `RUST_LOG` and defaults to `info`. A second call is a
/// no-op.
///
/// # Example
///
/// ```no_run
/// use t3_lambda_shared::init_tracing;
///
/// #[tokio::main]
/// async fn main() -> Result<(), lambda_runtime::Error> {
///     init_tracing();
///     // ... rest of Lambda setup
///     Ok(())
/// }
/// ```
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The Lambda runtime already stamps each log line with the time.
    let fmt_layer = fmt::layer()
        .json()
        .without_time()
        .with_target(true)
        .with_current_span(false)
        .flatten_event(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
