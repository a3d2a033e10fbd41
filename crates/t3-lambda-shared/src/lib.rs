//! Shared infrastructure for the Terse Transport Times Lambda functions.
//!
//! This crate provides common functionality used across both Lambda handlers:
//!
//! - [`ApiGatewayEvent`]: the API Gateway proxy event, REST (v1) or HTTP API (v2)
//! - [`LambdaRuntime`]: settings and a shared HTTP client, built once per cold start
//! - [`init_tracing`]: JSON-formatted tracing for CloudWatch Logs
//! - [`ApiResponse`]: proxy responses carrying the CORS headers browsers need
//! - Request types with validation for each Lambda endpoint
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides event builders, fixtures and a local
//! upstream server for handler tests. Enable the `test-utils` feature to access
//! it from dependent crates.

mod requests;
mod response;
mod runtime;
mod tracing_init;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use requests::{ApiGatewayEvent, BusRequest, OutputFormat, TrainsRequest, Validate};
pub use response::ApiResponse;
pub use runtime::{get_runtime, init_runtime, InitError, LambdaRuntime};
pub use tracing_init::init_tracing;
