//! Terse Transport Times library entry points.
//!
//! This crate talks to the upstream transit APIs (TfL, Huxley2, Darwin OpenLDBWS
//! and Realtime Trains) and normalises what they return into the small JSON
//! shapes served by the Lambdas and the CLI. Higher-level consumers should only
//! depend on the functions exported here instead of reimplementing behavior.

pub mod client;
pub mod clock;
pub mod config;
pub mod darwin;
pub mod error;
pub mod format;
pub mod huxley;
pub mod models;
pub mod rtt;
pub mod tfl;
pub mod trains;

pub use client::build_client;
pub use config::Settings;
pub use error::{Error, Result};
pub use models::{BusArrivals, Departure, DepartureBoard, DirectionArrivals};
pub use tfl::fetch_bus_arrivals;
pub use trains::{fetch_board, TrainProvider};
