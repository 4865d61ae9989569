//! # Elvia - grid tariff and max-hour coordinator
//!
//! Polls the Elvia grid tariff and meter value APIs for one metering point
//! and turns the nested responses into a flat snapshot of the prices and
//! peak-usage hours that apply right now.
//!
//! ## Features
//!
//! - **Hourly gate**: at most one successful fetch per clock hour
//! - **Price resolution**: energy price and fixed-price tier for the current hour
//! - **Max hours**: top three peaks of the current and previous month
//! - **Flat snapshot**: every metric under a plain and a metering point prefixed key
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `elvia`: Wire types and the HTTP client
//! - `coordinator`: Update gate, derivation and snapshot publishing
//! - `sensor`: Sensor catalog read from the snapshot
//! - `diagnostics`: Raw payload dump for troubleshooting

pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod elvia;
pub mod error;
pub mod logging;
pub mod sensor;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{Coordinator, Snapshot};
pub use error::{ElviaError, Result};
