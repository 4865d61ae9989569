//! Elvia API integration
//!
//! Raw payload types and the client seam the coordinator fetches through.

pub mod client;
pub mod types;

pub use client::GridTariffApi;
#[cfg(feature = "client")]
pub use client::ElviaApiClient;
pub use types::{GridTariffCollection, MaxHoursCollection, TariffType};
