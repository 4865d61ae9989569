//! Hourly update coordinator
//!
//! Owns the state of one metering point: the hourly fetch gate, the last
//! resolved prices and the current snapshot. A cycle fetches both payloads,
//! derives prices and max hours, flattens them and publishes the result.
//! Nothing is committed until the whole cycle has succeeded, so a failed or
//! cancelled cycle leaves the previous snapshot and the gate untouched.

pub mod maxhours;
pub mod price;
pub mod snapshot;

#[cfg(test)]
mod tests;

use crate::elvia::types::{GridTariffCollection, MaxHoursCollection, TariffType};
use crate::elvia::GridTariffApi;
use crate::error::{ElviaError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub use maxhours::{MaxHourEntry, MaxHourSummary, Month, MonthAggregate};
pub use price::{ResolvedPrices, TariffPriceRecord};
pub use snapshot::Snapshot;

pub const DOMAIN: &str = "elvia";
pub const CONFIGURATION_URL: &str = "https://www.elvia.no/logg-inn/";

/// Presentation metadata for the tracked metering point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub identifiers: (String, String),
    pub configuration_url: String,
}

impl DeviceInfo {
    pub fn new(tariff_type: &TariffType, metering_point_id: &str) -> Self {
        Self {
            name: tariff_type.title.clone(),
            manufacturer: tariff_type.company_name.clone(),
            model: tariff_type.tariff_key.clone(),
            identifiers: (DOMAIN.to_string(), metering_point_id.to_string()),
            configuration_url: CONFIGURATION_URL.to_string(),
        }
    }
}

/// Everything a coordinator derives, updated only by a completed cycle
#[derive(Debug, Default)]
pub struct CoordinatorState {
    /// Hour of day of the last successful cycle
    pub last_fetched_hour: Option<u32>,
    pub last_update_success: bool,
    /// Stale-but-present: kept when a later cycle cannot resolve a price
    pub prices: Option<ResolvedPrices>,
    pub tariff_prices: Vec<TariffPriceRecord>,
    pub max_hours: MaxHourSummary,
    pub meteringpoint: Option<GridTariffCollection>,
    pub maxhours: Option<MaxHoursCollection>,
    pub snapshot: Arc<Snapshot>,
}

pub struct Coordinator {
    api: Box<dyn GridTariffApi>,
    metering_point_id: String,
    tariff_type: TariffType,
    device_info: DeviceInfo,
    tz: Tz,
    state: CoordinatorState,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    logger: StructuredLogger,
}

impl Coordinator {
    /// Create a coordinator for the metering point served by `api`.
    ///
    /// Fails with a configuration error when the metering point id or the
    /// tariff metadata is missing.
    pub fn new(api: Box<dyn GridTariffApi>, tariff_type: TariffType) -> Result<Self> {
        let metering_point_id = api.metering_point_id().trim().to_string();
        if metering_point_id.is_empty() {
            return Err(ElviaError::config("Metering point id is required"));
        }
        if tariff_type.tariff_key.trim().is_empty() {
            return Err(ElviaError::config("Tariff metadata is missing a tariff key"));
        }

        let logger = get_logger_with_context(
            LogContext::new("coordinator").with_metering_point(&metering_point_id),
        );
        let state = CoordinatorState::default();
        let (snapshot_tx, _rx) = watch::channel(Arc::clone(&state.snapshot));

        Ok(Self {
            api,
            device_info: DeviceInfo::new(&tariff_type, &metering_point_id),
            metering_point_id,
            tariff_type,
            tz: chrono_tz::Europe::Oslo,
            state,
            snapshot_tx,
            logger,
        })
    }

    /// Zone used for the hourly gate and price lookup in [`Self::run`]
    #[must_use]
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn metering_point_id(&self) -> &str {
        &self.metering_point_id
    }

    pub const fn tariff_type(&self) -> &TariffType {
        &self.tariff_type
    }

    pub const fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    pub const fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.snapshot)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Run one update attempt at `now`.
    ///
    /// Within an hour that already saw a successful cycle the current
    /// snapshot is returned without touching the API.
    pub async fn attempt_update(&mut self, now: DateTime<Tz>) -> Result<Arc<Snapshot>> {
        let hour = now.hour();
        if self.state.last_fetched_hour == Some(hour) {
            self.logger
                .trace(&format!("Hour {hour} already fetched, reusing snapshot"));
            return Ok(self.snapshot());
        }

        let (tariff_payload, maxhour_payload) = match self.fetch().await {
            Ok(payloads) => payloads,
            Err(e) => {
                self.state.last_update_success = false;
                self.logger.error(&format!("Update error {e}"));
                return Err(e);
            }
        };

        let resolved = price::resolve(&tariff_payload, &now);
        if resolved.is_none() {
            self.logger
                .warn("No tariff price found for the current hour, keeping previous prices");
        }
        let prices = resolved.or_else(|| self.state.prices.clone());
        let tariff_prices = price::tariff_prices(&tariff_payload);
        let max_hours = maxhours::aggregate(&maxhour_payload);

        let snapshot = Arc::new(snapshot::flatten(
            &self.metering_point_id,
            prices.as_ref(),
            &max_hours,
            snapshot::RawPayloads {
                meteringpoint: &tariff_payload,
                maxhours: &maxhour_payload,
                tariff_prices: &tariff_prices,
            },
        ));

        self.state = CoordinatorState {
            last_fetched_hour: Some(hour),
            last_update_success: true,
            prices,
            tariff_prices,
            max_hours,
            meteringpoint: Some(tariff_payload),
            maxhours: Some(maxhour_payload),
            snapshot: Arc::clone(&snapshot),
        };
        self.snapshot_tx.send_replace(Arc::clone(&snapshot));
        self.logger.info(&format!(
            "Snapshot updated for hour {hour} ({} keys)",
            snapshot.len()
        ));
        Ok(snapshot)
    }

    async fn fetch(&self) -> Result<(GridTariffCollection, MaxHoursCollection)> {
        let meteringpoint = self.api.meteringpoint().await?;
        let maxhours = self.api.maxhours().await?;
        Ok((meteringpoint, maxhours))
    }

    /// Poll on a fixed interval until `shutdown` resolves.
    ///
    /// Failed cycles are logged and retried on the next tick.
    pub async fn run<F>(&mut self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    self.logger.info("Shutdown requested, stopping updates");
                    break;
                }
                _ = ticker.tick() => {
                    let now = Utc::now().with_timezone(&self.tz);
                    if let Err(e) = self.attempt_update(now).await {
                        self.logger.warn(&format!("Update failed, will retry: {e}"));
                    }
                }
            }
        }
    }
}
