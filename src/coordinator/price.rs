//! Current-hour price lookup inside the nested tariff structure.
//!
//! Timestamps are compared as strings. Every timestamp in the payload has the
//! fixed-width `YYYY-MM-DDTHH:MM:SS+hh:mm` layout, so lexicographic order
//! matches chronological order as long as the offsets agree.

use crate::elvia::types::{GridTariffCollection, HourPrice, PriceLevel, TariffPrice};
use chrono::{DateTime, Duration};
use chrono_tz::{OffsetComponents, Tz};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SUMMER_OFFSET: &str = "+02:00";
const WINTER_OFFSET: &str = "+01:00";

/// Prices in effect for the current hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrices {
    /// Variable energy price for the matched hour
    pub energy_price: f64,
    /// First hourly price of the account's fixed price level
    pub fixed_price_hourly: f64,
    /// Tier description text
    pub fixed_price_level_info: String,
    /// Monthly total of the tier
    pub fixed_price_monthly_total: f64,
}

/// One row of the flattened hourly price list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffPriceRecord {
    pub start_time: String,
    pub end_time: String,
    pub total: Option<f64>,
}

/// `now` rendered the way the payload renders its timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTime {
    /// `YYYY-MM-DD`
    pub today: String,
    /// `YYYY-MM-DDTHH:MM:SS+hh:mm`
    pub now: String,
}

impl ReferenceTime {
    /// The offset is `+02:00` while daylight saving is in effect in `now`'s
    /// zone and `+01:00` otherwise.
    pub fn at(now: &DateTime<Tz>) -> Self {
        let offset = if is_dst(now) {
            SUMMER_OFFSET
        } else {
            WINTER_OFFSET
        };
        Self {
            today: now.format("%Y-%m-%d").to_string(),
            now: format!("{}{}", now.format("%Y-%m-%dT%H:%M:%S"), offset),
        }
    }

    /// Whether `hour` starts today and `[startTime, expiredAt)` contains now.
    pub fn matches(&self, hour: &HourPrice) -> bool {
        hour.start_time.get(..10) == Some(self.today.as_str())
            && self.now.as_str() >= hour.start_time.as_str()
            && self.now.as_str() < hour.expired_at.as_str()
    }
}

fn is_dst(now: &DateTime<Tz>) -> bool {
    now.offset().dst_offset() != Duration::zero()
}

fn found<T>(value: Option<T>, what: &str) -> Option<T> {
    if value.is_none() {
        debug!("Price lookup stopped: {} not found", what);
    }
    value
}

fn tariff_price(payload: &GridTariffCollection) -> Option<&TariffPrice> {
    payload.grid_tariff.as_ref()?.tariff_price.as_ref()
}

/// Fixed price level currently assigned to the (single) metering point
pub fn current_level_id(payload: &GridTariffCollection) -> Option<&str> {
    payload
        .metering_points_and_price_levels
        .first()?
        .current_fixed_price_level
        .as_ref()
        .map(|level| level.level_id.as_str())
}

/// First hour in source order that is in effect at `reference`
pub fn current_hour<'a>(hours: &'a [HourPrice], reference: &ReferenceTime) -> Option<&'a HourPrice> {
    hours.iter().find(|hour| reference.matches(hour))
}

fn level_for<'a>(tariff: &'a TariffPrice, fixed_price_id: &str, level_id: &str) -> Option<&'a PriceLevel> {
    let fixed_price = found(
        tariff
            .price_info
            .as_ref()?
            .fixed_prices
            .iter()
            .find(|entry| entry.id == fixed_price_id),
        "fixed price entry",
    )?;
    found(
        fixed_price
            .price_levels
            .iter()
            .find(|level| level.id == level_id),
        "price level",
    )
}

/// Locate the energy price and fixed-price tier in effect at `now`.
///
/// Returns `None` when any step of the traversal comes up empty; callers keep
/// their previous values in that case.
pub fn resolve(payload: &GridTariffCollection, now: &DateTime<Tz>) -> Option<ResolvedPrices> {
    let reference = ReferenceTime::at(now);
    let tariff = found(tariff_price(payload), "tariff price")?;
    let hour = found(current_hour(&tariff.hours, &reference), "current hour")?;
    let energy_price = found(hour.energy_price.as_ref(), "energy price")?.total;
    let fixed_price_id = found(hour.fixed_price.as_ref(), "fixed price reference")?.id.as_str();
    let level_id = found(current_level_id(payload), "current fixed price level")?;
    let level = level_for(tariff, fixed_price_id, level_id)?;
    let fixed_price_hourly = found(level.hour_prices.first(), "level hour price")?.total;

    Some(ResolvedPrices {
        energy_price,
        fixed_price_hourly,
        fixed_price_level_info: level.level_info.clone(),
        fixed_price_monthly_total: level.monthly_total,
    })
}

/// All hourly prices in source order
pub fn tariff_prices(payload: &GridTariffCollection) -> Vec<TariffPriceRecord> {
    tariff_price(payload)
        .map(|tariff| {
            tariff
                .hours
                .iter()
                .map(|hour| TariffPriceRecord {
                    start_time: hour.start_time.clone(),
                    end_time: hour.expired_at.clone(),
                    total: hour.energy_price.as_ref().map(|p| p.total),
                })
                .collect()
        })
        .unwrap_or_default()
}
