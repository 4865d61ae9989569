//! Flat key/value snapshot handed to the presentation layer.
//!
//! Every derived metric is stored twice: under its plain key and under
//! `"{device_id}_{key}"`, with identical values.

use super::maxhours::{MaxHourSummary, Month};
use super::price::{ResolvedPrices, TariffPriceRecord};
use crate::elvia::types::{GridTariffCollection, MaxHoursCollection};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const DAILY_TARIFF: &str = "daily_tariff";
pub const FIXED_PRICE_HOURLY: &str = "fixed_price_hourly";
pub const FIXED_PRICE_LEVEL: &str = "fixed_price_level";
pub const FIXED_PRICE_MONTHLY: &str = "fixed_price_monthly";
pub const AVERAGE_MAX_CURRENT: &str = "average_max_current";
pub const AVERAGE_MAX_PREVIOUS: &str = "average_max_previous";

/// Raw pass-through keys (never prefixed)
pub const RAW_METERINGPOINT: &str = "meteringpoint";
pub const RAW_MAXHOURS: &str = "maxhours";
pub const RAW_TARIFF_PRICES: &str = "tariff_prices";

/// `max_hours_{suffix}_{rank}`
pub fn max_hours_key(month: Month, rank: usize) -> String {
    format!("max_hours_{}_{}", month.suffix(), rank)
}

pub fn average_key(month: Month) -> &'static str {
    match month {
        Month::Current => AVERAGE_MAX_CURRENT,
        Month::Previous => AVERAGE_MAX_PREVIOUS,
    }
}

pub fn prefixed_key(device_id: &str, key: &str) -> String {
    format!("{device_id}_{key}")
}

/// Plain keys of every derived metric, in emission order
pub fn metric_keys() -> Vec<String> {
    let mut keys: Vec<String> = [
        DAILY_TARIFF,
        FIXED_PRICE_HOURLY,
        FIXED_PRICE_LEVEL,
        FIXED_PRICE_MONTHLY,
        AVERAGE_MAX_CURRENT,
        AVERAGE_MAX_PREVIOUS,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    for month in Month::ALL {
        for rank in 1..=3 {
            let base = max_hours_key(month, rank);
            keys.push(format!("{base}_start"));
            keys.push(format!("{base}_end"));
            keys.push(base);
        }
    }
    keys
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, Value>);

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    fn insert_metric(&mut self, device_id: &str, key: &str, value: Value) {
        self.0.insert(prefixed_key(device_id, key), value.clone());
        self.0.insert(key.to_string(), value);
    }

    fn insert_raw<T: Serialize>(&mut self, key: &str, raw: &T) {
        self.0
            .insert(key.to_string(), serde_json::to_value(raw).unwrap_or_default());
    }
}

/// Raw objects passed through for diagnostics
#[derive(Debug, Clone, Copy)]
pub struct RawPayloads<'a> {
    pub meteringpoint: &'a GridTariffCollection,
    pub maxhours: &'a MaxHoursCollection,
    pub tariff_prices: &'a [TariffPriceRecord],
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Merge derived values and raw payloads into one flat mapping.
pub fn flatten(
    device_id: &str,
    prices: Option<&ResolvedPrices>,
    max_hours: &MaxHourSummary,
    raw: RawPayloads<'_>,
) -> Snapshot {
    let mut snapshot = Snapshot::default();

    snapshot.insert_raw(RAW_METERINGPOINT, raw.meteringpoint);
    snapshot.insert_raw(RAW_MAXHOURS, raw.maxhours);
    snapshot.insert_raw(RAW_TARIFF_PRICES, &raw.tariff_prices);

    let price_field = |f: fn(&ResolvedPrices) -> Value| prices.map_or(Value::Null, f);
    snapshot.insert_metric(device_id, DAILY_TARIFF, price_field(|p| number(p.energy_price)));
    snapshot.insert_metric(
        device_id,
        FIXED_PRICE_HOURLY,
        price_field(|p| number(p.fixed_price_hourly)),
    );
    snapshot.insert_metric(
        device_id,
        FIXED_PRICE_LEVEL,
        price_field(|p| Value::String(p.fixed_price_level_info.clone())),
    );
    snapshot.insert_metric(
        device_id,
        FIXED_PRICE_MONTHLY,
        price_field(|p| number(p.fixed_price_monthly_total)),
    );

    for month in Month::ALL {
        let aggregate = max_hours.month(month);
        snapshot.insert_metric(
            device_id,
            average_key(month),
            aggregate.map_or(Value::Null, |m| number(m.average)),
        );

        for rank in 1..=3 {
            let base = max_hours_key(month, rank);
            let entry = aggregate.and_then(|m| m.rank(rank));
            snapshot.insert_metric(device_id, &base, entry.map_or(Value::Null, |e| number(e.value)));
            snapshot.insert_metric(
                device_id,
                &format!("{base}_start"),
                entry.map_or(Value::Null, |e| Value::String(e.start_time.clone())),
            );
            snapshot.insert_metric(
                device_id,
                &format!("{base}_end"),
                entry.map_or(Value::Null, |e| Value::String(e.end_time.clone())),
            );
        }
    }

    snapshot
}
