//! Sensor catalog read from the coordinator snapshot.
//!
//! Each sensor tries its plain snapshot key first and falls back to the
//! metering point prefixed copy. Max-hour sensors also expose the start and
//! end of their window as attributes.

use crate::coordinator::maxhours::Month;
use crate::coordinator::snapshot::{self, Snapshot};
use crate::coordinator::DOMAIN;
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix used in unique ids when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "elvia";

pub const ATTR_START_TIME: &str = "StartTime";
pub const ATTR_END_TIME: &str = "EndTime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDescription {
    pub key: String,
    pub name: String,
    /// Snapshot keys without the metering point prefix, tried in order
    pub value_keys: Vec<String>,
    /// Base key of the `_start`/`_end` window, for max-hour sensors
    pub window_key: Option<String>,
}

impl SensorDescription {
    fn plain(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            value_keys: vec![key.to_string()],
            window_key: None,
        }
    }

    fn average(month: Month) -> Self {
        let label = month_label(month);
        let key = format!("max_hour_avg_{}", month.suffix());
        Self {
            value_keys: vec![snapshot::average_key(month).to_string(), key.clone()],
            name: format!("Elvia Max Hour Average ({label} Month)"),
            key,
            window_key: None,
        }
    }

    fn max_hours(month: Month, rank: usize) -> Self {
        let key = snapshot::max_hours_key(month, rank);
        Self {
            name: format!("Elvia Max Hours {rank} ({} Month)", month_label(month)),
            value_keys: vec![key.clone()],
            window_key: Some(key.clone()),
            key,
        }
    }

    /// Candidate keys in lookup order.
    ///
    /// The first value key is followed by its prefixed copy; any legacy
    /// aliases come last.
    pub fn lookup_keys(&self, metering_point_id: &str) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.value_keys.len() + 1);
        if let Some((first, rest)) = self.value_keys.split_first() {
            keys.push(first.clone());
            keys.push(snapshot::prefixed_key(metering_point_id, first));
            keys.extend(rest.iter().cloned());
        }
        keys
    }
}

const fn month_label(month: Month) -> &'static str {
    match month {
        Month::Current => "Current",
        Month::Previous => "Previous",
    }
}

/// All sensors in registration order
pub fn descriptions() -> Vec<SensorDescription> {
    let mut all = vec![
        SensorDescription::plain(snapshot::DAILY_TARIFF, "Elvia Daily Tariff"),
        SensorDescription::plain(snapshot::FIXED_PRICE_HOURLY, "Elvia Fixed Price Hourly"),
        SensorDescription::plain(snapshot::FIXED_PRICE_LEVEL, "Elvia Fixed Price Level"),
        SensorDescription::plain(snapshot::FIXED_PRICE_MONTHLY, "Elvia Fixed Price Monthly"),
        SensorDescription::average(Month::Current),
        SensorDescription::average(Month::Previous),
    ];
    for month in Month::ALL {
        for rank in 1..=3 {
            all.push(SensorDescription::max_hours(month, rank));
        }
    }
    all
}

/// `{domain}_{prefix}_{key}`
pub fn unique_id(key_prefix: &str, description: &SensorDescription) -> String {
    format!("{DOMAIN}_{key_prefix}_{}", description.key)
}

/// Value of the first candidate key present in the snapshot.
///
/// A present key holding null ends the search with `None`.
pub fn native_value(
    snapshot: Option<&Snapshot>,
    description: &SensorDescription,
    metering_point_id: &str,
) -> Option<Value> {
    let snapshot = snapshot.filter(|s| !s.is_empty())?;
    description
        .lookup_keys(metering_point_id)
        .iter()
        .find_map(|key| snapshot.get(key))
        .filter(|value| !value.is_null())
        .cloned()
}

/// Window attributes of a max-hour sensor with null entries dropped.
///
/// Sensors without a window have no attributes at all.
pub fn attributes(
    snapshot: Option<&Snapshot>,
    description: &SensorDescription,
) -> Option<BTreeMap<String, Value>> {
    let base = description.window_key.as_deref()?;
    let mut attrs = BTreeMap::new();
    let Some(snapshot) = snapshot else {
        return Some(attrs);
    };

    for (name, suffix) in [(ATTR_START_TIME, "start"), (ATTR_END_TIME, "end")] {
        if let Some(value) = snapshot.get(&format!("{base}_{suffix}")).filter(|v| !v.is_null()) {
            attrs.insert(name.to_string(), value.clone());
        }
    }
    Some(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_twelve_unique_sensors() {
        let all = descriptions();
        assert_eq!(all.len(), 12);
        let mut keys: Vec<_> = all.iter().map(|d| d.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 12);
    }

    #[test]
    fn average_sensor_keeps_legacy_alias_last() {
        let avg = SensorDescription::average(Month::Previous);
        assert_eq!(avg.key, "max_hour_avg_previous");
        assert_eq!(
            avg.lookup_keys("42"),
            vec![
                "average_max_previous".to_string(),
                "42_average_max_previous".to_string(),
                "max_hour_avg_previous".to_string(),
            ]
        );
    }

    #[test]
    fn only_max_hour_sensors_have_windows() {
        let windows = descriptions()
            .into_iter()
            .filter(|d| d.window_key.is_some())
            .count();
        assert_eq!(windows, 6);
        assert!(attributes(None, &SensorDescription::plain("daily_tariff", "x")).is_none());
    }

    #[test]
    fn unique_id_combines_domain_prefix_and_key() {
        let desc = SensorDescription::max_hours(Month::Current, 2);
        assert_eq!(unique_id(DEFAULT_KEY_PREFIX, &desc), "elvia_elvia_max_hours_current_2");
    }
}
