//! Diagnostic dump of the last raw tariff payload.

use crate::coordinator::Coordinator;
use crate::elvia::types::GridTariffCollection;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const TARIFF_TYPE: &str = "tariffType";
pub const TARIFF_PRICE: &str = "tariffPrice";
pub const METERING_POINTS_AND_PRICE_LEVELS: &str = "meteringPointsAndPriceLevels";

/// Diagnostics for the coordinator's most recent tariff payload
pub fn config_entry_diagnostics(coordinator: &Coordinator) -> BTreeMap<String, String> {
    diagnostics_for(coordinator.state().meteringpoint.as_ref())
}

/// JSON text of the tariff type, tariff price and price levels.
///
/// Empty when there is no payload or it carries no grid tariff. Price levels
/// are only listed when the payload has any. Parts that fail to serialize are
/// left out.
pub fn diagnostics_for(payload: Option<&GridTariffCollection>) -> BTreeMap<String, String> {
    let mut diagnostics = BTreeMap::new();
    let Some(grid) = payload.and_then(|p| p.grid_tariff.as_ref()) else {
        return diagnostics;
    };

    insert_json(&mut diagnostics, TARIFF_PRICE, &grid.tariff_price);
    insert_json(&mut diagnostics, TARIFF_TYPE, &grid.tariff_type);
    if let Some(payload) = payload.filter(|p| !p.metering_points_and_price_levels.is_empty()) {
        insert_json(
            &mut diagnostics,
            METERING_POINTS_AND_PRICE_LEVELS,
            &payload.metering_points_and_price_levels,
        );
    }
    diagnostics
}

fn insert_json<T: Serialize>(out: &mut BTreeMap<String, String>, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(text) => {
            out.insert(key.to_string(), text);
        }
        Err(e) => debug!("Skipping diagnostics field {}: {}", key, e),
    }
}
