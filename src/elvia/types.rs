//! Raw payload shapes returned by the Elvia grid tariff and meter values APIs.
//!
//! Collections default to empty and nested objects are optional, so a
//! structural gap surfaces as a failed lookup during derivation instead of a
//! deserialization error.

use serde::{Deserialize, Serialize};

/// Response of the `meteringpointsgridtariffs` query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridTariffCollection {
    pub grid_tariff: Option<GridTariff>,
    pub metering_points_and_price_levels: Vec<MeteringPointPriceLevels>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridTariff {
    pub tariff_type: Option<TariffType>,
    pub tariff_price: Option<TariffPrice>,
}

/// Static metadata about the tariff plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TariffType {
    pub tariff_key: String,
    pub title: String,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_org_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TariffPrice {
    pub hours: Vec<HourPrice>,
    pub price_info: Option<PriceInfo>,
}

/// One hourly slot of the tariff
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HourPrice {
    /// `YYYY-MM-DDTHH:MM:SS+hh:mm`
    pub start_time: String,
    /// Exclusive end of the slot, same format as `start_time`
    pub expired_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    pub energy_price: Option<EnergyPrice>,
    pub fixed_price: Option<FixedPriceRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnergyPrice {
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ex_vat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
}

/// Reference from an hour into `priceInfo.fixedPrices`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedPriceRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceInfo {
    pub fixed_prices: Vec<FixedPrice>,
}

/// Catalog entry of fixed-price tiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedPrice {
    pub id: String,
    pub price_levels: Vec<PriceLevel>,
}

/// One fixed-price tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceLevel {
    pub id: String,
    /// Human readable tier description, e.g. "5-10 kW"
    pub level_info: String,
    pub monthly_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_total_ex_vat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_value_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_value_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    pub hour_prices: Vec<LevelHourPrice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelHourPrice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ex_vat: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeteringPointPriceLevels {
    pub metering_point_id: String,
    pub current_fixed_price_level: Option<CurrentFixedPriceLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentFixedPriceLevel {
    pub level_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
}

/// Response of the `maxhours` query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxHoursCollection {
    pub meteringpoints: Vec<MaxHoursMeteringPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaxHoursMeteringPoint {
    pub metering_point_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hours_calculated_time: Option<String>,
    pub max_hours_aggregate: Vec<MaxHoursAggregate>,
}

/// Peak-usage aggregate for one month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaxHoursAggregate {
    /// 0 for the running month, nonzero for earlier months
    pub no_of_months_back: i32,
    pub average_value: f64,
    pub uom: String,
    /// Oldest first; only the first three entries are meaningful
    pub max_hours: Vec<MaxHour>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaxHour {
    pub start_time: String,
    pub end_time: String,
    pub value: f64,
    pub uom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nested_tariff_payload() {
        let json = r#"{
            "gridTariff": {
                "tariffType": {"tariffKey": "standard", "title": "Nettleie", "companyName": "Elvia AS"},
                "tariffPrice": {
                    "hours": [{
                        "startTime": "2024-01-01T10:00:00+01:00",
                        "expiredAt": "2024-01-01T11:00:00+01:00",
                        "energyPrice": {"total": 0.4, "currency": "NOK"},
                        "fixedPrice": {"id": "fp1", "levelId": "L1"}
                    }],
                    "priceInfo": {"fixedPrices": [{"id": "fp1", "priceLevels": []}]}
                }
            },
            "meteringPointsAndPriceLevels": [
                {"meteringPointId": "707", "currentFixedPriceLevel": {"levelId": "L1"}}
            ]
        }"#;
        let parsed: GridTariffCollection = serde_json::from_str(json).unwrap();
        let grid = parsed.grid_tariff.unwrap();
        assert_eq!(grid.tariff_type.unwrap().company_name, "Elvia AS");
        let price = grid.tariff_price.unwrap();
        assert_eq!(price.hours.len(), 1);
        assert_eq!(
            price.hours[0].fixed_price.as_ref().unwrap().level_id.as_deref(),
            Some("L1")
        );
        assert_eq!(parsed.metering_points_and_price_levels[0].metering_point_id, "707");
    }

    #[test]
    fn missing_sections_fall_back_to_empty() {
        let parsed: GridTariffCollection = serde_json::from_str("{}").unwrap();
        assert!(parsed.grid_tariff.is_none());
        assert!(parsed.metering_points_and_price_levels.is_empty());

        let parsed: MaxHoursCollection =
            serde_json::from_str(r#"{"meteringpoints": [{"meteringPointId": "1"}]}"#).unwrap();
        assert!(parsed.meteringpoints[0].max_hours_aggregate.is_empty());
    }
}
