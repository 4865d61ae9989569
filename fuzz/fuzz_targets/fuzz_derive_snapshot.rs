#![no_main]
use chrono::TimeZone;
use elvia::coordinator::snapshot::RawPayloads;
use elvia::coordinator::{maxhours, price, snapshot};
use elvia::elvia::{GridTariffCollection, MaxHoursCollection};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed the same bytes to both payload shapes
    let tariff: GridTariffCollection = serde_json::from_slice(data).unwrap_or_default();
    let max: MaxHoursCollection = serde_json::from_slice(data).unwrap_or_default();

    let hour = u32::from(data.first().copied().unwrap_or(0) % 24);
    let Some(now) = chrono_tz::Europe::Oslo
        .with_ymd_and_hms(2024, 3, 31, hour, 30, 0)
        .earliest()
    else {
        return;
    };

    let prices = price::resolve(&tariff, &now);
    let records = price::tariff_prices(&tariff);
    let summary = maxhours::aggregate(&max);
    let _ = snapshot::flatten(
        "fuzz",
        prices.as_ref(),
        &summary,
        RawPayloads {
            meteringpoint: &tariff,
            maxhours: &max,
            tariff_prices: &records,
        },
    );
});
