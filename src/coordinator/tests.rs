use super::*;
use crate::elvia::types::MaxHoursCollection;
use chrono::TimeZone;
use chrono_tz::Europe::Oslo;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Clone, Default)]
struct StubApi {
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    tariff: GridTariffCollection,
    maxhours: MaxHoursCollection,
}

#[async_trait::async_trait]
impl GridTariffApi for StubApi {
    async fn meteringpoint(&self) -> Result<GridTariffCollection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ElviaError::network("connection refused"));
        }
        Ok(self.tariff.clone())
    }

    async fn maxhours(&self) -> Result<MaxHoursCollection> {
        Ok(self.maxhours.clone())
    }

    fn metering_point_id(&self) -> &str {
        "707057500000000000"
    }
}

fn tariff_type() -> TariffType {
    TariffType {
        tariff_key: "standard".to_string(),
        title: "Nettleie".to_string(),
        company_name: "Elvia AS".to_string(),
        ..TariffType::default()
    }
}

fn tariff_payload() -> GridTariffCollection {
    serde_json::from_value(json!({
        "gridTariff": {
            "tariffPrice": {
                "hours": [
                    {
                        "startTime": "2024-01-01T10:00:00+01:00",
                        "expiredAt": "2024-01-01T11:00:00+01:00",
                        "energyPrice": {"total": 0.35},
                        "fixedPrice": {"id": "fp1"}
                    },
                    {
                        "startTime": "2024-01-01T11:00:00+01:00",
                        "expiredAt": "2024-01-01T12:00:00+01:00",
                        "energyPrice": {"total": 0.45},
                        "fixedPrice": {"id": "fp-missing"}
                    }
                ],
                "priceInfo": {"fixedPrices": [{
                    "id": "fp1",
                    "priceLevels": [{
                        "id": "L1",
                        "levelInfo": "Level A",
                        "monthlyTotal": 99.0,
                        "hourPrices": [{"total": 1.23}]
                    }]
                }]}
            }
        },
        "meteringPointsAndPriceLevels": [
            {"meteringPointId": "707057500000000000", "currentFixedPriceLevel": {"levelId": "L1"}}
        ]
    }))
    .unwrap()
}

fn stub() -> StubApi {
    StubApi {
        tariff: tariff_payload(),
        ..StubApi::default()
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Tz> {
    Oslo.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
}

#[test]
fn new_rejects_missing_tariff_metadata() {
    let Err(err) = Coordinator::new(Box::new(stub()), TariffType::default()) else {
        panic!("coordinator accepted empty tariff metadata");
    };
    assert!(matches!(err, ElviaError::Config { .. }));
}

#[test]
fn device_info_is_derived_from_tariff_type() {
    let coordinator = Coordinator::new(Box::new(stub()), tariff_type()).unwrap();
    let info = coordinator.device_info();
    assert_eq!(info.name, "Nettleie");
    assert_eq!(info.manufacturer, "Elvia AS");
    assert_eq!(info.model, "standard");
    assert_eq!(
        info.identifiers,
        ("elvia".to_string(), "707057500000000000".to_string())
    );
}

#[tokio::test]
async fn same_hour_reuses_snapshot_without_fetching() {
    let api = stub();
    let calls = Arc::clone(&api.calls);
    let mut coordinator = Coordinator::new(Box::new(api), tariff_type()).unwrap();

    let first = coordinator.attempt_update(at(10, 5)).await.unwrap();
    let second = coordinator.attempt_update(at(10, 55)).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.state().last_fetched_hour, Some(10));
}

#[tokio::test]
async fn failed_cycle_keeps_gate_open_and_snapshot_intact() {
    let api = stub();
    let calls = Arc::clone(&api.calls);
    let fail = Arc::clone(&api.fail);
    let mut coordinator = Coordinator::new(Box::new(api), tariff_type()).unwrap();

    let good = coordinator.attempt_update(at(10, 0)).await.unwrap();

    fail.store(true, Ordering::SeqCst);
    let err = coordinator.attempt_update(at(11, 0)).await.unwrap_err();
    assert!(err.is_fetch_failure());
    assert!(Arc::ptr_eq(&good, &coordinator.snapshot()));
    assert_eq!(coordinator.state().last_fetched_hour, Some(10));
    assert!(!coordinator.state().last_update_success);

    fail.store(false, Ordering::SeqCst);
    coordinator.attempt_update(at(11, 1)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(coordinator.state().last_fetched_hour, Some(11));
    assert!(coordinator.state().last_update_success);
}

#[tokio::test]
async fn unresolved_tier_keeps_previous_prices() {
    let mut coordinator = Coordinator::new(Box::new(stub()), tariff_type()).unwrap();

    let at_ten = coordinator.attempt_update(at(10, 30)).await.unwrap();
    assert_eq!(at_ten.get_f64("daily_tariff"), Some(0.35));

    // 11:00 matches an hour whose fixed price id is not in the catalog
    let at_eleven = coordinator.attempt_update(at(11, 30)).await.unwrap();
    assert!(!Arc::ptr_eq(&at_ten, &at_eleven));
    assert_eq!(at_eleven.get_f64("daily_tariff"), Some(0.35));
    assert_eq!(at_eleven.get_f64("fixed_price_hourly"), Some(1.23));
    assert_eq!(at_eleven.get_str("fixed_price_level"), Some("Level A"));
    assert_eq!(at_eleven.get_f64("fixed_price_monthly"), Some(99.0));
}

#[tokio::test]
async fn first_cycle_without_price_yields_nulls() {
    let mut coordinator = Coordinator::new(Box::new(stub()), tariff_type()).unwrap();
    let snapshot = coordinator.attempt_update(at(15, 0)).await.unwrap();
    assert_eq!(snapshot.get("daily_tariff"), Some(&serde_json::Value::Null));
    assert_eq!(
        snapshot.get("707057500000000000_daily_tariff"),
        Some(&serde_json::Value::Null)
    );
    assert!(coordinator.state().prices.is_none());
}

#[tokio::test]
async fn subscribers_see_published_snapshot() {
    let mut coordinator = Coordinator::new(Box::new(stub()), tariff_type()).unwrap();
    let mut rx = coordinator.subscribe();
    assert!(rx.borrow().is_empty());

    let snapshot = coordinator.attempt_update(at(10, 0)).await.unwrap();
    rx.changed().await.unwrap();
    assert!(Arc::ptr_eq(&rx.borrow_and_update(), &snapshot));
}

#[tokio::test]
async fn run_stops_on_shutdown() {
    let api = stub();
    let calls = Arc::clone(&api.calls);
    let mut coordinator = Coordinator::new(Box::new(api), tariff_type()).unwrap();

    let shutdown = tokio::time::sleep(Duration::from_millis(50));
    coordinator.run(Duration::from_millis(20), shutdown).await;

    // Several ticks fire, but the wall clock hour rarely changes in between
    let made = calls.load(Ordering::SeqCst);
    assert!((1..=2).contains(&made), "unexpected fetch count {made}");
    assert!(coordinator.state().last_update_success);
}
