use anyhow::Result;
use elvia::coordinator::snapshot;
use elvia::elvia::{ElviaApiClient, TariffType};
use elvia::logging::init_logging;
use elvia::{Config, Coordinator};
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    config.apply_env_overrides();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;

    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;
    info!(
        "Elvia coordinator {} starting for metering point {}",
        env!("APP_VERSION"),
        config.elvia.metering_point_id
    );

    let client = ElviaApiClient::new(&config.elvia)?;
    let tariff_type = TariffType {
        tariff_key: config.elvia.tariff_type.tariff_key.clone(),
        title: config.elvia.tariff_type.title.clone(),
        company_name: config.elvia.tariff_type.company_name.clone(),
        ..TariffType::default()
    };
    let mut coordinator = Coordinator::new(Box::new(client), tariff_type)
        .map_err(|e| anyhow::anyhow!("Failed to create coordinator: {}", e))?
        .with_timezone(config.tz()?);

    // Log each published snapshot
    let mut updates = coordinator.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let current = updates.borrow_and_update().clone();
            info!(
                "daily_tariff={} fixed_price_level={} max_hours_current_1={} average_max_current={}",
                current.get(snapshot::DAILY_TARIFF).unwrap_or(&serde_json::Value::Null),
                current.get(snapshot::FIXED_PRICE_LEVEL).unwrap_or(&serde_json::Value::Null),
                current
                    .get("max_hours_current_1")
                    .unwrap_or(&serde_json::Value::Null),
                current
                    .get(snapshot::AVERAGE_MAX_CURRENT)
                    .unwrap_or(&serde_json::Value::Null),
            );
        }
    });

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };
    coordinator
        .run(Duration::from_millis(config.poll_interval_ms), shutdown)
        .await;

    drop(coordinator);
    watcher.abort();
    info!("Elvia coordinator shutdown complete");
    Ok(())
}
