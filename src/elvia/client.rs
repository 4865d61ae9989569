use crate::elvia::types::{GridTariffCollection, MaxHoursCollection};
use crate::error::Result;

#[cfg(feature = "client")]
use crate::config::ElviaConfig;
#[cfg(feature = "client")]
use crate::error::ElviaError;
#[cfg(feature = "client")]
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};

/// Source of raw payloads for one metering point
#[async_trait::async_trait]
pub trait GridTariffApi: Send + Sync {
    /// Tariff structure and current fixed price level
    async fn meteringpoint(&self) -> Result<GridTariffCollection>;

    /// Monthly max-hour aggregates
    async fn maxhours(&self) -> Result<MaxHoursCollection>;

    fn metering_point_id(&self) -> &str;
}

/// HTTP client for the Elvia grid tariff and meter values APIs
#[cfg(feature = "client")]
pub struct ElviaApiClient {
    http: reqwest::Client,
    metering_point_id: String,
    api_key: String,
    access_token: String,
    grid_tariff_url: String,
    meter_values_url: String,
    logger: StructuredLogger,
}

#[cfg(feature = "client")]
impl ElviaApiClient {
    pub fn new(cfg: &ElviaConfig) -> Result<Self> {
        if cfg.metering_point_id.trim().is_empty() {
            return Err(ElviaError::config("Metering point id is required"));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .user_agent(concat!("elvia/", env!("APP_VERSION")))
            .build()?;

        let logger = get_logger_with_context(
            LogContext::new("client").with_metering_point(&cfg.metering_point_id),
        );

        Ok(Self {
            http,
            metering_point_id: cfg.metering_point_id.trim().to_string(),
            api_key: cfg.api_key.trim().to_string(),
            access_token: cfg.access_token.trim().to_string(),
            grid_tariff_url: cfg.grid_tariff_url.trim_end_matches('/').to_string(),
            meter_values_url: cfg.meter_values_url.trim_end_matches('/').to_string(),
            logger,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        &self,
        what: &str,
        resp: reqwest::Response,
    ) -> Result<T> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            self.logger
                .error(&format!("{what} request rejected: {status}"));
            return Err(ElviaError::auth(format!("{what}: {status}")));
        }
        if !status.is_success() {
            self.logger.error(&format!("{what} API error: {status}"));
            return Err(ElviaError::api(format!("{what}: {status}")));
        }

        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ElviaError::serialization(format!("{what} response: {e}")))
    }
}

#[cfg(feature = "client")]
#[async_trait::async_trait]
impl GridTariffApi for ElviaApiClient {
    async fn meteringpoint(&self) -> Result<GridTariffCollection> {
        use reqwest::header::ACCEPT;

        let url = format!(
            "{}/api/1/tariffquery/meteringpointsgridtariffs",
            self.grid_tariff_url
        );
        self.logger.debug(&format!("POST {url}"));
        let resp = self
            .http
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({ "meteringPointIds": [self.metering_point_id] }))
            .send()
            .await?;
        self.decode("grid tariff", resp).await
    }

    async fn maxhours(&self) -> Result<MaxHoursCollection> {
        use reqwest::header::ACCEPT;

        let url = format!("{}/api/v2/maxhours", self.meter_values_url);
        self.logger.debug(&format!("GET {url}"));
        let resp = self
            .http
            .get(&url)
            .query(&[("meteringPointIds", self.metering_point_id.as_str())])
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        self.decode("max hours", resp).await
    }

    fn metering_point_id(&self) -> &str {
        &self.metering_point_id
    }
}

#[cfg(all(test, feature = "client"))]
mod tests {
    use super::*;

    #[test]
    fn new_requires_metering_point() {
        let cfg = ElviaConfig::default();
        let Err(err) = ElviaApiClient::new(&cfg) else {
            panic!("client built without a metering point id");
        };
        assert!(matches!(err, ElviaError::Config { .. }));
    }

    #[test]
    fn new_normalizes_urls() {
        let cfg = ElviaConfig {
            metering_point_id: " 707057500000000000 ".to_string(),
            grid_tariff_url: "https://example.test/grid-tariff/".to_string(),
            ..ElviaConfig::default()
        };
        let client = ElviaApiClient::new(&cfg).unwrap();
        assert_eq!(client.metering_point_id(), "707057500000000000");
        assert_eq!(client.grid_tariff_url, "https://example.test/grid-tariff");
    }
}
