//! Forecast retrieval from the OpenWeatherMap One Call endpoint

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{info, instrument};

use crate::config::ServiceConfig;
use crate::error::Service;
use crate::http;
use crate::models::{Coordinates, ForecastData};
use crate::Result;

/// Minutely data is never displayed, so it is never requested
const EXCLUDED_PARTS: &str = "minutely";

/// Anything that can produce a forecast for coordinates
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch(&self, coordinates: Coordinates) -> Result<ForecastData>;
}

/// One Call API client
pub struct ForecastClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl ForecastClient {
    /// Create a client from the `[weather]` configuration section
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let api_key = config.require_api_key("weather")?.to_string();
        Ok(Self {
            client: http::build_client(Service::Forecast, config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/onecall", self.base_url)
    }
}

#[async_trait]
impl ForecastProvider for ForecastClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn fetch(&self, coordinates: Coordinates) -> Result<ForecastData> {
        info!("Getting forecast for coordinates: {}", coordinates);

        let endpoint = self.endpoint();
        let url = format!(
            "{}?lat={}&lon={}&exclude={}&appid={}",
            endpoint,
            coordinates.latitude,
            coordinates.longitude,
            EXCLUDED_PARTS,
            urlencoding::encode(&self.api_key)
        );

        let forecast: ForecastData =
            http::get_json(&self.client, Service::Forecast, &endpoint, &url).await?;

        info!(
            "Retrieved forecast with {} hourly and {} daily entries",
            forecast.hourly().len(),
            forecast.daily().len()
        );

        Ok(forecast)
    }
}
