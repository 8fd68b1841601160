//! Location resolution
//!
//! Turns the free-text query into a single best-guess pair of coordinates
//! using the OpenCage forward geocoding endpoint.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::ServiceConfig;
use crate::error::{Service, SkycastError};
use crate::http;
use crate::models::{Coordinates, ResolvedLocation};
use crate::Result;

/// Anything that can resolve a free-text location
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `query` to its first match; an empty candidate list is [`SkycastError::LocationNotFound`]
    async fn resolve(&self, query: &str) -> Result<ResolvedLocation>;
}

/// OpenCage geocoding API client
pub struct GeocodingClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeocodingCandidate {
    geometry: Geometry,
    formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

impl GeocodingClient {
    /// Create a client from the `[geocoding]` configuration section
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let api_key = config.require_api_key("geocoding")?.to_string();
        Ok(Self {
            client: http::build_client(Service::Geocoding, config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/json", self.base_url)
    }
}

#[async_trait]
impl Geocoder for GeocodingClient {
    #[instrument(skip(self))]
    async fn resolve(&self, query: &str) -> Result<ResolvedLocation> {
        info!("Geocoding location: '{}'", query);

        let endpoint = self.endpoint();
        let url = format!(
            "{}?q={}&key={}",
            endpoint,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        );

        let response: GeocodingResponse =
            http::get_json(&self.client, Service::Geocoding, &endpoint, &url).await?;

        debug!("Geocoder returned {} candidates", response.results.len());

        let Some(best) = response.results.into_iter().next() else {
            warn!("No results found for location '{}'", query);
            return Err(SkycastError::location_not_found(query));
        };

        let resolved = ResolvedLocation {
            query: query.to_string(),
            coordinates: Coordinates::new(best.geometry.lat, best.geometry.lng),
            formatted: best.formatted,
        };

        info!("Resolved '{}' to {}", query, resolved.coordinates);
        Ok(resolved)
    }
}
