//! `skycast` - weather lookup for a free-text location
//!
//! This library resolves a location to coordinates, fetches its hourly and
//! daily forecast, and renders the result as tables and a temperature chart.

pub mod api;
pub mod chart;
pub mod clock;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod view;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use chart::{ChartData, ChartSurface};
pub use clock::DisplayZone;
pub use config::SkycastConfig;
pub use error::{Service, SkycastError};
pub use geocoding::{Geocoder, GeocodingClient};
pub use models::{Coordinates, ForecastData, ResolvedLocation};
pub use pipeline::{LookupOutcome, LookupPhase, LookupPipeline, LookupSession};
pub use weather::{ForecastClient, ForecastProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkycastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
