//! Location model: resolved coordinates and the query that produced them

use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create new coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format as a coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_coordinates())
    }
}

/// Outcome of a successful geocode
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Text the user submitted
    pub query: String,
    /// Best-match coordinates
    pub coordinates: Coordinates,
    /// Display name reported by the geocoder, if any
    pub formatted: Option<String>,
}

impl ResolvedLocation {
    /// Label shown above the results
    #[must_use]
    pub fn label(&self) -> String {
        match &self.formatted {
            Some(name) if !name.is_empty() => format!("{name} ({})", self.coordinates),
            _ => format!("{} ({})", self.query, self.coordinates),
        }
    }
}
