//! Error types and handling for the `skycast` library

use std::fmt;

use thiserror::Error;

/// Remote service a request was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Free-text location to coordinates
    Geocoding,
    /// Hourly and daily forecast for coordinates
    Forecast,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Geocoding => write!(f, "geocoding"),
            Service::Forecast => write!(f, "forecast"),
        }
    }
}

/// Main error type for the `skycast` library
#[derive(Error, Debug)]
pub enum SkycastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The request never produced a response
    #[error("{service} request failed: {message}")]
    Network { service: Service, message: String },

    /// The request exceeded the configured timeout
    #[error("{service} request timed out")]
    Timeout { service: Service },

    /// The service answered with a non-success status
    #[error("{service} service returned HTTP {status}")]
    Status { service: Service, status: u16 },

    /// The body could not be decoded into the expected shape
    #[error("Invalid {service} response: {message}")]
    InvalidResponse { service: Service, message: String },

    /// Geocoding succeeded but produced no candidates
    #[error("Location not found: '{query}'")]
    LocationNotFound { query: String },

    /// Drawing the temperature chart failed
    #[error("Chart error: {message}")]
    Chart { message: String },
}

impl SkycastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn network<S: Into<String>>(service: Service, message: S) -> Self {
        Self::Network {
            service,
            message: message.into(),
        }
    }

    /// Create a new malformed-body error
    pub fn invalid_response<S: Into<String>>(service: Service, message: S) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new chart error
    pub fn chart<S: Into<String>>(message: S) -> Self {
        Self::Chart {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkycastError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            SkycastError::Network { .. } | SkycastError::Timeout { .. } => {
                "Unable to connect to the weather services. Please check your internet connection."
                    .to_string()
            }
            SkycastError::Status { status: 401, .. } | SkycastError::Status { status: 403, .. } => {
                "The weather services rejected the API key. Please check your configuration."
                    .to_string()
            }
            SkycastError::Status { .. } | SkycastError::InvalidResponse { .. } => {
                "The weather services returned an unexpected answer. Please try again later."
                    .to_string()
            }
            SkycastError::LocationNotFound { query } => {
                format!("No location matching '{query}' was found.")
            }
            SkycastError::Chart { .. } => "The temperature chart could not be drawn.".to_string(),
        }
    }
}
