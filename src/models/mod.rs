//! Data models for skycast
//!
//! - Location: resolved coordinates and the query behind them
//! - Forecast: hourly and daily series as delivered by the weather API
//! - Temperature: kelvin conversions

pub mod forecast;
pub mod location;
pub mod temperature;

pub use forecast::{
    ConditionSummary, DailyEntry, DailyTemperature, ForecastData, HOURS_IN_VIEW, HourlyEntry,
};
pub use location::{Coordinates, ResolvedLocation};
pub use temperature::{kelvin_to_celsius, kelvin_to_fahrenheit};
