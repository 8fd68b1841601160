//! Forecast model as returned by the One Call endpoint

use serde::{Deserialize, Serialize};

use super::temperature::{kelvin_to_celsius, kelvin_to_fahrenheit};

/// Number of hourly entries shown in the chart and the hourly table
pub const HOURS_IN_VIEW: usize = 24;

/// Hourly and daily forecast for one pair of coordinates
///
/// Replaced as a whole on every successful fetch; both series may be missing
/// from the body.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ForecastData {
    #[serde(default)]
    pub hourly: Option<Vec<HourlyEntry>>,
    #[serde(default)]
    pub daily: Option<Vec<DailyEntry>>,
}

/// One hour of forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyEntry {
    /// Unix timestamp in seconds
    pub dt: i64,
    /// Temperature in kelvin
    pub temp: f64,
    #[serde(default)]
    pub weather: Vec<ConditionSummary>,
}

/// Free-text weather condition
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConditionSummary {
    #[serde(default)]
    pub description: String,
}

/// One day of forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyEntry {
    /// Unix timestamp in seconds
    pub dt: i64,
    pub temp: DailyTemperature,
}

/// Daily temperatures in kelvin
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyTemperature {
    pub day: f64,
}

impl ForecastData {
    /// All hourly entries, empty when the series is absent
    #[must_use]
    pub fn hourly(&self) -> &[HourlyEntry] {
        self.hourly.as_deref().unwrap_or_default()
    }

    /// All daily entries, empty when the series is absent
    #[must_use]
    pub fn daily(&self) -> &[DailyEntry] {
        self.daily.as_deref().unwrap_or_default()
    }

    /// The first [`HOURS_IN_VIEW`] hours, or fewer when the series is short
    #[must_use]
    pub fn next_hours(&self) -> &[HourlyEntry] {
        let hourly = self.hourly();
        &hourly[..hourly.len().min(HOURS_IN_VIEW)]
    }
}

impl HourlyEntry {
    #[must_use]
    pub fn celsius(&self) -> i64 {
        kelvin_to_celsius(self.temp)
    }

    #[must_use]
    pub fn fahrenheit(&self) -> i64 {
        kelvin_to_fahrenheit(self.temp)
    }

    /// First condition description; empty when the list is empty
    #[must_use]
    pub fn description(&self) -> &str {
        self.weather
            .first()
            .map_or("", |condition| condition.description.as_str())
    }
}

impl DailyEntry {
    #[must_use]
    pub fn celsius(&self) -> i64 {
        kelvin_to_celsius(self.temp.day)
    }

    #[must_use]
    pub fn fahrenheit(&self) -> i64 {
        kelvin_to_fahrenheit(self.temp.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(dt: i64, temp: f64) -> HourlyEntry {
        HourlyEntry {
            dt,
            temp,
            weather: vec![ConditionSummary {
                description: "clear sky".to_string(),
            }],
        }
    }

    #[test]
    fn test_next_hours_caps_at_24() {
        let forecast = ForecastData {
            hourly: Some((0..48).map(|i| hour(1_700_000_000 + i * 3600, 280.0)).collect()),
            daily: None,
        };
        let hours = forecast.next_hours();
        assert_eq!(hours.len(), 24);
        assert_eq!(hours[0].dt, 1_700_000_000);
        assert_eq!(hours[23].dt, 1_700_000_000 + 23 * 3600);
    }

    #[test]
    fn test_next_hours_tolerates_short_and_missing_series() {
        let short = ForecastData {
            hourly: Some(vec![hour(1, 280.0), hour(2, 281.0)]),
            daily: None,
        };
        assert_eq!(short.next_hours().len(), 2);

        let missing = ForecastData::default();
        assert!(missing.next_hours().is_empty());
        assert!(missing.daily().is_empty());
    }

    #[test]
    fn test_deserialize_one_call_body() {
        let body = serde_json::json!({
            "lat": 51.5,
            "lon": -0.12,
            "current": {"dt": 1_700_000_000, "temp": 281.0},
            "hourly": [
                {"dt": 1_700_000_000, "temp": 280.15, "humidity": 80,
                 "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}]}
            ],
            "daily": [
                {"dt": 1_700_000_000, "temp": {"day": 283.15, "min": 279.0, "max": 284.0}}
            ]
        });

        let forecast: ForecastData = serde_json::from_value(body).unwrap();
        assert_eq!(forecast.hourly().len(), 1);
        assert_eq!(forecast.hourly()[0].description(), "clear sky");
        assert_eq!(forecast.hourly()[0].celsius(), 7);
        assert_eq!(forecast.hourly()[0].fahrenheit(), 45);
        assert_eq!(forecast.daily()[0].celsius(), 10);
        assert_eq!(forecast.daily()[0].fahrenheit(), 50);
    }

    #[test]
    fn test_deserialize_without_series() {
        let forecast: ForecastData =
            serde_json::from_value(serde_json::json!({"hourly": null})).unwrap();
        assert!(forecast.hourly().is_empty());
        assert!(forecast.daily().is_empty());
    }

    #[test]
    fn test_empty_weather_list_has_empty_description() {
        let entry = HourlyEntry {
            dt: 0,
            temp: 273.15,
            weather: Vec::new(),
        };
        assert_eq!(entry.description(), "");
    }
}
