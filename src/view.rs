//! Table projections of the stored forecast
//!
//! Rows are derived on every render straight from [`ForecastData`]; nothing
//! here is stored.

use serde::Serialize;
use std::fmt;

use crate::clock::DisplayZone;
use crate::models::ForecastData;

/// One row of the hourly table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRow {
    pub time: String,
    pub celsius: i64,
    pub fahrenheit: i64,
    pub description: String,
}

/// One row of the weekly table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: String,
    pub celsius: i64,
    pub fahrenheit: i64,
}

/// First 24 hours of the forecast; no rows without a forecast
#[must_use]
pub fn hourly_rows(forecast: Option<&ForecastData>, zone: &DisplayZone) -> Vec<HourlyRow> {
    forecast
        .map(ForecastData::next_hours)
        .unwrap_or_default()
        .iter()
        .map(|hour| HourlyRow {
            time: zone.format_time(hour.dt),
            celsius: hour.celsius(),
            fahrenheit: hour.fahrenheit(),
            description: hour.description().to_string(),
        })
        .collect()
}

/// Every day of the forecast, in order; no rows without a forecast
#[must_use]
pub fn daily_rows(forecast: Option<&ForecastData>, zone: &DisplayZone) -> Vec<DailyRow> {
    forecast
        .map(ForecastData::daily)
        .unwrap_or_default()
        .iter()
        .map(|day| DailyRow {
            date: zone.format_date(day.dt),
            celsius: day.celsius(),
            fahrenheit: day.fahrenheit(),
        })
        .collect()
}

impl fmt::Display for HourlyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:>6} {:>6}  {}",
            self.time,
            format!("{}°C", self.celsius),
            format!("{}°F", self.fahrenheit),
            self.description
        )
    }
}

impl fmt::Display for DailyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:>6} {:>6}",
            self.date,
            format!("{}°C", self.celsius),
            format!("{}°F", self.fahrenheit)
        )
    }
}

/// Plain-text rendering of both tables for the terminal
#[must_use]
pub fn render_tables(hourly: &[HourlyRow], daily: &[DailyRow]) -> String {
    let mut out = String::new();

    out.push_str("Hourly Forecast for Today:\n");
    out.push_str(&format!(
        "{:<10} {:>6} {:>6}  {}\n",
        "Time", "°C", "°F", "Weather"
    ));
    for row in hourly {
        out.push_str(&format!("{row}\n"));
    }

    out.push_str("\nWeekly Forecast:\n");
    out.push_str(&format!("{:<12} {:>6} {:>6}\n", "Date", "°C", "°F"));
    for row in daily {
        out.push_str(&format!("{row}\n"));
    }

    out
}
