//! Local-time labels for forecast timestamps

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

const INVALID_DATE: &str = "Invalid Date";

/// Time zone used to turn unix timestamps into wall-clock labels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DisplayZone {
    /// The zone of the machine running skycast
    #[default]
    Local,
    /// A fixed IANA zone from the configuration
    Named(Tz),
}

impl From<Option<Tz>> for DisplayZone {
    fn from(tz: Option<Tz>) -> Self {
        tz.map_or(DisplayZone::Local, DisplayZone::Named)
    }
}

impl DisplayZone {
    /// Wall-clock time of a unix timestamp in this zone
    #[must_use]
    pub fn local_datetime(&self, timestamp: i64) -> Option<NaiveDateTime> {
        let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        Some(match self {
            DisplayZone::Local => utc.with_timezone(&Local).naive_local(),
            DisplayZone::Named(tz) => utc.with_timezone(tz).naive_local(),
        })
    }

    /// Today's calendar date in this zone
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            DisplayZone::Local => Local::now().date_naive(),
            DisplayZone::Named(tz) => Utc::now().with_timezone(tz).date_naive(),
        }
    }

    /// Hour and minute, e.g. `3:07 PM`
    #[must_use]
    pub fn format_time(&self, timestamp: i64) -> String {
        self.local_datetime(timestamp).map_or_else(
            || INVALID_DATE.to_string(),
            |dt| dt.format("%-I:%M %p").to_string(),
        )
    }

    /// `Today` for the current calendar date, otherwise e.g. `11/14/2023`
    #[must_use]
    pub fn format_date(&self, timestamp: i64) -> String {
        self.format_date_relative_to(timestamp, self.today())
    }

    /// [`DisplayZone::format_date`] against an explicit "today"
    #[must_use]
    pub fn format_date_relative_to(&self, timestamp: i64, today: NaiveDate) -> String {
        match self.local_datetime(timestamp) {
            Some(dt) if dt.date() == today => "Today".to_string(),
            Some(dt) => dt.format("%-m/%-d/%Y").to_string(),
            None => INVALID_DATE.to_string(),
        }
    }
}
