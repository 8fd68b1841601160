//! Kelvin conversions used by every view

const KELVIN_OFFSET: f64 = 273.15;

/// Round half toward positive infinity (`-2.5` becomes `-2`, `2.5` becomes `3`)
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Convert kelvin to whole degrees Celsius
#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> i64 {
    round_half_up(kelvin - KELVIN_OFFSET)
}

/// Convert kelvin to whole degrees Fahrenheit
#[must_use]
pub fn kelvin_to_fahrenheit(kelvin: f64) -> i64 {
    round_half_up((kelvin - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0)
}
