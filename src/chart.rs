//! Hourly temperature chart
//!
//! A [`ChartSurface`] is the single place a chart can live. Drawing a new one
//! always destroys the previous chart first, so repeated lookups never keep
//! more than one rendered chart around.

use plotters::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::DisplayZone;
use crate::error::SkycastError;
use crate::models::HourlyEntry;
use crate::Result;

/// Id of the fixed drawing surface
pub const SURFACE_ID: &str = "temperatureChart";

const SERIES_LABEL: &str = "Temperature (°C)";
const DEFAULT_SIZE: (u32, u32) = (800, 400);
const SERIES_COLOR: RGBColor = RGBColor(75, 192, 192);
/// Largest absolute temperature the y axis accepts
const PLOTTABLE_CELSIUS: i64 = 1_000;

/// Points plotted on the chart, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    /// Time-of-day labels for the x axis
    pub labels: Vec<String>,
    /// Whole degrees Celsius for the y axis
    pub temperatures: Vec<i64>,
}

impl ChartData {
    /// Build the series from the first day of hourly entries
    #[must_use]
    pub fn from_hourly(hours: &[HourlyEntry], zone: &DisplayZone) -> Self {
        let (labels, temperatures) = hours
            .iter()
            .map(|hour| (zone.format_time(hour.dt), hour.celsius()))
            .unzip();
        Self {
            labels,
            temperatures,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    /// Y range that always contains zero, with one degree of headroom
    fn y_range(&self) -> Result<std::ops::Range<i64>> {
        let min = self.temperatures.iter().copied().min().unwrap_or(0).min(0);
        let max = self.temperatures.iter().copied().max().unwrap_or(0).max(0);
        if min < -PLOTTABLE_CELSIUS || max > PLOTTABLE_CELSIUS {
            return Err(SkycastError::chart(format!(
                "temperatures {min}..{max} °C are outside the plottable range"
            )));
        }
        Ok(min..max.saturating_add(1))
    }
}

/// A drawn chart; only ever owned by a [`ChartSurface`]
#[derive(Debug)]
pub struct TemperatureChart {
    data: ChartData,
    svg: String,
}

impl TemperatureChart {
    #[must_use]
    pub fn data(&self) -> &ChartData {
        &self.data
    }

    /// The chart as a standalone SVG document
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.svg
    }

    fn destroy(self) {
        debug!("Destroying chart with {} points", self.data.len());
    }
}

/// Fixed-identity drawing target holding at most one chart
#[derive(Debug)]
pub struct ChartSurface {
    size: (u32, u32),
    current: Option<TemperatureChart>,
    drawn: u64,
    destroyed: u64,
}

impl Default for ChartSurface {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl ChartSurface {
    #[must_use]
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            size,
            current: None,
            drawn: 0,
            destroyed: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &'static str {
        SURFACE_ID
    }

    /// The chart currently on the surface
    #[must_use]
    pub fn current(&self) -> Option<&TemperatureChart> {
        self.current.as_ref()
    }

    /// Charts drawn over the surface's lifetime
    #[must_use]
    pub fn drawn(&self) -> u64 {
        self.drawn
    }

    /// Charts destroyed over the surface's lifetime
    #[must_use]
    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    /// Remove and release the current chart, if any
    pub fn destroy(&mut self) {
        if let Some(chart) = self.current.take() {
            chart.destroy();
            self.destroyed += 1;
        }
    }

    /// Destroy the current chart, then draw `data`
    ///
    /// On a drawing error the surface is left empty.
    pub fn redraw(&mut self, data: ChartData) -> Result<&TemperatureChart> {
        self.destroy();

        let svg = render_svg(&data, self.size).inspect_err(|e| {
            warn!("Failed to draw temperature chart: {}", e);
        })?;

        self.drawn += 1;
        debug!("Drew chart {} with {} points", self.drawn, data.len());
        Ok(&*self.current.insert(TemperatureChart { data, svg }))
    }
}

fn chart_error(err: impl std::fmt::Display) -> SkycastError {
    SkycastError::chart(err.to_string())
}

fn render_svg(data: &ChartData, size: (u32, u32)) -> Result<String> {
    let y_range = data.y_range()?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        // A single point still needs a non-empty x range
        let x_end = i32::try_from(data.len().saturating_sub(1).max(1)).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(SERIES_LABEL, ("sans-serif", 18))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(48)
            .build_cartesian_2d(0..x_end, y_range)
            .map_err(chart_error)?;

        let labels = &data.labels;
        let label_for = |x: &i32| {
            usize::try_from(*x)
                .ok()
                .and_then(|i| labels.get(i))
                .cloned()
                .unwrap_or_default()
        };

        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc(SERIES_LABEL)
            .x_labels(data.len().max(2))
            .x_label_formatter(&label_for)
            .light_line_style(BLACK.mix(0.1))
            .draw()
            .map_err(chart_error)?;

        let points = data
            .temperatures
            .iter()
            .enumerate()
            .filter_map(|(i, temp)| i32::try_from(i).ok().map(|x| (x, *temp)));

        chart
            .draw_series(LineSeries::new(points, SERIES_COLOR.stroke_width(2)))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}
