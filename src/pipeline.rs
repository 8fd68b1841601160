//! Submission pipeline: query -> coordinates -> forecast -> chart
//!
//! [`LookupSession`] is the state a user sees. It is only mutated through
//! short, synchronous transitions, which lets [`LookupPipeline::submit`]
//! drop the session lock for the duration of every network call. Each
//! submission carries a generation number so a slow response from a
//! superseded submission can never overwrite newer state.

use std::fmt;

use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::chart::{ChartData, ChartSurface};
use crate::clock::DisplayZone;
use crate::error::SkycastError;
use crate::geocoding::Geocoder;
use crate::models::{Coordinates, ForecastData, ResolvedLocation};
use crate::weather::ForecastProvider;
use crate::Result;

/// Step of the pipeline a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Geocoding,
    Forecast,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Geocoding => write!(f, "geocoding"),
            FailureStage::Forecast => write!(f, "forecast"),
        }
    }
}

/// Where the current session stands
#[derive(Debug, Default)]
pub enum LookupPhase {
    /// Nothing submitted yet
    #[default]
    Idle,
    Resolving,
    Resolved,
    FetchingForecast,
    /// Forecast and chart are up to date with the coordinates
    Ready,
    /// The latest submission failed; earlier results are kept
    Failed {
        stage: FailureStage,
        error: SkycastError,
    },
}

impl LookupPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LookupPhase::Idle => "idle",
            LookupPhase::Resolving => "resolving",
            LookupPhase::Resolved => "resolved",
            LookupPhase::FetchingForecast => "fetching_forecast",
            LookupPhase::Ready => "ready",
            LookupPhase::Failed { .. } => "failed",
        }
    }

    /// The error behind a [`LookupPhase::Failed`] phase
    #[must_use]
    pub fn error(&self) -> Option<&SkycastError> {
        match self {
            LookupPhase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// How a call to [`LookupPipeline::submit`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// New forecast stored and chart redrawn
    ForecastUpdated,
    /// Geocode matched the stored coordinates and the stored forecast is current
    CoordinatesUnchanged,
    /// Geocoding failed; coordinates and forecast untouched
    GeocodingFailed,
    /// Forecast retrieval failed; previous forecast kept
    ForecastFailed,
    /// A newer submission started before this one finished
    Superseded,
}

impl LookupOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LookupOutcome::GeocodingFailed | LookupOutcome::ForecastFailed
        )
    }
}

/// Snapshot of the query taken at submit time
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub query: String,
    pub generation: u64,
}

/// A forecast fetch the session asked for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub coordinates: Coordinates,
    pub generation: u64,
}

/// What to do after a geocode has been applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolutionStep {
    Fetch(ForecastRequest),
    Done(LookupOutcome),
}

/// Everything the user sees, plus the bookkeeping to keep it consistent
#[derive(Debug, Default)]
pub struct LookupSession {
    query: String,
    resolved: Option<ResolvedLocation>,
    forecast: Option<ForecastData>,
    chart: ChartSurface,
    zone: DisplayZone,
    phase: LookupPhase,
    generation: u64,
    last_forecast_failed: bool,
}

impl LookupSession {
    #[must_use]
    pub fn new(zone: DisplayZone) -> Self {
        Self {
            zone,
            ..Self::default()
        }
    }

    /// Replace the query text; nothing else changes until the next submit
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.resolved.as_ref().map(|r| r.coordinates)
    }

    /// The geocode that produced the current coordinates
    #[must_use]
    pub fn resolved(&self) -> Option<&ResolvedLocation> {
        self.resolved.as_ref()
    }

    #[must_use]
    pub fn forecast(&self) -> Option<&ForecastData> {
        self.forecast.as_ref()
    }

    #[must_use]
    pub fn chart(&self) -> &ChartSurface {
        &self.chart
    }

    #[must_use]
    pub fn zone(&self) -> &DisplayZone {
        &self.zone
    }

    #[must_use]
    pub fn phase(&self) -> &LookupPhase {
        &self.phase
    }

    /// Start a new submission with the current query
    pub fn begin_submit(&mut self) -> Submission {
        self.generation += 1;
        self.phase = LookupPhase::Resolving;
        debug!("Submission {} for '{}'", self.generation, self.query);
        Submission {
            query: self.query.clone(),
            generation: self.generation,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Apply a geocode result and decide whether a forecast fetch is needed
    pub fn apply_resolution(
        &mut self,
        submission: &Submission,
        result: Result<ResolvedLocation>,
    ) -> ResolutionStep {
        if !self.is_current(submission.generation) {
            debug!(
                "Discarding geocode for superseded submission {}",
                submission.generation
            );
            return ResolutionStep::Done(LookupOutcome::Superseded);
        }

        let location = match result {
            Ok(location) => location,
            Err(e) => {
                error!("Error fetching coordinates: {}", e);
                self.phase = LookupPhase::Failed {
                    stage: FailureStage::Geocoding,
                    error: e,
                };
                return ResolutionStep::Done(LookupOutcome::GeocodingFailed);
            }
        };

        let coordinates = location.coordinates;
        let changed = self.coordinates() != Some(coordinates);
        self.resolved = Some(location);
        self.phase = LookupPhase::Resolved;

        if changed || self.forecast.is_none() || self.last_forecast_failed {
            self.phase = LookupPhase::FetchingForecast;
            ResolutionStep::Fetch(ForecastRequest {
                coordinates,
                generation: submission.generation,
            })
        } else {
            info!("Coordinates unchanged at {}, keeping forecast", coordinates);
            self.phase = LookupPhase::Ready;
            ResolutionStep::Done(LookupOutcome::CoordinatesUnchanged)
        }
    }

    /// Apply a forecast result; a success replaces the forecast and redraws the chart
    pub fn apply_forecast(
        &mut self,
        request: &ForecastRequest,
        result: Result<ForecastData>,
    ) -> LookupOutcome {
        if !self.is_current(request.generation) {
            debug!(
                "Discarding forecast for superseded submission {}",
                request.generation
            );
            return LookupOutcome::Superseded;
        }

        match result {
            Ok(forecast) => {
                let data = ChartData::from_hourly(forecast.next_hours(), &self.zone);
                self.forecast = Some(forecast);
                self.last_forecast_failed = false;
                if let Err(e) = self.chart.redraw(data) {
                    warn!("Forecast stored without a chart: {}", e);
                }
                self.phase = LookupPhase::Ready;
                LookupOutcome::ForecastUpdated
            }
            Err(e) => {
                error!("Error fetching weather data: {}", e);
                self.last_forecast_failed = true;
                self.phase = LookupPhase::Failed {
                    stage: FailureStage::Forecast,
                    error: e,
                };
                LookupOutcome::ForecastFailed
            }
        }
    }
}

/// Runs submissions against a geocoder and a forecast provider
pub struct LookupPipeline<G, F> {
    geocoder: G,
    provider: F,
}

impl<G: Geocoder, F: ForecastProvider> LookupPipeline<G, F> {
    pub fn new(geocoder: G, provider: F) -> Self {
        Self { geocoder, provider }
    }

    /// Submit the session's current query
    ///
    /// The session lock is taken only for the state transitions between the
    /// two network calls, never across them.
    #[instrument(skip_all)]
    pub async fn submit(&self, session: &Mutex<LookupSession>) -> LookupOutcome {
        let submission = session.lock().await.begin_submit();

        let resolution = self.geocoder.resolve(&submission.query).await;
        let step = session
            .lock()
            .await
            .apply_resolution(&submission, resolution);

        let request = match step {
            ResolutionStep::Fetch(request) => request,
            ResolutionStep::Done(outcome) => return outcome,
        };

        let forecast = self.provider.fetch(request.coordinates).await;
        let outcome = session.lock().await.apply_forecast(&request, forecast);
        info!("Submission {} finished: {:?}", submission.generation, outcome);
        outcome
    }
}
