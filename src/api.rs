//! JSON view of the lookup session

use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;

use crate::chart::ChartData;
use crate::geocoding::Geocoder;
use crate::models::ResolvedLocation;
use crate::pipeline::{LookupPhase, LookupSession};
use crate::view::{self, DailyRow, HourlyRow};
use crate::weather::ForecastProvider;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct ApiLocation {
    pub label: String,
    #[serde(flatten)]
    pub resolved: ResolvedLocation,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub stage: String,
    pub message: String,
    pub detail: String,
}

/// Everything the page shows, as data
#[derive(Debug, Serialize)]
pub struct ForecastSnapshot {
    pub query: String,
    pub phase: &'static str,
    pub location: Option<ApiLocation>,
    pub error: Option<ApiError>,
    pub hourly: Vec<HourlyRow>,
    pub daily: Vec<DailyRow>,
    pub chart: Option<ChartData>,
}

impl From<&LookupSession> for ForecastSnapshot {
    fn from(session: &LookupSession) -> Self {
        let error = match session.phase() {
            LookupPhase::Failed { stage, error } => Some(ApiError {
                stage: stage.to_string(),
                message: error.user_message(),
                detail: error.to_string(),
            }),
            _ => None,
        };

        Self {
            query: session.query().to_string(),
            phase: session.phase().name(),
            location: session.resolved().map(|resolved| ApiLocation {
                label: resolved.label(),
                resolved: resolved.clone(),
            }),
            error,
            hourly: view::hourly_rows(session.forecast(), session.zone()),
            daily: view::daily_rows(session.forecast(), session.zone()),
            chart: session.chart().current().map(|chart| chart.data().clone()),
        }
    }
}

/// Build the `/api` router. Caller nests this under `/api`.
pub fn router<G, F>(state: AppState<G, F>) -> Router
where
    G: Geocoder + 'static,
    F: ForecastProvider + 'static,
{
    Router::new()
        .route("/forecast", get(get_forecast::<G, F>))
        .with_state(state)
}

async fn get_forecast<G, F>(State(state): State<AppState<G, F>>) -> Json<ForecastSnapshot>
where
    G: Geocoder + 'static,
    F: ForecastProvider + 'static,
{
    let session = state.session.lock().await;
    Json(ForecastSnapshot::from(&*session))
}
