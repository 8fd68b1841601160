use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Form, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api;
use crate::clock::DisplayZone;
use crate::config::SkycastConfig;
use crate::geocoding::{Geocoder, GeocodingClient};
use crate::pipeline::{LookupPipeline, LookupSession};
use crate::view::{self, DailyRow, HourlyRow};
use crate::weather::{ForecastClient, ForecastProvider};

const PROMPT: &str = r#"Enter a location and click "Get Weather" to retrieve the weather information."#;

/// Shared handler state: one session, one pipeline
pub struct AppState<G, F> {
    pub session: Arc<Mutex<LookupSession>>,
    pub pipeline: Arc<LookupPipeline<G, F>>,
}

impl<G, F> Clone for AppState<G, F> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<G: Geocoder, F: ForecastProvider> AppState<G, F> {
    pub fn new(session: LookupSession, pipeline: LookupPipeline<G, F>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            pipeline: Arc::new(pipeline),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupForm {
    #[serde(default)]
    pub location: String,
}

pub fn router<G, F>(state: AppState<G, F>) -> Router
where
    G: Geocoder + 'static,
    F: ForecastProvider + 'static,
{
    Router::new()
        .route("/", get(index::<G, F>).post(submit::<G, F>))
        .route("/chart.svg", get(chart_svg::<G, F>))
        .with_state(state.clone())
        .nest("/api", api::router(state))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: &SkycastConfig) -> Result<()> {
    config.validate()?;

    let geocoder = GeocodingClient::new(&config.geocoding)?;
    let provider = ForecastClient::new(&config.weather)?;
    let zone = DisplayZone::from(config.display_timezone()?);
    let state = AppState::new(
        LookupSession::new(zone),
        LookupPipeline::new(geocoder, provider),
    );

    let app = router(state);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn index<G, F>(State(state): State<AppState<G, F>>) -> Html<String>
where
    G: Geocoder + 'static,
    F: ForecastProvider + 'static,
{
    let session = state.session.lock().await;
    Html(render_page(&session))
}

async fn submit<G, F>(State(state): State<AppState<G, F>>, Form(form): Form<LookupForm>) -> Redirect
where
    G: Geocoder + 'static,
    F: ForecastProvider + 'static,
{
    state.session.lock().await.set_query(form.location);
    let outcome = state.pipeline.submit(&state.session).await;
    info!("Lookup finished: {:?}", outcome);
    Redirect::to("/")
}

async fn chart_svg<G, F>(State(state): State<AppState<G, F>>) -> Response
where
    G: Geocoder + 'static,
    F: ForecastProvider + 'static,
{
    let session = state.session.lock().await;
    match session.chart().current() {
        Some(chart) => (
            [(header::CONTENT_TYPE, "image/svg+xml")],
            chart.svg().to_string(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn hourly_table(rows: &[HourlyRow]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}°C</td><td>{}°F</td><td>{}</td></tr>",
                escape_html(&row.time),
                row.celsius,
                row.fahrenheit,
                escape_html(&row.description)
            )
        })
        .collect();
    format!(
        "<h3>Hourly Forecast for Today:</h3>\n<table class=\"hourly\">\
         <thead><tr><th>Time</th><th>Temperature (°C)</th><th>Temperature (°F)</th><th>Weather</th></tr></thead>\
         <tbody>{body}</tbody></table>\n"
    )
}

fn daily_table(rows: &[DailyRow]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}°C</td><td>{}°F</td></tr>",
                escape_html(&row.date),
                row.celsius,
                row.fahrenheit
            )
        })
        .collect();
    format!(
        "<h3>Weekly Forecast:</h3>\n<table class=\"daily\">\
         <thead><tr><th>Date</th><th>Temperature (°C)</th><th>Temperature (°F)</th></tr></thead>\
         <tbody>{body}</tbody></table>\n"
    )
}

/// The whole page for the current session state
pub fn render_page(session: &LookupSession) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Weather App</title>\n</head>\n<body>\n<h1>Weather App</h1>\n",
    );

    html.push_str(&format!(
        "<form method=\"post\" action=\"/\">\n\
         <label for=\"location\">Enter location:</label>\n\
         <input type=\"text\" id=\"location\" name=\"location\" value=\"{}\" placeholder=\"E.g., New York, London\">\n\
         <button type=\"submit\">Get Weather</button>\n</form>\n",
        escape_html(session.query())
    ));

    if let Some(error) = session.phase().error() {
        html.push_str(&format!(
            "<div class=\"error\" role=\"alert\">{}</div>\n",
            escape_html(&error.user_message())
        ));
    }

    // The chart surface is part of the page whether or not anything is drawn
    let svg = session.chart().current().map_or("", |chart| chart.svg());
    html.push_str(&format!(
        "<div class=\"chart-container\"><div id=\"{}\">{svg}</div></div>\n",
        session.chart().id()
    ));

    match session.forecast() {
        Some(forecast) => {
            if let Some(resolved) = session.resolved() {
                html.push_str(&format!(
                    "<p class=\"location\">{}</p>\n",
                    escape_html(&resolved.label())
                ));
            }

            let zone = session.zone();
            html.push_str(&hourly_table(&view::hourly_rows(Some(forecast), zone)));
            html.push_str(&daily_table(&view::daily_rows(Some(forecast), zone)));
        }
        None => html.push_str(&format!("<p>{}</p>\n", escape_html(PROMPT))),
    }

    html.push_str("</body>\n</html>\n");
    html
}
