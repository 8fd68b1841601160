//! Shared HTTP plumbing for the geocoding and forecast clients

use std::time::{Duration, Instant};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{Service, SkycastError};
use crate::Result;

const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

/// Build a client with the configured timeout and retry policy
pub fn build_client(service: Service, config: &ServiceConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| {
            SkycastError::config(format!("Failed to create {service} HTTP client: {e}"))
        })?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// GET `url` and decode a JSON body, mapping every failure onto [`SkycastError`]
///
/// `endpoint` is the URL without credentials and is the only form that gets logged.
pub async fn get_json<T: DeserializeOwned>(
    client: &ClientWithMiddleware,
    service: Service,
    endpoint: &str,
    url: &str,
) -> Result<T> {
    let start_time = Instant::now();
    debug!("Requesting {} endpoint {}", service, endpoint);

    let response = client.get(url).send().await.map_err(|e| match e {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => SkycastError::Timeout { service },
        other => SkycastError::network(service, other.to_string()),
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!("{} service answered HTTP {}", service, status);
        return Err(SkycastError::Status {
            service,
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            SkycastError::Timeout { service }
        } else {
            SkycastError::network(service, e.to_string())
        }
    })?;

    let parsed = serde_json::from_str(&body)
        .map_err(|e| SkycastError::invalid_response(service, e.to_string()))?;

    let elapsed = start_time.elapsed();
    debug!(
        "{} response decoded in {:.3}s ({} bytes)",
        service,
        elapsed.as_secs_f64(),
        body.len()
    );
    if elapsed.as_secs() > 5 {
        warn!("Slow {} response: {:.3}s", service, elapsed.as_secs_f64());
    }

    Ok(parsed)
}
