//! Integration tests for the skycast CLI and library

use std::path::Path;
use std::process::{Command, Output};

use skycast::config::ServiceConfig;
use skycast::{
    Coordinates, DisplayZone, ForecastClient, GeocodingClient, LookupOutcome, LookupPhase,
    LookupPipeline, LookupSession,
};
use tokio::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_VARS: [&str; 3] = [
    "SKYCAST_GEOCODING__API_KEY",
    "SKYCAST_WEATHER__API_KEY",
    "SKYCAST_CONFIG",
];

fn skycast(config: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_skycast"));
    for var in KEY_VARS {
        command.env_remove(var);
    }
    command
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("Failed to execute skycast")
}

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

async fn mock_services() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {"geometry": {"lat": 51.5072, "lng": -0.1275}, "formatted": "London, United Kingdom"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&server)
        .await;

    let hourly: Vec<_> = (0..48)
        .map(|i| {
            serde_json::json!({
                "dt": 1_700_000_000 + i * 3600,
                "temp": 280.15,
                "weather": [{"description": "clear sky"}]
            })
        })
        .collect();
    let daily: Vec<_> = (0..8)
        .map(|i| serde_json::json!({"dt": 1_700_000_000 + i * 86_400, "temp": {"day": 283.15}}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/weather/onecall"))
        .and(query_param("exclude", "minutely"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"hourly": hourly, "daily": daily})),
        )
        .mount(&server)
        .await;

    server
}

fn mock_config(server: &MockServer) -> String {
    format!(
        r#"
[geocoding]
api_key = "geo_integration_key"
base_url = "{uri}/geocode"

[weather]
api_key = "weather_integration_key"
base_url = "{uri}/weather"
max_retries = 0

[display]
timezone = "UTC"
"#,
        uri = server.uri()
    )
}

/// Test that the CLI lists its subcommands
#[test]
fn test_cli_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = skycast(&dir.path().join("missing.toml"), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skycast"));
    assert!(stdout.contains("lookup"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("config"));
}

/// Test that the config subcommand masks secrets
#[test]
fn test_config_command_masks_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
[geocoding]
api_key = "supersecretgeo1234"

[server]
port = 9090
"#,
    );

    let output = skycast(&config, &["config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("api_key = ****1234"));
    assert!(!stdout.contains("supersecretgeo1234"));
    assert!(stdout.contains("port = 9090"));
    assert!(stdout.contains("api_key = <unset>"));
}

/// Test that a lookup without API keys fails with guidance
#[test]
fn test_lookup_without_api_keys() {
    let dir = tempfile::tempdir().unwrap();
    let output = skycast(&dir.path().join("missing.toml"), &["lookup", "London"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SKYCAST_GEOCODING__API_KEY"),
        "unexpected stderr: {stderr}"
    );
}

/// Test that an invalid config file is rejected
#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[logging]\nlevel = \"loud\"\n");

    let output = skycast(&config, &["config"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid log level"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_prints_tables_and_writes_chart() {
    let server = mock_services().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &mock_config(&server));
    let chart = dir.path().join("chart.svg");

    let args = vec![
        "lookup".to_string(),
        "London".to_string(),
        "--chart".to_string(),
        chart.display().to_string(),
    ];
    let output = tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        skycast(&config, &args)
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("London, United Kingdom (51.5072, -0.1275)"));
    assert!(stdout.contains("Hourly Forecast for Today:"));
    assert!(stdout.contains("Weekly Forecast:"));
    assert_eq!(stdout.matches("clear sky").count(), 24);
    assert!(stdout.contains("11/21/2023"));

    let svg = std::fs::read_to_string(dir.path().join("chart.svg")).unwrap();
    assert!(svg.contains("<svg"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_json_output() {
    let server = mock_services().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &mock_config(&server));

    let output = tokio::task::spawn_blocking(move || skycast(&config, &["lookup", "London", "--json"]))
        .await
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["phase"], "ready");
    assert_eq!(json["hourly"].as_array().unwrap().len(), 24);
    assert_eq!(json["daily"].as_array().unwrap().len(), 8);
    assert_eq!(json["hourly"][0]["celsius"], 7);
    assert_eq!(json["hourly"][0]["fahrenheit"], 45);
    assert_eq!(json["chart"]["temperatures"].as_array().unwrap().len(), 24);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_unknown_location_fails() {
    let server = mock_services().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &mock_config(&server));

    let output = tokio::task::spawn_blocking(move || skycast(&config, &["lookup", "Atlantis"]))
        .await
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No location matching 'Atlantis' was found."));
}

#[tokio::test]
async fn test_pipeline_against_mock_services() {
    let server = mock_services().await;
    let geocoding = ServiceConfig {
        api_key: Some("geo".to_string()),
        base_url: format!("{}/geocode", server.uri()),
        timeout_seconds: 5,
        max_retries: 0,
    };
    let weather = ServiceConfig {
        base_url: format!("{}/weather", server.uri()),
        api_key: Some("weather".to_string()),
        ..geocoding.clone()
    };

    let pipeline = LookupPipeline::new(
        GeocodingClient::new(&geocoding).unwrap(),
        ForecastClient::new(&weather).unwrap(),
    );
    let mut session = LookupSession::new(DisplayZone::Named(chrono_tz::UTC));
    session.set_query("London");
    let session = Mutex::new(session);

    assert_eq!(pipeline.submit(&session).await, LookupOutcome::ForecastUpdated);
    {
        let guard = session.lock().await;
        assert_eq!(guard.coordinates(), Some(Coordinates::new(51.5072, -0.1275)));
        assert_eq!(guard.chart().current().unwrap().data().len(), 24);
    }

    session.lock().await.set_query("Atlantis");
    assert_eq!(pipeline.submit(&session).await, LookupOutcome::GeocodingFailed);

    let guard = session.lock().await;
    assert_eq!(guard.coordinates(), Some(Coordinates::new(51.5072, -0.1275)));
    assert!(matches!(guard.phase(), LookupPhase::Failed { .. }));
    assert!(guard.forecast().is_some());
}
