use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::{debug, info};

use skycast::api::ForecastSnapshot;
use skycast::config::ServiceConfig;
use skycast::{
    DisplayZone, ForecastClient, GeocodingClient, LookupPipeline, LookupSession, SkycastConfig,
    logging, view, web,
};

#[derive(Debug, Parser)]
#[command(
    name = "skycast",
    version,
    about = "Weather lookup: hourly and weekly forecast for any location"
)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "SKYCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look up the forecast for a location and print it
    Lookup {
        /// Free-text location, e.g. "New York" or "London"
        location: String,

        /// Write the hourly temperature chart to this SVG file
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Print the result as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Serve the weather page over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Show the configuration file location and effective settings
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = SkycastConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init_tracing(&config.logging, cli.verbose)?;
    debug!("Configuration loaded: {:?}", config);

    match cli.command {
        Command::Lookup {
            location,
            chart,
            json,
        } => lookup(&config, location, chart, json).await,
        Command::Serve { port, bind } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            config.validate_settings()?;
            web::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config => {
            show_config(&config, cli.config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn lookup(
    config: &SkycastConfig,
    location: String,
    chart_path: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    config.validate()?;

    let zone = DisplayZone::from(config.display_timezone()?);
    let pipeline = LookupPipeline::new(
        GeocodingClient::new(&config.geocoding)?,
        ForecastClient::new(&config.weather)?,
    );

    let mut session = LookupSession::new(zone);
    session.set_query(location);
    let session = Mutex::new(session);

    let outcome = pipeline.submit(&session).await;
    info!("Lookup finished: {:?}", outcome);
    let session = session.into_inner();

    if outcome.is_failure() {
        if let Some(error) = session.phase().error() {
            eprintln!("Error: {}", error.user_message());
            eprintln!("  ({error})");
        }
        return Ok(ExitCode::FAILURE);
    }

    if let Some(path) = chart_path {
        let chart = session
            .chart()
            .current()
            .context("No chart was drawn for this forecast")?;
        std::fs::write(&path, chart.svg())
            .with_context(|| format!("Failed to write chart to {}", path.display()))?;
        info!("Chart written to {}", path.display());
    }

    if json {
        let snapshot = ForecastSnapshot::from(&session);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(resolved) = session.resolved() {
        println!("{}\n", resolved.label());
    }
    let hourly = view::hourly_rows(session.forecast(), session.zone());
    let daily = view::daily_rows(session.forecast(), session.zone());
    print!("{}", view::render_tables(&hourly, &daily));

    Ok(ExitCode::SUCCESS)
}

fn print_service(section: &str, service: &ServiceConfig) {
    println!("[{section}]");
    println!("api_key = {}", service.masked_api_key());
    println!("base_url = {}", service.base_url);
    println!("timeout_seconds = {}", service.timeout_seconds);
    println!("max_retries = {}", service.max_retries);
    println!();
}

fn show_config(config: &SkycastConfig, explicit_path: Option<PathBuf>) {
    match explicit_path.or_else(SkycastConfig::config_path) {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not found, using defaults)", path.display()),
        None => println!("Config file: <no config directory>"),
    }
    println!();

    print_service("geocoding", &config.geocoding);
    print_service("weather", &config.weather);

    println!("[display]");
    println!(
        "timezone = {}",
        config.display.timezone.as_deref().unwrap_or("<local>")
    );
    println!();

    println!("[server]");
    println!("bind = {}", config.server.bind);
    println!("port = {}", config.server.port);
    println!();

    println!("[logging]");
    println!("level = {}", config.logging.level);
    println!("format = {}", config.logging.format);
}
