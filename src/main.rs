mod catalog;
mod clock;
mod elements;
mod geolocation;
mod predict;
mod propagator;
mod render;
mod tracker;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use crate::clock::SystemClock;
use crate::elements::HttpElementSource;
use crate::predict::{FlyoverSession, ObserverLocation, SessionSettings};
use crate::propagator::Sgp4Propagator;
use crate::render::SceneStore;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "flyover-watch")]
#[command(about = "Satellite tracking and visible pass prediction")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve,
    /// Print visible passes for an observer
    Predict {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        #[arg(long, allow_hyphen_values = true)]
        lon: String,
        /// Number of days to look ahead
        #[arg(long)]
        days: Option<u32>,
        /// Catalog number of the satellite
        #[arg(long, default_value = catalog::DEFAULT_SATELLITE)]
        norad_id: String,
    },
    /// List the selectable satellites
    Satellites,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Predict {
            lat,
            lon,
            days,
            norad_id,
        } => predict(config, &lat, &lon, days, &norad_id).await,
        Commands::Satellites => satellites(&config),
    }
}

async fn serve(config: Config) -> ExitCode {
    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn predict(
    config: Config,
    lat: &str,
    lon: &str,
    days: Option<u32>,
    norad_id: &str,
) -> ExitCode {
    let height_km = config.observer.as_ref().map(|o| o.height_km);
    let observer = match ObserverLocation::parse(lat, lon, height_km) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let catalog = config.catalog();
    let Some(satellite) = catalog.find(norad_id).cloned() else {
        eprintln!("Unknown satellite: {}", norad_id);
        return ExitCode::FAILURE;
    };

    let source = match HttpElementSource::new(&config.elements.base_url, config.elements.timeout) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let session = FlyoverSession::new(
        source,
        Arc::new(Sgp4Propagator::new()),
        Arc::new(SystemClock),
        Arc::new(SceneStore::new()),
        satellite.clone(),
        SessionSettings {
            altitude_km: config.prediction.satellite_altitude_km,
            track_interval: config.prediction.track_interval,
        },
    );

    let days = days.unwrap_or(config.prediction.default_days);
    match session.predict_passes(observer, days).await {
        Ok(passes) if passes.is_empty() => {
            println!(
                "No visible passes of {} in the next {} days",
                satellite.name, days
            );
            ExitCode::SUCCESS
        }
        Ok(passes) => {
            println!("Visible passes of {} ({} found)", satellite.name, passes.len());
            for (i, pass) in passes.iter().enumerate() {
                println!(
                    "  {:>2}: {}  {:>5.1} min  max {:>2}°  az {:>3}° -> {:>3}°",
                    i + 1,
                    pass.start_local,
                    pass.duration_minutes,
                    pass.max_elevation_deg,
                    pass.start_azimuth_deg,
                    pass.end_azimuth_deg
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn satellites(config: &Config) -> ExitCode {
    for entry in config.catalog().entries() {
        println!(
            "  {:>6}  {:<26} {:?} ({})",
            entry.norad_id,
            entry.name,
            entry.category,
            entry.model_file()
        );
    }
    ExitCode::SUCCESS
}
