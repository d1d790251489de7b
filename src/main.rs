//! Binary entry for the `skycast` terminal dashboard
//!
//! Parses arguments, initializes logging from the configuration, and
//! drives the library: one-shot rendering, a live-updating watch mode,
//! and city search.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use tokio::time::{self, Instant};

use skycast::{
    AirQuality, DashboardConfig, Debouncer, FetchState, GeocodeClient, LocationResolver, Place,
    ViewSynchronizer, WeatherClient, WeatherSnapshot, catalog, codes,
};

#[derive(Debug, Parser)]
#[command(
    name = "skycast",
    version,
    about = "Live weather dashboard for your terminal"
)]
struct Cli {
    /// Path to a configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the dashboard once and exit
    Show {
        /// City name; the automatic location is used when omitted
        city: Option<String>,
    },

    /// Keep the dashboard updating until interrupted
    Watch {
        /// City name; the automatic location is used when omitted
        city: Option<String>,
    },

    /// Search for a city by name
    Search {
        /// Name fragment to look up
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = DashboardConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    init_logging(&config);
    tracing::info!("Skycast {} starting", skycast::VERSION);

    match cli.command.unwrap_or(Command::Show { city: None }) {
        Command::Show { city } => show(&config, city).await,
        Command::Watch { city } => watch(&config, city).await,
        Command::Search { query } => search(&config, &query).await,
    }
}

fn init_logging(config: &DashboardConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Pick the place to show: a named city through the catalog and the
/// geocoding service, or the automatic location fallback chain.
async fn resolve_place(config: &DashboardConfig, city: Option<String>) -> anyhow::Result<Place> {
    match city {
        Some(name) => {
            if let Some(place) = catalog::filter(&name).into_iter().next() {
                return Ok(place);
            }
            let geocoder = GeocodeClient::new(config);
            let results = geocoder
                .search(&name)
                .await
                .context("City search failed")?;
            results
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("No city matching '{name}' was found"))
        }
        None => Ok(LocationResolver::new(config).resolve().await),
    }
}

async fn show(config: &DashboardConfig, city: Option<String>) -> anyhow::Result<()> {
    let place = resolve_place(config, city).await?;
    let client = WeatherClient::new(config);
    let (snapshot, air_quality) = client
        .fetch_snapshot(&place.coordinate())
        .await
        .with_context(|| format!("Fetching weather for {} failed", place.label()))?;

    render(&place, &snapshot, air_quality.as_ref());
    Ok(())
}

async fn watch(config: &DashboardConfig, city: Option<String>) -> anyhow::Result<()> {
    let place = resolve_place(config, city).await?;
    let interval = Duration::from_secs(u64::from(config.refresh.interval_seconds));
    let synchronizer = ViewSynchronizer::start(Arc::new(WeatherClient::new(config)), place, interval);

    let mut states = synchronizer.subscribe();
    // Coalesce bursts of state changes into one redraw
    let mut redraw = Debouncer::new(Duration::from_millis(300));

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                redraw.trigger();
            }
            _ = time::sleep_until(redraw.deadline().unwrap_or_else(Instant::now)), if redraw.is_pending() => {
                redraw.fire();
                let state = states.borrow().clone();
                render_state(&state);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    synchronizer.shutdown().await;
    Ok(())
}

async fn search(config: &DashboardConfig, query: &str) -> anyhow::Result<()> {
    let local = catalog::filter(query);
    if !local.is_empty() {
        println!("Catalog:");
        for place in &local {
            println!("  {}  ({:.4}, {:.4})", place.label(), place.lat, place.lon);
        }
    }

    let geocoder = GeocodeClient::new(config);
    let remote = geocoder.search(query).await.context("City search failed")?;
    if !remote.is_empty() {
        println!("Geocoding:");
        for place in &remote {
            println!("  {}  ({:.4}, {:.4})", place.label(), place.lat, place.lon);
        }
    } else if local.is_empty() {
        println!("No matches for '{query}'");
    }

    Ok(())
}

fn render_state(state: &FetchState) {
    if let Some(snapshot) = &state.snapshot {
        render(&state.place, snapshot, state.air_quality.as_ref());
        if let Some(updated) = state.last_updated {
            if let Some(offset) = FixedOffset::east_opt(snapshot.utc_offset_seconds) {
                println!("Updated {}", updated.with_timezone(&offset).format("%H:%M"));
            }
        }
        if state.is_refreshing() {
            println!("Refreshing...");
        }
    } else if state.loading {
        println!("Loading {}...", state.place.label());
    }

    if let Some(message) = state.user_visible_error() {
        eprintln!("{message}");
    }
}

fn render(place: &Place, snapshot: &WeatherSnapshot, air_quality: Option<&AirQuality>) {
    let current = &snapshot.current;
    let (description, _) = codes::describe(current.weather_code);

    println!();
    println!("{}", place.label());
    println!(
        "{}  {}  feels like {}°C",
        description,
        current.format_temperature(),
        current.feels_like_c
    );
    println!(
        "Wind {} km/h {}   Humidity {}%   Pressure {:.0} hPa   UV {:.1} ({})",
        current.wind_speed_kmh,
        codes::wind_direction_cardinal(current.wind_direction_deg),
        current.humidity_pct,
        current.pressure_hpa,
        current.uv_index,
        codes::uv_label(current.uv_index),
    );
    if let Some(aq) = air_quality {
        println!(
            "Air quality {:.0} ({})   PM2.5 {:.1}   PM10 {:.1}",
            aq.european_aqi,
            codes::aqi_label(aq.european_aqi),
            aq.pm2_5,
            aq.pm10
        );
    }

    println!();
    println!("Next hours:");
    for entry in snapshot.hourly.iter().take(8) {
        let (hour_description, _) = codes::describe(entry.weather_code);
        println!(
            "  {}  {:>3.0}°C  {:<28} rain {:>3}%",
            entry.format_hour(),
            entry.temperature_c,
            hour_description,
            entry.precip_probability_pct
        );
    }

    println!();
    println!("Forecast:");
    let today = snapshot.today().map(|day| day.date);
    for day in &snapshot.daily {
        let (day_description, _) = codes::describe(day.weather_code);
        let label = today.map_or_else(|| day.date.format("%a").to_string(), |t| day.day_label(t));
        println!(
            "  {:<9} {:>3}° / {:>3}°  {:<28} rain {:>3}%",
            label,
            day.temp_max_c,
            day.temp_min_c,
            day_description,
            day.precip_prob_max_pct
        );
    }
}
