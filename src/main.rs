//! Vremea CLI
//!
//! Shows the forecast for the last viewed place, with optional search and
//! refresh in one run.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Handle;
use vremea_core::{AppError, Config, ConfigError};
use vremea_session::{SessionController, SessionEvent, SessionServices, SessionStatus};
use vremea_weather::{ForecastSnapshot, JsonFileStore};

/// Current conditions and hourly forecast
#[derive(Parser)]
#[command(name = "vremea")]
#[command(author, version, about = "Current weather and hourly forecast", long_about = None)]
struct Cli {
    /// Look up places matching this text
    #[arg(short, long)]
    query: Option<String>,

    /// Show the candidate at this index (0 = best match)
    #[arg(short, long, requires = "query")]
    pick: Option<usize>,

    /// Re-fetch the last viewed place before printing
    #[arg(short, long)]
    refresh: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    vremea_core::init()?;
    let (config, _) = match Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => match e.downcast::<ConfigError>() {
            Ok(config_err) => {
                let err = AppError::from(config_err);
                println!("{}", err.user_message());
                return Err(err.into());
            }
            Err(e) => return Err(e),
        },
    };

    let store = Arc::new(JsonFileStore::new(config.cache_dir()));
    let services =
        SessionServices::from_config(&config, store).context("Failed to build weather client")?;
    let mut session = SessionController::new(services, Handle::current());

    tracing::info!("Vremea started");
    session.start().await;
    log_events(session.settle().await);

    if let Some(query) = cli.query {
        session.set_query(query);
        log_events(session.settle().await);
        print_candidates(&session);

        if let Some(index) = cli.pick {
            if !session.select_candidate(index) {
                println!("No candidate at index {}", index);
            }
            log_events(session.settle().await);
        }
    }

    if cli.refresh {
        session.refresh();
        log_events(session.settle().await);
    }

    match session.status() {
        SessionStatus::Loading => println!("No forecast available"),
        SessionStatus::Failed(message) => println!("{}", message),
        SessionStatus::Ready(snapshot) => {
            if let Some(notice) = session.state().notice() {
                println!("{}\n", notice);
            }
            if let Some(message) = &session.state().last_error {
                println!("{}\n", message);
            }
            print_snapshot(snapshot);
        }
    }

    Ok(())
}

fn log_events(events: Vec<SessionEvent>) {
    for event in events {
        tracing::debug!("{:?}", event);
    }
}

fn print_candidates(session: &SessionController) {
    let state = session.state();
    match state.candidates.as_deref() {
        Some([]) | None => println!("No places match '{}'", state.query_text),
        Some(candidates) => {
            println!("Places matching '{}':", state.query_text);
            for (i, place) in candidates.iter().enumerate() {
                println!("  [{}] {}", i, place);
            }
            println!();
        }
    }
}

fn print_snapshot(snapshot: &ForecastSnapshot) {
    let current = &snapshot.current;
    println!("{}", snapshot.place);
    println!(
        "  {}°C  {}",
        current.temperature_c.round(),
        current.condition_text
    );
    println!("  Feels like {}°C", current.feels_like_c.round());
    println!("  Humidity {}%", current.humidity_pct);
    println!("  {}", current.icon_url());
    println!();

    for hour in &snapshot.hourly {
        println!(
            "  {}  {:>4}°C  {:<24} {}",
            hour.time.format("%H:%M"),
            hour.temperature_c.round(),
            hour.condition_text,
            hour.icon_url()
        );
    }
}
