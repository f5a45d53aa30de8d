//! Session backend: async resolution, fetching and persistence.
//! All network and storage work runs on the runtime; results come back to
//! the controller over a channel, tagged with the generation they were
//! issued for.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use vremea_core::{Config, WeatherError as UserWeatherError};
use vremea_weather::{
    ForecastFetcher, ForecastSnapshot, KeyValueStore, LocationCache, Place, PlaceResolver,
    WeatherApiClient, WeatherError,
};

/// Why a fetch was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Startup,
    Selection,
    Refresh,
}

/// Messages sent from async operations back to the controller
#[derive(Debug)]
pub enum SessionMessage {
    /// Resolver finished for the query issued under `generation`
    CandidatesReady {
        generation: u64,
        query: String,
        candidates: Vec<Place>,
    },
    /// Forecast fetch issued under `generation` finished
    FetchDone {
        generation: u64,
        kind: FetchKind,
        requested: Place,
        result: Result<Option<ForecastSnapshot>, WeatherError>,
    },
    /// Cache write issued under `generation` finished. `written` is false
    /// when a newer save had already landed and this one was dropped.
    LocationSaved {
        generation: u64,
        place: Place,
        written: bool,
    },
}

/// The collaborators a session drives.
#[derive(Debug, Clone)]
pub struct SessionServices {
    pub resolver: Arc<PlaceResolver>,
    pub fetcher: Arc<ForecastFetcher>,
    pub cache: Arc<LocationCache>,
}

impl SessionServices {
    pub fn new(resolver: PlaceResolver, fetcher: ForecastFetcher, cache: LocationCache) -> Self {
        Self {
            resolver: Arc::new(resolver),
            fetcher: Arc::new(fetcher),
            cache: Arc::new(cache),
        }
    }

    /// Build resolver, fetcher and cache from configuration.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, WeatherError> {
        let client = WeatherApiClient::new(
            config.weather.base_url.clone(),
            config.weather.api_key.clone(),
            Duration::from_secs(config.weather.timeout_secs),
        )?;

        let fetcher = ForecastFetcher::new(client.clone())
            .with_fallback(Place::new(
                config.fallback.name.clone(),
                config.fallback.region.clone(),
            ))
            .with_hourly_limit(config.weather.hourly_limit);

        Ok(Self::new(
            PlaceResolver::new(client),
            fetcher,
            LocationCache::new(store),
        ))
    }
}

/// Generation of the newest save that reached the cache.
///
/// Saves hold the lock across the store write, so writes never overlap
/// and one older than the newest written is skipped.
pub type SaveGate = Arc<Mutex<u64>>;

/// Resolve `query` in the background.
/// Sends `CandidatesReady` on the channel when complete.
pub fn request_resolve(
    runtime: &Handle,
    tx: &UnboundedSender<SessionMessage>,
    resolver: Arc<PlaceResolver>,
    generation: u64,
    query: String,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let candidates = match resolver.try_resolve(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                let err = UserWeatherError::ResolutionUnavailable(e.to_string());
                tracing::warn!("{} ('{}')", err, query);
                Vec::new()
            }
        };
        let _ = tx.send(SessionMessage::CandidatesReady {
            generation,
            query,
            candidates,
        });
    });
}

/// Fetch the forecast for `place` in the background.
/// Sends `FetchDone` on the channel when complete.
pub fn request_fetch(
    runtime: &Handle,
    tx: &UnboundedSender<SessionMessage>,
    fetcher: Arc<ForecastFetcher>,
    generation: u64,
    kind: FetchKind,
    place: Place,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = fetcher.fetch(&place).await;
        let _ = tx.send(SessionMessage::FetchDone {
            generation,
            kind,
            requested: place,
            result,
        });
    });
}

/// Remember `place` in the background, unless a save issued after it has
/// already been written. Failures are logged by the cache.
/// Sends `LocationSaved` on the channel when complete.
pub fn request_save(
    runtime: &Handle,
    tx: &UnboundedSender<SessionMessage>,
    cache: Arc<LocationCache>,
    gate: SaveGate,
    generation: u64,
    place: Place,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let mut newest = gate.lock().await;
        let written = generation > *newest;
        if written {
            cache.save(&place).await;
            *newest = generation;
        } else {
            tracing::debug!(
                "Skipping save #{} of {}, save #{} already landed",
                generation,
                place,
                *newest
            );
        }
        drop(newest);

        let _ = tx.send(SessionMessage::LocationSaved {
            generation,
            place,
            written,
        });
    });
}
