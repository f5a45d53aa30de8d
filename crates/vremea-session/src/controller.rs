//! The session state machine.
//!
//! Resolver calls and fetches are tagged with generation numbers when they
//! are issued. A result is applied only if its tag is still the latest one
//! issued for its kind, so completion order never decides what is shown:
//! - a late answer for an older query cannot replace a newer query's
//!   candidates, and selecting a place drops every pending answer;
//! - of several fetches in flight, the last one issued wins;
//! - cache saves are numbered too, and an older save never lands after a
//!   newer one.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use vremea_weather::{ForecastSnapshot, Place, WeatherError};

use crate::error_mapping::into_app_error;
use crate::service::{self, FetchKind, SaveGate, SessionMessage, SessionServices};
use crate::state::{SessionState, SessionStatus};

/// What applying one background result did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CandidatesUpdated { query: String, count: usize },
    StaleCandidatesDiscarded { query: String },
    ForecastLoaded { place: Place, is_fallback: bool },
    /// The requested place was missing a name or region
    ForecastSkipped { requested: Place },
    ForecastFailed { requested: Place, message: String },
    StaleForecastDiscarded { requested: Place },
    LocationSaved { place: Place },
    /// A newer save reached the cache first
    StaleSaveSkipped { place: Place },
}

pub struct SessionController {
    services: SessionServices,
    runtime: Handle,
    tx: UnboundedSender<SessionMessage>,
    rx: UnboundedReceiver<SessionMessage>,
    state: SessionState,
    query_generation: u64,
    fetch_generation: u64,
    /// Fetch generation of the refresh that owns `is_refreshing`
    refresh_generation: Option<u64>,
    save_generation: u64,
    save_gate: SaveGate,
    /// Background tasks that have not reported back yet
    in_flight: usize,
}

impl SessionController {
    pub fn new(services: SessionServices, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = SessionState::new(services.fetcher.fallback().clone());

        Self {
            services,
            runtime,
            tx,
            rx,
            state,
            query_generation: 0,
            fetch_generation: 0,
            refresh_generation: None,
            save_generation: 0,
            save_gate: Arc::new(Mutex::new(0)),
            in_flight: 0,
        }
    }

    /// Read-only view of the session
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Owned copy of the session, for readers that outlive the borrow
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn status(&self) -> SessionStatus<'_> {
        self.state.status()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Load the remembered place (or the fallback) and fetch it.
    pub async fn start(&mut self) {
        let target = match self.services.cache.load().await {
            Some(place) => place,
            None => {
                tracing::info!(
                    "No remembered location, starting with {}",
                    self.services.fetcher.fallback()
                );
                self.services.fetcher.fallback().clone()
            }
        };

        self.state.last_viewed_place = target.clone();
        self.fetch_and_persist(target, FetchKind::Startup);
    }

    /// Store the new query text and look up candidates for it.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.state.query_text = text.clone();
        self.query_generation += 1;

        tracing::debug!("Query #{} issued: '{}'", self.query_generation, text);
        self.in_flight += 1;
        service::request_resolve(
            &self.runtime,
            &self.tx,
            self.services.resolver.clone(),
            self.query_generation,
            text,
        );
    }

    /// Pick candidate `index` from the current list.
    /// Returns `false` (and changes nothing) when there is no such candidate.
    pub fn select_candidate(&mut self, index: usize) -> bool {
        let place = match self
            .state
            .candidates
            .as_ref()
            .and_then(|candidates| candidates.get(index))
        {
            Some(place) => place.clone(),
            None => {
                tracing::debug!("No candidate at index {}", index);
                return false;
            }
        };

        self.select_place(place);
        true
    }

    /// The search action: pick the first candidate, if any.
    pub fn search(&mut self) -> bool {
        self.select_candidate(0)
    }

    /// Show `place`, clearing the query and candidates.
    pub fn select_place(&mut self, place: Place) {
        self.clear_query();
        self.fetch_and_persist(place, FetchKind::Selection);
    }

    /// Re-fetch the last viewed place.
    pub fn refresh(&mut self) {
        self.state.is_refreshing = true;
        let place = self.state.last_viewed_place.clone();
        self.fetch_and_persist(place, FetchKind::Refresh);
        self.refresh_generation = Some(self.fetch_generation);
    }

    /// Apply every result that has already arrived, without waiting.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            events.push(self.apply(message));
        }
        events
    }

    /// Wait for the next background result and apply it.
    /// Returns `None` when nothing is in flight.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if self.in_flight == 0 {
            return None;
        }
        let message = self.rx.recv().await?;
        Some(self.apply(message))
    }

    /// Wait until every background task has reported back.
    pub async fn settle(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    fn clear_query(&mut self) {
        self.state.query_text.clear();
        self.state.candidates = None;
        // Pending resolver answers belong to a query that no longer exists
        self.query_generation += 1;
    }

    fn fetch_and_persist(&mut self, place: Place, kind: FetchKind) {
        self.fetch_generation += 1;
        tracing::debug!(
            "Fetch #{} issued ({:?}) for {}",
            self.fetch_generation,
            kind,
            place
        );

        self.in_flight += 1;
        service::request_fetch(
            &self.runtime,
            &self.tx,
            self.services.fetcher.clone(),
            self.fetch_generation,
            kind,
            place,
        );
    }

    fn persist(&mut self, place: Place) {
        self.save_generation += 1;
        self.in_flight += 1;
        service::request_save(
            &self.runtime,
            &self.tx,
            self.services.cache.clone(),
            self.save_gate.clone(),
            self.save_generation,
            place,
        );
    }

    fn apply(&mut self, message: SessionMessage) -> SessionEvent {
        self.in_flight = self.in_flight.saturating_sub(1);

        match message {
            SessionMessage::CandidatesReady {
                generation,
                query,
                candidates,
            } => self.apply_candidates(generation, query, candidates),
            SessionMessage::FetchDone {
                generation,
                kind,
                requested,
                result,
            } => self.apply_fetch(generation, kind, requested, result),
            SessionMessage::LocationSaved {
                generation,
                place,
                written,
            } => {
                if written {
                    SessionEvent::LocationSaved { place }
                } else {
                    tracing::debug!("Save #{} of {} superseded", generation, place);
                    SessionEvent::StaleSaveSkipped { place }
                }
            }
        }
    }

    fn apply_candidates(
        &mut self,
        generation: u64,
        query: String,
        candidates: Vec<Place>,
    ) -> SessionEvent {
        if generation != self.query_generation {
            tracing::debug!(
                "Discarding candidates for superseded query #{} '{}'",
                generation,
                query
            );
            return SessionEvent::StaleCandidatesDiscarded { query };
        }

        let count = candidates.len();
        self.state.candidates = Some(candidates);
        SessionEvent::CandidatesUpdated { query, count }
    }

    fn apply_fetch(
        &mut self,
        generation: u64,
        kind: FetchKind,
        requested: Place,
        result: Result<Option<ForecastSnapshot>, WeatherError>,
    ) -> SessionEvent {
        if self.refresh_generation == Some(generation) {
            self.refresh_generation = None;
            self.state.is_refreshing = false;
            self.clear_query();
        }

        if generation != self.fetch_generation {
            tracing::debug!(
                "Discarding superseded fetch #{} ({:?}) for {}",
                generation,
                kind,
                requested
            );
            return SessionEvent::StaleForecastDiscarded { requested };
        }

        match result {
            Ok(Some(snapshot)) => {
                let place = snapshot.place.clone();
                let is_fallback = snapshot.is_fallback;
                if is_fallback {
                    tracing::warn!("Showing {} instead of {}", place, requested);
                }

                self.state.active_snapshot = Some(snapshot);
                self.state.last_viewed_place = place.clone();
                self.state.last_error = None;
                self.persist(place.clone());

                SessionEvent::ForecastLoaded { place, is_fallback }
            }
            Ok(None) => SessionEvent::ForecastSkipped { requested },
            Err(e) => {
                let err = into_app_error(e);
                tracing::error!("Forecast for {} failed: {}", requested, err);
                let message = err.user_message().to_string();
                self.state.last_error = Some(message.clone());
                SessionEvent::ForecastFailed { requested, message }
            }
        }
    }
}
