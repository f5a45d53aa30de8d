//! Durable memory of the last viewed place.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::KeyValueStore;
use crate::types::{Place, WeatherError};

/// Store key holding the serialized last viewed place
pub const LAST_LOCATION_KEY: &str = "last_searched_location";

/// Stored shape: `{"location": "...", "country": "..."}`
#[derive(Debug, Serialize, Deserialize)]
struct StoredLocation {
    location: String,
    country: String,
}

#[derive(Debug, Clone)]
pub struct LocationCache {
    store: Arc<dyn KeyValueStore>,
}

impl LocationCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The remembered place, or `None` when nothing usable is stored or the
    /// store cannot be read.
    pub async fn load(&self) -> Option<Place> {
        let raw = match self.store.get(LAST_LOCATION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No remembered location");
                return None;
            }
            Err(e) => {
                tracing::warn!("Location cache unavailable: {}", e);
                return None;
            }
        };

        let stored: StoredLocation = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Ignoring corrupt remembered location: {}", e);
                return None;
            }
        };

        let place = Place::new(stored.location, stored.country);
        if !place.is_well_formed() {
            tracing::warn!("Ignoring incomplete remembered location: {:?}", place);
            return None;
        }

        tracing::info!("Loaded remembered location: {}", place);
        Some(place)
    }

    /// Remember `place`, overwriting any previous value.
    pub async fn try_save(&self, place: &Place) -> Result<(), WeatherError> {
        let stored = StoredLocation {
            location: place.name().to_string(),
            country: place.region().to_string(),
        };
        let json = serde_json::to_string(&stored)
            .map_err(|e| WeatherError::Cache(format!("Failed to serialize location: {}", e)))?;
        self.store.set(LAST_LOCATION_KEY, &json).await
    }

    /// Best-effort variant of [`try_save`](Self::try_save): failures are
    /// logged and otherwise ignored.
    pub async fn save(&self, place: &Place) {
        match self.try_save(place).await {
            Ok(()) => tracing::debug!("Remembered location: {}", place),
            Err(e) => tracing::warn!("Failed to remember location {}: {}", place, e),
        }
    }
}
