//! Location cache behaviour over real and failing stores.

use std::sync::Arc;

use async_trait::async_trait;
use vremea_weather::cache::LAST_LOCATION_KEY;
use vremea_weather::{
    JsonFileStore, KeyValueStore, LocationCache, MemoryStore, Place, WeatherError,
};

/// Store whose backing medium is gone
#[derive(Debug)]
struct UnavailableStore;

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, WeatherError> {
        Err(WeatherError::Cache("storage offline".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), WeatherError> {
        Err(WeatherError::Cache("storage offline".into()))
    }
}

#[tokio::test]
async fn test_round_trip_across_fresh_sessions() {
    let dir = tempfile::tempdir().unwrap();

    let first = LocationCache::new(Arc::new(JsonFileStore::new(dir.path())));
    first.save(&Place::new("Paris", "France")).await;

    // New store instance over the same directory, as after a restart
    let second = LocationCache::new(Arc::new(JsonFileStore::new(dir.path())));
    assert_eq!(second.load().await, Some(Place::new("Paris", "France")));
}

#[tokio::test]
async fn test_save_overwrites_previous_place() {
    let store = Arc::new(MemoryStore::new());
    let cache = LocationCache::new(store.clone());

    cache.save(&Place::new("Paris", "France")).await;
    cache.save(&Place::fallback()).await;

    assert_eq!(cache.load().await, Some(Place::fallback()));
}

#[tokio::test]
async fn test_stored_shape() {
    let store = Arc::new(MemoryStore::new());
    let cache = LocationCache::new(store.clone());

    cache.save(&Place::new("London", "United Kingdom")).await;

    let raw = store.peek(LAST_LOCATION_KEY).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "location": "London", "country": "United Kingdom" })
    );
}

#[tokio::test]
async fn test_empty_store_loads_nothing() {
    let cache = LocationCache::new(Arc::new(MemoryStore::new()));
    assert_eq!(cache.load().await, None);
}

#[tokio::test]
async fn test_unavailable_store_loads_nothing() {
    let cache = LocationCache::new(Arc::new(UnavailableStore));
    assert_eq!(cache.load().await, None);
}

#[tokio::test]
async fn test_unavailable_store_save_is_ignored() {
    let cache = LocationCache::new(Arc::new(UnavailableStore));
    cache.save(&Place::new("Paris", "France")).await;
    assert!(cache.try_save(&Place::new("Paris", "France")).await.is_err());
}

#[tokio::test]
async fn test_corrupt_value_loads_nothing() {
    let store = Arc::new(MemoryStore::new());
    store.set(LAST_LOCATION_KEY, "{not json").await.unwrap();

    let cache = LocationCache::new(store);
    assert_eq!(cache.load().await, None);
}

#[tokio::test]
async fn test_incomplete_value_loads_nothing() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(LAST_LOCATION_KEY, r#"{"location":"Bucharest","country":""}"#)
        .await
        .unwrap();

    let cache = LocationCache::new(store);
    assert_eq!(cache.load().await, None);
}

#[tokio::test]
async fn test_corrupt_file_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{}.json", LAST_LOCATION_KEY)),
        b"\x00\x01garbage",
    )
    .unwrap();

    let cache = LocationCache::new(Arc::new(JsonFileStore::new(dir.path())));
    assert_eq!(cache.load().await, None);
}
