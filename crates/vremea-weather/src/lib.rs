//! Forecast retrieval for Vremea
//!
//! Resolves free-text place queries, fetches current and hourly forecasts
//! with a fallback place, and remembers the last viewed place.

pub mod api;
pub mod cache;
pub mod client;
pub mod fetcher;
pub mod resolver;
pub mod store;
pub mod types;

pub use cache::LocationCache;
pub use client::WeatherApiClient;
pub use fetcher::ForecastFetcher;
pub use resolver::PlaceResolver;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::*;
