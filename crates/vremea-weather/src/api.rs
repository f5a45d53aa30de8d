//! Wire types for the search and forecast endpoints.

use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;

use crate::types::{CurrentConditions, ForecastSnapshot, HourlyForecast, Place, WeatherError};

/// Hour timestamps look like `2024-01-15 13:00`
const HOUR_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One record from `search.json`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRecord {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
}

impl SearchRecord {
    /// Reduce to a place. The country is the region users pick between;
    /// the sub-national region only stands in when no country is given.
    pub fn into_place(self) -> Place {
        let region = if self.country.trim().is_empty() {
            self.region
        } else {
            self.country
        };
        Place::new(self.name, region)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub location: ApiLocation,
    pub current: ApiCurrent,
    #[serde(default)]
    pub forecast: ApiForecast,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLocation {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCondition {
    pub text: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCurrent {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: u8,
    pub condition: ApiCondition,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiForecast {
    #[serde(default)]
    pub forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiForecastDay {
    #[serde(default)]
    pub hour: Vec<ApiHour>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiHour {
    pub time: String,
    pub temp_c: f64,
    pub condition: ApiCondition,
}

impl ForecastResponse {
    /// Build a snapshot tagged with `place`, keeping at most `hourly_limit`
    /// hours of the first forecast day.
    pub fn into_snapshot(
        self,
        place: Place,
        is_fallback: bool,
        hourly_limit: usize,
    ) -> Result<ForecastSnapshot, WeatherError> {
        let hourly = self
            .forecast
            .forecastday
            .into_iter()
            .next()
            .map(|day| day.hour)
            .unwrap_or_default()
            .into_iter()
            .take(hourly_limit)
            .map(|hour| {
                let time = NaiveDateTime::parse_from_str(&hour.time, HOUR_TIME_FORMAT)
                    .map_err(|e| {
                        WeatherError::Parse(format!("Invalid hour time '{}': {}", hour.time, e))
                    })?;
                Ok(HourlyForecast {
                    time,
                    temperature_c: hour.temp_c,
                    condition_text: hour.condition.text,
                    condition_icon: hour.condition.icon,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(ForecastSnapshot {
            place,
            current: CurrentConditions {
                temperature_c: self.current.temp_c,
                feels_like_c: self.current.feelslike_c,
                humidity_pct: self.current.humidity,
                condition_text: self.current.condition.text,
                condition_icon: self.current.condition.icon,
            },
            hourly,
            is_fallback,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_hours(count: usize) -> ForecastResponse {
        let hours: Vec<serde_json::Value> = (0..count)
            .map(|h| {
                serde_json::json!({
                    "time": format!("2024-01-{:02} {:02}:00", 15 + h / 24, h % 24),
                    "temp_c": h as f64,
                    "condition": { "text": "Sunny", "icon": "//cdn.weatherapi.com/113.png" }
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "location": { "name": "Paris", "region": "Ile-de-France", "country": "France" },
            "current": {
                "temp_c": 12.0,
                "feelslike_c": 10.5,
                "humidity": 71,
                "condition": { "text": "Partly cloudy", "icon": "//cdn.weatherapi.com/116.png" }
            },
            "forecast": { "forecastday": [ { "hour": hours } ] }
        }))
        .unwrap()
    }

    #[test]
    fn test_search_record_prefers_country() {
        let record = SearchRecord {
            name: "Paris".into(),
            region: "Ile-de-France".into(),
            country: "France".into(),
        };
        assert_eq!(record.into_place(), Place::new("Paris", "France"));

        let record = SearchRecord {
            name: "Nowhere".into(),
            region: "Somewhere".into(),
            country: String::new(),
        };
        assert_eq!(record.into_place(), Place::new("Nowhere", "Somewhere"));
    }

    #[test]
    fn test_snapshot_keeps_requested_tag() {
        let snapshot = response_with_hours(3)
            .into_snapshot(Place::new("Paris", "France"), false, 24)
            .unwrap();
        assert_eq!(snapshot.place, Place::new("Paris", "France"));
        assert!(!snapshot.is_fallback);
        assert_eq!(snapshot.current.humidity_pct, 71);
        assert_eq!(snapshot.current.feels_like_c, 10.5);
        assert_eq!(snapshot.hourly.len(), 3);
        assert_eq!(snapshot.hourly[2].time.format("%H:%M").to_string(), "02:00");
    }

    #[test]
    fn test_hourly_is_bounded() {
        let snapshot = response_with_hours(30)
            .into_snapshot(Place::fallback(), true, 24)
            .unwrap();
        assert_eq!(snapshot.hourly.len(), 24);
        assert_eq!(snapshot.hourly[23].temperature_c, 23.0);
    }

    #[test]
    fn test_missing_forecast_days_gives_empty_hourly() {
        let mut response = response_with_hours(0);
        response.forecast.forecastday.clear();
        let snapshot = response
            .into_snapshot(Place::fallback(), false, 24)
            .unwrap();
        assert!(snapshot.hourly.is_empty());
    }

    #[test]
    fn test_bad_hour_time_is_parse_error() {
        let mut response = response_with_hours(1);
        response.forecast.forecastday[0].hour[0].time = "yesterday".into();
        let err = response
            .into_snapshot(Place::fallback(), false, 24)
            .unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }
}
