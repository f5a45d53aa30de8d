use vremea_core::WeatherError as UserWeatherError;
use vremea_weather::{ForecastSnapshot, Place};

/// Everything the presentation layer reads.
///
/// Only the controller mutates it; readers get `&SessionState` or a clone.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Forecast on screen; `None` until the first fetch completes
    pub active_snapshot: Option<ForecastSnapshot>,
    pub query_text: String,
    /// Candidates for the current query, `None` when no list is shown
    pub candidates: Option<Vec<Place>>,
    /// Matches `active_snapshot.place` whenever no fetch is in flight
    pub last_viewed_place: Place,
    pub is_refreshing: bool,
    /// User-facing message when the forecast service is down
    pub last_error: Option<String>,
}

/// What the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionStatus<'a> {
    Loading,
    Failed(&'a str),
    Ready(&'a ForecastSnapshot),
}

impl SessionState {
    pub fn new(last_viewed_place: Place) -> Self {
        Self {
            active_snapshot: None,
            query_text: String::new(),
            candidates: None,
            last_viewed_place,
            is_refreshing: false,
            last_error: None,
        }
    }

    pub fn status(&self) -> SessionStatus<'_> {
        match (&self.active_snapshot, &self.last_error) {
            (Some(snapshot), _) => SessionStatus::Ready(snapshot),
            (None, Some(message)) => SessionStatus::Failed(message.as_str()),
            (None, None) => SessionStatus::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status(), SessionStatus::Loading)
    }

    /// Note to show alongside a forecast for the fallback place.
    pub fn notice(&self) -> Option<&'static str> {
        self.active_snapshot
            .as_ref()
            .filter(|snapshot| snapshot.is_fallback)
            .map(|snapshot| {
                UserWeatherError::ProviderDegraded {
                    requested: snapshot.place.to_string(),
                }
                .user_message()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vremea_weather::CurrentConditions;

    fn snapshot(place: Place, is_fallback: bool) -> ForecastSnapshot {
        ForecastSnapshot {
            place,
            current: CurrentConditions {
                temperature_c: 20.0,
                feels_like_c: 19.0,
                humidity_pct: 40,
                condition_text: "Sunny".into(),
                condition_icon: "//cdn.weatherapi.com/113.png".into(),
            },
            hourly: Vec::new(),
            is_fallback,
            fetched_at: Default::default(),
        }
    }

    #[test]
    fn test_new_state_is_loading() {
        let state = SessionState::new(Place::fallback());
        assert!(state.is_loading());
        assert_eq!(state.last_viewed_place, Place::fallback());
        assert!(state.candidates.is_none());
    }

    #[test]
    fn test_error_without_snapshot_is_failed() {
        let mut state = SessionState::new(Place::fallback());
        state.last_error = Some("down".into());
        assert_eq!(state.status(), SessionStatus::Failed("down"));
    }

    #[test]
    fn test_snapshot_wins_over_error() {
        let mut state = SessionState::new(Place::fallback());
        state.active_snapshot = Some(snapshot(Place::fallback(), false));
        state.last_error = Some("down".into());
        assert!(matches!(state.status(), SessionStatus::Ready(_)));
        assert_eq!(state.notice(), None);
    }

    #[test]
    fn test_fallback_snapshot_has_notice() {
        let mut state = SessionState::new(Place::fallback());
        state.active_snapshot = Some(snapshot(Place::fallback(), true));
        assert!(state.notice().is_some());
    }
}
