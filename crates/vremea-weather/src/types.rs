use chrono::{DateTime, NaiveDateTime, Utc};

/// Name of the place shown when nothing else is available.
pub const FALLBACK_NAME: &str = "Bucharest";
/// Region of the place shown when nothing else is available.
pub const FALLBACK_REGION: &str = "Romania";

/// Canonical (name, region) identifier for a place.
///
/// The pair itself is the identity; there is no surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Place {
    name: String,
    region: String,
}

impl Place {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }

    /// The hardcoded default place (`Bucharest, Romania`).
    pub fn fallback() -> Self {
        Self::new(FALLBACK_NAME, FALLBACK_REGION)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Both parts present. Fetches for anything else are skipped.
    pub fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty() && !self.region.trim().is_empty()
    }

    /// Provider query form: `name,region`.
    pub fn query(&self) -> String {
        format!("{},{}", self.name, self.region)
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.name, self.region)
    }
}

/// Current conditions at a place
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub condition_text: String,
    /// Provider icon reference, often protocol-relative (`//cdn...`)
    pub condition_icon: String,
}

impl CurrentConditions {
    pub fn icon_url(&self) -> String {
        icon_url(&self.condition_icon)
    }
}

/// Hourly forecast entry
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    /// Local time at the place, as reported by the provider
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub condition_text: String,
    pub condition_icon: String,
}

impl HourlyForecast {
    pub fn icon_url(&self) -> String {
        icon_url(&self.condition_icon)
    }
}

/// Complete forecast bundle for one place.
///
/// Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSnapshot {
    /// The place this snapshot describes (what was requested, or the
    /// fallback place)
    pub place: Place,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecast>,
    /// True when the requested place failed and this is the fallback
    pub is_fallback: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Expand a protocol-relative icon reference into a fetchable URL.
pub fn icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{}", icon)
    } else {
        icon.to_string()
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    /// Both the requested place and the fallback place failed.
    /// `fallback` is absent when the requested place was the fallback.
    #[error("Forecast unavailable: {primary}")]
    ProviderUnavailable {
        primary: Box<WeatherError>,
        fallback: Option<Box<WeatherError>>,
    },
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WeatherError {
    /// Provider rejected the API key (HTTP 401/403).
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Status { status, .. } => matches!(status, 401 | 403),
            Self::ProviderUnavailable { primary, fallback } => match fallback {
                Some(fallback) => fallback.is_auth_failure(),
                None => primary.is_auth_failure(),
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_place() {
        let place = Place::fallback();
        assert_eq!(place.name(), "Bucharest");
        assert_eq!(place.region(), "Romania");
        assert!(place.is_well_formed());
    }

    #[test]
    fn test_place_identity_is_the_pair() {
        assert_eq!(Place::new("Paris", "France"), Place::new("Paris", "France"));
        assert_ne!(Place::new("Paris", "France"), Place::new("Paris", "Ontario"));
    }

    #[test]
    fn test_malformed_places() {
        assert!(!Place::new("", "France").is_well_formed());
        assert!(!Place::new("Paris", "").is_well_formed());
        assert!(!Place::new("Paris", "   ").is_well_formed());
    }

    #[test]
    fn test_place_formats() {
        let place = Place::new("Paris", "France");
        assert_eq!(place.to_string(), "Paris, France");
        assert_eq!(place.query(), "Paris,France");
    }

    #[test]
    fn test_icon_url_expands_protocol_relative() {
        assert_eq!(
            icon_url("//cdn.weatherapi.com/weather/64x64/day/113.png"),
            "https://cdn.weatherapi.com/weather/64x64/day/113.png"
        );
        assert_eq!(icon_url("https://example.com/a.png"), "https://example.com/a.png");
    }

    #[test]
    fn test_auth_failure_uses_fallback_error() {
        let err = WeatherError::ProviderUnavailable {
            primary: Box::new(WeatherError::Status {
                status: 400,
                body: "No matching location found.".into(),
            }),
            fallback: Some(Box::new(WeatherError::Status {
                status: 401,
                body: "API key is invalid.".into(),
            })),
        };
        assert!(err.is_auth_failure());

        let err = WeatherError::ProviderUnavailable {
            primary: Box::new(WeatherError::Status {
                status: 403,
                body: "disabled".into(),
            }),
            fallback: None,
        };
        assert!(err.is_auth_failure());
        assert!(!WeatherError::Parse("x".into()).is_auth_failure());
    }
}
