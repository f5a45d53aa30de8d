//! Centralized error types for Vremea.
//!
//! This module provides a typed error hierarchy that:
//! - Separates failures the session recovers from locally from the one
//!   condition the user must see
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Whether this error should be shown to the user rather than recovered
    /// from silently.
    pub fn is_user_visible(&self) -> bool {
        match self {
            AppError::Weather(e) => e.is_user_visible(),
            AppError::Network(_) | AppError::Config(_) | AppError::Io(_) | AppError::Other(_) => {
                true
            }
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration location not found on this system.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Forecast retrieval failures, from the user's point of view.
///
/// Only `ProviderUnavailable` and `InvalidApiKey` are meant to reach the
/// presentation layer; the others are recovered where they happen.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Place search failed; treated as "no candidates".
    #[error("Place search unavailable: {0}")]
    ResolutionUnavailable(String),

    /// Requested place failed, fallback place shown instead.
    #[error("Forecast for {requested} unavailable, showing fallback place")]
    ProviderDegraded { requested: String },

    /// Both the requested and the fallback forecast failed.
    #[error("Forecast service unavailable: {0}")]
    ProviderUnavailable(String),

    /// Last-viewed place could not be read or written.
    #[error("Location cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::ResolutionUnavailable(_) => "Place search is unavailable right now.",
            WeatherError::ProviderDegraded { .. } => {
                "Forecast unavailable for that place. Showing the default location."
            }
            WeatherError::ProviderUnavailable(_) => {
                "Weather service unavailable. Pull to refresh or try again later."
            }
            WeatherError::CacheUnavailable(_) => "Your last location could not be remembered.",
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
        }
    }

    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            WeatherError::ProviderUnavailable(_) | WeatherError::InvalidApiKey
        )
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let err = WeatherError::ProviderUnavailable("both requests failed".into());
        let app_err: AppError = err.into();
        assert!(matches!(
            app_err,
            AppError::Weather(WeatherError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Weather(WeatherError::ProviderUnavailable("x".into()));
        assert_eq!(
            app_err.user_message(),
            "Weather service unavailable. Pull to refresh or try again later."
        );
    }

    #[test]
    fn test_only_total_failure_is_user_visible() {
        assert!(WeatherError::ProviderUnavailable("x".into()).is_user_visible());
        assert!(!WeatherError::ResolutionUnavailable("x".into()).is_user_visible());
        assert!(!WeatherError::CacheUnavailable("x".into()).is_user_visible());
        assert!(!WeatherError::ProviderDegraded {
            requested: "Paris, France".into()
        }
        .is_user_visible());
    }

    #[test]
    fn test_config_error_messages() {
        let app_err: AppError = ConfigError::ParseError("expected `=`".into()).into();
        assert_eq!(
            app_err.user_message(),
            "Configuration file is malformed. Check your settings."
        );
        assert!(app_err.is_user_visible());
        assert!(app_err.to_string().contains("expected `=`"));
    }

    #[test]
    fn test_server_error_message_depends_on_status() {
        let server = NetworkError::ServerError {
            status: 503,
            message: "down".into(),
        };
        let client = NetworkError::ServerError {
            status: 400,
            message: "bad".into(),
        };
        assert_ne!(server.user_message(), client.user_message());
        assert!(server.user_message().contains("later"));
    }
}
