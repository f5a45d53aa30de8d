//! Map provider-level failures onto the application error hierarchy.

use vremea_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};
use vremea_weather::WeatherError as ProviderError;

pub fn into_app_error(e: ProviderError) -> AppError {
    match e {
        e @ ProviderError::ProviderUnavailable { .. } if e.is_auth_failure() => {
            AppError::Weather(WeatherError::InvalidApiKey)
        }
        e @ ProviderError::ProviderUnavailable { .. } => {
            AppError::Weather(WeatherError::ProviderUnavailable(e.to_string()))
        }
        ProviderError::Network(e) => AppError::Network(e.into_network_error()),
        ProviderError::Status { status, body } => AppError::Network(NetworkError::ServerError {
            status,
            message: body,
        }),
        ProviderError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
        ProviderError::Cache(s) => AppError::Weather(WeatherError::CacheUnavailable(s)),
        ProviderError::Io(e) => AppError::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(status: u16) -> ProviderError {
        ProviderError::ProviderUnavailable {
            primary: Box::new(ProviderError::Status {
                status: 500,
                body: String::new(),
            }),
            fallback: Some(Box::new(ProviderError::Status {
                status,
                body: String::new(),
            })),
        }
    }

    #[test]
    fn test_total_failure_maps_to_provider_unavailable() {
        let err = into_app_error(unavailable(503));
        assert!(matches!(
            err,
            AppError::Weather(WeatherError::ProviderUnavailable(_))
        ));
        assert!(err.is_user_visible());
    }

    #[test]
    fn test_rejected_key_maps_to_invalid_api_key() {
        let err = into_app_error(unavailable(401));
        assert!(matches!(err, AppError::Weather(WeatherError::InvalidApiKey)));
    }

    #[test]
    fn test_cache_failure_is_not_user_visible() {
        let err = into_app_error(ProviderError::Cache("offline".into()));
        assert!(matches!(err, AppError::Weather(WeatherError::CacheUnavailable(_))));
        assert!(!err.is_user_visible());
    }

    #[test]
    fn test_status_maps_to_server_error() {
        let err = into_app_error(ProviderError::Status {
            status: 502,
            body: "bad gateway".into(),
        });
        assert!(matches!(
            err,
            AppError::Network(NetworkError::ServerError { status: 502, .. })
        ));
    }
}
