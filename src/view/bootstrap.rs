//! Best-effort initial-center resolution.

use crate::{capability::geolocate::GeolocationSource, core::geo::LatLng};
use std::time::Duration;

/// Resolves the initial map center from a single device-location lookup.
///
/// Failure modes (lookup error, timeout, out-of-range coordinates) all fall
/// back to `default_center` silently: log-only, never user-visible, and the
/// map is never delayed beyond `timeout`.
pub async fn resolve_initial_center(
    source: &dyn GeolocationSource,
    default_center: LatLng,
    timeout: Duration,
) -> LatLng {
    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(Ok(position)) if position.is_valid() => {
            log::debug!("geolocation resolved initial center: {:?}", position);
            position
        }
        Ok(Ok(position)) => {
            log::debug!(
                "geolocation returned out-of-range coordinates {:?}; using default center",
                position
            );
            default_center
        }
        Ok(Err(err)) => {
            log::debug!("geolocation lookup failed ({err}); using default center");
            default_center
        }
        Err(_) => {
            log::debug!(
                "geolocation timed out after {:?}; using default center",
                timeout
            );
            default_center
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MapError, Result};
    use async_trait::async_trait;

    struct FixedSource(LatLng);

    #[async_trait]
    impl GeolocationSource for FixedSource {
        async fn current_position(&self) -> Result<LatLng> {
            Ok(self.0)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl GeolocationSource for FailingSource {
        async fn current_position(&self) -> Result<LatLng> {
            Err(MapError::Geolocation("permission denied".to_string()))
        }
    }

    struct HangingSource;

    #[async_trait]
    impl GeolocationSource for HangingSource {
        async fn current_position(&self) -> Result<LatLng> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(LatLng::new(0.0, 0.0))
        }
    }

    const DEFAULT: LatLng = LatLng { lat: 52.52, lng: 13.405 };

    #[tokio::test]
    async fn test_successful_lookup_wins() {
        let resolved = resolve_initial_center(
            &FixedSource(LatLng::new(48.8566, 2.3522)),
            DEFAULT,
            Duration::from_millis(100),
        )
        .await;
        assert_eq!(resolved, LatLng::new(48.8566, 2.3522));
    }

    #[tokio::test]
    async fn test_failure_falls_back_silently() {
        let resolved =
            resolve_initial_center(&FailingSource, DEFAULT, Duration::from_millis(100)).await;
        assert_eq!(resolved, DEFAULT);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let resolved =
            resolve_initial_center(&HangingSource, DEFAULT, Duration::from_millis(10)).await;
        assert_eq!(resolved, DEFAULT);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_fall_back() {
        let resolved = resolve_initial_center(
            &FixedSource(LatLng::new(200.0, 0.0)),
            DEFAULT,
            Duration::from_millis(100),
        )
        .await;
        assert_eq!(resolved, DEFAULT);
    }
}
