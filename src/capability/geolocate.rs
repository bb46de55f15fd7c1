use crate::{core::geo::LatLng, Result};
use async_trait::async_trait;

/// Best-effort device-location capability.
///
/// Used once at mount to pick an initial map center. Errors from this trait
/// never surface to the user; see [`crate::view::bootstrap`].
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    async fn current_position(&self) -> Result<LatLng>;
}
