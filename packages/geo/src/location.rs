//! User location resolution.
//!
//! The platform's location capability is modelled as a
//! [`LocationProvider`]: a single-shot asynchronous query that either
//! yields a [`Position`] or fails with a platform-defined reason.
//! [`resolve_user_location`] wraps it with the error contract used by the
//! rest of the client. Retrying is left to the caller.

use async_trait::async_trait;
use pothole_map_report_models::Coordinate;

use crate::{GeoError, make_coordinate};

/// A position as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// A platform capability that can report the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Queries the current position once.
    ///
    /// # Errors
    ///
    /// Returns the platform's reason string if the position cannot be
    /// determined (permission denied, timeout, no fix, ...).
    async fn current_position(&self) -> Result<Position, String>;
}

/// Resolves the user's current location.
///
/// Fails with [`GeoError::CapabilityUnavailable`] without suspending when
/// `provider` is `None`.
///
/// # Errors
///
/// * [`GeoError::CapabilityUnavailable`] if there is no provider.
/// * [`GeoError::LocationResolutionFailed`] if the provider reports an
///   error.
pub async fn resolve_user_location(
    provider: Option<&dyn LocationProvider>,
) -> Result<Coordinate, GeoError> {
    let Some(provider) = provider else {
        log::warn!("No location capability available");
        return Err(GeoError::CapabilityUnavailable);
    };

    match provider.current_position().await {
        Ok(position) => {
            log::debug!(
                "Resolved user location: {}, {}",
                position.latitude,
                position.longitude
            );
            Ok(make_coordinate(position.latitude, position.longitude))
        }
        Err(reason) => {
            log::warn!("Location resolution failed: {reason}");
            Err(GeoError::LocationResolutionFailed { reason })
        }
    }
}

/// A provider that always reports the same position.
///
/// Used by front ends that take the position from configuration or
/// arguments rather than from a device sensor.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Position);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Position, String> {
        Ok(self.0)
    }
}

/// A provider that is present but always fails, e.g. when the user denied
/// permission.
#[derive(Debug, Clone)]
pub struct UnavailableLocation {
    /// Reason reported on every query.
    pub reason: String,
}

#[async_trait]
impl LocationProvider for UnavailableLocation {
    async fn current_position(&self) -> Result<Position, String> {
        Err(self.reason.clone())
    }
}
