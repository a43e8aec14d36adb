#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic helpers for the pothole map client.
//!
//! * [`make_coordinate`] builds a [`Coordinate`] from a latitude/longitude
//!   pair.
//! * [`location`] resolves the user's current position through a
//!   platform-provided [`LocationProvider`].
//! * [`view`] extracts a map center/zoom from free text (e.g. a shared map
//!   URL) and derives the bounds visible for a given view.

pub mod location;
pub mod view;

pub use location::{
    FixedLocation, LocationProvider, Position, UnavailableLocation, resolve_user_location,
};
pub use pothole_map_report_models::{Bounds, Coordinate, MapView};
pub use view::{MAX_ZOOM, MIN_ZOOM, clamp_zoom, parse_map_view_from_text, viewport_bounds};

use thiserror::Error;

/// Errors from geographic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// The platform exposes no location capability.
    #[error("Geolocation is not available on this platform")]
    CapabilityUnavailable,

    /// The platform reported an error while resolving the position.
    #[error("Failed to resolve user location: {reason}")]
    LocationResolutionFailed {
        /// Reason given by the platform.
        reason: String,
    },
}

/// Creates a coordinate from a latitude and longitude in degrees.
///
/// No range checking is performed.
#[must_use]
pub const fn make_coordinate(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_coordinate_keeps_components() {
        let c = make_coordinate(-31.944_015_1, 115.890_127_6);
        assert!((c.lat - -31.944_015_1).abs() < f64::EPSILON);
        assert!((c.lng - 115.890_127_6).abs() < f64::EPSILON);
    }

    #[test]
    fn make_coordinate_does_not_validate() {
        assert!(!make_coordinate(123.0, 0.0).is_valid());
    }
}
