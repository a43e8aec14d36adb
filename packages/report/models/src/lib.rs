#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Domain types shared by the pothole map client.
//!
//! A [`Report`] is one submitted pothole observation. Reports are located
//! with an ordered `[lat, lng]` pair as delivered by the backend, while the
//! map view itself works with named [`Coordinate`] values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A WGS84 point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate without range checking.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components lie within their valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        LATITUDE_RANGE.contains(&self.lat) && LONGITUDE_RANGE.contains(&self.lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// A geographic bounding box defined by its north-east and south-west
/// corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    /// North-east corner.
    pub north_east: Coordinate,
    /// South-west corner.
    pub south_west: Coordinate,
}

impl Bounds {
    /// Creates a bounding box from its two corners.
    #[must_use]
    pub const fn new(north_east: Coordinate, south_west: Coordinate) -> Self {
        Self {
            north_east,
            south_west,
        }
    }

    /// Whether `point` lies inside the box (edges inclusive).
    ///
    /// Boxes crossing the antimeridian (`south_west.lng > north_east.lng`)
    /// wrap around.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        let lat_ok = (self.south_west.lat..=self.north_east.lat).contains(&point.lat);
        let lng_ok = if self.south_west.lng <= self.north_east.lng {
            (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
        } else {
            point.lng >= self.south_west.lng || point.lng <= self.north_east.lng
        };
        lat_ok && lng_ok
    }

    /// The box as `[ne_lat, ne_lng, sw_lat, sw_lng]`, the order the query
    /// endpoint expects.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 4] {
        [
            self.north_east.lat,
            self.north_east.lng,
            self.south_west.lat,
            self.south_west.lng,
        ]
    }
}

/// A map center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Visual center of the map.
    pub center: Coordinate,
    /// Zoom level (fractional zoom allowed).
    pub zoom: f64,
}

/// A single pothole observation submitted by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Canonical lowercase UUID. Identity key of the report.
    pub id: String,
    /// Name of the reporting device.
    pub device_name: String,
    /// When the pothole was recorded.
    pub timestamp: DateTime<Utc>,
    /// Detector confidence, usually within `[0, 1]`.
    pub confidence: f64,
    /// Position as `[lat, lng]`.
    pub coordinates: [f64; 2],
    /// Photo of the pothole, if one was attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Report {
    /// Position of the report as a named coordinate.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.coordinates[0], self.coordinates[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perth_box() -> Bounds {
        Bounds::new(Coordinate::new(-31.9, 115.9), Coordinate::new(-32.0, 115.8))
    }

    #[test]
    fn bounds_contains_interior_and_edges() {
        let b = perth_box();
        assert!(b.contains(Coordinate::new(-31.95, 115.85)));
        assert!(b.contains(Coordinate::new(-31.9, 115.9)));
        assert!(!b.contains(Coordinate::new(-31.85, 115.85)));
        assert!(!b.contains(Coordinate::new(-31.95, 116.0)));
    }

    #[test]
    fn bounds_wrap_across_antimeridian() {
        let b = Bounds::new(Coordinate::new(10.0, -170.0), Coordinate::new(-10.0, 170.0));
        assert!(b.contains(Coordinate::new(0.0, 179.0)));
        assert!(b.contains(Coordinate::new(0.0, -175.0)));
        assert!(!b.contains(Coordinate::new(0.0, 0.0)));
    }

    #[test]
    fn bounds_array_order_is_ne_then_sw() {
        assert_eq!(perth_box().to_array(), [-31.9, 115.9, -32.0, 115.8]);
    }

    #[test]
    fn coordinate_validity() {
        assert!(Coordinate::new(-31.94, 115.89).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn report_serializes_camel_case_without_missing_photo() {
        let report = Report {
            id: "9b2f1c3e-1a2b-4c3d-8e9f-0a1b2c3d4e5f".to_string(),
            device_name: "dashcam-7".to_string(),
            timestamp: DateTime::parse_from_rfc3339("2020-07-04T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            confidence: 0.82,
            coordinates: [-31.95, 115.86],
            photo_url: None,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["deviceName"], "dashcam-7");
        assert!(json.get("photoUrl").is_none());
        assert_eq!(report.coordinate(), Coordinate::new(-31.95, 115.86));
    }
}
