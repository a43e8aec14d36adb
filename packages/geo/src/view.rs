//! Map view parsing and viewport geometry.

use std::f64::consts::PI;
use std::sync::LazyLock;

use pothole_map_report_models::{Bounds, Coordinate, MapView};
use regex::Regex;

use crate::make_coordinate;

/// `@<lat>,<lng>,<zoom>z` as found in shared map URLs.
static MAP_VIEW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(-?[0-9]+(?:\.[0-9]+)?),(-?[0-9]+(?:\.[0-9]+)?),([0-9]+(?:\.[0-9]+)?)z")
        .expect("valid regex")
});

/// Web Mercator latitude limit in degrees.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Shallowest zoom level, the whole world in one tile.
pub const MIN_ZOOM: f64 = 0.0;
/// Deepest zoom level served by common map tile providers.
pub const MAX_ZOOM: f64 = 22.0;

/// Edge length of a map tile in pixels.
const TILE_SIZE: f64 = 256.0;

/// Extracts a map center and zoom embedded anywhere in `text`.
///
/// Looks for the first `@<lat>,<lng>,<zoom>z` occurrence, e.g. in
/// `https://www.google.com/maps/@-31.9440151,115.8901276,14z`. Returns
/// `None` when the text contains no such pattern.
#[must_use]
pub fn parse_map_view_from_text(text: &str) -> Option<MapView> {
    let caps = MAP_VIEW_RE.captures(text)?;

    let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let lng = caps.get(2)?.as_str().parse::<f64>().ok()?;
    let zoom = caps.get(3)?.as_str().parse::<f64>().ok()?;

    Some(MapView {
        center: make_coordinate(lat, lng),
        zoom,
    })
}

/// Computes the bounds visible on a `width_px` x `height_px` Web Mercator
/// map showing `view`.
///
/// The zoom is clamped with [`clamp_zoom`], latitudes to the Mercator
/// limit and longitudes to `[-180, 180]`; the box never wraps the
/// antimeridian and its corners are always finite.
#[must_use]
pub fn viewport_bounds(view: &MapView, width_px: u32, height_px: u32) -> Bounds {
    let world = TILE_SIZE * clamp_zoom(view.zoom).exp2();
    let (cx, cy) = project(view.center, world);

    let half_w = f64::from(width_px) / 2.0;
    let half_h = f64::from(height_px) / 2.0;

    let north_east = unproject((cx + half_w).min(world), (cy - half_h).max(0.0), world);
    let south_west = unproject((cx - half_w).max(0.0), (cy + half_h).min(world), world);

    Bounds::new(north_east, south_west)
}

/// Clamps `zoom` to [`MIN_ZOOM`]`..=`[`MAX_ZOOM`]. NaN maps to
/// [`MIN_ZOOM`].
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Coordinate to world pixel position.
fn project(c: Coordinate, world: f64) -> (f64, f64) {
    let lat = c.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let lng = c.lng.clamp(-180.0, 180.0);

    let x = (lng + 180.0) / 360.0 * world;
    let lat_rad = lat.to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world;
    (x, y)
}

/// World pixel position to coordinate.
fn unproject(x: f64, y: f64, world: f64) -> Coordinate {
    let lng = x / world * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / world)).sinh().atan().to_degrees();
    make_coordinate(lat, lng)
}
