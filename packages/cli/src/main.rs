#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the pothole map.
//!
//! ```text
//! pothole_map query --bounds -31.9,115.9,-32.0,115.8 [--bounds ...] [--limit 100]
//! pothole_map view "https://www.google.com/maps/@-31.944,115.89,14z" [--width 1280 --height 800]
//! pothole_map locate [--lat -31.95 --lng 115.86]
//! ```
//!
//! Every command builds one [`ReportStore`] against the backend configured
//! through `POTHOLE_MAP_API_URL`, `POTHOLE_MAP_API_TIMEOUT_SECS` and
//! `POTHOLE_MAP_API_CONTRACT`, runs its operations, and prints the result.
//! `--json` prints the collected reports as JSON instead of a table.

mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pothole_map_api::{ApiConfig, RestReportApi};
use pothole_map_geo::{
    FixedLocation, LocationProvider, Position, UnavailableLocation, clamp_zoom,
    parse_map_view_from_text, viewport_bounds,
};
use pothole_map_report_models::{Bounds, Coordinate, MapView};
use pothole_map_store::{ReportStore, StoreConfig};

#[derive(Parser)]
#[command(name = "pothole_map", about = "Browse reported potholes from the command line")]
struct Cli {
    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Store configuration file replacing the built-in defaults
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the reports inside one or more bounding boxes
    Query {
        /// Bounding box as `NE_LAT,NE_LNG,SW_LAT,SW_LNG`; repeat to fetch
        /// several regions concurrently
        #[arg(long, required = true, value_parser = parse_bounds, allow_hyphen_values = true)]
        bounds: Vec<Bounds>,
        /// Maximum number of reports per region
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Fetch the reports visible in a map view embedded in text, e.g. a
    /// shared map link containing `@lat,lng,zoomz`
    View {
        /// Text containing the map view
        text: String,
        /// Viewport width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Viewport height in pixels
        #[arg(long, default_value = "800")]
        height: u32,
        /// Maximum number of reports
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Center on the user's location and fetch the reports around it
    Locate {
        /// Latitude of the current position
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude of the current position
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Viewport width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Viewport height in pixels
        #[arg(long, default_value = "800")]
        height: u32,
        /// Maximum number of reports
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Parses `NE_LAT,NE_LNG,SW_LAT,SW_LNG`.
fn parse_bounds(s: &str) -> Result<Bounds, String> {
    let parts = s
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number '{}': {e}", p.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let [ne_lat, ne_lng, sw_lat, sw_lng] = parts[..] else {
        return Err(format!(
            "expected 4 comma-separated values (NE_LAT,NE_LNG,SW_LAT,SW_LNG), got {}",
            parts.len()
        ));
    };

    let bounds = Bounds::new(Coordinate::new(ne_lat, ne_lng), Coordinate::new(sw_lat, sw_lng));
    if !bounds.north_east.is_valid() || !bounds.south_west.is_valid() {
        return Err(format!("coordinates out of range: {s}"));
    }
    Ok(bounds)
}

fn load_store_config(path: Option<&Path>) -> Result<StoreConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(StoreConfig::embedded());
    };
    log::debug!("Loading store config from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    Ok(StoreConfig::from_toml_str(&contents)?)
}

/// Fetches `bounds` concurrently, printing each outcome. Returns whether
/// every fetch succeeded.
async fn fetch_all(store: &ReportStore, bounds: &[Bounds], limit: Option<u32>) -> bool {
    let fetches = bounds
        .iter()
        .map(|b| store.fetch_reports_in_bounds(*b, limit));
    let results = futures::future::join_all(fetches).await;

    let sent_limit = store.config().effective_limit(limit);
    let mut ok = true;
    for (b, result) in bounds.iter().zip(results) {
        match result {
            Ok(outcome) => output::print_outcome(b, &outcome, sent_limit),
            Err(e) => {
                eprintln!("Failed to load potholes for {}: {e}", output::format_bounds(b));
                ok = false;
            }
        }
    }
    ok
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let store_config = load_store_config(cli.config.as_deref())?;
    let api = RestReportApi::new(ApiConfig::from_env()?)?;
    log::debug!(
        "Using {} ({} contract, {} report fields)",
        api.config().query_url(),
        api.config().contract,
        store_config.field_naming
    );

    let (store, ok) = match cli.command {
        Commands::Query { bounds, limit } => {
            let store = ReportStore::new(store_config, Arc::new(api));
            let ok = fetch_all(&store, &bounds, limit).await;
            (store, ok)
        }
        Commands::View {
            text,
            width,
            height,
            limit,
        } => {
            let Some(parsed) = parse_map_view_from_text(&text) else {
                eprintln!("No map view (@lat,lng,zoomz) found in: {text}");
                std::process::exit(1);
            };
            let view = MapView {
                zoom: clamp_zoom(parsed.zoom),
                ..parsed
            };
            let store = ReportStore::new(store_config, Arc::new(api));
            store.set_center(view.center);
            store.set_zoom(view.zoom);
            output::print_view(&store.snapshot());

            let bounds = viewport_bounds(&view, width, height);
            let ok = fetch_all(&store, &[bounds], limit).await;
            (store, ok)
        }
        Commands::Locate {
            lat,
            lng,
            width,
            height,
            limit,
        } => {
            let provider: Arc<dyn LocationProvider> = match (lat, lng) {
                (Some(latitude), Some(longitude)) => Arc::new(FixedLocation(Position {
                    latitude,
                    longitude,
                })),
                _ => Arc::new(UnavailableLocation {
                    reason: "no position given (pass --lat and --lng)".to_string(),
                }),
            };
            let store =
                ReportStore::new(store_config, Arc::new(api)).with_location_provider(provider);

            if let Err(e) = store.center_on_user_location().await {
                eprintln!("Unable to find your location: {e}");
                output::print_view(&store.snapshot());
                std::process::exit(1);
            }

            let snapshot = store.snapshot();
            output::print_view(&snapshot);

            let view = MapView {
                center: snapshot.center,
                zoom: snapshot.zoom,
            };
            let bounds = viewport_bounds(&view, width, height);
            let ok = fetch_all(&store, &[bounds], limit).await;
            (store, ok)
        }
    };

    // Reports from successful fetches are shown even if another failed.
    let reports = store.reports();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        output::print_reports(&reports);
    }

    if !ok {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bounds_in_query_order() {
        let b = parse_bounds("-31.9, 115.9,-32.05,115.8").unwrap();
        assert_eq!(b.north_east, Coordinate::new(-31.9, 115.9));
        assert_eq!(b.south_west, Coordinate::new(-32.05, 115.8));
    }

    #[test]
    fn rejects_malformed_bounds() {
        assert!(parse_bounds("-31.9,115.9,-32.05").is_err());
        assert!(parse_bounds("-31.9,115.9,-32.05,115.8,1").is_err());
        assert!(parse_bounds("north,115.9,-32.05,115.8").is_err());
        assert!(parse_bounds("95,115.9,-32.05,115.8").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_bounds_with_negative_values() {
        let cli = Cli::try_parse_from([
            "pothole_map",
            "query",
            "--bounds",
            "-31.9,115.9,-32.0,115.8",
            "--bounds",
            "-32.0,115.8,-32.1,115.7",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Query { bounds, limit } = cli.command else {
            panic!("expected query");
        };
        assert_eq!(bounds.len(), 2);
        assert_eq!(limit, None);
    }

    #[test]
    fn locate_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["pothole_map", "locate", "--lat", "-31.95"]).is_err());
        assert!(
            Cli::try_parse_from(["pothole_map", "locate", "--lat", "-31.95", "--lng", "115.86"])
                .is_ok()
        );
    }
}
