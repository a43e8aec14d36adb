#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client-side report store for the pothole map.
//!
//! [`ReportStore`] owns the map view state and the collection of reports
//! fetched so far. The presentation layer reads snapshots and calls store
//! operations in response to user gestures:
//!
//! * panning/zooming → [`ReportStore::fetch_reports_in_bounds`], which
//!   queries the backend, validates the response, and merges new reports
//!   into the collection by id;
//! * "locate me" → [`ReportStore::center_on_user_location`];
//! * selecting a searched place → [`ReportStore::center_on_location`].
//!
//! Several operations may be in flight at once. The busy indicator is a
//! counter so that overlapping fetches keep the map busy until the last
//! one finishes, and merging is idempotent so the final collection does
//! not depend on completion order.

mod collection;
pub mod config;
pub mod decode;
pub mod store;

pub use config::{FieldNaming, StoreConfig};
pub use store::{FetchOutcome, MapViewState, ReportStore};

use pothole_map_api::ApiError;
use pothole_map_geo::GeoError;
use pothole_map_validation::ValidationError;
use thiserror::Error;

/// Errors surfaced by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A server response failed validation.
    #[error("Invalid server response: {0}")]
    Validation(#[from] ValidationError),

    /// The user's location could not be resolved.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// The backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The store configuration is invalid.
    #[error("Invalid store configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}
