#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP access to the pothole map backend.
//!
//! The backend exposes a single `query` endpoint returning the reports
//! inside a bounding box. Two wire contracts exist:
//!
//! * [`WireContract::Post`] (default): `POST query` with a JSON body
//!   `{ "limit": n, "bounds": [neLat, neLng, swLat, swLng] }`, answered
//!   with `{ "potholes": [...], "truncated": bool }`.
//! * [`WireContract::Get`]: `GET query?nelat=..&nelng=..&swlat=..&swlng=..`,
//!   answered with a bare array of reports. No limit is sent.
//!
//! The contract is chosen explicitly through [`ApiConfig`]; responses are
//! handed back undecoded so that callers validate them at the boundary.

pub mod config;
pub mod rest;

pub use config::{ApiConfig, build_client};
pub use rest::RestReportApi;

use async_trait::async_trait;
use pothole_map_report_models::Bounds;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Path of the report query endpoint, relative to the base URL.
pub const QUERY_ENDPOINT: &str = "query";

/// Errors from backend requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The client configuration is invalid.
    #[error("Invalid API configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport {
                message: e.to_string(),
            }
        }
    }
}

/// Which request/response shape the backend speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WireContract {
    /// JSON body with a result limit; response carries a truncation flag.
    #[default]
    Post,
    /// Bounding box in query parameters; response is a bare report array.
    Get,
}

/// A request for the reports within a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsQuery {
    /// Region to query.
    pub bounds: Bounds,
    /// Maximum number of reports to return. Ignored by
    /// [`WireContract::Get`].
    pub limit: Option<u32>,
}

/// Asynchronous access to the report query endpoint.
///
/// Implemented by [`RestReportApi`] for the real backend; tests and
/// alternative front ends provide their own implementations.
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// The wire contract the response bodies follow.
    fn contract(&self) -> WireContract;

    /// Queries the reports within `query.bounds` and returns the raw
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails, times out, or the server
    /// answers with a non-success status.
    async fn query(&self, query: &BoundsQuery) -> Result<serde_json::Value, ApiError>;
}
