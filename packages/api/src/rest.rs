//! `reqwest`-backed [`ReportApi`] implementation.

use async_trait::async_trait;
use serde::Serialize;

use crate::{ApiConfig, ApiError, BoundsQuery, ReportApi, WireContract, build_client};

/// JSON body of a [`WireContract::Post`] query.
#[derive(Debug, Serialize)]
struct QueryRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    bounds: [f64; 4],
}

/// Queries the backend over HTTP. Requests are sent once; there are no
/// retries.
#[derive(Debug, Clone)]
pub struct RestReportApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl RestReportApi {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the configuration is invalid.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Builds the request for `query` according to the configured contract.
    fn request(&self, query: &BoundsQuery) -> reqwest::RequestBuilder {
        let url = self.config.query_url();
        match self.config.contract {
            WireContract::Post => self.client.post(url).json(&QueryRequestBody {
                limit: query.limit,
                bounds: query.bounds.to_array(),
            }),
            WireContract::Get => {
                let b = &query.bounds;
                self.client.get(url).query(&[
                    ("nelat", b.north_east.lat),
                    ("nelng", b.north_east.lng),
                    ("swlat", b.south_west.lat),
                    ("swlng", b.south_west.lng),
                ])
            }
        }
    }
}

#[async_trait]
impl ReportApi for RestReportApi {
    fn contract(&self) -> WireContract {
        self.config.contract
    }

    async fn query(&self, query: &BoundsQuery) -> Result<serde_json::Value, ApiError> {
        log::debug!(
            "Querying reports ({}) in {:?} limit={:?}",
            self.config.contract,
            query.bounds.to_array(),
            query.limit
        );

        let resp = self.request(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            log::warn!("Report query failed: HTTP {status} from {}", resp.url());
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(body)
    }
}
