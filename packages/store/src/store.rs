//! The report store: map view state, report collection, and the
//! operations that update them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pothole_map_api::{BoundsQuery, ReportApi};
use pothole_map_geo::{LocationProvider, resolve_user_location};
use pothole_map_report_models::{Bounds, Coordinate, Report};

use crate::collection::ReportCollection;
use crate::decode::decode_query_response;
use crate::{StoreConfig, StoreError};

/// Map view state as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewState {
    /// Current visual center of the map.
    pub center: Coordinate,
    /// Current zoom level.
    pub zoom: f64,
    /// The user's own position, once resolved.
    pub user_marker: Option<Coordinate>,
    /// Whether at least one location resolution is in flight.
    pub user_location_pending: bool,
    /// Number of in-flight operations keeping the map busy.
    pub busy_count: u32,
}

impl MapViewState {
    /// Whether at least one operation is keeping the map busy.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy_count != 0
    }
}

/// Result of a successful [`ReportStore::fetch_reports_in_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Reports contained in the response.
    pub received: usize,
    /// Reports that were new to the collection.
    pub inserted: usize,
    /// Whether the server left out matches because of the limit. The
    /// presentation layer should prompt the user to narrow the view.
    pub truncated: bool,
}

#[derive(Debug)]
struct StoreState {
    view: MapViewState,
    reports: ReportCollection,
    /// In-flight `center_on_user_location` calls; `view.user_location_pending`
    /// mirrors `location_requests != 0`.
    location_requests: u32,
}

/// Owns the map view state and report collection.
///
/// Constructed once at application start and shared by reference. All
/// operations take `&self`; the internal lock is never held across an
/// `.await`, so operations may overlap freely.
pub struct ReportStore {
    state: Mutex<StoreState>,
    api: Arc<dyn ReportApi>,
    location: Option<Arc<dyn LocationProvider>>,
    config: StoreConfig,
}

impl std::fmt::Debug for ReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStore")
            .field("state", &self.state)
            .field("contract", &self.api.contract())
            .field("has_location", &self.location.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl ReportStore {
    /// Creates a store with the view at the configured defaults and an
    /// empty collection. No location capability is attached.
    #[must_use]
    pub fn new(config: StoreConfig, api: Arc<dyn ReportApi>) -> Self {
        let view = MapViewState {
            center: config.default_center,
            zoom: config.default_zoom,
            user_marker: None,
            user_location_pending: false,
            busy_count: 0,
        };
        Self {
            state: Mutex::new(StoreState {
                view,
                reports: ReportCollection::new(),
                location_requests: 0,
            }),
            api,
            location: None,
            config,
        }
    }

    /// Attaches the platform's location capability.
    #[must_use]
    pub fn with_location_provider(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(provider);
        self
    }

    /// The configuration the store was built with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // Every critical section is a plain field update, so a poisoned
        // lock still guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// A copy of the current map view state.
    #[must_use]
    pub fn snapshot(&self) -> MapViewState {
        self.lock().view.clone()
    }

    /// Whether at least one operation is keeping the map busy.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.lock().view.is_busy()
    }

    /// All known reports in the order they were first received.
    #[must_use]
    pub fn reports(&self) -> Vec<Report> {
        self.lock().reports.as_slice().to_vec()
    }

    /// Number of known reports.
    #[must_use]
    pub fn report_count(&self) -> usize {
        self.lock().reports.len()
    }

    /// Looks up a report by id.
    #[must_use]
    pub fn report(&self, id: &str) -> Option<Report> {
        self.lock().reports.get(id).cloned()
    }

    // ── Primitive mutations ─────────────────────────────────────────────

    /// Sets the map center.
    pub fn set_center(&self, center: Coordinate) {
        self.lock().view.center = center;
    }

    /// Sets the zoom level.
    pub fn set_zoom(&self, zoom: f64) {
        self.lock().view.zoom = zoom;
    }

    /// Sets or clears the user marker.
    pub fn set_user_marker(&self, marker: Option<Coordinate>) {
        self.lock().view.user_marker = marker;
    }

    /// Sets the location-pending flag.
    ///
    /// [`ReportStore::center_on_user_location`] maintains the flag itself;
    /// an in-flight call sets it again when it finishes.
    pub fn set_user_location_pending(&self, pending: bool) {
        self.lock().view.user_location_pending = pending;
    }

    /// Marks one more operation as in flight.
    pub fn begin_busy(&self) {
        let mut state = self.lock();
        state.view.busy_count = state.view.busy_count.saturating_add(1);
    }

    /// Marks one in-flight operation as finished.
    ///
    /// An unmatched call is logged and leaves the counter at zero.
    pub fn end_busy(&self) {
        let mut state = self.lock();
        if state.view.busy_count == 0 {
            log::warn!("end_busy called with no operation in flight");
            return;
        }
        state.view.busy_count -= 1;
    }

    /// Adds every report whose id is not yet known; reports with a known id
    /// are dropped. Returns the number of reports added.
    pub fn merge_reports(&self, reports: Vec<Report>) -> usize {
        let received = reports.len();
        let inserted = self.lock().reports.merge(reports);
        log::debug!(
            "Merged {inserted} new report(s), {} already known",
            received - inserted
        );
        inserted
    }

    // ── Composite operations ────────────────────────────────────────────

    /// Centers the map on the user's current location.
    ///
    /// On success the center and user marker move to the resolved position
    /// and the zoom resets to [`StoreConfig::user_location_zoom`]. On
    /// failure the view is left unchanged. The pending flag stays set while
    /// any call is in flight and is cleared when the last one exits, on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Geo`] if no location capability is attached or
    /// the platform fails to resolve a position.
    pub async fn center_on_user_location(&self) -> Result<Coordinate, StoreError> {
        let _pending = PendingGuard::acquire(self);

        let center = resolve_user_location(self.location.as_deref()).await?;

        let mut state = self.lock();
        state.view.center = center;
        state.view.zoom = self.config.user_location_zoom;
        state.view.user_marker = Some(center);
        drop(state);

        log::info!("Centered on user location {center}");
        Ok(center)
    }

    /// Centers the map on a chosen place and marks it, zooming to
    /// [`StoreConfig::place_zoom`].
    pub fn center_on_location(&self, center: Coordinate) {
        let mut state = self.lock();
        state.view.center = center;
        state.view.zoom = self.config.place_zoom;
        state.view.user_marker = Some(center);
    }

    /// Fetches the reports within `bounds` and merges them into the
    /// collection.
    ///
    /// `limit` defaults to [`StoreConfig::default_limit`] and is clamped to
    /// [`StoreConfig::max_limit`]. The map is busy for the duration of the
    /// call. A response that fails validation is discarded whole.
    ///
    /// # Errors
    ///
    /// * [`StoreError::Api`] if the request fails.
    /// * [`StoreError::Validation`] if the response is malformed.
    pub async fn fetch_reports_in_bounds(
        &self,
        bounds: Bounds,
        limit: Option<u32>,
    ) -> Result<FetchOutcome, StoreError> {
        let _busy = BusyGuard::acquire(self);

        let query = BoundsQuery {
            bounds,
            limit: Some(self.config.effective_limit(limit)),
        };

        let body = self.api.query(&query).await.inspect_err(|e| {
            log::warn!("Report query failed: {e}");
        })?;

        let response = decode_query_response(&body, self.api.contract(), self.config.field_naming)
            .inspect_err(|e| log::warn!("Discarding malformed report response: {e}"))?;

        let received = response.reports.len();
        let inserted = self.merge_reports(response.reports);

        log::info!(
            "Fetched {received} report(s) in {:?}, {inserted} new{}",
            bounds.to_array(),
            if response.truncated { " (truncated)" } else { "" }
        );

        Ok(FetchOutcome {
            received,
            inserted,
            truncated: response.truncated,
        })
    }
}

/// Keeps the busy counter raised while alive.
struct BusyGuard<'a> {
    store: &'a ReportStore,
}

impl<'a> BusyGuard<'a> {
    fn acquire(store: &'a ReportStore) -> Self {
        store.begin_busy();
        Self { store }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.store.end_busy();
    }
}

/// Counts one in-flight location request while alive and keeps the
/// pending flag in step with the count.
struct PendingGuard<'a> {
    store: &'a ReportStore,
}

impl<'a> PendingGuard<'a> {
    fn acquire(store: &'a ReportStore) -> Self {
        let mut state = store.lock();
        state.location_requests = state.location_requests.saturating_add(1);
        state.view.user_location_pending = true;
        drop(state);
        Self { store }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.store.lock();
        state.location_requests = state.location_requests.saturating_sub(1);
        state.view.user_location_pending = state.location_requests != 0;
    }
}
