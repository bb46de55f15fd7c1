//! The issue-map facade: wires the viewport controller, issue fetcher, layer
//! coordinator, and selection bridge into one embeddable component.
//!
//! The scheduling model is cooperative and single-threaded: the host calls
//! `mount` once, then pumps `process_events` from its event loop. Every
//! potentially-blocking step (capability load, geolocation, network fetch) is
//! an async suspension interleaved with user-driven events.

use crate::{
    bridge::{self, SelectionBridge},
    capability::{
        detail::IssueDetailSink,
        engine::RenderEngine,
        geolocate::GeolocationSource,
        query::IssueQuery,
        tiles::{MapTypeKey, TileStyleSource},
    },
    core::{
        geo::{LatLng, LatLngBounds},
        issue::{Issue, IssueFilters},
    },
    fetch::{FetchTicket, IssueFetcher},
    layers::coordinator::{LayerCoordinator, RenderMode, ToggleOutcome},
    view::{
        bootstrap::resolve_initial_center,
        controller::{InitPhase, ViewportController},
    },
    MapError, Result,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Debug, Clone)]
pub struct IssueMapViewConfig {
    pub default_center: LatLng,
    pub default_zoom: f64,
    /// Upper bound on the initial geolocation lookup
    pub geolocation_timeout: Duration,
    /// Fixed interval between capability polls while the engine is loading
    pub capability_poll_interval: Duration,
    /// Delay before the post-init size recomputation, letting layout settle
    pub settle_delay: Duration,
    /// Name under which the selection callback is registered for foreign
    /// popup markup
    pub callback_name: String,
    pub map_type: MapTypeKey,
}

impl Default for IssueMapViewConfig {
    fn default() -> Self {
        Self {
            default_center: LatLng::new(0.0, 0.0),
            default_zoom: 13.0,
            geolocation_timeout: Duration::from_secs(5),
            capability_poll_interval: Duration::from_millis(200),
            settle_delay: Duration::from_millis(150),
            callback_name: "civimap.openIssue".to_string(),
            map_type: MapTypeKey::Standard,
        }
    }
}

pub struct IssueMapView {
    config: IssueMapViewConfig,
    controller: ViewportController,
    coordinator: LayerCoordinator,
    fetcher: IssueFetcher,
    filters: IssueFilters,
    /// Latest fetch-cycle snapshot, shared with the bridge callback
    issues: Arc<Mutex<Vec<Issue>>>,
    bridge: Option<SelectionBridge>,
    detail: Arc<dyn IssueDetailSink>,
    fetch_error: Option<String>,
    bounds_rx: crossbeam_channel::Receiver<LatLngBounds>,
}

impl IssueMapView {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        styles: Arc<dyn TileStyleSource>,
        query: Arc<dyn IssueQuery>,
        detail: Arc<dyn IssueDetailSink>,
        config: IssueMapViewConfig,
    ) -> Self {
        let (bounds_tx, bounds_rx) = crossbeam_channel::unbounded();
        let mut controller = ViewportController::new(engine.clone(), styles, bounds_tx);
        controller.set_initial_map_type(config.map_type);

        Self {
            coordinator: LayerCoordinator::new(engine),
            controller,
            fetcher: IssueFetcher::new(query),
            filters: IssueFilters::none(),
            issues: Arc::new(Mutex::new(Vec::new())),
            bridge: None,
            detail,
            fetch_error: None,
            bounds_rx,
            config,
        }
    }

    /// Mounts the component into a host container: resolves the initial
    /// center (best-effort geolocation), initializes the map (polling while
    /// the rendering capability is still loading), then settles layout and
    /// triggers the first fetch.
    ///
    /// An absent rendering capability is a terminal error for this mount;
    /// call `teardown` and mount again to retry.
    pub async fn mount(
        &mut self,
        container: &str,
        geolocation: &dyn GeolocationSource,
    ) -> Result<()> {
        if self.controller.phase() != InitPhase::Uninitialized {
            log::debug!("mount ignored: already mounted (phase {:?})", self.controller.phase());
            return Ok(());
        }

        let center = resolve_initial_center(
            geolocation,
            self.config.default_center,
            self.config.geolocation_timeout,
        )
        .await;

        self.controller
            .initialize(container, center, self.config.default_zoom);

        while self.controller.phase() == InitPhase::AwaitingCapability {
            tokio::time::sleep(self.config.capability_poll_interval).await;
            self.controller.on_poll_tick();
        }

        match self.controller.phase() {
            InitPhase::Ready => {
                self.register_bridge();
                tokio::time::sleep(self.config.settle_delay).await;
                self.controller.complete_settle();
                self.process_events().await;
                Ok(())
            }
            _ => Err(MapError::Initialization(
                self.controller
                    .init_error()
                    .unwrap_or("initialization did not complete")
                    .to_string(),
            )),
        }
    }

    fn register_bridge(&mut self) {
        let issues = self.issues.clone();
        let detail = self.detail.clone();
        self.bridge = Some(SelectionBridge::register(
            self.config.callback_name.clone(),
            move |issue_id| {
                let Ok(snapshot) = issues.lock() else { return };
                match snapshot.iter().find(|issue| issue.id == issue_id) {
                    Some(issue) => detail.open(issue),
                    // Filtered out between fetch and click: silent no-op
                    None => log::trace!("selected issue {issue_id} not in current set; ignoring"),
                }
            },
        ));
    }

    /// Drains pending bounds-change events and refreshes against the most
    /// recent viewport. Called from the host's event loop.
    pub async fn process_events(&mut self) {
        if self.controller.phase() != InitPhase::Ready {
            return;
        }

        let mut latest = None;
        while let Ok(bounds) = self.bounds_rx.try_recv() {
            latest = Some(bounds);
        }
        if let Some(bounds) = latest {
            self.refresh_bounds(bounds).await;
        }
    }

    /// Re-fetches for the current viewport (e.g. after a filter change)
    pub async fn refresh(&mut self) {
        if let Some(bounds) = self.controller.visible_bounds() {
            self.refresh_bounds(bounds).await;
        }
    }

    async fn refresh_bounds(&mut self, bounds: LatLngBounds) {
        let ticket = self.begin_fetch();
        let result = self.fetcher.run(&bounds, &self.filters).await;
        self.apply_fetch(ticket, result);
    }

    /// Issues the generation for one fetch cycle. Hosts that spawn fetches
    /// concurrently pair this with [`apply_fetch`](Self::apply_fetch) to keep
    /// the last-issued-wins contract.
    pub fn begin_fetch(&self) -> FetchTicket {
        self.fetcher.begin()
    }

    /// Runs the issue query for arbitrary bounds under the current filters
    pub async fn fetch_issues(&self, bounds: &LatLngBounds) -> Result<Vec<Issue>> {
        self.fetcher.run(bounds, &self.filters).await
    }

    /// Applies one fetch cycle's outcome. A result whose ticket has been
    /// superseded by a newer generation is discarded outright: the displayed
    /// set always corresponds to the last-issued fetch, regardless of
    /// response arrival order. A failed fetch clears all displayed layers
    /// rather than leaving possibly-stale markers up.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Issue>>) {
        if !self.fetcher.is_current(&ticket) {
            log::debug!(
                "discarding stale fetch result (generation {})",
                ticket.generation()
            );
            return;
        }

        match result {
            Ok(new_issues) => {
                self.fetch_error = None;
                if let Some(map) = self.controller.map_handle() {
                    if let Err(err) = self.coordinator.rebuild(map, &new_issues) {
                        log::warn!("layer rebuild failed: {err}");
                        self.fetch_error = Some(err.to_string());
                        // Nothing is displayed, so the snapshot stays empty too
                        if let Ok(mut snapshot) = self.issues.lock() {
                            snapshot.clear();
                        }
                        return;
                    }
                }
                if let Ok(mut snapshot) = self.issues.lock() {
                    *snapshot = new_issues;
                }
            }
            Err(err) => {
                log::warn!("issue fetch failed: {err}");
                if let Some(map) = self.controller.map_handle() {
                    self.coordinator.detach_active(map);
                }
                if let Ok(mut snapshot) = self.issues.lock() {
                    snapshot.clear();
                }
                self.fetch_error = Some(err.to_string());
            }
        }
    }

    /// Replaces the opaque filter criteria and re-fetches
    pub async fn set_filters(&mut self, filters: IssueFilters) {
        self.filters = filters;
        self.refresh().await;
    }

    pub fn set_heatmap(&mut self, enabled: bool) -> Result<ToggleOutcome> {
        let snapshot = self.snapshot();
        self.coordinator
            .set_heatmap(self.controller.map_handle(), enabled, &snapshot)
    }

    pub fn set_clustering(&mut self, enabled: bool) -> Result<ToggleOutcome> {
        let snapshot = self.snapshot();
        self.coordinator
            .set_clustering(self.controller.map_handle(), enabled, &snapshot)
    }

    pub fn set_map_type(&mut self, key: MapTypeKey) -> Result<()> {
        self.controller.set_map_type(key)
    }

    /// Tears down in dependency order: layers, then the map instance, then
    /// pending fetch generations, then the bridge registration. Safe to call
    /// repeatedly.
    pub fn teardown(&mut self) {
        if let Some(map) = self.controller.map_handle() {
            self.coordinator.detach_active(map);
        }
        self.controller.teardown();
        self.fetcher.invalidate_all();
        self.bridge = None;
        if let Ok(mut snapshot) = self.issues.lock() {
            snapshot.clear();
        }
    }

    fn snapshot(&self) -> Vec<Issue> {
        self.issues
            .lock()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }

    // --- host-facing state accessors ---------------------------------------

    pub fn phase(&self) -> InitPhase {
        self.controller.phase()
    }

    pub fn render_mode(&self) -> RenderMode {
        self.coordinator.active_mode()
    }

    pub fn map_type(&self) -> MapTypeKey {
        self.controller.map_type()
    }

    pub fn displayed_issue_count(&self) -> usize {
        self.issues.lock().map(|snapshot| snapshot.len()).unwrap_or(0)
    }

    /// Terminal initialization error, if the mount failed
    pub fn init_error(&self) -> Option<&str> {
        self.controller.init_error()
    }

    /// Dismissible fetch error; cleared implicitly by the next successful
    /// fetch
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    pub fn dismiss_fetch_error(&mut self) {
        self.fetch_error = None;
    }

    /// Whether this view's selection callback is currently registered
    pub fn bridge_registered(&self) -> bool {
        bridge::is_registered(&self.config.callback_name)
    }
}
