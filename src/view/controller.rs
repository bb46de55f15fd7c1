//! Viewport controller: owns the engine-side map instance and tile layer.
//!
//! Initialization has to tolerate its preconditions (container mounted,
//! rendering capability loaded) becoming true in either order, so it is an
//! explicit state machine driven by external triggers (`initialize` from the
//! host's mount, timer ticks from the orchestrator while the capability is
//! still loading), each implemented as a guarded transition. A confirmed-
//! absent capability is terminal for the mount: no automatic retry, a remount
//! is required.

use crate::{
    capability::{
        engine::{CapabilityState, LayerHandle, MapHandle, RenderEngine},
        tiles::{MapTypeKey, TileStyleSource},
    },
    core::geo::{LatLng, LatLngBounds},
    MapError, Result,
};
use std::sync::Arc;

/// Initialization phase of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    Uninitialized,
    /// Preconditions not yet satisfied; polling the capability
    AwaitingCapability,
    Initializing,
    Ready,
    /// Capability confirmed absent; remount required
    Failed,
}

#[derive(Debug, Clone)]
struct PendingInit {
    container: String,
    center: LatLng,
    zoom: f64,
}

pub struct ViewportController {
    engine: Arc<dyn RenderEngine>,
    styles: Arc<dyn TileStyleSource>,
    phase: InitPhase,
    pending: Option<PendingInit>,
    map: Option<MapHandle>,
    tile_layer: Option<LayerHandle>,
    map_type: MapTypeKey,
    init_error: Option<String>,
    bounds_tx: crossbeam_channel::Sender<LatLngBounds>,
}

impl ViewportController {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        styles: Arc<dyn TileStyleSource>,
        bounds_tx: crossbeam_channel::Sender<LatLngBounds>,
    ) -> Self {
        Self {
            engine,
            styles,
            phase: InitPhase::Uninitialized,
            pending: None,
            map: None,
            tile_layer: None,
            map_type: MapTypeKey::default(),
            init_error: None,
            bounds_tx,
        }
    }

    /// Pure transition for the capability-dependent phases. Side effects are
    /// applied by the caller when the phase moves to `Initializing` or
    /// `Failed`.
    fn next_phase(phase: InitPhase, capability: CapabilityState) -> InitPhase {
        match (phase, capability) {
            (InitPhase::Uninitialized, CapabilityState::Ready) => InitPhase::Initializing,
            (InitPhase::Uninitialized, CapabilityState::Loading) => InitPhase::AwaitingCapability,
            (InitPhase::Uninitialized, CapabilityState::Missing) => InitPhase::Failed,
            (InitPhase::AwaitingCapability, CapabilityState::Ready) => InitPhase::Initializing,
            (InitPhase::AwaitingCapability, CapabilityState::Loading) => {
                InitPhase::AwaitingCapability
            }
            (InitPhase::AwaitingCapability, CapabilityState::Missing) => InitPhase::Failed,
            // Initializing, Ready and Failed do not react to capability state
            (other, _) => other,
        }
    }

    pub fn phase(&self) -> InitPhase {
        self.phase
    }

    pub fn map_handle(&self) -> Option<MapHandle> {
        self.map
    }

    pub fn map_type(&self) -> MapTypeKey {
        self.map_type
    }

    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    /// Begins initialization for a mounted container. Idempotent: once an
    /// attempt is in flight or completed for this mount, further calls are
    /// no-ops.
    pub fn initialize(&mut self, container: &str, center: LatLng, zoom: f64) {
        if self.phase != InitPhase::Uninitialized {
            log::debug!(
                "initialize ignored in phase {:?} (attempt already in flight or completed)",
                self.phase
            );
            return;
        }

        self.pending = Some(PendingInit {
            container: container.to_string(),
            center,
            zoom,
        });

        self.advance(self.engine.state());
    }

    /// Timer tick while awaiting the capability. No-op in any other phase.
    pub fn on_poll_tick(&mut self) {
        if self.phase != InitPhase::AwaitingCapability {
            return;
        }
        self.advance(self.engine.state());
    }

    fn advance(&mut self, capability: CapabilityState) {
        let next = Self::next_phase(self.phase, capability);
        match next {
            InitPhase::Initializing => {
                self.phase = InitPhase::Initializing;
                if let Err(err) = self.do_initialize() {
                    log::warn!("map initialization failed: {err}");
                    self.init_error = Some(err.to_string());
                    self.phase = InitPhase::Failed;
                }
            }
            InitPhase::Failed => {
                log::warn!("rendering capability confirmed absent");
                self.init_error = Some("rendering capability is not available".to_string());
                self.phase = InitPhase::Failed;
            }
            other => self.phase = other,
        }
    }

    /// Creates the map, attaches the current tile style, and registers the
    /// bounds-change listener. Bounds events cannot fire before this point
    /// because the subscription is installed here.
    fn do_initialize(&mut self) -> Result<()> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| MapError::Initialization("no pending init parameters".to_string()))?;

        let map = self
            .engine
            .create_map(&pending.container, pending.center, pending.zoom)?;
        let tiles = self
            .engine
            .attach_tiles(map, &self.styles.style(self.map_type))?;
        self.engine.subscribe_bounds(map, self.bounds_tx.clone());

        self.map = Some(map);
        self.tile_layer = Some(tiles);
        self.phase = InitPhase::Ready;
        log::debug!("map initialized in container '{}'", pending.container);
        Ok(())
    }

    /// Settle step run shortly after initialization: layout may have shifted
    /// under the container, so force a size recomputation and emit the initial
    /// bounds through the regular event channel.
    pub fn complete_settle(&self) {
        if self.phase != InitPhase::Ready {
            return;
        }
        if let Some(map) = self.map {
            self.engine.invalidate_size(map);
            let _ = self.bounds_tx.send(self.engine.visible_bounds(map));
        }
    }

    /// Current viewport extent, once initialized
    pub fn visible_bounds(&self) -> Option<LatLngBounds> {
        self.map.map(|map| self.engine.visible_bounds(map))
    }

    /// Records the map-type key to use when the map initializes. Infallible
    /// because no layer exists yet; use `set_map_type` on a live map.
    pub fn set_initial_map_type(&mut self, key: MapTypeKey) {
        self.map_type = key;
    }

    /// Swaps the tile layer for a new map-type key. The old layer is detached
    /// before the new one attaches, so at most one tile layer exists at any
    /// point.
    pub fn set_map_type(&mut self, key: MapTypeKey) -> Result<()> {
        self.map_type = key;

        let Some(map) = self.map else {
            // Not initialized yet; the key is applied during do_initialize.
            return Ok(());
        };

        if let Some(old) = self.tile_layer.take() {
            self.engine.detach(map, old);
        }
        self.tile_layer = Some(self.engine.attach_tiles(map, &self.styles.style(key))?);
        Ok(())
    }

    /// Releases the map instance. Safe to call repeatedly; never panics on an
    /// already-released instance.
    pub fn teardown(&mut self) {
        if let Some(map) = self.map.take() {
            if let Some(tiles) = self.tile_layer.take() {
                self.engine.detach(map, tiles);
            }
            self.engine.destroy_map(map);
            log::debug!("map instance destroyed");
        }
        self.tile_layer = None;
        self.pending = None;
        self.phase = InitPhase::Uninitialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{
        engine::{HeatPoint, MarkerSpec},
        tiles::{DefaultTileStyles, TileStyle},
    };
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Minimal engine stub with a mutable capability state
    struct StubEngine {
        state: Mutex<CapabilityState>,
        next_handle: AtomicU64,
        tile_attaches: AtomicU64,
        tile_detaches: AtomicU64,
        destroys: AtomicU64,
    }

    impl StubEngine {
        fn new(state: CapabilityState) -> Self {
            Self {
                state: Mutex::new(state),
                next_handle: AtomicU64::new(1),
                tile_attaches: AtomicU64::new(0),
                tile_detaches: AtomicU64::new(0),
                destroys: AtomicU64::new(0),
            }
        }

        fn set_state(&self, state: CapabilityState) {
            *self.state.lock().unwrap() = state;
        }
    }

    impl RenderEngine for StubEngine {
        fn state(&self) -> CapabilityState {
            *self.state.lock().unwrap()
        }

        fn create_map(&self, _container: &str, _center: LatLng, _zoom: f64) -> Result<MapHandle> {
            Ok(MapHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
        }

        fn destroy_map(&self, _map: MapHandle) {
            self.destroys.fetch_add(1, Ordering::SeqCst);
        }

        fn invalidate_size(&self, _map: MapHandle) {}

        fn visible_bounds(&self, _map: MapHandle) -> LatLngBounds {
            LatLngBounds::from_coords(40.0, -75.0, 41.0, -73.0)
        }

        fn subscribe_bounds(
            &self,
            _map: MapHandle,
            _tx: crossbeam_channel::Sender<LatLngBounds>,
        ) {
        }

        fn attach_tiles(&self, _map: MapHandle, _style: &TileStyle) -> Result<LayerHandle> {
            self.tile_attaches.fetch_add(1, Ordering::SeqCst);
            Ok(LayerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
        }

        fn attach_markers(&self, _map: MapHandle, _specs: &[MarkerSpec]) -> Result<LayerHandle> {
            Ok(LayerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
        }

        fn attach_clustered(&self, _map: MapHandle, _specs: &[MarkerSpec]) -> Result<LayerHandle> {
            Ok(LayerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
        }

        fn attach_heat(&self, _map: MapHandle, _points: &[HeatPoint]) -> Result<LayerHandle> {
            Ok(LayerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
        }

        fn detach(&self, _map: MapHandle, _layer: LayerHandle) {
            self.tile_detaches.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn controller(engine: Arc<StubEngine>) -> ViewportController {
        let (tx, _rx) = crossbeam_channel::unbounded();
        ViewportController::new(engine, Arc::new(DefaultTileStyles), tx)
    }

    #[test]
    fn test_next_phase_is_pure_and_total() {
        use CapabilityState as C;
        use InitPhase as P;

        assert_eq!(
            ViewportController::next_phase(P::Uninitialized, C::Ready),
            P::Initializing
        );
        assert_eq!(
            ViewportController::next_phase(P::Uninitialized, C::Loading),
            P::AwaitingCapability
        );
        assert_eq!(
            ViewportController::next_phase(P::Uninitialized, C::Missing),
            P::Failed
        );
        assert_eq!(
            ViewportController::next_phase(P::AwaitingCapability, C::Loading),
            P::AwaitingCapability
        );
        assert_eq!(
            ViewportController::next_phase(P::AwaitingCapability, C::Ready),
            P::Initializing
        );
        assert_eq!(
            ViewportController::next_phase(P::AwaitingCapability, C::Missing),
            P::Failed
        );
        // Terminal/active phases ignore capability changes
        assert_eq!(ViewportController::next_phase(P::Ready, C::Missing), P::Ready);
        assert_eq!(ViewportController::next_phase(P::Failed, C::Ready), P::Failed);
    }

    #[test]
    fn test_initialize_with_ready_capability() {
        let engine = Arc::new(StubEngine::new(CapabilityState::Ready));
        let mut ctl = controller(engine.clone());

        ctl.initialize("map-root", LatLng::new(51.5, -0.12), 13.0);
        assert_eq!(ctl.phase(), InitPhase::Ready);
        assert!(ctl.map_handle().is_some());
        assert_eq!(engine.tile_attaches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let engine = Arc::new(StubEngine::new(CapabilityState::Ready));
        let mut ctl = controller(engine.clone());

        ctl.initialize("map-root", LatLng::new(51.5, -0.12), 13.0);
        ctl.initialize("map-root", LatLng::new(0.0, 0.0), 2.0);
        ctl.initialize("map-root", LatLng::new(10.0, 10.0), 5.0);
        assert_eq!(engine.tile_attaches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_slow_capability_goes_through_awaiting() {
        let engine = Arc::new(StubEngine::new(CapabilityState::Loading));
        let mut ctl = controller(engine.clone());

        ctl.initialize("map-root", LatLng::new(51.5, -0.12), 13.0);
        assert_eq!(ctl.phase(), InitPhase::AwaitingCapability);

        // Ticks while still loading keep polling
        ctl.on_poll_tick();
        assert_eq!(ctl.phase(), InitPhase::AwaitingCapability);

        engine.set_state(CapabilityState::Ready);
        ctl.on_poll_tick();
        assert_eq!(ctl.phase(), InitPhase::Ready);
    }

    #[test]
    fn test_missing_capability_is_terminal() {
        let engine = Arc::new(StubEngine::new(CapabilityState::Loading));
        let mut ctl = controller(engine.clone());

        ctl.initialize("map-root", LatLng::new(51.5, -0.12), 13.0);
        engine.set_state(CapabilityState::Missing);
        ctl.on_poll_tick();

        assert_eq!(ctl.phase(), InitPhase::Failed);
        assert!(ctl.init_error().is_some());

        // Further ticks and capability recovery do not resurrect the mount
        engine.set_state(CapabilityState::Ready);
        ctl.on_poll_tick();
        assert_eq!(ctl.phase(), InitPhase::Failed);
    }

    #[test]
    fn test_map_type_swap_keeps_single_tile_layer() {
        let engine = Arc::new(StubEngine::new(CapabilityState::Ready));
        let mut ctl = controller(engine.clone());
        ctl.initialize("map-root", LatLng::new(51.5, -0.12), 13.0);

        ctl.set_map_type(MapTypeKey::Satellite).unwrap();
        ctl.set_map_type(MapTypeKey::Terrain).unwrap();

        let attaches = engine.tile_attaches.load(Ordering::SeqCst);
        let detaches = engine.tile_detaches.load(Ordering::SeqCst);
        assert_eq!(attaches, 3);
        assert_eq!(attaches - detaches, 1);
        assert_eq!(ctl.map_type(), MapTypeKey::Terrain);
    }

    #[test]
    fn test_initial_map_type_applies_at_initialization() {
        let engine = Arc::new(StubEngine::new(CapabilityState::Ready));
        let mut ctl = controller(engine.clone());

        ctl.set_initial_map_type(MapTypeKey::Satellite);
        assert_eq!(ctl.map_type(), MapTypeKey::Satellite);

        ctl.initialize("map-root", LatLng::new(51.5, -0.12), 13.0);
        assert_eq!(ctl.map_type(), MapTypeKey::Satellite);
        // One attach at init, no detach churn from presetting the key
        assert_eq!(engine.tile_attaches.load(Ordering::SeqCst), 1);
        assert_eq!(engine.tile_detaches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let engine = Arc::new(StubEngine::new(CapabilityState::Ready));
        let mut ctl = controller(engine.clone());
        ctl.initialize("map-root", LatLng::new(51.5, -0.12), 13.0);

        ctl.teardown();
        ctl.teardown();
        assert_eq!(engine.destroys.load(Ordering::SeqCst), 1);
        assert_eq!(ctl.phase(), InitPhase::Uninitialized);
        assert!(ctl.map_handle().is_none());
    }
}
