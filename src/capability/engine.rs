//! The rendering-engine capability seam.
//!
//! The engine (tile rendering, marker/cluster/heat primitives, interaction)
//! is third-party code whose lifecycle this crate does not control: it may
//! still be loading when the host mounts, and it may turn out to be absent
//! entirely. Everything the crate needs from it is expressed through
//! [`RenderEngine`]; all layer mutations flow through handles so exactly-one
//! ownership stays checkable.

use crate::{
    capability::tiles::TileStyle,
    core::geo::{LatLng, LatLngBounds},
    Result,
};

/// Load state of the rendering capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityState {
    /// Script/library still loading; may become `Ready` or `Missing`.
    Loading,
    /// Fully usable.
    Ready,
    /// Confirmed absent; terminal.
    Missing,
}

/// Opaque handle to an engine-side map instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle(pub u64);

/// Opaque handle to an engine-side layer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u64);

/// Kind of an attached layer, for bookkeeping and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Tile,
    Markers,
    Cluster,
    Heat,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Tile => write!(f, "tile"),
            LayerKind::Markers => write!(f, "markers"),
            LayerKind::Cluster => write!(f, "cluster"),
            LayerKind::Heat => write!(f, "heat"),
        }
    }
}

/// Visual description of one issue marker, consumed by the engine.
///
/// Built by the marker factory in [`crate::layers::marker`]; identity is the
/// `issue_id`, which foreign popup markup echoes back through the selection
/// bridge on click.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub issue_id: u64,
    pub position: LatLng,
    /// CSS-style hex color derived from issue status
    pub color: &'static str,
    /// Marker radius in pixels, derived from issue priority
    pub radius_px: f32,
    /// Popup payload rendered by the engine (foreign context)
    pub popup: MarkerPopup,
}

/// Context shown in the engine-rendered popup for a marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub title: String,
    pub status_label: String,
    pub category: Option<String>,
}

/// One weighted point of the density heatmap
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPoint {
    pub position: LatLng,
    pub weight: f64,
}

/// Narrow interface to the third-party rendering engine.
///
/// Implementations must tolerate empty marker/heat point sets. Bounds-change
/// notifications are delivered only for maps with a registered subscription,
/// which the viewport controller installs as part of initialization, so no
/// bounds event can precede a fully initialized map.
pub trait RenderEngine: Send + Sync {
    /// Current load state of the engine itself
    fn state(&self) -> CapabilityState;

    /// Whether the clustering add-on was loaded
    fn supports_clustering(&self) -> bool {
        false
    }

    /// Whether the heat-rendering add-on was loaded
    fn supports_heatmap(&self) -> bool {
        false
    }

    /// Creates a map instance inside the given host container
    fn create_map(&self, container: &str, center: LatLng, zoom: f64) -> Result<MapHandle>;

    /// Destroys a map instance; must be safe for an already-destroyed handle
    fn destroy_map(&self, map: MapHandle);

    /// Forces the map to re-measure its container
    fn invalidate_size(&self, map: MapHandle);

    /// Current viewport extent of the map
    fn visible_bounds(&self, map: MapHandle) -> LatLngBounds;

    /// Registers the bounds-change listener for a map
    fn subscribe_bounds(&self, map: MapHandle, tx: crossbeam_channel::Sender<LatLngBounds>);

    fn attach_tiles(&self, map: MapHandle, style: &TileStyle) -> Result<LayerHandle>;

    fn attach_markers(&self, map: MapHandle, specs: &[MarkerSpec]) -> Result<LayerHandle>;

    /// Attaches a clustered marker layer; grouping is engine-side.
    /// Only called when `supports_clustering()` is true.
    fn attach_clustered(&self, map: MapHandle, specs: &[MarkerSpec]) -> Result<LayerHandle>;

    /// Attaches a heat layer. Only called when `supports_heatmap()` is true.
    fn attach_heat(&self, map: MapHandle, points: &[HeatPoint]) -> Result<LayerHandle>;

    /// Detaches and releases a layer; must be safe for stale handles
    fn detach(&self, map: MapHandle, layer: LayerHandle);
}
