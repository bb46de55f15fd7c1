//! Layer coordinator: owns whichever render layer is currently attached.
//!
//! Exactly one of {plain marker set, cluster layer, heat layer} is attached to
//! the viewport at any instant. A rebuild or mode switch always fully detaches
//! the outgoing layer's objects before constructing the incoming ones; layers
//! are never merely hidden. Every successful fetch rebuilds the active layer
//! from scratch; fetch volume is bounded by the viewport, so the churn stays
//! small.

use crate::{
    capability::engine::{HeatPoint, LayerHandle, LayerKind, MapHandle, RenderEngine},
    core::issue::{Issue, IssuePriority},
    layers::marker::to_marker_spec,
    Result,
};
use std::sync::Arc;

/// The mutually-exclusive visual modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Plain,
    Clustered,
    Heatmap,
}

/// Result of a user toggle against an optional capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Applied,
    /// The backing capability was not loaded; the toggle is a no-op, not an
    /// error. Core markers are unaffected.
    Unavailable,
}

/// Heat contribution by priority: urgent → 3, high → 2, everything else → 1.
pub fn heat_weight(priority: IssuePriority) -> f64 {
    match priority {
        IssuePriority::Urgent => 3.0,
        IssuePriority::High => 2.0,
        IssuePriority::Medium | IssuePriority::Low => 1.0,
    }
}

pub struct LayerCoordinator {
    engine: Arc<dyn RenderEngine>,
    heatmap_requested: bool,
    clustering_requested: bool,
    attached: Option<(LayerHandle, LayerKind)>,
}

impl LayerCoordinator {
    pub fn new(engine: Arc<dyn RenderEngine>) -> Self {
        Self {
            engine,
            heatmap_requested: false,
            clustering_requested: false,
            attached: None,
        }
    }

    /// Pure mode derivation. Heatmap wins over clustering when both are
    /// requested; hosts rely on this precedence.
    fn derive_mode(
        heatmap_requested: bool,
        clustering_requested: bool,
        heatmap_supported: bool,
        clustering_supported: bool,
    ) -> RenderMode {
        if heatmap_requested && heatmap_supported {
            RenderMode::Heatmap
        } else if clustering_requested && clustering_supported {
            RenderMode::Clustered
        } else {
            RenderMode::Plain
        }
    }

    /// The mode the next rebuild will attach
    pub fn active_mode(&self) -> RenderMode {
        Self::derive_mode(
            self.heatmap_requested,
            self.clustering_requested,
            self.engine.supports_heatmap(),
            self.engine.supports_clustering(),
        )
    }

    /// Kind of the currently attached layer, if any
    pub fn attached_kind(&self) -> Option<LayerKind> {
        self.attached.map(|(_, kind)| kind)
    }

    /// Toggles the heatmap. Rebuilds immediately when a map is live.
    pub fn set_heatmap(
        &mut self,
        map: Option<MapHandle>,
        enabled: bool,
        issues: &[Issue],
    ) -> Result<ToggleOutcome> {
        if enabled && !self.engine.supports_heatmap() {
            log::debug!("heatmap toggle ignored: heat-rendering capability not loaded");
            return Ok(ToggleOutcome::Unavailable);
        }

        self.heatmap_requested = enabled;
        if let Some(map) = map {
            self.rebuild(map, issues)?;
        }
        Ok(ToggleOutcome::Applied)
    }

    /// Toggles clustering. Rebuilds immediately when a map is live.
    pub fn set_clustering(
        &mut self,
        map: Option<MapHandle>,
        enabled: bool,
        issues: &[Issue],
    ) -> Result<ToggleOutcome> {
        if enabled && !self.engine.supports_clustering() {
            log::debug!("clustering toggle ignored: clustering capability not loaded");
            return Ok(ToggleOutcome::Unavailable);
        }

        self.clustering_requested = enabled;
        if let Some(map) = map {
            self.rebuild(map, issues)?;
        }
        Ok(ToggleOutcome::Applied)
    }

    /// Tears down the outgoing layer, then builds and attaches the active
    /// mode's layer from the full issue set. Empty sets attach an empty layer.
    pub fn rebuild(&mut self, map: MapHandle, issues: &[Issue]) -> Result<()> {
        self.detach_active(map);

        let mode = self.active_mode();
        let (handle, kind) = match mode {
            RenderMode::Plain => {
                let specs: Vec<_> = issues.iter().map(to_marker_spec).collect();
                (self.engine.attach_markers(map, &specs)?, LayerKind::Markers)
            }
            RenderMode::Clustered => {
                let specs: Vec<_> = issues.iter().map(to_marker_spec).collect();
                (self.engine.attach_clustered(map, &specs)?, LayerKind::Cluster)
            }
            RenderMode::Heatmap => {
                let points: Vec<_> = issues
                    .iter()
                    .map(|issue| HeatPoint {
                        position: issue.position(),
                        weight: heat_weight(issue.priority),
                    })
                    .collect();
                (self.engine.attach_heat(map, &points)?, LayerKind::Heat)
            }
        };

        log::trace!("attached {} layer with {} issues", kind, issues.len());
        self.attached = Some((handle, kind));
        Ok(())
    }

    /// Fully detaches the current layer's objects, if any. Idempotent.
    pub fn detach_active(&mut self, map: MapHandle) {
        if let Some((handle, kind)) = self.attached.take() {
            log::trace!("detaching {} layer", kind);
            self.engine.detach(map, handle);
        }
    }
}
