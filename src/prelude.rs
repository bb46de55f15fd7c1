//! Prelude module for common civimap types and traits
//!
//! Re-exports the most commonly used types, traits, and functions for easy
//! importing with `use civimap::prelude::*;`

pub use crate::core::{
    geo::{LatLng, LatLngBounds},
    issue::{Issue, IssueFilters, IssuePriority, IssueStatus},
};

pub use crate::capability::{
    detail::IssueDetailSink,
    engine::{
        CapabilityState, HeatPoint, LayerHandle, LayerKind, MapHandle, MarkerSpec, RenderEngine,
    },
    geolocate::GeolocationSource,
    query::{HttpIssueQuery, IssueQuery},
    tiles::{DefaultTileStyles, MapTypeKey, TileStyle, TileStyleSource},
};

pub use crate::layers::{
    coordinator::{LayerCoordinator, RenderMode, ToggleOutcome},
    marker::{priority_radius_px, status_color, to_marker_spec},
};

pub use crate::fetch::{FetchTicket, IssueFetcher};

pub use crate::view::{
    bootstrap::resolve_initial_center,
    controller::{InitPhase, ViewportController},
};

pub use crate::bridge::SelectionBridge;

pub use crate::map_view::{IssueMapView, IssueMapViewConfig};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
