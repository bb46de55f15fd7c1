//! # civimap
//!
//! An embeddable map visualization engine for civic issue-reporting
//! applications.
//!
//! The crate owns the viewport lifecycle, viewport-bounded reactive issue
//! fetching, the mutually-exclusive render layers (plain markers, clustered
//! markers, density heatmap), and the interop bridge that lets foreign-rendered
//! popup content invoke first-party selection logic. The rendering engine,
//! issue backend, geolocation, and detail view are consumed through narrow
//! capability traits and are never owned by this crate.

pub mod bridge;
pub mod capability;
pub mod core;
pub mod fetch;
pub mod layers;
pub mod map_view;
pub mod prelude;
pub mod view;

// Re-export public API
pub use crate::core::{
    geo::{LatLng, LatLngBounds},
    issue::{Issue, IssueFilters, IssuePriority, IssueStatus},
};

pub use crate::capability::{
    engine::{CapabilityState, LayerHandle, LayerKind, MapHandle, RenderEngine},
    query::{HttpIssueQuery, IssueQuery},
    tiles::{DefaultTileStyles, MapTypeKey, TileStyle, TileStyleSource},
};

pub use crate::layers::coordinator::{LayerCoordinator, RenderMode, ToggleOutcome};

pub use crate::fetch::{FetchTicket, IssueFetcher};

pub use crate::map_view::{IssueMapView, IssueMapViewConfig};

pub use crate::view::controller::{InitPhase, ViewportController};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("issue fetch failed: {0}")]
    Fetch(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("geolocation unavailable: {0}")]
    Geolocation(String),

    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("layer error: {0}")]
    Layer(String),
}

/// Error type alias for convenience
pub type Error = MapError;
