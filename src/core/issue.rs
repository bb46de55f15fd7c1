use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Rejected,
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueStatus::Open => write!(f, "open"),
            IssueStatus::InProgress => write!(f, "in-progress"),
            IssueStatus::Resolved => write!(f, "resolved"),
            IssueStatus::Closed => write!(f, "closed"),
            IssueStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Reporter-assigned priority of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssuePriority::Low => write!(f, "low"),
            IssuePriority::Medium => write!(f, "medium"),
            IssuePriority::High => write!(f, "high"),
            IssuePriority::Urgent => write!(f, "urgent"),
        }
    }
}

/// Read-only snapshot of a reported issue as served by the backend.
///
/// The subsystem never mutates issues; it holds a per-fetch-cycle cached copy
/// keyed by `id`. Presentation-only fields are optional so sparse backends
/// still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub category_id: u64,
    #[serde(default)]
    pub category_name: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub reporter_name: Option<String>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// ISO-8601 timestamps, passed through untouched
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Issue {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Opaque filter criteria, forwarded verbatim to the issue-query capability.
///
/// The filter widget owns the shape of this value; the subsystem never
/// inspects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueFilters(pub serde_json::Value);

impl IssueFilters {
    pub fn none() -> Self {
        Self(serde_json::Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for IssueFilters {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
