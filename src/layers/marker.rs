//! Marker factory: maps one issue to a renderable marker specification.
//!
//! Style derivation is two fixed lookup tables; both are part of the public
//! contract and asserted by tests.

use crate::{
    capability::engine::{MarkerPopup, MarkerSpec},
    core::issue::{Issue, IssuePriority, IssueStatus},
};

/// Marker fill color by status:
///   open        #2563eb (blue)
///   in-progress #f59e0b (amber)
///   resolved    #16a34a (green)
///   closed      #6b7280 (gray)
///   rejected    #dc2626 (red)
pub fn status_color(status: IssueStatus) -> &'static str {
    match status {
        IssueStatus::Open => "#2563eb",
        IssueStatus::InProgress => "#f59e0b",
        IssueStatus::Resolved => "#16a34a",
        IssueStatus::Closed => "#6b7280",
        IssueStatus::Rejected => "#dc2626",
    }
}

/// Marker radius by priority, three-tier: urgent > high > {medium, low}.
pub fn priority_radius_px(priority: IssuePriority) -> f32 {
    match priority {
        IssuePriority::Urgent => 14.0,
        IssuePriority::High => 11.0,
        IssuePriority::Medium | IssuePriority::Low => 8.0,
    }
}

/// Builds the engine-facing spec for one issue.
pub fn to_marker_spec(issue: &Issue) -> MarkerSpec {
    MarkerSpec {
        issue_id: issue.id,
        position: issue.position(),
        color: status_color(issue.status),
        radius_px: priority_radius_px(issue.priority),
        popup: MarkerPopup {
            title: issue.title.clone(),
            status_label: issue.status.to_string(),
            category: issue.category_name.clone(),
        },
    }
}
