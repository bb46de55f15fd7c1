use crate::core::issue::Issue;

/// The issue-detail collaborator.
///
/// Owns its own display lifecycle; the map's only obligation is to invoke
/// `open` for the selected issue.
pub trait IssueDetailSink: Send + Sync {
    fn open(&self, issue: &Issue);
}
