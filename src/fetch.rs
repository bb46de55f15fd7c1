//! Viewport-driven issue fetching with stale-result discarding.
//!
//! Cancellation here is logical, not physical: there is no network
//! cancellation primitive. Every fetch cycle takes a [`FetchTicket`] carrying
//! a monotonically increasing generation; a resolved fetch is applied to
//! shared state only while its ticket is still the latest issued. Under rapid
//! panning this makes the displayed set last-issued-wins, never
//! first-response-wins.

use crate::{
    capability::query::IssueQuery,
    core::{
        geo::LatLngBounds,
        issue::{Issue, IssueFilters},
    },
    Result,
};
use instant::Instant;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Generation token for one fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

pub struct IssueFetcher {
    query: Arc<dyn IssueQuery>,
    issued: AtomicU64,
}

impl IssueFetcher {
    pub fn new(query: Arc<dyn IssueQuery>) -> Self {
        Self {
            query,
            issued: AtomicU64::new(0),
        }
    }

    /// Issues the next generation. Call immediately before starting a fetch.
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a ticket is still the most recently issued generation
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Invalidates all in-flight tickets (used at teardown)
    pub fn invalidate_all(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }

    /// Runs the query for one cycle. The caller is responsible for checking
    /// `is_current` on the ticket before applying the result.
    pub async fn run(&self, bounds: &LatLngBounds, filters: &IssueFilters) -> Result<Vec<Issue>> {
        let started = Instant::now();
        let issues = self.query.fetch_issues(bounds, filters).await?;
        log::debug!(
            "fetched {} issues for {:?} in {:?}",
            issues.len(),
            bounds.center(),
            started.elapsed()
        );
        Ok(issues)
    }
}
