use crate::{
    core::{
        geo::LatLngBounds,
        issue::{Issue, IssueFilters},
    },
    MapError, Result,
};
use async_trait::async_trait;
use serde::Deserialize;

/// The issue-query capability: bounds + filters in, issue list out.
///
/// Implementations must tolerate and correctly return an empty list.
#[async_trait]
pub trait IssueQuery: Send + Sync {
    async fn fetch_issues(
        &self,
        bounds: &LatLngBounds,
        filters: &IssueFilters,
    ) -> Result<Vec<Issue>>;
}

#[derive(Debug, Deserialize)]
struct IssueQueryResponse {
    issues: Vec<Issue>,
}

/// HTTP-backed issue query against a `{ "issues": [...] }` JSON endpoint.
pub struct HttpIssueQuery {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIssueQuery {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl IssueQuery for HttpIssueQuery {
    async fn fetch_issues(
        &self,
        bounds: &LatLngBounds,
        filters: &IssueFilters,
    ) -> Result<Vec<Issue>> {
        if !bounds.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "query bounds out of range: {:?}",
                bounds
            )));
        }

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("sw_lat", bounds.south_west.lat),
                ("sw_lng", bounds.south_west.lng),
                ("ne_lat", bounds.north_east.lat),
                ("ne_lng", bounds.north_east.lng),
            ]);

        // Filters are opaque; forward them verbatim as a single parameter.
        if !filters.is_empty() {
            request = request.query(&[("filters", serde_json::to_string(filters.as_value())?)]);
        }

        let response = request.send().await?.error_for_status()?;
        let body: IssueQueryResponse = response.json().await?;
        Ok(body.issues)
    }
}
