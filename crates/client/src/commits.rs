//! Commit listings, details, and review state

use std::sync::Arc;

use redline_domain::constants::COMMITS_PATH;
use redline_domain::{CommitDetails, CommitFilter, CommitSummary, Page, PageRequest, Result};
use redline_gateway::{ApiRequest, RequestGateway};
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::map_gateway_error;

/// Count payload returned by the `/count` endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct CountPayload {
    pub count: u64,
}

/// Commit resource operations
pub struct CommitsClient {
    gateway: Arc<RequestGateway>,
}

impl CommitsClient {
    pub(crate) fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// List commits under the given filter and page
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: CommitFilter,
        page: PageRequest,
    ) -> Result<Page<CommitSummary>> {
        let request = ApiRequest::get(COMMITS_PATH).with_query(&[
            ("filter", filter.as_query_value().to_string()),
            ("skip", page.skip.to_string()),
            ("limit", page.limit.to_string()),
        ]);

        let response = self.gateway.execute(request).await.map_err(map_gateway_error)?;
        let listing: Page<CommitSummary> = response.json().map_err(map_gateway_error)?;
        debug!(returned = listing.items.len(), total = listing.total, "commits listed");
        Ok(listing)
    }

    /// Number of commits still awaiting the current user's review
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure.
    #[instrument(skip(self))]
    pub async fn pending_count(&self) -> Result<u64> {
        let request = ApiRequest::get(format!("{COMMITS_PATH}/count"))
            .with_query(&[("filter", CommitFilter::ToReview.as_query_value().to_string())]);

        let response = self.gateway.execute(request).await.map_err(map_gateway_error)?;
        let payload: CountPayload = response.json().map_err(map_gateway_error)?;
        Ok(payload.count)
    }

    /// Fetch a commit with its file diffs and comment thread
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure.
    #[instrument(skip(self))]
    pub async fn details(&self, commit_id: Uuid) -> Result<CommitDetails> {
        let response = self
            .gateway
            .execute(ApiRequest::get(format!("{COMMITS_PATH}/{commit_id}")))
            .await
            .map_err(map_gateway_error)?;
        response.json().map_err(map_gateway_error)
    }

    /// Remove a commit from the current user's review list
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure.
    #[instrument(skip(self))]
    pub async fn mark_reviewed(&self, commit_id: Uuid) -> Result<()> {
        let response = self
            .gateway
            .execute(ApiRequest::post(format!("{COMMITS_PATH}/{commit_id}/review")))
            .await
            .map_err(map_gateway_error)?;
        response.json().map_err(map_gateway_error)
    }
}
