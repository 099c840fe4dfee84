//! Follow-up listings and resolution

use std::sync::Arc;

use redline_domain::constants::FOLLOWUPS_PATH;
use redline_domain::{Followup, Page, PageRequest, Result};
use redline_gateway::{ApiRequest, RequestGateway};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::commits::CountPayload;
use crate::map_gateway_error;

/// Follow-up resource operations
pub struct FollowupsClient {
    gateway: Arc<RequestGateway>,
}

impl FollowupsClient {
    pub(crate) fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// List follow-ups awaiting the current user's reaction
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure.
    #[instrument(skip(self))]
    pub async fn list(&self, page: PageRequest) -> Result<Page<Followup>> {
        let request = ApiRequest::get(FOLLOWUPS_PATH)
            .with_query(&[("skip", page.skip.to_string()), ("limit", page.limit.to_string())]);

        let response = self.gateway.execute(request).await.map_err(map_gateway_error)?;
        let listing: Page<Followup> = response.json().map_err(map_gateway_error)?;
        debug!(returned = listing.items.len(), total = listing.total, "follow-ups listed");
        Ok(listing)
    }

    /// Number of pending follow-ups
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure.
    #[instrument(skip(self))]
    pub async fn pending_count(&self) -> Result<u64> {
        let response = self
            .gateway
            .execute(ApiRequest::get(format!("{FOLLOWUPS_PATH}/count")))
            .await
            .map_err(map_gateway_error)?;
        let payload: CountPayload = response.json().map_err(map_gateway_error)?;
        Ok(payload.count)
    }

    /// Dismiss a follow-up after reacting to it
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure.
    #[instrument(skip(self))]
    pub async fn resolve(&self, followup_id: Uuid) -> Result<()> {
        let response = self
            .gateway
            .execute(ApiRequest::delete(format!("{FOLLOWUPS_PATH}/{followup_id}")))
            .await
            .map_err(map_gateway_error)?;
        response.json().map_err(map_gateway_error)
    }
}
