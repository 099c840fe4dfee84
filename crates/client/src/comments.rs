//! Comment posting

use std::sync::Arc;

use redline_domain::constants::COMMITS_PATH;
use redline_domain::{Comment, NewComment, RedlineError, Result};
use redline_gateway::{ApiRequest, RequestGateway};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::map_gateway_error;

/// Comment resource operations
pub struct CommentsClient {
    gateway: Arc<RequestGateway>,
}

impl CommentsClient {
    pub(crate) fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// Post a comment on a commit
    ///
    /// Inline comments carry a file anchor in the payload; commit-level
    /// comments do not. See [`NewComment`].
    ///
    /// # Errors
    /// Returns [`RedlineError::Validation`] for an empty body or a
    /// half-specified anchor, otherwise a mapped gateway error.
    #[instrument(skip(self, comment), fields(commit_id = %commit_id))]
    pub async fn post(&self, commit_id: Uuid, comment: &NewComment) -> Result<Comment> {
        if comment.body.trim().is_empty() {
            return Err(RedlineError::Validation("comment body must not be empty".to_string()));
        }
        if comment.file_name.is_some() != comment.line_number.is_some() {
            return Err(RedlineError::Validation(
                "inline comments need both file name and line number".to_string(),
            ));
        }

        let request = ApiRequest::post(format!("{COMMITS_PATH}/{commit_id}/comments"))
            .with_json(comment)
            .map_err(map_gateway_error)?;

        let response = self.gateway.execute(request).await.map_err(map_gateway_error)?;
        let posted: Comment = response.json().map_err(map_gateway_error)?;
        debug!(comment_id = %posted.id, inline = posted.is_inline(), "comment posted");
        Ok(posted)
    }
}
