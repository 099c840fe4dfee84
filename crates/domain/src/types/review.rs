//! Commit, comment, and follow-up types

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// How a file changed within a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
}

/// A commit as it appears in review listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummary {
    pub id: Uuid,
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub committed_at: DateTime<Utc>,
    /// Whether the current user still has this commit on their review list
    pub pending_review: bool,
}

/// A single changed file within a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub file_name: String,
    pub change_type: ChangeType,
    /// Unified diff text for the file
    pub diff: String,
}

/// A review comment, either commit-level or anchored to a file line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub commit_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub posted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

impl Comment {
    /// Whether the comment is anchored to a specific file line
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.file_name.is_some() && self.line_number.is_some()
    }
}

/// Payload for posting a new comment
///
/// The target commit rides in the resource path, not in the payload.
/// Inline comments carry both `file_name` and `line_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

impl NewComment {
    /// A commit-level comment
    #[must_use]
    pub fn commit_level(body: impl Into<String>) -> Self {
        Self { body: body.into(), file_name: None, line_number: None }
    }

    /// An inline comment anchored to a file line
    #[must_use]
    pub fn inline(body: impl Into<String>, file_name: impl Into<String>, line_number: u32) -> Self {
        Self {
            body: body.into(),
            file_name: Some(file_name.into()),
            line_number: Some(line_number),
        }
    }
}

/// Full commit view: summary plus file diffs and the comment thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetails {
    pub commit: CommitSummary,
    pub files: Vec<FileDiff>,
    pub comments: Vec<Comment>,
}

/// A follow-up: someone commented on a commit the current user authored or
/// discussed, and the user has not reacted yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followup {
    pub id: Uuid,
    pub commit_id: Uuid,
    pub commit_message: String,
    /// Total comments in the thread that triggered this follow-up
    pub comment_count: u32,
    /// The most recent comment in the thread
    pub last_comment: Comment,
    pub received_at: DateTime<Utc>,
}

/// Which commits a listing should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitFilter {
    /// Only commits still awaiting the current user's review
    #[default]
    ToReview,
    /// Every commit visible to the current user
    All,
}

impl CommitFilter {
    /// Query-string value understood by the server
    #[must_use]
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::ToReview => "to_review",
            Self::All => "all",
        }
    }
}

/// Offset/limit paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub skip: u32,
    pub limit: u32,
}

impl PageRequest {
    /// First page with the given limit, clamped to [`MAX_PAGE_LIMIT`]
    #[must_use]
    pub fn first(limit: u32) -> Self {
        Self { skip: 0, limit: limit.min(MAX_PAGE_LIMIT) }
    }

    /// The page immediately following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self { skip: self.skip.saturating_add(self.limit), limit: self.limit }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_PAGE_LIMIT }
    }
}

/// One page of a listing plus the total count on the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    /// Whether a further page exists beyond the given request
    #[must_use]
    pub fn has_more(&self, page: PageRequest) -> bool {
        u64::from(page.skip) + (self.items.len() as u64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_comment_constructors() {
        let commit_level = NewComment::commit_level("looks good");
        assert!(commit_level.file_name.is_none());
        assert!(commit_level.line_number.is_none());

        let inline = NewComment::inline("off by one", "src/lib.rs", 42);
        assert_eq!(inline.file_name.as_deref(), Some("src/lib.rs"));
        assert_eq!(inline.line_number, Some(42));
    }

    #[test]
    fn test_comment_level_serialization_omits_anchor() {
        let json = serde_json::to_string(&NewComment::commit_level("ok")).unwrap();
        assert!(!json.contains("file_name"));
        assert!(!json.contains("line_number"));
    }

    #[test]
    fn test_page_request_next_advances_skip() {
        let page = PageRequest::first(25);
        let next = page.next();
        assert_eq!(next.skip, 25);
        assert_eq!(next.limit, 25);
    }

    #[test]
    fn test_page_request_limit_is_clamped() {
        let page = PageRequest::first(10_000);
        assert_eq!(page.limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_page_has_more() {
        let page: Page<u32> = Page { items: vec![1, 2, 3], total: 10 };
        assert!(page.has_more(PageRequest { skip: 0, limit: 3 }));

        let last: Page<u32> = Page { items: vec![1], total: 4 };
        assert!(!last.has_more(PageRequest { skip: 3, limit: 3 }));
    }

    #[test]
    fn test_commit_filter_query_values() {
        assert_eq!(CommitFilter::ToReview.as_query_value(), "to_review");
        assert_eq!(CommitFilter::All.as_query_value(), "all");
    }

    #[test]
    fn test_commit_details_deserialization() {
        let json = serde_json::json!({
            "commit": {
                "id": "550e8400-e29b-41d4-a716-446655440001",
                "sha": "abc123",
                "message": "tighten queue drain",
                "author_name": "Bob Author",
                "author_email": "bob@example.com",
                "committed_at": "2026-08-01T10:00:00Z",
                "pending_review": true
            },
            "files": [
                { "file_name": "src/queue.rs", "change_type": "modified", "diff": "@@ -1 +1 @@" },
                { "file_name": "src/old.rs", "change_type": "deleted", "diff": "" }
            ],
            "comments": []
        });

        let details: CommitDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.commit.sha, "abc123");
        assert_eq!(details.files.len(), 2);
        assert_eq!(details.files[0].change_type, ChangeType::Modified);
        assert_eq!(details.files[1].change_type, ChangeType::Deleted);
        assert!(details.comments.is_empty());
    }
}
