//! Integration tests for the full client stack
//!
//! Drives the typed resource clients through the gateway against a wiremock
//! server: login exchange on first challenge, transparent replay, session
//! lifecycle, and the commit/comment/follow-up resources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use redline_client::session::{LoginPrompt, PromptDismissed};
use redline_client::{ClientConfig, RedlineClient};
use redline_domain::{CommitFilter, LoginRequest, NewComment, PageRequest, RedlineError};
use redline_gateway::SessionCredential;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Prompt that always submits the same credentials, counting invocations
struct StaticPrompt {
    calls: AtomicUsize,
}

impl StaticPrompt {
    fn new() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginPrompt for StaticPrompt {
    async fn request_login(&self) -> std::result::Result<LoginRequest, PromptDismissed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LoginRequest::new("alice", "secret"))
    }
}

/// Prompt that always dismisses
struct DismissingPrompt;

#[async_trait]
impl LoginPrompt for DismissingPrompt {
    async fn request_login(&self) -> std::result::Result<LoginRequest, PromptDismissed> {
        Err(PromptDismissed)
    }
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_env_filter("redline_client=debug").try_init();
    });
}

fn client_for(server: &MockServer, prompt: Arc<dyn LoginPrompt>) -> RedlineClient {
    init_tracing();
    let config = ClientConfig { base_url: server.uri(), ..Default::default() };
    RedlineClient::builder()
        .config(config)
        .login_prompt(prompt)
        .build()
        .expect("client builds")
}

fn user_json() -> serde_json::Value {
    json!({
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "user_name": "alice",
        "full_name": "Alice Reviewer",
        "email": "alice@example.com"
    })
}

fn commit_json(sha: &str) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "sha": sha,
        "message": format!("commit {sha}"),
        "author_name": "Bob Author",
        "author_email": "bob@example.com",
        "committed_at": "2026-08-01T10:00:00Z",
        "pending_review": true
    })
}

async fn mount_session_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .and(body_json(json!({
            "user_name": "alice",
            "password": "secret",
            "remember_me": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "session-token",
            "user": user_json()
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_first_challenge_triggers_login_then_replays() -> Result<()> {
    let server = MockServer::start().await;
    mount_session_endpoint(&server).await;

    // Unauthenticated listing is challenged once.
    Mock::given(method("GET"))
        .and(path("/api/commits"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/commits"))
        .and(query_param("filter", "to_review"))
        .and(query_param("limit", "25"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [commit_json("abc123"), commit_json("def456")],
            "total": 2
        })))
        .mount(&server)
        .await;

    let prompt = StaticPrompt::new();
    let client = client_for(&server, prompt.clone());

    let page = client.commits().list(CommitFilter::ToReview, PageRequest::default()).await?;
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
    assert!(page.items[0].pending_review);
    let expected = chrono::DateTime::parse_from_rfc3339("2026-08-01T10:00:00Z")?
        .with_timezone(&chrono::Utc);
    assert_eq!(page.items[0].committed_at, expected);
    assert_eq!(prompt.calls(), 1);
    assert!(client.session().is_authenticated().await);
    Ok(())
}

#[tokio::test]
async fn test_refreshed_session_reused_across_resources() -> Result<()> {
    let server = MockServer::start().await;
    mount_session_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/commits/count"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/commits/count"))
        .and(query_param("filter", "to_review"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 7 })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/session/user"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let prompt = StaticPrompt::new();
    let client = client_for(&server, prompt.clone());

    assert_eq!(client.commits().pending_count().await?, 7);

    // The refreshed session is used directly; no second login.
    let user = client.session().current_user().await?;
    assert_eq!(user.user_name, "alice");
    assert_eq!(prompt.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_dismissed_prompt_surfaces_authentication_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/followups"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(DismissingPrompt));

    let result = client.followups().list(PageRequest::default()).await;
    assert!(matches!(result, Err(RedlineError::Auth(_))));
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_rejected_credentials_surface_authentication_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/commits"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let prompt = StaticPrompt::new();
    let client = client_for(&server, prompt.clone());

    let result = client.commits().list(CommitFilter::All, PageRequest::default()).await;
    assert!(matches!(result, Err(RedlineError::Auth(_))));
    assert_eq!(prompt.calls(), 1);
}

#[tokio::test]
async fn test_comment_posting_roundtrip() -> Result<()> {
    let server = MockServer::start().await;
    let commit_id = Uuid::new_v4();
    let comment_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/api/commits/{commit_id}/comments")))
        .and(header("Authorization", "Bearer session-token"))
        .and(body_json(json!({
            "body": "off by one on line 42",
            "file_name": "src/queue.rs",
            "line_number": 42
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": comment_id,
            "commit_id": commit_id,
            "author_name": "Alice Reviewer",
            "body": "off by one on line 42",
            "posted_at": "2026-08-01T11:30:00Z",
            "file_name": "src/queue.rs",
            "line_number": 42
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, StaticPrompt::new());
    // Seed the session directly; this test is about the resource, not the
    // login exchange.
    client.gateway().credential_store().install(SessionCredential::new("session-token")).await;

    let comment = NewComment::inline("off by one on line 42", "src/queue.rs", 42);
    let posted = client.comments().post(commit_id, &comment).await?;
    assert_eq!(posted.id, comment_id);
    assert!(posted.is_inline());
    Ok(())
}

#[tokio::test]
async fn test_followup_listing_and_resolution() -> Result<()> {
    let server = MockServer::start().await;
    let followup_id = Uuid::new_v4();
    let commit_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/followups"))
        .and(query_param("limit", "25"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": followup_id,
                "commit_id": commit_id,
                "commit_message": "fix the queue drain",
                "comment_count": 3,
                "last_comment": {
                    "id": Uuid::new_v4(),
                    "commit_id": commit_id,
                    "author_name": "Bob Author",
                    "body": "done, please re-check",
                    "posted_at": "2026-08-02T09:00:00Z"
                },
                "received_at": "2026-08-02T09:00:05Z"
            }],
            "total": 1
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/followups/{followup_id}")))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server, StaticPrompt::new());
    client.gateway().credential_store().install(SessionCredential::new("session-token")).await;

    let page = client.followups().list(PageRequest::default()).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].comment_count, 3);
    assert!(!page.items[0].last_comment.is_inline());

    client.followups().resolve(followup_id).await?;
    Ok(())
}

#[tokio::test]
async fn test_logout_clears_local_credential() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/session"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server, StaticPrompt::new());
    client.gateway().credential_store().install(SessionCredential::new("session-token")).await;
    assert!(client.session().is_authenticated().await);

    client.session().logout().await?;
    assert!(!client.session().is_authenticated().await);
    Ok(())
}

#[tokio::test]
async fn test_server_error_maps_to_domain_taxonomy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/commits"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server, StaticPrompt::new());
    client.gateway().credential_store().install(SessionCredential::new("session-token")).await;

    let result = client.commits().list(CommitFilter::All, PageRequest::default()).await;
    assert!(matches!(result, Err(RedlineError::Server(_))));
}
