//! # Redline Domain
//!
//! Review-domain types and models for Redline.
//!
//! This crate contains:
//! - Review data types (commits, comments, follow-ups, paging)
//! - Session and user types
//! - Domain error types and Result definitions
//! - Domain constants (endpoints, defaults)
//!
//! ## Architecture
//! - No dependencies on other Redline crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{RedlineError, Result};
pub use types::review::{
    ChangeType, Comment, CommitDetails, CommitFilter, CommitSummary, FileDiff, Followup,
    NewComment, Page, PageRequest,
};
pub use types::session::{LoginRequest, SessionToken, User};
