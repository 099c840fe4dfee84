//! Review-domain data types
//!
//! Wire-level types exchanged with the review server. All types are plain
//! serde models; behavior lives in the gateway and client crates.

pub mod review;
pub mod session;
