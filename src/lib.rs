//! justmerge - merge the GitHub pull requests that are ready to go
//!
//! For each configured repository, justmerge works out the merge policy from
//! branch protection (and `bors.toml` when bors gates the branch), walks the
//! open pull requests least recently updated first, and merges the ones that
//! pass every eligibility rule.

pub mod auth;
pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod policy;
pub mod progress;
pub mod types;

pub use error::{Error, Result};
