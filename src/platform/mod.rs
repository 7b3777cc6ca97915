//! Platform service for the pull request hosting API
//!
//! Provides the narrow set of GitHub operations the merge engine relies on.

mod github;

pub use github::{DEFAULT_API_URL, GitHubService};

use crate::error::Result;
use crate::types::{
    BranchProtection, CommitStatus, MergeRequest, MergeResult, PrComment, PullRequest,
    PullRequestDetails, RepositoryRef, Repository, Review, ReviewRequest,
};
use async_trait::async_trait;

/// Platform service trait for repository and PR operations
///
/// Policy resolution, merge execution and the batch loop only talk to the
/// hosting service through this trait, so they run unchanged against a mock.
/// Calls that fail return `Error::Remote` carrying the HTTP status; callers
/// decide which statuses are soft.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch repository metadata
    ///
    /// Returns `Error::RepositoryNotFound` if the repository does not exist.
    async fn get_repository(&self, repo: &RepositoryRef) -> Result<Repository>;

    /// Fetch branch protection for a branch
    ///
    /// `None` means no protection is configured (a 404), which is not an error.
    async fn get_branch_protection(
        &self,
        repo: &RepositoryRef,
        branch: &str,
    ) -> Result<Option<BranchProtection>>;

    /// Download the raw text of a file in the repository
    ///
    /// `None` if the file does not exist.
    async fn get_file_content(&self, repo: &RepositoryRef, path: &str) -> Result<Option<String>>;

    /// List open PRs, least recently updated first
    async fn list_open_pull_requests(&self, repo: &RepositoryRef) -> Result<Vec<PullRequest>>;

    /// Get full PR details including mergeability
    async fn get_pr_details(&self, pr: &PullRequest) -> Result<PullRequestDetails>;

    /// List commit statuses of the PR head, newest first
    async fn list_statuses(&self, pr: &PullRequestDetails) -> Result<Vec<CommitStatus>>;

    /// List reviews on a PR
    async fn list_reviews(&self, pr: &PullRequestDetails) -> Result<Vec<Review>>;

    /// Create a review on a PR
    async fn create_review(&self, pr: &PullRequestDetails, review: &ReviewRequest)
    -> Result<Review>;

    /// List comments on a PR
    async fn list_pr_comments(&self, pr: &PullRequestDetails) -> Result<Vec<PrComment>>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr: &PullRequestDetails, body: &str) -> Result<PrComment>;

    /// Press the merge button
    async fn merge_pr(&self, pr: &PullRequestDetails, request: &MergeRequest)
    -> Result<MergeResult>;
}
