//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use justmerge::error::{Error, Result};
use justmerge::platform::PlatformService;
use justmerge::types::{
    BranchProtection, CommitStatus, MergeRequest, MergeResult, PrComment, PullRequest,
    PullRequestDetails, Repository, RepositoryRef, Review, ReviewRequest,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_review`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReviewCall {
    pub pr_number: u64,
    pub request: ReviewRequest,
}

/// Call record for `create_pr_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentCall {
    pub pr_number: u64,
    pub body: String,
}

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub request: MergeRequest,
}

/// Simple mock platform service for testing
///
/// Manually implements `PlatformService` with canned responses keyed by PR
/// number, call tracking for verification and per-PR error injection.
/// Comments created through the mock are visible to later
/// `list_pr_comments` calls.
pub struct MockPlatformService {
    next_id: AtomicU64,
    repository: Mutex<Option<Repository>>,
    protection: Mutex<Option<BranchProtection>>,
    files: Mutex<HashMap<String, String>>,
    open_prs: Mutex<Vec<PullRequest>>,
    details: Mutex<HashMap<u64, PullRequestDetails>>,
    statuses: Mutex<HashMap<u64, Vec<CommitStatus>>>,
    reviews: Mutex<HashMap<u64, Vec<Review>>>,
    comments: Mutex<HashMap<u64, Vec<PrComment>>>,
    merge_responses: Mutex<HashMap<u64, MergeResult>>,
    // Call tracking
    protection_calls: Mutex<Vec<String>>,
    file_calls: Mutex<Vec<String>>,
    list_prs_calls: Mutex<usize>,
    get_pr_details_calls: Mutex<Vec<u64>>,
    list_statuses_calls: Mutex<Vec<u64>>,
    list_reviews_calls: Mutex<Vec<u64>>,
    list_comments_calls: Mutex<Vec<u64>>,
    create_review_calls: Mutex<Vec<CreateReviewCall>>,
    create_comment_calls: Mutex<Vec<CreateCommentCall>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    // Error injection
    error_on_merge_pr: Mutex<HashMap<u64, (u16, String)>>,
}

impl MockPlatformService {
    /// Mock for an existing repository with the given default branch
    pub fn with_repo(full_name: &str, default_branch: &str) -> Self {
        let mock = Self::without_repo();
        *mock.repository.lock().unwrap() = Some(Repository {
            full_name: full_name.to_string(),
            default_branch: default_branch.to_string(),
        });
        mock
    }

    /// Mock where the repository does not exist
    pub fn without_repo() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            repository: Mutex::new(None),
            protection: Mutex::new(None),
            files: Mutex::new(HashMap::new()),
            open_prs: Mutex::new(Vec::new()),
            details: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            reviews: Mutex::new(HashMap::new()),
            comments: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            protection_calls: Mutex::new(Vec::new()),
            file_calls: Mutex::new(Vec::new()),
            list_prs_calls: Mutex::new(0),
            get_pr_details_calls: Mutex::new(Vec::new()),
            list_statuses_calls: Mutex::new(Vec::new()),
            list_reviews_calls: Mutex::new(Vec::new()),
            list_comments_calls: Mutex::new(Vec::new()),
            create_review_calls: Mutex::new(Vec::new()),
            create_comment_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            error_on_merge_pr: Mutex::new(HashMap::new()),
        }
    }

    // === Setup ===

    /// Protect the inspected branch
    pub fn set_protection(&self, protection: BranchProtection) {
        *self.protection.lock().unwrap() = Some(protection);
    }

    /// Put a file at the repository root
    pub fn set_file(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    /// Add a PR to the open list together with its detail
    pub fn add_pr(&self, summary: PullRequest, details: PullRequestDetails) {
        self.details.lock().unwrap().insert(details.number, details);
        self.open_prs.lock().unwrap().push(summary);
    }

    /// Set the statuses returned for a PR, newest first
    pub fn set_statuses(&self, pr_number: u64, statuses: Vec<CommitStatus>) {
        self.statuses.lock().unwrap().insert(pr_number, statuses);
    }

    /// Set the existing reviews of a PR
    pub fn set_reviews(&self, pr_number: u64, reviews: Vec<Review>) {
        self.reviews.lock().unwrap().insert(pr_number, reviews);
    }

    /// Set the existing comments of a PR
    pub fn set_comments(&self, pr_number: u64, comments: Vec<PrComment>) {
        self.comments.lock().unwrap().insert(pr_number, comments);
    }

    /// Set the response for `merge_pr` for a specific PR
    pub fn set_merge_response(&self, pr_number: u64, result: MergeResult) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, result);
    }

    // === Error injection ===

    /// Make `merge_pr` fail with an HTTP status for a specific PR
    pub fn fail_merge_with_status(&self, pr_number: u64, status: u16, body: &str) {
        self.error_on_merge_pr
            .lock()
            .unwrap()
            .insert(pr_number, (status, body.to_string()));
    }

    // === Call inspection ===

    pub fn protection_calls(&self) -> Vec<String> {
        self.protection_calls.lock().unwrap().clone()
    }

    pub fn file_calls(&self) -> Vec<String> {
        self.file_calls.lock().unwrap().clone()
    }

    pub fn list_prs_calls(&self) -> usize {
        *self.list_prs_calls.lock().unwrap()
    }

    pub fn get_pr_details_calls(&self) -> Vec<u64> {
        self.get_pr_details_calls.lock().unwrap().clone()
    }

    pub fn list_statuses_calls(&self) -> Vec<u64> {
        self.list_statuses_calls.lock().unwrap().clone()
    }

    pub fn list_reviews_calls(&self) -> Vec<u64> {
        self.list_reviews_calls.lock().unwrap().clone()
    }

    pub fn list_comments_calls(&self) -> Vec<u64> {
        self.list_comments_calls.lock().unwrap().clone()
    }

    pub fn create_review_calls(&self) -> Vec<CreateReviewCall> {
        self.create_review_calls.lock().unwrap().clone()
    }

    pub fn create_comment_calls(&self) -> Vec<CreateCommentCall> {
        self.create_comment_calls.lock().unwrap().clone()
    }

    pub fn merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Number of calls that change something on the remote
    pub fn mutating_calls(&self) -> usize {
        self.create_review_calls().len()
            + self.create_comment_calls().len()
            + self.merge_pr_calls().len()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_repository(&self, repo: &RepositoryRef) -> Result<Repository> {
        self.repository
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::RepositoryNotFound(repo.to_string()))
    }

    async fn get_branch_protection(
        &self,
        _repo: &RepositoryRef,
        branch: &str,
    ) -> Result<Option<BranchProtection>> {
        self.protection_calls
            .lock()
            .unwrap()
            .push(branch.to_string());
        Ok(self.protection.lock().unwrap().clone())
    }

    async fn get_file_content(&self, _repo: &RepositoryRef, path: &str) -> Result<Option<String>> {
        self.file_calls.lock().unwrap().push(path.to_string());
        Ok(self.files.lock().unwrap().get(path).cloned())
    }

    async fn list_open_pull_requests(&self, _repo: &RepositoryRef) -> Result<Vec<PullRequest>> {
        *self.list_prs_calls.lock().unwrap() += 1;
        Ok(self.open_prs.lock().unwrap().clone())
    }

    async fn get_pr_details(&self, pr: &PullRequest) -> Result<PullRequestDetails> {
        self.get_pr_details_calls.lock().unwrap().push(pr.number);
        self.details
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .ok_or_else(|| Error::Remote {
                status: 404,
                body: format!("PR #{} not found", pr.number),
            })
    }

    async fn list_statuses(&self, pr: &PullRequestDetails) -> Result<Vec<CommitStatus>> {
        self.list_statuses_calls.lock().unwrap().push(pr.number);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_reviews(&self, pr: &PullRequestDetails) -> Result<Vec<Review>> {
        self.list_reviews_calls.lock().unwrap().push(pr.number);
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_review(
        &self,
        pr: &PullRequestDetails,
        review: &ReviewRequest,
    ) -> Result<Review> {
        self.create_review_calls
            .lock()
            .unwrap()
            .push(CreateReviewCall {
                pr_number: pr.number,
                request: review.clone(),
            });
        let id = self.next_id();
        Ok(Review {
            id,
            state: Some("APPROVED".to_string()),
            body: Some(review.body.clone()),
            html_url: Some(format!("{}#pullrequestreview-{id}", pr.html_url())),
        })
    }

    async fn list_pr_comments(&self, pr: &PullRequestDetails) -> Result<Vec<PrComment>> {
        self.list_comments_calls.lock().unwrap().push(pr.number);
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_pr_comment(&self, pr: &PullRequestDetails, body: &str) -> Result<PrComment> {
        self.create_comment_calls
            .lock()
            .unwrap()
            .push(CreateCommentCall {
                pr_number: pr.number,
                body: body.to_string(),
            });
        let id = self.next_id();
        let comment = PrComment {
            id,
            body: body.to_string(),
            html_url: Some(format!("{}#issuecomment-{id}", pr.html_url())),
        };
        self.comments
            .lock()
            .unwrap()
            .entry(pr.number)
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn merge_pr(&self, pr: &PullRequestDetails, request: &MergeRequest) -> Result<MergeResult> {
        self.merge_pr_calls.lock().unwrap().push(MergePrCall {
            pr_number: pr.number,
            request: request.clone(),
        });

        if let Some((status, body)) = self.error_on_merge_pr.lock().unwrap().get(&pr.number) {
            return Err(Error::Remote {
                status: *status,
                body: body.clone(),
            });
        }

        Ok(self
            .merge_responses
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_else(|| MergeResult {
                merged: true,
                sha: Some(format!("merge-sha-{}", pr.number)),
                message: Some("Pull Request successfully merged".to_string()),
            }))
    }
}
