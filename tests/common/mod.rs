//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{CreateCommentCall, CreateReviewCall, MergePrCall, MockPlatformService};

use justmerge::types::{
    BranchProtection, HeadRef, Label, Link, MergeableState, PrLinks, PrState, PullRequest,
    PullRequestDetails, RepositoryRef, User,
};

pub const OWNER: &str = "peterbe";
pub const REPO: &str = "example";

pub fn repo_ref() -> RepositoryRef {
    RepositoryRef::new(OWNER, REPO)
}

/// Mock for `peterbe/example` with default branch `main`
pub fn mock_repo() -> MockPlatformService {
    MockPlatformService::with_repo(&format!("{OWNER}/{REPO}"), "main")
}

pub fn protection(contexts: &[&str], strict: bool, reviews: bool) -> BranchProtection {
    BranchProtection {
        required_status_check_contexts: contexts.iter().map(ToString::to_string).collect(),
        strict_required: strict,
        requires_pull_request_reviews: reviews,
    }
}

fn api_url(number: u64) -> String {
    format!("https://api.github.com/repos/{OWNER}/{REPO}/pulls/{number}")
}

fn links(number: u64) -> PrLinks {
    PrLinks {
        html: Link {
            href: format!("https://github.com/{OWNER}/{REPO}/pull/{number}"),
        },
        comments: Link {
            href: format!("https://api.github.com/repos/{OWNER}/{REPO}/issues/{number}/comments"),
        },
        statuses: Link {
            href: format!("https://api.github.com/repos/{OWNER}/{REPO}/statuses/sha{number}"),
        },
    }
}

/// PR as returned by the list endpoint
pub fn make_summary_pr(number: u64, login: &str) -> PullRequest {
    PullRequest {
        number,
        url: api_url(number),
        title: format!("Update dependency {number}"),
        user: User {
            login: login.to_string(),
        },
        locked: false,
        state: PrState::Open,
        updated_at: None,
        links: links(number),
    }
}

/// Clean, mergeable PR detail
pub fn make_details(number: u64, login: &str) -> PullRequestDetails {
    PullRequestDetails {
        number,
        url: api_url(number),
        title: format!("Update dependency {number}"),
        body: Some("Bumps the thing".to_string()),
        user: User {
            login: login.to_string(),
        },
        locked: false,
        state: PrState::Open,
        mergeable: Some(true),
        mergeable_state: MergeableState::Clean,
        head: HeadRef {
            sha: format!("sha{number}"),
        },
        labels: Vec::new(),
        updated_at: None,
        links: links(number),
    }
}

pub fn with_labels(mut details: PullRequestDetails, labels: &[&str]) -> PullRequestDetails {
    details.labels = labels
        .iter()
        .map(|name| Label {
            name: (*name).to_string(),
        })
        .collect();
    details
}

/// Add a clean, mergeable PR to the mock
pub fn add_ready_pr(mock: &MockPlatformService, number: u64, login: &str) {
    mock.add_pr(make_summary_pr(number, login), make_details(number, login));
}
