//! Core types for justmerge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Identifies the repository a run targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryRef {
    /// Create a new repository reference
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository metadata, as much of it as we use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`
    pub full_name: String,
    /// Branch the hosting service reports as default
    pub default_branch: String,
}

// =============================================================================
// Policy inputs
// =============================================================================

/// Branch protection rules relevant to merging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchProtection {
    /// Status check contexts that must pass
    pub required_status_check_contexts: Vec<String>,
    /// Whether the branch must be up to date before merging
    pub strict_required: bool,
    /// Whether pull request reviews are required
    pub requires_pull_request_reviews: bool,
}

/// The subset of `bors.toml` we care about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BorsConfig {
    /// Number of approvals bors waits for (zero or negative means none)
    #[serde(default)]
    pub required_approvals: i64,
}

/// How an accepted pull request gets merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
    /// Ask bors to merge it with an `r+` comment or approval
    Bors,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
            Self::Bors => write!(f, "bors"),
        }
    }
}

impl FromStr for MergeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            "bors" => Ok(Self::Bors),
            other => Err(Error::Config(format!("unknown merge method '{other}'"))),
        }
    }
}

/// Effective merge policy for one repository run
///
/// Built once by [`crate::policy::resolve_policy`] and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Policy {
    /// Merge action to perform on accepted PRs
    pub merge_method: MergeMethod,
    /// Branch protection requires a passing `bors` status
    pub by_bors: bool,
    /// Stop the batch after the first successful merge
    pub only_one: bool,
    /// A formal approval is needed before merging
    pub requires_approval: bool,
}

// =============================================================================
// Pull requests
// =============================================================================

/// A hypermedia link (`{"href": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL
    pub href: String,
}

/// The `_links` block of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrLinks {
    /// Web page
    pub html: Link,
    /// Issue comments
    pub comments: Link,
    /// Commit statuses of the head commit
    pub statuses: Link,
}

/// PR author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name, e.g. `renovate[bot]`
    pub login: String,
}

/// A label attached to a PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
}

/// Head commit reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadRef {
    /// Commit SHA
    pub sha: String,
}

/// PR state (open, closed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed (merged or not)
    Closed,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Coarse mergeability summary reported by GitHub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    /// Can be merged right away
    Clean,
    /// Has conflicts
    Dirty,
    /// Blocked by required checks or reviews
    Blocked,
    /// Not computed yet
    Unknown,
    /// Mergeable, but non-required checks are failing
    Unstable,
    /// Head branch is behind its base
    Behind,
    /// Mergeable with passing commit status and pre-receive hooks
    HasHooks,
    /// Draft PR
    Draft,
    /// Anything GitHub adds later
    #[serde(other)]
    Other,
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Blocked => "blocked",
            Self::Unknown => "unknown",
            Self::Unstable => "unstable",
            Self::Behind => "behind",
            Self::HasHooks => "has_hooks",
            Self::Draft => "draft",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// A pull request as returned by the list endpoint
///
/// This is a stale summary: it lacks `mergeable` and must not be used for
/// eligibility checks. Fetch [`PullRequestDetails`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// API URL of the PR
    pub url: String,
    /// PR title
    pub title: String,
    /// PR author
    pub user: User,
    /// Whether conversation is locked
    pub locked: bool,
    /// Current state
    pub state: PrState,
    /// Last update time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Hypermedia links
    #[serde(rename = "_links")]
    pub links: PrLinks,
}

impl PullRequest {
    /// Web URL of the PR
    pub fn html_url(&self) -> &str {
        &self.links.html.href
    }

    /// `'title' by login`, as shown in every report line
    pub fn describe(&self) -> String {
        format!("'{}' by {}", self.title, self.user.login)
    }
}

/// Full PR detail, fetched per PR right before evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// PR number
    pub number: u64,
    /// API URL of the PR
    pub url: String,
    /// PR title
    pub title: String,
    /// PR body/description
    #[serde(default)]
    pub body: Option<String>,
    /// PR author
    pub user: User,
    /// Whether conversation is locked
    pub locked: bool,
    /// Current state
    pub state: PrState,
    /// Whether the PR can be merged (`None` while GitHub is still computing)
    #[serde(default)]
    pub mergeable: Option<bool>,
    /// Coarse mergeability summary
    pub mergeable_state: MergeableState,
    /// Head commit
    pub head: HeadRef,
    /// Labels on the PR
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Last update time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Hypermedia links
    #[serde(rename = "_links")]
    pub links: PrLinks,
}

impl PullRequestDetails {
    /// Web URL of the PR
    pub fn html_url(&self) -> &str {
        &self.links.html.href
    }

    /// Reviews endpoint (not part of `_links`)
    pub fn reviews_url(&self) -> String {
        format!("{}/reviews", self.url)
    }

    /// Merge endpoint
    pub fn merge_url(&self) -> String {
        format!("{}/merge", self.url)
    }

    /// `'title' by login`, as shown in every report line
    pub fn describe(&self) -> String {
        format!("'{}' by {}", self.title, self.user.login)
    }
}

// =============================================================================
// Checks, reviews, comments
// =============================================================================

/// One commit status report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Check context name, e.g. `ci/circleci` or `bors`
    pub context: String,
    /// `success`, `pending`, `failure` or `error`
    pub state: String,
}

/// Latest state per status check context
///
/// Built from statuses listed newest first: the first report seen for a
/// context wins and later (older) ones are ignored. Contexts keep the order
/// in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    entries: Vec<(String, String)>,
}

impl StatusSummary {
    /// Collapse a newest-first status list to the latest state per context
    pub fn from_newest_first<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a CommitStatus>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for status in statuses {
            if !entries.iter().any(|(ctx, _)| *ctx == status.context) {
                entries.push((status.context.clone(), status.state.clone()));
            }
        }
        Self { entries }
    }

    /// Whether every context's latest state is `success` (true when empty)
    pub fn all_successful(&self) -> bool {
        self.entries.iter().all(|(_, state)| state == "success")
    }

    /// Contexts whose latest state is not `success`, in first-seen order
    pub fn failing(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(_, state)| state != "success")
            .map(|(ctx, state)| (ctx.as_str(), state.as_str()))
    }
}

/// An existing review on a PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID
    pub id: u64,
    /// `APPROVED`, `COMMENTED`, ...
    #[serde(default)]
    pub state: Option<String>,
    /// Review body text
    #[serde(default)]
    pub body: Option<String>,
    /// Web URL of the review
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Payload for creating a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRequest {
    /// Head commit being reviewed
    pub commit_id: String,
    /// Review body
    pub body: String,
    /// `APPROVE`, `COMMENT` or `REQUEST_CHANGES`
    pub event: String,
}

/// A comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Comment body text
    #[serde(default)]
    pub body: String,
    /// Web URL of the comment
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Payload for the merge endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequest {
    /// `merge`, `squash` or `rebase`
    pub merge_method: MergeMethod,
    /// Commit title (the PR title)
    pub commit_title: String,
    /// Commit message (the PR body)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    /// Head SHA the merge is expected to apply to
    pub sha: String,
}

/// Result of a merge operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    #[serde(default)]
    pub sha: Option<String>,
    /// Message from the merge operation
    #[serde(default)]
    pub message: Option<String>,
}
