//! Merge execution - effectful operations
//!
//! Performs the merge action chosen by the policy on a PR the evaluator
//! accepted: pressing the merge button, or asking bors with an `r+`
//! comment or approval.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{MergeMethod, MergeRequest, MergeResult, Policy, PullRequestDetails, ReviewRequest};
use tracing::{debug, warn};

/// Substring that marks a comment as a bors merge request
pub const BORS_TRIGGER: &str = "bors r+";

/// Body of the comment/review we post to trigger bors
pub const BORS_COMMENT: &str = "bors r+\n\n(made with 'justmerge')\n";

/// Result of a merge action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Dry run, nothing was changed
    DryRun,
    /// The merge endpoint answered
    Merged(MergeResult),
    /// Posted an approving review carrying the bors trigger
    BorsApproved {
        /// Web URL of the review
        review_url: Option<String>,
    },
    /// Posted a plain bors trigger comment
    BorsCommented {
        /// Web URL of the comment
        comment_url: Option<String>,
    },
    /// A bors trigger comment already exists, nothing posted
    AlreadyTriggered,
    /// GitHub refused the merge with 405 (often stale cached mergeability)
    MergeRefused {
        /// Response body
        message: String,
    },
}

impl MergeOutcome {
    /// Whether a merge action actually took effect
    pub const fn is_success(&self) -> bool {
        match self {
            Self::Merged(result) => result.merged,
            Self::BorsApproved { .. } | Self::BorsCommented { .. } => true,
            Self::DryRun | Self::AlreadyTriggered | Self::MergeRefused { .. } => false,
        }
    }

    /// Whether the batch has to stop after this outcome
    ///
    /// Merging one PR can make sibling PRs out of date with the base branch,
    /// so under `only_one` nothing else is touched in this run.
    pub const fn stops_batch(&self, policy: &Policy) -> bool {
        policy.only_one && self.is_success()
    }
}

/// Execute the merge action for an accepted PR (EFFECTFUL)
///
/// In dry-run mode no call is made at all.
pub async fn execute_merge(
    pr: &PullRequestDetails,
    policy: &Policy,
    platform: &dyn PlatformService,
    dry_run: bool,
) -> Result<MergeOutcome> {
    if dry_run {
        debug!(pr_number = pr.number, "dry run, not merging");
        return Ok(MergeOutcome::DryRun);
    }

    match policy.merge_method {
        MergeMethod::Bors => request_bors_merge(pr, policy, platform).await,
        method @ (MergeMethod::Merge | MergeMethod::Squash | MergeMethod::Rebase) => {
            press_merge_button(pr, policy, method, platform).await
        }
    }
}

async fn request_bors_merge(
    pr: &PullRequestDetails,
    policy: &Policy,
    platform: &dyn PlatformService,
) -> Result<MergeOutcome> {
    let reviews = platform.list_reviews(pr).await?;
    if !reviews.is_empty() {
        // Can't tell a stale bors review from a conflicting one; stop rather than guess
        return Err(Error::UnsupportedFlow(format!(
            "PR #{} already has {} review(s); cannot tell whether bors was already asked",
            pr.number,
            reviews.len()
        )));
    }

    if policy.requires_approval {
        let review = platform
            .create_review(
                pr,
                &ReviewRequest {
                    commit_id: pr.head.sha.clone(),
                    body: BORS_COMMENT.to_string(),
                    event: "APPROVE".to_string(),
                },
            )
            .await?;
        debug!(pr_number = pr.number, review_id = review.id, "bors approved");
        return Ok(MergeOutcome::BorsApproved {
            review_url: review.html_url,
        });
    }

    let comments = platform.list_pr_comments(pr).await?;
    if comments.iter().any(|c| c.body.contains(BORS_TRIGGER)) {
        debug!(pr_number = pr.number, "bors r+ comment already present");
        return Ok(MergeOutcome::AlreadyTriggered);
    }

    let comment = platform.create_pr_comment(pr, BORS_COMMENT).await?;
    debug!(pr_number = pr.number, comment_id = comment.id, "bors commented");
    Ok(MergeOutcome::BorsCommented {
        comment_url: comment.html_url,
    })
}

async fn press_merge_button(
    pr: &PullRequestDetails,
    policy: &Policy,
    method: MergeMethod,
    platform: &dyn PlatformService,
) -> Result<MergeOutcome> {
    if policy.requires_approval {
        return Err(Error::UnsupportedFlow(format!(
            "PR #{} requires an approval before merging with '{method}', which is not implemented",
            pr.number
        )));
    }

    let request = MergeRequest {
        merge_method: method,
        commit_title: pr.title.clone(),
        commit_message: pr.body.clone(),
        sha: pr.head.sha.clone(),
    };

    match platform.merge_pr(pr, &request).await {
        Ok(result) => Ok(MergeOutcome::Merged(result)),
        Err(Error::Remote { status: 405, body }) => {
            warn!(pr_number = pr.number, "merge refused with 405");
            Ok(MergeOutcome::MergeRefused { message: body })
        }
        Err(e) => Err(e),
    }
}
