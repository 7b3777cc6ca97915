//! Merge eligibility - pure functions deciding whether a PR may be merged
//!
//! No I/O happens here. The caller fetches the PR detail (and the status
//! summary, when [`needs_status_checks`] says so) and passes them in, which
//! makes every rule testable without a network.

use crate::config::MergeOptions;
use crate::error::{Error, Result};
use crate::types::{
    MergeableState, Policy, PrState, PullRequest, PullRequestDetails, StatusSummary,
};
use chrono::{DateTime, Utc};

/// Suffix GitHub appends to app/bot logins
const BOT_SUFFIX: &str = "[bot]";

/// Label and author filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityFilters {
    /// PRs carrying any of these labels are rejected
    pub exclusion_labels: Vec<String>,
    /// When non-empty, only these authors' PRs are accepted
    pub inclusion_users: Vec<String>,
}

impl EligibilityFilters {
    /// Build filters from config, applying defaults for absent keys
    pub fn from_options(options: &MergeOptions) -> Self {
        Self {
            exclusion_labels: options.exclusion_labels(),
            inclusion_users: options.inclusion_users(),
        }
    }
}

impl Default for EligibilityFilters {
    fn default() -> Self {
        Self::from_options(&MergeOptions::default())
    }
}

/// Outcome of evaluating one PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// All predicates passed
    Accept,
    /// A predicate failed
    Reject {
        /// Why, for verbose output (`None` for locked PRs)
        reason: Option<String>,
    },
}

/// Decision for one PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// PR number
    pub pr_number: u64,
    /// Web URL of the PR
    pub html_url: String,
    /// `'title' by login`
    pub description: String,
    /// When the PR was last updated, if GitHub said
    pub updated_at: Option<DateTime<Utc>>,
    /// Accept or reject
    pub verdict: Verdict,
}

impl Decision {
    fn new(pr: &PullRequestDetails, verdict: Verdict) -> Self {
        Self {
            pr_number: pr.number,
            html_url: pr.html_url().to_string(),
            description: pr.describe(),
            updated_at: pr.updated_at,
            verdict,
        }
    }

    fn from_summary(pr: &PullRequest, verdict: Verdict) -> Self {
        Self {
            pr_number: pr.number,
            html_url: pr.html_url().to_string(),
            description: pr.describe(),
            updated_at: pr.updated_at,
            verdict,
        }
    }

    /// Whether the PR was accepted
    pub const fn is_accept(&self) -> bool {
        matches!(self.verdict, Verdict::Accept)
    }

    /// Rejection reason, if any
    pub fn reason(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Reject { reason } => reason.as_deref(),
            Verdict::Accept => None,
        }
    }
}

/// Screen a PR from the list endpoint before fetching its detail (PURE)
///
/// Locked PRs are rejected here so their detail is never fetched. A listed
/// PR that is not open is an internal inconsistency.
pub fn screen_summary(pr: &PullRequest) -> Result<Option<Decision>> {
    if pr.locked {
        return Ok(Some(Decision::from_summary(
            pr,
            Verdict::Reject { reason: None },
        )));
    }
    if pr.state != PrState::Open {
        return Err(Error::Inconsistent(format!(
            "PR #{} was returned by the open PR list but is {}",
            pr.number, pr.state
        )));
    }
    Ok(None)
}

/// Whether the evaluator will look at status checks for this PR
///
/// True only for mergeable PRs whose mergeable state is not `clean`; the
/// caller should skip the statuses fetch otherwise.
pub fn needs_status_checks(pr: &PullRequestDetails) -> bool {
    !pr.locked && pr.mergeable == Some(true) && pr.mergeable_state != MergeableState::Clean
}

/// First exclusion label found on the PR (case-sensitive exact match)
pub fn excluded_label<'a>(pr: &'a PullRequestDetails, exclusion_labels: &[String]) -> Option<&'a str> {
    pr.labels
        .iter()
        .map(|l| l.name.as_str())
        .find(|name| exclusion_labels.iter().any(|ex| ex == name))
}

/// Whether `login` is in `inclusion_users`, also trying it without `[bot]`
///
/// An empty list includes everyone.
pub fn author_included(login: &str, inclusion_users: &[String]) -> bool {
    if inclusion_users.is_empty() {
        return true;
    }
    let stripped = login.strip_suffix(BOT_SUFFIX);
    inclusion_users
        .iter()
        .any(|u| u == login || stripped.is_some_and(|s| u == s))
}

/// Whether a blocked PR may proceed anyway
///
/// On a bors-gated branch the `bors` status is expected to be the one
/// thing blocking, so a PR with all other checks green can go ahead.
pub fn blocked_override(policy: &Policy, statuses: &StatusSummary) -> bool {
    policy.by_bors && statuses.all_successful()
}

fn reject(pr: &PullRequestDetails, reason: Option<String>) -> Decision {
    Decision::new(pr, Verdict::Reject { reason })
}

/// Evaluate one PR against the policy and filters (PURE)
///
/// Predicates run in a fixed order and the first failure wins: locked,
/// open state, mergeable, clean merge state (with the bors blocked
/// override), exclusion labels, inclusion users.
///
/// `statuses` is only read when the mergeable state is not `clean`.
/// A PR that is not open is an internal inconsistency and returns
/// `Error::Inconsistent` rather than a rejection.
pub fn evaluate_pr(
    policy: &Policy,
    filters: &EligibilityFilters,
    pr: &PullRequestDetails,
    statuses: &StatusSummary,
) -> Result<Decision> {
    if pr.locked {
        return Ok(reject(pr, None));
    }

    if pr.state != PrState::Open {
        return Err(Error::Inconsistent(format!(
            "PR #{} was listed as open but its detail says {}",
            pr.number, pr.state
        )));
    }

    if pr.mergeable != Some(true) {
        let reason = match (pr.mergeable, &pr.mergeable_state) {
            (_, MergeableState::Dirty) => "Dirty!".to_string(),
            (None, _) => "mergeability not computed yet".to_string(),
            (Some(_), state) => format!("not mergeable (state: '{state}')"),
        };
        return Ok(reject(pr, Some(reason)));
    }

    if pr.mergeable_state != MergeableState::Clean {
        let ignore_blocked =
            pr.mergeable_state == MergeableState::Blocked && blocked_override(policy, statuses);
        if !ignore_blocked {
            let mut reason = format!("mergeable state: '{}'", pr.mergeable_state);
            for (context, state) in statuses.failing() {
                reason.push_str(&format!(" [{context}={state}]"));
            }
            return Ok(reject(pr, Some(reason)));
        }
    }

    if let Some(label) = excluded_label(pr, &filters.exclusion_labels) {
        return Ok(reject(pr, Some(format!("exclusion label '{label}'"))));
    }

    if !author_included(&pr.user.login, &filters.inclusion_users) {
        return Ok(reject(
            pr,
            Some(format!(
                "exclusion user {} != {{{}}}",
                pr.user.login,
                filters.inclusion_users.join(", ")
            )),
        ));
    }

    Ok(Decision::new(pr, Verdict::Accept))
}
