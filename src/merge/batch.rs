//! One batch pass over a repository's open PRs

use crate::config::MergeOptions;
use crate::error::Result;
use crate::merge::eligibility::{
    Decision, EligibilityFilters, evaluate_pr, needs_status_checks, screen_summary,
};
use crate::merge::execute::{MergeOutcome, execute_merge};
use crate::platform::PlatformService;
use crate::policy::resolve_policy;
use crate::progress::ProgressCallback;
use crate::types::{Policy, RepositoryRef, StatusSummary};
use tracing::debug;

/// Merge action taken on one accepted PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// PR number
    pub pr_number: u64,
    /// What happened
    pub outcome: MergeOutcome,
}

/// Everything that happened in one batch pass
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Policy the batch ran under
    pub policy: Policy,
    /// One decision per PR looked at, in processing order
    pub decisions: Vec<Decision>,
    /// Merge actions, in processing order
    pub outcomes: Vec<BatchOutcome>,
    /// Whether the only-one rule cut the batch short
    pub stopped_early: bool,
}

impl BatchReport {
    /// Count of merge actions that took effect
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_success())
            .count()
    }
}

/// Run one batch pass over a repository (EFFECTFUL)
///
/// Resolves the policy, then walks the open PRs least recently updated
/// first: screen, fetch detail, evaluate, and act on accepted PRs. Every
/// call is sequential. After a successful merge under `only_one` the loop
/// stops before fetching anything for the next PR.
pub async fn run_batch(
    platform: &dyn PlatformService,
    repo: &RepositoryRef,
    options: &MergeOptions,
    dry_run: bool,
    progress: &dyn ProgressCallback,
) -> Result<BatchReport> {
    let resolved = resolve_policy(platform, repo, options).await?;
    progress.on_policy(&resolved).await;

    let policy = resolved.policy;
    let filters = EligibilityFilters::from_options(options);

    let mut report = BatchReport {
        policy,
        decisions: Vec::new(),
        outcomes: Vec::new(),
        stopped_early: false,
    };

    let prs = platform.list_open_pull_requests(repo).await?;

    for pr in &prs {
        if let Some(decision) = screen_summary(pr)? {
            debug!(pr_number = pr.number, "skipping locked PR");
            progress.on_decision(&decision).await;
            report.decisions.push(decision);
            continue;
        }

        let details = platform.get_pr_details(pr).await?;
        let statuses = if needs_status_checks(&details) {
            StatusSummary::from_newest_first(&platform.list_statuses(&details).await?)
        } else {
            StatusSummary::default()
        };

        let decision = evaluate_pr(&policy, &filters, &details, &statuses)?;
        debug!(
            pr_number = details.number,
            accepted = decision.is_accept(),
            reason = decision.reason().unwrap_or_default(),
            "evaluated PR"
        );
        progress.on_decision(&decision).await;
        let accepted = decision.is_accept();
        report.decisions.push(decision);

        if !accepted {
            continue;
        }

        let outcome = execute_merge(&details, &policy, platform, dry_run).await?;
        progress.on_outcome(&details, &outcome).await;
        let stop = outcome.stops_batch(&policy);
        report.outcomes.push(BatchOutcome {
            pr_number: details.number,
            outcome,
        });

        if stop {
            debug!(pr_number = details.number, "only one merge per run, stopping");
            progress.on_only_one_stop().await;
            report.stopped_early = true;
            break;
        }
    }

    Ok(report)
}
