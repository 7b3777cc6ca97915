//! Progress reporting for a merge run
//!
//! The batch loop reports every step through [`ProgressCallback`]; the CLI
//! decides what to print (rejections only in verbose mode).

use crate::merge::{Decision, MergeOutcome};
use crate::policy::ResolvedPolicy;
use crate::types::PullRequestDetails;
use async_trait::async_trait;

/// Receives progress events from a merge run
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Policy was resolved, before any PR is looked at
    async fn on_policy(&self, resolved: &ResolvedPolicy);

    /// A PR was accepted or rejected
    async fn on_decision(&self, decision: &Decision);

    /// A merge action finished for an accepted PR
    async fn on_outcome(&self, pr: &PullRequestDetails, outcome: &MergeOutcome);

    /// The batch stopped early because only one merge is allowed per run
    async fn on_only_one_stop(&self);
}

/// Progress callback that ignores everything
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_policy(&self, _resolved: &ResolvedPolicy) {}
    async fn on_decision(&self, _decision: &Decision) {}
    async fn on_outcome(&self, _pr: &PullRequestDetails, _outcome: &MergeOutcome) {}
    async fn on_only_one_stop(&self) {}
}
