//! Merge policy resolution
//!
//! Works out, once per repository, how accepted PRs get merged: merge
//! method, whether bors gates the branch, whether only one merge may happen
//! per run and whether a formal approval is needed.

use crate::config::MergeOptions;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    BorsConfig, BranchProtection, MergeMethod, Policy, Repository, RepositoryRef,
};
use tracing::debug;

/// Conventional location of the bors configuration file
pub const BORS_CONFIG_PATH: &str = "bors.toml";

/// Status check context that marks a branch as bors-gated
pub const BORS_CONTEXT: &str = "bors";

/// Everything learned while resolving the policy
#[derive(Debug, Clone)]
pub struct ResolvedPolicy {
    /// Repository metadata
    pub repository: Repository,
    /// Branch whose protection was inspected
    pub branch: String,
    /// Protection rules (`None` if the branch is unprotected)
    pub protection: Option<BranchProtection>,
    /// The effective policy
    pub policy: Policy,
}

/// Derive the policy from branch protection and explicit overrides (PURE)
///
/// Does not consult `bors.toml`; see [`apply_bors_config`].
pub fn derive_policy(
    protection: Option<&BranchProtection>,
    options: &MergeOptions,
) -> Result<Policy> {
    let by_bors = protection.is_some_and(|p| {
        p.required_status_check_contexts
            .iter()
            .any(|c| c == BORS_CONTEXT)
    });

    let only_one = options
        .only_one
        .unwrap_or_else(|| protection.is_some_and(|p| p.strict_required));

    let merge_method = options.merge_method.unwrap_or(if by_bors {
        MergeMethod::Bors
    } else {
        MergeMethod::Merge
    });

    if by_bors && merge_method != MergeMethod::Bors {
        return Err(Error::PolicyConflict(merge_method.to_string()));
    }

    let requires_approval = options
        .requires_approval
        .unwrap_or_else(|| protection.is_some_and(|p| p.requires_pull_request_reviews));

    Ok(Policy {
        merge_method,
        by_bors,
        only_one,
        requires_approval,
    })
}

/// Whether `bors.toml` has to be consulted for the approval requirement
pub const fn needs_bors_config(policy: &Policy) -> bool {
    policy.by_bors && !policy.requires_approval
}

/// Fold the bors approval requirement into the policy (PURE)
pub const fn apply_bors_config(policy: Policy, bors: &BorsConfig) -> Policy {
    Policy {
        requires_approval: policy.requires_approval || bors.required_approvals > 0,
        ..policy
    }
}

/// Parse `bors.toml` text
pub fn parse_bors_config(content: &str) -> Result<BorsConfig> {
    toml::from_str(content)
        .map_err(|e| Error::Config(format!("failed to parse {BORS_CONFIG_PATH}: {e}")))
}

/// Resolve the merge policy for a repository (EFFECTFUL)
///
/// Fails with `RepositoryNotFound` if the repository does not exist and with
/// `PolicyConflict` if a bors-gated branch was configured with another merge
/// method. Both happen before any PR is looked at.
pub async fn resolve_policy(
    platform: &dyn PlatformService,
    repo: &RepositoryRef,
    options: &MergeOptions,
) -> Result<ResolvedPolicy> {
    let repository = platform.get_repository(repo).await?;

    let branch = options
        .main_branch
        .clone()
        .unwrap_or_else(|| repository.default_branch.clone());

    let protection = platform.get_branch_protection(repo, &branch).await?;
    let mut policy = derive_policy(protection.as_ref(), options)?;

    if needs_bors_config(&policy) {
        let bors = match platform.get_file_content(repo, BORS_CONFIG_PATH).await? {
            Some(content) => parse_bors_config(&content)?,
            None => {
                debug!(%repo, "no {BORS_CONFIG_PATH}, assuming no required approvals");
                BorsConfig::default()
            }
        };
        policy = apply_bors_config(policy, &bors);
    }

    debug!(
        %repo,
        branch,
        merge_method = %policy.merge_method,
        by_bors = policy.by_bors,
        only_one = policy.only_one,
        requires_approval = policy.requires_approval,
        "resolved merge policy"
    );

    Ok(ResolvedPolicy {
        repository,
        branch,
        protection,
        policy,
    })
}
