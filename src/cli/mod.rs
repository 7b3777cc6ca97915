//! CLI output and commands

pub mod merge;
pub mod style;

use anstream::println;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use justmerge::merge::{Decision, MergeOutcome, Verdict};
use justmerge::policy::ResolvedPolicy;
use justmerge::progress::ProgressCallback;
use justmerge::types::PullRequestDetails;
use style::{Stylize, check, link};

/// Width of the label column in the policy summary
const LABEL_WIDTH: usize = 30;

/// Prints merge progress to the terminal
///
/// Accepted PRs and merge outcomes are always shown. Rejection reasons,
/// the resolved policy and response details only in verbose mode.
pub struct CliProgress {
    verbose: bool,
}

impl CliProgress {
    /// Create a progress printer
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

/// `updated YYYY-MM-DD HH:MM UTC`, shown next to PRs in verbose mode
fn updated_note(updated_at: Option<DateTime<Utc>>) -> Option<String> {
    updated_at.map(|ts| format!("updated {}", ts.format("%Y-%m-%d %H:%M UTC")))
}

fn policy_line(label: &str, value: impl std::fmt::Display) {
    println!("\t{:<width$}{}", format!("{label}:"), value.accent(), width = LABEL_WIDTH - 1);
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_policy(&self, resolved: &ResolvedPolicy) {
        if !self.verbose {
            return;
        }
        println!("Found repo {}", resolved.repository.full_name.emphasis());
        if resolved.protection.is_none() {
            println!(
                "{}",
                format!("Repo has no branch protections on '{}'. That's fine.", resolved.branch)
                    .muted()
            );
        }
        let policy = &resolved.policy;
        println!("Repo merge strategy...");
        policy_line("Branch", &resolved.branch);
        policy_line("Merge method", policy.merge_method);
        policy_line("By 'bors'", policy.by_bors);
        policy_line("One merge at a time", policy.only_one);
        policy_line("Requires review approval", policy.requires_approval);
        println!();
    }

    async fn on_decision(&self, decision: &Decision) {
        let note = updated_note(decision.updated_at)
            .filter(|_| self.verbose)
            .map(|n| format!(" ({n})").muted())
            .unwrap_or_default();
        match &decision.verdict {
            Verdict::Accept => println!(
                "{} is {} {}{note}",
                link(&decision.html_url),
                check(),
                decision.description
            ),
            // Locked PRs carry no reason and are never reported
            Verdict::Reject {
                reason: Some(reason),
            } if self.verbose => println!(
                "{} is NOT mergeable ({}) 😢 {}{note}",
                link(&decision.html_url),
                reason.warn(),
                decision.description
            ),
            Verdict::Reject { .. } => {}
        }
    }

    async fn on_outcome(&self, pr: &PullRequestDetails, outcome: &MergeOutcome) {
        let who = pr.describe();
        match outcome {
            MergeOutcome::DryRun => println!("{}", "Dry run. Not doing anything".muted()),
            MergeOutcome::Merged(result) if result.merged => {
                println!("{} 🎉 🎊 🚀 {who}", "Merged!".success());
                if self.verbose {
                    if let Some(sha) = &result.sha {
                        println!("\tMerge commit: {}", sha.accent());
                    }
                }
            }
            MergeOutcome::Merged(result) => println!(
                "{} {who}: {}",
                "Merge did not happen".warn(),
                result.message.as_deref().unwrap_or("no message").muted()
            ),
            MergeOutcome::BorsApproved { review_url } => {
                println!("{} 🎉 🎊 🤖 {who}", "Bors approved!!".success());
                if let (true, Some(url)) = (self.verbose, review_url) {
                    println!("\tApproval comment URL: {}", link(url));
                }
            }
            MergeOutcome::BorsCommented { comment_url } => {
                println!("{} 🎉 🎊 🤖 ☄️ {who}", "Bors commented!!".success());
                if let (true, Some(url)) = (self.verbose, comment_url) {
                    println!("\tComment URL: {}", link(url));
                }
            }
            MergeOutcome::AlreadyTriggered => println!(
                "⚠️  {who} {}",
                "already has a 'bors r+' comment".warn()
            ),
            MergeOutcome::MergeRefused { message } => {
                println!(
                    "🚨 {}",
                    "405 error from GitHub. Perhaps cached incorrectly.".warn()
                );
                if self.verbose {
                    println!("\t{}", message.muted());
                }
            }
        }
    }

    async fn on_only_one_stop(&self) {
        if self.verbose {
            println!();
            println!("{}", "But, remember... Only 1 merge at a time❗️".emphasis());
            println!();
        }
    }
}
