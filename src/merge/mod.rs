//! Merge engine for ready pull requests
//!
//! Three-phase pattern per PR:
//! 1. Gather - fetch PR detail and, when needed, status checks (effectful)
//! 2. Evaluate - decide accept/reject (pure, testable)
//! 3. Execute - perform the merge action (effectful)

mod batch;
mod eligibility;
mod execute;

pub use batch::{BatchOutcome, BatchReport, run_batch};
pub use eligibility::{
    Decision, EligibilityFilters, Verdict, author_included, blocked_override, evaluate_pr,
    excluded_label, needs_status_checks, screen_summary,
};
pub use execute::{BORS_COMMENT, BORS_TRIGGER, MergeOutcome, execute_merge};
