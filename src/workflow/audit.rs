use tracing::warn;

use crate::context::AppContext;
use crate::domain::issue::{IssueSet, Milestone, RevisionRange};
use crate::domain::scan::scan_commit_lines;
use crate::error::AppResult;

/// Issue references split by which side of a revision pair they landed on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RangeDiff {
    pub only_new: IssueSet,
    pub only_old: IssueSet,
    pub missing_refs: Vec<String>,
}

/// Landed references classified against the milestone's targeted issues.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub landed_and_targeted: IssueSet,
    pub targeted_not_landed: IssueSet,
    pub landed_not_targeted: IssueSet,
}

pub struct AuditOutcome {
    pub milestone: Milestone,
    pub diff: RangeDiff,
    pub reconciliation: Reconciliation,
}

pub async fn diff_revisions(ctx: &AppContext, old_rev: &str, new_rev: &str) -> AppResult<RangeDiff> {
    let forward = RevisionRange::new(old_rev, new_rev);
    let backward = forward.reversed();

    let extra_args = &ctx.config.extra_log_args;
    if !extra_args.is_empty() {
        warn!(args = ?extra_args, "extra git log arguments narrow both ranges");
    }

    let in_new = scan_commit_lines(ctx.version_control.commit_summaries(&forward).await?);
    let in_old = scan_commit_lines(ctx.version_control.commit_summaries(&backward).await?);

    let only_new = in_new.issues.difference(&in_old.issues).cloned().collect();
    let only_old = in_old.issues.difference(&in_new.issues).cloned().collect();

    let mut missing_refs = in_new.missing_refs;
    missing_refs.extend(in_old.missing_refs);

    Ok(RangeDiff {
        only_new,
        only_old,
        missing_refs,
    })
}

pub fn reconcile(landed: &IssueSet, targeted: &IssueSet) -> Reconciliation {
    Reconciliation {
        landed_and_targeted: landed.intersection(targeted).cloned().collect(),
        targeted_not_landed: targeted.difference(landed).cloned().collect(),
        landed_not_targeted: landed.difference(targeted).cloned().collect(),
    }
}

pub async fn audit_milestone(
    ctx: &AppContext,
    milestone: Milestone,
    old_rev: &str,
    new_rev: &str,
) -> AppResult<AuditOutcome> {
    let diff = diff_revisions(ctx, old_rev, new_rev).await?;
    let targeted = ctx.issue_tracker.milestone_issues(&milestone).await?;
    let reconciliation = reconcile(&diff.only_new, &targeted);

    Ok(AuditOutcome {
        milestone,
        diff,
        reconciliation,
    })
}
