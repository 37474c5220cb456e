use std::io::Write;

use crate::context::AppContext;
use crate::domain::issue::Milestone;
use crate::error::AppResult;
use crate::workflow::audit::{AuditOutcome, audit_milestone};

#[derive(Debug, Clone)]
pub struct AuditCommandArgs {
    pub target_milestone: String,
    pub old_rev: String,
    pub new_rev: String,
}

pub async fn run(ctx: &AppContext, args: AuditCommandArgs) -> AppResult<AuditOutcome> {
    let milestone = Milestone(args.target_milestone);
    audit_milestone(ctx, milestone, &args.old_rev, &args.new_rev).await
}

pub fn render(outcome: &AuditOutcome, out: &mut impl Write) -> AppResult<()> {
    let milestone = &outcome.milestone;

    for hash in &outcome.diff.missing_refs {
        writeln!(out, "WARNING missing bug message in git log: {hash}")?;
    }
    for num in &outcome.diff.only_old {
        writeln!(
            out,
            "WARNING {num} is only in old rev, and may not be in the new rev"
        )?;
    }

    let rec = &outcome.reconciliation;
    for num in &rec.landed_and_targeted {
        writeln!(out, "OK {num} in git is in target milestone {milestone}")?;
    }
    for num in &rec.targeted_not_landed {
        writeln!(
            out,
            "WARNING {num} is in target milestone {milestone} but not in git"
        )?;
    }
    for num in &rec.landed_not_targeted {
        writeln!(
            out,
            "ERROR {num} is in git but not in target milestone {milestone}"
        )?;
    }

    Ok(())
}
