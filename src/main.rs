mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod telemetry;
mod workflow;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use crate::cmd::audit::{self, AuditCommandArgs};
use crate::config::{AppConfig, ConfigInputs};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::bugzilla::BugzillaClient;
use crate::infra::git::GitCli;

const OUTPUT_HELP: &str = "\
Output lines:
  WARNING missing bug message in git log: <sha>
      A non-merge commit in the range has no bug number.
  OK <bug> in git is in target milestone <milestone>
      The bug is referenced in the range and targeted at the milestone.
  WARNING <bug> is in target milestone <milestone> but not in git
      Targeted but not found in the range. It may not have landed, the commit
      may lack the bug number, or it landed on another branch.
  WARNING <bug> is only in old rev, and may not be in the new rev
      Referenced in old-rev but not new-rev; it probably only landed on old-rev.
  ERROR <bug> is in git but not in target milestone <milestone>
      Referenced in the range but not targeted. Check whether the bug is
      mistargeted or the commit was reapplied by accident.

Example:
  milestone-audit --target-milestone=2.4 --old-rev=v2.3.5.1 --new-rev=master";

#[derive(Parser)]
#[command(
    name = "milestone-audit",
    author,
    version,
    about = "Compare bug numbers in a git revision range with a Bugzilla target milestone",
    after_help = OUTPUT_HELP
)]
struct Cli {
    /// Target milestone to check in Bugzilla.
    #[arg(short = 't', long)]
    target_milestone: String,
    /// Old git revision.
    #[arg(short, long)]
    old_rev: String,
    /// New git revision.
    #[arg(short, long)]
    new_rev: String,
    /// Bugzilla base URL.
    #[arg(long, env = "MILESTONE_AUDIT_TRACKER_URL")]
    tracker_url: Option<String>,
    /// Bugzilla product the milestone belongs to.
    #[arg(long, env = "MILESTONE_AUDIT_PRODUCT")]
    product: Option<String>,
    /// Repository to read history from (defaults to the current directory).
    #[arg(short = 'C', long = "repo")]
    repo: Option<PathBuf>,
    /// Seconds to wait for each `git log` before giving up.
    #[arg(long)]
    git_timeout_secs: Option<u64>,
    /// Seconds to wait for the milestone report before giving up.
    #[arg(long)]
    http_timeout_secs: Option<u64>,
    /// Diagnostic log format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Increase diagnostic logging (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Extra arguments passed to `git log` after the revision range.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    git_log_args: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init_tracing(
        cli.log_format == LogFormat::Json,
        telemetry::level_for_verbosity(cli.verbose),
    );

    if let Err(error) = run(cli).await {
        eprintln!("Error: {error}");
        std::process::exit(error.exit_code());
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(ConfigInputs {
        tracker_url: cli.tracker_url,
        product: cli.product,
        workspace_root: cli.repo,
        git_timeout_secs: cli.git_timeout_secs,
        http_timeout_secs: cli.http_timeout_secs,
        extra_log_args: cli.git_log_args,
    })?;

    let git = Arc::new(GitCli::new(
        config.workspace_root.clone(),
        config.git_timeout,
        config.extra_log_args.clone(),
    ));
    let issue_tracker = Arc::new(BugzillaClient::new(
        config.tracker_url.clone(),
        config.product.clone(),
        config.http_timeout,
    )?);

    let context = AppContext::new(config, git, issue_tracker);

    let outcome = audit::run(
        &context,
        AuditCommandArgs {
            target_milestone: cli.target_milestone,
            old_rev: cli.old_rev,
            new_rev: cli.new_rev,
        },
    )
    .await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    audit::render(&outcome, &mut out)?;
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn requires_milestone_and_revisions() {
        let err = Cli::try_parse_from(["milestone-audit", "-o", "v1", "-n", "v2"])
            .err()
            .expect("missing milestone should fail");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn collects_trailing_git_log_args() {
        let cli = Cli::try_parse_from([
            "milestone-audit",
            "-t",
            "2.4",
            "-o",
            "v1",
            "-n",
            "v2",
            "--",
            "--first-parent",
            "src/",
        ])
        .unwrap();
        assert_eq!(cli.target_milestone, "2.4");
        assert_eq!(cli.git_log_args, vec!["--first-parent", "src/"]);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
