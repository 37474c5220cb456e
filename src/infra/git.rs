use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::issue::RevisionRange;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

pub struct GitCli {
    workspace_root: PathBuf,
    timeout: Duration,
    extra_args: Vec<String>,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf, timeout: Duration, extra_args: Vec<String>) -> Self {
        Self {
            workspace_root,
            timeout,
            extra_args,
        }
    }

    fn log_args(&self, range: &RevisionRange) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            "--oneline".to_string(),
            "--no-color".to_string(),
            "--no-decorate".to_string(),
            range.to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn commit_summaries(&self, range: &RevisionRange) -> AppResult<Vec<String>> {
        let args = self.log_args(range);
        info!(command = %format!("git {}", args.join(" ")), "running git log");

        let child = Command::new("git")
            .args(&args)
            .current_dir(&self.workspace_root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| AppError::VersionControl(format!("failed to run git: {err}")))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                AppError::VersionControl(format!(
                    "git log {range} timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(stderr = %stderr.trim(), "git log failed");
            return Err(AppError::LogFailed {
                range: range.to_string(),
                status: output.status.code().unwrap_or(-1),
            });
        }

        let lines = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect::<Vec<_>>();
        debug!(range = %range, commits = lines.len(), "git log finished");
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::process::Command as StdCommand;

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(["-c", "user.name=test-user", "-c", "user.email=test@example.com"])
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn make_git_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init", "-q"]);
        run_git(dir.path(), &["commit", "-q", "--allow-empty", "-m", "initial"]);
        run_git(dir.path(), &["tag", "base"]);
        run_git(dir.path(), &["commit", "-q", "--allow-empty", "-m", "Bug 7 fix parser"]);
        run_git(dir.path(), &["commit", "-q", "--allow-empty", "-m", "cleanup"]);
        dir
    }

    fn git_cli(root: &Path, extra_args: Vec<String>) -> GitCli {
        GitCli::new(root.to_path_buf(), Duration::from_secs(30), extra_args)
    }

    #[test]
    fn appends_extra_args_after_range() {
        let git = git_cli(Path::new("."), vec!["--".to_string(), "src/".to_string()]);
        let args = git.log_args(&RevisionRange::new("v1", "v2"));
        assert_eq!(
            args,
            vec![
                "log",
                "--oneline",
                "--no-color",
                "--no-decorate",
                "v1..v2",
                "--",
                "src/"
            ]
        );
    }

    #[tokio::test]
    async fn ignores_configured_ref_decorations() {
        let repo = make_git_repo();
        run_git(repo.path(), &["config", "log.decorate", "short"]);
        run_git(repo.path(), &["branch", "bug123-fix"]);
        let git = git_cli(repo.path(), Vec::new());

        let lines = git
            .commit_summaries(&RevisionRange::new("base", "HEAD"))
            .await
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| !line.contains("bug123")), "{lines:?}");
    }

    #[tokio::test]
    async fn lists_commits_in_range_newest_first() {
        let repo = make_git_repo();
        let git = git_cli(repo.path(), Vec::new());

        let lines = git
            .commit_summaries(&RevisionRange::new("base", "HEAD"))
            .await
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" cleanup"), "{lines:?}");
        assert!(lines[1].ends_with(" Bug 7 fix parser"), "{lines:?}");
    }

    #[tokio::test]
    async fn reversed_range_is_empty_for_ancestor() {
        let repo = make_git_repo();
        let git = git_cli(repo.path(), Vec::new());

        let lines = git
            .commit_summaries(&RevisionRange::new("HEAD", "base"))
            .await
            .unwrap();

        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn unknown_revision_reports_git_status() {
        let repo = make_git_repo();
        let git = git_cli(repo.path(), Vec::new());

        let err = git
            .commit_summaries(&RevisionRange::new("no-such-rev", "HEAD"))
            .await
            .unwrap_err();

        match err {
            AppError::LogFailed { range, status } => {
                assert_eq!(range, "no-such-rev..HEAD");
                assert_eq!(status, 128);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
