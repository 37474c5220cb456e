use std::sync::LazyLock;

use regex::Regex;

use crate::domain::issue::{IssueRef, IssueSet};

const ISSUE_PATTERN: &str = r"(?i)bug\s?[0-9]+";
const MERGE_MARKER: &str = "Merge";

static ISSUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ISSUE_PATTERN).expect("issue pattern is a valid regex"));

/// Issue references found in a batch of `git log --oneline` lines, plus the
/// leading token of every non-merge commit that carried none.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub issues: IssueSet,
    pub missing_refs: Vec<String>,
}

pub fn scan_commit_lines<I, S>(lines: I) -> ScanOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcome = ScanOutcome::default();

    for line in lines {
        let message = line.as_ref().trim();
        if message.is_empty() {
            continue;
        }

        let found = issue_refs(message);
        if found.is_empty() {
            if !message.contains(MERGE_MARKER) {
                let hash = message.split_whitespace().next().unwrap_or_default();
                outcome.missing_refs.push(hash.to_string());
            }
        } else {
            outcome.issues.extend(found);
        }
    }

    outcome
}

pub fn issue_refs(message: &str) -> Vec<IssueRef> {
    ISSUE_REGEX
        .find_iter(message)
        .filter_map(|m| normalize(m.as_str()))
        .collect()
}

fn normalize(token: &str) -> Option<IssueRef> {
    let lowered = token.to_lowercase();
    let digits = lowered.split("bug").nth(1)?.trim();
    if digits.is_empty() {
        None
    } else {
        Some(IssueRef::new(digits))
    }
}
