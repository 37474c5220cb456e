use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Normalized issue number, kept as its digit string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueRef(pub String);

impl IssueRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Shorter digit strings sort first so plain numbers print in numeric order.
impl Ord for IssueRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for IssueRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type IssueSet = BTreeSet<IssueRef>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone(pub String);

impl Milestone {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Commits reachable from `to` but not from `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRange {
    pub from: String,
    pub to: String,
}

impl RevisionRange {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

impl fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}
