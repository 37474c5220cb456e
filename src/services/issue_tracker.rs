use async_trait::async_trait;

use crate::domain::issue::{IssueSet, Milestone};
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn milestone_issues(&self, milestone: &Milestone) -> AppResult<IssueSet>;
}
