use async_trait::async_trait;

use crate::domain::issue::RevisionRange;
use crate::error::AppResult;

#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// One-line commit summaries (`<short hash> <subject>`) for the range.
    async fn commit_summaries(&self, range: &RevisionRange) -> AppResult<Vec<String>>;
}
