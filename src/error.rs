use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("version control error: {0}")]
    VersionControl(String),
    #[error("git log {range} exited non-zero: {status}")]
    LogFailed { range: String, status: i32 },
    #[error("report fetch failed: {0}")]
    ReportFetch(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Process exit status for this error. A failed `git log` hands its own
    /// status through when it fits in a byte.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::LogFailed { status, .. } if (1..=255).contains(status) => *status,
            _ => 1,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
