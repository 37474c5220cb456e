use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, AppResult};

pub const DEFAULT_TRACKER_URL: &str = "https://bugzilla.mozilla.org";
pub const DEFAULT_PRODUCT: &str = "Socorro";
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tracker_url: Url,
    pub product: String,
    pub workspace_root: PathBuf,
    pub git_timeout: Duration,
    pub http_timeout: Duration,
    pub extra_log_args: Vec<String>,
}

/// Raw settings as they arrive from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigInputs {
    pub tracker_url: Option<String>,
    pub product: Option<String>,
    pub workspace_root: Option<PathBuf>,
    pub git_timeout_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
    pub extra_log_args: Vec<String>,
}

impl AppConfig {
    pub fn load(inputs: ConfigInputs) -> AppResult<Self> {
        let raw_url = inputs
            .tracker_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRACKER_URL.to_string());
        let tracker_url = Url::parse(raw_url.trim()).map_err(|err| {
            AppError::Configuration(format!("invalid tracker URL '{raw_url}': {err}"))
        })?;

        let product = inputs
            .product
            .map(|product| product.trim().to_string())
            .filter(|product| !product.is_empty())
            .unwrap_or_else(|| DEFAULT_PRODUCT.to_string());

        let workspace_root = match inputs.workspace_root {
            Some(path) => path,
            None => std::env::current_dir()?,
        };

        let git_timeout = positive_secs(
            "git timeout",
            inputs.git_timeout_secs.unwrap_or(DEFAULT_GIT_TIMEOUT_SECS),
        )?;
        let http_timeout = positive_secs(
            "http timeout",
            inputs.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        )?;

        Ok(Self {
            tracker_url,
            product,
            workspace_root,
            git_timeout,
            http_timeout,
            extra_log_args: inputs.extra_log_args,
        })
    }
}

fn positive_secs(name: &str, secs: u64) -> AppResult<Duration> {
    if secs == 0 {
        return Err(AppError::Configuration(format!(
            "{name} must be at least one second"
        )));
    }
    Ok(Duration::from_secs(secs))
}
