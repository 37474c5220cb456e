use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url, header::ACCEPT};
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::issue::{IssueRef, IssueSet, Milestone};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

const BUGLIST_PATH: &str = "buglist.cgi";

pub struct BugzillaClient {
    http: Client,
    base_url: Url,
    product: String,
}

impl BugzillaClient {
    pub fn new(base_url: Url, product: String, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| {
                AppError::Configuration(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            http,
            base_url,
            product,
        })
    }

    fn report_url(&self, milestone: &Milestone) -> AppResult<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut url = base.join(BUGLIST_PATH).map_err(|err| {
            AppError::Configuration(format!("invalid tracker URL {}: {err}", self.base_url))
        })?;
        url.query_pairs_mut()
            .append_pair("query_format", "advanced")
            .append_pair("target_milestone", milestone.as_str())
            .append_pair("product", &self.product)
            .append_pair("ctype", "csv");
        Ok(url)
    }
}

#[async_trait]
impl IssueTrackerService for BugzillaClient {
    async fn milestone_issues(&self, milestone: &Milestone) -> AppResult<IssueSet> {
        let url = self.report_url(milestone)?;
        info!(%url, "fetching milestone report");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "text/csv")
            .send()
            .await
            .map_err(|err| AppError::ReportFetch(format!("failed to call Bugzilla: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ReportFetch(format!(
                "Bugzilla responded with {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| {
                AppError::ReportFetch(format!("failed to read Bugzilla report: {err}"))
            })?;

        let issues = parse_report(&body)?;
        debug!(milestone = %milestone, issues = issues.len(), "milestone report parsed");
        Ok(issues)
    }
}

#[derive(Deserialize)]
struct ReportRow {
    bug_id: String,
}

/// Reads the `bug_id` column of a CSV buglist; other columns are ignored.
pub fn parse_report(body: &str) -> AppResult<IssueSet> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|err| AppError::ReportFetch(format!("malformed report header: {err}")))?;
    if !headers.iter().any(|name| name == "bug_id") {
        return Err(AppError::ReportFetch(
            "report has no bug_id column".to_string(),
        ));
    }

    let mut issues = IssueSet::new();
    for row in reader.deserialize::<ReportRow>() {
        let row =
            row.map_err(|err| AppError::ReportFetch(format!("malformed report row: {err}")))?;
        let id = row.bug_id.trim();
        if !id.is_empty() {
            issues.insert(IssueRef::new(id));
        }
    }
    Ok(issues)
}
