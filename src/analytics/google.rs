// Google Analytics over HTTP: Management API v3 for web properties, Reporting API v4 for metrics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use super::{AnalyticsProvider, TokenSource, WebProperty};
use crate::date_window::DateRange;
use crate::error::ProviderError;

pub const DEFAULT_MANAGEMENT_BASE_URL: &str = "https://www.googleapis.com/analytics/v3";
pub const DEFAULT_REPORTING_BASE_URL: &str = "https://analyticsreporting.googleapis.com/v4";

/// API base URLs, without trailing slash.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub management_base_url: String,
    pub reporting_base_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            management_base_url: DEFAULT_MANAGEMENT_BASE_URL.into(),
            reporting_base_url: DEFAULT_REPORTING_BASE_URL.into(),
        }
    }
}

pub struct GoogleAnalytics {
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    endpoints: GoogleEndpoints,
}

impl GoogleAnalytics {
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<dyn TokenSource>,
        endpoints: GoogleEndpoints,
    ) -> Self {
        Self {
            http,
            tokens,
            endpoints,
        }
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ProviderError::Auth(format!("{}: {}", status, body)));
        }
        Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

// --- Management API wire types ---

#[derive(Debug, Deserialize)]
struct WebPropertyList {
    #[serde(default)]
    items: Vec<WebPropertyItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebPropertyItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    default_profile_id: Option<ProfileId>,
}

/// int64 ids come back as JSON strings, but accept bare numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileId {
    Text(String),
    Number(u64),
}

impl ProfileId {
    fn into_usable(self) -> Option<String> {
        match self {
            ProfileId::Text(s) if !s.trim().is_empty() => Some(s),
            ProfileId::Text(_) => None,
            ProfileId::Number(0) => None,
            ProfileId::Number(n) => Some(n.to_string()),
        }
    }
}

// --- Reporting API wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetRequest<'a> {
    report_requests: Vec<ReportRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest<'a> {
    view_id: &'a str,
    date_ranges: Vec<WireDateRange>,
    metrics: Vec<Metric<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters_expression: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDateRange {
    start_date: String,
    end_date: String,
}

#[derive(Debug, Serialize)]
struct Metric<'a> {
    expression: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    #[serde(default)]
    reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    data: Option<ReportData>,
}

#[derive(Debug, Deserialize)]
struct ReportData {
    #[serde(default)]
    totals: Vec<DateRangeValues>,
}

#[derive(Debug, Deserialize)]
struct DateRangeValues {
    #[serde(default)]
    values: Vec<String>,
}

/// First total of the first report; None when the report carries no totals.
fn first_total(resp: BatchGetResponse) -> Result<Option<u64>, ProviderError> {
    let raw = resp
        .reports
        .into_iter()
        .next()
        .and_then(|r| r.data)
        .and_then(|d| d.totals.into_iter().next())
        .and_then(|t| t.values.into_iter().next());
    match raw {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ProviderError::Decode(format!("metric total {:?}: {}", v, e))),
    }
}

#[async_trait]
impl AnalyticsProvider for GoogleAnalytics {
    #[instrument(skip(self), fields(provider = "google", operation = "authorize"))]
    async fn authorize(&self) -> Result<(), ProviderError> {
        self.tokens.access_token().await.map(|_| ())
    }

    #[instrument(skip(self), fields(provider = "google", operation = "list_web_properties"))]
    async fn list_web_properties(
        &self,
        account_id: &str,
    ) -> Result<Vec<WebProperty>, ProviderError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{}/management/accounts/{}/webproperties",
            self.endpoints.management_base_url, account_id
        );
        let resp = self.http.get(&url).bearer_auth(token).send().await?;
        let list: WebPropertyList = Self::check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("webproperties list: {}", e)))?;
        Ok(list
            .items
            .into_iter()
            .map(|item| WebProperty {
                name: item.name,
                default_view_id: item.default_profile_id.and_then(ProfileId::into_usable),
            })
            .collect())
    }

    #[instrument(skip(self, range), fields(provider = "google", operation = "query_metric", range = %range))]
    async fn query_metric(
        &self,
        view_id: &str,
        range: DateRange,
        metric: &str,
        filter: Option<&str>,
    ) -> Result<Option<u64>, ProviderError> {
        let token = self.tokens.access_token().await?;
        let body = BatchGetRequest {
            report_requests: vec![ReportRequest {
                view_id,
                date_ranges: vec![WireDateRange {
                    start_date: range.start_str(),
                    end_date: range.end_str(),
                }],
                metrics: vec![Metric { expression: metric }],
                filters_expression: filter,
            }],
        };
        let url = format!("{}/reports:batchGet", self.endpoints.reporting_base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let parsed: BatchGetResponse = Self::check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("reports:batchGet: {}", e)))?;
        first_total(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Option<u64>, ProviderError> {
        first_total(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn first_total_reads_string_value() {
        let json = r#"{"reports":[{"data":{"totals":[{"values":["1234"]}],"rowCount":1}}]}"#;
        assert_eq!(parse(json).unwrap(), Some(1234));
    }

    #[test]
    fn first_total_without_totals_is_none() {
        assert_eq!(parse(r#"{"reports":[{"data":{}}]}"#).unwrap(), None);
        assert_eq!(parse(r#"{"reports":[]}"#).unwrap(), None);
        assert_eq!(parse(r#"{}"#).unwrap(), None);
    }

    #[test]
    fn first_total_rejects_non_numeric() {
        let json = r#"{"reports":[{"data":{"totals":[{"values":["12.5"]}]}}]}"#;
        assert!(matches!(parse(json), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn profile_id_blank_or_zero_is_unusable() {
        assert_eq!(ProfileId::Text("  ".into()).into_usable(), None);
        assert_eq!(ProfileId::Number(0).into_usable(), None);
        assert_eq!(ProfileId::Number(42).into_usable(), Some("42".into()));
    }
}
