// Analytics provider seam: authorize, list web properties, query one metric over a date range.
// Metrics client and property lister sit on top of it and hold the session-specific rules.

mod google;
mod metrics;
mod properties;
mod token;

pub use google::{GoogleAnalytics, GoogleEndpoints};
pub use metrics::{MetricsClient, ORGANIC_FILTER, SESSIONS_METRIC};
pub use properties::PropertyLister;
pub use token::{ANALYTICS_SCOPES, ServiceAccountTokenSource, StaticToken, TokenSource};

use async_trait::async_trait;

use crate::date_window::DateRange;
use crate::error::ProviderError;

/// One web property as listed by the provider. `default_view_id` is absent when the
/// property has no usable default view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebProperty {
    pub name: String,
    pub default_view_id: Option<String>,
}

/// The three upstream capabilities the pipeline depends on.
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    async fn authorize(&self) -> Result<(), ProviderError>;

    async fn list_web_properties(
        &self,
        account_id: &str,
    ) -> Result<Vec<WebProperty>, ProviderError>;

    /// Total of `metric` for `view_id` over `range`. `Ok(None)` when the report has no totals.
    async fn query_metric(
        &self,
        view_id: &str,
        range: DateRange,
        metric: &str,
        filter: Option<&str>,
    ) -> Result<Option<u64>, ProviderError>;
}
