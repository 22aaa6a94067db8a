// Session counts for one property over one date range.

use std::sync::Arc;

use super::AnalyticsProvider;
use crate::date_window::DateRange;
use crate::error::ProviderError;

pub const SESSIONS_METRIC: &str = "ga:sessions";
pub const ORGANIC_FILTER: &str = "ga:medium==organic";

#[derive(Clone)]
pub struct MetricsClient {
    provider: Arc<dyn AnalyticsProvider>,
}

impl MetricsClient {
    pub fn new(provider: Arc<dyn AnalyticsProvider>) -> Self {
        Self { provider }
    }

    /// One provider query per call, no retry. A report without totals counts as 0 sessions.
    pub async fn fetch_sessions(
        &self,
        property_id: &str,
        range: DateRange,
        organic_only: bool,
    ) -> Result<u64, ProviderError> {
        if property_id.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "property id must be non-empty".into(),
            ));
        }
        if !range.is_ordered() {
            return Err(ProviderError::InvalidRequest(format!(
                "start date after end date: {}",
                range
            )));
        }
        let filter = organic_only.then_some(ORGANIC_FILTER);
        let sessions = self
            .provider
            .query_metric(property_id, range, SESSIONS_METRIC, filter)
            .await?
            .unwrap_or(0);
        tracing::debug!(
            operation = "fetch_sessions",
            property_id,
            range = %range,
            organic_only,
            sessions,
            "sessions fetched"
        );
        Ok(sessions)
    }
}
