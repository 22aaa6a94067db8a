// Tracked properties under the configured account.

use std::sync::Arc;
use tracing::instrument;

use super::AnalyticsProvider;
use crate::error::ProviderError;
use crate::models::Property;

#[derive(Clone)]
pub struct PropertyLister {
    provider: Arc<dyn AnalyticsProvider>,
    account_id: String,
}

impl PropertyLister {
    pub fn new(provider: Arc<dyn AnalyticsProvider>, account_id: impl Into<String>) -> Self {
        Self {
            provider,
            account_id: account_id.into(),
        }
    }

    /// Authorizes, then lists web properties in provider order.
    /// Items without a usable default view are dropped.
    #[instrument(skip(self), fields(operation = "list_properties", account_id = %self.account_id))]
    pub async fn list_properties(&self) -> Result<Vec<Property>, ProviderError> {
        self.provider.authorize().await?;
        let items = self.provider.list_web_properties(&self.account_id).await?;
        let listed = items.len();
        let properties: Vec<Property> = items
            .into_iter()
            .filter_map(|item| match item.default_view_id {
                Some(id) => Some(Property {
                    name: item.name,
                    id,
                }),
                None => {
                    tracing::debug!(name = %item.name, "skipping property without default view");
                    None
                }
            })
            .collect();
        tracing::debug!(listed, usable = properties.len(), "properties listed");
        Ok(properties)
    }
}
