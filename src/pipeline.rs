// Aggregation pipeline: daily cache gate -> property list -> per-property session records
// (fanned out) -> sums and site list. Today-only records are refetched on every run.
// All-or-nothing: one failing property fails the run; there is no partial snapshot.

use chrono::NaiveDate;
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::analytics::{MetricsClient, PropertyLister};
use crate::clock::Clock;
use crate::daily_cache::{CacheState, DailyCache};
use crate::date_window::DateWindows;
use crate::error::{PipelineError, PipelineResult, ProviderError};
use crate::models::{
    CachedAggregate, MetricPair, MonthlyMetrics, Property, PropertyRecord, Snapshot,
    SnapshotSource, TodayRecord,
};

pub struct Pipeline {
    lister: PropertyLister,
    metrics: MetricsClient,
    cache: DailyCache,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    pub fn new(
        lister: PropertyLister,
        metrics: MetricsClient,
        cache: DailyCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lister,
            metrics,
            cache,
            clock,
        }
    }

    pub fn cache(&self) -> &DailyCache {
        &self.cache
    }

    /// Calendar day the pipeline computes windows for.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    #[instrument(skip(self), fields(operation = "compute_snapshot"))]
    pub async fn compute_snapshot(&self) -> PipelineResult<Snapshot> {
        let windows = DateWindows::from_clock(self.clock.as_ref());

        let cached = match self.cache.state().await {
            CacheState::Fresh => self.cache.load().await,
            CacheState::Stale => None,
        };
        let (aggregate, source) = match cached {
            Some(data) => {
                info!(records = data.aggregate.len(), "load from cache");
                (data.aggregate, SnapshotSource::Cache)
            }
            None => {
                info!("load from provider");
                let data = CachedAggregate {
                    aggregate: self.compute_aggregate(&windows).await?,
                };
                self.cache.store(&data).await;
                (data.aggregate, SnapshotSource::Provider)
            }
        };

        let today = self.compute_today().await?;
        let snapshot = Snapshot::assemble(aggregate, today, self.clock.now(), source);
        info!(
            sites = snapshot.sites.len(),
            today_total = snapshot.sums.today.total,
            monthly_total = snapshot.sums.monthly.total,
            "snapshot ready"
        );
        Ok(snapshot)
    }

    /// Full records for every property, one concurrent task per property.
    pub async fn compute_aggregate(
        &self,
        windows: &DateWindows,
    ) -> PipelineResult<Vec<PropertyRecord>> {
        let properties = self
            .lister
            .list_properties()
            .await
            .map_err(PipelineError::ListProperties)?;
        try_join_all(properties.into_iter().map(|p| async move {
            let name = p.name.clone();
            self.record_for(p, windows)
                .await
                .map_err(|source| PipelineError::Metrics {
                    property: name,
                    source,
                })
        }))
        .await
    }

    /// Today total/organic per property, never cached.
    #[instrument(skip(self), fields(operation = "compute_today"))]
    pub async fn compute_today(&self) -> PipelineResult<Vec<TodayRecord>> {
        let windows = DateWindows::from_clock(self.clock.as_ref());
        let properties = self
            .lister
            .list_properties()
            .await
            .map_err(PipelineError::ListProperties)?;
        try_join_all(properties.into_iter().map(|property| async move {
            let fetched = self.today_pair(&property.id, &windows).await;
            match fetched {
                Ok(today) => Ok(TodayRecord { property, today }),
                Err(source) => Err(PipelineError::Metrics {
                    property: property.name,
                    source,
                }),
            }
        }))
        .await
    }

    async fn today_pair(
        &self,
        id: &str,
        windows: &DateWindows,
    ) -> Result<MetricPair, ProviderError> {
        Ok(MetricPair::new(
            self.metrics.fetch_sessions(id, windows.today(), false).await?,
            self.metrics.fetch_sessions(id, windows.today(), true).await?,
        ))
    }

    /// Eight sequential queries: today, yesterday, trailing 30 and previous 30, each total + organic.
    async fn record_for(
        &self,
        property: Property,
        windows: &DateWindows,
    ) -> Result<PropertyRecord, ProviderError> {
        let m = &self.metrics;
        let id = property.id.as_str();
        let today = self.today_pair(id, windows).await?;
        let yesterday = MetricPair::new(
            m.fetch_sessions(id, windows.yesterday(), false).await?,
            m.fetch_sessions(id, windows.yesterday(), true).await?,
        );
        let monthly = MonthlyMetrics {
            total: m.fetch_sessions(id, windows.trailing_30(), false).await?,
            improvement_total: m.fetch_sessions(id, windows.previous_30(), false).await?,
            organic: m.fetch_sessions(id, windows.trailing_30(), true).await?,
            improvement_organic: m.fetch_sessions(id, windows.previous_30(), true).await?,
        };
        Ok(PropertyRecord {
            property,
            today,
            yesterday,
            monthly,
        })
    }
}
