// Shared test helpers: in-memory analytics provider and sample records

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Local;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use trafficboard::analytics::{
    AnalyticsProvider, MetricsClient, ORGANIC_FILTER, PropertyLister, WebProperty,
};
use trafficboard::clock::{Clock, FixedClock};
use trafficboard::daily_cache::DailyCache;
use trafficboard::date_window::DateRange;
use trafficboard::error::ProviderError;
use trafficboard::models::*;
use trafficboard::pipeline::Pipeline;

/// Provider backed by maps. Sessions are looked up by exact (view, range, organic) first,
/// then by (view, organic); anything else reports no totals.
#[derive(Default)]
pub struct FakeProvider {
    pub properties: Vec<WebProperty>,
    pub exact: HashMap<(String, DateRange, bool), u64>,
    pub per_view: HashMap<(String, bool), u64>,
    pub fail_authorize: bool,
    pub fail_view: Option<String>,
    pub panic_on_list: bool,
    pub authorize_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub queries: Mutex<Vec<(String, DateRange, Option<String>)>>,
}

impl FakeProvider {
    pub fn with_sites(sites: &[(&str, &str)]) -> Self {
        Self {
            properties: sites
                .iter()
                .map(|(name, id)| WebProperty {
                    name: name.to_string(),
                    default_view_id: Some(id.to_string()),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn sessions(mut self, view: &str, total: u64, organic: u64) -> Self {
        self.per_view.insert((view.to_string(), false), total);
        self.per_view.insert((view.to_string(), true), organic);
        self
    }

    pub fn provider_calls(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
            + self.list_calls.load(Ordering::SeqCst)
            + self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsProvider for FakeProvider {
    async fn authorize(&self) -> Result<(), ProviderError> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_authorize {
            return Err(ProviderError::Auth("invalid_grant".into()));
        }
        Ok(())
    }

    async fn list_web_properties(
        &self,
        _account_id: &str,
    ) -> Result<Vec<WebProperty>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_list {
            panic!("web property listing blew up");
        }
        Ok(self.properties.clone())
    }

    async fn query_metric(
        &self,
        view_id: &str,
        range: DateRange,
        _metric: &str,
        filter: Option<&str>,
    ) -> Result<Option<u64>, ProviderError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap()
            .push((view_id.to_string(), range, filter.map(String::from)));
        if self.fail_view.as_deref() == Some(view_id) {
            return Err(ProviderError::Status {
                status: 500,
                body: "backend error".into(),
            });
        }
        let organic = filter == Some(ORGANIC_FILTER);
        Ok(self
            .exact
            .get(&(view_id.to_string(), range, organic))
            .or_else(|| self.per_view.get(&(view_id.to_string(), organic)))
            .copied())
    }
}

pub fn now_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(Local::now()))
}

pub fn pipeline_with(provider: Arc<FakeProvider>, cache_path: &Path) -> Pipeline {
    pipeline_at(provider, cache_path, now_clock())
}

pub fn pipeline_at(
    provider: Arc<FakeProvider>,
    cache_path: &Path,
    clock: Arc<dyn Clock>,
) -> Pipeline {
    Pipeline::new(
        PropertyLister::new(provider.clone(), "acct-1"),
        MetricsClient::new(provider),
        DailyCache::new(cache_path, clock.clone()),
        clock,
    )
}

pub fn property(name: &str, id: &str) -> Property {
    Property {
        name: name.into(),
        id: id.into(),
    }
}

pub fn record(name: &str, id: &str, today: u64, yesterday: u64, monthly: u64) -> PropertyRecord {
    PropertyRecord {
        property: property(name, id),
        today: MetricPair::new(today, today / 2),
        yesterday: MetricPair::new(yesterday, yesterday / 2),
        monthly: MonthlyMetrics {
            total: monthly,
            improvement_total: monthly / 2,
            organic: monthly / 4,
            improvement_organic: monthly / 8,
        },
    }
}

pub fn sample_snapshot() -> Snapshot {
    let aggregate = vec![
        record("Alpha", "101", 5, 40, 900),
        record("Beta", "102", 10, 20, 300),
        record("Gamma", "103", 0, 0, 12),
    ];
    let today = aggregate
        .iter()
        .map(|r| TodayRecord {
            property: r.property.clone(),
            today: r.today,
        })
        .collect();
    Snapshot::assemble(aggregate, today, Local::now(), SnapshotSource::Provider)
}

/// Sets the file's mtime to local noon `days` calendar days before today.
pub fn age_file(path: &Path, days: u64) {
    let day = Local::now().date_naive() - chrono::Days::new(days);
    let noon = day
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_local_timezone(Local)
        .earliest()
        .unwrap();
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(std::time::SystemTime::from(noon)).unwrap();
}
