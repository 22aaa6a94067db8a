// Snapshot served over HTTP, and the aggregate persisted by the daily cache.
// Sums are a field-wise integer fold over the aggregate, seeded at zero.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{MetricPair, Property, PropertyRecord, TodayRecord};

/// Exactly what the cache file holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAggregate {
    pub aggregate: Vec<PropertyRecord>,
}

/// Global totals across all properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sums {
    pub today: MetricPair,
    pub yesterday: MetricPair,
    pub monthly: MetricPair,
}

impl Sums {
    pub fn from_records(records: &[PropertyRecord]) -> Self {
        records.iter().fold(Sums::default(), |acc, r| Sums {
            today: acc.today + r.today,
            yesterday: acc.yesterday + r.yesterday,
            monthly: acc.monthly + r.monthly.current(),
        })
    }
}

/// Where the aggregate of a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    Cache,
    Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub aggregate: Vec<PropertyRecord>,
    pub sums: Sums,
    pub sites: Vec<Property>,
    pub today: Vec<TodayRecord>,
    pub generated_at: DateTime<Local>,
    pub source: SnapshotSource,
}

impl Snapshot {
    /// Derives sums and sites from the aggregate.
    pub fn assemble(
        aggregate: Vec<PropertyRecord>,
        today: Vec<TodayRecord>,
        generated_at: DateTime<Local>,
        source: SnapshotSource,
    ) -> Self {
        let sums = Sums::from_records(&aggregate);
        let sites = sites_of(&aggregate);
        Self {
            aggregate,
            sums,
            sites,
            today,
            generated_at,
            source,
        }
    }

    /// First record whose property name matches exactly.
    pub fn find_site(&self, name: &str) -> Option<&PropertyRecord> {
        self.aggregate.iter().find(|r| r.property.name == name)
    }
}

/// `{name, id}` projection of each record's property, in order.
pub fn sites_of(records: &[PropertyRecord]) -> Vec<Property> {
    records.iter().map(|r| r.property.clone()).collect()
}
