// Domain models: properties, per-property session records, snapshot

mod property;
mod snapshot;

pub use property::{MetricPair, MonthlyMetrics, Property, PropertyRecord, TodayRecord};
pub use snapshot::{CachedAggregate, Snapshot, SnapshotSource, Sums, sites_of};
