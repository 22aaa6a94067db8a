// Tracked property and its session counts

use serde::{Deserialize, Serialize};

/// A tracked analytics target. `id` is the provider's default view identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub id: String,
}

/// Session counts over one date range: all traffic vs. organic-medium traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPair {
    pub total: u64,
    pub organic: u64,
}

impl MetricPair {
    pub fn new(total: u64, organic: u64) -> Self {
        Self { total, organic }
    }
}

/// Saturates at `u64::MAX`; a cached aggregate may hold arbitrarily large counts.
impl std::ops::Add for MetricPair {
    type Output = MetricPair;

    fn add(self, rhs: MetricPair) -> MetricPair {
        MetricPair {
            total: self.total.saturating_add(rhs.total),
            organic: self.organic.saturating_add(rhs.organic),
        }
    }
}

/// Trailing 30 days plus the preceding 30-day window (`improvement_*`) for trend comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyMetrics {
    pub total: u64,
    pub improvement_total: u64,
    pub organic: u64,
    pub improvement_organic: u64,
}

impl MonthlyMetrics {
    /// Current-window pair, the part that contributes to global sums.
    pub fn current(&self) -> MetricPair {
        MetricPair::new(self.total, self.organic)
    }

    /// Percent change of total sessions against the previous window. None when there is no baseline.
    pub fn total_trend_percent(&self) -> Option<f64> {
        trend_percent(self.total, self.improvement_total)
    }

    pub fn organic_trend_percent(&self) -> Option<f64> {
        trend_percent(self.organic, self.improvement_organic)
    }
}

fn trend_percent(current: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub property: Property,
    pub today: MetricPair,
    pub yesterday: MetricPair,
    pub monthly: MonthlyMetrics,
}

/// Today-only record; recomputed on every run, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayRecord {
    pub property: Property,
    pub today: MetricPair,
}
