// Named date ranges derived from "today": today, yesterday, trailing 30 days and the 30 days before.

use chrono::{Days, NaiveDate};
use std::fmt;

use crate::clock::Clock;

/// Inclusive date range, sent to the provider as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_str(), self.end_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindows {
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
    pub days_ago_30: NaiveDate,
    pub days_ago_60: NaiveDate,
}

impl DateWindows {
    pub fn at(today: NaiveDate) -> Self {
        // NaiveDate spans far beyond any wall-clock date; subtraction cannot underflow in practice.
        let back = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN);
        Self {
            today,
            yesterday: back(1),
            days_ago_30: back(30),
            days_ago_60: back(60),
        }
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::at(clock.today())
    }

    pub fn today(&self) -> DateRange {
        DateRange::single(self.today)
    }

    pub fn yesterday(&self) -> DateRange {
        DateRange::single(self.yesterday)
    }

    /// 30 days ago through today.
    pub fn trailing_30(&self) -> DateRange {
        DateRange::new(self.days_ago_30, self.today)
    }

    /// 60 days ago through 30 days ago; shares its last day with `trailing_30`.
    pub fn previous_30(&self) -> DateRange {
        DateRange::new(self.days_ago_60, self.days_ago_30)
    }
}
