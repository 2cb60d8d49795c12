//! Session identity and the date window a collection run is scoped to.
//!
//! A session is the unit of one collection run: `source + date window +
//! start timestamp`. The session id names the directory that batch files
//! are written into.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};

/// Inclusive date window used for the admission test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// Create a window, swapping the bounds if given in reverse.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    /// A single-day window for one UTC day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    /// Yesterday, by UTC day boundary. The default window when no flags
    /// are given.
    pub fn yesterday() -> Self {
        Self::single_day(Utc::now().date_naive() - Duration::days(1))
    }

    /// Today, by UTC day boundary.
    pub fn today() -> Self {
        Self::single_day(Utc::now().date_naive())
    }

    /// Parse a `YYYY-MM-DD,YYYY-MM-DD` range argument.
    ///
    /// An unparseable range is a usage error, not a recoverable miss.
    pub fn parse_range(arg: &str) -> Result<Self> {
        let mut parts = arg.splitn(2, ',');
        let from = parts.next().unwrap_or_default().trim();
        let to = parts.next().unwrap_or_default().trim();

        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| HarvestError::Config {
                reason: format!("invalid date-range component: {s:?} (expected YYYY-MM-DD)"),
            })
        };

        Ok(Self::new(parse(from)?, parse(to)?))
    }

    /// Admission test: does `date` fall inside the window (inclusive)?
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    /// Whether `date` falls strictly before the window start. Under a
    /// descending-date listing ordering this is the pagination stop signal.
    pub fn is_before(&self, date: NaiveDate) -> bool {
        date < self.from
    }
}

/// Identity of one collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub source: String,
    pub window: DateWindow,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for a source and window, stamped now.
    pub fn new(source: impl Into<String>, window: DateWindow) -> Self {
        let source = source.into();
        let started_at = Utc::now();
        let id = format!(
            "{}_{}-{}_{}",
            source,
            window.from.format("%Y%m%d"),
            window.to.format("%Y%m%d"),
            started_at.timestamp(),
        );
        Self {
            id,
            source,
            window,
            started_at,
        }
    }
}
