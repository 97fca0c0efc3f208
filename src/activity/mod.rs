//! Buckets event timestamps into the fixed 1h/3h/6h/12h/24h/48h windows.
//!
//! Buckets are exclusive: an event lands in the first window whose upper
//! bound is at least its age, so a two hour old tweet counts towards `3h`
//! only. Anything older than 48 hours is dropped.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// How far back activity is tracked.
pub const ACTIVITY_WINDOW_HOURS: i64 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interval {
    H1,
    H3,
    H6,
    H12,
    H24,
    H48,
}

impl Interval {
    /// Chart and listing order.
    pub const ALL: [Interval; 6] = [
        Interval::H1,
        Interval::H3,
        Interval::H6,
        Interval::H12,
        Interval::H24,
        Interval::H48,
    ];

    pub fn upper_bound_hours(self) -> f64 {
        match self {
            Interval::H1 => 1.0,
            Interval::H3 => 3.0,
            Interval::H6 => 6.0,
            Interval::H12 => 12.0,
            Interval::H24 => 24.0,
            Interval::H48 => 48.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Interval::H1 => "1h",
            Interval::H3 => "3h",
            Interval::H6 => "6h",
            Interval::H12 => "12h",
            Interval::H24 => "24h",
            Interval::H48 => "48h",
        }
    }

    /// Smallest window containing an event of the given age, if any.
    pub fn for_age(age_hours: f64) -> Option<Interval> {
        Interval::ALL
            .into_iter()
            .find(|interval| age_hours <= interval.upper_bound_hours())
    }

    pub fn labels() -> [&'static str; 6] {
        Interval::ALL.map(Interval::label)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Age of an event in fractional hours. Events in the future have a
/// negative age and therefore count as the most recent window.
pub fn age_in_hours(now: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
    (now - at).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Per-window event counts. Serializes as an object keyed `"1h"` .. `"48h"`
/// in window order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalCounts {
    #[serde(rename = "1h", default)]
    pub h1: u64,
    #[serde(rename = "3h", default)]
    pub h3: u64,
    #[serde(rename = "6h", default)]
    pub h6: u64,
    #[serde(rename = "12h", default)]
    pub h12: u64,
    #[serde(rename = "24h", default)]
    pub h24: u64,
    #[serde(rename = "48h", default)]
    pub h48: u64,
}

impl IntervalCounts {
    /// Raw-timestamp path: every event adds one to its window.
    pub fn from_events<I>(events: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut counts = Self::default();
        for at in events {
            if let Some(interval) = Interval::for_age(age_in_hours(now, at)) {
                counts.add(interval, 1);
            }
        }
        counts
    }

    /// Pre-aggregated path: hour-aligned timestamp keys with counts. Keys
    /// that do not parse as timestamps are skipped.
    pub fn from_hourly(buckets: &HashMap<String, u64>, now: DateTime<Utc>) -> Self {
        let mut counts = Self::default();
        for (hour, count) in buckets {
            let Some(at) = parse_hour_key(hour) else {
                debug!("Skipping unparseable hourly bucket key: {}", hour);
                continue;
            };
            if let Some(interval) = Interval::for_age(age_in_hours(now, at)) {
                counts.add(interval, *count);
            }
        }
        counts
    }

    pub fn get(&self, interval: Interval) -> u64 {
        match interval {
            Interval::H1 => self.h1,
            Interval::H3 => self.h3,
            Interval::H6 => self.h6,
            Interval::H12 => self.h12,
            Interval::H24 => self.h24,
            Interval::H48 => self.h48,
        }
    }

    pub fn add(&mut self, interval: Interval, count: u64) {
        let slot = match interval {
            Interval::H1 => &mut self.h1,
            Interval::H3 => &mut self.h3,
            Interval::H6 => &mut self.h6,
            Interval::H12 => &mut self.h12,
            Interval::H24 => &mut self.h24,
            Interval::H48 => &mut self.h48,
        };
        *slot += count;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Interval, u64)> + '_ {
        Interval::ALL.into_iter().map(move |interval| (interval, self.get(interval)))
    }

    /// Counts in chart order.
    pub fn history(&self) -> Vec<u64> {
        self.iter().map(|(_, count)| count).collect()
    }

    pub fn sum(&self) -> u64 {
        self.iter().map(|(_, count)| count).sum()
    }
}

fn parse_hour_key(key: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(key) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(key, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
