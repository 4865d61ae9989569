//! Ranked peak-usage windows per billing month.

use crate::elvia::types::{MaxHour, MaxHoursAggregate, MaxHoursCollection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Marker used for start/end of a max hour that is not in the payload
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxHourEntry {
    pub value: f64,
    pub start_time: String,
    pub end_time: String,
    pub uom: String,
}

impl MaxHourEntry {
    /// Placeholder for a missing source index
    pub fn unknown() -> Self {
        Self {
            value: 0.0,
            start_time: UNKNOWN.to_string(),
            end_time: UNKNOWN.to_string(),
            uom: String::new(),
        }
    }

    fn from_source(hour: &MaxHour) -> Self {
        Self {
            value: hour.value,
            start_time: hour.start_time.clone(),
            end_time: hour.end_time.clone(),
            uom: hour.uom.clone(),
        }
    }
}

/// Top three max hours of one month.
///
/// Rank 1 is the most recent peak (source index 2) and rank 3 the oldest
/// (source index 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthAggregate {
    #[serde(rename = "1")]
    pub first: MaxHourEntry,
    #[serde(rename = "2")]
    pub second: MaxHourEntry,
    #[serde(rename = "3")]
    pub third: MaxHourEntry,
    pub average: f64,
    pub uom: String,
}

impl MonthAggregate {
    pub fn from_aggregate(aggregate: &MaxHoursAggregate) -> Self {
        let at = |index: usize| {
            aggregate.max_hours.get(index).map_or_else(
                || {
                    debug!(
                        "Max hour not found for index {} ({} months back)",
                        index, aggregate.no_of_months_back
                    );
                    MaxHourEntry::unknown()
                },
                MaxHourEntry::from_source,
            )
        };
        Self {
            first: at(2),
            second: at(1),
            third: at(0),
            average: aggregate.average_value,
            uom: aggregate.uom.clone(),
        }
    }

    /// Entry for a 1-based rank
    pub const fn rank(&self, rank: usize) -> Option<&MaxHourEntry> {
        match rank {
            1 => Some(&self.first),
            2 => Some(&self.second),
            3 => Some(&self.third),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Month {
    Current,
    Previous,
}

impl Month {
    pub const ALL: [Self; 2] = [Self::Current, Self::Previous];

    /// Suffix used in snapshot keys
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Previous => "previous",
        }
    }

    const fn classify(no_of_months_back: i32) -> Self {
        if no_of_months_back == 0 {
            Self::Current
        } else {
            Self::Previous
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaxHourSummary {
    pub current_month: Option<MonthAggregate>,
    pub previous_month: Option<MonthAggregate>,
}

impl MaxHourSummary {
    pub const fn month(&self, month: Month) -> Option<&MonthAggregate> {
        match month {
            Month::Current => self.current_month.as_ref(),
            Month::Previous => self.previous_month.as_ref(),
        }
    }
}

/// Extract current and previous month aggregates of the first metering point.
///
/// When a month occurs more than once the last occurrence wins.
pub fn aggregate(payload: &MaxHoursCollection) -> MaxHourSummary {
    let mut summary = MaxHourSummary::default();
    let Some(metering_point) = payload.meteringpoints.first() else {
        debug!("Max hours payload has no metering points");
        return summary;
    };

    for month in &metering_point.max_hours_aggregate {
        let mapped = MonthAggregate::from_aggregate(month);
        match Month::classify(month.no_of_months_back) {
            Month::Current => summary.current_month = Some(mapped),
            Month::Previous => summary.previous_month = Some(mapped),
        }
    }
    summary
}
