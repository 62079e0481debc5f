//! Billing period types.
//!
//! - [`DateRange`] - Half-open date interval, end exclusive like Cost Explorer
//! - [`Granularity`] - Bucket size of a cost query
//! - [`CostMetric`] - Which amount a cost query reports

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Date Range
// ============================================================================

/// A date interval with an exclusive end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day in the range.
    pub start: NaiveDate,
    /// First day after the range.
    pub end: NaiveDate,
}

/// The `TimePeriod` argument of a Cost Explorer query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimePeriod {
    /// Start date, `YYYY-MM-DD`.
    pub start: String,
    /// End date, `YYYY-MM-DD`, exclusive.
    pub end: String,
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDateRange`] unless `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range from `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] for unparsable dates and
    /// [`CoreError::InvalidDateRange`] for an empty interval.
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        Self::new(parse_iso_date(start)?, parse_iso_date(end)?)
    }

    /// The `days` days before `end`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] if `days` is zero.
    pub fn from_days(days: u32, end: NaiveDate) -> Result<Self, CoreError> {
        if days == 0 {
            return Err(CoreError::InvalidData("days must be > 0".to_string()));
        }
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| CoreError::InvalidData(format!("{days} days before {end} is out of range")))?;
        Self::new(start, end)
    }

    /// From the first day of the month `months` whole months before `end`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] unless `1 <= months <= 12`.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn from_months(months: u32, end: NaiveDate) -> Result<Self, CoreError> {
        if months == 0 || months > 12 {
            return Err(CoreError::InvalidData("months must be between 1 and 12".to_string()));
        }

        let total = end.year() * 12 + end.month0() as i32 - months as i32;
        let year = total.div_euclid(12);
        let month = total.rem_euclid(12) as u32 + 1;
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CoreError::InvalidData(format!("invalid start month {year}-{month}")))?;

        Self::new(start, end)
    }

    /// The last `days` days, ending today.
    ///
    /// # Errors
    ///
    /// See [`DateRange::from_days`].
    pub fn last_days(days: u32) -> Result<Self, CoreError> {
        Self::from_days(days, Local::now().date_naive())
    }

    /// The last `months` whole months plus the current partial month.
    ///
    /// # Errors
    ///
    /// See [`DateRange::from_months`].
    pub fn last_months(months: u32) -> Result<Self, CoreError> {
        Self::from_months(months, Local::now().date_naive())
    }

    /// Returns the Cost Explorer `TimePeriod` for this range.
    pub fn to_time_period(&self) -> TimePeriod {
        TimePeriod {
            start: self.start.format("%Y-%m-%d").to_string(),
            end: self.end.format("%Y-%m-%d").to_string(),
        }
    }

    /// Returns true if the day lies inside the range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day < self.end
    }

    /// Returns the number of days in the range.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

fn parse_iso_date(value: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = value.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidData(format!("Invalid date string: {value}")))
}

// ============================================================================
// Granularity
// ============================================================================

/// Bucket size of a cost query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    /// One bucket per day.
    Daily,
    /// One bucket per calendar month.
    #[default]
    Monthly,
}

impl Granularity {
    /// Returns the Cost Explorer spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Monthly => "MONTHLY",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            other => Err(CoreError::InvalidData(format!("Unknown granularity: {other}"))),
        }
    }
}

// ============================================================================
// Cost Metric
// ============================================================================

/// Which amount a cost query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CostMetric {
    /// Upfront fees spread across the term.
    AmortizedCost,
    /// Average rate across consolidated billing.
    BlendedCost,
    /// Amortized cost after discounts.
    NetAmortizedCost,
    /// Unblended cost after discounts.
    NetUnblendedCost,
    /// Cost as charged.
    #[default]
    UnblendedCost,
}

impl CostMetric {
    /// All metrics.
    pub fn all() -> &'static [CostMetric] {
        &[
            Self::AmortizedCost,
            Self::BlendedCost,
            Self::NetAmortizedCost,
            Self::NetUnblendedCost,
            Self::UnblendedCost,
        ]
    }

    /// Returns the Cost Explorer spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmortizedCost => "AmortizedCost",
            Self::BlendedCost => "BlendedCost",
            Self::NetAmortizedCost => "NetAmortizedCost",
            Self::NetUnblendedCost => "NetUnblendedCost",
            Self::UnblendedCost => "UnblendedCost",
        }
    }
}

impl fmt::Display for CostMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| CoreError::InvalidData(format!("Unknown cost metric: {s}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
