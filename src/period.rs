//! Period bucketing for date-keyed records.
//!
//! Two bucket shapes exist:
//! - monthly keys are `YYYY-MM` prefixes of ISO day strings
//! - weekly keys are ISO week identifiers, `YYYY-Www`
//!
//! Malformed date strings never match any period; they are skipped rather
//! than surfaced as errors, matching the defensive posture of the snapshot
//! producers.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    Monthly,
    Weekly,
}

/// Active period selection. `All` applies no period narrowing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PeriodFilter {
    #[default]
    All,
    Monthly(String),
    Weekly(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("unknown period type: {0}")]
    UnknownPeriodType(String),
}

pub fn parse_period_type(input: &str) -> Result<PeriodType, PeriodError> {
    match input {
        "monthly" => Ok(PeriodType::Monthly),
        "weekly" => Ok(PeriodType::Weekly),
        other => Err(PeriodError::UnknownPeriodType(other.to_string())),
    }
}

impl PeriodFilter {
    /// Build a filter from the selector state. An empty key is a no-op
    /// filter, not an exclude-all.
    pub fn from_selection(period_type: Option<PeriodType>, key: &str) -> Self {
        if key.is_empty() {
            return PeriodFilter::All;
        }
        match period_type {
            Some(PeriodType::Monthly) => PeriodFilter::Monthly(key.to_string()),
            Some(PeriodType::Weekly) => PeriodFilter::Weekly(key.to_string()),
            None => PeriodFilter::All,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PeriodFilter::All)
    }

    /// Whether an ISO day string (`YYYY-MM-DD`) falls inside this period.
    pub fn matches_date(&self, date: &str) -> bool {
        match self {
            PeriodFilter::All => true,
            PeriodFilter::Monthly(month) => date.starts_with(month.as_str()),
            PeriodFilter::Weekly(week) => week_key(date).as_deref() == Some(week.as_str()),
        }
    }
}

/// Monthly bucket key, the `YYYY-MM` prefix of an ISO day string.
pub fn month_key(date: &str) -> Option<&str> {
    if date.len() < 7 {
        return None;
    }
    date.get(..7)
}

/// ISO week bucket key (`YYYY-Www`) for an ISO day string.
pub fn week_key(date: &str) -> Option<String> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let iso = parsed.iso_week();
    Some(format!("{}-W{:02}", iso.year(), iso.week()))
}

/// Distinct week keys over a set of day strings, newest first.
pub fn week_list<'a>(dates: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut weeks: Vec<String> = Vec::new();
    for date in dates {
        if let Some(key) = week_key(date) {
            if !weeks.contains(&key) {
                weeks.push(key);
            }
        }
    }
    weeks.sort_by(|a, b| b.cmp(a));
    weeks
}

/// Distinct month keys over a set of day strings, newest first.
pub fn month_list<'a>(dates: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut months: Vec<String> = Vec::new();
    for date in dates {
        if let Some(key) = month_key(date) {
            if !months.iter().any(|m| m == key) {
                months.push(key.to_string());
            }
        }
    }
    months.sort_by(|a, b| b.cmp(a));
    months
}
