use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Station identifier is required")]
    EmptyStationId,
    #[error("Station identifier exceeds {max} characters")]
    StationIdTooLong { max: usize },
    #[error("Station identifier contains invalid character {0:?}")]
    InvalidStationIdChar(char),
    #[error("Station identifier must not contain '..'")]
    PathTraversal,
    #[error("Invalid {field} date '{value}', expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    #[error("Date range start {from} is after end {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
    #[error("Date range spans more than {max_days} days")]
    RangeTooLong { max_days: i64 },
}

/// Opaque identifier of a physical weather station.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationId(String);

impl StationId {
    pub const MAX_LEN: usize = 64;

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::EmptyStationId);
        }
        if raw.chars().count() > Self::MAX_LEN {
            return Err(ValidationError::StationIdTooLong { max: Self::MAX_LEN });
        }
        if let Some(c) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(ValidationError::InvalidStationIdChar(c));
        }
        if raw.contains("..") {
            return Err(ValidationError::PathTraversal);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive range of calendar days for daily queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub const DEFAULT_DAYS: i64 = 7;
    pub const MAX_DAYS: i64 = 366;

    /// Builds a range from optional `from`/`to` query values. A missing `to`
    /// means `today`; a missing `from` means seven days before `to`.
    pub fn parse(
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let to = match to.filter(|s| !s.is_empty()) {
            Some(value) => parse_date("to", value)?,
            None => today,
        };
        let from = match from.filter(|s| !s.is_empty()) {
            Some(value) => parse_date("from", value)?,
            None => to
                .checked_sub_signed(Duration::days(Self::DEFAULT_DAYS))
                .ok_or_else(|| ValidationError::InvalidDate {
                    field: "to",
                    value: to.format("%Y-%m-%d").to_string(),
                })?,
        };

        if from > to {
            return Err(ValidationError::InvertedRange { from, to });
        }
        if (to - from).num_days() > Self::MAX_DAYS {
            return Err(ValidationError::RangeTooLong {
                max_days: Self::MAX_DAYS,
            });
        }

        Ok(Self { from, to })
    }
}

/// Only four-digit years are accepted; chrono alone would also take signed
/// extended years such as `-262143`.
fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .filter(|date| (1..=9999).contains(&date.year()))
        .ok_or_else(|| ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        })
}
