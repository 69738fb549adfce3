//! Date handling: day-granularity query windows and lenient occurrence
//! timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Wire format of a calendar date in query strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format of an occurrence timestamp in responses.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Which end of a date range a problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// `start_date`.
    Start,
    /// `end_date`.
    End,
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start_date",
            Self::End => "end_date",
        })
    }
}

/// Date parsing errors. All map to 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// A range bound was not supplied.
    #[error("Both start_date and end_date query parameters are required")]
    MissingBound,

    /// A range bound is not `YYYY-MM-DD`.
    #[error("Invalid {0} format. Use YYYY-MM-DD")]
    InvalidDateFormat(DateBound),

    /// The start date falls after the end date.
    #[error("start_date must not be after end_date")]
    StartAfterEnd,

    /// No accepted timestamp format matched.
    #[error("Invalid date format: {0}")]
    UnrecognizedTimestamp(String),
}

impl DateError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}

/// Inclusive UTC window covering whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Builds the window from 00:00:00 of `start_date` to 23:59:59 of
    /// `end_date`.
    ///
    /// # Errors
    ///
    /// Returns `StartAfterEnd` when the dates are reversed.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, DateError> {
        if start_date > end_date {
            return Err(DateError::StartAfterEnd);
        }
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        Ok(Self {
            start_date,
            end_date,
            start: Utc.from_utc_datetime(&start_date.and_time(NaiveTime::MIN)),
            end: Utc.from_utc_datetime(&end_date.and_time(end_of_day)),
        })
    }

    /// Parses query-string bounds in `YYYY-MM-DD`. An empty bound counts as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns `MissingBound`, `InvalidDateFormat` naming the bad bound, or
    /// `StartAfterEnd`.
    pub fn parse<'a>(start: Option<&'a str>, end: Option<&'a str>) -> Result<Self, DateError> {
        let present = |bound: Option<&'a str>| bound.filter(|s| !s.is_empty());
        let (Some(start), Some(end)) = (present(start), present(end)) else {
            return Err(DateError::MissingBound);
        };
        let start_date = NaiveDate::parse_from_str(start, DATE_FORMAT)
            .map_err(|_| DateError::InvalidDateFormat(DateBound::Start))?;
        let end_date = NaiveDate::parse_from_str(end, DATE_FORMAT)
            .map_err(|_| DateError::InvalidDateFormat(DateBound::End))?;
        Self::new(start_date, end_date)
    }

    /// First day of the window.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the window.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// 00:00:00 UTC of the first day.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// 23:59:59 UTC of the last day.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true when `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Drops sub-second precision. Stored timestamps are whole seconds.
#[must_use]
pub fn normalize_timestamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(0)
}

/// Parses an occurrence timestamp in any accepted format.
///
/// Formats are tried in order: `dd-mm-yyyy`, `yyyy-mm-dd`,
/// `yyyy-mm-ddTHH:MM:SSZ`, RFC 3339 with offset, `mm/dd/yyyy`, `dd/mm/yyyy`.
/// Date-only inputs resolve to midnight UTC. The result is normalized to
/// whole seconds.
///
/// # Errors
///
/// Returns `UnrecognizedTimestamp` when no format matches.
pub fn parse_flexible(input: &str) -> Result<DateTime<Utc>, DateError> {
    let input = input.trim();
    let midnight = |date: NaiveDate| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));

    let parsed = NaiveDate::parse_from_str(input, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, DATE_FORMAT))
        .map(midnight)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT).map(|dt| Utc.from_utc_datetime(&dt))
        })
        .or_else(|_| DateTime::parse_from_rfc3339(input).map(|dt| dt.with_timezone(&Utc)))
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%m/%d/%Y")
                .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
                .map(midnight)
        })
        .map_err(|_| DateError::UnrecognizedTimestamp(input.to_string()))?;

    Ok(normalize_timestamp(parsed))
}

/// Timestamp that deserializes from any format [`parse_flexible`] accepts
/// and serializes as `yyyy-mm-ddTHH:MM:SSZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlexibleDate(pub DateTime<Utc>);

impl FlexibleDate {
    /// The UTC timestamp.
    #[must_use]
    pub const fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl Serialize for FlexibleDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(TIMESTAMP_FORMAT))
    }
}

impl<'de> Deserialize<'de> for FlexibleDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_flexible(&raw).map(Self).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_covers_whole_days() {
        let range = DateRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(range.start().to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(range.end().to_rfc3339(), "2024-01-31T23:59:59+00:00");
        assert!(range.contains(range.start()));
        assert!(range.contains(range.end()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::parse(Some("2024-03-05"), Some("2024-03-05")).unwrap();
        assert_eq!(range.start_date(), range.end_date());
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap()));
    }

    #[test]
    fn test_range_missing_bound() {
        assert_eq!(
            DateRange::parse(None, Some("2024-01-31")),
            Err(DateError::MissingBound)
        );
        assert_eq!(
            DateRange::parse(Some("2024-01-01"), None),
            Err(DateError::MissingBound)
        );
        assert_eq!(
            DateRange::parse(Some(""), Some("2024-01-31")),
            Err(DateError::MissingBound)
        );
        assert_eq!(
            DateRange::parse(Some("2024-01-01"), Some("")),
            Err(DateError::MissingBound)
        );
    }

    #[rstest]
    #[case(Some("01-01-2024"), Some("2024-01-31"), DateBound::Start)]
    #[case(Some("2024-13-01"), Some("2024-01-31"), DateBound::Start)]
    #[case(Some("2024-01-01"), Some("2024/01/31"), DateBound::End)]
    #[case(Some("2024-01-01"), Some("tomorrow"), DateBound::End)]
    fn test_range_bad_format_names_bound(
        #[case] start: Option<&str>,
        #[case] end: Option<&str>,
        #[case] bound: DateBound,
    ) {
        assert_eq!(
            DateRange::parse(start, end),
            Err(DateError::InvalidDateFormat(bound))
        );
    }

    #[test]
    fn test_range_reversed() {
        assert_eq!(
            DateRange::parse(Some("2024-02-01"), Some("2024-01-01")),
            Err(DateError::StartAfterEnd)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DateError::InvalidDateFormat(DateBound::Start).to_string(),
            "Invalid start_date format. Use YYYY-MM-DD"
        );
        assert_eq!(
            DateError::InvalidDateFormat(DateBound::End).to_string(),
            "Invalid end_date format. Use YYYY-MM-DD"
        );
    }

    #[rstest]
    #[case("15-01-2024", ymd(2024, 1, 15))]
    #[case("2024-01-15", ymd(2024, 1, 15))]
    #[case("01/15/2024", ymd(2024, 1, 15))]
    #[case("15/01/2024", ymd(2024, 1, 15))]
    #[case("02/03/2024", ymd(2024, 2, 3))]
    fn test_flexible_date_only_formats(#[case] input: &str, #[case] expected: NaiveDate) {
        let parsed = parse_flexible(input).unwrap();
        assert_eq!(parsed.date_naive(), expected);
        assert_eq!(parsed.time(), NaiveTime::MIN);
    }

    #[rstest]
    #[case("2024-01-15T10:30:00Z", "2024-01-15T10:30:00Z")]
    #[case("2024-01-15T10:30:00.750Z", "2024-01-15T10:30:00Z")]
    #[case("2024-01-15T17:30:00+07:00", "2024-01-15T10:30:00Z")]
    fn test_flexible_timestamps_normalize_to_utc_seconds(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        let parsed = parse_flexible(input).unwrap();
        assert_eq!(parsed.format(TIMESTAMP_FORMAT).to_string(), expected);
    }

    #[test]
    fn test_flexible_rejects_garbage() {
        assert_eq!(
            parse_flexible("next tuesday"),
            Err(DateError::UnrecognizedTimestamp("next tuesday".to_string()))
        );
    }

    #[test]
    fn test_flexible_date_serde() {
        let date: FlexibleDate = serde_json::from_str("\"15-01-2024\"").unwrap();
        assert_eq!(
            serde_json::to_string(&date).unwrap(),
            "\"2024-01-15T00:00:00Z\""
        );
        assert!(serde_json::from_str::<FlexibleDate>("\"someday\"").is_err());
    }
}
