//! Calendar date helpers for events.
//!
//! Events carry a single calendar date with no time-of-day or timezone. The
//! source encodes it as `DD/MM/YYYY`; this module parses that form into a
//! [`NaiveDate`], provides [`YearMonth`] for month filtering, and exposes the
//! process-local "today" used for upcoming/past classification.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A run of ASCII digits, optionally padded with whitespace.
static NUMERIC_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*$").expect("Invalid date component regex"));

/// Errors produced when parsing date strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// The string does not have exactly three `/`-separated components.
    #[error("expected DD/MM/YYYY, got {raw:?}")]
    WrongShape { raw: String },

    /// One of the components is not a number.
    #[error("non-numeric date component {component:?} in {raw:?}")]
    NotNumeric { raw: String, component: String },

    /// The components do not name a real calendar date.
    #[error("{day:02}/{month:02}/{year} is not a valid calendar date")]
    InvalidCalendarDate { day: u32, month: u32, year: i32 },

    /// A year-month value could not be parsed.
    #[error("expected YYYY-MM or MM/YYYY, got {raw:?}")]
    InvalidMonth { raw: String },
}

/// Parses an event date in the fixed `DD/MM/YYYY` format.
///
/// Each component may carry surrounding whitespace and leading zeros are
/// optional (`1/2/2030` is accepted). The result must be calendar-valid.
pub fn parse_event_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let parts: Vec<&str> = raw.split('/').collect();
    let [day, month, year_part] = parts.as_slice() else {
        return Err(DateParseError::WrongShape {
            raw: raw.to_string(),
        });
    };

    let day = numeric_component(raw, day)?;
    let month = numeric_component(raw, month)?;
    let year = parse_digits(year_part)
        .and_then(|year| i32::try_from(year).ok())
        .ok_or_else(|| DateParseError::NotNumeric {
            raw: raw.to_string(),
            component: year_part.to_string(),
        })?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateParseError::InvalidCalendarDate { day, month, year })
}

fn numeric_component(raw: &str, component: &str) -> Result<u32, DateParseError> {
    parse_digits(component).ok_or_else(|| DateParseError::NotNumeric {
        raw: raw.to_string(),
        component: component.to_string(),
    })
}

fn parse_digits(component: &str) -> Option<u32> {
    NUMERIC_COMPONENT
        .captures(component)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Formats a date in the source's `DD/MM/YYYY` form.
pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats a date in long form, e.g. `March 10, 2030`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Returns the current calendar day in the process's local timezone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// A calendar month of a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    /// The year.
    pub year: i32,
    /// The month, 1-12.
    pub month: u32,
}

impl YearMonth {
    /// Creates a year-month, returning `None` when `month` is outside 1-12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Returns the year-month a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns true if `date` falls within this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Returns the first day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = DateParseError;

    /// Accepts `YYYY-MM` or `MM/YYYY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DateParseError::InvalidMonth { raw: s.to_string() };
        let trimmed = s.trim();

        let (year, month) = if let Some((year, month)) = trimmed.split_once('-') {
            (year, month)
        } else if let Some((month, year)) = trimmed.split_once('/') {
            (year, month)
        } else {
            return Err(invalid());
        };

        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        let month: u32 = month.trim().parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod event_date {
        use super::*;

        #[test]
        fn parses_padded_and_unpadded() {
            assert_eq!(parse_event_date("10/03/2030").unwrap(), date(2030, 3, 10));
            assert_eq!(parse_event_date("1/2/2030").unwrap(), date(2030, 2, 1));
            assert_eq!(parse_event_date(" 05 / 06 / 2024 ").unwrap(), date(2024, 6, 5));
        }

        #[test]
        fn rejects_wrong_shape() {
            for raw in ["", "2030-03-10", "10/03", "10/03/2030/1", "10//03/2030"] {
                let err = parse_event_date(raw).unwrap_err();
                assert!(
                    matches!(
                        err,
                        DateParseError::WrongShape { .. } | DateParseError::NotNumeric { .. }
                    ),
                    "{raw:?} -> {err:?}"
                );
            }
            assert!(matches!(
                parse_event_date("10-03-2030"),
                Err(DateParseError::WrongShape { .. })
            ));
        }

        #[test]
        fn rejects_non_numeric_components() {
            let err = parse_event_date("aa/03/2030").unwrap_err();
            assert_eq!(
                err,
                DateParseError::NotNumeric {
                    raw: "aa/03/2030".to_string(),
                    component: "aa".to_string(),
                }
            );
            assert!(parse_event_date("10/-3/2030").is_err());
            assert!(parse_event_date("10/03/20x0").is_err());
        }

        #[test]
        fn rejects_invalid_calendar_dates() {
            assert_eq!(
                parse_event_date("31/02/2030").unwrap_err(),
                DateParseError::InvalidCalendarDate {
                    day: 31,
                    month: 2,
                    year: 2030,
                }
            );
            assert!(parse_event_date("31/04/2030").is_err());
            assert!(parse_event_date("00/04/2030").is_err());
            assert!(parse_event_date("10/13/2030").is_err());
            assert!(parse_event_date("29/02/2023").is_err());
            assert!(parse_event_date("29/02/2024").is_ok());
        }

        #[test]
        fn oversized_year_keeps_raw_component() {
            // 3000000000 fits in u32 but not in i32.
            let err = parse_event_date("01/01/3000000000").unwrap_err();
            assert_eq!(
                err,
                DateParseError::NotNumeric {
                    raw: "01/01/3000000000".to_string(),
                    component: "3000000000".to_string(),
                }
            );
            assert!(!err.to_string().contains("2147483647"));
        }

        #[test]
        fn error_messages() {
            let err = parse_event_date("31/02/2030").unwrap_err();
            assert_eq!(err.to_string(), "31/02/2030 is not a valid calendar date");

            let err = parse_event_date("tomorrow").unwrap_err();
            assert_eq!(err.to_string(), "expected DD/MM/YYYY, got \"tomorrow\"");
        }

        #[test]
        fn formatting() {
            assert_eq!(format_event_date(date(2030, 3, 10)), "10/03/2030");
            assert_eq!(format_long_date(date(2030, 3, 10)), "March 10, 2030");
            assert_eq!(format_long_date(date(2024, 12, 1)), "December 1, 2024");
        }
    }

    mod year_month {
        use super::*;

        #[test]
        fn rejects_out_of_range_month() {
            assert!(YearMonth::new(2030, 0).is_none());
            assert!(YearMonth::new(2030, 13).is_none());
            assert!(YearMonth::new(2030, 12).is_some());
        }

        #[test]
        fn contains_only_its_month() {
            let march = YearMonth::new(2030, 3).unwrap();
            assert!(march.contains(date(2030, 3, 1)));
            assert!(march.contains(date(2030, 3, 31)));
            assert!(!march.contains(date(2030, 4, 1)));
            assert!(!march.contains(date(2029, 3, 15)));
            assert_eq!(march.first_day(), Some(date(2030, 3, 1)));
            assert_eq!(YearMonth::of(date(2030, 3, 17)), march);
        }

        #[test]
        fn parses_both_forms() {
            let expected = YearMonth::new(2030, 3).unwrap();
            assert_eq!("2030-03".parse::<YearMonth>().unwrap(), expected);
            assert_eq!("2030-3".parse::<YearMonth>().unwrap(), expected);
            assert_eq!("03/2030".parse::<YearMonth>().unwrap(), expected);
            assert!("2030-13".parse::<YearMonth>().is_err());
            assert!("March 2030".parse::<YearMonth>().is_err());
        }

        #[test]
        fn display() {
            assert_eq!(YearMonth::new(2030, 3).unwrap().to_string(), "2030-03");
        }

        #[test]
        fn serde_roundtrip() {
            let ym = YearMonth::new(2030, 3).unwrap();
            let json = serde_json::to_string(&ym).unwrap();
            let parsed: YearMonth = serde_json::from_str(&json).unwrap();
            assert_eq!(ym, parsed);
        }
    }
}
