//! Calendar month used by budgets and statistics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A calendar month, written `YYYY-MM` on the wire.
///
/// Stored in the database as the first day of the month (`DATE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("period must be formatted as YYYY-MM (got {0:?})")]
pub struct PeriodParseError(String);

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The month containing `at` (UTC).
    pub fn containing(at: DateTime<Utc>) -> Self {
        let date = at.date_naive();
        // day 1 of an existing month always exists
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + Months::new(1))
    }

    pub fn minus_months(self, months: u32) -> Self {
        Self(self.0 - Months::new(months))
    }

    /// Inclusive start of the month at UTC midnight.
    pub fn start(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(chrono::NaiveTime::MIN))
    }

    /// Exclusive end: the start of the following month.
    pub fn end(self) -> DateTime<Utc> {
        self.next().start()
    }

    pub fn from_first_day(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(year, 4) || !digits(month, 2) {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let p: Period = "2025-03".parse().unwrap();
        assert_eq!(p.first_day(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(p.to_string(), "2025-03");
    }

    #[test]
    fn rejects_bad_input() {
        for bad in ["2025-13", "2025-3", "25-03", "2025/03", "2025-00", "", "+202-01", "2025-+1", "-202-01"] {
            assert!(bad.parse::<Period>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn month_arithmetic_crosses_years() {
        let dec: Period = "2024-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2025-01");
        assert_eq!(dec.minus_months(12).to_string(), "2023-12");
        assert_eq!(dec.end(), dec.next().start());
    }

    #[test]
    fn containing_truncates_to_first_day() {
        let at = Utc.with_ymd_and_hms(2025, 2, 17, 23, 59, 0).unwrap();
        assert_eq!(Period::containing(at).to_string(), "2025-02");
    }

    #[test]
    fn serde_uses_string_form() {
        let p: Period = serde_json::from_str("\"2025-07\"").unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"2025-07\"");
        assert!(serde_json::from_str::<Period>("\"July\"").is_err());
    }
}
