use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, TrackerError};

/// calendar month (year + month), day of month irrelevant
///
/// Ordering is chronological. The text form is `YYYY-MM`. Years are kept
/// inside the range chrono can turn into a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub const MIN_YEAR: i32 = -262_143;
    pub const MAX_YEAR: i32 = 262_142;

    pub const MIN: YearMonth = YearMonth {
        year: Self::MIN_YEAR,
        month: 1,
    };
    pub const MAX: YearMonth = YearMonth {
        year: Self::MAX_YEAR,
        month: 12,
    };

    /// create from year and month number (1-12)
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(TrackerError::InvalidMonthFormat {
                input: format!("{}-{}", year, month),
            });
        }
        Ok(Self { year, month })
    }

    /// parse `YYYY-MM` (a single digit month is accepted)
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || TrackerError::InvalidMonthFormat {
            input: input.to_string(),
        };

        let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;

        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// months since year 0, used for offset arithmetic
    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    /// callers keep `ordinal` between `MIN` and `MAX`
    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: (ordinal.rem_euclid(12) + 1) as u32,
        }
    }

    /// signed number of whole months from `self` to `other`
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.ordinal() - self.ordinal()
    }

    /// shift by a signed number of months, saturating at [`YearMonth::MIN`]
    /// and [`YearMonth::MAX`]
    pub fn add_months(&self, months: i64) -> Self {
        let ordinal = self
            .ordinal()
            .saturating_add(months)
            .clamp(Self::MIN.ordinal(), Self::MAX.ordinal());
        Self::from_ordinal(ordinal)
    }

    pub fn next(&self) -> Self {
        self.add_months(1)
    }

    pub fn previous(&self) -> Self {
        self.add_months(-1)
    }

    /// first calendar day of the month
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
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        YearMonth::parse(s)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for YearMonth {
    fn from(instant: DateTime<Tz>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }
}

impl<Tz: TimeZone> From<&DateTime<Tz>> for YearMonth {
    fn from(instant: &DateTime<Tz>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        YearMonth::parse(&raw).map_err(serde::de::Error::custom)
    }
}
