use crate::errors::Result;
use crate::month::YearMonth;

/// whole-month arithmetic between a start month and a reference instant
///
/// Only the year and calendar month take part; day of month and time of day
/// are ignored. The reference may be anything convertible into a
/// [`YearMonth`], so a `DateTime<Tz>` is read in its own time zone.
pub struct InstallmentClock;

impl InstallmentClock {
    /// months from `start_month` to `reference`; negative when the reference
    /// precedes the start
    pub fn months_elapsed(start_month: YearMonth, reference: impl Into<YearMonth>) -> i64 {
        start_month.months_until(reference.into())
    }

    /// same as [`InstallmentClock::months_elapsed`] with an unparsed `YYYY-MM` start
    pub fn months_elapsed_str(start_month: &str, reference: impl Into<YearMonth>) -> Result<i64> {
        let start = YearMonth::parse(start_month)?;
        Ok(Self::months_elapsed(start, reference))
    }

    /// the month `count` months before the month containing `reference`
    pub fn months_ago(reference: impl Into<YearMonth>, count: u32) -> YearMonth {
        reference.into().add_months(-(count as i64))
    }
}
