use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::core::{AppError, Result};

/// Calendar month arithmetic for due dates and monthly reporting windows.
///
/// Month-end policy: the day of month is clamped to the last day of the
/// target month, and every offset is taken from the original date so the
/// clamp never accumulates (Jan 31 + 1 = Feb 29/28, Jan 31 + 2 = Mar 31).
pub struct MonthCalendar;

impl MonthCalendar {
    /// Advance `date` by `months` calendar months
    pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
        date.checked_add_months(Months::new(months))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Cannot advance {} by {} months: date out of range",
                    date, months
                ))
            })
    }

    /// First day of the month containing `date`
    pub fn start_of_month(date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    /// Last day of the month containing `date`
    pub fn end_of_month(date: NaiveDate) -> NaiveDate {
        let first = Self::start_of_month(date);
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Inclusive timestamp window covering the whole month containing `date`
    pub fn month_window(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let start = Self::start_of_month(date).and_time(NaiveTime::MIN);
        let end = Self::end_of_month(date)
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or(NaiveDateTime::MAX);
        (start, end)
    }

    /// Whether two dates fall in the same calendar month
    pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
        a.year() == b.year() && a.month() == b.month()
    }
}
