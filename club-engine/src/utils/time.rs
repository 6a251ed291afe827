//! 时间工具函数 — 俱乐部时区
//!
//! Storage and the engine API speak Unix millis. Calendar questions (which
//! day, is it a weekend, which billing month) are answered in the club time
//! zone here and nowhere else.

use chrono::{DateTime, Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Unix millis → 俱乐部时区的日历日期
pub fn local_date(millis: i64, tz: Tz) -> NaiveDate {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
        .date_naive()
}

/// First and last calendar day touched by the half-open interval `[start, end)`
///
/// An interval ending exactly at local midnight does not touch the next day.
pub fn touched_days(start: i64, end: i64, tz: Tz) -> (NaiveDate, NaiveDate) {
    let first = local_date(start, tz);
    let last = local_date((end - 1).max(start), tz);
    (first, last)
}

/// Inclusive count of calendar days touched by `[start, end)`
pub fn day_span(start: i64, end: i64, tz: Tz) -> u32 {
    let (first, last) = touched_days(start, end, tz);
    (last - first).num_days().max(0) as u32 + 1
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Saturdays and Sundays touched by `[start, end)` that fall in `year`
pub fn weekend_days_in_year(start: i64, end: i64, year: i32, tz: Tz) -> u32 {
    let (first, last) = touched_days(start, end, tz);
    let (Some(jan_1), Some(dec_31)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return 0;
    };
    let from = first.max(jan_1);
    let to = last.min(dec_31);
    if from > to {
        return 0;
    }
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| is_weekend(*d))
        .count() as u32
}

/// Saturdays and Sundays touched by `[start, end)`
pub fn weekend_days(start: i64, end: i64, tz: Tz) -> u32 {
    let (first, last) = touched_days(start, end, tz);
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| is_weekend(*d))
        .count() as u32
}

/// Billing month key (`YYYY-MM`) for a timestamp
pub fn billing_period(millis: i64, tz: Tz) -> String {
    local_date(millis, tz).format("%Y-%m").to_string()
}
