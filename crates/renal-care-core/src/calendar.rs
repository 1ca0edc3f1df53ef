//! Calendar arithmetic on owner-local dates.
//!
//! Instants are stored in UTC; everything the engine compares is a calendar
//! date in the owner's configured offset.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc, Weekday,
};

/// Strip the time of day from an instant, in the given offset.
pub fn date_only(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Whole days from `anchor` to `date`. Negative when `date` precedes `anchor`.
pub fn days_between(anchor: NaiveDate, date: NaiveDate) -> i64 {
    date.signed_duration_since(anchor).num_days()
}

/// Last millisecond of `date`, as a UTC instant.
///
/// History lookups probe this instant so a day resolves to the schedule
/// version in force when that day closed.
pub fn end_of_day(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::days(1) - Duration::milliseconds(1))
        .unwrap_or(NaiveDateTime::MAX);
    local_to_utc(local, offset)
}

/// The first day of the week containing `date`.
pub fn week_start_for(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(back)))
        .unwrap_or(date)
}

/// `count` consecutive dates beginning at `start`.
pub fn dates_from(start: NaiveDate, count: u32) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take(count as usize)
}

fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&local.checked_sub_signed(shift).unwrap_or(local))
}
