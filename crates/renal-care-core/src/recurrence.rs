//! Recurrence resolution: does a schedule call for treatment on a given day?
//!
//! Every rule is a closed-form predicate over the whole-day distance from the
//! schedule's anchor (its local creation date). No iteration, no state.

use chrono::{Datelike, FixedOffset, NaiveDate, Offset, Utc};

use crate::calendar;
use crate::models::{Frequency, Schedule};

/// Evaluate a frequency rule for `date`, relative to `anchor`.
///
/// Dates before the anchor never apply.
pub fn rule_applies(frequency: &Frequency, anchor: NaiveDate, date: NaiveDate) -> bool {
    let days_since_anchor = calendar::days_between(anchor, date);
    if days_since_anchor < 0 {
        return false;
    }

    match frequency {
        Frequency::OnceDaily => true,
        Frequency::EveryOtherDay => days_since_anchor % 2 == 0,
        Frequency::EveryNDays { interval } => days_since_anchor % i64::from(interval.get()) == 0,
        Frequency::SpecificWeekdays { weekdays } => weekdays.contains(&date.weekday()),
    }
}

/// Resolves schedules against calendar dates in the owner's offset.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceResolver {
    offset: FixedOffset,
}

impl Default for RecurrenceResolver {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl RecurrenceResolver {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// The local date the schedule's recurrence is anchored to.
    pub fn anchor_date(&self, schedule: &Schedule) -> NaiveDate {
        calendar::date_only(schedule.created_at, self.offset)
    }

    /// Whether `schedule` requires action on `date`.
    pub fn applies(&self, schedule: &Schedule, date: NaiveDate) -> bool {
        rule_applies(&schedule.frequency, self.anchor_date(schedule), date)
    }

    /// Occurrences `schedule` requires on an applicable day.
    pub fn required_count(&self, schedule: &Schedule) -> u32 {
        schedule.required_count()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use chrono::{DateTime, NaiveTime, Weekday};

    use super::*;
    use crate::models::MedicationDetails;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule_created(frequency: Frequency, created_at: &str) -> Schedule {
        Schedule::new_medication(
            "pet-1".into(),
            MedicationDetails {
                name: "maropitant".into(),
                target_dosage: 8.0,
                unit: "mg".into(),
                strength: None,
            },
            frequency,
            vec![NaiveTime::from_hms_opt(9, 0, 0).unwrap()],
            DateTime::parse_from_rfc3339(created_at)
                .unwrap()
                .with_timezone(&Utc),
        )
        .unwrap()
    }

    #[test]
    fn test_once_daily() {
        let anchor = date(2025, 10, 13);
        assert!(!rule_applies(&Frequency::OnceDaily, anchor, date(2025, 10, 12)));
        assert!(rule_applies(&Frequency::OnceDaily, anchor, anchor));
        assert!(rule_applies(&Frequency::OnceDaily, anchor, date(2026, 3, 1)));
    }

    #[test]
    fn test_every_other_day_alternates_from_anchor() {
        let anchor = date(2025, 10, 13); // Monday
        let applies: Vec<bool> = calendar::dates_from(anchor, 7)
            .map(|d| rule_applies(&Frequency::EveryOtherDay, anchor, d))
            .collect();
        assert_eq!(applies, vec![true, false, true, false, true, false, true]);

        // Anchored on an odd day of the month, the parity shifts with it
        let odd_anchor = date(2025, 10, 14);
        assert!(rule_applies(&Frequency::EveryOtherDay, odd_anchor, date(2025, 10, 16)));
        assert!(!rule_applies(&Frequency::EveryOtherDay, odd_anchor, date(2025, 10, 15)));
    }

    #[test]
    fn test_every_n_days() {
        let every_third = Frequency::EveryNDays {
            interval: NonZeroU32::new(3).unwrap(),
        };
        let anchor = date(2025, 10, 30);
        assert!(rule_applies(&every_third, anchor, anchor));
        assert!(!rule_applies(&every_third, anchor, date(2025, 10, 31)));
        assert!(rule_applies(&every_third, anchor, date(2025, 11, 2)));
        assert!(!rule_applies(&every_third, anchor, date(2025, 10, 27)));
    }

    #[test]
    fn test_specific_weekdays() {
        let mon_thu = Frequency::SpecificWeekdays {
            weekdays: vec![Weekday::Mon, Weekday::Thu],
        };
        let anchor = date(2025, 10, 14); // Tuesday
        assert!(!rule_applies(&mon_thu, anchor, date(2025, 10, 13))); // before anchor
        assert!(!rule_applies(&mon_thu, anchor, date(2025, 10, 14)));
        assert!(rule_applies(&mon_thu, anchor, date(2025, 10, 16)));
        assert!(rule_applies(&mon_thu, anchor, date(2025, 10, 20)));
    }

    #[test]
    fn test_anchor_uses_local_date() {
        // 23:30 UTC on the 13th is already the 14th at UTC+2
        let schedule = schedule_created(Frequency::EveryOtherDay, "2025-10-13T23:30:00Z");

        let utc = RecurrenceResolver::default();
        assert_eq!(utc.anchor_date(&schedule), date(2025, 10, 13));
        assert!(utc.applies(&schedule, date(2025, 10, 15)));

        let plus_two = RecurrenceResolver::new(FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(plus_two.anchor_date(&schedule), date(2025, 10, 14));
        assert!(!plus_two.applies(&schedule, date(2025, 10, 13)));
        assert!(!plus_two.applies(&schedule, date(2025, 10, 15)));
        assert!(plus_two.applies(&schedule, date(2025, 10, 16)));
    }

    #[test]
    fn test_time_of_creation_does_not_matter() {
        let morning = schedule_created(Frequency::OnceDaily, "2025-10-13T06:00:00Z");
        let night = schedule_created(Frequency::OnceDaily, "2025-10-13T22:00:00Z");
        let resolver = RecurrenceResolver::default();

        assert!(resolver.applies(&morning, date(2025, 10, 13)));
        assert!(resolver.applies(&night, date(2025, 10, 13)));
        assert_eq!(resolver.required_count(&night), 1);
    }

    #[test]
    fn test_applies_is_idempotent() {
        let schedule = schedule_created(Frequency::EveryOtherDay, "2025-10-13T09:00:00Z");
        let resolver = RecurrenceResolver::default();
        let first: Vec<bool> = calendar::dates_from(date(2025, 10, 1), 60)
            .map(|d| resolver.applies(&schedule, d))
            .collect();
        let second: Vec<bool> = calendar::dates_from(date(2025, 10, 1), 60)
            .map(|d| resolver.applies(&schedule, d))
            .collect();
        assert_eq!(first, second);
    }
}
