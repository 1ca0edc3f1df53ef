//! In-memory index over schedule history for point-in-time lookups.
//!
//! Built once from entries fetched out of the store, then read-only. Lookups
//! follow the same rule as [`crate::db::Database::schedule_version_at`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{Schedule, ScheduleHistoryEntry};

/// Schedule history grouped by schedule, ordered by `effective_from`.
#[derive(Debug, Clone, Default)]
pub struct ScheduleHistory {
    by_schedule: HashMap<String, Vec<ScheduleHistoryEntry>>,
}

impl ScheduleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Entries with equal `effective_from` keep insertion order,
    /// so the later-written one wins lookups.
    pub fn insert(&mut self, entry: ScheduleHistoryEntry) {
        let entries = self
            .by_schedule
            .entry(entry.schedule_id.clone())
            .or_default();
        let position = entries.partition_point(|e| e.effective_from <= entry.effective_from);
        entries.insert(position, entry);
    }

    /// All entries for a schedule, oldest first.
    pub fn entries(&self, schedule_id: &str) -> &[ScheduleHistoryEntry] {
        self.by_schedule
            .get(schedule_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The entry in force at `at`, if history covers that instant.
    ///
    /// Takes the latest entry with `effective_from <= at`, then checks that it
    /// had not been superseded by `at`.
    pub fn entry_at(&self, schedule_id: &str, at: DateTime<Utc>) -> Option<&ScheduleHistoryEntry> {
        let entries = self.entries(schedule_id);
        let candidates = entries.partition_point(|e| e.effective_from <= at);
        let latest = entries.get(candidates.checked_sub(1)?)?;
        latest.contains(at).then_some(latest)
    }

    /// The schedule version in force at `at`, if history covers that instant.
    pub fn version_at(&self, schedule_id: &str, at: DateTime<Utc>) -> Option<&Schedule> {
        self.entry_at(schedule_id, at).map(|entry| &entry.snapshot)
    }

    /// The version in force at `at`, falling back to the live schedule.
    pub fn effective<'a>(&'a self, live: &'a Schedule, at: DateTime<Utc>) -> &'a Schedule {
        self.version_at(&live.schedule_id, at).unwrap_or(live)
    }

    /// Number of entries across all schedules.
    pub fn len(&self) -> usize {
        self.by_schedule.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_schedule.values().all(Vec::is_empty)
    }
}

impl FromIterator<ScheduleHistoryEntry> for ScheduleHistory {
    fn from_iter<I: IntoIterator<Item = ScheduleHistoryEntry>>(iter: I) -> Self {
        let mut history = Self::new();
        for entry in iter {
            history.insert(entry);
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, MedicationDetails};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn live_schedule() -> Schedule {
        Schedule::new_medication(
            "pet-1".into(),
            MedicationDetails {
                name: "calcitriol".into(),
                target_dosage: 1.0,
                unit: "capsule".into(),
                strength: None,
            },
            Frequency::OnceDaily,
            vec![],
            utc("2025-10-01T08:00:00Z"),
        )
        .unwrap()
    }

    fn version(live: &Schedule, frequency: Frequency, dosage: f64) -> Schedule {
        let mut snapshot = live.clone();
        snapshot.frequency = frequency;
        if let crate::models::TreatmentDetails::Medication(med) = &mut snapshot.details {
            med.target_dosage = dosage;
        }
        snapshot
    }

    #[test]
    fn test_empty_history_falls_back_to_live() {
        let history = ScheduleHistory::new();
        let live = live_schedule();

        assert!(history.is_empty());
        assert!(history
            .version_at(&live.schedule_id, utc("2025-10-05T00:00:00Z"))
            .is_none());
        assert_eq!(history.effective(&live, utc("2025-10-05T00:00:00Z")), &live);
    }

    #[test]
    fn test_version_at_picks_containing_interval() {
        let live = live_schedule();
        let v1 = version(&live, Frequency::OnceDaily, 1.0);
        let v2 = version(&live, Frequency::EveryOtherDay, 2.0);

        let history: ScheduleHistory = vec![
            ScheduleHistoryEntry::new(v2.clone(), utc("2025-10-10T12:00:00Z"), None),
            ScheduleHistoryEntry::new(
                v1.clone(),
                utc("2025-10-01T08:00:00Z"),
                Some(utc("2025-10-10T12:00:00Z")),
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.version_at(&live.schedule_id, utc("2025-10-05T00:00:00Z")),
            Some(&v1)
        );
        assert_eq!(
            history.version_at(&live.schedule_id, utc("2025-10-10T11:59:59Z")),
            Some(&v1)
        );
        assert_eq!(
            history.version_at(&live.schedule_id, utc("2025-10-10T12:00:00Z")),
            Some(&v2)
        );
        assert_eq!(
            history.version_at(&live.schedule_id, utc("2027-01-01T00:00:00Z")),
            Some(&v2)
        );
    }

    #[test]
    fn test_before_history_is_not_found() {
        let live = live_schedule();
        let history: ScheduleHistory = vec![ScheduleHistoryEntry::new(
            live.clone(),
            utc("2025-10-01T08:00:00Z"),
            None,
        )]
        .into_iter()
        .collect();

        assert!(history
            .version_at(&live.schedule_id, utc("2025-09-30T00:00:00Z"))
            .is_none());
    }

    #[test]
    fn test_gap_after_closed_entry_is_not_found() {
        let live = live_schedule();
        let history: ScheduleHistory = vec![ScheduleHistoryEntry::new(
            live.clone(),
            utc("2025-10-01T08:00:00Z"),
            Some(utc("2025-10-03T08:00:00Z")),
        )]
        .into_iter()
        .collect();

        // Superseded and nothing newer recorded: caller uses the live schedule
        assert!(history
            .version_at(&live.schedule_id, utc("2025-10-04T00:00:00Z"))
            .is_none());
    }

    #[test]
    fn test_tie_break_prefers_latest_written() {
        let live = live_schedule();
        let first = version(&live, Frequency::OnceDaily, 1.0);
        let second = version(&live, Frequency::EveryOtherDay, 3.0);
        let from = utc("2025-10-01T08:00:00Z");

        let mut history = ScheduleHistory::new();
        history.insert(ScheduleHistoryEntry::new(first, from, None));
        history.insert(ScheduleHistoryEntry::new(second.clone(), from, None));

        assert_eq!(
            history.version_at(&live.schedule_id, utc("2025-10-02T00:00:00Z")),
            Some(&second)
        );
    }

    #[test]
    fn test_entries_are_per_schedule() {
        let a = live_schedule();
        let b = live_schedule();
        let history: ScheduleHistory = vec![
            ScheduleHistoryEntry::new(a.clone(), a.created_at, None),
            ScheduleHistoryEntry::new(b.clone(), b.created_at, None),
        ]
        .into_iter()
        .collect();

        assert_eq!(history.entries(&a.schedule_id).len(), 1);
        assert_eq!(history.entries(&b.schedule_id).len(), 1);
        assert!(history.entries("unknown").is_empty());
    }
}
