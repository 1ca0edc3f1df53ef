//! Schedule history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schedule::Schedule;

/// Immutable snapshot of a schedule, valid over `[effective_from, effective_to)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleHistoryEntry {
    /// Unique entry ID
    pub entry_id: String,
    /// Schedule this entry versions
    pub schedule_id: String,
    /// Field values while this version was in force
    pub snapshot: Schedule,
    /// Instant the version took effect
    pub effective_from: DateTime<Utc>,
    /// Instant the version was superseded; `None` while current
    pub effective_to: Option<DateTime<Utc>>,
}

impl ScheduleHistoryEntry {
    pub fn new(
        snapshot: Schedule,
        effective_from: DateTime<Utc>,
        effective_to: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            schedule_id: snapshot.schedule_id.clone(),
            snapshot,
            effective_from,
            effective_to,
        }
    }

    /// Still in force (not yet superseded).
    pub fn is_current(&self) -> bool {
        self.effective_to.is_none()
    }

    /// Whether `at` falls inside the validity interval.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.effective_from <= at && self.effective_to.map_or(true, |to| at < to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, MedicationDetails};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn snapshot() -> Schedule {
        Schedule::new_medication(
            "pet-1".into(),
            MedicationDetails {
                name: "amlodipine".into(),
                target_dosage: 0.625,
                unit: "mg".into(),
                strength: None,
            },
            Frequency::OnceDaily,
            vec![],
            utc("2025-10-01T08:00:00Z"),
        )
        .unwrap()
    }

    #[test]
    fn test_interval_is_half_open() {
        let entry = ScheduleHistoryEntry::new(
            snapshot(),
            utc("2025-10-01T08:00:00Z"),
            Some(utc("2025-10-10T12:00:00Z")),
        );

        assert!(!entry.is_current());
        assert!(!entry.contains(utc("2025-10-01T07:59:59Z")));
        assert!(entry.contains(utc("2025-10-01T08:00:00Z")));
        assert!(entry.contains(utc("2025-10-10T11:59:59Z")));
        assert!(!entry.contains(utc("2025-10-10T12:00:00Z")));
    }

    #[test]
    fn test_open_entry_contains_future() {
        let schedule = snapshot();
        let entry = ScheduleHistoryEntry::new(schedule.clone(), schedule.created_at, None);

        assert!(entry.is_current());
        assert_eq!(entry.schedule_id, schedule.schedule_id);
        assert!(entry.contains(utc("2030-01-01T00:00:00Z")));
    }
}
