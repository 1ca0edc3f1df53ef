//! Schedule history integration tests.
//!
//! Past days must be judged against the schedule as it stood on that day,
//! through the store and through the in-memory index alike.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use renal_care_core::db::Database;
use renal_care_core::models::{DayStatus, Frequency, MedicationDetails, Schedule, TreatmentType};
use renal_care_core::AdherenceCalculator;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
}

fn at(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, d, h, 0, 0).unwrap()
}

fn make_schedule(frequency: Frequency, reminder_hours: &[u32]) -> Schedule {
    Schedule::new_medication(
        "pet-1".into(),
        MedicationDetails {
            name: "amlodipine".into(),
            target_dosage: 0.625,
            unit: "mg".into(),
            strength: None,
        },
        frequency,
        reminder_hours
            .iter()
            .map(|&h| NaiveTime::from_hms_opt(h, 0, 0).unwrap())
            .collect(),
        at(13, 8),
    )
    .unwrap()
}

fn week_statuses(db: &Database, pet_id: &str, now: DateTime<Utc>) -> Result<Vec<DayStatus>> {
    let schedules = db.list_schedules_for_pet(pet_id, true)?;
    let history = db.load_schedule_history(schedules.iter().map(|s| s.schedule_id.as_str()))?;
    let summaries = db.fetch_daily_summaries(pet_id, date(13)..=date(19))?;

    let calculator = AdherenceCalculator::utc(&history);
    let statuses = calculator.compute_week_statuses(date(13), &schedules, None, &summaries, now);
    Ok(statuses.into_values().collect())
}

#[test]
fn test_edit_does_not_rewrite_past_days() -> Result<()> {
    let mut db = Database::open_in_memory()?;
    let schedule = make_schedule(Frequency::OnceDaily, &[9]);
    db.create_schedule(&schedule)?;

    // One dose logged every day Monday through Wednesday
    for d in 13..=15 {
        db.increment_daily_summary("pet-1", date(d), TreatmentType::Medication, 1)?;
    }
    let before = week_statuses(&db, "pet-1", at(16, 10))?;
    assert_eq!(&before[..3], &[DayStatus::Complete; 3]);

    // Thursday morning: the vet raises it to twice daily
    let mut twice = schedule.clone();
    twice.reminder_times.push(NaiveTime::from_hms_opt(21, 0, 0).unwrap());
    db.update_schedule_versioned(&twice, at(16, 8))?;

    let after = week_statuses(&db, "pet-1", at(16, 10))?;
    assert_eq!(after, before);

    // Thursday itself is judged by the new version
    db.increment_daily_summary("pet-1", date(16), TreatmentType::Medication, 1)?;
    let thursday = week_statuses(&db, "pet-1", at(16, 10))?[3];
    assert_eq!(thursday, DayStatus::Today);
    db.increment_daily_summary("pet-1", date(16), TreatmentType::Medication, 1)?;
    let thursday = week_statuses(&db, "pet-1", at(16, 22))?[3];
    assert_eq!(thursday, DayStatus::Complete);
    Ok(())
}

#[test]
fn test_frequency_change_keeps_old_rule_for_past() -> Result<()> {
    let mut db = Database::open_in_memory()?;
    let schedule = make_schedule(Frequency::EveryOtherDay, &[]);
    db.create_schedule(&schedule)?;

    let daily = Schedule {
        frequency: Frequency::OnceDaily,
        ..schedule.clone()
    };
    db.update_schedule_versioned(&daily, at(16, 12))?;

    let statuses = week_statuses(&db, "pet-1", at(20, 9))?;
    use DayStatus::{Missed, None as Free};
    // Every other day until Wednesday, daily from Thursday
    assert_eq!(
        statuses,
        vec![Missed, Free, Missed, Missed, Missed, Missed, Missed]
    );
    Ok(())
}

#[test]
fn test_deactivation_stops_future_obligations_only() -> Result<()> {
    let mut db = Database::open_in_memory()?;
    let schedule = make_schedule(Frequency::OnceDaily, &[9]);
    db.create_schedule(&schedule)?;
    db.upsert_daily_summary(&renal_care_core::DailySummary {
        pet_id: "pet-1".into(),
        date: date(13),
        medication_doses: 1,
        fluid_sessions: 0,
    })?;

    db.deactivate_schedule(&schedule.schedule_id, at(15, 12))?;
    assert!(db.list_schedules_for_pet("pet-1", false)?.is_empty());

    let statuses = week_statuses(&db, "pet-1", at(20, 9))?;
    use DayStatus::{Complete, Missed, None as Free};
    // Deactivated during Wednesday: the day closes inactive
    assert_eq!(statuses, vec![Complete, Missed, Free, Free, Free, Free, Free]);
    Ok(())
}

#[test]
fn test_store_and_index_agree() -> Result<()> {
    let mut db = Database::open_in_memory()?;
    let schedule = make_schedule(Frequency::OnceDaily, &[9]);
    let id = schedule.schedule_id.clone();
    db.create_schedule(&schedule)?;

    let mut current = schedule.clone();
    for (d, hours) in [(14, vec![8]), (16, vec![8, 20]), (18, vec![7])] {
        current.reminder_times = hours
            .into_iter()
            .map(|h| NaiveTime::from_hms_opt(h, 0, 0).unwrap())
            .collect();
        current = db.update_schedule_versioned(&current, at(d, 12))?;
    }

    let index = db.load_schedule_history([id.as_str()])?;
    assert_eq!(index.len(), 4);

    for d in 12..=20 {
        for h in [0, 11, 12, 23] {
            let probe = at(d, h);
            assert_eq!(
                db.schedule_version_at(&id, probe)?.as_ref(),
                index.version_at(&id, probe),
                "Disagreement at {}",
                probe
            );
        }
    }
    Ok(())
}

#[test]
fn test_history_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("renal-care.db");

    let schedule = make_schedule(Frequency::OnceDaily, &[9, 21]);
    {
        let mut db = Database::open(&path)?;
        db.create_schedule(&schedule)?;
        let once = Schedule {
            reminder_times: vec![NaiveTime::from_hms_opt(9, 0, 0).unwrap()],
            ..schedule.clone()
        };
        db.update_schedule_versioned(&once, at(15, 12))?;
    }

    let db = Database::open(&path)?;
    let entries = db.list_schedule_history(&schedule.schedule_id)?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].snapshot, schedule);
    assert_eq!(entries[0].effective_to, Some(at(15, 12)));
    assert!(entries[1].is_current());

    // Append-only survives the reopen too
    let deleted = db
        .conn()
        .execute("DELETE FROM schedule_history", []);
    assert!(deleted.is_err());
    Ok(())
}
