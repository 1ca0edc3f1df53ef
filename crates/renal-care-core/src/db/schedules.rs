//! Live schedule database operations.
//!
//! Every mutation records history before touching the live row, in the same
//! transaction.

use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{info, warn};

use super::history::{close_open_entry, insert_entry};
use super::{decode_timestamp, encode_timestamp, Database, DbError, DbResult};
use crate::models::{Frequency, Schedule, ScheduleHistoryEntry, TreatmentDetails, TreatmentType};

impl Database {
    /// Insert a new schedule and open its first history entry.
    pub fn create_schedule(&mut self, schedule: &Schedule) -> DbResult<()> {
        schedule.validate()?;

        let tx = self.transaction()?;
        insert_entry(
            &tx,
            &ScheduleHistoryEntry::new(schedule.clone(), schedule.created_at, None),
        )?;
        insert_schedule(&tx, schedule)?;
        tx.commit()?;

        info!(
            schedule_id = %schedule.schedule_id,
            pet_id = %schedule.pet_id,
            treatment = schedule.treatment_type().as_str(),
            "Created schedule"
        );
        Ok(())
    }

    /// Get a schedule by ID.
    pub fn get_schedule(&self, schedule_id: &str) -> DbResult<Option<Schedule>> {
        self.conn
            .query_row(
                r#"
                SELECT schedule_id, pet_id, treatment_type, frequency, reminder_times,
                       details, is_active, created_at, updated_at
                FROM schedules
                WHERE schedule_id = ?
                "#,
                [schedule_id],
                schedule_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List a pet's schedules, oldest first.
    pub fn list_schedules_for_pet(
        &self,
        pet_id: &str,
        include_inactive: bool,
    ) -> DbResult<Vec<Schedule>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT schedule_id, pet_id, treatment_type, frequency, reminder_times,
                   details, is_active, created_at, updated_at
            FROM schedules
            WHERE pet_id = ?1 AND (?2 OR is_active = 1)
            ORDER BY created_at ASC, schedule_id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![pet_id, include_inactive], schedule_row)?;

        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(row?.try_into()?);
        }
        Ok(schedules)
    }

    /// Replace a schedule's state as of `changed_at`, keeping the old state in
    /// history.
    ///
    /// The pet, the treatment type and the creation instant cannot change.
    /// Returns the stored new version.
    pub fn update_schedule_versioned(
        &mut self,
        updated: &Schedule,
        changed_at: DateTime<Utc>,
    ) -> DbResult<Schedule> {
        let previous = self
            .get_schedule(&updated.schedule_id)?
            .ok_or_else(|| DbError::NotFound(format!("Schedule {}", updated.schedule_id)))?;

        if updated.pet_id != previous.pet_id {
            return Err(DbError::Constraint(format!(
                "Schedule {} cannot move to another pet",
                updated.schedule_id
            )));
        }
        if updated.treatment_type() != previous.treatment_type() {
            return Err(DbError::Constraint(format!(
                "Schedule {} cannot change treatment type",
                updated.schedule_id
            )));
        }
        if changed_at < previous.updated_at {
            return Err(DbError::Constraint(format!(
                "Change at {} precedes the current version of schedule {} ({})",
                changed_at, updated.schedule_id, previous.updated_at
            )));
        }

        let next = Schedule {
            created_at: previous.created_at,
            updated_at: changed_at,
            ..updated.clone()
        };
        next.validate()?;

        let tx = self.transaction()?;
        if close_open_entry(&tx, &next.schedule_id, changed_at)? == 0 {
            // No open entry yet: preserve the state being replaced
            warn!(
                schedule_id = %next.schedule_id,
                "Schedule had no open history entry, backfilling previous version"
            );
            insert_entry(
                &tx,
                &ScheduleHistoryEntry::new(
                    previous.clone(),
                    previous.updated_at,
                    Some(changed_at),
                ),
            )?;
        }
        insert_entry(&tx, &ScheduleHistoryEntry::new(next.clone(), changed_at, None))?;
        update_schedule_row(&tx, &next)?;
        tx.commit()?;

        info!(
            schedule_id = %next.schedule_id,
            %changed_at,
            is_active = next.is_active,
            "Updated schedule"
        );
        Ok(next)
    }

    /// Stop a schedule imposing obligations from `at` on. History stays.
    ///
    /// Deactivating an inactive schedule changes nothing.
    pub fn deactivate_schedule(&mut self, schedule_id: &str, at: DateTime<Utc>) -> DbResult<Schedule> {
        let schedule = self
            .get_schedule(schedule_id)?
            .ok_or_else(|| DbError::NotFound(format!("Schedule {}", schedule_id)))?;
        if !schedule.is_active {
            return Ok(schedule);
        }

        let inactive = Schedule {
            is_active: false,
            ..schedule
        };
        self.update_schedule_versioned(&inactive, at)
    }
}

fn insert_schedule(conn: &Connection, schedule: &Schedule) -> DbResult<()> {
    let frequency_json = serde_json::to_string(&schedule.frequency)?;
    let reminder_times_json = serde_json::to_string(&schedule.reminder_times)?;
    let details_json = serde_json::to_string(&schedule.details)?;

    conn.execute(
        r#"
        INSERT INTO schedules (
            schedule_id, pet_id, treatment_type, frequency, reminder_times,
            details, is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            schedule.schedule_id,
            schedule.pet_id,
            schedule.treatment_type().as_str(),
            frequency_json,
            reminder_times_json,
            details_json,
            schedule.is_active,
            encode_timestamp(schedule.created_at),
            encode_timestamp(schedule.updated_at),
        ],
    )?;
    Ok(())
}

fn update_schedule_row(conn: &Connection, schedule: &Schedule) -> DbResult<()> {
    let frequency_json = serde_json::to_string(&schedule.frequency)?;
    let reminder_times_json = serde_json::to_string(&schedule.reminder_times)?;
    let details_json = serde_json::to_string(&schedule.details)?;

    conn.execute(
        r#"
        UPDATE schedules SET
            frequency = ?2,
            reminder_times = ?3,
            details = ?4,
            is_active = ?5,
            updated_at = ?6
        WHERE schedule_id = ?1
        "#,
        params![
            schedule.schedule_id,
            frequency_json,
            reminder_times_json,
            details_json,
            schedule.is_active,
            encode_timestamp(schedule.updated_at),
        ],
    )?;
    Ok(())
}

fn schedule_row(row: &Row<'_>) -> rusqlite::Result<ScheduleRow> {
    Ok(ScheduleRow {
        schedule_id: row.get(0)?,
        pet_id: row.get(1)?,
        treatment_type: row.get(2)?,
        frequency: row.get(3)?,
        reminder_times: row.get(4)?,
        details: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Intermediate row struct for database mapping.
struct ScheduleRow {
    schedule_id: String,
    pet_id: String,
    treatment_type: String,
    frequency: String,
    reminder_times: String,
    details: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = DbError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let frequency: Frequency = serde_json::from_str(&row.frequency)?;
        let reminder_times: Vec<NaiveTime> = serde_json::from_str(&row.reminder_times)?;
        let details: TreatmentDetails = serde_json::from_str(&row.details)?;

        let treatment_type = string_to_treatment_type(&row.treatment_type)?;
        if treatment_type != details.treatment_type() {
            return Err(DbError::Constraint(format!(
                "Schedule {} is stored as {} but has {} details",
                row.schedule_id,
                row.treatment_type,
                details.treatment_type().as_str()
            )));
        }

        let schedule = Schedule {
            schedule_id: row.schedule_id,
            pet_id: row.pet_id,
            frequency,
            reminder_times,
            details,
            is_active: row.is_active,
            created_at: decode_timestamp(&row.created_at)?,
            updated_at: decode_timestamp(&row.updated_at)?,
        };
        schedule.validate()?;
        Ok(schedule)
    }
}

fn string_to_treatment_type(s: &str) -> Result<TreatmentType, DbError> {
    TreatmentType::parse(s)
        .ok_or_else(|| DbError::Constraint(format!("Unknown treatment type: {}", s)))
}
