//! Daily summary database operations.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use super::{decode_date, encode_date, Database, DbError, DbResult};
use crate::models::{DailySummaries, DailySummary, TreatmentType};

impl Database {
    /// Insert or replace the totals for one pet and day.
    pub fn upsert_daily_summary(&self, summary: &DailySummary) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO daily_summaries (pet_id, date, medication_doses, fluid_sessions)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (pet_id, date) DO UPDATE SET
                medication_doses = excluded.medication_doses,
                fluid_sessions = excluded.fluid_sessions,
                updated_at = datetime('now')
            "#,
            params![
                summary.pet_id,
                encode_date(summary.date),
                summary.medication_doses,
                summary.fluid_sessions,
            ],
        )?;
        Ok(())
    }

    /// Add `count` logged occurrences of one treatment type to a day.
    ///
    /// Returns the day's totals after the increment. A total that would
    /// overflow `u32` fails with [`DbError::Constraint`] and leaves the row as it was.
    pub fn increment_daily_summary(
        &self,
        pet_id: &str,
        date: NaiveDate,
        treatment: TreatmentType,
        count: u32,
    ) -> DbResult<DailySummary> {
        let (medication_doses, fluid_sessions) = match treatment {
            TreatmentType::Medication => (count, 0),
            TreatmentType::Fluid => (0, count),
        };

        self.conn
            .execute(
                r#"
                INSERT INTO daily_summaries (pet_id, date, medication_doses, fluid_sessions)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT (pet_id, date) DO UPDATE SET
                    medication_doses = medication_doses + excluded.medication_doses,
                    fluid_sessions = fluid_sessions + excluded.fluid_sessions,
                    updated_at = datetime('now')
                "#,
                params![pet_id, encode_date(date), medication_doses, fluid_sessions],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    DbError::Constraint(format!(
                        "{} total for {} on {} would overflow",
                        treatment.as_str(),
                        pet_id,
                        date
                    ))
                }
                other => DbError::Sqlite(other),
            })?;

        debug!(
            pet_id,
            %date,
            treatment = treatment.as_str(),
            count,
            "Incremented daily summary"
        );

        self.get_daily_summary(pet_id, date)?
            .ok_or_else(|| DbError::NotFound(format!("Daily summary {} {}", pet_id, date)))
    }

    /// Get the totals for one pet and day.
    pub fn get_daily_summary(
        &self,
        pet_id: &str,
        date: NaiveDate,
    ) -> DbResult<Option<DailySummary>> {
        self.conn
            .query_row(
                r#"
                SELECT pet_id, date, medication_doses, fluid_sessions
                FROM daily_summaries
                WHERE pet_id = ?1 AND date = ?2
                "#,
                params![pet_id, encode_date(date)],
                summary_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Summaries for every stored day of `dates`, keyed by date.
    ///
    /// Days with nothing logged are absent from the map.
    pub fn fetch_daily_summaries(
        &self,
        pet_id: &str,
        dates: RangeInclusive<NaiveDate>,
    ) -> DbResult<DailySummaries> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT pet_id, date, medication_doses, fluid_sessions
            FROM daily_summaries
            WHERE pet_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY date
            "#,
        )?;

        let rows = stmt.query_map(
            params![pet_id, encode_date(*dates.start()), encode_date(*dates.end())],
            summary_row,
        )?;

        let mut summaries = DailySummaries::new();
        for row in rows {
            let summary: DailySummary = row?.try_into()?;
            summaries.insert(summary.date, summary);
        }
        Ok(summaries)
    }
}

fn summary_row(row: &Row<'_>) -> rusqlite::Result<SummaryRow> {
    Ok(SummaryRow {
        pet_id: row.get(0)?,
        date: row.get(1)?,
        medication_doses: row.get(2)?,
        fluid_sessions: row.get(3)?,
    })
}

/// Intermediate row struct for database mapping.
struct SummaryRow {
    pet_id: String,
    date: String,
    medication_doses: u32,
    fluid_sessions: u32,
}

impl TryFrom<SummaryRow> for DailySummary {
    type Error = DbError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(DailySummary {
            pet_id: row.pet_id,
            date: decode_date(&row.date)?,
            medication_doses: row.medication_doses,
            fluid_sessions: row.fluid_sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    #[test]
    fn test_upsert_replaces_totals() {
        let db = Database::open_in_memory().unwrap();
        let mut summary = DailySummary::empty("pet-1".into(), date(13));
        summary.medication_doses = 2;
        db.upsert_daily_summary(&summary).unwrap();

        summary.medication_doses = 1;
        summary.fluid_sessions = 1;
        db.upsert_daily_summary(&summary).unwrap();

        assert_eq!(db.get_daily_summary("pet-1", date(13)).unwrap(), Some(summary));
    }

    #[test]
    fn test_increment_accumulates() {
        let db = Database::open_in_memory().unwrap();

        db.increment_daily_summary("pet-1", date(14), TreatmentType::Medication, 1)
            .unwrap();
        db.increment_daily_summary("pet-1", date(14), TreatmentType::Fluid, 1)
            .unwrap();
        let totals = db
            .increment_daily_summary("pet-1", date(14), TreatmentType::Medication, 1)
            .unwrap();

        assert_eq!(totals.medication_doses, 2);
        assert_eq!(totals.fluid_sessions, 1);
    }

    #[test]
    fn test_increment_overflow_leaves_row_intact() {
        let db = Database::open_in_memory().unwrap();
        db.increment_daily_summary("pet-1", date(14), TreatmentType::Medication, u32::MAX)
            .unwrap();

        let result = db.increment_daily_summary("pet-1", date(14), TreatmentType::Medication, 1);
        assert!(matches!(result, Err(DbError::Constraint(_))));

        let week = db.fetch_daily_summaries("pet-1", date(13)..=date(19)).unwrap();
        assert_eq!(week[&date(14)].medication_doses, u32::MAX);
    }

    #[test]
    fn test_fetch_range_is_inclusive_and_per_pet() {
        let db = Database::open_in_memory().unwrap();
        for d in 12..=20 {
            db.increment_daily_summary("pet-1", date(d), TreatmentType::Medication, d)
                .unwrap();
        }
        db.increment_daily_summary("pet-2", date(15), TreatmentType::Fluid, 1)
            .unwrap();

        let week = db.fetch_daily_summaries("pet-1", date(13)..=date(19)).unwrap();
        assert_eq!(week.len(), 7);
        assert!(!week.contains_key(&date(12)));
        assert_eq!(week[&date(19)].medication_doses, 19);
        assert_eq!(week[&date(15)].fluid_sessions, 0);
    }

    #[test]
    fn test_missing_day_is_absent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_daily_summary("pet-1", date(13)).unwrap().is_none());
        assert!(db
            .fetch_daily_summaries("pet-1", date(13)..=date(19))
            .unwrap()
            .is_empty());
    }
}
