//! Schedule history database operations.
//!
//! Entries are appended and, at most once, closed. Nothing else ever changes;
//! the schema's triggers reject any other write.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::{decode_timestamp, encode_timestamp, Database, DbError, DbResult};
use crate::history::ScheduleHistory;
use crate::models::{Schedule, ScheduleHistoryEntry};

impl Database {
    /// Append an immutable snapshot valid over `[effective_from, effective_to)`.
    pub fn save_schedule_snapshot(
        &self,
        schedule_id: &str,
        snapshot: &Schedule,
        effective_from: DateTime<Utc>,
        effective_to: Option<DateTime<Utc>>,
    ) -> DbResult<ScheduleHistoryEntry> {
        if snapshot.schedule_id != schedule_id {
            return Err(DbError::Constraint(format!(
                "Snapshot of schedule {} cannot be saved under {}",
                snapshot.schedule_id, schedule_id
            )));
        }
        if effective_to.is_some_and(|to| to < effective_from) {
            return Err(DbError::Constraint(format!(
                "History entry for {} would end before it starts",
                schedule_id
            )));
        }

        let entry = ScheduleHistoryEntry::new(snapshot.clone(), effective_from, effective_to);
        insert_entry(&self.conn, &entry)?;
        Ok(entry)
    }

    /// Close the open entry of a schedule at `at`.
    ///
    /// Returns false when there is no open entry, or it opened after `at`.
    pub fn supersede_schedule_version(
        &self,
        schedule_id: &str,
        at: DateTime<Utc>,
    ) -> DbResult<bool> {
        Ok(close_open_entry(&self.conn, schedule_id, at)? > 0)
    }

    /// The snapshot in force at `at`, or `None` when history does not cover it.
    ///
    /// Equal `effective_from` values resolve to the most recently written entry.
    pub fn schedule_version_at(
        &self,
        schedule_id: &str,
        at: DateTime<Utc>,
    ) -> DbResult<Option<Schedule>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT entry_id, schedule_id, snapshot, effective_from, effective_to
                FROM schedule_history
                WHERE schedule_id = ?1 AND effective_from <= ?2
                ORDER BY effective_from DESC, rowid DESC
                LIMIT 1
                "#,
                params![schedule_id, encode_timestamp(at)],
                history_row,
            )
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        let entry = ScheduleHistoryEntry::try_from(row)?;
        Ok(entry.contains(at).then_some(entry.snapshot))
    }

    /// All entries of a schedule, oldest first.
    pub fn list_schedule_history(&self, schedule_id: &str) -> DbResult<Vec<ScheduleHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT entry_id, schedule_id, snapshot, effective_from, effective_to
            FROM schedule_history
            WHERE schedule_id = ?
            ORDER BY effective_from ASC, rowid ASC
            "#,
        )?;

        let rows = stmt.query_map([schedule_id], history_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }

    /// Build the in-memory history index for a set of schedules.
    pub fn load_schedule_history<'a, I>(&self, schedule_ids: I) -> DbResult<ScheduleHistory>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut history = ScheduleHistory::new();
        for schedule_id in schedule_ids {
            for entry in self.list_schedule_history(schedule_id)? {
                history.insert(entry);
            }
        }
        Ok(history)
    }
}

/// Append an entry on any connection or transaction.
pub(super) fn insert_entry(conn: &Connection, entry: &ScheduleHistoryEntry) -> DbResult<()> {
    let snapshot_json = serde_json::to_string(&entry.snapshot)?;

    conn.execute(
        r#"
        INSERT INTO schedule_history (
            entry_id, schedule_id, snapshot, effective_from, effective_to
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            entry.entry_id,
            entry.schedule_id,
            snapshot_json,
            encode_timestamp(entry.effective_from),
            entry.effective_to.map(encode_timestamp),
        ],
    )?;

    info!(
        schedule_id = %entry.schedule_id,
        effective_from = %entry.effective_from,
        closed = entry.effective_to.is_some(),
        "Recorded schedule version"
    );
    Ok(())
}

/// Close the open entry of a schedule. Returns the number of entries closed.
pub(super) fn close_open_entry(
    conn: &Connection,
    schedule_id: &str,
    at: DateTime<Utc>,
) -> DbResult<usize> {
    let at = encode_timestamp(at);
    let rows_affected = conn.execute(
        r#"
        UPDATE schedule_history SET effective_to = ?2
        WHERE schedule_id = ?1 AND effective_to IS NULL AND effective_from <= ?2
        "#,
        params![schedule_id, at],
    )?;
    Ok(rows_affected)
}

fn history_row(row: &Row<'_>) -> rusqlite::Result<HistoryRow> {
    Ok(HistoryRow {
        entry_id: row.get(0)?,
        schedule_id: row.get(1)?,
        snapshot: row.get(2)?,
        effective_from: row.get(3)?,
        effective_to: row.get(4)?,
    })
}

/// Intermediate row struct for database mapping.
struct HistoryRow {
    entry_id: String,
    schedule_id: String,
    snapshot: String,
    effective_from: String,
    effective_to: Option<String>,
}

impl TryFrom<HistoryRow> for ScheduleHistoryEntry {
    type Error = DbError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let snapshot: Schedule = serde_json::from_str(&row.snapshot)?;
        snapshot.validate()?;

        Ok(ScheduleHistoryEntry {
            entry_id: row.entry_id,
            schedule_id: row.schedule_id,
            snapshot,
            effective_from: decode_timestamp(&row.effective_from)?,
            effective_to: row.effective_to.as_deref().map(decode_timestamp).transpose()?,
        })
    }
}
