//! SQLite schema definition.

/// Complete database schema for renal-care.
///
/// Timestamps are RFC 3339 UTC text with nanosecond precision; dates are
/// `YYYY-MM-DD`. Both compare correctly as text.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Schedules (live state, mutable)
-- ============================================================================

CREATE TABLE IF NOT EXISTS schedules (
    schedule_id TEXT PRIMARY KEY,
    pet_id TEXT NOT NULL,
    treatment_type TEXT NOT NULL CHECK (treatment_type IN ('medication', 'fluid')),
    frequency TEXT NOT NULL,                     -- JSON object {kind, ...}
    reminder_times TEXT NOT NULL DEFAULT '[]',   -- JSON array of "HH:MM:SS"
    details TEXT NOT NULL,                       -- JSON object {type, ...}
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_schedules_pet ON schedules(pet_id, is_active);

-- ============================================================================
-- Schedule History (Append-Only - closed entries are immutable)
-- ============================================================================

CREATE TABLE IF NOT EXISTS schedule_history (
    entry_id TEXT PRIMARY KEY,
    schedule_id TEXT NOT NULL,
    snapshot TEXT NOT NULL,                      -- JSON Schedule
    effective_from TEXT NOT NULL,
    effective_to TEXT,                           -- NULL while in force
    recorded_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    CHECK (effective_to IS NULL OR effective_to >= effective_from)
);

CREATE INDEX IF NOT EXISTS idx_history_schedule_from
    ON schedule_history(schedule_id, effective_from);

CREATE TRIGGER IF NOT EXISTS schedule_history_no_delete BEFORE DELETE ON schedule_history
BEGIN
    SELECT RAISE(ABORT, 'Schedule history is append-only');
END;

-- The only permitted update closes an open entry
CREATE TRIGGER IF NOT EXISTS schedule_history_close_only BEFORE UPDATE ON schedule_history
BEGIN
    SELECT CASE
        WHEN old.effective_to IS NOT NULL THEN
            RAISE(ABORT, 'Closed history entries are immutable')
        WHEN new.effective_to IS NULL THEN
            RAISE(ABORT, 'History update must set effective_to')
        WHEN new.entry_id IS NOT old.entry_id
          OR new.schedule_id IS NOT old.schedule_id
          OR new.snapshot IS NOT old.snapshot
          OR new.effective_from IS NOT old.effective_from
          OR new.recorded_at IS NOT old.recorded_at THEN
            RAISE(ABORT, 'History snapshots are immutable')
    END;
END;

-- ============================================================================
-- Daily Summaries (per pet, per calendar day)
-- ============================================================================

CREATE TABLE IF NOT EXISTS daily_summaries (
    pet_id TEXT NOT NULL,
    date TEXT NOT NULL,
    medication_doses INTEGER NOT NULL DEFAULT 0
        CHECK (medication_doses BETWEEN 0 AND 4294967295),
    fluid_sessions INTEGER NOT NULL DEFAULT 0
        CHECK (fluid_sessions BETWEEN 0 AND 4294967295),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (pet_id, date)
);
"#;
