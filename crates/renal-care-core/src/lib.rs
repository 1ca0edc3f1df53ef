//! Renal-Care Core Library
//!
//! Local-first treatment tracking for pets with chronic kidney disease:
//! recurring medication and fluid schedules, a per-day log of what was given,
//! and a week view reconciling the two.
//!
//! # Architecture
//!
//! ```text
//!   Schedule edits ──► [schedule_history]  append-only, written first
//!         │                    │
//!         ▼                    │ load_schedule_history
//!    [schedules] ── live ──────┤
//!                              ▼
//!                     AdherenceCalculator ◄── RecurrenceResolver
//!                              ▲
//!   Treatment logs ──► [daily_summaries]
//!                              │
//!                              ▼
//!                  day → none / today / complete / missed
//! ```
//!
//! # Core Principle
//!
//! **A past day is judged by the schedule as it stood on that day.** Editing a
//! schedule never rewrites earlier verdicts.
//!
//! # Modules
//!
//! - [`adherence`]: Status calculator and day classification
//! - [`recurrence`]: Frequency rules against calendar dates
//! - [`history`]: In-memory point-in-time schedule lookup
//! - [`calendar`]: Owner-local date arithmetic
//! - [`db`]: SQLite store for schedules, history and daily summaries
//! - [`models`]: Domain types (Schedule, DailySummary, DayStatus, etc.)
//! - [`config`]: Core configuration and logging setup

pub mod adherence;
pub mod calendar;
pub mod config;
pub mod db;
pub mod history;
pub mod models;
pub mod recurrence;

// Re-export commonly used types
pub use adherence::AdherenceCalculator;
pub use config::CoreConfig;
pub use db::Database;
pub use history::ScheduleHistory;
pub use models::{
    DailySummaries, DailySummary, DayAdherence, DayStatus, FluidDetails, Frequency,
    MedicationDetails, Schedule, ScheduleHistoryEntry, TreatmentDetails, TreatmentType,
    TypeTally,
};
pub use recurrence::RecurrenceResolver;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, Utc, Weekday};
use tracing::info;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum RenalCareError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for RenalCareError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => RenalCareError::NotFound(what),
            db::DbError::Schedule(e) => RenalCareError::InvalidInput(e.to_string()),
            db::DbError::Constraint(reason) => RenalCareError::InvalidInput(reason),
            db::DbError::Json(e) => RenalCareError::SerializationError(e.to_string()),
            other => RenalCareError::DatabaseError(other.to_string()),
        }
    }
}

impl From<models::ScheduleError> for RenalCareError {
    fn from(e: models::ScheduleError) -> Self {
        RenalCareError::InvalidInput(e.to_string())
    }
}

impl From<config::ConfigError> for RenalCareError {
    fn from(e: config::ConfigError) -> Self {
        RenalCareError::ConfigError(e.to_string())
    }
}

impl From<chrono::ParseError> for RenalCareError {
    fn from(e: chrono::ParseError) -> Self {
        RenalCareError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for RenalCareError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RenalCareError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path, in UTC.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<RenalCareCore>, RenalCareError> {
    let db = Database::open(&path)?;
    RenalCareCore::with_config(db, CoreConfig::default())
}

/// Open or create a database with an explicit configuration.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config: FfiCoreConfig,
) -> Result<Arc<RenalCareCore>, RenalCareError> {
    let config = CoreConfig::try_from(config)?;
    let db = Database::open(&path)?;
    RenalCareCore::with_config(db, config)
}

/// Open or create a database with a JSON configuration. Missing fields take defaults.
#[uniffi::export]
pub fn open_database_with_config_json(
    path: String,
    config_json: String,
) -> Result<Arc<RenalCareCore>, RenalCareError> {
    let config = CoreConfig::from_json(&config_json)?;
    let db = Database::open(&path)?;
    RenalCareCore::with_config(db, config)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<RenalCareCore>, RenalCareError> {
    let db = Database::open_in_memory()?;
    RenalCareCore::with_config(db, CoreConfig::default())
}

/// Install the process-wide log subscriber. Returns false if one was already set.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    config::init_logging(filter.as_deref())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct RenalCareCore {
    db: Arc<Mutex<Database>>,
    config: CoreConfig,
    offset: FixedOffset,
}

impl RenalCareCore {
    fn with_config(db: Database, config: CoreConfig) -> Result<Arc<Self>, RenalCareError> {
        config.validate()?;
        let offset = config.utc_offset()?;
        config::init_logging(Some(&config.log_filter));
        info!(
            app = config::APP_NAME,
            version = config::APP_VERSION,
            utc_offset_minutes = config.utc_offset_minutes,
            "Core opened"
        );
        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
            offset,
        }))
    }

    fn evaluate_window(
        &self,
        pet_id: &str,
        start: NaiveDate,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<FfiDayAdherence>, RenalCareError> {
        let end = start
            .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
            .ok_or_else(|| RenalCareError::InvalidInput(format!("Window from {} overflows", start)))?;

        let db = self.db.lock()?;
        // Inactive schedules still count on days their history shows them active
        let schedules = db.list_schedules_for_pet(pet_id, true)?;
        let history =
            db.load_schedule_history(schedules.iter().map(|s| s.schedule_id.as_str()))?;
        let summaries = db.fetch_daily_summaries(pet_id, start..=end)?;
        drop(db);

        let schedule_refs: Vec<&Schedule> = schedules.iter().collect();
        let calculator = AdherenceCalculator::new(&history, self.offset);
        let days = calculator.evaluate_range(start, days, &schedule_refs, &summaries, now);
        Ok(days.into_iter().map(Into::into).collect())
    }
}

#[uniffi::export]
impl RenalCareCore {
    // =========================================================================
    // Schedule Operations
    // =========================================================================

    /// Create a medication schedule. `created_at` defaults to now.
    pub fn create_medication_schedule(
        &self,
        pet_id: String,
        medication: FfiMedicationDetails,
        frequency: FfiFrequency,
        reminder_times: Vec<String>,
        created_at: Option<String>,
    ) -> Result<FfiSchedule, RenalCareError> {
        let schedule = Schedule::new_medication(
            pet_id,
            medication.into(),
            frequency.try_into()?,
            parse_reminder_times(&reminder_times)?,
            parse_instant_or_now(created_at.as_deref())?,
        )?;
        let mut db = self.db.lock()?;
        db.create_schedule(&schedule)?;
        Ok(schedule.into())
    }

    /// Create a fluid therapy schedule. `created_at` defaults to now.
    pub fn create_fluid_schedule(
        &self,
        pet_id: String,
        fluid: FfiFluidDetails,
        frequency: FfiFrequency,
        reminder_times: Vec<String>,
        created_at: Option<String>,
    ) -> Result<FfiSchedule, RenalCareError> {
        let schedule = Schedule::new_fluid(
            pet_id,
            fluid.into(),
            frequency.try_into()?,
            parse_reminder_times(&reminder_times)?,
            parse_instant_or_now(created_at.as_deref())?,
        )?;
        let mut db = self.db.lock()?;
        db.create_schedule(&schedule)?;
        Ok(schedule.into())
    }

    /// Get a schedule by ID.
    pub fn get_schedule(&self, schedule_id: String) -> Result<Option<FfiSchedule>, RenalCareError> {
        let db = self.db.lock()?;
        let schedule = db.get_schedule(&schedule_id)?;
        Ok(schedule.map(|s| s.into()))
    }

    /// List a pet's schedules.
    pub fn list_schedules(
        &self,
        pet_id: String,
        include_inactive: bool,
    ) -> Result<Vec<FfiSchedule>, RenalCareError> {
        let db = self.db.lock()?;
        let schedules = db.list_schedules_for_pet(&pet_id, include_inactive)?;
        Ok(schedules.into_iter().map(|s| s.into()).collect())
    }

    /// Apply an edit as of `changed_at` (default now). The previous version
    /// stays in history.
    pub fn update_schedule(
        &self,
        schedule: FfiSchedule,
        changed_at: Option<String>,
    ) -> Result<FfiSchedule, RenalCareError> {
        let schedule = Schedule::try_from(schedule)?;
        let changed_at = parse_instant_or_now(changed_at.as_deref())?;
        let mut db = self.db.lock()?;
        let stored = db.update_schedule_versioned(&schedule, changed_at)?;
        Ok(stored.into())
    }

    /// Deactivate a schedule as of `at` (default now).
    pub fn deactivate_schedule(
        &self,
        schedule_id: String,
        at: Option<String>,
    ) -> Result<FfiSchedule, RenalCareError> {
        let at = parse_instant_or_now(at.as_deref())?;
        let mut db = self.db.lock()?;
        let stored = db.deactivate_schedule(&schedule_id, at)?;
        Ok(stored.into())
    }

    /// Every recorded version of a schedule, oldest first.
    pub fn get_schedule_history(
        &self,
        schedule_id: String,
    ) -> Result<Vec<FfiScheduleVersion>, RenalCareError> {
        let db = self.db.lock()?;
        let entries = db.list_schedule_history(&schedule_id)?;
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }

    // =========================================================================
    // Daily Summary Operations
    // =========================================================================

    /// Replace a day's totals.
    pub fn record_daily_summary(&self, summary: FfiDailySummary) -> Result<(), RenalCareError> {
        let summary = DailySummary::try_from(summary)?;
        let db = self.db.lock()?;
        db.upsert_daily_summary(&summary)?;
        Ok(())
    }

    /// Log `count` administrations of one treatment type on `date`.
    pub fn record_treatment(
        &self,
        pet_id: String,
        date: String,
        treatment_type: FfiTreatmentType,
        count: u32,
    ) -> Result<FfiDailySummary, RenalCareError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        let totals = db.increment_daily_summary(&pet_id, date, treatment_type.into(), count)?;
        Ok(totals.into())
    }

    /// Stored summaries between two dates, inclusive.
    pub fn get_daily_summaries(
        &self,
        pet_id: String,
        start_date: String,
        end_date: String,
    ) -> Result<Vec<FfiDailySummary>, RenalCareError> {
        let start = parse_date(&start_date)?;
        let end = parse_date(&end_date)?;
        let db = self.db.lock()?;
        let summaries = db.fetch_daily_summaries(&pet_id, start..=end)?;

        let mut summaries: Vec<DailySummary> = summaries.into_values().collect();
        summaries.sort_by_key(|s| s.date);
        Ok(summaries.into_iter().map(|s| s.into()).collect())
    }

    // =========================================================================
    // Adherence Operations
    // =========================================================================

    /// Status of each day of the week starting at `week_start`, as of `now`.
    pub fn week_statuses(
        &self,
        pet_id: String,
        week_start: String,
        now: String,
    ) -> Result<Vec<FfiDayAdherence>, RenalCareError> {
        let week_start = parse_date(&week_start)?;
        let now = parse_instant(&now)?;
        self.evaluate_window(&pet_id, week_start, config::WEEK_LENGTH_DAYS, now)
    }

    /// Status of each day of the current week.
    pub fn current_week_statuses(
        &self,
        pet_id: String,
    ) -> Result<Vec<FfiDayAdherence>, RenalCareError> {
        let now = Utc::now();
        let today = calendar::date_only(now, self.offset);
        let week_start = calendar::week_start_for(today, self.config.week_starts_on);
        self.evaluate_window(&pet_id, week_start, config::WEEK_LENGTH_DAYS, now)
    }

    /// Status of each of `days` days starting at `start_date`, as of `now`.
    ///
    /// At most `MAX_RANGE_DAYS` days per call.
    pub fn range_statuses(
        &self,
        pet_id: String,
        start_date: String,
        days: u32,
        now: String,
    ) -> Result<Vec<FfiDayAdherence>, RenalCareError> {
        if days > config::MAX_RANGE_DAYS {
            return Err(RenalCareError::InvalidInput(format!(
                "Range of {} days exceeds {}",
                days,
                config::MAX_RANGE_DAYS
            )));
        }
        let start = parse_date(&start_date)?;
        let now = parse_instant(&now)?;
        self.evaluate_window(&pet_id, start, days, now)
    }

    /// The configuration this core was opened with.
    pub fn config(&self) -> FfiCoreConfig {
        self.config.clone().into()
    }
}

// =========================================================================
// Parsing Helpers
// =========================================================================

fn parse_instant(s: &str) -> Result<DateTime<Utc>, RenalCareError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn parse_instant_or_now(s: Option<&str>) -> Result<DateTime<Utc>, RenalCareError> {
    s.map_or_else(|| Ok(Utc::now()), parse_instant)
}

fn format_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_date(s: &str) -> Result<NaiveDate, RenalCareError> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Accepts "HH:MM" only, so every time formats back unchanged.
fn parse_reminder_times(times: &[String]) -> Result<Vec<NaiveTime>, RenalCareError> {
    times
        .iter()
        .map(|t| {
            NaiveTime::parse_from_str(t, "%H:%M")
                .map_err(|_| RenalCareError::InvalidInput(format!("Invalid reminder time: {}", t)))
        })
        .collect()
}

fn format_reminder_time(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// ISO weekday number, Monday = 1 through Sunday = 7.
fn weekday_from_iso(n: u8) -> Result<Weekday, RenalCareError> {
    match n {
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        7 => Ok(Weekday::Sun),
        _ => Err(RenalCareError::InvalidInput(format!("Invalid ISO weekday: {}", n))),
    }
}

fn weekday_to_iso(weekday: Weekday) -> u8 {
    // number_from_monday is 1..=7
    weekday.number_from_monday() as u8
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe treatment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiTreatmentType {
    Medication,
    Fluid,
}

impl From<TreatmentType> for FfiTreatmentType {
    fn from(t: TreatmentType) -> Self {
        match t {
            TreatmentType::Medication => FfiTreatmentType::Medication,
            TreatmentType::Fluid => FfiTreatmentType::Fluid,
        }
    }
}

impl From<FfiTreatmentType> for TreatmentType {
    fn from(t: FfiTreatmentType) -> Self {
        match t {
            FfiTreatmentType::Medication => TreatmentType::Medication,
            FfiTreatmentType::Fluid => TreatmentType::Fluid,
        }
    }
}

/// FFI-safe recurrence rule. Weekdays are ISO numbers (Monday = 1).
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiFrequency {
    OnceDaily,
    EveryOtherDay,
    EveryNDays { interval: u32 },
    SpecificWeekdays { weekdays: Vec<u8> },
}

impl From<Frequency> for FfiFrequency {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::OnceDaily => FfiFrequency::OnceDaily,
            Frequency::EveryOtherDay => FfiFrequency::EveryOtherDay,
            Frequency::EveryNDays { interval } => FfiFrequency::EveryNDays {
                interval: interval.get(),
            },
            Frequency::SpecificWeekdays { weekdays } => FfiFrequency::SpecificWeekdays {
                weekdays: weekdays.into_iter().map(weekday_to_iso).collect(),
            },
        }
    }
}

impl TryFrom<FfiFrequency> for Frequency {
    type Error = RenalCareError;

    fn try_from(frequency: FfiFrequency) -> Result<Self, Self::Error> {
        Ok(match frequency {
            FfiFrequency::OnceDaily => Frequency::OnceDaily,
            FfiFrequency::EveryOtherDay => Frequency::EveryOtherDay,
            FfiFrequency::EveryNDays { interval } => Frequency::EveryNDays {
                interval: NonZeroU32::new(interval).ok_or_else(|| {
                    RenalCareError::InvalidInput("Interval must be at least 1 day".into())
                })?,
            },
            FfiFrequency::SpecificWeekdays { weekdays } => {
                let mut parsed = weekdays
                    .into_iter()
                    .map(weekday_from_iso)
                    .collect::<Result<Vec<_>, _>>()?;
                parsed.sort_by_key(|d| d.num_days_from_monday());
                parsed.dedup();
                Frequency::SpecificWeekdays { weekdays: parsed }
            }
        })
    }
}

/// FFI-safe medication fields.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMedicationDetails {
    pub name: String,
    pub target_dosage: f64,
    pub unit: String,
    pub strength: Option<String>,
}

impl From<MedicationDetails> for FfiMedicationDetails {
    fn from(med: MedicationDetails) -> Self {
        Self {
            name: med.name,
            target_dosage: med.target_dosage,
            unit: med.unit,
            strength: med.strength,
        }
    }
}

impl From<FfiMedicationDetails> for MedicationDetails {
    fn from(med: FfiMedicationDetails) -> Self {
        MedicationDetails {
            name: med.name,
            target_dosage: med.target_dosage,
            unit: med.unit,
            strength: med.strength,
        }
    }
}

/// FFI-safe fluid therapy fields.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiFluidDetails {
    pub target_volume_ml: f64,
    pub injection_site: String,
    pub needle_gauge: String,
}

impl From<FluidDetails> for FfiFluidDetails {
    fn from(fluid: FluidDetails) -> Self {
        Self {
            target_volume_ml: fluid.target_volume_ml,
            injection_site: fluid.injection_site,
            needle_gauge: fluid.needle_gauge,
        }
    }
}

impl From<FfiFluidDetails> for FluidDetails {
    fn from(fluid: FfiFluidDetails) -> Self {
        FluidDetails {
            target_volume_ml: fluid.target_volume_ml,
            injection_site: fluid.injection_site,
            needle_gauge: fluid.needle_gauge,
        }
    }
}

/// FFI-safe schedule. Exactly one of `medication` / `fluid` is set, matching
/// `treatment_type`.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSchedule {
    pub schedule_id: String,
    pub pet_id: String,
    pub treatment_type: FfiTreatmentType,
    pub frequency: FfiFrequency,
    /// "HH:MM", ascending
    pub reminder_times: Vec<String>,
    pub medication: Option<FfiMedicationDetails>,
    pub fluid: Option<FfiFluidDetails>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Schedule> for FfiSchedule {
    fn from(schedule: Schedule) -> Self {
        let treatment_type = schedule.treatment_type().into();
        let (medication, fluid) = match schedule.details {
            TreatmentDetails::Medication(med) => (Some(med.into()), None),
            TreatmentDetails::Fluid(fluid) => (None, Some(fluid.into())),
        };
        Self {
            treatment_type,
            schedule_id: schedule.schedule_id,
            pet_id: schedule.pet_id,
            frequency: schedule.frequency.into(),
            reminder_times: schedule.reminder_times.iter().map(format_reminder_time).collect(),
            medication,
            fluid,
            is_active: schedule.is_active,
            created_at: format_instant(schedule.created_at),
            updated_at: format_instant(schedule.updated_at),
        }
    }
}

impl TryFrom<FfiSchedule> for Schedule {
    type Error = RenalCareError;

    fn try_from(schedule: FfiSchedule) -> Result<Self, Self::Error> {
        let details = match (schedule.treatment_type, schedule.medication, schedule.fluid) {
            (FfiTreatmentType::Medication, Some(med), None) => TreatmentDetails::Medication(med.into()),
            (FfiTreatmentType::Fluid, None, Some(fluid)) => TreatmentDetails::Fluid(fluid.into()),
            _ => {
                return Err(RenalCareError::InvalidInput(format!(
                    "Schedule {} details do not match its treatment type",
                    schedule.schedule_id
                )))
            }
        };

        let mut reminder_times = parse_reminder_times(&schedule.reminder_times)?;
        reminder_times.sort();

        let schedule = Schedule {
            schedule_id: schedule.schedule_id,
            pet_id: schedule.pet_id,
            frequency: schedule.frequency.try_into()?,
            reminder_times,
            details,
            is_active: schedule.is_active,
            created_at: parse_instant(&schedule.created_at)?,
            updated_at: parse_instant(&schedule.updated_at)?,
        };
        schedule.validate()?;
        Ok(schedule)
    }
}

/// FFI-safe history entry.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiScheduleVersion {
    pub entry_id: String,
    pub schedule: FfiSchedule,
    pub effective_from: String,
    /// None while the version is in force
    pub effective_to: Option<String>,
}

impl From<ScheduleHistoryEntry> for FfiScheduleVersion {
    fn from(entry: ScheduleHistoryEntry) -> Self {
        Self {
            entry_id: entry.entry_id,
            schedule: entry.snapshot.into(),
            effective_from: format_instant(entry.effective_from),
            effective_to: entry.effective_to.map(format_instant),
        }
    }
}

/// FFI-safe daily totals.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiDailySummary {
    pub pet_id: String,
    /// "YYYY-MM-DD"
    pub date: String,
    pub medication_doses: u32,
    pub fluid_sessions: u32,
}

impl From<DailySummary> for FfiDailySummary {
    fn from(summary: DailySummary) -> Self {
        Self {
            pet_id: summary.pet_id,
            date: format_date(summary.date),
            medication_doses: summary.medication_doses,
            fluid_sessions: summary.fluid_sessions,
        }
    }
}

impl TryFrom<FfiDailySummary> for DailySummary {
    type Error = RenalCareError;

    fn try_from(summary: FfiDailySummary) -> Result<Self, Self::Error> {
        Ok(DailySummary {
            pet_id: summary.pet_id,
            date: parse_date(&summary.date)?,
            medication_doses: summary.medication_doses,
            fluid_sessions: summary.fluid_sessions,
        })
    }
}

/// FFI-safe day status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiDayStatus {
    None,
    Today,
    Complete,
    Missed,
}

impl From<DayStatus> for FfiDayStatus {
    fn from(status: DayStatus) -> Self {
        match status {
            DayStatus::None => FfiDayStatus::None,
            DayStatus::Today => FfiDayStatus::Today,
            DayStatus::Complete => FfiDayStatus::Complete,
            DayStatus::Missed => FfiDayStatus::Missed,
        }
    }
}

/// FFI-safe required/actual tally.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiTypeTally {
    pub required: u32,
    pub actual: u32,
    /// More logged than required; never affects the status
    pub over_logged: bool,
}

impl From<TypeTally> for FfiTypeTally {
    fn from(tally: TypeTally) -> Self {
        Self {
            required: tally.required,
            actual: tally.actual,
            over_logged: tally.is_over_logged(),
        }
    }
}

/// FFI-safe day verdict with its tallies.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiDayAdherence {
    /// "YYYY-MM-DD"
    pub date: String,
    pub status: FfiDayStatus,
    pub medication: Option<FfiTypeTally>,
    pub fluid: Option<FfiTypeTally>,
}

impl From<DayAdherence> for FfiDayAdherence {
    fn from(day: DayAdherence) -> Self {
        Self {
            date: format_date(day.date),
            status: day.status.into(),
            medication: day.medication.map(Into::into),
            fluid: day.fluid.map(Into::into),
        }
    }
}

/// FFI-safe configuration. `week_starts_on` is an ISO weekday (Monday = 1).
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiCoreConfig {
    pub utc_offset_minutes: i32,
    pub week_starts_on: u8,
    pub log_filter: String,
}

impl From<CoreConfig> for FfiCoreConfig {
    fn from(config: CoreConfig) -> Self {
        Self {
            utc_offset_minutes: config.utc_offset_minutes,
            week_starts_on: weekday_to_iso(config.week_starts_on),
            log_filter: config.log_filter,
        }
    }
}

impl TryFrom<FfiCoreConfig> for CoreConfig {
    type Error = RenalCareError;

    fn try_from(config: FfiCoreConfig) -> Result<Self, Self::Error> {
        let config = CoreConfig {
            utc_offset_minutes: config.utc_offset_minutes,
            week_starts_on: weekday_from_iso(config.week_starts_on)?,
            log_filter: config.log_filter,
        };
        config.validate()?;
        Ok(config)
    }
}
