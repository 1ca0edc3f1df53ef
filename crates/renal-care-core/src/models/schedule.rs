//! Treatment schedule models.

use std::num::NonZeroU32;

use chrono::{DateTime, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Schedule validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Medication name must not be empty")]
    MissingMedicationName,

    #[error("Target amount must be a positive number, got {0}")]
    NonPositiveTarget(f64),

    #[error("Weekday schedule must name at least one weekday")]
    NoWeekdays,

    #[error("Reminder time {0} is not on a whole minute")]
    SubMinuteReminderTime(NaiveTime),

    #[error("Reminder times must be strictly ascending: {later} is not after {earlier}")]
    UnorderedReminderTimes { earlier: NaiveTime, later: NaiveTime },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Kind of treatment a schedule obliges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentType {
    /// Oral or injectable medication doses
    Medication,
    /// Subcutaneous fluid therapy sessions
    Fluid,
}

impl TreatmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentType::Medication => "medication",
            TreatmentType::Fluid => "fluid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "medication" => Some(TreatmentType::Medication),
            "fluid" => Some(TreatmentType::Fluid),
            _ => None,
        }
    }
}

/// Recurrence rule, anchored at the schedule's creation day.
///
/// The set is closed: stored values that do not decode into one of these
/// variants are rejected, never defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frequency {
    /// Every day from the anchor on
    OnceDaily,
    /// Anchor day, then every second day
    EveryOtherDay,
    /// Anchor day, then every `interval` days
    EveryNDays { interval: NonZeroU32 },
    /// Fixed days of the week
    SpecificWeekdays { weekdays: Vec<Weekday> },
}

impl Frequency {
    pub fn validate(&self) -> ScheduleResult<()> {
        match self {
            Frequency::SpecificWeekdays { weekdays } if weekdays.is_empty() => {
                Err(ScheduleError::NoWeekdays)
            }
            _ => Ok(()),
        }
    }
}

/// Medication-specific schedule fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationDetails {
    /// Drug name as prescribed (e.g., "benazepril")
    pub name: String,
    /// Amount per dose
    pub target_dosage: f64,
    /// Dose unit (e.g., "mg", "mL", "tablet")
    pub unit: String,
    /// Strength descriptor (e.g., "5mg tablets")
    pub strength: Option<String>,
}

/// Fluid-therapy-specific schedule fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluidDetails {
    /// Volume per session in mL
    pub target_volume_ml: f64,
    /// Where fluids are given (e.g., "between shoulder blades")
    pub injection_site: String,
    /// Needle gauge (e.g., "20G")
    pub needle_gauge: String,
}

/// Treatment-specific fields. The variant determines the treatment type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreatmentDetails {
    Medication(MedicationDetails),
    Fluid(FluidDetails),
}

impl TreatmentDetails {
    pub fn treatment_type(&self) -> TreatmentType {
        match self {
            TreatmentDetails::Medication(_) => TreatmentType::Medication,
            TreatmentDetails::Fluid(_) => TreatmentType::Fluid,
        }
    }

    fn validate(&self) -> ScheduleResult<()> {
        let target = match self {
            TreatmentDetails::Medication(med) => {
                if med.name.trim().is_empty() {
                    return Err(ScheduleError::MissingMedicationName);
                }
                med.target_dosage
            }
            TreatmentDetails::Fluid(fluid) => fluid.target_volume_ml,
        };
        if !target.is_finite() || target <= 0.0 {
            return Err(ScheduleError::NonPositiveTarget(target));
        }
        Ok(())
    }
}

/// A recurring treatment obligation for one pet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    /// Unique schedule ID (UUID)
    pub schedule_id: String,
    /// Owning pet
    pub pet_id: String,
    /// Recurrence rule
    pub frequency: Frequency,
    /// Reminder times of day on whole minutes, ascending. Length = required occurrences per day.
    pub reminder_times: Vec<NaiveTime>,
    /// Treatment-specific fields
    pub details: TreatmentDetails,
    /// Inactive schedules impose no obligation
    pub is_active: bool,
    /// Creation instant; its local date anchors the recurrence
    pub created_at: DateTime<Utc>,
    /// Instant the current version took effect
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Create a medication schedule.
    pub fn new_medication(
        pet_id: String,
        medication: MedicationDetails,
        frequency: Frequency,
        reminder_times: Vec<NaiveTime>,
        created_at: DateTime<Utc>,
    ) -> ScheduleResult<Self> {
        Self::new(
            pet_id,
            TreatmentDetails::Medication(medication),
            frequency,
            reminder_times,
            created_at,
        )
    }

    /// Create a fluid therapy schedule.
    pub fn new_fluid(
        pet_id: String,
        fluid: FluidDetails,
        frequency: Frequency,
        reminder_times: Vec<NaiveTime>,
        created_at: DateTime<Utc>,
    ) -> ScheduleResult<Self> {
        Self::new(
            pet_id,
            TreatmentDetails::Fluid(fluid),
            frequency,
            reminder_times,
            created_at,
        )
    }

    fn new(
        pet_id: String,
        details: TreatmentDetails,
        frequency: Frequency,
        mut reminder_times: Vec<NaiveTime>,
        created_at: DateTime<Utc>,
    ) -> ScheduleResult<Self> {
        reminder_times.sort();
        let schedule = Self {
            schedule_id: uuid::Uuid::new_v4().to_string(),
            pet_id,
            frequency,
            reminder_times,
            details,
            is_active: true,
            created_at,
            updated_at: created_at,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Check field-level invariants.
    pub fn validate(&self) -> ScheduleResult<()> {
        self.details.validate()?;
        self.frequency.validate()?;
        if let Some(&time) = self
            .reminder_times
            .iter()
            .find(|t| t.second() != 0 || t.nanosecond() != 0)
        {
            return Err(ScheduleError::SubMinuteReminderTime(time));
        }
        for pair in self.reminder_times.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ScheduleError::UnorderedReminderTimes {
                    earlier: pair[0],
                    later: pair[1],
                });
            }
        }
        Ok(())
    }

    pub fn treatment_type(&self) -> TreatmentType {
        self.details.treatment_type()
    }

    /// Occurrences required on each applicable day (at least one).
    pub fn required_count(&self) -> u32 {
        u32::try_from(self.reminder_times.len())
            .unwrap_or(u32::MAX)
            .max(1)
    }
}
