//! Adherence status models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-day adherence verdict. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// No obligation, or a day that has not happened yet
    None,
    /// The current day, not (yet) complete
    Today,
    /// Every obligation of the day satisfied
    Complete,
    /// Past day with at least one unsatisfied obligation
    Missed,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::None => "none",
            DayStatus::Today => "today",
            DayStatus::Complete => "complete",
            DayStatus::Missed => "missed",
        }
    }
}

/// Required versus logged occurrences for one treatment type on one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeTally {
    /// Sum of required counts over applicable schedules
    pub required: u32,
    /// Count logged in the daily summary
    pub actual: u32,
}

impl TypeTally {
    /// Logging more than required still satisfies.
    pub fn is_satisfied(&self) -> bool {
        self.actual >= self.required
    }

    /// More logged than required: a split dose or a duplicate entry.
    pub fn is_over_logged(&self) -> bool {
        self.actual > self.required
    }

    pub fn shortfall(&self) -> u32 {
        self.required.saturating_sub(self.actual)
    }
}

/// Status of one day together with the tallies behind it.
///
/// A tally is `None` when no schedule of that type applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayAdherence {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub medication: Option<TypeTally>,
    pub fluid: Option<TypeTally>,
}

impl DayAdherence {
    pub fn has_obligation(&self) -> bool {
        self.medication.is_some() || self.fluid.is_some()
    }

    /// Every applicable type satisfied. Types without a schedule count as satisfied.
    pub fn is_satisfied(&self) -> bool {
        [self.medication, self.fluid]
            .iter()
            .flatten()
            .all(TypeTally::is_satisfied)
    }
}
