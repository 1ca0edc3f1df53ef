//! Daily treatment summary models.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schedule::TreatmentType;

/// Logged treatment totals for one pet on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailySummary {
    /// Pet the totals belong to
    pub pet_id: String,
    /// Calendar day (owner-local)
    pub date: NaiveDate,
    /// Medication doses logged, summed across all medications
    pub medication_doses: u32,
    /// Fluid therapy sessions logged
    pub fluid_sessions: u32,
}

/// Summaries keyed by date. A missing date means nothing was logged.
pub type DailySummaries = HashMap<NaiveDate, DailySummary>;

impl DailySummary {
    /// A summary with nothing logged.
    pub fn empty(pet_id: String, date: NaiveDate) -> Self {
        Self {
            pet_id,
            date,
            medication_doses: 0,
            fluid_sessions: 0,
        }
    }

    /// Logged count for one treatment type.
    pub fn count_for(&self, treatment: TreatmentType) -> u32 {
        match treatment {
            TreatmentType::Medication => self.medication_doses,
            TreatmentType::Fluid => self.fluid_sessions,
        }
    }
}
