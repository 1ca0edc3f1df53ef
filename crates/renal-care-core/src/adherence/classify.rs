//! Day classification.

use crate::models::DayStatus;

/// Everything classification depends on for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayFacts {
    /// At least one active schedule applied
    pub has_obligation: bool,
    /// The day is after today
    pub is_future: bool,
    /// The day is today
    pub is_today: bool,
    /// Every applicable treatment type met its required count
    pub is_satisfied: bool,
}

/// Map a day's facts to its status.
///
/// Future days are always `None`. Today stays `Today` until complete, with or
/// without an obligation. Past days without an obligation are `None`.
pub fn classify(facts: DayFacts) -> DayStatus {
    match facts {
        DayFacts { is_future: true, .. } => DayStatus::None,
        DayFacts {
            is_today: true,
            has_obligation: true,
            is_satisfied: true,
            ..
        } => DayStatus::Complete,
        DayFacts { is_today: true, .. } => DayStatus::Today,
        DayFacts { has_obligation: false, .. } => DayStatus::None,
        DayFacts { is_satisfied: true, .. } => DayStatus::Complete,
        _ => DayStatus::Missed,
    }
}
