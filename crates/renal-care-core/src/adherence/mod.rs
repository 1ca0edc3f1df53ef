//! Adherence status calculator.
//!
//! Reconciles what each day's schedules required against what the daily
//! summary says was logged, and reduces it to one [`DayStatus`] per day.
//!
//! # Per-day algorithm
//!
//! 1. Resolve each schedule to the version in force when the day closed
//!    (history first, live schedule as fallback).
//! 2. Keep versions that are active and whose recurrence applies to the day.
//! 3. Sum required counts per treatment type and compare with the summary.
//! 4. [`classify`] the result against today's date.
//!
//! The calculator does no I/O. Summaries and history are loaded by the caller.

mod classify;

pub use classify::{classify, DayFacts};

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::{debug, trace};

use crate::calendar;
use crate::config::{ConfigResult, CoreConfig, WEEK_LENGTH_DAYS};
use crate::history::ScheduleHistory;
use crate::models::{
    DailySummaries, DayAdherence, DayStatus, Schedule, TreatmentType, TypeTally,
};
use crate::recurrence::RecurrenceResolver;

/// Computes day statuses against a fixed history index and offset.
#[derive(Debug, Clone, Copy)]
pub struct AdherenceCalculator<'a> {
    history: &'a ScheduleHistory,
    resolver: RecurrenceResolver,
    offset: FixedOffset,
}

impl<'a> AdherenceCalculator<'a> {
    pub fn new(history: &'a ScheduleHistory, offset: FixedOffset) -> Self {
        Self {
            history,
            resolver: RecurrenceResolver::new(offset),
            offset,
        }
    }

    /// Calculator in UTC.
    pub fn utc(history: &'a ScheduleHistory) -> Self {
        Self::new(history, Utc.fix())
    }

    pub fn from_config(history: &'a ScheduleHistory, config: &CoreConfig) -> ConfigResult<Self> {
        Ok(Self::new(history, config.utc_offset()?))
    }

    /// Statuses for the seven days starting at `week_start`.
    ///
    /// `medication_schedules` and the optional `fluid_schedule` are live
    /// schedules; each day uses the version that was in force on that day.
    pub fn compute_week_statuses(
        &self,
        week_start: NaiveDate,
        medication_schedules: &[Schedule],
        fluid_schedule: Option<&Schedule>,
        summaries: &DailySummaries,
        now: DateTime<Utc>,
    ) -> BTreeMap<NaiveDate, DayStatus> {
        let schedules: Vec<&Schedule> = medication_schedules.iter().chain(fluid_schedule).collect();
        self.compute_statuses(week_start, WEEK_LENGTH_DAYS, &schedules, summaries, now)
    }

    /// Statuses for `days` consecutive days starting at `start`, for any mix
    /// of schedules and treatment types.
    pub fn compute_statuses(
        &self,
        start: NaiveDate,
        days: u32,
        schedules: &[&Schedule],
        summaries: &DailySummaries,
        now: DateTime<Utc>,
    ) -> BTreeMap<NaiveDate, DayStatus> {
        self.evaluate_range(start, days, schedules, summaries, now)
            .into_iter()
            .map(|day| (day.date, day.status))
            .collect()
    }

    /// Statuses with the required/actual tallies behind them.
    pub fn evaluate_range(
        &self,
        start: NaiveDate,
        days: u32,
        schedules: &[&Schedule],
        summaries: &DailySummaries,
        now: DateTime<Utc>,
    ) -> Vec<DayAdherence> {
        let today = calendar::date_only(now, self.offset);
        calendar::dates_from(start, days)
            .map(|date| self.evaluate_day(date, schedules, summaries, today))
            .collect()
    }

    /// Evaluate a single day, given the owner's current local date.
    pub fn evaluate_day(
        &self,
        date: NaiveDate,
        schedules: &[&Schedule],
        summaries: &DailySummaries,
        today: NaiveDate,
    ) -> DayAdherence {
        let mut medication: Option<TypeTally> = None;
        let mut fluid: Option<TypeTally> = None;

        let probe = calendar::end_of_day(date, self.offset);
        for live in schedules {
            let version = self.effective_version(live, probe);
            if !version.is_active || !self.resolver.applies(version, date) {
                continue;
            }

            let treatment = version.treatment_type();
            let slot = match treatment {
                TreatmentType::Medication => &mut medication,
                TreatmentType::Fluid => &mut fluid,
            };
            let tally = slot.get_or_insert_with(|| TypeTally {
                required: 0,
                actual: summaries
                    .get(&date)
                    .map_or(0, |summary| summary.count_for(treatment)),
            });
            tally.required = tally
                .required
                .saturating_add(self.resolver.required_count(version));
        }

        let mut day = DayAdherence {
            date,
            status: DayStatus::None,
            medication,
            fluid,
        };
        day.status = classify(DayFacts {
            has_obligation: day.has_obligation(),
            is_future: date > today,
            is_today: date == today,
            is_satisfied: day.is_satisfied(),
        });

        debug!(
            %date,
            status = day.status.as_str(),
            medication = ?day.medication,
            fluid = ?day.fluid,
            "Classified day"
        );
        day
    }

    fn effective_version<'s>(&'s self, live: &'s Schedule, at: DateTime<Utc>) -> &'s Schedule {
        match self.history.version_at(&live.schedule_id, at) {
            Some(version) => version,
            None => {
                trace!(
                    schedule_id = %live.schedule_id,
                    %at,
                    "No history covers instant, using live schedule"
                );
                live
            }
        }
    }
}
