use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::models::{
    ConceptionProbability, CyclePhase, CyclePhaseResult, DEFAULT_CYCLE_LENGTH, LUTEAL_PHASE_DAYS,
};

/// Days at the start of every cycle treated as the expected period.
const EXPECTED_PERIOD_DAYS: RangeInclusive<i64> = 1..=5;
const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;
const FERTILE_DAYS_AFTER_OVULATION: i64 = 2;

/// Truncate a timestamp to its local calendar date.
pub fn to_local_date<Tz: TimeZone>(at: &DateTime<Tz>) -> NaiveDate {
    at.date_naive()
}

/// Replace a zero cycle length with the default. Other values pass through;
/// lengths below 7 give best-effort results.
pub(crate) fn sanitize_length(cycle_length_days: u32) -> i64 {
    if cycle_length_days == 0 {
        tracing::warn!(default = DEFAULT_CYCLE_LENGTH, "cycle length 0, using default");
        return DEFAULT_CYCLE_LENGTH as i64;
    }
    cycle_length_days as i64
}

/// Estimated ovulation day (1-based) for a cycle length.
pub fn ovulation_day(cycle_length_days: u32) -> i64 {
    sanitize_length(cycle_length_days) - LUTEAL_PHASE_DAYS as i64
}

/// Fertile window as 1-based cycle days, `[ovulation - 5, ovulation + 2]`.
pub fn fertile_window(cycle_length_days: u32) -> RangeInclusive<i64> {
    let ovulation = ovulation_day(cycle_length_days);
    (ovulation - FERTILE_DAYS_BEFORE_OVULATION)..=(ovulation + FERTILE_DAYS_AFTER_OVULATION)
}

/// Unwrapped cycle day: days since `anchor` plus one. Zero or negative for
/// dates before the anchor.
pub fn elapsed_cycle_day(anchor: NaiveDate, query: NaiveDate) -> i64 {
    (query - anchor).num_days() + 1
}

/// Cycle day of `query` folded into `[1, cycle_length_days]`.
pub fn cycle_day_number(anchor: NaiveDate, query: NaiveDate, cycle_length_days: u32) -> u32 {
    let length = sanitize_length(cycle_length_days);
    let diff = (query - anchor).num_days();
    (diff.rem_euclid(length) + 1) as u32
}

/// Classify a cycle day. A logged period day overrides every day-number rule.
pub fn classify_day(
    cycle_day: u32,
    cycle_length_days: u32,
    is_logged_period_day: bool,
) -> CyclePhaseResult {
    let (phase, probability) = classify(cycle_day as i64, cycle_length_days, is_logged_period_day);
    tracing::trace!(cycle_day, cycle_length_days, ?phase, "classified day");

    CyclePhaseResult {
        phase,
        label: phase.label().to_string(),
        conception_probability: probability,
        is_logged_period_day,
    }
}

fn classify(
    day: i64,
    cycle_length_days: u32,
    is_logged_period_day: bool,
) -> (CyclePhase, ConceptionProbability) {
    if is_logged_period_day {
        return (CyclePhase::LoggedPeriod, ConceptionProbability::Minimal);
    }
    if EXPECTED_PERIOD_DAYS.contains(&day) {
        return (CyclePhase::ExpectedPeriod, ConceptionProbability::Minimal);
    }

    let ovulation = ovulation_day(cycle_length_days);
    if day == ovulation {
        return (CyclePhase::Ovulation, ConceptionProbability::Peak);
    }
    if fertile_window(cycle_length_days).contains(&day) {
        return match ovulation - day {
            1 => (CyclePhase::HighFertility, ConceptionProbability::DayBefore),
            2 => (CyclePhase::HighFertility, ConceptionProbability::TwoDaysBefore),
            diff if diff > 2 => (CyclePhase::Fertile, ConceptionProbability::PrePeak),
            // Past ovulation but still inside the window.
            _ => (CyclePhase::Fertile, ConceptionProbability::PostPeak),
        };
    }

    (CyclePhase::Luteal, ConceptionProbability::Minimal)
}
