use chrono::{Duration, NaiveDate};

use crate::models::{CycleStats, FertilityWindow, Prediction, LUTEAL_PHASE_DAYS};

/// Most recent starts used for prediction.
const RECENT_STARTS: usize = 6;

/// Predict the next period from logged period starts.
/// Requires at least 2 distinct starts.
pub fn predict(period_starts: &[NaiveDate], period_length_days: u32) -> Option<Prediction> {
    let stats = calc_internals(period_starts)?;

    let predicted_start = stats.last_start + Duration::days(stats.avg_cycle.round() as i64);
    let predicted_end =
        predicted_start + Duration::days(period_length_days.saturating_sub(1) as i64);

    let confidence = if stats.cycle_lengths.len() < 2 {
        0.5
    } else {
        let std_dev = std_deviation(&stats.cycle_lengths);
        (1.0 - (std_dev / stats.avg_cycle) as f32).clamp(0.1, 0.95)
    };

    tracing::debug!(%predicted_start, confidence, "predicted next period");

    Some(Prediction {
        predicted_start,
        predicted_end,
        confidence,
    })
}

/// Date the fertility window of the upcoming cycle.
/// Ovulation ~14 days before the predicted period; fertile from ovulation - 5
/// to ovulation + 2, peak from ovulation - 2 to ovulation.
pub fn fertility_window(
    period_starts: &[NaiveDate],
    period_length_days: u32,
) -> Option<FertilityWindow> {
    let prediction = predict(period_starts, period_length_days)?;

    let ovulation_day = prediction.predicted_start - Duration::days(LUTEAL_PHASE_DAYS as i64);

    Some(FertilityWindow {
        fertile_start: ovulation_day - Duration::days(5),
        fertile_end: ovulation_day + Duration::days(2),
        ovulation_day,
        peak_start: ovulation_day - Duration::days(2),
        peak_end: ovulation_day,
    })
}

/// Compute cycle statistics for the stats view.
pub fn cycle_stats(period_starts: &[NaiveDate]) -> CycleStats {
    let starts = sorted_starts(period_starts);

    let cycle_lengths: Vec<i64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();

    CycleStats {
        total_cycles: starts.len(),
        avg_cycle_length: if cycle_lengths.is_empty() {
            None
        } else {
            Some(cycle_lengths.iter().sum::<i64>() as f32 / cycle_lengths.len() as f32)
        },
        shortest_cycle: cycle_lengths.iter().copied().min(),
        longest_cycle: cycle_lengths.iter().copied().max(),
        last_period_start: starts.last().copied(),
    }
}

struct PredictionInternals {
    avg_cycle: f64,
    cycle_lengths: Vec<f64>,
    last_start: NaiveDate,
}

fn calc_internals(period_starts: &[NaiveDate]) -> Option<PredictionInternals> {
    let starts = sorted_starts(period_starts);
    let last_start = *starts.last()?;

    let recent = &starts[starts.len().saturating_sub(RECENT_STARTS)..];
    let cycle_lengths: Vec<f64> = recent
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();

    if cycle_lengths.is_empty() {
        return None;
    }

    Some(PredictionInternals {
        avg_cycle: mean(&cycle_lengths),
        cycle_lengths,
        last_start,
    })
}

fn sorted_starts(period_starts: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut starts = period_starts.to_vec();
    starts.sort_unstable();
    starts.dedup();
    starts
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
