//! Cycle-health verdict from period-start history.
//!
//! Thresholds follow standard obstetric guidance: 21-35 days is a normal
//! cycle length, and a spread of 9 or more days between the shortest and
//! longest cycle is clinically irregular.

use chrono::NaiveDate;

use crate::models::{CycleHealthStatus, CycleHealthVerdict};

const SHORT_CYCLE_BELOW: i64 = 21;
const LONG_CYCLE_ABOVE: i64 = 35;
const IRREGULAR_VARIATION: i64 = 9;
const PERIMENOPAUSE_AGE_ABOVE: u32 = 35;

/// Analyze period starts (any order) with the user's age unknown.
pub fn analyze_cycle_health(period_starts: &[NaiveDate]) -> CycleHealthVerdict {
    analyze_cycle_health_with_age(period_starts, None)
}

/// Analyze period starts; `age_years` adds perimenopause as a cause of
/// frequent cycles past 35.
pub fn analyze_cycle_health_with_age(
    period_starts: &[NaiveDate],
    age_years: Option<u32>,
) -> CycleHealthVerdict {
    let mut starts = period_starts.to_vec();
    starts.sort_unstable();
    starts.dedup();

    let lengths: Vec<i64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();

    let (Some(&shortest), Some(&longest)) = (lengths.iter().min(), lengths.iter().max()) else {
        return CycleHealthVerdict {
            status: CycleHealthStatus::InsufficientData,
            average_length_days: 0,
            variation_days: 0,
            probable_causes: Vec::new(),
        };
    };

    let average = (lengths.iter().sum::<i64>() as f64 / lengths.len() as f64).round() as i64;
    let variation = longest - shortest;

    // Variation takes precedence over the length rules.
    let (status, causes): (CycleHealthStatus, Vec<&str>) =
        if lengths.len() >= 2 && variation >= IRREGULAR_VARIATION {
            (
                CycleHealthStatus::Irregular,
                vec![
                    "Hormonal imbalance",
                    "PCOS",
                    "Stress or lifestyle factors",
                    "Thyroid disorder",
                ],
            )
        } else if average < SHORT_CYCLE_BELOW {
            let mut causes = vec!["Luteal phase defect", "Anovulation", "Stress"];
            if age_years.is_some_and(|age| age > PERIMENOPAUSE_AGE_ABOVE) {
                causes.push("Perimenopause");
            }
            (CycleHealthStatus::Polymenorrhea, causes)
        } else if average > LONG_CYCLE_ABOVE {
            (
                CycleHealthStatus::Oligomenorrhea,
                vec!["PCOS", "Thyroid disorder", "Hyperprolactinemia"],
            )
        } else {
            (CycleHealthStatus::NormalRegular, Vec::new())
        };

    tracing::debug!(average, variation, ?status, cycles = lengths.len(), "cycle health");

    CycleHealthVerdict {
        status,
        average_length_days: average,
        variation_days: variation,
        probable_causes: causes.into_iter().map(String::from).collect(),
    }
}
