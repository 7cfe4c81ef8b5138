//! Two-week-wait detection: was there intercourse in the fertile window of
//! the current cycle, and is it late enough in the luteal phase to test?

use chrono::{Duration, NaiveDate};

use crate::models::ConceptionWindowStatus;
use crate::phase::{elapsed_cycle_day, fertile_window, ovulation_day, sanitize_length};

/// Days past ovulation before a candidate is reported.
const DETECTABLE_AFTER_DPO: i64 = 7;
const GESTATION_DAYS: i64 = 280;
const REFERENCE_CYCLE_DAYS: i64 = 28;

/// Check whether the ongoing cycle starting at `anchor` is a conception
/// candidate as of `today`.
///
/// The cycle day is not wrapped here: the check spans one ongoing cycle.
pub fn detect_conception_window(
    anchor: NaiveDate,
    cycle_length_days: u32,
    intercourse_dates: &[NaiveDate],
    today: NaiveDate,
) -> ConceptionWindowStatus {
    let current = elapsed_cycle_day(anchor, today);
    let ovulation = ovulation_day(cycle_length_days);
    let days_past_ovulation = current - ovulation;

    let not_detected = ConceptionWindowStatus {
        detected: false,
        days_past_ovulation,
        recommended_test_date: None,
        estimated_due_date: None,
    };

    if current <= ovulation + DETECTABLE_AFTER_DPO {
        return not_detected;
    }

    let hit = fertile_window(cycle_length_days)
        .map(|day| anchor + Duration::days(day - 1))
        .find(|date| intercourse_dates.contains(date));

    let Some(hit) = hit else {
        return not_detected;
    };

    let length = sanitize_length(cycle_length_days);
    let recommended_test_date = anchor + Duration::days(length + 1);
    tracing::debug!(%hit, days_past_ovulation, %recommended_test_date, "conception window detected");

    ConceptionWindowStatus {
        detected: true,
        days_past_ovulation,
        recommended_test_date: Some(recommended_test_date),
        estimated_due_date: Some(estimated_due_date(anchor, cycle_length_days)),
    }
}

/// Naegele's rule shifted by the difference from a 28-day cycle.
pub fn estimated_due_date(anchor: NaiveDate, cycle_length_days: u32) -> NaiveDate {
    let length = sanitize_length(cycle_length_days);
    anchor + Duration::days(GESTATION_DAYS + length - REFERENCE_CYCLE_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn detects_fertile_window_hit() {
        let status = detect_conception_window(
            date("2024-01-01"),
            28,
            &[date("2024-01-13")],
            date("2024-01-26"),
        );
        assert!(status.detected);
        assert_eq!(status.days_past_ovulation, 12);
        assert_eq!(status.recommended_test_date, Some(date("2024-01-30")));
        assert_eq!(status.estimated_due_date, Some(date("2024-10-07")));
    }

    #[test]
    fn too_early_in_luteal_phase() {
        // Day 21 is exactly ovulation + 7.
        let status = detect_conception_window(
            date("2024-01-01"),
            28,
            &[date("2024-01-13")],
            date("2024-01-21"),
        );
        assert!(!status.detected);
        assert_eq!(status.days_past_ovulation, 7);
        assert_eq!(status.recommended_test_date, None);

        let status = detect_conception_window(
            date("2024-01-01"),
            28,
            &[date("2024-01-13")],
            date("2024-01-22"),
        );
        assert!(status.detected);
    }

    #[test]
    fn window_edges_count() {
        let anchor = date("2024-01-01");
        let today = date("2024-01-27");
        // Days 9 and 16 of the cycle.
        for hit in ["2024-01-09", "2024-01-16"] {
            assert!(detect_conception_window(anchor, 28, &[date(hit)], today).detected);
        }
        for miss in ["2024-01-08", "2024-01-17", "2023-12-13"] {
            assert!(!detect_conception_window(anchor, 28, &[date(miss)], today).detected);
        }
    }

    #[test]
    fn no_intercourse_logged() {
        let status = detect_conception_window(date("2024-01-01"), 28, &[], date("2024-01-26"));
        assert!(!status.detected);
        assert_eq!(status.days_past_ovulation, 12);
    }

    #[test]
    fn today_before_anchor() {
        let status = detect_conception_window(
            date("2024-01-10"),
            28,
            &[date("2024-01-18")],
            date("2024-01-01"),
        );
        assert!(!status.detected);
        assert!(status.days_past_ovulation < 0);
    }

    #[test]
    fn long_cycle_uses_its_own_window() {
        // 35-day cycle: ovulation day 21, window days 16-23.
        let anchor = date("2024-02-01");
        let status = detect_conception_window(
            anchor,
            35,
            &[date("2024-02-16")],
            date("2024-03-01"),
        );
        assert!(status.detected);
        assert_eq!(status.days_past_ovulation, 9);
        assert_eq!(status.recommended_test_date, Some(date("2024-03-08")));
    }

    #[test]
    fn due_date_shifts_with_cycle_length() {
        let anchor = date("2024-01-01");
        assert_eq!(estimated_due_date(anchor, 28), date("2024-10-07"));
        assert_eq!(estimated_due_date(anchor, 32), date("2024-10-11"));
    }
}
