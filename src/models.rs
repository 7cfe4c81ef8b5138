use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MIN_CYCLE_LENGTH: u32 = 21;
pub const MAX_CYCLE_LENGTH: u32 = 45;
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
/// Luteal phase is assumed fixed regardless of follicular variability.
pub const LUTEAL_PHASE_DAYS: u32 = 14;

/// Validated cycle length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleConfig {
    pub cycle_length_days: u32,
}

impl CycleConfig {
    pub fn new(cycle_length_days: u32) -> Result<Self> {
        if !(MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH).contains(&cycle_length_days) {
            return Err(Error::InvalidCycleLength(cycle_length_days));
        }
        Ok(Self { cycle_length_days })
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_length_days: DEFAULT_CYCLE_LENGTH,
        }
    }
}

/// The most recent period start; cycle day 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleAnchor {
    pub last_period_start: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CyclePhase {
    LoggedPeriod,
    ExpectedPeriod,
    Ovulation,
    HighFertility,
    Fertile,
    Luteal,
}

impl CyclePhase {
    pub fn label(self) -> &'static str {
        match self {
            CyclePhase::LoggedPeriod => "Period (Logged)",
            CyclePhase::ExpectedPeriod => "Period (Expected)",
            CyclePhase::Ovulation => "Ovulation",
            CyclePhase::HighFertility => "High Fertility",
            CyclePhase::Fertile => "Fertile",
            CyclePhase::Luteal => "Luteal/Safe",
        }
    }
}

/// Qualitative conception-probability buckets. The labels are fixed strings,
/// not derived statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConceptionProbability {
    #[serde(rename = "<1%")]
    Minimal,
    #[serde(rename = "10%")]
    PostPeak,
    #[serde(rename = "15–17%")]
    PrePeak,
    #[serde(rename = "27%")]
    TwoDaysBefore,
    #[serde(rename = "31%")]
    DayBefore,
    #[serde(rename = "33%")]
    Peak,
}

impl ConceptionProbability {
    pub fn label(self) -> &'static str {
        match self {
            ConceptionProbability::Minimal => "<1%",
            ConceptionProbability::PostPeak => "10%",
            ConceptionProbability::PrePeak => "15–17%",
            ConceptionProbability::TwoDaysBefore => "27%",
            ConceptionProbability::DayBefore => "31%",
            ConceptionProbability::Peak => "33%",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CyclePhaseResult {
    pub phase: CyclePhase,
    pub label: String,
    pub conception_probability: ConceptionProbability,
    pub is_logged_period_day: bool,
}

impl CyclePhaseResult {
    pub fn probability_label(&self) -> &'static str {
        self.conception_probability.label()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleHealthStatus {
    InsufficientData,
    Polymenorrhea,
    Oligomenorrhea,
    Irregular,
    NormalRegular,
}

impl CycleHealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            CycleHealthStatus::InsufficientData => "Insufficient Data",
            CycleHealthStatus::Polymenorrhea => "Polymenorrhea (Frequent Cycles)",
            CycleHealthStatus::Oligomenorrhea => "Oligomenorrhea (Long Cycles)",
            CycleHealthStatus::Irregular => "Irregular",
            CycleHealthStatus::NormalRegular => "Normal & Regular",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleHealthVerdict {
    pub status: CycleHealthStatus,
    pub average_length_days: i64,
    pub variation_days: i64,
    pub probable_causes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConceptionWindowStatus {
    pub detected: bool,
    /// Current cycle day minus ovulation day; negative before ovulation.
    pub days_past_ovulation: i64,
    /// Set only when `detected`.
    pub recommended_test_date: Option<NaiveDate>,
    pub estimated_due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_start: NaiveDate,
    pub predicted_end: NaiveDate,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FertilityWindow {
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
    pub ovulation_day: NaiveDate,
    pub peak_start: NaiveDate,
    pub peak_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleStats {
    pub total_cycles: usize,
    pub avg_cycle_length: Option<f32>,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub last_period_start: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    /// Deduplicated, most recent first.
    #[serde(default)]
    pub period_starts: Vec<NaiveDate>,
    /// Deduplicated, most recent first.
    #[serde(default)]
    pub intercourse_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppData {
    pub fn anchor(&self) -> Option<CycleAnchor> {
        self.period_starts.iter().max().map(|&d| CycleAnchor {
            last_period_start: d,
        })
    }

    /// Restore the dedup + descending invariant on both logs.
    pub fn normalize(&mut self) {
        normalize_log(&mut self.period_starts);
        normalize_log(&mut self.intercourse_dates);
    }
}

fn normalize_log(log: &mut Vec<NaiveDate>) {
    log.sort_unstable_by(|a, b| b.cmp(a));
    log.dedup();
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_cycle_length")]
    pub cycle_length_days: u32,
    #[serde(default)]
    pub show_fertility: bool,
    #[serde(default)]
    pub age_years: Option<u32>,
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            cycle_length_days: DEFAULT_CYCLE_LENGTH,
            show_fertility: false,
            age_years: None,
        }
    }
}

/// One classified calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub cycle_day: u32,
    pub result: CyclePhaseResult,
}

/// Data returned for a month view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthData {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DaySummary>,
    pub prediction: Option<Prediction>,
    pub fertility: Option<FertilityWindow>,
    pub stats: CycleStats,
}
