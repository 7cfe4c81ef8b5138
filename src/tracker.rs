use chrono::{Datelike, NaiveDate};
use zeroize::Zeroizing;

use crate::conception::detect_conception_window;
use crate::error::{Error, Result};
use crate::health::analyze_cycle_health_with_age;
use crate::models::*;
use crate::phase::{classify_day, cycle_day_number};
use crate::prediction;
use crate::storage::Store;

/// Passphrase and decrypted data, held only while unlocked.
struct Session {
    passphrase: Zeroizing<String>,
    data: AppData,
}

/// Owns the state lifecycle around the engine: load, mutate, persist.
pub struct Tracker {
    store: Store,
    period_length_days: u32,
    session: Option<Session>,
}

impl Tracker {
    pub fn new(store: Store, period_length_days: u32) -> Self {
        Self {
            store,
            period_length_days,
            session: None,
        }
    }

    pub fn is_setup(&self) -> bool {
        self.store.exists()
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_some()
    }

    /// Create an empty store and unlock it.
    pub fn setup(&mut self, passphrase: &str) -> Result<()> {
        if self.store.exists() {
            return Err(Error::AlreadySetup);
        }
        let data = AppData::default();
        self.store.save(passphrase, &data)?;
        tracing::info!(dir = ?self.store.dir(), "tracker set up");

        self.session = Some(Session {
            passphrase: Zeroizing::new(passphrase.to_string()),
            data,
        });
        Ok(())
    }

    /// Returns `false` when the passphrase does not open the store.
    pub fn unlock(&mut self, passphrase: &str) -> Result<bool> {
        match self.store.load(passphrase) {
            Ok(mut data) => {
                data.normalize();
                self.session = Some(Session {
                    passphrase: Zeroizing::new(passphrase.to_string()),
                    data,
                });
                tracing::info!("tracker unlocked");
                Ok(true)
            }
            Err(e) if e.is_unreadable() => {
                tracing::warn!("unlock failed: {e}");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Drop decrypted data; the passphrase is zeroized on drop.
    pub fn lock(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("tracker locked");
        }
    }

    fn data(&self) -> Result<&AppData> {
        self.session.as_ref().map(|s| &s.data).ok_or(Error::Locked)
    }

    /// Apply `change` to a copy, persist it, then swap it in. A failed save
    /// leaves the session unchanged.
    fn update(&mut self, change: impl FnOnce(&mut AppData)) -> Result<()> {
        let session = self.session.as_mut().ok_or(Error::Locked)?;
        let mut next = session.data.clone();
        change(&mut next);
        next.normalize();
        self.store.save(&session.passphrase, &next)?;
        session.data = next;
        Ok(())
    }

    pub fn log_period_start(&mut self, date: NaiveDate) -> Result<()> {
        tracing::info!(%date, "logging period start");
        self.update(|data| data.period_starts.push(date))
    }

    pub fn remove_period_start(&mut self, date: NaiveDate) -> Result<()> {
        self.update(|data| data.period_starts.retain(|&d| d != date))
    }

    pub fn log_intercourse(&mut self, date: NaiveDate) -> Result<()> {
        self.update(|data| data.intercourse_dates.push(date))
    }

    pub fn remove_intercourse(&mut self, date: NaiveDate) -> Result<()> {
        self.update(|data| data.intercourse_dates.retain(|&d| d != date))
    }

    pub fn settings(&self) -> Result<AppSettings> {
        Ok(self.data()?.settings.clone())
    }

    /// Update cycle length and/or age. The cycle length is validated here so
    /// the engine only ever sees plausible values.
    pub fn update_settings(
        &mut self,
        cycle_length_days: Option<u32>,
        age_years: Option<u32>,
    ) -> Result<()> {
        let config = cycle_length_days.map(CycleConfig::new).transpose()?;
        self.update(|data| {
            if let Some(config) = config {
                data.settings.cycle_length_days = config.cycle_length_days;
            }
            if age_years.is_some() {
                data.settings.age_years = age_years;
            }
        })
    }

    pub fn toggle_fertility(&mut self, enabled: bool) -> Result<()> {
        self.update(|data| data.settings.show_fertility = enabled)
    }

    pub fn anchor(&self) -> Result<CycleAnchor> {
        self.data()?.anchor().ok_or(Error::NoAnchor)
    }

    /// Classify a single calendar date.
    pub fn day_summary(&self, date: NaiveDate) -> Result<DaySummary> {
        let data = self.data()?;
        let anchor = data.anchor().ok_or(Error::NoAnchor)?;
        Ok(summarize(data, anchor, date))
    }

    pub fn month(&self, year: i32, month: u32) -> Result<MonthData> {
        let data = self.data()?;
        let anchor = data.anchor().ok_or(Error::NoAnchor)?;

        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidDate(format!("{year}-{month:02}")))?;
        let days = first_day
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|d| summarize(data, anchor, d))
            .collect();

        let fertility = if data.settings.show_fertility {
            prediction::fertility_window(&data.period_starts, self.period_length_days)
        } else {
            None
        };

        Ok(MonthData {
            year,
            month,
            days,
            prediction: prediction::predict(&data.period_starts, self.period_length_days),
            fertility,
            stats: prediction::cycle_stats(&data.period_starts),
        })
    }

    pub fn cycle_health(&self) -> Result<CycleHealthVerdict> {
        let data = self.data()?;
        Ok(analyze_cycle_health_with_age(
            &data.period_starts,
            data.settings.age_years,
        ))
    }

    pub fn conception_status(&self, today: NaiveDate) -> Result<ConceptionWindowStatus> {
        let data = self.data()?;
        let anchor = data.anchor().ok_or(Error::NoAnchor)?;
        Ok(detect_conception_window(
            anchor.last_period_start,
            data.settings.cycle_length_days,
            &data.intercourse_dates,
            today,
        ))
    }

    pub fn prediction(&self) -> Result<Option<Prediction>> {
        let data = self.data()?;
        Ok(prediction::predict(&data.period_starts, self.period_length_days))
    }

    pub fn stats(&self) -> Result<CycleStats> {
        Ok(prediction::cycle_stats(&self.data()?.period_starts))
    }

    pub fn export_data(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.data()?)?)
    }

    pub fn wipe_all_data(&mut self) -> Result<()> {
        self.lock();
        self.store.wipe()?;
        Ok(())
    }
}

fn summarize(data: &AppData, anchor: CycleAnchor, date: NaiveDate) -> DaySummary {
    let length = data.settings.cycle_length_days;
    let cycle_day = cycle_day_number(anchor.last_period_start, date, length);
    let logged = data.period_starts.contains(&date);
    DaySummary {
        date,
        cycle_day,
        result: classify_day(cycle_day, length, logged),
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::InvalidDate(format!("{s}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn unlocked() -> (TempDir, Tracker) {
        crate::logging::init_test();
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = Tracker::new(Store::new(dir.path()), 5);
        tracker.setup("secret").unwrap();
        (dir, tracker)
    }

    #[test]
    fn setup_twice_fails() {
        let (_dir, mut tracker) = unlocked();
        assert!(tracker.is_setup());
        assert!(matches!(tracker.setup("again"), Err(Error::AlreadySetup)));
    }

    #[test]
    fn locked_tracker_refuses_queries() {
        let (_dir, mut tracker) = unlocked();
        tracker.lock();
        assert!(!tracker.is_unlocked());
        assert!(matches!(tracker.stats(), Err(Error::Locked)));
        assert!(matches!(
            tracker.log_period_start(date("2024-01-01")),
            Err(Error::Locked)
        ));
    }

    #[test]
    fn unlock_with_wrong_passphrase() {
        let (_dir, mut tracker) = unlocked();
        tracker.lock();
        assert!(!tracker.unlock("nope").unwrap());
        assert!(!tracker.is_unlocked());
        assert!(tracker.unlock("secret").unwrap());
    }

    #[test]
    fn period_log_is_deduplicated_and_persisted() {
        let (dir, mut tracker) = unlocked();
        tracker.log_period_start(date("2024-01-01")).unwrap();
        tracker.log_period_start(date("2024-01-29")).unwrap();
        tracker.log_period_start(date("2024-01-01")).unwrap();

        let mut reopened = Tracker::new(Store::new(dir.path()), 5);
        assert!(reopened.unlock("secret").unwrap());
        let data: AppData = serde_json::from_str(&reopened.export_data().unwrap()).unwrap();
        assert_eq!(data.period_starts, vec![date("2024-01-29"), date("2024-01-01")]);
        assert_eq!(
            reopened.anchor().unwrap().last_period_start,
            date("2024-01-29")
        );

        reopened.remove_period_start(date("2024-01-29")).unwrap();
        assert_eq!(
            reopened.anchor().unwrap().last_period_start,
            date("2024-01-01")
        );
    }

    #[test]
    fn queries_need_an_anchor() {
        let (_dir, tracker) = unlocked();
        assert!(matches!(
            tracker.day_summary(date("2024-01-01")),
            Err(Error::NoAnchor)
        ));
        assert!(matches!(
            tracker.conception_status(date("2024-01-01")),
            Err(Error::NoAnchor)
        ));
        // Health has a defined answer without history.
        assert_eq!(
            tracker.cycle_health().unwrap().status,
            CycleHealthStatus::InsufficientData
        );
    }

    #[test]
    fn day_summary_marks_logged_period() {
        let (_dir, mut tracker) = unlocked();
        tracker.log_period_start(date("2024-01-01")).unwrap();

        let first = tracker.day_summary(date("2024-01-01")).unwrap();
        assert_eq!(first.cycle_day, 1);
        assert_eq!(first.result.phase, CyclePhase::LoggedPeriod);

        let ovulation = tracker.day_summary(date("2024-01-14")).unwrap();
        assert_eq!(ovulation.cycle_day, 14);
        assert_eq!(ovulation.result.probability_label(), "33%");

        // Next cycle, not logged: expected period.
        let next = tracker.day_summary(date("2024-01-29")).unwrap();
        assert_eq!(next.cycle_day, 1);
        assert_eq!(next.result.phase, CyclePhase::ExpectedPeriod);
    }

    #[test]
    fn settings_validate_cycle_length() {
        let (_dir, mut tracker) = unlocked();
        assert!(matches!(
            tracker.update_settings(Some(50), None),
            Err(Error::InvalidCycleLength(50))
        ));
        tracker.update_settings(Some(32), Some(38)).unwrap();
        let settings = tracker.settings().unwrap();
        assert_eq!(settings.cycle_length_days, 32);
        assert_eq!(settings.age_years, Some(38));

        tracker.log_period_start(date("2024-01-01")).unwrap();
        let day = tracker.day_summary(date("2024-01-18")).unwrap();
        assert_eq!(day.result.phase, CyclePhase::Ovulation);
    }

    #[test]
    fn month_view_covers_every_day() {
        let (_dir, mut tracker) = unlocked();
        tracker.log_period_start(date("2024-01-01")).unwrap();
        tracker.log_period_start(date("2024-01-29")).unwrap();

        let month = tracker.month(2024, 2).unwrap();
        assert_eq!(month.days.len(), 29);
        assert_eq!(month.days[0].date, date("2024-02-01"));
        assert_eq!(month.days[0].cycle_day, 4);
        assert!(month.fertility.is_none());
        assert_eq!(
            month.prediction.unwrap().predicted_start,
            date("2024-02-26")
        );

        tracker.toggle_fertility(true).unwrap();
        let month = tracker.month(2024, 2).unwrap();
        assert_eq!(month.fertility.unwrap().ovulation_day, date("2024-02-12"));

        assert!(matches!(tracker.month(2024, 13), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn conception_detected_from_logs() {
        let (_dir, mut tracker) = unlocked();
        tracker.log_period_start(date("2024-01-01")).unwrap();
        tracker.log_intercourse(date("2024-01-13")).unwrap();

        let status = tracker.conception_status(date("2024-01-26")).unwrap();
        assert!(status.detected);
        assert_eq!(status.recommended_test_date, Some(date("2024-01-30")));

        tracker.remove_intercourse(date("2024-01-13")).unwrap();
        assert!(!tracker.conception_status(date("2024-01-26")).unwrap().detected);
    }

    #[test]
    fn health_uses_stored_age() {
        let (_dir, mut tracker) = unlocked();
        tracker.update_settings(None, Some(41)).unwrap();
        tracker.log_period_start(date("2024-01-01")).unwrap();
        tracker.log_period_start(date("2024-01-20")).unwrap();

        let verdict = tracker.cycle_health().unwrap();
        assert_eq!(verdict.status, CycleHealthStatus::Polymenorrhea);
        assert!(verdict.probable_causes.iter().any(|c| c == "Perimenopause"));
    }

    #[test]
    fn wipe_removes_store() {
        let (_dir, mut tracker) = unlocked();
        tracker.wipe_all_data().unwrap();
        assert!(!tracker.is_setup());
        assert!(!tracker.is_unlocked());
    }

    #[test]
    fn failed_save_keeps_session_unchanged() {
        let (dir, mut tracker) = unlocked();
        tracker.log_period_start(date("2024-01-01")).unwrap();

        // A directory where the store file should be makes the rename fail.
        let store_path = Store::new(dir.path()).path();
        std::fs::remove_file(&store_path).unwrap();
        std::fs::create_dir(&store_path).unwrap();
        std::fs::write(store_path.join("occupied"), b"x").unwrap();

        assert!(matches!(
            tracker.log_period_start(date("2024-01-29")),
            Err(Error::Storage(_))
        ));
        assert_eq!(
            tracker.anchor().unwrap().last_period_start,
            date("2024-01-01")
        );
    }
}
