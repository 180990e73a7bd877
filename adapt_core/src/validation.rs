//! Field bounds for records entering the system.
//!
//! The engine itself does not re-check these; they guard the session log and
//! profile store so that only well-formed records ever reach it.

use crate::{AthleteProfile, Error, ExerciseEntry, Result, SessionMetrics, SessionRecord};
use std::collections::HashSet;

fn check(ok: bool, what: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::Validation(what()))
    }
}

fn in_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    check(value >= min && value <= max, || {
        format!("{} must be within [{}, {}], got {}", field, min, max, value)
    })
}

impl ExerciseEntry {
    pub fn validate(&self) -> Result<()> {
        let name_len = self.exercise.trim().chars().count();
        check(name_len > 0 && self.exercise.chars().count() <= 64, || {
            format!("exercise name must be 1-64 characters, got {:?}", self.exercise)
        })?;
        in_range("sets", self.sets, 1, 20)?;
        in_range("reps", self.reps, 1, 30)?;
        check(self.load_kg > 0.0 && self.load_kg < 600.0, || {
            format!("load_kg must be within (0, 600), got {}", self.load_kg)
        })?;
        in_range("rir", self.rir, 0.0, 6.0)
    }
}

impl SessionMetrics {
    pub fn validate(&self) -> Result<()> {
        in_range("sleep_hours", self.sleep_hours, 0.0, 16.0)?;
        in_range("resting_hr", self.resting_hr, 30, 120)?;
        in_range("hrv_rmssd", self.hrv_rmssd, 5.0, 250.0)?;
        in_range("soreness", self.soreness, 0.0, 10.0)?;
        in_range("motivation", self.motivation, 0.0, 10.0)?;
        in_range("rpe_session", self.rpe_session, 1.0, 10.0)?;
        in_range("duration_min", self.duration_min, 10, 300)
    }
}

impl SessionRecord {
    /// Validate metrics and every entry; names must be unique (case-insensitive)
    pub fn validate(&self) -> Result<()> {
        self.metrics.validate()?;
        check(!self.exercises.is_empty(), || {
            "a session needs at least one exercise".into()
        })?;

        let mut seen = HashSet::new();
        for entry in &self.exercises {
            entry.validate()?;
            let key = entry.exercise.trim().to_lowercase();
            check(seen.insert(key), || {
                format!("exercise names must be unique per session: {:?}", entry.exercise)
            })?;
        }
        Ok(())
    }
}

impl AthleteProfile {
    pub fn validate(&self) -> Result<()> {
        in_range("age", self.age, 14, 90)?;
        check(self.bodyweight_kg > 30.0 && self.bodyweight_kg < 300.0, || {
            format!("bodyweight_kg must be within (30, 300), got {}", self.bodyweight_kg)
        })?;
        in_range("training_age_years", self.training_age_years, 0.0, 50.0)?;
        let goal_len = self.goal.chars().count();
        check((3..=32).contains(&goal_len), || {
            format!("goal must be 3-32 characters, got {:?}", self.goal)
        })?;
        in_range("mrv_baseline_sets", self.mrv_baseline_sets, 6, 40)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(name: &str) -> ExerciseEntry {
        ExerciseEntry {
            exercise: name.into(),
            sets: 3,
            reps: 8,
            load_kg: 80.0,
            rir: 2.0,
        }
    }

    fn metrics() -> SessionMetrics {
        SessionMetrics {
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            sleep_hours: 7.0,
            resting_hr: 58,
            hrv_rmssd: 60.0,
            soreness: 2.0,
            motivation: 7.0,
            rpe_session: 8.0,
            duration_min: 70,
        }
    }

    #[test]
    fn test_valid_session() {
        let record = SessionRecord::new(metrics(), vec![entry("Squat"), entry("Bench")]);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let record = SessionRecord::new(metrics(), vec![entry("Squat"), entry("squat")]);
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("unique"));
    }

    #[test]
    fn test_empty_session_rejected() {
        let record = SessionRecord::new(metrics(), vec![]);
        assert!(record.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_entry_bounds() {
        let mut e = entry("Row");
        e.load_kg = 0.0;
        assert!(e.validate().is_err());

        let mut e = entry("Row");
        e.reps = 31;
        assert!(e.validate().unwrap_err().to_string().contains("reps"));

        let mut e = entry("Row");
        e.rir = 6.5;
        assert!(e.validate().is_err());

        assert!(entry("   ").validate().is_err());
        assert!(entry(&"x".repeat(65)).validate().is_err());
    }

    #[test]
    fn test_metrics_bounds() {
        let mut m = metrics();
        m.resting_hr = 29;
        assert!(m.validate().unwrap_err().to_string().contains("resting_hr"));

        let mut m = metrics();
        m.rpe_session = 0.5;
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_profile_bounds() {
        assert!(AthleteProfile::default().validate().is_ok());

        let mut p = AthleteProfile::default();
        p.goal = "ab".into();
        assert!(p.validate().is_err());

        let mut p = AthleteProfile::default();
        p.mrv_baseline_sets = 41;
        assert!(p.validate().is_err());
    }
}
