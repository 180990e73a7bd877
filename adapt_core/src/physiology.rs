//! Physiology models: per-session fatigue, stimulus and readiness, plus the
//! history-level MRV estimate and performance trend.
//!
//! Every function here is pure arithmetic over its arguments.

use crate::numeric::{clamp, mean, ols_slope, round_to, tail};
use crate::{AthleteProfile, Error, ExerciseEntry, Result, SessionMetrics};

/// Session fatigue index from workload and proximity to failure
///
/// Each entry contributes `load × reps × sets`, weighted by an effort factor
/// `clamp((5 − RIR)/5, 0.2, 1.0)`. The total is scaled to thousands and then
/// by session RPE / 10.
pub fn fatigue(exercises: &[ExerciseEntry], session_rpe: f64) -> Result<f64> {
    if exercises.is_empty() {
        return Err(Error::Validation(
            "At least one exercise is required for fatigue model".into(),
        ));
    }

    let weighted_work: f64 = exercises
        .iter()
        .map(|e| {
            let effort = clamp((5.0 - e.rir) / 5.0, 0.2, 1.0);
            e.load_kg * f64::from(e.reps) * f64::from(e.sets) * effort
        })
        .sum();

    let fatigue = weighted_work / 1000.0 * (session_rpe / 10.0);
    Ok(round_to(fatigue, 4))
}

/// Hypertrophic stimulus from hard sets and rep quality
///
/// Rep quality peaks at 8 reps. An empty session yields zero stimulus.
pub fn stimulus(exercises: &[ExerciseEntry]) -> f64 {
    let total: f64 = exercises
        .iter()
        .map(|e| {
            let rep_quality = 1.0 - (8.0 - f64::from(e.reps)).abs() / 12.0;
            let intensity_quality = clamp(e.load_kg / (e.load_kg + 40.0), 0.35, 0.95);
            let effort_quality = clamp((4.0 - e.rir) / 4.0, 0.1, 1.0);
            f64::from(e.sets) * rep_quality * intensity_quality * effort_quality
        })
        .sum();
    round_to(total, 4)
}

/// Readiness score in [0, 1] from biofeedback indicators
pub fn readiness(metrics: &SessionMetrics) -> f64 {
    let sleep_score = clamp(metrics.sleep_hours / 8.0, 0.0, 1.1);
    let hrv_score = clamp(metrics.hrv_rmssd / 55.0, 0.3, 1.3);
    let hr_penalty = clamp((f64::from(metrics.resting_hr) - 55.0) / 30.0, 0.0, 1.0);
    let soreness_penalty = metrics.soreness / 10.0;
    let motivation_bonus = metrics.motivation / 10.0;

    let score = 0.35 * sleep_score + 0.3 * hrv_score + 0.2 * motivation_bonus
        - 0.1 * hr_penalty
        - 0.15 * soreness_penalty;
    round_to(clamp(score, 0.0, 1.0), 4)
}

/// Maximum recoverable volume (sets) from baseline and recent fatigue tolerance
///
/// Result is always within [6, 45].
pub fn mrv_sets(profile: &AthleteProfile, fatigue_history: &[f64]) -> Result<u32> {
    if fatigue_history.len() < 3 {
        return Err(Error::InsufficientData(
            "Need at least 3 fatigue observations to estimate MRV".into(),
        ));
    }

    let fatigue_trend = mean(tail(fatigue_history, 3));
    let tolerance = clamp(1.2 - fatigue_trend / 12.0, 0.75, 1.2);
    let experience_adj = clamp(0.9 + profile.training_age_years / 20.0, 0.9, 1.25);
    let estimate = (f64::from(profile.mrv_baseline_sets) * tolerance * experience_adj).round();

    // Clamp in float space first so a huge baseline cannot overflow the cast
    Ok(clamp(estimate, 6.0, 45.0) as u32)
}

/// Linear trend slope of performance scores over session index
pub fn performance_trend(scores: &[f64]) -> Result<f64> {
    if scores.len() < 4 {
        return Err(Error::InsufficientData(
            "Need at least 4 sessions for trend analysis".into(),
        ));
    }
    Ok(round_to(ols_slope(scores), 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(sets: u32, reps: u32, load_kg: f64, rir: f64) -> ExerciseEntry {
        ExerciseEntry {
            exercise: "Squat".into(),
            sets,
            reps,
            load_kg,
            rir,
        }
    }

    fn metrics() -> SessionMetrics {
        SessionMetrics {
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            sleep_hours: 8.0,
            resting_hr: 55,
            hrv_rmssd: 55.0,
            soreness: 0.0,
            motivation: 10.0,
            rpe_session: 7.0,
            duration_min: 60,
        }
    }

    #[test]
    fn test_fatigue_calculation_correctness() {
        let exercises = vec![entry(3, 5, 100.0, 2.0), entry(3, 8, 80.0, 1.0)];
        let score = fatigue(&exercises, 8.0).unwrap();
        assert!((score - 1.9488).abs() < 1e-9);
    }

    #[test]
    fn test_fatigue_rejects_empty_session() {
        let err = fatigue(&[], 8.0).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_fatigue_effort_factor_floor() {
        // RIR 6 would give a negative factor; floor is 0.2
        let score = fatigue(&[entry(1, 10, 100.0, 6.0)], 10.0).unwrap();
        assert!((score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_stimulus_peaks_at_eight_reps() {
        let at_eight = stimulus(&[entry(3, 8, 100.0, 0.0)]);
        let at_five = stimulus(&[entry(3, 5, 100.0, 0.0)]);
        let at_twelve = stimulus(&[entry(3, 12, 100.0, 0.0)]);
        assert!(at_eight > at_five);
        assert!(at_eight > at_twelve);
    }

    #[test]
    fn test_stimulus_of_empty_session_is_zero() {
        assert_eq!(stimulus(&[]), 0.0);
    }

    #[test]
    fn test_stimulus_known_value() {
        // 3 × 1.0 × (80/120) × 1.0 = 2.0
        let score = stimulus(&[entry(3, 8, 80.0, 0.0)]);
        assert!((score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_readiness_known_value() {
        // 0.35×1 + 0.3×1 + 0.2×1 = 0.85
        let score = readiness(&metrics());
        assert!((score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_readiness_is_floored_at_zero() {
        let mut m = metrics();
        m.sleep_hours = 0.0;
        m.hrv_rmssd = 5.0;
        m.resting_hr = 120;
        m.soreness = 10.0;
        m.motivation = 0.0;
        assert_eq!(readiness(&m), 0.0);
    }

    #[test]
    fn test_mrv_requires_three_observations() {
        let profile = AthleteProfile::default();
        let err = mrv_sets(&profile, &[1.0, 2.0]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_mrv_uses_last_three_observations() {
        let profile = AthleteProfile {
            training_age_years: 4.0,
            mrv_baseline_sets: 14,
            ..AthleteProfile::default()
        };
        // mean 3.0 → tolerance 0.95, experience 1.1 → round(14.63) = 15
        let sets = mrv_sets(&profile, &[50.0, 3.0, 3.0, 3.0]).unwrap();
        assert_eq!(sets, 15);
    }

    #[test]
    fn test_mrv_is_bounded() {
        let profile = AthleteProfile {
            training_age_years: 0.0,
            mrv_baseline_sets: 6,
            ..AthleteProfile::default()
        };
        assert_eq!(mrv_sets(&profile, &[40.0, 40.0, 40.0]).unwrap(), 6);

        let heavy = AthleteProfile {
            training_age_years: 50.0,
            mrv_baseline_sets: 40,
            ..AthleteProfile::default()
        };
        assert_eq!(mrv_sets(&heavy, &[0.0, 0.0, 0.0]).unwrap(), 45);
    }

    #[test]
    fn test_trend_requires_four_scores() {
        let err = performance_trend(&[1.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_trend_slope() {
        let slope = performance_trend(&[1.0, 1.5, 2.0, 2.5]).unwrap();
        assert!((slope - 0.5).abs() < 1e-9);

        let flat = performance_trend(&[1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(flat, 0.0);
    }
}
