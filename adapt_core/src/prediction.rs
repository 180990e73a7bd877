//! Prediction models: 1RM estimation, next-session load and adaptation score.

use crate::numeric::{clamp, mean, round_to, tail};
use crate::{Error, ExerciseEntry, Result};

/// Guards the adaptation ratio against a zero fatigue mean
const FATIGUE_EPSILON: f64 = 1e-6;

/// Estimate 1RM with the Epley relation, counting reps in reserve as reps
pub fn one_rep_max(entry: &ExerciseEntry) -> f64 {
    let effective_reps = f64::from(entry.reps) + entry.rir.max(0.0);
    round_to(entry.load_kg * (1.0 + effective_reps / 30.0), 2)
}

/// Predict the next session's working load from %1RM and readiness
///
/// The raw estimate is held inside `[last_load × 0.9, last_load × 1.08]` so a
/// single step never jumps far from what was last lifted.
pub fn next_session_load(last_load: f64, one_rm: f64, target_reps: u32, readiness: f64) -> f64 {
    let intensity = clamp(1.0 - f64::from(target_reps) * 0.025, 0.6, 0.9);
    let readiness_adj = clamp((readiness - 0.5) * 0.06, -0.03, 0.04);
    let base = one_rm * intensity * (1.0 + readiness_adj);
    round_to(clamp(base, last_load * 0.9, last_load * 1.08), 2)
}

/// Stimulus-to-fatigue balance over the last three sessions, in [0, 3]
pub fn adaptation_score(stimulus_history: &[f64], fatigue_history: &[f64]) -> Result<f64> {
    if stimulus_history.len() < 3 || fatigue_history.len() < 3 {
        return Err(Error::InsufficientData(
            "Need at least 3 observations for adaptation score".into(),
        ));
    }

    let recent_stimulus = mean(tail(stimulus_history, 3));
    let recent_fatigue = mean(tail(fatigue_history, 3));
    let ratio = recent_stimulus / (recent_fatigue + FATIGUE_EPSILON);
    Ok(round_to(clamp(ratio, 0.0, 3.0), 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(reps: u32, load_kg: f64, rir: f64) -> ExerciseEntry {
        ExerciseEntry {
            exercise: "Bench".into(),
            sets: 3,
            reps,
            load_kg,
            rir,
        }
    }

    #[test]
    fn test_one_rep_max_counts_reserve() {
        // 100 × (1 + 7/30) = 123.33
        assert_eq!(one_rep_max(&entry(5, 100.0, 2.0)), 123.33);
        // No reserve: 100 × (1 + 5/30) = 116.67
        assert_eq!(one_rep_max(&entry(5, 100.0, 0.0)), 116.67);
    }

    #[test]
    fn test_next_session_load_within_band() {
        let predicted = next_session_load(100.0, 123.33, 5, 0.7);
        assert!(predicted >= 90.0 && predicted <= 108.0);
    }

    #[test]
    fn test_next_session_load_caps_large_jumps() {
        // A huge 1RM would suggest far more; the band caps it at +8%
        assert_eq!(next_session_load(100.0, 400.0, 5, 0.9), 108.0);
        // A tiny 1RM would suggest far less; the band floors it at -10%
        assert_eq!(next_session_load(100.0, 10.0, 5, 0.1), 90.0);
    }

    #[test]
    fn test_next_session_load_unclamped_value() {
        // intensity 0.875, readiness adj 0.0 → 110 × 0.875 = 96.25
        assert_eq!(next_session_load(100.0, 110.0, 5, 0.5), 96.25);
    }

    #[test]
    fn test_adaptation_score_requires_history() {
        let err = adaptation_score(&[1.0, 1.0], &[1.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_insufficient_data());
        let err = adaptation_score(&[1.0, 1.0, 1.0], &[1.0]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_adaptation_score_ratio() {
        let score = adaptation_score(&[9.0, 2.0, 2.0, 2.0], &[0.1, 4.0, 4.0, 4.0]).unwrap();
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_adaptation_score_is_capped() {
        let score = adaptation_score(&[5.0, 5.0, 5.0], &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(score, 3.0);
    }
}
