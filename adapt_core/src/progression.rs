//! Progression logic for load and volume, plus plateau and deload detection.
//!
//! Rules:
//! - Load: small bounded step driven by readiness and trend; deload overrides
//! - Volume: one set up or down per session, never above MRV or below one set
//! - Plateau: flat and low-variance performance over the last five sessions
//! - Deload: high fatigue with low readiness, or a plateau

use crate::numeric::{clamp, diffs, mean, population_std, round_to, tail};
use crate::{Error, Result};

/// Readiness at or above which volume may increase
pub const VOLUME_UP_READINESS: f64 = 0.72;

/// Readiness at or below which volume is cut
pub const VOLUME_DOWN_READINESS: f64 = 0.4;

/// Load multiplier applied on a deload
pub const DELOAD_FACTOR: f64 = 0.9;

/// Compute the next load with a bounded deterministic step
///
/// Non-deload step rate is always within [-3%, +5%].
pub fn load_progression(last_load: f64, readiness: f64, trend: f64, deload: bool) -> f64 {
    if deload {
        tracing::debug!("Load progression: deload override at {:.2}", last_load);
        return round_to(last_load * DELOAD_FACTOR, 2);
    }

    let readiness_boost = (readiness - 0.5) * 0.05;
    let trend_boost = clamp(trend * 0.03, -0.02, 0.03);
    let rate = clamp(0.01 + readiness_boost + trend_boost, -0.03, 0.05);

    tracing::debug!("Load progression: rate {:.4} from {:.2}", rate, last_load);
    round_to(last_load * (1.0 + rate), 2)
}

/// Adjust set volume while respecting MRV
///
/// Readiness in the open band (0.4, 0.72) leaves volume unchanged.
pub fn volume_progression(last_sets: u32, readiness: f64, mrv_sets: u32) -> u32 {
    if readiness >= VOLUME_UP_READINESS && last_sets < mrv_sets {
        return (last_sets + 1).min(mrv_sets);
    }
    if readiness <= VOLUME_DOWN_READINESS {
        return last_sets.saturating_sub(1).max(1);
    }
    last_sets
}

/// Detect a plateau when gains flatten and variance collapses
pub fn plateau(performance_scores: &[f64]) -> Result<bool> {
    if performance_scores.len() < 5 {
        return Err(Error::InsufficientData(
            "Need at least 5 sessions for plateau detection".into(),
        ));
    }

    let recent = tail(performance_scores, 5);
    let low_growth = mean(&diffs(recent)) < 0.15;
    let low_variance = population_std(recent) < 0.75;
    Ok(low_growth && low_variance)
}

/// Trigger a deload from accumulated fatigue with poor readiness, or a plateau
pub fn deload_trigger(
    fatigue_history: &[f64],
    readiness_history: &[f64],
    plateau: bool,
) -> Result<bool> {
    if fatigue_history.len() < 3 || readiness_history.len() < 3 {
        return Err(Error::InsufficientData(
            "Need at least 3 observations for deload logic".into(),
        ));
    }

    let fatigue_flag = mean(tail(fatigue_history, 3)) > 8.5;
    let readiness_flag = mean(tail(readiness_history, 3)) < 0.45;
    Ok((fatigue_flag && readiness_flag) || plateau)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_progression_logic() {
        let load = load_progression(100.0, 0.8, 0.2, false);
        let sets = volume_progression(10, 0.8, 12);
        let deload = deload_trigger(&[9.0, 8.9, 9.2], &[0.4, 0.42, 0.41], false).unwrap();

        assert_eq!(load, 103.1);
        assert_eq!(sets, 11);
        assert!(deload);
    }

    #[test]
    fn test_deload_overrides_load() {
        assert_eq!(load_progression(100.0, 1.0, 5.0, true), 90.0);
        assert_eq!(load_progression(82.5, 0.0, -5.0, true), 74.25);
    }

    #[test]
    fn test_load_rate_is_capped() {
        assert_eq!(load_progression(100.0, 1.0, 10.0, false), 105.0);
        assert_eq!(load_progression(100.0, 0.0, -10.0, false), 97.0);
    }

    #[test]
    fn test_volume_respects_mrv() {
        assert_eq!(volume_progression(12, 0.9, 12), 12);
        assert_eq!(volume_progression(11, 0.9, 12), 12);
    }

    #[test]
    fn test_volume_floor() {
        assert_eq!(volume_progression(1, 0.2, 12), 1);
        assert_eq!(volume_progression(5, 0.4, 12), 4);
    }

    #[test]
    fn test_volume_neutral_band() {
        assert_eq!(volume_progression(8, 0.41, 12), 8);
        assert_eq!(volume_progression(8, 0.71, 12), 8);
    }

    #[test]
    fn test_plateau_requires_five_scores() {
        let err = plateau(&[1.0, 1.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_plateau_detection() {
        assert!(plateau(&[1.0, 1.0, 1.0, 1.0, 1.0]).unwrap());
        // Steady growth of 0.2 per session is not a plateau
        assert!(!plateau(&[1.0, 1.2, 1.4, 1.6, 1.8]).unwrap());
        // Flat on average but noisy is not a plateau either
        assert!(!plateau(&[0.0, 2.0, 0.0, 2.0, 0.0]).unwrap());
    }

    #[test]
    fn test_plateau_only_looks_at_last_five() {
        assert!(plateau(&[0.0, 3.0, 1.0, 1.0, 1.0, 1.0, 1.0]).unwrap());
    }

    #[test]
    fn test_deload_requires_history() {
        let err = deload_trigger(&[9.0, 9.0], &[0.4, 0.4, 0.4], false).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_deload_needs_both_flags_or_plateau() {
        // High fatigue but good readiness
        assert!(!deload_trigger(&[9.0, 9.0, 9.0], &[0.8, 0.8, 0.8], false).unwrap());
        // Low readiness but little fatigue
        assert!(!deload_trigger(&[2.0, 2.0, 2.0], &[0.3, 0.3, 0.3], false).unwrap());
        // Plateau alone is enough
        assert!(deload_trigger(&[2.0, 2.0, 2.0], &[0.8, 0.8, 0.8], true).unwrap());
    }

    proptest! {
        #[test]
        fn prop_load_rate_bounded(
            last_load in 1.0f64..600.0,
            readiness in 0.0f64..=1.0,
            trend in -10.0f64..10.0,
        ) {
            let next = load_progression(last_load, readiness, trend, false);
            // Allow half a cent for the final rounding
            prop_assert!(next >= last_load * 0.97 - 0.0051);
            prop_assert!(next <= last_load * 1.05 + 0.0051);
        }

        #[test]
        fn prop_deload_ignores_readiness_and_trend(
            last_load in 1.0f64..600.0,
            readiness in 0.0f64..=1.0,
            trend in -10.0f64..10.0,
        ) {
            let next = load_progression(last_load, readiness, trend, true);
            prop_assert_eq!(next, round_to(last_load * 0.9, 2));
        }

        #[test]
        fn prop_volume_within_mrv(
            mrv in 6u32..=45,
            last_sets in 1u32..=45,
            readiness in 0.0f64..=1.0,
        ) {
            prop_assume!(last_sets <= mrv);
            let next = volume_progression(last_sets, readiness, mrv);
            prop_assert!(next >= 1 && next <= mrv);
        }
    }
}
