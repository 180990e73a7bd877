//! Prescription engine for the next strength session.
//!
//! The pipeline runs in a fixed order and propagates the first failure:
//! 1. Window check (at least five sessions)
//! 2. Per-session fatigue, stimulus and readiness
//! 3. Running performance score from the adaptation ratio
//! 4. MRV, plateau, deload and trend over the history
//! 5. Anchor exercise: heaviest entry of the latest session
//! 6. Sets, projected load and final load for the anchor
//!
//! The engine holds no state; every call is a pure function of its inputs.

use crate::physiology::{fatigue, mrv_sets, performance_trend, readiness, stimulus};
use crate::prediction::{adaptation_score, next_session_load, one_rep_max};
use crate::progression::{deload_trigger, load_progression, plateau, volume_progression};
use crate::{
    AthleteProfile, Error, ExerciseEntry, Prescription, Rationale, Result, SessionRecord,
};
use chrono::Duration;

/// Fewest sessions the engine will prescribe from
pub const MIN_SESSIONS: usize = 5;

/// Days between the latest session and the prescribed one
pub const RECOVERY_INTERVAL_DAYS: i64 = 2;

/// Performance score used before enough history exists for the adaptation ratio
const COLD_START_PERFORMANCE: f64 = 1.0;

/// Per-session scores, index-aligned with the input history
#[derive(Clone, Debug, PartialEq)]
pub struct SessionScores {
    pub fatigue: Vec<f64>,
    pub stimulus: Vec<f64>,
    pub readiness: Vec<f64>,
    pub performance: Vec<f64>,
}

impl SessionScores {
    /// Score every session in order
    pub fn compute(sessions: &[SessionRecord]) -> Result<Self> {
        let fatigue = sessions
            .iter()
            .map(|s| fatigue(&s.exercises, s.metrics.rpe_session))
            .collect::<Result<Vec<_>>>()?;
        let stimulus: Vec<f64> = sessions.iter().map(|s| stimulus(&s.exercises)).collect();
        let readiness: Vec<f64> = sessions.iter().map(|s| readiness(&s.metrics)).collect();

        let performance = (0..sessions.len())
            .map(|i| {
                if i < 2 {
                    Ok(COLD_START_PERFORMANCE)
                } else {
                    adaptation_score(&stimulus[..=i], &fatigue[..=i])
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            fatigue,
            stimulus,
            readiness,
            performance,
        })
    }
}

/// Heaviest entry in a session; ties keep the first one performed
pub fn select_anchor(exercises: &[ExerciseEntry]) -> Option<&ExerciseEntry> {
    exercises
        .iter()
        .reduce(|best, e| if e.load_kg > best.load_kg { e } else { best })
}

/// Prescribe the next session from the athlete's recent history
///
/// `recent_sessions` must be ordered oldest to newest; it is never reordered.
pub fn prescribe(profile: &AthleteProfile, recent_sessions: &[SessionRecord]) -> Result<Prescription> {
    if recent_sessions.len() < MIN_SESSIONS {
        return Err(Error::Validation(format!(
            "At least {} recent sessions are required for a prescription, got {}",
            MIN_SESSIONS,
            recent_sessions.len()
        )));
    }

    let scores = SessionScores::compute(recent_sessions)?;
    tracing::debug!(
        "Scored {} sessions: fatigue {:?}, readiness {:?}",
        recent_sessions.len(),
        scores.fatigue,
        scores.readiness
    );

    let mrv = mrv_sets(profile, &scores.fatigue)?;
    let plateaued = plateau(&scores.performance)?;
    let deload = deload_trigger(&scores.fatigue, &scores.readiness, plateaued)?;
    let trend = performance_trend(&scores.performance)?;

    // Non-empty: the window check guarantees a latest session and fatigue() rejected empty ones
    let latest = &recent_sessions[recent_sessions.len() - 1];
    let anchor = select_anchor(&latest.exercises)
        .ok_or_else(|| Error::Validation("Latest session has no exercises".into()))?;

    let latest_readiness = scores.readiness[scores.readiness.len() - 1];
    let latest_fatigue = scores.fatigue[scores.fatigue.len() - 1];

    let one_rm = one_rep_max(anchor);
    let next_sets = volume_progression(anchor.sets, latest_readiness, mrv);
    let projected_load = next_session_load(anchor.load_kg, one_rm, anchor.reps, latest_readiness);
    let next_load = load_progression(projected_load, latest_readiness, trend, deload);

    let target_date = latest.metrics.date + Duration::days(RECOVERY_INTERVAL_DAYS);

    let rationale = Rationale {
        readiness: latest_readiness,
        fatigue: latest_fatigue,
        trend,
        mrv_sets: f64::from(mrv),
        adaptation_score: adaptation_score(&scores.stimulus, &scores.fatigue)?,
        deload: if deload { "1" } else { "0" }.to_string(),
    };

    tracing::info!(
        "Prescribed {} {}x{} @ {:.2}kg for {} (deload: {}, mrv: {}, plateau: {})",
        anchor.exercise,
        next_sets,
        anchor.reps,
        next_load,
        target_date,
        deload,
        mrv,
        plateaued
    );

    Ok(Prescription {
        target_date,
        exercise: anchor.exercise.clone(),
        sets: next_sets,
        reps: anchor.reps,
        load_kg: next_load,
        deload,
        rationale,
    })
}
