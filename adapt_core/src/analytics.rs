//! Trend analytics and dashboard read models.
//!
//! Like the engine, these are pure functions over an oldest-to-newest slice of
//! session records; loading the window is the caller's job.

use crate::engine::prescribe;
use crate::numeric::{mean, round_to};
use crate::physiology::{fatigue, readiness, stimulus};
use crate::prediction::one_rep_max;
use crate::config::AnalyticsConfig;
use crate::{
    AnalyticsSummary, AthleteProfile, Dashboard, E1rmPoint, Error, MuscleGroup, Result,
    SessionRecord, SessionSummary, WeeklyVolumePoint,
};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// Fewest sessions the analytics summary is computed from
pub const MIN_ANALYTICS_SESSIONS: usize = 3;

const LOWER_BODY_KEYWORDS: &[&str] = &["squat", "lunge", "leg", "hamstring", "quad", "deadlift"];
const BACK_KEYWORDS: &[&str] = &["row", "pull", "lat", "chin"];
const CHEST_KEYWORDS: &[&str] = &["press", "bench", "chest", "dip"];
const ARMS_SHOULDERS_KEYWORDS: &[&str] = &["curl", "extension", "tricep", "bicep", "shoulder", "raise"];

/// Infer a coarse muscle group from an exercise name
///
/// Checked in order, so "Leg Press" counts as lower body.
pub fn infer_muscle_group(exercise: &str) -> MuscleGroup {
    let lowered = exercise.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if matches(LOWER_BODY_KEYWORDS) {
        MuscleGroup::LowerBody
    } else if matches(BACK_KEYWORDS) {
        MuscleGroup::Back
    } else if matches(CHEST_KEYWORDS) {
        MuscleGroup::Chest
    } else if matches(ARMS_SHOULDERS_KEYWORDS) {
        MuscleGroup::ArmsShoulders
    } else {
        MuscleGroup::Other
    }
}

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Compact summaries of the newest `limit` sessions, newest first
pub fn summarize_sessions(sessions: &[SessionRecord], limit: usize) -> Vec<SessionSummary> {
    sessions
        .iter()
        .rev()
        .take(limit)
        .map(|s| {
            let rir: Vec<f64> = s.exercises.iter().map(|e| e.rir).collect();
            SessionSummary {
                date: s.date(),
                exercise_count: s.exercises.len(),
                tonnage: round_to(s.tonnage(), 2),
                avg_rir: round_to(mean(&rir), 2),
            }
        })
        .collect()
}

/// Tonnage per (week, muscle group), sorted by week then group
pub fn weekly_volume(sessions: &[SessionRecord]) -> Vec<WeeklyVolumePoint> {
    let mut buckets: BTreeMap<(NaiveDate, MuscleGroup), f64> = BTreeMap::new();

    for session in sessions {
        let week = week_start(session.date());
        for e in &session.exercises {
            let muscle = infer_muscle_group(&e.exercise);
            *buckets.entry((week, muscle)).or_insert(0.0) +=
                e.load_kg * f64::from(e.reps) * f64::from(e.sets);
        }
    }

    buckets
        .into_iter()
        .map(|((week_start, muscle), volume)| WeeklyVolumePoint {
            week_start,
            muscle,
            volume: round_to(volume, 2),
        })
        .collect()
}

/// Chronological estimated-1RM points for one exercise (case-insensitive match)
pub fn e1rm_trend(sessions: &[SessionRecord], exercise: &str) -> Vec<E1rmPoint> {
    let wanted = exercise.to_lowercase();
    sessions
        .iter()
        .flat_map(|s| {
            s.exercises
                .iter()
                .filter(|e| e.exercise.to_lowercase() == wanted)
                .map(move |e| E1rmPoint {
                    date: s.date(),
                    exercise: exercise.to_string(),
                    e1rm: one_rep_max(e),
                })
        })
        .collect()
}

/// Trend analytics summary over a window of sessions
pub fn analytics_summary(sessions: &[SessionRecord], exercise: &str) -> Result<AnalyticsSummary> {
    if sessions.len() < MIN_ANALYTICS_SESSIONS {
        return Err(Error::InsufficientData(format!(
            "Need at least {} sessions for analytics, got {}",
            MIN_ANALYTICS_SESSIONS,
            sessions.len()
        )));
    }

    let fatigue_hist = sessions
        .iter()
        .map(|s| fatigue(&s.exercises, s.metrics.rpe_session))
        .collect::<Result<Vec<_>>>()?;
    let stimulus_hist: Vec<f64> = sessions.iter().map(|s| stimulus(&s.exercises)).collect();
    let readiness_hist: Vec<f64> = sessions.iter().map(|s| readiness(&s.metrics)).collect();

    tracing::debug!("Computed analytics over {} sessions", sessions.len());

    Ok(AnalyticsSummary {
        sessions: sessions.len(),
        fatigue_mean: mean(&fatigue_hist),
        stimulus_mean: mean(&stimulus_hist),
        readiness_mean: mean(&readiness_hist),
        weekly_volume: weekly_volume(sessions),
        e1rm_trend: e1rm_trend(sessions, exercise),
    })
}

/// The newest `n` items of an oldest-to-newest slice
fn newest<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Analytics over a full history using the configured windows
///
/// Means come from the newest `window` sessions, weekly volume from roughly
/// `weeks` worth of sessions and the e1RM trend from `e1rm_window` sessions.
pub fn analytics_report(
    history: &[SessionRecord],
    exercise: &str,
    config: &AnalyticsConfig,
) -> Result<AnalyticsSummary> {
    let mut summary = analytics_summary(newest(history, config.window), exercise)?;
    summary.weekly_volume = weekly_volume(newest(history, config.volume_window()));
    summary.e1rm_trend = e1rm_trend(newest(history, config.e1rm_window), exercise);
    Ok(summary)
}

/// Next workout, latest metrics and recent summaries in one value
pub fn dashboard(
    profile: &AthleteProfile,
    sessions: &[SessionRecord],
    summary_limit: usize,
) -> Result<Dashboard> {
    let latest = sessions
        .last()
        .ok_or_else(|| Error::Validation("Need at least 1 logged session".into()))?;

    let next_workout = prescribe(profile, sessions)?;

    Ok(Dashboard {
        next_workout,
        latest_metrics: latest.metrics.clone(),
        recent_sessions: summarize_sessions(sessions, summary_limit),
    })
}
