//! Core domain types for the adaptive training engine.
//!
//! This module defines the values that flow through the system:
//! - Training history (exercise entries, session metrics, session records)
//! - The athlete profile
//! - The prescription and its rationale
//! - Analytics read models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Training History
// ============================================================================

/// One exercise performed in a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseEntry {
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub load_kg: f64,
    /// Reps in reserve: how many more reps were left before failure
    pub rir: f64,
}

/// Biofeedback and outcome snapshot for one session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionMetrics {
    pub date: NaiveDate,
    pub sleep_hours: f64,
    pub resting_hr: u32,
    pub hrv_rmssd: f64,
    pub soreness: f64,
    pub motivation: f64,
    pub rpe_session: f64,
    pub duration_min: u32,
}

/// A past session: its metrics plus the exercises in the order performed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub metrics: SessionMetrics,
    pub exercises: Vec<ExerciseEntry>,
}

impl SessionRecord {
    pub fn new(metrics: SessionMetrics, exercises: Vec<ExerciseEntry>) -> Self {
        Self { metrics, exercises }
    }

    pub fn date(&self) -> NaiveDate {
        self.metrics.date
    }

    /// Total load moved: `load × reps × sets` summed over entries
    pub fn tonnage(&self) -> f64 {
        self.exercises
            .iter()
            .map(|e| e.load_kg * f64::from(e.reps) * f64::from(e.sets))
            .sum()
    }
}

/// A session as stored in the session log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedSession {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub record: SessionRecord,
}

impl LoggedSession {
    pub fn new(record: SessionRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            record,
        }
    }
}

// ============================================================================
// Athlete Profile
// ============================================================================

/// Athlete profile and constraints for training decisions
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AthleteProfile {
    pub age: u32,
    pub bodyweight_kg: f64,
    pub training_age_years: f64,
    pub goal: String,
    /// Baseline maximum recoverable volume, in sets
    pub mrv_baseline_sets: u32,
}

impl Default for AthleteProfile {
    fn default() -> Self {
        Self {
            age: 30,
            bodyweight_kg: 80.0,
            training_age_years: 2.0,
            goal: "hypertrophy".into(),
            mrv_baseline_sets: 14,
        }
    }
}

// ============================================================================
// Prescription
// ============================================================================

/// Diagnostics surfaced alongside a prescription for traceability
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rationale {
    pub readiness: f64,
    pub fatigue: f64,
    pub trend: f64,
    pub mrv_sets: f64,
    pub adaptation_score: f64,
    /// "1" when a deload was triggered, "0" otherwise
    pub deload: String,
}

/// The prescribed next session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub target_date: NaiveDate,
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub load_kg: f64,
    pub deload: bool,
    pub rationale: Rationale,
}

// ============================================================================
// Analytics Types
// ============================================================================

/// Coarse muscle grouping inferred from exercise names
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    LowerBody,
    Back,
    Chest,
    ArmsShoulders,
    Other,
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuscleGroup::LowerBody => write!(f, "Lower Body"),
            MuscleGroup::Back => write!(f, "Back"),
            MuscleGroup::Chest => write!(f, "Chest"),
            MuscleGroup::ArmsShoulders => write!(f, "Arms/Shoulders"),
            MuscleGroup::Other => write!(f, "Other"),
        }
    }
}

/// Short summary of a recent session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub date: NaiveDate,
    pub exercise_count: usize,
    pub tonnage: f64,
    pub avg_rir: f64,
}

/// Weekly tonnage for one muscle group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyVolumePoint {
    pub week_start: NaiveDate,
    pub muscle: MuscleGroup,
    pub volume: f64,
}

/// Estimated 1RM for one exercise on one date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct E1rmPoint {
    pub date: NaiveDate,
    pub exercise: String,
    pub e1rm: f64,
}

/// Trend analytics over a window of sessions
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsSummary {
    pub sessions: usize,
    pub fatigue_mean: f64,
    pub stimulus_mean: f64,
    pub readiness_mean: f64,
    pub weekly_volume: Vec<WeeklyVolumePoint>,
    pub e1rm_trend: Vec<E1rmPoint>,
}

/// Everything the dashboard view needs in one value
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub next_workout: Prescription,
    pub latest_metrics: SessionMetrics,
    pub recent_sessions: Vec<SessionSummary>,
}
