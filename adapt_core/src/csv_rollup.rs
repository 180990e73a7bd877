//! CSV rollup functionality for archiving WAL sessions.
//!
//! This module implements atomic WAL-to-CSV conversion with proper error handling
//! to prevent data loss. Each exercise entry becomes one CSV row carrying its
//! session's id and metrics, so the archive stays flat and spreadsheet-friendly.

use crate::{
    Error, ExerciseEntry, LoggedSession, Result, SessionMetrics, SessionRecord,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV archive: one exercise entry of one session
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CsvRow {
    pub session_id: String,
    pub logged_at: String,
    pub date: NaiveDate,
    pub sleep_hours: f64,
    pub resting_hr: u32,
    pub hrv_rmssd: f64,
    pub soreness: f64,
    pub motivation: f64,
    pub rpe_session: f64,
    pub duration_min: u32,
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub load_kg: f64,
    pub rir: f64,
}

impl CsvRow {
    fn from_entry(session: &LoggedSession, entry: &ExerciseEntry) -> Self {
        let m = &session.record.metrics;
        CsvRow {
            session_id: session.id.to_string(),
            logged_at: session.logged_at.to_rfc3339(),
            date: m.date,
            sleep_hours: m.sleep_hours,
            resting_hr: m.resting_hr,
            hrv_rmssd: m.hrv_rmssd,
            soreness: m.soreness,
            motivation: m.motivation,
            rpe_session: m.rpe_session,
            duration_min: m.duration_min,
            exercise: entry.exercise.clone(),
            sets: entry.sets,
            reps: entry.reps,
            load_kg: entry.load_kg,
            rir: entry.rir,
        }
    }

    pub fn session_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.session_id)
            .map_err(|e| Error::Store(format!("Invalid UUID: {}", e)))
    }

    pub fn logged_at(&self) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.logged_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Store(format!("Invalid timestamp: {}", e)))
    }

    pub fn metrics(&self) -> SessionMetrics {
        SessionMetrics {
            date: self.date,
            sleep_hours: self.sleep_hours,
            resting_hr: self.resting_hr,
            hrv_rmssd: self.hrv_rmssd,
            soreness: self.soreness,
            motivation: self.motivation,
            rpe_session: self.rpe_session,
            duration_min: self.duration_min,
        }
    }

    pub fn entry(&self) -> ExerciseEntry {
        ExerciseEntry {
            exercise: self.exercise.clone(),
            sets: self.sets,
            reps: self.reps,
            load_kg: self.load_kg,
            rir: self.rir,
        }
    }

    /// Start a session from its first row
    pub fn into_session(self) -> Result<LoggedSession> {
        Ok(LoggedSession {
            id: self.session_id()?,
            logged_at: self.logged_at()?,
            record: SessionRecord::new(self.metrics(), vec![self.entry()]),
        })
    }
}

/// Roll up WAL sessions into CSV and archive the WAL
///
/// This function, holding the WAL's exclusive lock throughout:
/// 1. Reads all sessions from the WAL
/// 2. Appends one row per exercise to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Appends the raw WAL to .processed and empties the WAL
/// 5. Returns the number of sessions processed
///
/// Sessions appended while the rollup runs wait on the lock and land in the
/// emptied WAL.
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let count = crate::wal::drain_sessions(wal_path, |sessions| append_rows(csv_path, sessions))?;

    if count == 0 {
        tracing::info!("No sessions in WAL to roll up");
    } else {
        tracing::info!(
            "Rolled up {} sessions, WAL archived to {:?}",
            count,
            crate::wal::processed_path(wal_path)
        );
    }

    Ok(count)
}

fn append_rows(csv_path: &Path, sessions: &[LoggedSession]) -> Result<()> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Only a fresh file gets a header row
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in sessions {
        for entry in &session.record.exercises {
            writer.serialize(CsvRow::from_entry(session, entry))?;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::debug!("Wrote {} sessions to CSV", sessions.len());
    Ok(())
}

/// Clean up old processed WAL files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed WAL: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}
