//! Session history loading for the engine window.
//!
//! This module loads logged sessions from both the WAL and the CSV archive
//! and hands the engine the newest N sessions in chronological order.

use crate::csv_rollup::CsvRow;
use crate::{LoggedSession, Result, SessionRecord};
use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// Load every logged session, oldest session date first
///
/// Sessions on the same date keep the order they were logged in.
/// Automatically deduplicates sessions that appear in both WAL and CSV; the
/// WAL copy wins since metrics updates are applied there.
pub fn load_all_sessions(wal_path: &Path, csv_path: &Path) -> Result<Vec<LoggedSession>> {
    let mut sessions = Vec::new();
    let mut seen_ids = HashSet::new();

    if wal_path.exists() {
        for session in crate::wal::read_sessions(wal_path)? {
            if seen_ids.insert(session.id) {
                sessions.push(session);
            }
        }
        tracing::debug!("Loaded {} sessions from WAL", sessions.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for session in load_sessions_from_csv(csv_path)? {
            if seen_ids.insert(session.id) {
                sessions.push(session);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} sessions from CSV", csv_count);
    }

    sessions.sort_by(|a, b| {
        a.record
            .date()
            .cmp(&b.record.date())
            .then(a.logged_at.cmp(&b.logged_at))
    });

    Ok(sessions)
}

/// Load the newest `limit` sessions as engine input, ordered oldest to newest
pub fn load_recent_sessions(
    wal_path: &Path,
    csv_path: &Path,
    limit: usize,
) -> Result<Vec<SessionRecord>> {
    let sessions = load_all_sessions(wal_path, csv_path)?;
    let skip = sessions.len().saturating_sub(limit);

    let recent: Vec<SessionRecord> = sessions
        .into_iter()
        .skip(skip)
        .map(|s| s.record)
        .collect();

    tracing::info!(
        "Loaded {} recent sessions (limit {})",
        recent.len(),
        limit
    );

    Ok(recent)
}

/// Rebuild sessions from the flat CSV archive
///
/// Rows of one session are regrouped in file order. Unparseable rows are
/// skipped with a warning.
fn load_sessions_from_csv(path: &Path) -> Result<Vec<LoggedSession>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut sessions: Vec<LoggedSession> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
                continue;
            }
        };

        let id = match row.session_id() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to parse CSV row: {}", e);
                continue;
            }
        };

        if let Some(&pos) = index.get(&id) {
            sessions[pos].record.exercises.push(row.entry());
            continue;
        }

        match row.into_session() {
            Ok(session) => {
                index.insert(id, sessions.len());
                sessions.push(session);
            }
            Err(e) => tracing::warn!("Failed to parse CSV row: {}", e),
        }
    }

    Ok(sessions)
}
