//! Write-Ahead Log (WAL) for session and prescription persistence.
//!
//! Records are appended to JSONL (JSON Lines) files with file locking
//! to ensure safe concurrent access.

use crate::{Error, LoggedSession, Prescription, Result, SessionMetrics};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Session sink trait for persisting sessions
pub trait SessionSink {
    fn append(&mut self, session: &LoggedSession) -> Result<()>;
}

/// Prescription sink trait for persisting issued prescriptions
pub trait PrescriptionSink {
    fn record(&mut self, prescription: &Prescription) -> Result<()>;
}

/// JSONL-based session sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &LoggedSession) -> Result<()> {
        recover_interrupted_rewrite(&self.path)?;
        append_json_line(&self.path, session)?;
        tracing::debug!("Appended session {} to WAL", session.id);
        Ok(())
    }
}

/// JSONL log of every prescription handed out
pub struct JsonlPrescriptionLog {
    path: PathBuf,
}

impl JsonlPrescriptionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PrescriptionSink for JsonlPrescriptionLog {
    fn record(&mut self, prescription: &Prescription) -> Result<()> {
        append_json_line(&self.path, prescription)?;
        tracing::debug!(
            "Recorded prescription for {} ({})",
            prescription.target_date,
            prescription.exercise
        );
        Ok(())
    }
}

/// Append one value as a JSON line under an exclusive lock
fn append_json_line<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // Acquire exclusive lock
    file.lock_exclusive()?;

    let mut writer = std::io::BufWriter::new(&file);
    let line = serde_json::to_string(value)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    drop(writer);

    file.unlock()?;
    Ok(())
}

/// Read every parseable JSON line under a shared lock
fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let values = parse_json_lines(BufReader::new(&file), path);

    file.unlock()?;
    values
}

/// Parse JSON lines, skipping blank lines and logging the ones that fail
fn parse_json_lines<T: DeserializeOwned, R: BufRead>(reader: R, path: &Path) -> Result<Vec<T>> {
    let mut values = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(value) => values.push(value),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse record at {:?} line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    Ok(values)
}

/// Read all sessions from a WAL file, in logged order
pub fn read_sessions(path: &Path) -> Result<Vec<LoggedSession>> {
    recover_interrupted_rewrite(path)?;
    let sessions = read_json_lines::<LoggedSession>(path)?;
    tracing::debug!("Read {} sessions from WAL", sessions.len());
    Ok(sessions)
}

/// Read all recorded prescriptions, oldest first
pub fn read_prescriptions(path: &Path) -> Result<Vec<Prescription>> {
    read_json_lines(path)
}

/// Replace the metrics of the most recently logged session on `metrics.date`
///
/// The file is rewritten in place under an exclusive lock. Lines that fail to
/// parse are preserved verbatim. The previous contents stay in a sibling
/// `.bak` file until the rewrite is on disk, so a failed or interrupted
/// rewrite never loses sessions.
pub fn update_metrics(path: &Path, metrics: &SessionMetrics) -> Result<LoggedSession> {
    recover_interrupted_rewrite(path)?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| Error::Store(format!("Cannot open session log {:?}: {}", path, e)))?;
    file.lock_exclusive()?;

    let result = rewrite_metrics(&mut file, path, metrics);
    file.unlock()?;

    let updated = result?;
    tracing::info!(
        "Updated metrics for session {} on {}",
        updated.id,
        metrics.date
    );
    Ok(updated)
}

fn rewrite_metrics(file: &mut File, path: &Path, metrics: &SessionMetrics) -> Result<LoggedSession> {
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let mut lines: Vec<String> = contents.lines().map(str::to_owned).collect();

    let target = lines
        .iter()
        .enumerate()
        .rev()
        .find_map(|(idx, line)| {
            serde_json::from_str::<LoggedSession>(line)
                .ok()
                .filter(|s| s.record.metrics.date == metrics.date)
                .map(|s| (idx, s))
        });

    let (idx, mut session) = target.ok_or_else(|| {
        Error::Store(format!("Session metrics not found for {}", metrics.date))
    })?;

    session.record.metrics = metrics.clone();
    lines[idx] = serde_json::to_string(&session)?;

    let mut updated = String::with_capacity(contents.len());
    for line in &lines {
        updated.push_str(line);
        updated.push('\n');
    }

    replace_contents(file, path, &contents, &updated)?;
    Ok(session)
}

/// Backup written next to the WAL while it is being rewritten
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Overwrite the locked WAL with `updated`, keeping `original` recoverable
///
/// Deleting the backup commits the rewrite. If writing fails the original is
/// put back; if that fails too the backup is left for
/// [`recover_interrupted_rewrite`].
fn replace_contents(file: &mut File, path: &Path, original: &str, updated: &str) -> Result<()> {
    let backup = backup_path(path);
    write_synced(&backup, original)?;

    if let Err(e) = overwrite(file, updated) {
        tracing::error!("Rewrite of {:?} failed, restoring previous contents: {}", path, e);
        match overwrite(file, original) {
            Ok(()) => std::fs::remove_file(&backup)?,
            Err(restore) => tracing::error!(
                "Restore of {:?} failed, backup kept at {:?}: {}",
                path,
                backup,
                restore
            ),
        }
        return Err(e);
    }

    std::fs::remove_file(&backup)?;
    Ok(())
}

fn overwrite(file: &mut File, contents: &str) -> Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn write_synced(path: &Path, contents: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Put back a WAL whose rewrite was interrupted
///
/// A leftover backup means the last rewrite never committed, so its contents
/// are the last complete log. Returns whether anything was restored.
pub fn recover_interrupted_rewrite(path: &Path) -> Result<bool> {
    let backup = backup_path(path);
    if !backup.exists() {
        return Ok(false);
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;
    file.lock_exclusive()?;

    let result = restore_from_backup(&mut file, &backup);
    file.unlock()?;

    let restored = result?;
    if restored {
        tracing::warn!("Restored {:?} from an interrupted rewrite", path);
    }
    Ok(restored)
}

fn restore_from_backup(file: &mut File, backup: &Path) -> Result<bool> {
    // A live rewrite may have committed while we waited for the lock
    if !backup.exists() {
        return Ok(false);
    }

    let original = std::fs::read_to_string(backup)?;
    overwrite(file, &original)?;
    std::fs::remove_file(backup)?;
    Ok(true)
}

/// Hand every session in the WAL to `archive`, then empty the WAL
///
/// Everything happens under one exclusive lock, so appenders wait and then
/// write into the same, now empty, file. The raw log is appended to a sibling
/// `.processed` file before truncation. The WAL is left untouched if
/// `archive` fails. Returns the number of sessions archived.
pub(crate) fn drain_sessions<F>(path: &Path, archive: F) -> Result<usize>
where
    F: FnOnce(&[LoggedSession]) -> Result<()>,
{
    if !path.exists() {
        return Ok(0);
    }
    recover_interrupted_rewrite(path)?;

    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    file.lock_exclusive()?;

    let result = drain_locked(&mut file, path, archive);
    file.unlock()?;
    result
}

fn drain_locked<F>(file: &mut File, path: &Path, archive: F) -> Result<usize>
where
    F: FnOnce(&[LoggedSession]) -> Result<()>,
{
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let sessions: Vec<LoggedSession> = parse_json_lines(contents.as_bytes(), path)?;
    if sessions.is_empty() {
        return Ok(0);
    }

    archive(&sessions)?;

    let mut processed = OpenOptions::new()
        .create(true)
        .append(true)
        .open(processed_path(path))?;
    processed.write_all(contents.as_bytes())?;
    processed.sync_all()?;

    file.set_len(0)?;
    file.sync_all()?;

    tracing::debug!("Drained {} sessions from {:?}", sessions.len(), path);
    Ok(sessions.len())
}

/// Archive copy of drained WAL contents
pub(crate) fn processed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".processed");
    PathBuf::from(name)
}
