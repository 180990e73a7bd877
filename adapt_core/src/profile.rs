//! Athlete profile persistence with file locking.
//!
//! This module handles saving and loading the athlete profile
//! with proper file locking to prevent concurrent access issues.

use crate::{AthleteProfile, Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

impl AthleteProfile {
    /// Load the profile from a file with shared locking
    ///
    /// Returns the default baseline profile if the file doesn't exist.
    /// A file that exists but cannot be parsed is an error: silently
    /// replacing an athlete's profile would change every prescription.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No profile file found, using default profile");
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let profile = serde_json::from_str::<AthleteProfile>(&contents)
            .map_err(|e| Error::Store(format!("Corrupted profile file {:?}: {}", path, e)))?;

        tracing::debug!("Loaded athlete profile from {:?}", path);
        Ok(profile)
    }

    /// Save the profile to a file with exclusive locking
    ///
    /// Atomically writes the profile by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store(format!("Profile path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved athlete profile to {:?}", path);
        Ok(())
    }

    /// Load the profile, modify it, validate it and save it back atomically
    ///
    /// The whole read-modify-write holds an exclusive lock on a sidecar
    /// `.lock` file, so concurrent updates to different fields both land.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut AthleteProfile) -> Result<()>,
    {
        let lock = open_update_lock(path)?;
        lock.lock_exclusive()?;

        let result = Self::load(path).and_then(|mut profile| {
            f(&mut profile)?;
            profile.validate()?;
            profile.save(path)?;
            Ok(profile)
        });
        lock.unlock()?;

        let profile = result?;
        tracing::info!("Updated athlete profile at {:?}", path);
        Ok(profile)
    }
}

/// Sidecar lock file guarding profile updates
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn open_update_lock(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new()
        .create(true)
        .write(true)
        .open(lock_path(path))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");

        let profile = AthleteProfile {
            age: 41,
            bodyweight_kg: 92.5,
            training_age_years: 12.0,
            goal: "powerlifting".into(),
            mrv_baseline_sets: 18,
        };
        profile.save(&path).unwrap();

        let loaded = AthleteProfile::load(&path).unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let profile = AthleteProfile::load(&path).unwrap();
        assert_eq!(profile, AthleteProfile::default());
        assert_eq!(profile.goal, "hypertrophy");
        assert_eq!(profile.mrv_baseline_sets, 14);
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");

        AthleteProfile::update(&path, |p| {
            p.goal = "strength".into();
            p.training_age_years = 5.0;
            Ok(())
        })
        .unwrap();

        let loaded = AthleteProfile::load(&path).unwrap();
        assert_eq!(loaded.goal, "strength");
        assert_eq!(loaded.training_age_years, 5.0);
    }

    #[test]
    fn test_update_rejects_invalid_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");

        let err = AthleteProfile::update(&path, |p| {
            p.age = 7;
            Ok(())
        })
        .unwrap_err();

        assert!(err.is_validation());
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");

        // Each update reads the previous value, so a lost update shows up in the total
        std::thread::scope(|scope| {
            for _ in 0..20 {
                let path = &path;
                scope.spawn(move || {
                    AthleteProfile::update(path, |p| {
                        p.mrv_baseline_sets += 1;
                        Ok(())
                    })
                    .unwrap();
                });
            }
        });

        let loaded = AthleteProfile::load(&path).unwrap();
        assert_eq!(loaded.mrv_baseline_sets, 14 + 20);
    }

    #[test]
    fn test_corrupted_profile_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");

        std::fs::write(&path, "{ invalid json }").unwrap();

        let err = AthleteProfile::load(&path).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");

        AthleteProfile::default().save(&path).unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "profile.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only profile.json, found extras: {:?}",
            extras
        );
    }
}
