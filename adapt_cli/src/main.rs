use adapt_core::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "adapt")]
#[command(about = "Adaptive strength training prescription system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prescribe the next session (default)
    Next {
        /// Dry run - show prescription without recording it
        #[arg(long)]
        dry_run: bool,
    },

    /// Log a completed session from a JSON file
    Log {
        /// Session JSON: {"metrics": {...}, "exercises": [...]}
        #[arg(long)]
        file: PathBuf,
    },

    /// Replace the metrics of the latest logged session on the same date
    UpdateMetrics {
        /// Metrics JSON with a `date` field
        #[arg(long)]
        file: PathBuf,
    },

    /// Show trend analytics
    Analytics {
        /// Exercise for the e1RM trend (defaults to config)
        #[arg(long)]
        exercise: Option<String>,
    },

    /// Show next workout, latest metrics and recent sessions
    Dashboard,

    /// Show or edit the athlete profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Roll up WAL sessions to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the current profile
    Show,

    /// Update one or more profile fields
    Set {
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        bodyweight: Option<f64>,
        #[arg(long)]
        training_age: Option<f64>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        mrv_baseline: Option<u32>,
    },
}

/// File layout inside the data directory
struct DataPaths {
    wal_dir: PathBuf,
    wal: PathBuf,
    csv: PathBuf,
    profile: PathBuf,
    prescriptions: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            wal: wal_dir.join("sessions.wal"),
            wal_dir,
            csv: data_dir.join("sessions.csv"),
            profile: data_dir.join("profile.json"),
            prescriptions: data_dir.join("prescriptions.jsonl"),
        }
    }
}

fn main() -> Result<()> {
    adapt_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Next { dry_run }) => cmd_next(&paths, dry_run, &config),
        Some(Commands::Log { file }) => cmd_log(&paths, &file),
        Some(Commands::UpdateMetrics { file }) => cmd_update_metrics(&paths, &file),
        Some(Commands::Analytics { exercise }) => cmd_analytics(&paths, exercise, &config),
        Some(Commands::Dashboard) => cmd_dashboard(&paths, &config),
        Some(Commands::Profile { action }) => cmd_profile(&paths, action),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        None => cmd_next(&paths, false, &config),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn cmd_next(paths: &DataPaths, dry_run: bool, config: &Config) -> Result<()> {
    let profile = AthleteProfile::load(&paths.profile)?;
    let sessions = load_recent_sessions(&paths.wal, &paths.csv, config.history.window)?;

    let prescription = match prescribe(&profile, &sessions) {
        Ok(p) => p,
        Err(e) if e.is_validation() && sessions.len() < engine::MIN_SESSIONS => {
            println!(
                "Not enough history yet: {} of {} sessions logged.",
                sessions.len(),
                engine::MIN_SESSIONS
            );
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    display_prescription(&prescription);

    if dry_run {
        println!("\n[Dry run - not recording prescription]");
        return Ok(());
    }

    let mut log = JsonlPrescriptionLog::new(&paths.prescriptions);
    log.record(&prescription)?;
    println!("\n✓ Prescription recorded!");
    Ok(())
}

fn cmd_log(paths: &DataPaths, file: &Path) -> Result<()> {
    let record: SessionRecord = read_json(file)?;
    record.validate()?;

    std::fs::create_dir_all(&paths.wal_dir)?;

    let session = LoggedSession::new(record);
    let mut sink = JsonlSink::new(&paths.wal);
    sink.append(&session)?;

    println!(
        "✓ Session logged! ({} exercises on {})",
        session.record.exercises.len(),
        session.record.date()
    );
    println!("  id: {}", session.id);
    Ok(())
}

fn cmd_update_metrics(paths: &DataPaths, file: &Path) -> Result<()> {
    let metrics: SessionMetrics = read_json(file)?;
    metrics.validate()?;

    let updated = wal::update_metrics(&paths.wal, &metrics)?;
    println!("✓ Metrics updated for {} (session {})", metrics.date, updated.id);
    Ok(())
}

fn cmd_analytics(paths: &DataPaths, exercise: Option<String>, config: &Config) -> Result<()> {
    let history = load_recent_sessions(&paths.wal, &paths.csv, usize::MAX)?;
    let exercise = exercise.unwrap_or_else(|| config.analytics.default_exercise.clone());

    let summary = match analytics_report(&history, &exercise, &config.analytics) {
        Ok(s) => s,
        Err(e) if e.is_insufficient_data() => {
            println!(
                "Not enough history yet: {} of {} sessions logged.",
                history.len(),
                analytics::MIN_ANALYTICS_SESSIONS
            );
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  ANALYTICS ({} sessions)", summary.sessions);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Fatigue (mean):   {:.4}", summary.fatigue_mean);
    println!("  Stimulus (mean):  {:.4}", summary.stimulus_mean);
    println!("  Readiness (mean): {:.4}", summary.readiness_mean);

    println!("\n  Weekly volume:");
    for point in &summary.weekly_volume {
        println!(
            "    {}  {:<15} {:>10.2}",
            point.week_start,
            point.muscle.to_string(),
            point.volume
        );
    }

    println!("\n  e1RM trend ({}):", exercise);
    if summary.e1rm_trend.is_empty() {
        println!("    (no sessions with {})", exercise);
    }
    for point in &summary.e1rm_trend {
        println!("    {}  {:.2} kg", point.date, point.e1rm);
    }
    println!();
    Ok(())
}

fn cmd_dashboard(paths: &DataPaths, config: &Config) -> Result<()> {
    let profile = AthleteProfile::load(&paths.profile)?;
    let sessions = load_recent_sessions(&paths.wal, &paths.csv, config.history.window)?;

    let view = dashboard(&profile, &sessions, config.analytics.summary_limit)?;

    display_prescription(&view.next_workout);

    let m = &view.latest_metrics;
    println!("  Latest metrics ({}):", m.date);
    println!(
        "    sleep {:.1}h · resting HR {} · HRV {:.0} · soreness {:.0} · motivation {:.0} · RPE {:.1}",
        m.sleep_hours, m.resting_hr, m.hrv_rmssd, m.soreness, m.motivation, m.rpe_session
    );

    println!("\n  Recent sessions:");
    for s in &view.recent_sessions {
        println!(
            "    {}  {} exercises  {:>9.2} kg  avg RIR {:.2}",
            s.date, s.exercise_count, s.tonnage, s.avg_rir
        );
    }
    println!();
    Ok(())
}

fn cmd_profile(paths: &DataPaths, action: Option<ProfileAction>) -> Result<()> {
    let profile = match action {
        None | Some(ProfileAction::Show) => AthleteProfile::load(&paths.profile)?,
        Some(ProfileAction::Set {
            age,
            bodyweight,
            training_age,
            goal,
            mrv_baseline,
        }) => {
            let updated = AthleteProfile::update(&paths.profile, |p| {
                if let Some(age) = age {
                    p.age = age;
                }
                if let Some(bodyweight) = bodyweight {
                    p.bodyweight_kg = bodyweight;
                }
                if let Some(training_age) = training_age {
                    p.training_age_years = training_age;
                }
                if let Some(goal) = goal {
                    p.goal = goal;
                }
                if let Some(mrv_baseline) = mrv_baseline {
                    p.mrv_baseline_sets = mrv_baseline;
                }
                Ok(())
            })?;
            println!("✓ Profile updated!");
            updated
        }
    };

    println!("  Age:            {}", profile.age);
    println!("  Bodyweight:     {:.1} kg", profile.bodyweight_kg);
    println!("  Training age:   {:.1} years", profile.training_age_years);
    println!("  Goal:           {}", profile.goal);
    println!("  MRV baseline:   {} sets", profile.mrv_baseline_sets);
    Ok(())
}

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.wal.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = adapt_core::csv_rollup::wal_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = adapt_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

fn display_prescription(prescription: &Prescription) {
    println!("\n╭─────────────────────────────────────────╮");
    if prescription.deload {
        println!("│  NEXT SESSION: {} (DELOAD)", prescription.target_date);
    } else {
        println!("│  NEXT SESSION: {}", prescription.target_date);
    }
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", prescription.exercise);
    println!(
        "  → {} sets × {} reps @ {:.2} kg",
        prescription.sets, prescription.reps, prescription.load_kg
    );
    println!();

    let r = &prescription.rationale;
    println!("  Readiness:  {:.4}", r.readiness);
    println!("  Fatigue:    {:.4}", r.fatigue);
    println!("  Trend:      {:+.4}", r.trend);
    println!("  MRV:        {:.0} sets", r.mrv_sets);
    println!("  Adaptation: {:.4}", r.adaptation_score);
    println!();
}
