#![forbid(unsafe_code)]

//! Core domain model and decision engine for Adapt.
//!
//! This crate provides:
//! - Domain types (exercise entries, session metrics, profiles, prescriptions)
//! - Physiology, prediction and progression models
//! - The prescription engine and trend analytics
//! - Persistence (WAL, CSV archive, profile store)
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod numeric;
pub mod physiology;
pub mod prediction;
pub mod progression;
pub mod engine;
pub mod analytics;
pub mod validation;
pub mod config;
pub mod logging;
pub mod wal;
pub mod csv_rollup;
pub mod history;
pub mod profile;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use engine::prescribe;
pub use analytics::{analytics_report, analytics_summary, dashboard};
pub use wal::{JsonlPrescriptionLog, JsonlSink, PrescriptionSink, SessionSink};
pub use history::load_recent_sessions;
