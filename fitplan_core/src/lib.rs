#![forbid(unsafe_code)]

//! Core domain model and business logic for FitPlan.
//!
//! This crate provides:
//! - Domain types (profiles, exercise templates, plans, activity logs)
//! - The built-in exercise catalog and pure eligibility filters
//! - Fitness level derivation and plan assembly
//! - Plan, profile and activity validation
//! - BMI utilities
//! - Document storage and the per-user session built on it
//! - Progress statistics and CSV export

pub mod types;
pub mod error;
pub mod catalog;
pub mod filters;
pub mod level;
pub mod bmi;
pub mod planner;
pub mod validation;
pub mod onboarding;
pub mod store;
pub mod session;
pub mod progress;
pub mod export;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use bmi::{bmi_category, calculate_bmi, healthy_weight_range, BmiCategory};
pub use level::{derive_fitness_level, LevelPolicy};
pub use planner::{generate_plan, PlanGenerator, PlanOptions};
pub use validation::{validate_plan, validate_profile, PlanValidation, ValidationReport};
pub use onboarding::{ProfileDraft, ProfileStep};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
pub use session::Session;
pub use progress::ProgressSummary;
pub use export::export_activities_csv;
