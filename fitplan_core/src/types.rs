//! Core domain types for FitPlan.
//!
//! This module defines the fundamental types used throughout the system:
//! - Profile intake tags (health conditions, diet, goals)
//! - Exercise templates and their classification
//! - Workout plans, days and sets
//! - Activity logs

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Implements `FromStr` and `Display` using the serde `snake_case` tag.
macro_rules! snake_case_tags {
    ($($ty:ident),* $(,)?) => {$(
        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let tag = s.trim().to_lowercase().replace('-', "_");
                serde_json::from_value(serde_json::Value::String(tag))
                    .map_err(|_| format!("unknown {} '{}'", stringify!($ty), s))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match serde_json::to_value(self) {
                    Ok(serde_json::Value::String(tag)) => f.write_str(&tag),
                    _ => write!(f, "{:?}", self),
                }
            }
        }
    )*};
}

// ============================================================================
// Profile Tags
// ============================================================================

/// Health condition reported at intake; doubles as an exercise contraindication
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthCondition {
    None,
    Diabetes,
    Hypertension,
    HeartDisease,
    Asthma,
    Arthritis,
    BackPain,
    KneeIssues,
    Obesity,
    Pregnancy,
}

impl HealthCondition {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            HealthCondition::None => "None",
            HealthCondition::Diabetes => "Diabetes",
            HealthCondition::Hypertension => "Hypertension",
            HealthCondition::HeartDisease => "Heart disease",
            HealthCondition::Asthma => "Asthma",
            HealthCondition::Arthritis => "Arthritis",
            HealthCondition::BackPain => "Back pain",
            HealthCondition::KneeIssues => "Knee issues",
            HealthCondition::Obesity => "Obesity",
            HealthCondition::Pregnancy => "Pregnancy",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DietaryPreference {
    #[default]
    NoPreference,
    Vegetarian,
    Vegan,
    Pescatarian,
    Keto,
    Paleo,
    GlutenFree,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    MuscleGain,
    Endurance,
    Flexibility,
    GeneralFitness,
}

impl FitnessGoal {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "Weight Loss",
            FitnessGoal::MuscleGain => "Muscle Gain",
            FitnessGoal::Endurance => "Endurance",
            FitnessGoal::Flexibility => "Flexibility",
            FitnessGoal::GeneralFitness => "General Fitness",
        }
    }
}

/// Exercise difficulty tier, totally ordered beginner < intermediate < advanced
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// The next tier up, or None at advanced
    pub fn next(self) -> Option<Difficulty> {
        match self {
            Difficulty::Beginner => Some(Difficulty::Intermediate),
            Difficulty::Intermediate => Some(Difficulty::Advanced),
            Difficulty::Advanced => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

/// A user's fitness level uses the same scale as exercise difficulty.
pub type FitnessLevel = Difficulty;

/// Age bucket used to gate exercise suitability
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Youth,
    Adult,
    Senior,
}

impl AgeGroup {
    /// <18 youth, 18-64 adult, >=65 senior
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=17 => AgeGroup::Youth,
            18..=64 => AgeGroup::Adult,
            _ => AgeGroup::Senior,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Cardio,
    Strength,
    Flexibility,
    Balance,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    None,
    Mat,
    Dumbbells,
    ResistanceBand,
    Chair,
    JumpRope,
    StabilityBall,
}

snake_case_tags!(
    HealthCondition,
    DietaryPreference,
    FitnessGoal,
    Difficulty,
    AgeGroup,
    ExerciseType,
    Equipment,
    PlanStatus,
    ActivityType,
);

// ============================================================================
// Profile
// ============================================================================

/// A completed user profile
///
/// Profiles are only constructed through onboarding (see
/// [`crate::onboarding::ProfileDraft::complete`]), so every field the plan
/// generator needs is always present.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: String,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    #[serde(default)]
    pub health_conditions: BTreeSet<HealthCondition>,
    #[serde(default)]
    pub dietary_preference: DietaryPreference,
    pub fitness_goal: FitnessGoal,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
}

impl Profile {
    pub fn age_group(&self) -> AgeGroup {
        AgeGroup::from_age(self.age)
    }

    /// Reported conditions other than the `none` marker
    pub fn active_conditions(&self) -> impl Iterator<Item = HealthCondition> + '_ {
        self.health_conditions
            .iter()
            .copied()
            .filter(|c| *c != HealthCondition::None)
    }

    pub fn has_health_conditions(&self) -> bool {
        self.active_conditions().next().is_some()
    }
}

// ============================================================================
// Exercise Templates
// ============================================================================

/// Optional easier variants of an exercise
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Modifications {
    pub beginner: Option<String>,
    pub senior: Option<String>,
}

/// Static exercise reference record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseTemplate {
    pub id: String,
    pub name: String,
    pub target_muscles: Vec<String>,
    pub difficulty: Difficulty,
    pub contraindications: Vec<HealthCondition>,
    pub equipment: Vec<Equipment>,
    pub calories_per_minute: f64,
    pub exercise_type: ExerciseType,
    pub age_groups: Vec<AgeGroup>,
    #[serde(default)]
    pub modifications: Modifications,
}

impl ExerciseTemplate {
    /// True if any contraindication is in `conditions`
    pub fn is_contraindicated_for(&self, conditions: &BTreeSet<HealthCondition>) -> bool {
        self.contraindications.iter().any(|c| conditions.contains(c))
    }
}

/// The exercise template table, keyed by id for deterministic iteration
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: BTreeMap<String, ExerciseTemplate>,
}

// ============================================================================
// Workout Plans
// ============================================================================

/// One exercise occurrence within a day
///
/// Neither `reps` nor `duration_minutes` is required: isometric holds may
/// carry neither.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSet {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub rest_seconds: u32,
    pub notes: Option<String>,
}

/// One training day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyWorkout {
    pub day_number: u32,
    pub week_number: u32,
    pub day_of_week: Weekday,
    pub title: String,
    pub exercises: Vec<WorkoutSet>,
    pub estimated_duration_minutes: u32,
    pub target_calories: Option<u32>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Active,
    Completed,
    Cancelled,
}

/// A generated or custom multi-week schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: PlanStatus,
    pub daily_workouts: Vec<DailyWorkout>,
    pub total_weeks: u32,
    pub fitness_level: FitnessLevel,
    pub goal: FitnessGoal,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub derived_from: Option<Uuid>,
}

impl WorkoutPlan {
    pub fn day(&self, day_number: u32) -> Option<&DailyWorkout> {
        self.daily_workouts
            .iter()
            .find(|d| d.day_number == day_number)
    }

    /// Every set in the plan, across all days
    pub fn all_sets(&self) -> impl Iterator<Item = &WorkoutSet> {
        self.daily_workouts.iter().flat_map(|d| d.exercises.iter())
    }
}

// ============================================================================
// Activity Logs
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Workout,
    Walking,
    Running,
    Cycling,
    Swimming,
    Yoga,
    Other,
}

/// A completed activity; immutable once written
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub activity_type: ActivityType,
    pub duration_minutes: u32,
    pub calories_burned: Option<u32>,
    pub plan_id: Option<Uuid>,
    pub day_number: Option<u32>,
    #[serde(default)]
    pub completed_exercises: Vec<String>,
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}
