//! Structural and range validation.
//!
//! Validators never fail fast: every violated rule is collected so callers
//! can show the full list.

use crate::{ActivityLog, HealthCondition, Profile, WorkoutPlan};
use serde::{Deserialize, Serialize};

pub const AGE_RANGE: (u32, u32) = (13, 100);
pub const HEIGHT_RANGE_CM: (f64, f64) = (100.0, 250.0);
pub const WEIGHT_RANGE_KG: (f64, f64) = (30.0, 300.0);
pub const MAX_ACTIVITY_MINUTES: u32 = 24 * 60;
pub const MAX_ACTIVITY_CALORIES: u32 = 10_000;

/// Outcome of a validation pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Convert into a `Result`, for callers that must refuse invalid values
    pub fn into_result(self) -> crate::Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(crate::Error::Validation(self.errors))
        }
    }
}

/// Plan validation uses the common report shape
pub type PlanValidation = ValidationReport;

/// Check the structural invariants of a generated or edited plan
pub fn validate_plan(plan: &WorkoutPlan) -> PlanValidation {
    let mut errors = Vec::new();

    if plan.user_id.trim().is_empty() {
        errors.push("User ID is required".to_string());
    }

    if plan.end_date <= plan.start_date {
        errors.push("End date must be after start date".to_string());
    }

    if plan.daily_workouts.is_empty() {
        errors.push("Plan must contain at least one daily workout".to_string());
    }

    let mut previous_day = 0;
    for day in &plan.daily_workouts {
        if day.exercises.is_empty() {
            errors.push(format!(
                "Day {} must contain at least one exercise",
                day.day_number
            ));
        }

        if day.day_number <= previous_day {
            errors.push(format!(
                "Day {} is out of order (follows day {})",
                day.day_number, previous_day
            ));
        }
        previous_day = day.day_number;

        for set in &day.exercises {
            if set.sets < 1 {
                errors.push(format!(
                    "Day {}: {} must have at least one set",
                    day.day_number, set.exercise_name
                ));
            }
        }
    }

    if plan.total_weeks < 1 {
        errors.push("Total weeks must be at least 1".to_string());
    }

    if !errors.is_empty() {
        tracing::debug!("Plan {} failed validation: {:?}", plan.id, errors);
    }

    PlanValidation::from_errors(errors)
}

fn check_range(errors: &mut Vec<String>, label: &str, value: f64, (min, max): (f64, f64), unit: &str) {
    if !value.is_finite() {
        errors.push(format!("{} must be a valid number", label));
    } else if value < min || value > max {
        errors.push(format!(
            "{} must be between {} and {} {}",
            label, min, max, unit
        ));
    }
}

/// Range-check a profile before it is stored
pub fn validate_profile(profile: &Profile) -> ValidationReport {
    let mut errors = Vec::new();

    if profile.user_id.trim().is_empty() {
        errors.push("User ID is required".to_string());
    }

    let (min_age, max_age) = AGE_RANGE;
    if profile.age < min_age || profile.age > max_age {
        errors.push(format!(
            "Age must be between {} and {} years",
            min_age, max_age
        ));
    }

    check_range(&mut errors, "Height", profile.height_cm, HEIGHT_RANGE_CM, "cm");
    check_range(&mut errors, "Weight", profile.weight_kg, WEIGHT_RANGE_KG, "kg");
    if let Some(target) = profile.target_weight_kg {
        check_range(&mut errors, "Target weight", target, WEIGHT_RANGE_KG, "kg");
    }

    if profile.health_conditions.contains(&HealthCondition::None)
        && profile.health_conditions.len() > 1
    {
        errors.push("'none' cannot be combined with other health conditions".to_string());
    }

    ValidationReport::from_errors(errors)
}

/// Check an activity log before it is stored
pub fn validate_activity(log: &ActivityLog) -> ValidationReport {
    let mut errors = Vec::new();

    if log.user_id.trim().is_empty() {
        errors.push("User ID is required".to_string());
    }

    if log.duration_minutes == 0 || log.duration_minutes > MAX_ACTIVITY_MINUTES {
        errors.push(format!(
            "Duration must be between 1 and {} minutes",
            MAX_ACTIVITY_MINUTES
        ));
    }

    if let Some(calories) = log.calories_burned {
        if calories > MAX_ACTIVITY_CALORIES {
            errors.push(format!(
                "Calories must be at most {} per activity",
                MAX_ACTIVITY_CALORIES
            ));
        }
    }

    if let Some(weight) = log.weight_kg {
        check_range(&mut errors, "Weight", weight, WEIGHT_RANGE_KG, "kg");
    }

    if log.day_number.is_some() && log.plan_id.is_none() {
        errors.push("A plan day requires a plan".to_string());
    }

    ValidationReport::from_errors(errors)
}
