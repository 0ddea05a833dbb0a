//! Default exercise template table.
//!
//! This module provides the built-in exercises the plan generator draws from.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashSet};

use AgeGroup::{Adult, Senior, Youth};
use HealthCondition::{Arthritis, BackPain, HeartDisease, Hypertension, KneeIssues, Obesity, Pregnancy};

const ALL_AGES: &[AgeGroup] = &[Youth, Adult, Senior];
const YOUTH_ADULT: &[AgeGroup] = &[Youth, Adult];

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: prefer `get_default_catalog()` which returns a cached reference.
/// This function is retained for tests and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

struct Entry {
    id: &'static str,
    name: &'static str,
    muscles: &'static [&'static str],
    difficulty: Difficulty,
    exercise_type: ExerciseType,
    calories_per_minute: f64,
    contraindications: &'static [HealthCondition],
    equipment: &'static [Equipment],
    age_groups: &'static [AgeGroup],
    beginner_mod: Option<&'static str>,
    senior_mod: Option<&'static str>,
}

impl From<&Entry> for ExerciseTemplate {
    fn from(entry: &Entry) -> Self {
        ExerciseTemplate {
            id: entry.id.into(),
            name: entry.name.into(),
            target_muscles: entry.muscles.iter().map(|m| m.to_string()).collect(),
            difficulty: entry.difficulty,
            contraindications: entry.contraindications.to_vec(),
            equipment: entry.equipment.to_vec(),
            calories_per_minute: entry.calories_per_minute,
            exercise_type: entry.exercise_type,
            age_groups: entry.age_groups.to_vec(),
            modifications: Modifications {
                beginner: entry.beginner_mod.map(String::from),
                senior: entry.senior_mod.map(String::from),
            },
        }
    }
}

#[rustfmt::skip]
const ENTRIES: &[Entry] = &[
    // ========================================================================
    // Cardio
    // ========================================================================
    Entry {
        id: "marching_in_place", name: "Marching in Place",
        muscles: &["legs", "core"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 4.0,
        contraindications: &[], equipment: &[Equipment::None], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: Some("Hold the back of a chair for support"),
    },
    Entry {
        id: "brisk_walking", name: "Brisk Walking",
        muscles: &["legs", "glutes"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 4.5,
        contraindications: &[], equipment: &[Equipment::None], age_groups: ALL_AGES,
        beginner_mod: Some("Start at a conversational pace"), senior_mod: None,
    },
    Entry {
        id: "step_touch", name: "Low-Impact Step Touch",
        muscles: &["legs", "shoulders"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 4.0,
        contraindications: &[], equipment: &[Equipment::None], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "jumping_jacks", name: "Jumping Jacks",
        muscles: &["full_body"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 8.0,
        contraindications: &[KneeIssues, Pregnancy, Obesity, HeartDisease],
        equipment: &[Equipment::None], age_groups: YOUTH_ADULT,
        beginner_mod: Some("Step out instead of jumping"), senior_mod: None,
    },
    Entry {
        id: "shadow_boxing", name: "Shadow Boxing",
        muscles: &["shoulders", "arms", "core"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 7.0,
        contraindications: &[HeartDisease], equipment: &[Equipment::None],
        age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: Some("Keep punches slow and controlled"),
    },
    Entry {
        id: "high_knees", name: "High Knees",
        muscles: &["legs", "hip_flexors", "core"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 9.0,
        contraindications: &[KneeIssues, Pregnancy, HeartDisease, Hypertension],
        equipment: &[Equipment::None], age_groups: YOUTH_ADULT,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "jump_rope", name: "Jump Rope",
        muscles: &["calves", "shoulders"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 11.0,
        contraindications: &[KneeIssues, Pregnancy, Obesity, HeartDisease],
        equipment: &[Equipment::JumpRope], age_groups: YOUTH_ADULT,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "mountain_climbers", name: "Mountain Climbers",
        muscles: &["core", "shoulders", "legs"], difficulty: Difficulty::Advanced,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 9.5,
        contraindications: &[BackPain, Pregnancy, Hypertension, HeartDisease],
        equipment: &[Equipment::Mat], age_groups: YOUTH_ADULT,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "burpees", name: "Burpees",
        muscles: &["full_body"], difficulty: Difficulty::Advanced,
        exercise_type: ExerciseType::Cardio, calories_per_minute: 10.0,
        contraindications: &[KneeIssues, BackPain, Pregnancy, HeartDisease, Hypertension, Obesity],
        equipment: &[Equipment::None], age_groups: &[Adult],
        beginner_mod: None, senior_mod: None,
    },
    // ========================================================================
    // Strength
    // ========================================================================
    Entry {
        id: "wall_push_ups", name: "Wall Push-ups",
        muscles: &["chest", "triceps", "shoulders"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Strength, calories_per_minute: 3.5,
        contraindications: &[], equipment: &[Equipment::None], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "chair_squats", name: "Chair Squats",
        muscles: &["quadriceps", "glutes"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Strength, calories_per_minute: 4.0,
        contraindications: &[], equipment: &[Equipment::Chair], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: Some("Use armrests to assist standing"),
    },
    Entry {
        id: "glute_bridges", name: "Glute Bridges",
        muscles: &["glutes", "hamstrings", "core"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Strength, calories_per_minute: 3.5,
        contraindications: &[Pregnancy], equipment: &[Equipment::Mat], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "bicep_curls", name: "Dumbbell Bicep Curls",
        muscles: &["biceps", "forearms"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Strength, calories_per_minute: 3.0,
        contraindications: &[], equipment: &[Equipment::Dumbbells], age_groups: ALL_AGES,
        beginner_mod: Some("Use water bottles if you have no dumbbells"), senior_mod: None,
    },
    Entry {
        id: "band_rows", name: "Resistance Band Rows",
        muscles: &["back", "biceps"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Strength, calories_per_minute: 3.5,
        contraindications: &[], equipment: &[Equipment::ResistanceBand], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: Some("Perform seated"),
    },
    Entry {
        id: "bodyweight_squats", name: "Bodyweight Squats",
        muscles: &["quadriceps", "glutes", "hamstrings"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Strength, calories_per_minute: 5.0,
        contraindications: &[KneeIssues], equipment: &[Equipment::None], age_groups: ALL_AGES,
        beginner_mod: Some("Squat to a chair"), senior_mod: Some("Keep depth shallow"),
    },
    Entry {
        id: "push_ups", name: "Push-ups",
        muscles: &["chest", "triceps", "core"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Strength, calories_per_minute: 5.5,
        contraindications: &[Arthritis], equipment: &[Equipment::None], age_groups: YOUTH_ADULT,
        beginner_mod: Some("Drop to your knees"), senior_mod: None,
    },
    Entry {
        id: "lunges", name: "Alternating Lunges",
        muscles: &["quadriceps", "glutes"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Strength, calories_per_minute: 5.0,
        contraindications: &[KneeIssues], equipment: &[Equipment::None], age_groups: YOUTH_ADULT,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "plank", name: "Plank",
        muscles: &["core", "shoulders"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Strength, calories_per_minute: 4.0,
        contraindications: &[BackPain, Pregnancy, Hypertension],
        equipment: &[Equipment::Mat], age_groups: YOUTH_ADULT,
        beginner_mod: Some("Hold from your knees"), senior_mod: None,
    },
    Entry {
        id: "dumbbell_deadlift", name: "Dumbbell Romanian Deadlift",
        muscles: &["hamstrings", "glutes", "lower_back"], difficulty: Difficulty::Advanced,
        exercise_type: ExerciseType::Strength, calories_per_minute: 6.0,
        contraindications: &[BackPain, Pregnancy, Hypertension],
        equipment: &[Equipment::Dumbbells], age_groups: &[Adult],
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "jump_squats", name: "Jump Squats",
        muscles: &["quadriceps", "glutes", "calves"], difficulty: Difficulty::Advanced,
        exercise_type: ExerciseType::Strength, calories_per_minute: 8.5,
        contraindications: &[KneeIssues, Pregnancy, Obesity, Arthritis],
        equipment: &[Equipment::None], age_groups: YOUTH_ADULT,
        beginner_mod: None, senior_mod: None,
    },
    // ========================================================================
    // Flexibility
    // ========================================================================
    Entry {
        id: "hamstring_stretch", name: "Seated Hamstring Stretch",
        muscles: &["hamstrings", "lower_back"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Flexibility, calories_per_minute: 2.0,
        contraindications: &[], equipment: &[Equipment::Mat], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: Some("Sit on a chair and extend one leg"),
    },
    Entry {
        id: "cat_cow", name: "Cat-Cow Stretch",
        muscles: &["spine", "core"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Flexibility, calories_per_minute: 2.5,
        contraindications: &[], equipment: &[Equipment::Mat], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "shoulder_rolls", name: "Shoulder Rolls",
        muscles: &["shoulders", "upper_back"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Flexibility, calories_per_minute: 2.0,
        contraindications: &[], equipment: &[Equipment::None], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: None,
    },
    Entry {
        id: "yoga_flow", name: "Sun Salutation Flow",
        muscles: &["full_body"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Flexibility, calories_per_minute: 3.5,
        contraindications: &[Hypertension, Pregnancy],
        equipment: &[Equipment::Mat], age_groups: YOUTH_ADULT,
        beginner_mod: Some("Skip the chaturanga"), senior_mod: None,
    },
    // ========================================================================
    // Balance
    // ========================================================================
    Entry {
        id: "single_leg_stand", name: "Single-Leg Stand",
        muscles: &["ankles", "core"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Balance, calories_per_minute: 2.0,
        contraindications: &[], equipment: &[Equipment::Chair], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: Some("Keep one hand on a chair"),
    },
    Entry {
        id: "heel_to_toe_walk", name: "Heel-to-Toe Walk",
        muscles: &["legs", "core"], difficulty: Difficulty::Beginner,
        exercise_type: ExerciseType::Balance, calories_per_minute: 2.5,
        contraindications: &[], equipment: &[Equipment::None], age_groups: ALL_AGES,
        beginner_mod: None, senior_mod: Some("Walk beside a wall"),
    },
    Entry {
        id: "bird_dog", name: "Bird Dog",
        muscles: &["core", "glutes", "lower_back"], difficulty: Difficulty::Intermediate,
        exercise_type: ExerciseType::Balance, calories_per_minute: 3.0,
        contraindications: &[], equipment: &[Equipment::Mat], age_groups: ALL_AGES,
        beginner_mod: Some("Lift only the arms first"), senior_mod: None,
    },
    Entry {
        id: "stability_ball_pass", name: "Stability Ball Pass",
        muscles: &["core", "hip_flexors"], difficulty: Difficulty::Advanced,
        exercise_type: ExerciseType::Balance, calories_per_minute: 4.0,
        contraindications: &[BackPain, Pregnancy],
        equipment: &[Equipment::StabilityBall], age_groups: YOUTH_ADULT,
        beginner_mod: None, senior_mod: None,
    },
];

fn build_default_catalog_internal() -> Catalog {
    Catalog::from_templates(ENTRIES.iter().map(ExerciseTemplate::from))
}

impl Catalog {
    /// Build a catalog from templates; later duplicates replace earlier ones
    pub fn from_templates(templates: impl IntoIterator<Item = ExerciseTemplate>) -> Self {
        let exercises: BTreeMap<_, _> = templates
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        Catalog { exercises }
    }

    pub fn get(&self, id: &str) -> Option<&ExerciseTemplate> {
        self.exercises.get(id)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for (id, exercise) in &self.exercises {
            if id.is_empty() || exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &exercise.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, exercise.id
                ));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            } else if !names.insert(exercise.name.as_str()) {
                errors.push(format!("Exercise name '{}' is duplicated", exercise.name));
            }
            if exercise.age_groups.is_empty() {
                errors.push(format!("Exercise '{}' has no age groups", id));
            }
            if exercise.target_muscles.is_empty() {
                errors.push(format!("Exercise '{}' has no target muscles", id));
            }
            if exercise.calories_per_minute.is_nan() || exercise.calories_per_minute <= 0.0 {
                errors.push(format!(
                    "Exercise '{}': calories per minute must be positive",
                    id
                ));
            }
            if exercise.contraindications.contains(&HealthCondition::None) {
                errors.push(format!(
                    "Exercise '{}' lists 'none' as a contraindication",
                    id
                ));
            }
        }

        // Every type must be reachable at beginner level for every age group
        for group in ALL_AGES {
            for ty in [
                ExerciseType::Cardio,
                ExerciseType::Strength,
                ExerciseType::Flexibility,
                ExerciseType::Balance,
            ] {
                let available = self.exercises.values().any(|e| {
                    e.exercise_type == ty
                        && e.difficulty == Difficulty::Beginner
                        && e.contraindications.is_empty()
                        && e.age_groups.contains(group)
                });
                if !available {
                    errors.push(format!(
                        "Catalog has no unrestricted beginner {} exercise for {} users",
                        ty, group
                    ));
                }
            }
        }

        errors
    }
}
