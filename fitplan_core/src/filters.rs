//! Pure filters over the exercise template table.
//!
//! Every filter is an independent predicate, so filters compose in any order
//! and yield the same set.

use crate::{AgeGroup, Difficulty, ExerciseTemplate, ExerciseType, HealthCondition};
use std::collections::BTreeSet;

/// Keep exercises suitable for the given age bucket
pub fn filter_by_age_group<'a, I>(exercises: I, age_group: AgeGroup) -> Vec<&'a ExerciseTemplate>
where
    I: IntoIterator<Item = &'a ExerciseTemplate>,
{
    exercises
        .into_iter()
        .filter(|e| e.age_groups.contains(&age_group))
        .collect()
}

/// Drop every exercise contraindicated by any of the conditions
///
/// An empty set, or one holding only `none`, leaves the input unchanged.
/// A single matching contraindication excludes the exercise entirely.
pub fn filter_by_conditions<'a, I>(
    exercises: I,
    conditions: &BTreeSet<HealthCondition>,
) -> Vec<&'a ExerciseTemplate>
where
    I: IntoIterator<Item = &'a ExerciseTemplate>,
{
    if conditions.iter().all(|c| *c == HealthCondition::None) {
        return exercises.into_iter().collect();
    }

    exercises
        .into_iter()
        .filter(|e| !e.is_contraindicated_for(conditions))
        .collect()
}

/// Keep exercises at or below `max_difficulty`
pub fn filter_by_difficulty<'a, I>(
    exercises: I,
    max_difficulty: Difficulty,
) -> Vec<&'a ExerciseTemplate>
where
    I: IntoIterator<Item = &'a ExerciseTemplate>,
{
    exercises
        .into_iter()
        .filter(|e| e.difficulty <= max_difficulty)
        .collect()
}

pub fn filter_by_type<'a, I>(exercises: I, exercise_type: ExerciseType) -> Vec<&'a ExerciseTemplate>
where
    I: IntoIterator<Item = &'a ExerciseTemplate>,
{
    exercises
        .into_iter()
        .filter(|e| e.exercise_type == exercise_type)
        .collect()
}
