//! Workout plan assembly.
//!
//! Builds a multi-week schedule from the exercise table:
//! - Derive the fitness level and filter the eligible pool
//! - Relax the difficulty cap (never contraindications) when the pool is thin
//! - Fill each day from a goal-specific slot pattern of exercise types
//! - Attach goal- and level-appropriate sets, reps and durations

use crate::catalog::get_default_catalog;
use crate::filters::{filter_by_age_group, filter_by_conditions, filter_by_difficulty};
use crate::level::{derive_fitness_level, LevelPolicy};
use crate::{
    AgeGroup, Catalog, DailyWorkout, DietaryPreference, Difficulty, Error, ExerciseTemplate,
    ExerciseType, FitnessGoal, FitnessLevel, HealthCondition, PlanStatus, Profile, Result,
    WorkoutPlan, WorkoutSet,
};
use chrono::{DateTime, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

const WARM_UP_MINUTES: u32 = 5;
const SECONDS_PER_REP: u32 = 4;

// ============================================================================
// Options
// ============================================================================

/// Exercises per day for each fitness level
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExercisesPerDay {
    #[serde(default = "default_beginner_count")]
    pub beginner: usize,
    #[serde(default = "default_intermediate_count")]
    pub intermediate: usize,
    #[serde(default = "default_advanced_count")]
    pub advanced: usize,
}

impl Default for ExercisesPerDay {
    fn default() -> Self {
        Self {
            beginner: default_beginner_count(),
            intermediate: default_intermediate_count(),
            advanced: default_advanced_count(),
        }
    }
}

impl ExercisesPerDay {
    pub fn for_level(&self, level: FitnessLevel) -> usize {
        match level {
            Difficulty::Beginner => self.beginner,
            Difficulty::Intermediate => self.intermediate,
            Difficulty::Advanced => self.advanced,
        }
    }
}

/// Plan generation policy
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanOptions {
    #[serde(default = "default_total_weeks")]
    pub total_weeks: u32,

    #[serde(default = "default_days_per_week")]
    pub days_per_week: u32,

    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,

    #[serde(default)]
    pub exercises_per_day: ExercisesPerDay,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            total_weeks: default_total_weeks(),
            days_per_week: default_days_per_week(),
            rest_seconds: default_rest_seconds(),
            exercises_per_day: ExercisesPerDay::default(),
        }
    }
}

fn default_total_weeks() -> u32 {
    4
}

fn default_days_per_week() -> u32 {
    3
}

fn default_rest_seconds() -> u32 {
    60
}

fn default_beginner_count() -> usize {
    4
}

fn default_intermediate_count() -> usize {
    6
}

fn default_advanced_count() -> usize {
    8
}

/// Allowed range for any level's exercises per day
pub const EXERCISES_PER_DAY_RANGE: (usize, usize) = (4, 8);

impl PlanOptions {
    /// Reject option values that cannot produce a valid plan
    pub fn validate(&self) -> Result<()> {
        if !(1..=52).contains(&self.total_weeks) {
            return Err(Error::Config(format!(
                "plan.total_weeks must be between 1 and 52, got {}",
                self.total_weeks
            )));
        }
        if !(1..=7).contains(&self.days_per_week) {
            return Err(Error::Config(format!(
                "plan.days_per_week must be between 1 and 7, got {}",
                self.days_per_week
            )));
        }
        let counts = &self.exercises_per_day;
        let (min, max) = EXERCISES_PER_DAY_RANGE;
        for (level, count) in [
            ("beginner", counts.beginner),
            ("intermediate", counts.intermediate),
            ("advanced", counts.advanced),
        ] {
            if !(min..=max).contains(&count) {
                return Err(Error::Config(format!(
                    "plan.exercises_per_day.{} must be between {} and {}, got {}",
                    level, min, max, count
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Generate a plan with the default catalog, options and level policy
pub fn generate_plan(profile: &Profile) -> Result<WorkoutPlan> {
    PlanGenerator::default().generate(profile, Utc::now())
}

/// Configurable plan generator
#[derive(Clone, Debug)]
pub struct PlanGenerator<'a> {
    catalog: &'a Catalog,
    options: PlanOptions,
    level_policy: LevelPolicy,
}

impl Default for PlanGenerator<'static> {
    fn default() -> Self {
        PlanGenerator::new(get_default_catalog())
    }
}

/// The eligible exercise pool and the difficulty cap that produced it
struct Pool<'a> {
    exercises: Vec<&'a ExerciseTemplate>,
    cap: Difficulty,
}

impl<'a> PlanGenerator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            options: PlanOptions::default(),
            level_policy: derive_fitness_level,
        }
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_level_policy(mut self, policy: LevelPolicy) -> Self {
        self.level_policy = policy;
        self
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// Assemble a plan starting at `now`
    pub fn generate(&self, profile: &Profile, now: DateTime<Utc>) -> Result<WorkoutPlan> {
        self.options.validate()?;

        let level = (self.level_policy)(profile);
        let per_day = self.options.exercises_per_day.for_level(level);
        let pool = self.eligible_pool(profile, level, per_day)?;

        tracing::info!(
            "Generating {:?} plan for user {} at {:?} level from {} eligible exercises",
            profile.fitness_goal,
            profile.user_id,
            level,
            pool.exercises.len()
        );

        let mut by_type: BTreeMap<ExerciseType, Vec<&ExerciseTemplate>> = BTreeMap::new();
        for exercise in &pool.exercises {
            by_type.entry(exercise.exercise_type).or_default().push(exercise);
        }

        let slots: Vec<ExerciseType> = slot_pattern(profile.fitness_goal)
            .iter()
            .copied()
            .cycle()
            .take(per_day.min(pool.exercises.len()))
            .collect();

        let weekdays = training_days(self.options.days_per_week);
        let mut daily_workouts = Vec::new();
        for week in 1..=self.options.total_weeks {
            for (slot_in_week, weekday) in weekdays.iter().enumerate() {
                let day_index = daily_workouts.len();
                let picks = pick_day(&by_type, &pool.exercises, &slots, day_index);
                daily_workouts.push(self.build_day(
                    profile,
                    level,
                    &picks,
                    day_index as u32 + 1,
                    week,
                    slot_in_week + 1,
                    *weekday,
                ));
            }
        }

        let start_date = now;
        let end_date = start_date + Duration::weeks(i64::from(self.options.total_weeks));

        Ok(WorkoutPlan {
            id: Uuid::new_v4(),
            user_id: profile.user_id.clone(),
            name: plan_name(profile.fitness_goal, level),
            description: self.describe(profile, level, pool.cap),
            start_date,
            end_date,
            status: PlanStatus::Active,
            daily_workouts,
            total_weeks: self.options.total_weeks,
            fitness_level: level,
            goal: profile.fitness_goal,
            generated_at: now,
            notes: Some(plan_notes(profile)),
            is_custom: false,
            derived_from: None,
        })
    }

    /// Filter the catalog for this profile, relaxing only the difficulty cap
    fn eligible_pool(
        &self,
        profile: &Profile,
        level: FitnessLevel,
        per_day: usize,
    ) -> Result<Pool<'a>> {
        let catalog: &'a Catalog = self.catalog;
        let safe = filter_by_conditions(
            filter_by_age_group(catalog.exercises.values(), profile.age_group()),
            &profile.health_conditions,
        );

        let mut cap = level;
        loop {
            let exercises = filter_by_difficulty(safe.iter().copied(), cap);
            if exercises.len() >= per_day {
                return Ok(Pool { exercises, cap });
            }

            match cap.next() {
                Some(next) => {
                    tracing::warn!(
                        "Only {} exercises at {:?} for user {}, relaxing difficulty to {:?}",
                        exercises.len(),
                        cap,
                        profile.user_id,
                        next
                    );
                    cap = next;
                }
                None if exercises.is_empty() => {
                    return Err(Error::InsufficientExercises(format!(
                        "no exercise is safe for user {} ({:?}, conditions {:?})",
                        profile.user_id,
                        profile.age_group(),
                        profile.health_conditions
                    )));
                }
                None => {
                    tracing::warn!(
                        "Only {} safe exercises for user {}, building shorter days",
                        exercises.len(),
                        profile.user_id
                    );
                    return Ok(Pool { exercises, cap });
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_day(
        &self,
        profile: &Profile,
        level: FitnessLevel,
        picks: &[&ExerciseTemplate],
        day_number: u32,
        week_number: u32,
        day_in_week: usize,
        day_of_week: Weekday,
    ) -> DailyWorkout {
        let mut work_seconds = 0;
        let mut rest_seconds = 0;
        let mut calories = 0.0;

        let exercises: Vec<WorkoutSet> = picks
            .iter()
            .map(|exercise| {
                let set = prescribe(exercise, profile, level, self.options.rest_seconds);
                let work = set_work_seconds(&set);
                work_seconds += work;
                rest_seconds += set.sets * set.rest_seconds;
                calories += exercise.calories_per_minute * f64::from(work) / 60.0;
                set
            })
            .collect();

        let total_seconds = work_seconds + rest_seconds;
        DailyWorkout {
            day_number,
            week_number,
            day_of_week,
            title: format!(
                "Week {} Day {}: {}",
                week_number,
                day_in_week,
                day_focus(picks)
            ),
            exercises,
            estimated_duration_minutes: WARM_UP_MINUTES + total_seconds.div_ceil(60),
            target_calories: Some(calories.round() as u32),
        }
    }

    fn describe(&self, profile: &Profile, level: FitnessLevel, cap: Difficulty) -> String {
        let mut description = format!(
            "A {}-week {} plan focused on {}, with {} workouts per week.",
            self.options.total_weeks,
            level.label().to_lowercase(),
            goal_focus(profile.fitness_goal),
            self.options.days_per_week
        );

        for condition in profile.active_conditions() {
            description.push(' ');
            description.push_str(accommodation(condition));
        }

        if profile.age_group() == AgeGroup::Senior {
            description.push_str(" Senior-friendly modifications are included where available.");
        }

        if cap > level {
            description.push_str(
                " Some exercises are above your current level; follow the noted modifications.",
            );
        }

        description
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Type order for filling a day; cycled when a day needs more slots
fn slot_pattern(goal: FitnessGoal) -> &'static [ExerciseType] {
    use ExerciseType::{Balance as B, Cardio as C, Flexibility as F, Strength as S};
    match goal {
        FitnessGoal::WeightLoss => &[C, S, C, F, C, S, C, B],
        FitnessGoal::MuscleGain => &[S, S, C, S, F, S, S, B],
        FitnessGoal::Endurance => &[C, C, S, F, C, B, C, S],
        FitnessGoal::Flexibility => &[F, F, B, C, F, S, F, B],
        FitnessGoal::GeneralFitness => &[C, S, F, B, C, S, F, S],
    }
}

fn training_days(days_per_week: u32) -> Vec<Weekday> {
    use Weekday::*;
    match days_per_week {
        1 => vec![Wed],
        2 => vec![Mon, Thu],
        3 => vec![Mon, Wed, Fri],
        4 => vec![Mon, Tue, Thu, Fri],
        5 => vec![Mon, Tue, Wed, Thu, Fri],
        6 => vec![Mon, Tue, Wed, Thu, Fri, Sat],
        _ => vec![Mon, Tue, Wed, Thu, Fri, Sat, Sun],
    }
}

/// Fill one day's slots, rotating through candidates so days vary
///
/// A slot whose type has no unused candidate is filled from the whole pool.
/// `slots.len()` never exceeds the pool size, so every slot is filled.
fn pick_day<'a>(
    by_type: &BTreeMap<ExerciseType, Vec<&'a ExerciseTemplate>>,
    pool: &[&'a ExerciseTemplate],
    slots: &[ExerciseType],
    day_index: usize,
) -> Vec<&'a ExerciseTemplate> {
    let mut chosen: Vec<&'a ExerciseTemplate> = Vec::with_capacity(slots.len());
    let mut seen_of_type: HashMap<ExerciseType, usize> = HashMap::new();

    for slot in slots {
        let occurrence = seen_of_type.entry(*slot).or_insert(0);
        let typed = by_type.get(slot).map(Vec::as_slice).unwrap_or(&[]);

        let pick = rotate_pick(typed, day_index + *occurrence, &chosen)
            .or_else(|| rotate_pick(pool, day_index + chosen.len(), &chosen));
        *occurrence += 1;

        if let Some(exercise) = pick {
            chosen.push(exercise);
        }
    }

    chosen
}

fn rotate_pick<'a>(
    candidates: &[&'a ExerciseTemplate],
    offset: usize,
    taken: &[&ExerciseTemplate],
) -> Option<&'a ExerciseTemplate> {
    let len = candidates.len();
    (0..len)
        .map(|i| candidates[(offset + i) % len])
        .find(|c| !taken.iter().any(|t| t.id == c.id))
}

// ============================================================================
// Prescription
// ============================================================================

fn prescribe(
    exercise: &ExerciseTemplate,
    profile: &Profile,
    level: FitnessLevel,
    rest_seconds: u32,
) -> WorkoutSet {
    let goal = profile.fitness_goal;
    let level_sets = match level {
        Difficulty::Beginner => 2,
        Difficulty::Intermediate => 3,
        Difficulty::Advanced => 4,
    };

    let (sets, reps, duration_minutes) = match exercise.exercise_type {
        ExerciseType::Cardio => {
            let base = match level {
                Difficulty::Beginner => 5,
                Difficulty::Intermediate => 8,
                Difficulty::Advanced => 10,
            };
            let bonus = match goal {
                FitnessGoal::WeightLoss | FitnessGoal::Endurance => 5,
                _ => 0,
            };
            (1, None, Some(base + bonus))
        }
        ExerciseType::Strength => {
            let (sets, reps) = match goal {
                FitnessGoal::MuscleGain => (level_sets + 1, 10),
                FitnessGoal::WeightLoss | FitnessGoal::Endurance => (level_sets, 15),
                _ => (level_sets, 12),
            };
            (sets, Some(reps), None)
        }
        ExerciseType::Flexibility => match goal {
            FitnessGoal::Flexibility => (2, None, Some(5)),
            _ => (1, None, Some(3)),
        },
        ExerciseType::Balance => (2, None, Some(2)),
    };

    WorkoutSet {
        exercise_id: exercise.id.clone(),
        exercise_name: exercise.name.clone(),
        sets,
        reps,
        duration_minutes,
        rest_seconds,
        notes: set_notes(exercise, profile, level),
    }
}

fn set_notes(exercise: &ExerciseTemplate, profile: &Profile, level: FitnessLevel) -> Option<String> {
    let mods = &exercise.modifications;
    let modification = if profile.age_group() == AgeGroup::Senior && mods.senior.is_some() {
        mods.senior.clone()
    } else if level == Difficulty::Beginner || exercise.difficulty > level {
        mods.beginner.clone()
    } else {
        None
    };

    if exercise.difficulty > level {
        let caution = "Above your current level: reduce range of motion or pace";
        return Some(match modification {
            Some(m) => format!("{}. {}", caution, m),
            None => caution.to_string(),
        });
    }

    modification
}

fn set_work_seconds(set: &WorkoutSet) -> u32 {
    match (set.duration_minutes, set.reps) {
        (Some(minutes), _) => minutes * 60 * set.sets,
        (None, Some(reps)) => reps * SECONDS_PER_REP * set.sets,
        (None, None) => 30 * set.sets,
    }
}

// ============================================================================
// Text
// ============================================================================

fn day_focus(picks: &[&ExerciseTemplate]) -> &'static str {
    let mut counts: Vec<(ExerciseType, usize)> = Vec::new();
    for pick in picks {
        match counts.iter_mut().find(|(ty, _)| *ty == pick.exercise_type) {
            Some((_, n)) => *n += 1,
            None => counts.push((pick.exercise_type, 1)),
        }
    }

    // First-seen type wins ties
    let top = counts
        .iter()
        .fold(None::<(ExerciseType, usize)>, |best, &(ty, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((ty, n)),
        });

    match top.map(|(ty, _)| ty) {
        Some(ExerciseType::Cardio) => "Cardio Focus",
        Some(ExerciseType::Strength) => "Strength Focus",
        Some(ExerciseType::Flexibility) => "Flexibility Focus",
        Some(ExerciseType::Balance) => "Balance Focus",
        None => "Rest",
    }
}

fn plan_name(goal: FitnessGoal, level: FitnessLevel) -> String {
    let program = match goal {
        FitnessGoal::WeightLoss => "Fat Burn Program",
        FitnessGoal::MuscleGain => "Strength Builder Program",
        FitnessGoal::Endurance => "Endurance Builder Program",
        FitnessGoal::Flexibility => "Mobility & Flexibility Program",
        FitnessGoal::GeneralFitness => "Total Fitness Program",
    };
    format!("{} {}", level.label(), program)
}

fn goal_focus(goal: FitnessGoal) -> &'static str {
    match goal {
        FitnessGoal::WeightLoss => "burning calories with cardio-led sessions",
        FitnessGoal::MuscleGain => "building muscle with progressive strength work",
        FitnessGoal::Endurance => "building stamina with sustained cardio",
        FitnessGoal::Flexibility => "improving mobility and range of motion",
        FitnessGoal::GeneralFitness => "balanced cardio, strength, flexibility and balance",
    }
}

fn accommodation(condition: HealthCondition) -> &'static str {
    match condition {
        HealthCondition::None => "",
        HealthCondition::Diabetes => {
            "Sessions keep a steady, moderate intensity to help manage blood sugar."
        }
        HealthCondition::Hypertension => {
            "Inverted and breath-holding positions are excluded to protect blood pressure."
        }
        HealthCondition::HeartDisease => {
            "High-intensity intervals are excluded to limit strain on the heart."
        }
        HealthCondition::Asthma => {
            "Cardio is paced to keep breathing comfortable; keep your inhaler nearby for asthma."
        }
        HealthCondition::Arthritis => {
            "Joint-friendly movements are chosen to ease arthritis symptoms."
        }
        HealthCondition::BackPain => {
            "Exercises that load the lower back are excluded to protect your back."
        }
        HealthCondition::KneeIssues => {
            "Low-impact choices replace jumping and lunging to protect your knees."
        }
        HealthCondition::Obesity => {
            "Low-impact options reduce stress on your joints."
        }
        HealthCondition::Pregnancy => {
            "Exercises unsuitable during pregnancy, including lying on your back, are excluded."
        }
    }
}

fn plan_notes(profile: &Profile) -> String {
    let tip = match profile.dietary_preference {
        DietaryPreference::NoPreference => {
            "Pair training with balanced meals rich in lean protein and vegetables."
        }
        DietaryPreference::Vegetarian => "Combine legumes, dairy and eggs to meet protein needs.",
        DietaryPreference::Vegan => {
            "Combine legumes, tofu and whole grains for complete plant protein."
        }
        DietaryPreference::Pescatarian => {
            "Fish twice a week supports recovery with protein and omega-3s."
        }
        DietaryPreference::Keto => {
            "Keep electrolytes up; low-carb eating can blunt high-intensity efforts."
        }
        DietaryPreference::Paleo => "Add starchy vegetables on training days to fuel workouts.",
        DietaryPreference::GlutenFree => {
            "Rice, quinoa and potatoes fuel workouts without gluten."
        }
    };

    match profile.target_weight_kg {
        Some(target) => format!("{} Target weight: {:.1} kg.", tip, target),
        None => tip.to_string(),
    }
}
