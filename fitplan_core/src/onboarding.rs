//! Profile onboarding and editing.
//!
//! Intake happens in three steps. Each step is a typed value; a
//! [`ProfileDraft`] collects them and [`ProfileDraft::complete`] merges them
//! into a [`Profile`] once all are present.

use crate::{DietaryPreference, Error, FitnessGoal, HealthCondition, Profile, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonalInfo {
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct HealthInfo {
    pub health_conditions: BTreeSet<HealthCondition>,
    pub dietary_preference: DietaryPreference,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FitnessGoals {
    pub fitness_goal: FitnessGoal,
    pub target_weight_kg: Option<f64>,
}

/// One onboarding or edit step
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ProfileStep {
    Personal(PersonalInfo),
    Health(HealthInfo),
    Goals(FitnessGoals),
}

/// Partially completed intake
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileDraft {
    pub personal: Option<PersonalInfo>,
    pub health: Option<HealthInfo>,
    pub goals: Option<FitnessGoals>,
}

impl ProfileDraft {
    /// Record a step, replacing any earlier answer for the same step
    pub fn apply(&mut self, step: ProfileStep) {
        match step {
            ProfileStep::Personal(info) => self.personal = Some(info),
            ProfileStep::Health(info) => self.health = Some(info),
            ProfileStep::Goals(goals) => self.goals = Some(goals),
        }
    }

    /// Profile fields not yet provided
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.personal.is_none() {
            missing.extend(["age", "height_cm", "weight_kg"]);
        }
        if self.health.is_none() {
            missing.push("health_conditions");
        }
        if self.goals.is_none() {
            missing.push("fitness_goal");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Merge all steps into a profile
    pub fn complete(self, user_id: impl Into<String>) -> Result<Profile> {
        match (self.personal, self.health, self.goals) {
            (Some(personal), Some(health), Some(goals)) => Ok(Profile {
                user_id: user_id.into(),
                age: personal.age,
                height_cm: personal.height_cm,
                weight_kg: personal.weight_kg,
                health_conditions: health.health_conditions,
                dietary_preference: health.dietary_preference,
                fitness_goal: goals.fitness_goal,
                target_weight_kg: goals.target_weight_kg,
            }),
            (personal, health, goals) => Err(Error::IncompleteProfile {
                missing: ProfileDraft {
                    personal,
                    health,
                    goals,
                }
                .missing_fields(),
            }),
        }
    }
}

impl Profile {
    /// Apply an edit step to a completed profile
    pub fn apply(&mut self, step: ProfileStep) {
        match step {
            ProfileStep::Personal(info) => {
                self.age = info.age;
                self.height_cm = info.height_cm;
                self.weight_kg = info.weight_kg;
            }
            ProfileStep::Health(info) => {
                self.health_conditions = info.health_conditions;
                self.dietary_preference = info.dietary_preference;
            }
            ProfileStep::Goals(goals) => {
                self.fitness_goal = goals.fitness_goal;
                self.target_weight_kg = goals.target_weight_kg;
            }
        }
    }

    /// Split the profile back into its three steps
    pub fn steps(&self) -> (PersonalInfo, HealthInfo, FitnessGoals) {
        (
            PersonalInfo {
                age: self.age,
                height_cm: self.height_cm,
                weight_kg: self.weight_kg,
            },
            HealthInfo {
                health_conditions: self.health_conditions.clone(),
                dietary_preference: self.dietary_preference,
            },
            FitnessGoals {
                fitness_goal: self.fitness_goal,
                target_weight_kg: self.target_weight_kg,
            },
        )
    }
}
