//! Fitness level derivation.
//!
//! The level bounds the difficulty of exercises the planner may pick. The
//! thresholds are business policy; the planner takes any [`LevelPolicy`].

use crate::bmi::{bmi_category, calculate_bmi, BmiCategory};
use crate::{FitnessGoal, FitnessLevel, Profile};

/// A swappable `(Profile) -> FitnessLevel` rule set
pub type LevelPolicy = fn(&Profile) -> FitnessLevel;

/// Default level policy
///
/// 1. Any reported health condition, age 65+ or under 16 → beginner
/// 2. Obese BMI → beginner
/// 3. Flexibility goal → beginner
/// 4. Muscle gain / endurance, age 18-35, normal BMI → advanced
/// 5. Anyone else under 50 → intermediate
/// 6. Otherwise beginner
pub fn derive_fitness_level(profile: &Profile) -> FitnessLevel {
    if profile.has_health_conditions() || profile.age >= 65 || profile.age < 16 {
        return FitnessLevel::Beginner;
    }

    // Unmeasurable BMI falls through as if normal; profile validation
    // rejects such values before they get here.
    let category = calculate_bmi(profile.weight_kg, profile.height_cm)
        .map(bmi_category)
        .unwrap_or(BmiCategory::Normal);

    if category == BmiCategory::Obese {
        return FitnessLevel::Beginner;
    }

    match profile.fitness_goal {
        FitnessGoal::Flexibility => FitnessLevel::Beginner,
        FitnessGoal::MuscleGain | FitnessGoal::Endurance
            if (18..=35).contains(&profile.age) && category == BmiCategory::Normal =>
        {
            FitnessLevel::Advanced
        }
        _ if profile.age < 50 => FitnessLevel::Intermediate,
        _ => FitnessLevel::Beginner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DietaryPreference, HealthCondition};

    fn profile(age: u32, goal: FitnessGoal) -> Profile {
        Profile {
            user_id: "u1".into(),
            age,
            height_cm: 175.0,
            weight_kg: 70.0,
            health_conditions: Default::default(),
            dietary_preference: DietaryPreference::NoPreference,
            fitness_goal: goal,
            target_weight_kg: None,
        }
    }

    #[test]
    fn test_conditions_force_beginner() {
        let mut p = profile(25, FitnessGoal::MuscleGain);
        p.health_conditions.insert(HealthCondition::Asthma);
        assert_eq!(derive_fitness_level(&p), FitnessLevel::Beginner);
    }

    #[test]
    fn test_none_condition_is_ignored() {
        let mut p = profile(25, FitnessGoal::MuscleGain);
        p.health_conditions.insert(HealthCondition::None);
        assert_eq!(derive_fitness_level(&p), FitnessLevel::Advanced);
    }

    #[test]
    fn test_seniors_are_beginners() {
        assert_eq!(
            derive_fitness_level(&profile(70, FitnessGoal::Endurance)),
            FitnessLevel::Beginner
        );
    }

    #[test]
    fn test_obese_bmi_is_beginner() {
        let mut p = profile(30, FitnessGoal::WeightLoss);
        p.weight_kg = 110.0;
        assert_eq!(derive_fitness_level(&p), FitnessLevel::Beginner);
    }

    #[test]
    fn test_goal_based_levels() {
        assert_eq!(
            derive_fitness_level(&profile(30, FitnessGoal::WeightLoss)),
            FitnessLevel::Intermediate
        );
        assert_eq!(
            derive_fitness_level(&profile(30, FitnessGoal::Flexibility)),
            FitnessLevel::Beginner
        );
        assert_eq!(
            derive_fitness_level(&profile(40, FitnessGoal::MuscleGain)),
            FitnessLevel::Intermediate
        );
        assert_eq!(
            derive_fitness_level(&profile(55, FitnessGoal::GeneralFitness)),
            FitnessLevel::Beginner
        );
    }
}
