//! Per-user application session.
//!
//! A [`Session`] binds one user to a [`DocumentStore`], an exercise catalog
//! and plan options. It is built once at the composition root and passed to
//! whatever needs it; nothing here is global.
//!
//! Storage layout:
//! - `profiles/<user_id>` and `drafts/<user_id>`
//! - `plans/<uuid>` and `activities/<uuid>`, both carrying `user_id`

use crate::onboarding::{ProfileDraft, ProfileStep};
use crate::planner::{PlanGenerator, PlanOptions};
use crate::progress::{summarize, ProgressSummary};
use crate::store::{Collection, DocumentStore, Filter};
use crate::validation::{validate_activity, validate_plan, validate_profile};
use crate::{
    catalog::get_default_catalog, ActivityLog, ActivityType, Catalog, Error, PlanStatus, Profile,
    Result, WorkoutPlan,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// An activity to record
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityEntry {
    pub activity_type: ActivityType,
    pub duration_minutes: u32,
    pub calories_burned: Option<u32>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
}

impl ActivityEntry {
    pub fn new(activity_type: ActivityType, duration_minutes: u32) -> Self {
        Self {
            activity_type,
            duration_minutes,
            calories_burned: None,
            weight_kg: None,
            notes: None,
            date: None,
        }
    }
}

/// A completed plan day to record
#[derive(Clone, Debug, PartialEq, Default)]
pub struct WorkoutEntry {
    pub day_number: u32,
    /// Defaults to the day's estimated duration
    pub duration_minutes: Option<u32>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}

pub struct Session<S: DocumentStore> {
    user_id: String,
    store: S,
    catalog: Catalog,
    options: PlanOptions,
}

impl<S: DocumentStore> Session<S> {
    /// Session with the built-in catalog and default plan options
    pub fn new(user_id: impl Into<String>, store: S) -> Self {
        Self {
            user_id: user_id.into(),
            store,
            catalog: get_default_catalog().clone(),
            options: PlanOptions::default(),
        }
    }

    /// Replace the built-in catalog; the catalog must pass `Catalog::validate`
    pub fn with_catalog(mut self, catalog: Catalog) -> Result<Self> {
        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(Error::CatalogValidation(errors.join("; ")));
        }
        self.catalog = catalog;
        Ok(self)
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn load<T: DeserializeOwned>(&self, collection: Collection, id: &str) -> Result<Option<T>> {
        self.store
            .get(collection, id)?
            .map(|doc| doc.decode())
            .transpose()
    }

    fn save<T: Serialize>(&mut self, collection: Collection, id: &str, value: &T) -> Result<()> {
        self.store
            .put(collection, id, serde_json::to_value(value)?)?;
        Ok(())
    }

    fn owned<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let filter = Filter::new().field_eq("user_id", self.user_id.as_str());
        self.store
            .query(collection, &filter)?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    /// Onboarding answers recorded so far
    pub fn draft(&self) -> Result<ProfileDraft> {
        Ok(self
            .load(Collection::Drafts, &self.user_id)?
            .unwrap_or_default())
    }

    /// Record one onboarding step
    pub fn apply_profile_step(&mut self, step: ProfileStep) -> Result<ProfileDraft> {
        let mut draft = self.draft()?;
        draft.apply(step);
        let user_id = self.user_id.clone();
        self.save(Collection::Drafts, &user_id, &draft)?;
        tracing::debug!(
            "Draft for {} missing {:?}",
            self.user_id,
            draft.missing_fields()
        );
        Ok(draft)
    }

    /// Turn the draft into a stored profile and discard the draft
    pub fn complete_onboarding(&mut self) -> Result<Profile> {
        let profile = self.draft()?.complete(self.user_id.clone())?;
        validate_profile(&profile).into_result()?;

        let user_id = self.user_id.clone();
        self.save(Collection::Profiles, &user_id, &profile)?;
        self.store.delete(Collection::Drafts, &user_id)?;
        tracing::info!("Completed onboarding for user {}", self.user_id);
        Ok(profile)
    }

    pub fn profile(&self) -> Result<Option<Profile>> {
        self.load(Collection::Profiles, &self.user_id)
    }

    /// The stored profile, or the onboarding fields still missing
    pub fn require_profile(&self) -> Result<Profile> {
        if let Some(profile) = self.profile()? {
            return Ok(profile);
        }
        let mut missing = self.draft()?.missing_fields();
        if missing.is_empty() {
            missing.push("onboarding");
        }
        Err(Error::IncompleteProfile { missing })
    }

    /// Edit one step of a completed profile
    pub fn update_profile(&mut self, step: ProfileStep) -> Result<Profile> {
        self.update_profile_steps([step])
    }

    /// Edit several steps of a completed profile at once
    ///
    /// The steps are applied to a copy and validated together; nothing is
    /// stored unless the combined result is valid.
    pub fn update_profile_steps<I>(&mut self, steps: I) -> Result<Profile>
    where
        I: IntoIterator<Item = ProfileStep>,
    {
        let mut profile = self.require_profile()?;
        for step in steps {
            profile.apply(step);
        }
        validate_profile(&profile).into_result()?;

        let user_id = self.user_id.clone();
        self.save(Collection::Profiles, &user_id, &profile)?;
        tracing::info!("Updated profile for user {}", self.user_id);
        Ok(profile)
    }

    // ------------------------------------------------------------------
    // Plans
    // ------------------------------------------------------------------

    fn generator(&self) -> PlanGenerator<'_> {
        PlanGenerator::new(&self.catalog).with_options(self.options.clone())
    }

    /// Build a plan without storing it
    pub fn preview_plan(&self) -> Result<WorkoutPlan> {
        let profile = self.require_profile()?;
        let plan = self.generator().generate(&profile, Utc::now())?;
        validate_plan(&plan).into_result()?;
        Ok(plan)
    }

    /// Generate and store a plan; earlier active plans are cancelled
    pub fn generate_plan(&mut self) -> Result<WorkoutPlan> {
        let plan = self.preview_plan()?;
        self.activate(&plan)?;
        tracing::info!("Stored plan {} ({}) for {}", plan.id, plan.name, self.user_id);
        Ok(plan)
    }

    fn activate(&mut self, plan: &WorkoutPlan) -> Result<()> {
        for previous in self.owned::<WorkoutPlan>(Collection::Plans)? {
            if previous.status == PlanStatus::Active && previous.id != plan.id {
                tracing::info!("Cancelling superseded plan {}", previous.id);
                self.set_plan_status(previous.id, PlanStatus::Cancelled)?;
            }
        }
        self.save(Collection::Plans, &plan.id.to_string(), plan)
    }

    /// All of the user's plans, oldest first
    pub fn plans(&self) -> Result<Vec<WorkoutPlan>> {
        let mut plans: Vec<WorkoutPlan> = self.owned(Collection::Plans)?;
        plans.sort_by_key(|p| p.generated_at);
        Ok(plans)
    }

    pub fn active_plan(&self) -> Result<Option<WorkoutPlan>> {
        Ok(self
            .plans()?
            .into_iter()
            .rev()
            .find(|p| p.status == PlanStatus::Active))
    }

    pub fn plan(&self, id: Uuid) -> Result<WorkoutPlan> {
        self.load::<WorkoutPlan>(Collection::Plans, &id.to_string())?
            .filter(|p| p.user_id == self.user_id)
            .ok_or_else(|| Error::NotFound {
                collection: Collection::Plans.name(),
                id: id.to_string(),
            })
    }

    pub fn set_plan_status(&mut self, id: Uuid, status: PlanStatus) -> Result<WorkoutPlan> {
        // ownership check
        self.plan(id)?;
        let doc = self.store.update(
            Collection::Plans,
            &id.to_string(),
            serde_json::json!({ "status": status }),
        )?;
        doc.decode()
    }

    /// Store an edited copy of a plan as the new active plan
    ///
    /// The copy gets a fresh id, `is_custom` and a `derived_from` link to
    /// the original, and must pass plan validation before it is stored.
    pub fn customize_plan<F>(&mut self, id: Uuid, edit: F) -> Result<WorkoutPlan>
    where
        F: FnOnce(&mut WorkoutPlan),
    {
        let original = self.plan(id)?;
        let mut custom = original.clone();
        edit(&mut custom);

        custom.id = Uuid::new_v4();
        custom.user_id = self.user_id.clone();
        custom.status = PlanStatus::Active;
        custom.is_custom = true;
        custom.derived_from = Some(original.id);
        custom.generated_at = Utc::now();

        validate_plan(&custom).into_result()?;
        self.activate(&custom)?;
        tracing::info!("Stored custom plan {} derived from {}", custom.id, original.id);
        Ok(custom)
    }

    // ------------------------------------------------------------------
    // Activity
    // ------------------------------------------------------------------

    fn record(&mut self, log: ActivityLog) -> Result<ActivityLog> {
        validate_activity(&log).into_result()?;
        self.save(Collection::Activities, &log.id.to_string(), &log)?;
        tracing::info!(
            "Logged {} minutes of {} for {}",
            log.duration_minutes,
            log.activity_type,
            self.user_id
        );
        Ok(log)
    }

    pub fn log_activity(&mut self, entry: ActivityEntry) -> Result<ActivityLog> {
        let log = ActivityLog {
            id: Uuid::new_v4(),
            user_id: self.user_id.clone(),
            date: entry.date.unwrap_or_else(Utc::now),
            activity_type: entry.activity_type,
            duration_minutes: entry.duration_minutes,
            calories_burned: entry.calories_burned,
            plan_id: None,
            day_number: None,
            completed_exercises: Vec::new(),
            weight_kg: entry.weight_kg,
            notes: entry.notes,
        };
        self.record(log)
    }

    /// Record a completed day of the active plan
    ///
    /// Calories scale the day's target by the actual duration.
    pub fn log_workout(&mut self, entry: WorkoutEntry) -> Result<ActivityLog> {
        let plan = self.active_plan()?.ok_or_else(|| Error::NotFound {
            collection: Collection::Plans.name(),
            id: "active".to_string(),
        })?;
        let day = plan.day(entry.day_number).ok_or_else(|| {
            Error::Validation(vec![format!(
                "Plan has no day {} (days 1-{})",
                entry.day_number,
                plan.daily_workouts.len()
            )])
        })?;

        let duration = entry
            .duration_minutes
            .unwrap_or(day.estimated_duration_minutes);
        let calories = day.target_calories.map(|target| {
            let scale = f64::from(duration) / f64::from(day.estimated_duration_minutes.max(1));
            (f64::from(target) * scale).round() as u32
        });

        let log = ActivityLog {
            id: Uuid::new_v4(),
            user_id: self.user_id.clone(),
            date: Utc::now(),
            activity_type: ActivityType::Workout,
            duration_minutes: duration,
            calories_burned: calories,
            plan_id: Some(plan.id),
            day_number: Some(day.day_number),
            completed_exercises: day.exercises.iter().map(|s| s.exercise_id.clone()).collect(),
            weight_kg: entry.weight_kg,
            notes: entry.notes,
        };
        self.record(log)
    }

    /// All of the user's activity, oldest first
    pub fn activities(&self) -> Result<Vec<ActivityLog>> {
        let mut logs: Vec<ActivityLog> = self.owned(Collection::Activities)?;
        logs.sort_by_key(|l| l.date);
        Ok(logs)
    }

    pub fn progress(&self, today: NaiveDate) -> Result<ProgressSummary> {
        let logs = self.activities()?;
        let plan = self.active_plan()?;
        Ok(summarize(&logs, plan.as_ref(), today))
    }

    // ------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------

    /// Remove every document belonging to the user, returning the count
    pub fn delete_account(&mut self) -> Result<usize> {
        let user_id = self.user_id.clone();
        let mut removed = 0;

        for collection in [Collection::Profiles, Collection::Drafts] {
            if self.store.delete(collection, &user_id)? {
                removed += 1;
            }
        }

        let filter = Filter::new().field_eq("user_id", user_id.as_str());
        for collection in [Collection::Plans, Collection::Activities] {
            for doc in self.store.query(collection, &filter)? {
                if self.store.delete(collection, &doc.id)? {
                    removed += 1;
                }
            }
        }

        tracing::info!("Deleted {} documents for user {}", removed, user_id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::{FitnessGoals, HealthInfo, PersonalInfo};
    use crate::store::MemoryStore;
    use crate::{FitnessGoal, HealthCondition};

    fn onboarded(user: &str) -> Session<MemoryStore> {
        let mut session = Session::new(user, MemoryStore::new());
        session
            .apply_profile_step(ProfileStep::Personal(PersonalInfo {
                age: 30,
                height_cm: 175.0,
                weight_kg: 70.0,
            }))
            .unwrap();
        session
            .apply_profile_step(ProfileStep::Health(HealthInfo::default()))
            .unwrap();
        session
            .apply_profile_step(ProfileStep::Goals(FitnessGoals {
                fitness_goal: FitnessGoal::WeightLoss,
                target_weight_kg: Some(65.0),
            }))
            .unwrap();
        session.complete_onboarding().unwrap();
        session
    }

    #[test]
    fn test_onboarding_flow() {
        let session = onboarded("alice");
        let profile = session.profile().unwrap().unwrap();
        assert_eq!(profile.user_id, "alice");
        assert_eq!(session.draft().unwrap(), ProfileDraft::default());
    }

    #[test]
    fn test_generate_requires_profile() {
        let mut session = Session::new("bob", MemoryStore::new());
        session
            .apply_profile_step(ProfileStep::Goals(FitnessGoals {
                fitness_goal: FitnessGoal::Endurance,
                target_weight_kg: None,
            }))
            .unwrap();

        match session.generate_plan() {
            Err(Error::IncompleteProfile { missing }) => {
                assert!(missing.contains(&"age"));
                assert!(missing.contains(&"health_conditions"));
                assert!(!missing.contains(&"fitness_goal"));
            }
            other => panic!("expected IncompleteProfile, got {:?}", other),
        }
    }

    #[test]
    fn test_onboarding_rejects_out_of_range_profile() {
        let mut session = Session::new("carol", MemoryStore::new());
        session
            .apply_profile_step(ProfileStep::Personal(PersonalInfo {
                age: 30,
                height_cm: 20.0,
                weight_kg: 70.0,
            }))
            .unwrap();
        session
            .apply_profile_step(ProfileStep::Health(HealthInfo::default()))
            .unwrap();
        session
            .apply_profile_step(ProfileStep::Goals(FitnessGoals {
                fitness_goal: FitnessGoal::GeneralFitness,
                target_weight_kg: None,
            }))
            .unwrap();

        assert!(matches!(
            session.complete_onboarding(),
            Err(Error::Validation(_))
        ));
        assert!(session.profile().unwrap().is_none());
    }

    #[test]
    fn test_new_plan_cancels_previous() {
        let mut session = onboarded("alice");
        let first = session.generate_plan().unwrap();
        let second = session.generate_plan().unwrap();

        assert_eq!(session.plan(first.id).unwrap().status, PlanStatus::Cancelled);
        assert_eq!(session.active_plan().unwrap().unwrap().id, second.id);
        assert_eq!(session.plans().unwrap().len(), 2);
    }

    #[test]
    fn test_preview_does_not_store() {
        let session = onboarded("alice");
        session.preview_plan().unwrap();
        assert!(session.plans().unwrap().is_empty());
    }

    #[test]
    fn test_plans_are_private_to_user() {
        let mut alice = onboarded("alice");
        let plan = alice.generate_plan().unwrap();

        let bob = Session::new("bob", alice.into_store());
        assert!(bob.plans().unwrap().is_empty());
        assert!(matches!(bob.plan(plan.id), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_update_profile_keeps_safety() {
        let mut session = onboarded("alice");
        let profile = session
            .update_profile(ProfileStep::Health(HealthInfo {
                health_conditions: [HealthCondition::KneeIssues].into_iter().collect(),
                dietary_preference: Default::default(),
            }))
            .unwrap();
        assert!(profile.has_health_conditions());

        let plan = session.generate_plan().unwrap();
        for set in plan.all_sets() {
            let template = session.catalog.get(&set.exercise_id).unwrap();
            assert!(!template.contraindications.contains(&HealthCondition::KneeIssues));
        }
    }

    #[test]
    fn test_failed_multi_step_edit_stores_nothing() {
        let mut session = onboarded("alice");
        let before = session.profile().unwrap().unwrap();

        let result = session.update_profile_steps(vec![
            ProfileStep::Personal(PersonalInfo {
                age: 45,
                height_cm: 175.0,
                weight_kg: 70.0,
            }),
            ProfileStep::Health(HealthInfo {
                health_conditions: [HealthCondition::None, HealthCondition::Asthma]
                    .into_iter()
                    .collect(),
                dietary_preference: Default::default(),
            }),
        ]);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(session.profile().unwrap().unwrap(), before);
    }

    #[test]
    fn test_multi_step_edit() {
        let mut session = onboarded("alice");
        let profile = session
            .update_profile_steps(vec![
                ProfileStep::Personal(PersonalInfo {
                    age: 45,
                    height_cm: 175.0,
                    weight_kg: 72.0,
                }),
                ProfileStep::Goals(FitnessGoals {
                    fitness_goal: FitnessGoal::Endurance,
                    target_weight_kg: None,
                }),
            ])
            .unwrap();

        assert_eq!(profile.age, 45);
        assert_eq!(profile.fitness_goal, FitnessGoal::Endurance);
        assert_eq!(session.profile().unwrap().unwrap(), profile);
    }

    #[test]
    fn test_invalid_catalog_is_refused() {
        let result = Session::new("alice", MemoryStore::new()).with_catalog(Catalog::default());
        match result {
            Err(Error::CatalogValidation(message)) => assert!(!message.is_empty()),
            Err(other) => panic!("expected CatalogValidation, got {:?}", other),
            Ok(_) => panic!("empty catalog was accepted"),
        }
    }

    #[test]
    fn test_valid_catalog_is_accepted() {
        let session = Session::new("alice", MemoryStore::new())
            .with_catalog(crate::build_default_catalog())
            .unwrap();
        assert_eq!(session.catalog.exercises.len(), get_default_catalog().exercises.len());
    }

    #[test]
    fn test_customize_plan() {
        let mut session = onboarded("alice");
        let original = session.generate_plan().unwrap();

        let custom = session
            .customize_plan(original.id, |plan| {
                plan.name = "My Plan".into();
                plan.daily_workouts[0].exercises.truncate(1);
            })
            .unwrap();

        assert!(custom.is_custom);
        assert_eq!(custom.derived_from, Some(original.id));
        assert_eq!(session.active_plan().unwrap().unwrap().id, custom.id);
        assert_eq!(
            session.plan(original.id).unwrap().status,
            PlanStatus::Cancelled
        );
    }

    #[test]
    fn test_invalid_customization_is_refused() {
        let mut session = onboarded("alice");
        let original = session.generate_plan().unwrap();

        let result = session.customize_plan(original.id, |plan| {
            plan.daily_workouts[0].exercises.clear();
        });
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(session.plans().unwrap().len(), 1);
        assert_eq!(session.active_plan().unwrap().unwrap().id, original.id);
    }

    #[test]
    fn test_log_workout_and_progress() {
        let mut session = onboarded("alice");
        let plan = session.generate_plan().unwrap();
        let day = plan.day(1).unwrap().clone();

        let log = session
            .log_workout(WorkoutEntry {
                day_number: 1,
                weight_kg: Some(69.5),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(log.duration_minutes, day.estimated_duration_minutes);
        assert_eq!(log.calories_burned, day.target_calories);
        assert_eq!(log.completed_exercises.len(), day.exercises.len());

        let mut walk = ActivityEntry::new(ActivityType::Walking, 40);
        walk.weight_kg = Some(69.0);
        session.log_activity(walk).unwrap();

        let summary = session.progress(Utc::now().date_naive()).unwrap();
        assert_eq!(summary.total_workouts, 2);
        assert_eq!(summary.current_streak, 1);
        assert_eq!(summary.weight_change_kg, Some(-0.5));
        assert_eq!(summary.plan.unwrap().completed_days, 1);
    }

    #[test]
    fn test_log_workout_errors() {
        let mut session = onboarded("alice");
        let entry = WorkoutEntry {
            day_number: 1,
            ..Default::default()
        };
        assert!(matches!(
            session.log_workout(entry),
            Err(Error::NotFound { .. })
        ));

        session.generate_plan().unwrap();
        let entry = WorkoutEntry {
            day_number: 500,
            ..Default::default()
        };
        assert!(matches!(
            session.log_workout(entry),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut session = onboarded("alice");
        let result = session.log_activity(ActivityEntry::new(ActivityType::Yoga, 0));
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(session.activities().unwrap().is_empty());
    }

    #[test]
    fn test_delete_account() {
        let mut alice = onboarded("alice");
        alice.generate_plan().unwrap();
        alice
            .log_activity(ActivityEntry::new(ActivityType::Running, 20))
            .unwrap();

        let mut bob = Session::new("bob", alice.into_store());
        bob.log_activity(ActivityEntry::new(ActivityType::Cycling, 15))
            .unwrap();

        let mut alice = Session::new("alice", bob.into_store());
        assert_eq!(alice.delete_account().unwrap(), 3);
        assert!(alice.profile().unwrap().is_none());
        assert!(alice.activities().unwrap().is_empty());

        let bob = Session::new("bob", alice.into_store());
        assert_eq!(bob.activities().unwrap().len(), 1);
    }
}
