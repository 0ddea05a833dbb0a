use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use fitplan_core::onboarding::{FitnessGoals, HealthInfo, PersonalInfo};
use fitplan_core::session::{ActivityEntry, WorkoutEntry};
use fitplan_core::*;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fitplan")]
#[command(about = "Personalized workout plan generator and tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    user: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create your profile
    Onboard {
        #[command(flatten)]
        personal: PersonalArgs,

        #[command(flatten)]
        health: HealthArgs,

        #[command(flatten)]
        goals: GoalArgs,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Compute BMI and healthy weight range
    Bmi {
        /// Weight in kg (defaults to profile)
        #[arg(long)]
        weight: Option<f64>,

        /// Height in cm (defaults to profile)
        #[arg(long)]
        height: Option<f64>,
    },

    /// Generate and inspect workout plans
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },

    /// Log a plan workout or another activity
    Log {
        /// Day of the active plan that was completed
        #[arg(long, conflicts_with = "activity", required_unless_present = "activity")]
        day: Option<u32>,

        /// Activity type (walking, running, cycling, swimming, yoga, other)
        #[arg(long)]
        activity: Option<ActivityType>,

        /// Duration in minutes (required with --activity; plan days default to their estimate)
        #[arg(long)]
        duration: Option<u32>,

        /// Calories burned
        #[arg(long, conflicts_with = "day")]
        calories: Option<u32>,

        /// Body weight in kg
        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show progress statistics
    Progress {
        #[arg(long)]
        json: bool,
    },

    /// Export activity logs to CSV
    Export {
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Delete your profile, plans and activity logs
    DeleteAccount {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show the stored profile
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Change profile fields
    Edit {
        #[arg(long)]
        age: Option<u32>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Comma-separated health conditions (use "none" to clear)
        #[arg(long, value_delimiter = ',')]
        conditions: Option<Vec<HealthCondition>>,

        #[arg(long)]
        diet: Option<DietaryPreference>,

        #[arg(long)]
        goal: Option<FitnessGoal>,

        /// Target weight in kg
        #[arg(long)]
        target_weight: Option<f64>,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Generate a new active plan
    Generate {
        /// Show the plan without storing it
        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show the active plan
    Show {
        /// Only show this day
        #[arg(long)]
        day: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// List all plans
    List,

    /// Validate the active plan
    Validate,

    /// Cancel the active plan
    Cancel,

    /// Mark the active plan completed
    Complete,
}

#[derive(Args)]
struct PersonalArgs {
    #[arg(long)]
    age: u32,

    /// Height in cm
    #[arg(long)]
    height: f64,

    /// Weight in kg
    #[arg(long)]
    weight: f64,
}

#[derive(Args)]
struct HealthArgs {
    /// Comma-separated health conditions
    #[arg(long, value_delimiter = ',')]
    conditions: Vec<HealthCondition>,

    #[arg(long, default_value = "no_preference")]
    diet: DietaryPreference,
}

#[derive(Args)]
struct GoalArgs {
    #[arg(long)]
    goal: FitnessGoal,

    /// Target weight in kg
    #[arg(long)]
    target_weight: Option<f64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    fitplan_core::logging::init_with_level(logging::level_for_verbosity(cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let user_id = cli.user.unwrap_or_else(|| config.user.id.clone());

    tracing::debug!("Using data dir {:?} as user {}", data_dir, user_id);
    let store = JsonFileStore::open(&data_dir)?;
    let mut session = Session::new(user_id, store).with_options(config.plan.clone());

    match cli.command {
        Commands::Onboard {
            personal,
            health,
            goals,
        } => cmd_onboard(&mut session, personal, health, goals),
        Commands::Profile { command } => match command {
            ProfileCommand::Show { json } => cmd_profile_show(&session, json),
            ProfileCommand::Edit {
                age,
                height,
                weight,
                conditions,
                diet,
                goal,
                target_weight,
            } => cmd_profile_edit(
                &mut session,
                ProfileEdit {
                    age,
                    height,
                    weight,
                    conditions,
                    diet,
                    goal,
                    target_weight,
                },
            ),
        },
        Commands::Bmi { weight, height } => cmd_bmi(&session, weight, height),
        Commands::Plan { command } => match command {
            PlanCommand::Generate { dry_run, json } => cmd_plan_generate(&mut session, dry_run, json),
            PlanCommand::Show { day, json } => cmd_plan_show(&session, day, json),
            PlanCommand::List => cmd_plan_list(&session),
            PlanCommand::Validate => cmd_plan_validate(&session),
            PlanCommand::Cancel => cmd_plan_status(&mut session, PlanStatus::Cancelled),
            PlanCommand::Complete => cmd_plan_status(&mut session, PlanStatus::Completed),
        },
        Commands::Log {
            day,
            activity,
            duration,
            calories,
            weight,
            notes,
        } => match (day, activity) {
            (Some(day_number), _) => {
                let entry = WorkoutEntry {
                    day_number,
                    duration_minutes: duration,
                    weight_kg: weight,
                    notes,
                };
                let log = session.log_workout(entry)?;
                print_logged(&log);
                Ok(())
            }
            (None, Some(activity_type)) => {
                let entry = ActivityEntry {
                    calories_burned: calories,
                    weight_kg: weight,
                    notes,
                    ..ActivityEntry::new(activity_type, duration.unwrap_or(0))
                };
                let log = session.log_activity(entry)?;
                print_logged(&log);
                Ok(())
            }
            (None, None) => Err(Error::Other("either --day or --activity is required".into())),
        },
        Commands::Progress { json } => cmd_progress(&session, json),
        Commands::Export { output } => {
            let logs = session.activities()?;
            let count = export_activities_csv(&logs, &output)?;
            println!("✓ Exported {} activities to {}", count, output.display());
            Ok(())
        }
        Commands::DeleteAccount { yes } => {
            if !yes {
                return Err(Error::Other(
                    "refusing to delete without --yes".into(),
                ));
            }
            let removed = session.delete_account()?;
            println!("✓ Deleted {} records for {}", removed, session.user_id());
            Ok(())
        }
    }
}

fn conditions_set(conditions: Vec<HealthCondition>) -> BTreeSet<HealthCondition> {
    conditions.into_iter().collect()
}

fn cmd_onboard<S: DocumentStore>(
    session: &mut Session<S>,
    personal: PersonalArgs,
    health: HealthArgs,
    goals: GoalArgs,
) -> Result<()> {
    if session.profile()?.is_some() {
        return Err(Error::Other(format!(
            "user {} already has a profile; use `fitplan profile edit`",
            session.user_id()
        )));
    }

    session.apply_profile_step(ProfileStep::Personal(PersonalInfo {
        age: personal.age,
        height_cm: personal.height,
        weight_kg: personal.weight,
    }))?;
    session.apply_profile_step(ProfileStep::Health(HealthInfo {
        health_conditions: conditions_set(health.conditions),
        dietary_preference: health.diet,
    }))?;
    session.apply_profile_step(ProfileStep::Goals(FitnessGoals {
        fitness_goal: goals.goal,
        target_weight_kg: goals.target_weight,
    }))?;

    let profile = session.complete_onboarding()?;
    println!("✓ Profile created for {}", profile.user_id);
    print_profile(&profile);
    println!();
    println!("Next: fitplan plan generate");
    Ok(())
}

fn cmd_profile_show<S: DocumentStore>(session: &Session<S>, json: bool) -> Result<()> {
    let profile = session.require_profile()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

struct ProfileEdit {
    age: Option<u32>,
    height: Option<f64>,
    weight: Option<f64>,
    conditions: Option<Vec<HealthCondition>>,
    diet: Option<DietaryPreference>,
    goal: Option<FitnessGoal>,
    target_weight: Option<f64>,
}

fn cmd_profile_edit<S: DocumentStore>(session: &mut Session<S>, edit: ProfileEdit) -> Result<()> {
    let (mut personal, mut health, mut goals) = session.require_profile()?.steps();
    let mut steps = Vec::new();

    if edit.age.is_some() || edit.height.is_some() || edit.weight.is_some() {
        personal.age = edit.age.unwrap_or(personal.age);
        personal.height_cm = edit.height.unwrap_or(personal.height_cm);
        personal.weight_kg = edit.weight.unwrap_or(personal.weight_kg);
        steps.push(ProfileStep::Personal(personal));
    }
    if edit.conditions.is_some() || edit.diet.is_some() {
        if let Some(conditions) = edit.conditions {
            health.health_conditions = conditions_set(conditions);
        }
        health.dietary_preference = edit.diet.unwrap_or(health.dietary_preference);
        steps.push(ProfileStep::Health(health));
    }
    if edit.goal.is_some() || edit.target_weight.is_some() {
        goals.fitness_goal = edit.goal.unwrap_or(goals.fitness_goal);
        goals.target_weight_kg = edit.target_weight.or(goals.target_weight_kg);
        steps.push(ProfileStep::Goals(goals));
    }

    if steps.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }

    let profile = session.update_profile_steps(steps)?;
    println!("✓ Profile updated");
    print_profile(&profile);
    if session.active_plan()?.is_some() {
        println!();
        println!("Your active plan was built from the old profile.");
        println!("Run `fitplan plan generate` to rebuild it.");
    }
    Ok(())
}

fn cmd_bmi<S: DocumentStore>(
    session: &Session<S>,
    weight: Option<f64>,
    height: Option<f64>,
) -> Result<()> {
    let (weight, height) = match (weight, height) {
        (Some(w), Some(h)) => (w, h),
        (w, h) => {
            let profile = session.require_profile()?;
            (w.unwrap_or(profile.weight_kg), h.unwrap_or(profile.height_cm))
        }
    };

    let bmi = calculate_bmi(weight, height)?;
    let range = healthy_weight_range(height)?;
    println!("BMI: {:.1} ({})", bmi, bmi_category(bmi).description());
    println!(
        "Healthy weight for {:.0} cm: {:.1}-{:.1} kg",
        height, range.min, range.max
    );
    Ok(())
}

fn cmd_plan_generate<S: DocumentStore>(
    session: &mut Session<S>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let plan = if dry_run {
        session.preview_plan()?
    } else {
        session.generate_plan()?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    display_plan(&plan, None);
    if dry_run {
        println!("\n[Dry run - plan not saved]");
    } else {
        println!("\n✓ Plan saved ({})", plan.id);
    }
    Ok(())
}

fn require_active<S: DocumentStore>(session: &Session<S>) -> Result<WorkoutPlan> {
    session.active_plan()?.ok_or_else(|| {
        Error::Other("no active plan; run `fitplan plan generate` first".into())
    })
}

fn cmd_plan_show<S: DocumentStore>(session: &Session<S>, day: Option<u32>, json: bool) -> Result<()> {
    let plan = require_active(session)?;

    if let Some(n) = day {
        if plan.day(n).is_none() {
            return Err(Error::Other(format!(
                "plan has no day {} (days 1-{})",
                n,
                plan.daily_workouts.len()
            )));
        }
    }

    if json {
        match day.and_then(|n| plan.day(n)) {
            Some(d) => println!("{}", serde_json::to_string_pretty(d)?),
            None => println!("{}", serde_json::to_string_pretty(&plan)?),
        }
    } else {
        display_plan(&plan, day);
    }
    Ok(())
}

fn cmd_plan_list<S: DocumentStore>(session: &Session<S>) -> Result<()> {
    let plans = session.plans()?;
    if plans.is_empty() {
        println!("No plans yet.");
        return Ok(());
    }
    for plan in plans {
        println!(
            "{}  {:<10} {}  {}{}",
            plan.id,
            plan.status.to_string(),
            plan.generated_at.format("%Y-%m-%d"),
            plan.name,
            if plan.is_custom { " (custom)" } else { "" }
        );
    }
    Ok(())
}

fn cmd_plan_validate<S: DocumentStore>(session: &Session<S>) -> Result<()> {
    let plan = require_active(session)?;
    let report = validate_plan(&plan);
    if report.valid {
        println!("✓ Plan {} is valid", plan.id);
        return Ok(());
    }

    println!("Plan {} has {} problem(s):", plan.id, report.errors.len());
    for error in &report.errors {
        println!("  - {}", error);
    }
    report.into_result()
}

fn cmd_plan_status<S: DocumentStore>(session: &mut Session<S>, status: PlanStatus) -> Result<()> {
    let plan = require_active(session)?;
    let plan = session.set_plan_status(plan.id, status)?;
    println!("✓ Plan {} is now {}", plan.name, plan.status);
    Ok(())
}

fn cmd_progress<S: DocumentStore>(session: &Session<S>, json: bool) -> Result<()> {
    let summary = session.progress(Utc::now().date_naive())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Activities:     {}", summary.total_workouts);
    println!("Minutes:        {}", summary.total_minutes);
    println!("Calories:       {}", summary.total_calories);
    println!("Current streak: {} day(s)", summary.current_streak);
    println!("Longest streak: {} day(s)", summary.longest_streak);
    if let Some(plan) = &summary.plan {
        println!(
            "Plan progress:  {}/{} days ({:.1}%)",
            plan.completed_days, plan.total_days, plan.percent
        );
    }
    if let Some(change) = summary.weight_change_kg {
        println!("Weight change:  {:+.1} kg", change);
    }
    Ok(())
}

fn print_profile(profile: &Profile) {
    let conditions: Vec<&str> = profile.active_conditions().map(|c| c.label()).collect();
    println!("  User:       {}", profile.user_id);
    println!("  Age:        {}", profile.age);
    println!("  Height:     {:.1} cm", profile.height_cm);
    println!("  Weight:     {:.1} kg", profile.weight_kg);
    if let Ok(bmi) = calculate_bmi(profile.weight_kg, profile.height_cm) {
        println!("  BMI:        {:.1} ({})", bmi, bmi_category(bmi).description());
    }
    println!(
        "  Conditions: {}",
        if conditions.is_empty() {
            "none".to_string()
        } else {
            conditions.join(", ")
        }
    );
    println!("  Diet:       {}", profile.dietary_preference);
    println!("  Goal:       {}", profile.fitness_goal.label());
    if let Some(target) = profile.target_weight_kg {
        println!("  Target:     {:.1} kg", target);
    }
    println!("  Level:      {}", derive_fitness_level(profile).label());
}

fn display_plan(plan: &WorkoutPlan, only_day: Option<u32>) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", plan.name);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", plan.description);
    println!(
        "  {} to {}",
        plan.start_date.format("%Y-%m-%d"),
        plan.end_date.format("%Y-%m-%d")
    );
    if let Some(notes) = &plan.notes {
        println!("  {}", notes);
    }

    for day in plan
        .daily_workouts
        .iter()
        .filter(|d| only_day.map_or(true, |n| d.day_number == n))
    {
        println!();
        println!("  Day {} ({:?}) - {}", day.day_number, day.day_of_week, day.title);
        print!("  ~{} min", day.estimated_duration_minutes);
        if let Some(calories) = day.target_calories {
            print!(", ~{} kcal", calories);
        }
        println!();

        for set in &day.exercises {
            let work = match (set.reps, set.duration_minutes) {
                (Some(reps), _) => format!("{} x {} reps", set.sets, reps),
                (None, Some(minutes)) => format!("{} x {} min", set.sets, minutes),
                (None, None) => format!("{} set(s)", set.sets),
            };
            println!("    → {:<28} {}, rest {}s", set.exercise_name, work, set.rest_seconds);
            if let Some(notes) = &set.notes {
                println!("      ℹ {}", notes);
            }
        }
    }
}

fn print_logged(log: &ActivityLog) {
    print!(
        "✓ Logged {} minutes of {}",
        log.duration_minutes, log.activity_type
    );
    if let Some(day) = log.day_number {
        print!(" (plan day {})", day);
    }
    if let Some(calories) = log.calories_burned {
        print!(", ~{} kcal", calories);
    }
    println!();
}
