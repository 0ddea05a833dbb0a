//! Progress statistics over activity logs.

use crate::{ActivityLog, WorkoutPlan};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Largest gap in calendar days that still continues a streak (one rest day)
pub const MAX_STREAK_GAP_DAYS: i64 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub plan_id: Uuid,
    pub completed_days: usize,
    pub total_days: usize,
    pub percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct ProgressSummary {
    pub total_workouts: usize,
    pub total_minutes: u64,
    pub total_calories: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub plan: Option<PlanProgress>,
    pub weight_change_kg: Option<f64>,
}

/// Summarize a user's activity as of `today`
pub fn summarize(
    logs: &[ActivityLog],
    active_plan: Option<&WorkoutPlan>,
    today: NaiveDate,
) -> ProgressSummary {
    let days: BTreeSet<NaiveDate> = logs.iter().map(|l| l.date.date_naive()).collect();
    let (current_streak, longest_streak) = streaks(&days, today);

    ProgressSummary {
        total_workouts: logs.len(),
        total_minutes: logs.iter().map(|l| u64::from(l.duration_minutes)).sum(),
        total_calories: logs
            .iter()
            .filter_map(|l| l.calories_burned)
            .map(u64::from)
            .sum(),
        current_streak,
        longest_streak,
        plan: active_plan.map(|plan| plan_progress(plan, logs)),
        weight_change_kg: weight_change(logs),
    }
}

/// Current and longest streak over distinct active days
///
/// Consecutive active days separated by at most one rest day extend a
/// streak; the streak length counts active days only. The current streak is
/// zero once more than one rest day has passed since the last activity.
pub fn streaks(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> (u32, u32) {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if (*day - prev).num_days() <= MAX_STREAK_GAP_DAYS => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let current = match previous {
        Some(last) if (today - last).num_days() <= MAX_STREAK_GAP_DAYS => run,
        _ => 0,
    };

    (current, longest)
}

fn plan_progress(plan: &WorkoutPlan, logs: &[ActivityLog]) -> PlanProgress {
    let completed: BTreeSet<u32> = logs
        .iter()
        .filter(|l| l.plan_id == Some(plan.id))
        .filter_map(|l| l.day_number)
        .filter(|day| plan.day(*day).is_some())
        .collect();

    let total_days = plan.daily_workouts.len();
    let percent = if total_days == 0 {
        0.0
    } else {
        (completed.len() as f64 / total_days as f64 * 1000.0).round() / 10.0
    };

    PlanProgress {
        plan_id: plan.id,
        completed_days: completed.len(),
        total_days,
        percent,
    }
}

fn weight_change(logs: &[ActivityLog]) -> Option<f64> {
    let mut weighed: Vec<&ActivityLog> = logs.iter().filter(|l| l.weight_kg.is_some()).collect();
    if weighed.len() < 2 {
        return None;
    }
    weighed.sort_by_key(|l| l.date);

    let first = weighed.first()?.weight_kg?;
    let last = weighed.last()?.weight_kg?;
    Some(((last - first) * 10.0).round() / 10.0)
}
