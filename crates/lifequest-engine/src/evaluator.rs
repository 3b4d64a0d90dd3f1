//! Condition evaluation
//!
//! Computes the progress value of one achievement for one user from live
//! activity data. Every kind is a read-only query; nothing here writes.

use crate::EngineError;
use chrono::{DateTime, Utc};
use lifequest_domain::traits::AchievementStore;
use lifequest_domain::{longest_streak, AchievementDefinition, Condition, DurationUnit, UserId};
use std::fmt::Display;

/// Inputs shared by every evaluation in one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationContext {
    /// Reference time for running sobriety streaks
    pub now: DateTime<Utc>,
}

impl EvaluationContext {
    /// Context evaluated at the current time
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }

    /// Context evaluated at a fixed time
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::now()
    }
}

/// Compute the progress of `achievement` for `user`
///
/// Missing parameters, manual achievements and unknown kinds yield 0. A
/// habit or streak owned by someone else counts as absent. Only `level_reached`
/// and `xp_reached` need the user row; a missing user is `NotFound` there.
pub fn evaluate_condition<S: AchievementStore>(
    store: &S,
    ctx: &EvaluationContext,
    user: UserId,
    achievement: &AchievementDefinition,
) -> Result<u64, EngineError>
where
    S::Error: Display,
{
    let value = match &achievement.condition {
        Condition::HabitDays { habit_id: Some(habit) } => store
            .count_completed_habit_days(user, Some(*habit))
            .map_err(EngineError::store)?,
        Condition::AnyHabitDays => store
            .count_completed_habit_days(user, None)
            .map_err(EngineError::store)?,
        Condition::HabitStreak { habit_id: Some(habit) } => {
            let days = store.habit_days(user, *habit).map_err(EngineError::store)?;
            longest_streak(&days)
        }
        Condition::AnyHabitStreak => {
            let habits = store.active_habits(user).map_err(EngineError::store)?;
            let mut best = 0;
            for habit in habits {
                let days = store.habit_days(user, habit.id).map_err(EngineError::store)?;
                best = best.max(longest_streak(&days));
            }
            best
        }
        Condition::GoalCompleted => store
            .count_completed_goals(user, None)
            .map_err(EngineError::store)?,
        Condition::GoalCompletedByPeriod { period: Some(period) } => store
            .count_completed_goals(user, Some(*period))
            .map_err(EngineError::store)?,
        Condition::TodoCompleted { category_id } => store
            .count_completed_todos(user, *category_id)
            .map_err(EngineError::store)?,
        Condition::NotesCount => store.count_notes(user).map_err(EngineError::store)?,
        Condition::MoodLoggedDays => store
            .count_mood_entries(user, None)
            .map_err(EngineError::store)?,
        Condition::SpecificMoodCount { mood: Some(mood) } => store
            .count_mood_entries(user, Some(*mood))
            .map_err(EngineError::store)?,
        Condition::SobrietyDuration {
            sobriety_id: Some(id),
            unit: Some(unit),
        } => store
            .get_sobriety(user, *id)
            .map_err(EngineError::store)?
            .map_or(0, |s| s.duration_in(*unit, ctx.now)),
        Condition::AnySobrietyDuration { unit: Some(unit) } => {
            longest_sobriety(store, ctx, user, *unit)?
        }
        Condition::LevelReached => u64::from(require_user(store, user)?.current_level),
        Condition::XpReached => u64::try_from(require_user(store, user)?.total_xp).unwrap_or(0),
        Condition::ChallengeCompleted { period } => store
            .count_completed_challenges(user, *period)
            .map_err(EngineError::store)?,
        Condition::Manual => 0,
        Condition::Unknown { condition_type } => {
            tracing::warn!(
                achievement = %achievement.id,
                condition_type = %condition_type,
                "unknown condition type, progress is 0"
            );
            0
        }
        // A required parameter is missing or unreadable
        Condition::HabitDays { habit_id: None }
        | Condition::HabitStreak { habit_id: None }
        | Condition::GoalCompletedByPeriod { period: None }
        | Condition::SpecificMoodCount { mood: None }
        | Condition::SobrietyDuration { .. }
        | Condition::AnySobrietyDuration { unit: None } => {
            tracing::debug!(achievement = %achievement.id, "condition parameter missing, progress is 0");
            0
        }
    };

    Ok(value)
}

fn longest_sobriety<S: AchievementStore>(
    store: &S,
    ctx: &EvaluationContext,
    user: UserId,
    unit: DurationUnit,
) -> Result<u64, EngineError>
where
    S::Error: Display,
{
    let streaks = store.sobrieties(user).map_err(EngineError::store)?;
    Ok(streaks
        .iter()
        .map(|s| s.duration_in(unit, ctx.now))
        .max()
        .unwrap_or(0))
}

fn require_user<S: AchievementStore>(
    store: &S,
    user: UserId,
) -> Result<lifequest_domain::User, EngineError>
where
    S::Error: Display,
{
    store
        .get_user(user)
        .map_err(EngineError::store)?
        .ok_or_else(|| EngineError::NotFound(format!("user {}", user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStore;
    use chrono::Duration;
    use lifequest_domain::{CategoryId, HabitDayStatus, HabitId, Mood, Period, SobrietyId};

    fn eval(store: &MockStore, condition: Condition) -> u64 {
        let mut scratch = MockStore::new();
        let def = scratch.define("sample", condition, 1);
        evaluate_condition(store, &EvaluationContext::now(), MockStore::USER, &def).unwrap()
    }

    #[test]
    fn test_streak_stops_at_skip() {
        let mut store = MockStore::new();
        let habit = HabitId(3);
        let d = MockStore::day(10);
        store.add_day(habit, d, HabitDayStatus::Completed);
        store.add_day(habit, d + Duration::days(1), HabitDayStatus::Completed);
        store.add_day(habit, d + Duration::days(2), HabitDayStatus::Completed);
        store.add_day(habit, d + Duration::days(3), HabitDayStatus::Skipped);
        store.add_day(habit, d + Duration::days(4), HabitDayStatus::Completed);

        assert_eq!(eval(&store, Condition::HabitStreak { habit_id: Some(habit) }), 3);
        assert_eq!(eval(&store, Condition::HabitDays { habit_id: Some(habit) }), 4);
        assert_eq!(eval(&store, Condition::AnyHabitDays), 4);
    }

    #[test]
    fn test_any_streak_ignores_inactive_habits() {
        let mut store = MockStore::new();
        for i in 0..6 {
            store.add_day(HabitId(1), MockStore::day(1) + Duration::days(i), HabitDayStatus::Completed);
        }
        for i in 0..2 {
            store.add_day(HabitId(2), MockStore::day(1) + Duration::days(i), HabitDayStatus::Completed);
        }
        assert_eq!(eval(&store, Condition::AnyHabitStreak), 6);

        store.habits[0].is_active = false;
        assert_eq!(eval(&store, Condition::AnyHabitStreak), 2);
    }

    #[test]
    fn test_foreign_habit_counts_as_absent() {
        let mut store = MockStore::new();
        store.add_day(HabitId(5), MockStore::day(1), HabitDayStatus::Completed);
        store.habits[0].user_id = UserId(2);

        assert_eq!(eval(&store, Condition::HabitDays { habit_id: Some(HabitId(5)) }), 0);
        assert_eq!(eval(&store, Condition::HabitStreak { habit_id: Some(HabitId(5)) }), 0);
    }

    #[test]
    fn test_missing_parameters_yield_zero() {
        let mut store = MockStore::new();
        store.add_day(HabitId(1), MockStore::day(1), HabitDayStatus::Completed);
        store.goals.push(Period::Weekly);
        store.moods.push(Mood::Good);

        assert_eq!(eval(&store, Condition::HabitDays { habit_id: None }), 0);
        assert_eq!(eval(&store, Condition::GoalCompletedByPeriod { period: None }), 0);
        assert_eq!(eval(&store, Condition::SpecificMoodCount { mood: None }), 0);
        assert_eq!(eval(&store, Condition::AnySobrietyDuration { unit: None }), 0);
    }

    #[test]
    fn test_counts_with_filters() {
        let mut store = MockStore::new();
        store.goals = vec![Period::Weekly, Period::Yearly, Period::Weekly];
        store.todos = vec![Some(CategoryId(1)), Some(CategoryId(2)), None];
        store.challenges = vec![Period::Daily, Period::Weekly];
        store.moods = vec![Mood::Great, Mood::Bad, Mood::Great];
        store.notes = 4;

        assert_eq!(eval(&store, Condition::GoalCompleted), 3);
        assert_eq!(eval(&store, Condition::GoalCompletedByPeriod { period: Some(Period::Weekly) }), 2);
        assert_eq!(eval(&store, Condition::TodoCompleted { category_id: None }), 3);
        assert_eq!(eval(&store, Condition::TodoCompleted { category_id: Some(CategoryId(2)) }), 1);
        assert_eq!(eval(&store, Condition::ChallengeCompleted { period: None }), 2);
        assert_eq!(eval(&store, Condition::ChallengeCompleted { period: Some(Period::Daily) }), 1);
        assert_eq!(eval(&store, Condition::MoodLoggedDays), 3);
        assert_eq!(eval(&store, Condition::SpecificMoodCount { mood: Some(Mood::Great) }), 2);
        assert_eq!(eval(&store, Condition::NotesCount), 4);
    }

    #[test]
    fn test_level_and_xp() {
        let mut store = MockStore::new();
        store.users[0].total_xp = 350;
        store.users[0].current_level = 3;

        assert_eq!(eval(&store, Condition::LevelReached), 3);
        assert_eq!(eval(&store, Condition::XpReached), 350);

        store.users[0].total_xp = -20;
        assert_eq!(eval(&store, Condition::XpReached), 0);

        store.users.clear();
        let def = MockStore::new().define("lvl", Condition::LevelReached, 2);
        let result = evaluate_condition(&store, &EvaluationContext::now(), MockStore::USER, &def);
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_sobriety_durations() {
        let mut store = MockStore::new();
        let start = MockStore::day(1).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let ended = store.add_sobriety(start, Some(start + Duration::days(45)));
        let running = store.add_sobriety(start + Duration::days(50), None);
        let ctx = EvaluationContext::at(start + Duration::days(420));

        let measure = |condition| {
            let def = MockStore::new().define("sample", condition, 1);
            evaluate_condition(&store, &ctx, MockStore::USER, &def).unwrap()
        };

        use lifequest_domain::DurationUnit::{Days, Months, Years};
        assert_eq!(measure(Condition::SobrietyDuration { sobriety_id: Some(ended), unit: Some(Days) }), 45);
        assert_eq!(measure(Condition::SobrietyDuration { sobriety_id: Some(ended), unit: Some(Months) }), 1);
        assert_eq!(measure(Condition::SobrietyDuration { sobriety_id: Some(running), unit: Some(Days) }), 370);
        assert_eq!(measure(Condition::SobrietyDuration { sobriety_id: Some(running), unit: Some(Years) }), 1);
        assert_eq!(measure(Condition::AnySobrietyDuration { unit: Some(Months) }), 12);
        assert_eq!(measure(Condition::SobrietyDuration { sobriety_id: Some(SobrietyId(99)), unit: Some(Days) }), 0);
    }

    #[test]
    fn test_sobriety_of_other_user_is_zero() {
        let mut store = MockStore::new();
        let start = Utc::now() - chrono::Duration::days(10);
        let id = store.add_sobriety(start, None);
        store.sobrieties[0].user_id = UserId(2);

        assert_eq!(
            eval(&store, Condition::SobrietyDuration { sobriety_id: Some(id), unit: Some(DurationUnit::Days) }),
            0
        );
        assert_eq!(eval(&store, Condition::AnySobrietyDuration { unit: Some(DurationUnit::Days) }), 0);
    }

    #[test]
    fn test_manual_and_unknown_are_zero() {
        let mut store = MockStore::new();
        store.notes = 9;
        assert_eq!(eval(&store, Condition::Manual), 0);
        assert_eq!(
            eval(&store, Condition::Unknown { condition_type: "sleep_hours".to_string() }),
            0
        );
    }
}
