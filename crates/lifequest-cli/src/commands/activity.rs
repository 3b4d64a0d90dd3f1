//! Habit, goal, todo and challenge commands.

use super::{parse_period, today, Session};
use crate::cli::{ChallengeAction, GoalAction, HabitAction, HabitDayArgs, TodoAction};
use crate::error::{CliError, Result};
use crate::output::{Formatter, HabitRow};
use lifequest_domain::{
    longest_streak, CategoryId, ChallengeId, GoalId, HabitId, TodoId, UserChallengeId,
};
use lifequest_store::HabitToggle;

/// Execute a habit command.
pub fn execute_habit(action: HabitAction, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    match action {
        HabitAction::Add { title, difficulty } => {
            let habit = session.store.create_habit(session.user, &title, &difficulty)?;
            Ok(vec![formatter.created("Habit", habit.id, &habit)?])
        }
        HabitAction::Complete(args) => {
            let (habit, date) = owned_habit_day(session, &args)?;
            let outcome = session.store.complete_habit_day(habit, date)?;
            Ok(vec![formatter.completion(&format!("Habit {} on {}", habit, date), &outcome)?])
        }
        HabitAction::Toggle(args) => {
            let (habit, date) = owned_habit_day(session, &args)?;
            let HabitToggle { day, outcome } = session.store.toggle_habit_day(habit, date)?;
            if day.is_completed() {
                Ok(vec![formatter.completion(&format!("Habit {} on {}", habit, date), &outcome)?])
            } else {
                Ok(vec![formatter.updated(&format!("Habit {} on {} cleared", habit, date), &day)?])
            }
        }
        HabitAction::Skip(args) => {
            let (habit, date) = owned_habit_day(session, &args)?;
            let day = session.store.skip_habit_day(habit, date)?;
            Ok(vec![formatter.updated(&format!("Habit {} skipped on {}", habit, date), &day)?])
        }
        HabitAction::Pause { id, resume } => {
            let habit = owned_habit(session, id)?;
            session.store.set_habit_active(habit, resume)?;
            let verb = if resume { "resumed" } else { "paused" };
            let habit = session.store.get_habit(habit)?;
            Ok(vec![formatter.updated(&format!("Habit {} {}", id, verb), &habit)?])
        }
        HabitAction::List => {
            let mut rows = Vec::new();
            for habit in session.store.habits(session.user)? {
                let days = session.store.habit_history(habit.id)?;
                rows.push(HabitRow {
                    streak: longest_streak(&days),
                    habit,
                });
            }
            Ok(vec![formatter.habits(&rows)?])
        }
    }
}

/// Execute a goal command.
pub fn execute_goal(action: GoalAction, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    match action {
        GoalAction::Add {
            title,
            period,
            difficulty,
        } => {
            let goal = session
                .store
                .create_goal(session.user, &title, parse_period(&period)?, &difficulty)?;
            Ok(vec![formatter.created("Goal", goal.id, &goal)?])
        }
        GoalAction::Complete { id } => {
            let goal = session
                .store
                .get_goal(GoalId(id))?
                .filter(|g| g.user_id == session.user)
                .ok_or_else(|| not_found("goal", id))?;
            let outcome = session.store.complete_goal(goal.id)?;
            Ok(vec![formatter.completion(&format!("Goal '{}'", goal.title), &outcome)?])
        }
        GoalAction::List => Ok(vec![formatter.goals(&session.store.goals(session.user)?)?]),
    }
}

/// Execute a todo command.
pub fn execute_todo(action: TodoAction, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    match action {
        TodoAction::Category { name, difficulty } => {
            let category = session.store.create_todo_category(&name, &difficulty)?;
            Ok(vec![formatter.created("Category", category.id, &category)?])
        }
        TodoAction::Add {
            content,
            category,
            difficulty,
        } => {
            let task = session.store.create_todo(
                session.user,
                &content,
                CategoryId(category),
                difficulty.as_deref(),
            )?;
            Ok(vec![formatter.created("Todo", task.id, &task)?])
        }
        TodoAction::Complete { id } => {
            let task = session
                .store
                .get_todo(TodoId(id))?
                .filter(|t| t.user_id == session.user)
                .ok_or_else(|| not_found("todo", id))?;
            let outcome = session.store.complete_todo(task.id)?;
            Ok(vec![formatter.completion(&format!("Todo '{}'", task.content), &outcome)?])
        }
        TodoAction::List => Ok(vec![
            formatter.todo_categories(&session.store.todo_categories()?)?,
            formatter.todos(&session.store.todos(session.user)?)?,
        ]),
    }
}

/// Execute a challenge command.
pub fn execute_challenge(
    action: ChallengeAction,
    session: &mut Session,
    formatter: &Formatter,
) -> Result<Vec<String>> {
    match action {
        ChallengeAction::Add {
            title,
            period,
            difficulty,
        } => {
            let period = parse_period(&period)?;
            if !period.is_challenge_period() {
                return Err(CliError::InvalidInput(format!(
                    "Challenges run daily or weekly, not {}",
                    period
                )));
            }
            let definition = session
                .store
                .create_challenge_definition(&title, &difficulty, period)?;
            Ok(vec![formatter.created("Challenge", definition.id, &definition)?])
        }
        ChallengeAction::Assign { id } => {
            let assignment = session.store.assign_challenge(session.user, ChallengeId(id))?;
            Ok(vec![formatter.created("Assignment", assignment.id, &assignment)?])
        }
        ChallengeAction::Complete { id } => {
            let owned = session
                .store
                .user_challenges(session.user)?
                .into_iter()
                .any(|a| a.id == UserChallengeId(id));
            if !owned {
                return Err(not_found("challenge assignment", id));
            }
            let outcome = session.store.complete_challenge(UserChallengeId(id))?;
            Ok(vec![formatter.completion(&format!("Challenge {}", id), &outcome)?])
        }
        ChallengeAction::List => Ok(vec![
            formatter.challenge_definitions(&session.store.challenge_definitions()?)?,
            formatter.user_challenges(&session.store.user_challenges(session.user)?)?,
        ]),
    }
}

fn owned_habit(session: &Session, id: i64) -> Result<HabitId> {
    session
        .store
        .get_habit(HabitId(id))?
        .filter(|h| h.user_id == session.user)
        .map(|h| h.id)
        .ok_or_else(|| not_found("habit", id))
}

fn owned_habit_day(session: &Session, args: &HabitDayArgs) -> Result<(HabitId, chrono::NaiveDate)> {
    let habit = owned_habit(session, args.id)?;
    Ok((habit, args.date.unwrap_or_else(today)))
}

fn not_found(what: &str, id: i64) -> CliError {
    CliError::InvalidInput(format!("No {} {} for this user", what, id))
}
