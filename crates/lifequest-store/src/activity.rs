//! Habits, goals, todos and challenges
//!
//! Each completion flow follows the same shape inside one IMMEDIATE
//! transaction: load the record, return early if its `xp_awarded` flag is set,
//! compute XP (any formula error aborts before a write), set the flag, award.

use crate::ledger::award_in_tx;
use crate::users::require_user;
use crate::{count, immediate, parse_column, SqliteStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use lifequest_domain::{
    calculate_xp, CategoryId, ChallengeDefinition, ChallengeId, CompletionOutcome, Goal, GoalId,
    Habit, HabitDay, HabitDayId, HabitDayStatus, HabitId, Module, Period, TodoCategory, TodoId,
    TodoTask, UserChallenge, UserChallengeId, UserId, XpError,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Result of toggling a habit day
#[derive(Debug, Clone, PartialEq)]
pub struct HabitToggle {
    /// The day record after the toggle
    pub day: HabitDay,
    /// XP effect of the toggle (zero when toggling off)
    pub outcome: CompletionOutcome,
}

/// Outcome for a record that was rewarded before this call
pub(crate) fn already_awarded(
    conn: &Connection,
    user: UserId,
) -> Result<CompletionOutcome, StoreError> {
    let current = require_user(conn, user)?;
    Ok(CompletionOutcome::already_awarded(
        current.total_xp,
        current.current_level,
    ))
}

fn normalize_difficulty(difficulty: &str) -> String {
    difficulty.trim().to_lowercase()
}

const HABIT_COLUMNS: &str = "id, user_id, title, difficulty, is_active, created_at";

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: HabitId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        title: row.get(2)?,
        difficulty: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn habit_day_from_row(row: &Row<'_>) -> rusqlite::Result<HabitDay> {
    Ok(HabitDay {
        id: HabitDayId(row.get(0)?),
        habit_id: HabitId(row.get(1)?),
        date: row.get(2)?,
        status: parse_column(row, 3, "habit day status", HabitDayStatus::parse)?,
        xp_awarded: row.get(4)?,
    })
}

fn load_habit(conn: &Connection, id: HabitId) -> Result<Habit, StoreError> {
    conn.query_row(
        &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
        params![id.value()],
        habit_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("habit", id))
}

fn load_habit_day(
    conn: &Connection,
    habit: HabitId,
    date: NaiveDate,
) -> Result<Option<HabitDay>, StoreError> {
    let day = conn
        .query_row(
            "SELECT id, habit_id, date, status, xp_awarded
             FROM habit_days WHERE habit_id = ?1 AND date = ?2",
            params![habit.value(), date],
            habit_day_from_row,
        )
        .optional()?;
    Ok(day)
}

/// Day records of a habit, oldest first, only if `user` owns the habit
pub(crate) fn habit_days_for(
    conn: &Connection,
    user: UserId,
    habit: HabitId,
) -> Result<Vec<HabitDay>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT d.id, d.habit_id, d.date, d.status, d.xp_awarded
         FROM habit_days d JOIN habits h ON h.id = d.habit_id
         WHERE d.habit_id = ?1 AND h.user_id = ?2
         ORDER BY d.date",
    )?;
    let days = stmt
        .query_map(params![habit.value(), user.value()], habit_day_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(days)
}

fn complete_day_in_tx(
    conn: &Connection,
    rules: &lifequest_domain::XpRules,
    habit: &Habit,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(HabitDay, CompletionOutcome), StoreError> {
    if let Some(day) = load_habit_day(conn, habit.id, date)? {
        if day.xp_awarded {
            conn.execute(
                "UPDATE habit_days SET status = 'completed' WHERE id = ?1",
                params![day.id.value()],
            )?;
            let outcome = already_awarded(conn, habit.user_id)?;
            let day = HabitDay {
                status: HabitDayStatus::Completed,
                ..day
            };
            return Ok((day, outcome));
        }
    }

    let user = require_user(conn, habit.user_id)?;
    let xp = calculate_xp(
        rules,
        Module::Habits.as_str(),
        &habit.difficulty,
        None,
        Some(&user),
    )?;

    conn.execute(
        "INSERT INTO habit_days (habit_id, date, status, xp_awarded)
         VALUES (?1, ?2, 'completed', 1)
         ON CONFLICT (habit_id, date) DO UPDATE SET status = 'completed', xp_awarded = 1",
        params![habit.id.value(), date],
    )?;
    let day = load_habit_day(conn, habit.id, date)?
        .ok_or_else(|| StoreError::not_found("habit day", date))?;

    let award = award_in_tx(
        conn,
        rules.base_level_xp,
        habit.user_id,
        xp,
        Module::Habits.source(),
        Some(day.id.value()),
        now,
    )?;

    Ok((day, CompletionOutcome::awarded(award)))
}

impl SqliteStore {
    pub(crate) fn check_difficulty(&self, difficulty: &str) -> Result<String, StoreError> {
        let name = normalize_difficulty(difficulty);
        if !self.rules.base_xp.contains_key(&name) {
            return Err(XpError::UnknownDifficulty(name).into());
        }
        Ok(name)
    }

    // ---- habits ----

    /// Create an active habit
    pub fn create_habit(
        &mut self,
        user: UserId,
        title: &str,
        difficulty: &str,
    ) -> Result<Habit, StoreError> {
        let difficulty = self.check_difficulty(difficulty)?;
        require_user(&self.conn, user)?;

        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO habits (user_id, title, difficulty, is_active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![user.value(), title, difficulty, now],
        )?;

        Ok(Habit {
            id: HabitId(self.conn.last_insert_rowid()),
            user_id: user,
            title: title.to_string(),
            difficulty,
            is_active: true,
            created_at: now,
        })
    }

    /// Get a habit by ID
    pub fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, StoreError> {
        match load_habit(&self.conn, id) {
            Ok(habit) => Ok(Some(habit)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// All habits of a user, oldest first
    pub fn habits(&self, user: UserId) -> Result<Vec<Habit>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY id",
            HABIT_COLUMNS
        ))?;
        let habits = stmt
            .query_map(params![user.value()], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    /// Pause or resume a habit
    pub fn set_habit_active(&mut self, id: HabitId, active: bool) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE habits SET is_active = ?1 WHERE id = ?2",
            params![active, id.value()],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("habit", id));
        }
        Ok(())
    }

    /// Day records of a habit, oldest first
    pub fn habit_history(&self, id: HabitId) -> Result<Vec<HabitDay>, StoreError> {
        let habit = load_habit(&self.conn, id)?;
        habit_days_for(&self.conn, habit.user_id, id)
    }

    /// Mark a habit done on `date`, awarding XP the first time only
    pub fn complete_habit_day(
        &mut self,
        habit: HabitId,
        date: NaiveDate,
    ) -> Result<CompletionOutcome, StoreError> {
        let tx = immediate(&mut self.conn)?;
        let habit = load_habit(&tx, habit)?;
        let (day, outcome) = complete_day_in_tx(&tx, &self.rules, &habit, date, Utc::now())?;
        tx.commit()?;

        tracing::info!(
            habit = %habit.id,
            %date,
            xp = outcome.xp_gained,
            already = outcome.already_completed,
            day = %day.id,
            "habit day completed"
        );
        Ok(outcome)
    }

    /// Flip a habit day between completed and empty
    ///
    /// Turning a day back on never re-awards XP: the flag set on the first
    /// completion stays set.
    pub fn toggle_habit_day(
        &mut self,
        habit: HabitId,
        date: NaiveDate,
    ) -> Result<HabitToggle, StoreError> {
        let tx = immediate(&mut self.conn)?;
        let habit = load_habit(&tx, habit)?;

        let toggle = match load_habit_day(&tx, habit.id, date)? {
            Some(day) if day.is_completed() => {
                tx.execute(
                    "UPDATE habit_days SET status = 'empty' WHERE id = ?1",
                    params![day.id.value()],
                )?;
                let mut outcome = already_awarded(&tx, habit.user_id)?;
                outcome.already_completed = false;
                HabitToggle {
                    day: HabitDay {
                        status: HabitDayStatus::Empty,
                        ..day
                    },
                    outcome,
                }
            }
            _ => {
                let (day, outcome) =
                    complete_day_in_tx(&tx, &self.rules, &habit, date, Utc::now())?;
                HabitToggle { day, outcome }
            }
        };
        tx.commit()?;

        tracing::info!(
            habit = %habit.id,
            %date,
            status = %toggle.day.status,
            xp = toggle.outcome.xp_gained,
            "habit day toggled"
        );
        Ok(toggle)
    }

    /// Mark a habit as deliberately skipped on `date`
    pub fn skip_habit_day(&mut self, habit: HabitId, date: NaiveDate) -> Result<HabitDay, StoreError> {
        let tx = immediate(&mut self.conn)?;
        let habit = load_habit(&tx, habit)?;
        tx.execute(
            "INSERT INTO habit_days (habit_id, date, status, xp_awarded)
             VALUES (?1, ?2, 'skipped', 0)
             ON CONFLICT (habit_id, date) DO UPDATE SET status = 'skipped'",
            params![habit.id.value(), date],
        )?;
        let day = load_habit_day(&tx, habit.id, date)?
            .ok_or_else(|| StoreError::not_found("habit day", date))?;
        tx.commit()?;
        Ok(day)
    }

    // ---- goals ----

    /// Create a goal; only weekly, monthly and yearly periods are valid
    pub fn create_goal(
        &mut self,
        user: UserId,
        title: &str,
        period: Period,
        difficulty: &str,
    ) -> Result<Goal, StoreError> {
        if !period.is_goal_period() {
            return Err(StoreError::InvalidData(format!(
                "goals cannot be {}",
                period
            )));
        }
        let difficulty = self.check_difficulty(difficulty)?;
        require_user(&self.conn, user)?;

        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO goals (user_id, title, period, difficulty, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user.value(), title, period.as_str(), difficulty, now],
        )?;

        Ok(Goal {
            id: GoalId(self.conn.last_insert_rowid()),
            user_id: user,
            title: title.to_string(),
            period,
            difficulty,
            is_completed: false,
            xp_awarded: false,
            completed_at: None,
            created_at: now,
        })
    }

    /// Get a goal by ID
    pub fn get_goal(&self, id: GoalId) -> Result<Option<Goal>, StoreError> {
        let goal = self
            .conn
            .query_row(
                &format!("SELECT {} FROM goals WHERE id = ?1", GOAL_COLUMNS),
                params![id.value()],
                goal_from_row,
            )
            .optional()?;
        Ok(goal)
    }

    /// All goals of a user
    pub fn goals(&self, user: UserId) -> Result<Vec<Goal>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM goals WHERE user_id = ?1 ORDER BY id",
            GOAL_COLUMNS
        ))?;
        let goals = stmt
            .query_map(params![user.value()], goal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    /// Complete a goal, awarding period-scaled XP once
    pub fn complete_goal(&mut self, id: GoalId) -> Result<CompletionOutcome, StoreError> {
        let now = Utc::now();
        let tx = immediate(&mut self.conn)?;

        let goal = tx
            .query_row(
                &format!("SELECT {} FROM goals WHERE id = ?1", GOAL_COLUMNS),
                params![id.value()],
                goal_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("goal", id))?;

        if goal.xp_awarded {
            let outcome = already_awarded(&tx, goal.user_id)?;
            tx.commit()?;
            return Ok(outcome);
        }

        let user = require_user(&tx, goal.user_id)?;
        let xp = calculate_xp(
            &self.rules,
            Module::Goals.as_str(),
            &goal.difficulty,
            Some(goal.period.as_str()),
            Some(&user),
        )?;

        tx.execute(
            "UPDATE goals SET is_completed = 1, xp_awarded = 1, completed_at = ?1 WHERE id = ?2",
            params![now, id.value()],
        )?;
        let award = award_in_tx(
            &tx,
            self.rules.base_level_xp,
            goal.user_id,
            xp,
            Module::Goals.source(),
            Some(id.value()),
            now,
        )?;
        tx.commit()?;

        tracing::info!(goal = %id, xp, "goal completed");
        Ok(CompletionOutcome::awarded(award))
    }

    // ---- todos ----

    /// Create a todo category
    pub fn create_todo_category(
        &mut self,
        name: &str,
        difficulty: &str,
    ) -> Result<TodoCategory, StoreError> {
        let difficulty = self.check_difficulty(difficulty)?;
        self.conn.execute(
            "INSERT INTO todo_categories (name, difficulty) VALUES (?1, ?2)",
            params![name, difficulty],
        )?;
        Ok(TodoCategory {
            id: CategoryId(self.conn.last_insert_rowid()),
            name: name.to_string(),
            difficulty,
        })
    }

    /// All todo categories
    pub fn todo_categories(&self) -> Result<Vec<TodoCategory>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, difficulty FROM todo_categories ORDER BY name")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(TodoCategory {
                    id: CategoryId(row.get(0)?),
                    name: row.get(1)?,
                    difficulty: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Create a todo; `custom_difficulty` overrides the category's
    pub fn create_todo(
        &mut self,
        user: UserId,
        content: &str,
        category: CategoryId,
        custom_difficulty: Option<&str>,
    ) -> Result<TodoTask, StoreError> {
        let custom_difficulty = custom_difficulty
            .map(|d| self.check_difficulty(d))
            .transpose()?;
        require_user(&self.conn, user)?;

        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO todo_tasks (user_id, content, category_id, custom_difficulty, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user.value(), content, category.value(), custom_difficulty, now],
        )?;

        Ok(TodoTask {
            id: TodoId(self.conn.last_insert_rowid()),
            user_id: user,
            content: content.to_string(),
            category_id: category,
            custom_difficulty,
            is_completed: false,
            xp_awarded: false,
            created_at: now,
        })
    }

    /// Get a todo by ID
    pub fn get_todo(&self, id: TodoId) -> Result<Option<TodoTask>, StoreError> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {} FROM todo_tasks WHERE id = ?1", TODO_COLUMNS),
                params![id.value()],
                todo_from_row,
            )
            .optional()?;
        Ok(task)
    }

    /// All todos of a user, newest first
    pub fn todos(&self, user: UserId) -> Result<Vec<TodoTask>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM todo_tasks WHERE user_id = ?1 ORDER BY id DESC",
            TODO_COLUMNS
        ))?;
        let tasks = stmt
            .query_map(params![user.value()], todo_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Complete a todo, awarding XP once
    pub fn complete_todo(&mut self, id: TodoId) -> Result<CompletionOutcome, StoreError> {
        let now = Utc::now();
        let tx = immediate(&mut self.conn)?;

        let (task, category_difficulty): (TodoTask, String) = tx
            .query_row(
                "SELECT t.id, t.user_id, t.content, t.category_id, t.custom_difficulty,
                        t.is_completed, t.xp_awarded, t.created_at, c.difficulty
                 FROM todo_tasks t JOIN todo_categories c ON c.id = t.category_id
                 WHERE t.id = ?1",
                params![id.value()],
                |row| Ok((todo_from_row(row)?, row.get(8)?)),
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("todo", id))?;

        if task.xp_awarded {
            let outcome = already_awarded(&tx, task.user_id)?;
            tx.commit()?;
            return Ok(outcome);
        }

        let difficulty = task
            .custom_difficulty
            .clone()
            .unwrap_or(category_difficulty);
        let user = require_user(&tx, task.user_id)?;
        let xp = calculate_xp(
            &self.rules,
            Module::Todos.as_str(),
            &difficulty,
            None,
            Some(&user),
        )?;

        tx.execute(
            "UPDATE todo_tasks SET is_completed = 1, xp_awarded = 1 WHERE id = ?1",
            params![id.value()],
        )?;
        let award = award_in_tx(
            &tx,
            self.rules.base_level_xp,
            task.user_id,
            xp,
            Module::Todos.source(),
            Some(id.value()),
            now,
        )?;
        tx.commit()?;

        tracing::info!(todo = %id, xp, "todo completed");
        Ok(CompletionOutcome::awarded(award))
    }

    // ---- challenges ----

    /// Add a challenge to the catalog; only daily and weekly periods are valid
    pub fn create_challenge_definition(
        &mut self,
        title: &str,
        difficulty: &str,
        period: Period,
    ) -> Result<ChallengeDefinition, StoreError> {
        if !period.is_challenge_period() {
            return Err(StoreError::InvalidData(format!(
                "challenges cannot be {}",
                period
            )));
        }
        let difficulty = self.check_difficulty(difficulty)?;

        self.conn.execute(
            "INSERT INTO challenge_definitions (title, difficulty, period) VALUES (?1, ?2, ?3)",
            params![title, difficulty, period.as_str()],
        )?;
        Ok(ChallengeDefinition {
            id: ChallengeId(self.conn.last_insert_rowid()),
            title: title.to_string(),
            difficulty,
            period,
        })
    }

    /// The challenge catalog
    pub fn challenge_definitions(&self) -> Result<Vec<ChallengeDefinition>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, difficulty, period FROM challenge_definitions ORDER BY id")?;
        let definitions = stmt
            .query_map([], challenge_definition_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(definitions)
    }

    /// Give a challenge to a user
    ///
    /// Returns the open assignment if there is one; a new assignment is created
    /// only when none exists or the previous one was completed.
    pub fn assign_challenge(
        &mut self,
        user: UserId,
        definition: ChallengeId,
    ) -> Result<UserChallenge, StoreError> {
        let tx = immediate(&mut self.conn)?;
        require_user(&tx, user)?;

        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM challenge_definitions WHERE id = ?1",
                params![definition.value()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::not_found("challenge", definition));
        }

        let open = tx
            .query_row(
                &format!(
                    "SELECT {} FROM user_challenges
                     WHERE user_id = ?1 AND definition_id = ?2 AND is_completed = 0
                     ORDER BY id DESC LIMIT 1",
                    USER_CHALLENGE_COLUMNS
                ),
                params![user.value(), definition.value()],
                user_challenge_from_row,
            )
            .optional()?;

        let assignment = match open {
            Some(assignment) => assignment,
            None => {
                let today = Utc::now().date_naive();
                tx.execute(
                    "INSERT INTO user_challenges (user_id, definition_id, start_date)
                     VALUES (?1, ?2, ?3)",
                    params![user.value(), definition.value(), today],
                )?;
                UserChallenge {
                    id: UserChallengeId(tx.last_insert_rowid()),
                    user_id: user,
                    definition_id: definition,
                    start_date: today,
                    is_completed: false,
                    xp_awarded: false,
                    completed_at: None,
                }
            }
        };
        tx.commit()?;
        Ok(assignment)
    }

    /// All challenge assignments of a user
    pub fn user_challenges(&self, user: UserId) -> Result<Vec<UserChallenge>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM user_challenges WHERE user_id = ?1 ORDER BY id",
            USER_CHALLENGE_COLUMNS
        ))?;
        let assignments = stmt
            .query_map(params![user.value()], user_challenge_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assignments)
    }

    /// Complete a challenge assignment, awarding period-scaled XP once
    pub fn complete_challenge(
        &mut self,
        id: UserChallengeId,
    ) -> Result<CompletionOutcome, StoreError> {
        let now = Utc::now();
        let tx = immediate(&mut self.conn)?;

        let (assignment, definition) = tx
            .query_row(
                "SELECT u.id, u.user_id, u.definition_id, u.start_date, u.is_completed,
                        u.xp_awarded, u.completed_at,
                        d.id, d.title, d.difficulty, d.period
                 FROM user_challenges u JOIN challenge_definitions d ON d.id = u.definition_id
                 WHERE u.id = ?1",
                params![id.value()],
                |row| {
                    let assignment = user_challenge_from_row(row)?;
                    let definition = ChallengeDefinition {
                        id: ChallengeId(row.get(7)?),
                        title: row.get(8)?,
                        difficulty: row.get(9)?,
                        period: parse_column(row, 10, "period", Period::parse)?,
                    };
                    Ok((assignment, definition))
                },
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("user challenge", id))?;

        if assignment.xp_awarded {
            let outcome = already_awarded(&tx, assignment.user_id)?;
            tx.commit()?;
            return Ok(outcome);
        }

        let user = require_user(&tx, assignment.user_id)?;
        let xp = calculate_xp(
            &self.rules,
            Module::Challenges.as_str(),
            &definition.difficulty,
            Some(definition.period.as_str()),
            Some(&user),
        )?;

        tx.execute(
            "UPDATE user_challenges SET is_completed = 1, xp_awarded = 1, completed_at = ?1
             WHERE id = ?2",
            params![now, id.value()],
        )?;
        let award = award_in_tx(
            &tx,
            self.rules.base_level_xp,
            assignment.user_id,
            xp,
            Module::Challenges.source(),
            Some(id.value()),
            now,
        )?;
        tx.commit()?;

        tracing::info!(challenge = %definition.title, xp, "challenge completed");
        Ok(CompletionOutcome::awarded(award))
    }

    // ---- progress counts ----

    pub(crate) fn completed_habit_day_count(
        &self,
        user: UserId,
        habit: Option<HabitId>,
    ) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM habit_days d JOIN habits h ON h.id = d.habit_id
             WHERE h.user_id = ?1 AND d.status = 'completed'
               AND (?2 IS NULL OR d.habit_id = ?2)",
            params![user.value(), habit.map(|h| h.value())],
            |row| row.get(0),
        )?;
        Ok(count(n))
    }

    pub(crate) fn completed_goal_count(
        &self,
        user: UserId,
        period: Option<Period>,
    ) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM goals
             WHERE user_id = ?1 AND is_completed = 1 AND (?2 IS NULL OR period = ?2)",
            params![user.value(), period.map(|p| p.as_str())],
            |row| row.get(0),
        )?;
        Ok(count(n))
    }

    pub(crate) fn completed_todo_count(
        &self,
        user: UserId,
        category: Option<CategoryId>,
    ) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM todo_tasks
             WHERE user_id = ?1 AND is_completed = 1 AND (?2 IS NULL OR category_id = ?2)",
            params![user.value(), category.map(|c| c.value())],
            |row| row.get(0),
        )?;
        Ok(count(n))
    }

    pub(crate) fn completed_challenge_count(
        &self,
        user: UserId,
        period: Option<Period>,
    ) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM user_challenges u
             JOIN challenge_definitions d ON d.id = u.definition_id
             WHERE u.user_id = ?1 AND u.is_completed = 1 AND (?2 IS NULL OR d.period = ?2)",
            params![user.value(), period.map(|p| p.as_str())],
            |row| row.get(0),
        )?;
        Ok(count(n))
    }

    pub(crate) fn active_habit_list(&self, user: UserId) -> Result<Vec<Habit>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM habits WHERE user_id = ?1 AND is_active = 1 ORDER BY id",
            HABIT_COLUMNS
        ))?;
        let habits = stmt
            .query_map(params![user.value()], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    pub(crate) fn owned_habit_days(
        &self,
        user: UserId,
        habit: HabitId,
    ) -> Result<Vec<HabitDay>, StoreError> {
        habit_days_for(&self.conn, user, habit)
    }
}

const GOAL_COLUMNS: &str =
    "id, user_id, title, period, difficulty, is_completed, xp_awarded, completed_at, created_at";

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: GoalId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        title: row.get(2)?,
        period: parse_column(row, 3, "period", Period::parse)?,
        difficulty: row.get(4)?,
        is_completed: row.get(5)?,
        xp_awarded: row.get(6)?,
        completed_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const TODO_COLUMNS: &str =
    "id, user_id, content, category_id, custom_difficulty, is_completed, xp_awarded, created_at";

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<TodoTask> {
    Ok(TodoTask {
        id: TodoId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        content: row.get(2)?,
        category_id: CategoryId(row.get(3)?),
        custom_difficulty: row.get(4)?,
        is_completed: row.get(5)?,
        xp_awarded: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn challenge_definition_from_row(row: &Row<'_>) -> rusqlite::Result<ChallengeDefinition> {
    Ok(ChallengeDefinition {
        id: ChallengeId(row.get(0)?),
        title: row.get(1)?,
        difficulty: row.get(2)?,
        period: parse_column(row, 3, "period", Period::parse)?,
    })
}

const USER_CHALLENGE_COLUMNS: &str =
    "id, user_id, definition_id, start_date, is_completed, xp_awarded, completed_at";

fn user_challenge_from_row(row: &Row<'_>) -> rusqlite::Result<UserChallenge> {
    Ok(UserChallenge {
        id: UserChallengeId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        definition_id: ChallengeId(row.get(2)?),
        start_date: row.get(3)?,
        is_completed: row.get(4)?,
        xp_awarded: row.get(5)?,
        completed_at: row.get(6)?,
    })
}
