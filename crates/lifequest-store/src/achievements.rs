//! Achievement definitions, per-user progress rows and the
//! [`AchievementStore`] implementation

use crate::{SqliteStore, StoreError};
use chrono::Utc;
use lifequest_domain::traits::AchievementStore;
use lifequest_domain::{
    AchievementDefinition, AchievementId, CategoryId, Condition, ConditionConfig, Difficulty,
    Habit, HabitDay, HabitId, Mood, NewAchievement, Period, Sobriety, SobrietyId, User,
    UserAchievementState, UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

/// Changes to an existing definition; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New difficulty name
    pub difficulty: Option<String>,
    /// New condition and its raw parameters
    pub condition: Option<(Condition, ConditionConfig)>,
    /// New visibility
    pub is_hidden: Option<bool>,
}

impl AchievementUpdate {
    /// Whether the edit changes how progress is computed
    pub fn changes_condition(&self) -> bool {
        self.condition.is_some()
    }
}

const ACHIEVEMENT_COLUMNS: &str =
    "id, name, description, difficulty, condition_type, condition_config, is_hidden, owner_id, created_at";

/// Decode the stored config; anything but a JSON object reads as empty
fn decode_config(raw: &str) -> ConditionConfig {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!(config = raw, "condition config is not a JSON object, using empty config");
            ConditionConfig::new()
        }
    }
}

fn encode_config(config: &ConditionConfig) -> Result<String, StoreError> {
    Ok(serde_json::to_string(config)?)
}

fn achievement_from_row(row: &Row<'_>) -> rusqlite::Result<AchievementDefinition> {
    let condition_type: String = row.get(4)?;
    let raw_config: String = row.get(5)?;
    let config = decode_config(&raw_config);
    let owner: Option<i64> = row.get(7)?;

    Ok(AchievementDefinition {
        id: AchievementId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        difficulty: row.get(3)?,
        condition: Condition::from_parts(&condition_type, &config),
        config,
        is_hidden: row.get(6)?,
        owner: owner.map(UserId),
        created_at: row.get(8)?,
    })
}

const STATE_COLUMNS: &str =
    "user_id, achievement_id, current_value, target_value, is_completed, completed_at, updated_at";

fn state_from_row(row: &Row<'_>) -> rusqlite::Result<UserAchievementState> {
    Ok(UserAchievementState {
        user_id: UserId(row.get(0)?),
        achievement_id: AchievementId(row.get(1)?),
        current_value: row.get(2)?,
        target_value: row.get(3)?,
        is_completed: row.get(4)?,
        completed_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Catalog order: difficulty rank, then name
fn catalog_order(def: &AchievementDefinition) -> (u8, String) {
    let rank = Difficulty::parse(&def.difficulty)
        .map(|d| d.order())
        .unwrap_or(u8::MAX);
    (rank, def.name.clone())
}

impl SqliteStore {
    /// Persist a new definition
    pub fn create_achievement(
        &mut self,
        new: &NewAchievement,
    ) -> Result<AchievementDefinition, StoreError> {
        let difficulty = self.check_difficulty(&new.difficulty)?;
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO achievements
             (name, description, difficulty, condition_type, condition_config, is_hidden, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.name,
                new.description,
                difficulty,
                new.condition.condition_type(),
                encode_config(&new.config)?,
                new.is_hidden,
                new.owner.map(|u| u.value()),
                now,
            ],
        )?;

        let id = AchievementId(self.conn.last_insert_rowid());
        tracing::info!(achievement = %id, name = %new.name, kind = new.condition.condition_type(), "achievement created");

        Ok(AchievementDefinition {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            difficulty,
            condition: new.condition.clone(),
            config: new.config.clone(),
            is_hidden: new.is_hidden,
            owner: new.owner,
            created_at: now,
        })
    }

    /// Apply an edit to a definition
    ///
    /// Progress rows are not touched here; after a condition change the
    /// caller resyncs them.
    pub fn update_achievement(
        &mut self,
        id: AchievementId,
        update: &AchievementUpdate,
    ) -> Result<AchievementDefinition, StoreError> {
        let mut def = self
            .achievement(id)?
            .ok_or_else(|| StoreError::not_found("achievement", id))?;

        if let Some(name) = &update.name {
            def.name = name.clone();
        }
        if let Some(description) = &update.description {
            def.description = description.clone();
        }
        if let Some(difficulty) = &update.difficulty {
            def.difficulty = self.check_difficulty(difficulty)?;
        }
        if let Some((condition, config)) = &update.condition {
            def.condition = condition.clone();
            def.config = config.clone();
        }
        if let Some(hidden) = update.is_hidden {
            def.is_hidden = hidden;
        }

        self.conn.execute(
            "UPDATE achievements SET name = ?1, description = ?2, difficulty = ?3,
             condition_type = ?4, condition_config = ?5, is_hidden = ?6
             WHERE id = ?7",
            params![
                def.name,
                def.description,
                def.difficulty,
                def.condition.condition_type(),
                encode_config(&def.config)?,
                def.is_hidden,
                id.value(),
            ],
        )?;

        tracing::info!(achievement = %id, condition_changed = update.changes_condition(), "achievement updated");
        Ok(def)
    }

    /// Delete a definition and every progress row for it
    pub fn delete_achievement(&mut self, id: AchievementId) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM achievements WHERE id = ?1", params![id.value()])?;
        if changed == 0 {
            return Err(StoreError::not_found("achievement", id));
        }
        tracing::info!(achievement = %id, "achievement deleted");
        Ok(())
    }

    /// Get a definition by ID
    pub fn achievement(
        &self,
        id: AchievementId,
    ) -> Result<Option<AchievementDefinition>, StoreError> {
        let def = self
            .conn
            .query_row(
                &format!("SELECT {} FROM achievements WHERE id = ?1", ACHIEVEMENT_COLUMNS),
                params![id.value()],
                achievement_from_row,
            )
            .optional()?;
        Ok(def)
    }

    /// Global plus owned definitions, by difficulty rank then name
    pub fn list_achievements(
        &self,
        user: UserId,
    ) -> Result<Vec<AchievementDefinition>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM achievements WHERE owner_id IS NULL OR owner_id = ?1",
            ACHIEVEMENT_COLUMNS
        ))?;
        let mut defs = stmt
            .query_map(params![user.value()], achievement_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        defs.sort_by_key(catalog_order);
        Ok(defs)
    }

    /// Every progress row of a user
    pub fn user_states(&self, user: UserId) -> Result<Vec<UserAchievementState>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM user_achievements WHERE user_id = ?1 ORDER BY achievement_id",
            STATE_COLUMNS
        ))?;
        let states = stmt
            .query_map(params![user.value()], state_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(states)
    }

    /// Users holding a progress row for `id`
    pub fn users_with_progress(&self, id: AchievementId) -> Result<Vec<UserId>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id FROM user_achievements WHERE achievement_id = ?1 ORDER BY user_id",
        )?;
        let users = stmt
            .query_map(params![id.value()], |row| Ok(UserId(row.get(0)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn owned_sobriety(
        &self,
        user: UserId,
        id: SobrietyId,
    ) -> Result<Option<Sobriety>, StoreError> {
        Ok(self.sobriety(id)?.filter(|s| s.user_id == user))
    }
}

impl AchievementStore for SqliteStore {
    type Error = StoreError;

    fn get_user(&self, user: UserId) -> Result<Option<User>, Self::Error> {
        SqliteStore::get_user(self, user)
    }

    fn count_completed_habit_days(
        &self,
        user: UserId,
        habit: Option<HabitId>,
    ) -> Result<u64, Self::Error> {
        self.completed_habit_day_count(user, habit)
    }

    fn owned_habit(&self, user: UserId, habit: HabitId) -> Result<Option<Habit>, Self::Error> {
        Ok(self.get_habit(habit)?.filter(|h| h.user_id == user))
    }

    fn habit_days(&self, user: UserId, habit: HabitId) -> Result<Vec<HabitDay>, Self::Error> {
        self.owned_habit_days(user, habit)
    }

    fn active_habits(&self, user: UserId) -> Result<Vec<Habit>, Self::Error> {
        self.active_habit_list(user)
    }

    fn count_completed_goals(
        &self,
        user: UserId,
        period: Option<Period>,
    ) -> Result<u64, Self::Error> {
        self.completed_goal_count(user, period)
    }

    fn count_completed_todos(
        &self,
        user: UserId,
        category: Option<CategoryId>,
    ) -> Result<u64, Self::Error> {
        self.completed_todo_count(user, category)
    }

    fn count_completed_challenges(
        &self,
        user: UserId,
        period: Option<Period>,
    ) -> Result<u64, Self::Error> {
        self.completed_challenge_count(user, period)
    }

    fn count_notes(&self, user: UserId) -> Result<u64, Self::Error> {
        self.note_count(user)
    }

    fn count_mood_entries(&self, user: UserId, mood: Option<Mood>) -> Result<u64, Self::Error> {
        self.mood_count(user, mood)
    }

    fn get_sobriety(
        &self,
        user: UserId,
        sobriety: SobrietyId,
    ) -> Result<Option<Sobriety>, Self::Error> {
        self.owned_sobriety(user, sobriety)
    }

    fn sobrieties(&self, user: UserId) -> Result<Vec<Sobriety>, Self::Error> {
        self.sobriety_list(user)
    }

    fn get_achievement(
        &self,
        achievement: AchievementId,
    ) -> Result<Option<AchievementDefinition>, Self::Error> {
        self.achievement(achievement)
    }

    fn achievements_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<AchievementDefinition>, Self::Error> {
        self.list_achievements(user)
    }

    fn get_user_state(
        &self,
        user: UserId,
        achievement: AchievementId,
    ) -> Result<Option<UserAchievementState>, Self::Error> {
        let state = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM user_achievements WHERE user_id = ?1 AND achievement_id = ?2",
                    STATE_COLUMNS
                ),
                params![user.value(), achievement.value()],
                state_from_row,
            )
            .optional()?;
        Ok(state)
    }

    fn insert_user_state_if_absent(
        &mut self,
        state: &UserAchievementState,
    ) -> Result<UserAchievementState, Self::Error> {
        self.conn.execute(
            "INSERT OR IGNORE INTO user_achievements
             (user_id, achievement_id, current_value, target_value, is_completed, completed_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                state.user_id.value(),
                state.achievement_id.value(),
                state.current_value,
                state.target_value,
                state.is_completed,
                state.completed_at,
                state.updated_at,
            ],
        )?;

        self.get_user_state(state.user_id, state.achievement_id)?
            .ok_or_else(|| StoreError::not_found("achievement state", state.achievement_id))
    }

    fn save_user_state(&mut self, state: &UserAchievementState) -> Result<bool, Self::Error> {
        let changed = write_state(
            &self.conn,
            state,
            "WHERE user_achievements.is_completed = 0",
        )?;
        Ok(changed > 0)
    }

    fn reset_user_state(&mut self, state: &UserAchievementState) -> Result<(), Self::Error> {
        write_state(&self.conn, state, "")?;
        Ok(())
    }
}

/// Upsert a progress row; `guard` restricts which existing rows get updated
fn write_state(
    conn: &Connection,
    state: &UserAchievementState,
    guard: &str,
) -> Result<usize, StoreError> {
    let sql = format!(
        "INSERT INTO user_achievements
         (user_id, achievement_id, current_value, target_value, is_completed, completed_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (user_id, achievement_id) DO UPDATE SET
         current_value = excluded.current_value,
         target_value = excluded.target_value,
         is_completed = excluded.is_completed,
         completed_at = excluded.completed_at,
         updated_at = excluded.updated_at
         {guard}"
    );
    Ok(conn.execute(
        &sql,
        params![
            state.user_id.value(),
            state.achievement_id.value(),
            state.current_value,
            state.target_value,
            state.is_completed,
            state.completed_at,
            state.updated_at,
        ],
    )?)
}
