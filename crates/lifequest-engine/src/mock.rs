//! In-memory store for unit tests

use chrono::{DateTime, NaiveDate, Utc};
use lifequest_domain::traits::AchievementStore;
use lifequest_domain::{
    AchievementDefinition, AchievementId, CategoryId, Condition, ConditionConfig, Habit, HabitDay,
    HabitDayId, HabitDayStatus, HabitId, Mood, Period, Sobriety, SobrietyId, User,
    UserAchievementState, UserId,
};

pub(crate) struct MockStore {
    pub users: Vec<User>,
    pub habits: Vec<Habit>,
    pub days: Vec<HabitDay>,
    pub goals: Vec<Period>,
    pub todos: Vec<Option<CategoryId>>,
    pub challenges: Vec<Period>,
    pub notes: u64,
    pub moods: Vec<Mood>,
    pub sobrieties: Vec<Sobriety>,
    pub achievements: Vec<AchievementDefinition>,
    pub states: Vec<UserAchievementState>,
}

impl MockStore {
    pub const USER: UserId = UserId(1);

    pub fn new() -> Self {
        Self {
            users: vec![User::new(Self::USER, Utc::now())],
            habits: Vec::new(),
            days: Vec::new(),
            goals: Vec::new(),
            todos: Vec::new(),
            challenges: Vec::new(),
            notes: 0,
            moods: Vec::new(),
            sobrieties: Vec::new(),
            achievements: Vec::new(),
            states: Vec::new(),
        }
    }

    pub fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    /// Add a global definition whose config holds only `target`
    pub fn define(&mut self, name: &str, condition: Condition, target: i64) -> AchievementDefinition {
        let mut config = ConditionConfig::new();
        config.insert("target".to_string(), target.into());
        let def = AchievementDefinition {
            id: AchievementId(self.achievements.len() as i64 + 1),
            name: name.to_string(),
            description: String::new(),
            difficulty: "easy".to_string(),
            condition,
            config,
            is_hidden: false,
            owner: None,
            created_at: Utc::now(),
        };
        self.achievements.push(def.clone());
        def
    }

    /// Record a day for a habit of [`Self::USER`], creating the habit on first use
    pub fn add_day(&mut self, habit: HabitId, date: NaiveDate, status: HabitDayStatus) {
        if !self.habits.iter().any(|h| h.id == habit) {
            self.habits.push(Habit {
                id: habit,
                user_id: Self::USER,
                title: format!("habit {}", habit),
                difficulty: "easy".to_string(),
                is_active: true,
                created_at: Utc::now(),
            });
        }
        self.days.push(HabitDay {
            id: HabitDayId(self.days.len() as i64 + 1),
            habit_id: habit,
            date,
            status,
            xp_awarded: status == HabitDayStatus::Completed,
        });
    }

    pub fn add_sobriety(&mut self, started_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>) -> SobrietyId {
        let id = SobrietyId(self.sobrieties.len() as i64 + 1);
        self.sobrieties.push(Sobriety {
            id,
            user_id: Self::USER,
            name: format!("streak {}", id),
            started_at,
            ended_at,
            is_active: ended_at.is_none(),
        });
        id
    }

    fn owns_habit(&self, user: UserId, habit: HabitId) -> bool {
        self.habits.iter().any(|h| h.id == habit && h.user_id == user)
    }
}

impl AchievementStore for MockStore {
    type Error = String;

    fn get_user(&self, user: UserId) -> Result<Option<User>, Self::Error> {
        Ok(self.users.iter().find(|u| u.id == user).cloned())
    }

    fn count_completed_habit_days(&self, user: UserId, habit: Option<HabitId>) -> Result<u64, Self::Error> {
        Ok(self
            .days
            .iter()
            .filter(|d| d.is_completed() && self.owns_habit(user, d.habit_id))
            .filter(|d| habit.map_or(true, |h| d.habit_id == h))
            .count() as u64)
    }

    fn owned_habit(&self, user: UserId, habit: HabitId) -> Result<Option<Habit>, Self::Error> {
        Ok(self
            .habits
            .iter()
            .find(|h| h.id == habit && h.user_id == user)
            .cloned())
    }

    fn habit_days(&self, user: UserId, habit: HabitId) -> Result<Vec<HabitDay>, Self::Error> {
        if !self.owns_habit(user, habit) {
            return Ok(Vec::new());
        }
        let mut days: Vec<HabitDay> = self.days.iter().filter(|d| d.habit_id == habit).cloned().collect();
        days.sort_by_key(|d| d.date);
        Ok(days)
    }

    fn active_habits(&self, user: UserId) -> Result<Vec<Habit>, Self::Error> {
        Ok(self
            .habits
            .iter()
            .filter(|h| h.user_id == user && h.is_active)
            .cloned()
            .collect())
    }

    fn count_completed_goals(&self, _user: UserId, period: Option<Period>) -> Result<u64, Self::Error> {
        Ok(self.goals.iter().filter(|p| period.map_or(true, |want| **p == want)).count() as u64)
    }

    fn count_completed_todos(&self, _user: UserId, category: Option<CategoryId>) -> Result<u64, Self::Error> {
        Ok(self
            .todos
            .iter()
            .filter(|c| category.is_none() || **c == category)
            .count() as u64)
    }

    fn count_completed_challenges(&self, _user: UserId, period: Option<Period>) -> Result<u64, Self::Error> {
        Ok(self
            .challenges
            .iter()
            .filter(|p| period.map_or(true, |want| **p == want))
            .count() as u64)
    }

    fn count_notes(&self, _user: UserId) -> Result<u64, Self::Error> {
        Ok(self.notes)
    }

    fn count_mood_entries(&self, _user: UserId, mood: Option<Mood>) -> Result<u64, Self::Error> {
        Ok(self.moods.iter().filter(|m| mood.map_or(true, |want| **m == want)).count() as u64)
    }

    fn get_sobriety(&self, user: UserId, sobriety: SobrietyId) -> Result<Option<Sobriety>, Self::Error> {
        Ok(self
            .sobrieties
            .iter()
            .find(|s| s.id == sobriety && s.user_id == user)
            .cloned())
    }

    fn sobrieties(&self, user: UserId) -> Result<Vec<Sobriety>, Self::Error> {
        Ok(self.sobrieties.iter().filter(|s| s.user_id == user).cloned().collect())
    }

    fn get_achievement(&self, achievement: AchievementId) -> Result<Option<AchievementDefinition>, Self::Error> {
        Ok(self.achievements.iter().find(|a| a.id == achievement).cloned())
    }

    fn achievements_for_user(&self, user: UserId) -> Result<Vec<AchievementDefinition>, Self::Error> {
        Ok(self
            .achievements
            .iter()
            .filter(|a| a.applies_to(user))
            .cloned()
            .collect())
    }

    fn get_user_state(
        &self,
        user: UserId,
        achievement: AchievementId,
    ) -> Result<Option<UserAchievementState>, Self::Error> {
        Ok(self
            .states
            .iter()
            .find(|s| s.user_id == user && s.achievement_id == achievement)
            .cloned())
    }

    fn insert_user_state_if_absent(
        &mut self,
        state: &UserAchievementState,
    ) -> Result<UserAchievementState, Self::Error> {
        if let Some(existing) = self.get_user_state(state.user_id, state.achievement_id)? {
            return Ok(existing);
        }
        self.states.push(state.clone());
        Ok(state.clone())
    }

    fn save_user_state(&mut self, state: &UserAchievementState) -> Result<bool, Self::Error> {
        match self
            .states
            .iter_mut()
            .find(|s| s.user_id == state.user_id && s.achievement_id == state.achievement_id)
        {
            Some(existing) if existing.is_completed => return Ok(false),
            Some(existing) => *existing = state.clone(),
            None => self.states.push(state.clone()),
        }
        Ok(true)
    }

    fn reset_user_state(&mut self, state: &UserAchievementState) -> Result<(), Self::Error> {
        self.states
            .retain(|s| !(s.user_id == state.user_id && s.achievement_id == state.achievement_id));
        self.states.push(state.clone());
        Ok(())
    }
}
