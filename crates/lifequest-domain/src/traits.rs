//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and persistence.
//! Implementations live in other crates (lifequest-store).

use crate::{
    AchievementDefinition, AchievementId, AwardOutcome, CategoryId, Habit, HabitDay, HabitId, Mood,
    Period, Sobriety, SobrietyId, User, UserAchievementState, UserId, XpLedgerEntry, XpSource,
};

/// Read access to user activity plus achievement state persistence
///
/// Every activity query is scoped to one user: a habit or sobriety streak
/// owned by someone else behaves as if it did not exist.
///
/// Implemented by the infrastructure layer (lifequest-store)
pub trait AchievementStore {
    /// Error type for store operations
    type Error;

    /// Get a user by ID
    fn get_user(&self, user: UserId) -> Result<Option<User>, Self::Error>;

    /// Completed habit day records, for one habit or all of the user's habits
    fn count_completed_habit_days(
        &self,
        user: UserId,
        habit: Option<HabitId>,
    ) -> Result<u64, Self::Error>;

    /// One habit, if it exists and belongs to the user
    fn owned_habit(&self, user: UserId, habit: HabitId) -> Result<Option<Habit>, Self::Error>;

    /// All day records of one habit, oldest first
    fn habit_days(&self, user: UserId, habit: HabitId) -> Result<Vec<HabitDay>, Self::Error>;

    /// The user's active habits
    fn active_habits(&self, user: UserId) -> Result<Vec<Habit>, Self::Error>;

    /// Completed goals, optionally of one period
    fn count_completed_goals(
        &self,
        user: UserId,
        period: Option<Period>,
    ) -> Result<u64, Self::Error>;

    /// Completed todos, optionally of one category
    fn count_completed_todos(
        &self,
        user: UserId,
        category: Option<CategoryId>,
    ) -> Result<u64, Self::Error>;

    /// Completed challenge assignments, optionally of one period
    fn count_completed_challenges(
        &self,
        user: UserId,
        period: Option<Period>,
    ) -> Result<u64, Self::Error>;

    /// Notes written
    fn count_notes(&self, user: UserId) -> Result<u64, Self::Error>;

    /// Mood entries, optionally of one mood value
    fn count_mood_entries(&self, user: UserId, mood: Option<Mood>) -> Result<u64, Self::Error>;

    /// One sobriety streak
    fn get_sobriety(
        &self,
        user: UserId,
        sobriety: SobrietyId,
    ) -> Result<Option<Sobriety>, Self::Error>;

    /// Every sobriety streak of the user
    fn sobrieties(&self, user: UserId) -> Result<Vec<Sobriety>, Self::Error>;

    /// Get an achievement definition by ID
    fn get_achievement(
        &self,
        achievement: AchievementId,
    ) -> Result<Option<AchievementDefinition>, Self::Error>;

    /// Global definitions plus the ones authored by `user`
    fn achievements_for_user(&self, user: UserId)
        -> Result<Vec<AchievementDefinition>, Self::Error>;

    /// Get the progress row for (user, achievement)
    fn get_user_state(
        &self,
        user: UserId,
        achievement: AchievementId,
    ) -> Result<Option<UserAchievementState>, Self::Error>;

    /// Insert `state` unless a row for (user, achievement) exists; return the stored row
    fn insert_user_state_if_absent(
        &mut self,
        state: &UserAchievementState,
    ) -> Result<UserAchievementState, Self::Error>;

    /// Write progress unless the stored row is already completed
    ///
    /// Returns `false` when a completed row blocked the write. Completion is
    /// monotonic, so a stale open snapshot can never clear it.
    fn save_user_state(&mut self, state: &UserAchievementState) -> Result<bool, Self::Error>;

    /// Overwrite the progress row unconditionally; only for reopening after an edit
    fn reset_user_state(&mut self, state: &UserAchievementState) -> Result<(), Self::Error>;
}

/// The XP award protocol
///
/// Implemented by the infrastructure layer (lifequest-store)
pub trait XpLedger {
    /// Error type for ledger operations
    type Error;

    /// Append a ledger entry, add `xp` to the user's total and recompute the level
    ///
    /// All or nothing: on error neither the ledger nor the user changes.
    fn award_xp(
        &mut self,
        user: UserId,
        xp: i64,
        source: XpSource,
        source_id: Option<i64>,
    ) -> Result<AwardOutcome, Self::Error>;

    /// The user's ledger, oldest first
    fn ledger_entries(&self, user: UserId) -> Result<Vec<XpLedgerEntry>, Self::Error>;
}
