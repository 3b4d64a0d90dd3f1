//! Lifequest Domain Layer
//!
//! This crate contains the core rules and domain model for Lifequest. It has
//! no I/O: storage and presentation live in other crates and reach this one
//! through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **XP**: the single currency, computed only by [`calculate_xp`]
//! - **Level**: derived from cumulative XP under a triangular curve
//! - **Ledger**: append-only log of XP grants, source of truth for a user's total
//! - **Achievement**: a named condition evaluated against user activity
//! - **Condition**: one of a fixed set of kinds with typed parameters
//!
//! ## Architecture
//!
//! - Pure functions and value types only
//! - Static XP tables arrive as [`XpRules`], owned by the caller's config layer
//! - Every operation takes an explicit [`UserId`]; there is no current user

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod achievement;
pub mod activity;
pub mod condition;
pub mod difficulty;
pub mod ids;
pub mod ledger;
pub mod level;
pub mod module;
pub mod streak;
pub mod traits;
pub mod user;
pub mod xp;

// Re-exports for convenience
pub use achievement::{AchievementDefinition, NewAchievement, UserAchievementState};
pub use activity::{
    ChallengeDefinition, DurationUnit, Goal, Habit, HabitDay, HabitDayStatus, Mood, MoodEntry,
    Note, Sobriety, TodoCategory, TodoTask, UserChallenge,
};
pub use condition::{get_target_value, Condition, ConditionConfig, ConditionKind};
pub use difficulty::Difficulty;
pub use ids::{
    AchievementId, CategoryId, ChallengeId, GoalId, HabitDayId, HabitId, MoodEntryId, NoteId,
    SobrietyId, TodoId, UserChallengeId, UserId,
};
pub use ledger::{AwardOutcome, CompletionOutcome, EntryId, XpLedgerEntry};
pub use level::{calculate_level, level_progress, LevelProgress};
pub use module::{Module, Period, XpSource};
pub use streak::longest_streak;
pub use user::User;
pub use xp::{calculate_xp, XpError, XpRules, BASE_LEVEL_XP};
