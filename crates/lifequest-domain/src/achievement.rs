//! Achievement definitions and per-user progress

use crate::condition::{get_target_value, Condition, ConditionConfig};
use crate::{AchievementId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named unlock condition, global or authored by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    /// Unique identifier
    pub id: AchievementId,

    /// Display name
    pub name: String,

    /// Display description
    pub description: String,

    /// Difficulty name; cosmetic, used for ordering only
    pub difficulty: String,

    /// Parsed condition
    pub condition: Condition,

    /// Raw parameters, kept for target extraction
    pub config: ConditionConfig,

    /// Hidden until unlocked
    pub is_hidden: bool,

    /// Author; `None` for global definitions
    pub owner: Option<UserId>,

    /// When the definition was created
    pub created_at: DateTime<Utc>,
}

impl AchievementDefinition {
    /// Stored `condition_type`
    pub fn condition_type(&self) -> &str {
        self.condition.condition_type()
    }

    /// Whether only an explicit unlock can complete it
    pub fn is_manual(&self) -> bool {
        self.condition.is_manual()
    }

    /// Target read from the config
    pub fn target_value(&self) -> i64 {
        get_target_value(&self.config)
    }

    /// Global definitions apply to everyone; owned ones to their author only
    pub fn applies_to(&self, user: UserId) -> bool {
        self.owner.map_or(true, |owner| owner == user)
    }
}

/// Fields of a definition before it has an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAchievement {
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Difficulty name
    pub difficulty: String,
    /// Parsed condition
    pub condition: Condition,
    /// Raw parameters
    pub config: ConditionConfig,
    /// Hidden until unlocked
    pub is_hidden: bool,
    /// Author; `None` for global definitions
    pub owner: Option<UserId>,
}

/// Progress of one user on one achievement
///
/// Exactly one per (user, achievement). `is_completed` only ever goes from
/// false to true, except when the definition is edited and resynced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievementState {
    /// User being tracked
    pub user_id: UserId,

    /// Achievement being tracked
    pub achievement_id: AchievementId,

    /// Last evaluated progress
    pub current_value: i64,

    /// Progress needed to complete
    pub target_value: i64,

    /// Whether the achievement is unlocked
    pub is_completed: bool,

    /// When it was unlocked
    pub completed_at: Option<DateTime<Utc>>,

    /// Last time the row changed
    pub updated_at: DateTime<Utc>,
}

impl UserAchievementState {
    /// Fresh, unstarted state
    pub fn new(
        user_id: UserId,
        achievement_id: AchievementId,
        target_value: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            achievement_id,
            current_value: 0,
            target_value,
            is_completed: false,
            completed_at: None,
            updated_at: now,
        }
    }

    /// Record evaluated progress, completing when the target is reached
    ///
    /// Returns true if this call completed the achievement. A completed state is
    /// left untouched.
    pub fn record_progress(&mut self, value: i64, now: DateTime<Utc>) -> bool {
        if self.is_completed {
            return false;
        }

        self.current_value = value;
        self.updated_at = now;

        if self.current_value >= self.target_value {
            self.complete(now);
            return true;
        }
        false
    }

    /// Mark as unlocked
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Reopen with a new target (definition edit)
    pub fn reset(&mut self, target_value: i64, now: DateTime<Utc>) {
        self.target_value = target_value;
        self.is_completed = false;
        self.completed_at = None;
        self.updated_at = now;
    }

    /// Progress as a percentage, 0-100
    ///
    /// A zero target yields 0.
    pub fn progress_percent(&self) -> u8 {
        if self.target_value == 0 {
            return 0;
        }
        let ratio = self.current_value as f64 / self.target_value as f64;
        (ratio * 100.0).clamp(0.0, 100.0) as u8
    }
}
