//! User aggregate - owner of cumulative XP and the cached level

use crate::level::calculate_level;
use crate::xp::XpError;
use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked user
///
/// `current_level` is a cache of `calculate_level(total_xp)` and is recomputed
/// on every award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Sum of every ledger entry for this user
    pub total_xp: i64,

    /// Level derived from `total_xp`
    pub current_level: u32,

    /// Personal scaling factor applied last in the XP formula
    pub xp_multiplier: f64,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// Last time the user row changed
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh user with no XP
    pub fn new(id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            total_xp: 0,
            current_level: 1,
            xp_multiplier: crate::xp::DEFAULT_XP_MULTIPLIER,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add `xp` to the running total and recompute the level
    ///
    /// On overflow the user is left untouched.
    pub fn apply_xp(
        &mut self,
        xp: i64,
        base_level_xp: i64,
        now: DateTime<Utc>,
    ) -> Result<(), XpError> {
        self.total_xp = self.total_xp.checked_add(xp).ok_or(XpError::TotalOverflow {
            total: self.total_xp,
            xp,
        })?;
        self.current_level = calculate_level(self.total_xp, base_level_xp);
        self.updated_at = now;
        Ok(())
    }

    /// Whether the cached level agrees with the curve
    pub fn level_is_consistent(&self, base_level_xp: i64) -> bool {
        self.current_level == calculate_level(self.total_xp, base_level_xp)
    }
}
