//! XP ledger types
//!
//! The ledger is append-only and is the source of truth for a user's XP: the
//! cached `User::total_xp` is a running fold over it.

use crate::{UserId, XpSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a ledger entry based on UUIDv7
///
/// UUIDv7 keeps entries sortable by creation time without a sequence column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u128);

impl EntryId {
    /// Generate a new UUIDv7-based EntryId
    ///
    /// # Examples
    ///
    /// ```
    /// use lifequest_domain::EntryId;
    ///
    /// let id = EntryId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an EntryId from a raw u128 value (storage deserialization)
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an EntryId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for EntryId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EntryId::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// One immutable XP grant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpLedgerEntry {
    /// Unique identifier
    pub id: EntryId,

    /// Owning user
    pub user_id: UserId,

    /// Module tag that produced the grant
    pub source: XpSource,

    /// Opaque reference to the originating entity
    pub source_id: Option<i64>,

    /// Amount granted (normally positive, zero allowed)
    pub xp: i64,

    /// When the grant was committed
    pub created_at: DateTime<Utc>,
}

/// Result of committing an award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardOutcome {
    /// XP added by this award
    pub xp_gained: i64,

    /// User total after the award
    pub total_xp: i64,

    /// User level after the award
    pub current_level: u32,
}

/// Result of an XP-producing completion flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    /// XP added by this call (0 when already rewarded)
    pub xp_gained: i64,

    /// The entity had already been rewarded before this call
    pub already_completed: bool,

    /// User total after the call
    pub total_xp: i64,

    /// User level after the call
    pub current_level: u32,
}

impl CompletionOutcome {
    /// Outcome for a call that awarded XP
    pub fn awarded(award: AwardOutcome) -> Self {
        Self {
            xp_gained: award.xp_gained,
            already_completed: false,
            total_xp: award.total_xp,
            current_level: award.current_level,
        }
    }

    /// Outcome for a call that found the entity already rewarded
    pub fn already_awarded(total_xp: i64, current_level: u32) -> Self {
        Self {
            xp_gained: 0,
            already_completed: true,
            total_xp,
            current_level,
        }
    }
}

/// Sum of ledger amounts; must equal the owner's `total_xp`
pub fn ledger_sum<'a>(entries: impl IntoIterator<Item = &'a XpLedgerEntry>) -> i64 {
    entries.into_iter().map(|e| e.xp).sum()
}
