//! Identifier types for stored entities

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw row id
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

row_id!(
    /// Identifier of a user (the aggregate root)
    UserId
);
row_id!(
    /// Identifier of a habit
    HabitId
);
row_id!(
    /// Identifier of a per-day habit record
    HabitDayId
);
row_id!(
    /// Identifier of a goal
    GoalId
);
row_id!(
    /// Identifier of a todo task
    TodoId
);
row_id!(
    /// Identifier of a todo category
    CategoryId
);
row_id!(
    /// Identifier of a mood log entry
    MoodEntryId
);
row_id!(
    /// Identifier of a sobriety streak
    SobrietyId
);
row_id!(
    /// Identifier of a note
    NoteId
);
row_id!(
    /// Identifier of a challenge definition
    ChallengeId
);
row_id!(
    /// Identifier of a challenge assigned to a user
    UserChallengeId
);
row_id!(
    /// Identifier of an achievement definition
    AchievementId
);
