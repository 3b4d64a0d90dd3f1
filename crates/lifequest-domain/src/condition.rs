//! Achievement conditions
//!
//! A definition stores its condition as a kind name plus a JSON key/value bag
//! ([`ConditionConfig`]). The bag is parsed once into the typed [`Condition`];
//! evaluation dispatches on the variant and never inspects string keys.
//!
//! Parsing here is lenient: stored rows written before a rule existed must
//! still load. Parameters that are missing or malformed become `None` and the
//! condition evaluates to 0. Strict checking happens when a definition is
//! authored (see the gatekeeper crate).

use crate::{CategoryId, DurationUnit, HabitId, Mood, Period, SobrietyId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw key/value parameters of a condition
pub type ConditionConfig = serde_json::Map<String, Value>;

/// Keys checked, in order, when a config has no `target`
///
/// Frozen legacy behaviour. New definitions should always carry `target`.
pub const LEGACY_TARGET_KEYS: [&str; 6] = ["days", "count", "xp", "level", "streak", "value"];

/// Target used when a config has none that parses
pub const DEFAULT_TARGET: i64 = 1;

/// Known condition kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Completed days of one habit
    HabitDays,
    /// Completed days across all habits
    AnyHabitDays,
    /// Longest run of one habit
    HabitStreak,
    /// Longest run across active habits
    AnyHabitStreak,
    /// Completed goals
    GoalCompleted,
    /// Completed goals of one period
    GoalCompletedByPeriod,
    /// Completed todos, optionally per category
    TodoCompleted,
    /// Notes written
    NotesCount,
    /// Mood entries logged
    MoodLoggedDays,
    /// Mood entries with one mood value
    SpecificMoodCount,
    /// Duration of one sobriety streak
    SobrietyDuration,
    /// Longest duration across sobriety streaks
    AnySobrietyDuration,
    /// Current level
    LevelReached,
    /// Total XP
    XpReached,
    /// Completed challenges, optionally per period
    ChallengeCompleted,
    /// Unlocked by hand only
    Manual,
}

impl ConditionKind {
    /// Every kind, in catalog order
    pub const ALL: [ConditionKind; 16] = [
        ConditionKind::HabitDays,
        ConditionKind::AnyHabitDays,
        ConditionKind::HabitStreak,
        ConditionKind::AnyHabitStreak,
        ConditionKind::GoalCompleted,
        ConditionKind::GoalCompletedByPeriod,
        ConditionKind::TodoCompleted,
        ConditionKind::NotesCount,
        ConditionKind::MoodLoggedDays,
        ConditionKind::SpecificMoodCount,
        ConditionKind::SobrietyDuration,
        ConditionKind::AnySobrietyDuration,
        ConditionKind::LevelReached,
        ConditionKind::XpReached,
        ConditionKind::ChallengeCompleted,
        ConditionKind::Manual,
    ];

    /// Get the stored `condition_type` name
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::HabitDays => "habit_days",
            ConditionKind::AnyHabitDays => "any_habit_days",
            ConditionKind::HabitStreak => "habit_streak",
            ConditionKind::AnyHabitStreak => "any_habit_streak",
            ConditionKind::GoalCompleted => "goal_completed",
            ConditionKind::GoalCompletedByPeriod => "goal_completed_by_period",
            ConditionKind::TodoCompleted => "todo_completed",
            ConditionKind::NotesCount => "notes_count",
            ConditionKind::MoodLoggedDays => "mood_logged_days",
            ConditionKind::SpecificMoodCount => "specific_mood_count",
            ConditionKind::SobrietyDuration => "sobriety_duration",
            ConditionKind::AnySobrietyDuration => "any_sobriety_duration",
            ConditionKind::LevelReached => "level_reached",
            ConditionKind::XpReached => "xp_reached",
            ConditionKind::ChallengeCompleted => "challenge_completed",
            ConditionKind::Manual => "manual",
        }
    }

    /// Parse a stored `condition_type` name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ConditionKind::HabitDays => "X days of specific habit",
            ConditionKind::AnyHabitDays => "X days of any habit",
            ConditionKind::HabitStreak => "X day streak of specific habit",
            ConditionKind::AnyHabitStreak => "X day streak of any habit",
            ConditionKind::GoalCompleted => "X completed goals",
            ConditionKind::GoalCompletedByPeriod => "X completed goals by period",
            ConditionKind::TodoCompleted => "X completed todos",
            ConditionKind::NotesCount => "Create X notes",
            ConditionKind::MoodLoggedDays => "Log mood X days",
            ConditionKind::SpecificMoodCount => "Log specific mood X times",
            ConditionKind::SobrietyDuration => "X duration of specific sobriety",
            ConditionKind::AnySobrietyDuration => "X duration of any sobriety",
            ConditionKind::LevelReached => "Reach level",
            ConditionKind::XpReached => "Reach XP",
            ConditionKind::ChallengeCompleted => "X completed challenges",
            ConditionKind::Manual => "Manual unlock",
        }
    }

    /// Whether the kind is scored against a numeric target
    pub fn has_target(&self) -> bool {
        !matches!(self, ConditionKind::Manual)
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConditionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown condition type: {}", s))
    }
}

/// A parsed condition with typed parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Completed days of one habit
    HabitDays {
        /// Habit to count; `None` evaluates to 0
        habit_id: Option<HabitId>,
    },
    /// Completed days across all habits
    AnyHabitDays,
    /// Longest run of one habit
    HabitStreak {
        /// Habit to walk; `None` evaluates to 0
        habit_id: Option<HabitId>,
    },
    /// Longest run across active habits
    AnyHabitStreak,
    /// Completed goals
    GoalCompleted,
    /// Completed goals with a given period
    GoalCompletedByPeriod {
        /// Period to match; `None` evaluates to 0
        period: Option<Period>,
    },
    /// Completed todos
    TodoCompleted {
        /// Restrict to one category
        category_id: Option<CategoryId>,
    },
    /// Notes written
    NotesCount,
    /// Mood entries logged
    MoodLoggedDays,
    /// Entries with one mood value
    SpecificMoodCount {
        /// Mood to match; `None` evaluates to 0
        mood: Option<Mood>,
    },
    /// Duration of one sobriety streak
    SobrietyDuration {
        /// Streak to measure; `None` evaluates to 0
        sobriety_id: Option<SobrietyId>,
        /// Unit of the result; `None` (unrecognised unit) evaluates to 0
        unit: Option<DurationUnit>,
    },
    /// Longest duration across all streaks
    AnySobrietyDuration {
        /// Unit of the result; `None` (unrecognised unit) evaluates to 0
        unit: Option<DurationUnit>,
    },
    /// Current level
    LevelReached,
    /// Total XP
    XpReached,
    /// Completed challenges
    ChallengeCompleted {
        /// Restrict to one cadence
        period: Option<Period>,
    },
    /// Unlocked by hand only
    Manual,
    /// A kind this build does not know; always evaluates to 0
    Unknown {
        /// Stored `condition_type`
        condition_type: String,
    },
}

impl Condition {
    /// Build a condition from a stored kind name and config bag
    ///
    /// Never fails. Unknown kinds are kept as [`Condition::Unknown`].
    pub fn from_parts(condition_type: &str, config: &ConditionConfig) -> Self {
        let Some(kind) = ConditionKind::parse(condition_type) else {
            return Condition::Unknown {
                condition_type: condition_type.to_string(),
            };
        };

        match kind {
            ConditionKind::HabitDays => Condition::HabitDays {
                habit_id: config_int(config, "habit_id").map(HabitId),
            },
            ConditionKind::AnyHabitDays => Condition::AnyHabitDays,
            ConditionKind::HabitStreak => Condition::HabitStreak {
                habit_id: config_int(config, "habit_id").map(HabitId),
            },
            ConditionKind::AnyHabitStreak => Condition::AnyHabitStreak,
            ConditionKind::GoalCompleted => Condition::GoalCompleted,
            ConditionKind::GoalCompletedByPeriod => Condition::GoalCompletedByPeriod {
                period: config_str(config, "period").and_then(Period::parse),
            },
            ConditionKind::TodoCompleted => Condition::TodoCompleted {
                category_id: config_int(config, "category_id").map(CategoryId),
            },
            ConditionKind::NotesCount => Condition::NotesCount,
            ConditionKind::MoodLoggedDays => Condition::MoodLoggedDays,
            ConditionKind::SpecificMoodCount => Condition::SpecificMoodCount {
                mood: config_str(config, "mood").and_then(Mood::parse),
            },
            ConditionKind::SobrietyDuration => Condition::SobrietyDuration {
                sobriety_id: config_int(config, "sobriety_id").map(SobrietyId),
                unit: duration_unit(config),
            },
            ConditionKind::AnySobrietyDuration => Condition::AnySobrietyDuration {
                unit: duration_unit(config),
            },
            ConditionKind::LevelReached => Condition::LevelReached,
            ConditionKind::XpReached => Condition::XpReached,
            ConditionKind::ChallengeCompleted => Condition::ChallengeCompleted {
                period: config_str(config, "period").and_then(Period::parse),
            },
            ConditionKind::Manual => Condition::Manual,
        }
    }

    /// The known kind, or `None` for [`Condition::Unknown`]
    pub fn kind(&self) -> Option<ConditionKind> {
        let kind = match self {
            Condition::HabitDays { .. } => ConditionKind::HabitDays,
            Condition::AnyHabitDays => ConditionKind::AnyHabitDays,
            Condition::HabitStreak { .. } => ConditionKind::HabitStreak,
            Condition::AnyHabitStreak => ConditionKind::AnyHabitStreak,
            Condition::GoalCompleted => ConditionKind::GoalCompleted,
            Condition::GoalCompletedByPeriod { .. } => ConditionKind::GoalCompletedByPeriod,
            Condition::TodoCompleted { .. } => ConditionKind::TodoCompleted,
            Condition::NotesCount => ConditionKind::NotesCount,
            Condition::MoodLoggedDays => ConditionKind::MoodLoggedDays,
            Condition::SpecificMoodCount { .. } => ConditionKind::SpecificMoodCount,
            Condition::SobrietyDuration { .. } => ConditionKind::SobrietyDuration,
            Condition::AnySobrietyDuration { .. } => ConditionKind::AnySobrietyDuration,
            Condition::LevelReached => ConditionKind::LevelReached,
            Condition::XpReached => ConditionKind::XpReached,
            Condition::ChallengeCompleted { .. } => ConditionKind::ChallengeCompleted,
            Condition::Manual => ConditionKind::Manual,
            Condition::Unknown { .. } => return None,
        };
        Some(kind)
    }

    /// Stored `condition_type` name
    pub fn condition_type(&self) -> &str {
        match self {
            Condition::Unknown { condition_type } => condition_type,
            other => other.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Whether this is the hand-unlocked kind
    pub fn is_manual(&self) -> bool {
        matches!(self, Condition::Manual)
    }
}

/// Read the numeric target of a condition config
///
/// Reads `target`; if absent, the first present key of [`LEGACY_TARGET_KEYS`].
/// The first key found decides: if its value does not read as an integer the
/// result is [`DEFAULT_TARGET`], as it is when no key is present.
///
/// # Examples
///
/// ```
/// use lifequest_domain::{get_target_value, ConditionConfig};
/// use serde_json::json;
///
/// let config: ConditionConfig = json!({"target": 5, "habit_id": 7})
///     .as_object()
///     .cloned()
///     .unwrap();
/// assert_eq!(get_target_value(&config), 5);
///
/// let legacy: ConditionConfig = json!({"days": "30"}).as_object().cloned().unwrap();
/// assert_eq!(get_target_value(&legacy), 30);
///
/// assert_eq!(get_target_value(&ConditionConfig::new()), 1);
/// ```
pub fn get_target_value(config: &ConditionConfig) -> i64 {
    std::iter::once("target")
        .chain(LEGACY_TARGET_KEYS)
        .find_map(|key| config.get(key))
        .map(|value| value_as_int(value).unwrap_or(DEFAULT_TARGET))
        .unwrap_or(DEFAULT_TARGET)
}

/// Read a JSON value as an integer
///
/// Accepts integers, finite floats (truncated toward zero) and strings holding
/// an integer, surrounding whitespace allowed.
pub fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Integer parameter by key
pub fn config_int(config: &ConditionConfig, key: &str) -> Option<i64> {
    config.get(key).and_then(value_as_int)
}

/// String parameter by key
pub fn config_str<'a>(config: &'a ConditionConfig, key: &str) -> Option<&'a str> {
    config.get(key).and_then(Value::as_str)
}

fn duration_unit(config: &ConditionConfig) -> Option<DurationUnit> {
    match config.get("unit") {
        None | Some(Value::Null) => Some(DurationUnit::default()),
        Some(value) => value.as_str().and_then(DurationUnit::parse),
    }
}
