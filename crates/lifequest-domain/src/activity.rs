//! Activity records - the user data achievement conditions count over
//!
//! Every XP-producing record (habit day, goal, user challenge, todo, mood entry)
//! carries an `xp_awarded` flag. The flag is set in the same transaction as the
//! ledger append and never cleared, which makes completion idempotent.

use crate::{
    CategoryId, ChallengeId, GoalId, HabitDayId, HabitId, MoodEntryId, NoteId, Period, SobrietyId,
    TodoId, UserChallengeId, UserId,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A recurring habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier
    pub id: HabitId,
    /// Owning user
    pub user_id: UserId,
    /// Short title
    pub title: String,
    /// Difficulty name, looked up in the base XP table
    pub difficulty: String,
    /// Inactive habits are ignored by the any-habit streak
    pub is_active: bool,
    /// When the habit was created
    pub created_at: DateTime<Utc>,
}

/// Status of a habit on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitDayStatus {
    /// Done that day
    Completed,
    /// Deliberately skipped
    Skipped,
    /// Record exists but nothing was logged (e.g. toggled off)
    Empty,
}

impl HabitDayStatus {
    /// Get the stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitDayStatus::Completed => "completed",
            HabitDayStatus::Skipped => "skipped",
            HabitDayStatus::Empty => "empty",
        }
    }

    /// Parse a stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(HabitDayStatus::Completed),
            "skipped" => Some(HabitDayStatus::Skipped),
            "empty" => Some(HabitDayStatus::Empty),
            _ => None,
        }
    }
}

impl std::fmt::Display for HabitDayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-(habit, date) record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDay {
    /// Unique identifier
    pub id: HabitDayId,
    /// Habit this record belongs to
    pub habit_id: HabitId,
    /// Calendar day
    pub date: NaiveDate,
    /// What happened that day
    pub status: HabitDayStatus,
    /// XP was granted for this day; never reset
    pub xp_awarded: bool,
}

impl HabitDay {
    /// Whether the day counts toward progress
    pub fn is_completed(&self) -> bool {
        self.status == HabitDayStatus::Completed
    }
}

/// A goal with a weekly, monthly or yearly cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: GoalId,
    /// Owning user
    pub user_id: UserId,
    /// Short title
    pub title: String,
    /// Cadence; also selects the period multiplier
    pub period: Period,
    /// Difficulty name
    pub difficulty: String,
    /// Whether the goal was completed
    pub is_completed: bool,
    /// XP was granted for this goal
    pub xp_awarded: bool,
    /// When the goal was completed
    pub completed_at: Option<DateTime<Utc>>,
    /// When the goal was created
    pub created_at: DateTime<Utc>,
}

/// Grouping for todos that supplies a default difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoCategory {
    /// Unique identifier
    pub id: CategoryId,
    /// Category name
    pub name: String,
    /// Difficulty used when a task has none of its own
    pub difficulty: String,
}

/// A one-off task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoTask {
    /// Unique identifier
    pub id: TodoId,
    /// Owning user
    pub user_id: UserId,
    /// Task text
    pub content: String,
    /// Category of the task
    pub category_id: CategoryId,
    /// Overrides the category difficulty when set
    pub custom_difficulty: Option<String>,
    /// Whether the task was completed
    pub is_completed: bool,
    /// XP was granted for this task
    pub xp_awarded: bool,
    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl TodoTask {
    /// Difficulty used for XP: the task's own, else the category's
    pub fn effective_difficulty<'a>(&'a self, category: &'a TodoCategory) -> &'a str {
        self.custom_difficulty
            .as_deref()
            .unwrap_or(category.difficulty.as_str())
    }
}

/// Logged mood value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Great day
    Great,
    /// Good day
    Good,
    /// Neither good nor bad
    Neutral,
    /// Bad day
    Bad,
    /// Terrible day
    Terrible,
}

impl Mood {
    /// All moods, best first
    pub const ALL: [Mood; 5] = [Mood::Great, Mood::Good, Mood::Neutral, Mood::Bad, Mood::Terrible];

    /// Get the stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Neutral => "neutral",
            Mood::Bad => "bad",
            Mood::Terrible => "terrible",
        }
    }

    /// Parse a stored name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid mood: {}", s))
    }
}

/// One mood log; at most one per (user, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    /// Unique identifier
    pub id: MoodEntryId,
    /// Owning user
    pub user_id: UserId,
    /// Logged mood
    pub mood: Mood,
    /// Calendar day of the entry
    pub date: NaiveDate,
    /// Time of day the mood was logged
    pub time: NaiveTime,
    /// Free-form note
    pub note: String,
    /// XP was granted for this entry
    pub xp_awarded: bool,
}

impl MoodEntry {
    /// Difficulty used for XP: writing a note makes the entry worth more
    pub fn difficulty_for_note(note: &str) -> &'static str {
        if note.trim().is_empty() {
            "easy"
        } else {
            "medium"
        }
    }
}

/// Unit used to express a sobriety duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    /// 86400 seconds
    #[default]
    Days,
    /// 30 days
    Months,
    /// 365 days
    Years,
}

impl DurationUnit {
    /// Get the stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Days => "days",
            DurationUnit::Months => "months",
            DurationUnit::Years => "years",
        }
    }

    /// Parse a stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "days" => Some(DurationUnit::Days),
            "months" => Some(DurationUnit::Months),
            "years" => Some(DurationUnit::Years),
            _ => None,
        }
    }

    /// Length of one unit in seconds
    pub fn seconds(&self) -> i64 {
        const DAY: i64 = 86_400;
        match self {
            DurationUnit::Days => DAY,
            DurationUnit::Months => 30 * DAY,
            DurationUnit::Years => 365 * DAY,
        }
    }

    /// Whole units contained in `duration`; negative durations count as zero
    pub fn whole_units(&self, duration: chrono::Duration) -> u64 {
        let seconds = duration.num_seconds().max(0);
        (seconds / self.seconds()) as u64
    }
}

/// A sobriety streak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sobriety {
    /// Unique identifier
    pub id: SobrietyId,
    /// Owning user
    pub user_id: UserId,
    /// What the user stays away from
    pub name: String,
    /// Start of the current streak
    pub started_at: DateTime<Utc>,
    /// When the streak ended (relapse)
    pub ended_at: Option<DateTime<Utc>>,
    /// Streak is running
    pub is_active: bool,
}

impl Sobriety {
    /// Elapsed streak length
    ///
    /// Active streaks run to `now`; ended streaks stop at `ended_at`. An inactive
    /// streak without an end has no duration.
    pub fn current_duration(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        if self.is_active {
            return Some(now - self.started_at);
        }
        self.ended_at.map(|ended| ended - self.started_at)
    }

    /// Duration in whole `unit`s, 0 when there is none
    pub fn duration_in(&self, unit: DurationUnit, now: DateTime<Utc>) -> u64 {
        self.current_duration(now)
            .map(|d| unit.whole_units(d))
            .unwrap_or(0)
    }
}

/// A free-form note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Owning user
    pub user_id: UserId,
    /// Note text
    pub content: String,
    /// When the note was written
    pub created_at: DateTime<Utc>,
}

/// Catalog entry for a challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDefinition {
    /// Unique identifier
    pub id: ChallengeId,
    /// Unique title
    pub title: String,
    /// Difficulty name
    pub difficulty: String,
    /// Daily or weekly
    pub period: Period,
}

/// A challenge taken on by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserChallenge {
    /// Unique identifier
    pub id: UserChallengeId,
    /// Owning user
    pub user_id: UserId,
    /// Challenge taken on
    pub definition_id: ChallengeId,
    /// Day the challenge was assigned
    pub start_date: NaiveDate,
    /// Whether the challenge was completed
    pub is_completed: bool,
    /// XP was granted for this assignment
    pub xp_awarded: bool,
    /// When it was completed
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sobriety(is_active: bool, ended_at: Option<DateTime<Utc>>) -> Sobriety {
        Sobriety {
            id: SobrietyId(1),
            user_id: UserId(1),
            name: "coffee".to_string(),
            started_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ended_at,
            is_active,
        }
    }

    #[test]
    fn test_active_sobriety_runs_to_now() {
        let s = sobriety(true, None);
        let now = s.started_at + Duration::days(45) + Duration::hours(23);
        assert_eq!(s.duration_in(DurationUnit::Days, now), 45);
        assert_eq!(s.duration_in(DurationUnit::Months, now), 1);
        assert_eq!(s.duration_in(DurationUnit::Years, now), 0);
    }

    #[test]
    fn test_ended_sobriety_stops_at_end() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let s = sobriety(false, Some(start + Duration::days(10)));
        let far_future = start + Duration::days(1000);
        assert_eq!(s.duration_in(DurationUnit::Days, far_future), 10);
    }

    #[test]
    fn test_inactive_without_end_has_no_duration() {
        let s = sobriety(false, None);
        assert_eq!(s.current_duration(Utc::now()), None);
        assert_eq!(s.duration_in(DurationUnit::Days, Utc::now()), 0);
    }

    #[test]
    fn test_mood_difficulty_depends_on_note() {
        assert_eq!(MoodEntry::difficulty_for_note(""), "easy");
        assert_eq!(MoodEntry::difficulty_for_note("   \n"), "easy");
        assert_eq!(MoodEntry::difficulty_for_note("slept well"), "medium");
    }

    #[test]
    fn test_todo_effective_difficulty() {
        let category = TodoCategory {
            id: CategoryId(1),
            name: "home".to_string(),
            difficulty: "easy".to_string(),
        };
        let mut task = TodoTask {
            id: TodoId(1),
            user_id: UserId(1),
            content: "dishes".to_string(),
            category_id: category.id,
            custom_difficulty: None,
            is_completed: false,
            xp_awarded: false,
            created_at: Utc::now(),
        };
        assert_eq!(task.effective_difficulty(&category), "easy");
        task.custom_difficulty = Some("hard".to_string());
        assert_eq!(task.effective_difficulty(&category), "hard");
    }

    #[test]
    fn test_mood_and_status_names() {
        for mood in Mood::ALL {
            assert_eq!(Mood::parse(mood.as_str()), Some(mood));
        }
        assert_eq!(Mood::parse("meh"), None);
        assert_eq!(HabitDayStatus::parse("skipped"), Some(HabitDayStatus::Skipped));
        assert_eq!(DurationUnit::parse("weeks"), None);
    }
}
