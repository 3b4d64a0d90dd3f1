//! CLI command definitions and argument parsing.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Lifequest CLI - Track habits, goals and moods, earn XP, unlock achievements.
#[derive(Debug, Parser)]
#[command(name = "lifequest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LIFEQUEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Act as this user instead of the default one
    #[arg(short, long, global = true)]
    pub user: Option<i64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs and numbers only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show level, XP and progress to the next level
    Status,

    /// XP formula tools
    Xp {
        #[command(subcommand)]
        action: XpAction,
    },

    /// Grant XP by hand
    Award(AwardArgs),

    /// Show the XP ledger
    Ledger {
        /// Only the most recent N entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Manage habits
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },

    /// Manage goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Manage todos and their categories
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    /// Manage challenges
    Challenge {
        #[command(subcommand)]
        action: ChallengeAction,
    },

    /// Log and list moods
    Mood {
        #[command(subcommand)]
        action: MoodAction,
    },

    /// Track sobriety streaks
    Sobriety {
        #[command(subcommand)]
        action: SobrietyAction,
    },

    /// Write notes
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Author, inspect and unlock achievements
    Achievement {
        #[command(subcommand)]
        action: AchievementAction,
    },

    /// Personal XP multiplier
    Multiplier {
        #[command(subcommand)]
        action: MultiplierAction,
    },
}

/// XP formula actions.
#[derive(Debug, Subcommand)]
pub enum XpAction {
    /// Compute the XP an action would grant
    Calc {
        /// Module (habits, todos, challenges, goals, mood, random)
        module: String,
        /// Difficulty (trivial, easy, medium, hard)
        difficulty: String,
        /// Period, for goals and challenges
        #[arg(short, long)]
        period: Option<String>,
        /// Apply the current user's personal multiplier
        #[arg(long)]
        personal: bool,
    },
}

/// Arguments for the award command.
#[derive(Debug, Args)]
pub struct AwardArgs {
    /// XP amount (>= 0)
    pub xp: i64,

    /// Source tag recorded on the ledger entry
    #[arg(short, long, default_value = "manual")]
    pub source: String,

    /// Optional source record id
    #[arg(long)]
    pub source_id: Option<i64>,
}

/// Habit actions.
#[derive(Debug, Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Add {
        /// Habit title
        title: String,
        /// Difficulty
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
    },
    /// Mark a day completed (awards XP once)
    Complete(HabitDayArgs),
    /// Flip a day between completed and empty
    Toggle(HabitDayArgs),
    /// Mark a day skipped
    Skip(HabitDayArgs),
    /// Pause or resume a habit
    Pause {
        /// Habit ID
        id: i64,
        /// Resume instead of pausing
        #[arg(long)]
        resume: bool,
    },
    /// List habits with their streaks
    List,
}

/// A habit and a day.
#[derive(Debug, Args)]
pub struct HabitDayArgs {
    /// Habit ID
    pub id: i64,
    /// Day (YYYY-MM-DD), today if omitted
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
}

/// Goal actions.
#[derive(Debug, Subcommand)]
pub enum GoalAction {
    /// Create a goal
    Add {
        /// Goal title
        title: String,
        /// Period (weekly, monthly, yearly)
        #[arg(short, long, default_value = "weekly")]
        period: String,
        /// Difficulty
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
    },
    /// Complete a goal (awards XP once)
    Complete {
        /// Goal ID
        id: i64,
    },
    /// List goals
    List,
}

/// Todo actions.
#[derive(Debug, Subcommand)]
pub enum TodoAction {
    /// Create a todo category
    Category {
        /// Category name
        name: String,
        /// Difficulty used by tasks without their own
        #[arg(short, long, default_value = "easy")]
        difficulty: String,
    },
    /// Create a todo
    Add {
        /// Task text
        content: String,
        /// Category ID
        #[arg(long)]
        category: i64,
        /// Difficulty overriding the category's
        #[arg(short, long)]
        difficulty: Option<String>,
    },
    /// Complete a todo (awards XP once)
    Complete {
        /// Todo ID
        id: i64,
    },
    /// List todos and categories
    List,
}

/// Challenge actions.
#[derive(Debug, Subcommand)]
pub enum ChallengeAction {
    /// Add a challenge to the catalog
    Add {
        /// Challenge title
        title: String,
        /// Period (daily, weekly)
        #[arg(short, long, default_value = "daily")]
        period: String,
        /// Difficulty
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
    },
    /// Take on a challenge from the catalog
    Assign {
        /// Challenge ID
        id: i64,
    },
    /// Complete an assigned challenge (awards XP once)
    Complete {
        /// Assignment ID
        id: i64,
    },
    /// List the catalog and assignments
    List,
}

/// Mood actions.
#[derive(Debug, Subcommand)]
pub enum MoodAction {
    /// Log today's mood (or another day's)
    Log {
        /// Mood (great, good, neutral, bad, terrible)
        mood: String,
        /// Optional note; a note makes the entry worth more XP
        #[arg(short, long, default_value = "")]
        note: String,
        /// Day (YYYY-MM-DD), today if omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// List mood entries
    List,
}

/// Sobriety actions.
#[derive(Debug, Subcommand)]
pub enum SobrietyAction {
    /// Start tracking a streak now
    Add {
        /// What to stay away from
        name: String,
    },
    /// End a streak now
    Relapse {
        /// Sobriety ID
        id: i64,
    },
    /// Start a streak over from now
    Restart {
        /// Sobriety ID
        id: i64,
    },
    /// List streaks
    List,
}

/// Note actions.
#[derive(Debug, Subcommand)]
pub enum NoteAction {
    /// Write a note
    Add {
        /// Note text
        content: String,
    },
}

/// Achievement actions.
#[derive(Debug, Subcommand)]
pub enum AchievementAction {
    /// Author a new achievement
    Add(AchievementAddArgs),
    /// Edit an achievement you authored
    Edit(AchievementEditArgs),
    /// Delete an achievement you authored
    Delete {
        /// Achievement ID
        id: i64,
    },
    /// List achievements with your progress
    List {
        /// Include hidden achievements that are still locked
        #[arg(long)]
        all: bool,
    },
    /// Unlock a manual achievement
    Unlock {
        /// Achievement ID
        id: i64,
    },
    /// Re-evaluate every achievement now
    Check,
    /// List the condition kinds
    Kinds,
}

/// Arguments for authoring an achievement.
#[derive(Debug, Args)]
pub struct AchievementAddArgs {
    /// Display name
    pub name: String,

    /// Condition kind (see `achievement kinds`)
    #[arg(short = 't', long = "type")]
    pub condition_type: String,

    /// Condition parameters as a JSON object, e.g. '{"target": 7, "habit_id": 3}'
    #[arg(long, default_value = "{}")]
    pub params: String,

    /// Description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Difficulty
    #[arg(short, long, default_value = "medium")]
    pub difficulty: String,

    /// Hide until unlocked
    #[arg(long)]
    pub hidden: bool,

    /// Add to the shared catalog instead of your own list
    #[arg(long)]
    pub global: bool,
}

/// Arguments for editing an achievement; omitted fields stay as they are.
#[derive(Debug, Args)]
pub struct AchievementEditArgs {
    /// Achievement ID
    pub id: i64,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New difficulty
    #[arg(short, long)]
    pub difficulty: Option<String>,

    /// New condition kind
    #[arg(short = 't', long = "type")]
    pub condition_type: Option<String>,

    /// New condition parameters as a JSON object
    #[arg(long)]
    pub params: Option<String>,

    /// Hide or show until unlocked
    #[arg(long)]
    pub hidden: Option<bool>,
}

/// Multiplier actions.
#[derive(Debug, Subcommand)]
pub enum MultiplierAction {
    /// Choose a personal multiplier from the allowed set
    Set {
        /// Multiplier value
        value: f64,
    },
    /// Show the current multiplier and the allowed set
    Show,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl Command {
    /// True for commands after which achievements must be re-evaluated.
    ///
    /// `achievement check` runs its own sweep and is not counted.
    pub fn is_mutation(&self) -> bool {
        match self {
            Command::Status | Command::Xp { .. } | Command::Ledger { .. } => false,
            Command::Habit { action } => !matches!(action, HabitAction::List),
            Command::Goal { action } => !matches!(action, GoalAction::List),
            Command::Todo { action } => !matches!(action, TodoAction::List),
            Command::Challenge { action } => !matches!(action, ChallengeAction::List),
            Command::Mood { action } => !matches!(action, MoodAction::List),
            Command::Sobriety { action } => !matches!(action, SobrietyAction::List),
            Command::Achievement { action } => !matches!(
                action,
                AchievementAction::List { .. }
                    | AchievementAction::Kinds
                    | AchievementAction::Check
            ),
            Command::Multiplier { action } => !matches!(action, MultiplierAction::Show),
            Command::Award(_) | Command::Note { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_command() {
        let cli = Cli::parse_from(["lifequest", "status"]);
        assert!(matches!(cli.command, Command::Status));
        assert!(!cli.command.is_mutation());
    }

    #[test]
    fn test_habit_complete_with_date() {
        let cli = Cli::parse_from(["lifequest", "habit", "complete", "3", "--date", "2024-05-01"]);
        match cli.command {
            Command::Habit {
                action: HabitAction::Complete(args),
            } => {
                assert_eq!(args.id, 3);
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 5, 1));
            }
            other => panic!("Expected habit complete, got {:?}", other),
        }
    }

    #[test]
    fn test_achievement_add() {
        let cli = Cli::parse_from([
            "lifequest",
            "--user",
            "2",
            "achievement",
            "add",
            "Streaker",
            "--type",
            "habit_streak",
            "--params",
            r#"{"target": 7, "habit_id": 1}"#,
        ]);
        assert_eq!(cli.user, Some(2));
        match cli.command {
            Command::Achievement {
                action: AchievementAction::Add(args),
            } => {
                assert_eq!(args.condition_type, "habit_streak");
                assert_eq!(args.difficulty, "medium");
                assert!(!args.hidden);
            }
            other => panic!("Expected achievement add, got {:?}", other),
        }
    }

    #[test]
    fn test_mutation_classification() {
        let unlock = Cli::parse_from(["lifequest", "achievement", "unlock", "4"]);
        assert!(unlock.command.is_mutation());

        let check = Cli::parse_from(["lifequest", "achievement", "check"]);
        assert!(!check.command.is_mutation());

        let list = Cli::parse_from(["lifequest", "achievement", "list"]);
        assert!(!list.command.is_mutation());

        let note = Cli::parse_from(["lifequest", "note", "add", "hi"]);
        assert!(note.command.is_mutation());
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::parse_from(["lifequest", "ledger", "--format", "json"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }
}
