//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::{DateTime, Utc};
use colored::*;
use lifequest_domain::{
    AchievementDefinition, AwardOutcome, ChallengeDefinition, CompletionOutcome, ConditionKind,
    DurationUnit, Goal, Habit, LevelProgress, MoodEntry, Sobriety, TodoCategory, TodoTask, User,
    UserAchievementState, UserChallenge, XpLedgerEntry,
};
use lifequest_engine::SweepReport;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// A habit with its longest run of completed days.
#[derive(Debug, Clone, Serialize)]
pub struct HabitRow {
    /// The habit
    #[serde(flatten)]
    pub habit: Habit,
    /// Longest streak of consecutive completed days
    pub streak: u64,
}

/// An achievement with the user's progress, if any.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementRow {
    /// The definition
    pub definition: AchievementDefinition,
    /// Progress row, absent until first evaluated
    pub state: Option<UserAchievementState>,
}

impl AchievementRow {
    fn is_completed(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.is_completed)
    }

    fn progress(&self) -> String {
        match &self.state {
            Some(s) if s.is_completed => "done".to_string(),
            Some(s) => format!("{}/{} ({}%)", s.current_value, s.target_value, s.progress_percent()),
            None => "-".to_string(),
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the status view.
    pub fn status(&self, user: &User, progress: &LevelProgress) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "user": user,
                "progress": progress,
                "xp_to_next_level": progress.remaining(),
                "percent": progress.percent(),
            }))?),
            OutputFormat::Quiet => Ok(format!("{} {}", user.current_level, user.total_xp)),
            OutputFormat::Table => {
                let bar = progress_bar(progress.percent(), 20);
                Ok(format!(
                    "{}\n  Total XP:   {}\n  Next level: {} / {} XP {} {}%\n  Multiplier: x{}",
                    self.colorize(&format!("Level {}", progress.level), "cyan"),
                    user.total_xp,
                    progress.xp_into_level,
                    progress.xp_for_next_level,
                    bar,
                    progress.percent(),
                    user.xp_multiplier,
                ))
            }
        }
    }

    /// Format a computed XP amount.
    pub fn xp_amount(&self, xp: i64) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({ "xp": xp }))?),
            OutputFormat::Quiet => Ok(xp.to_string()),
            OutputFormat::Table => Ok(format!("{} XP", xp)),
        }
    }

    /// Format the result of a direct award.
    pub fn award(&self, outcome: &AwardOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
            OutputFormat::Quiet => Ok(outcome.total_xp.to_string()),
            OutputFormat::Table => Ok(self.success(&format!(
                "+{} XP (total {}, level {})",
                outcome.xp_gained, outcome.total_xp, outcome.current_level
            ))),
        }
    }

    /// Format the result of a completion flow.
    pub fn completion(&self, what: &str, outcome: &CompletionOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
            OutputFormat::Quiet => Ok(outcome.xp_gained.to_string()),
            OutputFormat::Table if outcome.already_completed => {
                Ok(self.info(&format!("{} was already completed, no XP awarded", what)))
            }
            OutputFormat::Table => Ok(self.success(&format!(
                "{} completed: +{} XP (total {}, level {})",
                what, outcome.xp_gained, outcome.total_xp, outcome.current_level
            ))),
        }
    }

    /// Format a newly created record.
    pub fn created<T: Serialize>(&self, what: &str, id: impl std::fmt::Display, record: &T) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
            OutputFormat::Quiet => Ok(id.to_string()),
            OutputFormat::Table => Ok(self.success(&format!("{} created: {}", what, id))),
        }
    }

    /// Format an updated record.
    pub fn updated<T: Serialize>(&self, message: &str, record: &T) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
            OutputFormat::Quiet => Ok(String::new()),
            OutputFormat::Table => Ok(self.success(message)),
        }
    }

    /// Format ledger entries.
    pub fn ledger(&self, entries: &[XpLedgerEntry]) -> Result<String> {
        self.render(
            entries,
            &["When", "Source", "Source ID", "XP"],
            "No XP earned yet.",
            |e| e.id.to_string(),
            |e| {
                vec![
                    e.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    e.source.to_string(),
                    e.source_id.map(|id| id.to_string()).unwrap_or_default(),
                    format!("+{}", e.xp),
                ]
            },
        )
    }

    /// Format habits.
    pub fn habits(&self, habits: &[HabitRow]) -> Result<String> {
        self.render(
            habits,
            &["ID", "Title", "Difficulty", "Active", "Best streak"],
            "No habits yet.",
            |h| h.habit.id.to_string(),
            |h| {
                vec![
                    h.habit.id.to_string(),
                    h.habit.title.clone(),
                    h.habit.difficulty.clone(),
                    yes_no(h.habit.is_active),
                    h.streak.to_string(),
                ]
            },
        )
    }

    /// Format goals.
    pub fn goals(&self, goals: &[Goal]) -> Result<String> {
        self.render(
            goals,
            &["ID", "Title", "Period", "Difficulty", "Done"],
            "No goals yet.",
            |g| g.id.to_string(),
            |g| {
                vec![
                    g.id.to_string(),
                    g.title.clone(),
                    g.period.to_string(),
                    g.difficulty.clone(),
                    yes_no(g.is_completed),
                ]
            },
        )
    }

    /// Format todo categories.
    pub fn todo_categories(&self, categories: &[TodoCategory]) -> Result<String> {
        self.render(
            categories,
            &["ID", "Category", "Difficulty"],
            "No categories yet.",
            |c| c.id.to_string(),
            |c| vec![c.id.to_string(), c.name.clone(), c.difficulty.clone()],
        )
    }

    /// Format todos.
    pub fn todos(&self, todos: &[TodoTask]) -> Result<String> {
        self.render(
            todos,
            &["ID", "Task", "Category", "Difficulty", "Done"],
            "No todos yet.",
            |t| t.id.to_string(),
            |t| {
                vec![
                    t.id.to_string(),
                    t.content.clone(),
                    t.category_id.to_string(),
                    t.custom_difficulty.clone().unwrap_or_else(|| "(category)".to_string()),
                    yes_no(t.is_completed),
                ]
            },
        )
    }

    /// Format the challenge catalog.
    pub fn challenge_definitions(&self, definitions: &[ChallengeDefinition]) -> Result<String> {
        self.render(
            definitions,
            &["ID", "Challenge", "Period", "Difficulty"],
            "The challenge catalog is empty.",
            |d| d.id.to_string(),
            |d| {
                vec![
                    d.id.to_string(),
                    d.title.clone(),
                    d.period.to_string(),
                    d.difficulty.clone(),
                ]
            },
        )
    }

    /// Format challenge assignments.
    pub fn user_challenges(&self, assignments: &[UserChallenge]) -> Result<String> {
        self.render(
            assignments,
            &["ID", "Challenge", "Started", "Done"],
            "No challenges taken on yet.",
            |a| a.id.to_string(),
            |a| {
                vec![
                    a.id.to_string(),
                    a.definition_id.to_string(),
                    a.start_date.to_string(),
                    yes_no(a.is_completed),
                ]
            },
        )
    }

    /// Format mood entries.
    pub fn moods(&self, entries: &[MoodEntry]) -> Result<String> {
        self.render(
            entries,
            &["Date", "Time", "Mood", "Note"],
            "No moods logged yet.",
            |m| m.id.to_string(),
            |m| {
                vec![
                    m.date.to_string(),
                    m.time.format("%H:%M").to_string(),
                    m.mood.to_string(),
                    m.note.clone(),
                ]
            },
        )
    }

    /// Format sobriety streaks as of `now`.
    pub fn sobriety(&self, list: &[Sobriety], now: DateTime<Utc>) -> Result<String> {
        self.render(
            list,
            &["ID", "Name", "Since", "Days", "Active"],
            "No sobriety streaks tracked.",
            |s| s.id.to_string(),
            |s| {
                vec![
                    s.id.to_string(),
                    s.name.clone(),
                    s.started_at.format("%Y-%m-%d").to_string(),
                    s.duration_in(DurationUnit::Days, now).to_string(),
                    yes_no(s.is_active),
                ]
            },
        )
    }

    /// Format achievements; hidden locked ones are masked unless `reveal`.
    pub fn achievements(&self, rows: &[AchievementRow], reveal: bool) -> Result<String> {
        let visible: Vec<&AchievementRow> = rows
            .iter()
            .filter(|r| reveal || !r.definition.is_hidden || r.is_completed())
            .collect();

        self.render(
            &visible,
            &["ID", "Name", "Condition", "Difficulty", "Progress"],
            "No achievements defined.",
            |r| r.definition.id.to_string(),
            |r| {
                let name = if r.is_completed() {
                    self.colorize(&r.definition.name, "green")
                } else {
                    r.definition.name.clone()
                };
                vec![
                    r.definition.id.to_string(),
                    name,
                    r.definition.condition_type().to_string(),
                    r.definition.difficulty.clone(),
                    r.progress(),
                ]
            },
        )
    }

    /// Format the condition kinds an achievement can use.
    pub fn condition_kinds(&self, kinds: &[ConditionKind]) -> Result<String> {
        self.render(
            kinds,
            &["Kind", "Meaning", "Target"],
            "No condition kinds.",
            |k| k.as_str().to_string(),
            |k| vec![k.as_str().to_string(), k.label().to_string(), yes_no(k.has_target())],
        )
    }

    /// Format the outcome of an explicit sweep.
    pub fn sweep(&self, report: &SweepReport, unlocked: &[AchievementDefinition]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(report
                .newly_completed
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut lines = self.unlocked(unlocked);
                lines.push(self.info(&format!(
                    "Evaluated {}, {} newly unlocked, {} completed in total",
                    report.evaluated,
                    report.newly_completed.len(),
                    report.completed.len()
                )));
                Ok(lines.join("\n"))
            }
        }
    }

    /// Announce achievements unlocked by the last command.
    pub fn unlocked(&self, definitions: &[AchievementDefinition]) -> Vec<String> {
        definitions
            .iter()
            .map(|d| self.colorize(&format!("★ Achievement unlocked: {}", d.name), "magenta"))
            .collect()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    // One list in the active format: JSON array, table, or one ID per line.
    fn render<T: Serialize>(
        &self,
        items: &[T],
        header: &[&str],
        empty: &str,
        id: impl Fn(&T) -> String,
        row: impl Fn(&T) -> Vec<String>,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
            OutputFormat::Quiet => Ok(items.iter().map(id).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if items.is_empty() {
                    return Ok(self.colorize(empty, "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(header.iter().copied());
                for item in items {
                    builder.push_record(row(item));
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(table.to_string())
            }
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

fn progress_bar(percent: u8, width: usize) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
