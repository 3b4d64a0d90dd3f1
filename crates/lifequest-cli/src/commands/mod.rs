//! Command implementations.
//!
//! Every handler returns the lines to print; [`execute`] runs the follow-up
//! achievement sweep after commands that change anything.

pub mod achievement;
pub mod activity;
pub mod journal;
pub mod status;

use crate::cli::Command;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::{Local, NaiveDate};
use lifequest_domain::{AchievementDefinition, Period, UserId};
use lifequest_engine::{AchievementEngine, EngineConfig};
use lifequest_gatekeeper::{Gatekeeper, ValidationConfig};
use lifequest_store::SqliteStore;

pub use self::achievement::execute_achievement;
pub use self::activity::{execute_challenge, execute_goal, execute_habit, execute_todo};
pub use self::journal::{execute_mood, execute_note, execute_sobriety};
pub use self::status::{execute_award, execute_ledger, execute_multiplier, execute_status, execute_xp};

/// Everything a command needs: the store, the engine and the acting user.
pub struct Session {
    /// Open database
    pub store: SqliteStore,
    /// Achievement engine
    pub engine: AchievementEngine,
    /// Authoring-time checks
    pub gatekeeper: Gatekeeper,
    /// Acting user
    pub user: UserId,
}

impl Session {
    /// Open the configured database and resolve the acting user.
    pub fn open(config: &Config, user: Option<i64>) -> Result<Self> {
        let path = config.database_path()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = SqliteStore::open(&path, config.xp.clone(), config.busy_timeout())?;
        Self::new(
            store,
            user.map(UserId),
            config.engine.clone(),
            config.validation.to_config(),
        )
    }

    /// Wrap an open store; without `user`, the first user (created on demand) acts.
    pub fn new(
        mut store: SqliteStore,
        user: Option<UserId>,
        engine: EngineConfig,
        validation: ValidationConfig,
    ) -> Result<Self> {
        let user = match user {
            Some(id) => store.require_user(id)?.id,
            None => store.default_user()?.id,
        };

        Ok(Self {
            store,
            engine: AchievementEngine::new(engine),
            gatekeeper: Gatekeeper::new(validation),
            user,
        })
    }

    /// Re-evaluate the user's achievements; returns the ones unlocked now.
    pub fn sweep_unlocks(&mut self) -> Result<Vec<AchievementDefinition>> {
        let report = self.engine.sweep(&mut self.store, self.user)?;
        let mut unlocked = Vec::with_capacity(report.newly_completed.len());
        for id in report.newly_completed {
            if let Some(def) = self.store.achievement(id)? {
                unlocked.push(def);
            }
        }
        Ok(unlocked)
    }
}

/// Run one command and return what to print.
pub fn execute(command: Command, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    let sweep_after = command.is_mutation();

    let mut lines = match command {
        Command::Status => execute_status(session, formatter)?,
        Command::Xp { action } => execute_xp(action, session, formatter)?,
        Command::Award(args) => execute_award(args, session, formatter)?,
        Command::Ledger { limit } => execute_ledger(limit, session, formatter)?,
        Command::Habit { action } => execute_habit(action, session, formatter)?,
        Command::Goal { action } => execute_goal(action, session, formatter)?,
        Command::Todo { action } => execute_todo(action, session, formatter)?,
        Command::Challenge { action } => execute_challenge(action, session, formatter)?,
        Command::Mood { action } => execute_mood(action, session, formatter)?,
        Command::Sobriety { action } => execute_sobriety(action, session, formatter)?,
        Command::Note { action } => execute_note(action, session, formatter)?,
        Command::Achievement { action } => execute_achievement(action, session, formatter)?,
        Command::Multiplier { action } => execute_multiplier(action, session, formatter)?,
    };

    if sweep_after {
        let unlocked = session.sweep_unlocks()?;
        // JSON and quiet output stay machine-readable.
        if formatter.format() == OutputFormat::Table {
            lines.extend(formatter.unlocked(&unlocked));
        }
    }

    Ok(lines)
}

/// Today in the local calendar.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_period(input: &str) -> Result<Period> {
    Period::parse(&input.trim().to_lowercase())
        .ok_or_else(|| CliError::InvalidInput(format!("Unknown period '{}'", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("Weekly").unwrap(), Period::Weekly);
        assert!(matches!(parse_period("hourly"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_session_uses_default_user() {
        let store = SqliteStore::new(":memory:").unwrap();
        let session =
            Session::new(store, None, EngineConfig::default(), ValidationConfig::default()).unwrap();
        assert_eq!(session.user, UserId(1));
    }

    #[test]
    fn test_session_rejects_unknown_user() {
        let store = SqliteStore::new(":memory:").unwrap();
        let result = Session::new(
            store,
            Some(UserId(42)),
            EngineConfig::default(),
            ValidationConfig::default(),
        );
        assert!(matches!(result, Err(CliError::Store(_))));
    }
}
