//! Mood, sobriety and note commands.

use super::{today, Session};
use crate::cli::{MoodAction, NoteAction, SobrietyAction};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::{Local, Utc};
use lifequest_domain::{Mood, Sobriety, SobrietyId};

/// Execute a mood command.
pub fn execute_mood(action: MoodAction, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    match action {
        MoodAction::Log { mood, note, date } => {
            let mood = Mood::parse(&mood.trim().to_lowercase()).ok_or_else(|| {
                let known: Vec<&str> = Mood::ALL.iter().map(Mood::as_str).collect();
                CliError::InvalidInput(format!(
                    "Unknown mood '{}', expected one of: {}",
                    mood,
                    known.join(", ")
                ))
            })?;
            let date = date.unwrap_or_else(today);
            let time = Local::now().time();

            let (entry, outcome) = session
                .store
                .log_mood(session.user, date, time, mood, &note)?;
            Ok(vec![formatter.completion(&format!("Mood for {} ({})", entry.date, entry.mood), &outcome)?])
        }
        MoodAction::List => Ok(vec![formatter.moods(&session.store.mood_entries(session.user)?)?]),
    }
}

/// Execute a sobriety command.
pub fn execute_sobriety(
    action: SobrietyAction,
    session: &mut Session,
    formatter: &Formatter,
) -> Result<Vec<String>> {
    let now = Utc::now();
    match action {
        SobrietyAction::Add { name } => {
            let sobriety = session.store.create_sobriety(session.user, &name, now)?;
            Ok(vec![formatter.created("Sobriety streak", sobriety.id, &sobriety)?])
        }
        SobrietyAction::Relapse { id } => {
            let id = owned_sobriety(session, id)?.id;
            let sobriety = session.store.relapse(id, now)?;
            Ok(vec![formatter.updated(&format!("'{}' streak ended", sobriety.name), &sobriety)?])
        }
        SobrietyAction::Restart { id } => {
            let id = owned_sobriety(session, id)?.id;
            let sobriety = session.store.restart_sobriety(id, now)?;
            Ok(vec![formatter.updated(&format!("'{}' streak restarted", sobriety.name), &sobriety)?])
        }
        SobrietyAction::List => Ok(vec![formatter.sobriety(&session.store.sobriety_list(session.user)?, now)?]),
    }
}

/// Execute a note command.
pub fn execute_note(action: NoteAction, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    match action {
        NoteAction::Add { content } => {
            if content.trim().is_empty() {
                return Err(CliError::InvalidInput("Note is empty".to_string()));
            }
            let note = session.store.create_note(session.user, &content)?;
            Ok(vec![formatter.created("Note", note.id, &note)?])
        }
    }
}

fn owned_sobriety(session: &Session, id: i64) -> Result<Sobriety> {
    session
        .store
        .sobriety(SobrietyId(id))?
        .filter(|s| s.user_id == session.user)
        .ok_or_else(|| CliError::InvalidInput(format!("No sobriety streak {} for this user", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use chrono::NaiveDate;
    use lifequest_engine::EngineConfig;
    use lifequest_gatekeeper::ValidationConfig;
    use lifequest_store::SqliteStore;

    fn session() -> Session {
        let store = SqliteStore::new(":memory:").unwrap();
        Session::new(store, None, EngineConfig::default(), ValidationConfig::default()).unwrap()
    }

    #[test]
    fn test_mood_relog_awards_nothing() {
        let mut session = session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let log = |note: &str| MoodAction::Log {
            mood: "Good".to_string(),
            note: note.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, 2),
        };

        // medium (20) * mood (0.5) with a note
        assert_eq!(execute_mood(log("slept well"), &mut session, &formatter).unwrap(), vec!["10"]);
        assert_eq!(execute_mood(log(""), &mut session, &formatter).unwrap(), vec!["0"]);
        assert_eq!(session.store.mood_entries(session.user).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_mood() {
        let mut session = session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let log = MoodAction::Log {
            mood: "ecstatic".to_string(),
            note: String::new(),
            date: None,
        };
        assert!(matches!(
            execute_mood(log, &mut session, &formatter),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_relapse_other_users_streak() {
        let mut session = session();
        let other = session.store.create_user().unwrap().id;
        let theirs = session.store.create_sobriety(other, "coffee", Utc::now()).unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let result = execute_sobriety(
            SobrietyAction::Relapse { id: theirs.id.value() },
            &mut session,
            &formatter,
        );
        assert!(result.is_err());
        assert!(session.store.sobriety(theirs.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn test_empty_note_rejected() {
        let mut session = session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let add = NoteAction::Add { content: "   ".to_string() };
        assert!(execute_note(add, &mut session, &formatter).is_err());
    }
}
