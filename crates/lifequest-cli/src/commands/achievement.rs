//! Achievement commands.
//!
//! New and edited definitions pass through the gatekeeper first. When an edit
//! changes the condition, every user already holding progress is resynced so
//! the new target applies retroactively; the edit and the resyncs commit as
//! one unit.

use super::Session;
use crate::cli::{AchievementAction, AchievementAddArgs, AchievementEditArgs};
use crate::error::{CliError, Result};
use crate::output::{AchievementRow, Formatter};
use lifequest_domain::{AchievementDefinition, AchievementId, ConditionKind};
use lifequest_gatekeeper::{AchievementDraft, Gatekeeper, ValidationConfig};
use lifequest_store::{AchievementUpdate, SqliteStore};
use serde_json::Value;
use std::collections::HashMap;

/// Execute an achievement command.
pub fn execute_achievement(
    action: AchievementAction,
    session: &mut Session,
    formatter: &Formatter,
) -> Result<Vec<String>> {
    match action {
        AchievementAction::Add(args) => add_achievement(args, session, formatter),
        AchievementAction::Edit(args) => edit_achievement(args, session, formatter),
        AchievementAction::Delete { id } => {
            let definition = visible_definition(session, id)?;
            session.store.delete_achievement(definition.id)?;
            Ok(vec![formatter.updated(
                &format!("Deleted achievement '{}'", definition.name),
                &definition,
            )?])
        }
        AchievementAction::List { all } => {
            let mut states: HashMap<AchievementId, _> = session
                .store
                .user_states(session.user)?
                .into_iter()
                .map(|s| (s.achievement_id, s))
                .collect();
            let rows: Vec<AchievementRow> = session
                .store
                .list_achievements(session.user)?
                .into_iter()
                .map(|definition| AchievementRow {
                    state: states.remove(&definition.id),
                    definition,
                })
                .collect();
            Ok(vec![formatter.achievements(&rows, all)?])
        }
        AchievementAction::Unlock { id } => {
            let definition = visible_definition(session, id)?;
            let state = session
                .engine
                .manual_unlock(&mut session.store, session.user, &definition)?;
            Ok(vec![formatter.updated(
                &format!("Unlocked '{}'", definition.name),
                &state,
            )?])
        }
        AchievementAction::Check => {
            let report = session.engine.sweep(&mut session.store, session.user)?;
            let mut unlocked = Vec::new();
            for id in &report.newly_completed {
                if let Some(definition) = session.store.achievement(*id)? {
                    unlocked.push(definition);
                }
            }
            Ok(vec![formatter.sweep(&report, &unlocked)?])
        }
        AchievementAction::Kinds => Ok(vec![formatter.condition_kinds(&ConditionKind::ALL)?]),
    }
}

fn add_achievement(
    args: AchievementAddArgs,
    session: &mut Session,
    formatter: &Formatter,
) -> Result<Vec<String>> {
    let mut draft = AchievementDraft::new(args.name, args.condition_type, parse_params(&args.params)?)
        .with_difficulty(args.difficulty);
    draft.description = args.description;
    draft.is_hidden = args.hidden;
    if !args.global {
        draft = draft.owned_by(session.user);
    }

    let admitted = session.gatekeeper.admit(&draft, Some(&session.store))?;
    let definition = session.store.create_achievement(&admitted)?;
    Ok(vec![formatter.created("Achievement", definition.id, &definition)?])
}

fn edit_achievement(
    args: AchievementEditArgs,
    session: &mut Session,
    formatter: &Formatter,
) -> Result<Vec<String>> {
    let current = visible_definition(session, args.id)?;
    let condition_changed = args.condition_type.is_some() || args.params.is_some();

    let mut draft = AchievementDraft::from_definition(&current);
    if let Some(name) = args.name {
        draft.name = name;
    }
    if let Some(description) = args.description {
        draft.description = description;
    }
    if let Some(difficulty) = args.difficulty {
        draft.difficulty = difficulty;
    }
    if let Some(condition_type) = args.condition_type {
        draft.condition_type = condition_type;
    }
    if let Some(params) = &args.params {
        draft.config = parse_params(params)?;
    }
    if let Some(hidden) = args.hidden {
        draft.is_hidden = hidden;
    }

    // An untouched condition is not re-judged under stricter rules.
    let admitted = if condition_changed {
        session.gatekeeper.admit(&draft, Some(&session.store))?
    } else {
        let lenient = ValidationConfig {
            validate_parameters: false,
            validate_references: false,
            reject_unknown_kinds: false,
            allow_legacy_target_keys: true,
            ..session.gatekeeper.config().clone()
        };
        Gatekeeper::new(lenient).admit(&draft, Some(&session.store))?
    };

    let update = AchievementUpdate {
        name: Some(admitted.name),
        description: Some(admitted.description),
        difficulty: Some(admitted.difficulty),
        condition: condition_changed.then_some((admitted.condition, admitted.config)),
        is_hidden: Some(admitted.is_hidden),
    };
    let resync = condition_changed && session.engine.config().resync_on_edit;
    let Session { store, engine, .. } = &mut *session;

    // The edit and every resync land together or not at all.
    let (definition, resynced) = store.atomically(
        |store: &mut SqliteStore| -> Result<(AchievementDefinition, usize)> {
            let definition = store.update_achievement(current.id, &update)?;
            if !resync {
                return Ok((definition, 0));
            }
            let users = store.users_with_progress(definition.id)?;
            for user in &users {
                engine.resync_definition(store, *user, &definition)?;
            }
            Ok((definition, users.len()))
        },
    )?;

    if resync {
        tracing::info!(
            achievement = %definition.id,
            users = resynced,
            "resynced edited achievement"
        );
    }

    let mut lines = vec![formatter.updated(
        &format!("Updated achievement '{}'", definition.name),
        &definition,
    )?];

    if formatter.format() == crate::config::OutputFormat::Table && !condition_changed {
        lines.push(formatter.info("Condition unchanged, progress kept"));
    }
    Ok(lines)
}

// Global definitions and the user's own; anything else reads as missing.
fn visible_definition(session: &Session, id: i64) -> Result<AchievementDefinition> {
    session
        .store
        .achievement(AchievementId(id))?
        .filter(|d| d.applies_to(session.user))
        .ok_or_else(|| CliError::InvalidInput(format!("No achievement {}", id)))
}

fn parse_params(input: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(input)?;
    if !(value.is_object() || value.is_null()) {
        return Err(CliError::InvalidInput(
            "Condition parameters must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use chrono::Utc;
    use lifequest_domain::traits::AchievementStore;
    use lifequest_domain::UserAchievementState;
    use lifequest_engine::EngineConfig;
    use lifequest_gatekeeper::GatekeeperError;
    use lifequest_store::SqliteStore;

    fn session() -> Session {
        let store = SqliteStore::new(":memory:").unwrap();
        Session::new(store, None, EngineConfig::default(), ValidationConfig::default()).unwrap()
    }

    fn add_args(name: &str, kind: &str, params: &str) -> AchievementAddArgs {
        AchievementAddArgs {
            name: name.to_string(),
            condition_type: kind.to_string(),
            params: params.to_string(),
            description: String::new(),
            difficulty: "easy".to_string(),
            hidden: false,
            global: false,
        }
    }

    fn edit_args(id: i64) -> AchievementEditArgs {
        AchievementEditArgs {
            id,
            name: None,
            description: None,
            difficulty: None,
            condition_type: None,
            params: None,
            hidden: None,
        }
    }

    fn quiet() -> Formatter {
        Formatter::new(OutputFormat::Quiet, false)
    }

    fn add(session: &mut Session, args: AchievementAddArgs) -> i64 {
        execute_achievement(AchievementAction::Add(args), session, &quiet()).unwrap()[0]
            .parse()
            .unwrap()
    }

    #[test]
    fn test_add_owned_by_author() {
        let mut session = session();
        let id = add(&mut session, add_args("Scribe", "notes_count", r#"{"target": 2}"#));

        let def = session.store.achievement(AchievementId(id)).unwrap().unwrap();
        assert_eq!(def.owner, Some(session.user));
        assert_eq!(def.target_value(), 2);
    }

    #[test]
    fn test_add_rejects_foreign_habit() {
        let mut session = session();
        let other = session.store.create_user().unwrap().id;
        let habit = session.store.create_habit(other, "Theirs", "easy").unwrap();
        let params = format!(r#"{{"target": 3, "habit_id": {}}}"#, habit.id);

        let result = execute_achievement(
            AchievementAction::Add(add_args("Borrowed", "habit_days", &params)),
            &mut session,
            &quiet(),
        );
        assert!(matches!(
            result,
            Err(CliError::Gatekeeper(GatekeeperError::Rejected(_)))
        ));
        assert!(session.store.list_achievements(session.user).unwrap().is_empty());
    }

    #[test]
    fn test_params_must_be_object() {
        let mut session = session();
        let result = execute_achievement(
            AchievementAction::Add(add_args("List", "notes_count", "[1]")),
            &mut session,
            &quiet(),
        );
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_edit_condition_resyncs_progress() {
        let mut session = session();
        let id = add(&mut session, add_args("Scribe", "notes_count", r#"{"target": 1}"#));
        session.store.create_note(session.user, "first").unwrap();
        session.sweep_unlocks().unwrap();
        let states = session.store.user_states(session.user).unwrap();
        assert!(states[0].is_completed);

        let mut edit = edit_args(id);
        edit.params = Some(r#"{"target": 5}"#.to_string());
        execute_achievement(AchievementAction::Edit(edit), &mut session, &quiet()).unwrap();

        let states = session.store.user_states(session.user).unwrap();
        assert_eq!(states[0].target_value, 5);
        assert_eq!(states[0].current_value, 1);
        assert!(!states[0].is_completed);
    }

    #[test]
    fn test_failed_resync_rolls_back_edit() {
        let mut session = session();
        let id = add(&mut session, add_args("Scribe", "notes_count", r#"{"target": 1}"#));
        session.store.create_note(session.user, "first").unwrap();
        session.sweep_unlocks().unwrap();

        // a progress row for a user the private definition does not apply to
        let stranger = session.store.create_user().unwrap().id;
        let orphan = UserAchievementState::new(stranger, AchievementId(id), 1, Utc::now());
        session.store.insert_user_state_if_absent(&orphan).unwrap();

        let mut edit = edit_args(id);
        edit.params = Some(r#"{"target": 5}"#.to_string());
        let result = execute_achievement(AchievementAction::Edit(edit), &mut session, &quiet());
        assert!(matches!(result, Err(CliError::Engine(_))));

        let def = session.store.achievement(AchievementId(id)).unwrap().unwrap();
        assert_eq!(def.target_value(), 1);
        let states = session.store.user_states(session.user).unwrap();
        assert!(states[0].is_completed);
        assert_eq!(states[0].target_value, 1);
    }

    #[test]
    fn test_rename_keeps_completion() {
        let mut session = session();
        let id = add(&mut session, add_args("Scribe", "notes_count", r#"{"target": 1}"#));
        session.store.create_note(session.user, "first").unwrap();
        session.sweep_unlocks().unwrap();

        let mut edit = edit_args(id);
        edit.name = Some("Author".to_string());
        execute_achievement(AchievementAction::Edit(edit), &mut session, &quiet()).unwrap();

        let def = session.store.achievement(AchievementId(id)).unwrap().unwrap();
        assert_eq!(def.name, "Author");
        assert!(session.store.user_states(session.user).unwrap()[0].is_completed);
    }

    #[test]
    fn test_unlock_manual_only() {
        let mut session = session();
        let notes = add(&mut session, add_args("Scribe", "notes_count", r#"{"target": 3}"#));
        let manual = add(&mut session, add_args("Founder", "manual", "{}"));

        let result = execute_achievement(AchievementAction::Unlock { id: notes }, &mut session, &quiet());
        assert!(matches!(result, Err(CliError::Engine(_))));

        execute_achievement(AchievementAction::Unlock { id: manual }, &mut session, &quiet()).unwrap();
        let states = session.store.user_states(session.user).unwrap();
        assert!(states
            .iter()
            .any(|s| s.achievement_id == AchievementId(manual) && s.is_completed));
    }

    #[test]
    fn test_other_users_achievement_hidden() {
        let mut session = session();
        let id = add(&mut session, add_args("Mine", "notes_count", r#"{"target": 1}"#));
        let other = session.store.create_user().unwrap().id;
        session.user = other;

        let result = execute_achievement(AchievementAction::Delete { id }, &mut session, &quiet());
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
