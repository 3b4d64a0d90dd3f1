//! Status, XP and ledger commands.

use super::Session;
use crate::cli::{AwardArgs, MultiplierAction, XpAction};
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lifequest_domain::traits::XpLedger;
use lifequest_domain::{calculate_xp, level_progress, XpSource};

/// Execute the status command.
pub fn execute_status(session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    let user = session.store.require_user(session.user)?;
    let progress = level_progress(user.total_xp, session.store.rules().base_level_xp);
    Ok(vec![formatter.status(&user, &progress)?])
}

/// Execute an XP formula command.
pub fn execute_xp(action: XpAction, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    match action {
        XpAction::Calc {
            module,
            difficulty,
            period,
            personal,
        } => {
            let user = if personal {
                Some(session.store.require_user(session.user)?)
            } else {
                None
            };
            let xp = calculate_xp(
                session.store.rules(),
                &module.trim().to_lowercase(),
                &difficulty.trim().to_lowercase(),
                period.as_deref().map(str::trim),
                user.as_ref(),
            )?;
            Ok(vec![formatter.xp_amount(xp)?])
        }
    }
}

/// Execute the award command.
pub fn execute_award(args: AwardArgs, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    if args.xp < 0 {
        return Err(CliError::InvalidInput("XP amount must be >= 0".to_string()));
    }
    let source = XpSource::parse(&args.source.trim().to_lowercase())
        .ok_or_else(|| CliError::InvalidInput(format!("Unknown XP source '{}'", args.source)))?;

    let outcome = session
        .store
        .award_xp(session.user, args.xp, source, args.source_id)?;
    Ok(vec![formatter.award(&outcome)?])
}

/// Execute the ledger command.
pub fn execute_ledger(limit: Option<usize>, session: &mut Session, formatter: &Formatter) -> Result<Vec<String>> {
    let mut entries = session.store.ledger_entries(session.user)?;
    if let Some(limit) = limit {
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
    }

    let mut lines = vec![formatter.ledger(&entries)?];
    if formatter.format() == OutputFormat::Table && !entries.is_empty() {
        let total = session.store.ledger_total(session.user)?;
        lines.push(format!("Total: {} XP", total));
    }
    Ok(lines)
}

/// Execute a multiplier command.
pub fn execute_multiplier(
    action: MultiplierAction,
    session: &mut Session,
    formatter: &Formatter,
) -> Result<Vec<String>> {
    match action {
        MultiplierAction::Set { value } => {
            let user = session.store.set_xp_multiplier(session.user, value)?;
            Ok(vec![formatter.updated(
                &format!("XP multiplier set to x{}", user.xp_multiplier),
                &user,
            )?])
        }
        MultiplierAction::Show => {
            let user = session.store.require_user(session.user)?;
            let allowed: Vec<String> = session
                .store
                .rules()
                .allowed_multipliers
                .iter()
                .map(|m| format!("x{}", m))
                .collect();
            Ok(vec![match formatter.format() {
                OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                    "multiplier": user.xp_multiplier,
                    "allowed": session.store.rules().allowed_multipliers,
                }))?,
                OutputFormat::Quiet => user.xp_multiplier.to_string(),
                OutputFormat::Table => format!(
                    "XP multiplier: x{} (allowed: {})",
                    user.xp_multiplier,
                    allowed.join(", ")
                ),
            }])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifequest_engine::EngineConfig;
    use lifequest_gatekeeper::ValidationConfig;
    use lifequest_store::SqliteStore;

    fn session() -> Session {
        let store = SqliteStore::new(":memory:").unwrap();
        Session::new(store, None, EngineConfig::default(), ValidationConfig::default()).unwrap()
    }

    #[test]
    fn test_xp_calc() {
        let mut session = session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let action = XpAction::Calc {
            module: "Goals".to_string(),
            difficulty: "hard".to_string(),
            period: Some("monthly".to_string()),
            personal: false,
        };
        assert_eq!(execute_xp(action, &mut session, &formatter).unwrap(), vec!["225"]);
    }

    #[test]
    fn test_xp_calc_missing_period() {
        let mut session = session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let action = XpAction::Calc {
            module: "challenges".to_string(),
            difficulty: "easy".to_string(),
            period: None,
            personal: false,
        };
        assert!(matches!(
            execute_xp(action, &mut session, &formatter),
            Err(CliError::Xp(_))
        ));
    }

    #[test]
    fn test_award_rejects_negative() {
        let mut session = session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = AwardArgs {
            xp: -5,
            source: "manual".to_string(),
            source_id: None,
        };
        assert!(execute_award(args, &mut session, &formatter).is_err());
        assert!(session.store.ledger_entries(session.user).unwrap().is_empty());
    }

    #[test]
    fn test_ledger_limit_keeps_latest() {
        let mut session = session();
        for xp in [1, 2, 3] {
            session
                .store
                .award_xp(session.user, xp, XpSource::Manual, None)
                .unwrap();
        }
        let formatter = Formatter::new(OutputFormat::Json, false);
        let lines = execute_ledger(Some(2), &mut session, &formatter).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        let amounts: Vec<i64> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["xp"].as_i64().unwrap())
            .collect();
        assert_eq!(amounts, vec![2, 3]);
    }

    #[test]
    fn test_multiplier_outside_allowed_set() {
        let mut session = session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = execute_multiplier(MultiplierAction::Set { value: 3.0 }, &mut session, &formatter);
        assert!(result.is_err());
        assert_eq!(session.store.require_user(session.user).unwrap().xp_multiplier, 1.0);
    }
}
