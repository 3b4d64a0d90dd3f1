//! XP formula
//!
//! The one place XP amounts are computed. Every XP-producing flow goes through
//! [`calculate_xp`] with the deployment's [`XpRules`].

use crate::level::calculate_level;
use crate::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// XP needed to leave level 1; level L costs `BASE_LEVEL_XP * L`
pub const BASE_LEVEL_XP: i64 = 100;

/// Personal multiplier applied when a user has not chosen one
pub const DEFAULT_XP_MULTIPLIER: f64 = 1.0;

/// Errors raised by the XP formula and rule validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XpError {
    /// Difficulty key missing from the base XP table
    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),

    /// Module key missing from the module multiplier table
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// Period key not valid for the module
    #[error("Unknown period '{period}' for module {module}")]
    UnknownPeriod {
        /// Module being scored
        module: String,
        /// Offending period key
        period: String,
    },

    /// Module needs a period multiplier but none was given
    #[error("Module {0} requires a period")]
    MissingPeriod(String),

    /// Personal multiplier outside the allowed set
    #[error("Invalid XP multiplier: {0}")]
    InvalidMultiplier(f64),

    /// Rule tables are inconsistent
    #[error("Invalid XP rules: {0}")]
    InvalidRules(String),

    /// Award would push the running total past the integer range
    #[error("XP total overflow: {total} + {xp}")]
    TotalOverflow {
        /// Total before the award
        total: i64,
        /// Amount being awarded
        xp: i64,
    },
}

impl XpError {
    /// True for unknown table keys (difficulty, module, period)
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            XpError::UnknownDifficulty(_) | XpError::UnknownModule(_) | XpError::UnknownPeriod { .. }
        )
    }
}

/// Static XP tables
///
/// Loaded by the configuration layer and passed by reference into the core.
/// Every table is keyed by name so deployments can add difficulties or modules
/// without a code change.
///
/// # Examples
///
/// ```
/// use lifequest_domain::{calculate_xp, XpRules};
///
/// let rules = XpRules::default();
/// assert_eq!(calculate_xp(&rules, "habits", "easy", None, None).unwrap(), 10);
/// assert_eq!(calculate_xp(&rules, "goals", "medium", Some("monthly"), None).unwrap(), 90);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpRules {
    /// Base XP per difficulty name
    #[serde(default = "default_base_xp")]
    pub base_xp: BTreeMap<String, i64>,

    /// Multiplier per module key
    #[serde(default = "default_module_multipliers")]
    pub module_multipliers: BTreeMap<String, f64>,

    /// Period multipliers per module; a module listed here requires a period
    #[serde(default = "default_period_multipliers")]
    pub period_multipliers: BTreeMap<String, BTreeMap<String, f64>>,

    /// XP cost of level 1; level L costs `base_level_xp * L`
    #[serde(default = "default_base_level_xp")]
    pub base_level_xp: i64,

    /// Personal multipliers a user may choose from
    #[serde(default = "default_allowed_multipliers")]
    pub allowed_multipliers: Vec<f64>,

    /// Multiplier given to new users
    #[serde(default = "default_multiplier")]
    pub default_multiplier: f64,
}

fn default_base_xp() -> BTreeMap<String, i64> {
    [("trivial", 0), ("easy", 10), ("medium", 20), ("hard", 50)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn default_module_multipliers() -> BTreeMap<String, f64> {
    [
        ("habits", 1.0),
        ("todos", 0.5),
        ("challenges", 1.0),
        ("goals", 1.5),
        ("mood", 0.5),
        ("random", 1.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_period_multipliers() -> BTreeMap<String, BTreeMap<String, f64>> {
    let table = |entries: &[(&str, f64)]| -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    };

    let mut periods = BTreeMap::new();
    periods.insert(
        "challenges".to_string(),
        table(&[("daily", 1.0), ("weekly", 1.5)]),
    );
    periods.insert(
        "goals".to_string(),
        table(&[("weekly", 1.0), ("monthly", 3.0), ("yearly", 8.0)]),
    );
    periods
}

fn default_base_level_xp() -> i64 {
    BASE_LEVEL_XP
}

fn default_allowed_multipliers() -> Vec<f64> {
    vec![0.5, 1.0, 1.5, 2.0]
}

fn default_multiplier() -> f64 {
    DEFAULT_XP_MULTIPLIER
}

impl Default for XpRules {
    fn default() -> Self {
        Self {
            base_xp: default_base_xp(),
            module_multipliers: default_module_multipliers(),
            period_multipliers: default_period_multipliers(),
            base_level_xp: default_base_level_xp(),
            allowed_multipliers: default_allowed_multipliers(),
            default_multiplier: default_multiplier(),
        }
    }
}

impl XpRules {
    /// Check the tables for values the formula cannot work with
    pub fn validate(&self) -> Result<(), XpError> {
        if self.base_level_xp <= 0 {
            return Err(XpError::InvalidRules(format!(
                "base_level_xp must be > 0, got {}",
                self.base_level_xp
            )));
        }

        if let Some((name, xp)) = self.base_xp.iter().find(|(_, xp)| **xp < 0) {
            return Err(XpError::InvalidRules(format!(
                "base XP for '{}' must be >= 0, got {}",
                name, xp
            )));
        }

        let negative_module = self
            .module_multipliers
            .iter()
            .find(|(_, m)| !m.is_finite() || **m < 0.0);
        if let Some((name, m)) = negative_module {
            return Err(XpError::InvalidRules(format!(
                "multiplier for module '{}' must be >= 0, got {}",
                name, m
            )));
        }

        for (module, periods) in &self.period_multipliers {
            if let Some((period, m)) = periods.iter().find(|(_, m)| !m.is_finite() || **m < 0.0) {
                return Err(XpError::InvalidRules(format!(
                    "multiplier for {} period '{}' must be >= 0, got {}",
                    module, period, m
                )));
            }
        }

        if self.allowed_multipliers.is_empty() {
            return Err(XpError::InvalidRules(
                "allowed_multipliers must not be empty".to_string(),
            ));
        }

        if let Some(m) = self
            .allowed_multipliers
            .iter()
            .find(|m| !m.is_finite() || **m < 0.0)
        {
            return Err(XpError::InvalidRules(format!(
                "allowed multiplier must be >= 0, got {}",
                m
            )));
        }

        self.check_multiplier(self.default_multiplier)?;
        Ok(())
    }

    /// Confirm a personal multiplier is one of the allowed values
    pub fn check_multiplier(&self, multiplier: f64) -> Result<f64, XpError> {
        self.allowed_multipliers
            .iter()
            .copied()
            .find(|allowed| (allowed - multiplier).abs() < f64::EPSILON)
            .ok_or(XpError::InvalidMultiplier(multiplier))
    }

    /// Whether XP for `module` needs a period multiplier
    pub fn requires_period(&self, module: &str) -> bool {
        self.period_multipliers.contains_key(module)
    }

    /// Level for a cumulative XP total under these rules
    pub fn level_for(&self, total_xp: i64) -> u32 {
        calculate_level(total_xp, self.base_level_xp)
    }
}

/// Compute the XP for one action
///
/// `xp = BASE_XP[difficulty] * MODULE_MULTIPLIER[module]`, times the period
/// multiplier when the module requires one, times the user's personal multiplier
/// when a user is given. Intermediate values are `f64`; the result is truncated
/// toward zero once, at the end.
///
/// A period passed for a module that does not need one is ignored.
///
/// # Errors
///
/// - [`XpError::UnknownDifficulty`] / [`XpError::UnknownModule`] for keys missing
///   from the tables
/// - [`XpError::MissingPeriod`] when the module needs a period and none is given
/// - [`XpError::UnknownPeriod`] when the period is not valid for the module
pub fn calculate_xp(
    rules: &XpRules,
    module: &str,
    difficulty: &str,
    period: Option<&str>,
    user: Option<&User>,
) -> Result<i64, XpError> {
    let base_xp = *rules
        .base_xp
        .get(difficulty)
        .ok_or_else(|| XpError::UnknownDifficulty(difficulty.to_string()))?;
    let module_multiplier = *rules
        .module_multipliers
        .get(module)
        .ok_or_else(|| XpError::UnknownModule(module.to_string()))?;

    let mut xp = base_xp as f64 * module_multiplier;

    if let Some(periods) = rules.period_multipliers.get(module) {
        let period = period.ok_or_else(|| XpError::MissingPeriod(module.to_string()))?;
        let period_multiplier = periods.get(period).ok_or_else(|| XpError::UnknownPeriod {
            module: module.to_string(),
            period: period.to_string(),
        })?;
        xp *= period_multiplier;
    }

    if let Some(user) = user {
        xp *= user.xp_multiplier;
    }

    Ok(xp.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;

    fn user_with_multiplier(multiplier: f64) -> User {
        let mut user = User::new(UserId(1), chrono::Utc::now());
        user.xp_multiplier = multiplier;
        user
    }

    #[test]
    fn test_easy_habit() {
        let rules = XpRules::default();
        assert_eq!(calculate_xp(&rules, "habits", "easy", None, None), Ok(10));
    }

    #[test]
    fn test_medium_greater_than_easy() {
        let rules = XpRules::default();
        let easy = calculate_xp(&rules, "habits", "easy", None, None).unwrap();
        let medium = calculate_xp(&rules, "habits", "medium", None, None).unwrap();
        assert_eq!(easy, 10);
        assert_eq!(medium, 20);
    }

    #[test]
    fn test_user_multiplier_applied() {
        let rules = XpRules::default();
        let user = user_with_multiplier(2.0);
        assert_eq!(
            calculate_xp(&rules, "habits", "easy", None, Some(&user)),
            Ok(20)
        );
    }

    #[test]
    fn test_truncation_happens_once_at_the_end() {
        let mut rules = XpRules::default();
        rules.base_xp.insert("odd".to_string(), 15);

        // 15 * 0.5 = 7.5, * 2.0 = 15; truncating 7.5 first would give 14
        let double = user_with_multiplier(2.0);
        assert_eq!(
            calculate_xp(&rules, "todos", "odd", None, Some(&double)),
            Ok(15)
        );

        // 10 * 1.0 * 1.5 * 0.5 = 7.5 -> 7
        let half = user_with_multiplier(0.5);
        assert_eq!(
            calculate_xp(&rules, "challenges", "easy", Some("weekly"), Some(&half)),
            Ok(7)
        );
    }

    #[test]
    fn test_goal_period_multipliers() {
        let rules = XpRules::default();
        assert_eq!(calculate_xp(&rules, "goals", "hard", Some("weekly"), None), Ok(75));
        assert_eq!(calculate_xp(&rules, "goals", "hard", Some("monthly"), None), Ok(225));
        assert_eq!(calculate_xp(&rules, "goals", "hard", Some("yearly"), None), Ok(600));
    }

    #[test]
    fn test_missing_period_is_configuration_error() {
        let rules = XpRules::default();
        let err = calculate_xp(&rules, "challenges", "easy", None, None).unwrap_err();
        assert_eq!(err, XpError::MissingPeriod("challenges".to_string()));
        assert!(!err.is_lookup());
    }

    #[test]
    fn test_unknown_keys_are_lookup_errors() {
        let rules = XpRules::default();
        assert!(calculate_xp(&rules, "habits", "legendary", None, None)
            .unwrap_err()
            .is_lookup());
        assert!(calculate_xp(&rules, "chores", "easy", None, None)
            .unwrap_err()
            .is_lookup());
        assert!(calculate_xp(&rules, "goals", "easy", Some("daily"), None)
            .unwrap_err()
            .is_lookup());
    }

    #[test]
    fn test_period_ignored_when_not_required() {
        let rules = XpRules::default();
        assert_eq!(
            calculate_xp(&rules, "habits", "easy", Some("yearly"), None),
            Ok(10)
        );
    }

    #[test]
    fn test_trivial_yields_zero() {
        let rules = XpRules::default();
        assert_eq!(calculate_xp(&rules, "goals", "trivial", Some("yearly"), None), Ok(0));
    }

    #[test]
    fn test_default_rules_validate() {
        assert!(XpRules::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut rules = XpRules::default();
        rules.base_level_xp = 0;
        assert!(rules.validate().is_err());

        let mut rules = XpRules::default();
        rules.base_xp.insert("cursed".to_string(), -5);
        assert!(rules.validate().is_err());

        let mut rules = XpRules::default();
        rules.default_multiplier = 3.0;
        assert!(matches!(rules.validate(), Err(XpError::InvalidMultiplier(_))));
    }

    #[test]
    fn test_check_multiplier() {
        let rules = XpRules::default();
        assert_eq!(rules.check_multiplier(1.5), Ok(1.5));
        assert_eq!(rules.check_multiplier(1.25), Err(XpError::InvalidMultiplier(1.25)));
    }

    #[test]
    fn test_rules_from_partial_toml_keep_defaults() {
        let rules: XpRules = serde_json::from_str(r#"{"base_level_xp": 250}"#).unwrap();
        assert_eq!(rules.base_level_xp, 250);
        assert_eq!(rules.base_xp.get("hard"), Some(&50));
        assert!(rules.requires_period("goals"));
        assert!(!rules.requires_period("habits"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::{Difficulty, UserId};
    use proptest::prelude::*;

    fn module_and_period() -> impl Strategy<Value = (&'static str, Option<&'static str>)> {
        prop_oneof![
            Just(("habits", None)),
            Just(("todos", None)),
            Just(("mood", None)),
            Just(("random", None)),
            Just(("challenges", Some("daily"))),
            Just(("challenges", Some("weekly"))),
            Just(("goals", Some("weekly"))),
            Just(("goals", Some("monthly"))),
            Just(("goals", Some("yearly"))),
        ]
    }

    proptest! {
        /// Property: identical arguments always give identical XP
        #[test]
        fn test_xp_is_deterministic(
            (module, period) in module_and_period(),
            difficulty in 0..4usize,
        ) {
            let rules = XpRules::default();
            let difficulty = Difficulty::ALL[difficulty].as_str();
            let first = calculate_xp(&rules, module, difficulty, period, None);
            let second = calculate_xp(&rules, module, difficulty, period, None);
            prop_assert_eq!(first, second);
        }

        /// Property: XP never decreases as difficulty rises
        #[test]
        fn test_xp_monotonic_in_difficulty(
            (module, period) in module_and_period(),
            multiplier_index in 0..4usize,
        ) {
            let rules = XpRules::default();
            let mut user = User::new(UserId(1), chrono::Utc::now());
            user.xp_multiplier = rules.allowed_multipliers[multiplier_index];

            let amounts: Vec<i64> = Difficulty::ALL
                .iter()
                .map(|d| calculate_xp(&rules, module, d.as_str(), period, Some(&user)).unwrap())
                .collect();

            for pair in amounts.windows(2) {
                prop_assert!(pair[0] <= pair[1], "{:?} not monotonic", amounts);
            }
        }

        /// Property: XP is never negative under valid rules
        #[test]
        fn test_xp_non_negative(
            (module, period) in module_and_period(),
            difficulty in 0..4usize,
        ) {
            let rules = XpRules::default();
            let xp = calculate_xp(&rules, module, Difficulty::ALL[difficulty].as_str(), period, None).unwrap();
            prop_assert!(xp >= 0);
        }
    }
}
