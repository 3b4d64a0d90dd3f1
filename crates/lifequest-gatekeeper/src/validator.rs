//! Achievement definition validation logic

use crate::{GatekeeperError, ValidationConfig};
use lifequest_domain::condition::{value_as_int, LEGACY_TARGET_KEYS};
use lifequest_domain::traits::AchievementStore;
use lifequest_domain::{
    AchievementDefinition, Condition, ConditionConfig, ConditionKind, DurationUnit, Mood,
    NewAchievement, Period, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An achievement definition as submitted by an author
///
/// The config is raw JSON so that a non-object can be reported instead of
/// failing to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDraft {
    /// Display name
    pub name: String,

    /// Display description
    #[serde(default)]
    pub description: String,

    /// Difficulty name
    #[serde(default = "default_difficulty")]
    pub difficulty: String,

    /// Condition kind name
    pub condition_type: String,

    /// Condition parameters; `null` counts as an empty object
    #[serde(default)]
    pub config: Value,

    /// Hidden until unlocked
    #[serde(default)]
    pub is_hidden: bool,

    /// Author; `None` for a global definition
    #[serde(default)]
    pub owner: Option<UserId>,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

impl AchievementDraft {
    /// Draft a global, visible, medium-difficulty definition
    pub fn new(name: impl Into<String>, condition_type: impl Into<String>, config: Value) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            difficulty: default_difficulty(),
            condition_type: condition_type.into(),
            config,
            is_hidden: false,
            owner: None,
        }
    }

    /// Draft carrying the current fields of a stored definition, for edits
    pub fn from_definition(definition: &AchievementDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            difficulty: definition.difficulty.clone(),
            condition_type: definition.condition_type().to_string(),
            config: Value::Object(definition.config.clone()),
            is_hidden: definition.is_hidden,
            owner: definition.owner,
        }
    }

    /// Set the author
    pub fn owned_by(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the difficulty name
    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }
}

/// Result of definition validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the definition passed validation
    pub status: ValidationStatus,

    /// Rejection reasons (if any)
    pub reasons: Vec<RejectionReason>,
}

impl ValidationResult {
    /// Whether the definition may be stored
    pub fn is_accepted(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Definition accepted
    Accepted,

    /// Definition rejected
    Rejected,
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Name blank or too long
    InvalidName(String),

    /// Description required but blank
    MissingDescription,

    /// Difficulty name blank
    MissingDifficulty,

    /// Config is neither an object nor null
    ConfigNotObject,

    /// Condition kind this build cannot evaluate
    UnknownConditionType(String),

    /// A parameter the kind needs is absent
    MissingParameter {
        /// Condition kind
        kind: ConditionKind,
        /// Parameter name
        field: &'static str,
    },

    /// A parameter is present but unusable
    InvalidParameter {
        /// Parameter name
        field: &'static str,
        /// Description of the issue
        issue: String,
    },

    /// A legacy key stands in for `target` and legacy keys are not accepted
    LegacyTargetKey {
        /// The key found
        key: &'static str,
    },

    /// Referenced record does not exist or belongs to someone else
    UnknownReference {
        /// Parameter name
        field: &'static str,
        /// Referenced id
        id: i64,
    },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::InvalidName(issue) => write!(f, "name {}", issue),
            RejectionReason::MissingDescription => f.write_str("description required"),
            RejectionReason::MissingDifficulty => f.write_str("difficulty required"),
            RejectionReason::ConfigNotObject => f.write_str("condition config must be a JSON object"),
            RejectionReason::UnknownConditionType(kind) => {
                write!(f, "unknown condition type '{}'", kind)
            }
            RejectionReason::MissingParameter { kind, field } => {
                write!(f, "{} required for {}", field, kind)
            }
            RejectionReason::InvalidParameter { field, issue } => write!(f, "{} {}", field, issue),
            RejectionReason::LegacyTargetKey { key } => {
                write!(f, "'{}' is no longer accepted, use 'target'", key)
            }
            RejectionReason::UnknownReference { field, id } => {
                write!(f, "{} {} does not exist", field, id)
            }
        }
    }
}

/// The Gatekeeper validates achievement definitions before storage
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The rules in force
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a draft against the configured rules
    ///
    /// # Arguments
    ///
    /// * `draft` - The definition to validate
    /// * `store` - Store for reference checks (optional)
    ///
    /// # Returns
    ///
    /// A validation result listing every rule the draft breaks. Only store
    /// failures are returned as errors.
    pub fn validate<S: AchievementStore>(
        &self,
        draft: &AchievementDraft,
        store: Option<&S>,
    ) -> Result<ValidationResult, GatekeeperError>
    where
        S::Error: fmt::Display,
    {
        let mut reasons = Vec::new();

        // 1. Presentation fields
        if self.config.validate_name {
            if let Some(reason) = self.validate_name(&draft.name) {
                reasons.push(reason);
            }
        }
        if self.config.require_description && draft.description.trim().is_empty() {
            reasons.push(RejectionReason::MissingDescription);
        }
        if draft.difficulty.trim().is_empty() {
            reasons.push(RejectionReason::MissingDifficulty);
        }

        // 2. Config shape
        let Some(config) = config_object(&draft.config) else {
            reasons.push(RejectionReason::ConfigNotObject);
            return Ok(finish(reasons));
        };

        // 3. Kind
        let Some(kind) = ConditionKind::parse(&draft.condition_type) else {
            if self.config.reject_unknown_kinds {
                reasons.push(RejectionReason::UnknownConditionType(
                    draft.condition_type.clone(),
                ));
            }
            return Ok(finish(reasons));
        };

        // 4. Parameters
        let before = reasons.len();
        if self.config.validate_parameters {
            self.validate_parameters(kind, &config, &mut reasons);
        }

        // 5. References (only once the parameters themselves are sound)
        if self.config.validate_references && reasons.len() == before {
            if let (Some(store), Some(owner)) = (store, draft.owner) {
                let condition = Condition::from_parts(kind.as_str(), &config);
                if let Some(reason) = check_references(&condition, owner, store)? {
                    reasons.push(reason);
                }
            }
        }

        Ok(finish(reasons))
    }

    /// Validate and, if accepted, produce the definition to store
    pub fn admit<S: AchievementStore>(
        &self,
        draft: &AchievementDraft,
        store: Option<&S>,
    ) -> Result<NewAchievement, GatekeeperError>
    where
        S::Error: fmt::Display,
    {
        let result = self.validate(draft, store)?;
        if !result.is_accepted() {
            return Err(GatekeeperError::Rejected(result.reasons));
        }

        let config = config_object(&draft.config).unwrap_or_default();
        Ok(NewAchievement {
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            difficulty: draft.difficulty.trim().to_lowercase(),
            condition: Condition::from_parts(&draft.condition_type, &config),
            config,
            is_hidden: draft.is_hidden,
            owner: draft.owner,
        })
    }

    fn validate_name(&self, name: &str) -> Option<RejectionReason> {
        let name = name.trim();
        if name.is_empty() {
            return Some(RejectionReason::InvalidName("is blank".to_string()));
        }
        let length = name.chars().count();
        if length > self.config.max_name_length {
            return Some(RejectionReason::InvalidName(format!(
                "is {} characters, at most {} allowed",
                length, self.config.max_name_length
            )));
        }
        None
    }

    fn validate_parameters(
        &self,
        kind: ConditionKind,
        config: &ConditionConfig,
        reasons: &mut Vec<RejectionReason>,
    ) {
        if kind.has_target() {
            if let Err(reason) = self.check_target(kind, config) {
                reasons.push(reason);
            }
        }

        let checked = match kind {
            ConditionKind::HabitDays | ConditionKind::HabitStreak => {
                required_id(kind, config, "habit_id")
            }
            ConditionKind::GoalCompletedByPeriod => {
                required_period(kind, config, Period::is_goal_period, "weekly/monthly/yearly")
            }
            ConditionKind::ChallengeCompleted => {
                optional_period(config, Period::is_challenge_period, "daily/weekly")
            }
            ConditionKind::SpecificMoodCount => required_mood(kind, config),
            ConditionKind::TodoCompleted => optional_id(config, "category_id"),
            ConditionKind::SobrietyDuration => {
                required_id(kind, config, "sobriety_id").and_then(|_| duration_unit(config))
            }
            ConditionKind::AnySobrietyDuration => duration_unit(config),
            ConditionKind::AnyHabitDays
            | ConditionKind::AnyHabitStreak
            | ConditionKind::GoalCompleted
            | ConditionKind::NotesCount
            | ConditionKind::MoodLoggedDays
            | ConditionKind::LevelReached
            | ConditionKind::XpReached
            | ConditionKind::Manual => Ok(()),
        };

        if let Err(reason) = checked {
            reasons.push(reason);
        }
    }

    /// `target` must be a positive integer; legacy keys only if allowed
    fn check_target(
        &self,
        kind: ConditionKind,
        config: &ConditionConfig,
    ) -> Result<(), RejectionReason> {
        if config.contains_key("target") {
            return positive_int(kind, config, "target");
        }

        match LEGACY_TARGET_KEYS.into_iter().find(|key| config.contains_key(*key)) {
            Some(key) if self.config.allow_legacy_target_keys => positive_int(kind, config, key),
            Some(key) => Err(RejectionReason::LegacyTargetKey { key }),
            None => Err(RejectionReason::MissingParameter {
                kind,
                field: "target",
            }),
        }
    }
}

fn finish(reasons: Vec<RejectionReason>) -> ValidationResult {
    let status = if reasons.is_empty() {
        ValidationStatus::Accepted
    } else {
        ValidationStatus::Rejected
    };
    ValidationResult { status, reasons }
}

fn config_object(config: &Value) -> Option<ConditionConfig> {
    match config {
        Value::Object(map) => Some(map.clone()),
        Value::Null => Some(ConditionConfig::new()),
        _ => None,
    }
}

/// Empty values count as absent: null, 0, "", false, [] and {}
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn positive_int(
    kind: ConditionKind,
    config: &ConditionConfig,
    field: &'static str,
) -> Result<(), RejectionReason> {
    let value = match config.get(field) {
        None | Some(Value::Null) => return Err(RejectionReason::MissingParameter { kind, field }),
        Some(value) => value,
    };
    match value_as_int(value) {
        None => Err(RejectionReason::InvalidParameter {
            field,
            issue: "must be integer".to_string(),
        }),
        Some(n) if n <= 0 => Err(RejectionReason::InvalidParameter {
            field,
            issue: "must be > 0".to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn required_id(
    kind: ConditionKind,
    config: &ConditionConfig,
    field: &'static str,
) -> Result<(), RejectionReason> {
    match config.get(field) {
        Some(value) if !is_blank(value) => positive_int(kind, config, field),
        _ => Err(RejectionReason::MissingParameter { kind, field }),
    }
}

fn optional_id(config: &ConditionConfig, field: &'static str) -> Result<(), RejectionReason> {
    match config.get(field) {
        None => Ok(()),
        Some(value) if value_as_int(value).is_some() => Ok(()),
        Some(_) => Err(RejectionReason::InvalidParameter {
            field,
            issue: "must be integer".to_string(),
        }),
    }
}

fn required_period(
    kind: ConditionKind,
    config: &ConditionConfig,
    allowed: fn(&Period) -> bool,
    expected: &str,
) -> Result<(), RejectionReason> {
    match config.get("period") {
        None | Some(Value::Null) => Err(RejectionReason::MissingParameter {
            kind,
            field: "period",
        }),
        Some(_) => optional_period(config, allowed, expected),
    }
}

fn optional_period(
    config: &ConditionConfig,
    allowed: fn(&Period) -> bool,
    expected: &str,
) -> Result<(), RejectionReason> {
    let Some(value) = config.get("period") else {
        return Ok(());
    };
    match value.as_str().and_then(Period::parse) {
        Some(period) if allowed(&period) => Ok(()),
        _ => Err(RejectionReason::InvalidParameter {
            field: "period",
            issue: format!("must be {}", expected),
        }),
    }
}

fn required_mood(kind: ConditionKind, config: &ConditionConfig) -> Result<(), RejectionReason> {
    let value = match config.get("mood") {
        Some(value) if !is_blank(value) => value,
        _ => {
            return Err(RejectionReason::MissingParameter {
                kind,
                field: "mood",
            })
        }
    };
    if value.as_str().and_then(Mood::parse).is_some() {
        return Ok(());
    }
    let names: Vec<&str> = Mood::ALL.iter().map(Mood::as_str).collect();
    Err(RejectionReason::InvalidParameter {
        field: "mood",
        issue: format!("must be one of {}", names.join("/")),
    })
}

/// `unit` defaults to days when absent
fn duration_unit(config: &ConditionConfig) -> Result<(), RejectionReason> {
    match config.get("unit") {
        None => Ok(()),
        Some(value) if value.as_str().and_then(DurationUnit::parse).is_some() => Ok(()),
        Some(_) => Err(RejectionReason::InvalidParameter {
            field: "unit",
            issue: "must be days/months/years".to_string(),
        }),
    }
}

/// Check that referenced habits and streaks exist and belong to `owner`
fn check_references<S: AchievementStore>(
    condition: &Condition,
    owner: UserId,
    store: &S,
) -> Result<Option<RejectionReason>, GatekeeperError>
where
    S::Error: fmt::Display,
{
    let store_err = |e: S::Error| GatekeeperError::Store(format!("Failed to check reference: {}", e));

    let missing = match condition {
        Condition::HabitDays { habit_id: Some(id) }
        | Condition::HabitStreak { habit_id: Some(id) } => store
            .owned_habit(owner, *id)
            .map_err(store_err)?
            .is_none()
            .then_some(("habit_id", id.value())),
        Condition::SobrietyDuration {
            sobriety_id: Some(id),
            ..
        } => store
            .get_sobriety(owner, *id)
            .map_err(store_err)?
            .is_none()
            .then_some(("sobriety_id", id.value())),
        _ => None,
    };

    Ok(missing.map(|(field, id)| RejectionReason::UnknownReference { field, id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lifequest_store::SqliteStore;
    use serde_json::json;

    fn validate(draft: &AchievementDraft) -> ValidationResult {
        Gatekeeper::default_config()
            .validate::<SqliteStore>(draft, None)
            .unwrap()
    }

    fn only_reason(draft: &AchievementDraft) -> RejectionReason {
        let result = validate(draft);
        assert_eq!(result.status, ValidationStatus::Rejected);
        assert_eq!(result.reasons.len(), 1, "reasons: {:?}", result.reasons);
        result.reasons[0].clone()
    }

    #[test]
    fn test_valid_definitions() {
        let drafts = [
            AchievementDraft::new("First steps", "any_habit_days", json!({"target": 1})),
            AchievementDraft::new("Runner", "habit_streak", json!({"target": 7, "habit_id": 3})),
            AchievementDraft::new("Planner", "goal_completed_by_period", json!({"target": "2", "period": "monthly"})),
            AchievementDraft::new("Happy", "specific_mood_count", json!({"target": 5, "mood": "great"})),
            AchievementDraft::new("Clean", "sobriety_duration", json!({"target": 1, "sobriety_id": 2, "unit": "years"})),
            AchievementDraft::new("Any clean", "any_sobriety_duration", json!({"target": 30})),
            AchievementDraft::new("Chores", "todo_completed", json!({"target": 10, "category_id": "4"})),
            AchievementDraft::new("Daily grind", "challenge_completed", json!({"target": 3, "period": "daily"})),
            AchievementDraft::new("Founder", "manual", Value::Null),
        ];
        for draft in &drafts {
            let result = validate(draft);
            assert!(result.is_accepted(), "{}: {:?}", draft.name, result.reasons);
        }
    }

    #[test]
    fn test_config_must_be_object() {
        let draft = AchievementDraft::new("Bad", "notes_count", json!([1, 2]));
        assert_eq!(only_reason(&draft), RejectionReason::ConfigNotObject);
    }

    #[test]
    fn test_target_rules() {
        let missing = AchievementDraft::new("T", "notes_count", json!({}));
        assert_eq!(
            only_reason(&missing),
            RejectionReason::MissingParameter {
                kind: ConditionKind::NotesCount,
                field: "target"
            }
        );

        let text = AchievementDraft::new("T", "xp_reached", json!({"target": "lots"}));
        assert!(matches!(
            only_reason(&text),
            RejectionReason::InvalidParameter { field: "target", .. }
        ));

        let zero = AchievementDraft::new("T", "level_reached", json!({"target": 0}));
        match only_reason(&zero) {
            RejectionReason::InvalidParameter { issue, .. } => assert!(issue.contains("> 0")),
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_manual_needs_no_target() {
        let draft = AchievementDraft::new("Hand picked", "manual", json!({}));
        assert!(validate(&draft).is_accepted());
    }

    #[test]
    fn test_legacy_key_refused_by_default() {
        let draft = AchievementDraft::new("Old", "any_habit_days", json!({"days": 30}));
        assert_eq!(only_reason(&draft), RejectionReason::LegacyTargetKey { key: "days" });

        let permissive = Gatekeeper::new(ValidationConfig::permissive());
        let result = permissive.validate::<SqliteStore>(&draft, None).unwrap();
        assert!(result.is_accepted());

        let broken = AchievementDraft::new("Old", "any_habit_days", json!({"count": -1}));
        let result = permissive.validate::<SqliteStore>(&broken, None).unwrap();
        assert!(!result.is_accepted());
    }

    #[test]
    fn test_habit_id_required() {
        for config in [json!({"target": 5}), json!({"target": 5, "habit_id": 0}), json!({"target": 5, "habit_id": ""})] {
            let draft = AchievementDraft::new("H", "habit_days", config);
            assert_eq!(
                only_reason(&draft),
                RejectionReason::MissingParameter {
                    kind: ConditionKind::HabitDays,
                    field: "habit_id"
                }
            );
        }
    }

    #[test]
    fn test_period_enumerations() {
        let daily_goal = AchievementDraft::new("G", "goal_completed_by_period", json!({"target": 1, "period": "daily"}));
        assert!(matches!(
            only_reason(&daily_goal),
            RejectionReason::InvalidParameter { field: "period", .. }
        ));

        let yearly_challenge = AchievementDraft::new("C", "challenge_completed", json!({"target": 1, "period": "yearly"}));
        assert!(matches!(
            only_reason(&yearly_challenge),
            RejectionReason::InvalidParameter { field: "period", .. }
        ));

        let missing = AchievementDraft::new("G", "goal_completed_by_period", json!({"target": 1}));
        assert!(matches!(
            only_reason(&missing),
            RejectionReason::MissingParameter { field: "period", .. }
        ));
    }

    #[test]
    fn test_mood_and_unit() {
        let no_mood = AchievementDraft::new("M", "specific_mood_count", json!({"target": 1}));
        assert!(matches!(only_reason(&no_mood), RejectionReason::MissingParameter { field: "mood", .. }));

        let odd_mood = AchievementDraft::new("M", "specific_mood_count", json!({"target": 1, "mood": "ecstatic"}));
        assert!(matches!(only_reason(&odd_mood), RejectionReason::InvalidParameter { field: "mood", .. }));

        let weeks = AchievementDraft::new("S", "any_sobriety_duration", json!({"target": 1, "unit": "weeks"}));
        assert!(matches!(only_reason(&weeks), RejectionReason::InvalidParameter { field: "unit", .. }));

        let no_streak = AchievementDraft::new("S", "sobriety_duration", json!({"target": 1}));
        assert!(matches!(only_reason(&no_streak), RejectionReason::MissingParameter { field: "sobriety_id", .. }));
    }

    #[test]
    fn test_category_must_be_integer() {
        let draft = AchievementDraft::new("T", "todo_completed", json!({"target": 1, "category_id": "home"}));
        assert!(matches!(
            only_reason(&draft),
            RejectionReason::InvalidParameter { field: "category_id", .. }
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let draft = AchievementDraft::new("Sleep", "sleep_hours", json!({"target": 8}));
        assert_eq!(
            only_reason(&draft),
            RejectionReason::UnknownConditionType("sleep_hours".to_string())
        );

        let permissive = Gatekeeper::new(ValidationConfig::permissive());
        let admitted = permissive.admit::<SqliteStore>(&draft, None).unwrap();
        assert_eq!(
            admitted.condition,
            Condition::Unknown {
                condition_type: "sleep_hours".to_string()
            }
        );
    }

    #[test]
    fn test_name_rules() {
        let blank = AchievementDraft::new("   ", "notes_count", json!({"target": 1}));
        assert!(matches!(only_reason(&blank), RejectionReason::InvalidName(_)));

        let long = AchievementDraft::new("x".repeat(121), "notes_count", json!({"target": 1}));
        assert!(matches!(only_reason(&long), RejectionReason::InvalidName(_)));
    }

    #[test]
    fn test_strict_requires_description() {
        let draft = AchievementDraft::new("Quiet", "notes_count", json!({"target": 1}));
        let strict = Gatekeeper::new(ValidationConfig::strict());
        let result = strict.validate::<SqliteStore>(&draft, None).unwrap();
        assert_eq!(result.reasons, vec![RejectionReason::MissingDescription]);
    }

    #[test]
    fn test_multiple_validation_errors() {
        let mut draft = AchievementDraft::new("", "habit_days", json!({"target": -2}));
        draft.difficulty = String::new();
        let result = validate(&draft);
        assert_eq!(result.status, ValidationStatus::Rejected);
        assert_eq!(result.reasons.len(), 4);
    }

    #[test]
    fn test_admit_normalizes_fields() {
        let draft = AchievementDraft::new("  Streaker ", "habit_streak", json!({"target": 7, "habit_id": "3"}))
            .with_difficulty(" Hard ");
        let admitted = Gatekeeper::default_config()
            .admit::<SqliteStore>(&draft, None)
            .unwrap();
        assert_eq!(admitted.name, "Streaker");
        assert_eq!(admitted.difficulty, "hard");
        assert_eq!(
            admitted.condition,
            Condition::HabitStreak {
                habit_id: Some(lifequest_domain::HabitId(3))
            }
        );
    }

    #[test]
    fn test_admit_rejects_with_reasons() {
        let draft = AchievementDraft::new("Bad", "notes_count", json!("ten"));
        match Gatekeeper::default_config().admit::<SqliteStore>(&draft, None) {
            Err(GatekeeperError::Rejected(reasons)) => {
                assert_eq!(reasons, vec![RejectionReason::ConfigNotObject])
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_references_checked_against_owner() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let author = store.create_user().unwrap().id;
        let other = store.create_user().unwrap().id;
        let own_habit = store.create_habit(author, "Read", "easy").unwrap().id;
        let foreign_habit = store.create_habit(other, "Swim", "easy").unwrap().id;
        let streak = store.create_sobriety(author, "coffee", Utc::now()).unwrap().id;

        let gatekeeper = Gatekeeper::default_config();

        let own = AchievementDraft::new("Reader", "habit_days", json!({"target": 5, "habit_id": own_habit.value()}))
            .owned_by(author);
        assert!(gatekeeper.validate(&own, Some(&store)).unwrap().is_accepted());

        let foreign = AchievementDraft::new("Swimmer", "habit_days", json!({"target": 5, "habit_id": foreign_habit.value()}))
            .owned_by(author);
        let result = gatekeeper.validate(&foreign, Some(&store)).unwrap();
        assert_eq!(
            result.reasons,
            vec![RejectionReason::UnknownReference {
                field: "habit_id",
                id: foreign_habit.value()
            }]
        );

        let sober = AchievementDraft::new("Decaf", "sobriety_duration", json!({"target": 1, "sobriety_id": streak.value()}))
            .owned_by(author);
        assert!(gatekeeper.validate(&sober, Some(&store)).unwrap().is_accepted());

        let missing = AchievementDraft::new("Ghost", "sobriety_duration", json!({"target": 1, "sobriety_id": 999}))
            .owned_by(author);
        assert!(!gatekeeper.validate(&missing, Some(&store)).unwrap().is_accepted());

        // Global definitions are not tied to anyone's records
        let global = AchievementDraft::new("Anyone", "habit_days", json!({"target": 5, "habit_id": 999}));
        assert!(gatekeeper.validate(&global, Some(&store)).unwrap().is_accepted());
    }

    #[test]
    fn test_draft_from_definition_round_trips() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let draft = AchievementDraft::new("Writer", "notes_count", json!({"target": 3}));
        let new = Gatekeeper::default_config()
            .admit::<SqliteStore>(&draft, None)
            .unwrap();
        let stored = store.create_achievement(&new).unwrap();

        let again = AchievementDraft::from_definition(&stored);
        assert_eq!(again.condition_type, "notes_count");
        assert_eq!(again.config, json!({"target": 3}));
        assert!(validate(&again).is_accepted());
    }
}
