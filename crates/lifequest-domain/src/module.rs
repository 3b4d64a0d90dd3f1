//! XP-producing modules, cadence periods and ledger source tags

use serde::{Deserialize, Serialize};

/// Subsystem that produces XP
///
/// Each module has a multiplier in [`crate::XpRules`]. Challenges and goals also
/// carry a [`Period`] multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    /// Daily habits
    Habits,
    /// One-off tasks
    Todos,
    /// Daily and weekly challenges
    Challenges,
    /// Weekly, monthly and yearly goals
    Goals,
    /// Mood journal
    Mood,
    /// Random rewards
    Random,
}

impl Module {
    /// Get the table key for this module
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Habits => "habits",
            Module::Todos => "todos",
            Module::Challenges => "challenges",
            Module::Goals => "goals",
            Module::Mood => "mood",
            Module::Random => "random",
        }
    }

    /// Parse a module from its table key
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "habits" => Some(Module::Habits),
            "todos" => Some(Module::Todos),
            "challenges" => Some(Module::Challenges),
            "goals" => Some(Module::Goals),
            "mood" => Some(Module::Mood),
            "random" => Some(Module::Random),
            _ => None,
        }
    }

    /// Ledger source tag used when this module awards XP
    pub fn source(&self) -> XpSource {
        match self {
            Module::Habits => XpSource::Habit,
            Module::Todos => XpSource::Todo,
            Module::Challenges => XpSource::Challenge,
            Module::Goals => XpSource::Goal,
            Module::Mood => XpSource::Mood,
            Module::Random => XpSource::Manual,
        }
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Module {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid module: {}", s))
    }
}

/// Cadence of a challenge (daily/weekly) or goal (weekly/monthly/yearly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Every day
    Daily,
    /// Every week
    Weekly,
    /// Every month
    Monthly,
    /// Every year
    Yearly,
}

impl Period {
    /// Get the table key for this period
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    /// Parse a period from its table key
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Period::Daily),
            "weekly" => Some(Period::Weekly),
            "monthly" => Some(Period::Monthly),
            "yearly" => Some(Period::Yearly),
            _ => None,
        }
    }

    /// Periods a goal may use
    pub fn is_goal_period(&self) -> bool {
        matches!(self, Period::Weekly | Period::Monthly | Period::Yearly)
    }

    /// Periods a challenge may use
    pub fn is_challenge_period(&self) -> bool {
        matches!(self, Period::Daily | Period::Weekly)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid period: {}", s))
    }
}

/// Source tag recorded on every ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XpSource {
    /// A habit day was completed
    Habit,
    /// A todo was completed
    Todo,
    /// A challenge was completed
    Challenge,
    /// A goal was completed
    Goal,
    /// A mood entry was logged
    Mood,
    /// Administrative or manual grant
    Manual,
}

impl XpSource {
    /// Get the stored tag
    pub fn as_str(&self) -> &'static str {
        match self {
            XpSource::Habit => "habit",
            XpSource::Todo => "todo",
            XpSource::Challenge => "challenge",
            XpSource::Goal => "goal",
            XpSource::Mood => "mood",
            XpSource::Manual => "manual",
        }
    }

    /// Parse a stored tag
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "habit" => Some(XpSource::Habit),
            "todo" => Some(XpSource::Todo),
            "challenge" => Some(XpSource::Challenge),
            "goal" => Some(XpSource::Goal),
            "mood" => Some(XpSource::Mood),
            "manual" => Some(XpSource::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for XpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for XpSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid XP source: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_keys_parse_back() {
        for module in [
            Module::Habits,
            Module::Todos,
            Module::Challenges,
            Module::Goals,
            Module::Mood,
            Module::Random,
        ] {
            assert_eq!(Module::parse(module.as_str()), Some(module));
        }
        assert_eq!(Module::parse("notes"), None);
    }

    #[test]
    fn test_period_applicability() {
        assert!(Period::Daily.is_challenge_period());
        assert!(!Period::Daily.is_goal_period());
        assert!(Period::Weekly.is_challenge_period() && Period::Weekly.is_goal_period());
        assert!(Period::Yearly.is_goal_period());
    }

    #[test]
    fn test_module_source_tags() {
        assert_eq!(Module::Habits.source(), XpSource::Habit);
        assert_eq!(Module::Goals.source().as_str(), "goal");
        assert!("bogus".parse::<XpSource>().is_err());
    }
}
