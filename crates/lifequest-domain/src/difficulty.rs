//! Difficulty module - ranked tiers that drive base XP

use serde::{Deserialize, Serialize};

/// Difficulty tier of a habit, goal, todo, challenge or achievement
///
/// Tiers are ordered by effort:
/// - Trivial: no reward, bookkeeping only
/// - Easy: small daily actions
/// - Medium: actions that take real effort
/// - Hard: demanding actions
///
/// The base XP for a tier is looked up by name in [`crate::XpRules`], so the
/// stored name is what matters to the formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// No reward
    Trivial,

    /// Small effort
    Easy,

    /// Moderate effort
    Medium,

    /// High effort
    Hard,
}

impl Difficulty {
    /// All tiers, lowest first
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Trivial,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
    ];

    /// Get the difficulty name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Trivial => "trivial",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a difficulty from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trivial" => Some(Difficulty::Trivial),
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Ordering value used for sorting achievement catalogs
    pub fn order(&self) -> u8 {
        match self {
            Difficulty::Trivial => 1,
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }

    /// Get the next harder tier
    pub fn next(&self) -> Option<Self> {
        match self {
            Difficulty::Trivial => Some(Difficulty::Easy),
            Difficulty::Easy => Some(Difficulty::Medium),
            Difficulty::Medium => Some(Difficulty::Hard),
            Difficulty::Hard => None,
        }
    }

    /// Get the next easier tier
    pub fn previous(&self) -> Option<Self> {
        match self {
            Difficulty::Trivial => None,
            Difficulty::Easy => Some(Difficulty::Trivial),
            Difficulty::Medium => Some(Difficulty::Easy),
            Difficulty::Hard => Some(Difficulty::Medium),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid difficulty: {}", s))
    }
}
