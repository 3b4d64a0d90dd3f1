//! Gatekeeper configuration

/// Longest accepted achievement name
pub const MAX_NAME_LENGTH: usize = 120;

/// Configuration for validation rules
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Reject blank or overlong names
    pub validate_name: bool,

    /// Longest accepted name, in characters
    pub max_name_length: usize,

    /// Reject definitions without a description
    pub require_description: bool,

    /// Check the parameters each condition kind needs
    pub validate_parameters: bool,

    /// Check that referenced habits and sobriety streaks belong to the author
    /// (only when a store is supplied)
    pub validate_references: bool,

    /// Refuse condition kinds this build cannot evaluate
    pub reject_unknown_kinds: bool,

    /// Accept `days`, `count`, `xp`, `level`, `streak` or `value` in place of
    /// a missing `target`
    pub allow_legacy_target_keys: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_name: true,
            max_name_length: MAX_NAME_LENGTH,
            require_description: false,
            validate_parameters: true,
            validate_references: true,
            reject_unknown_kinds: true,
            allow_legacy_target_keys: false,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (importing older catalogs)
    ///
    /// Legacy target keys and unknown kinds pass; unknown kinds are stored
    /// and evaluate to 0.
    pub fn permissive() -> Self {
        Self {
            validate_name: true,
            max_name_length: MAX_NAME_LENGTH,
            require_description: false,
            validate_parameters: true,
            validate_references: false,
            reject_unknown_kinds: false,
            allow_legacy_target_keys: true,
        }
    }

    /// Create a strict configuration (all validations enabled)
    pub fn strict() -> Self {
        Self {
            validate_name: true,
            max_name_length: MAX_NAME_LENGTH,
            require_description: true,
            validate_parameters: true,
            validate_references: true,
            reject_unknown_kinds: true,
            allow_legacy_target_keys: false,
        }
    }
}
