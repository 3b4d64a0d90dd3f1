//! Gatekeeper error types

use crate::RejectionReason;
use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Store error during reference checks
    #[error("Store error: {0}")]
    Store(String),

    /// The definition failed validation
    #[error("Achievement rejected: {}", join_reasons(.0))]
    Rejected(Vec<RejectionReason>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

fn join_reasons(reasons: &[RejectionReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_lists_every_reason() {
        let err = GatekeeperError::Rejected(vec![
            RejectionReason::ConfigNotObject,
            RejectionReason::UnknownConditionType("sleep_hours".to_string()),
        ]);
        let message = err.to_string();
        assert!(message.contains("JSON object"));
        assert!(message.contains("sleep_hours"));
    }
}
