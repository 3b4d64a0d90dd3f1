//! Lifequest Gatekeeper
//!
//! Checks achievement definitions when they are authored, before they reach
//! the store.
//!
//! The Gatekeeper provides:
//! - Condition kind checking (unknown kinds are refused)
//! - Parameter checking per kind (target, habit, period, mood, unit)
//! - Reference checking against the author's own habits and sobriety streaks
//!
//! Stored definitions are parsed leniently so that old rows keep loading;
//! this crate is where the strict rules live.
//!
//! # Examples
//!
//! ```
//! use lifequest_gatekeeper::{AchievementDraft, Gatekeeper, ValidationStatus};
//! use lifequest_store::SqliteStore;
//! use serde_json::json;
//!
//! let gatekeeper = Gatekeeper::default_config();
//! let draft = AchievementDraft::new("Note taker", "notes_count", json!({"target": 10}));
//!
//! let result = gatekeeper.validate::<SqliteStore>(&draft, None).unwrap();
//! assert_eq!(result.status, ValidationStatus::Accepted);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use validator::{AchievementDraft, Gatekeeper, RejectionReason, ValidationResult, ValidationStatus};
