//! Lifequest Achievement Engine
//!
//! Evaluates achievement conditions against live activity data and keeps the
//! per-user progress rows in step.
//!
//! # Overview
//!
//! The engine is responsible for:
//! - **Evaluation**: one read-only query per condition kind ([`evaluate_condition`])
//! - **Progress tracking**: lazily created rows, updated until they complete
//! - **Sweeps**: re-evaluating a user's whole catalog after any activity change
//! - **Manual unlocks**: the only way to complete a `manual` achievement
//! - **Resync**: reopening progress when a definition's condition is edited
//!
//! # Lifecycle
//!
//! | State | Entered by | Left by |
//! |-------|------------|---------|
//! | **Open** (`is_completed = false`) | first evaluation, manual unlock attempt, resync | evaluation reaching the target, manual unlock |
//! | **Completed** | reaching the target, manual unlock | definition resync only |
//!
//! Completed rows are frozen: their value, target and completion time never
//! change under evaluation.
//!
//! # Usage
//!
//! ```no_run
//! use lifequest_engine::AchievementEngine;
//! use lifequest_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("lifequest.db")?;
//! let user = store.default_user()?;
//! let mut engine = AchievementEngine::default_config();
//!
//! for state in engine.check_user_achievements(&mut store, user.id)? {
//!     println!("achievement {} unlocked", state.achievement_id);
//! }
//! println!("\n{}", engine.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [engine]
//! dry_run = false
//! resync_on_edit = true
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod evaluator;
mod metrics;

#[cfg(test)]
mod mock;

pub use config::EngineConfig;
pub use engine::AchievementEngine;
pub use error::EngineError;
pub use evaluator::{evaluate_condition, EvaluationContext};
pub use metrics::{EngineMetrics, SweepReport};
