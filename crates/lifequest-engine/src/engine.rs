//! Achievement engine: progress upsert, completion detection and sweeps

use crate::evaluator::{evaluate_condition, EvaluationContext};
use crate::{EngineConfig, EngineError, EngineMetrics, SweepReport};
use chrono::{DateTime, Utc};
use lifequest_domain::traits::AchievementStore;
use lifequest_domain::{AchievementDefinition, UserAchievementState, UserId};
use std::fmt::Display;
use std::time::Instant;

/// Target of a progress row created by a manual unlock
const MANUAL_TARGET: i64 = 1;

/// Tracks per-user progress on achievement definitions
///
/// Responsible for:
/// - Creating progress rows on first contact
/// - Re-evaluating open achievements and detecting completion
/// - Explicit unlocks of manual achievements
/// - Reopening progress after a definition edit
///
/// Completed states are frozen: evaluation never touches them again, only
/// [`resync_definition`](Self::resync_definition) reopens one.
///
/// # Examples
///
/// ```no_run
/// use lifequest_engine::AchievementEngine;
/// use lifequest_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("lifequest.db")?;
/// let user = store.default_user()?;
/// let mut engine = AchievementEngine::default_config();
///
/// let report = engine.sweep(&mut store, user.id)?;
/// println!("{} unlocked", report.newly_completed.len());
/// # Ok(())
/// # }
/// ```
pub struct AchievementEngine {
    config: EngineConfig,
    metrics: EngineMetrics,
    fixed_now: Option<DateTime<Utc>>,
}

impl AchievementEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            metrics: EngineMetrics::new(),
            fixed_now: None,
        }
    }

    /// Create an engine with default configuration
    pub fn default_config() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Evaluate as if the current time were `now`
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// The configuration in force
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    fn context(&self) -> EvaluationContext {
        self.fixed_now
            .map_or_else(EvaluationContext::now, EvaluationContext::at)
    }

    /// Fetch the progress row, creating an unstarted one if absent
    ///
    /// A new row has `current_value = 0` and the target read from the
    /// definition's config.
    pub fn get_or_create_user_state<S: AchievementStore>(
        &mut self,
        store: &mut S,
        user: UserId,
        achievement: &AchievementDefinition,
    ) -> Result<UserAchievementState, EngineError>
    where
        S::Error: Display,
    {
        require_applicable(achievement, user)?;
        let now = self.context().now;
        self.fetch_or_insert(store, user, achievement, now)
    }

    /// Re-evaluate one achievement for one user
    ///
    /// Completed states are returned unchanged. Manual achievements are never
    /// evaluated here; their row is created if needed and otherwise left alone.
    pub fn update_user_achievement<S: AchievementStore>(
        &mut self,
        store: &mut S,
        user: UserId,
        achievement: &AchievementDefinition,
    ) -> Result<UserAchievementState, EngineError>
    where
        S::Error: Display,
    {
        require_applicable(achievement, user)?;
        let ctx = self.context();
        let mut report = SweepReport::default();
        self.update_state(store, &ctx, user, achievement, &mut report)
    }

    /// Re-evaluate every achievement visible to `user`
    ///
    /// Returns all completed states, including ones completed before.
    pub fn check_user_achievements<S: AchievementStore>(
        &mut self,
        store: &mut S,
        user: UserId,
    ) -> Result<Vec<UserAchievementState>, EngineError>
    where
        S::Error: Display,
    {
        Ok(self.sweep(store, user)?.completed)
    }

    /// Re-evaluate every achievement visible to `user`, with a breakdown
    ///
    /// Visible means global or authored by the user.
    pub fn sweep<S: AchievementStore>(
        &mut self,
        store: &mut S,
        user: UserId,
    ) -> Result<SweepReport, EngineError>
    where
        S::Error: Display,
    {
        let start = Instant::now();
        let ctx = self.context();

        if store.get_user(user).map_err(EngineError::store)?.is_none() {
            return Err(EngineError::NotFound(format!("user {}", user)));
        }

        let achievements = store
            .achievements_for_user(user)
            .map_err(EngineError::store)?;

        let mut report = SweepReport::default();
        for achievement in &achievements {
            let state = self.update_state(store, &ctx, user, achievement, &mut report)?;
            if state.is_completed {
                report.completed.push(state);
            }
        }

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.metrics.record_sweep(elapsed_ms);

        tracing::debug!(
            user = %user,
            evaluated = report.evaluated,
            unlocked = report.newly_completed.len(),
            completed = report.completed.len(),
            dry_run = self.config.dry_run,
            "achievement sweep finished"
        );

        Ok(report)
    }

    /// Unlock a manual achievement
    ///
    /// Sets `current_value` to the target and completes the state, creating it
    /// as 1/1 if needed, whatever the config says. An already completed state is
    /// returned as is. Any other kind is refused and no row is created.
    pub fn manual_unlock<S: AchievementStore>(
        &mut self,
        store: &mut S,
        user: UserId,
        achievement: &AchievementDefinition,
    ) -> Result<UserAchievementState, EngineError>
    where
        S::Error: Display,
    {
        if !achievement.is_manual() {
            return Err(EngineError::InvalidOperation(format!(
                "achievement {} is '{}', only manual achievements can be unlocked by hand",
                achievement.id,
                achievement.condition_type()
            )));
        }
        require_applicable(achievement, user)?;

        let now = self.context().now;
        let mut state = store
            .get_user_state(user, achievement.id)
            .map_err(EngineError::store)?
            .unwrap_or_else(|| {
                UserAchievementState::new(user, achievement.id, MANUAL_TARGET, now)
            });

        if state.is_completed {
            return Ok(state);
        }

        state.current_value = state.target_value;
        state.complete(now);

        if !self.config.dry_run && !store.save_user_state(&state).map_err(EngineError::store)? {
            return stored_state(store, user, achievement);
        }
        self.metrics.record_manual_unlock();
        tracing::info!(user = %user, achievement = %achievement.id, name = %achievement.name, "manual unlock");

        Ok(state)
    }

    /// Reopen progress after the definition's condition changed
    ///
    /// Refreshes the target from the config, clears completion and evaluates
    /// again right away. A state completed under the old condition may end up
    /// open.
    pub fn resync_definition<S: AchievementStore>(
        &mut self,
        store: &mut S,
        user: UserId,
        achievement: &AchievementDefinition,
    ) -> Result<UserAchievementState, EngineError>
    where
        S::Error: Display,
    {
        require_applicable(achievement, user)?;
        let ctx = self.context();

        let mut state = self.fetch_or_insert(store, user, achievement, ctx.now)?;
        let was_completed = state.is_completed;
        state.reset(achievement.target_value(), ctx.now);
        if !self.config.dry_run {
            store.reset_user_state(&state).map_err(EngineError::store)?;
        }
        self.metrics.record_resync();

        let mut report = SweepReport::default();
        let state = self.evaluate_open(store, &ctx, state, achievement, &mut report)?;

        if was_completed && !state.is_completed {
            tracing::info!(user = %user, achievement = %achievement.id, "achievement reopened by definition edit");
        }
        Ok(state)
    }

    fn fetch_or_insert<S: AchievementStore>(
        &self,
        store: &mut S,
        user: UserId,
        achievement: &AchievementDefinition,
        now: DateTime<Utc>,
    ) -> Result<UserAchievementState, EngineError>
    where
        S::Error: Display,
    {
        if let Some(state) = store
            .get_user_state(user, achievement.id)
            .map_err(EngineError::store)?
        {
            return Ok(state);
        }

        let fresh =
            UserAchievementState::new(user, achievement.id, achievement.target_value(), now);
        if self.config.dry_run {
            return Ok(fresh);
        }
        store
            .insert_user_state_if_absent(&fresh)
            .map_err(EngineError::store)
    }

    fn update_state<S: AchievementStore>(
        &mut self,
        store: &mut S,
        ctx: &EvaluationContext,
        user: UserId,
        achievement: &AchievementDefinition,
        report: &mut SweepReport,
    ) -> Result<UserAchievementState, EngineError>
    where
        S::Error: Display,
    {
        let state = self.fetch_or_insert(store, user, achievement, ctx.now)?;
        self.evaluate_open(store, ctx, state, achievement, report)
    }

    /// Evaluate an open state and persist the result
    fn evaluate_open<S: AchievementStore>(
        &mut self,
        store: &mut S,
        ctx: &EvaluationContext,
        mut state: UserAchievementState,
        achievement: &AchievementDefinition,
        report: &mut SweepReport,
    ) -> Result<UserAchievementState, EngineError>
    where
        S::Error: Display,
    {
        if state.is_completed {
            report.frozen += 1;
            return Ok(state);
        }
        if achievement.is_manual() {
            report.manual += 1;
            return Ok(state);
        }
        if achievement.condition.kind().is_none() {
            report.unknown_kinds += 1;
        }

        let value = evaluate_condition(&*store, ctx, state.user_id, achievement)?;
        self.metrics.record_evaluation(achievement.condition_type());
        report.evaluated += 1;

        let value = i64::try_from(value).unwrap_or(i64::MAX);
        let unlocked = state.record_progress(value, ctx.now);

        if !self.config.dry_run && !store.save_user_state(&state).map_err(EngineError::store)? {
            // completed by another writer since the read
            report.frozen += 1;
            return stored_state(store, state.user_id, achievement);
        }

        if unlocked {
            self.metrics.record_unlock();
            report.newly_completed.push(achievement.id);
            tracing::info!(
                user = %state.user_id,
                achievement = %achievement.id,
                name = %achievement.name,
                value,
                "achievement unlocked"
            );
        }
        Ok(state)
    }
}

fn stored_state<S: AchievementStore>(
    store: &S,
    user: UserId,
    achievement: &AchievementDefinition,
) -> Result<UserAchievementState, EngineError>
where
    S::Error: Display,
{
    store
        .get_user_state(user, achievement.id)
        .map_err(EngineError::store)?
        .ok_or_else(|| {
            EngineError::NotFound(format!("achievement {} for user {}", achievement.id, user))
        })
}

fn require_applicable(achievement: &AchievementDefinition, user: UserId) -> Result<(), EngineError> {
    if achievement.applies_to(user) {
        Ok(())
    } else {
        Err(EngineError::NotFound(format!(
            "achievement {} for user {}",
            achievement.id, user
        )))
    }
}
