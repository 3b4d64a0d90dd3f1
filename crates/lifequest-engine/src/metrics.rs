//! Metrics collection for achievement sweeps

use lifequest_domain::{AchievementId, UserAchievementState};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one sweep over a user's catalog
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Every completed state, whether it completed now or earlier
    pub completed: Vec<UserAchievementState>,

    /// Achievements that completed during this sweep
    pub newly_completed: Vec<AchievementId>,

    /// Achievements whose condition was evaluated
    pub evaluated: usize,

    /// Achievements skipped because they are already completed
    pub frozen: usize,

    /// Manual achievements skipped
    pub manual: usize,

    /// Achievements with a kind this build does not know
    pub unknown_kinds: usize,
}

impl SweepReport {
    /// Whether anything unlocked during the sweep
    pub fn has_unlocks(&self) -> bool {
        !self.newly_completed.is_empty()
    }
}

/// Metrics accumulated across engine operations
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineMetrics {
    /// Evaluations per condition kind
    pub evaluations: BTreeMap<String, usize>,

    /// Achievements unlocked by evaluation
    pub unlocked: usize,

    /// Achievements unlocked by hand
    pub manual_unlocks: usize,

    /// States reopened after a definition edit
    pub resyncs: usize,

    /// Sweeps completed
    pub sweep_count: usize,

    /// Time spent sweeping, in milliseconds
    pub total_runtime_ms: u64,
}

impl EngineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evaluation of a condition kind
    pub fn record_evaluation(&mut self, condition_type: &str) {
        *self.evaluations.entry(condition_type.to_string()).or_insert(0) += 1;
    }

    /// Record an unlock by evaluation
    pub fn record_unlock(&mut self) {
        self.unlocked += 1;
    }

    /// Record an unlock by hand
    pub fn record_manual_unlock(&mut self) {
        self.manual_unlocks += 1;
    }

    /// Record a resync
    pub fn record_resync(&mut self) {
        self.resyncs += 1;
    }

    /// Record a completed sweep
    pub fn record_sweep(&mut self, elapsed_ms: u64) {
        self.sweep_count += 1;
        self.total_runtime_ms += elapsed_ms;
    }

    /// Total evaluations across kinds
    pub fn total_evaluations(&self) -> usize {
        self.evaluations.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Achievement Engine Metrics".to_string(),
            "==========================".to_string(),
            format!("Sweeps: {}", self.sweep_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!("Unlocked: {}", self.unlocked),
            format!("Manual unlocks: {}", self.manual_unlocks),
            format!("Resyncs: {}", self.resyncs),
        ];

        if !self.evaluations.is_empty() {
            lines.push(String::new());
            lines.push("Evaluations by kind:".to_string());
            for (kind, count) in &self.evaluations {
                lines.push(format!("  {}: {}", kind, count));
            }
            lines.push(format!("  Total: {}", self.total_evaluations()));
        }

        lines.join("\n")
    }
}
