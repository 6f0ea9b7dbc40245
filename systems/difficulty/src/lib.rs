#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adaptive difficulty model and weighted gem generation.
//!
//! Repeated failures on a level gradually bias generation toward the colors
//! its collect goals ask for. The bias is kept per level as a
//! [`DifficultyAdjustment`] so an external store can persist it and feed it
//! back on the next attempt.

mod source;

use std::collections::BTreeMap;

use gem_cascade_core::{ColorWeights, DifficultyAdjustment, LevelConfig, LevelId};
use serde::{Deserialize, Serialize};

pub use source::{derive_attempt_seed, weighted_random_gem, WeightedGemSource};

/// Consecutive failures that trigger a weight boost.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
/// Factor applied to goal colors on each boost.
pub const DEFAULT_WEIGHT_FACTOR: f64 = 1.1;

/// Tuning for the adaptive difficulty model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Consecutive failures that trigger a boost; zero behaves like one.
    pub failure_threshold: u32,
    /// Multiplier applied to every collect color on a boost.
    pub weight_factor: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            weight_factor: DEFAULT_WEIGHT_FACTOR,
        }
    }
}

/// Per-level difficulty state.
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveDifficulty {
    config: DifficultyConfig,
    color_count: u8,
    adjustments: BTreeMap<LevelId, DifficultyAdjustment>,
}

impl AdaptiveDifficulty {
    /// Creates an empty model for rules with `color_count` colors.
    #[must_use]
    pub fn new(config: DifficultyConfig, color_count: u8) -> Self {
        Self {
            config,
            color_count,
            adjustments: BTreeMap::new(),
        }
    }

    /// Restores a model from persisted adjustments.
    ///
    /// Multiplier vectors are padded with ones or truncated to the color
    /// count. A later entry for the same level replaces an earlier one.
    #[must_use]
    pub fn from_adjustments<I>(config: DifficultyConfig, color_count: u8, adjustments: I) -> Self
    where
        I: IntoIterator<Item = DifficultyAdjustment>,
    {
        let mut model = Self::new(config, color_count);
        for mut adjustment in adjustments {
            let mut multipliers = adjustment.color_weight_multipliers.as_slice().to_vec();
            multipliers.resize(usize::from(color_count), 1.0);
            adjustment.color_weight_multipliers = ColorWeights::from_multipliers(multipliers);
            let _ = model.adjustments.insert(adjustment.level, adjustment);
        }
        model
    }

    /// Active tuning.
    #[must_use]
    pub const fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    /// Stored adjustments in level order.
    pub fn adjustments(&self) -> impl Iterator<Item = &DifficultyAdjustment> {
        self.adjustments.values()
    }

    /// Stored adjustment for a level.
    #[must_use]
    pub fn adjustment(&self, level: LevelId) -> Option<&DifficultyAdjustment> {
        self.adjustments.get(&level)
    }

    /// Generation weights to use for a level; all ones when never boosted.
    #[must_use]
    pub fn weights_for_level(&self, level: LevelId) -> ColorWeights {
        self.adjustments.get(&level).map_or_else(
            || ColorWeights::uniform(self.color_count),
            |adjustment| adjustment.color_weight_multipliers.clone(),
        )
    }

    /// Records a failed attempt and boosts goal colors at the threshold.
    pub fn record_failure(&mut self, level: &LevelConfig) -> &DifficultyAdjustment {
        let threshold = self.config.failure_threshold.max(1);
        let factor = self.config.weight_factor;
        let color_count = self.color_count;

        let adjustment = self
            .adjustments
            .entry(level.id)
            .or_insert_with(|| DifficultyAdjustment::neutral(level.id, color_count));
        adjustment.stuck_count = adjustment.stuck_count.saturating_add(1);

        if adjustment.stuck_count >= threshold {
            let colors = level.collect_colors();
            for color in &colors {
                adjustment.color_weight_multipliers.scale(*color, factor);
            }
            adjustment.stuck_count = 0;
            tracing::info!(
                target: "gem_cascade::difficulty",
                level = level.id.get(),
                boosted_colors = colors.len(),
                factor,
                "difficulty.weights.boosted"
            );
        } else {
            tracing::debug!(
                target: "gem_cascade::difficulty",
                level = level.id.get(),
                stuck_count = adjustment.stuck_count,
                "difficulty.failure.recorded"
            );
        }

        adjustment
    }

    /// Records a win; the failure streak ends but earned weights stay.
    pub fn record_success(&mut self, level: LevelId) {
        if let Some(adjustment) = self.adjustments.get_mut(&level) {
            adjustment.stuck_count = 0;
        }
    }
}
