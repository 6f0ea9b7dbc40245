#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that evaluates level goals and awards stars.
//!
//! A level is won only when every goal holds at the same time. Stars are
//! awarded on wins alone: one star baseline, two or three when the final
//! score reaches the configured thresholds, which default to 120% and 150%
//! of the score goal.

use gem_cascade_core::{ColorTally, Goal, LevelConfig, LevelOutcome, StarThresholds};
use serde::{Deserialize, Serialize};

const TWO_STAR_PERCENT: u64 = 120;
const THREE_STAR_PERCENT: u64 = 150;

/// Progress toward a single goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Goal being tracked.
    pub goal: Goal,
    /// Score or gems gathered so far.
    pub current: u32,
    /// Amount the goal requires.
    pub required: u32,
    /// Whether the goal currently holds.
    pub satisfied: bool,
}

/// Reports whether every goal holds.
#[must_use]
pub fn evaluate(score: u32, collected: &ColorTally, goals: &[Goal]) -> bool {
    goals
        .iter()
        .all(|goal| progress_for(*goal, score, collected).satisfied)
}

/// Progress toward each goal, in declaration order.
#[must_use]
pub fn goal_progress(score: u32, collected: &ColorTally, goals: &[Goal]) -> Vec<GoalProgress> {
    goals
        .iter()
        .map(|goal| progress_for(*goal, score, collected))
        .collect()
}

/// Star thresholds in effect for a level.
///
/// Explicit thresholds win; otherwise they derive from the highest score
/// goal. Levels with neither only award one star.
#[must_use]
pub fn star_thresholds(level: &LevelConfig) -> Option<StarThresholds> {
    level.star_thresholds.or_else(|| {
        level.score_target().map(|target| StarThresholds {
            two_star: scaled(target, TWO_STAR_PERCENT),
            three_star: scaled(target, THREE_STAR_PERCENT),
        })
    })
}

/// Stars a winning attempt with `score` earns.
#[must_use]
pub fn stars_for_score(level: &LevelConfig, score: u32) -> u8 {
    match star_thresholds(level) {
        Some(thresholds) if score >= thresholds.three_star => 3,
        Some(thresholds) if score >= thresholds.two_star => 2,
        _ => 1,
    }
}

/// Terminal outcome of an attempt, if it has ended.
///
/// The attempt is won as soon as every goal holds and lost once no moves
/// remain without a win.
#[must_use]
pub fn settle(
    level: &LevelConfig,
    score: u32,
    collected: &ColorTally,
    moves_used: u32,
    moves_remaining: u32,
) -> Option<LevelOutcome> {
    if evaluate(score, collected, &level.goals) {
        return Some(LevelOutcome {
            won: true,
            stars: stars_for_score(level, score),
            final_score: score,
            moves_used,
        });
    }

    (moves_remaining == 0).then_some(LevelOutcome {
        won: false,
        stars: 0,
        final_score: score,
        moves_used,
    })
}

fn progress_for(goal: Goal, score: u32, collected: &ColorTally) -> GoalProgress {
    let (current, required) = match goal {
        Goal::Score { target } => (score, target),
        Goal::Collect { color, amount } => (collected.get(color), amount),
    };
    GoalProgress {
        goal,
        current,
        required,
        satisfied: current >= required,
    }
}

fn scaled(target: u32, percent: u64) -> u32 {
    let value = u64::from(target) * percent / 100;
    u32::try_from(value).unwrap_or(u32::MAX)
}
