#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic procedural level generation.
//!
//! Every level is a pure function of its identifier and the board rules:
//! the move budget shrinks in steps, the score target grows linearly, and
//! periodic levels add collect goals, wall pairs and ice.

use gem_cascade_core::{Coord, GemColor, Goal, IcePlacement, LevelConfig, LevelId, Rules};
use serde::{Deserialize, Serialize};

/// Tuning for the level generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Move budget of the first level.
    pub base_moves: u32,
    /// Smallest move budget any level receives.
    pub min_moves: u32,
    /// Levels per one-move reduction of the budget.
    pub levels_per_move_step: u32,
    /// Score target of the first level.
    pub base_score: u32,
    /// Score target increase per level.
    pub score_step: u32,
    /// Every this many levels carries collect goals.
    pub collect_period: u32,
    /// Most collect goals a level carries.
    pub max_collect_goals: u32,
    /// Collect amount as a percentage of the move budget.
    pub collect_percent_of_moves: u32,
    /// Every this many levels carries wall pairs.
    pub wall_period: u32,
    /// Most wall pairs a level carries.
    pub max_wall_pairs: u32,
    /// Every this many levels carries ice pairs.
    pub ice_period: u32,
    /// Most ice pairs a level carries.
    pub max_ice_pairs: u32,
    /// Highest ice durability the generator assigns.
    pub max_ice_durability: u8,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_moves: 30,
            min_moves: 15,
            levels_per_move_step: 3,
            base_score: 500,
            score_step: 150,
            collect_period: 3,
            max_collect_goals: 2,
            collect_percent_of_moves: 60,
            wall_period: 4,
            max_wall_pairs: 2,
            ice_period: 5,
            max_ice_pairs: 2,
            max_ice_durability: 3,
        }
    }
}

/// Pure system producing [`LevelConfig`] values from level identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct LevelGenerator {
    config: GeneratorConfig,
}

impl LevelGenerator {
    /// Creates a generator with the provided tuning.
    #[must_use]
    pub const fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generates the level with identifier `id`; zero is treated as one.
    #[must_use]
    pub fn generate(&self, id: LevelId, rules: &Rules) -> LevelConfig {
        let level = id.get().max(1);
        let moves = self.moves(level);

        let mut goals = vec![Goal::Score {
            target: self.score_target(level),
        }];
        goals.extend(self.collect_goals(level, moves, rules));

        let walls = self.walls(level, rules);
        let ice = self.ice(level, rules, &walls);

        tracing::debug!(
            target: "gem_cascade::levels",
            level,
            moves,
            goals = goals.len(),
            walls = walls.len(),
            ice = ice.len(),
            "levels.generated"
        );

        LevelConfig {
            id: LevelId::new(level),
            moves,
            goals,
            walls,
            ice,
            initial_grid: None,
            star_thresholds: None,
        }
    }

    fn moves(&self, level: u32) -> u32 {
        let step = self.config.levels_per_move_step.max(1);
        self.config
            .base_moves
            .saturating_sub((level - 1) / step)
            .max(self.config.min_moves)
            .max(1)
    }

    fn score_target(&self, level: u32) -> u32 {
        self.config
            .base_score
            .saturating_add(self.config.score_step.saturating_mul(level - 1))
    }

    fn collect_goals(&self, level: u32, moves: u32, rules: &Rules) -> Vec<Goal> {
        let Some(cycle) = periodic_cycle(level, self.config.collect_period) else {
            return Vec::new();
        };
        let color_count = u32::from(rules.color_count);
        if color_count == 0 {
            return Vec::new();
        }

        let count = rotating_count(cycle, self.config.max_collect_goals).min(color_count);
        let amount = (u64::from(moves) * u64::from(self.config.collect_percent_of_moves) / 100)
            .max(1) as u32;

        (0..count)
            .map(|offset| Goal::Collect {
                color: GemColor::new(((level + offset) % color_count) as u8),
                amount,
            })
            .collect()
    }

    fn walls(&self, level: u32, rules: &Rules) -> Vec<Coord> {
        let Some(cycle) = periodic_cycle(level, self.config.wall_period) else {
            return Vec::new();
        };

        let mut walls = Vec::new();
        for pair in 0..rotating_count(cycle, self.config.max_wall_pairs) {
            let row = (rules.rows / 2).saturating_sub(1) + pair;
            for column in [1, rules.columns.saturating_sub(2)] {
                push_unique(&mut walls, Coord::new(row, column), rules);
            }
        }
        walls
    }

    fn ice(&self, level: u32, rules: &Rules, walls: &[Coord]) -> Vec<IcePlacement> {
        let Some(cycle) = periodic_cycle(level, self.config.ice_period) else {
            return Vec::new();
        };

        let max_durability = self.config.max_ice_durability.max(1);
        let durability = 1 + ((cycle - 1) / 2).min(u32::from(max_durability - 1)) as u8;
        let row = rules.rows.saturating_sub(2);

        let mut cells = Vec::new();
        for pair in 0..rotating_count(cycle, self.config.max_ice_pairs) {
            let mirrored = rules.columns.checked_sub(3 + pair);
            for column in [Some(2 + pair), mirrored].into_iter().flatten() {
                let cell = Coord::new(row, column);
                if !walls.contains(&cell) {
                    push_unique(&mut cells, cell, rules);
                }
            }
        }

        cells
            .into_iter()
            .map(|cell| IcePlacement { cell, durability })
            .collect()
    }
}

/// One-based index of the period `level` completes, if it completes one.
fn periodic_cycle(level: u32, period: u32) -> Option<u32> {
    (period > 0 && level % period == 0).then(|| level / period)
}

fn rotating_count(cycle: u32, max: u32) -> u32 {
    1 + (cycle - 1) % max.max(1)
}

fn push_unique(cells: &mut Vec<Coord>, cell: Coord, rules: &Rules) {
    if rules.contains(cell) && !cells.contains(&cell) {
        cells.push(cell);
    }
}
