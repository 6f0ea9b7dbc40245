#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gem Cascade simulation.
//!
//! This crate defines the vocabulary that connects the authoritative board,
//! the pure resolution systems and the adapters. Adapters hand the
//! simulation a [`LevelConfig`] and move requests expressed as [`Coord`]
//! pairs; the cascade system answers with a [`CascadeResult`] describing
//! every batch of the resolution in order, and eventually a terminal
//! [`LevelOutcome`]. Randomness enters exclusively through the [`GemSource`]
//! seam so that every resolution can be replayed from a seed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows in the reference board.
pub const DEFAULT_ROWS: u32 = 8;
/// Number of columns in the reference board.
pub const DEFAULT_COLUMNS: u32 = 8;
/// Number of gem colors in the reference rules.
pub const DEFAULT_COLOR_COUNT: u8 = 5;
/// Points awarded per removed cell before the combo multiplier.
pub const DEFAULT_POINTS_PER_CELL: u32 = 10;
/// Fewest colors a playable rule set may use.
pub const MIN_COLOR_COUNT: u8 = 3;
/// Most colors a rule set may use.
pub const MAX_COLOR_COUNT: u8 = 8;
/// Smallest board side length that can host a run.
pub const MIN_BOARD_SIDE: u32 = 3;
/// Shortest same-colored sequence that counts as a run.
pub const MIN_RUN_LENGTH: usize = 3;

/// Location of a single board cell expressed as row and column indices.
///
/// Row zero is the top of the board; gravity pulls toward higher rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    row: u32,
    column: u32,
}

impl Coord {
    /// Creates a new board coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coord) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Reports whether the two coordinates are orthogonal neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Index of a gem color within the active rule set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GemColor(u8);

impl GemColor {
    /// Creates a color from its numeric index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Retrieves the numeric index of the color.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Index of the color usable for slice lookups.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GemColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis along which a run or a line clearer extends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    /// Along a row.
    Horizontal,
    /// Along a column.
    Vertical,
}

/// Contents of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Vacant cell awaiting gravity or refill.
    Empty,
    /// Plain matchable gem.
    Gem(GemColor),
    /// Permanent obstacle that never moves, matches or clears.
    Wall,
    /// Matchable gem coated in ice that must be thawed by nearby matches.
    IceGem {
        /// Color of the gem under the ice.
        color: GemColor,
        /// Remaining thaw hits; always at least one.
        durability: u8,
    },
    /// Special token that clears its row or column when triggered.
    LineClearer(Orientation),
    /// Special token that clears its 3×3 neighbourhood when triggered.
    AreaBomb,
}

impl Cell {
    /// Color carried by the cell, if it holds a gem.
    #[must_use]
    pub const fn color(&self) -> Option<GemColor> {
        match self {
            Self::Gem(color) | Self::IceGem { color, .. } => Some(*color),
            _ => None,
        }
    }

    /// Remaining ice durability, if the cell is an ice-coated gem.
    #[must_use]
    pub const fn ice_durability(&self) -> Option<u8> {
        match self {
            Self::IceGem { durability, .. } => Some(*durability),
            _ => None,
        }
    }

    /// Reports whether the cell is a wall.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Reports whether the cell is vacant.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Reports whether the cell holds a special token.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(self, Self::LineClearer(_) | Self::AreaBomb)
    }

    /// Reports whether the cell holds something gravity moves.
    #[must_use]
    pub const fn is_token(&self) -> bool {
        !matches!(self, Self::Empty | Self::Wall)
    }
}

/// Kinds of special token a qualifying run can create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKind {
    /// Line clearer oriented along the spawning run.
    LineClearer(Orientation),
    /// Area bomb.
    AreaBomb,
}

impl SpecialKind {
    /// Board cell that represents the special token.
    #[must_use]
    pub const fn to_cell(self) -> Cell {
        match self {
            Self::LineClearer(orientation) => Cell::LineClearer(orientation),
            Self::AreaBomb => Cell::AreaBomb,
        }
    }
}

/// Special token created at a coordinate during a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialSpawn {
    /// Coordinate that became the special token.
    pub cell: Coord,
    /// Kind of token that was created.
    pub kind: SpecialKind,
}

/// Tunable rules shared by every level played in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Number of rows on the board.
    pub rows: u32,
    /// Number of columns on the board.
    pub columns: u32,
    /// Number of distinct gem colors.
    pub color_count: u8,
    /// Points awarded per removed cell before combo scaling.
    pub points_per_cell: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            color_count: DEFAULT_COLOR_COUNT,
            points_per_cell: DEFAULT_POINTS_PER_CELL,
        }
    }
}

impl Rules {
    /// Verifies that the rules describe a playable board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < MIN_BOARD_SIDE || self.columns < MIN_BOARD_SIDE {
            return Err(ConfigError::BoardTooSmall {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if !(MIN_COLOR_COUNT..=MAX_COLOR_COUNT).contains(&self.color_count) {
            return Err(ConfigError::ColorCountOutOfRange(self.color_count));
        }
        Ok(())
    }

    /// Reports whether the coordinate lies on a board of these dimensions.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.row() < self.rows && coord.column() < self.columns
    }
}

/// Identifier of a level within the campaign, starting at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a level identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Win condition attached to a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Goal {
    /// Reach at least `target` points.
    Score {
        /// Score that satisfies the goal.
        #[serde(alias = "value")]
        target: u32,
    },
    /// Clear at least `amount` gems of `color` through matches.
    Collect {
        /// Color that must be collected.
        color: GemColor,
        /// Number of gems required.
        amount: u32,
    },
}

/// Ice coating applied to the gem generated at a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IcePlacement {
    /// Coordinate of the coated gem.
    pub cell: Coord,
    /// Initial durability of the coating.
    pub durability: u8,
}

/// Score thresholds for the second and third star.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StarThresholds {
    /// Score required for two stars.
    pub two_star: u32,
    /// Score required for three stars.
    pub three_star: u32,
}

/// Declarative description of a single level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Identifier of the level.
    pub id: LevelId,
    /// Number of match-producing moves available.
    pub moves: u32,
    /// Goals that must all hold simultaneously to win.
    pub goals: Vec<Goal>,
    /// Permanent wall coordinates.
    #[serde(default)]
    pub walls: Vec<Coord>,
    /// Ice coatings applied after the board is generated.
    #[serde(default)]
    pub ice: Vec<IcePlacement>,
    /// Curated starting grid used instead of random generation.
    #[serde(default)]
    pub initial_grid: Option<Vec<Vec<Cell>>>,
    /// Explicit star thresholds; derived from the score goal when absent.
    #[serde(default)]
    pub star_thresholds: Option<StarThresholds>,
}

impl LevelConfig {
    /// Highest score target among the level's goals.
    #[must_use]
    pub fn score_target(&self) -> Option<u32> {
        self.goals
            .iter()
            .filter_map(|goal| match goal {
                Goal::Score { target } => Some(*target),
                Goal::Collect { .. } => None,
            })
            .max()
    }

    /// Distinct colors referenced by the level's collect goals, ascending.
    #[must_use]
    pub fn collect_colors(&self) -> Vec<GemColor> {
        let mut colors: Vec<GemColor> = self
            .goals
            .iter()
            .filter_map(|goal| match goal {
                Goal::Collect { color, .. } => Some(*color),
                Goal::Score { .. } => None,
            })
            .collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }

    /// Verifies the configuration against the active rules.
    ///
    /// Checks that need run detection on an explicit grid are performed by
    /// the board when it is built.
    pub fn validate(&self, rules: &Rules) -> Result<(), ConfigError> {
        rules.validate()?;

        if self.moves == 0 {
            return Err(ConfigError::ZeroMoveBudget);
        }
        if self.goals.is_empty() {
            return Err(ConfigError::NoGoals);
        }
        for goal in &self.goals {
            if let Goal::Collect { color, amount } = goal {
                if color.get() >= rules.color_count {
                    return Err(ConfigError::GoalColorOutOfRange(*color));
                }
                if *amount == 0 {
                    return Err(ConfigError::ZeroCollectAmount(*color));
                }
            }
        }

        for wall in &self.walls {
            if !rules.contains(*wall) {
                return Err(ConfigError::WallOutOfRange(*wall));
            }
        }
        for placement in &self.ice {
            if !rules.contains(placement.cell) {
                return Err(ConfigError::IceOutOfRange(placement.cell));
            }
            if placement.durability == 0 {
                return Err(ConfigError::ZeroIceDurability(placement.cell));
            }
            if self.walls.contains(&placement.cell) {
                return Err(ConfigError::IceOnWall(placement.cell));
            }
        }

        if let Some(grid) = &self.initial_grid {
            validate_grid(grid, rules)?;
        }

        if let Some(thresholds) = self.star_thresholds {
            if thresholds.three_star < thresholds.two_star {
                return Err(ConfigError::StarThresholdsOutOfOrder {
                    two_star: thresholds.two_star,
                    three_star: thresholds.three_star,
                });
            }
        }

        Ok(())
    }
}

fn validate_grid(grid: &[Vec<Cell>], rules: &Rules) -> Result<(), ConfigError> {
    let shape_matches = grid.len() == rules.rows as usize
        && grid.iter().all(|row| row.len() == rules.columns as usize);
    if !shape_matches {
        return Err(ConfigError::GridShape {
            expected_rows: rules.rows,
            expected_columns: rules.columns,
        });
    }

    for (row_index, row) in grid.iter().enumerate() {
        for (column_index, cell) in row.iter().enumerate() {
            let coord = Coord::new(row_index as u32, column_index as u32);
            if let Some(color) = cell.color() {
                if color.get() >= rules.color_count {
                    return Err(ConfigError::GridColorOutOfRange(coord));
                }
            }
            if cell.ice_durability() == Some(0) {
                return Err(ConfigError::ZeroIceDurability(coord));
            }
        }
    }
    Ok(())
}

/// Per-color multipliers that bias gem generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorWeights {
    multipliers: Vec<f64>,
}

impl ColorWeights {
    /// Creates uniform weights for the provided number of colors.
    #[must_use]
    pub fn uniform(color_count: u8) -> Self {
        Self {
            multipliers: vec![1.0; usize::from(color_count)],
        }
    }

    /// Creates weights from explicit multipliers.
    #[must_use]
    pub fn from_multipliers(multipliers: Vec<f64>) -> Self {
        Self { multipliers }
    }

    /// Multiplier for the provided color; zero when the color is unknown.
    #[must_use]
    pub fn get(&self, color: GemColor) -> f64 {
        self.multipliers.get(color.index()).copied().unwrap_or(0.0)
    }

    /// Scales the multiplier of a single color.
    pub fn scale(&mut self, color: GemColor, factor: f64) {
        if let Some(multiplier) = self.multipliers.get_mut(color.index()) {
            *multiplier *= factor;
        }
    }

    /// Number of colors covered by the weights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    /// Reports whether no colors are covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    /// Raw multipliers ordered by color index.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.multipliers
    }

    /// Verifies the weights can drive generation for `color_count` colors.
    pub fn validate(&self, color_count: u8) -> Result<(), ConfigError> {
        let usable = self.multipliers.len() == usize::from(color_count)
            && self
                .multipliers
                .iter()
                .all(|weight| weight.is_finite() && *weight > 0.0);
        if usable {
            Ok(())
        } else {
            Err(ConfigError::InvalidWeights {
                expected: color_count,
            })
        }
    }
}

/// Source of freshly generated gems for initial boards and refills.
pub trait GemSource {
    /// Draws the color of the next generated gem.
    fn draw(&mut self, weights: &ColorWeights) -> GemColor;
}

impl<S: GemSource + ?Sized> GemSource for &mut S {
    fn draw(&mut self, weights: &ColorWeights) -> GemColor {
        (**self).draw(weights)
    }
}

/// Running count of gems collected per color.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTally {
    counts: Vec<u32>,
}

impl ColorTally {
    /// Creates an empty tally covering `color_count` colors.
    #[must_use]
    pub fn new(color_count: u8) -> Self {
        Self {
            counts: vec![0; usize::from(color_count)],
        }
    }

    /// Adds `amount` gems of `color`.
    pub fn add(&mut self, color: GemColor, amount: u32) {
        if self.counts.len() <= color.index() {
            self.counts.resize(color.index() + 1, 0);
        }
        self.counts[color.index()] = self.counts[color.index()].saturating_add(amount);
    }

    /// Count recorded for `color`.
    #[must_use]
    pub fn get(&self, color: GemColor) -> u32 {
        self.counts.get(color.index()).copied().unwrap_or(0)
    }

    /// Folds another tally into this one.
    pub fn merge(&mut self, other: &ColorTally) {
        for (color, amount) in other.iter() {
            self.add(color, amount);
        }
    }

    /// Iterator over colors with a non-zero count.
    pub fn iter(&self) -> impl Iterator<Item = (GemColor, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(index, count)| (GemColor::new(index as u8), *count))
    }

    /// Total number of gems across all colors.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().fold(0, |sum, count| sum.saturating_add(*count))
    }
}

/// Read-only view into the board grid.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    cells: &'a [Cell],
    rows: u32,
    columns: u32,
    color_count: u8,
}

impl<'a> BoardView<'a> {
    /// Captures a view backed by row-major `cells`.
    #[must_use]
    pub fn new(cells: &'a [Cell], rows: u32, columns: u32, color_count: u8) -> Self {
        Self {
            cells,
            rows,
            columns,
            color_count,
        }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of colors considered matchable.
    #[must_use]
    pub const fn color_count(&self) -> u8 {
        self.color_count
    }

    /// Row-major cells backing the view.
    #[must_use]
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    /// Reports whether the coordinate lies within the grid.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.row() < self.rows && coord.column() < self.columns
    }

    /// Returns the cell stored at the coordinate.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> Option<Cell> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the coordinate holds a wall.
    #[must_use]
    pub fn is_wall(&self, coord: Coord) -> bool {
        self.cell(coord).is_some_and(|cell| cell.is_wall())
    }

    /// Color of the cell when it can take part in a match or be moved.
    ///
    /// Only gems and ice-coated gems whose color lies within the rule set
    /// qualify.
    #[must_use]
    pub fn matchable_color(&self, coord: Coord) -> Option<GemColor> {
        self.cell(coord)
            .and_then(|cell| cell.color())
            .filter(|color| color.get() < self.color_count)
    }

    /// Reports whether the cell can take part in a match or be moved.
    #[must_use]
    pub fn is_matchable(&self, coord: Coord) -> bool {
        self.matchable_color(coord).is_some()
    }

    /// Iterates over every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| Coord::new(row, column)))
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Gem that fell from one cell to another during gravity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenDrop {
    /// Cell the token occupied before gravity.
    pub from: Coord,
    /// Cell the token occupies after gravity.
    pub to: Coord,
}

/// Gem generated into an empty cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Refill {
    /// Cell that received the gem.
    pub cell: Coord,
    /// Color of the new gem.
    pub color: GemColor,
}

/// One elimination batch of a cascade, in playback order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeBatch {
    /// One-based position of the batch within the move.
    pub combo: u32,
    /// Cells that formed runs, in row-major order.
    pub matched: Vec<Coord>,
    /// Special tokens created from the runs.
    pub spawned: Vec<SpecialSpawn>,
    /// Cells removed by triggered special tokens.
    pub triggered: Vec<Coord>,
    /// Ice-coated cells whose durability dropped without being removed.
    pub ice_damaged: Vec<Coord>,
    /// Points earned by the matched cells.
    pub match_score: u32,
    /// Points earned by cells cleared through special tokens.
    pub blast_score: u32,
    /// Gems collected toward goals, excluding cells that became special
    /// tokens.
    pub collected: ColorTally,
    /// Tokens moved by gravity.
    pub drops: Vec<TokenDrop>,
    /// Gems generated after gravity.
    pub refills: Vec<Refill>,
}

impl CascadeBatch {
    /// Total points awarded by the batch.
    #[must_use]
    pub fn score_delta(&self) -> u32 {
        self.match_score.saturating_add(self.blast_score)
    }

    /// Every cell vacated by the batch before gravity.
    #[must_use]
    pub fn removed_cells(&self) -> Vec<Coord> {
        let mut removed: Vec<Coord> = self
            .matched
            .iter()
            .copied()
            .filter(|cell| !self.spawned.iter().any(|spawn| spawn.cell == *cell))
            .collect();
        for cell in &self.triggered {
            if !removed.contains(cell) {
                removed.push(*cell);
            }
        }
        removed.sort_unstable();
        removed
    }
}

/// Complete resolution of one player move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeResult {
    /// Batches in resolution order.
    pub batches: Vec<CascadeBatch>,
    /// Number of batches that matched.
    pub combo_depth: u32,
    /// Points earned across every batch.
    pub score_delta: u32,
    /// Settled board rows after the final batch.
    pub board: Vec<Vec<Cell>>,
}

impl CascadeResult {
    /// Gems collected across every batch.
    #[must_use]
    pub fn collected(&self) -> ColorTally {
        let mut tally = ColorTally::default();
        for batch in &self.batches {
            tally.merge(&batch.collected);
        }
        tally
    }
}

/// Terminal result of a level attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelOutcome {
    /// Whether every goal was met.
    pub won: bool,
    /// Stars earned; zero for a loss.
    pub stars: u8,
    /// Score at the end of the attempt.
    pub final_score: u32,
    /// Match-producing moves spent.
    pub moves_used: u32,
}

/// Adaptive difficulty state kept per level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAdjustment {
    /// Level the adjustment applies to.
    pub level: LevelId,
    /// Consecutive failed attempts since the last boost or win.
    pub stuck_count: u32,
    /// Generation weight multipliers per color.
    pub color_weight_multipliers: ColorWeights,
}

impl DifficultyAdjustment {
    /// Creates a neutral adjustment for the level.
    #[must_use]
    pub fn neutral(level: LevelId, color_count: u8) -> Self {
        Self {
            level,
            stuck_count: 0,
            color_weight_multipliers: ColorWeights::uniform(color_count),
        }
    }
}

/// Reasons a rule set or level configuration is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The board cannot host a run.
    #[error("board of {rows}x{columns} is too small")]
    BoardTooSmall {
        /// Configured rows.
        rows: u32,
        /// Configured columns.
        columns: u32,
    },
    /// The color count lies outside the supported range.
    #[error("color count {0} must lie within {}..={}", MIN_COLOR_COUNT, MAX_COLOR_COUNT)]
    ColorCountOutOfRange(u8),
    /// The level grants no moves.
    #[error("move budget must be at least one")]
    ZeroMoveBudget,
    /// The level declares no goals.
    #[error("level declares no goals")]
    NoGoals,
    /// A collect goal names a color outside the rule set.
    #[error("goal color {0} is outside the rule set")]
    GoalColorOutOfRange(GemColor),
    /// A collect goal requires nothing.
    #[error("collect goal for color {0} requires zero gems")]
    ZeroCollectAmount(GemColor),
    /// A wall lies off the board.
    #[error("wall at {0} is outside the board")]
    WallOutOfRange(Coord),
    /// An ice coating lies off the board.
    #[error("ice at {0} is outside the board")]
    IceOutOfRange(Coord),
    /// An ice coating targets a wall.
    #[error("ice at {0} overlaps a wall")]
    IceOnWall(Coord),
    /// An ice coating has no durability.
    #[error("ice at {0} has zero durability")]
    ZeroIceDurability(Coord),
    /// The explicit grid has the wrong dimensions.
    #[error("initial grid must be {expected_rows}x{expected_columns}")]
    GridShape {
        /// Rows required by the rules.
        expected_rows: u32,
        /// Columns required by the rules.
        expected_columns: u32,
    },
    /// The explicit grid holds a color outside the rule set.
    #[error("initial grid cell {0} holds a color outside the rule set")]
    GridColorOutOfRange(Coord),
    /// The explicit grid already contains a run.
    #[error("initial grid already contains a run")]
    InitialGridHasMatches,
    /// A saved board holds a color outside the rule set.
    #[error("saved board cell {0} holds a color outside the rule set")]
    BoardColorOutOfRange(Coord),
    /// A saved board and its level disagree on where walls stand.
    #[error("saved board and level disagree on the wall at {0}")]
    WallLayoutMismatch(Coord),
    /// A saved board is not settled.
    #[error("saved board already contains a run")]
    UnsettledBoard,
    /// Three-star threshold lies below the two-star threshold.
    #[error("three-star threshold {three_star} is below two-star threshold {two_star}")]
    StarThresholdsOutOfOrder {
        /// Configured two-star threshold.
        two_star: u32,
        /// Configured three-star threshold.
        three_star: u32,
    },
    /// Generation weights do not cover the rule set with positive values.
    #[error("weights must hold {expected} positive finite multipliers")]
    InvalidWeights {
        /// Number of colors the weights must cover.
        expected: u8,
    },
    /// Rejection sampling never produced a board without runs.
    #[error("no run-free board found after {attempts} attempts")]
    GenerationExhausted {
        /// Attempts made before giving up.
        attempts: u32,
    },
}

/// Reasons a move request is rejected without touching the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvalidMove {
    /// A coordinate lies off the board.
    #[error("cell {0} is outside the board")]
    OutOfBounds(Coord),
    /// The coordinates are not orthogonal neighbours.
    #[error("cells {from} and {to} are not adjacent")]
    NotAdjacent {
        /// Source cell of the move.
        from: Coord,
        /// Target cell of the move.
        to: Coord,
    },
    /// A coordinate holds a wall.
    #[error("cell {0} is a wall")]
    WallEndpoint(Coord),
    /// A coordinate holds nothing that can be moved.
    #[error("cell {0} holds no movable gem")]
    Immovable(Coord),
    /// The swap would not produce a match.
    #[error("swap produces no match")]
    NoMatch,
}

/// Errors surfaced by a game session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// The move was rejected; the session is unchanged.
    #[error("invalid move: {0}")]
    InvalidMove(#[from] InvalidMove),
    /// No moves remain in the budget.
    #[error("move budget exhausted")]
    MoveBudgetExhausted,
    /// The level already reached a terminal outcome.
    #[error("level already finished")]
    LevelFinished,
    /// The level could not be started.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
}
