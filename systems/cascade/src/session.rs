use std::collections::BTreeSet;

use gem_cascade_board::Board;
use gem_cascade_core::{
    CascadeResult, ColorTally, ColorWeights, ConfigError, Coord, GameError, GemSource,
    InvalidMove, LevelConfig, LevelOutcome, Rules,
};
use gem_cascade_system_goals::{goal_progress, settle, GoalProgress};
use gem_cascade_system_match_detection::{find_hint, has_matches};
use serde::{Deserialize, Serialize};

use crate::resolver::resolve_cascade;

/// Outcome of an accepted move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveResolution {
    /// Every batch the move produced.
    pub cascade: CascadeResult,
    /// Terminal outcome when the move ended the attempt.
    pub outcome: Option<LevelOutcome>,
}

/// Serializable state of an attempt in progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Level being played.
    pub level: LevelConfig,
    /// Settled board.
    pub board: Board,
    /// Score accumulated so far.
    pub score: u32,
    /// Match-producing moves spent.
    pub moves_used: u32,
    /// Gems collected so far.
    pub collected: ColorTally,
}

/// A single attempt at a level.
///
/// Moves are accepted through `&mut self`, so a move can never start while
/// another one is resolving.
#[derive(Debug)]
pub struct GameSession<S> {
    level: LevelConfig,
    rules: Rules,
    board: Board,
    weights: ColorWeights,
    source: S,
    score: u32,
    moves_used: u32,
    collected: ColorTally,
    outcome: Option<LevelOutcome>,
}

impl<S: GemSource> GameSession<S> {
    /// Validates the level and builds its starting board.
    pub fn start(
        level: LevelConfig,
        rules: Rules,
        weights: ColorWeights,
        mut source: S,
    ) -> Result<Self, GameError> {
        let board = Board::generate(&level, &rules, &weights, &mut source)?;
        tracing::info!(
            target: "gem_cascade::cascade",
            level = level.id.get(),
            moves = level.moves,
            "session.started"
        );
        Ok(Self {
            collected: ColorTally::new(rules.color_count),
            level,
            rules,
            board,
            weights,
            source,
            score: 0,
            moves_used: 0,
            outcome: None,
        })
    }

    /// Continues an attempt from a snapshot.
    pub fn resume(
        snapshot: SessionSnapshot,
        rules: Rules,
        weights: ColorWeights,
        source: S,
    ) -> Result<Self, GameError> {
        snapshot.level.validate(&rules)?;
        weights.validate(rules.color_count)?;
        check_saved_board(&snapshot.board, &snapshot.level, &rules)?;

        let remaining = snapshot.level.moves.saturating_sub(snapshot.moves_used);
        let outcome = settle(
            &snapshot.level,
            snapshot.score,
            &snapshot.collected,
            snapshot.moves_used,
            remaining,
        );
        tracing::info!(
            target: "gem_cascade::cascade",
            level = snapshot.level.id.get(),
            moves_used = snapshot.moves_used,
            score = snapshot.score,
            "session.resumed"
        );

        Ok(Self {
            level: snapshot.level,
            rules,
            board: snapshot.board,
            weights,
            source,
            score: snapshot.score,
            moves_used: snapshot.moves_used,
            collected: snapshot.collected,
            outcome,
        })
    }

    /// Swaps two cells and resolves the resulting cascade.
    ///
    /// Rejected moves leave the session untouched and keep the move budget.
    pub fn submit_move(&mut self, from: Coord, to: Coord) -> Result<MoveResolution, GameError> {
        self.validate_move(from, to)?;

        let _ = self.board.swap(from, to);
        if !has_matches(self.board.view()) {
            let _ = self.board.swap(from, to);
            return Err(InvalidMove::NoMatch.into());
        }

        let cascade = resolve_cascade(
            &mut self.board,
            &self.weights,
            &mut self.source,
            self.rules.points_per_cell,
        );
        self.moves_used += 1;
        self.score = self.score.saturating_add(cascade.score_delta);
        self.collected.merge(&cascade.collected());
        self.outcome = settle(
            &self.level,
            self.score,
            &self.collected,
            self.moves_used,
            self.moves_remaining(),
        );

        if let Some(outcome) = self.outcome {
            tracing::info!(
                target: "gem_cascade::cascade",
                level = self.level.id.get(),
                won = outcome.won,
                stars = outcome.stars,
                score = outcome.final_score,
                moves_used = outcome.moves_used,
                "session.finished"
            );
        }

        Ok(MoveResolution {
            cascade,
            outcome: self.outcome,
        })
    }

    fn validate_move(&self, from: Coord, to: Coord) -> Result<(), GameError> {
        match self.outcome {
            Some(outcome) if outcome.won => return Err(GameError::LevelFinished),
            _ if self.moves_remaining() == 0 => return Err(GameError::MoveBudgetExhausted),
            Some(_) => return Err(GameError::LevelFinished),
            None => {}
        }
        for coord in [from, to] {
            if !self.board.contains(coord) {
                return Err(InvalidMove::OutOfBounds(coord).into());
            }
        }
        if !from.is_adjacent(to) {
            return Err(InvalidMove::NotAdjacent { from, to }.into());
        }
        for coord in [from, to] {
            if self.board.is_wall(coord) {
                return Err(InvalidMove::WallEndpoint(coord).into());
            }
        }
        for coord in [from, to] {
            if !self.board.is_matchable(coord) {
                return Err(InvalidMove::Immovable(coord).into());
            }
        }
        Ok(())
    }
}

/// A saved board must fit the rules, keep the level's walls and be settled.
fn check_saved_board(
    board: &Board,
    level: &LevelConfig,
    rules: &Rules,
) -> Result<(), ConfigError> {
    if board.rows() != rules.rows
        || board.columns() != rules.columns
        || board.color_count() != rules.color_count
    {
        return Err(ConfigError::GridShape {
            expected_rows: rules.rows,
            expected_columns: rules.columns,
        });
    }

    let walls: BTreeSet<Coord> = level.walls.iter().copied().collect();
    for coord in board.view().coords() {
        if let Some(color) = board.cell(coord).and_then(|cell| cell.color()) {
            if color.get() >= rules.color_count {
                return Err(ConfigError::BoardColorOutOfRange(coord));
            }
        }
        if board.is_wall(coord) != walls.contains(&coord) {
            return Err(ConfigError::WallLayoutMismatch(coord));
        }
    }

    if has_matches(board.view()) {
        return Err(ConfigError::UnsettledBoard);
    }
    Ok(())
}

impl<S> GameSession<S> {
    /// Level being played.
    #[must_use]
    pub const fn level(&self) -> &LevelConfig {
        &self.level
    }

    /// Current board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Score accumulated so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Match-producing moves spent.
    #[must_use]
    pub const fn moves_used(&self) -> u32 {
        self.moves_used
    }

    /// Moves left in the budget.
    #[must_use]
    pub const fn moves_remaining(&self) -> u32 {
        self.level.moves.saturating_sub(self.moves_used)
    }

    /// Gems collected so far.
    #[must_use]
    pub const fn collected(&self) -> &ColorTally {
        &self.collected
    }

    /// Terminal outcome, once reached.
    #[must_use]
    pub const fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }

    /// Progress toward each goal of the level.
    #[must_use]
    pub fn goal_progress(&self) -> Vec<GoalProgress> {
        goal_progress(self.score, &self.collected, &self.level.goals)
    }

    /// First productive swap on the current board.
    #[must_use]
    pub fn hint(&self) -> Option<(Coord, Coord)> {
        find_hint(self.board.view())
    }

    /// Captures the attempt for later resumption.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level: self.level.clone(),
            board: self.board.clone(),
            score: self.score,
            moves_used: self.moves_used,
            collected: self.collected.clone(),
        }
    }
}
