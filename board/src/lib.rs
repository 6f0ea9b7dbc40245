#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for Gem Cascade.
//!
//! The [`Board`] owns every cell of a level. Pure systems observe it through
//! the [`BoardView`] returned by [`Board::view`] and the functions in
//! [`query`]; only the cascade resolver mutates it.

mod notation;

use std::fmt;

use gem_cascade_core::{
    BoardView, Cell, ColorWeights, ConfigError, Coord, GemSource, LevelConfig, Refill, Rules,
    TokenDrop,
};
use gem_cascade_system_match_detection::has_matches;
use serde::{Deserialize, Serialize};

pub use notation::{parse_grid, NotationError};

/// Attempts rejection sampling makes before giving up on a level.
pub const MAX_GENERATION_ATTEMPTS: u32 = 200_000;
const SLOW_GENERATION_ATTEMPTS: u32 = 10_000;

/// Row-major grid of cells with fixed dimensions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardRecord", into = "BoardRecord")]
pub struct Board {
    rows: u32,
    columns: u32,
    color_count: u8,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board from explicit rows.
    pub fn from_rows(rows: Vec<Vec<Cell>>, color_count: u8) -> Result<Self, NotationError> {
        notation::check_rectangular(&rows)?;
        let row_count = rows.len() as u32;
        let column_count = rows.first().map_or(0, Vec::len) as u32;
        Ok(Self {
            rows: row_count,
            columns: column_count,
            color_count,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Parses a board written in the grid notation.
    pub fn parse(text: &str, color_count: u8) -> Result<Self, NotationError> {
        Self::from_rows(parse_grid(text)?, color_count)
    }

    /// Builds the starting board for a level.
    ///
    /// An explicit initial grid is used as-is and must not contain a run.
    /// Otherwise every cell is drawn from `source` and the whole grid is
    /// redrawn as soon as a run appears. Walls then replace whatever was
    /// generated at their coordinates and ice coats the gems already there.
    pub fn generate<S>(
        level: &LevelConfig,
        rules: &Rules,
        weights: &ColorWeights,
        source: &mut S,
    ) -> Result<Self, ConfigError>
    where
        S: GemSource + ?Sized,
    {
        level.validate(rules)?;
        weights.validate(rules.color_count)?;

        let mut board = match &level.initial_grid {
            Some(grid) => Self::from_rows(grid.clone(), rules.color_count).map_err(|_| {
                ConfigError::GridShape {
                    expected_rows: rules.rows,
                    expected_columns: rules.columns,
                }
            })?,
            None => Self::sample(rules, weights, source)?,
        };

        for wall in &level.walls {
            let _ = board.set(*wall, Cell::Wall);
        }
        for placement in &level.ice {
            if let Some(color) = board.cell(placement.cell).and_then(|cell| cell.color()) {
                let _ = board.set(
                    placement.cell,
                    Cell::IceGem {
                        color,
                        durability: placement.durability,
                    },
                );
            }
        }

        if level.initial_grid.is_some() && has_matches(board.view()) {
            return Err(ConfigError::InitialGridHasMatches);
        }

        Ok(board)
    }

    fn sample<S>(rules: &Rules, weights: &ColorWeights, source: &mut S) -> Result<Self, ConfigError>
    where
        S: GemSource + ?Sized,
    {
        let capacity = rules.rows as usize * rules.columns as usize;
        let mut cells = Vec::with_capacity(capacity);

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            if fill_without_runs(rules, weights, source, &mut cells) {
                if attempt >= SLOW_GENERATION_ATTEMPTS {
                    tracing::warn!(
                        target: "gem_cascade::board",
                        attempts = attempt,
                        "board.generation.slow"
                    );
                } else {
                    tracing::debug!(
                        target: "gem_cascade::board",
                        attempts = attempt,
                        "board.generated"
                    );
                }
                return Ok(Self {
                    rows: rules.rows,
                    columns: rules.columns,
                    color_count: rules.color_count,
                    cells,
                });
            }
        }

        Err(ConfigError::GenerationExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of matchable colors.
    #[must_use]
    pub const fn color_count(&self) -> u8 {
        self.color_count
    }

    /// Captures a read-only view of the grid.
    #[must_use]
    pub fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.cells, self.rows, self.columns, self.color_count)
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.row() < self.rows && coord.column() < self.columns
    }

    /// Cell stored at the coordinate.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> Option<Cell> {
        self.index(coord).map(|index| self.cells[index])
    }

    /// Replaces the cell at the coordinate, returning the previous content.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> Option<Cell> {
        let index = self.index(coord)?;
        Some(std::mem::replace(&mut self.cells[index], cell))
    }

    /// Reports whether the coordinate holds a wall.
    #[must_use]
    pub fn is_wall(&self, coord: Coord) -> bool {
        self.view().is_wall(coord)
    }

    /// Reports whether the cell can take part in a match or be moved.
    #[must_use]
    pub fn is_matchable(&self, coord: Coord) -> bool {
        self.view().is_matchable(coord)
    }

    /// On-board orthogonal neighbours in up, down, left, right order.
    #[must_use]
    pub fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        let mut neighbours = Vec::with_capacity(4);
        if let Some(row) = coord.row().checked_sub(1) {
            neighbours.push(Coord::new(row, coord.column()));
        }
        neighbours.push(Coord::new(coord.row() + 1, coord.column()));
        if let Some(column) = coord.column().checked_sub(1) {
            neighbours.push(Coord::new(coord.row(), column));
        }
        neighbours.push(Coord::new(coord.row(), coord.column() + 1));
        neighbours.retain(|neighbour| self.contains(*neighbour));
        neighbours
    }

    /// Exchanges two cells, ice included.
    ///
    /// Returns `false` without touching the grid when either cell is a wall
    /// or off the board.
    pub fn swap(&mut self, first: Coord, second: Coord) -> bool {
        let (Some(a), Some(b)) = (self.index(first), self.index(second)) else {
            return false;
        };
        if self.cells[a].is_wall() || self.cells[b].is_wall() {
            return false;
        }
        self.cells.swap(a, b);
        true
    }

    /// Removes one layer of ice from the cell.
    ///
    /// Returns the remaining durability, zero once the gem is free, or
    /// `None` when the cell carries no ice.
    pub fn thaw(&mut self, coord: Coord) -> Option<u8> {
        let index = self.index(coord)?;
        let Cell::IceGem { color, durability } = self.cells[index] else {
            return None;
        };
        let remaining = durability.saturating_sub(1);
        self.cells[index] = if remaining == 0 {
            Cell::Gem(color)
        } else {
            Cell::IceGem {
                color,
                durability: remaining,
            }
        };
        Some(remaining)
    }

    /// Compacts tokens toward the bottom of every wall-delimited segment.
    ///
    /// Relative order within a segment is preserved. Drops are reported
    /// column by column, bottom-up.
    pub fn apply_gravity(&mut self) -> Vec<TokenDrop> {
        let mut drops = Vec::new();

        for column in 0..self.columns {
            let mut slot = self.rows.checked_sub(1);
            for row in (0..self.rows).rev() {
                let from = Coord::new(row, column);
                let Some(cell) = self.cell(from) else {
                    continue;
                };
                if cell.is_wall() {
                    slot = row.checked_sub(1);
                    continue;
                }
                if !cell.is_token() {
                    continue;
                }
                let Some(target_row) = slot else {
                    continue;
                };
                if target_row != row {
                    let to = Coord::new(target_row, column);
                    let _ = self.set(to, cell);
                    let _ = self.set(from, Cell::Empty);
                    drops.push(TokenDrop { from, to });
                }
                slot = target_row.checked_sub(1);
            }
        }

        drops
    }

    /// Draws a new gem into every empty cell in row-major order.
    pub fn refill<S>(&mut self, weights: &ColorWeights, source: &mut S) -> Vec<Refill>
    where
        S: GemSource + ?Sized,
    {
        let mut refills = Vec::new();
        for index in 0..self.cells.len() {
            if !self.cells[index].is_empty() {
                continue;
            }
            let color = source.draw(weights);
            self.cells[index] = Cell::Gem(color);
            refills.push(Refill {
                cell: self.coord_of(index),
                color,
            });
        }
        refills
    }

    /// Copies the grid into nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.cells
            .chunks(self.columns.max(1) as usize)
            .map(<[Cell]>::to_vec)
            .collect()
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.row() as usize * self.columns as usize + coord.column() as usize)
        } else {
            None
        }
    }

    fn coord_of(&self, index: usize) -> Coord {
        let columns = self.columns.max(1) as usize;
        Coord::new((index / columns) as u32, (index % columns) as u32)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_index, row) in self.cells.chunks(self.columns.max(1) as usize).enumerate() {
            if row_index > 0 {
                writeln!(f)?;
            }
            for (column, cell) in row.iter().enumerate() {
                if column > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", notation::Token(*cell))?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct BoardRecord {
    color_count: u8,
    grid: Vec<Vec<Cell>>,
}

impl From<Board> for BoardRecord {
    fn from(board: Board) -> Self {
        Self {
            color_count: board.color_count,
            grid: board.to_rows(),
        }
    }
}

impl TryFrom<BoardRecord> for Board {
    type Error = NotationError;

    fn try_from(record: BoardRecord) -> Result<Self, Self::Error> {
        Self::from_rows(record.grid, record.color_count)
    }
}

fn fill_without_runs<S>(
    rules: &Rules,
    weights: &ColorWeights,
    source: &mut S,
    cells: &mut Vec<Cell>,
) -> bool
where
    S: GemSource + ?Sized,
{
    cells.clear();
    let width = rules.columns as usize;

    for row in 0..rules.rows as usize {
        for column in 0..width {
            let color = source.draw(weights);
            let index = row * width + column;
            let same = |at: usize| cells.get(at).and_then(|cell| cell.color()) == Some(color);
            let horizontal = column >= 2 && same(index - 1) && same(index - 2);
            let vertical = row >= 2 && same(index - width) && same(index - 2 * width);
            if horizontal || vertical {
                return false;
            }
            cells.push(Cell::Gem(color));
        }
    }

    true
}

/// Query functions that provide read-only summaries of a board.
pub mod query {
    use gem_cascade_core::{ColorTally, Coord};

    use super::Board;

    /// Number of cells holding a gem or special token.
    #[must_use]
    pub fn token_count(board: &Board) -> usize {
        board.cells.iter().filter(|cell| cell.is_token()).count()
    }

    /// Ice-coated cells with their remaining durability, row-major.
    #[must_use]
    pub fn ice_cells(board: &Board) -> Vec<(Coord, u8)> {
        board
            .view()
            .coords()
            .filter_map(|coord| {
                board
                    .cell(coord)
                    .and_then(|cell| cell.ice_durability())
                    .map(|durability| (coord, durability))
            })
            .collect()
    }

    /// Wall coordinates, row-major.
    #[must_use]
    pub fn wall_cells(board: &Board) -> Vec<Coord> {
        board
            .view()
            .coords()
            .filter(|coord| board.is_wall(*coord))
            .collect()
    }

    /// Number of gems of each color, ice-coated gems included.
    #[must_use]
    pub fn color_histogram(board: &Board) -> ColorTally {
        let mut tally = ColorTally::new(board.color_count);
        for color in board.cells.iter().filter_map(|cell| cell.color()) {
            tally.add(color, 1);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gem_cascade_core::{GemColor, Orientation};

    #[test]
    fn display_round_trips_through_parse() {
        let text = "0 1 #\n2i2 . B\nH V 4";
        let board = Board::parse(text, 5).expect("valid board");
        assert_eq!(board.to_string(), text);
        assert_eq!(board.rows(), 3);
        assert_eq!(board.columns(), 3);
    }

    #[test]
    fn swap_moves_ice_with_its_gem_and_refuses_walls() {
        let mut board = Board::parse("0 1i2 #\n2 3 4", 5).expect("valid board");
        assert!(board.swap(Coord::new(0, 0), Coord::new(0, 1)));
        assert_eq!(
            board.cell(Coord::new(0, 0)),
            Some(Cell::IceGem {
                color: GemColor::new(1),
                durability: 2
            })
        );
        assert_eq!(board.cell(Coord::new(0, 1)), Some(Cell::Gem(GemColor::new(0))));

        let before = board.clone();
        assert!(!board.swap(Coord::new(0, 1), Coord::new(0, 2)));
        assert!(!board.swap(Coord::new(1, 2), Coord::new(2, 2)));
        assert_eq!(board, before);
    }

    #[test]
    fn thaw_releases_gem_at_zero_durability() {
        let mut board = Board::parse("3i2 0", 5).expect("valid board");
        let coord = Coord::new(0, 0);
        assert_eq!(board.thaw(coord), Some(1));
        assert_eq!(board.thaw(coord), Some(0));
        assert_eq!(board.cell(coord), Some(Cell::Gem(GemColor::new(3))));
        assert_eq!(board.thaw(coord), None);
        assert_eq!(board.thaw(Coord::new(0, 1)), None);
    }

    #[test]
    fn neighbors_stay_on_board() {
        let board = Board::parse("0 1 2\n3 4 0\n1 2 3", 5).expect("valid board");
        assert_eq!(
            board.neighbors(Coord::new(0, 0)),
            vec![Coord::new(1, 0), Coord::new(0, 1)]
        );
        assert_eq!(board.neighbors(Coord::new(1, 1)).len(), 4);
    }

    #[test]
    fn gravity_respects_wall_segments() {
        let mut board = Board::parse(
            "0 1\n\
             . 2\n\
             # .\n\
             3 .\n\
             . 4",
            5,
        )
        .expect("valid board");

        let drops = board.apply_gravity();
        assert_eq!(board.to_string(), ". .\n0 .\n# 1\n. 2\n3 4");
        assert_eq!(
            drops,
            vec![
                TokenDrop {
                    from: Coord::new(3, 0),
                    to: Coord::new(4, 0)
                },
                TokenDrop {
                    from: Coord::new(0, 0),
                    to: Coord::new(1, 0)
                },
                TokenDrop {
                    from: Coord::new(1, 1),
                    to: Coord::new(3, 1)
                },
                TokenDrop {
                    from: Coord::new(0, 1),
                    to: Coord::new(2, 1)
                },
            ]
        );
    }

    #[test]
    fn special_tokens_fall_like_gems() {
        let mut board = Board::parse("H\n.\nB\n.", 5).expect("valid board");
        let _ = board.apply_gravity();
        assert_eq!(board.cell(Coord::new(3, 0)), Some(Cell::AreaBomb));
        assert_eq!(
            board.cell(Coord::new(2, 0)),
            Some(Cell::LineClearer(Orientation::Horizontal))
        );
    }

    #[test]
    fn query_summaries_describe_the_grid() {
        let board = Board::parse("0 0i1 #\n2 . B", 5).expect("valid board");
        assert_eq!(query::token_count(&board), 4);
        assert_eq!(query::ice_cells(&board), vec![(Coord::new(0, 1), 1)]);
        assert_eq!(query::wall_cells(&board), vec![Coord::new(0, 2)]);
        let histogram = query::color_histogram(&board);
        assert_eq!(histogram.get(GemColor::new(0)), 2);
        assert_eq!(histogram.get(GemColor::new(2)), 1);
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn board_round_trips_through_bincode() {
        let board = Board::parse("0 1i3 #\n. H 2", 5).expect("valid board");
        let bytes = bincode::serialize(&board).expect("serialize");
        let restored: Board = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, board);
    }
}
