#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that groups matched cells into runs and decides which of
//! them become special tokens.
//!
//! Assignment rules, applied in this order:
//!
//! 1. A run of five or more spawns an area bomb at its middle cell.
//! 2. A run of exactly four spawns a line clearer along the run at its
//!    middle cell.
//! 3. A cell that is the middle of both a horizontal and a vertical run
//!    becomes an area bomb.
//! 4. When the batch matched at least five cells, any matched cell with at
//!    least two other matched cells in its row and two in its column
//!    becomes an area bomb. Colors are not compared, so runs of different
//!    colors that meet at a corner qualify too.
//!
//! Bombs win over line clearers on the same cell. The middle of a run is
//! the cell at index `len / 2` counting from the top or left.

use std::collections::{BTreeMap, BTreeSet};

use gem_cascade_core::{Coord, GemColor, Orientation, SpecialKind, SpecialSpawn, MIN_RUN_LENGTH};
use gem_cascade_system_match_detection::MatchSet;

/// Run length that spawns a line clearer.
pub const LINE_CLEARER_RUN_LENGTH: usize = 4;
/// Shortest run that spawns an area bomb.
pub const AREA_BOMB_RUN_LENGTH: usize = 5;
/// Batch size from which the row-and-column density rule applies.
pub const DENSE_MATCH_THRESHOLD: usize = 5;

/// Contiguous same-colored matched cells along one axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    direction: Orientation,
    color: GemColor,
    cells: Vec<Coord>,
}

impl Run {
    /// Creates a run from cells ordered top-to-bottom or left-to-right.
    #[must_use]
    pub fn new(direction: Orientation, color: GemColor, cells: Vec<Coord>) -> Self {
        Self {
            direction,
            color,
            cells,
        }
    }

    /// Axis the run extends along.
    #[must_use]
    pub const fn direction(&self) -> Orientation {
        self.direction
    }

    /// Color shared by the run.
    #[must_use]
    pub const fn color(&self) -> GemColor {
        self.color
    }

    /// Cells of the run in ascending order.
    #[must_use]
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Number of cells in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the run holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at index `len / 2`.
    #[must_use]
    pub fn middle(&self) -> Option<Coord> {
        self.cells.get(self.cells.len() / 2).copied()
    }
}

/// Special tokens assigned to matched coordinates for one batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecialAssignment {
    bombs: BTreeSet<Coord>,
    lines: BTreeMap<Coord, Orientation>,
}

impl SpecialAssignment {
    /// Coordinates that become area bombs.
    pub fn bombs(&self) -> impl Iterator<Item = Coord> + '_ {
        self.bombs.iter().copied()
    }

    /// Coordinates that become line clearers, with their orientation.
    pub fn lines(&self) -> impl Iterator<Item = (Coord, Orientation)> + '_ {
        self.lines.iter().map(|(coord, orientation)| (*coord, *orientation))
    }

    /// Special assigned to the coordinate, if any.
    #[must_use]
    pub fn kind_at(&self, coord: Coord) -> Option<SpecialKind> {
        if self.bombs.contains(&coord) {
            return Some(SpecialKind::AreaBomb);
        }
        self.lines
            .get(&coord)
            .map(|orientation| SpecialKind::LineClearer(*orientation))
    }

    /// Every spawn in row-major order.
    #[must_use]
    pub fn spawns(&self) -> Vec<SpecialSpawn> {
        let mut spawns: Vec<SpecialSpawn> = self
            .bombs
            .iter()
            .map(|cell| SpecialSpawn {
                cell: *cell,
                kind: SpecialKind::AreaBomb,
            })
            .chain(self.lines.iter().map(|(cell, orientation)| SpecialSpawn {
                cell: *cell,
                kind: SpecialKind::LineClearer(*orientation),
            }))
            .collect();
        spawns.sort_by_key(|spawn| spawn.cell);
        spawns
    }

    /// Number of spawned specials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bombs.len() + self.lines.len()
    }

    /// Reports whether no specials spawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bombs.is_empty() && self.lines.is_empty()
    }
}

/// Re-derives runs from a match set.
///
/// Horizontal runs come first in row-major order, followed by vertical runs
/// in column-major order. Horizontal and vertical membership of a cell are
/// tracked independently.
#[must_use]
pub fn classify_runs(matches: &MatchSet) -> Vec<Run> {
    let mut by_row: BTreeMap<u32, Vec<(u32, GemColor)>> = BTreeMap::new();
    let mut by_column: BTreeMap<u32, Vec<(u32, GemColor)>> = BTreeMap::new();

    for (coord, color) in matches.iter() {
        by_row
            .entry(coord.row())
            .or_default()
            .push((coord.column(), color));
        by_column
            .entry(coord.column())
            .or_default()
            .push((coord.row(), color));
    }

    let mut runs = Vec::new();
    for (row, entries) in &by_row {
        collect_runs(entries, Orientation::Horizontal, &mut runs, |column| {
            Coord::new(*row, column)
        });
    }
    for (column, entries) in &by_column {
        collect_runs(entries, Orientation::Vertical, &mut runs, |row| {
            Coord::new(row, *column)
        });
    }
    runs
}

/// Decides which matched cells become special tokens.
///
/// The row-and-column density rule counts every matched cell of the batch
/// regardless of color.
#[must_use]
pub fn resolve_specials(matches: &MatchSet, runs: &[Run]) -> SpecialAssignment {
    let mut bombs = BTreeSet::new();
    let mut lines = BTreeMap::new();
    let mut horizontal_middles = BTreeSet::new();
    let mut vertical_middles = BTreeSet::new();

    for run in runs {
        let Some(middle) = run.middle() else {
            continue;
        };

        let _ = match run.direction() {
            Orientation::Horizontal => horizontal_middles.insert(middle),
            Orientation::Vertical => vertical_middles.insert(middle),
        };

        if run.len() >= AREA_BOMB_RUN_LENGTH {
            let _ = bombs.insert(middle);
        } else if run.len() == LINE_CLEARER_RUN_LENGTH {
            let _ = lines.entry(middle).or_insert(run.direction());
        }
    }

    bombs.extend(horizontal_middles.intersection(&vertical_middles).copied());

    if matches.len() >= DENSE_MATCH_THRESHOLD {
        for coord in matches.coords() {
            let mut row_mates = 0usize;
            let mut column_mates = 0usize;
            for other in matches.coords() {
                if other == coord {
                    continue;
                }
                if other.row() == coord.row() {
                    row_mates += 1;
                }
                if other.column() == coord.column() {
                    column_mates += 1;
                }
            }
            if row_mates >= 2 && column_mates >= 2 {
                let _ = bombs.insert(coord);
            }
        }
    }

    lines.retain(|coord, _| !bombs.contains(coord));

    SpecialAssignment { bombs, lines }
}

fn collect_runs<F>(
    entries: &[(u32, GemColor)],
    direction: Orientation,
    out: &mut Vec<Run>,
    to_coord: F,
) where
    F: Fn(u32) -> Coord,
{
    let mut start = 0;
    while start < entries.len() {
        let (first_position, color) = entries[start];
        let mut end = start + 1;
        while end < entries.len() {
            let (position, next_color) = entries[end];
            let expected = first_position + (end - start) as u32;
            if position != expected || next_color != color {
                break;
            }
            end += 1;
        }

        if end - start >= MIN_RUN_LENGTH {
            let cells = entries[start..end]
                .iter()
                .map(|(position, _)| to_coord(*position))
                .collect();
            out.push(Run::new(direction, color, cells));
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_uses_floor_of_half_length() {
        let cells: Vec<Coord> = (0..6).map(|column| Coord::new(0, column)).collect();
        let run = Run::new(Orientation::Horizontal, GemColor::new(0), cells);
        assert_eq!(run.middle(), Some(Coord::new(0, 3)));

        let empty = Run::new(Orientation::Vertical, GemColor::new(0), Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.middle(), None);
    }

    #[test]
    fn adjacent_colors_split_into_separate_runs() {
        let matches: MatchSet = (0..6)
            .map(|column| {
                let color = if column < 3 { 1 } else { 2 };
                (Coord::new(4, column), GemColor::new(color))
            })
            .collect();

        let runs = classify_runs(&matches);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].color(), GemColor::new(1));
        assert_eq!(runs[1].cells()[0], Coord::new(4, 3));
        assert!(resolve_specials(&matches, &runs).is_empty());
    }
}
