#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that finds same-colored runs on a board snapshot.
//!
//! Rows and columns are scanned independently. A run is a maximal sequence
//! of matchable cells sharing one color, at least three long; walls, special
//! tokens and empty cells end a run without joining it. Cells belonging to
//! several runs appear once in the result, which is what lets intersecting
//! runs spawn area bombs downstream.

use std::collections::BTreeMap;

use gem_cascade_core::{BoardView, Coord, GemColor, MIN_RUN_LENGTH};

/// Matched cells and the color each one carried when it matched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchSet {
    cells: BTreeMap<Coord, GemColor>,
}

impl MatchSet {
    /// Creates an empty match set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a matched cell.
    pub fn insert(&mut self, coord: Coord, color: GemColor) {
        let _ = self.cells.insert(coord, color);
    }

    /// Number of distinct matched cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the coordinate matched.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Color of a matched cell.
    #[must_use]
    pub fn color_at(&self, coord: Coord) -> Option<GemColor> {
        self.cells.get(&coord).copied()
    }

    /// Matched cells with their colors in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, GemColor)> + '_ {
        self.cells.iter().map(|(coord, color)| (*coord, *color))
    }

    /// Matched coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.keys().copied()
    }
}

impl FromIterator<(Coord, GemColor)> for MatchSet {
    fn from_iter<I: IntoIterator<Item = (Coord, GemColor)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Finds every cell that belongs to a horizontal or vertical run.
#[must_use]
pub fn find_matches(view: BoardView<'_>) -> MatchSet {
    let mut matches = MatchSet::new();

    for row in 0..view.rows() {
        scan_line(
            view,
            (0..view.columns()).map(move |column| Coord::new(row, column)),
            &mut matches,
        );
    }

    for column in 0..view.columns() {
        scan_line(
            view,
            (0..view.rows()).map(move |row| Coord::new(row, column)),
            &mut matches,
        );
    }

    matches
}

/// Reports whether the board holds at least one run.
#[must_use]
pub fn has_matches(view: BoardView<'_>) -> bool {
    !find_matches(view).is_empty()
}

/// Finds the first swap of two adjacent matchable cells that creates a run.
///
/// Candidates are visited in row-major order, trying the right neighbour
/// before the lower neighbour.
#[must_use]
pub fn find_hint(view: BoardView<'_>) -> Option<(Coord, Coord)> {
    let mut scratch = view.cells().to_vec();
    let columns = view.columns();

    for coord in view.coords() {
        if !view.is_matchable(coord) {
            continue;
        }

        let candidates = [
            Coord::new(coord.row(), coord.column() + 1),
            Coord::new(coord.row() + 1, coord.column()),
        ];
        for neighbour in candidates {
            if !view.is_matchable(neighbour) {
                continue;
            }

            let first = linear_index(coord, columns);
            let second = linear_index(neighbour, columns);
            scratch.swap(first, second);
            let swapped = BoardView::new(&scratch, view.rows(), columns, view.color_count());
            let creates_run = has_matches(swapped);
            scratch.swap(first, second);

            if creates_run {
                return Some((coord, neighbour));
            }
        }
    }

    None
}

fn scan_line(view: BoardView<'_>, line: impl Iterator<Item = Coord>, out: &mut MatchSet) {
    let mut run: Vec<Coord> = Vec::new();
    let mut run_color: Option<GemColor> = None;

    for coord in line {
        let color = view.matchable_color(coord);
        if color.is_some() && color == run_color {
            run.push(coord);
            continue;
        }

        flush_run(&run, run_color, out);
        run.clear();
        run_color = color;
        if color.is_some() {
            run.push(coord);
        }
    }

    flush_run(&run, run_color, out);
}

fn flush_run(run: &[Coord], color: Option<GemColor>, out: &mut MatchSet) {
    let Some(color) = color else {
        return;
    };
    if run.len() >= MIN_RUN_LENGTH {
        for coord in run {
            out.insert(*coord, color);
        }
    }
}

fn linear_index(coord: Coord, columns: u32) -> usize {
    coord.row() as usize * columns as usize + coord.column() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use gem_cascade_core::Cell;

    fn gem(color: u8) -> Cell {
        Cell::Gem(GemColor::new(color))
    }

    fn grid(rows: &[&[Cell]]) -> (Vec<Cell>, u32, u32) {
        let columns = rows[0].len() as u32;
        let cells = rows.iter().flat_map(|row| row.iter().copied()).collect();
        (cells, rows.len() as u32, columns)
    }

    #[test]
    fn finds_horizontal_and_vertical_runs() {
        let (cells, rows, columns) = grid(&[
            &[gem(1), gem(1), gem(1), gem(2)],
            &[gem(2), gem(3), gem(4), gem(2)],
            &[gem(3), gem(4), gem(3), gem(2)],
        ]);
        let matches = find_matches(BoardView::new(&cells, rows, columns, 5));

        let found: Vec<Coord> = matches.coords().collect();
        assert_eq!(
            found,
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(0, 2),
                Coord::new(0, 3),
                Coord::new(1, 3),
                Coord::new(2, 3),
            ]
        );
        assert_eq!(matches.color_at(Coord::new(2, 3)), Some(GemColor::new(2)));
    }

    #[test]
    fn intersection_cells_appear_once() {
        let (cells, rows, columns) = grid(&[
            &[gem(0), gem(2), gem(3)],
            &[gem(0), gem(0), gem(0)],
            &[gem(0), gem(3), gem(2)],
        ]);
        let matches = find_matches(BoardView::new(&cells, rows, columns, 5));
        assert_eq!(matches.len(), 5);
        assert!(matches.contains(Coord::new(1, 0)));
    }

    #[test]
    fn walls_specials_and_empty_cells_break_runs() {
        let (cells, rows, columns) = grid(&[
            &[gem(1), gem(1), Cell::Wall, gem(1), gem(1)],
            &[gem(2), gem(2), Cell::AreaBomb, gem(2), gem(2)],
            &[gem(3), Cell::Empty, gem(3), gem(3), gem(4)],
        ]);
        assert!(!has_matches(BoardView::new(&cells, rows, columns, 5)));
    }

    #[test]
    fn ice_gems_match_and_out_of_range_colors_do_not() {
        let iced = Cell::IceGem {
            color: GemColor::new(4),
            durability: 2,
        };
        let (cells, rows, columns) = grid(&[
            &[gem(4), iced, gem(4)],
            &[gem(6), gem(6), gem(6)],
            &[gem(1), gem(2), gem(3)],
        ]);
        let matches = find_matches(BoardView::new(&cells, rows, columns, 5));
        let found: Vec<Coord> = matches.coords().collect();
        assert_eq!(
            found,
            vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
        );
    }

    #[test]
    fn hint_finds_first_productive_swap() {
        let (cells, rows, columns) = grid(&[
            &[gem(0), gem(1), gem(2), gem(3)],
            &[gem(1), gem(0), gem(0), gem(4)],
            &[gem(2), gem(3), gem(4), gem(1)],
        ]);
        let view = BoardView::new(&cells, rows, columns, 5);
        assert!(!has_matches(view));
        assert_eq!(
            find_hint(view),
            Some((Coord::new(0, 0), Coord::new(1, 0)))
        );
    }

    #[test]
    fn hint_is_absent_on_dead_board() {
        let (cells, rows, columns) = grid(&[
            &[gem(0), gem(1), gem(2)],
            &[gem(3), gem(4), gem(0)],
            &[gem(1), gem(2), gem(3)],
        ]);
        assert_eq!(find_hint(BoardView::new(&cells, rows, columns, 5)), None);
    }
}
