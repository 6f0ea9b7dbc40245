use std::collections::BTreeSet;

use gem_cascade_board::Board;
use gem_cascade_core::{
    CascadeBatch, CascadeResult, Cell, ColorTally, ColorWeights, Coord, GemSource, Orientation,
    SpecialKind,
};
use gem_cascade_system_match_detection::{find_matches, MatchSet};
use gem_cascade_system_special_spawn::{classify_runs, resolve_specials, SpecialAssignment};

/// Most batches a single move may resolve.
pub const MAX_CASCADE_BATCHES: u32 = 256;

/// Resolves every batch the current board produces.
///
/// Each batch scores `matched × points_per_cell × combo`, collects the
/// colors of matched cells that do not become special tokens, thaws ice next to the match, turns qualifying cells into
/// special tokens, fires every special token on the board, then applies
/// gravity and refills from `source`. Returns an empty result when the
/// board holds no run.
pub fn resolve_cascade<S>(
    board: &mut Board,
    weights: &ColorWeights,
    source: &mut S,
    points_per_cell: u32,
) -> CascadeResult
where
    S: GemSource + ?Sized,
{
    let mut batches = Vec::new();
    let mut score_delta = 0u32;
    let mut combo = 0u32;

    loop {
        let matches = find_matches(board.view());
        if matches.is_empty() {
            break;
        }
        if combo == MAX_CASCADE_BATCHES {
            tracing::warn!(
                target: "gem_cascade::cascade",
                batches = combo,
                "cascade.batch_cap.reached"
            );
            break;
        }

        combo += 1;
        let batch = resolve_batch(board, &matches, combo, weights, source, points_per_cell);
        score_delta = score_delta.saturating_add(batch.score_delta());
        tracing::debug!(
            target: "gem_cascade::cascade",
            combo,
            matched = batch.matched.len(),
            spawned = batch.spawned.len(),
            triggered = batch.triggered.len(),
            score = batch.score_delta(),
            "cascade.batch.resolved"
        );
        batches.push(batch);
    }

    CascadeResult {
        batches,
        combo_depth: combo,
        score_delta,
        board: board.to_rows(),
    }
}

fn resolve_batch<S>(
    board: &mut Board,
    matches: &MatchSet,
    combo: u32,
    weights: &ColorWeights,
    source: &mut S,
    points_per_cell: u32,
) -> CascadeBatch
where
    S: GemSource + ?Sized,
{
    let runs = classify_runs(matches);
    let assignment = resolve_specials(matches, &runs);
    let spawned = assignment.spawns();

    let mut collected = ColorTally::new(board.color_count());
    for (coord, color) in matches.iter() {
        if assignment.kind_at(coord).is_none() {
            collected.add(color, 1);
        }
    }

    let ice_damaged = splash_ice(board, matches);
    clear_matches(board, matches, &assignment);
    let triggered = fire_specials(board);

    let match_score = award(matches.len(), points_per_cell, combo);
    let blast_score = award(
        triggered.len().saturating_sub(spawned.len()),
        points_per_cell,
        combo,
    );

    let drops = board.apply_gravity();
    let refills = board.refill(weights, source);

    CascadeBatch {
        combo,
        matched: matches.coords().collect(),
        spawned,
        triggered,
        ice_damaged,
        match_score,
        blast_score,
        collected,
        drops,
        refills,
    }
}

/// Thaws one layer of ice on every unmatched cell next to the match.
fn splash_ice(board: &mut Board, matches: &MatchSet) -> Vec<Coord> {
    let splashed: BTreeSet<Coord> = matches
        .coords()
        .flat_map(|coord| board.neighbors(coord))
        .filter(|coord| !matches.contains(*coord))
        .collect();

    splashed
        .into_iter()
        .filter(|coord| board.thaw(*coord).is_some())
        .collect()
}

fn clear_matches(board: &mut Board, matches: &MatchSet, assignment: &SpecialAssignment) {
    for coord in matches.coords() {
        let replacement = assignment
            .kind_at(coord)
            .map_or(Cell::Empty, SpecialKind::to_cell);
        let _ = board.set(coord, replacement);
    }
}

/// Fires every special token on the board and removes what they hit.
///
/// Walls are never removed; a line stops at the first wall it meets.
fn fire_specials(board: &mut Board) -> Vec<Coord> {
    let specials: Vec<(Coord, Cell)> = board
        .view()
        .coords()
        .filter_map(|coord| {
            board
                .cell(coord)
                .filter(Cell::is_special)
                .map(|cell| (coord, cell))
        })
        .collect();

    let mut marked = BTreeSet::new();
    for (origin, cell) in specials {
        match cell {
            Cell::LineClearer(orientation) => mark_line(board, origin, orientation, &mut marked),
            Cell::AreaBomb => mark_area(board, origin, &mut marked),
            _ => {}
        }
    }

    let triggered: Vec<Coord> = marked
        .into_iter()
        .filter(|coord| board.cell(*coord).is_some_and(|cell| cell.is_token()))
        .collect();
    for coord in &triggered {
        let _ = board.set(*coord, Cell::Empty);
    }
    triggered
}

fn mark_line(board: &Board, origin: Coord, orientation: Orientation, marked: &mut BTreeSet<Coord>) {
    let _ = marked.insert(origin);
    for forward in [false, true] {
        let mut cursor = origin;
        while let Some(next) = step(cursor, orientation, forward) {
            match board.cell(next) {
                Some(cell) if !cell.is_wall() => {
                    let _ = marked.insert(next);
                    cursor = next;
                }
                _ => break,
            }
        }
    }
}

fn mark_area(board: &Board, origin: Coord, marked: &mut BTreeSet<Coord>) {
    let rows = origin.row().saturating_sub(1)..=origin.row().saturating_add(1);
    for row in rows {
        let columns = origin.column().saturating_sub(1)..=origin.column().saturating_add(1);
        for column in columns {
            let coord = Coord::new(row, column);
            if board.cell(coord).is_some_and(|cell| !cell.is_wall()) {
                let _ = marked.insert(coord);
            }
        }
    }
}

fn step(coord: Coord, orientation: Orientation, forward: bool) -> Option<Coord> {
    let (row, column) = (coord.row(), coord.column());
    let (row, column) = match (orientation, forward) {
        (Orientation::Horizontal, true) => (row, column.checked_add(1)?),
        (Orientation::Horizontal, false) => (row, column.checked_sub(1)?),
        (Orientation::Vertical, true) => (row.checked_add(1)?, column),
        (Orientation::Vertical, false) => (row.checked_sub(1)?, column),
    };
    Some(Coord::new(row, column))
}

fn award(cells: usize, points_per_cell: u32, combo: u32) -> u32 {
    let points = (cells as u64)
        .saturating_mul(u64::from(points_per_cell))
        .saturating_mul(u64::from(combo));
    u32::try_from(points).unwrap_or(u32::MAX)
}
