use std::collections::VecDeque;

use gem_cascade_board::{query, Board};
use gem_cascade_core::{
    Cell, ColorWeights, Coord, GemColor, GemSource, Orientation, SpecialKind, SpecialSpawn,
};
use gem_cascade_system_cascade::resolve_cascade;
use gem_cascade_system_match_detection::has_matches;

struct ScriptedSource {
    colors: VecDeque<u8>,
}

impl ScriptedSource {
    fn new(colors: &[u8]) -> Self {
        Self {
            colors: colors.iter().copied().collect(),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.colors.is_empty()
    }
}

impl GemSource for ScriptedSource {
    fn draw(&mut self, _: &ColorWeights) -> GemColor {
        GemColor::new(self.colors.pop_front().expect("refill script exhausted"))
    }
}

fn board(text: &str) -> Board {
    Board::parse(text, 5).expect("valid board")
}

#[test]
fn chained_batches_multiply_by_combo_index() {
    let mut board = board(
        "2 3 4 0\n\
         3 4 2 1\n\
         4 2 3 4\n\
         1 1 2 1",
    );
    assert!(board.swap(Coord::new(3, 2), Coord::new(3, 3)));
    let mut source = ScriptedSource::new(&[0, 0, 0, 1, 2, 1, 2]);

    let result = resolve_cascade(&mut board, &ColorWeights::uniform(5), &mut source, 10);

    assert_eq!(result.combo_depth, 2);
    assert_eq!(result.batches[0].match_score, 30);
    assert_eq!(result.batches[1].match_score, 80);
    assert_eq!(result.batches[1].blast_score, 0);
    assert_eq!(result.score_delta, 110);
    assert_eq!(
        result.batches[1].spawned,
        vec![SpecialSpawn {
            cell: Coord::new(0, 2),
            kind: SpecialKind::LineClearer(Orientation::Horizontal),
        }]
    );
    assert_eq!(result.batches[1].triggered, vec![Coord::new(0, 2)]);

    let collected = result.collected();
    assert_eq!(collected.get(GemColor::new(1)), 3);
    assert_eq!(collected.get(GemColor::new(0)), 3);
    assert!(source.is_exhausted());
    assert_eq!(board.to_string(), "1 2 1 2\n2 3 4 1\n3 4 2 4\n4 2 3 2");
    assert_eq!(result.board, board.to_rows());
}

#[test]
fn match_next_to_ice_thaws_without_removing() {
    let mut board = board(
        "2 3 4 2\n\
         3 4 2 3\n\
         4 2 3i2 4\n\
         1 1 1 2",
    );
    let mut source = ScriptedSource::new(&[1, 2, 1]);

    let result = resolve_cascade(&mut board, &ColorWeights::uniform(5), &mut source, 10);

    assert_eq!(result.combo_depth, 1);
    assert_eq!(result.batches[0].ice_damaged, vec![Coord::new(2, 2)]);
    assert_eq!(
        board.cell(Coord::new(3, 2)),
        Some(Cell::IceGem {
            color: GemColor::new(3),
            durability: 1
        })
    );
    assert_eq!(query::ice_cells(&board), vec![(Coord::new(3, 2), 1)]);
}

#[test]
fn match_through_ice_removes_gem_and_ice_together() {
    let mut board = board(
        "2 3 4 2\n\
         3 4 2 3\n\
         4 2 3 4\n\
         1 1 1i2 2",
    );
    let mut source = ScriptedSource::new(&[1, 2, 1]);

    let result = resolve_cascade(&mut board, &ColorWeights::uniform(5), &mut source, 10);

    assert_eq!(result.score_delta, 30);
    assert!(result.batches[0].ice_damaged.is_empty());
    assert_eq!(result.collected().get(GemColor::new(1)), 3);
    assert!(query::ice_cells(&board).is_empty());
}

#[test]
fn five_run_spawns_bomb_that_blasts_its_neighbourhood() {
    let mut board = board(
        "2 3 4 2 3\n\
         3 4 2 3 4\n\
         4 2 3 4 2\n\
         1 1 1 1 1",
    );
    let mut source = ScriptedSource::new(&[0, 1, 0, 1, 0, 0, 1, 0]);

    let result = resolve_cascade(&mut board, &ColorWeights::uniform(5), &mut source, 10);

    assert_eq!(result.combo_depth, 1);
    let batch = &result.batches[0];
    assert_eq!(
        batch.spawned,
        vec![SpecialSpawn {
            cell: Coord::new(3, 2),
            kind: SpecialKind::AreaBomb,
        }]
    );
    assert_eq!(
        batch.triggered,
        vec![
            Coord::new(2, 1),
            Coord::new(2, 2),
            Coord::new(2, 3),
            Coord::new(3, 2)
        ]
    );
    assert_eq!(batch.match_score, 50);
    assert_eq!(batch.blast_score, 30);
    assert_eq!(result.score_delta, 80);
    assert_eq!(batch.collected.get(GemColor::new(1)), 4);
    assert_eq!(batch.collected.total(), 4);
    assert_eq!(batch.refills.len(), 8);
    assert_eq!(
        board.to_string(),
        "0 1 0 1 0\n2 0 1 0 3\n3 3 4 2 4\n4 4 2 3 2"
    );
}

#[test]
fn vertical_line_clearer_blasts_its_column() {
    let mut board = board(
        "2 3 4\n\
         3 4 2\n\
         4 1 3\n\
         2 1 4\n\
         3 1 2\n\
         4 1 3",
    );
    let mut source = ScriptedSource::new(&[0, 2, 0, 2, 0, 2]);

    let result = resolve_cascade(&mut board, &ColorWeights::uniform(5), &mut source, 10);

    let batch = &result.batches[0];
    assert_eq!(
        batch.spawned,
        vec![SpecialSpawn {
            cell: Coord::new(4, 1),
            kind: SpecialKind::LineClearer(Orientation::Vertical),
        }]
    );
    assert_eq!(
        batch.triggered,
        vec![Coord::new(0, 1), Coord::new(1, 1), Coord::new(4, 1)]
    );
    assert_eq!(batch.match_score, 40);
    assert_eq!(batch.blast_score, 20);
    assert_eq!(batch.collected.total(), 3);
    assert!(batch.drops.is_empty());
    assert_eq!(result.combo_depth, 1);
}

#[test]
fn walls_shield_cells_from_line_clearers() {
    let mut board = board(
        "2 3 4 2 3 4\n\
         3 4 2 3 4 2\n\
         1 1 1 1 # 3",
    );
    let mut source = ScriptedSource::new(&[0, 1, 0, 1]);

    let result = resolve_cascade(&mut board, &ColorWeights::uniform(5), &mut source, 10);

    assert_eq!(result.score_delta, 40);
    assert_eq!(result.batches[0].triggered, vec![Coord::new(2, 2)]);
    assert_eq!(board.cell(Coord::new(2, 5)), Some(Cell::Gem(GemColor::new(3))));
    assert_eq!(board.cell(Coord::new(2, 4)), Some(Cell::Wall));
    assert_eq!(board.to_string(), "0 1 0 1 3 4\n2 3 4 2 4 2\n3 4 2 3 # 3");
}

#[test]
fn settled_boards_hold_no_runs() {
    let mut board = board(
        "2 3 4 0\n\
         3 4 2 1\n\
         4 2 3 4\n\
         1 1 2 1",
    );
    assert!(board.swap(Coord::new(3, 2), Coord::new(3, 3)));
    let mut source = ScriptedSource::new(&[0, 0, 0, 1, 2, 1, 2]);
    let _ = resolve_cascade(&mut board, &ColorWeights::uniform(5), &mut source, 10);
    assert!(!has_matches(board.view()));
}
