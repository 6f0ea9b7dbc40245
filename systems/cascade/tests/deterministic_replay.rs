use gem_cascade_core::{ColorWeights, LevelId, LevelOutcome, Rules};
use gem_cascade_system_cascade::GameSession;
use gem_cascade_system_difficulty::{derive_attempt_seed, WeightedGemSource};
use gem_cascade_system_level_generation::LevelGenerator;
use gem_cascade_system_match_detection::has_matches;

#[derive(Debug, PartialEq, Eq)]
struct MoveRecord {
    score: u32,
    moves_used: u32,
    combo_depth: u32,
    board: String,
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    initial_board: String,
    moves: Vec<MoveRecord>,
    outcome: Option<LevelOutcome>,
}

fn replay(level_id: u32, seed: u64) -> ReplayOutcome {
    let rules = Rules::default();
    let level = LevelGenerator::default().generate(LevelId::new(level_id), &rules);
    let source = WeightedGemSource::from_seed(derive_attempt_seed(seed, level.id, 0));
    let mut session = GameSession::start(level, rules, ColorWeights::uniform(5), source)
        .expect("generated level starts");

    let initial_board = session.board().to_string();
    assert!(!has_matches(session.board().view()), "generated board holds a run");

    let mut moves = Vec::new();
    while session.outcome().is_none() {
        let Some((from, to)) = session.hint() else {
            break;
        };
        let moves_before = session.moves_used();
        let resolution = session.submit_move(from, to).expect("hinted move is valid");

        assert_eq!(session.moves_used(), moves_before + 1);
        assert!(resolution.cascade.combo_depth >= 1);
        assert!(
            !has_matches(session.board().view()),
            "board settled with a run"
        );

        moves.push(MoveRecord {
            score: session.score(),
            moves_used: session.moves_used(),
            combo_depth: resolution.cascade.combo_depth,
            board: session.board().to_string(),
        });
    }

    ReplayOutcome {
        initial_board,
        moves,
        outcome: session.outcome(),
    }
}

#[test]
fn seeded_sessions_replay_identically() {
    for (level, seed) in [(1, 7), (12, 42), (20, 2024)] {
        let first = replay(level, seed);
        let second = replay(level, seed);
        assert_eq!(first, second, "level {level} diverged between runs");
        assert!(!first.moves.is_empty());
    }
}

#[test]
fn different_attempt_seeds_produce_different_boards() {
    let first = replay(3, 1);
    let second = replay(3, 2);
    assert_ne!(first.initial_board, second.initial_board);
}

#[test]
fn scores_never_decrease_during_play() {
    let outcome = replay(9, 99);
    let scores: Vec<u32> = outcome.moves.iter().map(|record| record.score).collect();
    assert!(scores.windows(2).all(|pair| pair[0] < pair[1]));
}
