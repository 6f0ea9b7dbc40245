#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates, validates and plays Gem Cascade levels.

mod difficulty_store;
mod level_table;
mod session_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use gem_cascade_core::{
    CascadeResult, Coord, GameError, GemSource, Goal, LevelConfig, LevelId, LevelOutcome, Rules,
};
use gem_cascade_system_cascade::GameSession;
use gem_cascade_system_difficulty::{derive_attempt_seed, AdaptiveDifficulty, WeightedGemSource};
use gem_cascade_system_level_generation::LevelGenerator;
use tracing_subscriber::EnvFilter;

use crate::difficulty_store::DifficultyStore;

#[derive(Debug, Parser)]
#[command(name = "gem-cascade")]
#[command(about = "Deterministic match-3 level simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints a generated level as JSON.
    Generate {
        #[arg(long, default_value_t = 1)]
        level: u32,
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Validates a JSON level table.
    Validate {
        file: PathBuf,
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Plays a level with scripted moves or hints.
    Play(PlayArgs),
}

#[derive(Debug, Args)]
struct PlayArgs {
    #[arg(long, default_value_t = 1)]
    level: u32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long)]
    levels: Option<PathBuf>,
    #[arg(long)]
    rules: Option<PathBuf>,
    #[arg(long)]
    difficulty: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    attempts: u32,
    /// Whitespace-separated swaps written as `row,col>row,col`.
    #[arg(long)]
    moves: Option<String>,
    /// Transfer code printed by an earlier run.
    #[arg(long)]
    resume: Option<String>,
}

/// Entry point for the Gem Cascade command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate { level, rules } => generate(level, rules.as_deref()),
        Commands::Validate { file, rules } => validate(&file, rules.as_deref()),
        Commands::Play(args) => play(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rules(path: Option<&Path>) -> Result<Rules> {
    let Some(path) = path else {
        return Ok(Rules::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules {}", path.display()))?;
    let rules: Rules =
        toml::from_str(&text).with_context(|| format!("invalid rules {}", path.display()))?;
    rules
        .validate()
        .with_context(|| format!("rejected rules {}", path.display()))?;
    Ok(rules)
}

fn generate(level: u32, rules: Option<&Path>) -> Result<()> {
    let rules = load_rules(rules)?;
    let level = LevelGenerator::default().generate(LevelId::new(level), &rules);
    let json = serde_json::to_string_pretty(&level).context("failed to encode level")?;
    println!("{json}");
    Ok(())
}

fn validate(file: &Path, rules: Option<&Path>) -> Result<()> {
    let rules = load_rules(rules)?;
    let levels = level_table::load(file, &rules)?;
    println!("{} levels valid", levels.len());
    Ok(())
}

fn play(args: &PlayArgs) -> Result<()> {
    let rules = load_rules(args.rules.as_deref())?;
    let store = match &args.difficulty {
        Some(path) => DifficultyStore::load(path)?,
        None => DifficultyStore::default(),
    };
    let mut difficulty = store.into_model(rules.color_count);
    let script = args.moves.as_deref().map(parse_moves).transpose()?;

    if let Some(code) = &args.resume {
        let snapshot = session_transfer::decode(code).context("invalid --resume code")?;
        let id = snapshot.level.id;
        let weights = difficulty.weights_for_level(id);
        let seed = derive_attempt_seed(args.seed, id, snapshot.moves_used);
        let mut session =
            GameSession::resume(snapshot, rules, weights, WeightedGemSource::from_seed(seed))
                .context("snapshot does not fit the active rules")?;
        let level = session.level().clone();
        println!("level {} resumed with {} moves left", level.id, session.moves_remaining());
        let outcome = play_attempt(&mut session, script.as_deref())?;
        record(&mut difficulty, &level, outcome);
    } else {
        let level = resolve_level(args, &rules)?;
        for attempt in 0..args.attempts.max(1) {
            let weights = difficulty.weights_for_level(level.id);
            let seed = derive_attempt_seed(args.seed, level.id, attempt);
            let mut session = GameSession::start(
                level.clone(),
                rules,
                weights,
                WeightedGemSource::from_seed(seed),
            )
            .with_context(|| format!("level {} cannot start", level.id))?;
            println!("level {} attempt {}: {} moves", level.id, attempt + 1, level.moves);
            let outcome = play_attempt(&mut session, script.as_deref())?;
            record(&mut difficulty, &level, outcome);
            if !matches!(outcome, Some(LevelOutcome { won: false, .. })) {
                break;
            }
        }
    }

    if let Some(path) = &args.difficulty {
        DifficultyStore::from_model(&difficulty).save(path)?;
    }
    Ok(())
}

fn resolve_level(args: &PlayArgs, rules: &Rules) -> Result<LevelConfig> {
    let id = LevelId::new(args.level);
    match &args.levels {
        Some(path) => {
            let levels = level_table::load(path, rules)?;
            match level_table::find(&levels, id) {
                Some(level) => Ok(level.clone()),
                None => bail!("level {id} is not in {}", path.display()),
            }
        }
        None => Ok(LevelGenerator::default().generate(id, rules)),
    }
}

fn play_attempt<S: GemSource>(
    session: &mut GameSession<S>,
    script: Option<&[(Coord, Coord)]>,
) -> Result<Option<LevelOutcome>> {
    println!("{}", session.board());
    let mut scripted = script.map(|moves| moves.iter().copied());

    while session.outcome().is_none() {
        let next = match scripted.as_mut() {
            Some(moves) => moves.next(),
            None => session.hint(),
        };
        let Some((from, to)) = next else {
            if scripted.is_none() {
                println!("no productive swap remains");
            }
            break;
        };

        match session.submit_move(from, to) {
            Ok(resolution) => {
                print_cascade(from, to, &resolution.cascade);
                println!("{}", session.board());
            }
            Err(GameError::InvalidMove(reason)) => {
                tracing::warn!(
                    target: "gem_cascade::cli",
                    from = %from,
                    to = %to,
                    reason = %reason,
                    "move.rejected"
                );
                println!("move {from} -> {to} rejected: {reason}");
            }
            Err(error) => return Err(error).context("move could not be played"),
        }
    }

    print_summary(session)?;
    Ok(session.outcome())
}

fn record(difficulty: &mut AdaptiveDifficulty, level: &LevelConfig, outcome: Option<LevelOutcome>) {
    match outcome {
        Some(outcome) if outcome.won => difficulty.record_success(level.id),
        Some(_) => {
            let adjustment = difficulty.record_failure(level);
            println!("failed attempts in a row: {}", adjustment.stuck_count);
        }
        None => {}
    }
}

fn print_cascade(from: Coord, to: Coord, cascade: &CascadeResult) {
    println!(
        "move {from} -> {to}: +{} over {} batches",
        cascade.score_delta, cascade.combo_depth
    );
    for batch in &cascade.batches {
        println!(
            "  batch {}: matched {}, spawned {}, blasted {}, thawed {}, +{}",
            batch.combo,
            batch.matched.len(),
            batch.spawned.len(),
            batch.triggered.len(),
            batch.ice_damaged.len(),
            batch.score_delta()
        );
    }
}

fn print_summary<S>(session: &GameSession<S>) -> Result<()> {
    for progress in session.goal_progress() {
        let label = match progress.goal {
            Goal::Score { .. } => "score".to_owned(),
            Goal::Collect { color, .. } => format!("collect color {color}"),
        };
        let mark = if progress.satisfied { "done" } else { "open" };
        println!("{label}: {}/{} ({mark})", progress.current, progress.required);
    }

    match session.outcome() {
        Some(outcome) if outcome.won => println!(
            "won with {} stars, score {} in {} moves",
            outcome.stars, outcome.final_score, outcome.moves_used
        ),
        Some(outcome) => println!(
            "lost with score {} after {} moves",
            outcome.final_score, outcome.moves_used
        ),
        None => println!(
            "unfinished: score {}, {} moves left",
            session.score(),
            session.moves_remaining()
        ),
    }

    let code = session_transfer::encode(&session.snapshot())?;
    println!("resume: {code}");
    Ok(())
}

fn parse_moves(text: &str) -> Result<Vec<(Coord, Coord)>> {
    text.split_whitespace()
        .map(|token| {
            let (from, to) = token
                .split_once('>')
                .with_context(|| format!("move '{token}' must look like row,col>row,col"))?;
            Ok((parse_coord(from, token)?, parse_coord(to, token)?))
        })
        .collect()
}

fn parse_coord(text: &str, token: &str) -> Result<Coord> {
    let (row, column) = text
        .split_once(',')
        .with_context(|| format!("move '{token}' has a malformed cell '{text}'"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .with_context(|| format!("move '{token}' has a malformed row"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .with_context(|| format!("move '{token}' has a malformed column"))?;
    Ok(Coord::new(row, column))
}
