use std::{fs, path::Path};

use anyhow::{Context, Result};
use gem_cascade_board::Board;
use gem_cascade_core::{ColorWeights, ConfigError, LevelConfig, LevelId, Rules};
use gem_cascade_system_difficulty::WeightedGemSource;

/// Reads a JSON array of levels and validates every entry.
pub(crate) fn load(path: &Path, rules: &Rules) -> Result<Vec<LevelConfig>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level table {}", path.display()))?;
    parse(&text, rules).with_context(|| format!("invalid level table {}", path.display()))
}

/// Parses and validates a level table.
pub(crate) fn parse(text: &str, rules: &Rules) -> Result<Vec<LevelConfig>> {
    let levels: Vec<LevelConfig> =
        serde_json::from_str(text).context("level table is not a JSON array of levels")?;
    for (index, level) in levels.iter().enumerate() {
        validate_level(level, rules)
            .with_context(|| format!("level entry {index} (id {}) is invalid", level.id))?;
    }
    Ok(levels)
}

/// Finds a level by identifier.
pub(crate) fn find(levels: &[LevelConfig], id: LevelId) -> Option<&LevelConfig> {
    levels.iter().find(|level| level.id == id)
}

fn validate_level(level: &LevelConfig, rules: &Rules) -> Result<(), ConfigError> {
    level.validate(rules)?;
    if level.initial_grid.is_some() {
        // Explicit grids never draw from the source; building the board runs
        // the starting-run check.
        let weights = ColorWeights::uniform(rules.color_count);
        let _ = Board::generate(level, rules, &weights, &mut WeightedGemSource::from_seed(0))?;
    }
    Ok(())
}
