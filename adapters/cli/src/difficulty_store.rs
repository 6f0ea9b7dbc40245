use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use gem_cascade_core::DifficultyAdjustment;
use gem_cascade_system_difficulty::{AdaptiveDifficulty, DifficultyConfig};
use serde::{Deserialize, Serialize};

/// On-disk form of the adaptive difficulty model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DifficultyStore {
    /// Tuning applied when recording attempts.
    pub(crate) config: DifficultyConfig,
    /// Adjustments in level order.
    pub(crate) adjustments: Vec<DifficultyAdjustment>,
}

impl DifficultyStore {
    /// Reads the store, treating a missing file as an empty one.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("invalid difficulty state {}", path.display())),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error)
                .with_context(|| format!("failed to read difficulty state {}", path.display())),
        }
    }

    /// Writes the store as pretty-printed JSON.
    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to encode difficulty state")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write difficulty state {}", path.display()))
    }

    /// Builds the live model for rules with `color_count` colors.
    pub(crate) fn into_model(self, color_count: u8) -> AdaptiveDifficulty {
        AdaptiveDifficulty::from_adjustments(self.config, color_count, self.adjustments)
    }

    /// Captures the live model.
    pub(crate) fn from_model(model: &AdaptiveDifficulty) -> Self {
        Self {
            config: *model.config(),
            adjustments: model.adjustments().cloned().collect(),
        }
    }
}
