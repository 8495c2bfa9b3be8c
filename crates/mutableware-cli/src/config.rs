//! Pipeline configuration (JSON).

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// One animal -> sound rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRule {
    pub animal: String,
    pub sound: String,
}

impl SoundRule {
    pub fn new(animal: impl Into<String>, sound: impl Into<String>) -> Self {
        Self {
            animal: animal.into(),
            sound: sound.into(),
        }
    }
}

/// How to shape the pipeline.
///
/// Applied in order: `sounds` are added, then the `loud` handler, then
/// `swaps` replace rules for the same animal in place, then `remove` drops
/// rules by animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub sounds: Vec<SoundRule>,

    #[serde(default)]
    pub loud: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub swaps: Vec<SoundRule>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sounds: vec![SoundRule::new("duck", "quack"), SoundRule::new("cow", "moo")],
            loud: true,
            swaps: Vec::new(),
            remove: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid pipeline config")
    }

    /// Reads the config at `path`, or the built-in default when `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&json)
    }
}
