use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::stats::GenerationSummary;

pub const METADATA_FILE: &str = "metadata.json";

/// Run parameters and outcome, written as `metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub lanes: u32,
    pub generations: u32,
    pub population: usize,
    pub seed: u64,
    pub in_progress: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<GenerationSummary>,
}

impl RunMetadata {
    /// Metadata for a run that is about to start
    pub fn started(config: &SimulationConfig, seed: u64) -> Self {
        Self {
            lanes: config.lanes,
            generations: config.generations,
            population: config.population,
            seed,
            in_progress: true,
            best: None,
        }
    }

    pub fn finish(&mut self, best: Option<GenerationSummary>) {
        self.in_progress = false;
        self.best = best;
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(METADATA_FILE), json)?;
        Ok(())
    }

    pub fn read(dir: &Path) -> Result<Self> {
        let content = fs::read_to_string(dir.join(METADATA_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }
}
