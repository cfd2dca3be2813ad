//! Simulation configuration with documented constants
//!
//! Values can come from defaults, a TOML file, or the command line
//! (the binary applies CLI overrides on top of whatever was loaded).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};
use crate::sampler::Cooling;

/// Configuration for a full run (all lanes)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent lanes run in parallel
    pub lanes: u32,

    /// Generations per lane
    pub generations: u32,

    /// Combatants spawned per generation
    pub population: usize,

    /// Base RNG seed; lane `n` uses `seed + n`.
    ///
    /// `None` picks a random seed at startup.
    pub seed: Option<u64>,

    /// Keep raw fight records after a generation has been summarized
    ///
    /// Off by default: only the summaries feed the next generation, and
    /// a large population produces thousands of records per generation.
    pub retain_fights: bool,

    pub sampler: SamplerConfig,

    pub export: ExportConfig,
}

/// Tuning for the attribute sampler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Multiplier applied to each drawn attribute before the total is
    /// forced back to 50
    ///
    /// At 50 the compensation pass floors two attributes and dumps the
    /// rest into the last one visited. At 1 the draws are used as-is and
    /// the bias seed steers the population.
    pub draw_scale: u32,

    /// Chance (in percent) of reusing the previous winner's variant
    pub same_variant_percent: u32,

    /// How the allowed difference around the bias seed shrinks
    pub cooling: Cooling,
}

/// Where and whether summaries are written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            lanes: 1,
            generations: 10,
            population: 100,
            seed: None,
            retain_fights: false,
            sampler: SamplerConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            draw_scale: 50,
            same_variant_percent: 75,
            cooling: Cooling::Remaining,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("data"),
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.lanes == 0 {
            return Err(ArenaError::InvalidConfig("lanes must be at least 1".into()));
        }

        if self.generations == 0 {
            return Err(ArenaError::InvalidConfig(
                "generations must be at least 1".into(),
            ));
        }

        // A generation with one combatant never fights
        if self.population < 2 {
            return Err(ArenaError::InvalidConfig(format!(
                "population ({}) must be at least 2",
                self.population
            )));
        }

        if self.sampler.draw_scale == 0 {
            return Err(ArenaError::InvalidConfig(
                "sampler.draw_scale must be at least 1".into(),
            ));
        }

        if self.sampler.same_variant_percent > 100 {
            return Err(ArenaError::InvalidConfig(format!(
                "sampler.same_variant_percent ({}) must be <= 100",
                self.sampler.same_variant_percent
            )));
        }

        Ok(())
    }

    /// Seed for a lane's RNG stream
    pub fn lane_seed(&self, base: u64, lane: u32) -> u64 {
        base.wrapping_add(lane as u64)
    }
}
