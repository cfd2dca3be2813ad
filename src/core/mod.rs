pub mod config;
pub mod error;
pub mod types;

pub use config::{ExportConfig, SamplerConfig, SimulationConfig};
pub use error::{ArenaError, Result};
pub use types::{DayId, FightContext, GenerationId, LaneId, MatchId};
