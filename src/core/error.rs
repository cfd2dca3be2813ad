use thiserror::Error;

use crate::core::types::{DayId, LaneId};

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error(
        "Invalid attributes (speed {speed}, damage {damage}, protection {protection}): {reason}"
    )]
    InvalidAttributes {
        speed: u32,
        damage: u32,
        protection: u32,
        reason: &'static str,
    },

    #[error("No decision recorded for {combatant} on day {day:?}")]
    MissingDayChoice { combatant: String, day: DayId },

    #[error("Invalid match pairing: {first} vs {second}")]
    InvalidMatch { first: usize, second: usize },

    #[error("Unknown lane: {0:?}")]
    UnknownLane(LaneId),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
