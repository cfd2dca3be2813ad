//! Core identifiers used throughout the codebase

use serde::{Deserialize, Serialize};

/// One independently executed sequence of generations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId(pub u32);

/// Generation (iteration) number within a lane, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenerationId(pub u32);

/// Day number within a generation, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayId(pub u32);

/// Index of a match within its day, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(pub u32);

impl LaneId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl GenerationId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl DayId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl MatchId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Where a fight happened, when it is part of a lane's run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FightContext {
    pub lane: LaneId,
    pub generation: GenerationId,
    pub day: DayId,
    pub match_id: MatchId,
}
