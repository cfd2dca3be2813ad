//! Combatant variants and their penalty profiles
//!
//! A variant is a tag, not a behavior: the only thing that differs between
//! variants is the five-field multiplier vector applied to raw stats.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Multipliers applied to raw stats to get effective stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyProfile {
    pub speed: f64,
    pub damage: f64,
    pub protection: f64,
    pub health: f64,
    pub motivation: f64,
}

impl PenaltyProfile {
    /// All multipliers 1
    pub const NEUTRAL: Self = Self {
        speed: 1.0,
        damage: 1.0,
        protection: 1.0,
        health: 1.0,
        motivation: 1.0,
    };
}

impl Default for PenaltyProfile {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// The four combatant variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    Base,
    HealthyButWeak,
    MotivatedButWeak,
    SlowButStrong,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Base,
        Variant::HealthyButWeak,
        Variant::MotivatedButWeak,
        Variant::SlowButStrong,
    ];

    /// Penalty profile for this variant
    pub fn penalties(self) -> PenaltyProfile {
        match self {
            Variant::Base => PenaltyProfile::NEUTRAL,
            Variant::HealthyButWeak => PenaltyProfile {
                damage: 0.5,
                protection: 0.5,
                health: 2.0,
                ..PenaltyProfile::NEUTRAL
            },
            Variant::MotivatedButWeak => PenaltyProfile {
                damage: 0.5,
                protection: 0.5,
                motivation: 2.0,
                ..PenaltyProfile::NEUTRAL
            },
            Variant::SlowButStrong => PenaltyProfile {
                speed: 0.5,
                damage: 1.5,
                ..PenaltyProfile::NEUTRAL
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Base => "Base",
            Variant::HealthyButWeak => "HealthyButWeak",
            Variant::MotivatedButWeak => "MotivatedButWeak",
            Variant::SlowButStrong => "SlowButStrong",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
