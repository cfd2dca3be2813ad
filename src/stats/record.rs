use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantSnapshot, Variant};
use crate::core::types::{DayId, GenerationId, LaneId, MatchId};

/// Who won a fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Victor {
    /// Knocked the opponent out
    Single(CombatantSnapshot),
    /// Escaped mid-fight; both combatants are still standing
    Escaped {
        runner: CombatantSnapshot,
        opponent: CombatantSnapshot,
    },
}

/// Winner attributes as fed into the averages
///
/// Fractional because an escape averages both combatants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinnerStat {
    pub variant: Variant,
    pub speed: f64,
    pub damage: f64,
    pub protection: f64,
}

impl WinnerStat {
    fn of(snapshot: &CombatantSnapshot) -> Self {
        Self {
            variant: snapshot.variant,
            speed: snapshot.attributes.speed() as f64,
            damage: snapshot.attributes.damage() as f64,
            protection: snapshot.attributes.protection() as f64,
        }
    }
}

impl Victor {
    /// The combatant credited with the win
    pub fn winner(&self) -> &CombatantSnapshot {
        match self {
            Victor::Single(winner) => winner,
            Victor::Escaped { runner, .. } => runner,
        }
    }

    pub fn remaining_health(&self) -> f64 {
        match self {
            Victor::Single(winner) => winner.health,
            Victor::Escaped { runner, opponent } => (runner.health + opponent.health) / 2.0,
        }
    }

    pub fn stat(&self) -> WinnerStat {
        match self {
            Victor::Single(winner) => WinnerStat::of(winner),
            Victor::Escaped { runner, opponent } => {
                let a = WinnerStat::of(runner);
                let b = WinnerStat::of(opponent);
                WinnerStat {
                    variant: runner.variant,
                    speed: (a.speed + b.speed) / 2.0,
                    damage: (a.damage + b.damage) / 2.0,
                    protection: (a.protection + b.protection) / 2.0,
                }
            }
        }
    }
}

/// One resolved fight; never mutated after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightRecord {
    pub generation: GenerationId,
    pub day: DayId,
    pub match_id: MatchId,
    pub victor: Victor,
    pub loser: Option<CombatantSnapshot>,
    pub turns: u32,
}

impl FightRecord {
    pub fn key(&self) -> (GenerationId, DayId, MatchId) {
        (self.generation, self.day, self.match_id)
    }

    pub fn winner_remaining_health(&self) -> f64 {
        self.victor.remaining_health()
    }

    pub fn winner_stat(&self) -> WinnerStat {
        self.victor.stat()
    }
}

/// Summary row shared by the average and best aggregates
///
/// Field names are what exporters and renderers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub lane: LaneId,
    pub generation: GenerationId,
    pub specie: Variant,
    pub speed: f64,
    pub damage: f64,
    pub protection: f64,
    pub winner_remaining_health: f64,
    pub turns: f64,
}

impl GenerationSummary {
    /// Summary of a single fight (the best-of-generation row)
    pub fn from_record(lane: LaneId, record: &FightRecord) -> Self {
        let stat = record.winner_stat();
        Self {
            lane,
            generation: record.generation,
            specie: stat.variant,
            speed: stat.speed,
            damage: stat.damage,
            protection: stat.protection,
            winner_remaining_health: record.winner_remaining_health(),
            turns: record.turns as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Attributes;

    fn snapshot(variant: Variant, speed: u32, damage: u32, protection: u32, health: f64) -> CombatantSnapshot {
        CombatantSnapshot {
            name: "s".into(),
            variant,
            attributes: Attributes::new(speed, damage, protection).unwrap(),
            health,
        }
    }

    #[test]
    fn test_single_victor_stat() {
        let victor = Victor::Single(snapshot(Variant::Base, 10, 20, 20, 64.0));
        assert_eq!(victor.remaining_health(), 64.0);
        let stat = victor.stat();
        assert_eq!(stat.speed, 10.0);
        assert_eq!(stat.variant, Variant::Base);
    }

    #[test]
    fn test_escaped_victor_averages_both() {
        let victor = Victor::Escaped {
            runner: snapshot(Variant::SlowButStrong, 10, 20, 20, 80.0),
            opponent: snapshot(Variant::Base, 20, 25, 5, 40.0),
        };
        assert_eq!(victor.remaining_health(), 60.0);
        let stat = victor.stat();
        assert_eq!(stat.variant, Variant::SlowButStrong);
        assert_eq!(stat.speed, 15.0);
        assert_eq!(stat.damage, 22.5);
        assert_eq!(stat.protection, 12.5);
        assert_eq!(victor.winner().variant, Variant::SlowButStrong);
    }

    #[test]
    fn test_summary_serializes_contract_fields() {
        let record = FightRecord {
            generation: GenerationId(2),
            day: DayId(1),
            match_id: MatchId(0),
            victor: Victor::Single(snapshot(Variant::Base, 5, 40, 5, 90.0)),
            loser: None,
            turns: 4,
        };
        let summary = GenerationSummary::from_record(LaneId(1), &record);
        let json = serde_json::to_value(&summary).unwrap();
        for field in [
            "lane",
            "generation",
            "specie",
            "speed",
            "damage",
            "protection",
            "winner_remaining_health",
            "turns",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(json["specie"], "Base");
        assert_eq!(json["lane"], 1);
    }
}
