//! Shared, lane-partitioned statistics store
//!
//! One slot per lane, fixed when the aggregator is built. Every operation is
//! scoped by `LaneId` and touches only that lane's slot, so lanes running on
//! different threads never wait on each other.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::error::{ArenaError, Result};
use crate::core::types::{DayId, GenerationId, LaneId, MatchId};
use crate::sampler::BiasSeed;
use crate::stats::record::{FightRecord, GenerationSummary, WinnerStat};

/// Everything recorded for one lane
#[derive(Debug, Clone, Default)]
pub struct LaneLedger {
    pub fights: BTreeMap<(GenerationId, DayId, MatchId), FightRecord>,
    pub averages: BTreeMap<GenerationId, GenerationSummary>,
    pub bests: BTreeMap<GenerationId, GenerationSummary>,
}

/// Average and best summaries produced for one generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub average: GenerationSummary,
    pub best: GenerationSummary,
}

pub struct StatsAggregator {
    lanes: Vec<Mutex<LaneLedger>>,
}

impl StatsAggregator {
    pub fn new(lanes: u32) -> Self {
        Self {
            lanes: (0..lanes).map(|_| Mutex::new(LaneLedger::default())).collect(),
        }
    }

    fn lane(&self, lane: LaneId) -> Result<MutexGuard<'_, LaneLedger>> {
        let slot = self
            .lanes
            .get(lane.0 as usize)
            .ok_or(ArenaError::UnknownLane(lane))?;
        // A panicked lane leaves only its own ledger behind; keep reading it
        Ok(slot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Append a resolved fight to its lane
    pub fn record_fight(&self, lane: LaneId, record: FightRecord) -> Result<()> {
        let key = record.key();
        let mut ledger = self.lane(lane)?;
        if ledger.fights.insert(key, record).is_some() {
            tracing::warn!(lane = lane.0, ?key, "fight key recorded twice, keeping the latest");
        }
        Ok(())
    }

    /// Fights recorded for one generation, in (day, match) order
    pub fn fights(&self, lane: LaneId, generation: GenerationId) -> Result<Vec<FightRecord>> {
        let ledger = self.lane(lane)?;
        Ok(generation_fights(&ledger, generation).cloned().collect())
    }

    /// Fold a generation's fights into its average and best summaries
    ///
    /// A generation without fights produces nothing.
    pub fn summarize_generation(
        &self,
        lane: LaneId,
        generation: GenerationId,
    ) -> Result<Option<GenerationReport>> {
        let mut ledger = self.lane(lane)?;

        let fights: Vec<&FightRecord> = generation_fights(&ledger, generation).collect();
        let Some(first) = fights.first() else {
            tracing::warn!(lane = lane.0, generation = generation.0, "no fights to summarize");
            return Ok(None);
        };

        let winner_stats: Vec<WinnerStat> = fights.iter().map(|r| r.winner_stat()).collect();
        let average = GenerationSummary {
            lane,
            generation,
            // Convention: the variant column of an average is the first fight's winner
            specie: first.winner_stat().variant,
            speed: mean(winner_stats.iter().map(|s| s.speed)),
            damage: mean(winner_stats.iter().map(|s| s.damage)),
            protection: mean(winner_stats.iter().map(|s| s.protection)),
            winner_remaining_health: mean(fights.iter().map(|r| r.winner_remaining_health())),
            turns: mean(fights.iter().map(|r| r.turns as f64)),
        };

        let mut best_record: &FightRecord = *first;
        for record in fights.iter().skip(1) {
            if record.winner_remaining_health() > best_record.winner_remaining_health() {
                best_record = *record;
            }
        }
        let best = GenerationSummary::from_record(lane, best_record);
        let fight_count = fights.len();

        ledger.averages.insert(generation, average.clone());
        ledger.bests.insert(generation, best.clone());

        tracing::debug!(
            lane = lane.0,
            generation = generation.0,
            fights = fight_count,
            best_health = best.winner_remaining_health,
            "generation summarized"
        );

        Ok(Some(GenerationReport { average, best }))
    }

    /// Drop the raw fight records of a summarized generation
    pub fn prune_generation(&self, lane: LaneId, generation: GenerationId) -> Result<usize> {
        let mut ledger = self.lane(lane)?;
        let before = ledger.fights.len();
        ledger.fights.retain(|(g, _, _), _| *g != generation);
        Ok(before - ledger.fights.len())
    }

    pub fn average(&self, lane: LaneId, generation: GenerationId) -> Result<Option<GenerationSummary>> {
        Ok(self.lane(lane)?.averages.get(&generation).cloned())
    }

    pub fn best(&self, lane: LaneId, generation: GenerationId) -> Result<Option<GenerationSummary>> {
        Ok(self.lane(lane)?.bests.get(&generation).cloned())
    }

    /// Bias seed for the generation after `generation`
    pub fn bias_seed(&self, lane: LaneId, generation: GenerationId) -> Result<Option<BiasSeed>> {
        Ok(self.best(lane, generation)?.as_ref().map(BiasSeed::from_summary))
    }

    /// Every average summary, ordered by lane then generation
    pub fn averages(&self) -> Vec<GenerationSummary> {
        self.collect(|ledger| ledger.averages.values().cloned().collect())
    }

    /// Every best summary, ordered by lane then generation
    pub fn bests(&self) -> Vec<GenerationSummary> {
        self.collect(|ledger| ledger.bests.values().cloned().collect())
    }

    fn collect(&self, pick: impl Fn(&LaneLedger) -> Vec<GenerationSummary>) -> Vec<GenerationSummary> {
        self.lanes
            .iter()
            .flat_map(|slot| pick(&slot.lock().unwrap_or_else(PoisonError::into_inner)))
            .collect()
    }

    /// The best summary with the highest remaining health across all lanes
    pub fn best_overall(&self) -> Option<GenerationSummary> {
        let mut best: Option<GenerationSummary> = None;
        for summary in self.bests() {
            let better = best
                .as_ref()
                .map_or(true, |b| summary.winner_remaining_health > b.winner_remaining_health);
            if better {
                best = Some(summary);
            }
        }
        best
    }
}

fn generation_fights(
    ledger: &LaneLedger,
    generation: GenerationId,
) -> impl Iterator<Item = &FightRecord> {
    ledger
        .fights
        .range((generation, DayId(0), MatchId(0))..)
        .take_while(move |((g, _, _), _)| *g == generation)
        .map(|(_, record)| record)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Attributes, CombatantSnapshot, Variant};
    use crate::stats::record::Victor;

    fn record(generation: u32, day: u32, match_id: u32, health: f64, turns: u32) -> FightRecord {
        FightRecord {
            generation: GenerationId(generation),
            day: DayId(day),
            match_id: MatchId(match_id),
            victor: Victor::Single(CombatantSnapshot {
                name: format!("w{}-{}", day, match_id),
                variant: if match_id == 0 { Variant::SlowButStrong } else { Variant::Base },
                attributes: Attributes::new(5 + match_id, 40 - match_id, 5).unwrap(),
                health,
            }),
            loser: None,
            turns,
        }
    }

    #[test]
    fn test_summary_of_empty_generation_is_none() {
        let stats = StatsAggregator::new(1);
        assert!(stats.summarize_generation(LaneId(0), GenerationId(1)).unwrap().is_none());
        assert!(stats.best(LaneId(0), GenerationId(1)).unwrap().is_none());
    }

    #[test]
    fn test_unknown_lane_is_error() {
        let stats = StatsAggregator::new(2);
        let err = stats.record_fight(LaneId(2), record(1, 1, 0, 50.0, 3)).unwrap_err();
        assert!(matches!(err, ArenaError::UnknownLane(LaneId(2))));
    }

    #[test]
    fn test_average_and_best() {
        let stats = StatsAggregator::new(1);
        let lane = LaneId(0);
        stats.record_fight(lane, record(1, 1, 0, 40.0, 2)).unwrap();
        stats.record_fight(lane, record(1, 1, 1, 90.0, 4)).unwrap();
        stats.record_fight(lane, record(1, 2, 0, 20.0, 6)).unwrap();
        // Another generation must not leak in
        stats.record_fight(lane, record(2, 1, 0, 150.0, 1)).unwrap();

        let report = stats.summarize_generation(lane, GenerationId(1)).unwrap().unwrap();
        assert_eq!(report.average.specie, Variant::SlowButStrong);
        assert!((report.average.winner_remaining_health - 50.0).abs() < 1e-9);
        assert!((report.average.turns - 4.0).abs() < 1e-9);
        assert!((report.average.speed - 16.0 / 3.0).abs() < 1e-9);

        assert_eq!(report.best.winner_remaining_health, 90.0);
        assert_eq!(report.best.turns, 4.0);
        assert_eq!(report.best.specie, Variant::Base);
        assert_eq!(stats.best(lane, GenerationId(1)).unwrap(), Some(report.best));
    }

    #[test]
    fn test_best_tie_keeps_first() {
        let stats = StatsAggregator::new(1);
        let lane = LaneId(0);
        stats.record_fight(lane, record(1, 1, 0, 70.0, 2)).unwrap();
        stats.record_fight(lane, record(1, 1, 1, 70.0, 9)).unwrap();

        let report = stats.summarize_generation(lane, GenerationId(1)).unwrap().unwrap();
        assert_eq!(report.best.turns, 2.0);
    }

    #[test]
    fn test_lanes_are_isolated() {
        let stats = StatsAggregator::new(2);
        stats.record_fight(LaneId(0), record(1, 1, 0, 30.0, 2)).unwrap();
        stats.record_fight(LaneId(1), record(1, 1, 0, 80.0, 2)).unwrap();

        assert_eq!(stats.fights(LaneId(0), GenerationId(1)).unwrap().len(), 1);
        let r0 = stats.summarize_generation(LaneId(0), GenerationId(1)).unwrap().unwrap();
        assert_eq!(r0.best.winner_remaining_health, 30.0);
        assert!(stats.best(LaneId(1), GenerationId(1)).unwrap().is_none());
    }

    #[test]
    fn test_best_overall_scans_all_lanes() {
        let stats = StatsAggregator::new(2);
        stats.record_fight(LaneId(0), record(1, 1, 0, 30.0, 2)).unwrap();
        stats.record_fight(LaneId(0), record(2, 1, 0, 60.0, 2)).unwrap();
        stats.record_fight(LaneId(1), record(1, 1, 1, 110.0, 2)).unwrap();
        for (lane, generation) in [(0, 1), (0, 2), (1, 1)] {
            stats
                .summarize_generation(LaneId(lane), GenerationId(generation))
                .unwrap();
        }

        let best = stats.best_overall().unwrap();
        assert_eq!(best.lane, LaneId(1));
        assert_eq!(best.winner_remaining_health, 110.0);
        assert_eq!(stats.bests().len(), 3);
        assert_eq!(stats.averages()[0].lane, LaneId(0));
    }

    #[test]
    fn test_best_overall_empty() {
        assert!(StatsAggregator::new(3).best_overall().is_none());
    }

    #[test]
    fn test_prune_keeps_summaries() {
        let stats = StatsAggregator::new(1);
        let lane = LaneId(0);
        stats.record_fight(lane, record(1, 1, 0, 30.0, 2)).unwrap();
        stats.record_fight(lane, record(2, 1, 0, 30.0, 2)).unwrap();
        stats.summarize_generation(lane, GenerationId(1)).unwrap();

        assert_eq!(stats.prune_generation(lane, GenerationId(1)).unwrap(), 1);
        assert!(stats.fights(lane, GenerationId(1)).unwrap().is_empty());
        assert_eq!(stats.fights(lane, GenerationId(2)).unwrap().len(), 1);
        assert!(stats.average(lane, GenerationId(1)).unwrap().is_some());
    }

    #[test]
    fn test_bias_seed_from_best() {
        let stats = StatsAggregator::new(1);
        let lane = LaneId(0);
        stats.record_fight(lane, record(1, 1, 1, 30.0, 2)).unwrap();
        stats.summarize_generation(lane, GenerationId(1)).unwrap();

        let seed = stats.bias_seed(lane, GenerationId(1)).unwrap().unwrap();
        assert_eq!(seed.variant, Variant::Base);
        assert_eq!(seed.speed, 6.0);
        assert_eq!(seed.damage, 39.0);
    }
}
