//! Day scheduler
//!
//! At the start of a day every living combatant heals a little and decides
//! whether to fight or run. Matches are then built from a shuffled queue:
//! anyone who successfully runs away sits the day out, everyone else is
//! paired in queue order. A leftover combatant simply has no match today.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::combatant::{Combatant, DayChoice};
use crate::core::error::{ArenaError, Result};
use crate::core::types::{DayId, FightContext, GenerationId, LaneId, MatchId};
use crate::decision::DecisionProvider;
use crate::fight::{resolve_match, FightOutcome, Side};
use crate::stats::StatsAggregator;

/// Health every living combatant recovers at dawn
pub const DAILY_HEAL: f64 = 5.0;

/// Run-away succeeds when a draw from `0..RUN_AWAY_RANGE` is below raw speed
pub const RUN_AWAY_RANGE: u32 = 36;

const RUN_AWAY_MOTIVATION: f64 = 10.0;
const FAILED_RUN_AWAY_MOTIVATION: f64 = -5.0;
const FIGHT_CHOICE_MOTIVATION: f64 = 5.0;

/// Pre-fight escape roll, `speed / 36` odds
pub fn run_away_succeeds<R: Rng + ?Sized>(speed: u32, rng: &mut R) -> bool {
    rng.gen_range(0..RUN_AWAY_RANGE) < speed
}

/// One resolved match of the day, indices into the day's combatant slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub first: usize,
    pub second: usize,
    pub outcome: FightOutcome,
}

impl MatchResult {
    pub fn winner(&self) -> usize {
        match self.outcome.winner {
            Side::First => self.first,
            Side::Second => self.second,
        }
    }
}

struct Reporting<'s> {
    stats: &'s StatsAggregator,
    lane: LaneId,
    generation: GenerationId,
}

pub struct Day<'a, 's> {
    id: DayId,
    combatants: &'a mut [Combatant],
    reporting: Option<Reporting<'s>>,
}

impl<'a, 's> Day<'a, 's> {
    pub fn new(id: DayId, combatants: &'a mut [Combatant]) -> Self {
        Self {
            id,
            combatants,
            reporting: None,
        }
    }

    /// Report every fight to `stats` under this lane and generation
    pub fn with_stats(mut self, stats: &'s StatsAggregator, lane: LaneId, generation: GenerationId) -> Self {
        self.reporting = Some(Reporting {
            stats,
            lane,
            generation,
        });
        self
    }

    pub fn id(&self) -> DayId {
        self.id
    }

    /// Decide, match, fight
    pub fn run(
        &mut self,
        decisions: &mut dyn DecisionProvider,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<MatchResult>> {
        self.collect_decisions(decisions, rng)?;
        let matches = self.make_matches(rng)?;
        let results = self.run_matches(&matches, decisions, rng)?;

        tracing::debug!(
            day = self.id.0,
            alive = self.combatants.iter().filter(|c| c.is_alive()).count(),
            matches = results.len(),
            "day complete"
        );
        Ok(results)
    }

    /// Dawn heal, then one fight/run decision per living combatant
    pub fn collect_decisions(
        &mut self,
        decisions: &mut dyn DecisionProvider,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        for combatant in self.combatants.iter_mut().filter(|c| c.is_alive()) {
            combatant.heal(DAILY_HEAL);
            let choice = decisions.choose_day(combatant, self.id, &DayChoice::ALL, rng)?;
            combatant.record_choice(self.id, choice);
        }
        Ok(())
    }

    /// Pair up today's fighters
    ///
    /// Every living combatant must already have a decision for today.
    pub fn make_matches(&mut self, rng: &mut dyn RngCore) -> Result<Vec<(usize, usize)>> {
        let mut queue: Vec<usize> = (0..self.combatants.len())
            .filter(|&i| self.combatants[i].is_alive())
            .collect();
        queue.shuffle(rng);
        let mut queue = VecDeque::from(queue);

        let mut matches = Vec::new();
        while let Some(first) = queue.pop_front() {
            if self.runs_away(first, rng)? {
                continue;
            }

            let mut second = None;
            while let Some(candidate) = queue.pop_front() {
                if !self.runs_away(candidate, rng)? {
                    second = Some(candidate);
                    break;
                }
            }

            if let Some(second) = second {
                matches.push((first, second));
            }
        }
        Ok(matches)
    }

    /// Apply the run-away filter and its motivation effects
    fn runs_away(&mut self, index: usize, rng: &mut dyn RngCore) -> Result<bool> {
        let combatant = &mut self.combatants[index];
        match combatant.get_choice(self.id)? {
            DayChoice::Run => {
                if run_away_succeeds(combatant.attributes().speed(), rng) {
                    combatant.adjust_motivation(RUN_AWAY_MOTIVATION);
                    Ok(true)
                } else {
                    combatant.adjust_motivation(FAILED_RUN_AWAY_MOTIVATION);
                    Ok(false)
                }
            }
            DayChoice::Fight => {
                combatant.adjust_motivation(FIGHT_CHOICE_MOTIVATION);
                Ok(false)
            }
        }
    }

    fn run_matches(
        &mut self,
        matches: &[(usize, usize)],
        decisions: &mut dyn DecisionProvider,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<MatchResult>> {
        let mut results = Vec::with_capacity(matches.len());

        for (number, &(first, second)) in matches.iter().enumerate() {
            let match_id = MatchId(number as u32);
            let report = self.reporting.as_ref().map(|r| {
                (
                    r.stats,
                    FightContext {
                        lane: r.lane,
                        generation: r.generation,
                        day: self.id,
                        match_id,
                    },
                )
            });

            let (a, b) = pair_mut(&mut *self.combatants, first, second)?;
            let outcome = resolve_match(a, b, decisions, rng, report)?;
            results.push(MatchResult {
                match_id,
                first,
                second,
                outcome,
            });
        }
        Ok(results)
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Result<(&mut T, &mut T)> {
    if a == b || a.max(b) >= items.len() {
        return Err(ArenaError::InvalidMatch { first: a, second: b });
    }
    if a < b {
        let (left, right) = items.split_at_mut(b);
        Ok((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = items.split_at_mut(a);
        Ok((&mut right[0], &mut left[b]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Variant;
    use crate::decision::{FixedDecisions, RandomDecisions};
    use crate::fight::FightAction;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn population(n: usize) -> Vec<Combatant> {
        (0..n)
            .map(|i| Combatant::try_new(format!("c{}", i), Variant::Base, 10, 20, 20).unwrap())
            .collect()
    }

    #[test]
    fn test_run_away_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let trials = 40_000;
        let escapes = (0..trials).filter(|_| run_away_succeeds(18, &mut rng)).count();
        let rate = escapes as f64 / trials as f64;
        assert!((rate - 0.5).abs() < 0.02, "rate {}", rate);
    }

    #[test]
    fn test_run_away_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!((0..1000).all(|_| !run_away_succeeds(0, &mut rng)));
        assert!((0..1000).all(|_| run_away_succeeds(36, &mut rng)));
    }

    #[test]
    fn test_everyone_fighting_pairs_floor_half() {
        for n in [0usize, 1, 2, 7, 10] {
            let mut rng = ChaCha8Rng::seed_from_u64(n as u64);
            let mut combatants = population(n);
            let mut decisions = FixedDecisions::always_fight();
            let results = Day::new(DayId(1), &mut combatants)
                .run(&mut decisions, &mut rng)
                .unwrap();

            assert_eq!(results.len(), n / 2);
            let mut seen = Vec::new();
            for r in &results {
                assert!(!seen.contains(&r.first) && !seen.contains(&r.second));
                seen.push(r.first);
                seen.push(r.second);
            }
        }
    }

    #[test]
    fn test_fight_choice_gains_motivation() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut combatants = population(3);
        let mut decisions = FixedDecisions::always_fight();
        let mut day = Day::new(DayId(1), &mut combatants);
        day.collect_decisions(&mut decisions, &mut rng).unwrap();
        let matches = day.make_matches(&mut rng).unwrap();
        assert_eq!(matches.len(), 1);

        for c in combatants.iter() {
            assert_eq!(c.motivation(), 55.0);
        }
    }

    #[test]
    fn test_successful_run_away_sits_out() {
        // Speed 40 beats every 0..36 draw
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut combatants: Vec<Combatant> = (0..4)
            .map(|i| Combatant::try_new(format!("r{}", i), Variant::Base, 40, 5, 5).unwrap())
            .collect();
        let mut decisions = FixedDecisions {
            day: DayChoice::Run,
            action: FightAction::Attack,
        };

        let results = Day::new(DayId(1), &mut combatants)
            .run(&mut decisions, &mut rng)
            .unwrap();

        assert!(results.is_empty());
        for c in &combatants {
            assert_eq!(c.motivation(), 60.0);
            assert_eq!(c.health(), 105.0);
        }
    }

    #[test]
    fn test_failed_run_away_still_fights() {
        // Every draw lands mid-range: 18 out of 0..36, above speed 10
        let mut rng = StepRng::new(0x8000_0000, 0);
        let mut combatants = population(2);
        let mut decisions = FixedDecisions {
            day: DayChoice::Run,
            action: FightAction::Attack,
        };

        let mut day = Day::new(DayId(1), &mut combatants);
        day.collect_decisions(&mut decisions, &mut rng).unwrap();
        let matches = day.make_matches(&mut rng).unwrap();

        assert_eq!(matches.len(), 1);
        let (first, second) = matches[0];
        assert_ne!(first, second);
        for c in &combatants {
            assert_eq!(c.motivation(), 45.0);
        }
    }

    #[test]
    fn test_dead_are_skipped() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut combatants = population(3);
        combatants[1].apply_damage(1000.0);
        let mut decisions = FixedDecisions::always_fight();
        let mut day = Day::new(DayId(2), &mut combatants);
        day.collect_decisions(&mut decisions, &mut rng).unwrap();
        let matches = day.make_matches(&mut rng).unwrap();

        assert_eq!(matches.len(), 1);
        assert!(matches[0].0 != 1 && matches[0].1 != 1);
        assert_eq!(combatants[1].health(), 0.0);
        assert!(combatants[1].get_choice(DayId(2)).is_err());
        assert_eq!(combatants[0].health(), 105.0);
    }

    #[test]
    fn test_matching_without_decisions_is_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut combatants = population(2);
        let err = Day::new(DayId(1), &mut combatants)
            .make_matches(&mut rng)
            .unwrap_err();
        assert!(matches!(err, ArenaError::MissingDayChoice { .. }));
    }

    #[test]
    fn test_fights_are_reported_with_context() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let stats = StatsAggregator::new(1);
        let mut combatants = population(6);
        let mut decisions = FixedDecisions::always_fight();

        let results = Day::new(DayId(3), &mut combatants)
            .with_stats(&stats, LaneId(0), GenerationId(2))
            .run(&mut decisions, &mut rng)
            .unwrap();

        let fights = stats.fights(LaneId(0), GenerationId(2)).unwrap();
        assert_eq!(fights.len(), results.len());
        for (i, fight) in fights.iter().enumerate() {
            assert_eq!(fight.day, DayId(3));
            assert_eq!(fight.match_id, MatchId(i as u32));
        }
    }

    #[test]
    fn test_standalone_day_records_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut combatants = population(4);
        let mut decisions = RandomDecisions;
        let results = Day::new(DayId(1), &mut combatants)
            .run(&mut decisions, &mut rng)
            .unwrap();
        for r in &results {
            assert!(combatants[r.winner()].is_alive());
        }
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut items = vec![1, 2, 3];
        let (a, b) = pair_mut(&mut items, 2, 0).unwrap();
        std::mem::swap(a, b);
        assert_eq!(items, vec![3, 2, 1]);
    }

    #[test]
    fn test_pair_mut_rejects_self_and_out_of_range() {
        let mut items = vec![1, 2, 3];
        assert!(matches!(
            pair_mut(&mut items, 1, 1),
            Err(ArenaError::InvalidMatch { first: 1, second: 1 })
        ));
        assert!(pair_mut(&mut items, 0, 3).is_err());
        assert_eq!(items, vec![1, 2, 3]);
    }
}
