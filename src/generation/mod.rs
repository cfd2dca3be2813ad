//! Generation loop
//!
//! A generation spawns a population, runs days until at most one combatant
//! is left standing, and is then summarized. A lane chains generations,
//! feeding each one's best result into the next one's sampler. Lanes are
//! independent and run in parallel against one shared aggregator.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::combatant::{Combatant, Control};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{DayId, GenerationId, LaneId};
use crate::day::Day;
use crate::decision::{DecisionProvider, RandomDecisions};
use crate::sampler::{AttributeSampler, BiasSeed};
use crate::stats::{GenerationReport, StatsAggregator};

/// One population from spawn until at most one survivor remains
pub struct Generation {
    pub lane: LaneId,
    pub id: GenerationId,
    combatants: Vec<Combatant>,
}

/// How a generation played out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub days: u32,
    pub fights: usize,
    pub survivors: usize,
}

impl Generation {
    pub fn new(lane: LaneId, id: GenerationId, combatants: Vec<Combatant>) -> Self {
        Self {
            lane,
            id,
            combatants,
        }
    }

    /// Sample a fresh population around `bias`
    pub fn spawn<R: RngCore + ?Sized>(
        lane: LaneId,
        id: GenerationId,
        sampler: &AttributeSampler,
        size: usize,
        bias: Option<&BiasSeed>,
        allowed_difference: u32,
        rng: &mut R,
    ) -> Result<Self> {
        let combatants = sampler.population(size, bias, allowed_difference, rng)?;
        Ok(Self::new(lane, id, combatants))
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatants_mut(&mut self) -> &mut [Combatant] {
        &mut self.combatants
    }

    pub fn alive_count(&self) -> usize {
        self.combatants.iter().filter(|c| c.is_alive()).count()
    }

    /// Run days until at most one combatant is alive
    pub fn run(
        &mut self,
        stats: &StatsAggregator,
        decisions: &mut dyn DecisionProvider,
        rng: &mut dyn RngCore,
    ) -> Result<GenerationOutcome> {
        let mut day = DayId(1);
        let mut days = 0;
        let mut fights = 0;

        while self.alive_count() > 1 {
            let results = Day::new(day, &mut self.combatants)
                .with_stats(stats, self.lane, self.id)
                .run(decisions, rng)?;
            fights += results.len();
            days += 1;
            day = day.next();
        }

        Ok(GenerationOutcome {
            days,
            fights,
            survivors: self.alive_count(),
        })
    }
}

/// Reported to the observer after each generation
#[derive(Debug, Clone)]
pub struct GenerationEnd {
    pub lane: LaneId,
    pub generation: GenerationId,
    pub outcome: GenerationOutcome,
    /// `None` when the generation produced no fights
    pub report: Option<GenerationReport>,
}

/// What a lane finished with
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSummary {
    pub lane: LaneId,
    pub generations: u32,
    pub fights: usize,
    /// Seed the next generation would have used
    pub final_bias: Option<BiasSeed>,
}

/// One lane: a chain of generations sharing a stats aggregator
pub struct Lane<'a> {
    id: LaneId,
    config: &'a SimulationConfig,
    stats: &'a StatsAggregator,
    sampler: AttributeSampler,
    manual_first: bool,
}

impl<'a> Lane<'a> {
    pub fn new(id: LaneId, config: &'a SimulationConfig, stats: &'a StatsAggregator) -> Self {
        Self {
            id,
            config,
            stats,
            sampler: AttributeSampler::new(&config.sampler),
            manual_first: false,
        }
    }

    /// Hand the first combatant of every generation to a human
    pub fn with_manual_first(mut self, manual: bool) -> Self {
        self.manual_first = manual;
        self
    }

    pub fn run(
        &self,
        decisions: &mut dyn DecisionProvider,
        rng: &mut dyn RngCore,
        observer: &(dyn Fn(&GenerationEnd) + Sync),
    ) -> Result<LaneSummary> {
        let total = self.config.generations;
        let mut bias: Option<BiasSeed> = None;
        let mut fights = 0;

        for number in 1..=total {
            let id = GenerationId(number);
            let allowed = self.config.sampler.cooling.allowed_difference(id, total);

            let mut generation = Generation::spawn(
                self.id,
                id,
                &self.sampler,
                self.config.population,
                bias.as_ref(),
                allowed,
                rng,
            )?;
            if self.manual_first {
                if let Some(first) = generation.combatants_mut().first_mut() {
                    first.control = Control::Manual;
                }
            }

            let outcome = generation.run(self.stats, decisions, rng)?;
            let report = self.stats.summarize_generation(self.id, id)?;
            if !self.config.retain_fights {
                self.stats.prune_generation(self.id, id)?;
            }
            fights += outcome.fights;

            match &report {
                Some(report) => tracing::info!(
                    lane = self.id.0,
                    generation = number,
                    days = outcome.days,
                    fights = outcome.fights,
                    allowed_difference = allowed,
                    best_specie = %report.best.specie,
                    best_speed = report.best.speed,
                    best_damage = report.best.damage,
                    best_protection = report.best.protection,
                    best_health = report.best.winner_remaining_health,
                    "generation complete"
                ),
                None => tracing::warn!(
                    lane = self.id.0,
                    generation = number,
                    "generation produced no fights; next generation is unbiased"
                ),
            }

            bias = self.stats.bias_seed(self.id, id)?;
            observer(&GenerationEnd {
                lane: self.id,
                generation: id,
                outcome,
                report,
            });
        }

        tracing::info!(lane = self.id.0, generations = total, fights, "lane complete");

        Ok(LaneSummary {
            lane: self.id,
            generations: total,
            fights,
            final_bias: bias,
        })
    }
}

/// Run every configured lane in parallel with automated decisions
///
/// Lane `n` draws from its own `ChaCha8Rng` seeded `seed + n`, so results do
/// not depend on thread scheduling.
pub fn run_lanes(
    config: &SimulationConfig,
    stats: &StatsAggregator,
    seed: u64,
    observer: &(dyn Fn(&GenerationEnd) + Sync),
) -> Result<Vec<LaneSummary>> {
    (0..config.lanes)
        .into_par_iter()
        .map(|lane| {
            let mut rng = ChaCha8Rng::seed_from_u64(config.lane_seed(seed, lane));
            let mut decisions = RandomDecisions;
            Lane::new(LaneId(lane), config, stats).run(&mut decisions, &mut rng, observer)
        })
        .collect()
}
