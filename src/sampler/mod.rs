//! Attribute sampler
//!
//! Spawns a generation's combatants. Each attribute is drawn from a window
//! around the previous generation's best (the bias seed), the window width
//! set by a cooling schedule, and the triple is then forced back onto the
//! 50-point simplex.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combatant::{
    Attribute, Attributes, Combatant, Variant, MAX_ATTRIBUTE, MIN_ATTRIBUTE, TOTAL_ATTRIBUTE_POINTS,
};
use crate::core::config::SamplerConfig;
use crate::core::error::Result;
use crate::core::types::GenerationId;
use crate::stats::GenerationSummary;

/// How the allowed difference around the bias seed evolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cooling {
    /// Generations left after this one: wide early, zero on the last
    Remaining,
    /// Same width every generation
    Fixed(u32),
}

impl Cooling {
    pub fn allowed_difference(&self, generation: GenerationId, total_generations: u32) -> u32 {
        match self {
            Cooling::Remaining => total_generations.saturating_sub(generation.0),
            Cooling::Fixed(width) => *width,
        }
    }
}

/// The previous generation's best, steering the next one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasSeed {
    pub variant: Variant,
    pub speed: f64,
    pub damage: f64,
    pub protection: f64,
}

impl BiasSeed {
    pub fn from_summary(summary: &GenerationSummary) -> Self {
        Self {
            variant: summary.specie,
            speed: summary.speed,
            damage: summary.damage,
            protection: summary.protection,
        }
    }

    pub fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Speed => self.speed,
            Attribute::Damage => self.damage,
            Attribute::Protection => self.protection,
        }
    }
}

/// Inclusive draw window for one attribute
///
/// The window may come out inverted when the bias sits above
/// `MAX_ATTRIBUTE`; callers clamp to the upper bound.
pub fn stat_range(bias: Option<f64>, allowed_difference: u32) -> (u32, u32) {
    let Some(bias) = bias else {
        return (MIN_ATTRIBUTE, MAX_ATTRIBUTE);
    };

    let center = bias.round() as i64;
    let delta = allowed_difference as i64;
    let low = (center - delta).max(MIN_ATTRIBUTE as i64);
    let high = (center + delta).min(MAX_ATTRIBUTE as i64);
    // A bias below the floor still draws at the floor
    (low as u32, high.max(MIN_ATTRIBUTE as i64) as u32)
}

#[derive(Debug, Clone)]
pub struct AttributeSampler {
    draw_scale: u32,
    same_variant_percent: u32,
}

impl Default for AttributeSampler {
    fn default() -> Self {
        Self::new(&SamplerConfig::default())
    }
}

impl AttributeSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            draw_scale: config.draw_scale.max(1),
            same_variant_percent: config.same_variant_percent.min(100),
        }
    }

    /// Draw one attribute triple on the simplex
    pub fn sample_attributes<R: Rng + ?Sized>(
        &self,
        bias: Option<&BiasSeed>,
        allowed_difference: u32,
        rng: &mut R,
    ) -> Result<Attributes> {
        let mut order = Attribute::ALL;
        order.shuffle(rng);

        let scale = self.draw_scale as i64;
        let mut values = [0i64; 3];
        let mut remaining = TOTAL_ATTRIBUTE_POINTS as i64;

        for attribute in order {
            let (low, high) = stat_range(bias.map(|b| b.get(attribute)), allowed_difference);
            let drawn = if low > high { high } else { rng.gen_range(low..=high) };
            let scaled = drawn as i64 * scale;
            values[attribute.index()] = scaled;
            remaining -= scaled;
        }

        if remaining > 0 {
            let index = rng.gen_range(0..values.len());
            values[index] += remaining;
        } else if remaining < 0 {
            let floor = MIN_ATTRIBUTE as i64;
            let mut order = Attribute::ALL;
            order.shuffle(rng);

            for attribute in order {
                let value = &mut values[attribute.index()];
                let excess = -remaining;
                let room = *value - floor;
                if excess <= room {
                    *value -= excess;
                    break;
                }
                *value = floor;
                remaining += room;
            }
        }

        let to_u32 = |v: i64| u32::try_from(v).unwrap_or(u32::MAX);
        Attributes::new(to_u32(values[0]), to_u32(values[1]), to_u32(values[2]))
    }

    /// Keep the previous winner's variant most of the time, else pick uniformly
    pub fn choose_variant<R: Rng + ?Sized>(&self, previous: Option<Variant>, rng: &mut R) -> Variant {
        if let Some(previous) = previous {
            if rng.gen_range(0..100) < self.same_variant_percent {
                return previous;
            }
        }
        Variant::ALL[rng.gen_range(0..Variant::ALL.len())]
    }

    /// Spawn the combatant for a 1-based population slot
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        slot: usize,
        bias: Option<&BiasSeed>,
        allowed_difference: u32,
        rng: &mut R,
    ) -> Result<Combatant> {
        let attributes = self.sample_attributes(bias, allowed_difference, rng)?;
        let variant = self.choose_variant(bias.map(|b| b.variant), rng);
        Ok(Combatant::new(format!("AI_{}_{}", variant, slot), variant, attributes))
    }

    pub fn population<R: Rng + ?Sized>(
        &self,
        size: usize,
        bias: Option<&BiasSeed>,
        allowed_difference: u32,
        rng: &mut R,
    ) -> Result<Vec<Combatant>> {
        (1..=size)
            .map(|slot| self.spawn(slot, bias, allowed_difference, rng))
            .collect()
    }
}
