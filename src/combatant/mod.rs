//! Combatant model
//!
//! A combatant is three primary attributes on the 50-point simplex, a
//! variant-specific penalty profile, and mutable health/motivation.
//! Effective stats are always derived from raw values and penalties,
//! never stored.

mod attributes;
mod variant;

pub use attributes::{Attribute, Attributes, MAX_ATTRIBUTE, MIN_ATTRIBUTE, TOTAL_ATTRIBUTE_POINTS};
pub use variant::{PenaltyProfile, Variant};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};
use crate::core::types::DayId;

pub const DEFAULT_HEALTH: f64 = 100.0;
pub const MAX_HEALTH: f64 = 150.0;
pub const DEFAULT_MOTIVATION: f64 = 50.0;
pub const MAX_MOTIVATION: f64 = 100.0;

/// What a combatant decided to do at the start of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayChoice {
    Fight,
    Run,
}

impl DayChoice {
    pub const ALL: [DayChoice; 2] = [DayChoice::Fight, DayChoice::Run];

    pub fn name(self) -> &'static str {
        match self {
            DayChoice::Fight => "fight",
            DayChoice::Run => "run",
        }
    }
}

/// Who supplies a combatant's decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Control {
    #[default]
    Automated,
    Manual,
}

/// Stats after the variant penalties are applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveStats {
    pub speed: f64,
    pub damage: f64,
    pub protection: f64,
    pub health: f64,
    pub motivation: f64,
}

impl EffectiveStats {
    /// Pure derivation from raw values and a penalty profile
    pub fn derive(
        attributes: &Attributes,
        health: f64,
        motivation: f64,
        penalties: &PenaltyProfile,
    ) -> Self {
        Self {
            speed: attributes.speed() as f64 * penalties.speed,
            damage: attributes.damage() as f64 * penalties.damage,
            protection: attributes.protection() as f64 * penalties.protection,
            health: health * penalties.health,
            motivation: motivation * penalties.motivation,
        }
    }
}

/// Immutable copy of what the statistics care about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub name: String,
    pub variant: Variant,
    pub attributes: Attributes,
    pub health: f64,
}

/// A single combatant in a generation
#[derive(Debug, Clone)]
pub struct Combatant {
    pub name: String,
    pub control: Control,
    /// Day on which this combatant lost a fight to the death
    pub death_day: Option<DayId>,
    variant: Variant,
    attributes: Attributes,
    penalties: PenaltyProfile,
    health: f64,
    motivation: f64,
    day_choices: BTreeMap<DayId, DayChoice>,
}

impl Combatant {
    /// Automated combatant with default health and motivation
    pub fn new(name: impl Into<String>, variant: Variant, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            control: Control::Automated,
            death_day: None,
            variant,
            attributes,
            penalties: variant.penalties(),
            health: DEFAULT_HEALTH,
            motivation: DEFAULT_MOTIVATION,
            day_choices: BTreeMap::new(),
        }
    }

    /// Validate raw attributes and build a combatant
    pub fn try_new(
        name: impl Into<String>,
        variant: Variant,
        speed: u32,
        damage: u32,
        protection: u32,
    ) -> Result<Self> {
        let attributes = Attributes::new(speed, damage, protection)?;
        Ok(Self::new(name, variant, attributes))
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.control = control;
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn penalties(&self) -> &PenaltyProfile {
        &self.penalties
    }

    /// Raw health
    pub fn health(&self) -> f64 {
        self.health
    }

    /// Raw motivation
    pub fn motivation(&self) -> f64 {
        self.motivation
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn effective_stats(&self) -> EffectiveStats {
        EffectiveStats::derive(&self.attributes, self.health, self.motivation, &self.penalties)
    }

    /// Subtract health, flooring at zero
    pub fn apply_damage(&mut self, amount: f64) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
    }

    /// Add health up to the cap; the dead stay dead
    pub fn heal(&mut self, amount: f64) {
        if self.health <= 0.0 {
            return;
        }
        self.health = (self.health + amount).clamp(0.0, MAX_HEALTH);
    }

    pub fn adjust_motivation(&mut self, delta: f64) {
        self.motivation = (self.motivation + delta).clamp(0.0, MAX_MOTIVATION);
    }

    pub fn record_choice(&mut self, day: DayId, choice: DayChoice) {
        self.day_choices.insert(day, choice);
    }

    /// The decision made on `day`
    ///
    /// Asking before the combatant was asked to decide is a logic error.
    pub fn get_choice(&self, day: DayId) -> Result<DayChoice> {
        self.day_choices
            .get(&day)
            .copied()
            .ok_or_else(|| ArenaError::MissingDayChoice {
                combatant: self.name.clone(),
                day,
            })
    }

    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            name: self.name.clone(),
            variant: self.variant,
            attributes: self.attributes,
            health: self.health,
        }
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Combatant: {}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(speed: u32, damage: u32, protection: u32) -> Combatant {
        Combatant::try_new("test", Variant::Base, speed, damage, protection).unwrap()
    }

    #[test]
    fn test_defaults() {
        let c = base(10, 20, 20);
        assert_eq!(c.health(), DEFAULT_HEALTH);
        assert_eq!(c.motivation(), DEFAULT_MOTIVATION);
        assert_eq!(c.control, Control::Automated);
        assert!(c.death_day.is_none());
        assert!(c.is_alive());
    }

    #[test]
    fn test_construction_validates() {
        assert!(Combatant::try_new("x", Variant::Base, 10, 10, 10).is_err());
        assert!(Combatant::try_new("x", Variant::Base, 3, 42, 5).is_err());
    }

    #[test]
    fn test_effective_stats_apply_penalties() {
        let c = Combatant::try_new("slow", Variant::SlowButStrong, 10, 20, 20).unwrap();
        let stats = c.effective_stats();
        assert_eq!(stats.speed, 5.0);
        assert_eq!(stats.damage, 30.0);
        assert_eq!(stats.protection, 20.0);
        assert_eq!(stats.health, 100.0);
        assert_eq!(stats.motivation, 50.0);

        let healthy = Combatant::try_new("hw", Variant::HealthyButWeak, 10, 20, 20).unwrap();
        assert_eq!(healthy.effective_stats().health, 200.0);
        assert_eq!(healthy.effective_stats().damage, 10.0);
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut c = base(10, 20, 20);
        c.apply_damage(30.0);
        assert_eq!(c.health(), 70.0);
        c.apply_damage(500.0);
        assert_eq!(c.health(), 0.0);
        assert!(!c.is_alive());
    }

    #[test]
    fn test_negative_damage_ignored() {
        let mut c = base(10, 20, 20);
        c.apply_damage(-10.0);
        assert_eq!(c.health(), DEFAULT_HEALTH);
    }

    #[test]
    fn test_heal_capped() {
        let mut c = base(10, 20, 20);
        c.heal(80.0);
        assert_eq!(c.health(), MAX_HEALTH);
    }

    #[test]
    fn test_dead_cannot_heal() {
        let mut c = base(10, 20, 20);
        c.apply_damage(100.0);
        c.heal(50.0);
        assert_eq!(c.health(), 0.0);
    }

    #[test]
    fn test_motivation_clamped() {
        let mut c = base(10, 20, 20);
        c.adjust_motivation(80.0);
        assert_eq!(c.motivation(), MAX_MOTIVATION);
        c.adjust_motivation(-250.0);
        assert_eq!(c.motivation(), 0.0);
    }

    #[test]
    fn test_choices_are_per_instance() {
        let mut a = base(10, 20, 20);
        let b = base(20, 20, 10);
        a.record_choice(DayId(1), DayChoice::Run);

        assert_eq!(a.get_choice(DayId(1)).unwrap(), DayChoice::Run);
        assert!(matches!(
            b.get_choice(DayId(1)),
            Err(ArenaError::MissingDayChoice { .. })
        ));
    }

    #[test]
    fn test_snapshot_copies_state() {
        let mut c = base(5, 40, 5);
        c.apply_damage(12.5);
        let snap = c.snapshot();
        assert_eq!(snap.health, 87.5);
        assert_eq!(snap.attributes.damage(), 40);
        assert_eq!(snap.variant, Variant::Base);
    }
}
