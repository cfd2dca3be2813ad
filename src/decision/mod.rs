//! Decision sources
//!
//! Combatants never decide inline. The day scheduler and fight resolver ask
//! a [`DecisionProvider`] to pick one option out of an action set:
//! uniform random for automated combatants, an external reader for manual ones.

use std::io::{BufRead, Write};

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::combatant::{Combatant, Control, DayChoice};
use crate::core::error::{ArenaError, Result};
use crate::core::types::DayId;
use crate::fight::FightAction;

/// Something a combatant can pick
pub trait Choice: Copy {
    fn label(self) -> &'static str;
}

impl Choice for DayChoice {
    fn label(self) -> &'static str {
        self.name()
    }
}

impl Choice for FightAction {
    fn label(self) -> &'static str {
        self.name()
    }
}

/// Given an action set, return one
pub trait DecisionProvider {
    /// Fight or run, asked once per living combatant per day
    fn choose_day(
        &mut self,
        combatant: &Combatant,
        day: DayId,
        options: &[DayChoice],
        rng: &mut dyn RngCore,
    ) -> Result<DayChoice>;

    /// Attack, defend or run, asked once per combatant per round
    fn choose_action(
        &mut self,
        combatant: &Combatant,
        options: &[FightAction],
        rng: &mut dyn RngCore,
    ) -> Result<FightAction>;
}

fn pick_random<C: Choice>(options: &[C], rng: &mut dyn RngCore) -> Result<C> {
    options
        .choose(rng)
        .copied()
        .ok_or_else(|| ArenaError::Input("empty option set".into()))
}

/// Uniform random choice for automated combatants
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDecisions;

impl DecisionProvider for RandomDecisions {
    fn choose_day(
        &mut self,
        _combatant: &Combatant,
        _day: DayId,
        options: &[DayChoice],
        rng: &mut dyn RngCore,
    ) -> Result<DayChoice> {
        pick_random(options, rng)
    }

    fn choose_action(
        &mut self,
        _combatant: &Combatant,
        options: &[FightAction],
        rng: &mut dyn RngCore,
    ) -> Result<FightAction> {
        pick_random(options, rng)
    }
}

/// Always answers the same way (falls back to the first option if the
/// configured one is not offered)
#[derive(Debug, Clone, Copy)]
pub struct FixedDecisions {
    pub day: DayChoice,
    pub action: FightAction,
}

impl FixedDecisions {
    pub fn always_fight() -> Self {
        Self {
            day: DayChoice::Fight,
            action: FightAction::Attack,
        }
    }
}

fn pick_fixed<C: Choice + PartialEq>(wanted: C, options: &[C]) -> Result<C> {
    if options.contains(&wanted) {
        return Ok(wanted);
    }
    options
        .first()
        .copied()
        .ok_or_else(|| ArenaError::Input("empty option set".into()))
}

impl DecisionProvider for FixedDecisions {
    fn choose_day(
        &mut self,
        _combatant: &Combatant,
        _day: DayId,
        options: &[DayChoice],
        _rng: &mut dyn RngCore,
    ) -> Result<DayChoice> {
        pick_fixed(self.day, options)
    }

    fn choose_action(
        &mut self,
        _combatant: &Combatant,
        options: &[FightAction],
        _rng: &mut dyn RngCore,
    ) -> Result<FightAction> {
        pick_fixed(self.action, options)
    }
}

/// Prompts for manual combatants; automated ones are answered at random
pub struct ConsoleDecisions<R, W> {
    input: R,
    output: W,
    fallback: RandomDecisions,
}

impl<R: BufRead, W: Write> ConsoleDecisions<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            fallback: RandomDecisions,
        }
    }

    /// Ask until the answer names an option (or its 1-based index)
    fn prompt<C: Choice>(&mut self, question: &str, options: &[C]) -> Result<C> {
        if options.is_empty() {
            return Err(ArenaError::Input("empty option set".into()));
        }

        let labels: Vec<&str> = options.iter().map(|o| o.label()).collect();
        loop {
            write!(self.output, "{} {:?}: ", question, labels)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(ArenaError::Input("input closed before a choice was made".into()));
            }

            if let Some(choice) = parse_choice(line.trim(), options) {
                return Ok(choice);
            }
            writeln!(self.output, "Unrecognised choice '{}'", line.trim())?;
        }
    }
}

fn parse_choice<C: Choice>(answer: &str, options: &[C]) -> Option<C> {
    if let Ok(index) = answer.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options
        .iter()
        .copied()
        .find(|o| o.label().eq_ignore_ascii_case(answer))
}

impl<R: BufRead, W: Write> DecisionProvider for ConsoleDecisions<R, W> {
    fn choose_day(
        &mut self,
        combatant: &Combatant,
        day: DayId,
        options: &[DayChoice],
        rng: &mut dyn RngCore,
    ) -> Result<DayChoice> {
        match combatant.control {
            Control::Automated => self.fallback.choose_day(combatant, day, options, rng),
            Control::Manual => {
                let question = format!("[{}] Day {}: what do you want to do?", combatant.name, day.0);
                self.prompt(&question, options)
            }
        }
    }

    fn choose_action(
        &mut self,
        combatant: &Combatant,
        options: &[FightAction],
        rng: &mut dyn RngCore,
    ) -> Result<FightAction> {
        match combatant.control {
            Control::Automated => self.fallback.choose_action(combatant, options, rng),
            Control::Manual => {
                let question = format!(
                    "[{}] health {:.1}, motivation {:.1}: what do you want to do?",
                    combatant.name,
                    combatant.health(),
                    combatant.motivation()
                );
                self.prompt(&question, options)
            }
        }
    }
}
