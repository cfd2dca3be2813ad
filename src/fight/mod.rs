//! Fight resolution
//!
//! A fight is a two-state machine: `InProgress` until either combatant
//! escapes or knocks the other out, then `Resolved`. Rounds are not capped;
//! a round where nobody deals damage still nudges both motivations up, so
//! damage never stays at zero for long.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, EffectiveStats};
use crate::core::error::Result;
use crate::core::types::{DayId, FightContext};
use crate::decision::DecisionProvider;
use crate::stats::{FightRecord, StatsAggregator, Victor};

/// Lowest value a damage or protection roll can produce
pub const MIN_ROLL: u32 = 5;

/// Flat bonus for attacking (damage) or defending (protection)
pub const STANCE_BONUS: f64 = 5.0;

/// Escape succeeds when a draw from `0..IN_FIGHT_RUN_RANGE` is below effective speed
pub const IN_FIGHT_RUN_RANGE: u32 = 500;

/// Motivation is normalised against this when scaling rolls
pub const MOTIVATION_BASELINE: f64 = 50.0;

/// Protection offsets damage at a tenth of its roll
pub const PROTECTION_DIVISOR: f64 = 10.0;

const ESCAPE_MOTIVATION: f64 = 10.0;
const FAILED_RUN_MOTIVATION: f64 = -5.0;
const ROUND_WIN_MOTIVATION: f64 = 5.0;
const ROUND_TIE_MOTIVATION: f64 = 2.0;

/// What a combatant does on its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FightAction {
    Attack,
    Defend,
    Run,
}

impl FightAction {
    pub const ALL: [FightAction; 3] = [FightAction::Attack, FightAction::Defend, FightAction::Run];

    pub fn name(self) -> &'static str {
        match self {
            FightAction::Attack => "attack",
            FightAction::Defend => "defend",
            FightAction::Run => "run",
        }
    }

    /// (damage bonus, protection bonus); a run, failed or not, gets neither
    fn bonuses(self) -> (f64, f64) {
        match self {
            FightAction::Attack => (STANCE_BONUS, 0.0),
            FightAction::Defend => (0.0, STANCE_BONUS),
            FightAction::Run => (0.0, 0.0),
        }
    }
}

/// One of the two combatants in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// Terminal result of a fight
///
/// `loser` is `None` when the winner escaped; the opponent survives and is
/// not recorded as having lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FightOutcome {
    pub winner: Side,
    pub loser: Option<Side>,
    pub turns: u32,
}

impl FightOutcome {
    pub fn escaped(&self) -> bool {
        self.loser.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightState {
    InProgress,
    Resolved(FightOutcome),
}

enum TurnResult {
    Dealt(f64),
    Escaped,
    Knockout(f64),
}

/// A single match between two living combatants
pub struct Fight<'a> {
    first: &'a mut Combatant,
    second: &'a mut Combatant,
    state: FightState,
    rounds: u32,
    day: Option<DayId>,
}

impl<'a> Fight<'a> {
    pub fn new(first: &'a mut Combatant, second: &'a mut Combatant) -> Self {
        Self {
            first,
            second,
            state: FightState::InProgress,
            rounds: 0,
            day: None,
        }
    }

    /// Day used to stamp the loser's death
    pub fn on_day(mut self, day: DayId) -> Self {
        self.day = Some(day);
        self
    }

    pub fn state(&self) -> FightState {
        self.state
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::First => &*self.first,
            Side::Second => &*self.second,
        }
    }

    /// Play rounds until the fight resolves
    pub fn run(
        &mut self,
        decisions: &mut dyn DecisionProvider,
        rng: &mut dyn RngCore,
    ) -> Result<FightOutcome> {
        loop {
            if let FightState::Resolved(outcome) = self.state {
                return Ok(outcome);
            }
            self.play_round(decisions, rng)?;
        }
    }

    /// Both combatants act once, then the round is scored for motivation
    pub fn play_round(
        &mut self,
        decisions: &mut dyn DecisionProvider,
        rng: &mut dyn RngCore,
    ) -> Result<FightState> {
        if matches!(self.state, FightState::Resolved(_)) {
            return Ok(self.state);
        }
        self.rounds += 1;

        let first_dealt = self.act(Side::First, decisions, rng)?;
        let second_dealt = match self.state {
            FightState::InProgress => self.act(Side::Second, decisions, rng)?,
            FightState::Resolved(_) => 0.0,
        };

        score_round(self.first, self.second, first_dealt, second_dealt);
        Ok(self.state)
    }

    fn act(
        &mut self,
        side: Side,
        decisions: &mut dyn DecisionProvider,
        rng: &mut dyn RngCore,
    ) -> Result<f64> {
        let (actor, opponent) = match side {
            Side::First => (&mut *self.first, &mut *self.second),
            Side::Second => (&mut *self.second, &mut *self.first),
        };

        let result = take_turn(actor, opponent, decisions, rng)?;
        let dealt = match result {
            TurnResult::Dealt(amount) => amount,
            TurnResult::Escaped => {
                self.resolve(side, None);
                0.0
            }
            TurnResult::Knockout(amount) => {
                let loser = side.other();
                if let Some(day) = self.day {
                    match loser {
                        Side::First => self.first.death_day = Some(day),
                        Side::Second => self.second.death_day = Some(day),
                    }
                }
                self.resolve(side, Some(loser));
                amount
            }
        };
        Ok(dealt)
    }

    fn resolve(&mut self, winner: Side, loser: Option<Side>) {
        tracing::trace!(
            winner = %self.combatant(winner).name,
            rounds = self.rounds,
            escaped = loser.is_none(),
            "fight resolved"
        );
        self.state = FightState::Resolved(FightOutcome {
            winner,
            loser,
            turns: self.rounds,
        });
    }

    /// Build the record for a resolved fight
    pub fn record(&self, context: FightContext) -> Option<FightRecord> {
        let FightState::Resolved(outcome) = self.state else {
            return None;
        };

        let winner = self.combatant(outcome.winner).snapshot();
        let victor = match outcome.loser {
            Some(_) => Victor::Single(winner),
            None => Victor::Escaped {
                runner: winner,
                opponent: self.combatant(outcome.winner.other()).snapshot(),
            },
        };

        Some(FightRecord {
            generation: context.generation,
            day: context.day,
            match_id: context.match_id,
            victor,
            loser: outcome.loser.map(|side| self.combatant(side).snapshot()),
            turns: outcome.turns,
        })
    }
}

/// Resolve a match and, when it is part of a lane's run, report it
///
/// Without a context the fight still produces a winner but nothing is recorded.
pub fn resolve_match(
    first: &mut Combatant,
    second: &mut Combatant,
    decisions: &mut dyn DecisionProvider,
    rng: &mut dyn RngCore,
    report: Option<(&StatsAggregator, FightContext)>,
) -> Result<FightOutcome> {
    let mut fight = Fight::new(first, second);
    if let Some((_, context)) = report {
        fight = fight.on_day(context.day);
    }

    let outcome = fight.run(decisions, rng)?;

    if let Some((stats, context)) = report {
        if let Some(record) = fight.record(context) {
            stats.record_fight(context.lane, record)?;
        }
    }
    Ok(outcome)
}

fn take_turn(
    actor: &mut Combatant,
    opponent: &mut Combatant,
    decisions: &mut dyn DecisionProvider,
    rng: &mut dyn RngCore,
) -> Result<TurnResult> {
    let action = decisions.choose_action(actor, &FightAction::ALL, rng)?;

    if action == FightAction::Run {
        let stats = actor.effective_stats();
        if (rng.gen_range(0..IN_FIGHT_RUN_RANGE) as f64) < stats.speed {
            actor.adjust_motivation(ESCAPE_MOTIVATION);
            return Ok(TurnResult::Escaped);
        }
        actor.adjust_motivation(FAILED_RUN_MOTIVATION);
    }

    // Stats are read after a failed run so the motivation loss counts
    let dealt = roll_damage(&actor.effective_stats(), action, rng);
    opponent.apply_damage(dealt);

    if opponent.is_alive() {
        Ok(TurnResult::Dealt(dealt))
    } else {
        Ok(TurnResult::Knockout(dealt))
    }
}

/// Damage one turn deals: `|protection - damage|`, both scaled by motivation
pub fn roll_damage(stats: &EffectiveStats, action: FightAction, rng: &mut dyn RngCore) -> f64 {
    let (damage_bonus, protection_bonus) = action.bonuses();
    let morale = stats.motivation / MOTIVATION_BASELINE;

    let damage = roll(stats.damage + damage_bonus, rng) * morale;
    let protection = roll(stats.protection + protection_bonus, rng) * morale / PROTECTION_DIVISOR;

    (protection - damage).abs()
}

/// Uniform integer in `[MIN_ROLL, floor(ceiling)]`, collapsing to `MIN_ROLL`
/// when the ceiling is below it
fn roll(ceiling: f64, rng: &mut dyn RngCore) -> f64 {
    let upper = (ceiling.floor() as u32).max(MIN_ROLL);
    rng.gen_range(MIN_ROLL..=upper) as f64
}

fn score_round(first: &mut Combatant, second: &mut Combatant, first_dealt: f64, second_dealt: f64) {
    if first_dealt > second_dealt {
        first.adjust_motivation(ROUND_WIN_MOTIVATION);
        second.adjust_motivation(-ROUND_WIN_MOTIVATION);
    } else if second_dealt > first_dealt {
        second.adjust_motivation(ROUND_WIN_MOTIVATION);
        first.adjust_motivation(-ROUND_WIN_MOTIVATION);
    } else {
        first.adjust_motivation(ROUND_TIE_MOTIVATION);
        second.adjust_motivation(ROUND_TIE_MOTIVATION);
    }
}
