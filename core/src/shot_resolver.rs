//! Shot resolution on the D20: make, miss or block.
//!
//! The shooter's side: shot rating (three or inside), openness, decayed
//! speed, effective stamina. The defender's side: on-ball defense and
//! speed. A short shot clock rushes the shooter. Misses and blocks hand
//! off to the rebound resolver.

use crate::{
    config::SimConfig,
    court::Court,
    dice::{scale_probability, FaceAllocator, Outcome, RollPayload, RollResult, RollType},
    error::SimResult,
    openness::decayed_attributes,
    player::SimulationPlayer,
    rng::PossessionRng,
    state::{Fatigue, PossessionState},
    types::{Seconds, SlotId},
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotProbabilities {
    pub three_pointer: bool,
    pub make:          f64,
    pub miss:          f64,
    pub block:         f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotResolution {
    pub roll:             RollResult,
    pub shooter:          SlotId,
    pub three_pointer:    bool,
    /// Zero unless the shot went in.
    pub points:           u32,
    pub blocker:          Option<SlotId>,
    pub triggers_rebound: bool,
}

pub struct ShotResolver {
    config:    Arc<SimConfig>,
    allocator: FaceAllocator,
}

impl ShotResolver {
    pub fn new(config: Arc<SimConfig>) -> Self {
        let allocator = FaceAllocator::new(config.allocation_rules);
        Self { config, allocator }
    }

    /// Shooters take threes when that is their better shot.
    pub fn is_three_pointer(shooter: &SimulationPlayer) -> bool {
        shooter.attributes.three_point_shot >= shooter.attributes.inside_shot
    }

    pub fn probabilities(
        &self,
        shooter: &SimulationPlayer,
        defender: &SimulationPlayer,
        openness: f64,
        fatigue: Fatigue,
        shot_clock: Seconds,
    ) -> ShotProbabilities {
        let cfg = &self.config.shot;
        let three_pointer = Self::is_three_pointer(shooter);
        let rating = if three_pointer {
            shooter.attributes.three_point_shot
        } else {
            shooter.attributes.inside_shot
        };

        let decayed = decayed_attributes(&shooter.attributes, fatigue, &self.config.openness.decay_weights);
        let effective_stamina = shooter.attributes.stamina * (1.0 - fatigue.decay.clamp(0.0, 1.0));

        let ow = &cfg.offense_weights;
        let offensive = ow.shot_rating * rating
            + ow.openness * openness.clamp(0.0, 100.0)
            + ow.speed * decayed.speed
            + ow.stamina * effective_stamina;

        let dw = &cfg.defense_weights;
        let defensive = dw.on_ball_defense * defender.attributes.on_ball_defense + dw.speed * defender.attributes.speed;

        let pressure = if shot_clock < cfg.clock_pressure_threshold {
            (cfg.clock_pressure_threshold - shot_clock) * cfg.clock_pressure_weight
        } else {
            0.0
        };

        let base = if three_pointer { cfg.base_three_point } else { cfg.base_two_point };
        let make = scale_probability(
            base,
            offensive - defensive - pressure,
            cfg.scale_factor,
            cfg.min_make_probability,
            cfg.max_make_probability,
        );

        let mut block = scale_probability(
            cfg.block_base,
            defender.attributes.block - rating,
            cfg.block_scale,
            0.0,
            cfg.max_block_probability,
        );
        if three_pointer {
            block *= cfg.three_point_block_factor;
        }
        let miss = (1.0 - make - block).max(0.0);

        ShotProbabilities { three_pointer, make, miss, block }
    }

    /// Resolve a shot by the current ball handler.
    pub fn resolve(
        &self,
        court: &Court<'_>,
        state: &PossessionState,
        rng: &mut PossessionRng,
    ) -> SimResult<ShotResolution> {
        let shooter = state.ball_handler;
        let defender = court.defender_of(shooter);
        let probs = self.probabilities(
            court.player(shooter),
            court.player(defender),
            state.openness_of(shooter),
            state.fatigue_of(shooter),
            state.shot_clock(),
        );

        let dice = self.allocator.allocate_and_roll(
            RollType::Shot,
            &[
                (Outcome::Make, probs.make),
                (Outcome::Miss, probs.miss),
                (Outcome::Block, probs.block),
            ],
            &self.config.caps_for(RollType::Shot),
            rng,
        )?;

        let outcome = dice.outcome;
        let points = match (outcome, probs.three_pointer) {
            (Outcome::Make, true) => 3,
            (Outcome::Make, false) => 2,
            _ => 0,
        };
        let blocker = (outcome == Outcome::Block).then_some(defender);

        let payload = RollPayload::Shot {
            three_pointer: probs.three_pointer,
            points,
            blocker: blocker.map(|b| court.player(b).id.clone()),
        };
        log::trace!(
            "shot by {} (three={}) face {} → {:?}",
            court.name(shooter),
            probs.three_pointer,
            dice.face,
            outcome
        );

        Ok(ShotResolution {
            roll: dice.into_result(RollType::Shot, payload),
            shooter,
            three_pointer: probs.three_pointer,
            points,
            blocker,
            triggers_rebound: outcome != Outcome::Make,
        })
    }
}
