//! Skill move resolution: success, failure or steal.
//!
//! A successful move buys the handler extra openness; a failed one keeps
//! the ball where it was; a steal ends the possession. The steal bucket
//! is capped independently of the other two.

use crate::{
    config::SimConfig,
    court::Court,
    dice::{scale_probability, FaceAllocator, Outcome, RollPayload, RollResult, RollType},
    error::SimResult,
    openness::decayed_attributes,
    player::SimulationPlayer,
    rng::PossessionRng,
    state::{Fatigue, PossessionState},
    types::SlotId,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillMoveProbabilities {
    pub success: f64,
    pub failure: f64,
    pub steal:   f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMoveResolution {
    pub roll:             RollResult,
    pub defender:         SlotId,
    /// Non-zero only on success.
    pub openness_gain:    f64,
    pub stealer:          Option<SlotId>,
    /// Skill moves keep the ball live; a rebound never follows.
    pub triggers_rebound: bool,
}

pub struct SkillMoveResolver {
    config:    Arc<SimConfig>,
    allocator: FaceAllocator,
}

impl SkillMoveResolver {
    pub fn new(config: Arc<SimConfig>) -> Self {
        let allocator = FaceAllocator::new(config.allocation_rules);
        Self { config, allocator }
    }

    pub fn probabilities(
        &self,
        handler: &SimulationPlayer,
        defender: &SimulationPlayer,
        fatigue: Fatigue,
    ) -> SkillMoveProbabilities {
        let cfg = &self.config.skill_move;
        let decayed = decayed_attributes(&handler.attributes, fatigue, &self.config.openness.decay_weights);

        let ow = &cfg.offense_weights;
        let offensive = ow.skill_move * decayed.skill_move + ow.speed * decayed.speed + ow.ball_iq * decayed.ball_iq;
        let dw = &cfg.defense_weights;
        let defensive = dw.on_ball_defense * defender.attributes.on_ball_defense + dw.speed * defender.attributes.speed;

        let success = scale_probability(
            cfg.base_value,
            offensive - defensive,
            cfg.scale_factor,
            cfg.min_success_probability,
            cfg.max_success_probability,
        );
        let steal = scale_probability(
            cfg.steal_base,
            defender.attributes.steal - decayed.ball_iq,
            cfg.steal_scale,
            0.0,
            cfg.max_steal_probability,
        );
        let failure = (1.0 - success - steal).max(0.0);

        SkillMoveProbabilities { success, failure, steal }
    }

    pub fn openness_gain(&self, handler: &SimulationPlayer) -> f64 {
        let cfg = &self.config.skill_move;
        (cfg.openness_gain_base + handler.attributes.skill_move * cfg.openness_gain_scale)
            .clamp(0.0, cfg.max_openness_gain)
    }

    pub fn resolve(
        &self,
        court: &Court<'_>,
        state: &PossessionState,
        rng: &mut PossessionRng,
    ) -> SimResult<SkillMoveResolution> {
        let handler = state.ball_handler;
        let defender = court.defender_of(handler);
        let probs = self.probabilities(court.player(handler), court.player(defender), state.fatigue_of(handler));

        let dice = self.allocator.allocate_and_roll(
            RollType::SkillMove,
            &[
                (Outcome::Success, probs.success),
                (Outcome::Failure, probs.failure),
                (Outcome::Steal, probs.steal),
            ],
            &self.config.caps_for(RollType::SkillMove),
            rng,
        )?;

        let openness_gain = if dice.outcome == Outcome::Success {
            self.openness_gain(court.player(handler))
        } else {
            0.0
        };
        let stealer = (dice.outcome == Outcome::Steal).then_some(defender);
        let payload = RollPayload::SkillMove {
            openness_gain,
            stealer: stealer.map(|s| court.player(s).id.clone()),
        };

        Ok(SkillMoveResolution {
            roll: dice.into_result(RollType::SkillMove, payload),
            defender,
            openness_gain,
            stealer,
            triggers_rebound: false,
        })
    }
}
