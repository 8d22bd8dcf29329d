//! Pass resolution: complete or intercepted.
//!
//! The interceptor is whoever guards the target. A bad target (the
//! passer, a defender, nobody) falls back to the most open teammate
//! rather than failing the possession.

use crate::{
    config::SimConfig,
    court::Court,
    decision::most_open_teammate,
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
pub struct PassProbabilities {
    pub complete:    f64,
    pub intercepted: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassResolution {
    pub roll:        RollResult,
    pub passer:      SlotId,
    pub target:      SlotId,
    pub interceptor: Option<SlotId>,
}

pub struct PassResolver {
    config:    Arc<SimConfig>,
    allocator: FaceAllocator,
}

impl PassResolver {
    pub fn new(config: Arc<SimConfig>) -> Self {
        let allocator = FaceAllocator::new(config.allocation_rules);
        Self { config, allocator }
    }

    pub fn probabilities(
        &self,
        passer: &SimulationPlayer,
        passer_fatigue: Fatigue,
        target_openness: f64,
        target_defender: &SimulationPlayer,
    ) -> PassProbabilities {
        let cfg = &self.config.pass;
        let decayed = decayed_attributes(&passer.attributes, passer_fatigue, &self.config.openness.decay_weights);

        let ow = &cfg.offense_weights;
        let offensive = ow.pass * decayed.pass
            + ow.ball_iq * decayed.ball_iq
            + ow.target_openness * target_openness.clamp(0.0, 100.0);
        let defensive = cfg.defense_weights.steal * target_defender.attributes.steal;

        let intercepted = scale_probability(
            cfg.interception_base,
            defensive - offensive,
            cfg.scale_factor,
            cfg.min_interception_probability,
            cfg.max_interception_probability,
        );
        PassProbabilities { complete: 1.0 - intercepted, intercepted }
    }

    /// Target the decision asked for, or the most open teammate if that
    /// target is not a teammate.
    pub fn resolve_target(court: &Court<'_>, state: &PossessionState, requested: Option<SlotId>) -> SlotId {
        requested
            .filter(|&t| court.is_offense(t) && t != state.ball_handler)
            .or_else(|| most_open_teammate(court, state))
            .unwrap_or(state.ball_handler)
    }

    pub fn resolve(
        &self,
        court: &Court<'_>,
        state: &PossessionState,
        requested_target: Option<SlotId>,
        rng: &mut PossessionRng,
    ) -> SimResult<PassResolution> {
        let passer = state.ball_handler;
        let target = Self::resolve_target(court, state, requested_target);
        let defender = court.defender_of(target);
        let probs = self.probabilities(
            court.player(passer),
            state.fatigue_of(passer),
            state.openness_of(target),
            court.player(defender),
        );

        let dice = self.allocator.allocate_and_roll(
            RollType::Pass,
            &[(Outcome::Complete, probs.complete), (Outcome::Intercepted, probs.intercepted)],
            &self.config.caps_for(RollType::Pass),
            rng,
        )?;

        let interceptor = (dice.outcome == Outcome::Intercepted).then_some(defender);
        let payload = RollPayload::Pass {
            target:      court.player(target).id.clone(),
            interceptor: interceptor.map(|i| court.player(i).id.clone()),
        };

        Ok(PassResolution {
            roll: dice.into_result(RollType::Pass, payload),
            passer,
            target,
            interceptor,
        })
    }
}
