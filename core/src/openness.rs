//! Openness: how unguarded an attacker is at this moment, 0–100.
//!
//! Computed fresh for every offensive player at every decision step,
//! because pass count, defensive breakdown and fatigue all move between
//! steps. The calculation has no side effects beyond its RNG draw.

use crate::{
    config::{DecayWeights, SimConfig},
    player::{Attributes, SimulationPlayer},
    rng::PossessionRng,
    state::Fatigue,
};
use std::sync::Arc;

/// Offensive attributes after stamina decay and fatigue are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayedAttributes {
    pub speed:      f64,
    pub ball_iq:    f64,
    pub skill_move: f64,
    pub pass:       f64,
}

/// Linear decay `attr × (1 − decay × weight)`; the fatigue speed penalty
/// comes off speed afterwards. Everything stays in [0, 100].
pub fn decayed_attributes(attrs: &Attributes, fatigue: Fatigue, weights: &DecayWeights) -> DecayedAttributes {
    let decay = fatigue.decay.clamp(0.0, 1.0);
    let apply = |value: f64, weight: f64| (value * (1.0 - decay * weight)).clamp(0.0, 100.0);
    DecayedAttributes {
        speed:      (apply(attrs.speed, weights.speed) - fatigue.speed_penalty).clamp(0.0, 100.0),
        ball_iq:    apply(attrs.ball_iq, weights.ball_iq),
        skill_move: apply(attrs.skill_move, weights.skill_move),
        pass:       apply(attrs.pass, weights.pass),
    }
}

#[derive(Debug, Clone)]
pub struct OpennessCalculator {
    config: Arc<SimConfig>,
}

impl OpennessCalculator {
    pub fn new(config: Arc<SimConfig>) -> Self {
        Self { config }
    }

    /// Openness before random variance, clamped to [0, 100].
    pub fn base_openness(
        &self,
        offense: &SimulationPlayer,
        defense: &SimulationPlayer,
        pass_count: u32,
        defensive_breakdown: f64,
        fatigue: Fatigue,
    ) -> f64 {
        let cfg = &self.config.openness;
        let attrs = decayed_attributes(&offense.attributes, fatigue, &cfg.decay_weights);

        let ow = &cfg.offense_weights;
        let offensive_value = ow.speed * attrs.speed
            + ow.ball_iq * attrs.ball_iq
            + ow.skill_move * attrs.skill_move
            + ow.pass * attrs.pass;

        let dw = &cfg.defense_weights;
        let defensive_value =
            dw.speed * defense.attributes.speed + dw.on_ball_defense * defense.attributes.on_ball_defense;

        let pass_count_bonus = (pass_count as f64 * cfg.pass_count_weight).min(cfg.max_pass_bonus);
        // The breakdown is a penalty on the defense: it opens the attacker up.
        let defensive_breakdown_penalty = -(defensive_breakdown.clamp(0.0, 1.0) * cfg.defensive_breakdown_weight);

        let raw = offensive_value - defensive_value + pass_count_bonus - defensive_breakdown_penalty;
        (cfg.base_value + raw * cfg.scale_factor).clamp(0.0, 100.0)
    }

    /// Openness with bounded variance, rounded to an integer in [0, 100].
    pub fn calculate(
        &self,
        offense: &SimulationPlayer,
        defense: &SimulationPlayer,
        pass_count: u32,
        defensive_breakdown: f64,
        fatigue: Fatigue,
        rng: &mut PossessionRng,
    ) -> u8 {
        let base = self.base_openness(offense, defense, pass_count, defensive_breakdown, fatigue);
        let variance = self.config.openness.variance;
        let noise = rng.range_f64(-variance, variance);
        (base + noise).round().clamp(0.0, 100.0) as u8
    }
}
