//! Decision policies: what the ball handler does next.
//!
//! RULE: A policy only chooses. It never rolls dice, never touches the
//! clock and never mutates possession state. The engine validates
//! whatever it returns before resolving it.

use crate::{
    config::SimConfig,
    court::Court,
    rng::PossessionRng,
    state::PossessionState,
    types::{Seconds, SlotId},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Shoot,
    Pass,
    SkillMove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action:    Action,
    /// Pass target; ignored for other actions.
    pub target:    Option<SlotId>,
    pub reasoning: String,
}

impl Decision {
    pub fn shoot(reasoning: impl Into<String>) -> Self {
        Self { action: Action::Shoot, target: None, reasoning: reasoning.into() }
    }

    pub fn pass(target: SlotId, reasoning: impl Into<String>) -> Self {
        Self { action: Action::Pass, target: Some(target), reasoning: reasoning.into() }
    }

    pub fn skill_move(reasoning: impl Into<String>) -> Self {
        Self { action: Action::SkillMove, target: None, reasoning: reasoning.into() }
    }
}

/// Read-only view a policy decides from.
#[derive(Clone, Copy)]
pub struct DecisionContext<'a> {
    pub court: &'a Court<'a>,
    pub state: &'a PossessionState,
}

impl<'a> DecisionContext<'a> {
    pub fn new(court: &'a Court<'a>, state: &'a PossessionState) -> Self {
        Self { court, state }
    }

    pub fn ball_handler(&self) -> SlotId {
        self.state.ball_handler
    }

    pub fn openness(&self, slot: SlotId) -> f64 {
        self.state.openness_of(slot)
    }

    pub fn shot_clock(&self) -> Seconds {
        self.state.shot_clock()
    }

    pub fn quarter_time(&self) -> Seconds {
        self.state.quarter_time()
    }

    pub fn most_open_teammate(&self) -> Option<SlotId> {
        most_open_teammate(self.court, self.state)
    }
}

/// The most open offensive player other than the ball handler. Ties go
/// to the lowest slot.
pub fn most_open_teammate(court: &Court<'_>, state: &PossessionState) -> Option<SlotId> {
    court
        .offense()
        .filter(|&s| s != state.ball_handler)
        .fold(None, |best: Option<SlotId>, s| match best {
            Some(b) if state.openness_of(b) >= state.openness_of(s) => Some(b),
            _ => Some(s),
        })
}

/// Swappable decision strategy.
///
/// Implementations must be deterministic given the context and the RNG
/// stream they are handed, and shareable across worker threads.
pub trait DecisionPolicy: Send + Sync {
    /// Stable name, recorded in logs.
    fn name(&self) -> &'static str;

    fn decide(&self, ctx: &DecisionContext<'_>, rng: &mut PossessionRng) -> Decision;
}

/// Default rule-based policy.
///
/// Rules, first match wins:
///   1. shot clock or quarter nearly gone → shoot
///   2. open and a capable shooter → shoot
///   3. a teammate is clearly more open → pass to them
///   4. a good dribbler who is covered → skill move
///   5. otherwise a weighted draw over the three actions
pub struct HeuristicPolicy {
    config: Arc<SimConfig>,
}

impl HeuristicPolicy {
    pub fn new(config: Arc<SimConfig>) -> Self {
        Self { config }
    }

    fn weighted_fallback(&self, ctx: &DecisionContext<'_>, rng: &mut PossessionRng) -> Decision {
        let w = &self.config.decision.fallback_weights;
        let teammate = ctx.most_open_teammate();
        let pass_weight = if teammate.is_some() { w.pass.max(0.0) } else { 0.0 };
        let shoot_weight = w.shoot.max(0.0);
        let skill_weight = w.skill_move.max(0.0);
        let total = shoot_weight + pass_weight + skill_weight;
        if total <= 0.0 {
            return Decision::shoot("no preference, take the shot");
        }

        let draw = rng.next_f64() * total;
        match teammate {
            _ if draw < shoot_weight => Decision::shoot("weighted pick: shoot"),
            Some(t) if draw < shoot_weight + pass_weight => Decision::pass(t, "weighted pick: move the ball"),
            _ => Decision::skill_move("weighted pick: attack off the dribble"),
        }
    }
}

impl DecisionPolicy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn decide(&self, ctx: &DecisionContext<'_>, rng: &mut PossessionRng) -> Decision {
        let cfg = &self.config.decision;
        let handler = ctx.court.player(ctx.ball_handler());
        let attrs = &handler.attributes;
        let openness = ctx.openness(ctx.ball_handler());
        let shot_rating = attrs.three_point_shot.max(attrs.inside_shot);

        if ctx.shot_clock() <= cfg.force_shot_shot_clock {
            return Decision::shoot(format!("shot clock at {:.1}s", ctx.shot_clock()));
        }
        if ctx.quarter_time() <= cfg.force_shot_quarter_time {
            return Decision::shoot(format!("{:.1}s left in the quarter", ctx.quarter_time()));
        }
        if openness >= cfg.open_shot_threshold && shot_rating >= cfg.min_shot_rating {
            return Decision::shoot(format!("open look ({openness:.0}) for a {shot_rating:.0} shooter"));
        }
        if let Some(mate) = ctx.most_open_teammate() {
            let mate_openness = ctx.openness(mate);
            if mate_openness - openness >= cfg.pass_advantage {
                return Decision::pass(
                    mate,
                    format!("{} is open ({mate_openness:.0} vs {openness:.0})", ctx.court.name(mate)),
                );
            }
        }
        if attrs.skill_move >= cfg.skill_move_min_rating && openness < cfg.skill_move_max_openness {
            return Decision::skill_move(format!("covered ({openness:.0}), creating space"));
        }
        self.weighted_fallback(ctx, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Attributes, Position, SimulationPlayer, SimulationTeam};

    fn team(id: &str, value: f64) -> SimulationTeam {
        let roster = Position::ORDER
            .iter()
            .enumerate()
            .map(|(i, &pos)| SimulationPlayer::new(format!("{id}{i}"), format!("{id}{i}"), pos, id, Attributes::uniform(value)))
            .collect();
        SimulationTeam::new(id, id, roster)
    }

    #[test]
    fn late_clock_forces_a_shot() {
        let config = Arc::new(SimConfig::default());
        let (a, b) = (team("A", 50.0), team("B", 50.0));
        let court = Court::new(&a, &b).unwrap();
        let mut state = PossessionState::new(&court, SlotId(0), 3.0, 600.0);
        state.openness = vec![0.0, 100.0, 100.0, 100.0, 100.0];
        let policy = HeuristicPolicy::new(config);
        let decision = policy.decide(&DecisionContext::new(&court, &state), &mut PossessionRng::new(1));
        assert_eq!(decision.action, Action::Shoot);
    }

    #[test]
    fn passes_to_the_clearly_open_teammate() {
        let config = Arc::new(SimConfig::default());
        let (a, b) = (team("A", 40.0), team("B", 50.0));
        let court = Court::new(&a, &b).unwrap();
        let mut state = PossessionState::new(&court, SlotId(0), 20.0, 600.0);
        state.openness = vec![30.0, 45.0, 80.0, 80.0, 10.0];
        let policy = HeuristicPolicy::new(config);
        let decision = policy.decide(&DecisionContext::new(&court, &state), &mut PossessionRng::new(1));
        assert_eq!(decision.action, Action::Pass);
        // Slot 2 and 3 tie; the lower slot wins.
        assert_eq!(decision.target, Some(SlotId(2)));
    }

    #[test]
    fn most_open_teammate_skips_the_handler() {
        let (a, b) = (team("A", 50.0), team("B", 50.0));
        let court = Court::new(&a, &b).unwrap();
        let mut state = PossessionState::new(&court, SlotId(1), 24.0, 600.0);
        state.openness = vec![10.0, 99.0, 20.0, 5.0, 20.0];
        assert_eq!(most_open_teammate(&court, &state), Some(SlotId(2)));
    }
}
