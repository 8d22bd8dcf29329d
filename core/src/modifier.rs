//! Modifier state machine: the only place possession state changes
//! after a resolving step, apart from clock advancement.
//!
//! RULES:
//!   - apply() takes the state by value and hands back the next one.
//!   - pass_count, defensive_breakdown and stamina_decay never decrease.
//!   - An offensive rebound raises the shot clock to at least the
//!     configured reset. It never lowers it.

use crate::{
    config::SimConfig,
    court::Court,
    state::PossessionState,
    types::SlotId,
};
use std::sync::Arc;

/// What a resolving step produced, as far as state is concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    PassCompleted { passer: SlotId, target: SlotId },
    SkillMoveSucceeded { openness_gain: f64 },
    SkillMoveFailed,
    Intercepted { interceptor: SlotId },
    Stolen { stealer: SlotId },
    ShotMade { points: u32 },
    Rebound { offensive: bool, rebounder: SlotId },
}

#[derive(Debug, Clone)]
pub struct ModifierStateMachine {
    config: Arc<SimConfig>,
}

impl ModifierStateMachine {
    pub fn new(config: Arc<SimConfig>) -> Self {
        Self { config }
    }

    pub fn apply(&self, court: &Court<'_>, mut state: PossessionState, outcome: &StepOutcome) -> PossessionState {
        let m = &self.config.modifiers;

        match *outcome {
            StepOutcome::PassCompleted { passer, target } => {
                state.pass_count += 1;
                state.defensive_breakdown = (state.defensive_breakdown + m.defensive_breakdown_increment).min(1.0);
                if let Some(boost) = state.openness_boost.get_mut(passer.index()) {
                    *boost = 0.0;
                }
                state.ball_handler = target;
                state.last_passer = Some(passer);
            }
            StepOutcome::SkillMoveSucceeded { openness_gain } => {
                let h = state.ball_handler.index();
                if let Some(o) = state.openness.get_mut(h) {
                    *o = (*o + openness_gain).min(100.0);
                }
                if let Some(b) = state.openness_boost.get_mut(h) {
                    *b = (*b + openness_gain).min(100.0);
                }
                state.last_passer = None;
            }
            StepOutcome::SkillMoveFailed => {
                state.last_passer = None;
            }
            StepOutcome::Rebound { offensive: true, rebounder } => {
                state.clock.reset_shot_clock_to_at_least(m.offensive_rebound_shot_clock);
                // The shooter let go of the ball; their boost goes with it.
                if let Some(boost) = state.openness_boost.get_mut(state.ball_handler.index()) {
                    *boost = 0.0;
                }
                state.ball_handler = rebounder;
                state.last_passer = None;
            }
            // Terminal outcomes leave the state for the final snapshot.
            StepOutcome::Rebound { offensive: false, .. }
            | StepOutcome::Intercepted { .. }
            | StepOutcome::Stolen { .. }
            | StepOutcome::ShotMade { .. } => {}
        }

        self.accrue_fatigue(court, &mut state);
        state
    }

    /// Every step wears everyone down a little. Once a player's effective
    /// stamina drops under the threshold they start losing speed.
    fn accrue_fatigue(&self, court: &Court<'_>, state: &mut PossessionState) {
        let m = &self.config.modifiers;
        for slot in court.all() {
            let i = slot.index();
            let decay = (state.stamina_decay[i] + m.stamina_decay_per_step).min(m.max_stamina_decay);
            state.stamina_decay[i] = state.stamina_decay[i].max(decay);

            let effective = court.player(slot).attributes.stamina * (1.0 - state.stamina_decay[i]);
            state.speed_penalty[i] = if effective < m.fatigue_threshold {
                state.stamina_decay[i] * m.fatigue_speed_penalty
            } else {
                0.0
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Attributes, Position, SimulationPlayer, SimulationTeam};

    fn team(id: &str, stamina: f64) -> SimulationTeam {
        let roster = Position::ORDER
            .iter()
            .enumerate()
            .map(|(i, &pos)| {
                let mut attrs = Attributes::uniform(60.0);
                attrs.stamina = stamina;
                SimulationPlayer::new(format!("{id}{i}"), format!("{id}{i}"), pos, id, attrs)
            })
            .collect();
        SimulationTeam::new(id, id, roster)
    }

    #[test]
    fn completed_pass_moves_the_ball_and_opens_the_defense() {
        let (a, b) = (team("A", 80.0), team("B", 80.0));
        let court = Court::new(&a, &b).unwrap();
        let machine = ModifierStateMachine::new(Arc::new(SimConfig::default()));
        let mut state = PossessionState::new(&court, SlotId(0), 20.0, 600.0);
        state.openness_boost[0] = 12.0;

        let next = machine.apply(&court, state, &StepOutcome::PassCompleted { passer: SlotId(0), target: SlotId(3) });
        assert_eq!(next.ball_handler, SlotId(3));
        assert_eq!(next.pass_count, 1);
        assert!((next.defensive_breakdown - 0.15).abs() < 1e-12);
        assert_eq!(next.openness_boost[0], 0.0);
        assert_eq!(next.last_passer, Some(SlotId(0)));
    }

    #[test]
    fn breakdown_saturates_at_one() {
        let (a, b) = (team("A", 80.0), team("B", 80.0));
        let court = Court::new(&a, &b).unwrap();
        let machine = ModifierStateMachine::new(Arc::new(SimConfig::default()));
        let mut state = PossessionState::new(&court, SlotId(0), 24.0, 600.0);
        for i in 0..20 {
            let (passer, target) = (SlotId(i % 5), SlotId((i + 1) % 5));
            state = machine.apply(&court, state, &StepOutcome::PassCompleted { passer, target });
        }
        assert_eq!(state.defensive_breakdown, 1.0);
        assert_eq!(state.pass_count, 20);
    }

    #[test]
    fn tired_players_lose_speed() {
        let (a, b) = (team("A", 40.0), team("B", 95.0));
        let court = Court::new(&a, &b).unwrap();
        let machine = ModifierStateMachine::new(Arc::new(SimConfig::default()));
        let state = PossessionState::new(&court, SlotId(0), 24.0, 600.0);
        let next = machine.apply(&court, state, &StepOutcome::SkillMoveFailed);
        assert!(next.speed_penalty[0] > 0.0);
        assert_eq!(next.speed_penalty[5], 0.0);
        assert!(next.stamina_decay.iter().all(|&d| d > 0.0));
    }
}
