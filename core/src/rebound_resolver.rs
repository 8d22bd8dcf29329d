//! Rebound resolution after a missed or blocked shot.
//!
//! The D20 decides which side gets the ball. A second draw then picks the
//! rebounder on that side, weighted by rebounding rating plus the
//! position bonus, so bigs collect most boards.

use crate::{
    config::SimConfig,
    court::Court,
    dice::{scale_probability, FaceAllocator, Outcome, RollPayload, RollResult, RollType},
    error::SimResult,
    rng::PossessionRng,
    types::SlotId,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReboundProbabilities {
    pub offensive: f64,
    pub defensive: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReboundResolution {
    pub roll:      RollResult,
    pub offensive: bool,
    pub rebounder: SlotId,
}

pub struct ReboundResolver {
    config:    Arc<SimConfig>,
    allocator: FaceAllocator,
}

impl ReboundResolver {
    pub fn new(config: Arc<SimConfig>) -> Self {
        let allocator = FaceAllocator::new(config.allocation_rules);
        Self { config, allocator }
    }

    /// Rebounding weight of one slot on its own side of the ball.
    fn weight(&self, court: &Court<'_>, slot: SlotId) -> f64 {
        let player = court.player(slot);
        let rating = if court.is_offense(slot) {
            player.attributes.offensive_rebound
        } else {
            player.attributes.defensive_rebound
        };
        rating + self.config.rebound.position_bonus.for_position(player.position)
    }

    fn side_strength(&self, court: &Court<'_>, slots: impl Iterator<Item = SlotId>) -> f64 {
        let (sum, n) = slots.fold((0.0, 0usize), |(sum, n), s| (sum + self.weight(court, s), n + 1));
        if n == 0 { 0.0 } else { sum / n as f64 }
    }

    pub fn probabilities(&self, court: &Court<'_>) -> ReboundProbabilities {
        let cfg = &self.config.rebound;
        let offense = self.side_strength(court, court.offense());
        let defense = self.side_strength(court, court.defense());
        let offensive = scale_probability(
            cfg.base_value,
            offense - defense + cfg.offensive_team_bias,
            cfg.scale_factor,
            cfg.min_offensive_probability,
            cfg.max_offensive_probability,
        );
        ReboundProbabilities { offensive, defensive: 1.0 - offensive }
    }

    /// Weighted draw over one side. With no positive weight at all the
    /// best-rated player (lowest slot on ties) takes it.
    fn pick_rebounder(&self, court: &Court<'_>, offensive: bool, rng: &mut PossessionRng) -> SlotId {
        let slots: Vec<SlotId> = if offensive { court.offense().collect() } else { court.defense().collect() };
        let weights: Vec<f64> = slots.iter().map(|&s| self.weight(court, s).max(0.0)).collect();
        let total: f64 = weights.iter().sum();

        let draw = rng.next_f64() * total;
        if total > 0.0 {
            let mut acc = 0.0;
            for (&slot, &w) in slots.iter().zip(&weights) {
                acc += w;
                if draw < acc {
                    return slot;
                }
            }
        }
        slots
            .iter()
            .copied()
            .fold(None::<SlotId>, |best, s| match best {
                Some(b) if self.weight(court, b) >= self.weight(court, s) => Some(b),
                _ => Some(s),
            })
            .unwrap_or(SlotId(0))
    }

    pub fn resolve(&self, court: &Court<'_>, rng: &mut PossessionRng) -> SimResult<ReboundResolution> {
        let probs = self.probabilities(court);
        let dice = self.allocator.allocate_and_roll(
            RollType::Rebound,
            &[(Outcome::Offensive, probs.offensive), (Outcome::Defensive, probs.defensive)],
            &self.config.caps_for(RollType::Rebound),
            rng,
        )?;

        let offensive = dice.outcome == Outcome::Offensive;
        let rebounder = self.pick_rebounder(court, offensive, rng);
        let payload = RollPayload::Rebound { rebounder: court.player(rebounder).id.clone(), offensive };

        Ok(ReboundResolution { roll: dice.into_result(RollType::Rebound, payload), offensive, rebounder })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Attributes, Position, SimulationPlayer, SimulationTeam};

    fn team(id: &str, rebounding: f64) -> SimulationTeam {
        let roster = Position::ORDER
            .iter()
            .enumerate()
            .map(|(i, &pos)| {
                let mut attrs = Attributes::uniform(50.0);
                attrs.offensive_rebound = rebounding;
                attrs.defensive_rebound = rebounding;
                SimulationPlayer::new(format!("{id}{i}"), format!("{id} {i}"), pos, id, attrs)
            })
            .collect();
        SimulationTeam::new(id, id, roster)
    }

    #[test]
    fn stronger_glass_tilts_the_odds() {
        let resolver = ReboundResolver::new(Arc::new(SimConfig::default()));
        let (weak, strong) = (team("W", 30.0), team("S", 90.0));
        let court = Court::new(&strong, &weak).unwrap();
        let tilted = resolver.probabilities(&court);
        let even_court = Court::new(&weak, &weak).unwrap();
        let even = resolver.probabilities(&even_court);
        assert!(tilted.offensive > even.offensive);
        assert!((tilted.offensive + tilted.defensive - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rebounder_comes_from_the_winning_side() {
        let resolver = ReboundResolver::new(Arc::new(SimConfig::default()));
        let (a, b) = (team("A", 60.0), team("B", 60.0));
        let court = Court::new(&a, &b).unwrap();
        let mut rng = PossessionRng::new(7);
        for _ in 0..50 {
            let r = resolver.resolve(&court, &mut rng).unwrap();
            assert_eq!(court.is_offense(r.rebounder), r.offensive);
        }
    }
}
