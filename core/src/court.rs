//! The on-court arena for one possession.
//!
//! Every per-player value in `PossessionState` is a Vec indexed by
//! `SlotId`, never a map keyed by player id. Offensive slots occupy
//! `0..offense_len`, defensive slots follow.

use crate::{
    error::{SimError, SimResult},
    player::{SimulationPlayer, SimulationTeam},
    types::SlotId,
};

#[derive(Debug, Clone)]
pub struct Court<'a> {
    slots:       Vec<&'a SimulationPlayer>,
    offense_len: usize,
    /// Offensive slot index → defensive SlotId guarding it.
    matchups:    Vec<SlotId>,
}

impl<'a> Court<'a> {
    pub fn new(offense: &'a SimulationTeam, defense: &'a SimulationTeam) -> SimResult<Self> {
        let attackers = offense.active_five();
        let defenders = defense.active_five();
        if attackers.is_empty() {
            return Err(SimError::EmptyLineup { team: offense.id.clone() });
        }
        if defenders.is_empty() {
            return Err(SimError::EmptyLineup { team: defense.id.clone() });
        }

        let offense_len = attackers.len();
        let matchups = assign_matchups(&attackers, &defenders)
            .into_iter()
            .map(|d| SlotId(offense_len + d))
            .collect();

        let slots = attackers.into_iter().chain(defenders).collect();
        Ok(Self { slots, offense_len, matchups })
    }

    /// Players on the floor, both sides.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn offense_len(&self) -> usize {
        self.offense_len
    }

    pub fn player(&self, slot: SlotId) -> &'a SimulationPlayer {
        self.slots[slot.index()]
    }

    pub fn offense(&self) -> impl Iterator<Item = SlotId> {
        (0..self.offense_len).map(SlotId)
    }

    pub fn defense(&self) -> impl Iterator<Item = SlotId> {
        (self.offense_len..self.slots.len()).map(SlotId)
    }

    pub fn all(&self) -> impl Iterator<Item = SlotId> {
        (0..self.slots.len()).map(SlotId)
    }

    pub fn is_offense(&self, slot: SlotId) -> bool {
        slot.index() < self.offense_len
    }

    /// The defender assigned to an offensive slot.
    pub fn defender_of(&self, attacker: SlotId) -> SlotId {
        self.matchups[attacker.index()]
    }

    pub fn find_offense(&self, player_id: &str) -> Option<SlotId> {
        self.offense().find(|&s| self.player(s).id == player_id)
    }

    pub fn name(&self, slot: SlotId) -> &'a str {
        &self.player(slot).name
    }
}

/// One defender per attacker: exact position first, then the nearest
/// position in PG..C order, then the first free defender. Once every
/// defender is taken the first one doubles up. Returns indices into
/// `defenders`.
fn assign_matchups(attackers: &[&SimulationPlayer], defenders: &[&SimulationPlayer]) -> Vec<usize> {
    let mut assigned: Vec<Option<usize>> = vec![None; attackers.len()];
    let mut taken = vec![false; defenders.len()];

    for (a, attacker) in attackers.iter().enumerate() {
        if let Some(d) = (0..defenders.len()).find(|&d| !taken[d] && defenders[d].position == attacker.position) {
            taken[d] = true;
            assigned[a] = Some(d);
        }
    }

    for (a, attacker) in attackers.iter().enumerate() {
        if assigned[a].is_some() {
            continue;
        }
        // min_by_key keeps the first defender among equal distances.
        let nearest = (0..defenders.len())
            .filter(|&d| !taken[d])
            .min_by_key(|&d| defenders[d].position.distance(attacker.position));
        if let Some(d) = nearest {
            taken[d] = true;
            assigned[a] = Some(d);
        }
    }

    assigned.into_iter().map(|d| d.unwrap_or(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Attributes, Position};

    fn player(id: &str, position: Position) -> SimulationPlayer {
        SimulationPlayer::new(id, id, position, "T", Attributes::uniform(50.0))
    }

    #[test]
    fn exact_positions_pair_up() {
        use Position::*;
        let attackers = [player("a1", Center), player("a2", PointGuard)];
        let defenders = [player("d1", PointGuard), player("d2", Center)];
        let a: Vec<_> = attackers.iter().collect();
        let d: Vec<_> = defenders.iter().collect();
        assert_eq!(assign_matchups(&a, &d), vec![1, 0]);
    }

    #[test]
    fn nearest_position_then_first_free() {
        use Position::*;
        let attackers = [
            player("a1", PointGuard),
            player("a2", PointGuard),
            player("a3", Center),
        ];
        let defenders = [player("d1", SmallForward), player("d2", PointGuard), player("d3", PowerForward)];
        let a: Vec<_> = attackers.iter().collect();
        let d: Vec<_> = defenders.iter().collect();
        // a1 takes the PG; a2 is nearest to the SF; a3 is left the PF.
        assert_eq!(assign_matchups(&a, &d), vec![1, 0, 2]);
    }

    #[test]
    fn extra_attackers_share_the_first_defender() {
        use Position::*;
        let attackers = [player("a1", Center), player("a2", Center)];
        let defenders = [player("d1", Center)];
        let a: Vec<_> = attackers.iter().collect();
        let d: Vec<_> = defenders.iter().collect();
        assert_eq!(assign_matchups(&a, &d), vec![0, 0]);
    }
}
