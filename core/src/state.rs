//! Mutable state of one possession.
//!
//! Created fresh at possession start, changed only by the modifier state
//! machine and by clock advancement, dropped when the possession ends.

use crate::{
    clock::PossessionClock,
    court::Court,
    types::{Seconds, SlotId},
};

#[derive(Debug, Clone, PartialEq)]
pub struct PossessionState {
    pub ball_handler:        SlotId,
    pub pass_count:          u32,
    /// In [0, 1], never decreases within a possession.
    pub defensive_breakdown: f64,
    pub clock:               PossessionClock,
    /// Per offensive slot, recomputed every decision step.
    pub openness:            Vec<f64>,
    /// Per offensive slot, carried across recomputation until the
    /// player gives up the ball.
    pub openness_boost:      Vec<f64>,
    /// Per slot (both sides), never decreases within a possession.
    pub stamina_decay:       Vec<f64>,
    /// Per slot speed points lost to fatigue.
    pub speed_penalty:       Vec<f64>,
    /// Passer of the last completed pass, while the receiver still
    /// holds the ball with no other action in between.
    pub last_passer:         Option<SlotId>,
}

impl PossessionState {
    pub fn new(court: &Court<'_>, ball_handler: SlotId, shot_clock: Seconds, quarter_time: Seconds) -> Self {
        Self {
            ball_handler,
            pass_count:          0,
            defensive_breakdown: 0.0,
            clock:               PossessionClock::new(shot_clock, quarter_time),
            openness:            vec![0.0; court.offense_len()],
            openness_boost:      vec![0.0; court.offense_len()],
            stamina_decay:       vec![0.0; court.len()],
            speed_penalty:       vec![0.0; court.len()],
            last_passer:         None,
        }
    }

    pub fn openness_of(&self, slot: SlotId) -> f64 {
        self.openness.get(slot.index()).copied().unwrap_or(0.0)
    }

    pub fn shot_clock(&self) -> Seconds {
        self.clock.shot_clock
    }

    pub fn quarter_time(&self) -> Seconds {
        self.clock.quarter_time
    }
}

/// Fatigue carried by one slot into the openness and shot formulas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fatigue {
    pub decay:         f64,
    pub speed_penalty: f64,
}

impl PossessionState {
    pub fn fatigue_of(&self, slot: SlotId) -> Fatigue {
        Fatigue {
            decay:         self.stamina_decay[slot.index()],
            speed_penalty: self.speed_penalty[slot.index()],
        }
    }
}
