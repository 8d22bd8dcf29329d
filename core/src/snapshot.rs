//! Snapshot of possession state recorded after every logged step.
//!
//! A snapshot captures what a replay viewer needs to redraw the scene
//! at that step without re-running the possession.

use crate::{
    court::Court,
    state::PossessionState,
    types::{PlayerId, Seconds},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub ball_handler:        PlayerId,
    pub pass_count:          u32,
    pub defensive_breakdown: f64,
    pub shot_clock:          Seconds,
    pub quarter_time:        Seconds,
}

impl StateSnapshot {
    pub fn capture(state: &PossessionState, court: &Court<'_>) -> Self {
        Self {
            ball_handler:        court.player(state.ball_handler).id.clone(),
            pass_count:          state.pass_count,
            defensive_breakdown: state.defensive_breakdown,
            shot_clock:          state.clock.shot_clock,
            quarter_time:        state.clock.quarter_time,
        }
    }
}
