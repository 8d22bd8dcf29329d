//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// Game-clock seconds. Always non-negative once it leaves a clock.
pub type Seconds = f64;

/// A stable, unique identifier for a player, supplied by the game layer.
pub type PlayerId = String;

/// A stable, unique identifier for a team.
pub type TeamId = String;

/// Index of an on-court player inside a possession's `Court` arena.
/// Offensive slots come first, defensive slots after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}
