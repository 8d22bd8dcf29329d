//! The possession log: one entry per thing that happened, in order.
//!
//! RULE: The log is append-only. Entries are numbered as they are
//! pushed and never edited afterwards.

use crate::{
    decision::Decision,
    dice::{Outcome, RollResult},
    result::TerminalReason,
    snapshot::StateSnapshot,
    types::{PlayerId, Seconds},
};
use serde::{Deserialize, Serialize};

/// Every event a possession can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PossessionEvent {
    BallAdvanced {
        seconds: Seconds,
    },
    ShotAttempted {
        shooter:       PlayerId,
        three_pointer: bool,
        outcome:       Outcome,
        points:        u32,
        blocker:       Option<PlayerId>,
    },
    PassAttempted {
        passer:      PlayerId,
        target:      PlayerId,
        outcome:     Outcome,
        interceptor: Option<PlayerId>,
    },
    SkillMoveAttempted {
        player:        PlayerId,
        outcome:       Outcome,
        openness_gain: f64,
        stealer:       Option<PlayerId>,
    },
    Rebounded {
        rebounder: PlayerId,
        offensive: bool,
    },
    PossessionEnded {
        reason: TerminalReason,
    },
}

impl PossessionEvent {
    /// Stable name of the variant, for logs and tooling.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BallAdvanced { .. }       => "ball_advanced",
            Self::ShotAttempted { .. }      => "shot_attempted",
            Self::PassAttempted { .. }      => "pass_attempted",
            Self::SkillMoveAttempted { .. } => "skill_move_attempted",
            Self::Rebounded { .. }          => "rebounded",
            Self::PossessionEnded { .. }    => "possession_ended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpennessReading {
    pub player_id: PlayerId,
    pub openness:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionLogEntry {
    pub step:         u32,
    /// Name of the player holding the ball when the entry was made.
    pub ball_handler: String,
    pub decision:     Option<Decision>,
    /// Openness of every attacker at decision time. Empty outside
    /// resolving steps.
    pub openness:     Vec<OpennessReading>,
    pub roll:         Option<RollResult>,
    pub event:        PossessionEvent,
    pub description:  String,
    pub state:        StateSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct PossessionLog {
    entries: Vec<PossessionLogEntry>,
}

impl PossessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, stamping it with the next step number.
    pub fn push(&mut self, mut entry: PossessionLogEntry) {
        entry.step = self.entries.len() as u32;
        log::debug!("[{:>2}] {} {}", entry.step, entry.event.kind(), entry.description);
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<PossessionLogEntry> {
        self.entries
    }
}
