//! What a finished possession hands back to the game layer.

use crate::{
    court::Court,
    event::PossessionLogEntry,
    types::{PlayerId, Seconds, SlotId, TeamId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the possession ended. Checked in this priority order after every
/// resolving step: score, turnover, defensive rebound, shot clock,
/// quarter clock.
///
/// `InsufficientTime` and `StepLimit` are checked before a decision is
/// resolved rather than after. `StepLimit` is the engine's own ceiling
/// on resolving steps. With the shipped timings only a run of offensive
/// rebounds, each resetting the shot clock, can reach it. It is not a
/// turnover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminalReason {
    Score { points: u32 },
    Interception,
    Steal,
    DefensiveRebound,
    ShotClockViolation,
    QuarterExpired,
    /// Not enough quarter time left to attempt the chosen action.
    InsufficientTime,
    /// The resolving-step guard tripped.
    StepLimit,
}

impl TerminalReason {
    pub fn is_turnover(&self) -> bool {
        matches!(self, Self::Interception | Self::Steal | Self::ShotClockViolation)
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score { points }     => write!(f, "score ({points} pts)"),
            Self::Interception         => write!(f, "interception"),
            Self::Steal                => write!(f, "steal"),
            Self::DefensiveRebound     => write!(f, "defensive rebound"),
            Self::ShotClockViolation   => write!(f, "shot clock violation"),
            Self::QuarterExpired       => write!(f, "end of quarter"),
            Self::InsufficientTime     => write!(f, "not enough time for another action"),
            Self::StepLimit            => write!(f, "step limit reached"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScoreLine {
    pub player_id:                PlayerId,
    pub team_id:                  TeamId,
    pub points:                   u32,
    pub field_goals_attempted:    u32,
    pub field_goals_made:         u32,
    pub three_pointers_attempted: u32,
    pub three_pointers_made:      u32,
    pub assists:                  u32,
    pub turnovers:                u32,
    pub steals:                   u32,
    pub blocks:                   u32,
    pub offensive_rebounds:       u32,
    pub defensive_rebounds:       u32,
}

impl BoxScoreLine {
    fn is_empty(&self) -> bool {
        self.points == 0
            && self.field_goals_attempted == 0
            && self.assists == 0
            && self.turnovers == 0
            && self.steals == 0
            && self.blocks == 0
            && self.offensive_rebounds == 0
            && self.defensive_rebounds == 0
    }
}

/// Per-slot stat accumulator for one possession.
#[derive(Debug, Clone)]
pub struct BoxScore {
    lines: Vec<BoxScoreLine>,
}

impl BoxScore {
    pub fn new(court: &Court<'_>) -> Self {
        let lines = court
            .all()
            .map(|s| {
                let p = court.player(s);
                BoxScoreLine { player_id: p.id.clone(), team_id: p.team_id.clone(), ..Default::default() }
            })
            .collect();
        Self { lines }
    }

    pub fn line_mut(&mut self, slot: SlotId) -> &mut BoxScoreLine {
        &mut self.lines[slot.index()]
    }

    pub fn record_shot(&mut self, shooter: SlotId, three_pointer: bool, points: u32) {
        let line = self.line_mut(shooter);
        line.field_goals_attempted += 1;
        if three_pointer {
            line.three_pointers_attempted += 1;
        }
        if points > 0 {
            line.field_goals_made += 1;
            line.points += points;
            if three_pointer {
                line.three_pointers_made += 1;
            }
        }
    }

    /// Lines with at least one counting stat, in slot order.
    pub fn finish(self) -> Vec<BoxScoreLine> {
        self.lines.into_iter().filter(|l| !l.is_empty()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionResult {
    pub seed:                   u64,
    pub offense_team:           TeamId,
    pub defense_team:           TeamId,
    pub policy:                 String,
    pub events:                 Vec<PossessionLogEntry>,
    pub points:                 u32,
    pub turnover:               bool,
    pub offensive_rebound:      bool,
    /// Who has the ball next when the defense took it over live: the
    /// defensive rebounder or the player who stole or intercepted it.
    pub new_ball_handler:       Option<PlayerId>,
    pub duration:               Seconds,
    pub quarter_time_remaining: Seconds,
    pub resolving_steps:        u32,
    pub terminal_reason:        TerminalReason,
    pub box_score:              Vec<BoxScoreLine>,
}

impl PossessionResult {
    pub fn rolls(&self) -> impl Iterator<Item = &crate::dice::RollResult> {
        self.events.iter().filter_map(|e| e.roll.as_ref())
    }
}
