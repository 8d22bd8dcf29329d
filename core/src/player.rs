//! Player and team inputs supplied by the surrounding game layer.
//!
//! The core never mutates these. Rotation decisions happen outside; a
//! team arrives with the five ids its rotation manager put on the floor.

use crate::types::{PlayerId, TeamId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const LINEUP_SIZE: usize = 5;

/// Positions in their fixed ordering, used for matchup fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "PG")]
    PointGuard,
    #[serde(rename = "SG")]
    ShootingGuard,
    #[serde(rename = "SF")]
    SmallForward,
    #[serde(rename = "PF")]
    PowerForward,
    #[serde(rename = "C")]
    Center,
}

impl Position {
    pub const ORDER: [Position; 5] = [
        Position::PointGuard,
        Position::ShootingGuard,
        Position::SmallForward,
        Position::PowerForward,
        Position::Center,
    ];

    pub fn ordinal(self) -> usize {
        match self {
            Self::PointGuard    => 0,
            Self::ShootingGuard => 1,
            Self::SmallForward  => 2,
            Self::PowerForward  => 3,
            Self::Center        => 4,
        }
    }

    pub fn distance(self, other: Position) -> usize {
        self.ordinal().abs_diff(other.ordinal())
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::PointGuard    => "PG",
            Self::ShootingGuard => "SG",
            Self::SmallForward  => "SF",
            Self::PowerForward  => "PF",
            Self::Center        => "C",
        }
    }
}

/// Normalised ratings, all on a 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub speed:             f64,
    pub ball_iq:           f64,
    pub inside_shot:       f64,
    pub three_point_shot:  f64,
    pub pass:              f64,
    pub skill_move:        f64,
    pub on_ball_defense:   f64,
    pub stamina:           f64,
    pub block:             f64,
    pub steal:             f64,
    pub offensive_rebound: f64,
    pub defensive_rebound: f64,
}

impl Attributes {
    /// Every rating set to `value`.
    pub fn uniform(value: f64) -> Self {
        Self {
            speed:             value,
            ball_iq:           value,
            inside_shot:       value,
            three_point_shot:  value,
            pass:              value,
            skill_move:        value,
            on_ball_defense:   value,
            stamina:           value,
            block:             value,
            steal:             value,
            offensive_rebound: value,
            defensive_rebound: value,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        let c = |v: f64| if v.is_finite() { v.clamp(0.0, 100.0) } else { 0.0 };
        Self {
            speed:             c(self.speed),
            ball_iq:           c(self.ball_iq),
            inside_shot:       c(self.inside_shot),
            three_point_shot:  c(self.three_point_shot),
            pass:              c(self.pass),
            skill_move:        c(self.skill_move),
            on_ball_defense:   c(self.on_ball_defense),
            stamina:           c(self.stamina),
            block:             c(self.block),
            steal:             c(self.steal),
            offensive_rebound: c(self.offensive_rebound),
            defensive_rebound: c(self.defensive_rebound),
        }
    }

    fn values(&self) -> [f64; 12] {
        [
            self.speed,
            self.ball_iq,
            self.inside_shot,
            self.three_point_shot,
            self.pass,
            self.skill_move,
            self.on_ball_defense,
            self.stamina,
            self.block,
            self.steal,
            self.offensive_rebound,
            self.defensive_rebound,
        ]
    }

    /// Mean of all twelve ratings.
    pub fn overall(&self) -> f64 {
        self.values().iter().sum::<f64>() / 12.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPlayer {
    pub id:         PlayerId,
    pub name:       String,
    pub position:   Position,
    pub team_id:    TeamId,
    pub attributes: Attributes,
}

impl SimulationPlayer {
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        position: Position,
        team_id: impl Into<TeamId>,
        attributes: Attributes,
    ) -> Self {
        Self {
            id:         id.into(),
            name:       name.into(),
            position,
            team_id:    team_id.into(),
            attributes: attributes.clamped(),
        }
    }

    pub fn overall(&self) -> f64 {
        self.attributes.overall()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTeam {
    pub id:     TeamId,
    pub name:   String,
    pub roster: Vec<SimulationPlayer>,
    /// Player ids currently on the floor, as chosen by the rotation.
    #[serde(default)]
    pub lineup: Vec<PlayerId>,
}

impl SimulationTeam {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, roster: Vec<SimulationPlayer>) -> Self {
        let lineup = roster.iter().take(LINEUP_SIZE).map(|p| p.id.clone()).collect();
        Self { id: id.into(), name: name.into(), roster, lineup }
    }

    pub fn with_lineup(mut self, lineup: Vec<PlayerId>) -> Self {
        self.lineup = lineup;
        self
    }

    pub fn player(&self, id: &str) -> Option<&SimulationPlayer> {
        self.roster.iter().find(|p| p.id == id)
    }

    /// The players on the floor for this possession.
    ///
    /// Lineup ids are resolved against the roster (unknown and repeated
    /// ids are skipped) and truncated to five. A short lineup is filled
    /// from the rest of the roster by overall rating, best first. A roster
    /// with fewer than five players plays short-handed.
    pub fn active_five(&self) -> Vec<&SimulationPlayer> {
        let mut active: Vec<&SimulationPlayer> = Vec::with_capacity(LINEUP_SIZE);
        for id in &self.lineup {
            if active.len() == LINEUP_SIZE {
                break;
            }
            match self.player(id) {
                Some(p) if !active.iter().any(|a| a.id == p.id) => active.push(p),
                Some(_) => {}
                None => log::warn!("team {}: lineup id '{id}' not on roster", self.id),
            }
        }
        if self.lineup.len() != LINEUP_SIZE {
            log::warn!(
                "team {}: rotation supplied {} players, expected {LINEUP_SIZE}",
                self.id,
                self.lineup.len()
            );
        }

        if active.len() < LINEUP_SIZE {
            let mut bench: Vec<&SimulationPlayer> = self
                .roster
                .iter()
                .filter(|p| !active.iter().any(|a| a.id == p.id))
                .collect();
            // Stable sort keeps roster order among equal ratings.
            bench.sort_by(|a, b| b.overall().partial_cmp(&a.overall()).unwrap_or(Ordering::Equal));
            let missing = LINEUP_SIZE - active.len();
            active.extend(bench.into_iter().take(missing));
        }
        active
    }
}
