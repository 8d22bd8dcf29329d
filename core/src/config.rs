//! Tunable coefficients and caps for every roll type.
//!
//! RULE: the config is built once, validated, then shared read-only as
//! `Arc<SimConfig>`. Nothing mutates it after load, so concurrent
//! possessions need no locking.

use crate::{
    dice::{Outcome, RollType},
    error::{SimError, SimResult},
    player::Position,
    types::Seconds,
};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "d20_config.json";

// ── Allocation rules ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMethod {
    FloorThenRemainder,
}

/// Tie-break direction among equal fractional remainders, and the
/// order in which clamped faces are redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionalPriority {
    /// Earlier declared outcomes win.
    Desc,
    /// Later declared outcomes win.
    Asc,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationRules {
    pub d20_total_faces:     u32,
    pub rounding_method:     RoundingMethod,
    pub fractional_priority: FractionalPriority,
}

/// One declared outcome bucket. List order is walk and priority order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCaps {
    pub outcome:   Outcome,
    pub min_faces: u32,
    pub max_faces: u32,
}

impl OutcomeCaps {
    pub const fn new(outcome: Outcome, min_faces: u32, max_faces: u32) -> Self {
        Self { outcome, min_faces, max_faces }
    }
}

// ── Openness ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpennessOffenseWeights {
    pub speed:      f64,
    pub ball_iq:    f64,
    pub skill_move: f64,
    pub pass:       f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpennessDefenseWeights {
    pub speed:           f64,
    pub on_ball_defense: f64,
}

/// How hard stamina decay bites each attribute. Speed is hit hardest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayWeights {
    pub speed:      f64,
    pub ball_iq:    f64,
    pub skill_move: f64,
    pub pass:       f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpennessConfig {
    pub base_value:                 f64,
    pub scale_factor:               f64,
    /// Uniform noise in [-variance, +variance] added after normalising.
    pub variance:                   f64,
    pub offense_weights:            OpennessOffenseWeights,
    pub defense_weights:            OpennessDefenseWeights,
    pub pass_count_weight:          f64,
    pub max_pass_bonus:             f64,
    pub defensive_breakdown_weight: f64,
    pub decay_weights:              DecayWeights,
}

// ── Shot ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotOffenseWeights {
    pub shot_rating: f64,
    pub openness:    f64,
    pub speed:       f64,
    pub stamina:     f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotDefenseWeights {
    pub on_ball_defense: f64,
    pub speed:           f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotConfig {
    pub base_two_point:           f64,
    pub base_three_point:         f64,
    pub scale_factor:             f64,
    pub offense_weights:          ShotOffenseWeights,
    pub defense_weights:          ShotDefenseWeights,
    /// Below this many shot-clock seconds the shooter is rushed.
    pub clock_pressure_threshold: Seconds,
    pub clock_pressure_weight:    f64,
    pub min_make_probability:     f64,
    pub max_make_probability:     f64,
    pub block_base:               f64,
    pub block_scale:              f64,
    pub three_point_block_factor: f64,
    pub max_block_probability:    f64,
    pub block_cap_max:            u32,
    pub outcomes:                 Vec<OutcomeCaps>,
}

// ── Skill move ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMoveOffenseWeights {
    pub skill_move: f64,
    pub speed:      f64,
    pub ball_iq:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMoveDefenseWeights {
    pub on_ball_defense: f64,
    pub speed:           f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMoveConfig {
    pub base_value:              f64,
    pub scale_factor:            f64,
    pub offense_weights:         SkillMoveOffenseWeights,
    pub defense_weights:         SkillMoveDefenseWeights,
    pub min_success_probability: f64,
    pub max_success_probability: f64,
    pub steal_base:              f64,
    pub steal_scale:             f64,
    pub max_steal_probability:   f64,
    pub openness_gain_base:      f64,
    pub openness_gain_scale:     f64,
    pub max_openness_gain:       f64,
    pub steal_cap_max:           u32,
    pub outcomes:                Vec<OutcomeCaps>,
}

// ── Pass ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassOffenseWeights {
    pub pass:            f64,
    pub ball_iq:         f64,
    pub target_openness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassDefenseWeights {
    pub steal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassConfig {
    pub interception_base:            f64,
    pub scale_factor:                 f64,
    pub offense_weights:              PassOffenseWeights,
    pub defense_weights:              PassDefenseWeights,
    pub min_interception_probability: f64,
    pub max_interception_probability: f64,
    pub interception_cap_max:         u32,
    pub outcomes:                     Vec<OutcomeCaps>,
}

// ── Rebound ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionBonus {
    pub pg: f64,
    pub sg: f64,
    pub sf: f64,
    pub pf: f64,
    pub c:  f64,
}

impl PositionBonus {
    pub fn for_position(&self, position: Position) -> f64 {
        match position {
            Position::PointGuard    => self.pg,
            Position::ShootingGuard => self.sg,
            Position::SmallForward  => self.sf,
            Position::PowerForward  => self.pf,
            Position::Center        => self.c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReboundConfig {
    pub base_value:                f64,
    pub scale_factor:              f64,
    /// Added to the offensive side's raw edge. Negative favours the defense.
    pub offensive_team_bias:       f64,
    pub position_bonus:            PositionBonus,
    pub min_offensive_probability: f64,
    pub max_offensive_probability: f64,
    pub outcomes:                  Vec<OutcomeCaps>,
}

// ── Modifiers, timing, decisions ────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierConfig {
    pub defensive_breakdown_increment: f64,
    pub offensive_rebound_shot_clock:  Seconds,
    pub stamina_decay_per_step:        f64,
    pub max_stamina_decay:             f64,
    /// Effective stamina (0–100) below which speed starts to suffer.
    pub fatigue_threshold:             f64,
    /// Speed points lost per unit of accumulated decay once fatigued.
    pub fatigue_speed_penalty:         f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondsRange {
    pub min: Seconds,
    pub max: Seconds,
}

impl SecondsRange {
    /// Planning estimate used before an action is committed.
    pub fn estimate(&self) -> Seconds {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub shot_clock_seconds:  Seconds,
    pub ball_advance:        SecondsRange,
    pub shoot:               SecondsRange,
    pub pass:                SecondsRange,
    pub skill_move:          SecondsRange,
    pub max_resolving_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackWeights {
    pub shoot:      f64,
    pub pass:       f64,
    pub skill_move: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub force_shot_shot_clock:   Seconds,
    pub force_shot_quarter_time: Seconds,
    pub open_shot_threshold:     f64,
    pub min_shot_rating:         f64,
    pub pass_advantage:          f64,
    pub skill_move_min_rating:   f64,
    pub skill_move_max_openness: f64,
    pub fallback_weights:        FallbackWeights,
}

// ── Root ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub allocation_rules: AllocationRules,
    pub openness:         OpennessConfig,
    pub shot:             ShotConfig,
    pub skill_move:       SkillMoveConfig,
    pub pass:             PassConfig,
    pub rebound:          ReboundConfig,
    pub modifiers:        ModifierConfig,
    pub timing:           TimingConfig,
    pub decision:         DecisionConfig,
}

impl SimConfig {
    /// Load and validate `{data_dir}/d20_config.json`.
    pub fn load(data_dir: &str) -> SimResult<Self> {
        let path = format!("{data_dir}/{CONFIG_FILE}");
        let content = std::fs::read_to_string(&path)
            .map_err(|source| SimError::ConfigRead { path: path.clone(), source })?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded config from {path}");
        Ok(config)
    }

    /// Parse and validate a config document.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Declared caps for a roll type, with outcome-specific caps
    /// (block, steal, interception) folded into max_faces.
    pub fn caps_for(&self, roll: RollType) -> Vec<OutcomeCaps> {
        let (outcomes, special) = match roll {
            RollType::Shot      => (&self.shot.outcomes, Some((Outcome::Block, self.shot.block_cap_max))),
            RollType::SkillMove => (&self.skill_move.outcomes, Some((Outcome::Steal, self.skill_move.steal_cap_max))),
            RollType::Pass      => (&self.pass.outcomes, Some((Outcome::Intercepted, self.pass.interception_cap_max))),
            RollType::Rebound   => (&self.rebound.outcomes, None),
        };
        outcomes
            .iter()
            .map(|caps| match special {
                Some((outcome, cap_max)) if caps.outcome == outcome => OutcomeCaps {
                    max_faces: caps.max_faces.min(cap_max),
                    min_faces: caps.min_faces.min(cap_max),
                    ..*caps
                },
                _ => *caps,
            })
            .collect()
    }

    /// Refuse configs that would allocate faces inconsistently.
    pub fn validate(&self) -> SimResult<()> {
        let total = self.allocation_rules.d20_total_faces;
        if total == 0 {
            return Err(SimError::InvalidConfig("d20_total_faces must be > 0".into()));
        }

        for roll in [RollType::Shot, RollType::SkillMove, RollType::Pass, RollType::Rebound] {
            let declared = match roll {
                RollType::Shot      => &self.shot.outcomes,
                RollType::SkillMove => &self.skill_move.outcomes,
                RollType::Pass      => &self.pass.outcomes,
                RollType::Rebound   => &self.rebound.outcomes,
            };
            validate_outcomes(roll, declared)?;

            let caps = self.caps_for(roll);
            let min_sum: u32 = caps.iter().map(|c| c.min_faces).sum();
            let max_sum: u32 = caps.iter().map(|c| c.max_faces).sum();
            if min_sum > total || max_sum < total {
                return Err(SimError::UnsatisfiableCaps { roll, total, min_sum, max_sum });
            }
        }

        check_bounds("shot make", self.shot.min_make_probability, self.shot.max_make_probability)?;
        check_bounds("shot block", 0.0, self.shot.max_block_probability)?;
        check_bounds(
            "skill move success",
            self.skill_move.min_success_probability,
            self.skill_move.max_success_probability,
        )?;
        check_bounds("skill move steal", 0.0, self.skill_move.max_steal_probability)?;
        check_bounds(
            "pass interception",
            self.pass.min_interception_probability,
            self.pass.max_interception_probability,
        )?;
        check_bounds(
            "offensive rebound",
            self.rebound.min_offensive_probability,
            self.rebound.max_offensive_probability,
        )?;

        if self.skill_move.max_openness_gain < 0.0 {
            return Err(SimError::InvalidConfig("skill_move.max_openness_gain must be >= 0".into()));
        }
        if self.openness.variance < 0.0 {
            return Err(SimError::InvalidConfig("openness variance must be >= 0".into()));
        }
        if !(0.0..=1.0).contains(&self.modifiers.defensive_breakdown_increment) {
            return Err(SimError::InvalidConfig(
                "defensive_breakdown_increment must be within [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.modifiers.max_stamina_decay)
            || self.modifiers.stamina_decay_per_step < 0.0
        {
            return Err(SimError::InvalidConfig("stamina decay must be within [0, 1]".into()));
        }

        let t = &self.timing;
        if t.shot_clock_seconds <= 0.0 {
            return Err(SimError::InvalidConfig("shot_clock_seconds must be > 0".into()));
        }
        if !(0.0..=t.shot_clock_seconds).contains(&self.modifiers.offensive_rebound_shot_clock) {
            return Err(SimError::InvalidConfig(
                "offensive_rebound_shot_clock must fit inside the shot clock".into(),
            ));
        }
        for (name, range) in [
            ("ball_advance", t.ball_advance),
            ("shoot", t.shoot),
            ("pass", t.pass),
            ("skill_move", t.skill_move),
        ] {
            if range.min < 0.0 || range.min > range.max {
                return Err(SimError::InvalidConfig(format!(
                    "timing.{name}: need 0 <= min <= max, got [{}, {}]",
                    range.min, range.max
                )));
            }
        }
        // Actions must consume time or the shot clock cannot force termination.
        if t.shoot.min <= 0.0 || t.pass.min <= 0.0 || t.skill_move.min <= 0.0 {
            return Err(SimError::InvalidConfig("action durations must be > 0".into()));
        }
        if t.ball_advance.max >= t.shot_clock_seconds {
            return Err(SimError::InvalidConfig(
                "ball advance may not consume the whole shot clock".into(),
            ));
        }
        if t.max_resolving_steps == 0 {
            return Err(SimError::InvalidConfig("max_resolving_steps must be > 0".into()));
        }

        let w = &self.decision.fallback_weights;
        if w.shoot < 0.0 || w.pass < 0.0 || w.skill_move < 0.0 || w.shoot + w.pass + w.skill_move <= 0.0 {
            return Err(SimError::InvalidConfig(
                "decision fallback weights must be non-negative with a positive sum".into(),
            ));
        }
        Ok(())
    }
}

fn validate_outcomes(roll: RollType, declared: &[OutcomeCaps]) -> SimResult<()> {
    let required = roll.outcomes();
    for (i, caps) in declared.iter().enumerate() {
        let duplicate = declared[..i].iter().any(|c| c.outcome == caps.outcome);
        if duplicate || !required.contains(&caps.outcome) {
            return Err(SimError::UnexpectedOutcome { roll, outcome: caps.outcome });
        }
        if caps.min_faces > caps.max_faces {
            return Err(SimError::InvalidCaps {
                roll,
                outcome: caps.outcome,
                min:     caps.min_faces,
                max:     caps.max_faces,
            });
        }
    }
    for &outcome in required {
        if !declared.iter().any(|c| c.outcome == outcome) {
            return Err(SimError::MissingOutcome { roll, outcome });
        }
    }
    Ok(())
}

fn check_bounds(name: &str, min: f64, max: f64) -> SimResult<()> {
    if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
        return Err(SimError::InvalidConfig(format!(
            "{name} probability bounds must satisfy 0 <= min <= max <= 1, got [{min}, {max}]"
        )));
    }
    Ok(())
}

impl Default for SimConfig {
    /// Same values as the shipped `data/d20_config.json`.
    fn default() -> Self {
        Self {
            allocation_rules: AllocationRules {
                d20_total_faces:     20,
                rounding_method:     RoundingMethod::FloorThenRemainder,
                fractional_priority: FractionalPriority::Desc,
            },
            openness: OpennessConfig {
                base_value:   50.0,
                scale_factor: 0.6,
                variance:     10.0,
                offense_weights: OpennessOffenseWeights {
                    speed:      0.35,
                    ball_iq:    0.2,
                    skill_move: 0.25,
                    pass:       0.2,
                },
                defense_weights: OpennessDefenseWeights {
                    speed:           0.4,
                    on_ball_defense: 0.6,
                },
                pass_count_weight:          4.0,
                max_pass_bonus:             16.0,
                defensive_breakdown_weight: 20.0,
                decay_weights: DecayWeights {
                    speed:      1.0,
                    ball_iq:    0.4,
                    skill_move: 0.75,
                    pass:       0.4,
                },
            },
            shot: ShotConfig {
                base_two_point:   45.0,
                base_three_point: 35.0,
                scale_factor:     0.5,
                offense_weights: ShotOffenseWeights {
                    shot_rating: 0.5,
                    openness:    0.3,
                    speed:       0.1,
                    stamina:     0.1,
                },
                defense_weights: ShotDefenseWeights {
                    on_ball_defense: 0.7,
                    speed:           0.3,
                },
                clock_pressure_threshold: 6.0,
                clock_pressure_weight:    2.0,
                min_make_probability:     0.05,
                max_make_probability:     0.85,
                block_base:               4.0,
                block_scale:              0.1,
                three_point_block_factor: 0.5,
                max_block_probability:    0.15,
                block_cap_max:            3,
                outcomes: vec![
                    OutcomeCaps::new(Outcome::Make, 1, 18),
                    OutcomeCaps::new(Outcome::Miss, 1, 19),
                    OutcomeCaps::new(Outcome::Block, 0, 3),
                ],
            },
            skill_move: SkillMoveConfig {
                base_value:   45.0,
                scale_factor: 0.5,
                offense_weights: SkillMoveOffenseWeights {
                    skill_move: 0.5,
                    speed:      0.3,
                    ball_iq:    0.2,
                },
                defense_weights: SkillMoveDefenseWeights {
                    on_ball_defense: 0.6,
                    speed:           0.4,
                },
                min_success_probability: 0.1,
                max_success_probability: 0.8,
                steal_base:              5.0,
                steal_scale:             0.15,
                max_steal_probability:   0.2,
                openness_gain_base:      10.0,
                openness_gain_scale:     0.1,
                max_openness_gain:       20.0,
                steal_cap_max:           3,
                outcomes: vec![
                    OutcomeCaps::new(Outcome::Success, 1, 18),
                    OutcomeCaps::new(Outcome::Failure, 1, 19),
                    OutcomeCaps::new(Outcome::Steal, 0, 3),
                ],
            },
            pass: PassConfig {
                interception_base: 8.0,
                scale_factor:      0.2,
                offense_weights: PassOffenseWeights {
                    pass:            0.5,
                    ball_iq:         0.3,
                    target_openness: 0.2,
                },
                defense_weights: PassDefenseWeights { steal: 1.0 },
                min_interception_probability: 0.01,
                max_interception_probability: 0.2,
                interception_cap_max:         4,
                outcomes: vec![
                    OutcomeCaps::new(Outcome::Complete, 10, 20),
                    OutcomeCaps::new(Outcome::Intercepted, 0, 4),
                ],
            },
            rebound: ReboundConfig {
                base_value:          28.0,
                scale_factor:        0.4,
                offensive_team_bias: 0.0,
                position_bonus: PositionBonus {
                    pg: 0.0,
                    sg: 0.0,
                    sf: 2.0,
                    pf: 6.0,
                    c:  10.0,
                },
                min_offensive_probability: 0.05,
                max_offensive_probability: 0.6,
                outcomes: vec![
                    OutcomeCaps::new(Outcome::Offensive, 1, 12),
                    OutcomeCaps::new(Outcome::Defensive, 8, 19),
                ],
            },
            modifiers: ModifierConfig {
                defensive_breakdown_increment: 0.15,
                offensive_rebound_shot_clock:  14.0,
                stamina_decay_per_step:        0.01,
                max_stamina_decay:             0.6,
                fatigue_threshold:             45.0,
                fatigue_speed_penalty:         40.0,
            },
            timing: TimingConfig {
                shot_clock_seconds:  24.0,
                ball_advance:        SecondsRange { min: 3.0, max: 7.0 },
                shoot:               SecondsRange { min: 3.0, max: 3.0 },
                pass:                SecondsRange { min: 2.0, max: 3.0 },
                skill_move:          SecondsRange { min: 2.0, max: 4.0 },
                max_resolving_steps: 24,
            },
            decision: DecisionConfig {
                force_shot_shot_clock:   4.0,
                force_shot_quarter_time: 4.0,
                open_shot_threshold:     70.0,
                min_shot_rating:         50.0,
                pass_advantage:          12.0,
                skill_move_min_rating:   60.0,
                skill_move_max_openness: 50.0,
                fallback_weights: FallbackWeights {
                    shoot:      0.35,
                    pass:       0.45,
                    skill_move: 0.2,
                },
            },
        }
    }
}
