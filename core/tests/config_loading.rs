use hoopsim_core::{
    config::OutcomeCaps,
    dice::{Outcome, RollType},
    PossessionEngine, SimConfig, SimError,
};
use std::sync::Arc;

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");

#[test]
fn shipped_config_matches_defaults() {
    let loaded = SimConfig::load(DATA_DIR).expect("shipped config should load");
    assert_eq!(loaded, SimConfig::default());
}

#[test]
fn defaults_validate() {
    SimConfig::default().validate().expect("defaults are valid");
}

#[test]
fn config_round_trips_through_json() {
    let json = serde_json::to_string_pretty(&SimConfig::default()).expect("serialize");
    let parsed = SimConfig::from_json_str(&json).expect("parse");
    assert_eq!(parsed, SimConfig::default());
}

#[test]
fn missing_file_is_a_read_error() {
    let err = SimConfig::load("/definitely/not/here").unwrap_err();
    assert!(matches!(err, SimError::ConfigRead { .. }));
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let err = SimConfig::from_json_str("{ \"allocation_rules\": 3 }").unwrap_err();
    assert!(matches!(err, SimError::Serialization(_)));
}

#[test]
fn min_above_max_is_rejected() {
    let mut cfg = SimConfig::default();
    cfg.shot.outcomes[1] = OutcomeCaps::new(Outcome::Miss, 10, 4);
    let err = cfg.validate().unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidCaps { roll: RollType::Shot, outcome: Outcome::Miss, min: 10, max: 4 }
    ));
}

#[test]
fn missing_outcome_is_rejected() {
    let mut cfg = SimConfig::default();
    cfg.skill_move.outcomes.retain(|c| c.outcome != Outcome::Steal);
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, SimError::MissingOutcome { roll: RollType::SkillMove, outcome: Outcome::Steal }));
}

#[test]
fn foreign_or_duplicate_outcomes_are_rejected() {
    let mut foreign = SimConfig::default();
    foreign.pass.outcomes.push(OutcomeCaps::new(Outcome::Block, 0, 2));
    assert!(matches!(
        foreign.validate().unwrap_err(),
        SimError::UnexpectedOutcome { roll: RollType::Pass, outcome: Outcome::Block }
    ));

    let mut duplicate = SimConfig::default();
    duplicate.rebound.outcomes.push(OutcomeCaps::new(Outcome::Offensive, 0, 2));
    assert!(matches!(
        duplicate.validate().unwrap_err(),
        SimError::UnexpectedOutcome { roll: RollType::Rebound, outcome: Outcome::Offensive }
    ));
}

#[test]
fn caps_that_cannot_reach_twenty_are_rejected() {
    let mut cfg = SimConfig::default();
    cfg.shot.outcomes = vec![
        OutcomeCaps::new(Outcome::Make, 0, 5),
        OutcomeCaps::new(Outcome::Miss, 0, 5),
        OutcomeCaps::new(Outcome::Block, 0, 3),
    ];
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, SimError::UnsatisfiableCaps { roll: RollType::Shot, total: 20, max_sum: 13, .. }));
}

#[test]
fn block_cap_folds_into_the_declared_caps() {
    let mut cfg = SimConfig::default();
    cfg.shot.block_cap_max = 1;
    let block = cfg
        .caps_for(RollType::Shot)
        .into_iter()
        .find(|c| c.outcome == Outcome::Block)
        .expect("block caps");
    assert_eq!(block.max_faces, 1);
}

#[test]
fn engine_refuses_an_invalid_config() {
    let mut cfg = SimConfig::default();
    cfg.timing.ball_advance.max = 30.0;
    let err = PossessionEngine::new(Arc::new(cfg)).err().expect("engine should refuse");
    assert!(matches!(err, SimError::InvalidConfig(_)));
}

#[test]
fn inverted_probability_bounds_are_rejected() {
    let mut cfg = SimConfig::default();
    cfg.pass.min_interception_probability = 0.5;
    cfg.pass.max_interception_probability = 0.1;
    assert!(matches!(cfg.validate().unwrap_err(), SimError::InvalidConfig(_)));
}

#[test]
fn negative_openness_gain_ceiling_is_rejected() {
    let mut cfg = SimConfig::default();
    cfg.skill_move.max_openness_gain = -1.0;
    assert!(matches!(cfg.validate().unwrap_err(), SimError::InvalidConfig(_)));
    assert!(PossessionEngine::new(Arc::new(cfg)).is_err());
}
