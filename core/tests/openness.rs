mod common;

use common::config;
use hoopsim_core::{
    openness::OpennessCalculator,
    rng::PossessionRng,
    state::Fatigue,
    Attributes, Position, SimulationPlayer,
};

fn player(id: &str, value: f64) -> SimulationPlayer {
    SimulationPlayer::new(id, id, Position::ShootingGuard, "T", Attributes::uniform(value))
}

#[test]
fn evenly_matched_players_sit_at_the_base_value() {
    let calc = OpennessCalculator::new(config());
    let (attacker, defender) = (player("a", 60.0), player("d", 60.0));

    let base = calc.base_openness(&attacker, &defender, 0, 0.0, Fatigue::default());
    assert!((base - 50.0).abs() < 1e-9, "expected 50, got {base}");

    let mut rng = PossessionRng::new(42);
    for _ in 0..200 {
        let value = calc.calculate(&attacker, &defender, 0, 0.0, Fatigue::default(), &mut rng);
        assert!((40..=60).contains(&value), "variance escaped its bounds: {value}");
    }
}

#[test]
fn openness_stays_in_range_for_extreme_matchups() {
    let calc = OpennessCalculator::new(config());
    let mut rng = PossessionRng::new(3);
    let (star, scrub) = (player("s", 100.0), player("x", 0.0));
    for _ in 0..100 {
        let wide_open = calc.calculate(&star, &scrub, 10, 1.0, Fatigue::default(), &mut rng);
        let smothered = calc.calculate(&scrub, &star, 0, 0.0, Fatigue::default(), &mut rng);
        assert!((90..=100).contains(&wide_open), "{wide_open}");
        assert!(smothered <= 10, "{smothered}");
    }
}

#[test]
fn fatigue_closes_the_gap() {
    let calc = OpennessCalculator::new(config());
    let (attacker, defender) = (player("a", 80.0), player("d", 60.0));
    let fresh = calc.base_openness(&attacker, &defender, 0, 0.0, Fatigue::default());
    let tired = calc.base_openness(&attacker, &defender, 0, 0.0, Fatigue { decay: 0.4, speed_penalty: 10.0 });
    assert!(tired < fresh);
}

#[test]
fn same_seed_same_openness() {
    let calc = OpennessCalculator::new(config());
    let (attacker, defender) = (player("a", 70.0), player("d", 55.0));
    let mut a = PossessionRng::new(11);
    let mut b = PossessionRng::new(11);
    for _ in 0..20 {
        assert_eq!(
            calc.calculate(&attacker, &defender, 1, 0.15, Fatigue::default(), &mut a),
            calc.calculate(&attacker, &defender, 1, 0.15, Fatigue::default(), &mut b),
        );
    }
}
