use hoopsim_core::{
    config::{AllocationRules, FractionalPriority, OutcomeCaps, RoundingMethod},
    dice::{FaceAllocator, Outcome, RollType},
    rng::PossessionRng,
    SimConfig, SimError,
};

fn allocator(priority: FractionalPriority) -> FaceAllocator {
    FaceAllocator::new(AllocationRules {
        d20_total_faces:     20,
        rounding_method:     RoundingMethod::FloorThenRemainder,
        fractional_priority: priority,
    })
}

fn open_caps() -> Vec<OutcomeCaps> {
    vec![
        OutcomeCaps::new(Outcome::Make, 0, 20),
        OutcomeCaps::new(Outcome::Miss, 0, 20),
        OutcomeCaps::new(Outcome::Block, 0, 20),
    ]
}

fn faces(priority: FractionalPriority, probs: [f64; 3], caps: &[OutcomeCaps]) -> Vec<u32> {
    let p = [(Outcome::Make, probs[0]), (Outcome::Miss, probs[1]), (Outcome::Block, probs[2])];
    allocator(priority)
        .allocate(RollType::Shot, &p, caps)
        .expect("allocation")
        .buckets
        .iter()
        .map(|b| b.faces)
        .collect()
}

#[test]
fn leftover_face_goes_to_largest_remainder() {
    assert_eq!(faces(FractionalPriority::Desc, [0.625, 0.3125, 0.0625], &open_caps()), vec![13, 6, 1]);
}

#[test]
fn equal_remainders_split_in_declared_order() {
    assert_eq!(faces(FractionalPriority::Desc, [0.4375, 0.4375, 0.125], &open_caps()), vec![9, 9, 2]);
}

#[test]
fn fractional_priority_breaks_ties() {
    let probs = [0.375, 0.375, 0.25];
    assert_eq!(faces(FractionalPriority::Desc, probs, &open_caps()), vec![8, 7, 5]);
    assert_eq!(faces(FractionalPriority::Asc, probs, &open_caps()), vec![7, 8, 5]);
}

#[test]
fn clamped_faces_move_to_highest_priority_outcome() {
    let caps = SimConfig::default().caps_for(RollType::Shot);
    // Block wants 19 faces but is capped at 3; miss is lifted to its minimum.
    assert_eq!(faces(FractionalPriority::Desc, [0.0625, 0.0, 0.9375], &caps), vec![16, 1, 3]);
}

#[test]
fn all_zero_probabilities_fall_back_to_uniform() {
    assert_eq!(faces(FractionalPriority::Desc, [0.0, 0.0, 0.0], &open_caps()), vec![7, 7, 6]);
}

#[test]
fn faces_always_sum_to_twenty_within_caps() {
    let config = SimConfig::default();
    let allocator = FaceAllocator::new(config.allocation_rules);
    let mut rng = PossessionRng::new(99);

    for roll in [RollType::Shot, RollType::SkillMove, RollType::Pass, RollType::Rebound] {
        let caps = config.caps_for(roll);
        for _ in 0..500 {
            let probs: Vec<(Outcome, f64)> = roll.outcomes().iter().map(|&o| (o, rng.next_f64())).collect();
            let allocation = allocator.allocate(roll, &probs, &caps).expect("allocation");
            assert_eq!(allocation.sum(), 20);
            for (bucket, cap) in allocation.buckets.iter().zip(&caps) {
                assert_eq!(bucket.outcome, cap.outcome);
                assert!(
                    (cap.min_faces..=cap.max_faces).contains(&bucket.faces),
                    "{roll:?}/{:?} got {} faces outside [{}, {}]",
                    bucket.outcome,
                    bucket.faces,
                    cap.min_faces,
                    cap.max_faces
                );
            }

            let (face, outcome) = allocator.roll(&allocation, &mut rng);
            assert!((1..=20).contains(&face));
            assert!(allocation.faces_for(outcome) > 0);
        }
    }
}

#[test]
fn unsatisfiable_caps_are_an_invariant_error() {
    let caps = vec![OutcomeCaps::new(Outcome::Complete, 0, 5), OutcomeCaps::new(Outcome::Intercepted, 0, 5)];
    let err = allocator(FractionalPriority::Desc)
        .allocate(RollType::Pass, &[(Outcome::Complete, 0.9), (Outcome::Intercepted, 0.1)], &caps)
        .unwrap_err();
    assert!(matches!(err, SimError::AllocationInvariant { expected: 20, actual: 10, .. }));
}

#[test]
fn inverted_caps_are_refused_instead_of_clamped() {
    let caps = vec![OutcomeCaps::new(Outcome::Complete, 12, 4), OutcomeCaps::new(Outcome::Intercepted, 0, 20)];
    let err = allocator(FractionalPriority::Desc)
        .allocate(RollType::Pass, &[(Outcome::Complete, 0.9), (Outcome::Intercepted, 0.1)], &caps)
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidCaps { roll: RollType::Pass, outcome: Outcome::Complete, min: 12, max: 4 }
    ));
}

#[test]
fn roll_records_raw_and_normalized_probabilities() {
    let config = SimConfig::default();
    let allocator = FaceAllocator::new(config.allocation_rules);
    let mut rng = PossessionRng::new(1);
    let dice = allocator
        .allocate_and_roll(
            RollType::Pass,
            &[(Outcome::Complete, 0.45), (Outcome::Intercepted, 0.05)],
            &config.caps_for(RollType::Pass),
            &mut rng,
        )
        .expect("roll");
    assert_eq!(dice.probabilities.len(), 2);
    assert_eq!(dice.probabilities[0].raw, 0.45);
    assert!((dice.probabilities[0].normalized - 0.9).abs() < 1e-12);
    assert_eq!(dice.allocation.faces_for(Outcome::Complete), 18);
    assert_eq!(dice.allocation.faces_for(Outcome::Intercepted), 2);
}
