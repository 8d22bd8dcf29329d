//! The D20 engine. Turns a probability map into a fixed pool of faces
//! and resolves an outcome with a single draw.
//!
//! ALGORITHM (shared, unmodified, by every resolver):
//!   1. raw_share = p × total_faces, base = floor(raw_share)
//!   2. leftover faces go one at a time to the largest fractional part,
//!      ties broken by declared order (fractional_priority)
//!   3. counts are clamped into [min_faces, max_faces]; the difference is
//!      pushed onto the highest-priority outcome with room (or pulled from
//!      the lowest-priority outcome with slack)
//!   4. face = floor(next_f64 × total) + 1, buckets walked in declared order
//!
//! RULE: a final sum that is not exactly total_faces is a bug, reported as
//! SimError::AllocationInvariant and never papered over.

use crate::{
    config::{AllocationRules, FractionalPriority, OutcomeCaps},
    error::{SimError, SimResult},
    rng::PossessionRng,
    types::PlayerId,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which resolver a roll belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollType {
    Shot,
    SkillMove,
    Pass,
    Rebound,
}

impl RollType {
    /// Outcomes a roll of this type can resolve to. Every configured
    /// outcome list must contain exactly these.
    pub fn outcomes(self) -> &'static [Outcome] {
        match self {
            Self::Shot      => &[Outcome::Make, Outcome::Miss, Outcome::Block],
            Self::SkillMove => &[Outcome::Success, Outcome::Failure, Outcome::Steal],
            Self::Pass      => &[Outcome::Complete, Outcome::Intercepted],
            Self::Rebound   => &[Outcome::Offensive, Outcome::Defensive],
        }
    }
}

/// Bucket labels across all roll types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    // Shot
    Make,
    Miss,
    Block,
    // Skill move
    Success,
    Failure,
    Steal,
    // Pass
    Complete,
    Intercepted,
    // Rebound
    Offensive,
    Defensive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBucket {
    pub outcome: Outcome,
    pub faces:   u32,
}

/// Outcome → face count, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceAllocation {
    pub roll:        RollType,
    pub total_faces: u32,
    pub buckets:     Vec<FaceBucket>,
}

impl FaceAllocation {
    pub fn faces_for(&self, outcome: Outcome) -> u32 {
        self.buckets
            .iter()
            .find(|b| b.outcome == outcome)
            .map(|b| b.faces)
            .unwrap_or(0)
    }

    pub fn sum(&self) -> u32 {
        self.buckets.iter().map(|b| b.faces).sum()
    }

    /// Resolve a 1-indexed face by walking buckets in declared order.
    /// Faces past the end land in the last non-empty bucket.
    /// Panics on an allocation with no buckets, which validated
    /// configs cannot produce.
    pub fn outcome_for_face(&self, face: u32) -> Outcome {
        assert!(!self.buckets.is_empty(), "outcome_for_face() on empty allocation");
        let mut upper = 0;
        for bucket in &self.buckets {
            upper += bucket.faces;
            if face <= upper && bucket.faces > 0 {
                return bucket.outcome;
            }
        }
        let last = self
            .buckets
            .iter()
            .rev()
            .find(|b| b.faces > 0)
            .unwrap_or(&self.buckets[self.buckets.len() - 1]);
        last.outcome
    }
}

/// Probability values kept on a roll for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbability {
    pub outcome:    Outcome,
    /// As produced by the resolver.
    pub raw:        f64,
    /// After renormalisation to a distribution.
    pub normalized: f64,
}

/// Resolver-specific details of a roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollPayload {
    Shot {
        three_pointer: bool,
        points:        u32,
        blocker:       Option<PlayerId>,
    },
    SkillMove {
        openness_gain: f64,
        stealer:       Option<PlayerId>,
    },
    Pass {
        target:      PlayerId,
        interceptor: Option<PlayerId>,
    },
    Rebound {
        rebounder: PlayerId,
        offensive: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollResult {
    pub roll:          RollType,
    pub face:          u32,
    pub outcome:       Outcome,
    pub allocation:    FaceAllocation,
    pub probabilities: Vec<OutcomeProbability>,
    pub payload:       RollPayload,
}

/// The outcome of one allocate-and-draw, before a resolver attaches
/// its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DiceRoll {
    pub face:          u32,
    pub outcome:       Outcome,
    pub allocation:    FaceAllocation,
    pub probabilities: Vec<OutcomeProbability>,
}

impl DiceRoll {
    pub fn into_result(self, roll: RollType, payload: RollPayload) -> RollResult {
        RollResult {
            roll,
            face:          self.face,
            outcome:       self.outcome,
            allocation:    self.allocation,
            probabilities: self.probabilities,
            payload,
        }
    }
}

/// Base/scale transform shared by openness and every resolver:
/// `clamp(base + raw × scale, 0, 100) / 100`, then clamped into the
/// configured probability bounds.
pub fn scale_probability(base: f64, raw: f64, scale: f64, min: f64, max: f64) -> f64 {
    let percent = (base + raw * scale).clamp(0.0, 100.0);
    (percent / 100.0).clamp(min, max)
}

#[derive(Debug, Clone, Copy)]
pub struct FaceAllocator {
    rules: AllocationRules,
}

impl FaceAllocator {
    pub fn new(rules: AllocationRules) -> Self {
        Self { rules }
    }

    pub fn total_faces(&self) -> u32 {
        self.rules.d20_total_faces
    }

    /// Allocate `total_faces` across the outcomes declared in `caps`.
    /// `probabilities` is looked up per outcome; absent outcomes get 0.
    pub fn allocate(
        &self,
        roll: RollType,
        probabilities: &[(Outcome, f64)],
        caps: &[OutcomeCaps],
    ) -> SimResult<FaceAllocation> {
        if let Some(bad) = caps.iter().find(|c| c.min_faces > c.max_faces) {
            return Err(SimError::InvalidCaps {
                roll,
                outcome: bad.outcome,
                min:     bad.min_faces,
                max:     bad.max_faces,
            });
        }
        let total = self.rules.d20_total_faces;
        let (_, normalized) = normalize(probabilities, caps);

        let shares: Vec<f64> = normalized.iter().map(|p| p * total as f64).collect();
        let mut faces: Vec<u32> = shares.iter().map(|s| s.floor() as u32).collect();

        // Largest remainder first.
        let assigned: u32 = faces.iter().sum();
        let leftover = total.saturating_sub(assigned) as usize;
        let mut by_fraction: Vec<usize> = (0..caps.len()).collect();
        by_fraction.sort_by(|&a, &b| {
            let fa = shares[a] - shares[a].floor();
            let fb = shares[b] - shares[b].floor();
            fb.partial_cmp(&fa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.declared_order(a, b))
        });
        for &i in by_fraction.iter().cycle().take(leftover) {
            faces[i] += 1;
        }

        for (count, cap) in faces.iter_mut().zip(caps) {
            *count = (*count).clamp(cap.min_faces, cap.max_faces);
        }
        self.redistribute(&mut faces, caps, total);

        let allocation = FaceAllocation {
            roll,
            total_faces: total,
            buckets: caps
                .iter()
                .zip(&faces)
                .map(|(cap, &faces)| FaceBucket { outcome: cap.outcome, faces })
                .collect(),
        };

        let actual = allocation.sum();
        if actual != total {
            return Err(SimError::AllocationInvariant { roll, expected: total, actual });
        }
        log::trace!("{roll:?} allocation: {:?}", allocation.buckets);
        Ok(allocation)
    }

    /// Draw one face and resolve it against `allocation`.
    pub fn roll(&self, allocation: &FaceAllocation, rng: &mut PossessionRng) -> (u32, Outcome) {
        let total = allocation.total_faces.max(1);
        let face = ((rng.next_f64() * total as f64).floor() as u32 + 1).min(total);
        (face, allocation.outcome_for_face(face))
    }

    pub fn allocate_and_roll(
        &self,
        roll: RollType,
        probabilities: &[(Outcome, f64)],
        caps: &[OutcomeCaps],
        rng: &mut PossessionRng,
    ) -> SimResult<DiceRoll> {
        let allocation = self.allocate(roll, probabilities, caps)?;
        let (face, outcome) = self.roll(&allocation, rng);
        let (raw, normalized) = normalize(probabilities, caps);
        let probabilities = caps
            .iter()
            .enumerate()
            .map(|(i, cap)| OutcomeProbability {
                outcome:    cap.outcome,
                raw:        raw[i],
                normalized: normalized[i],
            })
            .collect();
        Ok(DiceRoll { face, outcome, allocation, probabilities })
    }

    /// Ordering of two declared indices under the configured priority:
    /// the outcome that sorts first wins ties and receives surplus faces.
    fn declared_order(&self, a: usize, b: usize) -> Ordering {
        match self.rules.fractional_priority {
            FractionalPriority::Desc => a.cmp(&b),
            FractionalPriority::Asc  => b.cmp(&a),
        }
    }

    fn redistribute(&self, faces: &mut [u32], caps: &[OutcomeCaps], total: u32) {
        let mut priority: Vec<usize> = (0..caps.len()).collect();
        priority.sort_by(|&a, &b| self.declared_order(a, b));

        let mut current: u32 = faces.iter().sum();
        while current < total {
            match priority.iter().copied().find(|&i| faces[i] < caps[i].max_faces) {
                Some(i) => {
                    faces[i] += 1;
                    current += 1;
                }
                None => break,
            }
        }
        while current > total {
            match priority.iter().rev().copied().find(|&i| faces[i] > caps[i].min_faces) {
                Some(i) => {
                    faces[i] -= 1;
                    current -= 1;
                }
                None => break,
            }
        }
    }
}

/// Raw probability per declared outcome, and the same values
/// renormalised to sum to one (uniform when everything is zero).
fn normalize(probabilities: &[(Outcome, f64)], caps: &[OutcomeCaps]) -> (Vec<f64>, Vec<f64>) {
    let raw: Vec<f64> = caps
        .iter()
        .map(|cap| {
            probabilities
                .iter()
                .find(|(o, _)| *o == cap.outcome)
                .map(|(_, p)| *p)
                .unwrap_or(0.0)
        })
        .collect();
    let clean: Vec<f64> = raw
        .iter()
        .map(|p| if p.is_finite() { p.max(0.0) } else { 0.0 })
        .collect();
    let sum: f64 = clean.iter().sum();
    let normalized = if sum > 0.0 {
        clean.iter().map(|p| p / sum).collect()
    } else {
        vec![1.0 / caps.len().max(1) as f64; caps.len()]
    };
    (raw, normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_probability_clamps_to_bounds() {
        assert_eq!(scale_probability(50.0, 0.0, 0.5, 0.0, 1.0), 0.5);
        assert_eq!(scale_probability(50.0, 500.0, 1.0, 0.0, 0.85), 0.85);
        assert_eq!(scale_probability(50.0, -500.0, 1.0, 0.05, 1.0), 0.05);
    }

    #[test]
    fn face_walk_follows_declared_order() {
        let allocation = FaceAllocation {
            roll:        RollType::Shot,
            total_faces: 20,
            buckets:     vec![
                FaceBucket { outcome: Outcome::Make,  faces: 12 },
                FaceBucket { outcome: Outcome::Miss,  faces: 0 },
                FaceBucket { outcome: Outcome::Block, faces: 8 },
            ],
        };
        assert_eq!(allocation.outcome_for_face(1), Outcome::Make);
        assert_eq!(allocation.outcome_for_face(12), Outcome::Make);
        assert_eq!(allocation.outcome_for_face(13), Outcome::Block);
        assert_eq!(allocation.outcome_for_face(20), Outcome::Block);
    }
}
