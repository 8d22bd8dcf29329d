//! The possession engine: runs one possession from inbound to dead ball.
//!
//! PHASES (fixed order):
//!   1. BallAdvance  bring the ball up, consume 3–7 s
//!   2. Deciding     refresh openness, ask the policy, check the clock
//!   3. Resolving    one D20 roll (two on a missed shot), clocks, modifiers
//!   4. Terminal     log the end and build the result
//!
//! Deciding and Resolving alternate until a terminal condition holds.
//!
//! RULES:
//!   - All randomness flows through the one PossessionRng seeded from the
//!     caller's seed. Same inputs, same seed, same result.
//!   - Possession state changes only through clock advancement and the
//!     modifier state machine.
//!   - Config is shared read-only; one engine may serve many threads.

use crate::{
    config::{SecondsRange, SimConfig},
    court::Court,
    decision::{most_open_teammate, Action, Decision, DecisionContext, DecisionPolicy, HeuristicPolicy},
    dice::{Outcome, RollResult},
    error::SimResult,
    event::{OpennessReading, PossessionEvent, PossessionLog, PossessionLogEntry},
    modifier::{ModifierStateMachine, StepOutcome},
    openness::OpennessCalculator,
    pass_resolver::PassResolver,
    player::SimulationTeam,
    rebound_resolver::ReboundResolver,
    result::{BoxScore, PossessionResult, TerminalReason},
    rng::PossessionRng,
    shot_resolver::ShotResolver,
    skill_move_resolver::SkillMoveResolver,
    snapshot::StateSnapshot,
    state::PossessionState,
    types::{Seconds, SlotId},
};
use std::sync::Arc;

enum Phase {
    BallAdvance,
    Deciding,
    Resolving(Decision),
    Terminal(TerminalReason),
}

/// Rolls and events produced by one resolving step, plus the outcome the
/// modifier state machine consumes.
struct StepReport {
    outcome: StepOutcome,
    entries: Vec<(RollResult, PossessionEvent, String)>,
}

pub struct PossessionEngine {
    config:    Arc<SimConfig>,
    policy:    Box<dyn DecisionPolicy>,
    openness:  OpennessCalculator,
    shot:      ShotResolver,
    skill:     SkillMoveResolver,
    pass:      PassResolver,
    rebound:   ReboundResolver,
    modifiers: ModifierStateMachine,
}

impl PossessionEngine {
    /// Engine with the default heuristic policy.
    pub fn new(config: Arc<SimConfig>) -> SimResult<Self> {
        let policy = Box::new(HeuristicPolicy::new(Arc::clone(&config)));
        Self::with_policy(config, policy)
    }

    /// Validates the config once; every possession after that trusts it.
    pub fn with_policy(config: Arc<SimConfig>, policy: Box<dyn DecisionPolicy>) -> SimResult<Self> {
        config.validate()?;
        log::debug!("possession engine ready (policy: {})", policy.name());
        Ok(Self {
            openness:  OpennessCalculator::new(Arc::clone(&config)),
            shot:      ShotResolver::new(Arc::clone(&config)),
            skill:     SkillMoveResolver::new(Arc::clone(&config)),
            pass:      PassResolver::new(Arc::clone(&config)),
            rebound:   ReboundResolver::new(Arc::clone(&config)),
            modifiers: ModifierStateMachine::new(Arc::clone(&config)),
            policy,
            config,
        })
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Simulate one possession.
    ///
    /// `ball_handler` is the player inbounding; an id not among the
    /// offense's active five falls back to the first offensive player.
    /// `quarter_time` is what is left on the game clock.
    pub fn simulate(
        &self,
        offense: &SimulationTeam,
        defense: &SimulationTeam,
        ball_handler: &str,
        seed: u64,
        quarter_time: Seconds,
    ) -> SimResult<PossessionResult> {
        let court = Court::new(offense, defense)?;
        let handler = court.find_offense(ball_handler).unwrap_or_else(|| {
            log::warn!(
                "ball handler '{ball_handler}' is not on the floor for {}, starting with {}",
                offense.id,
                court.name(SlotId(0))
            );
            SlotId(0)
        });

        let mut rng = PossessionRng::new(seed);
        let mut state = PossessionState::new(&court, handler, self.config.timing.shot_clock_seconds, quarter_time);
        let mut journal = PossessionLog::new();
        let mut box_score = BoxScore::new(&court);
        let mut steps: u32 = 0;
        let mut offensive_rebound = false;
        let mut new_ball_handler: Option<SlotId> = None;

        log::debug!(
            "possession {} vs {} seed={seed} quarter={:.1}s handler={}",
            offense.id,
            defense.id,
            state.quarter_time(),
            court.name(handler)
        );

        let mut phase = Phase::BallAdvance;
        let reason = loop {
            phase = match phase {
                Phase::BallAdvance => {
                    let range = self.config.timing.ball_advance;
                    let seconds = state.clock.advance(rng.range_f64(range.min, range.max));
                    let description = format!("{} brings the ball up ({seconds:.1}s)", court.name(state.ball_handler));
                    let event = PossessionEvent::BallAdvanced { seconds };
                    journal.push(self.entry(&court, &state, None, Vec::new(), None, event, description));
                    if state.clock.quarter_expired() {
                        Phase::Terminal(TerminalReason::QuarterExpired)
                    } else {
                        Phase::Deciding
                    }
                }

                Phase::Deciding => {
                    if steps >= self.config.timing.max_resolving_steps {
                        log::warn!("possession hit the {steps}-step guard, ending it");
                        Phase::Terminal(TerminalReason::StepLimit)
                    } else {
                        self.refresh_openness(&court, &mut state, &mut rng);
                        let proposed = self.policy.decide(&DecisionContext::new(&court, &state), &mut rng);
                        let decision = validate_decision(&court, &state, proposed);
                        let needed = self.duration_range(decision.action).estimate();
                        if state.quarter_time() < needed {
                            log::debug!(
                                "{:?} needs ~{needed:.1}s, only {:.1}s left",
                                decision.action,
                                state.quarter_time()
                            );
                            Phase::Terminal(TerminalReason::InsufficientTime)
                        } else {
                            Phase::Resolving(decision)
                        }
                    }
                }

                Phase::Resolving(decision) => {
                    steps += 1;
                    let handler_name = court.name(state.ball_handler).to_string();
                    let readings = openness_readings(&court, &state);

                    let report = match decision.action {
                        Action::Shoot => self.resolve_shot(&court, &state, &mut rng, &mut box_score)?,
                        Action::Pass => self.resolve_pass(&court, &state, decision.target, &mut rng, &mut box_score)?,
                        Action::SkillMove => self.resolve_skill_move(&court, &state, &mut rng, &mut box_score)?,
                    };

                    let range = self.duration_range(decision.action);
                    state.clock.advance(rng.range_f64(range.min, range.max));
                    state = self.modifiers.apply(&court, state, &report.outcome);

                    if let StepOutcome::Rebound { offensive: true, .. } = report.outcome {
                        offensive_rebound = true;
                    }
                    if let Some(slot) = possession_change(&report.outcome) {
                        new_ball_handler = Some(slot);
                    }

                    let snapshot = StateSnapshot::capture(&state, &court);
                    let mut decision = Some(decision);
                    for (roll, event, description) in report.entries {
                        journal.push(PossessionLogEntry {
                            step: 0,
                            ball_handler: handler_name.clone(),
                            decision: decision.take(),
                            openness: readings.clone(),
                            roll: Some(roll),
                            event,
                            description,
                            state: snapshot.clone(),
                        });
                    }

                    match terminal_after_step(&report.outcome, &state) {
                        Some(TerminalReason::ShotClockViolation) => {
                            box_score.line_mut(state.ball_handler).turnovers += 1;
                            Phase::Terminal(TerminalReason::ShotClockViolation)
                        }
                        Some(reason) => Phase::Terminal(reason),
                        None => Phase::Deciding,
                    }
                }

                Phase::Terminal(reason) => break reason,
            };
        };

        journal.push(self.entry(
            &court,
            &state,
            None,
            Vec::new(),
            None,
            PossessionEvent::PossessionEnded { reason },
            format!("Possession over: {reason}"),
        ));

        let points = match reason {
            TerminalReason::Score { points } => points,
            _ => 0,
        };
        log::debug!(
            "possession done: {reason} after {steps} steps, {:.1}s used",
            state.clock.elapsed
        );

        Ok(PossessionResult {
            seed,
            offense_team: offense.id.clone(),
            defense_team: defense.id.clone(),
            policy: self.policy.name().to_string(),
            events: journal.into_entries(),
            points,
            turnover: reason.is_turnover(),
            offensive_rebound,
            new_ball_handler: new_ball_handler.map(|s| court.player(s).id.clone()),
            duration: state.clock.elapsed,
            quarter_time_remaining: state.quarter_time(),
            resolving_steps: steps,
            terminal_reason: reason,
            box_score: box_score.finish(),
        })
    }

    fn duration_range(&self, action: Action) -> SecondsRange {
        let t = &self.config.timing;
        match action {
            Action::Shoot     => t.shoot,
            Action::Pass      => t.pass,
            Action::SkillMove => t.skill_move,
        }
    }

    /// Recompute every attacker's openness. Skill-move boosts survive the
    /// recomputation until the player gives up the ball.
    fn refresh_openness(&self, court: &Court<'_>, state: &mut PossessionState, rng: &mut PossessionRng) {
        for slot in court.offense() {
            let base = self.openness.calculate(
                court.player(slot),
                court.player(court.defender_of(slot)),
                state.pass_count,
                state.defensive_breakdown,
                state.fatigue_of(slot),
                rng,
            );
            let i = slot.index();
            state.openness[i] = (f64::from(base) + state.openness_boost[i]).clamp(0.0, 100.0);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn entry(
        &self,
        court: &Court<'_>,
        state: &PossessionState,
        decision: Option<Decision>,
        openness: Vec<OpennessReading>,
        roll: Option<RollResult>,
        event: PossessionEvent,
        description: String,
    ) -> PossessionLogEntry {
        PossessionLogEntry {
            step: 0,
            ball_handler: court.name(state.ball_handler).to_string(),
            decision,
            openness,
            roll,
            event,
            description,
            state: StateSnapshot::capture(state, court),
        }
    }

    // ── Resolving steps ─────────────────────────────────────────────

    fn resolve_shot(
        &self,
        court: &Court<'_>,
        state: &PossessionState,
        rng: &mut PossessionRng,
        box_score: &mut BoxScore,
    ) -> SimResult<StepReport> {
        let shot = self.shot.resolve(court, state, rng)?;
        let shooter = court.player(shot.shooter);
        box_score.record_shot(shot.shooter, shot.three_pointer, shot.points);

        let kind = if shot.three_pointer { "three" } else { "two" };
        let description = match (shot.roll.outcome, shot.blocker) {
            (Outcome::Make, _) => format!("{} hits the {kind} (+{})", shooter.name, shot.points),
            (Outcome::Block, Some(b)) => format!("{} blocks {}'s {kind}", court.name(b), shooter.name),
            _ => format!("{} misses the {kind}", shooter.name),
        };
        if shot.points > 0 {
            if let Some(passer) = state.last_passer {
                box_score.line_mut(passer).assists += 1;
            }
        }
        if let Some(b) = shot.blocker {
            box_score.line_mut(b).blocks += 1;
        }

        let event = PossessionEvent::ShotAttempted {
            shooter:       shooter.id.clone(),
            three_pointer: shot.three_pointer,
            outcome:       shot.roll.outcome,
            points:        shot.points,
            blocker:       shot.blocker.map(|b| court.player(b).id.clone()),
        };
        let mut entries = vec![(shot.roll, event, description)];

        if !shot.triggers_rebound {
            return Ok(StepReport { outcome: StepOutcome::ShotMade { points: shot.points }, entries });
        }

        let rebound = self.rebound.resolve(court, rng)?;
        let rebounder = court.player(rebound.rebounder);
        let line = box_score.line_mut(rebound.rebounder);
        let description = if rebound.offensive {
            line.offensive_rebounds += 1;
            format!("{} grabs the offensive rebound", rebounder.name)
        } else {
            line.defensive_rebounds += 1;
            format!("{} pulls down the defensive rebound", rebounder.name)
        };
        entries.push((
            rebound.roll,
            PossessionEvent::Rebounded { rebounder: rebounder.id.clone(), offensive: rebound.offensive },
            description,
        ));

        Ok(StepReport {
            outcome: StepOutcome::Rebound { offensive: rebound.offensive, rebounder: rebound.rebounder },
            entries,
        })
    }

    fn resolve_pass(
        &self,
        court: &Court<'_>,
        state: &PossessionState,
        target: Option<SlotId>,
        rng: &mut PossessionRng,
        box_score: &mut BoxScore,
    ) -> SimResult<StepReport> {
        let pass = self.pass.resolve(court, state, target, rng)?;
        let (passer, receiver) = (court.player(pass.passer), court.player(pass.target));

        let (outcome, description) = match pass.interceptor {
            Some(i) => {
                box_score.line_mut(pass.passer).turnovers += 1;
                box_score.line_mut(i).steals += 1;
                (
                    StepOutcome::Intercepted { interceptor: i },
                    format!("{} jumps the pass from {} to {}", court.name(i), passer.name, receiver.name),
                )
            }
            None => (
                StepOutcome::PassCompleted { passer: pass.passer, target: pass.target },
                format!("{} finds {}", passer.name, receiver.name),
            ),
        };

        let event = PossessionEvent::PassAttempted {
            passer:      passer.id.clone(),
            target:      receiver.id.clone(),
            outcome:     pass.roll.outcome,
            interceptor: pass.interceptor.map(|i| court.player(i).id.clone()),
        };
        Ok(StepReport { outcome, entries: vec![(pass.roll, event, description)] })
    }

    fn resolve_skill_move(
        &self,
        court: &Court<'_>,
        state: &PossessionState,
        rng: &mut PossessionRng,
        box_score: &mut BoxScore,
    ) -> SimResult<StepReport> {
        let handler = state.ball_handler;
        let mv = self.skill.resolve(court, state, rng)?;
        let (player, defender) = (court.player(handler), court.player(mv.defender));

        let (outcome, description) = match (mv.roll.outcome, mv.stealer) {
            (Outcome::Success, _) => (
                StepOutcome::SkillMoveSucceeded { openness_gain: mv.openness_gain },
                format!("{} shakes {} (+{:.0} openness)", player.name, defender.name, mv.openness_gain),
            ),
            (Outcome::Steal, Some(s)) => {
                box_score.line_mut(handler).turnovers += 1;
                box_score.line_mut(s).steals += 1;
                (StepOutcome::Stolen { stealer: s }, format!("{} strips {}", court.name(s), player.name))
            }
            _ => (StepOutcome::SkillMoveFailed, format!("{} can't get past {}", player.name, defender.name)),
        };

        let event = PossessionEvent::SkillMoveAttempted {
            player:        player.id.clone(),
            outcome:       mv.roll.outcome,
            openness_gain: mv.openness_gain,
            stealer:       mv.stealer.map(|s| court.player(s).id.clone()),
        };
        Ok(StepReport { outcome, entries: vec![(mv.roll, event, description)] })
    }
}

/// Passes need a real teammate. A bad target is swapped for the most open
/// one; with no teammate at all the handler shoots instead.
fn validate_decision(court: &Court<'_>, state: &PossessionState, decision: Decision) -> Decision {
    if decision.action != Action::Pass {
        return Decision { target: None, ..decision };
    }
    let valid = decision.target.filter(|&t| court.is_offense(t) && t != state.ball_handler);
    match valid.or_else(|| most_open_teammate(court, state)) {
        Some(target) => Decision { target: Some(target), ..decision },
        None => Decision::shoot("no teammate to pass to"),
    }
}

/// Terminal checks in priority order: score, turnover, defensive
/// rebound, shot clock, quarter clock. An offensive rebound keeps the
/// possession alive unless a clock ran out.
fn terminal_after_step(outcome: &StepOutcome, state: &PossessionState) -> Option<TerminalReason> {
    match *outcome {
        StepOutcome::ShotMade { points } => return Some(TerminalReason::Score { points }),
        StepOutcome::Intercepted { .. } => return Some(TerminalReason::Interception),
        StepOutcome::Stolen { .. } => return Some(TerminalReason::Steal),
        StepOutcome::Rebound { offensive: false, .. } => return Some(TerminalReason::DefensiveRebound),
        _ => {}
    }
    if state.clock.shot_clock_expired() {
        return Some(TerminalReason::ShotClockViolation);
    }
    if state.clock.quarter_expired() {
        return Some(TerminalReason::QuarterExpired);
    }
    None
}

/// Defender who takes the ball over live, if any.
fn possession_change(outcome: &StepOutcome) -> Option<SlotId> {
    match *outcome {
        StepOutcome::Intercepted { interceptor } => Some(interceptor),
        StepOutcome::Stolen { stealer } => Some(stealer),
        StepOutcome::Rebound { offensive: false, rebounder } => Some(rebounder),
        _ => None,
    }
}

fn openness_readings(court: &Court<'_>, state: &PossessionState) -> Vec<OpennessReading> {
    court
        .offense()
        .map(|s| OpennessReading { player_id: court.player(s).id.clone(), openness: state.openness_of(s) })
        .collect()
}
