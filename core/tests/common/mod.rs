//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use hoopsim_core::{Attributes, Position, SimConfig, SimulationPlayer, SimulationTeam};
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config() -> Arc<SimConfig> {
    Arc::new(SimConfig::default())
}

/// Five players, PG through C, every rating set to `value`.
/// Player ids are `{team}-0` .. `{team}-4`.
pub fn team(id: &str, value: f64) -> SimulationTeam {
    team_with(id, 5, |_| Attributes::uniform(value))
}

/// `n` players cycling through positions, ratings from `attrs(i)`.
pub fn team_with(id: &str, n: usize, attrs: impl Fn(usize) -> Attributes) -> SimulationTeam {
    let roster = (0..n)
        .map(|i| {
            SimulationPlayer::new(
                format!("{id}-{i}"),
                format!("{id} Player {i}"),
                Position::ORDER[i % Position::ORDER.len()],
                id,
                attrs(i),
            )
        })
        .collect();
    SimulationTeam::new(id, format!("Team {id}"), roster)
}
