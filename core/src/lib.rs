pub mod clock;
pub mod config;
pub mod court;
pub mod decision;
pub mod dice;
pub mod engine;
pub mod error;
pub mod event;
pub mod modifier;
pub mod openness;
pub mod pass_resolver;
pub mod player;
pub mod rebound_resolver;
pub mod result;
pub mod rng;
pub mod shot_resolver;
pub mod skill_move_resolver;
pub mod snapshot;
pub mod state;
pub mod types;

pub use config::SimConfig;
pub use engine::PossessionEngine;
pub use error::{SimError, SimResult};
pub use player::{Attributes, Position, SimulationPlayer, SimulationTeam};
pub use result::{PossessionResult, TerminalReason};
