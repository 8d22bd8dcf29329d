use thiserror::Error;

use crate::dice::{Outcome, RollType};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot read config {path}: {source}")]
    ConfigRead {
        path:   String,
        source: std::io::Error,
    },

    #[error("Invalid caps for {roll:?}/{outcome:?}: min_faces {min} > max_faces {max}")]
    InvalidCaps {
        roll:    RollType,
        outcome: Outcome,
        min:     u32,
        max:     u32,
    },

    #[error("{roll:?} outcome list is missing {outcome:?}")]
    MissingOutcome { roll: RollType, outcome: Outcome },

    #[error("{roll:?} outcome list declares {outcome:?} which it cannot produce (or declares it twice)")]
    UnexpectedOutcome { roll: RollType, outcome: Outcome },

    #[error("{roll:?} caps cannot sum to {total} faces (min sum {min_sum}, max sum {max_sum})")]
    UnsatisfiableCaps {
        roll:    RollType,
        total:   u32,
        min_sum: u32,
        max_sum: u32,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Face allocation for {roll:?} summed to {actual}, expected {expected}")]
    AllocationInvariant {
        roll:     RollType,
        expected: u32,
        actual:   u32,
    },

    #[error("Team '{team}' has no players to put on court")]
    EmptyLineup { team: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
