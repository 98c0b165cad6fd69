//! Error types for the crate

use thiserror::Error;

/// Main error type for the crate
///
/// Configuration errors are raised before any episode runs; contract
/// violations abort a run in progress and carry the episode and step at
/// which the environment broke its contract.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid hyperparameter `{name}`: {value} (expected {expected})")]
    InvalidHyperparameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("`{name}` must be positive")]
    ZeroBudget { name: &'static str },

    #[error("num_episodes ({num_episodes}) is not divisible by block_size ({block_size})")]
    BlockSizeMismatch {
        num_episodes: usize,
        block_size: usize,
    },

    #[error(
        "environment returned state {state} outside domain of {state_space_size} states \
         (episode {episode}, step {step})"
    )]
    StateOutOfDomain {
        state: usize,
        state_space_size: usize,
        episode: usize,
        step: usize,
    },

    #[error(
        "environment returned action {action} outside domain of {action_space_size} actions \
         (episode {episode}, step {step})"
    )]
    ActionOutOfDomain {
        action: usize,
        action_space_size: usize,
        episode: usize,
        step: usize,
    },

    #[error("no valid actions for non-terminal state {state} (episode {episode}, step {step})")]
    NoValidActions {
        state: usize,
        episode: usize,
        step: usize,
    },

    #[error("decay schedule requires initial value {vi} >= final value {vf} for rate {rate}")]
    InvalidDecay { rate: f64, vi: f64, vf: f64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
