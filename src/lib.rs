/// Implemented tabular TD control algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Testing environments
pub mod gym;

/// Episode and block reward recording
pub mod record;

/// Value tables
pub mod table;

/// Training loop
pub mod trainer;

pub use error::{Error, Result};
