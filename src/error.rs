//! Error types for workout configuration

use thiserror::Error;

use crate::workout::MAX_ROUNDS;

/// Errors raised while building a workout from user input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkoutError {
    #[error("round count must be at least 1")]
    NoRounds,

    #[error("round count {0} exceeds the maximum of {max}", max = MAX_ROUNDS)]
    TooManyRounds(u32),

    #[error("invalid time value {0:?}")]
    InvalidTime(String),
}
