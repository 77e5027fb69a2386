// Library surface for the binary and for headless/integration tests.
// Terminal rendering and key handling stay in the binary.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod round;
pub mod runtime;
pub mod telemetry;
pub mod time_mask;
pub mod workout;

pub use error::WorkoutError;
pub use round::{CountDirection, DisplayTime, Round, RoundKind};
pub use workout::{WorkoutConfig, WorkoutSet, WorkoutState};
