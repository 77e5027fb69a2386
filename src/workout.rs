use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::WorkoutError;
use crate::round::{CountDirection, DisplayTime, Round, RoundKind, COUNTDOWN_SECS};

/// Round labels are rendered with two digits
pub const MAX_ROUNDS: u32 = 99;

/// Parameters of a single workout run. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    pub round_count: u32,
    pub time_per_round: u32,
    pub rest_time_between_rounds: u32,
    pub count_direction: CountDirection,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            round_count: 1,
            time_per_round: 60,
            rest_time_between_rounds: 0,
            count_direction: CountDirection::Down,
        }
    }
}

impl WorkoutConfig {
    pub fn validate(&self) -> Result<(), WorkoutError> {
        match self.round_count {
            0 => Err(WorkoutError::NoRounds),
            n if n > MAX_ROUNDS => Err(WorkoutError::TooManyRounds(n)),
            _ => Ok(()),
        }
    }

    /// Scheduled length of the whole run including the countdown
    pub fn total_secs(&self) -> u64 {
        let per_round = self.time_per_round as u64 + self.rest_time_between_rounds as u64;
        COUNTDOWN_SECS as u64 + self.round_count as u64 * per_round
    }

    fn build_rounds(&self) -> Vec<Round> {
        let mut rounds = vec![Round::countdown()];

        for number in 1..=self.round_count {
            rounds.push(Round::work(
                number,
                self.time_per_round,
                self.count_direction,
            ));

            if self.rest_time_between_rounds > 0 {
                rounds.push(Round::rest(self.rest_time_between_rounds));
            }
        }

        rounds.push(Round::terminal());
        rounds
    }
}

/// Snapshot of a workout for rendering. Does not follow later transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutState {
    pub round: RoundKind,
    pub is_countdown: bool,
    pub time: DisplayTime,
    pub is_started: bool,
    pub is_finished: bool,
}

impl WorkoutState {
    pub fn round_number(&self) -> String {
        self.round.label()
    }
}

/// Ordered sequence of rounds and the position of the active one.
///
/// The sequence always starts with the countdown and ends with the terminal
/// round, so there is always an active round. `current` only moves forward
/// and stops at the terminal round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutSet {
    rounds: Vec<Round>,
    current: usize,
    is_started: bool,
}

impl Default for WorkoutSet {
    fn default() -> Self {
        Self::from_rounds(WorkoutConfig::default().build_rounds())
    }
}

impl WorkoutSet {
    pub fn new(config: &WorkoutConfig) -> Result<Self, WorkoutError> {
        config.validate()?;
        let rounds = config.build_rounds();
        debug!(
            rounds = rounds.len(),
            total_secs = config.total_secs(),
            "built workout"
        );
        Ok(Self::from_rounds(rounds))
    }

    fn from_rounds(rounds: Vec<Round>) -> Self {
        Self {
            rounds,
            current: 0,
            is_started: false,
        }
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn round(&self) -> &Round {
        &self.rounds[self.current]
    }

    pub fn round_number(&self) -> String {
        self.round().kind().label()
    }

    pub fn time(&self) -> DisplayTime {
        self.round().display_time()
    }

    pub fn is_countdown(&self) -> bool {
        self.round().is_countdown()
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }

    /// True once the terminal round is active; further ticks change nothing
    pub fn is_finished(&self) -> bool {
        self.current == self.last_index() && self.round().ended()
    }

    fn last_index(&self) -> usize {
        self.rounds.len() - 1
    }

    /// Marks the workout as started and advances the countdown by one unit
    #[must_use]
    pub fn start(mut self) -> Self {
        self.is_started = true;
        info!(rounds = self.rounds.len(), "workout started");
        self.tick()
    }

    /// Advances one time unit. An ended round is replaced by the next one,
    /// which receives the tick.
    #[must_use]
    pub fn tick(mut self) -> Self {
        if self.round().ended() && self.current < self.last_index() {
            self.current += 1;
            let kind = self.round().kind();
            debug!(index = self.current, round = kind.name(), "next round");
            if kind == RoundKind::Terminal {
                info!("workout finished");
            }
        }

        let current = self.current;
        self.rounds[current] = self.rounds[current].tick();
        self
    }

    pub fn state(&self) -> WorkoutState {
        WorkoutState {
            round: self.round().kind(),
            is_countdown: self.is_countdown(),
            time: self.time(),
            is_started: self.is_started,
            is_finished: self.is_finished(),
        }
    }
}
