use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Length of the lead-in countdown that precedes round 1
pub const COUNTDOWN_SECS: u32 = 9;

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CountDirection {
    #[default]
    Down,
    Up,
}

impl CountDirection {
    pub fn toggled(self) -> Self {
        match self {
            CountDirection::Down => CountDirection::Up,
            CountDirection::Up => CountDirection::Down,
        }
    }
}

/// What a round is for. The ordinal of a work round starts at 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundKind {
    Countdown,
    Work(u32),
    Rest,
    Terminal,
}

impl RoundKind {
    /// Marker shown next to the clock
    pub fn label(&self) -> String {
        match self {
            RoundKind::Countdown => String::new(),
            RoundKind::Work(n) => format!("{n:02}"),
            RoundKind::Rest => "r".to_string(),
            RoundKind::Terminal => "00".to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoundKind::Countdown => "countdown",
            RoundKind::Work(_) => "work",
            RoundKind::Rest => "rest",
            RoundKind::Terminal => "done",
        }
    }
}

/// Time as shown on the clock face. The countdown has no minutes field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTime {
    pub minutes: Option<String>,
    pub seconds: String,
}

impl DisplayTime {
    pub fn zero() -> Self {
        Self::from_secs(0)
    }

    pub fn from_secs(total: u32) -> Self {
        let minutes = total / 60;
        let seconds = total - minutes * 60;
        Self {
            minutes: Some(format!("{minutes:02}")),
            seconds: format!("{seconds:02}"),
        }
    }

    fn countdown(remaining: u32) -> Self {
        Self {
            minutes: None,
            seconds: remaining.to_string(),
        }
    }
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.minutes {
            Some(minutes) => write!(f, "{}:{}", minutes, self.seconds),
            None => write!(f, "{}", self.seconds),
        }
    }
}

/// One timed phase of a workout.
///
/// `elapsed` never exceeds `duration`; the round is ended exactly when the two
/// are equal. Ticking an ended round leaves it unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Round {
    kind: RoundKind,
    duration: u32,
    direction: CountDirection,
    elapsed: u32,
}

impl Round {
    pub fn new(kind: RoundKind, duration: u32, direction: CountDirection) -> Self {
        Self {
            kind,
            duration,
            direction,
            elapsed: 0,
        }
    }

    pub fn countdown() -> Self {
        Self::new(RoundKind::Countdown, COUNTDOWN_SECS, CountDirection::Down)
    }

    pub fn work(number: u32, duration: u32, direction: CountDirection) -> Self {
        Self::new(RoundKind::Work(number), duration, direction)
    }

    /// Rest always counts down regardless of the configured direction
    pub fn rest(duration: u32) -> Self {
        Self::new(RoundKind::Rest, duration, CountDirection::Down)
    }

    pub fn terminal() -> Self {
        Self::new(RoundKind::Terminal, 0, CountDirection::Down)
    }

    pub fn kind(&self) -> RoundKind {
        self.kind
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn direction(&self) -> CountDirection {
        self.direction
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_countdown(&self) -> bool {
        self.kind == RoundKind::Countdown
    }

    pub fn ended(&self) -> bool {
        self.elapsed == self.duration
    }

    #[must_use]
    pub fn tick(self) -> Self {
        Self {
            elapsed: (self.elapsed + 1).min(self.duration),
            ..self
        }
    }

    pub fn display_time(&self) -> DisplayTime {
        match self.kind {
            // counts 9..1 once ticking; shows duration + 1 before the first tick
            RoundKind::Countdown => DisplayTime::countdown(self.duration - self.elapsed + 1),
            RoundKind::Work(_) | RoundKind::Rest | RoundKind::Terminal => {
                if self.elapsed == 0 {
                    return DisplayTime::zero();
                }
                let current = match self.direction {
                    CountDirection::Up => self.elapsed - 1,
                    CountDirection::Down => self.duration - self.elapsed + 1,
                };
                DisplayTime::from_secs(current)
            }
        }
    }
}
