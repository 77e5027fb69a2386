use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Everything the clock loop reacts to: key presses, terminal resizes and
/// clock units
#[derive(Clone, Debug)]
pub enum ClockEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where key and resize events come from; ticks are produced by the `Runner`
pub trait ClockEventSource: Send + 'static {
    /// Waits at most until the next clock unit is due. `Err(Timeout)` means
    /// the unit has elapsed with no input.
    fn recv_timeout(&self, timeout: Duration) -> Result<ClockEvent, RecvTimeoutError>;
}

/// Reads key presses and resizes from the terminal on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<ClockEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                // release/repeat events would double every key on some platforms
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(ClockEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(ClockEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ClockEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Length of one clock unit (one second on the wall clock by default)
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Clock unit set from `--tick-ms` or the stored config
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms.max(1)))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed source for driving a workout without a terminal
pub struct TestEventSource {
    rx: Receiver<ClockEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ClockEvent>) -> Self {
        Self { rx }
    }
}

impl ClockEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ClockEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Hands the clock loop input events as they arrive and a `Tick` per clock unit.
///
/// Ticks follow a fixed deadline schedule: events arriving between two ticks
/// do not push the next tick back.
pub struct Runner<E: ClockEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: ClockEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Restart the schedule so the next tick is one full interval away
    pub fn rearm(&mut self) {
        self.next_tick = Instant::now() + self.ticker.interval();
    }

    /// Blocks until the next tick is due and returns the next event, or Tick
    /// once the deadline passes
    pub fn step(&mut self) -> ClockEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            return self.fire(now);
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.fire(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                // nothing left to wait on, keep the cadence with a plain sleep
                std::thread::sleep(self.next_tick.saturating_duration_since(Instant::now()));
                self.fire(Instant::now())
            }
        }
    }

    fn fire(&mut self, now: Instant) -> ClockEvent {
        self.next_tick += self.ticker.interval();
        // after a stall, skip the missed ticks instead of bursting them
        if self.next_tick <= now {
            self.next_tick = now + self.ticker.interval();
        }
        ClockEvent::Tick
    }
}
