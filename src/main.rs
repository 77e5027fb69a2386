pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use roundclock::{
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{ClockEvent, ClockEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    telemetry,
    time_mask::{self, mask_from_seconds, parse_time_arg, to_time_mask, MAX_MASK_DIGITS},
    CountDirection, WorkoutConfig, WorkoutError, WorkoutSet,
};
use std::{
    error::Error,
    io::{self, stdin},
};
use tracing::{info, warn};

/// Round counts are entered with at most two digits
const MAX_ROUND_DIGITS: usize = 2;

/// interval timer tui for round-based workouts
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An interval timer for round-based workouts: a nine second countdown, then work rounds with optional rest in between, on a big terminal clock."
)]
pub struct Cli {
    /// number of rounds (1-99)
    #[clap(short = 'r', long)]
    rounds: Option<u32>,

    /// time per round as m:ss or plain digits (130 means 1:30)
    #[clap(short = 't', long, value_parser = parse_time_arg)]
    round_time: Option<u32>,

    /// rest after each round as m:ss or plain digits, 0 disables rest
    #[clap(short = 'b', long, value_parser = parse_time_arg)]
    rest_time: Option<u32>,

    /// whether work rounds count up from zero or down to zero
    #[clap(short = 'd', long, value_enum)]
    direction: Option<CountDirection>,

    /// length of one clock unit in milliseconds
    #[clap(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// print the round sequence and exit
    #[clap(long)]
    plan: bool,

    /// do not remember these settings for the next run
    #[clap(long)]
    no_save: bool,
}

impl Cli {
    /// Overlay command line values on top of stored settings
    fn apply(&self, stored: &Config) -> Config {
        Config {
            round_count: self.rounds.unwrap_or(stored.round_count),
            round_time_secs: self.round_time.unwrap_or(stored.round_time_secs),
            rest_time_secs: self.rest_time.unwrap_or(stored.rest_time_secs),
            count_direction: self.direction.unwrap_or(stored.count_direction),
            tick_interval_ms: self.tick_ms.unwrap_or(stored.tick_interval_ms),
        }
    }
}

/// `m:ss` rendering of a plain second count
pub fn fmt_secs(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// One line per round followed by the total
fn render_plan(config: &WorkoutConfig) -> Result<String, WorkoutError> {
    let workout = WorkoutSet::new(config)?;
    let lines = workout.rounds().iter().map(|round| {
        format!(
            "{:<3} {:<9} {:>6}  {}",
            round.kind().label(),
            round.kind().name(),
            fmt_secs(round.duration() as u64),
            round.direction()
        )
    });
    Ok(format!(
        "{}\ntotal {}\n",
        lines.format("\n"),
        fmt_secs(config.total_secs())
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Rounds,
    RoundTime,
    RestTime,
    Direction,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Rounds,
        Field::RoundTime,
        Field::RestTime,
        Field::Direction,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Rounds => "Rounds",
            Field::RoundTime => "Round time",
            Field::RestTime => "Rest time",
            Field::Direction => "Up/down",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Setup,
    Running,
}

#[derive(Debug)]
pub struct App {
    pub rounds_input: String,
    pub round_time_input: String,
    pub rest_time_input: String,
    pub count_direction: CountDirection,
    pub focus: Field,
    pub tick_interval_ms: u64,
    pub workout: WorkoutSet,
    pub state: AppState,
    pub error: Option<String>,
}

impl App {
    pub fn new(settings: &Config) -> Self {
        let mut app = Self {
            rounds_input: settings.round_count.to_string(),
            round_time_input: mask_from_seconds(settings.round_time_secs),
            rest_time_input: mask_from_seconds(settings.rest_time_secs),
            count_direction: settings.count_direction,
            focus: Field::Rounds,
            tick_interval_ms: settings.tick_interval_ms,
            workout: WorkoutSet::default(),
            state: AppState::Setup,
            error: None,
        };
        app.reset();
        app
    }

    pub fn workout_config(&self) -> Result<WorkoutConfig, WorkoutError> {
        Ok(WorkoutConfig {
            // digits only, so the empty field is the one parse failure
            round_count: self.rounds_input.parse().unwrap_or(0),
            time_per_round: time_mask::seconds_from_mask(&self.round_time_input)?,
            rest_time_between_rounds: time_mask::seconds_from_mask(&self.rest_time_input)?,
            count_direction: self.count_direction,
        })
    }

    /// Settings worth remembering, if the current inputs form a valid workout
    pub fn settings(&self) -> Option<Config> {
        let workout = self.workout_config().ok()?;
        workout.validate().ok()?;
        let mut cfg = Config::from(&workout);
        cfg.tick_interval_ms = self.tick_interval_ms;
        Some(cfg)
    }

    /// Drop any run and show the not-yet-started workout for the current inputs
    pub fn reset(&mut self) {
        self.state = AppState::Setup;
        match self
            .workout_config()
            .and_then(|config| WorkoutSet::new(&config))
        {
            Ok(workout) => {
                self.workout = workout;
                self.error = None;
            }
            Err(e) => {
                self.workout = WorkoutSet::default();
                self.error = Some(e.to_string());
            }
        }
    }

    /// Build a fresh workout from the inputs and start it
    pub fn start(&mut self) -> bool {
        self.reset();
        if let Some(error) = &self.error {
            warn!(%error, "refusing to start workout");
            return false;
        }
        self.workout = std::mem::take(&mut self.workout).start();
        self.state = AppState::Running;
        true
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Running
            && self.workout.is_started()
            && !self.workout.is_finished()
        {
            self.workout = std::mem::take(&mut self.workout).tick();
        }
    }

    /// Apply an editing key to the focused field. Returns true if anything changed.
    pub fn edit(&mut self, code: KeyCode) -> bool {
        let changed = match (self.focus, code) {
            (Field::Direction, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) => {
                self.count_direction = self.count_direction.toggled();
                true
            }
            (Field::Direction, _) => false,
            (Field::Rounds, KeyCode::Char(c)) if c.is_ascii_digit() => {
                if self.rounds_input.len() < MAX_ROUND_DIGITS {
                    self.rounds_input.push(c);
                    true
                } else {
                    false
                }
            }
            (Field::Rounds, KeyCode::Backspace) => self.rounds_input.pop().is_some(),
            (Field::RoundTime | Field::RestTime, KeyCode::Char(c)) if c.is_ascii_digit() => {
                let input = self.focused_mask();
                if input.chars().filter(char::is_ascii_digit).count() < MAX_MASK_DIGITS {
                    *input = to_time_mask(&format!("{input}{c}"));
                    true
                } else {
                    false
                }
            }
            (Field::RoundTime | Field::RestTime, KeyCode::Backspace) => {
                let input = self.focused_mask();
                let mut digits: String = input.chars().filter(char::is_ascii_digit).collect();
                let popped = digits.pop().is_some();
                *input = to_time_mask(&digits);
                popped
            }
            _ => false,
        };

        if changed {
            self.reset();
        }
        changed
    }

    fn focused_mask(&mut self) -> &mut String {
        match self.focus {
            Field::RestTime => &mut self.rest_time_input,
            _ => &mut self.round_time_input,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();
    let settings = cli.apply(&store.load());

    if let Err(e) = settings.workout().validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }

    if cli.plan {
        print!("{}", render_plan(&settings.workout())?);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    telemetry::init();
    info!(?settings, "launching");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&settings);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::from_millis(settings.tick_interval_ms),
    );
    let result = start_tui(&mut terminal, &mut app, runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if !cli.no_save {
        if let Some(cfg) = app.settings() {
            if let Err(e) = store.save(&cfg) {
                warn!(error = %e, path = %store.path().display(), "failed to save settings");
            }
        }
    }

    result
}

#[derive(Debug, PartialEq)]
enum KeyOutcome {
    Continue,
    Started,
    Quit,
}

fn handle_key(app: &mut App, key: KeyEvent) -> KeyOutcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyOutcome::Quit;
    }

    match key.code {
        KeyCode::Char('q') => KeyOutcome::Quit,
        KeyCode::Esc => match app.state {
            AppState::Running => {
                app.reset();
                KeyOutcome::Continue
            }
            AppState::Setup => KeyOutcome::Quit,
        },
        KeyCode::Enter | KeyCode::Char('g') => {
            if app.start() {
                KeyOutcome::Started
            } else {
                KeyOutcome::Continue
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.focus = app.focus.next();
            KeyOutcome::Continue
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.focus = app.focus.prev();
            KeyOutcome::Continue
        }
        code => {
            app.edit(code);
            KeyOutcome::Continue
        }
    }
}

fn start_tui<B: Backend, E: ClockEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut runner: Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            ClockEvent::Tick => {
                if app.state == AppState::Running && !app.workout.is_finished() {
                    app.on_tick();
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            ClockEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            ClockEvent::Key(key) => {
                match handle_key(app, key) {
                    KeyOutcome::Quit => break,
                    KeyOutcome::Started => runner.rearm(),
                    KeyOutcome::Continue => {}
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use roundclock::RoundKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        App::new(&Config {
            round_count: 2,
            round_time_secs: 5,
            rest_time_secs: 0,
            count_direction: CountDirection::Down,
            tick_interval_ms: 1000,
        })
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["roundclock"]);

        assert_eq!(cli.rounds, None);
        assert_eq!(cli.round_time, None);
        assert_eq!(cli.rest_time, None);
        assert_eq!(cli.direction, None);
        assert_eq!(cli.tick_ms, None);
        assert!(!cli.plan);
        assert!(!cli.no_save);
    }

    #[test]
    fn test_cli_times() {
        let cli = Cli::parse_from(["roundclock", "-t", "1:30", "-b", "45"]);
        assert_eq!(cli.round_time, Some(90));
        assert_eq!(cli.rest_time, Some(45));

        let cli = Cli::parse_from(["roundclock", "--round-time", "300", "--rest-time", "0"]);
        assert_eq!(cli.round_time, Some(180));
        assert_eq!(cli.rest_time, Some(0));
    }

    #[test]
    fn test_cli_rejects_bad_time() {
        assert!(Cli::try_parse_from(["roundclock", "-t", "ninety"]).is_err());
    }

    #[test]
    fn test_cli_rejects_time_longer_than_field() {
        assert!(Cli::try_parse_from(["roundclock", "-t", "7158278815"]).is_err());
        assert!(Cli::try_parse_from(["roundclock", "-b", "100:00"]).is_err());

        let cli = Cli::parse_from(["roundclock", "-t", "99:59"]);
        assert_eq!(cli.round_time, Some(5999));
    }

    #[test]
    fn test_cli_direction() {
        let cli = Cli::parse_from(["roundclock", "-d", "up"]);
        assert_eq!(cli.direction, Some(CountDirection::Up));

        let cli = Cli::parse_from(["roundclock", "--direction", "down"]);
        assert_eq!(cli.direction, Some(CountDirection::Down));
    }

    #[test]
    fn test_cli_overrides_stored_settings() {
        let stored = Config {
            round_count: 8,
            round_time_secs: 20,
            rest_time_secs: 10,
            count_direction: CountDirection::Up,
            tick_interval_ms: 1000,
        };
        let cli = Cli::parse_from(["roundclock", "-r", "3", "--tick-ms", "100"]);
        let merged = cli.apply(&stored);

        assert_eq!(merged.round_count, 3);
        assert_eq!(merged.round_time_secs, 20);
        assert_eq!(merged.rest_time_secs, 10);
        assert_eq!(merged.count_direction, CountDirection::Up);
        assert_eq!(merged.tick_interval_ms, 100);
    }

    #[test]
    fn test_render_plan() {
        let plan = render_plan(&WorkoutConfig {
            round_count: 2,
            time_per_round: 90,
            rest_time_between_rounds: 30,
            count_direction: CountDirection::Up,
        })
        .unwrap();
        let lines: Vec<&str> = plan.lines().collect();

        assert_eq!(lines.len(), 7);
        assert!(lines[0].contains("countdown") && lines[0].contains("0:09"));
        assert!(lines[1].starts_with("01") && lines[1].contains("1:30") && lines[1].ends_with("up"));
        assert!(lines[2].starts_with('r') && lines[2].contains("0:30") && lines[2].ends_with("down"));
        assert!(lines[5].starts_with("00") && lines[5].contains("done"));
        assert_eq!(lines[6], "total 4:09");
    }

    #[test]
    fn test_render_plan_rejects_zero_rounds() {
        let config = WorkoutConfig {
            round_count: 0,
            ..WorkoutConfig::default()
        };
        assert_eq!(render_plan(&config), Err(WorkoutError::NoRounds));
    }

    #[test]
    fn test_app_new_shows_unstarted_workout() {
        let app = test_app();
        assert_eq!(app.state, AppState::Setup);
        assert_eq!(app.rounds_input, "2");
        assert_eq!(app.round_time_input, ":05");
        assert_eq!(app.rest_time_input, ":00");
        assert!(!app.workout.is_started());
        assert_eq!(app.workout.rounds().len(), 4);
        assert!(app.error.is_none());
    }

    #[test]
    fn test_start_and_tick() {
        let mut app = test_app();
        assert_eq!(handle_key(&mut app, key(KeyCode::Enter)), KeyOutcome::Started);
        assert_eq!(app.state, AppState::Running);
        assert_eq!(app.workout.time().seconds, "9");

        for _ in 0..9 {
            app.on_tick();
        }
        assert_eq!(app.workout.round().kind(), RoundKind::Work(1));
        assert_eq!(app.workout.time().to_string(), "00:05");
    }

    #[test]
    fn test_ticks_ignored_in_setup() {
        let mut app = test_app();
        app.on_tick();
        assert_eq!(app.workout.round().elapsed(), 0);
    }

    #[test]
    fn test_run_stops_at_terminal_round() {
        let mut app = test_app();
        app.start();
        for _ in 0..100 {
            app.on_tick();
        }
        let state = app.workout.state();
        assert!(state.is_finished);
        assert_eq!(state.round_number(), "00");
    }

    #[test]
    fn test_enter_restarts_with_fresh_workout() {
        let mut app = test_app();
        app.start();
        for _ in 0..12 {
            app.on_tick();
        }
        assert_eq!(handle_key(&mut app, key(KeyCode::Enter)), KeyOutcome::Started);
        assert!(app.workout.is_countdown());
        assert_eq!(app.workout.round().elapsed(), 1);
    }

    #[test]
    fn test_escape_stops_then_quits() {
        let mut app = test_app();
        app.start();
        assert_eq!(handle_key(&mut app, key(KeyCode::Esc)), KeyOutcome::Continue);
        assert_eq!(app.state, AppState::Setup);
        assert!(!app.workout.is_started());
        assert_eq!(handle_key(&mut app, key(KeyCode::Esc)), KeyOutcome::Quit);
    }

    #[test]
    fn test_ctrl_c_and_q_quit() {
        let mut app = test_app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut app, ctrl_c), KeyOutcome::Quit);
        assert_eq!(handle_key(&mut app, key(KeyCode::Char('q'))), KeyOutcome::Quit);
    }

    #[test]
    fn test_focus_cycles() {
        let mut app = test_app();
        for expected in [
            Field::RoundTime,
            Field::RestTime,
            Field::Direction,
            Field::Rounds,
        ] {
            handle_key(&mut app, key(KeyCode::Tab));
            assert_eq!(app.focus, expected);
        }
        handle_key(&mut app, key(KeyCode::Up));
        assert_eq!(app.focus, Field::Direction);
    }

    #[test]
    fn test_edit_rounds() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('4')));
        assert_eq!(app.rounds_input, "24");
        // two digits at most
        handle_key(&mut app, key(KeyCode::Char('1')));
        assert_eq!(app.rounds_input, "24");

        handle_key(&mut app, key(KeyCode::Backspace));
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.rounds_input, "");
        assert_eq!(app.error.as_deref(), Some("round count must be at least 1"));
        assert!(!app.start());
        assert_eq!(app.state, AppState::Setup);
    }

    #[test]
    fn test_edit_round_time_masks_input() {
        let mut app = test_app();
        app.focus = Field::RoundTime;
        app.round_time_input = String::new();
        for c in ['1', '3', '0'] {
            app.edit(KeyCode::Char(c));
        }
        assert_eq!(app.round_time_input, "1:30");
        app.edit(KeyCode::Char('0'));
        assert_eq!(app.round_time_input, "13:00");
        // mm:ss is full
        assert!(!app.edit(KeyCode::Char('5')));
        assert_eq!(app.round_time_input, "13:00");

        app.edit(KeyCode::Backspace);
        assert_eq!(app.round_time_input, "1:30");
        assert_eq!(app.workout_config().unwrap().time_per_round, 90);
    }

    #[test]
    fn test_clearing_time_field_shows_zero_mask() {
        let mut app = test_app();
        app.focus = Field::RoundTime;
        for _ in 0..4 {
            app.edit(KeyCode::Backspace);
        }
        assert_eq!(app.round_time_input, ":00");
        assert_eq!(app.workout_config().unwrap().time_per_round, 0);
    }

    #[test]
    fn test_edit_rest_time() {
        let mut app = test_app();
        app.focus = Field::RestTime;
        app.edit(KeyCode::Char('3'));
        assert_eq!(app.rest_time_input, ":03");
        app.edit(KeyCode::Char('0'));
        assert_eq!(app.rest_time_input, ":30");
        assert_eq!(app.workout.rounds().len(), 6);
    }

    #[test]
    fn test_toggle_direction() {
        let mut app = test_app();
        app.focus = Field::Direction;
        handle_key(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.count_direction, CountDirection::Up);
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.count_direction, CountDirection::Down);
        // digits do nothing on the direction field
        assert!(!app.edit(KeyCode::Char('7')));
    }

    #[test]
    fn test_editing_discards_run() {
        let mut app = test_app();
        app.start();
        app.on_tick();
        handle_key(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.state, AppState::Setup);
        assert!(!app.workout.is_started());
        assert_eq!(app.rounds_input, "23");
    }

    #[test]
    fn test_settings_reflect_inputs() {
        let mut app = test_app();
        app.focus = Field::Direction;
        app.edit(KeyCode::Char(' '));
        let cfg = app.settings().unwrap();
        assert_eq!(cfg.round_count, 2);
        assert_eq!(cfg.round_time_secs, 5);
        assert_eq!(cfg.count_direction, CountDirection::Up);

        app.rounds_input.clear();
        assert!(app.settings().is_none());
    }

    #[test]
    fn test_fmt_secs() {
        assert_eq!(fmt_secs(0), "0:00");
        assert_eq!(fmt_secs(69), "1:09");
        assert_eq!(fmt_secs(3600), "60:00");
    }

    #[test]
    fn test_ui_function_renders() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut app = test_app();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Rounds"));
        assert!(content.contains("Round time"));
    }
}
