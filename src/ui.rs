use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use roundclock::{RoundKind, WorkoutState};
use unicode_width::UnicodeWidthStr;

use crate::{fmt_secs, App, AppState, Field};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const GLYPH_HEIGHT: usize = 5;
const LABEL_GAP: &str = "    ";

/// 3x5 block glyphs for the clock face
fn glyph(c: char) -> [&'static str; GLYPH_HEIGHT] {
    match c {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => ["  █", "  █", "  █", "  █", "  █"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        ':' => [" ", "█", " ", "█", " "],
        'r' => ["   ", "   ", "███", "█  ", "█  "],
        _ => ["   "; GLYPH_HEIGHT],
    }
}

/// Renders `text` as rows of block glyphs separated by one column
pub fn big_text(text: &str) -> Vec<String> {
    (0..GLYPH_HEIGHT)
        .map(|row| text.chars().map(|c| glyph(c)[row]).join(" "))
        .collect()
}

/// The clock reading; the countdown has no separator
pub fn clock_text(state: &WorkoutState) -> String {
    state.time.to_string()
}

fn round_style(round: RoundKind) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match round {
        RoundKind::Countdown => bold.fg(Color::Yellow),
        RoundKind::Work(_) => bold.fg(Color::Green),
        RoundKind::Rest => bold.fg(Color::Cyan),
        RoundKind::Terminal => bold.add_modifier(Modifier::DIM),
    }
}

fn status_text(app: &App, state: &WorkoutState) -> String {
    if !state.is_started {
        return "press enter to start".to_string();
    }
    match state.round {
        RoundKind::Countdown => "get ready".to_string(),
        RoundKind::Work(n) => {
            let total = app
                .workout
                .rounds()
                .iter()
                .filter(|r| matches!(r.kind(), RoundKind::Work(_)))
                .count();
            format!("round {n} of {total}")
        }
        RoundKind::Rest => "rest".to_string(),
        RoundKind::Terminal => "done, press enter to go again".to_string(),
    }
}

fn clock_lines(state: &WorkoutState, width: u16) -> Vec<Line<'static>> {
    let label = state.round_number();
    let time = clock_text(state);
    let style = round_style(state.round);
    let label_style = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);

    let label_rows = big_text(&label);
    let time_rows = big_text(&time);

    let fits = label_rows
        .iter()
        .zip(&time_rows)
        .all(|(l, t)| l.width() + LABEL_GAP.width() + t.width() <= width as usize);

    if !fits {
        // too narrow for block digits
        return vec![Line::from(vec![
            Span::styled(format!("{label} "), label_style),
            Span::styled(time, style),
        ])];
    }

    label_rows
        .into_iter()
        .zip(time_rows)
        .map(|(l, t)| {
            let gap = if label.is_empty() { "" } else { LABEL_GAP };
            Line::from(vec![
                Span::styled(l, label_style),
                Span::raw(gap),
                Span::styled(t, style),
            ])
        })
        .collect()
}

fn field_value(app: &App, field: Field) -> String {
    match field {
        Field::Rounds => app.rounds_input.clone(),
        Field::RoundTime => app.round_time_input.clone(),
        Field::RestTime => app.rest_time_input.clone(),
        Field::Direction => app.count_direction.to_string(),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.workout.state();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let focus_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::REVERSED);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Min(0),
                    Constraint::Length(GLYPH_HEIGHT as u16), // clock
                    Constraint::Length(2),                   // status
                    Constraint::Min(0),
                    Constraint::Length(1), // field labels
                    Constraint::Length(1), // field values
                    Constraint::Length(2), // total / error
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        Paragraph::new(clock_lines(&state, chunks[1].width))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(Span::styled(status_text(self, &state), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, Field::ALL.len() as u32); 4].as_ref())
            .split(chunks[4]);
        let value_columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, Field::ALL.len() as u32); 4].as_ref())
            .split(chunks[5]);

        for (i, field) in Field::ALL.iter().enumerate() {
            Paragraph::new(Span::styled(field.label(), dim_style))
                .alignment(Alignment::Center)
                .render(columns[i], buf);

            let value_style = if *field == self.focus {
                focus_style
            } else {
                bold_style
            };
            Paragraph::new(Span::styled(
                format!(" {} ", field_value(self, *field)),
                value_style,
            ))
            .alignment(Alignment::Center)
            .render(value_columns[i], buf);
        }

        let info = match (&self.error, self.workout_config()) {
            (Some(error), _) => Span::styled(error.clone(), bold_style.fg(Color::Red)),
            (None, Ok(config)) => Span::styled(
                format!("total {}", fmt_secs(config.total_secs())),
                dim_style,
            ),
            (None, Err(e)) => Span::styled(e.to_string(), bold_style.fg(Color::Red)),
        };
        Paragraph::new(info)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[6], buf);

        let legend = match self.state {
            AppState::Setup => "(tab) field / (space) up/down / (enter) go / (esc)ape",
            AppState::Running => "(enter) restart / (esc) stop / (q)uit",
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[7], buf);
    }
}
