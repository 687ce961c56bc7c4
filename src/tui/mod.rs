//! TUI module - Terminal app with ratatui
//!
//! Three screens: the login gate, the grouped workout list, and the add
//! form. Store and network failures degrade to stale or missing data on
//! screen; they never abort the app.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{Stdout, stdout};
use tracing::{error, info};

use crate::auth::SessionGate;
use crate::db::{Workout, WorkoutStore};
use crate::error::Error;
use crate::grouping::{DayIndex, DayKey};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Parse a sets/reps field: non-negative integer, nothing else
pub fn parse_count(field: &str, input: &str) -> crate::error::Result<i32> {
    input
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| Error::Validation(format!("{field} must be a non-negative integer")))
}

/// Parse an optional YYYY-MM-DD form date; empty means unscheduled
pub fn parse_form_date(input: &str) -> crate::error::Result<Option<DateTime<Utc>>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("date '{input}' is not YYYY-MM-DD")))?;
    let local = chrono::Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| Error::Validation(format!("date '{input}' does not exist locally")))?;
    Ok(Some(local.with_timezone(&Utc)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Screen {
    Login,
    Main,
    AddForm,
}

/// One visible line of the grouped list
enum ListRow {
    Header(DayKey),
    Entry(Workout),
}

/// App state for TUI
pub struct App {
    store: WorkoutStore,
    gate: SessionGate,
    index: DayIndex,
    screen: Screen,
    selected: usize,
    login_fields: [String; 2],
    login_focus: usize,
    form_fields: [String; 5],
    form_focus: usize,
    should_quit: bool,
}

const FORM_LABELS: [&str; 5] = ["Type", "Sets", "Reps", "Date (YYYY-MM-DD)", "Notes"];

impl App {
    pub fn new(store: WorkoutStore) -> Self {
        Self {
            store,
            gate: SessionGate::new(),
            index: DayIndex::default(),
            screen: Screen::Login,
            selected: 0,
            login_fields: [String::new(), String::new()],
            login_focus: 0,
            form_fields: [const { String::new() }; 5],
            form_focus: 0,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    /// Full recompute from storage; a failed read keeps the previous snapshot
    fn refresh(&mut self) {
        match self.store.list() {
            Ok(workouts) => self.index = DayIndex::build(&workouts),
            Err(e) => error!("failed to fetch workouts: {e}"),
        }
        let rows = self.list_rows().len();
        if rows == 0 {
            self.selected = 0;
        } else if self.selected >= rows {
            self.selected = rows - 1;
        }
    }

    fn list_rows(&self) -> Vec<ListRow> {
        let mut rows = Vec::new();
        for day in self.index.days() {
            rows.push(ListRow::Header(day));
            for workout in self.index.bucket(&day) {
                rows.push(ListRow::Entry(workout.clone()));
            }
        }
        rows
    }

    fn selected_id(&self) -> Option<i64> {
        match self.list_rows().get(self.selected) {
            Some(ListRow::Entry(w)) => w.id,
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame) {
        match self.screen {
            Screen::Login => self.render_login(frame),
            Screen::Main => self.render_main(frame),
            Screen::AddForm => self.render_form(frame),
        }
    }

    fn render_login(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let header = Paragraph::new("FitTracker - Login")
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let masked = "*".repeat(self.login_fields[1].len());
        let fields = [("Username", self.login_fields[0].as_str()), ("Password", masked.as_str())];
        for (i, (label, value)) in fields.iter().enumerate() {
            let style = if self.login_focus == i {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let field = Paragraph::new(*value)
                .style(style)
                .block(Block::default().borders(Borders::ALL).title(*label));
            frame.render_widget(field, chunks[i + 1]);
        }

        let footer = Paragraph::new("Tab: switch field | Enter: login | Esc: quit")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[4]);
    }

    fn render_main(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let header = Paragraph::new("FitTracker - Logged Workouts")
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let rows: Vec<Row> = self
            .list_rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut table_row = match row {
                    ListRow::Header(day) => Row::new(vec![
                        Cell::from(day.to_string())
                            .style(Style::default().fg(Color::Green).bold()),
                        Cell::from(""),
                        Cell::from(""),
                        Cell::from(""),
                    ]),
                    ListRow::Entry(w) => Row::new(vec![
                        Cell::from(format!(
                            "  {}",
                            w.workout_type.as_deref().unwrap_or("Unknown Type")
                        )),
                        Cell::from(format!("{}x{}", w.sets, w.reps)),
                        Cell::from(
                            w.date
                                .map(|d| {
                                    d.with_timezone(&chrono::Local)
                                        .format("%Y-%m-%d %H:%M")
                                        .to_string()
                                })
                                .unwrap_or_else(|| "-".to_string()),
                        ),
                        Cell::from(w.notes.clone().unwrap_or_default()),
                    ]),
                };
                if i == self.selected {
                    table_row = table_row.style(Style::default().bg(Color::DarkGray));
                }
                table_row
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(28),
                Constraint::Length(10),
                Constraint::Length(18),
                Constraint::Min(20),
            ],
        )
        .header(
            Row::new(vec!["Workout", "Sets x Reps", "Date", "Notes"])
                .style(Style::default().bold()),
        )
        .block(Block::default().borders(Borders::ALL).title("By day"));

        frame.render_widget(table, chunks[1]);

        let footer =
            Paragraph::new("q: quit | a: add | d: delete | r: refresh | Esc: log out")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn render_form(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let header = Paragraph::new("FitTracker - Add New Workout")
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        for (i, label) in FORM_LABELS.iter().enumerate() {
            let style = if self.form_focus == i {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let field = Paragraph::new(self.form_fields[i].as_str())
                .style(style)
                .block(Block::default().borders(Borders::ALL).title(*label));
            frame.render_widget(field, chunks[i + 1]);
        }

        let footer = Paragraph::new("Tab: next field | Enter: save | Esc: cancel")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[7]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match self.screen {
                Screen::Login => self.handle_login_key(key.code),
                Screen::Main => self.handle_main_key(key.code),
                Screen::AddForm => self.handle_form_key(key.code),
            }
        }
        Ok(())
    }

    fn handle_login_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                self.login_focus = 1 - self.login_focus;
            }
            KeyCode::Backspace => {
                self.login_fields[self.login_focus].pop();
            }
            KeyCode::Enter => {
                let [username, password] = &self.login_fields;
                if self.gate.login(username, password) {
                    info!("session authenticated");
                    self.refresh();
                    self.screen = Screen::Main;
                } else {
                    // Failed attempts are no-ops; just clear the password.
                    self.login_fields[1].clear();
                }
            }
            KeyCode::Char(c) => self.login_fields[self.login_focus].push(c),
            _ => {}
        }
    }

    fn handle_main_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('a') => {
                self.form_fields = [const { String::new() }; 5];
                self.form_focus = 0;
                self.screen = Screen::AddForm;
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    if let Err(e) = self.store.delete(id) {
                        error!("failed to delete workout: {e}");
                    } else {
                        info!(id, "workout deleted");
                    }
                    self.refresh();
                }
            }
            KeyCode::Down => {
                let rows = self.list_rows().len();
                if rows > 0 && self.selected + 1 < rows {
                    self.selected += 1;
                }
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Esc => {
                self.gate.logout();
                self.login_fields = [String::new(), String::new()];
                self.login_focus = 0;
                self.screen = Screen::Login;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.screen = Screen::Main,
            KeyCode::Tab | KeyCode::Down => {
                self.form_focus = (self.form_focus + 1) % FORM_LABELS.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form_focus =
                    (self.form_focus + FORM_LABELS.len() - 1) % FORM_LABELS.len();
            }
            KeyCode::Backspace => {
                self.form_fields[self.form_focus].pop();
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => self.form_fields[self.form_focus].push(c),
            _ => {}
        }
    }

    /// Validate and persist the form. Invalid input drops the submission
    /// and leaves the form on screen.
    fn submit_form(&mut self) {
        let [ty, sets, reps, date, notes] = &self.form_fields;

        let workout = match (
            parse_count("sets", sets),
            parse_count("reps", reps),
            parse_form_date(date),
        ) {
            (Ok(sets), Ok(reps), Ok(date)) => Workout {
                id: None,
                workout_type: (!ty.trim().is_empty()).then(|| ty.trim().to_string()),
                sets,
                reps,
                date,
                notes: (!notes.trim().is_empty()).then(|| notes.trim().to_string()),
            },
            (sets, reps, date) => {
                for err in [sets.err(), reps.err(), date.err()].into_iter().flatten() {
                    error!("rejected workout input: {err}");
                }
                return;
            }
        };

        match self.store.add(&workout) {
            Ok(saved) => {
                info!(id = saved.id, "workout saved");
                self.refresh();
                self.screen = Screen::Main;
            }
            Err(e) => {
                // The unsaved record is simply dropped; the next list will
                // not include it.
                error!("failed to save workout: {e}");
                self.screen = Screen::Main;
            }
        }
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_accepts_non_negative_integers() {
        assert_eq!(parse_count("sets", "3").unwrap(), 3);
        assert_eq!(parse_count("sets", " 0 ").unwrap(), 0);
    }

    #[test]
    fn test_parse_count_rejects_bad_input() {
        assert!(matches!(
            parse_count("sets", "three"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(parse_count("reps", "-1"), Err(Error::Validation(_))));
        assert!(matches!(parse_count("reps", ""), Err(Error::Validation(_))));
        assert!(matches!(parse_count("reps", "1.5"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_form_date_empty_means_unscheduled() {
        assert_eq!(parse_form_date("").unwrap(), None);
        assert_eq!(parse_form_date("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_form_date_round_trips_local_day() {
        let parsed = parse_form_date("2024-03-14").unwrap().unwrap();
        let day = parsed.with_timezone(&chrono::Local).date_naive();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }

    #[test]
    fn test_parse_form_date_rejects_garbage() {
        assert!(matches!(
            parse_form_date("14/03/2024"),
            Err(Error::Validation(_))
        ));
    }
}
