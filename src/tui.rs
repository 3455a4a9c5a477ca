use crate::app::App;
use crate::models::{ItemId, Mode};
use crate::timer::Phase;
use crate::utils::{format_clock, format_duration};
use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration as StdDuration;

const PROGRESS_STEP: i32 = 10;
const BAR_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Quests,
    Distractions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    NewItem(Pane),
    FocusMinutes,
    RestMinutes,
}

impl InputTarget {
    fn prompt(self) -> &'static str {
        match self {
            InputTarget::NewItem(Pane::Quests) => "New quest",
            InputTarget::NewItem(Pane::Distractions) => "New distraction",
            InputTarget::FocusMinutes => "Focus minutes",
            InputTarget::RestMinutes => "Rest minutes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub target: InputTarget,
    pub buffer: String,
}

/// View-only state: which list has the cursor and what is being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ui {
    pub pane: Pane,
    pub quest_cursor: usize,
    pub distraction_cursor: usize,
    pub input: Option<Input>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            pane: Pane::Quests,
            quest_cursor: 0,
            distraction_cursor: 0,
            input: None,
        }
    }
}

impl Ui {
    fn cursor_mut(&mut self) -> &mut usize {
        match self.pane {
            Pane::Quests => &mut self.quest_cursor,
            Pane::Distractions => &mut self.distraction_cursor,
        }
    }

    fn selected_id(&self, app: &App) -> Option<ItemId> {
        match self.pane {
            Pane::Quests => app
                .quests()
                .as_slice()
                .get(self.quest_cursor)
                .map(|q| q.id.clone()),
            Pane::Distractions => app
                .distractions()
                .as_slice()
                .get(self.distraction_cursor)
                .map(|d| d.id.clone()),
        }
    }

    fn clamp(&mut self, app: &App) {
        self.quest_cursor = self.quest_cursor.min(app.quests().len().saturating_sub(1));
        self.distraction_cursor = self
            .distraction_cursor
            .min(app.distractions().len().saturating_sub(1));
    }
}

pub fn run_tui(app: &mut App, tick: StdDuration) -> Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, app, tick);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(err = %err, "ui loop failed");
        println!("{:?}", err)
    }

    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: StdDuration,
) -> Result<()> {
    let mut ui = Ui::default();
    loop {
        app.tick(Utc::now());
        terminal.draw(|f| draw(f, app, &ui))?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(app, &mut ui, key) {
                    return Ok(());
                }
            }
        }
    }
}

/// Applies one key press. Returns `false` when the user asked to quit.
pub fn handle_key(app: &mut App, ui: &mut Ui, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }

    if let Some(input) = ui.input.as_mut() {
        match key.code {
            KeyCode::Esc => ui.input = None,
            KeyCode::Backspace => {
                input.buffer.pop();
            }
            KeyCode::Enter => {
                if let Some(input) = ui.input.take() {
                    submit_input(app, ui, input);
                }
            }
            KeyCode::Char(c) => input.buffer.push(c),
            _ => {}
        }
        return true;
    }

    let now = Utc::now();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Char('f') => app.start_focus(now),
        KeyCode::Char('r') => app.start_rest(now),
        KeyCode::Char('x') => app.reset(),
        KeyCode::Tab | KeyCode::BackTab => {
            ui.pane = match ui.pane {
                Pane::Quests => Pane::Distractions,
                Pane::Distractions => Pane::Quests,
            };
            app.click();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            let cursor = ui.cursor_mut();
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            *ui.cursor_mut() += 1;
            ui.clamp(app);
        }
        KeyCode::Char('a') => {
            ui.input = Some(Input {
                target: InputTarget::NewItem(ui.pane),
                buffer: String::new(),
            })
        }
        KeyCode::Char('e') => {
            ui.input = Some(Input {
                target: InputTarget::FocusMinutes,
                buffer: app.settings().focus_duration_mins.to_string(),
            })
        }
        KeyCode::Char('E') => {
            ui.input = Some(Input {
                target: InputTarget::RestMinutes,
                buffer: app.settings().rest_duration_mins.to_string(),
            })
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(id) = ui.selected_id(app) {
                match ui.pane {
                    Pane::Quests => {
                        app.toggle_quest(&id);
                    }
                    Pane::Distractions => {
                        app.toggle_distraction(&id);
                    }
                }
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = ui.selected_id(app) {
                match ui.pane {
                    Pane::Quests => app.remove_quest(&id),
                    Pane::Distractions => app.remove_distraction(&id),
                };
                ui.clamp(app);
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => step_progress(app, ui, PROGRESS_STEP),
        KeyCode::Char('-') => step_progress(app, ui, -PROGRESS_STEP),
        _ => {}
    }
    true
}

fn submit_input(app: &mut App, ui: &mut Ui, input: Input) {
    let now = Utc::now();
    match input.target {
        InputTarget::NewItem(Pane::Quests) => {
            if app.add_quest(&input.buffer, now).is_some() {
                ui.quest_cursor = app.quests().len() - 1;
            }
        }
        InputTarget::NewItem(Pane::Distractions) => {
            if app.add_distraction(&input.buffer, now).is_some() {
                ui.distraction_cursor = app.distractions().len() - 1;
            }
        }
        InputTarget::FocusMinutes => {
            app.set_focus_duration(&input.buffer);
        }
        InputTarget::RestMinutes => {
            app.set_rest_duration(&input.buffer);
        }
    }
}

fn step_progress(app: &mut App, ui: &Ui, delta: i32) {
    if ui.pane != Pane::Quests {
        return;
    }
    if let Some(id) = ui.selected_id(app) {
        let current = app.quests().get(&id).map_or(0, |q| i32::from(q.progress));
        app.set_quest_progress(&id, current + delta);
    }
}

pub fn draw(frame: &mut Frame, app: &App, ui: &Ui) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(body[1]);

    draw_header(frame, chunks[0], app);
    draw_timer(frame, body[0], app);
    draw_quests(frame, lists[0], app, ui);
    draw_distractions(frame, lists[1], app, ui);
    draw_footer(frame, chunks[2], ui);
}

fn mode_color(mode: Mode) -> Color {
    match mode {
        Mode::Focus => Color::Green,
        Mode::Rest => Color::Cyan,
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let timer = app.timer();
    let state = match timer.phase() {
        Phase::Running { .. } => Span::styled(
            format!("{} RUNNING", timer.mode().label()),
            Style::default()
                .fg(mode_color(timer.mode()))
                .add_modifier(Modifier::BOLD),
        ),
        Phase::Expired => Span::styled(
            "TIME UP",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Phase::Idle => Span::styled("IDLE", Style::default().fg(Color::Yellow)),
    };

    let header = Line::from(vec![
        Span::styled(
            " Questclock ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        state,
        Span::raw(" | Total focus: "),
        Span::styled(
            format_duration(app.total_focus_mins() as i64 * 60),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_timer(frame: &mut Frame, area: Rect, app: &App) {
    let timer = app.timer();
    let block = Block::default()
        .title(Span::styled(
            " TIMER ",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let settings = app.settings();
    let clock_style = if timer.is_running() {
        Style::default()
            .fg(mode_color(timer.mode()))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format_clock(timer.remaining_secs()),
            clock_style,
        )))
        .alignment(Alignment::Center),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(app.status()).alignment(Alignment::Center),
        rows[2],
    );

    let elapsed_ratio = match (timer.phase(), timer.active_duration_mins()) {
        (_, Some(duration_mins)) => {
            let total = u64::from(duration_mins) * 60;
            1.0 - timer.remaining_secs() as f64 / total as f64
        }
        (Phase::Expired, None) => 1.0,
        _ => 0.0,
    };
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(mode_color(timer.mode())))
            .ratio(elapsed_ratio.clamp(0.0, 1.0))
            .label(timer.mode().label()),
        rows[4],
    );

    frame.render_widget(
        Paragraph::new(format!(
            "Focus {}m | Rest {}m",
            settings.focus_duration_mins, settings.rest_duration_mins
        ))
        .alignment(Alignment::Center),
        rows[6],
    );
}

fn progress_bar(progress: u8) -> String {
    let filled = (usize::from(progress) * BAR_WIDTH / 100).min(BAR_WIDTH);
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH.saturating_sub(filled)),
        progress
    )
}

fn list_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(border)
}

fn item_style(done: bool, selected: bool) -> Style {
    let mut style = Style::default();
    if done {
        style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn draw_quests(frame: &mut Frame, area: Rect, app: &App, ui: &Ui) {
    let focused = ui.pane == Pane::Quests;
    let quests = app.quests();
    let title = format!(
        " QUESTS {}/{} ",
        quests.completed_count(),
        quests.len()
    );

    let lines: Vec<Line> = if quests.is_empty() {
        vec![Line::raw("  No quests yet. Press 'a' to add one.")]
    } else {
        quests
            .iter()
            .enumerate()
            .map(|(i, quest)| {
                let selected = focused && i == ui.quest_cursor;
                let bar_color = if quest.completed {
                    Color::Green
                } else {
                    Color::Red
                };
                Line::from(vec![
                    Span::raw(if quest.completed { " [x] " } else { " [ ] " }),
                    Span::styled(progress_bar(quest.progress), Style::default().fg(bar_color)),
                    Span::raw("  "),
                    Span::styled(quest.title.clone(), item_style(quest.completed, selected)),
                ])
            })
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines)
            .block(list_block(&title, focused))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_distractions(frame: &mut Frame, area: Rect, app: &App, ui: &Ui) {
    let focused = ui.pane == Pane::Distractions;
    let distractions = app.distractions();
    let title = format!(
        " DISTRACTIONS {}/{} ",
        distractions.crossed_count(),
        distractions.len()
    );

    let lines: Vec<Line> = if distractions.is_empty() {
        vec![Line::raw("  Nothing logged.")]
    } else {
        distractions
            .iter()
            .enumerate()
            .map(|(i, distraction)| {
                let selected = focused && i == ui.distraction_cursor;
                let marker = if distraction.crossed {
                    Span::styled(" ■ ", Style::default().fg(Color::Red))
                } else {
                    Span::styled(" ■ ", Style::default().fg(Color::Yellow))
                };
                Line::from(vec![
                    marker,
                    Span::styled(
                        distraction.text.clone(),
                        item_style(distraction.crossed, selected),
                    ),
                ])
            })
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines)
            .block(list_block(&title, focused))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_footer(frame: &mut Frame, area: Rect, ui: &Ui) {
    let footer = match &ui.input {
        Some(input) => Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{}: ", input.target.prompt()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!("{}_", input.buffer)),
        ])),
        None => Paragraph::new(
            "f focus | r rest | x reset | a add | space toggle | d delete | +/- progress | e/E minutes | tab switch | q quit",
        )
        .alignment(Alignment::Center),
    };
    frame.render_widget(footer.block(Block::default().borders(Borders::ALL)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::DesktopNotifier;
    use crate::sound::SoundNotifier;
    use crate::storage::Storage;
    use ratatui::backend::TestBackend;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let app = App::new(
            Storage::from_dir(dir.path().to_path_buf()),
            SoundNotifier::from_config(false),
            DesktopNotifier::new(false),
        );
        (app, dir)
    }

    fn press(app: &mut App, ui: &mut Ui, code: KeyCode) -> bool {
        handle_key(app, ui, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, ui: &mut Ui, text: &str) {
        for c in text.chars() {
            press(app, ui, KeyCode::Char(c));
        }
    }

    fn render(app: &App, ui: &Ui) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, app, ui)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), "░░░░░░░░░░   0%");
        assert_eq!(progress_bar(55), "█████░░░░░  55%");
        assert_eq!(progress_bar(100), "██████████ 100%");
        assert_eq!(progress_bar(150), "██████████ 150%");
    }

    #[test]
    fn test_draw_out_of_range_stored_quest() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("quests.json"),
            r#"[{"id": "quest_1", "title": "Overdone", "completed": false,
                 "progress": 150, "createdAt": "2024-02-01T08:30:00Z"},
                {"id": "quest_2", "title": "Claimed done", "completed": true,
                 "progress": 40, "createdAt": "2024-02-01T08:30:00Z"}]"#,
        )
        .unwrap();
        let app = App::new(
            Storage::from_dir(dir.path().to_path_buf()),
            SoundNotifier::from_config(false),
            DesktopNotifier::new(false),
        );

        let screen = render(&app, &Ui::default());
        assert!(screen.contains("██████████ 100%"));
        assert!(screen.contains("QUESTS 1/2"));
        assert!(!screen.contains("150%"));
    }

    #[test]
    fn test_draw_initial_screen() {
        let (app, _dir) = setup();
        let screen = render(&app, &Ui::default());
        assert!(screen.contains("25:00"));
        assert!(screen.contains("PRESS START TO BEGIN QUEST"));
        assert!(screen.contains("No quests yet."));
    }

    #[test]
    fn test_add_quest_through_keys() {
        let (mut app, _dir) = setup();
        let mut ui = Ui::default();

        press(&mut app, &mut ui, KeyCode::Char('a'));
        type_text(&mut app, &mut ui, "Write report");
        press(&mut app, &mut ui, KeyCode::Enter);

        assert!(ui.input.is_none());
        assert_eq!(app.quests().len(), 1);
        assert_eq!(app.quests().as_slice()[0].title, "Write report");

        press(&mut app, &mut ui, KeyCode::Char(' '));
        assert!(app.quests().as_slice()[0].completed);

        let screen = render(&app, &ui);
        assert!(screen.contains("Write report"));
        assert!(screen.contains("QUESTS 1/1"));
    }

    #[test]
    fn test_blank_input_adds_nothing() {
        let (mut app, _dir) = setup();
        let mut ui = Ui::default();

        press(&mut app, &mut ui, KeyCode::Char('a'));
        type_text(&mut app, &mut ui, "   ");
        press(&mut app, &mut ui, KeyCode::Enter);
        assert!(app.quests().is_empty());
    }

    #[test]
    fn test_progress_keys_and_delete() {
        let (mut app, _dir) = setup();
        let mut ui = Ui::default();
        app.add_quest("Review PR", Utc::now());

        for _ in 0..3 {
            press(&mut app, &mut ui, KeyCode::Char('+'));
        }
        assert_eq!(app.quests().as_slice()[0].progress, 30);
        press(&mut app, &mut ui, KeyCode::Char('-'));
        assert_eq!(app.quests().as_slice()[0].progress, 20);

        press(&mut app, &mut ui, KeyCode::Char('d'));
        assert!(app.quests().is_empty());
        assert_eq!(ui.quest_cursor, 0);
    }

    #[test]
    fn test_distraction_pane() {
        let (mut app, _dir) = setup();
        let mut ui = Ui::default();

        press(&mut app, &mut ui, KeyCode::Tab);
        assert_eq!(ui.pane, Pane::Distractions);
        press(&mut app, &mut ui, KeyCode::Char('a'));
        type_text(&mut app, &mut ui, "phone");
        press(&mut app, &mut ui, KeyCode::Enter);
        press(&mut app, &mut ui, KeyCode::Enter);

        assert_eq!(app.distractions().len(), 1);
        assert!(app.distractions().as_slice()[0].crossed);
        assert!(app.quests().is_empty());
    }

    #[test]
    fn test_edit_focus_minutes() {
        let (mut app, _dir) = setup();
        let mut ui = Ui::default();

        press(&mut app, &mut ui, KeyCode::Char('e'));
        press(&mut app, &mut ui, KeyCode::Backspace);
        press(&mut app, &mut ui, KeyCode::Backspace);
        type_text(&mut app, &mut ui, "50");
        press(&mut app, &mut ui, KeyCode::Enter);

        assert_eq!(app.settings().focus_duration_mins, 50);
        assert!(render(&app, &ui).contains("50:00"));
    }

    #[test]
    fn test_timer_keys() {
        let (mut app, _dir) = setup();
        let mut ui = Ui::default();

        press(&mut app, &mut ui, KeyCode::Char('r'));
        assert!(app.timer().is_running());
        assert_eq!(app.timer().mode(), Mode::Rest);
        assert!(render(&app, &ui).contains("REST MODE ACTIVE"));

        press(&mut app, &mut ui, KeyCode::Char('x'));
        assert!(!app.timer().is_running());
        assert_eq!(app.timer().mode(), Mode::Focus);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _dir) = setup();
        let mut ui = Ui::default();
        assert!(!press(&mut app, &mut ui, KeyCode::Char('q')));
        assert!(!handle_key(
            &mut app,
            &mut ui,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));

        // 'q' while typing is just a letter.
        press(&mut app, &mut ui, KeyCode::Char('a'));
        assert!(press(&mut app, &mut ui, KeyCode::Char('q')));
        assert_eq!(ui.input.as_ref().unwrap().buffer, "q");
    }
}
