use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::{info, warn};

use wc26_pool::api_client::ApiClient;
use wc26_pool::config::{self, AppConfig, SourceKind};
use wc26_pool::demo_feed::DemoSource;
use wc26_pool::feed::spawn_provider;
use wc26_pool::ordering::parse_goals;
use wc26_pool::prediction::{PredictionStatus, ScoreSide, is_match_locked, status_label};
use wc26_pool::session::{self, Session};
use wc26_pool::source::ApiSource;
use wc26_pool::standings::group_label;
use wc26_pool::state::{
    AppState, Delta, FetchKind, GroupTables, ProviderCommand, Screen, Theme, apply_delta,
};
use wc26_pool::telemetry;

const MAX_GOAL_DIGITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthField {
    Name,
    Email,
    Password,
}

struct AuthForm {
    mode: AuthMode,
    focus: usize,
    name: String,
    email: String,
    password: String,
}

impl AuthForm {
    fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            focus: 0,
            name: String::new(),
            email: String::new(),
            password: String::new(),
        }
    }

    fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Email, AuthField::Password],
            AuthMode::Register => &[AuthField::Name, AuthField::Email, AuthField::Password],
        }
    }

    fn focused(&self) -> AuthField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    fn field_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::Name => &mut self.name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    fn next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.focus = 0;
    }
}

struct AdminForm {
    home: String,
    away: String,
    side: ScoreSide,
}

struct App {
    state: AppState,
    session: Session,
    config: AppConfig,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    last_refresh: Instant,
    auth: AuthForm,
    admin: AdminForm,
    seen_token: Option<String>,
    seen_tournament: Option<String>,
}

impl App {
    fn new(config: AppConfig, session: Session, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let mut state = AppState::with_session(session.token.clone(), session.theme);
        state.preferred_tournament = config.tournament_id.clone();
        Self {
            seen_token: state.token.clone(),
            state,
            session,
            config,
            should_quit: false,
            cmd_tx,
            last_refresh: Instant::now(),
            auth: AuthForm::new(),
            admin: AdminForm {
                home: String::new(),
                away: String::new(),
                side: ScoreSide::Home,
            },
            seen_tournament: None,
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Data provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Data provider stopped");
        }
    }

    fn start(&mut self) {
        if let Some(token) = self.state.token.clone() {
            self.send(ProviderCommand::SetToken(Some(token)));
            self.send(ProviderCommand::FetchProfile);
            self.request_tournaments();
        }
    }

    fn request_tournaments(&mut self) {
        let seq = self.state.issue_seq(FetchKind::Tournaments);
        self.send(ProviderCommand::FetchTournaments { seq });
    }

    fn request_data(&mut self) {
        let Some(tournament_id) = self.state.current_tournament.clone() else {
            return;
        };
        let seq = self.state.issue_seq(FetchKind::Matches);
        self.send(ProviderCommand::FetchMatches {
            seq,
            tournament_id: tournament_id.clone(),
        });
        if self.state.is_logged_in() {
            let seq = self.state.issue_seq(FetchKind::Predictions);
            self.send(ProviderCommand::FetchPredictions {
                seq,
                tournament_id: tournament_id.clone(),
            });
        }
        let seq = self.state.issue_seq(FetchKind::Leaderboard);
        self.send(ProviderCommand::FetchLeaderboard { seq, tournament_id });
        self.last_refresh = Instant::now();
    }

    /// React to state changes made by deltas: new login, new tournament.
    fn after_deltas(&mut self) {
        if self.state.token != self.seen_token {
            self.seen_token = self.state.token.clone();
            self.session.token = self.state.token.clone();
            self.persist_session();
            if self.state.is_logged_in() {
                self.auth.password.clear();
                if self.state.user.is_none() {
                    self.send(ProviderCommand::FetchProfile);
                }
                self.request_tournaments();
            }
        }
        if self.state.current_tournament != self.seen_tournament {
            self.seen_tournament = self.state.current_tournament.clone();
            self.request_data();
        }
    }

    fn maybe_refresh(&mut self) {
        if self.state.is_logged_in() && self.last_refresh.elapsed() >= self.config.refresh {
            self.request_data();
        }
    }

    fn persist_session(&mut self) {
        if let Err(err) = session::save_session(&self.session) {
            warn!("saving session failed: {err:#}");
            self.state.push_log(format!("[WARN] Saving session failed: {err:#}"));
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }
        match self.state.screen {
            Screen::Auth => self.on_auth_key(key),
            Screen::Dashboard => {
                if !self.on_prediction_key(key) {
                    self.on_global_key(key);
                }
            }
            Screen::Admin => {
                if !self.on_admin_key(key) {
                    self.on_global_key(key);
                }
            }
            Screen::Standings | Screen::Leaderboard => self.on_global_key(key),
        }
    }

    fn on_global_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('d') => self.switch_screen(Screen::Dashboard),
            KeyCode::Char('s') => self.switch_screen(Screen::Standings),
            KeyCode::Char('l') => self.switch_screen(Screen::Leaderboard),
            KeyCode::Char('a') if self.state.is_admin() => self.switch_screen(Screen::Admin),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
            KeyCode::Char('r') => {
                self.request_data();
                self.state.push_log("[INFO] Refresh requested");
            }
            KeyCode::Char('t') => {
                self.state.theme = self.state.theme.toggled();
                self.session.theme = self.state.theme;
                self.persist_session();
            }
            KeyCode::Char('o') => self.logout(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn switch_screen(&mut self, screen: Screen) {
        if self.state.screen == Screen::Dashboard {
            self.save_selected();
        }
        self.state.screen = screen;
    }

    fn move_selection(&mut self, forward: bool) {
        // Leaving a row saves it, like blurring the score fields.
        if self.state.screen == Screen::Dashboard {
            self.save_selected();
        }
        if forward {
            self.state.select_next();
        } else {
            self.state.select_prev();
        }
        if self.state.screen == Screen::Admin {
            self.admin.home.clear();
            self.admin.away.clear();
            self.admin.side = ScoreSide::Home;
        }
    }

    fn logout(&mut self) {
        self.state.logout();
        self.send(ProviderCommand::SetToken(None));
        self.seen_tournament = None;
        info!("logged out");
    }

    /// Returns true when the key was consumed by the prediction editor.
    fn on_prediction_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.edit_selected(|text| {
                    if text.len() < MAX_GOAL_DIGITS {
                        text.push(c);
                    }
                });
                true
            }
            KeyCode::Backspace => {
                self.edit_selected(|text| {
                    text.pop();
                });
                true
            }
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                self.state.edit_side = self.state.edit_side.other();
                true
            }
            KeyCode::Enter => {
                self.save_selected();
                true
            }
            _ => false,
        }
    }

    fn edit_selected(&mut self, change: impl FnOnce(&mut String)) {
        let Some(match_id) = self.state.selected_match().map(|m| m.id.clone()) else {
            return;
        };
        let side = self.state.edit_side;
        let mut text = self
            .state
            .predictions
            .get(&match_id)
            .map(|p| p.side(side).to_string())
            .unwrap_or_default();
        change(&mut text);
        if let Err(err) = self.state.edit_prediction(&match_id, side, &text, Utc::now()) {
            self.state.push_log(format!("[INFO] {err}"));
        }
    }

    fn save_selected(&mut self) {
        let Some(match_id) = self.state.selected_match().map(|m| m.id.clone()) else {
            return;
        };
        if let Some(cmd) = self.state.begin_save(&match_id, Utc::now()) {
            self.send(cmd);
        }
    }

    fn on_admin_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let field = match self.admin.side {
                    ScoreSide::Home => &mut self.admin.home,
                    ScoreSide::Away => &mut self.admin.away,
                };
                if field.len() < MAX_GOAL_DIGITS {
                    field.push(c);
                }
                true
            }
            KeyCode::Backspace => {
                match self.admin.side {
                    ScoreSide::Home => self.admin.home.pop(),
                    ScoreSide::Away => self.admin.away.pop(),
                };
                true
            }
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                self.admin.side = self.admin.side.other();
                true
            }
            KeyCode::Enter => {
                self.submit_result();
                true
            }
            _ => false,
        }
    }

    fn submit_result(&mut self) {
        let Some(match_id) = self.state.selected_match().map(|m| m.id.clone()) else {
            return;
        };
        let (Some(home), Some(away)) = (parse_goals(&self.admin.home), parse_goals(&self.admin.away))
        else {
            self.state.admin_status = Some("Enter both home and away goals".to_string());
            return;
        };
        self.state.admin_status = Some("Saving...".to_string());
        self.send(ProviderCommand::FinalizeResult {
            match_id,
            home,
            away,
        });
    }

    fn on_auth_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(2) => self.auth.toggle_mode(),
            KeyCode::Tab | KeyCode::Down => self.auth.next(),
            KeyCode::Up => {
                let len = self.auth.fields().len();
                self.auth.focus = (self.auth.focus + len - 1) % len;
            }
            KeyCode::Backspace => {
                let field = self.auth.focused();
                self.auth.field_mut(field).pop();
            }
            KeyCode::Enter => self.submit_auth(),
            KeyCode::Char(c) => {
                let field = self.auth.focused();
                self.auth.field_mut(field).push(c);
            }
            _ => {}
        }
    }

    fn submit_auth(&mut self) {
        let email = self.auth.email.trim().to_string();
        let password = self.auth.password.clone();
        if email.is_empty() || password.is_empty() {
            self.state.auth_error = Some("Email and password are required".to_string());
            return;
        }
        self.state.auth_error = None;
        let cmd = match self.auth.mode {
            AuthMode::Login => ProviderCommand::Login { email, password },
            AuthMode::Register => ProviderCommand::Register {
                name: self.auth.name.trim().to_string(),
                email,
                password,
            },
        };
        self.send(cmd);
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    if let Err(err) = telemetry::init_tracing() {
        eprintln!("warning: logging disabled: {err:#}");
    }
    let config = AppConfig::from_env();
    let session = session::load_session();
    info!(source = ?config.source, base_url = %config.api_base_url, "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    match config.source {
        SourceKind::Api => {
            spawn_provider(ApiSource::new(ApiClient::new(&config.api_base_url)), tx, cmd_rx);
        }
        SourceKind::Demo => {
            let seed = Utc::now().timestamp().unsigned_abs();
            spawn_provider(DemoSource::new(seed, Utc::now()), tx, cmd_rx);
        }
    }

    let mut app = App::new(config, session, Some(cmd_tx));
    app.start();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.after_deltas();
        app.maybe_refresh();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            if app.state.screen == Screen::Dashboard {
                app.save_selected();
            }
            return Ok(());
        }
    }
}

struct Palette {
    base: Style,
    accent: Style,
    muted: Style,
    selected: Style,
    warn: Style,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            base: Style::default().fg(Color::Gray).bg(Color::Black),
            accent: Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
            selected: Style::default().fg(Color::White).bg(Color::Blue),
            warn: Style::default().fg(Color::LightRed),
        },
        Theme::Light => Palette {
            base: Style::default().fg(Color::Black).bg(Color::White),
            accent: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::Gray),
            selected: Style::default().fg(Color::Black).bg(Color::LightCyan),
            warn: Style::default().fg(Color::Red),
        },
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let pal = palette(app.state.theme);
    frame.render_widget(Block::default().style(pal.base), frame.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(pal.accent)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Auth => render_auth(frame, chunks[1], app, &pal),
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state, &pal),
        Screen::Standings => render_standings(frame, chunks[1], &app.state, &pal),
        Screen::Leaderboard => render_leaderboard(frame, chunks[1], &app.state, &pal),
        Screen::Admin => render_admin(frame, chunks[1], app, &pal),
    }

    render_console(frame, chunks[2], &app.state, &pal);

    let footer = Paragraph::new(footer_text(&app.state))
        .style(pal.muted)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size(), &pal);
    }
}

fn header_text(state: &AppState) -> String {
    let tournament = state
        .current_tournament()
        .map(|t| match t.year {
            Some(year) => format!("{} ({year})", t.name),
            None => t.name.clone(),
        })
        .unwrap_or_else(|| "No tournament".to_string());
    let user = state
        .user
        .as_ref()
        .map(|u| if u.is_admin { format!("{} [admin]", u.name) } else { u.name.clone() })
        .unwrap_or_default();
    let loading = if state.is_loading() { " | loading..." } else { "" };
    format!(
        "WC26 POOL | {} | {tournament} | {user}{loading}",
        screen_label(state.screen)
    )
}

fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Auth => "Sign in",
        Screen::Dashboard => "Predictions",
        Screen::Standings => "Standings",
        Screen::Leaderboard => "Leaderboard",
        Screen::Admin => "Admin",
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Auth => "Tab/↑/↓ Field | Enter Submit | F2 Login/Register | Esc Quit".to_string(),
        Screen::Dashboard => {
            "0-9 Score | Tab Home/Away | Enter Save | j/k Move | s Standings | l Leaderboard | r Refresh | t Theme | o Logout | ? Help | q Quit".to_string()
        }
        Screen::Admin => {
            "0-9 Goals | Tab Home/Away | Enter Finalize | j/k Match | d Predictions | q Quit".to_string()
        }
        Screen::Standings | Screen::Leaderboard => {
            "d Predictions | s Standings | l Leaderboard | j/k Scroll | r Refresh | t Theme | ? Help | q Quit".to_string()
        }
    }
}

fn render_auth(frame: &mut Frame, area: Rect, app: &App, pal: &Palette) {
    let form = &app.auth;
    let title = match form.mode {
        AuthMode::Login => "Log in",
        AuthMode::Register => "Create account",
    };
    let mut lines = vec![Line::from(Span::styled(title, pal.accent)), Line::from("")];
    for (idx, field) in form.fields().iter().enumerate() {
        let (label, value) = match field {
            AuthField::Name => ("Name", form.name.clone()),
            AuthField::Email => ("Email", form.email.clone()),
            AuthField::Password => ("Password", "*".repeat(form.password.chars().count())),
        };
        let style = if idx == form.focus { pal.selected } else { pal.base };
        lines.push(Line::from(vec![
            Span::styled(format!("{label:>10}: "), pal.muted),
            Span::styled(format!("{value:<32}"), style),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(err) = &app.state.auth_error {
        lines.push(Line::from(Span::styled(err.clone(), pal.warn)));
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Account "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, centered_rect(60, 50, area));
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let mut lines = Vec::new();
    if let Some(err) = &state.data_error {
        lines.push(Line::from(Span::styled(err.clone(), pal.warn)));
    }
    if state.matches.is_empty() {
        lines.push(Line::from(Span::styled("No matches loaded yet", pal.muted)));
    }
    lines.push(Line::from(Span::styled(
        format!(
            "{:<13} {:<9} {:<34} {:>7} {:>5} {:>4}  {}",
            "Kick-off", "Group", "Match", "Pred", "Act", "Pts", "Status"
        ),
        pal.muted,
    )));

    let now = Utc::now();
    let visible = usize::from(cols[0].height.saturating_sub(3));
    let (start, end) = visible_range(state.selected, state.matches.len(), visible);
    for idx in start..end {
        let m = &state.matches[idx];
        let pred = state.predictions.get(&m.id);
        let locked = is_match_locked(m, now);
        let selected = idx == state.selected;
        let (home, away) = pred
            .map(|p| (p.home.as_str(), p.away.as_str()))
            .unwrap_or(("", ""));
        let pred_text = if selected {
            match state.edit_side {
                ScoreSide::Home => format!("[{:>2}]:{:<2}", home, away),
                ScoreSide::Away => format!("{:>2}:[{:<2}]", home, away),
            }
        } else {
            format!("{:>2}:{:<2}", home, away)
        };
        let actual = m
            .result
            .as_ref()
            .and_then(|r| r.final_score())
            .map(|(h, a)| format!("{h}:{a}"))
            .unwrap_or_else(|| "-".to_string());
        let points = pred
            .and_then(|p| p.points)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = pred
            .map(|p| status_label(p.status, locked))
            .unwrap_or_else(|| if locked { "Locked" } else { "" });
        let kickoff = m
            .kickoff
            .map(|k| k.with_timezone(&Local).format("%a %d %b %H:%M").to_string())
            .unwrap_or_else(|| "TBC".to_string());
        let text = format!(
            "{:<13} {:<9} {:<34} {:>7} {:>5} {:>4}  {}",
            truncate(&kickoff, 13),
            truncate(group_label(m), 9),
            truncate(&format!("{} vs {}", m.home_team, m.away_team), 34),
            pred_text,
            actual,
            points,
            status
        );
        let style = if selected {
            pal.selected
        } else if locked {
            pal.muted
        } else if pred.is_some_and(|p| p.status == PredictionStatus::Error) {
            pal.warn
        } else {
            pal.base
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Your group stage predictions (lock 2h before kick-off) "),
    );
    frame.render_widget(list, cols[0]);

    let tables = Paragraph::new(group_table_lines(
        &state.group_tables,
        pal,
        "Enter at least one full scoreline to see your predicted tables.",
    ))
    .block(Block::default().borders(Borders::ALL).title(" Predicted standings "));
    frame.render_widget(tables, cols[1]);
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let predicted = Paragraph::new(group_table_lines(
        &state.group_tables,
        pal,
        "No complete predictions yet.",
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Predicted (your scores only) "),
    );
    frame.render_widget(predicted, cols[0]);
    let actual = Paragraph::new(group_table_lines(
        &state.actual_tables,
        pal,
        "No finalized results yet.",
    ))
    .block(Block::default().borders(Borders::ALL).title(" Actual results "));
    frame.render_widget(actual, cols[1]);
}

fn group_table_lines<'a>(tables: &'a GroupTables, pal: &Palette, empty: &'a str) -> Vec<Line<'a>> {
    if tables.is_empty() {
        return vec![Line::from(Span::styled(empty, pal.muted))];
    }
    let mut lines = Vec::new();
    for (group, teams) in tables {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<16}", truncate(group, 16)), pal.accent),
            Span::styled("  P  W  D  L  GF  GA  GD Pts", pal.muted),
        ]));
        for t in teams {
            lines.push(Line::from(format!(
                "{:<16}{:>3}{:>3}{:>3}{:>3}{:>4}{:>4}{:>4}{:>4}",
                truncate(&t.team, 16),
                t.played,
                t.won,
                t.drawn,
                t.lost,
                t.goals_for,
                t.goals_against,
                format!("{:+}", t.goal_difference),
                t.points
            )));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn render_leaderboard(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:>9}  {:<24} {:>12} {:>10} {:>12}",
            "Rank (GS)", "Name", "Group Stage", "Knockouts", "Grand Total"
        ),
        pal.muted,
    ))];
    if state.leaderboard.is_empty() {
        lines.push(Line::from(Span::styled("No leaderboard data yet.", pal.muted)));
    }
    let me = state.user.as_ref().map(|u| u.name.as_str());
    for row in state.leaderboard.iter().skip(state.leaderboard_scroll) {
        let style = if Some(row.name.as_str()) == me {
            pal.accent
        } else {
            pal.base
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{:>9}  {:<24} {:>12} {:>10} {:>12}",
                row.rank,
                truncate(&row.name, 24),
                row.group_stage_points,
                row.knockout_points,
                row.grand_total
            ),
            style,
        )));
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Leaderboard "));
    frame.render_widget(widget, area);
}

fn render_admin(frame: &mut Frame, area: Rect, app: &App, pal: &Palette) {
    let state = &app.state;
    let mut lines = vec![Line::from(Span::styled("Admin: finalise a match", pal.accent))];
    match state.selected_match() {
        Some(m) => {
            let label = [m.stage.as_deref(), m.group_name.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" - ");
            lines.push(Line::from(format!(
                "{label}{}{} vs {}",
                if label.is_empty() { "" } else { " | " },
                m.home_team,
                m.away_team
            )));
            let field = |text: &str, active: bool| {
                let style = if active { pal.selected } else { pal.base };
                Span::styled(format!("[{text:>2}]"), style)
            };
            lines.push(Line::from(vec![
                Span::styled("Home goals ", pal.muted),
                field(&app.admin.home, app.admin.side == ScoreSide::Home),
                Span::styled("   Away goals ", pal.muted),
                field(&app.admin.away, app.admin.side == ScoreSide::Away),
            ]));
        }
        None => lines.push(Line::from(Span::styled("No matches loaded", pal.muted))),
    }
    if let Some(status) = &state.admin_status {
        lines.push(Line::from(""));
        lines.push(Line::from(status.clone()));
    }
    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let height = usize::from(area.height.saturating_sub(2));
    let lines: Vec<Line> = state
        .logs
        .iter()
        .skip(state.logs.len().saturating_sub(height))
        .map(|msg| {
            let style = if msg.starts_with("[WARN]") { pal.warn } else { pal.muted };
            Line::from(Span::styled(msg.as_str(), style))
        })
        .collect();
    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Log "));
    frame.render_widget(widget, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, pal: &Palette) {
    let rect = centered_rect(60, 60, area);
    let text = vec![
        Line::from(Span::styled("Keys", pal.accent)),
        Line::from("d / s / l / a   Predictions / Standings / Leaderboard / Admin"),
        Line::from("j k ↑ ↓         Move selection (leaving a row saves it)"),
        Line::from("0-9, Backspace  Edit the highlighted score"),
        Line::from("Tab ← →         Switch between home and away"),
        Line::from("Enter           Save prediction / finalize result"),
        Line::from("r               Refresh matches, predictions and leaderboard"),
        Line::from("t               Toggle light/dark theme"),
        Line::from("o               Log out"),
        Line::from("q / Ctrl-C      Quit"),
        Line::from(""),
        Line::from("Predictions lock 2 hours before kick-off."),
    ];
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(text)
            .style(pal.base)
            .block(Block::default().borders(Borders::ALL).title(" Help ")),
        rect,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    let start = selected.saturating_sub(visible.saturating_sub(1)).min(total.saturating_sub(visible));
    let end = (start + visible).min(total);
    (start, end)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max.saturating_sub(1)).chain(['…']).collect()
}
