use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::leaderboard::compute_leaderboard;
use crate::prediction::{Prediction, PredictionError, PredictionStatus, ScoreSide, is_match_locked};
use crate::standings::{compute_actual_group_tables, compute_group_tables};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub group_name: Option<String>,
    pub stage: Option<String>,
    pub kickoff: Option<DateTime<Utc>>,
    pub result: Option<MatchResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub finalized: bool,
}

impl MatchResult {
    /// Final score, only once the result has been finalized by an admin.
    pub fn final_score(&self) -> Option<(u32, u32)> {
        if !self.finalized {
            return None;
        }
        Some((self.home_goals?, self.away_goals?))
    }
}

/// A prediction as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPrediction {
    pub match_id: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamStanding {
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

/// Group label -> sorted league table. Groups iterate in label order.
pub type GroupTables = BTreeMap<String, Vec<TeamStanding>>;

/// Leaderboard row as it comes out of the API adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLeaderboardRow {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedLeaderboardRow {
    pub user_id: Option<String>,
    pub name: String,
    pub group_stage_points: i64,
    /// Reserved for the knockout stage; always zero for now.
    pub knockout_points: i64,
    pub grand_total: i64,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub year: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    pub name: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Dashboard,
    Standings,
    Leaderboard,
    Admin,
}

/// Resources fetched with a request sequence token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Tournaments,
    Matches,
    Predictions,
    Leaderboard,
}

impl FetchKind {
    pub const ALL: [FetchKind; 4] = [
        FetchKind::Tournaments,
        FetchKind::Matches,
        FetchKind::Predictions,
        FetchKind::Leaderboard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FetchKind::Tournaments => "tournaments",
            FetchKind::Matches => "matches",
            FetchKind::Predictions => "predictions",
            FetchKind::Leaderboard => "leaderboard",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    SetToken(Option<String>),
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },
    FetchProfile,
    FetchTournaments {
        seq: u64,
    },
    FetchMatches {
        seq: u64,
        tournament_id: String,
    },
    FetchPredictions {
        seq: u64,
        tournament_id: String,
    },
    FetchLeaderboard {
        seq: u64,
        tournament_id: String,
    },
    SavePrediction {
        seq: u64,
        match_id: String,
        home: u32,
        away: u32,
    },
    FinalizeResult {
        match_id: String,
        home: u32,
        away: u32,
    },
}

#[derive(Debug, Clone)]
pub enum Delta {
    LoggedIn {
        token: String,
        user: Option<User>,
    },
    AuthFailed(String),
    SetProfile(User),
    SetTournaments {
        seq: u64,
        tournaments: Vec<Tournament>,
    },
    SetMatches {
        seq: u64,
        matches: Vec<Match>,
    },
    SetPredictions {
        seq: u64,
        predictions: Vec<ServerPrediction>,
    },
    SetLeaderboard {
        seq: u64,
        rows: Vec<RawLeaderboardRow>,
    },
    FetchFailed {
        kind: FetchKind,
        seq: u64,
        message: String,
    },
    PredictionSaved {
        match_id: String,
        seq: u64,
        points: Option<i64>,
    },
    PredictionFailed {
        match_id: String,
        seq: u64,
        message: String,
    },
    ResultFinalized {
        match_id: String,
        home: u32,
        away: u32,
    },
    ResultFailed {
        match_id: String,
        message: String,
    },
    Log(String),
}

pub struct AppState {
    pub screen: Screen,
    pub theme: Theme,
    pub token: Option<String>,
    pub user: Option<User>,
    pub auth_error: Option<String>,
    pub tournaments: Vec<Tournament>,
    pub preferred_tournament: Option<String>,
    pub current_tournament: Option<String>,
    pub matches: Vec<Match>,
    pub predictions: HashMap<String, Prediction>,
    pub group_tables: GroupTables,
    pub actual_tables: GroupTables,
    pub leaderboard: Vec<RankedLeaderboardRow>,
    pub selected: usize,
    pub edit_side: ScoreSide,
    pub leaderboard_scroll: usize,
    pub loading: Vec<FetchKind>,
    pub data_error: Option<String>,
    pub admin_status: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    next_seq: u64,
    issued_seq: HashMap<FetchKind, u64>,
    applied_seq: HashMap<FetchKind, u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Auth,
            theme: Theme::default(),
            token: None,
            user: None,
            auth_error: None,
            tournaments: Vec::new(),
            preferred_tournament: None,
            current_tournament: None,
            matches: Vec::new(),
            predictions: HashMap::new(),
            group_tables: GroupTables::new(),
            actual_tables: GroupTables::new(),
            leaderboard: Vec::new(),
            selected: 0,
            edit_side: ScoreSide::Home,
            leaderboard_scroll: 0,
            loading: Vec::new(),
            data_error: None,
            admin_status: None,
            logs: VecDeque::new(),
            help_overlay: false,
            next_seq: 0,
            issued_seq: HashMap::new(),
            applied_seq: HashMap::new(),
        }
    }

    /// Restore a persisted session: a stored token skips the auth screen.
    pub fn with_session(token: Option<String>, theme: Theme) -> Self {
        let mut state = Self::new();
        state.theme = theme;
        if token.is_some() {
            state.screen = Screen::Dashboard;
        }
        state.token = token;
        state
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    pub fn current_tournament(&self) -> Option<&Tournament> {
        let id = self.current_tournament.as_deref()?;
        self.tournaments.iter().find(|t| t.id == id)
    }

    /// Allocate a sequence token for a fetch of `kind` and mark it in flight.
    pub fn issue_seq(&mut self, kind: FetchKind) -> u64 {
        let seq = self.bump_seq();
        self.issued_seq.insert(kind, seq);
        if !self.loading.contains(&kind) {
            self.loading.push(kind);
        }
        seq
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq = self.next_seq.saturating_add(1);
        self.next_seq
    }

    /// Accepts a response only when it is newer than the last one applied for
    /// its kind. Older responses resolving late are stale.
    fn accept(&mut self, kind: FetchKind, seq: u64) -> bool {
        let applied = self.applied_seq.get(&kind).copied().unwrap_or(0);
        if seq <= applied {
            return false;
        }
        self.applied_seq.insert(kind, seq);
        if seq >= self.issued_seq.get(&kind).copied().unwrap_or(0) {
            self.loading.retain(|k| *k != kind);
        }
        true
    }

    /// Make every response for requests issued so far stale.
    fn invalidate_inflight(&mut self) {
        let cutoff = self.next_seq;
        for kind in FetchKind::ALL {
            self.applied_seq.insert(kind, cutoff);
        }
        self.loading.clear();
        for prediction in self.predictions.values_mut() {
            prediction.pending_save = None;
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.loading.is_empty()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn refresh_tables(&mut self) {
        self.group_tables = compute_group_tables(&self.matches, &self.predictions);
        self.actual_tables = compute_actual_group_tables(&self.matches);
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.matches.get(self.selected)
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Leaderboard => {
                let max = self.leaderboard.len().saturating_sub(1);
                self.leaderboard_scroll = (self.leaderboard_scroll + 1).min(max);
            }
            _ => {
                if self.matches.is_empty() {
                    self.selected = 0;
                    return;
                }
                self.selected = (self.selected + 1) % self.matches.len();
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Leaderboard => {
                self.leaderboard_scroll = self.leaderboard_scroll.saturating_sub(1);
            }
            _ => {
                if self.matches.is_empty() {
                    self.selected = 0;
                    return;
                }
                self.selected = if self.selected == 0 {
                    self.matches.len() - 1
                } else {
                    self.selected - 1
                };
            }
        }
    }

    pub fn is_locked(&self, match_id: &str, now: DateTime<Utc>) -> bool {
        self.matches
            .iter()
            .find(|m| m.id == match_id)
            .is_some_and(|m| is_match_locked(m, now))
    }

    /// Apply a user edit to one side of a prediction.
    pub fn edit_prediction(
        &mut self,
        match_id: &str,
        side: ScoreSide,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PredictionError> {
        let Some(m) = self.matches.iter().find(|m| m.id == match_id) else {
            return Err(PredictionError::UnknownMatch(match_id.to_string()));
        };
        let locked = is_match_locked(m, now);
        self.predictions
            .entry(match_id.to_string())
            .or_default()
            .edit(side, text, locked)?;
        self.refresh_tables();
        Ok(())
    }

    /// Start persisting a prediction. Returns the command to hand to the
    /// provider, or `None` when there is nothing (valid) to save.
    pub fn begin_save(&mut self, match_id: &str, now: DateTime<Utc>) -> Option<ProviderCommand> {
        let locked = self.is_locked(match_id, now);
        let seq = self.next_seq.saturating_add(1);
        let (home, away) = self.predictions.get_mut(match_id)?.begin_save(locked, seq)?;
        self.bump_seq();
        Some(ProviderCommand::SavePrediction {
            seq,
            match_id: match_id.to_string(),
            home,
            away,
        })
    }

    pub fn logout(&mut self) {
        self.invalidate_inflight();
        self.token = None;
        self.user = None;
        self.tournaments.clear();
        self.current_tournament = None;
        self.matches.clear();
        self.predictions.clear();
        self.leaderboard.clear();
        self.selected = 0;
        self.leaderboard_scroll = 0;
        self.data_error = None;
        self.admin_status = None;
        self.refresh_tables();
        self.screen = Screen::Auth;
        self.push_log("[INFO] Logged out");
    }

    fn pick_tournament(&mut self) {
        let still_present = self
            .current_tournament
            .as_deref()
            .is_some_and(|id| self.tournaments.iter().any(|t| t.id == id));
        if still_present {
            return;
        }
        let preferred = self
            .preferred_tournament
            .as_deref()
            .and_then(|id| self.tournaments.iter().find(|t| t.id == id));
        self.current_tournament = preferred
            .or_else(|| self.tournaments.first())
            .map(|t| t.id.clone());
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::LoggedIn { token, user } => {
            state.token = Some(token);
            if let Some(user) = user {
                state.push_log(format!("[INFO] Welcome, {}", user.name));
                state.user = Some(user);
            }
            state.auth_error = None;
            state.screen = Screen::Dashboard;
        }
        Delta::AuthFailed(message) => {
            state.push_log(format!("[WARN] Auth failed: {message}"));
            state.auth_error = Some(message);
        }
        Delta::SetProfile(user) => {
            state.user = Some(user);
        }
        Delta::SetTournaments { seq, tournaments } => {
            if !accept_or_log(state, FetchKind::Tournaments, seq) {
                return;
            }
            state.tournaments = tournaments;
            state.pick_tournament();
        }
        Delta::SetMatches { seq, matches } => {
            if !accept_or_log(state, FetchKind::Matches, seq) {
                return;
            }
            state.matches = matches;
            if state.selected >= state.matches.len() {
                state.selected = state.matches.len().saturating_sub(1);
            }
            state.data_error = None;
            state.refresh_tables();
        }
        Delta::SetPredictions { seq, predictions } => {
            if !accept_or_log(state, FetchKind::Predictions, seq) {
                return;
            }
            for server in &predictions {
                let entry = state.predictions.entry(server.match_id.clone()).or_default();
                // Local edits win over what the server last stored.
                if matches!(entry.status, PredictionStatus::Dirty | PredictionStatus::Saving) {
                    continue;
                }
                entry.merge_server(server);
            }
            state.refresh_tables();
        }
        Delta::SetLeaderboard { seq, rows } => {
            if !accept_or_log(state, FetchKind::Leaderboard, seq) {
                return;
            }
            state.leaderboard = compute_leaderboard(&rows);
            let max = state.leaderboard.len().saturating_sub(1);
            state.leaderboard_scroll = state.leaderboard_scroll.min(max);
        }
        Delta::FetchFailed { kind, seq, message } => {
            if !accept_or_log(state, kind, seq) {
                return;
            }
            state.push_log(format!("[WARN] Loading {} failed: {message}", kind.label()));
            state.data_error = Some(message);
        }
        Delta::PredictionSaved {
            match_id,
            seq,
            points,
        } => {
            let applied = state
                .predictions
                .get_mut(&match_id)
                .is_some_and(|p| p.save_succeeded(seq, points));
            if applied {
                state.refresh_tables();
            } else {
                state.push_log(format!("[INFO] Ignored outdated save result for match {match_id}"));
            }
        }
        Delta::PredictionFailed {
            match_id,
            seq,
            message,
        } => {
            let applied = state
                .predictions
                .get_mut(&match_id)
                .is_some_and(|p| p.save_failed(seq, &message));
            if applied {
                state.push_log(format!("[WARN] Saving match {match_id} failed: {message}"));
            }
        }
        Delta::ResultFinalized {
            match_id,
            home,
            away,
        } => {
            if let Some(m) = state.matches.iter_mut().find(|m| m.id == match_id) {
                m.result = Some(MatchResult {
                    home_goals: Some(home),
                    away_goals: Some(away),
                    finalized: true,
                });
            }
            state.admin_status = Some(format!("Saved result {home}-{away}"));
            state.refresh_tables();
        }
        Delta::ResultFailed { match_id, message } => {
            state.push_log(format!("[WARN] Finalizing match {match_id} failed: {message}"));
            state.admin_status = Some(message);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn accept_or_log(state: &mut AppState, kind: FetchKind, seq: u64) -> bool {
    if state.accept(kind, seq) {
        return true;
    }
    state.push_log(format!("[INFO] Dropped stale {} response (#{seq})", kind.label()));
    false
}
