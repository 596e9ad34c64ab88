use anyhow::Result;

use crate::api_client::ApiClient;
use crate::state::{AuthSession, Match, RawLeaderboardRow, ServerPrediction, Tournament, User};

/// Where the provider gets its data from: the pool backend or the offline demo.
pub trait DataSource: Send {
    fn set_token(&mut self, token: Option<String>);
    fn login(&mut self, email: &str, password: &str) -> Result<AuthSession>;
    fn register(&mut self, name: &str, email: &str, password: &str) -> Result<AuthSession>;
    fn profile(&mut self) -> Result<User>;
    fn tournaments(&mut self) -> Result<Vec<Tournament>>;
    fn matches(&mut self, tournament_id: &str) -> Result<Vec<Match>>;
    fn predictions(&mut self, tournament_id: &str) -> Result<Vec<ServerPrediction>>;
    fn save_prediction(&mut self, match_id: &str, home: u32, away: u32) -> Result<Option<i64>>;
    fn leaderboard(&mut self, tournament_id: &str) -> Result<Vec<RawLeaderboardRow>>;
    fn finalize_result(&mut self, match_id: &str, home: u32, away: u32) -> Result<()>;
}

pub struct ApiSource {
    client: ApiClient,
}

impl ApiSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl DataSource for ApiSource {
    fn set_token(&mut self, token: Option<String>) {
        self.client.set_token(token);
    }

    fn login(&mut self, email: &str, password: &str) -> Result<AuthSession> {
        let session = self.client.login(email, password)?;
        self.client.set_token(Some(session.token.clone()));
        Ok(session)
    }

    fn register(&mut self, name: &str, email: &str, password: &str) -> Result<AuthSession> {
        let session = self.client.register(name, email, password)?;
        self.client.set_token(Some(session.token.clone()));
        Ok(session)
    }

    fn profile(&mut self) -> Result<User> {
        self.client.me()
    }

    fn tournaments(&mut self) -> Result<Vec<Tournament>> {
        self.client.tournaments()
    }

    fn matches(&mut self, tournament_id: &str) -> Result<Vec<Match>> {
        self.client.matches(tournament_id)
    }

    fn predictions(&mut self, tournament_id: &str) -> Result<Vec<ServerPrediction>> {
        self.client.predictions(tournament_id)
    }

    fn save_prediction(&mut self, match_id: &str, home: u32, away: u32) -> Result<Option<i64>> {
        self.client.save_prediction(match_id, home, away)
    }

    fn leaderboard(&mut self, tournament_id: &str) -> Result<Vec<RawLeaderboardRow>> {
        self.client.leaderboard(tournament_id)
    }

    fn finalize_result(&mut self, match_id: &str, home: u32, away: u32) -> Result<()> {
        self.client.finalize_result(match_id, home, away)
    }
}
