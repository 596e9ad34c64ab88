use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::trim_base_url;
use crate::state::{AuthSession, Match, RawLeaderboardRow, ServerPrediction, Tournament, User};
use crate::wire;

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{method} {path} request failed: {source}")]
    Transport {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        message: String,
    },
}

/// Error text for a non-2xx response: the body when there is one, otherwise
/// a short summary of the request.
pub fn status_message(method: &str, path: &str, status: u16, body: &str) -> String {
    let text = body.trim();
    if text.is_empty() {
        format!("{method} {path} failed ({status})")
    } else {
        text.to_string()
    }
}

/// Blocking client for the prediction pool backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> Result<String> {
        let req = http_client()?.get(self.url(path));
        self.send("GET", path, req)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<String> {
        let req = http_client()?.post(self.url(path)).json(body);
        self.send("POST", path, req)
    }

    fn send(&self, method: &'static str, path: &str, req: RequestBuilder) -> Result<String> {
        let req = match self.token.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        debug!(method, path, "api request");
        let resp = req.send().map_err(|source| ApiError::Transport {
            method,
            path: path.to_string(),
            source,
        })?;
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        if !status.is_success() {
            warn!(method, path, status = status.as_u16(), "api request rejected");
            return Err(ApiError::Status {
                method,
                path: path.to_string(),
                status: status.as_u16(),
                message: status_message(method, path, status.as_u16(), &body),
            }
            .into());
        }
        Ok(body)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let body = self.post(
            "/auth/login",
            &json!({ "email": email, "password": password }),
        )?;
        wire::parse_auth_json(&body)
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthSession> {
        let body = self.post(
            "/auth/register",
            &json!({ "name": name, "email": email, "password": password }),
        )?;
        wire::parse_auth_json(&body)
    }

    pub fn me(&self) -> Result<User> {
        wire::parse_user_json(&self.get("/auth/me")?)
    }

    pub fn tournaments(&self) -> Result<Vec<Tournament>> {
        wire::parse_tournaments_json(&self.get("/tournaments")?)
    }

    pub fn matches(&self, tournament_id: &str) -> Result<Vec<Match>> {
        wire::parse_matches_json(&self.get(&format!("/tournaments/{tournament_id}/matches"))?)
    }

    pub fn predictions(&self, tournament_id: &str) -> Result<Vec<ServerPrediction>> {
        wire::parse_predictions_json(
            &self.get(&format!("/tournaments/{tournament_id}/predictions"))?,
        )
    }

    /// Persist one prediction; returns points if the backend echoes them.
    pub fn save_prediction(&self, match_id: &str, home: u32, away: u32) -> Result<Option<i64>> {
        let body = self.post(
            "/predictions",
            &json!({
                "match_id": match_id,
                "predicted_home_goals": home,
                "predicted_away_goals": away,
            }),
        )?;
        Ok(wire::parse_saved_points(&body))
    }

    pub fn leaderboard(&self, tournament_id: &str) -> Result<Vec<RawLeaderboardRow>> {
        wire::parse_leaderboard_json(
            &self.get(&format!("/tournaments/{tournament_id}/leaderboard"))?,
        )
    }

    pub fn finalize_result(&self, match_id: &str, home: u32, away: u32) -> Result<()> {
        self.post(
            &format!("/admin/matches/{match_id}/result"),
            &json!({ "home_goals": home, "away_goals": away }),
        )?;
        Ok(())
    }
}
