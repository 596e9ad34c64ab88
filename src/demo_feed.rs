use std::collections::HashMap;

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::prediction::is_match_locked;
use crate::source::DataSource;
use crate::state::{
    AuthSession, Match, MatchResult, RawLeaderboardRow, ServerPrediction, Tournament, User,
};

pub const DEMO_TOURNAMENT_ID: &str = "demo-cup";

const GROUPS: &[(&str, [&str; 4])] = &[
    ("Group A", ["Mexico", "South Africa", "Korea Republic", "Denmark"]),
    ("Group B", ["Canada", "Switzerland", "Qatar", "Italy"]),
    ("Group C", ["Brazil", "Morocco", "Scotland", "Haiti"]),
    ("Group D", ["USA", "Paraguay", "Australia", "Turkey"]),
];

// Round-robin order inside a group of four.
const FIXTURE_PAIRS: [(usize, usize); 6] = [(0, 1), (2, 3), (0, 2), (1, 3), (0, 3), (1, 2)];

const RIVALS: &[&str] = &["Alex", "Sam", "Jordan", "Robin", "Charlie", "Jamie", "Morgan"];

const KICKOFF_SPACING_HOURS: i64 = 6;

/// Offline stand-in for the pool backend: one generated tournament, a few
/// rival players, and in-memory predictions.
///
/// Scoring here is demo-only (exact score 3, right outcome 1); the real
/// backend owns its own rules.
pub struct DemoSource {
    rng: StdRng,
    pinned_now: Option<DateTime<Utc>>,
    token: Option<String>,
    user: Option<User>,
    matches: Vec<Match>,
    predictions: HashMap<String, (u32, u32)>,
    rivals: Vec<(String, i64)>,
}

impl DemoSource {
    /// `now` anchors the schedule: earlier kickoffs are already played.
    /// Lock checks follow the wall clock unless pinned with [`DemoSource::with_clock`].
    pub fn new(seed: u64, now: DateTime<Utc>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = now - Duration::days(2);
        let mut matches = Vec::new();
        let mut slot = 0i64;
        for (round, pair) in FIXTURE_PAIRS.iter().enumerate() {
            for (group, teams) in GROUPS {
                let kickoff = start + Duration::hours(slot * KICKOFF_SPACING_HOURS);
                slot += 1;
                let result = (kickoff < now).then(|| MatchResult {
                    home_goals: Some(rng.gen_range(0..=3)),
                    away_goals: Some(rng.gen_range(0..=3)),
                    finalized: true,
                });
                matches.push(Match {
                    id: format!("{}{}", group.trim_start_matches("Group ").to_lowercase(), round + 1),
                    home_team: teams[pair.0].to_string(),
                    away_team: teams[pair.1].to_string(),
                    group_name: Some((*group).to_string()),
                    stage: Some("Group stage".to_string()),
                    kickoff: Some(kickoff),
                    result,
                });
            }
        }
        let rivals = RIVALS
            .iter()
            .map(|name| ((*name).to_string(), rng.gen_range(0..=24)))
            .collect();
        Self {
            rng,
            pinned_now: None,
            token: None,
            user: None,
            matches,
            predictions: HashMap::new(),
            rivals,
        }
    }

    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.pinned_now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.pinned_now.unwrap_or_else(Utc::now)
    }

    fn require_auth(&self) -> Result<()> {
        if self.token.is_none() {
            bail!("Not logged in");
        }
        Ok(())
    }

    fn check_tournament(tournament_id: &str) -> Result<()> {
        if tournament_id != DEMO_TOURNAMENT_ID {
            bail!("Unknown tournament {tournament_id}");
        }
        Ok(())
    }

    fn sign_in(&mut self, name: &str, email: &str) -> AuthSession {
        let token = format!("demo-{}", self.rng.gen_range(100_000..1_000_000));
        let user = User {
            name: name.to_string(),
            email: Some(email.to_string()),
            is_admin: name.to_ascii_lowercase().starts_with("admin"),
        };
        self.token = Some(token.clone());
        self.user = Some(user.clone());
        AuthSession {
            token,
            user: Some(user),
        }
    }

    fn points_for(&self, match_id: &str) -> Option<i64> {
        let (home, away) = *self.predictions.get(match_id)?;
        let m = self.matches.iter().find(|m| m.id == match_id)?;
        let (actual_home, actual_away) = m.result.as_ref()?.final_score()?;
        if (home, away) == (actual_home, actual_away) {
            Some(3)
        } else if home.cmp(&away) == actual_home.cmp(&actual_away) {
            Some(1)
        } else {
            Some(0)
        }
    }

    fn user_points(&self) -> i64 {
        self.predictions
            .keys()
            .filter_map(|id| self.points_for(id))
            .sum()
    }
}

impl DataSource for DemoSource {
    fn set_token(&mut self, token: Option<String>) {
        if token.is_none() {
            self.user = None;
        }
        self.token = token;
    }

    fn login(&mut self, email: &str, password: &str) -> Result<AuthSession> {
        if email.trim().is_empty() || password.is_empty() {
            bail!("Email and password are required");
        }
        let name = email.split('@').next().unwrap_or(email).trim().to_string();
        Ok(self.sign_in(&name, email.trim()))
    }

    fn register(&mut self, name: &str, email: &str, password: &str) -> Result<AuthSession> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            bail!("Name, email and password are required");
        }
        Ok(self.sign_in(name.trim(), email.trim()))
    }

    fn profile(&mut self) -> Result<User> {
        self.require_auth()?;
        Ok(self.user.clone().unwrap_or_else(|| User {
            name: "Demo player".to_string(),
            email: None,
            is_admin: false,
        }))
    }

    fn tournaments(&mut self) -> Result<Vec<Tournament>> {
        Ok(vec![Tournament {
            id: DEMO_TOURNAMENT_ID.to_string(),
            name: "Dummy Cup".to_string(),
            year: Some(2026),
        }])
    }

    fn matches(&mut self, tournament_id: &str) -> Result<Vec<Match>> {
        Self::check_tournament(tournament_id)?;
        Ok(self.matches.clone())
    }

    fn predictions(&mut self, tournament_id: &str) -> Result<Vec<ServerPrediction>> {
        Self::check_tournament(tournament_id)?;
        self.require_auth()?;
        let mut out: Vec<ServerPrediction> = self
            .predictions
            .iter()
            .map(|(id, (home, away))| ServerPrediction {
                match_id: id.clone(),
                home_goals: Some(*home),
                away_goals: Some(*away),
                points: self.points_for(id),
            })
            .collect();
        out.sort_by(|a, b| a.match_id.cmp(&b.match_id));
        Ok(out)
    }

    fn save_prediction(&mut self, match_id: &str, home: u32, away: u32) -> Result<Option<i64>> {
        self.require_auth()?;
        let Some(m) = self.matches.iter().find(|m| m.id == match_id) else {
            bail!("Unknown match {match_id}");
        };
        if is_match_locked(m, self.now()) {
            bail!("Predictions for this match are locked");
        }
        self.predictions.insert(match_id.to_string(), (home, away));
        Ok(self.points_for(match_id))
    }

    fn leaderboard(&mut self, tournament_id: &str) -> Result<Vec<RawLeaderboardRow>> {
        Self::check_tournament(tournament_id)?;
        let mut rows: Vec<RawLeaderboardRow> = self
            .rivals
            .iter()
            .enumerate()
            .map(|(idx, (name, points))| RawLeaderboardRow {
                user_id: Some(format!("rival-{}", idx + 1)),
                name: Some(name.clone()),
                points: Some(*points),
            })
            .collect();
        if let Some(user) = &self.user {
            rows.push(RawLeaderboardRow {
                user_id: Some("me".to_string()),
                name: Some(user.name.clone()),
                points: Some(self.user_points()),
            });
        }
        Ok(rows)
    }

    fn finalize_result(&mut self, match_id: &str, home: u32, away: u32) -> Result<()> {
        self.require_auth()?;
        if !self.user.as_ref().is_some_and(|u| u.is_admin) {
            bail!("Admin only");
        }
        let Some(m) = self.matches.iter_mut().find(|m| m.id == match_id) else {
            bail!("Unknown match {match_id}");
        };
        m.result = Some(MatchResult {
            home_goals: Some(home),
            away_goals: Some(away),
            finalized: true,
        });
        Ok(())
    }
}
