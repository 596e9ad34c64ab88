//! Adapters from backend JSON to the typed rows the rest of the crate uses.
//!
//! The backend has renamed fields more than once, so every field is looked up
//! under a short list of known aliases. Nothing past this module sees raw JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::ordering::{goals_from_value, points_from_value};
use crate::state::{
    AuthSession, Match, MatchResult, RawLeaderboardRow, ServerPrediction, Tournament, User,
};

pub fn parse_matches_json(raw: &str) -> Result<Vec<Match>> {
    let Some(root) = parse_root(raw).context("invalid matches json")? else {
        return Ok(Vec::new());
    };
    Ok(list_items(&root, &["matches", "data"])
        .iter()
        .filter_map(parse_match)
        .collect())
}

pub fn parse_predictions_json(raw: &str) -> Result<Vec<ServerPrediction>> {
    let Some(root) = parse_root(raw).context("invalid predictions json")? else {
        return Ok(Vec::new());
    };
    Ok(list_items(&root, &["predictions", "data"])
        .iter()
        .filter_map(parse_prediction)
        .collect())
}

pub fn parse_leaderboard_json(raw: &str) -> Result<Vec<RawLeaderboardRow>> {
    let Some(root) = parse_root(raw).context("invalid leaderboard json")? else {
        return Ok(Vec::new());
    };
    Ok(list_items(&root, &["leaderboard", "rows", "data"])
        .iter()
        .filter(|v| v.is_object())
        .map(parse_leaderboard_row)
        .collect())
}

pub fn parse_tournaments_json(raw: &str) -> Result<Vec<Tournament>> {
    let Some(root) = parse_root(raw).context("invalid tournaments json")? else {
        return Ok(Vec::new());
    };
    Ok(list_items(&root, &["tournaments", "data"])
        .iter()
        .filter_map(|v| {
            Some(Tournament {
                id: pick_id(v, &["id", "tournament_id"])?,
                name: pick_string(v, &["name", "title"]).unwrap_or_else(|| "Tournament".to_string()),
                year: pick_u32(v, &["year"]),
            })
        })
        .collect())
}

/// Login/register response: a token plus (optionally) the user it belongs to.
pub fn parse_auth_json(raw: &str) -> Result<AuthSession> {
    let root = parse_root(raw)
        .context("invalid auth json")?
        .context("empty auth response")?;
    let token = pick_string(&root, &["token", "access_token", "accessToken"])
        .context("auth response has no token")?;
    let user = root.get("user").and_then(parse_user).or_else(|| parse_user(&root));
    Ok(AuthSession { token, user })
}

/// `/auth/me` response, either bare or wrapped in `user`.
pub fn parse_user_json(raw: &str) -> Result<User> {
    let root = parse_root(raw)
        .context("invalid user json")?
        .context("empty user response")?;
    root.get("user")
        .and_then(parse_user)
        .or_else(|| parse_user(&root))
        .context("user response has no name")
}

/// Optional points echoed back by the save endpoint.
pub fn parse_saved_points(raw: &str) -> Option<i64> {
    let root = parse_root(raw).ok()??;
    let inner = root.get("prediction").unwrap_or(&root);
    pick_points(inner, &["points", "points_awarded", "pointsAwarded"])
}

pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive timestamps are UTC.
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(trimmed, fmt)
            .ok()
            .map(|naive| naive.and_utc())
    })
}

fn parse_root(raw: &str) -> Result<Option<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed)?;
    Ok(if root.is_null() { None } else { Some(root) })
}

fn list_items<'a>(root: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Some(arr) = root.as_array() {
        return arr;
    }
    keys.iter()
        .find_map(|key| root.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn parse_match(v: &Value) -> Option<Match> {
    let id = pick_id(v, &["id", "match_id", "matchId"])?;
    let home_team = pick_string(v, &["home_team", "homeTeam", "home"])?;
    let away_team = pick_string(v, &["away_team", "awayTeam", "away"])?;
    let kickoff = pick_string(v, &["kickoff_utc", "kickoffUtc", "kickoff"])
        .as_deref()
        .and_then(parse_kickoff);

    let home_goals = pick_goals(v, &["result_home_goals", "resultHomeGoals"]);
    let away_goals = pick_goals(v, &["result_away_goals", "resultAwayGoals"]);
    let finalized = pick_bool(v, &["result_finalized", "resultFinalized", "finalized"]);
    let result = if home_goals.is_some() || away_goals.is_some() || finalized.is_some() {
        Some(MatchResult {
            home_goals,
            away_goals,
            finalized: finalized.unwrap_or(false),
        })
    } else {
        None
    };

    Some(Match {
        id,
        home_team,
        away_team,
        group_name: pick_string(v, &["group_name", "groupName", "group"]),
        stage: pick_string(v, &["stage"]),
        kickoff,
        result,
    })
}

fn parse_prediction(v: &Value) -> Option<ServerPrediction> {
    Some(ServerPrediction {
        match_id: pick_id(v, &["match_id", "matchId"])?,
        home_goals: pick_goals(
            v,
            &["predicted_home_goals", "predicted_home", "home_goals", "home"],
        ),
        away_goals: pick_goals(
            v,
            &["predicted_away_goals", "predicted_away", "away_goals", "away"],
        ),
        points: pick_points(v, &["points", "points_awarded", "pointsAwarded"]),
    })
}

fn parse_leaderboard_row(v: &Value) -> RawLeaderboardRow {
    RawLeaderboardRow {
        user_id: pick_id(v, &["user_id", "userId", "id"]),
        name: pick_raw_string(
            v,
            &["name", "username", "display_name", "displayName", "player"],
        ),
        points: pick_points(
            v,
            &[
                "total_points",
                "totalPoints",
                "group_stage_points",
                "groupStagePoints",
                "points",
                "score",
            ],
        ),
    }
}

fn parse_user(v: &Value) -> Option<User> {
    let name = pick_string(v, &["name", "username", "display_name", "displayName"])?;
    let is_admin = pick_bool(v, &["is_admin", "isAdmin"]).unwrap_or_else(|| {
        pick_string(v, &["role"]).is_some_and(|role| role.eq_ignore_ascii_case("admin"))
    });
    Some(User {
        name,
        email: pick_string(v, &["email"]),
        is_admin,
    })
}

fn as_string(v: &Value) -> Option<String> {
    let s = v.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(as_string))
}

/// Like [`pick_string`] but keeps surrounding whitespace; blank values still skip.
fn pick_raw_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

/// Ids arrive as numbers or strings; both end up as strings.
fn pick_id(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::Number(n) => Some(n.to_string()),
        other => as_string(other),
    })
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

fn pick_goals(value: &Value, keys: &[&str]) -> Option<u32> {
    // First present key wins, even when its value is unusable.
    let v = keys
        .iter()
        .find_map(|key| value.get(*key).filter(|v| !v.is_null()))?;
    goals_from_value(v)
}

fn pick_points(value: &Value, keys: &[&str]) -> Option<i64> {
    let v = keys
        .iter()
        .find_map(|key| value.get(*key).filter(|v| !v.is_null()))?;
    points_from_value(v)
}

fn pick_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kickoff_formats() {
        let expected = "2026-06-11T19:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(parse_kickoff("2026-06-11T19:00:00Z"), Some(expected));
        assert_eq!(parse_kickoff("2026-06-11T21:00:00+02:00"), Some(expected));
        assert_eq!(parse_kickoff("2026-06-11T19:00:00"), Some(expected));
        assert_eq!(parse_kickoff("2026-06-11 19:00"), Some(expected));
        assert_eq!(parse_kickoff("soon"), None);
        assert_eq!(parse_kickoff(""), None);
    }

    #[test]
    fn auth_user_role_admin() {
        let session =
            parse_auth_json(r#"{"token":"t1","user":{"username":"ana","role":"admin"}}"#).unwrap();
        assert_eq!(session.token, "t1");
        let user = session.user.unwrap();
        assert_eq!(user.name, "ana");
        assert!(user.is_admin);
    }

    #[test]
    fn auth_without_token_fails() {
        assert!(parse_auth_json(r#"{"user":{"name":"x"}}"#).is_err());
        assert!(parse_auth_json("null").is_err());
    }

    #[test]
    fn saved_points_are_optional() {
        assert_eq!(parse_saved_points(r#"{"prediction":{"points":3}}"#), Some(3));
        assert_eq!(parse_saved_points(r#"{"ok":true}"#), None);
        assert_eq!(parse_saved_points("not json"), None);
    }
}
