use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use wc26_pool::leaderboard::{PLACEHOLDER_NAME, compute_leaderboard};
use wc26_pool::standings::compute_group_tables;
use wc26_pool::state::Match;
use wc26_pool::wire::{
    parse_leaderboard_json, parse_matches_json, parse_predictions_json, parse_tournaments_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_matches_fixture() {
    let raw = read_fixture("matches.json");
    let matches = parse_matches_json(&raw).expect("fixture should parse");
    assert_eq!(matches.len(), 3, "rows without both teams are skipped");

    let first = &matches[0];
    assert_eq!(first.id, "101");
    assert_eq!(first.group_name.as_deref(), Some("Group A"));
    assert_eq!(
        first.kickoff,
        Some(Utc.with_ymd_and_hms(2026, 6, 11, 19, 0, 0).unwrap())
    );
    assert_eq!(first.result.and_then(|r| r.final_score()), Some((2, 0)));

    let second = &matches[1];
    assert_eq!(second.id, "102");
    assert_eq!(second.home_team, "Korea Republic");
    assert_eq!(
        second.kickoff,
        Some(Utc.with_ymd_and_hms(2026, 6, 12, 2, 0, 0).unwrap())
    );
    assert_eq!(second.result.and_then(|r| r.final_score()), None);

    let third = &matches[2];
    assert_eq!(third.home_team, "Canada");
    assert_eq!(third.kickoff, None);
    assert_eq!(third.group_name, None);
    assert_eq!(third.result, None);
}

#[test]
fn parses_predictions_fixture() {
    let raw = read_fixture("predictions.json");
    let preds = parse_predictions_json(&raw).expect("fixture should parse");
    assert_eq!(preds.len(), 3, "rows without a match id are skipped");

    assert_eq!(preds[0].match_id, "101");
    assert_eq!((preds[0].home_goals, preds[0].away_goals), (Some(1), Some(0)));
    assert_eq!(preds[0].points, Some(1));

    assert_eq!((preds[1].home_goals, preds[1].away_goals), (Some(2), Some(2)));
    assert_eq!(preds[1].points, None);

    assert_eq!((preds[2].home_goals, preds[2].away_goals), (None, Some(3)));
}

#[test]
fn leaderboard_fixture_survives_key_drift() {
    let raw = read_fixture("leaderboard.json");
    let rows = parse_leaderboard_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1].user_id.as_deref(), Some("8"));
    assert_eq!(rows[1].points, Some(12));
    assert_eq!(rows[2].points, Some(5));
    assert_eq!(rows[3].name, None);
    assert_eq!(
        parse_leaderboard_json(r#"[{"name":" Robin "}]"#).unwrap()[0].name.as_deref(),
        Some(" Robin ")
    );
    assert_eq!(rows[3].points, None);

    let ranked = compute_leaderboard(&rows);
    let view: Vec<(&str, i64, u32)> = ranked
        .iter()
        .map(|r| (r.name.as_str(), r.grand_total, r.rank))
        .collect();
    assert_eq!(
        view,
        [
            ("Alex", 12, 1),
            ("Sam", 12, 1),
            ("Robin", 5, 3),
            (PLACEHOLDER_NAME, 0, 4),
            (PLACEHOLDER_NAME, 0, 4),
        ]
    );
}

#[test]
fn null_and_empty_bodies_are_empty_lists() {
    assert!(parse_matches_json("null").unwrap().is_empty());
    assert!(parse_predictions_json("").unwrap().is_empty());
    assert!(parse_leaderboard_json("{}").unwrap().is_empty());
    assert!(parse_tournaments_json(r#"{"data":[]}"#).unwrap().is_empty());
    assert!(parse_matches_json("{not json").is_err());
}

#[test]
fn tournaments_accept_bare_arrays() {
    let tournaments =
        parse_tournaments_json(r#"[{"id":1,"name":"World Cup","year":2026},{"id":"x"}]"#).unwrap();
    assert_eq!(tournaments.len(), 2);
    assert_eq!(tournaments[0].id, "1");
    assert_eq!(tournaments[0].year, Some(2026));
    assert_eq!(tournaments[1].name, "Tournament");
}

#[test]
fn oversized_backend_goals_are_treated_as_missing() {
    let raw = r#"[
        {"match_id":"1","predicted_home_goals":3000000000,"predicted_away_goals":0},
        {"match_id":"2","predicted_home_goals":3000000000,"predicted_away_goals":"1"}
    ]"#;
    let preds = parse_predictions_json(raw).unwrap();
    assert_eq!(preds.len(), 2);
    assert!(preds.iter().all(|p| p.home_goals.is_none()));

    let matches: Vec<Match> = ["1", "2"]
        .iter()
        .map(|id| Match {
            id: id.to_string(),
            home_team: "A".to_string(),
            away_team: format!("B{id}"),
            group_name: Some("G".to_string()),
            stage: None,
            kickoff: None,
            result: None,
        })
        .collect();
    let by_match: HashMap<String, (Option<u32>, Option<u32>)> = preds
        .iter()
        .map(|p| (p.match_id.clone(), (p.home_goals, p.away_goals)))
        .collect();
    assert!(compute_group_tables(&matches, &by_match).is_empty());
}
