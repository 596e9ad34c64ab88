use wc26_pool::leaderboard::{PLACEHOLDER_NAME, compute_leaderboard};
use wc26_pool::state::{RankedLeaderboardRow, RawLeaderboardRow};

fn row(id: &str, name: Option<&str>, points: Option<i64>) -> RawLeaderboardRow {
    RawLeaderboardRow {
        user_id: Some(id.to_string()),
        name: name.map(str::to_string),
        points,
    }
}

fn ranks(rows: &[RankedLeaderboardRow]) -> Vec<(String, u32)> {
    rows.iter().map(|r| (r.name.clone(), r.rank)).collect()
}

#[test]
fn ties_share_a_rank_and_skip_the_next() {
    let rows = compute_leaderboard(&[
        row("3", Some("C"), Some(5)),
        row("2", Some("B"), Some(10)),
        row("1", Some("A"), Some(10)),
    ]);
    assert_eq!(
        ranks(&rows),
        [("A".to_string(), 1), ("B".to_string(), 1), ("C".to_string(), 3)]
    );
    assert!(rows.iter().all(|r| r.grand_total == r.group_stage_points));
    assert!(rows.iter().all(|r| r.knockout_points == 0));
}

#[test]
fn missing_points_count_as_zero() {
    let rows = compute_leaderboard(&[
        row("1", Some("Zed"), None),
        row("2", None, Some(0)),
        row("3", Some("Amy"), Some(2)),
    ]);
    assert_eq!(
        ranks(&rows),
        [
            ("Amy".to_string(), 1),
            (PLACEHOLDER_NAME.to_string(), 2),
            ("Zed".to_string(), 2),
        ]
    );
}

#[test]
fn input_order_does_not_matter() {
    let input = vec![
        row("1", Some("Robin"), Some(7)),
        row("2", Some("Alex"), Some(12)),
        row("3", Some("Sam"), Some(7)),
        row("4", Some("Jo"), Some(1)),
    ];
    let expected = compute_leaderboard(&input);
    let mut reversed = input.clone();
    reversed.reverse();
    assert_eq!(compute_leaderboard(&reversed), expected);
    assert_eq!(
        expected.iter().map(|r| r.rank).collect::<Vec<_>>(),
        [1, 2, 2, 4]
    );
}

#[test]
fn ranking_is_idempotent() {
    let once = compute_leaderboard(&[
        row("1", Some("B"), Some(3)),
        row("2", Some("A"), Some(3)),
        row("3", None, None),
    ]);
    let raw: Vec<RawLeaderboardRow> = once.iter().map(RawLeaderboardRow::from).collect();
    assert_eq!(compute_leaderboard(&raw), once);
}

#[test]
fn negative_points_rank_last() {
    let rows = compute_leaderboard(&[row("1", Some("A"), Some(-2)), row("2", Some("B"), None)]);
    assert_eq!(ranks(&rows), [("B".to_string(), 1), ("A".to_string(), 2)]);
}

#[test]
fn names_are_kept_as_sent() {
    let rows = compute_leaderboard(&[
        row("1", Some("amy"), Some(3)),
        row("2", Some("Zed "), Some(3)),
        row("3", Some(" Bob"), Some(3)),
        row("4", Some("   "), Some(3)),
    ]);
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    // Byte order: leading space, then uppercase, then lowercase.
    assert_eq!(names, [" Bob", PLACEHOLDER_NAME, "Zed ", "amy"]);
    assert!(rows.iter().all(|r| r.rank == 1));
}
