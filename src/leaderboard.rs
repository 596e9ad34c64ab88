use std::cmp::Ordering;

use crate::ordering::{competition_ranks, desc, name_asc};
use crate::state::{RankedLeaderboardRow, RawLeaderboardRow};

/// Shown for rows without a usable display name.
pub const PLACEHOLDER_NAME: &str = "Player";

/// Normalize, sort and rank leaderboard rows.
///
/// Group-stage points come straight from the backend. Rows are ordered by
/// points (descending) then name, and ranked with competition ranking: tied
/// rows share a rank and the next distinct score skips ahead (1, 1, 3).
pub fn compute_leaderboard(rows: &[RawLeaderboardRow]) -> Vec<RankedLeaderboardRow> {
    let mut normalised: Vec<RankedLeaderboardRow> = rows.iter().map(normalise_row).collect();
    normalised.sort_by(leaderboard_order);

    let ranks = competition_ranks(&normalised, |row| row.group_stage_points);
    for (row, rank) in normalised.iter_mut().zip(ranks) {
        row.rank = rank;
    }
    normalised
}

fn normalise_row(raw: &RawLeaderboardRow) -> RankedLeaderboardRow {
    // Blank names get the placeholder; others are kept exactly as sent.
    let name = raw
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(PLACEHOLDER_NAME)
        .to_string();
    let group_stage_points = raw.points.unwrap_or(0);
    let knockout_points = 0;
    RankedLeaderboardRow {
        user_id: raw.user_id.clone(),
        name,
        group_stage_points,
        knockout_points,
        grand_total: group_stage_points + knockout_points,
        rank: 0,
    }
}

fn leaderboard_order(a: &RankedLeaderboardRow, b: &RankedLeaderboardRow) -> Ordering {
    desc(a.group_stage_points, b.group_stage_points)
        .then_with(|| name_asc(&a.name, &b.name))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

impl From<&RankedLeaderboardRow> for RawLeaderboardRow {
    fn from(row: &RankedLeaderboardRow) -> Self {
        Self {
            user_id: row.user_id.clone(),
            name: Some(row.name.clone()),
            points: Some(row.group_stage_points),
        }
    }
}
