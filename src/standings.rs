use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::ordering::{desc, name_asc};
use crate::prediction::Prediction;
use crate::state::{GroupTables, Match, MatchResult, TeamStanding};

/// Bucket for matches without a group label.
pub const DEFAULT_GROUP: &str = "Group";

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;

/// Anything that may carry a complete home/away scoreline.
pub trait Scoreline {
    fn scoreline(&self) -> Option<(u32, u32)>;
}

impl Scoreline for Prediction {
    fn scoreline(&self) -> Option<(u32, u32)> {
        Prediction::scoreline(self)
    }
}

impl Scoreline for MatchResult {
    fn scoreline(&self) -> Option<(u32, u32)> {
        self.final_score()
    }
}

impl Scoreline for (Option<u32>, Option<u32>) {
    fn scoreline(&self) -> Option<(u32, u32)> {
        Some((self.0?, self.1?))
    }
}

/// Build predicted group tables from `matches` and the per-match predictions.
///
/// Matches whose prediction is missing or incomplete are skipped entirely, so a
/// team only shows up once it is party to at least one complete prediction.
pub fn compute_group_tables<S: Scoreline>(
    matches: &[Match],
    predictions: &HashMap<String, S>,
) -> GroupTables {
    aggregate(matches.iter().filter_map(|m| {
        let (home, away) = predictions.get(&m.id)?.scoreline()?;
        Some((m, home, away))
    }))
}

/// Same tables, built from finalized actual results.
pub fn compute_actual_group_tables(matches: &[Match]) -> GroupTables {
    aggregate(matches.iter().filter_map(|m| {
        let (home, away) = m.result.as_ref()?.scoreline()?;
        Some((m, home, away))
    }))
}

fn aggregate<'a>(completed: impl Iterator<Item = (&'a Match, u32, u32)>) -> GroupTables {
    let mut groups: BTreeMap<String, HashMap<String, TeamStanding>> = BTreeMap::new();

    for (m, home_goals, away_goals) in completed {
        let teams = groups.entry(group_label(m).to_string()).or_default();
        standing_entry(teams, &m.home_team).record(home_goals, away_goals);
        standing_entry(teams, &m.away_team).record(away_goals, home_goals);
    }

    groups
        .into_iter()
        .map(|(group, teams)| {
            let mut table: Vec<TeamStanding> = teams.into_values().collect();
            table.sort_by(standings_order);
            (group, table)
        })
        .collect()
}

fn standing_entry<'t>(
    teams: &'t mut HashMap<String, TeamStanding>,
    team: &str,
) -> &'t mut TeamStanding {
    teams
        .entry(team.to_string())
        .or_insert_with(|| TeamStanding {
            team: team.to_string(),
            ..TeamStanding::default()
        })
}

pub fn group_label(m: &Match) -> &str {
    m.group_name
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GROUP)
}

impl TeamStanding {
    // Counters saturate: scorelines handed in through `Scoreline` are not bounded.
    fn record(&mut self, scored: u32, conceded: u32) {
        self.played = self.played.saturating_add(1);
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
        self.goal_difference = i64::from(self.goals_for) - i64::from(self.goals_against);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won = self.won.saturating_add(1);
                self.points = self.points.saturating_add(POINTS_WIN);
            }
            Ordering::Equal => {
                self.drawn = self.drawn.saturating_add(1);
                self.points = self.points.saturating_add(POINTS_DRAW);
            }
            Ordering::Less => self.lost = self.lost.saturating_add(1),
        }
    }
}

/// Points, goal difference and goals for (all descending), then team name.
pub fn standings_order(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    desc(a.points, b.points)
        .then_with(|| desc(a.goal_difference, b.goal_difference))
        .then_with(|| desc(a.goals_for, b.goals_for))
        .then_with(|| name_asc(&a.team, &b.team))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(id: &str, home: &str, away: &str, group: Option<&str>) -> Match {
        Match {
            id: id.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            group_name: group.map(str::to_string),
            stage: None,
            kickoff: None,
            result: None,
        }
    }

    #[test]
    fn missing_group_falls_into_default_bucket() {
        let matches = vec![
            fixture("1", "A", "B", None),
            fixture("2", "C", "D", Some("  ")),
        ];
        let scores: HashMap<String, (Option<u32>, Option<u32>)> = HashMap::from([
            ("1".to_string(), (Some(0), Some(0))),
            ("2".to_string(), (Some(3), Some(1))),
        ]);
        let tables = compute_group_tables(&matches, &scores);
        assert_eq!(tables.len(), 1);
        let names: Vec<&str> = tables[DEFAULT_GROUP].iter().map(|t| t.team.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn actual_tables_use_finalized_results_only() {
        let mut done = fixture("1", "A", "B", Some("G1"));
        done.result = Some(MatchResult {
            home_goals: Some(0),
            away_goals: Some(2),
            finalized: true,
        });
        let mut pending = fixture("2", "C", "D", Some("G1"));
        pending.result = Some(MatchResult {
            home_goals: Some(1),
            away_goals: Some(0),
            finalized: false,
        });
        let tables = compute_actual_group_tables(&[done, pending]);
        let table = &tables["G1"];
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].team, "B");
        assert_eq!(table[0].points, 3);
        assert_eq!(table[1].team, "A");
        assert_eq!(table[1].lost, 1);
    }

    #[test]
    fn goals_for_breaks_equal_goal_difference() {
        let matches = vec![
            fixture("1", "A", "X", Some("G")),
            fixture("2", "B", "Y", Some("G")),
        ];
        let scores: HashMap<String, (Option<u32>, Option<u32>)> = HashMap::from([
            ("1".to_string(), (Some(1), Some(0))),
            ("2".to_string(), (Some(3), Some(2))),
        ]);
        let table = &compute_group_tables(&matches, &scores)["G"];
        let names: Vec<&str> = table.iter().map(|t| t.team.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "Y", "X"]);
    }
}
