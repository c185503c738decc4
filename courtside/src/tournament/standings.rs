//! League table computed from played matches.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::models::{Match, Team};
use crate::sport::Sport;

/// One team's aggregate in the league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: String,
    pub points: u32,
    pub played: u32,
    /// Totals can exceed `u32` when many large scores accumulate
    pub scored: u64,
    pub conceded: u64,
    pub diff: i64,
}

impl StandingsRow {
    fn new(team: &str) -> Self {
        Self {
            team: team.to_string(),
            points: 0,
            played: 0,
            scored: 0,
            conceded: 0,
            diff: 0,
        }
    }

    fn record(&mut self, scored: u32, conceded: u32, points: u32) {
        self.played += 1;
        self.scored += u64::from(scored);
        self.conceded += u64::from(conceded);
        self.diff += i64::from(scored) - i64::from(conceded);
        self.points += points;
    }
}

/// Points `(team1, team2)` earned from one result under the sport's rules
pub fn match_points(sport: Sport, team1_score: u32, team2_score: u32) -> (u32, u32) {
    if team1_score > team2_score {
        (sport.win_points(), 0)
    } else if team2_score > team1_score {
        (0, sport.win_points())
    } else {
        (sport.draw_points(), sport.draw_points())
    }
}

/// Build the ranked table for `teams` from `matches`.
///
/// Only played matches with a result count. A match naming a team that is not
/// in `teams` is skipped whole. Rows are ordered by points, then goal
/// difference, both descending; remaining ties keep the order of `teams`.
pub fn compute_standings(sport: Sport, teams: &[Team], matches: &[Match]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = Vec::with_capacity(teams.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(teams.len());

    for team in teams {
        if !index.contains_key(team.name.as_str()) {
            index.insert(team.name.as_str(), rows.len());
            rows.push(StandingsRow::new(&team.name));
        }
    }

    for m in matches {
        let Some(result) = m.played_result() else {
            continue;
        };
        let (Some(&i1), Some(&i2)) = (index.get(m.team1.as_str()), index.get(m.team2.as_str()))
        else {
            log::debug!(
                "Skipping match {} ({} vs {}): team no longer in tournament",
                m.id,
                m.team1,
                m.team2
            );
            continue;
        };

        let (points1, points2) = match_points(sport, result.team1_score, result.team2_score);
        rows[i1].record(result.team1_score, result.team2_score, points1);
        rows[i2].record(result.team2_score, result.team1_score, points2);
    }

    rank(&mut rows);
    rows
}

/// Order rows by points, then difference, descending.
///
/// `sort_by` is stable, so fully tied rows keep their relative order.
fn rank(rows: &mut [StandingsRow]) {
    rows.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| b.diff.cmp(&a.diff)));
}
