/// Property-based tests for round-robin generation and standings
///
/// Teams are generated with unique names; match results are random scores
/// between randomly chosen pairs from the generated schedule.
use courtside::Sport;
use courtside::tournament::{
    Match, MatchResult, MatchStatus, Team, compute_standings, match_points, schedule,
};
use proptest::prelude::*;
use std::collections::HashSet;

// Strategy to generate between `min` and `max` teams with distinct names
fn teams_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Team>> {
    prop::collection::hash_set("[A-Z][a-z]{2,8}", min..=max)
        .prop_map(|names| names.into_iter().map(Team::new).collect())
}

// Mostly small scores so draws happen, with occasional scores up to the
// largest value the result endpoint accepts
fn score_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        3 => 0u32..10,
        1 => 0u32..=i32::MAX as u32,
    ]
}

fn sport_strategy() -> impl Strategy<Value = Sport> {
    prop_oneof![
        Just(Sport::Football),
        Just(Sport::Volleyball),
        Just(Sport::Basketball),
    ]
}

// A schedule for the teams where each match is either played with a random
// score or left scheduled
fn season_strategy() -> impl Strategy<Value = (Vec<Team>, Vec<Match>)> {
    teams_strategy(2, 10).prop_flat_map(|teams| {
        let specs = schedule::generate(&teams);
        let n = specs.len();
        let outcomes = prop::collection::vec(prop::option::of((score_strategy(), score_strategy())), n);
        (Just(teams), Just(specs), outcomes).prop_map(|(teams, specs, outcomes)| {
            let matches = specs
                .into_iter()
                .zip(outcomes)
                .enumerate()
                .map(|(i, (spec, outcome))| Match {
                    id: i as i64 + 1,
                    tournament_id: 1,
                    team1: spec.team1,
                    team2: spec.team2,
                    date: None,
                    field_id: None,
                    status: if outcome.is_some() {
                        MatchStatus::Played
                    } else {
                        MatchStatus::Scheduled
                    },
                    result: outcome.map(|(s1, s2)| MatchResult::new(s1, s2)),
                })
                .collect();
            (teams, matches)
        })
    })
}

proptest! {
    #[test]
    fn test_generate_pairs_every_team_exactly_once(teams in teams_strategy(0, 16)) {
        let n = teams.len();
        let matches = schedule::generate(&teams);

        prop_assert_eq!(matches.len(), n * n.saturating_sub(1) / 2);

        let mut pairs = HashSet::new();
        for m in &matches {
            prop_assert_ne!(&m.team1, &m.team2);
            let pair = if m.team1 < m.team2 {
                (m.team1.clone(), m.team2.clone())
            } else {
                (m.team2.clone(), m.team1.clone())
            };
            prop_assert!(pairs.insert(pair), "pair generated twice");
        }
    }

    #[test]
    fn test_generate_puts_lower_index_first(teams in teams_strategy(2, 12)) {
        let position = |name: &str| teams.iter().position(|t| t.name == name).unwrap();
        for m in schedule::generate(&teams) {
            prop_assert!(position(&m.team1) < position(&m.team2));
        }
    }

    #[test]
    fn test_generate_is_deterministic(teams in teams_strategy(0, 12)) {
        prop_assert_eq!(schedule::generate(&teams), schedule::generate(&teams));
    }

    #[test]
    fn test_standings_row_per_team((teams, matches) in season_strategy(), sport in sport_strategy()) {
        let table = compute_standings(sport, &teams, &matches);

        prop_assert_eq!(table.len(), teams.len());
        let names: HashSet<_> = table.iter().map(|r| r.team.clone()).collect();
        let expected: HashSet<_> = teams.iter().map(|t| t.name.clone()).collect();
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn test_standings_totals_are_conserved((teams, matches) in season_strategy(), sport in sport_strategy()) {
        let table = compute_standings(sport, &teams, &matches);
        let played: Vec<_> = matches.iter().filter_map(|m| m.played_result()).collect();

        let total_played: u32 = table.iter().map(|r| r.played).sum();
        prop_assert_eq!(total_played as usize, 2 * played.len());

        let total_scored: u64 = table.iter().map(|r| r.scored).sum();
        let total_conceded: u64 = table.iter().map(|r| r.conceded).sum();
        prop_assert_eq!(total_scored, total_conceded);

        let total_diff: i64 = table.iter().map(|r| r.diff).sum();
        prop_assert_eq!(total_diff, 0);

        let expected_points: u32 = played
            .iter()
            .map(|r| {
                let (p1, p2) = match_points(sport, r.team1_score, r.team2_score);
                p1 + p2
            })
            .sum();
        let total_points: u32 = table.iter().map(|r| r.points).sum();
        prop_assert_eq!(total_points, expected_points);
    }

    #[test]
    fn test_standings_are_sorted((teams, matches) in season_strategy(), sport in sport_strategy()) {
        let table = compute_standings(sport, &teams, &matches);

        for pair in table.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.points > b.points || (a.points == b.points && a.diff >= b.diff),
                "{:?} ranked above {:?}", a, b
            );
            if a.points == b.points && a.diff == b.diff {
                let pos = |name: &str| teams.iter().position(|t| t.name == name).unwrap();
                prop_assert!(pos(&a.team) < pos(&b.team), "tie broke insertion order");
            }
        }
    }

    #[test]
    fn test_standings_do_not_mutate_inputs((teams, matches) in season_strategy(), sport in sport_strategy()) {
        let teams_before = teams.clone();
        let matches_before = matches.clone();
        let _ = compute_standings(sport, &teams, &matches);
        prop_assert_eq!(teams, teams_before);
        prop_assert_eq!(matches, matches_before);
    }

    #[test]
    fn test_match_points_are_symmetric(sport in sport_strategy(), s1 in score_strategy(), s2 in score_strategy()) {
        let (p1, p2) = match_points(sport, s1, s2);
        let (q2, q1) = match_points(sport, s2, s1);
        prop_assert_eq!((p1, p2), (q1, q2));
    }
}
