//! Single round-robin match generation.

use serde::{Deserialize, Serialize};

use super::models::Team;

/// A pairing produced by [`generate`], not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpec {
    pub team1: String,
    pub team2: String,
}

/// Number of matches a single round robin over `teams` teams produces
pub fn match_count(teams: usize) -> usize {
    teams * teams.saturating_sub(1) / 2
}

/// Pair every team with every later team in input order.
///
/// The team at the lower index is always `team1`. Output is the flat upper
/// triangle `(0,1), (0,2), .., (0,n-1), (1,2), ..`; there is no home/away
/// balancing and no partitioning into rounds. Fewer than two teams yield no
/// matches.
pub fn generate(teams: &[Team]) -> Vec<MatchSpec> {
    let mut matches = Vec::with_capacity(match_count(teams.len()));
    for (i, home) in teams.iter().enumerate() {
        for away in &teams[i + 1..] {
            matches.push(MatchSpec {
                team1: home.name.clone(),
                team2: away.name.clone(),
            });
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(names: &[&str]) -> Vec<Team> {
        names.iter().map(|name| Team::new(*name)).collect()
    }

    fn pairs(matches: &[MatchSpec]) -> Vec<(&str, &str)> {
        matches
            .iter()
            .map(|m| (m.team1.as_str(), m.team2.as_str()))
            .collect()
    }

    #[test]
    fn test_three_teams_in_index_order() {
        let matches = generate(&teams(&["A", "B", "C"]));
        assert_eq!(pairs(&matches), vec![("A", "B"), ("A", "C"), ("B", "C")]);
    }

    #[test]
    fn test_four_teams_upper_triangle() {
        let matches = generate(&teams(&["A", "B", "C", "D"]));
        assert_eq!(
            pairs(&matches),
            vec![
                ("A", "B"),
                ("A", "C"),
                ("A", "D"),
                ("B", "C"),
                ("B", "D"),
                ("C", "D")
            ]
        );
    }

    #[test]
    fn test_two_teams_single_match() {
        let matches = generate(&teams(&["Real Madrid", "Milan"]));
        assert_eq!(pairs(&matches), vec![("Real Madrid", "Milan")]);
    }

    #[test]
    fn test_fewer_than_two_teams_yield_nothing() {
        assert!(generate(&[]).is_empty());
        assert!(generate(&teams(&["Solo"])).is_empty());
    }

    #[test]
    fn test_order_follows_input_not_names() {
        let matches = generate(&teams(&["Zeta", "Alpha"]));
        assert_eq!(pairs(&matches), vec![("Zeta", "Alpha")]);
    }

    #[test]
    fn test_match_count() {
        assert_eq!(match_count(0), 0);
        assert_eq!(match_count(1), 0);
        assert_eq!(match_count(2), 1);
        assert_eq!(match_count(5), 10);
        assert_eq!(match_count(16), 120);
    }
}
