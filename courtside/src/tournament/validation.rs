//! Field validation for tournament payloads and reported scores.
//!
//! Every check returns [`TournamentError::Validation`] with a message that is
//! safe to show to the client.

use chrono::NaiveDate;
use std::collections::HashSet;

use super::manager::{TournamentError, TournamentResult};
use super::models::{MatchResult, Team};

/// Minimum tournament name length in characters
pub const MIN_NAME_LEN: usize = 3;

/// Smallest allowed `maxTeams`
pub const MIN_TEAMS: i64 = 2;

/// Largest allowed `maxTeams`; bounds the size of a generated schedule
pub const MAX_TEAMS: i64 = 128;

const START_DATE_MESSAGE: &str = "Invalid start date. Cannot be in the past.";
const SCORES_MESSAGE: &str = "Both scores are required and must be valid non-negative numbers";

fn invalid(message: impl Into<String>) -> TournamentError {
    TournamentError::Validation(message.into())
}

pub fn validate_name(name: &str) -> TournamentResult<String> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(invalid("Name must be at least 3 characters long"));
    }
    Ok(name.to_string())
}

pub fn validate_max_teams(max_teams: i64) -> TournamentResult<u32> {
    if max_teams < MIN_TEAMS {
        return Err(invalid("Max teams must be at least 2"));
    }
    if max_teams > MAX_TEAMS {
        return Err(invalid(format!("Max teams must be at most {MAX_TEAMS}")));
    }
    Ok(max_teams as u32)
}

/// Parse a `YYYY-MM-DD` start date that is not before `today`
pub fn parse_start_date(raw: &str, today: NaiveDate) -> TournamentResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(START_DATE_MESSAGE))?;
    if date < today {
        return Err(invalid(START_DATE_MESSAGE));
    }
    Ok(date)
}

/// Normalize a roster and enforce unique, non-empty team names.
///
/// Names are trimmed before comparison; comparison is case-sensitive.
pub fn validate_teams(teams: Vec<Team>, max_teams: u32) -> TournamentResult<Vec<Team>> {
    if teams.len() > max_teams as usize {
        return Err(invalid("Number of teams exceeds maximum allowed"));
    }

    let mut seen = HashSet::with_capacity(teams.len());
    let mut normalized = Vec::with_capacity(teams.len());

    for mut team in teams {
        team.name = team.name.trim().to_string();
        if team.name.is_empty() {
            return Err(invalid("Team name is required"));
        }
        if !seen.insert(team.name.clone()) {
            return Err(invalid(format!("Duplicate team name: {}", team.name)));
        }

        for player in &mut team.players {
            player.name = player.name.trim().to_string();
            player.surname = player.surname.trim().to_string();
            if player.name.is_empty() || player.surname.is_empty() {
                return Err(invalid(format!(
                    "Players of {} need a name and a surname",
                    team.name
                )));
            }
        }

        normalized.push(team);
    }

    Ok(normalized)
}

/// Check a reported score pair; both must be present and non-negative
pub fn validate_scores(team1: Option<i64>, team2: Option<i64>) -> TournamentResult<MatchResult> {
    let (Some(team1), Some(team2)) = (team1, team2) else {
        return Err(invalid(SCORES_MESSAGE));
    };
    let team1 = u32::try_from(team1).map_err(|_| invalid(SCORES_MESSAGE))?;
    let team2 = u32::try_from(team2).map_err(|_| invalid(SCORES_MESSAGE))?;
    // Scores are stored as INTEGER
    if team1 > i32::MAX as u32 || team2 > i32::MAX as u32 {
        return Err(invalid(SCORES_MESSAGE));
    }
    Ok(MatchResult::new(team1, team2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::Player;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn message(err: TournamentError) -> String {
        match err {
            TournamentError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_name_length() {
        assert!(validate_name("Cup").is_ok());
        assert_eq!(validate_name("  Summer League ").unwrap(), "Summer League");
        assert!(message(validate_name("ab").unwrap_err()).contains("at least 3"));
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_max_teams_bounds() {
        assert_eq!(validate_max_teams(2).unwrap(), 2);
        assert_eq!(validate_max_teams(MAX_TEAMS).unwrap(), MAX_TEAMS as u32);
        assert!(validate_max_teams(1).is_err());
        assert!(validate_max_teams(-4).is_err());
        assert!(validate_max_teams(MAX_TEAMS + 1).is_err());
    }

    #[test]
    fn test_start_date() {
        assert_eq!(parse_start_date("2026-10-19", today()).unwrap(), today());
        assert!(parse_start_date("2027-01-01", today()).is_ok());
        assert!(parse_start_date("2026-10-18", today()).is_err());
        assert!(parse_start_date("not-a-date", today()).is_err());
        assert!(parse_start_date("2026-02-30", today()).is_err());
    }

    #[test]
    fn test_teams_are_trimmed_and_unique() {
        let teams = vec![Team::new(" Milan "), Team::new("Inter")];
        let teams = validate_teams(teams, 4).unwrap();
        assert_eq!(teams[0].name, "Milan");

        let dupes = vec![Team::new("Milan"), Team::new("Milan  ")];
        assert!(message(validate_teams(dupes, 4).unwrap_err()).contains("Duplicate"));
    }

    #[test]
    fn test_team_names_are_case_sensitive() {
        let teams = vec![Team::new("milan"), Team::new("Milan")];
        assert!(validate_teams(teams, 4).is_ok());
    }

    #[test]
    fn test_too_many_teams() {
        let teams = vec![Team::new("A"), Team::new("B"), Team::new("C")];
        assert!(message(validate_teams(teams, 2).unwrap_err()).contains("exceeds"));
    }

    #[test]
    fn test_players_need_names() {
        let team = Team::new("Milan").with_player(Player {
            name: "Rafael".to_string(),
            surname: " ".to_string(),
            number: Some(10),
        });
        assert!(validate_teams(vec![team], 4).is_err());
    }

    #[test]
    fn test_scores() {
        assert_eq!(validate_scores(Some(2), Some(0)).unwrap(), MatchResult::new(2, 0));
        assert!(validate_scores(None, Some(1)).is_err());
        assert!(validate_scores(Some(1), None).is_err());
        assert!(validate_scores(Some(-1), Some(1)).is_err());
        assert!(validate_scores(Some(1), Some(i64::MAX)).is_err());
    }
}
