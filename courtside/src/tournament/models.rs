//! Tournament data models: tournaments with embedded teams, and their matches.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::UserId;
use crate::sport::{Sport, UnknownVariant};

/// Tournament ID type
pub type TournamentId = i64;

/// Match ID type
pub type MatchId = i64;

/// Tournament lifecycle, only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    /// Accepting team edits, no matches yet
    Open,
    /// Matches generated, results being reported
    Active,
    /// Closed; no further edits or results
    Completed,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Open => "open",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic
    pub fn can_transition_to(self, next: TournamentStatus) -> bool {
        matches!(
            (self, next),
            (TournamentStatus::Open, TournamentStatus::Active)
                | (TournamentStatus::Active, TournamentStatus::Active)
                | (TournamentStatus::Active, TournamentStatus::Completed)
        )
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TournamentStatus::Open),
            "active" => Ok(TournamentStatus::Active),
            "completed" => Ok(TournamentStatus::Completed),
            other => Err(UnknownVariant {
                kind: "tournament status",
                value: other.to_string(),
            }),
        }
    }
}

/// Match lifecycle: `scheduled -> played`, one way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Played,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Played => "played",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "played" => Ok(MatchStatus::Played),
            other => Err(UnknownVariant {
                kind: "match status",
                value: other.to_string(),
            }),
        }
    }
}

/// Player on a team roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub surname: String,
    /// Jersey number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

/// Team entered in a tournament, identified by its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            players: Vec::new(),
        }
    }

    pub fn with_player(mut self, player: Player) -> Self {
        self.players.push(player);
        self
    }
}

/// Public view of the user who created a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub id: UserId,
    pub username: String,
}

/// Tournament record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub sport: Sport,
    pub max_teams: u32,
    pub start_date: NaiveDate,
    pub creator: Creator,
    pub teams: Vec<Team>,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.creator.id == user_id
    }
}

/// Tournament together with its current match set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentDetails {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub matches: Vec<Match>,
}

/// Final score of a played match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub team1_score: u32,
    pub team2_score: u32,
}

impl MatchResult {
    pub fn new(team1_score: u32, team2_score: u32) -> Self {
        Self {
            team1_score,
            team2_score,
        }
    }
}

/// Match between two teams of a tournament, referenced by team name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    #[serde(rename = "tournament")]
    pub tournament_id: TournamentId,
    pub team1: String,
    pub team2: String,
    pub date: Option<NaiveDate>,
    #[serde(rename = "field")]
    pub field_id: Option<i64>,
    pub status: MatchStatus,
    pub result: Option<MatchResult>,
}

impl Match {
    /// Result of the match if it has been played
    pub fn played_result(&self) -> Option<MatchResult> {
        match self.status {
            MatchStatus::Played => self.result,
            MatchStatus::Scheduled => None,
        }
    }
}

/// Payload for creating a tournament; validated by [`super::validation`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    #[serde(default)]
    pub name: String,
    pub sport: Sport,
    #[serde(default)]
    pub max_teams: i64,
    #[serde(default)]
    pub start_date: String,
}

/// Partial update of a tournament; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub max_teams: Option<i64>,
    pub start_date: Option<String>,
    pub teams: Option<Vec<Team>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_are_monotonic() {
        use TournamentStatus::*;
        assert!(Open.can_transition_to(Active));
        assert!(Active.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(!Open.can_transition_to(Completed));
        assert!(!Active.can_transition_to(Open));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Completed.can_transition_to(Open));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("active".parse::<TournamentStatus>().unwrap(), TournamentStatus::Active);
        assert!("finished".parse::<TournamentStatus>().is_err());
        assert_eq!("played".parse::<MatchStatus>().unwrap(), MatchStatus::Played);
        assert!("cancelled".parse::<MatchStatus>().is_err());
    }

    #[test]
    fn test_match_serializes_result_in_camel_case() {
        let m = Match {
            id: 1,
            tournament_id: 7,
            team1: "Milan".to_string(),
            team2: "Inter".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 5, 1),
            field_id: None,
            status: MatchStatus::Played,
            result: Some(MatchResult::new(2, 1)),
        };

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["tournament"], 7);
        assert_eq!(json["status"], "played");
        assert_eq!(json["result"]["team1Score"], 2);
        assert_eq!(json["result"]["team2Score"], 1);
        assert_eq!(json["date"], "2026-05-01");
    }

    #[test]
    fn test_scheduled_match_has_no_played_result() {
        let m = Match {
            id: 1,
            tournament_id: 1,
            team1: "A".to_string(),
            team2: "B".to_string(),
            date: None,
            field_id: None,
            status: MatchStatus::Scheduled,
            result: Some(MatchResult::new(1, 0)),
        };
        assert_eq!(m.played_result(), None);
    }

    #[test]
    fn test_team_deserializes_without_players() {
        let team: Team = serde_json::from_str(r#"{"name":"Real Madrid"}"#).unwrap();
        assert_eq!(team.name, "Real Madrid");
        assert!(team.players.is_empty());
    }

    #[test]
    fn test_update_accepts_partial_payload() {
        let update: TournamentUpdate = serde_json::from_str(r#"{"maxTeams": 8}"#).unwrap();
        assert_eq!(update.max_teams, Some(8));
        assert!(update.name.is_none());
        assert!(update.teams.is_none());
    }
}
