//! Tournament manager: persistence and ownership rules around the pure
//! schedule and standings functions.

use super::models::{
    Creator, Match, MatchId, MatchResult, MatchStatus, NewTournament, Team, Tournament,
    TournamentDetails, TournamentId, TournamentStatus, TournamentUpdate,
};
use super::{schedule, standings, standings::StandingsRow, validation};
use crate::auth::UserId;
use crate::db::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, TimeoutError};
use crate::search::contains_pattern;
use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("User {user_id} does not own tournament {tournament_id}")]
    NotOwner {
        tournament_id: TournamentId,
        user_id: UserId,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Not enough teams: need 2, have {0}")]
    NotEnoughTeams(usize),

    #[error("Tournament is {actual}, cannot move to {requested}")]
    InvalidState {
        actual: TournamentStatus,
        requested: TournamentStatus,
    },

    #[error("Tournament is completed")]
    Completed,

    #[error("Match {0} already has a result")]
    AlreadyPlayed(MatchId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

impl TournamentError {
    /// Get a client-safe error message that doesn't leak internal details
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::NotFound(_) => "Tournament not found".to_string(),
            TournamentError::MatchNotFound(_) => "Match not found".to_string(),
            TournamentError::NotOwner { .. } => "Unauthorized".to_string(),
            TournamentError::NotEnoughTeams(_) => "Not enough teams".to_string(),
            TournamentError::AlreadyPlayed(_) => "Match result already reported".to_string(),
            TournamentError::Database(_) | TournamentError::Serialization(_) => {
                "Internal server error".to_string()
            }
            TournamentError::Timeout(_) => "Service temporarily unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;

const TOURNAMENT_SELECT: &str = r#"
    SELECT t.id, t.name, t.sport, t.max_teams, t.start_date, t.creator_id,
           u.username AS creator_username, t.teams, t.status, t.created_at
    FROM tournaments t
    JOIN users u ON u.id = t.creator_id
"#;

const MATCH_COLUMNS: &str =
    "id, tournament_id, team1, team2, date, field_id, status, team1_score, team2_score";

fn decode_error(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

fn tournament_from_row(row: &PgRow) -> TournamentResult<Tournament> {
    let teams: Vec<Team> = serde_json::from_value(row.get("teams"))?;
    let sport: String = row.get("sport");
    let status: String = row.get("status");
    let max_teams: i32 = row.get("max_teams");

    Ok(Tournament {
        id: row.get("id"),
        name: row.get("name"),
        sport: sport.parse().map_err(decode_error)?,
        max_teams: max_teams.max(0) as u32,
        start_date: row.get("start_date"),
        creator: Creator {
            id: row.get("creator_id"),
            username: row.get("creator_username"),
        },
        teams,
        status: status.parse().map_err(decode_error)?,
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    })
}

fn match_from_row(row: &PgRow) -> TournamentResult<Match> {
    let status: MatchStatus = row.get::<String, _>("status").parse().map_err(decode_error)?;
    let team1_score: Option<i32> = row.get("team1_score");
    let team2_score: Option<i32> = row.get("team2_score");

    let result = match (team1_score, team2_score) {
        (Some(s1), Some(s2)) => Some(MatchResult::new(s1.max(0) as u32, s2.max(0) as u32)),
        _ => None,
    };

    Ok(Match {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        team1: row.get("team1"),
        team2: row.get("team2"),
        date: row.get("date"),
        field_id: row.get("field_id"),
        status,
        result,
    })
}

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    pool: Arc<PgPool>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// List tournaments whose name contains `query` (case-insensitive)
    pub async fn list_tournaments(&self, query: Option<&str>) -> TournamentResult<Vec<Tournament>> {
        let rows = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                sqlx::query(&format!(
                    "{TOURNAMENT_SELECT} WHERE t.name ILIKE $1 ESCAPE '\\' ORDER BY t.id"
                ))
                .bind(contains_pattern(q))
                .fetch_all(self.pool.as_ref())
                .await?
            }
            None => {
                sqlx::query(&format!("{TOURNAMENT_SELECT} ORDER BY t.id"))
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
        };

        rows.iter().map(tournament_from_row).collect()
    }

    /// Tournaments created by `user_id`
    pub async fn list_by_creator(&self, user_id: UserId) -> TournamentResult<Vec<Tournament>> {
        let rows = sqlx::query(&format!(
            "{TOURNAMENT_SELECT} WHERE t.creator_id = $1 ORDER BY t.id"
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(tournament_from_row).collect()
    }

    /// Tournaments of several creators in one query, grouped by creator.
    ///
    /// Every id in `user_ids` has an entry, empty when the user created none.
    pub async fn list_by_creators(
        &self,
        user_ids: &[UserId],
    ) -> TournamentResult<HashMap<UserId, Vec<Tournament>>> {
        let mut grouped: HashMap<UserId, Vec<Tournament>> =
            user_ids.iter().map(|&id| (id, Vec::new())).collect();
        if user_ids.is_empty() {
            return Ok(grouped);
        }

        let rows = sqlx::query(&format!(
            "{TOURNAMENT_SELECT} WHERE t.creator_id = ANY($1) ORDER BY t.id"
        ))
        .bind(user_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        for row in &rows {
            let tournament = tournament_from_row(row)?;
            grouped
                .entry(tournament.creator.id)
                .or_default()
                .push(tournament);
        }
        Ok(grouped)
    }

    /// Get a tournament by id
    pub async fn get_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        let row = sqlx::query(&format!("{TOURNAMENT_SELECT} WHERE t.id = $1"))
            .bind(tournament_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))?;

        tournament_from_row(&row)
    }

    /// Get a tournament together with its matches
    pub async fn get_details(&self, tournament_id: TournamentId) -> TournamentResult<TournamentDetails> {
        let tournament = self.get_tournament(tournament_id).await?;
        let matches = self.list_matches(tournament_id).await?;
        Ok(TournamentDetails {
            tournament,
            matches,
        })
    }

    /// Create a tournament owned by `creator_id`
    ///
    /// # Errors
    ///
    /// * `TournamentError::Validation` - name, team limit or start date invalid
    pub async fn create_tournament(
        &self,
        creator_id: UserId,
        request: NewTournament,
    ) -> TournamentResult<Tournament> {
        let name = validation::validate_name(&request.name)?;
        let max_teams = validation::validate_max_teams(request.max_teams)?;
        let start_date = validation::parse_start_date(&request.start_date, today())?;

        let row = sqlx::query(
            r#"
            INSERT INTO tournaments (name, sport, max_teams, start_date, creator_id, teams, status)
            VALUES ($1, $2, $3, $4, $5, '[]'::jsonb, 'open')
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(request.sport.as_str())
        .bind(max_teams as i32)
        .bind(start_date)
        .bind(creator_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let id: TournamentId = row.get("id");
        log::info!("User {} created {} tournament {} ({})", creator_id, request.sport, id, name);
        self.get_tournament(id).await
    }

    /// Apply a partial update; only the creator may edit
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotOwner` - caller did not create the tournament
    /// * `TournamentError::Completed` - tournament is closed
    /// * `TournamentError::Validation` - invalid field or roster
    pub async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
        update: TournamentUpdate,
    ) -> TournamentResult<Tournament> {
        let mut tx = self.pool.begin().await?;
        let current = lock_owned(&mut tx, tournament_id, user_id).await?;

        if current.status == TournamentStatus::Completed {
            return Err(TournamentError::Completed);
        }

        let name = match update.name {
            Some(name) => validation::validate_name(&name)?,
            None => current.name,
        };
        let max_teams = match update.max_teams {
            Some(max_teams) => validation::validate_max_teams(max_teams)?,
            None => current.max_teams,
        };
        let start_date = match update.start_date {
            Some(raw) => validation::parse_start_date(&raw, today())?,
            None => current.start_date,
        };
        let teams = validation::validate_teams(update.teams.unwrap_or(current.teams), max_teams)?;

        sqlx::query(
            r#"
            UPDATE tournaments
            SET name = $1, max_teams = $2, start_date = $3, teams = $4
            WHERE id = $5
            "#,
        )
        .bind(&name)
        .bind(max_teams as i32)
        .bind(start_date)
        .bind(serde_json::to_value(&teams)?)
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get_tournament(tournament_id).await
    }

    /// Delete a tournament and its matches; only the creator may delete
    pub async fn delete_tournament(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> TournamentResult<()> {
        let mut tx = self.pool.begin().await?;
        lock_owned(&mut tx, tournament_id, user_id).await?;

        // matches go with the tournament through ON DELETE CASCADE
        sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        log::info!("User {} deleted tournament {}", user_id, tournament_id);
        Ok(())
    }

    /// Replace the tournament's matches with a fresh round robin.
    ///
    /// Runs in one transaction holding the tournament row lock, so concurrent
    /// generations serialize and exactly one generated set survives. Moves the
    /// tournament to `active`. Returns the number of matches created.
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotEnoughTeams` - fewer than two teams
    /// * `TournamentError::InvalidState` - tournament already completed
    pub async fn generate_matches(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> TournamentResult<usize> {
        let generation = self.generate_in_transaction(tournament_id, user_id);
        let count = tokio::time::timeout(DEFAULT_TRANSACTION_TIMEOUT, generation)
            .await
            .map_err(|_| TimeoutError::Timeout(DEFAULT_TRANSACTION_TIMEOUT))??;

        log::info!("Generated {} matches for tournament {}", count, tournament_id);
        Ok(count)
    }

    async fn generate_in_transaction(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> TournamentResult<usize> {
        let mut tx = self.pool.begin().await?;
        let tournament = lock_owned(&mut tx, tournament_id, user_id).await?;

        if tournament.teams.len() < 2 {
            return Err(TournamentError::NotEnoughTeams(tournament.teams.len()));
        }
        if !tournament.status.can_transition_to(TournamentStatus::Active) {
            return Err(TournamentError::InvalidState {
                actual: tournament.status,
                requested: TournamentStatus::Active,
            });
        }

        let specs = schedule::generate(&tournament.teams);
        let (team1, team2): (Vec<String>, Vec<String>) =
            specs.into_iter().map(|m| (m.team1, m.team2)).unzip();

        sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO matches (tournament_id, team1, team2, date, status)
            SELECT $1, pair.team1, pair.team2, $4, 'scheduled'
            FROM UNNEST($2::text[], $3::text[]) WITH ORDINALITY AS pair(team1, team2, ord)
            ORDER BY pair.ord
            "#,
        )
        .bind(tournament_id)
        .bind(&team1)
        .bind(&team2)
        .bind(tournament.start_date)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE tournaments SET status = $1 WHERE id = $2")
            .bind(TournamentStatus::Active.as_str())
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inserted.rows_affected() as usize)
    }

    /// Close an active tournament
    pub async fn complete_tournament(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> TournamentResult<Tournament> {
        let mut tx = self.pool.begin().await?;
        let tournament = lock_owned(&mut tx, tournament_id, user_id).await?;

        if tournament.status != TournamentStatus::Active {
            return Err(TournamentError::InvalidState {
                actual: tournament.status,
                requested: TournamentStatus::Completed,
            });
        }

        sqlx::query("UPDATE tournaments SET status = $1 WHERE id = $2")
            .bind(TournamentStatus::Completed.as_str())
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        log::info!("Tournament {} completed", tournament_id);
        self.get_tournament(tournament_id).await
    }

    /// Matches of a tournament in generation order
    pub async fn list_matches(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 ORDER BY id"
        ))
        .bind(tournament_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    /// Current league table, recomputed on every call
    pub async fn standings(&self, tournament_id: TournamentId) -> TournamentResult<Vec<StandingsRow>> {
        let tournament = self.get_tournament(tournament_id).await?;

        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 AND status = $2 ORDER BY id"
        ))
        .bind(tournament_id)
        .bind(MatchStatus::Played.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;
        let played = rows
            .iter()
            .map(match_from_row)
            .collect::<TournamentResult<Vec<_>>>()?;

        Ok(standings::compute_standings(
            tournament.sport,
            &tournament.teams,
            &played,
        ))
    }

    /// Get a match by id
    pub async fn get_match(&self, match_id: MatchId) -> TournamentResult<Match> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
            .bind(match_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;

        match_from_row(&row)
    }

    /// Record the final score of a scheduled match.
    ///
    /// Only the tournament creator may report; a match takes exactly one result.
    ///
    /// # Errors
    ///
    /// * `TournamentError::MatchNotFound` - no such match
    /// * `TournamentError::NotOwner` - caller did not create the tournament
    /// * `TournamentError::AlreadyPlayed` - the match already has a result
    /// * `TournamentError::Completed` - the tournament is closed
    pub async fn report_result(
        &self,
        match_id: MatchId,
        user_id: UserId,
        result: MatchResult,
    ) -> TournamentResult<Match> {
        let tournament_id = self.get_match(match_id).await?.tournament_id;

        // tournament row first, same order as generation
        let mut tx = self.pool.begin().await?;
        let tournament = lock_owned(&mut tx, tournament_id, user_id).await?;

        let row = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1 FOR UPDATE"
        ))
        .bind(match_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(TournamentError::MatchNotFound(match_id))?;
        let current = match_from_row(&row)?;

        if tournament.status == TournamentStatus::Completed {
            return Err(TournamentError::Completed);
        }
        if current.status == MatchStatus::Played {
            return Err(TournamentError::AlreadyPlayed(match_id));
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE matches
            SET status = $1, team1_score = $2, team2_score = $3
            WHERE id = $4
            RETURNING {MATCH_COLUMNS}
            "#
        ))
        .bind(MatchStatus::Played.as_str())
        .bind(result.team1_score as i32)
        .bind(result.team2_score as i32)
        .bind(match_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        log::info!(
            "Match {} ({} vs {}) played {}-{}",
            match_id,
            current.team1,
            current.team2,
            result.team1_score,
            result.team2_score
        );
        match_from_row(&row)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Lock the tournament row for the rest of the transaction and check ownership
async fn lock_owned(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: TournamentId,
    user_id: UserId,
) -> TournamentResult<Tournament> {
    let row = sqlx::query(&format!("{TOURNAMENT_SELECT} WHERE t.id = $1 FOR UPDATE OF t"))
        .bind(tournament_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(TournamentError::NotFound(tournament_id))?;

    let tournament = tournament_from_row(&row)?;
    if !tournament.is_owned_by(user_id) {
        return Err(TournamentError::NotOwner {
            tournament_id,
            user_id,
        });
    }
    Ok(tournament)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_hide_internals() {
        let err = TournamentError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.client_message(), "Internal server error");

        let err = TournamentError::NotOwner {
            tournament_id: 4,
            user_id: 9,
        };
        assert_eq!(err.client_message(), "Unauthorized");

        let err = TournamentError::NotEnoughTeams(1);
        assert_eq!(err.client_message(), "Not enough teams");
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = TournamentError::Validation("Max teams must be at least 2".to_string());
        assert_eq!(err.client_message(), "Max teams must be at least 2");
    }

    #[test]
    fn test_invalid_state_display() {
        let err = TournamentError::InvalidState {
            actual: TournamentStatus::Completed,
            requested: TournamentStatus::Active,
        };
        assert_eq!(err.to_string(), "Tournament is completed, cannot move to active");
    }
}
