//! Tournament handlers.
//!
//! Reads are public; every mutation requires the caller to be the creator.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use courtside::{
    auth::UserId,
    tournament::{
        Match, NewTournament, StandingsRow, Tournament, TournamentDetails, TournamentId,
        TournamentUpdate,
    },
};
use serde::Serialize;
use serde_json::{Value, json};

use super::{ApiError, AppState, SearchQuery, extract::ApiJson, tournament_error};
use crate::metrics;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: &'static str,
    pub count: usize,
}

/// `GET /api/tournaments?q=`
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    let tournaments = state
        .tournament_manager
        .list_tournaments(query.as_deref())
        .await
        .map_err(tournament_error)?;
    Ok(Json(tournaments))
}

/// `POST /api/tournaments`: `201` with the new, open tournament
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    ApiJson(request): ApiJson<NewTournament>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let tournament = state
        .tournament_manager
        .create_tournament(user_id, request)
        .await
        .map_err(tournament_error)?;
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// `GET /api/tournaments/{id}`: tournament with its matches
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentDetails>, ApiError> {
    let details = state
        .tournament_manager
        .get_details(tournament_id)
        .await
        .map_err(tournament_error)?;
    Ok(Json(details))
}

/// `PUT /api/tournaments/{id}`: partial update by the creator
pub async fn update_tournament(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
    ApiJson(update): ApiJson<TournamentUpdate>,
) -> Result<Json<Tournament>, ApiError> {
    let tournament = state
        .tournament_manager
        .update_tournament(tournament_id, user_id, update)
        .await
        .map_err(tournament_error)?;
    Ok(Json(tournament))
}

/// `DELETE /api/tournaments/{id}`: removes the tournament and its matches
pub async fn delete_tournament(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Value>, ApiError> {
    state
        .tournament_manager
        .delete_tournament(tournament_id, user_id)
        .await
        .map_err(tournament_error)?;
    Ok(Json(json!({ "message": "Tournament deleted" })))
}

/// `POST /api/tournaments/{id}/matches/generate`
///
/// Replaces all matches with a single round robin over the current teams and
/// moves the tournament to `active`.
///
/// # Errors
///
/// - `400 Bad Request`: fewer than two teams
/// - `403 Forbidden`: caller is not the creator
/// - `409 Conflict`: tournament already completed
pub async fn generate_matches(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let count = state
        .tournament_manager
        .generate_matches(tournament_id, user_id)
        .await
        .map_err(tournament_error)?;

    metrics::matches_generated_total(count);
    Ok(Json(GenerateResponse {
        message: "Matches generated",
        count,
    }))
}

/// `GET /api/tournaments/{id}/matches`
pub async fn list_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<Match>>, ApiError> {
    // 404 for an unknown tournament rather than an empty list
    state
        .tournament_manager
        .get_tournament(tournament_id)
        .await
        .map_err(tournament_error)?;

    let matches = state
        .tournament_manager
        .list_matches(tournament_id)
        .await
        .map_err(tournament_error)?;
    Ok(Json(matches))
}

/// `GET /api/tournaments/{id}/standings`
pub async fn standings(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<StandingsRow>>, ApiError> {
    let table = state
        .tournament_manager
        .standings(tournament_id)
        .await
        .map_err(tournament_error)?;
    Ok(Json(table))
}

/// `POST /api/tournaments/{id}/complete`: `active -> completed`, else `409`
pub async fn complete_tournament(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    let tournament = state
        .tournament_manager
        .complete_tournament(tournament_id, user_id)
        .await
        .map_err(tournament_error)?;
    Ok(Json(tournament))
}
