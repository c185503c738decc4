//! Match handlers.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use courtside::{
    auth::UserId,
    tournament::{Match, MatchId, validation},
};
use serde::Deserialize;
use serde_json::Value;

use super::{ApiError, AppState, extract::ApiJson, tournament_error};
use crate::metrics;

/// Reported score; both fields are required.
///
/// Kept as raw JSON so that strings, fractions and other non-integers reach
/// score validation instead of failing body deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub team1_score: Option<Value>,
    pub team2_score: Option<Value>,
}

impl ResultPayload {
    /// Integer scores, `None` for anything missing or not an integer
    pub fn scores(&self) -> (Option<i64>, Option<i64>) {
        (
            integer_score(self.team1_score.as_ref()),
            integer_score(self.team2_score.as_ref()),
        )
    }
}

/// JSON integers and integer strings (`"3"`) are scores; nothing else is
fn integer_score(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `GET /api/matches/{id}`
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Match>, ApiError> {
    let m = state
        .tournament_manager
        .get_match(match_id)
        .await
        .map_err(tournament_error)?;
    Ok(Json(m))
}

/// `PUT /api/matches/{id}/result`: record the score and mark the match played.
///
/// # Errors
///
/// - `400 Bad Request`: a score is missing or negative
/// - `403 Forbidden`: caller did not create the tournament
/// - `409 Conflict`: match already played, or tournament completed
pub async fn report_result(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(match_id): Path<MatchId>,
    ApiJson(payload): ApiJson<ResultPayload>,
) -> Result<Json<Match>, ApiError> {
    let (team1_score, team2_score) = payload.scores();
    let result =
        validation::validate_scores(team1_score, team2_score).map_err(tournament_error)?;

    let updated = state
        .tournament_manager
        .report_result(match_id, user_id, result)
        .await
        .map_err(tournament_error)?;

    metrics::results_reported_total();
    Ok(Json(updated))
}
