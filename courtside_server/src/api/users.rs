//! User directory handlers.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use courtside::{
    auth::{User, UserId},
    facility::UserBooking,
    tournament::Tournament,
};
use serde::Serialize;

use super::{ApiError, AppState, SearchQuery, auth_error, facility_error, tournament_error};

/// User together with the tournaments they created
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub tournaments: Vec<Tournament>,
}

async fn profile(state: &AppState, user: User) -> Result<UserProfile, ApiError> {
    let tournaments = state
        .tournament_manager
        .list_by_creator(user.id)
        .await
        .map_err(tournament_error)?;
    Ok(UserProfile { user, tournaments })
}

/// `GET /api/users?q=`: users matching `q` in username, name or surname
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = state
        .auth_manager
        .search_users(query.as_deref())
        .await
        .map_err(auth_error)?;

    let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
    let mut by_creator = state
        .tournament_manager
        .list_by_creators(&ids)
        .await
        .map_err(tournament_error)?;

    let profiles = users
        .into_iter()
        .map(|user| UserProfile {
            tournaments: by_creator.remove(&user.id).unwrap_or_default(),
            user,
        })
        .collect();
    Ok(Json(profiles))
}

/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .auth_manager
        .get_user(user_id)
        .await
        .map_err(auth_error)?;
    Ok(Json(profile(&state, user).await?))
}

/// `GET /api/users/me/bookings`: the caller's bookings with their fields
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<UserBooking>>, ApiError> {
    let bookings = state
        .facility_manager
        .user_bookings(user_id)
        .await
        .map_err(facility_error)?;
    Ok(Json(bookings))
}
