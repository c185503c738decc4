//! HTTP API for fields, bookings and tournaments.
//!
//! # Modules
//!
//! - [`auth`]: signup, signin, token refresh and logout
//! - [`users`]: user directory and the caller's bookings
//! - [`fields`]: fields, free slots and bookings
//! - [`tournaments`]: tournaments, match generation and standings
//! - [`matches`]: single matches and result reporting
//! - [`extract`]: JSON bodies rejected as `400` with the error shape below
//! - [`middleware`]: bearer-token authentication for protected endpoints
//! - [`request_id`]: `x-request-id` propagation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                                  - Health check
//! POST   /api/auth/signup                         - Register
//! POST   /api/auth/signin                         - Login
//! POST   /api/auth/refresh                        - Rotate refresh token
//! POST   /api/auth/logout                         - Invalidate refresh token
//! GET    /api/whoami                              - Current user (auth)
//! GET    /api/users?q=                            - Search users
//! GET    /api/users/{id}                          - User with created tournaments
//! GET    /api/users/me/bookings                   - Caller's bookings (auth)
//! GET    /api/fields?q=                           - Search fields
//! GET    /api/fields/{id}                         - Field details
//! GET    /api/fields/{id}/slots?date=             - Free slots on a date
//! POST   /api/fields/{id}/bookings                - Book a slot (auth)
//! DELETE /api/fields/{id}/bookings/{booking_id}   - Cancel own booking (auth)
//! GET    /api/tournaments?q=                      - Search tournaments
//! POST   /api/tournaments                         - Create tournament (auth)
//! GET    /api/tournaments/{id}                    - Tournament with matches
//! PUT    /api/tournaments/{id}                    - Edit tournament (owner)
//! DELETE /api/tournaments/{id}                    - Delete tournament (owner)
//! POST   /api/tournaments/{id}/matches/generate   - Round robin (owner)
//! GET    /api/tournaments/{id}/matches            - Matches
//! GET    /api/tournaments/{id}/standings          - League table
//! POST   /api/tournaments/{id}/complete           - Close tournament (owner)
//! GET    /api/matches/{id}                        - Match details
//! PUT    /api/matches/{id}/result                 - Report result (owner)
//! ```
//!
//! Errors are returned as `{ "error": "<message>" }`. A request body that
//! is not valid JSON for the endpoint is a `400`.
//!
//! # CORS
//!
//! CORS is configured permissively so a browser frontend on another origin
//! can call the API.

pub mod auth;
pub mod extract;
pub mod fields;
pub mod matches;
pub mod middleware;
pub mod request_id;
pub mod tournaments;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
};
use courtside::{
    auth::{AuthError, AuthManager},
    db::with_default_timeout,
    facility::{FacilityError, FacilityManager},
    tournament::{TournamentError, TournamentManager},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::metrics;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub facility_manager: Arc<FacilityManager>,
    pub tournament_manager: Arc<TournamentManager>,
    pub pool: Arc<PgPool>,
}

impl AppState {
    /// Build all managers over one pool
    pub fn new(pool: Arc<PgPool>, auth_manager: AuthManager) -> Self {
        Self {
            auth_manager: Arc::new(auth_manager),
            facility_manager: Arc::new(FacilityManager::new(pool.clone())),
            tournament_manager: Arc::new(TournamentManager::new(pool.clone())),
            pool,
        }
    }
}

/// `?q=` substring filter shared by the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn as_deref(&self) -> Option<&str> {
        self.q.as_deref()
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn auth_error(err: AuthError) -> ApiError {
    let status = match &err {
        AuthError::Database(_) | AuthError::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::SessionExpired | AuthError::InvalidRefreshToken | AuthError::JwtError(_) => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::UsernameTaken => StatusCode::CONFLICT,
        AuthError::InvalidPassword
        | AuthError::InvalidUsername(_)
        | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "Authentication failure");
    }
    error_response(status, err.client_message())
}

pub fn facility_error(err: FacilityError) -> ApiError {
    let status = match &err {
        FacilityError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        FacilityError::FieldNotFound(_) | FacilityError::BookingNotFound => StatusCode::NOT_FOUND,
        FacilityError::SlotTaken => StatusCode::CONFLICT,
        FacilityError::MissingDate
        | FacilityError::InvalidDate(_)
        | FacilityError::InvalidSlot(_)
        | FacilityError::SlotNotOffered(_)
        | FacilityError::PastSlot => StatusCode::BAD_REQUEST,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "Facility failure");
    }
    error_response(status, err.client_message())
}

pub fn tournament_error(err: TournamentError) -> ApiError {
    let status = match &err {
        TournamentError::NotFound(_) | TournamentError::MatchNotFound(_) => StatusCode::NOT_FOUND,
        TournamentError::NotOwner { .. } => StatusCode::FORBIDDEN,
        TournamentError::Validation(_) | TournamentError::NotEnoughTeams(_) => {
            StatusCode::BAD_REQUEST
        }
        TournamentError::InvalidState { .. }
        | TournamentError::Completed
        | TournamentError::AlreadyPlayed(_) => StatusCode::CONFLICT,
        TournamentError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        TournamentError::Database(_) | TournamentError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "Tournament failure");
    }
    error_response(status, err.client_message())
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use courtside_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_router(state.clone()))
        .layer(axum::middleware::from_fn(metrics::track_http))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/fields", get(fields::list_fields))
        .route("/fields/{id}", get(fields::get_field))
        .route("/fields/{id}/slots", get(fields::available_slots))
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{id}", get(tournaments::get_tournament))
        .route("/tournaments/{id}/matches", get(tournaments::list_matches))
        .route("/tournaments/{id}/standings", get(tournaments::standings))
        .route("/matches/{id}", get(matches::get_match));

    let protected_routes = Router::new()
        .route("/whoami", get(auth::whoami))
        .route("/users/me/bookings", get(users::my_bookings))
        .route("/fields/{id}/bookings", post(fields::book_slot))
        .route(
            "/fields/{id}/bookings/{booking_id}",
            delete(fields::cancel_booking),
        )
        .route("/tournaments", post(tournaments::create_tournament))
        .route(
            "/tournaments/{id}",
            put(tournaments::update_tournament).delete(tournaments::delete_tournament),
        )
        .route(
            "/tournaments/{id}/matches/generate",
            post(tournaments::generate_matches),
        )
        .route(
            "/tournaments/{id}/complete",
            post(tournaments::complete_tournament),
        )
        .route("/matches/{id}/result", put(matches::report_result))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers within the query timeout, or
/// `503 Service Unavailable` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = with_default_timeout(sqlx::query("SELECT 1").execute(state.pool.as_ref()))
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tournament_error_statuses() {
        let (status, _) = tournament_error(TournamentError::NotFound(1));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, Json(body)) = tournament_error(TournamentError::NotEnoughTeams(1));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Not enough teams");

        let (status, _) = tournament_error(TournamentError::AlreadyPlayed(3));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, Json(body)) = tournament_error(TournamentError::NotOwner {
            tournament_id: 1,
            user_id: 2,
        });
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error, "Unauthorized");
    }

    #[test]
    fn test_facility_error_statuses() {
        let (status, Json(body)) = facility_error(FacilityError::BookingNotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Booking not found or unauthorized");

        let (status, _) = facility_error(FacilityError::SlotTaken);
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = facility_error(FacilityError::PastSlot);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_errors_are_hidden() {
        let (status, Json(body)) = auth_error(AuthError::Database(sqlx::Error::PoolClosed));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }
}
