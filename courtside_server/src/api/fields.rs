//! Field and booking handlers.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use courtside::{
    auth::UserId,
    facility::{Booking, BookingId, Field, FieldId, NewBooking},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, AppState, SearchQuery, extract::ApiJson, facility_error};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

/// `GET /api/fields?q=`: fields matching `q` in name, sport or address
pub async fn list_fields(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Field>>, ApiError> {
    let fields = state
        .facility_manager
        .list_fields(query.as_deref())
        .await
        .map_err(facility_error)?;
    Ok(Json(fields))
}

/// `GET /api/fields/{id}`
pub async fn get_field(
    State(state): State<AppState>,
    Path(field_id): Path<FieldId>,
) -> Result<Json<Field>, ApiError> {
    let field = state
        .facility_manager
        .get_field(field_id)
        .await
        .map_err(facility_error)?;
    Ok(Json(field))
}

/// `GET /api/fields/{id}/slots?date=YYYY-MM-DD`: free slots, `400` without a date
pub async fn available_slots(
    State(state): State<AppState>,
    Path(field_id): Path<FieldId>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let slots = state
        .facility_manager
        .available_slots(field_id, query.date.as_deref().unwrap_or_default())
        .await
        .map_err(facility_error)?;
    Ok(Json(slots))
}

/// `POST /api/fields/{id}/bookings`: book `{ date, slot }`, `201` with the booking
pub async fn book_slot(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(field_id): Path<FieldId>,
    ApiJson(request): ApiJson<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let booking = state
        .facility_manager
        .book_slot(field_id, user_id, request)
        .await
        .map_err(facility_error)?;

    metrics::bookings_total();
    Ok((StatusCode::CREATED, Json(booking)))
}

/// `DELETE /api/fields/{id}/bookings/{booking_id}`: owner only
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path((field_id, booking_id)): Path<(FieldId, BookingId)>,
) -> Result<Json<Value>, ApiError> {
    state
        .facility_manager
        .cancel_booking(field_id, booking_id, user_id)
        .await
        .map_err(facility_error)?;
    Ok(Json(json!({ "message": "Booking cancelled" })))
}
