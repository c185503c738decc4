//! Facility manager: fields, slot availability and bookings.

use super::{
    errors::{FacilityError, FacilityResult},
    models::{Booking, BookingId, Field, FieldId, NewBooking, NewField, UserBooking},
    slots,
};
use crate::auth::UserId;
use crate::search::contains_pattern;
use chrono::{Local, NaiveDate};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::sync::Arc;

const FIELD_COLUMNS: &str = "id, name, sport, address, bookable_slots";
const BOOKING_COLUMNS: &str = "id, user_id, field_id, date, slot, created_at";

fn field_from_row(row: &PgRow) -> FacilityResult<Field> {
    let sport: String = row.get("sport");
    Ok(Field {
        id: row.get("id"),
        name: row.get("name"),
        sport: sport
            .parse()
            .map_err(|e| FacilityError::Database(sqlx::Error::Decode(Box::new(e))))?,
        address: row.get("address"),
        bookable_slots: row.get("bookable_slots"),
    })
}

fn booking_from_row(row: &PgRow) -> Booking {
    Booking {
        id: row.get("id"),
        user_id: row.get("user_id"),
        field_id: row.get("field_id"),
        date: row.get("date"),
        slot: row.get("slot"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

/// Facility manager
#[derive(Clone)]
pub struct FacilityManager {
    pool: Arc<PgPool>,
}

impl FacilityManager {
    /// Create a new facility manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Fields whose name, sport or address contains `query` (case-insensitive)
    pub async fn list_fields(&self, query: Option<&str>) -> FacilityResult<Vec<Field>> {
        let pattern = contains_pattern(query.map(str::trim).unwrap_or_default());
        let rows = sqlx::query(&format!(
            r#"
            SELECT {FIELD_COLUMNS} FROM fields
            WHERE name ILIKE $1 ESCAPE '\'
               OR sport ILIKE $1 ESCAPE '\'
               OR address ILIKE $1 ESCAPE '\'
            ORDER BY id
            "#
        ))
        .bind(pattern)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(field_from_row).collect()
    }

    /// Get a field by id
    pub async fn get_field(&self, field_id: FieldId) -> FacilityResult<Field> {
        let row = sqlx::query(&format!("SELECT {FIELD_COLUMNS} FROM fields WHERE id = $1"))
            .bind(field_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(FacilityError::FieldNotFound(field_id))?;

        field_from_row(&row)
    }

    /// Create a field
    ///
    /// # Errors
    ///
    /// * `FacilityError::InvalidSlot` - a listed slot is not `HH:MM`
    pub async fn create_field(&self, field: NewField) -> FacilityResult<Field> {
        for slot in &field.bookable_slots {
            slots::parse_slot(slot)?;
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO fields (name, sport, address, bookable_slots)
            VALUES ($1, $2, $3, $4)
            RETURNING {FIELD_COLUMNS}
            "#
        ))
        .bind(&field.name)
        .bind(field.sport.as_str())
        .bind(&field.address)
        .bind(&field.bookable_slots)
        .fetch_one(self.pool.as_ref())
        .await?;

        field_from_row(&row)
    }

    /// Slots of a field still free on `date`, in the field's slot order
    ///
    /// # Errors
    ///
    /// * `FacilityError::MissingDate` / `FacilityError::InvalidDate` - bad date
    /// * `FacilityError::FieldNotFound` - no such field
    pub async fn available_slots(&self, field_id: FieldId, date: &str) -> FacilityResult<Vec<String>> {
        let date = slots::parse_date(date)?;
        let field = self.get_field(field_id).await?;
        let booked = self.booked_slots(field_id, date).await?;

        Ok(free_slots(&field, &booked))
    }

    async fn booked_slots(&self, field_id: FieldId, date: NaiveDate) -> FacilityResult<HashSet<String>> {
        let rows = sqlx::query("SELECT slot FROM bookings WHERE field_id = $1 AND date = $2")
            .bind(field_id)
            .bind(date)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.iter().map(|row| row.get("slot")).collect())
    }

    /// Book one slot of a field for `user_id`.
    ///
    /// The unique `(field, date, slot)` constraint decides between concurrent
    /// requests for the same slot; the loser gets `SlotTaken`.
    ///
    /// # Errors
    ///
    /// * `FacilityError::InvalidDate` / `FacilityError::InvalidSlot` - malformed input
    /// * `FacilityError::SlotNotOffered` - slot not in the field's list
    /// * `FacilityError::PastSlot` - slot already started (server local time)
    /// * `FacilityError::SlotTaken` - slot already booked
    pub async fn book_slot(
        &self,
        field_id: FieldId,
        user_id: UserId,
        request: NewBooking,
    ) -> FacilityResult<Booking> {
        let date = slots::parse_date(&request.date)?;
        let time = slots::parse_slot(request.slot.trim())?;
        let slot = request.slot.trim().to_string();

        let field = self.get_field(field_id).await?;
        if !field.offers(&slot) {
            return Err(FacilityError::SlotNotOffered(slot));
        }
        if slots::is_past(date, time, Local::now().naive_local()) {
            return Err(FacilityError::PastSlot);
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (user_id, field_id, date, slot)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (field_id, date, slot) DO NOTHING
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(field_id)
        .bind(date)
        .bind(&slot)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(FacilityError::SlotTaken)?;

        let booking = booking_from_row(&row);
        log::info!(
            "User {} booked field {} on {} at {}",
            user_id,
            field_id,
            booking.date,
            booking.slot
        );
        Ok(booking)
    }

    /// Cancel a booking owned by `user_id`
    ///
    /// # Errors
    ///
    /// * `FacilityError::BookingNotFound` - no such booking on this field for this user
    pub async fn cancel_booking(
        &self,
        field_id: FieldId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> FacilityResult<()> {
        let result = sqlx::query(
            "DELETE FROM bookings WHERE id = $1 AND field_id = $2 AND user_id = $3",
        )
        .bind(booking_id)
        .bind(field_id)
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(FacilityError::BookingNotFound);
        }

        log::info!("User {} cancelled booking {}", user_id, booking_id);
        Ok(())
    }

    /// Bookings of a user with their fields, newest date first
    pub async fn user_bookings(&self, user_id: UserId) -> FacilityResult<Vec<UserBooking>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id AS booking_id, b.date, b.slot, b.created_at,
                   f.id, f.name, f.sport, f.address, f.bookable_slots
            FROM bookings b
            JOIN fields f ON f.id = b.field_id
            WHERE b.user_id = $1
            ORDER BY b.date DESC, b.slot
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(UserBooking {
                    id: row.get("booking_id"),
                    field: field_from_row(row)?,
                    date: row.get("date"),
                    slot: row.get("slot"),
                    created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
                })
            })
            .collect()
    }
}

/// The field's slots minus the booked ones, keeping slot order
pub fn free_slots(field: &Field, booked: &HashSet<String>) -> Vec<String> {
    field
        .slots()
        .into_iter()
        .filter(|slot| !booked.contains(slot))
        .collect()
}
