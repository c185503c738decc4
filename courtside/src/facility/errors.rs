//! Facility error types.

use super::models::FieldId;
use thiserror::Error;

/// Field and booking errors
#[derive(Debug, Error)]
pub enum FacilityError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Field not found: {0}")]
    FieldNotFound(FieldId),

    /// Unknown booking, or a booking owned by someone else
    #[error("Booking not found or unauthorized")]
    BookingNotFound,

    #[error("Date required")]
    MissingDate,

    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid slot {0:?}, expected HH:MM")]
    InvalidSlot(String),

    #[error("Slot {0} is not offered by this field")]
    SlotNotOffered(String),

    #[error("Cannot book past slots")]
    PastSlot,

    #[error("Slot already booked")]
    SlotTaken,
}

impl FacilityError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            FacilityError::Database(_) => "Internal server error".to_string(),
            FacilityError::FieldNotFound(_) => "Field not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for facility operations
pub type FacilityResult<T> = Result<T, FacilityError>;
