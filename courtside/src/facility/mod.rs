//! Facility: bookable sports fields and one-hour slot bookings.
//!
//! A slot is a zero-padded `HH:MM` start time. A field either lists its own
//! slots or offers [`DEFAULT_SLOTS`]. At most one booking exists per field,
//! date and slot.

pub mod errors;
pub mod manager;
pub mod models;
pub mod slots;

pub use errors::{FacilityError, FacilityResult};
pub use manager::{FacilityManager, free_slots};
pub use models::{
    Booking, BookingId, DEFAULT_SLOTS, Field, FieldId, NewBooking, NewField, UserBooking,
};
