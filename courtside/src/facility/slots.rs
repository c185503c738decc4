//! Date and slot parsing for bookings.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::errors::{FacilityError, FacilityResult};

/// Parse a `YYYY-MM-DD` booking date
pub fn parse_date(raw: &str) -> FacilityResult<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FacilityError::MissingDate);
    }
    if raw.len() != 10 {
        return Err(FacilityError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FacilityError::InvalidDate(raw.to_string()))
}

/// Parse a zero-padded `HH:MM` slot
pub fn parse_slot(raw: &str) -> FacilityResult<NaiveTime> {
    if raw.len() != 5 {
        return Err(FacilityError::InvalidSlot(raw.to_string()));
    }
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| FacilityError::InvalidSlot(raw.to_string()))
}

/// Whether the slot starting at `date` `slot` has already begun at `now`
pub fn is_past(date: NaiveDate, slot: NaiveTime, now: NaiveDateTime) -> bool {
    date.and_time(slot) < now
}
