//! Field and booking data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::sport::Sport;

/// Field ID type
pub type FieldId = i64;

/// Booking ID type
pub type BookingId = i64;

/// Hourly slots offered by a field that does not list its own
pub const DEFAULT_SLOTS: [&str; 12] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00",
    "19:00", "20:00",
];

/// Bookable sports field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub sport: Sport,
    pub address: String,
    pub bookable_slots: Vec<String>,
}

impl Field {
    /// Slots this field can be booked for, in order
    pub fn slots(&self) -> Vec<String> {
        if self.bookable_slots.is_empty() {
            DEFAULT_SLOTS.iter().map(|s| s.to_string()).collect()
        } else {
            self.bookable_slots.clone()
        }
    }

    pub fn offers(&self, slot: &str) -> bool {
        if self.bookable_slots.is_empty() {
            DEFAULT_SLOTS.contains(&slot)
        } else {
            self.bookable_slots.iter().any(|s| s == slot)
        }
    }
}

/// New field, used when seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewField {
    pub name: String,
    pub sport: Sport,
    pub address: String,
    #[serde(default)]
    pub bookable_slots: Vec<String>,
}

/// One-hour reservation of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[serde(rename = "field")]
    pub field_id: FieldId,
    pub date: NaiveDate,
    pub slot: String,
    pub created_at: DateTime<Utc>,
}

/// Booking together with the booked field, as listed for its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBooking {
    pub id: BookingId,
    pub field: Field,
    pub date: NaiveDate,
    pub slot: String,
    pub created_at: DateTime<Utc>,
}

/// Booking request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBooking {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub slot: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(slots: &[&str]) -> Field {
        Field {
            id: 1,
            name: "San Siro".to_string(),
            sport: Sport::Football,
            address: "Via Piccolomini 5".to_string(),
            bookable_slots: slots.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_slots_when_none_listed() {
        let f = field(&[]);
        assert_eq!(f.slots().len(), 12);
        assert_eq!(f.slots()[0], "09:00");
        assert!(f.offers("20:00"));
        assert!(!f.offers("21:00"));
    }

    #[test]
    fn test_listed_slots_replace_defaults() {
        let f = field(&["18:00", "19:30"]);
        assert_eq!(f.slots(), vec!["18:00", "19:30"]);
        assert!(f.offers("19:30"));
        assert!(!f.offers("09:00"));
    }

    #[test]
    fn test_field_serializes_camel_case() {
        let json = serde_json::to_value(field(&["10:00"])).unwrap();
        assert_eq!(json["bookableSlots"][0], "10:00");
        assert_eq!(json["sport"], "football");
    }
}
