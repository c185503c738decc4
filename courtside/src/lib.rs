//! # Courtside
//!
//! Sports-facility booking and tournament management.
//!
//! Users book one-hour slots on football, volleyball and basketball fields,
//! and organize single round-robin tournaments with a league table.
//!
//! ## Core Modules
//!
//! - [`tournament`]: round-robin generation, standings and tournament lifecycle
//! - [`facility`]: fields, slot availability and bookings
//! - [`auth`]: registration, login and token sessions
//! - [`db`]: PostgreSQL pool, configuration and query timeouts
//!
//! ## Example
//!
//! ```
//! use courtside::Sport;
//! use courtside::tournament::{Match, MatchResult, MatchStatus, Team, compute_standings};
//!
//! let teams = vec![Team::new("Milan"), Team::new("Inter")];
//! let played = Match {
//!     id: 1,
//!     tournament_id: 1,
//!     team1: "Milan".to_string(),
//!     team2: "Inter".to_string(),
//!     date: None,
//!     field_id: None,
//!     status: MatchStatus::Played,
//!     result: Some(MatchResult::new(2, 1)),
//! };
//!
//! let table = compute_standings(Sport::Football, &teams, &[played]);
//! assert_eq!(table[0].team, "Milan");
//! assert_eq!(table[0].points, 3);
//! ```

/// User registration, login and sessions.
pub mod auth;

/// Database connection pool and configuration.
pub mod db;

/// Fields and bookings.
pub mod facility;

/// Case-insensitive search helpers.
pub mod search;

pub mod sport;
pub use sport::Sport;

/// Tournaments, match generation and standings.
pub mod tournament;
