//! Tournaments: rosters, round-robin match generation and league standings.
//!
//! [`schedule`] and [`standings`] are pure functions over in-memory data.
//! [`TournamentManager`] wraps them with PostgreSQL persistence, ownership
//! checks and the `open -> active -> completed` lifecycle.
//!
//! ## Example
//!
//! ```
//! use courtside::Sport;
//! use courtside::tournament::{Team, compute_standings, schedule};
//!
//! let teams = vec![Team::new("Milan"), Team::new("Inter"), Team::new("Juventus")];
//! let matches = schedule::generate(&teams);
//! assert_eq!(matches.len(), 3);
//!
//! let table = compute_standings(Sport::Football, &teams, &[]);
//! assert!(table.iter().all(|row| row.points == 0));
//! ```

pub mod manager;
pub mod models;
pub mod schedule;
pub mod standings;
pub mod validation;

pub use manager::{TournamentError, TournamentManager, TournamentResult};
pub use models::{
    Creator, Match, MatchId, MatchResult, MatchStatus, NewTournament, Player, Team, Tournament,
    TournamentDetails, TournamentId, TournamentStatus, TournamentUpdate,
};
pub use schedule::MatchSpec;
pub use standings::{StandingsRow, compute_standings, match_points};
