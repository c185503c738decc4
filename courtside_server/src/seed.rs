//! Demo data for local development (`courtside_server --seed`).
//!
//! Wipes every table, then creates one user, three fields and a football
//! tournament with two teams.

use anyhow::{Context, Result};
use chrono::Utc;
use courtside::{
    Sport,
    auth::{AuthManager, RegisterRequest},
    facility::{FacilityManager, NewField},
    tournament::{NewTournament, Player, Team, TournamentManager, TournamentUpdate},
};
use log::info;
use sqlx::PgPool;
use std::sync::Arc;

pub const DEMO_USERNAME: &str = "mario.rossi";
pub const DEMO_PASSWORD: &str = "password123";

fn demo_fields() -> Vec<NewField> {
    [
        ("San Siro", Sport::Football, "Via Piccolomini 5"),
        ("PalaLido", Sport::Basketball, "Piazza Stuparich 1"),
        ("Beach Arena", Sport::Volleyball, "Idroscalo Milano"),
    ]
    .into_iter()
    .map(|(name, sport, address)| NewField {
        name: name.to_string(),
        sport,
        address: address.to_string(),
        bookable_slots: Vec::new(),
    })
    .collect()
}

fn demo_teams() -> Vec<Team> {
    vec![
        Team::new("Real Madrid").with_player(Player {
            name: "Vinicius".to_string(),
            surname: "Jr".to_string(),
            number: Some(7),
        }),
        Team::new("Milan").with_player(Player {
            name: "Rafael".to_string(),
            surname: "Leao".to_string(),
            number: Some(10),
        }),
    ]
}

/// Replace all data with the demo data set
pub async fn run(pool: Arc<PgPool>, auth_manager: &AuthManager) -> Result<()> {
    sqlx::query(
        "TRUNCATE matches, tournaments, bookings, fields, sessions, users RESTART IDENTITY CASCADE",
    )
    .execute(pool.as_ref())
    .await
    .context("Failed to clear tables")?;

    let user = auth_manager
        .register(RegisterRequest {
            username: DEMO_USERNAME.to_string(),
            password: DEMO_PASSWORD.to_string(),
            name: "Mario".to_string(),
            surname: "Rossi".to_string(),
        })
        .await
        .context("Failed to create demo user")?;

    let facility_manager = FacilityManager::new(pool.clone());
    for field in demo_fields() {
        facility_manager
            .create_field(field)
            .await
            .context("Failed to create demo field")?;
    }

    let tournament_manager = TournamentManager::new(pool);
    let tournament = tournament_manager
        .create_tournament(
            user.id,
            NewTournament {
                name: "Champions League 2026".to_string(),
                sport: Sport::Football,
                max_teams: 4,
                start_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            },
        )
        .await
        .context("Failed to create demo tournament")?;

    tournament_manager
        .update_tournament(
            tournament.id,
            user.id,
            TournamentUpdate {
                teams: Some(demo_teams()),
                ..TournamentUpdate::default()
            },
        )
        .await
        .context("Failed to add demo teams")?;

    info!("Database seeded (login as {DEMO_USERNAME} / {DEMO_PASSWORD})");
    Ok(())
}
