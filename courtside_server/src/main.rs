//! Sports-facility booking and tournament server.
//!
//! Loads configuration, applies migrations and serves the HTTP API until
//! Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use chrono::Duration;
use courtside::{auth::AuthManager, db::Database};
use courtside_server::{api, config::ServerConfig, logging, metrics, seed};
use log::{info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Run the courtside booking and tournament server

USAGE:
  courtside_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --seed                   Replace all data with the demo data set before serving
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (at least 32 characters)
  PASSWORD_PEPPER          Password hashing pepper (at least 16 characters)
  ACCESS_TOKEN_MINUTES     Access token lifetime [default: 60]
  REFRESH_TOKEN_DAYS       Refresh token lifetime [default: 7]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
  (See .env.example for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        seed: pargs.contains("--seed"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}");
    }

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    config.validate()?;

    info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to apply migrations")?;
    info!("Database connected successfully");

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr)?;
        info!("Prometheus metrics exported on http://{addr}/metrics");
    }

    let pool = Arc::new(db.pool().clone());
    let auth_manager = AuthManager::new(
        pool.clone(),
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    )
    .with_token_durations(
        Duration::minutes(config.security.access_token_minutes),
        Duration::days(config.security.refresh_token_days),
    );

    if args.seed {
        warn!("--seed given: replacing all data with the demo data set");
        seed::run(pool.clone(), &auth_manager).await?;
    }

    let app = api::create_router(api::AppState::new(pool, auth_manager));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
