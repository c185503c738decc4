//! HTTP server for the `courtside` booking and tournament library.
//!
//! The binary wires [`config::ServerConfig`], the database pool and the
//! managers into [`api::create_router`]. The modules are public so the
//! integration tests can drive the router directly.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod seed;
