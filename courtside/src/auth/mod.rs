//! Authentication: user registration, login and session management.
//!
//! - Argon2id password hashing with a server-side pepper
//! - JWT access tokens
//! - Rotating refresh tokens bound to a device fingerprint
//!
//! ## Example
//!
//! ```no_run
//! use courtside::auth::{AuthManager, RegisterRequest};
//! use courtside::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let auth = AuthManager::new(
//!         Arc::new(db.pool().clone()),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string(),
//!     );
//!
//!     let request = RegisterRequest {
//!         username: "mario.rossi".to_string(),
//!         password: "password123".to_string(),
//!         name: "Mario".to_string(),
//!         surname: "Rossi".to_string(),
//!     };
//!
//!     let user = auth.register(request).await?;
//!     println!("Registered user: {}", user.username);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::{AuthManager, validate_password, validate_username};
pub use models::{AccessTokenClaims, LoginRequest, RegisterRequest, Session, SessionTokens, User, UserId};
