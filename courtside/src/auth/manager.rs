//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        AccessTokenClaims, LoginRequest, RegisterRequest, Session, SessionTokens, User, UserId,
    },
};
use crate::search::contains_pattern;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Default lifetime of an access token
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 60;

/// Default lifetime of a refresh token
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;

const USER_COLUMNS: &str = "id, username, name, surname, created_at, last_login";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        name: row.get("name"),
        surname: row.get("surname"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        last_login: row
            .get::<Option<chrono::NaiveDateTime>, _>("last_login")
            .map(|dt| dt.and_utc()),
    }
}

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    pool: Arc<PgPool>,
    pepper: String,
    jwt_secret: String,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(pool: Arc<PgPool>, pepper: String, jwt_secret: String) -> Self {
        Self {
            pool,
            pepper,
            jwt_secret,
            access_token_duration: Duration::minutes(DEFAULT_ACCESS_TOKEN_MINUTES),
            refresh_token_duration: Duration::days(DEFAULT_REFRESH_TOKEN_DAYS),
        }
    }

    /// Override the access and refresh token lifetimes
    pub fn with_token_durations(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_token_duration = access;
        self.refresh_token_duration = refresh;
        self
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::UsernameTaken` - Username already exists
    /// * `AuthError::InvalidUsername` - Username format invalid
    /// * `AuthError::WeakPassword` - Password too weak
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let username = request.username.trim();
        validate_username(username)?;
        validate_password(&request.password)?;

        let existing = sqlx::query("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_password(&request.password, &self.pepper)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, password_hash, name, surname)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(&password_hash)
        .bind(request.name.trim())
        .bind(request.surname.trim())
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match e {
            // lost the race against a concurrent signup
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::UsernameTaken,
            other => AuthError::Database(other),
        })?;

        let user = user_from_row(&row);
        log::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Login a user
    ///
    /// # Arguments
    ///
    /// * `request` - Login request with username and password
    /// * `device_fingerprint` - Hash identifying the client device
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - User doesn't exist
    /// * `AuthError::InvalidPassword` - Incorrect password
    pub async fn login(
        &self,
        request: LoginRequest,
        device_fingerprint: String,
    ) -> AuthResult<(User, SessionTokens)> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1"
        ))
        .bind(request.username.trim())
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::UserNotFound)?;

        let password_hash: String = row.get("password_hash");
        verify_password(&request.password, &self.pepper, &password_hash)?;

        let user = user_from_row(&row);

        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(self.pool.as_ref())
            .await?;

        let tokens = self
            .create_session(user.id, &user.username, device_fingerprint)
            .await?;

        Ok((user, tokens))
    }

    async fn create_session(
        &self,
        user_id: UserId,
        username: &str,
        device_fingerprint: String,
    ) -> AuthResult<SessionTokens> {
        let access_token = self.generate_access_token(user_id, username)?;
        let refresh_token = Uuid::new_v4().to_string();

        let expires_at = Utc::now() + self.refresh_token_duration;
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, device_fingerprint, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&refresh_token)
        .bind(user_id)
        .bind(&device_fingerprint)
        .bind(expires_at.naive_utc())
        .execute(self.pool.as_ref())
        .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// The old refresh token is consumed whether or not the exchange succeeds,
    /// so a token can be used at most once.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidRefreshToken` - Unknown token or different device
    /// * `AuthError::SessionExpired` - Refresh token expired
    pub async fn refresh_token(
        &self,
        refresh_token: String,
        device_fingerprint: String,
    ) -> AuthResult<SessionTokens> {
        let row = sqlx::query(
            r#"
            DELETE FROM sessions s
            USING users u
            WHERE s.token = $1 AND u.id = s.user_id
            RETURNING s.token, s.user_id, s.device_fingerprint, s.created_at, s.expires_at,
                      u.username
            "#,
        )
        .bind(&refresh_token)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::InvalidRefreshToken)?;

        let session = Session {
            token: row.get("token"),
            user_id: row.get("user_id"),
            device_fingerprint: row.get("device_fingerprint"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            expires_at: row.get::<chrono::NaiveDateTime, _>("expires_at").and_utc(),
        };

        if session.is_expired(Utc::now()) {
            return Err(AuthError::SessionExpired);
        }
        if session.device_fingerprint != device_fingerprint {
            log::warn!(
                "Refresh token for user {} presented from a different device",
                session.user_id
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        let username: String = row.get("username");
        self.create_session(session.user_id, &username, device_fingerprint)
            .await
    }

    /// Logout user by invalidating refresh token
    pub async fn logout(&self, refresh_token: String) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(&refresh_token)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Get a user by id
    pub async fn get_user(&self, user_id: UserId) -> AuthResult<User> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user_from_row(&row))
    }

    /// Users whose username, name or surname contains `query` (case-insensitive)
    pub async fn search_users(&self, query: Option<&str>) -> AuthResult<Vec<User>> {
        let pattern = contains_pattern(query.map(str::trim).unwrap_or_default());
        let rows = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE username ILIKE $1 ESCAPE '\'
               OR name ILIKE $1 ESCAPE '\'
               OR surname ILIKE $1 ESCAPE '\'
            ORDER BY username
            "#
        ))
        .bind(pattern)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    fn generate_access_token(&self, user_id: UserId, username: &str) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id,
            username: username.to_string(),
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }
}

/// Hash password with Argon2id + pepper
fn hash_password(password: &str, pepper: &str) -> AuthResult<String> {
    let peppered = format!("{password}{pepper}");
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(peppered.as_bytes(), &salt)
        .map_err(|_| AuthError::HashingFailed)?
        .to_string())
}

fn verify_password(password: &str, pepper: &str, hash: &str) -> AuthResult<()> {
    let peppered = format!("{password}{pepper}");
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidPassword)?;

    Argon2::default()
        .verify_password(peppered.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidPassword)
}

/// Username: 3-30 characters of ASCII letters, digits, `_` or `.`
pub fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if !(3..=30).contains(&len) {
        return Err(AuthError::InvalidUsername(
            "Username must be 3-30 characters".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(AuthError::InvalidUsername(
            "Username can only contain letters, numbers, underscores and dots".to_string(),
        ));
    }

    Ok(())
}

/// Password: at least 8 characters with a letter and a digit
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_letter = password.chars().any(char::is_alphabetic);
    if !has_digit || !has_letter {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one letter and one number".to_string(),
        ));
    }

    Ok(())
}
