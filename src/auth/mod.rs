//! Session authentication for staff terminals.
//!
//! Logins are exchanged for an HS256-signed token carried in an http-only
//! cookie. Handlers receive the validated identity through the
//! [`SessionUser`] extractor; admin and ownership rules are enforced in the
//! service layer.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::entities::user_login;
use crate::errors::ServiceError;

/// Name of the session cookie set by login and read by the extractor.
pub const SESSION_COOKIE: &str = "pos_session";

/// Claim structure for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Admin flag; admins bypass ownership checks and may close orders
    pub is_admin: bool,
    /// Unique identifier for this token
    pub jti: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Authenticated identity extracted from the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub is_admin: bool,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// True when this user may mutate the given order owner's record.
    pub fn owns_or_admin(&self, owner_id: Option<i64>) -> bool {
        self.is_admin || owner_id == Some(self.id)
    }
}

impl From<&user_login::Model> for SessionUser {
    fn from(model: &user_login::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            is_admin: model.is_admin,
        }
    }
}

/// Signs and validates session tokens and password hashes.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(jwt_secret: &str, session_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            session_ttl,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Issue a signed session token for a verified login.
    pub fn issue_session(&self, user: &user_login::Model) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let jti: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            is_admin: user.is_admin,
            jti,
            iat: now,
            exp: now + self.session_ttl.as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InternalError(format!("Failed to sign session token: {e}")))
    }

    /// Validate a session token and return the identity it carries.
    pub fn validate_token(&self, token: &str) -> Result<SessionUser, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| {
                debug!(error = %e, "session token rejected");
                ServiceError::AuthError("Invalid or expired session".to_string())
            })?;

        let id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| ServiceError::AuthError("Malformed session subject".to_string()))?;

        Ok(SessionUser {
            id,
            name: data.claims.name,
            is_admin: data.claims.is_admin,
        })
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        use argon2::password_hash::rand_core::OsRng;
        use argon2::password_hash::SaltString;
        use argon2::{Argon2, PasswordHasher};

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ServiceError::InternalError(format!("Failed to hash password: {e}")))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        use argon2::{Argon2, PasswordHash, PasswordVerifier};

        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Build the Set-Cookie value for a fresh session.
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    )
}

/// Build the Set-Cookie value that clears the session.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// Pull the session token out of a Cookie header value.
fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|token| !token.is_empty())
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // AuthService is injected into request extensions by a middleware
        // layer in main.rs, so the extractor works from any router.
        let auth = parts
            .extensions
            .get::<Arc<AuthService>>()
            .cloned()
            .ok_or_else(|| {
                ServiceError::InternalError("AuthService missing from request extensions".into())
            })?;

        let token = parts
            .headers
            .get(http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(token_from_cookie_header)
            .ok_or_else(|| ServiceError::AuthError("Not authenticated".to_string()))?;

        auth.validate_token(token)
    }
}
