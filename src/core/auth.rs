//! Credential primitives: Argon2id password hashing and HS256 bearer tokens.
//!
//! Tokens carry the user id, email and role, but the API never trusts the role
//! claim on its own; the user row is reloaded on every request.

use crate::{
    entities::user,
    errors::{Error, Result},
};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};

/// Hashes a plaintext password into a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored PHC string.
///
/// A malformed stored hash counts as a mismatch rather than an error.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// [`hash_password`] on the blocking pool, keeping Argon2 off the async workers.
pub async fn hash_password_async(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_async(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

/// Claims embedded in every bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    /// Email at issue time
    pub email: String,
    /// Role at issue time
    pub role: String,
    /// Expiry as a unix timestamp
    pub exp: usize,
}

/// Signing and verification keys plus token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenKeys {
    /// Builds keys from a shared secret and a lifetime in hours.
    #[must_use]
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: chrono::Duration::hours(ttl_hours),
        }
    }

    /// Issues a token for `user`.
    pub fn issue(&self, user: &user::Model) -> Result<String> {
        let expires_at = chrono::Utc::now() + self.ttl;
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            exp: usize::try_from(expires_at.timestamp()).map_err(|_| Error::Config {
                message: "token expiry is before the unix epoch".to_string(),
            })?,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(Into::into)
    }

    /// Verifies signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}
