//! Stateless JWT sessions.
//!
//! Login issues a self-contained HS256 token carrying the user id and role;
//! the HTTP layer verifies it on every request without a storage lookup.
//! Tokens expire after a day by default and cannot be revoked early — an
//! accepted trade-off for a system this size.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::SessionError,
    user::{User, UserRole},
};

/// Configuration for JWT issuance and verification.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing secret.
    pub secret: Vec<u8>,
    /// Issuer claim, checked on verification.
    pub issuer: String,
    /// Token lifetime. Defaults to 1 day.
    pub expires_in: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "lifeline".to_string(),
            expires_in: Duration::days(1),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Role at issuance time.
    pub role: UserRole,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies session tokens.
pub struct SessionService {
    config: JwtConfig,
}

impl SessionService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user: &User) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.expires_in).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.config.secret),
        )
        .map_err(|e| Error::Session(SessionError::InvalidToken(e.to_string())))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.config.secret),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => Error::Session(SessionError::Expired),
            _ => Error::Session(SessionError::InvalidToken(e.to_string())),
        })
    }
}
