//! Server configuration.
//!
//! Everything is an explicit struct with documented defaults; the CLI fills
//! it from flags or environment variables, nothing reads the environment
//! implicitly.

use chrono::Duration;

use lifeline_core::{
    Error, JwtConfig,
    error::ValidationError,
    services::LockoutConfig,
};

/// Placeholder secret that must be replaced outside development.
pub const DEV_JWT_SECRET: &str = "change-me";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind. Default `0.0.0.0:5000`.
    pub addr: String,
    /// SQLite connection string. Default `sqlite::memory:`.
    pub database_url: String,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// Issuer claim on session tokens. Default `lifeline`.
    pub jwt_issuer: String,
    /// Session token lifetime in hours. Default 24.
    pub token_lifetime_hours: i64,
    /// Account lockout settings.
    pub lockout: LockoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:5000".to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_issuer: "lifeline".to_string(),
            token_lifetime_hours: 24,
            lockout: LockoutConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Check configuration invariants beyond what the lockout guard already
    /// validates itself.
    pub fn validate(&self) -> Result<(), Error> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingField(
                "jwt_secret is required".to_string(),
            )
            .into());
        }
        if self.token_lifetime_hours <= 0 {
            return Err(ValidationError::InvalidField(
                "token_lifetime_hours must be positive".to_string(),
            )
            .into());
        }
        self.lockout.validate()?;
        Ok(())
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.as_bytes().to_vec())
            .with_issuer(self.jwt_issuer.clone())
            .with_expires_in(Duration::hours(self.token_lifetime_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let config = ServerConfig {
            jwt_secret: String::new(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_retention_is_rejected() {
        let config = ServerConfig {
            lockout: LockoutConfig {
                failure_retention: Duration::minutes(1),
                ..LockoutConfig::default()
            },
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
