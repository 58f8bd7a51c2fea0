//! Application Configuration
//!
//! Configuration for the session service and token codec.

use std::fmt;
use std::time::Duration;

use crate::error::{SessionError, SessionResult};

/// Minimum HS256 secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted TTL or timeout (10 years)
pub const MAX_DURATION: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// Session service configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Shared HMAC secret for signing both token kinds
    pub jwt_secret: Vec<u8>,
    /// Expected `iss` claim
    pub issuer: String,
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (1 week)
    pub refresh_token_ttl: Duration,
    /// Upper bound on any single store call
    pub store_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            issuer: "notes-api".to_string(),
            access_token_ttl: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            store_timeout: Duration::from_secs(5),
        }
    }
}

impl SessionConfig {
    /// Create config with a random signing secret (for development)
    pub fn development() -> Self {
        Self {
            jwt_secret: platform::crypto::random_bytes(MIN_SECRET_LEN),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// | Env Var                      | Required | Default     |
    /// |------------------------------|----------|-------------|
    /// | `JWT_SECRET`                 | yes      | --          |
    /// | `JWT_ISSUER`                 | no       | `notes-api` |
    /// | `JWT_ACCESS_TTL_SECS`        | no       | `900`       |
    /// | `JWT_REFRESH_TTL_SECS`       | no       | `604800`    |
    /// | `SESSION_STORE_TIMEOUT_SECS` | no       | `5`         |
    pub fn from_env() -> SessionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SessionResult<Self> {
        let defaults = Self::default();

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| SessionError::Config("JWT_SECRET must be set".to_string()))?
            .into_bytes();

        let config = Self {
            jwt_secret,
            issuer: lookup("JWT_ISSUER").unwrap_or(defaults.issuer),
            access_token_ttl: secs(&lookup, "JWT_ACCESS_TTL_SECS", defaults.access_token_ttl)?,
            refresh_token_ttl: secs(&lookup, "JWT_REFRESH_TTL_SECS", defaults.refresh_token_ttl)?,
            store_timeout: secs(&lookup, "SESSION_STORE_TIMEOUT_SECS", defaults.store_timeout)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the codec cannot run with
    pub fn validate(&self) -> SessionResult<()> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(SessionError::Config(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.issuer.trim().is_empty() {
            return Err(SessionError::Config("JWT issuer must not be empty".to_string()));
        }
        for (name, value) in [
            ("access token TTL", self.access_token_ttl),
            ("refresh token TTL", self.refresh_token_ttl),
            ("store timeout", self.store_timeout),
        ] {
            if value.is_zero() || value > MAX_DURATION {
                return Err(SessionError::Config(format!(
                    "{name} must be between 1 second and {} seconds",
                    MAX_DURATION.as_secs()
                )));
            }
        }
        Ok(())
    }

    /// Access token lifetime in seconds (the `expiresIn` of a token pair)
    pub fn access_token_ttl_secs(&self) -> i64 {
        whole_secs(self.access_token_ttl)
    }
}

/// Seconds as `i64`, saturating; validated configs stay far below the limit
pub(crate) fn whole_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

fn secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> SessionResult<Duration> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| SessionError::Config(format!("{key} must be a whole number of seconds"))),
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}
