//! Session Error Types
//!
//! Session-specific error variants. Each variant reduces to a stable
//! [`ErrorKind`]; conversion into `kernel::error::app_error::AppError`
//! replaces infrastructure detail with a generic message.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Session-specific result type alias
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Input has the wrong shape (normally rejected upstream)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Token cannot be parsed, has a bad signature, algorithm or issuer
    #[error("Malformed token")]
    MalformedToken,

    /// Token is outside its `nbf`..`exp` window
    #[error("Token expired or not yet valid")]
    TokenExpired,

    /// Access token presented where a refresh token is required, or vice versa
    #[error("Wrong token type")]
    WrongTokenKind,

    /// Token is well-formed but not (or no longer) backed by a usable session
    #[error("Authentication failed: {0}")]
    Unauthenticated(&'static str),

    /// Session or user absent, including sessions owned by someone else
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Refresh token collision on insert
    #[error("Session already exists for this refresh token")]
    Conflict,

    /// Store call exceeded the configured bound; never read as "absent"
    #[error("Store operation timed out: {0}")]
    Timeout(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Startup misconfiguration (e.g. unusable signing secret)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Validation(_) => ErrorKind::BadRequest,
            SessionError::MalformedToken
            | SessionError::TokenExpired
            | SessionError::WrongTokenKind
            | SessionError::Unauthenticated(_) => ErrorKind::Unauthorized,
            SessionError::NotFound(_) => ErrorKind::NotFound,
            SessionError::Conflict => ErrorKind::Conflict,
            SessionError::Timeout(_)
            | SessionError::Database(_)
            | SessionError::Internal(_)
            | SessionError::Config(_) => ErrorKind::InternalServerError,
        }
    }

    /// True for every variant that means "credential rejected"
    pub fn is_authentication(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// Convert to AppError
    ///
    /// Server-side failures collapse to one generic message; the
    /// original text stays in the logs only.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            AppError::new(kind, "Session service unavailable")
        } else {
            AppError::new(kind, self.to_string())
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            SessionError::Database(e) => {
                tracing::error!(error = %e, "Session database error");
            }
            SessionError::Internal(msg) | SessionError::Config(msg) => {
                tracing::error!(message = %msg, "Session internal error");
            }
            SessionError::Timeout(op) => {
                tracing::error!(operation = op, "Session store timed out");
            }
            SessionError::MalformedToken => {
                tracing::warn!("Rejected malformed token");
            }
            _ => {
                tracing::debug!(error = %self, "Session error");
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        err.log();
        err.to_app_error()
    }
}

impl From<jsonwebtoken::errors::Error> for SessionError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

        match err.kind() {
            JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                SessionError::TokenExpired
            }
            _ => SessionError::MalformedToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let cases: Vec<(SessionError, ErrorKind)> = vec![
            (SessionError::Validation("x".into()), ErrorKind::BadRequest),
            (SessionError::MalformedToken, ErrorKind::Unauthorized),
            (SessionError::TokenExpired, ErrorKind::Unauthorized),
            (SessionError::WrongTokenKind, ErrorKind::Unauthorized),
            (SessionError::Unauthenticated("x"), ErrorKind::Unauthorized),
            (SessionError::NotFound("Session"), ErrorKind::NotFound),
            (SessionError::Conflict, ErrorKind::Conflict),
            (SessionError::Timeout("x"), ErrorKind::InternalServerError),
            (SessionError::Internal("x".into()), ErrorKind::InternalServerError),
        ];

        for (error, expected) in cases {
            assert_eq!(error.kind(), expected, "wrong kind for {error}");
        }
    }

    #[test]
    fn test_internal_detail_not_echoed() {
        let err = SessionError::Internal("relation \"sessions\" does not exist".into());
        let app = err.to_app_error();
        assert_eq!(app.status_code(), 500);
        assert!(!app.message().contains("sessions"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let app: AppError = SessionError::NotFound("Session").into();
        assert_eq!(app.status_code(), 404);
        assert_eq!(app.message(), "Session not found");
    }

    #[test]
    fn test_is_authentication() {
        assert!(SessionError::TokenExpired.is_authentication());
        assert!(SessionError::Unauthenticated("revoked").is_authentication());
        assert!(!SessionError::NotFound("Session").is_authentication());
        assert!(!SessionError::Timeout("x").is_authentication());
    }
}
