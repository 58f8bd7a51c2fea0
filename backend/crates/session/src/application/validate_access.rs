//! Validate Access Token
//!
//! Stateless check used on every authenticated request. No store is
//! consulted, so a revoked session's access token stays usable until `exp`.

use crate::application::service::SessionService;
use crate::application::token_codec::TokenCodec;
use crate::domain::repository::{AuditSink, SessionStore, TokenIndex, UserDirectory};
use crate::domain::value_object::token_claims::{TokenClaims, TokenKind};
use crate::error::{SessionError, SessionResult};

impl<I, S, U, A> SessionService<I, S, U, A>
where
    I: TokenIndex + Sync + 'static,
    S: SessionStore + Sync + 'static,
    U: UserDirectory + Sync + 'static,
    A: AuditSink + Sync + Send + 'static,
{
    pub fn validate_access_token(&self, token: &str) -> SessionResult<TokenClaims> {
        let claims = self.codec.validate(token)?;
        if !claims.is_kind(TokenKind::Access) {
            return Err(SessionError::WrongTokenKind);
        }
        Ok(claims)
    }

    /// Validate the bearer token of an `Authorization` header value
    pub fn authenticate_header(&self, header: Option<&str>) -> SessionResult<TokenClaims> {
        let token = header
            .and_then(TokenCodec::extract_from_auth_header)
            .ok_or(SessionError::Unauthenticated("missing bearer token"))?;
        self.validate_access_token(token)
    }
}
