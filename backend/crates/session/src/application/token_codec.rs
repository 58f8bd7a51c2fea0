//! Token Codec
//!
//! Mints and verifies the HS256-signed access and refresh tokens.
//! Verification here is purely cryptographic and temporal; whether a
//! refresh token is still backed by a session is the service's concern.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::{TokenId, UserId};

use crate::application::config::{SessionConfig, whole_secs};
use crate::domain::value_object::token_claims::{TokenClaims, TokenKind};
use crate::error::{SessionError, SessionResult};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signed token together with the claims it carries
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    validation: Validation,
    signature_only: Validation,
}

impl TokenCodec {
    /// Build signing and verification keys from the configured secret
    pub fn new(config: &SessionConfig) -> SessionResult<Self> {
        config.validate()?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);

        // Signature, algorithm and issuer only; used to recover the token id
        // of stored refresh tokens that may already be past `exp`.
        let mut signature_only = Validation::new(ALGORITHM);
        signature_only.validate_exp = false;
        signature_only.validate_nbf = false;
        signature_only.set_issuer(&[config.issuer.as_str()]);
        signature_only.set_required_spec_claims(&["sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_secret),
            decoding_key: DecodingKey::from_secret(&config.jwt_secret),
            issuer: config.issuer.clone(),
            access_ttl_secs: whole_secs(config.access_token_ttl),
            refresh_ttl_secs: whole_secs(config.refresh_token_ttl),
            validation,
            signature_only,
        })
    }

    pub fn issue_access_token(
        &self,
        user_id: UserId,
        email: &str,
        full_name: &str,
    ) -> SessionResult<IssuedToken> {
        let claims = self.claims(
            user_id,
            email,
            Some(full_name.to_string()),
            TokenKind::Access,
            self.access_ttl_secs,
        );
        self.sign(claims)
    }

    pub fn issue_refresh_token(&self, user_id: UserId, email: &str) -> SessionResult<IssuedToken> {
        let claims = self.claims(user_id, email, None, TokenKind::Refresh, self.refresh_ttl_secs);
        self.sign(claims)
    }

    /// Verify signature, algorithm, issuer and time bounds
    pub fn validate(&self, token: &str) -> SessionResult<TokenClaims> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Verify signature, algorithm and issuer, ignoring `exp` and `nbf`
    pub fn decode_ignoring_time(&self, token: &str) -> SessionResult<TokenClaims> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.signature_only)?;
        Ok(data.claims)
    }

    /// Token part of an `Authorization: Bearer <token>` header value
    pub fn extract_from_auth_header(header: &str) -> Option<&str> {
        let (scheme, rest) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = rest.trim();
        (!token.is_empty()).then_some(token)
    }

    fn claims(
        &self,
        user_id: UserId,
        email: &str,
        full_name: Option<String>,
        kind: TokenKind,
        ttl_secs: i64,
    ) -> TokenClaims {
        let now = Utc::now().timestamp();
        TokenClaims {
            user_id,
            email: email.to_string(),
            full_name,
            kind,
            token_id: TokenId::new(),
            issued_at: now,
            not_before: now,
            expires_at: now + ttl_secs,
            issuer: self.issuer.clone(),
        }
    }

    fn sign(&self, claims: TokenClaims) -> SessionResult<IssuedToken> {
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Internal(format!("Failed to sign token: {e}")))?;
        Ok(IssuedToken { token, claims })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(secret: &[u8]) -> SessionConfig {
        SessionConfig {
            jwt_secret: secret.to_vec(),
            issuer: "codec-tests".to_string(),
            ..Default::default()
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(&config(&[7u8; 32])).unwrap()
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = TokenCodec::new(&config(b"too-short"));
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn test_rejects_oversized_ttl() {
        let mut oversized = config(&[7u8; 32]);
        oversized.refresh_token_ttl = Duration::from_secs(u64::MAX);
        assert!(matches!(TokenCodec::new(&oversized), Err(SessionError::Config(_))));
    }

    #[test]
    fn test_issue_and_validate_access() {
        let codec = codec();
        let user_id = UserId::new();
        let issued = codec
            .issue_access_token(user_id, "ada@example.com", "Ada Lovelace")
            .unwrap();

        // header.payload.signature
        assert_eq!(issued.token.split('.').count(), 3);

        let claims = codec.validate(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(claims.expires_at - claims.issued_at, 900);
        assert_eq!(claims.not_before, claims.issued_at);
    }

    #[test]
    fn test_refresh_claims() {
        let codec = codec();
        let issued = codec.issue_refresh_token(UserId::new(), "").unwrap();
        let claims = codec.validate(&issued.token).unwrap();

        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.email, "");
        assert!(claims.full_name.is_none());
        assert_eq!(claims.expires_at - claims.issued_at, 7 * 24 * 3600);
    }

    #[test]
    fn test_token_ids_are_unique() {
        let codec = codec();
        let user_id = UserId::new();
        let a = codec.issue_refresh_token(user_id, "a@example.com").unwrap();
        let b = codec.issue_refresh_token(user_id, "a@example.com").unwrap();
        assert_ne!(a.claims.token_id, b.claims.token_id);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let mut claims = codec.claims(UserId::new(), "", None, TokenKind::Refresh, 60);
        claims.issued_at -= 3600;
        claims.not_before -= 3600;
        claims.expires_at = Utc::now().timestamp() - 1;
        let expired = codec.sign(claims.clone()).unwrap();

        assert!(matches!(codec.validate(&expired.token), Err(SessionError::TokenExpired)));
        // Time-blind decode still recovers the token id
        let decoded = codec.decode_ignoring_time(&expired.token).unwrap();
        assert_eq!(decoded.token_id, claims.token_id);
    }

    #[test]
    fn test_not_yet_valid_token() {
        let codec = codec();
        let mut claims = codec.claims(UserId::new(), "", None, TokenKind::Access, 60);
        claims.not_before += 600;
        let future = codec.sign(claims).unwrap();
        assert!(matches!(codec.validate(&future.token), Err(SessionError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret() {
        let issued = codec().issue_access_token(UserId::new(), "", "").unwrap();
        let other = TokenCodec::new(&config(&[9u8; 32])).unwrap();
        assert!(matches!(other.validate(&issued.token), Err(SessionError::MalformedToken)));
        assert!(matches!(
            other.decode_ignoring_time(&issued.token),
            Err(SessionError::MalformedToken)
        ));
    }

    #[test]
    fn test_wrong_algorithm() {
        let codec = codec();
        let claims = codec.claims(UserId::new(), "", None, TokenKind::Access, 60);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(&[7u8; 32]),
        )
        .unwrap();
        assert!(matches!(codec.validate(&token), Err(SessionError::MalformedToken)));
    }

    #[test]
    fn test_wrong_issuer() {
        let issued = codec().issue_access_token(UserId::new(), "", "").unwrap();
        let mut other_config = config(&[7u8; 32]);
        other_config.issuer = "someone-else".to_string();
        let other = TokenCodec::new(&other_config).unwrap();
        assert!(matches!(other.validate(&issued.token), Err(SessionError::MalformedToken)));
    }

    #[test]
    fn test_garbage() {
        let codec = codec();
        for input in ["", "not-a-token", "a.b.c", "a.b"] {
            assert!(
                matches!(codec.validate(input), Err(SessionError::MalformedToken)),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_extract_from_auth_header() {
        assert_eq!(TokenCodec::extract_from_auth_header("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(TokenCodec::extract_from_auth_header("bearer  abc "), Some("abc"));
        assert_eq!(TokenCodec::extract_from_auth_header("BEARER abc"), Some("abc"));
        assert_eq!(TokenCodec::extract_from_auth_header("Bearer "), None);
        assert_eq!(TokenCodec::extract_from_auth_header("Bearer"), None);
        assert_eq!(TokenCodec::extract_from_auth_header("Basic dXNlcjpwYXNz"), None);
        assert_eq!(TokenCodec::extract_from_auth_header(""), None);
    }
}
