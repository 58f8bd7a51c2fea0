//! Token Claims
//!
//! Payload of every issued token. Serialized names follow the registered
//! JWT claim names so the codec's time and issuer checks apply to them.

use chrono::{DateTime, Utc};
use kernel::id::{TokenId, UserId};
use serde::{Deserialize, Serialize};

/// Which half of the credential pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "sub")]
    pub user_id: UserId,
    #[serde(default)]
    pub email: String,
    /// Access tokens only
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub kind: TokenKind,
    #[serde(rename = "jti")]
    pub token_id: TokenId,
    /// Unix seconds
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "nbf")]
    pub not_before: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "iss")]
    pub issuer: String,
}

impl TokenClaims {
    /// `exp` as a timestamp; `None` only for values chrono cannot represent
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: TokenKind) -> TokenClaims {
        TokenClaims {
            user_id: UserId::new(),
            email: "ada@example.com".to_string(),
            full_name: None,
            kind,
            token_id: TokenId::new(),
            issued_at: 1_700_000_000,
            not_before: 1_700_000_000,
            expires_at: 1_700_000_900,
            issuer: "notes-api".to_string(),
        }
    }

    #[test]
    fn test_registered_claim_names() {
        let json = serde_json::to_value(sample(TokenKind::Refresh)).unwrap();
        for key in ["sub", "jti", "iat", "nbf", "exp", "iss", "kind"] {
            assert!(json.get(key).is_some(), "missing claim {key}");
        }
        assert_eq!(json["kind"], "refresh");
        // Refresh tokens never carry a display name
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_expiry() {
        let claims = sample(TokenKind::Access);
        assert_eq!(claims.expiry().unwrap().timestamp(), 1_700_000_900);
        assert!(claims.is_kind(TokenKind::Access));
        assert!(!claims.is_kind(TokenKind::Refresh));
    }
}
