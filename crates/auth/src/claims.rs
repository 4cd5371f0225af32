use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// OIDC token claims (transport-agnostic).
///
/// This is the subset the service reads from ID/access tokens issued by the
/// identity provider once the signature has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcClaims {
    /// Subject / user identifier at the identity provider.
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name ("Ada Lovelace").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application roles granted by the identity provider.
    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Issued-at (seconds since the Unix epoch).
    pub iat: i64,

    /// Expiration (seconds since the Unix epoch).
    pub exp: i64,
}

impl OidcClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token issuer is not accepted")]
    InvalidIssuer,

    #[error("token audience is not accepted")]
    InvalidAudience,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate the token time window.
///
/// `leeway_secs` tolerates clock skew between this service and the identity
/// provider on the issued-at side. Signature checks happen in
/// [`crate::JwtValidator`] implementations.
pub fn validate_claims(
    claims: &OidcClaims,
    now: DateTime<Utc>,
    leeway_secs: i64,
) -> Result<(), TokenValidationError> {
    let (Some(issued_at), Some(expires_at)) = (claims.issued_at(), claims.expires_at()) else {
        return Err(TokenValidationError::Malformed("timestamp out of range".to_string()));
    };

    if expires_at <= issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + chrono::Duration::seconds(leeway_secs) < issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(now: DateTime<Utc>, iat_offset: i64, exp_offset: i64) -> OidcClaims {
        OidcClaims {
            sub: "user-1".to_string(),
            email: Some("ada@example.com".to_string()),
            name: Some("Ada Lovelace".to_string()),
            roles: vec![],
            iss: None,
            iat: (now + Duration::seconds(iat_offset)).timestamp(),
            exp: (now + Duration::seconds(exp_offset)).timestamp(),
        }
    }

    #[test]
    fn accepts_current_token() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims(now, -10, 600), now, 0), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let now = Utc::now();
        assert_eq!(
            validate_claims(&claims(now, -600, -1), now, 0),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims(now, 120, 600), now, 30),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims(now, 10, 600), now, 30),
            Ok(())
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        assert_eq!(
            validate_claims(&claims(now, 10, 5), now, 0),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn roles_default_to_empty() {
        let parsed: OidcClaims =
            serde_json::from_str(r#"{"sub":"abc","iat":1,"exp":2}"#).unwrap();
        assert!(parsed.roles.is_empty());
        assert!(parsed.email.is_none());
    }
}
