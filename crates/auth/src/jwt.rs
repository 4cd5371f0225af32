//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::claims::{validate_claims, OidcClaims, TokenValidationError};

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<OidcClaims, TokenValidationError>;
}

/// HS256 validator keyed with the OIDC client secret.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    issuer: Option<String>,
    audience: Option<String>,
    leeway_secs: i64,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            issuer: None,
            audience: None,
            leeway_secs: 30,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window is checked against the caller's `now` in validate_claims.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = &self.issuer {
            validation.set_issuer(&[iss]);
        }
        validation
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<OidcClaims, TokenValidationError> {
        let data = decode::<OidcClaims>(token, &self.key, &self.validation()).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenValidationError::InvalidSignature,
            ErrorKind::InvalidIssuer => TokenValidationError::InvalidIssuer,
            ErrorKind::InvalidAudience => TokenValidationError::InvalidAudience,
            ErrorKind::ExpiredSignature => TokenValidationError::Expired,
            _ => TokenValidationError::Malformed(e.to_string()),
        })?;

        validate_claims(&data.claims, now, self.leeway_secs)?;
        Ok(data.claims)
    }
}
