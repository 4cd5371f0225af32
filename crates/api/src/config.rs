//! Environment-based configuration.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use makechange_auth::DEFAULT_TENANT;
use makechange_infra::{PermitConfig, DEFAULT_API_URL, DEFAULT_PDP_URL, DEFAULT_TIMEOUT};

/// Secret used when `FUSIONAUTH_CLIENT_SECRET` is unset. Development only.
pub const DEV_CLIENT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    /// `None` when no Permit API key is configured.
    pub permit: Option<PermitConfig>,
    pub tenant: String,
}

/// Identity provider (OIDC) settings for bearer token validation.
#[derive(Clone)]
pub struct AuthConfig {
    pub client_secret: String,
    /// True when `client_secret` is the built-in development value.
    pub insecure_default: bool,
    pub issuer: Option<String>,
    pub client_id: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_secret", &"<redacted>")
            .field("insecure_default", &self.insecure_default)
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl ApiConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_or(&var, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        let (client_secret, insecure_default) = match var("FUSIONAUTH_CLIENT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_CLIENT_SECRET.to_string(), true),
        };
        let auth = AuthConfig {
            client_secret,
            insecure_default,
            issuer: var("FUSIONAUTH_ISSUER"),
            client_id: var("FUSIONAUTH_CLIENT_ID"),
        };

        let tenant = var("PERMIT_TENANT").unwrap_or_else(|| DEFAULT_TENANT.to_string());

        let permit = match var("PERMIT_API_KEY") {
            Some(api_key) => {
                let timeout_ms = parse_or(&var, "PERMIT_TIMEOUT_MS", DEFAULT_TIMEOUT.as_millis() as u64)?;
                let mut permit = PermitConfig::new(api_key)
                    .with_pdp_url(var("PERMIT_PDP_URL").unwrap_or_else(|| DEFAULT_PDP_URL.to_string()))
                    .with_api_url(var("PERMIT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()))
                    .with_tenant(tenant.clone())
                    .with_timeout(Duration::from_millis(timeout_ms));
                if let (Some(project), Some(environment)) = (var("PERMIT_PROJECT"), var("PERMIT_ENVIRONMENT")) {
                    permit = permit.with_scope(project, environment);
                }
                Some(permit)
            }
            None => None,
        };

        Ok(Self {
            bind_addr,
            auth,
            permit,
            tenant,
        })
    }
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { var: name, value }),
        None => Ok(default),
    }
}
