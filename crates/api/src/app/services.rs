//! Service wiring: currency table, policy decision point, user-sync registry.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;

use makechange_auth::{
    enroll, Hs256JwtValidator, JwtValidator, PolicyDecisionPoint, SessionUser, StaticPolicy, UserSync, DEFAULT_TENANT,
};
use makechange_currency::CurrencyTable;
use makechange_infra::PermitClient;

use crate::config::{ApiConfig, AuthConfig};

/// Policy keys of users already synced into the policy service by this process.
#[derive(Debug, Default)]
pub struct SyncRegistry {
    synced: Mutex<HashSet<String>>,
}

impl SyncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_synced(&self, key: &str) -> bool {
        self.synced.lock().unwrap_or_else(PoisonError::into_inner).contains(key)
    }

    pub fn mark_synced(&self, key: &str) {
        self.synced
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
    }

    pub fn len(&self) -> usize {
        self.synced.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct AppServices {
    pub currencies: Arc<CurrencyTable>,
    pub pdp: Arc<dyn PolicyDecisionPoint>,
    pub synced: SyncRegistry,
    /// Tenant used for role assignment.
    pub tenant: String,
}

impl AppServices {
    pub fn new(currencies: CurrencyTable, pdp: Arc<dyn PolicyDecisionPoint>) -> Self {
        Self {
            currencies: Arc::new(currencies),
            pdp,
            synced: SyncRegistry::new(),
            tenant: DEFAULT_TENANT.to_string(),
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    /// Enroll `user` in the policy service unless this process already did.
    ///
    /// Failures are logged and swallowed; the following permission check
    /// fails closed if the policy service does not know the user.
    pub async fn ensure_synced(&self, user: &SessionUser, country: Option<&str>) {
        let Some(key) = user.policy_key() else {
            return;
        };
        if self.synced.is_synced(key) {
            return;
        }

        let sync = UserSync {
            country: country.map(str::to_string),
        };
        match enroll(self.pdp.as_ref(), user, &sync, &self.tenant).await {
            Ok(()) => self.synced.mark_synced(key),
            Err(e) => tracing::warn!(user = %key, "lazy user sync failed: {e}"),
        }
    }
}

/// Token validator for the configured identity provider.
pub fn build_validator(auth: &AuthConfig) -> Arc<dyn JwtValidator> {
    let mut validator = Hs256JwtValidator::new(auth.client_secret.as_bytes());
    if let Some(issuer) = &auth.issuer {
        validator = validator.with_issuer(issuer.clone());
    }
    if let Some(client_id) = &auth.client_id {
        validator = validator.with_audience(client_id.clone());
    }
    Arc::new(validator)
}

/// Production wiring: the standard currency table and the configured PDP.
///
/// Without a Permit API key the in-process [`StaticPolicy`] is used instead.
pub fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let currencies = CurrencyTable::standard().context("standard currency table is invalid")?;

    let pdp: Arc<dyn PolicyDecisionPoint> = match &config.permit {
        Some(permit) => {
            tracing::info!(pdp = %permit.pdp_url, api = %permit.api_url, "using Permit.io policy decision point");
            Arc::new(PermitClient::new(permit.clone()).context("failed to build Permit.io client")?)
        }
        None => {
            tracing::warn!("PERMIT_API_KEY not set; using in-process static policy (development only)");
            Arc::new(StaticPolicy::standard())
        }
    };

    Ok(AppServices::new(currencies, pdp).with_tenant(config.tenant.clone()))
}
