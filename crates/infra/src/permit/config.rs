use std::time::Duration;

use makechange_auth::DEFAULT_TENANT;

pub const DEFAULT_PDP_URL: &str = "http://localhost:7766";
pub const DEFAULT_API_URL: &str = "https://api.permit.io";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Connection settings for a Permit.io PDP sidecar and the Permit REST API.
#[derive(Clone)]
pub struct PermitConfig {
    pub api_key: String,
    pub pdp_url: String,
    pub api_url: String,
    /// Project/environment for the facts API. When unset they are resolved
    /// from the API key's scope on first use.
    pub project: Option<String>,
    pub environment: Option<String>,
    pub tenant: String,
    pub timeout: Duration,
}

impl PermitConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            pdp_url: DEFAULT_PDP_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            project: None,
            environment: None,
            tenant: DEFAULT_TENANT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_pdp_url(mut self, url: impl Into<String>) -> Self {
        self.pdp_url = url.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_scope(mut self, project: impl Into<String>, environment: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self.environment = Some(environment.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keeps the API key out of logs.
impl core::fmt::Debug for PermitConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PermitConfig")
            .field("api_key", &"<redacted>")
            .field("pdp_url", &self.pdp_url)
            .field("api_url", &self.api_url)
            .field("project", &self.project)
            .field("environment", &self.environment)
            .field("tenant", &self.tenant)
            .field("timeout", &self.timeout)
            .finish()
    }
}
