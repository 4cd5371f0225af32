//! Permit.io adapter for [`PolicyDecisionPoint`].
//!
//! - Decisions: `POST {pdp}/allowed` against the PDP sidecar
//! - Users and role assignments: the facts API under `{api}/v2/facts/{project}/{env}`
//! - Role permissions: `{api}/v2/schema/{project}/{env}/roles/{role}`
//!
//! Every request carries `Authorization: Bearer {api_key}` and the configured
//! timeout. There are no retries; callers decide what a failure means.

mod config;
mod wire;


use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::instrument;

use makechange_auth::{
    Permission, PolicyCheck, PolicyDecisionPoint, PolicyError, Role, RoleGrant, SessionUser, UserSync,
};

pub use config::{PermitConfig, DEFAULT_API_URL, DEFAULT_PDP_URL, DEFAULT_TIMEOUT};
use wire::{
    AllowedRequest, AllowedResponse, ApiKeyScope, ResourceRef, RoleAssignment, RoleRead, UserRead, UserRef,
    UserUpsert,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scope {
    project: String,
    environment: String,
}

#[derive(Debug)]
pub struct PermitClient {
    http: reqwest::Client,
    config: PermitConfig,
    scope: OnceCell<Scope>,
}

impl PermitClient {
    pub fn new(config: PermitConfig) -> Result<Self, PolicyError> {
        if config.api_key.trim().is_empty() {
            return Err(PolicyError::Config("api key is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PolicyError::Config(e.to_string()))?;

        let scope = match (&config.project, &config.environment) {
            (Some(project), Some(environment)) => OnceCell::new_with(Some(Scope {
                project: project.clone(),
                environment: environment.clone(),
            })),
            _ => OnceCell::new(),
        };

        Ok(Self { http, config, scope })
    }

    pub fn config(&self) -> &PermitConfig {
        &self.config
    }

    async fn scope(&self) -> Result<&Scope, PolicyError> {
        self.scope
            .get_or_try_init(|| async {
                let url = endpoint(&self.config.api_url, &["v2", "api-key", "scope"])?;
                let scope: ApiKeyScope = self.send_json(self.http.get(url)).await?;
                match (scope.project_id, scope.environment_id) {
                    (Some(project), Some(environment)) => {
                        tracing::info!(%project, %environment, "resolved permit api key scope");
                        Ok(Scope { project, environment })
                    }
                    _ => Err(PolicyError::Config(
                        "api key is not scoped to an environment; set project and environment".to_string(),
                    )),
                }
            })
            .await
    }

    async fn facts_url(&self, segments: &[&str]) -> Result<Url, PolicyError> {
        let scope = self.scope().await?;
        let mut all = vec!["v2", "facts", scope.project.as_str(), scope.environment.as_str()];
        all.extend_from_slice(segments);
        endpoint(&self.config.api_url, &all)
    }

    async fn role_permissions(&self, role: &str) -> Result<Vec<Permission>, PolicyError> {
        let scope = self.scope().await?;
        let url = endpoint(
            &self.config.api_url,
            &["v2", "schema", scope.project.as_str(), scope.environment.as_str(), "roles", role],
        )?;
        let read: RoleRead = self.send_json(self.http.get(url)).await?;
        Ok(read.permissions.into_iter().map(Permission::new).collect())
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, PolicyError> {
        let response = request
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| PolicyError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(PolicyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PolicyError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| PolicyError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PolicyDecisionPoint for PermitClient {
    #[instrument(skip_all, fields(action = %check.action, resource = %check.resource))]
    async fn check(&self, user: &SessionUser, check: &PolicyCheck) -> Result<bool, PolicyError> {
        let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?;
        let url = endpoint(&self.config.pdp_url, &["allowed"])?;

        let body = AllowedRequest {
            user: UserRef {
                key,
                email: user.email.as_deref(),
            },
            action: &check.action,
            resource: ResourceRef {
                kind: &check.resource,
                tenant: &self.config.tenant,
                attributes: &check.attributes,
            },
            context: Map::new(),
        };

        let decision: AllowedResponse = self.send_json(self.http.post(url).json(&body)).await?;
        Ok(decision.allow)
    }

    #[instrument(skip_all)]
    async fn sync_user(&self, user: &SessionUser, sync: &UserSync) -> Result<(), PolicyError> {
        let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?;
        let url = self.facts_url(&["users", key]).await?;

        let mut attributes = Map::new();
        if let Some(country) = &sync.country {
            attributes.insert("country".to_string(), Value::String(country.clone()));
        }

        let last_name = user.last_name();
        let body = UserUpsert {
            key,
            email: user.email.as_deref(),
            first_name: user.first_name(),
            last_name: &last_name,
            attributes,
        };

        self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(role = %role, tenant = %tenant))]
    async fn assign_role(&self, user: &SessionUser, role: &Role, tenant: &str) -> Result<(), PolicyError> {
        let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?;
        let url = self.facts_url(&["users", key, "roles"]).await?;
        let body = RoleAssignment {
            role: role.as_str(),
            tenant,
        };

        match self.send(self.http.post(url).json(&body)).await {
            Ok(_) => Ok(()),
            // Already assigned.
            Err(PolicyError::Rejected { status, .. }) if status == StatusCode::CONFLICT.as_u16() => Ok(()),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all)]
    async fn user_roles(&self, user: &SessionUser) -> Result<Vec<RoleGrant>, PolicyError> {
        let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?;
        let url = self.facts_url(&["users", key]).await?;

        let read: UserRead = match self.send_json(self.http.get(url)).await {
            Ok(read) => read,
            Err(PolicyError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut grants = Vec::with_capacity(read.roles.len());
        for assigned in read.roles {
            let permissions = self.role_permissions(&assigned.role).await?;
            grants.push(RoleGrant {
                role: Role::new(assigned.role),
                tenant: assigned.tenant,
                permissions,
            });
        }
        Ok(grants)
    }
}

/// Append percent-encoded path segments to a base URL.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, PolicyError> {
    let mut url = Url::parse(base).map_err(|e| PolicyError::Config(format!("invalid url '{base}': {e}")))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| PolicyError::Config(format!("'{base}' cannot be a base url")))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}
