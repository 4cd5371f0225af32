//! In-process policy decision point.
//!
//! Holds a fixed role → permission mapping plus the users and role
//! assignments created through the [`PolicyDecisionPoint`] API. Used for local
//! development without a policy service and as a test double.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{Permission, PolicyCheck, PolicyDecisionPoint, PolicyError, Role, RoleGrant, SessionUser, UserSync};

#[derive(Debug, Clone, Default)]
struct StaticUser {
    email: Option<String>,
    first_name: String,
    last_name: String,
    country: Option<String>,
    grants: Vec<(Role, String)>,
}

#[derive(Debug, Default)]
pub struct StaticPolicy {
    role_permissions: HashMap<String, Vec<Permission>>,
    users: Mutex<HashMap<String, StaticUser>>,
}

impl StaticPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// `member` may make change; `admin` may do anything.
    pub fn standard() -> Self {
        Self::new()
            .grant(Role::MEMBER.as_str(), Permission::for_action("change", "make"))
            .grant("admin", Permission::new("*"))
    }

    pub fn grant(mut self, role: impl Into<String>, permission: Permission) -> Self {
        self.role_permissions.entry(role.into()).or_default().push(permission);
        self
    }

    pub fn role_permissions(&self, role: &str) -> Vec<Permission> {
        self.role_permissions.get(role).cloned().unwrap_or_default()
    }

    pub fn is_synced(&self, key: &str) -> bool {
        self.users().map(|u| u.contains_key(key)).unwrap_or(false)
    }

    /// Country recorded for `key` at its last sync.
    pub fn country_of(&self, key: &str) -> Option<String> {
        self.users().ok()?.get(key)?.country.clone()
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<String, StaticUser>>, PolicyError> {
        self.users
            .lock()
            .map_err(|_| PolicyError::Unavailable("static policy store poisoned".to_string()))
    }
}

#[async_trait]
impl PolicyDecisionPoint for StaticPolicy {
    async fn check(&self, user: &SessionUser, check: &PolicyCheck) -> Result<bool, PolicyError> {
        let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?;

        let mut roles: Vec<Role> = user.roles.clone();
        if let Some(record) = self.users()?.get(key) {
            roles.extend(record.grants.iter().map(|(role, _)| role.clone()));
        }

        Ok(roles.iter().any(|role| {
            self.role_permissions
                .get(role.as_str())
                .is_some_and(|perms| perms.iter().any(|p| p.grants(&check.resource, &check.action)))
        }))
    }

    async fn sync_user(&self, user: &SessionUser, sync: &UserSync) -> Result<(), PolicyError> {
        let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?.to_string();
        let mut users = self.users()?;
        let record = users.entry(key).or_default();
        record.email = user.email.clone();
        record.first_name = user.first_name().to_string();
        record.last_name = user.last_name();
        if sync.country.is_some() {
            record.country = sync.country.clone();
        }
        Ok(())
    }

    async fn assign_role(&self, user: &SessionUser, role: &Role, tenant: &str) -> Result<(), PolicyError> {
        let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?;
        let mut users = self.users()?;
        let record = users.get_mut(key).ok_or_else(|| PolicyError::Rejected {
            status: 404,
            body: format!("user '{key}' does not exist"),
        })?;

        let grant = (role.clone(), tenant.to_string());
        if !record.grants.contains(&grant) {
            record.grants.push(grant);
        }
        Ok(())
    }

    async fn user_roles(&self, user: &SessionUser) -> Result<Vec<RoleGrant>, PolicyError> {
        let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?;
        let users = self.users()?;
        let Some(record) = users.get(key) else {
            return Ok(Vec::new());
        };

        Ok(record
            .grants
            .iter()
            .map(|(role, tenant)| RoleGrant {
                role: role.clone(),
                tenant: tenant.clone(),
                permissions: self.role_permissions(role.as_str()),
            })
            .collect())
    }
}
