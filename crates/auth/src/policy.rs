//! Policy decision point (PDP) contract.
//!
//! Decisions, role storage and user records live in an external policy
//! service; this module only describes how the rest of the system talks to it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Permission, Role, SessionUser};

/// A single "may `user` do `action` on `resource`?" question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyCheck {
    pub action: String,
    pub resource: String,
    /// Resource attributes for attribute-based rules (amount, currency, country).
    pub attributes: Map<String, Value>,
}

impl PolicyCheck {
    pub fn new(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Extra data sent along when a user is synced into the policy service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSync {
    pub country: Option<String>,
}

/// A role held by a user in a tenant, with the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: Role,
    pub tenant: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy service unavailable: {0}")]
    Unavailable(String),

    #[error("policy service rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected policy service response: {0}")]
    InvalidResponse(String),

    #[error("user has neither an id nor an email")]
    MissingUserKey,

    #[error("policy client misconfigured: {0}")]
    Config(String),
}

#[async_trait]
pub trait PolicyDecisionPoint: Send + Sync {
    async fn check(&self, user: &SessionUser, check: &PolicyCheck) -> Result<bool, PolicyError>;

    /// Create or update the user record in the policy service.
    async fn sync_user(&self, user: &SessionUser, sync: &UserSync) -> Result<(), PolicyError>;

    async fn assign_role(&self, user: &SessionUser, role: &Role, tenant: &str) -> Result<(), PolicyError>;

    async fn user_roles(&self, user: &SessionUser) -> Result<Vec<RoleGrant>, PolicyError>;
}
