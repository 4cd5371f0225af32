use serde::{Deserialize, Serialize};

use crate::{OidcClaims, Role};

/// The authenticated caller, as derived from validated token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<Role>,
}

impl SessionUser {
    pub fn from_claims(claims: &OidcClaims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            roles: claims.roles.clone(),
        }
    }

    /// Key identifying this user in the policy service: the subject id,
    /// falling back to the email address.
    pub fn policy_key(&self) -> Option<&str> {
        let id = self.id.trim();
        if !id.is_empty() {
            return Some(id);
        }
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    pub fn first_name(&self) -> &str {
        self.name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
            .unwrap_or("")
    }

    pub fn last_name(&self) -> String {
        self.name
            .as_deref()
            .map(|n| n.split_whitespace().skip(1).collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }
}
