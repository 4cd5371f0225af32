//! JSON shapes exchanged with the PDP and the Permit REST API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub(crate) struct AllowedRequest<'a> {
    pub user: UserRef<'a>,
    pub action: &'a str,
    pub resource: ResourceRef<'a>,
    pub context: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserRef<'a> {
    pub key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceRef<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub tenant: &'a str,
    pub attributes: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AllowedResponse {
    pub allow: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserUpsert<'a> {
    pub key: &'a str,
    pub email: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoleAssignment<'a> {
    pub role: &'a str,
    pub tenant: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserRead {
    #[serde(default)]
    pub roles: Vec<AssignedRole>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignedRole {
    pub role: String,
    pub tenant: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleRead {
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiKeyScope {
    pub project_id: Option<String>,
    pub environment_id: Option<String>,
}
