use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use makechange_auth::{Role, RoleGrant};
use makechange_currency::{amount_from_f64, parse_amount, ChangeError, DecompositionResult};

// -------------------------
// Make change
// -------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeChangeRequest {
    /// A JSON number or a numeric string, in major units.
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl MakeChangeRequest {
    pub fn amount(&self) -> Option<&Value> {
        self.amount.as_ref().filter(|v| !v.is_null())
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref().filter(|c| !c.is_empty())
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Convert the raw `amount` field into a decimal amount.
pub fn amount_to_decimal(value: &Value) -> Result<Decimal, ChangeError> {
    match value {
        Value::Number(n) => {
            let f = n
                .as_f64()
                .ok_or_else(|| ChangeError::InvalidAmount(format!("{n} is not representable")))?;
            amount_from_f64(f)
        }
        Value::String(s) => parse_amount(s),
        other => Err(ChangeError::InvalidAmount(format!("expected a number, got {other}"))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeChangeResponse {
    pub permitted: bool,
    pub message: String,
    pub change_results: Vec<String>,
    pub currency_symbol: String,
    pub formatted_amount: String,
    /// Only present when the table could not represent the whole amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remainder_minor_units: Option<u64>,
}

impl From<&DecompositionResult> for MakeChangeResponse {
    fn from(result: &DecompositionResult) -> Self {
        Self {
            permitted: true,
            message: result.message().to_string(),
            change_results: result.change_results(),
            currency_symbol: result.symbol().to_string(),
            formatted_amount: result.formatted_amount().to_string(),
            remainder_minor_units: Some(result.remainder_minor_units()).filter(|r| *r > 0),
        }
    }
}

// -------------------------
// Policy service
// -------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionCheckRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionCheckResponse {
    pub permitted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleGrantsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub roles: Vec<RoleGrant>,
}

// -------------------------
// Session
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct WhoAmIResponse {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRolesResponse {
    pub success: bool,
    pub session_roles: Vec<Role>,
    pub jwt_roles: Vec<Role>,
    pub has_access_token: bool,
}
