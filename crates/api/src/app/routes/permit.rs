//! Direct access to the policy service for the signed-in user.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use makechange_auth::{authorize, enroll, PolicyCheck, PolicyDecisionPoint, UserSync};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/check", post(check))
        .route("/sync", post(sync))
        .route("/roles", get(roles))
}

pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<dto::PermissionCheckRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    let (Some(action), Some(resource)) = (
        body.action.as_deref().filter(|a| !a.is_empty()),
        body.resource.as_deref().filter(|r| !r.is_empty()),
    ) else {
        return errors::missing_parameters();
    };

    let permitted = authorize(services.pdp.as_ref(), session.user(), &PolicyCheck::new(action, resource)).await;
    (StatusCode::OK, Json(dto::PermissionCheckResponse { permitted })).into_response()
}

/// Sync the caller into the policy service and assign the default role.
pub async fn sync(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Option<Json<dto::SyncRequest>>,
) -> axum::response::Response {
    let country = body
        .and_then(|Json(b)| b.country)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let user = session.user();

    match enroll(services.pdp.as_ref(), user, &UserSync { country }, &services.tenant).await {
        Ok(()) => {
            if let Some(key) = user.policy_key() {
                services.synced.mark_synced(key);
            }
            (StatusCode::OK, Json(dto::SyncResponse { success: true })).into_response()
        }
        Err(e) => {
            tracing::error!("error syncing user with policy service: {e}");
            errors::failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to sync user with Permit.io")
        }
    }
}

/// Role assignments the policy service holds for the caller.
pub async fn roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    match services.pdp.user_roles(session.user()).await {
        Ok(roles) => (
            StatusCode::OK,
            Json(dto::RoleGrantsResponse {
                success: true,
                error: None,
                roles,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("failed to fetch user roles: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(dto::RoleGrantsResponse {
                    success: false,
                    error: Some(e.to_string()),
                    roles: Vec::new(),
                }),
            )
                .into_response()
        }
    }
}
