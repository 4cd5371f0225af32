use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::dto;
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> Json<dto::WhoAmIResponse> {
    let user = session.user();
    Json(dto::WhoAmIResponse {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        roles: user.roles.clone(),
    })
}

/// Roles as seen by the session and as carried in the bearer token.
pub async fn session_roles(Extension(session): Extension<SessionContext>) -> Json<dto::SessionRolesResponse> {
    Json(dto::SessionRolesResponse {
        success: true,
        session_roles: session.session_roles().to_vec(),
        jwt_roles: session.token_roles().to_vec(),
        // Every protected request is authenticated by a bearer token.
        has_access_token: true,
    })
}
