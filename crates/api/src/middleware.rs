use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::HeaderMap, middleware::Next, response::Response};
use chrono::Utc;

use makechange_auth::JwtValidator;

use crate::app::errors;
use crate::context::SessionContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(errors::unauthorized)?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!("rejected bearer token: {e}");
        errors::unauthorized()
    })?;

    req.extensions_mut().insert(SessionContext::from_claims(&claims));

    Ok(next.run(req).await)
}

/// Log one line per request served.
pub async fn log_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request served"
    );
    response
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
