use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use makechange_currency::ChangeError;

pub fn change_error_to_response(err: ChangeError) -> axum::response::Response {
    match err {
        ChangeError::InvalidCurrency(_) => json_error(StatusCode::BAD_REQUEST, "Invalid currency", true),
        ChangeError::InvalidAmount(_) => json_error(StatusCode::BAD_REQUEST, "Invalid amount", true),
        ChangeError::Computation(msg) => conversion_failed(msg),
        ChangeError::Domain(e) => conversion_failed(e.to_string()),
    }
}

fn conversion_failed(details: String) -> axum::response::Response {
    tracing::error!("change computation failed: {details}");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("There was a problem converting the amount submitted: {details}"),
        true,
    )
}

/// Error body for permission-gated routes: `{ error, permitted }`.
pub fn json_error(status: StatusCode, error: impl Into<String>, permitted: bool) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": error.into(),
            "permitted": permitted,
        })),
    )
        .into_response()
}

/// Error body for policy-service management routes: `{ error, success: false }`.
pub fn failure(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": error.into(),
            "success": false,
        })),
    )
        .into_response()
}

pub fn unauthorized() -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "Unauthorized", false)
}

pub fn missing_parameters() -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "Missing required parameters", false)
}

pub fn invalid_body(rejection: JsonRejection) -> axum::response::Response {
    tracing::debug!("rejected request body: {rejection}");
    json_error(StatusCode::BAD_REQUEST, "Invalid request body", false)
}
