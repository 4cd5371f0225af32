use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use makechange_auth::{authorize, PolicyCheck};
use makechange_currency::{decompose, ChangeError};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub const ACTION: &str = "make";
pub const RESOURCE: &str = "change";

pub async fn make_change(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<dto::MakeChangeRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    let (Some(amount), Some(currency)) = (body.amount(), body.currency()) else {
        tracing::info!("make change request is missing parameters");
        return errors::missing_parameters();
    };
    let country = body.country();
    let user = session.user();

    tracing::info!(
        user = user.policy_key().unwrap_or_default(),
        %amount,
        currency,
        country = country.unwrap_or("unknown"),
        "make change requested"
    );

    services.ensure_synced(user, country).await;

    let mut check = PolicyCheck::new(ACTION, RESOURCE)
        .with_attribute("amount", amount.clone())
        .with_attribute("currency", currency);
    if let Some(country) = country {
        check = check.with_attribute("country", country);
    }

    if !authorize(services.pdp.as_ref(), user, &check).await {
        return errors::json_error(StatusCode::FORBIDDEN, "Not authorized to make change", false);
    }

    let outcome = services
        .currencies
        .get(currency)
        .ok_or_else(|| ChangeError::InvalidCurrency(currency.to_string()))
        .and_then(|spec| decompose(spec, dto::amount_to_decimal(amount)?));

    match outcome {
        Ok(result) => (StatusCode::OK, Json(dto::MakeChangeResponse::from(&result))).into_response(),
        Err(e) => {
            tracing::info!(currency, "make change rejected: {e}");
            errors::change_error_to_response(e)
        }
    }
}
