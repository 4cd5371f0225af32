use axum::{
    routing::{get, post},
    Router,
};

pub mod change;
pub mod permit;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/roles", get(system::session_roles))
        .route("/makechange", post(change::make_change))
        .nest("/permit", permit::router())
}
