use axum::{Router, middleware::from_fn, routing::get};

use crate::{AppState, routes};

mod auth;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::dos::router(&state))
        .layer(from_fn(auth::require_session));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .with_state(state)
}
