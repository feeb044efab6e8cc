//! Router setup.

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with the webhook and health routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/webhook",
            get(handlers::verify_webhook).post(handlers::receive_webhook),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
