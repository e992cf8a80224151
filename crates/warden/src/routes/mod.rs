//! HTTP route handlers for Warden.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::verify::HttpClient;

mod health;
mod token;

/// Create the main application router
pub fn create_router<C: HttpClient + 'static>(state: AppState<C>) -> Router {
    Router::new()
        // Health & Status
        .route("/health", get(health::health_check::<C>))

        // Verification
        .route("/verify", post(token::verify_token::<C>))

        .layer(TraceLayer::new_for_http())

        // Add shared state
        .with_state(state)
}
