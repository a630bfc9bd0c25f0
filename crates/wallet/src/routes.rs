use crate::AppState;
use crate::handlers;
use axum::routing::post;
use axum::{Router, routing::get};
use handlers::accounts::routes as account_routes;
use handlers::tokens::routes as token_routes;
use std::sync::Arc;

// NOTE: no authentication; the service acts for the single configured wallet.
pub fn create_router(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route("/health", get(handlers::health::handler))
        .nest("/accounts", account_routes(state.clone()))
        .nest("/tokens", token_routes(state.clone()))
        .route("/audit", post(handlers::audit::handler))
        .route("/elgamal-pubkey", post(handlers::keys::elgamal_pubkey))
        .route("/log", get(handlers::activity::log))
        .route("/notifications", get(handlers::activity::notifications))
        .with_state(state.clone())
}
