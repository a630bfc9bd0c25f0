use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use solana_pubkey::Pubkey;
use std::sync::Arc;

use crate::AppState;

pub mod apply;
pub mod deposit;
pub mod initialize;
pub mod status;
pub mod transfer;
pub mod visibility;
pub mod withdraw;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenAccountPath {
    #[serde_as(as = "DisplayFromStr")]
    pub token_account: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmountRequest {
    /// UI amount, e.g. "2.5"
    pub amount: String,
}

/// nested within /accounts prefix
pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/initialize", post(initialize::handler))
        .route("/{token_account}/deposit", post(deposit::handler))
        .route("/{token_account}/apply", post(apply::handler))
        .route("/{token_account}/withdraw", post(withdraw::handler))
        .route("/{token_account}/transfer", post(transfer::handler))
        .route("/{token_account}/decrypt", post(visibility::decrypt))
        .route("/{token_account}/hide", post(visibility::hide))
        .route("/{token_account}/status", get(status::handler))
        .with_state(state)
}
