use crate::operations::reveal::reveal_elgamal_pubkey;
use crate::{
    AppState,
    handlers::{ApiResponse, AppError, run_detached},
};
use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElGamalPubkeyResponse {
    pub pubkey: String,
}

// handler is at POST /elgamal-pubkey
pub async fn elgamal_pubkey(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<ElGamalPubkeyResponse>, AppError> {
    let ctx = state.ctx.clone();
    let pubkey = run_detached(async move { reveal_elgamal_pubkey(&ctx).await }).await?;
    Ok(ApiResponse::new(ElGamalPubkeyResponse { pubkey }))
}
