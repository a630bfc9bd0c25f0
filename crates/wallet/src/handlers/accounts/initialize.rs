use crate::AppState;
use crate::handlers::{ApiResponse, AppError, run_detached};
use crate::operations::{OperationResult, initialize::initialize_account};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use solana_pubkey::Pubkey;
use std::sync::Arc;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeAccountRequest {
    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,
}

// handler is at POST /accounts/initialize
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InitializeAccountRequest>,
) -> Result<ApiResponse<OperationResult>, AppError> {
    let ctx = state.ctx.clone();
    let result = run_detached(async move { initialize_account(&ctx, payload.mint).await }).await?;
    Ok(ApiResponse::new(result))
}
