use crate::AppState;
use crate::handlers::accounts::TokenAccountPath;
use crate::handlers::{ApiResponse, AppError, run_detached};
use crate::operations::{OperationResult, transfer::transfer};
use axum::extract::Path;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use solana_pubkey::Pubkey;
use std::sync::Arc;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// UI amount, e.g. "2.5"
    pub amount: String,
    /// Recipient's confidential token account for the same mint.
    #[serde_as(as = "DisplayFromStr")]
    pub recipient: Pubkey,
}

// handler is at POST /accounts/{token_account}/transfer
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<TokenAccountPath>,
    Json(payload): Json<TransferRequest>,
) -> Result<ApiResponse<OperationResult>, AppError> {
    if payload.recipient == path.token_account {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "Sender and recipient must be different token accounts"
        )));
    }

    let ctx = state.ctx.clone();
    let result = run_detached(async move {
        transfer(&ctx, path.token_account, payload.recipient, &payload.amount).await
    })
    .await?;
    Ok(ApiResponse::new(result))
}
