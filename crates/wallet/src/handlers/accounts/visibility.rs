use crate::AppState;
use crate::handlers::accounts::TokenAccountPath;
use crate::handlers::{ApiResponse, AppError, run_detached};
use crate::operations::decrypt::{decrypt_balance, hide_balance};
use crate::state::visibility::DecryptedBalance;
use axum::extract::{Path, State};
use std::sync::Arc;

// handler is at POST /accounts/{token_account}/decrypt
pub async fn decrypt(
    State(state): State<Arc<AppState>>,
    Path(path): Path<TokenAccountPath>,
) -> Result<ApiResponse<DecryptedBalance>, AppError> {
    let ctx = state.ctx.clone();
    let balance =
        run_detached(async move { decrypt_balance(&ctx, path.token_account).await }).await?;
    Ok(ApiResponse::new(balance))
}

// handler is at POST /accounts/{token_account}/hide
pub async fn hide(
    State(state): State<Arc<AppState>>,
    Path(path): Path<TokenAccountPath>,
) -> Result<ApiResponse<bool>, AppError> {
    hide_balance(&state.ctx, path.token_account).await;
    Ok(ApiResponse::new(false))
}
