use crate::AppState;
use crate::handlers::accounts::TokenAccountPath;
use crate::handlers::{ApiResponse, AppError};
use crate::state::visibility::{self, DecryptedBalance};
use axum::extract::{Path, State};
use serde::Serialize;
use serde_with::{DisplayFromStr, serde_as};
use solana_pubkey::Pubkey;
use std::sync::Arc;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusResponse {
    #[serde_as(as = "DisplayFromStr")]
    pub token_account: Pubkey,
    pub visible: bool,
    pub has_pending_balance: bool,
    /// Only present while the balance is visible.
    pub balance: Option<DecryptedBalance>,
}

// handler is at GET /accounts/{token_account}/status
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<TokenAccountPath>,
) -> Result<ApiResponse<AccountStatusResponse>, AppError> {
    let ctx = &state.ctx;
    let endpoint = ctx.rpc_endpoint();
    let token_account = path.token_account;

    let has_pending_balance = ctx.pending.has_pending_balance(&token_account).await?;
    let balance = visibility::visible_balance(&ctx.cache, &endpoint, &token_account).await;

    Ok(ApiResponse::new(AccountStatusResponse {
        token_account,
        visible: balance.is_some(),
        has_pending_balance,
        balance,
    }))
}
