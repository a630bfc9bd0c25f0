use crate::AppState;
use crate::handlers::{ApiResponse, AppError};
use axum::extract::State;
use serde::Serialize;
use serde_with::{DisplayFromStr, serde_as};
use solana_pubkey::Pubkey;
use std::sync::Arc;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub rpc_endpoint: String,
    /// `None` while no wallet is connected.
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub wallet: Option<Pubkey>,
}

pub async fn handler(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<HealthResponse>, AppError> {
    Ok(ApiResponse::new(HealthResponse {
        status: "OK",
        rpc_endpoint: state.ctx.rpc_endpoint(),
        wallet: state.ctx.wallet.public_key(),
    }))
}
