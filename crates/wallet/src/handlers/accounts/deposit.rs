use crate::AppState;
use crate::handlers::accounts::{AmountRequest, TokenAccountPath};
use crate::handlers::{ApiResponse, AppError, run_detached};
use crate::operations::{OperationResult, deposit::deposit};
use axum::extract::Path;
use axum::{Json, extract::State};
use std::sync::Arc;

// handler is at POST /accounts/{token_account}/deposit
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<TokenAccountPath>,
    Json(payload): Json<AmountRequest>,
) -> Result<ApiResponse<OperationResult>, AppError> {
    let ctx = state.ctx.clone();
    let result =
        run_detached(async move { deposit(&ctx, path.token_account, &payload.amount).await })
            .await?;
    Ok(ApiResponse::new(result))
}
