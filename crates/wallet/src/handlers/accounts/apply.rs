use crate::AppState;
use crate::handlers::accounts::TokenAccountPath;
use crate::handlers::{ApiResponse, AppError, run_detached};
use crate::operations::{OperationResult, apply::apply};
use axum::extract::{Path, State};
use std::sync::Arc;

// handler is at POST /accounts/{token_account}/apply
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<TokenAccountPath>,
) -> Result<ApiResponse<OperationResult>, AppError> {
    let ctx = state.ctx.clone();
    let result = run_detached(async move { apply(&ctx, path.token_account).await }).await?;
    Ok(ApiResponse::new(result))
}
