use crate::operations::{OperationResult, create_test_token::create_test_token};
use crate::{
    AppState,
    handlers::{ApiResponse, AppError, run_detached},
};
use axum::extract::State;
use std::sync::Arc;

// handler is at POST /tokens/test
pub async fn handler(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<OperationResult>, AppError> {
    let ctx = state.ctx.clone();
    let result = run_detached(async move { create_test_token(&ctx).await }).await?;
    Ok(ApiResponse::new(result))
}
