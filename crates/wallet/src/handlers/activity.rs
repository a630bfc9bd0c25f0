use crate::state::OperationLogEntry;
use crate::state::notify::Notification;
use crate::{
    AppState,
    handlers::{ApiResponse, AppError},
};
use axum::extract::State;
use std::sync::Arc;

// handler is at GET /log, oldest entry first
pub async fn log(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<OperationLogEntry>>, AppError> {
    Ok(ApiResponse::new(state.ctx.log.entries().await))
}

// handler is at GET /notifications
pub async fn notifications(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<Notification>>, AppError> {
    Ok(ApiResponse::new(state.ctx.notifier.recent().await))
}
