use crate::operations::audit::{AuditReport, audit_transaction};
use crate::{
    AppState,
    handlers::{ApiResponse, AppError, run_detached},
};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use solana_signature::Signature;
use std::sync::Arc;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTransactionRequest {
    #[serde_as(as = "DisplayFromStr")]
    pub signature: Signature,
}

// handler is at POST /audit
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuditTransactionRequest>,
) -> Result<ApiResponse<AuditReport>, AppError> {
    let ctx = state.ctx.clone();
    let report = run_detached(async move { audit_transaction(&ctx, payload.signature).await }).await?;
    Ok(ApiResponse::new(report))
}
