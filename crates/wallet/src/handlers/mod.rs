pub mod accounts;
pub mod activity;
pub mod audit;
pub mod health;
pub mod keys;
pub mod tokens;

use crate::error::WalletError;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Every successful body is `{"data": ...}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Failed request: a status code plus the error text as a plain body.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AppError {
    error: anyhow::Error,
    status: StatusCode,
}

impl AppError {
    pub fn with_status(error: impl Into<anyhow::Error>, status: StatusCode) -> Self {
        Self {
            error: error.into(),
            status,
        }
    }

    pub fn bad_request(error: impl Into<anyhow::Error>) -> Self {
        Self::with_status(error, StatusCode::BAD_REQUEST)
    }

    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::with_status(error, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = self.error.to_string();
        if body.is_empty() {
            body = self
                .status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
        }
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err)
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        let status = match err.root_cause() {
            WalletError::InvalidInput(_) | WalletError::Encoding(_) => StatusCode::BAD_REQUEST,
            WalletError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
            WalletError::WalletNotConnected
            | WalletError::WalletSigningUnavailable
            | WalletError::WalletRejected(_) => StatusCode::PRECONDITION_FAILED,
            WalletError::Backend { .. } | WalletError::Rpc(_) => StatusCode::BAD_GATEWAY,
            WalletError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::with_status(err, status)
    }
}

/// Run an operation on its own task. A client that goes away mid-request
/// must not drop a bundle between send and confirm.
pub async fn run_detached<T, Fut>(op: Fut) -> Result<T, AppError>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, WalletError>> + Send + 'static,
{
    match tokio::spawn(op).await {
        Ok(result) => result.map_err(AppError::from),
        Err(e) => {
            error!("operation task failed: {}", e);
            Err(AppError::internal(anyhow::anyhow!(
                "operation task failed: {e}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BundleFailure;
    use solana_pubkey::Pubkey;

    #[test]
    fn test_status_follows_error_kind() {
        let cases = [
            (WalletError::InvalidInput("amount".into()), StatusCode::BAD_REQUEST),
            (
                WalletError::AccountNotFound {
                    label: "Token",
                    address: Pubkey::new_unique(),
                },
                StatusCode::NOT_FOUND,
            ),
            (WalletError::WalletNotConnected, StatusCode::PRECONDITION_FAILED),
            (
                WalletError::backend("/deposit-cb", "HTTP error! Status: 500"),
                StatusCode::BAD_GATEWAY,
            ),
            (WalletError::TransactionFailed("expired".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_signing_and_bundle_wrappers_are_seen_through() {
        let signing = WalletError::MessageSigning(Box::new(WalletError::WalletRejected(
            "User rejected the request".into(),
        )));
        assert_eq!(AppError::from(signing).status(), StatusCode::PRECONDITION_FAILED);

        let aborted = WalletError::BundleAborted(BundleFailure {
            label: "Withdraw".into(),
            failed_index: 1,
            total: 3,
            confirmed: vec![],
            cause: Box::new(WalletError::Rpc("node unhealthy".into())),
        });
        let app_error = AppError::from(aborted);
        assert_eq!(app_error.status(), StatusCode::BAD_GATEWAY);
        assert!(app_error.to_string().contains("aborted at transaction 2 of 3"));
    }

    #[test]
    fn test_empty_error_text_falls_back_to_reason() {
        let response = AppError::with_status(anyhow::anyhow!(""), StatusCode::BAD_GATEWAY)
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_detached_operation_error_reaches_the_caller() {
        let result: Result<(), AppError> =
            run_detached(async { Err(WalletError::Cancelled) }).await;
        assert_eq!(result.unwrap_err().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
