//! Gateway to the proof backend.
//!
//! The backend owns every zero-knowledge proof and builds the confidential
//! transactions; this side only ships seed signatures and account data to it
//! and gets base64 transactions back. [`ProofBackend`] is the raw JSON seam,
//! and [`post`]/[`get`] layer the per-endpoint types from [`models`] on top.

pub mod models;

use crate::config::parse_backend_url;
use crate::error::WalletError;
use async_trait::async_trait;
use reqwest::{Method, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateConfidentialAccount,
    Deposit,
    Apply,
    Withdraw,
    Transfer,
    Decrypt,
    RevealElGamalPubkey,
    AuditTransaction,
    CreateTestToken,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::CreateConfidentialAccount => "/create-cb-ata",
            Endpoint::Deposit => "/deposit-cb",
            Endpoint::Apply => "/apply-cb",
            Endpoint::Withdraw => "/withdraw-cb",
            Endpoint::Transfer => "/transfer-cb",
            Endpoint::Decrypt => "/decrypt-cb",
            Endpoint::RevealElGamalPubkey => "/reveal-elgamal-pubkey",
            Endpoint::AuditTransaction => "/audit-transaction",
            Endpoint::CreateTestToken => "/create-test-token",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[async_trait]
pub trait ProofBackend: Send + Sync {
    /// One JSON request; no retry.
    async fn request(
        &self,
        endpoint: Endpoint,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, WalletError>;
}

/// `POST` a typed body and decode the typed response.
pub async fn post<Req, Res>(
    backend: &dyn ProofBackend,
    endpoint: Endpoint,
    body: &Req,
) -> Result<Res, WalletError>
where
    Req: Serialize + ?Sized,
    Res: DeserializeOwned,
{
    let body = serde_json::to_value(body)
        .map_err(|e| WalletError::Encoding(format!("failed to encode {endpoint} body: {e}")))?;
    let response = backend.request(endpoint, Method::POST, Some(body)).await?;
    decode_response(endpoint, response)
}

pub async fn get<Res>(backend: &dyn ProofBackend, endpoint: Endpoint) -> Result<Res, WalletError>
where
    Res: DeserializeOwned,
{
    let response = backend.request(endpoint, Method::GET, None).await?;
    decode_response(endpoint, response)
}

fn decode_response<Res: DeserializeOwned>(
    endpoint: Endpoint,
    response: Value,
) -> Result<Res, WalletError> {
    serde_json::from_value(response).map_err(|e| {
        error!(%endpoint, "unexpected response shape: {e}");
        WalletError::backend(endpoint.path(), format!("unexpected response: {e}"))
    })
}

#[derive(Debug, Clone)]
pub struct ServerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ServerClient {
    pub fn new(base_url: &str) -> Result<Self, WalletError> {
        Ok(Self::from_url(parse_backend_url(base_url)?))
    }

    pub fn from_url(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, endpoint: Endpoint) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.path()
        )
    }
}

#[async_trait]
impl ProofBackend for ServerClient {
    async fn request(
        &self,
        endpoint: Endpoint,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, WalletError> {
        let url = self.url_for(endpoint);
        debug!(%method, %url, "backend request");

        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| WalletError::backend(endpoint.path(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                format!("HTTP error! Status: {}", status.as_u16())
            } else {
                text
            };
            error!(%endpoint, status = status.as_u16(), "backend error: {message}");
            return Err(WalletError::backend(endpoint.path(), message));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WalletError::backend(endpoint.path(), format!("invalid JSON: {e}")))
    }
}
