//! Service configuration, read from the environment (after `.env` is loaded).

use crate::error::WalletError;
use solana_pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
// 0.1 SOL, sent to the backend as the transfer priority fee
const DEFAULT_PRIORITY_FEE_LAMPORTS: u64 = 100_000_000;
const DEFAULT_PENDING_BALANCE_POLL_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterNetwork {
    Mainnet,
    Testnet,
    Devnet,
    Custom,
}

impl FromStr for ClusterNetwork {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" | "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "custom" => Ok(Self::Custom),
            other => Err(WalletError::Configuration(format!(
                "unknown cluster network: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub network: ClusterNetwork,
    pub endpoint: String,
}

impl Cluster {
    pub fn new(network: ClusterNetwork, endpoint: impl Into<String>) -> Self {
        Self {
            network,
            endpoint: endpoint.into(),
        }
    }

    /// Query string appended to explorer links for this cluster.
    pub fn url_param(&self) -> String {
        let suffix = match self.network {
            ClusterNetwork::Devnet => "devnet".to_string(),
            ClusterNetwork::Mainnet => String::new(),
            ClusterNetwork::Testnet => "testnet".to_string(),
            ClusterNetwork::Custom => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(self.endpoint.as_bytes()).collect();
                format!("custom&customUrl={encoded}")
            }
        };

        if suffix.is_empty() {
            String::new()
        } else {
            format!("?cluster={suffix}")
        }
    }

    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!(
            "https://explorer.solana.com/tx/{}{}",
            signature,
            self.url_param()
        )
    }
}

/// Validates the proof backend base URL. It must be an absolute http(s) URL.
pub fn parse_backend_url(raw: &str) -> Result<Url, WalletError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WalletError::Configuration(
            "BACKEND_API_ENDPOINT is empty".to_string(),
        ));
    }

    let url = Url::parse(trimmed).map_err(|e| {
        WalletError::Configuration(format!("BACKEND_API_ENDPOINT is not a valid URL: {e}"))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(WalletError::Configuration(format!(
            "BACKEND_API_ENDPOINT must use http or https, got {scheme}"
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: Url,
    pub cluster: Cluster,
    pub wallet_keypair: Option<String>,
    pub database_url: Option<String>,
    pub listen_addr: String,
    pub priority_fee_lamports: u64,
    pub pending_balance_poll_interval: Duration,
    pub watched_token_accounts: Vec<Pubkey>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, WalletError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WalletError> {
        let backend_url = lookup("BACKEND_API_ENDPOINT")
            .ok_or_else(|| {
                WalletError::Configuration("BACKEND_API_ENDPOINT must be set".to_string())
            })
            .and_then(|raw| parse_backend_url(&raw))?;

        let rpc_url = lookup("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let network = match lookup("CLUSTER") {
            Some(raw) => raw.parse()?,
            None => ClusterNetwork::Devnet,
        };

        let priority_fee_lamports = match lookup("PRIORITY_FEE_LAMPORTS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                WalletError::Configuration(format!("PRIORITY_FEE_LAMPORTS: {e}"))
            })?,
            None => DEFAULT_PRIORITY_FEE_LAMPORTS,
        };

        let poll_secs = match lookup("PENDING_BALANCE_POLL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                WalletError::Configuration(format!("PENDING_BALANCE_POLL_SECS: {e}"))
            })?,
            None => DEFAULT_PENDING_BALANCE_POLL_SECS,
        };

        let watched_token_accounts = lookup("WATCH_TOKEN_ACCOUNTS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        Pubkey::from_str(s).map_err(|e| {
                            WalletError::Configuration(format!(
                                "WATCH_TOKEN_ACCOUNTS entry {s}: {e}"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            backend_url,
            cluster: Cluster::new(network, rpc_url),
            wallet_keypair: lookup("WALLET_KEYPAIR").filter(|s| !s.is_empty()),
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            listen_addr: lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            priority_fee_lamports,
            pending_balance_poll_interval: Duration::from_secs(poll_secs),
            watched_token_accounts,
        })
    }
}
