//! The RPC capabilities the orchestration flow consumes, and their
//! implementation on top of the nonblocking `RpcClient`.

use crate::error::WalletError;
use async_trait::async_trait;
use solana_account::Account;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{CommitmentConfig, RpcTransactionConfig},
};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use solana_transaction_status::UiTransactionEncoding;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Attempts made for a single cached read before the error surfaces.
pub const READ_ATTEMPTS: u32 = 3;
const READ_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// A blockhash together with the last block height at which transactions
/// referencing it can still land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    /// Serialized simulation error; `None` when the simulation succeeded.
    pub err: Option<String>,
    pub logs: Vec<String>,
}

#[async_trait]
pub trait RpcConnection: Send + Sync {
    /// Endpoint URL, used to key cached reads.
    fn rpc_endpoint(&self) -> String;

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, WalletError>;

    async fn get_minimum_balance_for_rent_exemption(&self, space: usize)
    -> Result<u64, WalletError>;

    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, WalletError>;

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationReport, WalletError>;

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, WalletError>;

    /// Wait for `signature` to reach `confirmed` commitment, giving up once
    /// the chain moves past `latest.last_valid_block_height`.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        latest: &LatestBlockhash,
    ) -> Result<(), WalletError>;

    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<VersionedTransaction, WalletError>;
}

/// Fetch an account that must exist for the operation to proceed.
pub async fn require_account(
    connection: &dyn RpcConnection,
    address: &Pubkey,
    label: &'static str,
) -> Result<Account, WalletError> {
    connection
        .get_account(address)
        .await?
        .ok_or(WalletError::AccountNotFound {
            label,
            address: *address,
        })
}

/// Run a read-only RPC query, retrying with linear backoff. Never used for
/// sends: a retried send could land twice.
pub async fn read_with_retry<T, F, Fut>(what: &str, mut read: F) -> Result<T, WalletError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WalletError>>,
{
    let mut attempt = 1;
    loop {
        match read().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < READ_ATTEMPTS => {
                warn!(what, attempt, error = %e, "read failed, retrying");
                tokio::time::sleep(READ_RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

pub struct SolanaConnection {
    client: Arc<RpcClient>,
}

impl SolanaConnection {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RpcConnection for SolanaConnection {
    fn rpc_endpoint(&self) -> String {
        self.client.url()
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, WalletError> {
        let response = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await?;
        Ok(response.value)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        space: usize,
    ) -> Result<u64, WalletError> {
        Ok(self
            .client
            .get_minimum_balance_for_rent_exemption(space)
            .await?)
    }

    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, WalletError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .await?;
        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationReport, WalletError> {
        let response = self.client.simulate_transaction(transaction).await?;
        let err = response
            .value
            .err
            .map(|err| serde_json::to_string(&err).unwrap_or_else(|_| format!("{err:?}")));
        Ok(SimulationReport {
            err,
            logs: response.value.logs.unwrap_or_default(),
        })
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, WalletError> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(|e| WalletError::TransactionFailed(e.to_string()))
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        latest: &LatestBlockhash,
    ) -> Result<(), WalletError> {
        loop {
            let status = self
                .client
                .get_signature_status_with_commitment(signature, CommitmentConfig::confirmed())
                .await?;

            match status {
                Some(Ok(())) => return Ok(()),
                Some(Err(err)) => {
                    return Err(WalletError::TransactionFailed(format!(
                        "{signature} failed on-chain: {err}"
                    )));
                }
                None => {
                    let block_height = self.client.get_block_height().await?;
                    if block_height > latest.last_valid_block_height {
                        return Err(WalletError::TransactionFailed(format!(
                            "{signature} was not confirmed before blockhash {} expired",
                            latest.blockhash
                        )));
                    }
                    debug!(%signature, block_height, "waiting for confirmation");
                    tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<VersionedTransaction, WalletError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };
        let confirmed = self
            .client
            .get_transaction_with_config(signature, config)
            .await
            .map_err(|e| WalletError::Rpc(format!("Can not fetch transaction {signature}: {e}")))?;

        confirmed.transaction.transaction.decode().ok_or_else(|| {
            WalletError::Encoding(format!("transaction {signature} could not be decoded"))
        })
    }
}
