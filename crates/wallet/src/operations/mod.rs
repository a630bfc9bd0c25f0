//! Operation hooks: one per user action.
//!
//! Every hook follows the same shape. Preconditions are checked before any
//! side effect, seed signatures are collected, accounts are read, the backend
//! builds the transaction(s), and the result is submitted through the wallet.
//! On success the hook notifies, logs and refreshes the affected cached
//! reads; on failure it logs and notifies the error. Nothing is retried.

pub mod apply;
pub mod audit;
pub mod create_test_token;
pub mod decrypt;
pub mod deposit;
pub mod initialize;
pub mod reveal;
pub mod transfer;
pub mod withdraw;

use crate::backend::ProofBackend;
use crate::error::WalletError;
use crate::solana::connection::{LatestBlockhash, RpcConnection};
use crate::solana::processor::{BundleOutcome, process_multi_transaction};
use crate::solana::seed::{
    SeedPurpose, SeedSignature, SeedSignatures, generate_seed_signature, generate_seed_signatures,
};
use crate::solana::transaction::{AddSignature, decode_transaction, restamp_blockhash};
use crate::state::cache::BALANCE_QUERIES;
use crate::state::{Notifier, OperationLog, PendingBalanceTracker, QueryCache};
use crate::wallet::{WalletAdapter, require_message_signer};
use serde::Serialize;
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Everything a hook needs, shared by all hooks of the service.
#[derive(Clone)]
pub struct OperationContext {
    pub wallet: Arc<dyn WalletAdapter>,
    pub connection: Arc<dyn RpcConnection>,
    pub backend: Arc<dyn ProofBackend>,
    pub cache: Arc<QueryCache>,
    pub pending: PendingBalanceTracker,
    pub log: Arc<OperationLog>,
    pub notifier: Arc<Notifier>,
    pub priority_fee_lamports: u64,
    pub shutdown: CancellationToken,
}

#[serde_as]
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub signatures: Vec<Signature>,
    pub raw_backend_payload: Value,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_account: Option<Pubkey>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<Pubkey>,
}

impl OperationResult {
    pub fn new(signatures: Vec<Signature>, raw_backend_payload: Value) -> Self {
        Self {
            signatures,
            raw_backend_payload,
            token_account: None,
            mint: None,
        }
    }
}

impl OperationContext {
    pub fn rpc_endpoint(&self) -> String {
        self.connection.rpc_endpoint()
    }

    /// ElGamal then AES seed signature. A wallet that cannot sign messages
    /// fails before any prompt; anything that goes wrong while signing is
    /// reported as a message signing failure.
    pub async fn seed_signatures(&self) -> Result<SeedSignatures, WalletError> {
        require_message_signer(self.wallet.as_ref())?;
        generate_seed_signatures(self.wallet.as_ref())
            .await
            .map_err(|e| WalletError::MessageSigning(Box::new(e)))
    }

    pub async fn seed_signature(&self, purpose: SeedPurpose) -> Result<SeedSignature, WalletError> {
        require_message_signer(self.wallet.as_ref())?;
        generate_seed_signature(self.wallet.as_ref(), purpose)
            .await
            .map_err(|e| WalletError::MessageSigning(Box::new(e)))
    }

    /// Single-transaction path: re-stamp with a fresh blockhash, let any
    /// extra signers sign, then have the wallet sign and send, and confirm.
    pub async fn send_single(
        &self,
        encoded: &str,
        label: &str,
        cosigners: &[&Keypair],
    ) -> Result<Signature, WalletError> {
        let mut transaction = decode_transaction(encoded)?;
        let latest = self.connection.get_latest_blockhash().await?;
        restamp_blockhash(&mut transaction, latest.blockhash);

        for cosigner in cosigners {
            transaction.add_signature(*cosigner)?;
        }

        let signature = self
            .wallet
            .send_transaction(transaction, self.connection.as_ref())
            .await?;
        info!(label, %signature, "transaction sent");

        self.connection
            .confirm_transaction(&signature, &latest)
            .await?;
        info!(label, %signature, "transaction confirmed");
        Ok(signature)
    }

    /// Multi-transaction path, stopping at a transaction boundary on shutdown.
    pub async fn send_bundle(
        &self,
        encoded: &[String],
        label: &str,
        latest: &LatestBlockhash,
    ) -> Result<BundleOutcome, WalletError> {
        process_multi_transaction(
            encoded,
            self.wallet.as_ref(),
            self.connection.as_ref(),
            latest,
            label,
            &self.shutdown,
        )
        .await
    }

    /// Notifications and log entry for a completed operation.
    pub async fn record_success(
        &self,
        title: &str,
        message: &str,
        content: String,
        signatures: &[Signature],
    ) {
        for signature in signatures {
            self.notifier.transaction(signature).await;
        }
        self.notifier.success(message, None).await;
        self.log
            .success(format!("{title} Operation - COMPLETE"), content)
            .await;
    }

    /// Notifications and log entries for a failed operation. When a bundle
    /// stopped after some of its transactions landed, those are announced
    /// and listed like a success would, and the reads of `touched` plus the
    /// wallet are refreshed since lamports and proof accounts moved.
    pub async fn record_failure(
        &self,
        title: &str,
        context: String,
        err: &WalletError,
        touched: &[Pubkey],
    ) {
        error!(operation = title, error = %err, "operation failed");
        let confirmed = err.confirmed_signatures();
        for signature in confirmed {
            self.notifier.transaction(signature).await;
        }

        let description = if err.is_message_signing_failure() {
            err.to_string()
        } else {
            format!("{title} failed! {err}")
        };
        self.notifier
            .error(format!("{title} failed"), description)
            .await;

        let mut content = format!("{context}\n  Error: {err}");
        if !confirmed.is_empty() {
            content.push_str("\n  Confirmed before failure:");
            for signature in confirmed {
                content.push_str(&format!("\n    {signature}"));
            }
        }
        self.log
            .error(format!("{title} Operation - FAILED"), content)
            .await;

        if let WalletError::SimulationFailed { logs, .. } = err.root_cause() {
            if !logs.is_empty() {
                self.log
                    .muted(format!("{title} Simulation Logs"), logs.join("\n"))
                    .await;
            }
        }

        if !confirmed.is_empty() {
            warn!(operation = title, confirmed = confirmed.len(), "bundle partially landed");
            for account in touched.iter().copied().chain(self.wallet.public_key()) {
                self.invalidate_balances(&account).await;
            }
        }
    }

    /// Mark every balance-related read of `account` stale.
    pub async fn invalidate_balances(&self, account: &Pubkey) {
        self.cache
            .invalidate_kinds(&self.rpc_endpoint(), account, &BALANCE_QUERIES)
            .await;
    }
}

/// Run `op`, recording its failure under `title` before handing the error
/// back.
pub(crate) async fn recorded<T, Fut>(
    ctx: &OperationContext,
    title: &str,
    context: impl FnOnce() -> String,
    op: Fut,
) -> Result<T, WalletError>
where
    Fut: Future<Output = Result<T, WalletError>>,
{
    recorded_touching(ctx, title, &[], context, op).await
}

/// [`recorded`] for multi-transaction operations: `touched` are the accounts
/// a partially landed bundle may have changed.
pub(crate) async fn recorded_touching<T, Fut>(
    ctx: &OperationContext,
    title: &str,
    touched: &[Pubkey],
    context: impl FnOnce() -> String,
    op: Fut,
) -> Result<T, WalletError>
where
    Fut: Future<Output = Result<T, WalletError>>,
{
    match op.await {
        Ok(value) => Ok(value),
        Err(e) => {
            ctx.record_failure(title, context(), &e, touched).await;
            Err(e)
        }
    }
}
