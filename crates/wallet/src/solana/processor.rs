//! Sequential submission of backend-built transaction bundles.
//!
//! Confidential withdraws and transfers arrive as several versioned
//! transactions that depend on each other (proof accounts are created, used,
//! then closed). Every transaction is signed up front behind one wallet
//! approval, then each one is simulated, sent and confirmed before the next
//! starts. Any failure stops the sequence; transactions that already
//! confirmed stay on-chain and are reported back in [`BundleFailure`].

use crate::error::{BundleFailure, WalletError};
use crate::solana::connection::{LatestBlockhash, RpcConnection};
use crate::solana::transaction::decode_transaction;
use crate::wallet::WalletAdapter;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct BundleOutcome {
    pub signatures: Vec<Signature>,
    pub transactions: Vec<VersionedTransaction>,
}

pub async fn process_multi_transaction(
    encoded: &[String],
    wallet: &dyn WalletAdapter,
    connection: &dyn RpcConnection,
    latest: &LatestBlockhash,
    label: &str,
    cancel: &CancellationToken,
) -> Result<BundleOutcome, WalletError> {
    let total = encoded.len();
    let abort = |failed_index: usize, confirmed: &[Signature], cause: WalletError| {
        error!(label, index = failed_index, total, error = %cause, "bundle aborted");
        WalletError::from(BundleFailure {
            label: label.to_string(),
            failed_index,
            total,
            confirmed: confirmed.to_vec(),
            cause: Box::new(cause),
        })
    };

    let transactions = encoded
        .iter()
        .map(|tx| decode_transaction(tx))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| abort(0, &[], e))?;
    info!(label, total, "processing transaction bundle");

    let signed = wallet
        .sign_all_transactions(transactions)
        .await
        .map_err(|e| abort(0, &[], e))?;
    if signed.len() != total {
        return Err(abort(
            0,
            &[],
            WalletError::WalletRejected(format!(
                "wallet returned {} signed transactions for {total}",
                signed.len()
            )),
        ));
    }

    let mut signatures = Vec::with_capacity(total);
    for (index, transaction) in signed.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(abort(index, &signatures, WalletError::Cancelled));
        }

        let simulation = connection
            .simulate_transaction(transaction)
            .await
            .map_err(|e| abort(index, &signatures, e))?;
        if let Some(err) = simulation.err {
            for line in &simulation.logs {
                error!(label, index, "simulation log: {line}");
            }
            return Err(abort(
                index,
                &signatures,
                WalletError::SimulationFailed {
                    error: err,
                    logs: simulation.logs,
                },
            ));
        }

        let signature = connection
            .send_transaction(transaction)
            .await
            .map_err(|e| abort(index, &signatures, e))?;
        signatures.push(signature);
        info!(label, index, %signature, "transaction sent");

        // only confirmed signatures are reported on abort
        if let Err(e) = connection.confirm_transaction(&signature, latest).await {
            signatures.pop();
            return Err(abort(index, &signatures, e));
        }
        info!(label, index, %signature, "transaction confirmed");
    }

    Ok(BundleOutcome {
        signatures,
        transactions: signed,
    })
}
