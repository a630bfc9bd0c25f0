//! Backend transactions travel as base64 of the bincode bytes. Before the
//! wallet sees one it gets a fresh blockhash and, for a new mint, the mint
//! keypair's signature.

use crate::error::WalletError;
use base64::{Engine, engine::general_purpose::STANDARD};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::versioned::VersionedTransaction;
use std::cmp::Ordering;
use thiserror::Error;

pub fn decode_transaction(encoded: &str) -> Result<VersionedTransaction, WalletError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| WalletError::Encoding(format!("transaction is not valid base64: {e}")))?;
    bincode::deserialize::<VersionedTransaction>(&bytes)
        .map_err(|e| WalletError::Encoding(format!("failed to deserialize transaction: {e}")))
}

pub fn encode_transaction(transaction: &VersionedTransaction) -> Result<String, WalletError> {
    let bytes = bincode::serialize(transaction)
        .map_err(|e| WalletError::Encoding(format!("failed to serialize transaction: {e}")))?;
    Ok(STANDARD.encode(bytes))
}

/// Replace the message blockhash. Any signature collected over the previous
/// message no longer verifies, so existing signatures are cleared.
pub fn restamp_blockhash(transaction: &mut VersionedTransaction, blockhash: Hash) {
    if *transaction.message.recent_blockhash() == blockhash {
        return;
    }
    transaction.message.set_recent_blockhash(blockhash);
    for signature in transaction.signatures.iter_mut() {
        *signature = Signature::default();
    }
}

#[derive(Debug, Error, Clone)]
pub enum SignatureSlotError {
    #[error("{0} is not among the signers this message requires")]
    NotASigner(Pubkey),

    #[error("message requires {required} signatures, transaction already holds {present}")]
    UnexpectedSignatures { required: usize, present: usize },

    #[error("signer failed: {0}")]
    Signer(String),
}

impl From<SignatureSlotError> for WalletError {
    fn from(err: SignatureSlotError) -> Self {
        WalletError::WalletRejected(err.to_string())
    }
}

/// Fill in one signer's slot of a transaction other parties still have to
/// sign (backend-built transactions arrive with empty or missing slots).
pub trait AddSignature {
    fn add_signature<S: Signer + ?Sized>(&mut self, signer: &S)
    -> Result<Signature, SignatureSlotError>;
}

impl AddSignature for VersionedTransaction {
    fn add_signature<S: Signer + ?Sized>(
        &mut self,
        signer: &S,
    ) -> Result<Signature, SignatureSlotError> {
        let signer_key = signer.pubkey();
        let slot = signer_slot(self, &signer_key)?;
        fit_signature_slots(self)?;

        let signature = signer
            .try_sign_message(&self.message.serialize())
            .map_err(|e| SignatureSlotError::Signer(e.to_string()))?;
        self.signatures[slot] = signature;
        Ok(signature)
    }
}

fn signer_slot(
    transaction: &VersionedTransaction,
    signer_key: &Pubkey,
) -> Result<usize, SignatureSlotError> {
    let required = transaction.message.header().num_required_signatures as usize;
    let mut signers = transaction.message.static_account_keys().iter().take(required);
    signers
        .position(|key| key == signer_key)
        .ok_or(SignatureSlotError::NotASigner(*signer_key))
}

/// One slot per required signer. Trailing empty slots are dropped; trailing
/// real signatures mean the bytes were not built for this message.
fn fit_signature_slots(transaction: &mut VersionedTransaction) -> Result<(), SignatureSlotError> {
    let required = transaction.message.header().num_required_signatures as usize;
    let present = transaction.signatures.len();
    match present.cmp(&required) {
        Ordering::Equal => Ok(()),
        Ordering::Less => {
            transaction.signatures.resize(required, Signature::default());
            Ok(())
        }
        Ordering::Greater => {
            if transaction.signatures[required..]
                .iter()
                .all(|sig| *sig == Signature::default())
            {
                transaction.signatures.truncate(required);
                Ok(())
            } else {
                Err(SignatureSlotError::UnexpectedSignatures { required, present })
            }
        }
    }
}
