//! Wallet adapter capability.
//!
//! The orchestration flow never touches private keys directly. It asks the
//! connected wallet to sign arbitrary messages (seed derivation), sign a whole
//! bundle at once, or sign-and-send a single transaction. Wallets that cannot
//! sign messages report it through [`WalletAdapter::supports_message_signing`].

pub mod keypair;

pub use keypair::KeypairWallet;

use crate::error::WalletError;
use crate::solana::connection::RpcConnection;
use async_trait::async_trait;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// `None` while no wallet is connected.
    fn public_key(&self) -> Option<Pubkey>;

    fn supports_message_signing(&self) -> bool;

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError>;

    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError>;

    /// Sign every transaction behind a single approval.
    async fn sign_all_transactions(
        &self,
        transactions: Vec<VersionedTransaction>,
    ) -> Result<Vec<VersionedTransaction>, WalletError>;

    async fn send_transaction(
        &self,
        transaction: VersionedTransaction,
        connection: &dyn RpcConnection,
    ) -> Result<Signature, WalletError> {
        let signed = self.sign_transaction(transaction).await?;
        connection.send_transaction(&signed).await
    }
}

/// The connected wallet's key, or `WalletNotConnected`.
pub fn require_connected(wallet: &dyn WalletAdapter) -> Result<Pubkey, WalletError> {
    wallet.public_key().ok_or(WalletError::WalletNotConnected)
}

/// The connected wallet's key, additionally requiring message signing.
pub fn require_message_signer(wallet: &dyn WalletAdapter) -> Result<Pubkey, WalletError> {
    let pubkey = require_connected(wallet)?;
    if !wallet.supports_message_signing() {
        return Err(WalletError::WalletSigningUnavailable);
    }
    Ok(pubkey)
}
