use crate::error::WalletError;
use crate::solana::transaction::AddSignature;
use crate::wallet::WalletAdapter;
use async_trait::async_trait;
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::versioned::VersionedTransaction;
use std::sync::Arc;

/// A wallet backed by a local keypair. Without a keypair it behaves like a
/// disconnected browser wallet.
#[derive(Clone, Default)]
pub struct KeypairWallet {
    keypair: Option<Arc<Keypair>>,
}

impl KeypairWallet {
    pub fn new(keypair: Arc<Keypair>) -> Self {
        Self {
            keypair: Some(keypair),
        }
    }

    pub fn disconnected() -> Self {
        Self { keypair: None }
    }

    pub fn from_base58_string(encoded: &str) -> Result<Self, WalletError> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| WalletError::Configuration(format!("WALLET_KEYPAIR is not base58: {e}")))?;
        let keypair = Keypair::try_from(bytes.as_slice()).map_err(|e| {
            WalletError::Configuration(format!("WALLET_KEYPAIR is not a valid keypair: {e}"))
        })?;
        Ok(Self::new(Arc::new(keypair)))
    }

    fn keypair(&self) -> Result<&Arc<Keypair>, WalletError> {
        self.keypair.as_ref().ok_or(WalletError::WalletNotConnected)
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.keypair.as_ref().map(|kp| kp.pubkey())
    }

    fn supports_message_signing(&self) -> bool {
        self.keypair.is_some()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        self.keypair()?
            .try_sign_message(message)
            .map_err(|e| WalletError::WalletRejected(e.to_string()))
    }

    async fn sign_transaction(
        &self,
        mut transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError> {
        let keypair = self.keypair()?;
        transaction.add_signature(keypair.as_ref())?;
        Ok(transaction)
    }

    async fn sign_all_transactions(
        &self,
        transactions: Vec<VersionedTransaction>,
    ) -> Result<Vec<VersionedTransaction>, WalletError> {
        let keypair = self.keypair()?;
        transactions
            .into_iter()
            .map(|mut transaction| -> Result<VersionedTransaction, WalletError> {
                transaction.add_signature(keypair.as_ref())?;
                Ok(transaction)
            })
            .collect()
    }
}
